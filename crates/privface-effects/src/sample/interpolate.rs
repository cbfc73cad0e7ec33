// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Piecewise-linear reconstruction of an RGB grid from scattered anchors.

use image::{Rgb, RgbImage};
use tracing::debug;

use super::triangulate::{Point, orient, triangulate};

/// A retained pixel and its original colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Anchor {
    pub x: u32,
    pub y: u32,
    pub value: [u8; 3],
}

/// Outcome of a reconstruction.
#[derive(Debug, Clone)]
pub struct Reconstruction {
    /// The reconstructed image.
    pub image: RgbImage,
    /// Number of triangles in the anchor triangulation.
    pub triangles: usize,
    /// Pixels that fell inside the anchors' convex hull.
    pub covered: usize,
}

/// Linearly interpolate every channel from `anchors` over the grid of `original`.
///
/// Each pixel inside the anchors' convex hull takes the barycentric blend of
/// its enclosing Delaunay triangle, rounded to the nearest level. Pixels
/// outside the hull keep their value from `original`.
pub fn interpolate(original: &RgbImage, anchors: &[Anchor]) -> Reconstruction {
    let (width, height) = original.dimensions();
    let points: Vec<Point> = anchors
        .iter()
        .map(|a| Point::new(i64::from(a.x), i64::from(a.y)))
        .collect();
    let triangles = triangulate(&points);

    let mut image = original.clone();
    let mut filled = vec![false; (width as usize) * (height as usize)];
    let mut covered = 0;

    for t in &triangles {
        let [a, b, c] = t.map(|i| points[i]);
        let area = orient(a, b, c);
        let values = t.map(|i| anchors[i].value);

        let x0 = a.x.min(b.x).min(c.x).max(0);
        let x1 = a.x.max(b.x).max(c.x).min(i64::from(width) - 1);
        let y0 = a.y.min(b.y).min(c.y).max(0);
        let y1 = a.y.max(b.y).max(c.y).min(i64::from(height) - 1);

        for y in y0..=y1 {
            for x in x0..=x1 {
                let index = y as usize * width as usize + x as usize;
                if filled[index] {
                    continue;
                }
                let p = Point::new(x, y);
                let weights = [orient(b, c, p), orient(c, a, p), orient(a, b, p)];
                if weights.iter().any(|&w| w < 0) {
                    continue;
                }
                filled[index] = true;
                covered += 1;
                image.put_pixel(x as u32, y as u32, Rgb(blend(&weights, &values, area)));
            }
        }
    }

    debug!(
        anchors = anchors.len(),
        triangles = triangles.len(),
        covered,
        "Interpolation complete"
    );
    Reconstruction {
        image,
        triangles: triangles.len(),
        covered,
    }
}

fn blend(weights: &[i128; 3], values: &[[u8; 3]; 3], area: i128) -> [u8; 3] {
    let mut out = [0u8; 3];
    for (channel, slot) in out.iter_mut().enumerate() {
        let sum: f64 = weights
            .iter()
            .zip(values)
            .map(|(&w, v)| w as f64 * f64::from(v[channel]))
            .sum();
        *slot = (sum / area as f64).round().clamp(0.0, 255.0) as u8;
    }
    out
}
