// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// DP Samp — cluster-adaptive sampling. Pixels are clustered by intensity,
// the privacy budget is split by cluster population, a bounded number of
// pixels is kept per cluster, and the image is rebuilt by linear
// interpolation from the kept pixels.

pub mod budget;
pub mod interpolate;
pub mod kmeans;
pub mod triangulate;

use image::{DynamicImage, RgbImage};
use privface_core::{Result, SampParams};
use rand::Rng;
use tracing::{debug, info, instrument};

use crate::canvas::{luma_601, to_canonical_rgb};

use self::budget::{allocate_budget, retained_count};
use self::interpolate::{Anchor, interpolate};
use self::kmeans::{KMeansOptions, cluster_intensities};

/// Per-cluster record of the sampling step.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterSample {
    /// Centroid intensity.
    pub centroid: f64,
    /// Number of pixels in the cluster.
    pub population: usize,
    /// Share of the total privacy budget.
    pub epsilon: f64,
    /// Number of pixels retained as anchors.
    pub retained: usize,
}

/// Full output of DP Samp, including the per-cluster breakdown.
#[derive(Debug, Clone)]
pub struct SampOutcome {
    /// Reconstructed image at the canonical size.
    pub image: RgbImage,
    /// One entry per k-means cluster, in cluster order.
    pub clusters: Vec<ClusterSample>,
    /// Every retained pixel.
    pub anchors: Vec<Anchor>,
}

/// Apply DP Samp and return only the reconstructed image.
pub fn dp_samp<R: Rng + ?Sized>(
    image: &DynamicImage,
    params: &SampParams,
    rng: &mut R,
) -> Result<RgbImage> {
    dp_samp_detailed(image, params, rng).map(|outcome| outcome.image)
}

/// Apply DP Samp and keep the clustering and sampling details.
///
/// ## Pipeline
///
/// 1. Resize to the canonical square; derive an ITU-R 601 luma copy for clustering
/// 2. k-means over grayscale intensity with `num_clusters` centres
/// 3. Split `epsilon` across clusters by population
/// 4. Per cluster, bound the retained count with the selection ratio search
///    and sample that many distinct pixels uniformly
/// 5. Interpolate each channel linearly from the retained pixels; pixels
///    outside their convex hull keep the resized original value
#[instrument(skip(image, rng), fields(width = image.width(), height = image.height()))]
pub fn dp_samp_detailed<R: Rng + ?Sized>(
    image: &DynamicImage,
    params: &SampParams,
    rng: &mut R,
) -> Result<SampOutcome> {
    params.validate()?;
    let canvas = to_canonical_rgb(image)?;
    let gray = luma_601(&canvas);
    info!(
        epsilon = params.epsilon,
        num_clusters = params.num_clusters,
        num_pixels = params.num_pixels,
        max_iterations = params.max_iterations,
        "Applying DP sampling"
    );

    let histogram = imageproc::stats::histogram(&gray).channels[0];
    let clustering = cluster_intensities(
        &histogram,
        params.num_clusters as usize,
        &KMeansOptions::default(),
        rng,
    );
    let budgets = allocate_budget(params.epsilon, &clustering.counts);

    let mut members: Vec<Vec<usize>> = vec![Vec::new(); clustering.num_clusters()];
    for (index, pixel) in gray.pixels().enumerate() {
        members[clustering.label_of(pixel.0[0])].push(index);
    }

    let width = canvas.width() as usize;
    let mut anchors = Vec::new();
    let mut clusters = Vec::with_capacity(members.len());
    for (i, pixels) in members.iter().enumerate() {
        let population = pixels.len();
        let retained = if population == 0 {
            0
        } else {
            retained_count(
                population,
                params.num_pixels as usize,
                budgets[i],
                params.max_iterations,
            )
        };
        if retained > 0 {
            for pick in rand::seq::index::sample(rng, population, retained) {
                let index = pixels[pick];
                let (x, y) = ((index % width) as u32, (index / width) as u32);
                anchors.push(Anchor {
                    x,
                    y,
                    value: canvas.get_pixel(x, y).0,
                });
            }
        }
        debug!(
            cluster = i,
            centroid = clustering.centroids[i],
            population,
            epsilon = budgets[i],
            retained,
            "Cluster sampled"
        );
        clusters.push(ClusterSample {
            centroid: clustering.centroids[i],
            population,
            epsilon: budgets[i],
            retained,
        });
    }

    let reconstruction = interpolate(&canvas, &anchors);
    info!(
        anchors = anchors.len(),
        triangles = reconstruction.triangles,
        covered = reconstruction.covered,
        "DP sampling complete"
    );
    Ok(SampOutcome {
        image: reconstruction.image,
        clusters,
        anchors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use privface_core::{CANONICAL_SIZE, PrivfaceError};
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::collections::HashSet;

    /// Four flat quadrants of different brightness plus a diagonal ramp.
    fn scene() -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_fn(224, 224, |x, y| {
            let base = match (x < 112, y < 112) {
                (true, true) => 30,
                (false, true) => 90,
                (true, false) => 160,
                (false, false) => 230,
            };
            Rgb([base, ((x + y) / 2) as u8, 255 - base])
        }))
    }

    fn params(epsilon: f64) -> SampParams {
        SampParams {
            epsilon,
            num_clusters: 4,
            num_pixels: 12,
            max_iterations: 1000,
        }
    }

    #[test]
    fn output_is_canonical_size() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(50, 80, Rgb([1, 2, 3])));
        let out = dp_samp(&image, &params(5.0), &mut StdRng::seed_from_u64(0)).unwrap();
        assert_eq!(out.dimensions(), (CANONICAL_SIZE, CANONICAL_SIZE));
    }

    #[test]
    fn retained_never_exceeds_limits() {
        let outcome = dp_samp_detailed(&scene(), &params(25.0), &mut StdRng::seed_from_u64(1)).unwrap();
        for cluster in &outcome.clusters {
            assert!(cluster.retained <= cluster.population.min(12));
        }
        let total: usize = outcome.clusters.iter().map(|c| c.retained).sum();
        assert_eq!(total, outcome.anchors.len());
        let unique: HashSet<_> = outcome.anchors.iter().map(|a| (a.x, a.y)).collect();
        assert_eq!(unique.len(), outcome.anchors.len());
    }

    #[test]
    fn budgets_sum_to_epsilon() {
        let outcome = dp_samp_detailed(&scene(), &params(7.5), &mut StdRng::seed_from_u64(2)).unwrap();
        let sum: f64 = outcome.clusters.iter().map(|c| c.epsilon).sum();
        assert!((sum - 7.5).abs() < 1e-9);
        let population: usize = outcome.clusters.iter().map(|c| c.population).sum();
        assert_eq!(population, (CANONICAL_SIZE * CANONICAL_SIZE) as usize);
    }

    #[test]
    fn anchors_carry_canvas_values() {
        let image = scene();
        let outcome = dp_samp_detailed(&image, &params(25.0), &mut StdRng::seed_from_u64(3)).unwrap();
        let canvas = to_canonical_rgb(&image).unwrap();
        assert!(!outcome.anchors.is_empty());
        for a in &outcome.anchors {
            assert_eq!(canvas.get_pixel(a.x, a.y).0, a.value);
            assert_eq!(outcome.image.get_pixel(a.x, a.y).0, a.value);
        }
    }

    /// With only a handful of anchors most of the canvas lies outside their
    /// hull: those pixels must keep the resized original, and pixels inside a
    /// triangle must stay within the range of its corner values.
    #[test]
    fn pixels_outside_hull_keep_canvas_values() {
        use super::triangulate::{Point, orient, triangulate};

        let image = scene();
        let sparse = SampParams {
            epsilon: 25.0,
            num_clusters: 2,
            num_pixels: 3,
            max_iterations: 1000,
        };
        let outcome = dp_samp_detailed(&image, &sparse, &mut StdRng::seed_from_u64(4)).unwrap();
        let canvas = to_canonical_rgb(&image).unwrap();
        assert!(outcome.anchors.len() <= 6);

        let points: Vec<Point> = outcome
            .anchors
            .iter()
            .map(|a| Point::new(i64::from(a.x), i64::from(a.y)))
            .collect();
        let triangles = triangulate(&points);

        let mut outside = 0;
        for (x, y, pixel) in outcome.image.enumerate_pixels() {
            let p = Point::new(i64::from(x), i64::from(y));
            let enclosing = triangles.iter().find(|t| {
                let [a, b, c] = t.map(|i| points[i]);
                orient(b, c, p) >= 0 && orient(c, a, p) >= 0 && orient(a, b, p) >= 0
            });
            match enclosing {
                None => {
                    outside += 1;
                    assert_eq!(pixel, canvas.get_pixel(x, y), "pixel ({x}, {y})");
                }
                Some(t) => {
                    for ch in 0..3 {
                        let corners = t.map(|i| outcome.anchors[i].value[ch]);
                        let lo = corners.iter().min().copied().unwrap_or(0);
                        let hi = corners.iter().max().copied().unwrap_or(255);
                        assert!((lo..=hi).contains(&pixel.0[ch]), "pixel ({x}, {y})");
                    }
                }
            }
        }
        assert!(outside > 0);
    }

    #[test]
    fn same_seed_reproduces() {
        let a = dp_samp(&scene(), &params(10.0), &mut StdRng::seed_from_u64(9)).unwrap();
        let b = dp_samp(&scene(), &params(10.0), &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    /// A flat image has one occupied intensity, so surplus clusters are empty
    /// and skipped.
    #[test]
    fn empty_clusters_are_skipped() {
        let image = DynamicImage::ImageRgb8(RgbImage::from_pixel(224, 224, Rgb([80, 80, 80])));
        let outcome = dp_samp_detailed(&image, &params(25.0), &mut StdRng::seed_from_u64(5)).unwrap();
        let empty: Vec<_> = outcome.clusters.iter().filter(|c| c.population == 0).collect();
        assert_eq!(empty.len(), 3);
        assert!(empty.iter().all(|c| c.retained == 0 && c.epsilon == 0.0));
        assert!(outcome.image.pixels().all(|p| p.0 == [80, 80, 80]));
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let bad = SampParams {
            num_pixels: 0,
            ..params(1.0)
        };
        let err = dp_samp(&scene(), &bad, &mut StdRng::seed_from_u64(6)).unwrap_err();
        assert!(matches!(err, PrivfaceError::InvalidParameter { name: "num_pixels", .. }));
    }
}
