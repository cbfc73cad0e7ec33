// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Delaunay triangulation of integer pixel coordinates (Bowyer–Watson).
//
// Each insertion walks to the triangle containing the new point and grows
// the cavity through edge adjacency, so cost stays local to the point.
//
// All predicates are evaluated exactly in i128, so cocircular and collinear
// grid points never produce inconsistent triangles.

use std::collections::{HashMap, HashSet};

/// A lattice point in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i64,
    pub y: i64,
}

impl Point {
    pub fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }
}

/// Distance of the bounding vertices from the input. Far enough that no
/// triangle of lattice points inside a few thousand pixels has a
/// circumcircle reaching them.
const SUPER_MARGIN: i64 = 1 << 26;

/// Twice the signed area of `abc`; positive when counter-clockwise.
pub fn orient(a: Point, b: Point, c: Point) -> i128 {
    let (abx, aby) = ((b.x - a.x) as i128, (b.y - a.y) as i128);
    let (acx, acy) = ((c.x - a.x) as i128, (c.y - a.y) as i128);
    abx * acy - aby * acx
}

/// Positive when `d` lies strictly inside the circumcircle of the
/// counter-clockwise triangle `abc`.
fn in_circle(a: Point, b: Point, c: Point, d: Point) -> i128 {
    let (adx, ady) = ((a.x - d.x) as i128, (a.y - d.y) as i128);
    let (bdx, bdy) = ((b.x - d.x) as i128, (b.y - d.y) as i128);
    let (cdx, cdy) = ((c.x - d.x) as i128, (c.y - d.y) as i128);
    let ad = adx * adx + ady * ady;
    let bd = bdx * bdx + bdy * bdy;
    let cd = cdx * cdx + cdy * cdy;
    ad * (bdx * cdy - cdx * bdy) - bd * (adx * cdy - cdx * ady) + cd * (adx * bdy - bdx * ady)
}

/// Triangulate `points`, returning counter-clockwise index triples.
///
/// Fewer than three points, or points that are all collinear, yield no
/// triangles. Duplicate points are ignored.
pub fn triangulate(points: &[Point]) -> Vec<[usize; 3]> {
    let n = points.len();
    if n < 3 {
        return Vec::new();
    }

    let min_x = points.iter().map(|p| p.x).min().unwrap_or(0);
    let min_y = points.iter().map(|p| p.y).min().unwrap_or(0);
    let max_x = points.iter().map(|p| p.x).max().unwrap_or(0);
    let max_y = points.iter().map(|p| p.y).max().unwrap_or(0);
    let cx = (min_x + max_x) / 2;
    let cy = (min_y + max_y) / 2;

    let mut vertices = points.to_vec();
    vertices.push(Point::new(cx - SUPER_MARGIN, cy - SUPER_MARGIN));
    vertices.push(Point::new(cx + SUPER_MARGIN, cy - SUPER_MARGIN));
    vertices.push(Point::new(cx, cy + SUPER_MARGIN));

    // Row-major insertion keeps consecutive points close, so each walk
    // starts next to its target.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by_key(|&i| (points[i].y, points[i].x));

    let mut mesh = Mesh::new(&vertices, [n, n + 1, n + 2]);
    for i in order {
        mesh.insert(i);
    }

    mesh.triangles
        .into_iter()
        .flatten()
        .filter(|t| t.iter().all(|&v| v < n))
        .collect()
}

fn edges_of(t: [usize; 3]) -> [(usize, usize); 3] {
    [(t[0], t[1]), (t[1], t[2]), (t[2], t[0])]
}

/// Triangle soup with directed-edge adjacency. Removed triangles leave a
/// `None` slot so ids stay stable.
struct Mesh<'a> {
    vertices: &'a [Point],
    triangles: Vec<Option<[usize; 3]>>,
    /// Directed edge `(a, b)` to the counter-clockwise triangle that owns it.
    /// The neighbour across it owns `(b, a)`.
    edges: HashMap<(usize, usize), usize>,
    /// Most recently created triangle, where the next walk starts.
    last: usize,
}

impl<'a> Mesh<'a> {
    fn new(vertices: &'a [Point], outer: [usize; 3]) -> Self {
        let mut mesh = Self {
            vertices,
            triangles: Vec::new(),
            edges: HashMap::new(),
            last: 0,
        };
        mesh.add(outer);
        mesh
    }

    fn add(&mut self, t: [usize; 3]) {
        let id = self.triangles.len();
        self.triangles.push(Some(t));
        for e in edges_of(t) {
            self.edges.insert(e, id);
        }
        self.last = id;
    }

    fn remove(&mut self, id: usize) {
        if let Some(t) = self.triangles[id].take() {
            for e in edges_of(t) {
                self.edges.remove(&e);
            }
        }
    }

    fn orient(&self, a: usize, b: usize, p: Point) -> i128 {
        orient(self.vertices[a], self.vertices[b], p)
    }

    fn circumcircle_contains(&self, id: usize, p: Point) -> bool {
        self.triangles[id].is_some_and(|t| {
            let [a, b, c] = t.map(|v| self.vertices[v]);
            in_circle(a, b, c, p) > 0
        })
    }

    /// Walk from the last created triangle towards `p`, crossing any edge
    /// that has `p` on its outer side.
    fn walk(&self, p: Point) -> Option<usize> {
        let mut current = self.last;
        for _ in 0..self.triangles.len() {
            let t = self.triangles[current]?;
            let exit = edges_of(t)
                .into_iter()
                .find(|&(a, b)| self.orient(a, b, p) < 0);
            match exit {
                None => return Some(current),
                Some((a, b)) => current = *self.edges.get(&(b, a))?,
            }
        }
        None
    }

    /// Triangle whose closure contains `p`.
    fn locate(&self, p: Point) -> Option<usize> {
        self.walk(p).or_else(|| {
            // Walk cycled or left the mesh: fall back to a full scan.
            self.triangles.iter().position(|t| {
                t.is_some_and(|t| edges_of(t).iter().all(|&(a, b)| self.orient(a, b, p) >= 0))
            })
        })
    }

    fn insert(&mut self, i: usize) {
        let p = self.vertices[i];
        let Some(start) = self.locate(p) else {
            return;
        };
        if !self.circumcircle_contains(start, p) {
            // Only a coincident vertex sits on the circumcircle of the
            // triangle containing it.
            return;
        }

        // Cavity: triangles whose circumcircle strictly contains `p`. They
        // form a connected region around `start`.
        let mut cavity = HashSet::from([start]);
        let mut order = vec![start];
        let mut stack = vec![start];
        while let Some(id) = stack.pop() {
            let Some(t) = self.triangles[id] else {
                continue;
            };
            for (a, b) in edges_of(t) {
                if let Some(&next) = self.edges.get(&(b, a)) {
                    if !cavity.contains(&next) && self.circumcircle_contains(next, p) {
                        cavity.insert(next);
                        order.push(next);
                        stack.push(next);
                    }
                }
            }
        }

        let mut boundary = Vec::new();
        for &id in &order {
            let Some(t) = self.triangles[id] else {
                continue;
            };
            for (a, b) in edges_of(t) {
                let outside = self
                    .edges
                    .get(&(b, a))
                    .is_none_or(|next| !cavity.contains(next));
                if outside {
                    boundary.push((a, b));
                }
            }
        }

        for id in order {
            self.remove(id);
        }
        for (a, b) in boundary {
            if self.orient(a, b, p) > 0 {
                self.add([a, b, i]);
            }
        }
    }
}
