// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// One-dimensional k-means over 8-bit intensities.
//
// Pixels are clustered through their 256-bin histogram: every pixel with the
// same intensity lands in the same cluster, so Lloyd's algorithm only has to
// move 256 weighted points regardless of image size.

use rand::Rng;
use rand::distr::Distribution;
use rand::distr::weighted::WeightedIndex;
use tracing::debug;

/// Number of distinct 8-bit intensities.
pub const LEVELS: usize = 256;

/// Stopping rules for Lloyd's iterations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KMeansOptions {
    /// Hard cap on Lloyd iterations.
    pub max_iterations: usize,
    /// Convergence threshold on the summed squared centroid shift, relative
    /// to the intensity variance.
    pub tolerance: f64,
}

impl Default for KMeansOptions {
    fn default() -> Self {
        Self {
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }
}

/// Result of clustering a histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Centroid intensity per cluster.
    pub centroids: Vec<f64>,
    /// Number of pixels per cluster. May contain zeros.
    pub counts: Vec<usize>,
    /// Cluster index for every intensity level.
    labels: [usize; LEVELS],
}

impl Clustering {
    /// Cluster the pixel with this intensity belongs to.
    pub fn label_of(&self, intensity: u8) -> usize {
        self.labels[intensity as usize]
    }

    pub fn num_clusters(&self) -> usize {
        self.centroids.len()
    }
}

/// Run k-means with `k` centres over `histogram`.
///
/// Initial centres are chosen with k-means++ from `rng`. When the histogram
/// has fewer occupied levels than `k`, the surplus centres duplicate an
/// existing one and finish with a count of zero.
pub fn cluster_intensities<R: Rng + ?Sized>(
    histogram: &[u32; LEVELS],
    k: usize,
    options: &KMeansOptions,
    rng: &mut R,
) -> Clustering {
    let k = k.max(1);
    let weights: Vec<f64> = histogram.iter().map(|&c| f64::from(c)).collect();
    let mut centroids = seed_centroids(&weights, k, rng);

    let threshold = options.tolerance * intensity_variance(&weights);
    let mut iterations = 0;
    while iterations < options.max_iterations {
        iterations += 1;
        let labels = assign(&centroids);
        let updated = update_centroids(&weights, &labels, &centroids);
        let shift: f64 = centroids
            .iter()
            .zip(&updated)
            .map(|(a, b)| (a - b) * (a - b))
            .sum();
        centroids = updated;
        if shift <= threshold {
            break;
        }
    }

    let labels = assign(&centroids);
    let mut counts = vec![0usize; k];
    for (level, &label) in labels.iter().enumerate() {
        counts[label] += histogram[level] as usize;
    }
    debug!(k, iterations, ?counts, "k-means converged");

    Clustering {
        centroids,
        counts,
        labels,
    }
}

/// k-means++ seeding over weighted intensity levels.
fn seed_centroids<R: Rng + ?Sized>(weights: &[f64], k: usize, rng: &mut R) -> Vec<f64> {
    let mut centroids = Vec::with_capacity(k);
    let Some(first) = pick_level(weights.iter().copied(), rng) else {
        // Empty histogram: nothing to cluster.
        return vec![0.0; k];
    };
    centroids.push(first as f64);

    while centroids.len() < k {
        let scores = weights.iter().enumerate().map(|(level, &w)| {
            let d = nearest_distance(level as f64, &centroids);
            w * d * d
        });
        match pick_level(scores, rng) {
            Some(level) => centroids.push(level as f64),
            None => {
                // Every occupied level already hosts a centre.
                let last = centroids[centroids.len() - 1];
                centroids.resize(k, last);
            }
        }
    }
    centroids
}

fn pick_level<R: Rng + ?Sized>(scores: impl Iterator<Item = f64>, rng: &mut R) -> Option<usize> {
    WeightedIndex::new(scores).ok().map(|dist| dist.sample(rng))
}

fn nearest_distance(value: f64, centroids: &[f64]) -> f64 {
    centroids
        .iter()
        .map(|c| (value - c).abs())
        .fold(f64::INFINITY, f64::min)
}

/// Nearest centre for every level; ties go to the lower index.
fn assign(centroids: &[f64]) -> [usize; LEVELS] {
    let mut labels = [0usize; LEVELS];
    for (level, label) in labels.iter_mut().enumerate() {
        let value = level as f64;
        let mut best = 0;
        let mut best_distance = f64::INFINITY;
        for (i, c) in centroids.iter().enumerate() {
            let distance = (value - c).abs();
            if distance < best_distance {
                best = i;
                best_distance = distance;
            }
        }
        *label = best;
    }
    labels
}

/// Weighted mean of each cluster's levels. Empty clusters keep their centre.
fn update_centroids(weights: &[f64], labels: &[usize; LEVELS], previous: &[f64]) -> Vec<f64> {
    let mut sums = vec![0.0_f64; previous.len()];
    let mut mass = vec![0.0_f64; previous.len()];
    for (level, &w) in weights.iter().enumerate() {
        sums[labels[level]] += w * level as f64;
        mass[labels[level]] += w;
    }
    previous
        .iter()
        .enumerate()
        .map(|(i, &old)| if mass[i] > 0.0 { sums[i] / mass[i] } else { old })
        .collect()
}

fn intensity_variance(weights: &[f64]) -> f64 {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    let mean = weights
        .iter()
        .enumerate()
        .map(|(level, w)| w * level as f64)
        .sum::<f64>()
        / total;
    weights
        .iter()
        .enumerate()
        .map(|(level, w)| w * (level as f64 - mean).powi(2))
        .sum::<f64>()
        / total
}
