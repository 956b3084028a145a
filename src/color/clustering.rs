//! Dominant color extraction by k-means clustering
//!
//! Pixels are treated as points in RGB space and grouped into `k` clusters:
//! - k-means++ seeding from a fixed-seed RNG, so results are reproducible
//! - Lloyd iterations until no centroid moves more than the tolerance
//! - Centroids rounded to 8-bit channels
//!
//! Rasters with fewer distinct colors than `k` yield fewer centroids.

use image::RgbImage;
use log::debug;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::ClusteringConfig;
use crate::constants;
use crate::ColorSample;

type Point = [f64; 3];

/// One cluster of the palette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorCluster {
    /// Rounded centroid
    pub color: ColorSample,
    /// Number of sampled pixels assigned to this cluster
    pub population: usize,
}

/// K-means color clusterer
#[derive(Debug, Clone)]
pub struct ColorClusterer {
    max_iterations: usize,
    tolerance: f64,
    seed: u64,
    sample_limit: usize,
    sort_by_population: bool,
}

impl Default for ColorClusterer {
    fn default() -> Self {
        Self::new()
    }
}

impl ColorClusterer {
    /// Create a clusterer with default parameters
    pub fn new() -> Self {
        Self {
            max_iterations: constants::clustering::MAX_ITERATIONS,
            tolerance: constants::clustering::TOLERANCE,
            seed: constants::clustering::SEED,
            sample_limit: constants::clustering::SAMPLE_LIMIT,
            sort_by_population: true,
        }
    }

    /// Create a clusterer from the clustering section of a pipeline config
    pub fn from_config(config: &ClusteringConfig) -> Self {
        Self {
            max_iterations: config.max_iterations.max(1),
            tolerance: config.tolerance,
            seed: config.seed,
            sample_limit: config.sample_limit.max(1),
            sort_by_population: config.sort_by_population,
        }
    }

    /// Cluster the image into at most `k` colors
    ///
    /// Returns centroids most-populous first when population sorting is
    /// enabled, otherwise in internal cluster order. An empty raster or
    /// `k == 0` yields an empty vector.
    pub fn cluster(&self, image: &RgbImage, k: usize) -> Vec<ColorSample> {
        self.cluster_with_population(image, k)
            .into_iter()
            .map(|cluster| cluster.color)
            .collect()
    }

    /// Same as [`cluster`](Self::cluster) but keeps the assigned-pixel counts
    pub fn cluster_with_population(&self, image: &RgbImage, k: usize) -> Vec<ColorCluster> {
        let pixels = self.sample_pixels(image);
        if pixels.is_empty() || k == 0 {
            debug!("ColorClusterer: nothing to cluster (pixels={}, k={})", pixels.len(), k);
            return Vec::new();
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut centroids = init_plus_plus(&pixels, k, &mut rng);
        let mut counts = vec![0usize; centroids.len()];

        for iteration in 0..self.max_iterations {
            let (updated, assigned) = lloyd_step(&pixels, &centroids);
            let shift = centroids
                .iter()
                .zip(&updated)
                .map(|(old, new)| distance_squared(old, new))
                .fold(0.0, f64::max)
                .sqrt();

            centroids = updated;
            counts = assigned;

            if shift <= self.tolerance {
                debug!("ColorClusterer: converged after {} iterations", iteration + 1);
                break;
            }
        }

        let mut clusters: Vec<ColorCluster> = centroids
            .iter()
            .zip(&counts)
            .filter(|(_, &population)| population > 0)
            .map(|(centroid, &population)| ColorCluster {
                color: ColorSample::from_channels(*centroid),
                population,
            })
            .collect();

        if self.sort_by_population {
            // stable: equal populations keep cluster order
            clusters.sort_by(|a, b| b.population.cmp(&a.population));
        }

        debug!(
            "ColorClusterer: k={} samples={} clusters={:?}",
            k,
            pixels.len(),
            clusters
        );
        clusters
    }

    /// Flatten the raster, striding over it when it exceeds the sample limit
    fn sample_pixels(&self, image: &RgbImage) -> Vec<Point> {
        let total = image.width() as usize * image.height() as usize;
        if total == 0 {
            return Vec::new();
        }
        let step = total.div_ceil(self.sample_limit).max(1);

        image
            .pixels()
            .step_by(step)
            .map(|p| [p[0] as f64, p[1] as f64, p[2] as f64])
            .collect()
    }
}

fn distance_squared(a: &Point, b: &Point) -> f64 {
    (a[0] - b[0]).powi(2) + (a[1] - b[1]).powi(2) + (a[2] - b[2]).powi(2)
}

fn nearest(point: &Point, centroids: &[Point]) -> usize {
    let mut best = 0;
    let mut best_distance = f64::MAX;
    for (index, centroid) in centroids.iter().enumerate() {
        let d = distance_squared(point, centroid);
        if d < best_distance {
            best_distance = d;
            best = index;
        }
    }
    best
}

/// k-means++ seeding: each new centroid is drawn with probability
/// proportional to its squared distance from the nearest chosen one.
/// Stops early once every pixel coincides with a centroid.
fn init_plus_plus(pixels: &[Point], k: usize, rng: &mut StdRng) -> Vec<Point> {
    let mut centroids = Vec::with_capacity(k.min(pixels.len()));
    centroids.push(pixels[rng.random_range(0..pixels.len())]);

    let mut weights: Vec<f64> = pixels
        .iter()
        .map(|p| distance_squared(p, &centroids[0]))
        .collect();

    while centroids.len() < k {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            break;
        }

        let target = rng.random::<f64>() * total;
        let mut accumulated = 0.0;
        let mut chosen = None;
        for (index, weight) in weights.iter().enumerate() {
            if *weight <= 0.0 {
                continue;
            }
            accumulated += weight;
            chosen = Some(index);
            if accumulated > target {
                break;
            }
        }

        let Some(index) = chosen else { break };
        let centroid = pixels[index];
        centroids.push(centroid);

        for (weight, pixel) in weights.iter_mut().zip(pixels) {
            *weight = weight.min(distance_squared(pixel, &centroid));
        }
    }

    centroids
}

/// Assign every pixel to its nearest centroid and recompute the means.
/// A centroid that loses all its pixels stays where it was.
fn lloyd_step(pixels: &[Point], centroids: &[Point]) -> (Vec<Point>, Vec<usize>) {
    let mut sums = vec![[0.0f64; 3]; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];

    for pixel in pixels {
        let index = nearest(pixel, centroids);
        sums[index][0] += pixel[0];
        sums[index][1] += pixel[1];
        sums[index][2] += pixel[2];
        counts[index] += 1;
    }

    let updated = centroids
        .iter()
        .zip(sums.iter().zip(&counts))
        .map(|(old, (sum, &count))| {
            if count == 0 {
                *old
            } else {
                let n = count as f64;
                [sum[0] / n, sum[1] / n, sum[2] / n]
            }
        })
        .collect();

    (updated, counts)
}
