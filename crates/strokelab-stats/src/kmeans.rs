//! K-means clustering
//!
//! Lloyd's algorithm with k-means++ seeding. The generator is seeded
//! explicitly, so equal inputs always give equal clusterings.

use rand::{Rng, SeedableRng as _};
use rand_pcg::Pcg32;

use crate::descriptive::DescriptiveStats;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KMeans {
    pub k: usize,
    pub max_iterations: usize,
    pub seed: u64,
}

impl Default for KMeans {
    fn default() -> Self {
        Self {
            k: 3,
            max_iterations: 100,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster index for each input point.
    pub assignments: Vec<usize>,
    pub centroids: Vec<Vec<f64>>,
    /// Sum of squared distances from points to their centroids.
    pub inertia: f64,
    pub iterations: usize,
}

impl Clustering {
    /// Number of points assigned to each cluster.
    #[must_use]
    pub fn cluster_sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.centroids.len()];
        for &cluster in &self.assignments {
            sizes[cluster] += 1;
        }
        sizes
    }
}

impl KMeans {
    /// Clusters `points`.
    ///
    /// Returns `None` when `k` is zero, when there are fewer points than
    /// clusters, or when points differ in dimension.
    ///
    /// ```
    /// # use strokelab_stats::kmeans::KMeans;
    /// let points = vec![vec![0.0], vec![0.1], vec![10.0], vec![10.1]];
    /// let kmeans = KMeans { k: 2, ..KMeans::default() };
    /// let clustering = kmeans.fit(&points).unwrap();
    /// assert_eq!(clustering.assignments[0], clustering.assignments[1]);
    /// assert_ne!(clustering.assignments[1], clustering.assignments[2]);
    /// ```
    #[must_use]
    pub fn fit(&self, points: &[Vec<f64>]) -> Option<Clustering> {
        let dim = points.first()?.len();
        if self.k == 0 || points.len() < self.k || points.iter().any(|p| p.len() != dim) {
            return None;
        }

        let mut rng = Pcg32::seed_from_u64(self.seed);
        let mut centroids = seed_centroids(points, self.k, &mut rng);
        let mut assignments = vec![usize::MAX; points.len()];
        let mut iterations = 0;

        while iterations < self.max_iterations {
            iterations += 1;
            let mut changed = false;
            for (point, assignment) in points.iter().zip(&mut assignments) {
                let nearest = nearest_centroid(point, &centroids).0;
                if *assignment != nearest {
                    *assignment = nearest;
                    changed = true;
                }
            }
            if !changed {
                break;
            }
            update_centroids(points, &assignments, &mut centroids);
        }

        let inertia = points
            .iter()
            .zip(&assignments)
            .map(|(point, &cluster)| squared_distance(point, &centroids[cluster]))
            .sum();

        Some(Clustering {
            assignments,
            centroids,
            inertia,
            iterations,
        })
    }
}

/// Replaces every feature (column) by its z-score.
///
/// Columns without spread become all zeros.
pub fn standardize(points: &mut [Vec<f64>]) {
    let Some(dim) = points.first().map(Vec::len) else {
        return;
    };
    for feature in 0..dim {
        let Some(stats) = DescriptiveStats::new(points.iter().map(|p| p[feature])) else {
            continue;
        };
        for point in points.iter_mut() {
            point[feature] = stats.z_score(point[feature]);
        }
    }
}

fn seed_centroids(points: &[Vec<f64>], k: usize, rng: &mut Pcg32) -> Vec<Vec<f64>> {
    let mut centroids = Vec::with_capacity(k);
    centroids.push(points[rng.random_range(0..points.len())].clone());

    while centroids.len() < k {
        let weights = points
            .iter()
            .map(|point| nearest_centroid(point, &centroids).1)
            .collect::<Vec<_>>();
        let total = weights.iter().sum::<f64>();

        let index = if total > 0.0 {
            let mut target = rng.random::<f64>() * total;
            weights
                .iter()
                .position(|&w| {
                    target -= w;
                    target < 0.0
                })
                .unwrap_or_else(|| weights.iter().rposition(|&w| w > 0.0).unwrap_or(0))
        } else {
            rng.random_range(0..points.len())
        };
        centroids.push(points[index].clone());
    }

    centroids
}

/// Index of and squared distance to the closest centroid; ties go to the
/// lowest index.
fn nearest_centroid(point: &[f64], centroids: &[Vec<f64>]) -> (usize, f64) {
    centroids
        .iter()
        .map(|centroid| squared_distance(point, centroid))
        .enumerate()
        .fold((0, f64::INFINITY), |best, (i, d)| {
            if d < best.1 { (i, d) } else { best }
        })
}

#[expect(clippy::cast_precision_loss)]
fn update_centroids(points: &[Vec<f64>], assignments: &[usize], centroids: &mut [Vec<f64>]) {
    let dim = centroids[0].len();
    let mut sums = vec![vec![0.0; dim]; centroids.len()];
    let mut counts = vec![0_usize; centroids.len()];
    for (point, &cluster) in points.iter().zip(assignments) {
        counts[cluster] += 1;
        for (sum, value) in sums[cluster].iter_mut().zip(point) {
            *sum += value;
        }
    }
    // an empty cluster keeps its previous centroid
    for ((centroid, sum), count) in centroids.iter_mut().zip(sums).zip(counts) {
        if count > 0 {
            *centroid = sum.into_iter().map(|s| s / count as f64).collect();
        }
    }
}

fn squared_distance(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| (x - y).powi(2)).sum()
}
