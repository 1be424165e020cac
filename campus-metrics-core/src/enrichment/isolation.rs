//! Isolation forest over a single numeric feature.
//!
//! Each tree recursively partitions a random subsample with uniformly drawn
//! split points until every point is isolated or the depth limit is hit.
//! Points that are easy to isolate have short average paths and therefore
//! high anomaly scores. A forest is trained and discarded within one call;
//! nothing here outlives the slice of values it was built from.

use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::Rng;

use crate::error::CampusMetricsError;
use crate::Result;

use super::config::{DEFAULT_MAX_SAMPLES, DEFAULT_TREES};

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

/// Parameters for one forest fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForestParams {
    pub n_trees: usize,
    pub max_samples: usize,
    pub contamination: f64,
    pub seed: u64,
}

impl ForestParams {
    /// Creates parameters with the default tree count and subsample cap.
    pub fn new(contamination: f64, seed: u64) -> Self {
        Self {
            n_trees: DEFAULT_TREES,
            max_samples: DEFAULT_MAX_SAMPLES,
            contamination,
            seed,
        }
    }
}

#[derive(Debug)]
enum Node {
    Leaf {
        size: usize,
    },
    Split {
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

impl Node {
    fn build(values: &[f64], depth: usize, max_depth: usize, rng: &mut StdRng) -> Self {
        if depth >= max_depth || values.len() <= 1 {
            return Node::Leaf { size: values.len() };
        }

        let (min, max) = min_max(values);
        if max <= min {
            return Node::Leaf { size: values.len() };
        }

        let threshold = rng.random_range(min..max);
        let (left, right): (Vec<f64>, Vec<f64>) = values.iter().partition(|&&v| v < threshold);
        let next = depth.saturating_add(1);

        Node::Split {
            threshold,
            left: Box::new(Node::build(&left, next, max_depth, rng)),
            right: Box::new(Node::build(&right, next, max_depth, rng)),
        }
    }

    fn path_length(&self, value: f64) -> f64 {
        let mut node = self;
        let mut depth = 0.0;
        loop {
            match node {
                Node::Leaf { size } => return depth + average_path_length(*size),
                Node::Split {
                    threshold,
                    left,
                    right,
                } => {
                    node = if value < *threshold { left } else { right };
                    depth += 1.0;
                }
            }
        }
    }
}

/// A fitted forest. Lives only as long as the call that built it.
#[derive(Debug)]
pub struct IsolationForest {
    trees: Vec<Node>,
    subsample_size: usize,
    offset: f64,
}

impl IsolationForest {
    /// Fits a forest on `values` and derives the contamination offset.
    ///
    /// # Errors
    /// Returns a detection error when `values` has fewer than two entries,
    /// contains non-finite numbers, or `contamination` is outside (0, 0.5].
    pub fn fit(values: &[f64], params: ForestParams) -> Result<Self> {
        if values.len() < 2 {
            return Err(CampusMetricsError::detection(format!(
                "at least 2 values are required, got {}",
                values.len()
            )));
        }
        if values.iter().any(|v| !v.is_finite()) {
            return Err(CampusMetricsError::detection(
                "training values must be finite",
            ));
        }
        if !(params.contamination > 0.0 && params.contamination <= 0.5) {
            return Err(CampusMetricsError::detection(format!(
                "contamination must be in (0.0, 0.5], got {}",
                params.contamination
            )));
        }
        if params.n_trees == 0 {
            return Err(CampusMetricsError::detection("at least one tree is required"));
        }

        let subsample_size = params.max_samples.clamp(2, values.len());
        let max_depth = (subsample_size as f64).log2().ceil() as usize;
        let mut rng = StdRng::seed_from_u64(params.seed);

        let trees = (0..params.n_trees)
            .map(|_| {
                let subsample: Vec<f64> =
                    rand::seq::index::sample(&mut rng, values.len(), subsample_size)
                        .into_iter()
                        .map(|i| values[i])
                        .collect();
                Node::build(&subsample, 0, max_depth, &mut rng)
            })
            .collect();

        let mut forest = Self {
            trees,
            subsample_size,
            offset: 0.0,
        };

        let negated: Vec<f64> = values.iter().map(|&v| -forest.score(v)).collect();
        forest.offset = percentile(&negated, params.contamination * 100.0);

        Ok(forest)
    }

    /// Anomaly score in (0, 1]; higher means easier to isolate.
    pub fn score(&self, value: f64) -> f64 {
        let total: f64 = self.trees.iter().map(|tree| tree.path_length(value)).sum();
        let mean_path = total / self.trees.len() as f64;
        let normalizer = average_path_length(self.subsample_size);
        2f64.powf(-mean_path / normalizer)
    }

    /// Threshold on negated scores below which a value is an outlier
    pub fn offset(&self) -> f64 {
        self.offset
    }

    /// Returns true if the value falls on the outlier side of the offset.
    pub fn is_outlier(&self, value: f64) -> bool {
        -self.score(value) < self.offset
    }
}

/// Trains a fresh forest on `values` and returns one verdict per value.
///
/// `true` marks an outlier. The result depends only on the inputs, so two
/// calls with the same values and seed agree exactly.
pub fn train_and_score(values: &[f64], contamination: f64, seed: u64) -> Result<Vec<bool>> {
    train_and_score_with(values, ForestParams::new(contamination, seed))
}

/// Like [`train_and_score`] with explicit forest parameters.
pub fn train_and_score_with(values: &[f64], params: ForestParams) -> Result<Vec<bool>> {
    let forest = IsolationForest::fit(values, params)?;
    Ok(values.iter().map(|&v| forest.is_outlier(v)).collect())
}

/// Average path length of an unsuccessful search in a binary search tree.
///
/// Used both to normalize scores and to account for the points left
/// unseparated in a leaf.
pub fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

/// Percentile with linear interpolation between closest ranks.
fn percentile(values: &[f64], pct: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let rank = (pct / 100.0).clamp(0.0, 1.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let fraction = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * fraction
}

fn min_max(values: &[f64]) -> (f64, f64) {
    values
        .iter()
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
            (lo.min(v), hi.max(v))
        })
}
