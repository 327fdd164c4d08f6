//! Drives one full run: shuffle, partition, discretize, evaluate.
//!
//! Every training subset gets its own [`ClassMeans`] and its own likelihood
//! cache; nothing fitted on one fold is visible to another, which is what
//! lets cross-validation folds run in parallel.

use rand::{rngs::StdRng, SeedableRng};
use rayon::prelude::*;

use crate::dataset::{Dataset, DiscreteSet};
use crate::discretize::{quantile_transform, ClassMeans};
use crate::error::{BayesError, Result};
use crate::evaluate::{evaluate, ConfusionCounts};

/// How continuous features become symbols.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Discretizer {
    /// Closer-mean binarization fitted on each training subset.
    #[default]
    MeanDistance,
    /// Rank quantiles over the whole dataset before partitioning. Bucket
    /// edges see testing rows.
    Quantile { buckets: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct EvalConfig {
    pub split_ratio: f64,
    pub folds: Option<usize>,
    pub seed: Option<u64>,
    pub shuffle: bool,
    pub discretizer: Discretizer,
}

impl Default for EvalConfig {
    fn default() -> Self {
        EvalConfig {
            split_ratio: 0.66,
            folds: None,
            seed: None,
            shuffle: true,
            discretizer: Discretizer::MeanDistance,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CrossValidation {
    pub folds: Vec<ConfusionCounts>,
}

impl CrossValidation {
    pub fn total(&self) -> ConfusionCounts {
        self.folds.iter().copied().sum()
    }

    /// Unweighted mean of the per-fold accuracies.
    pub fn mean_accuracy(&self) -> Result<f64> {
        if self.folds.is_empty() {
            return Err(BayesError::EmptyDataset);
        }

        let mut sum = 0.0;
        for fold in &self.folds {
            sum += fold.accuracy()?;
        }
        Ok(sum / self.folds.len() as f64)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Report {
    Holdout(ConfusionCounts),
    CrossValidation(CrossValidation),
}

/// Runs the evaluation `config` asks for on an already loaded dataset.
pub fn run(mut dataset: Dataset, config: &EvalConfig) -> Result<Report> {
    tracing::info!(rows = dataset.len(), "dataset loaded");

    if config.shuffle {
        let mut rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        dataset.shuffle(&mut rng);
    }

    match config.folds {
        Some(k) => cross_validate(&dataset, k, config.discretizer).map(Report::CrossValidation),
        None => holdout(&dataset, config.split_ratio, config.discretizer).map(Report::Holdout),
    }
}

/// Trains on the first `split_ratio` of the rows and tests on the rest.
pub fn holdout(
    dataset: &Dataset,
    split_ratio: f64,
    discretizer: Discretizer,
) -> Result<ConfusionCounts> {
    let counts = match discretizer {
        Discretizer::MeanDistance => {
            let (training, testing) = dataset.split(split_ratio)?;
            let (training, testing) = discretize_by_means(&training, &testing)?;
            evaluate(&training, &testing)?
        }
        Discretizer::Quantile { buckets } => {
            let (training, testing) = quantile_all(dataset, buckets)?.split(split_ratio)?;
            evaluate(&training, &testing)?
        }
    };

    if let Ok(accuracy) = counts.accuracy() {
        tracing::info!(accuracy, tested = counts.total(), "hold-out evaluation done");
    }
    Ok(counts)
}

/// Evaluates each of the `k` folds independently, in parallel.
pub fn cross_validate(
    dataset: &Dataset,
    k: usize,
    discretizer: Discretizer,
) -> Result<CrossValidation> {
    if k < 2 || k > dataset.len() {
        return Err(BayesError::InvalidParameter {
            name: "fold count",
            value: k.to_string(),
        });
    }

    let folds = match discretizer {
        Discretizer::MeanDistance => (0..k)
            .into_par_iter()
            .map(|i| {
                let (training, testing) = dataset.fold(i, k)?;
                let (training, testing) = discretize_by_means(&training, &testing)?;
                evaluate_fold(i, &training, &testing)
            })
            .collect::<Result<Vec<_>>>()?,
        Discretizer::Quantile { buckets } => {
            let bucketed = quantile_all(dataset, buckets)?;
            (0..k)
                .into_par_iter()
                .map(|i| {
                    let (training, testing) = bucketed.fold(i, k)?;
                    evaluate_fold(i, &training, &testing)
                })
                .collect::<Result<Vec<_>>>()?
        }
    };

    Ok(CrossValidation { folds })
}

fn evaluate_fold(
    fold: usize,
    training: &DiscreteSet,
    testing: &DiscreteSet,
) -> Result<ConfusionCounts> {
    let counts = evaluate(training, testing)?;
    if let Ok(accuracy) = counts.accuracy() {
        tracing::info!(fold, accuracy, tested = counts.total(), "fold evaluated");
    }
    Ok(counts)
}

/// Fits class means on `training` only and applies them to both sets.
fn discretize_by_means(
    training: &Dataset,
    testing: &Dataset,
) -> Result<(DiscreteSet, DiscreteSet)> {
    let means = ClassMeans::fit(training)?;
    Ok((means.transform(training)?, means.transform(testing)?))
}

fn quantile_all(dataset: &Dataset, buckets: usize) -> Result<DiscreteSet> {
    tracing::warn!(
        buckets,
        "quantile buckets are computed over all rows, testing rows included"
    );
    quantile_transform(buckets, dataset)
}
