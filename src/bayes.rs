use std::collections::{hash_map::Entry, HashMap};

use crate::dataset::{DiscreteSet, Label, NOT_SPAM, SPAM};
use crate::error::{BayesError, Result};

/// Fraction of `labels` that are spam.
pub fn prior(labels: &[Label]) -> Result<f64> {
    if labels.is_empty() {
        return Err(BayesError::EmptyDataset);
    }

    let spam = labels.iter().filter(|&&label| label == SPAM).count();
    Ok(spam as f64 / labels.len() as f64)
}

/// Memoized `P(feature == value | class)` estimates for one training set.
///
/// The cache borrows the training set it was built from, so it cannot outlive
/// it or be pointed at another fold. Each entry is computed on first query by
/// counting matching rows and never changes afterwards.
#[derive(Debug)]
pub struct LikelihoodCache<'a> {
    training: &'a DiscreteSet,
    width: usize,
    class_totals: [usize; 2],
    memory: HashMap<(Label, usize, u32), f64>,
}

impl<'a> LikelihoodCache<'a> {
    pub fn new(training: &'a DiscreteSet) -> Self {
        let class_totals = [
            training.class_count(NOT_SPAM),
            training.class_count(SPAM),
        ];

        LikelihoodCache {
            training,
            width: training.width(),
            class_totals,
            memory: HashMap::new(),
        }
    }

    /// Returns the fraction of `class` training rows whose `feature` equals
    /// `value`. A class with rows but no match yields 0.0; a class with no
    /// rows at all is an error.
    pub fn query(&mut self, feature: usize, value: u32, class: Label) -> Result<f64> {
        if feature >= self.width {
            return Err(BayesError::ShapeMismatch {
                expected: self.width,
                actual: feature + 1,
            });
        }

        match self.memory.entry((class, feature, value)) {
            Entry::Occupied(entry) => Ok(*entry.get()),
            Entry::Vacant(entry) => {
                let total = self
                    .class_totals
                    .get(class as usize)
                    .copied()
                    .unwrap_or(0);
                if total == 0 {
                    return Err(BayesError::EmptyClass { label: class });
                }

                // Count the rows of this class that have the value:
                let count = self
                    .training
                    .iter()
                    .filter(|&(row, label)| label == class && row[feature] == value)
                    .count();

                let likelihood = count as f64 / total as f64;
                Ok(*entry.insert(likelihood))
            }
        }
    }

    /// Features per training row; every scored sample must match it.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Number of memoized entries.
    pub fn len(&self) -> usize {
        self.memory.len()
    }

    pub fn is_empty(&self) -> bool {
        self.memory.is_empty()
    }
}

/// Posterior odds of spam over not-spam for a discretized `sample`.
///
/// Both sides get 1 added before dividing so that a zero likelihood on either
/// side cannot produce 0/0 or an infinite ratio.
pub fn score(cache: &mut LikelihoodCache<'_>, sample: &[u32], prior: f64) -> Result<f64> {
    if sample.len() != cache.width() {
        return Err(BayesError::ShapeMismatch {
            expected: cache.width(),
            actual: sample.len(),
        });
    }

    let mut numerator = prior;
    for (feature, &value) in sample.iter().enumerate() {
        numerator *= cache.query(feature, value, SPAM)?;
    }

    let mut denominator = 1.0 - prior;
    for (feature, &value) in sample.iter().enumerate() {
        denominator *= cache.query(feature, value, NOT_SPAM)?;
    }

    Ok((1.0 + numerator) / (1.0 + denominator))
}

/// Spam iff the odds are at least even.
pub fn classify(ratio: f64) -> Label {
    if ratio >= 1.0 {
        SPAM
    } else {
        NOT_SPAM
    }
}

/// A prior plus a likelihood cache, both taken from one discretized
/// training set.
#[derive(Debug)]
pub struct NaiveBayesClassifier<'a> {
    prior: f64,
    cache: LikelihoodCache<'a>,
}

impl<'a> NaiveBayesClassifier<'a> {
    pub fn train(training: &'a DiscreteSet) -> Result<Self> {
        let prior = prior(training.labels())?;
        tracing::info!(prior, rows = training.len(), "computed prior");

        Ok(NaiveBayesClassifier {
            prior,
            cache: LikelihoodCache::new(training),
        })
    }

    pub fn prior(&self) -> f64 {
        self.prior
    }

    pub fn cache(&self) -> &LikelihoodCache<'a> {
        &self.cache
    }

    pub fn score(&mut self, sample: &[u32]) -> Result<f64> {
        score(&mut self.cache, sample, self.prior)
    }

    /// Given a discretized sample, predicts whether it is spam:
    pub fn predict(&mut self, sample: &[u32]) -> Result<Label> {
        self.score(sample).map(classify)
    }
}
