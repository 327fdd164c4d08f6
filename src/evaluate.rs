use std::{fmt, iter::Sum, ops::Add};

use crate::bayes::NaiveBayesClassifier;
use crate::dataset::{DiscreteSet, Label, SPAM};
use crate::error::{BayesError, Result};

/// Tally of predicted against true labels over a testing set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConfusionCounts {
    pub tp: usize,
    pub tn: usize,
    pub fp: usize,
    pub fn_: usize,
}

impl ConfusionCounts {
    pub fn record(&mut self, actual: Label, predicted: Label) {
        match (actual == SPAM, predicted == SPAM) {
            (true, true) => self.tp += 1,
            (false, false) => self.tn += 1,
            (false, true) => self.fp += 1,
            (true, false) => self.fn_ += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.tp + self.tn + self.fp + self.fn_
    }

    /// `(TP + TN) / total`; undefined for an empty tally.
    pub fn accuracy(&self) -> Result<f64> {
        match self.total() {
            0 => Err(BayesError::EmptyDataset),
            total => Ok((self.tp + self.tn) as f64 / total as f64),
        }
    }
}

impl Add for ConfusionCounts {
    type Output = ConfusionCounts;

    fn add(self, other: ConfusionCounts) -> ConfusionCounts {
        ConfusionCounts {
            tp: self.tp + other.tp,
            tn: self.tn + other.tn,
            fp: self.fp + other.fp,
            fn_: self.fn_ + other.fn_,
        }
    }
}

impl Sum for ConfusionCounts {
    fn sum<I: Iterator<Item = ConfusionCounts>>(iter: I) -> Self {
        iter.fold(ConfusionCounts::default(), Add::add)
    }
}

impl fmt::Display for ConfusionCounts {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "TP: {}", self.tp)?;
        writeln!(f, "TN: {}", self.tn)?;
        writeln!(f, "FP: {}", self.fp)?;
        write!(f, "FN: {}", self.fn_)?;
        if let Ok(accuracy) = self.accuracy() {
            write!(f, "\nAccuracy: {accuracy}")?;
        }
        Ok(())
    }
}

/// Trains on `training`, then classifies every row of `testing` with a single
/// prior and a single likelihood cache.
pub fn evaluate(training: &DiscreteSet, testing: &DiscreteSet) -> Result<ConfusionCounts> {
    let mut classifier = NaiveBayesClassifier::train(training)?;

    let mut counts = ConfusionCounts::default();
    for (sample, actual) in testing.iter() {
        counts.record(actual, classifier.predict(sample)?);
    }

    tracing::debug!(
        cached = classifier.cache().len(),
        tested = counts.total(),
        "evaluation pass finished"
    );

    Ok(counts)
}
