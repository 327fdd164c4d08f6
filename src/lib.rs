//! Spam classification with a hand-built categorical Naive Bayes model.
//!
//! Data flows one way: a [`Dataset`] is split into training and testing
//! subsets, a discretizer fitted on the training subset turns both into
//! symbols, and [`evaluate`] scores the testing subset into
//! [`ConfusionCounts`].

pub mod bayes;
pub mod dataset;
pub mod discretize;
pub mod error;
pub mod evaluate;
pub mod pipeline;

pub use bayes::{classify, prior, score, LikelihoodCache, NaiveBayesClassifier};
pub use dataset::{Dataset, DiscreteSet, Label, LabeledSet, NOT_SPAM, NUM_FEATURES, SPAM};
pub use discretize::{quantile_buckets, quantile_transform, ClassMeans};
pub use error::{BayesError, Result};
pub use evaluate::{evaluate, ConfusionCounts};
pub use pipeline::{cross_validate, holdout, run, CrossValidation, Discretizer, EvalConfig, Report};
