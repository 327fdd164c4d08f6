//! Turning continuous features into discrete symbols.
//!
//! [`ClassMeans`] is the default path: it is fitted on training rows only and
//! then applied unchanged to both training and testing rows. [`quantile_buckets`]
//! is the alternative, and it looks at the whole dataset at once, so bucket
//! edges see the testing rows.

use crate::dataset::{Dataset, DiscreteSet, LabeledSet, NOT_SPAM, SPAM};
use crate::error::{BayesError, Result};

/// Per-feature means of the spam and not-spam training rows.
#[derive(Debug, Clone, PartialEq)]
pub struct ClassMeans {
    spam: Vec<f64>,
    not_spam: Vec<f64>,
}

impl ClassMeans {
    /// Averages every feature column separately over the spam rows and over
    /// the not-spam rows of `training`.
    pub fn fit(training: &Dataset) -> Result<Self> {
        if training.is_empty() {
            return Err(BayesError::EmptyDataset);
        }
        let width = training.width();

        let mut sum_spam = vec![0.0; width];
        let mut sum_not_spam = vec![0.0; width];
        let mut count_spam = 0usize;
        let mut count_not_spam = 0usize;

        for (row, label) in training.iter() {
            let sums = if label == SPAM {
                count_spam += 1;
                &mut sum_spam
            } else {
                count_not_spam += 1;
                &mut sum_not_spam
            };
            for (sum, &value) in sums.iter_mut().zip(row) {
                *sum += value;
            }
        }

        if count_spam == 0 {
            return Err(BayesError::EmptyClass { label: SPAM });
        }
        if count_not_spam == 0 {
            return Err(BayesError::EmptyClass { label: NOT_SPAM });
        }

        sum_spam.iter_mut().for_each(|s| *s /= count_spam as f64);
        sum_not_spam.iter_mut().for_each(|s| *s /= count_not_spam as f64);

        tracing::debug!(
            width,
            count_spam,
            count_not_spam,
            "fitted class means on training rows"
        );

        Ok(ClassMeans {
            spam: sum_spam,
            not_spam: sum_not_spam,
        })
    }

    pub fn width(&self) -> usize {
        self.spam.len()
    }

    pub fn spam(&self) -> &[f64] {
        &self.spam
    }

    pub fn not_spam(&self) -> &[f64] {
        &self.not_spam
    }

    /// Replaces each value with 1 when it is at least as close to the spam
    /// mean as to the not-spam mean, 0 otherwise. Labels are carried over.
    pub fn transform(&self, set: &Dataset) -> Result<DiscreteSet> {
        let rows = set
            .rows()
            .iter()
            .map(|row| self.transform_row(row))
            .collect::<Result<Vec<_>>>()?;
        LabeledSet::new(rows, set.labels().to_vec())
    }

    pub fn transform_row(&self, row: &[f64]) -> Result<Vec<u32>> {
        if row.len() != self.width() {
            return Err(BayesError::ShapeMismatch {
                expected: self.width(),
                actual: row.len(),
            });
        }

        Ok(row
            .iter()
            .zip(self.spam.iter().zip(&self.not_spam))
            .map(|(&value, (&spam, &not_spam))| {
                if (value - spam).abs() > (value - not_spam).abs() {
                    0
                } else {
                    1
                }
            })
            .collect())
    }
}

/// Assigns each value of `column` to one of `buckets` equal-count buckets by
/// rank. Bucket `j` holds ranks `[j*n/B, (j+1)*n/B)`; equal values can end up
/// in different buckets depending on their sort order.
pub fn quantile_buckets(buckets: usize, column: &[f64]) -> Result<Vec<u32>> {
    if buckets == 0 {
        return Err(BayesError::InvalidParameter {
            name: "bucket count",
            value: buckets.to_string(),
        });
    }

    let n = column.len();
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| column[a].total_cmp(&column[b]));

    let mut assigned = vec![0u32; n];
    let mut lower = 0;
    for bucket in 0..buckets {
        let upper = (bucket + 1) * n / buckets;
        for &row in &order[lower..upper] {
            assigned[row] = bucket as u32;
        }
        lower = upper;
    }

    Ok(assigned)
}

/// Buckets every feature column of the whole dataset independently. Returns
/// a new set; `set` is left untouched.
pub fn quantile_transform(buckets: usize, set: &Dataset) -> Result<DiscreteSet> {
    let width = set.width();
    let mut rows: Vec<Vec<u32>> = (0..set.len()).map(|_| Vec::with_capacity(width)).collect();

    for j in 0..width {
        let column: Vec<f64> = set.rows().iter().map(|row| row[j]).collect();

        for (row, symbol) in rows.iter_mut().zip(quantile_buckets(buckets, &column)?) {
            row.push(symbol);
        }
    }

    LabeledSet::new(rows, set.labels().to_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_by_two() -> Dataset {
        LabeledSet::new(
            vec![vec![1.0, 5.0], vec![1.0, 7.0], vec![0.0, 2.0], vec![0.0, 0.0]],
            vec![1, 1, 0, 0],
        )
        .unwrap()
    }

    #[test]
    fn means_are_per_class() {
        let means = ClassMeans::fit(&two_by_two()).unwrap();
        assert_eq!(means.spam(), &[1.0, 6.0]);
        assert_eq!(means.not_spam(), &[0.0, 1.0]);
    }

    #[test]
    fn closer_to_spam_mean_becomes_one() {
        let means = ClassMeans::fit(&two_by_two()).unwrap();
        assert_eq!(means.transform_row(&[0.9, 0.5]).unwrap(), vec![1, 0]);
        assert_eq!(means.transform_row(&[0.1, 6.5]).unwrap(), vec![0, 1]);
    }

    #[test]
    fn ties_go_to_spam() {
        let means = ClassMeans::fit(&two_by_two()).unwrap();
        assert_eq!(means.transform_row(&[0.5, 3.5]).unwrap(), vec![1, 1]);
    }

    #[test]
    fn transform_is_binary_and_repeatable() {
        let set = two_by_two();
        let means = ClassMeans::fit(&set).unwrap();

        let first = means.transform(&set).unwrap();
        let second = means.transform(&set).unwrap();
        assert_eq!(first, second);
        assert!(first.rows().iter().flatten().all(|&s| s <= 1));
        assert_eq!(first.labels(), set.labels());
    }

    #[test]
    fn fit_requires_both_classes() {
        let only_spam = LabeledSet::new(vec![vec![1.0], vec![2.0]], vec![1, 1]).unwrap();
        assert!(matches!(
            ClassMeans::fit(&only_spam),
            Err(BayesError::EmptyClass { label: NOT_SPAM })
        ));

        let only_ham = LabeledSet::new(vec![vec![1.0]], vec![0]).unwrap();
        assert!(matches!(
            ClassMeans::fit(&only_ham),
            Err(BayesError::EmptyClass { label: SPAM })
        ));

        let empty = Dataset::new(Vec::new(), Vec::new()).unwrap();
        assert!(matches!(ClassMeans::fit(&empty), Err(BayesError::EmptyDataset)));
    }

    #[test]
    fn transform_checks_width() {
        let means = ClassMeans::fit(&two_by_two()).unwrap();
        assert!(matches!(
            means.transform_row(&[1.0]),
            Err(BayesError::ShapeMismatch { expected: 2, actual: 1 })
        ));
    }

    #[test]
    fn quantiles_split_by_rank() {
        let column = [0.4, 0.1, 0.9, 0.3, 0.7, 0.2];
        assert_eq!(
            quantile_buckets(3, &column).unwrap(),
            vec![1, 0, 2, 1, 2, 0]
        );
    }

    #[test]
    fn uneven_quantiles_stay_in_range() {
        let column: Vec<f64> = (0..10).map(f64::from).collect();
        let buckets = quantile_buckets(3, &column).unwrap();
        assert_eq!(buckets, vec![0, 0, 0, 1, 1, 1, 2, 2, 2, 2]);

        // More buckets than rows leaves some buckets empty.
        assert_eq!(quantile_buckets(4, &[5.0, 1.0]).unwrap(), vec![3, 1]);
        assert!(quantile_buckets(0, &column).is_err());
    }

    #[test]
    fn quantile_transform_leaves_input_alone() {
        let set = two_by_two();
        let before = set.clone();
        let bucketed = quantile_transform(2, &set).unwrap();

        assert_eq!(set, before);
        assert_eq!(bucketed.rows(), &[vec![1, 1], vec![1, 1], vec![0, 0], vec![0, 0]]);
    }
}
