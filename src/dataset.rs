use std::{io::Read, path::Path};

use csv::{ReaderBuilder, StringRecord, Trim};
use rand::{seq::SliceRandom, Rng};

use crate::error::{BayesError, Result};

/// Number of feature columns in a spambase row. The label is field 58.
pub const NUM_FEATURES: usize = 57;

/// Class label: 0 is not-spam, 1 is spam.
pub type Label = u8;

pub const NOT_SPAM: Label = 0;
pub const SPAM: Label = 1;

/// Rows of features paired with one label each.
///
/// Before discretization the features are `f64`, afterwards they are `u32`
/// symbols; see [`Dataset`] and [`DiscreteSet`].
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledSet<T> {
    rows: Vec<Vec<T>>,
    labels: Vec<Label>,
}

pub type Dataset = LabeledSet<f64>;
pub type DiscreteSet = LabeledSet<u32>;

impl<T: Clone> LabeledSet<T> {
    /// Every label must be 0 or 1 and every row must have the width of the
    /// first one.
    pub fn new(rows: Vec<Vec<T>>, labels: Vec<Label>) -> Result<Self> {
        if rows.len() != labels.len() {
            return Err(BayesError::ShapeMismatch {
                expected: rows.len(),
                actual: labels.len(),
            });
        }
        if let Some(&label) = labels.iter().find(|&&l| l != NOT_SPAM && l != SPAM) {
            return Err(BayesError::InvalidParameter {
                name: "label",
                value: label.to_string(),
            });
        }

        let width = rows.first().map_or(0, Vec::len);
        if let Some(row) = rows.iter().find(|row| row.len() != width) {
            return Err(BayesError::ShapeMismatch {
                expected: width,
                actual: row.len(),
            });
        }

        Ok(LabeledSet { rows, labels })
    }

    /// Features per row; 0 for an empty set.
    pub fn width(&self) -> usize {
        self.rows.first().map_or(0, Vec::len)
    }

    pub fn rows(&self) -> &[Vec<T>] {
        &self.rows
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[T], Label)> {
        self.rows
            .iter()
            .zip(self.labels.iter())
            .map(|(row, &label)| (row.as_slice(), label))
    }

    /// How many rows carry `label`.
    pub fn class_count(&self, label: Label) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }

    /// Reorders rows (and their labels) uniformly at random.
    pub fn shuffle<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let mut order: Vec<usize> = (0..self.len()).collect();
        order.shuffle(rng);
        *self = self.select(order);
    }

    /// Splits into `(training, testing)`: the first `floor(ratio * len)` rows
    /// train, the rest test.
    pub fn split(&self, ratio: f64) -> Result<(Self, Self)> {
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(BayesError::InvalidParameter {
                name: "split ratio",
                value: ratio.to_string(),
            });
        }

        let cutoff = (ratio * self.len() as f64) as usize;
        Ok((self.select(0..cutoff), self.select(cutoff..self.len())))
    }

    /// Partitions into `(training, testing)` for fold `index` of `k`.
    ///
    /// Each fold tests on `len / k` consecutive rows; any remainder rows at the
    /// end always land in training.
    pub fn fold(&self, index: usize, k: usize) -> Result<(Self, Self)> {
        if k < 2 || k > self.len() {
            return Err(BayesError::InvalidParameter {
                name: "fold count",
                value: k.to_string(),
            });
        }
        if index >= k {
            return Err(BayesError::InvalidParameter {
                name: "fold index",
                value: index.to_string(),
            });
        }

        let fold_size = self.len() / k;
        let start = index * fold_size;
        let end = start + fold_size;

        let training = self.select((0..start).chain(end..self.len()));
        let testing = self.select(start..end);
        Ok((training, testing))
    }

    fn select<I: IntoIterator<Item = usize>>(&self, indices: I) -> Self {
        let (rows, labels) = indices
            .into_iter()
            .map(|i| (self.rows[i].clone(), self.labels[i]))
            .unzip();
        LabeledSet { rows, labels }
    }
}

impl Dataset {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_path(path)?;
        Self::from_csv(reader)
    }

    /// Reads headerless rows of 57 decimal features followed by a `0`/`1` label.
    ///
    /// Blank lines are skipped, as the csv reader does everywhere, and do not
    /// count as rows; reported line numbers still refer to the file.
    pub fn from_reader<R: Read>(rdr: R) -> Result<Self> {
        let reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .from_reader(rdr);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut rows = Vec::new();
        let mut labels = Vec::new();

        for record in reader.records() {
            let record = record.map_err(record_error)?;
            let (row, label) = parse_record(&record)?;
            rows.push(row);
            labels.push(label);
        }

        Ok(LabeledSet { rows, labels })
    }
}

/// Undecodable bytes are a malformed row, not an I/O failure.
fn record_error(err: csv::Error) -> BayesError {
    if let csv::ErrorKind::Utf8 { pos, err: utf8 } = err.kind() {
        return BayesError::Parse {
            line: pos.as_ref().map_or(0, |p| p.line()),
            message: format!("field {} is not valid UTF-8", utf8.field()),
        };
    }
    BayesError::Csv(err)
}

fn parse_record(record: &StringRecord) -> Result<(Vec<f64>, Label)> {
    let line = record.position().map_or(0, |p| p.line());
    let parse_error = |message: String| BayesError::Parse { line, message };

    if record.len() != NUM_FEATURES + 1 {
        return Err(parse_error(format!(
            "expected {} fields, found {}",
            NUM_FEATURES + 1,
            record.len()
        )));
    }

    let mut row = Vec::with_capacity(NUM_FEATURES);
    for (j, field) in record.iter().take(NUM_FEATURES).enumerate() {
        let value: f64 = field
            .parse()
            .map_err(|_| parse_error(format!("feature {j} is not a number: {field:?}")))?;
        if !value.is_finite() {
            return Err(parse_error(format!("feature {j} is not finite: {field:?}")));
        }
        row.push(value);
    }

    let label = match &record[NUM_FEATURES] {
        "0" => NOT_SPAM,
        "1" => SPAM,
        other => return Err(parse_error(format!("label must be 0 or 1, found {other:?}"))),
    };

    Ok((row, label))
}
