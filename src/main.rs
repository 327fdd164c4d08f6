use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};

use spam_bayes::{Dataset, Discretizer, EvalConfig, Report};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum Method {
    /// Binarize each feature by the closer training class mean.
    Mean,
    /// Rank quantiles over the whole dataset (sees testing rows).
    Quantile,
}

#[derive(Parser)]
#[command(name = "spam-bayes", version, about = "Naive Bayes spam classifier")]
struct Cli {
    /// Headerless CSV: 57 features then a 0/1 label per row.
    data: PathBuf,

    /// Fraction of rows used for training in a hold-out run.
    #[arg(long, default_value = "0.66")]
    split: f64,

    /// Run k-fold cross-validation instead of a single hold-out split.
    #[arg(long)]
    folds: Option<usize>,

    /// Seed for the row shuffle.
    #[arg(long)]
    seed: Option<u64>,

    /// Keep rows in file order.
    #[arg(long)]
    no_shuffle: bool,

    #[arg(long, value_enum, default_value = "mean")]
    discretizer: Method,

    /// Bucket count for the quantile discretizer.
    #[arg(long, default_value = "2")]
    buckets: usize,
}

impl Cli {
    fn config(&self) -> EvalConfig {
        let discretizer = match self.discretizer {
            Method::Mean => Discretizer::MeanDistance,
            Method::Quantile => Discretizer::Quantile {
                buckets: self.buckets,
            },
        };

        EvalConfig {
            split_ratio: self.split,
            folds: self.folds,
            seed: self.seed,
            shuffle: !self.no_shuffle,
            discretizer,
        }
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let dataset = Dataset::from_path(&cli.data)
        .with_context(|| format!("failed to load {}", cli.data.display()))?;

    match spam_bayes::run(dataset, &cli.config()).context("evaluation failed")? {
        Report::Holdout(counts) => println!("{counts}"),
        Report::CrossValidation(report) => {
            for (i, fold) in report.folds.iter().enumerate() {
                println!("Fold {i}:\n{fold}\n");
            }
            println!("Total:\n{}", report.total());
            println!("Mean fold accuracy: {}", report.mean_accuracy()?);
        }
    }

    Ok(())
}
