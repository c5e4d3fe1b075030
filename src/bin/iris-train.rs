//! Offline training command
//!
//! Loads the Iris table, holds out a stratified test set, fits the forest,
//! prints the evaluation and writes the model artifact.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use iris_serve::classifier::ForestParams;
use iris_serve::data::{DEFAULT_SEED, DEFAULT_TEST_FRACTION};
use iris_serve::training::{run_training, TrainingOptions, TrainingOutcome, DEFAULT_MODEL_PATH};

#[derive(Parser)]
#[command(name = "iris-train")]
#[command(version)]
#[command(about = "Train, evaluate and save the Iris random forest", long_about = None)]
struct Cli {
    /// Where to write the model artifact
    #[arg(short, long, env = "MODEL_OUTPUT_PATH", default_value = DEFAULT_MODEL_PATH)]
    output: PathBuf,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = DEFAULT_TEST_FRACTION)]
    test_size: f64,

    /// Seed for the split and the forest
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,

    /// Number of trees
    #[arg(long, default_value_t = 100)]
    n_trees: usize,

    /// Maximum tree depth (unlimited if omitted)
    #[arg(long)]
    max_depth: Option<usize>,

    /// Standardize features; the scaler is saved with the model
    #[arg(long)]
    normalize: bool,

    /// Print the full outcome as JSON instead of a text report
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "iris_serve=info,iris_train=info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();
    let options = TrainingOptions {
        output_path: cli.output,
        test_fraction: cli.test_size,
        seed: cli.seed,
        normalize: cli.normalize,
        params: ForestParams {
            n_trees: cli.n_trees,
            max_depth: cli.max_depth,
            seed: cli.seed,
            ..ForestParams::default()
        },
    };

    let (_, outcome) = run_training(&options).context("training pipeline failed")?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_report(&outcome);
    }
    Ok(())
}

fn print_report(outcome: &TrainingOutcome) {
    let report = &outcome.report;

    println!("Model saved to {}", outcome.model_path.display());
    println!("Normalized features: {}", outcome.normalized);
    println!(
        "Train/test rows: {}/{}",
        outcome.train_summary.n_samples, outcome.test_summary.n_samples
    );
    println!("Accuracy: {:.4}", report.accuracy);
    println!();
    println!("{:>14} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support");
    for class in &report.per_class {
        println!(
            "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            class.class_name, class.precision, class.recall, class.f1, class.support
        );
    }
    for (label, avg) in [("macro avg", &report.macro_avg), ("weighted avg", &report.weighted_avg)] {
        println!(
            "{:>14} {:>9.2} {:>9.2} {:>9.2} {:>9}",
            label, avg.precision, avg.recall, avg.f1, avg.support
        );
    }
    println!();
    println!("Confusion matrix (rows = truth):");
    for row in &report.confusion_matrix {
        println!("  {:?}", row);
    }
}
