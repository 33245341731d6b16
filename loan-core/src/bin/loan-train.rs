//! Loan Approval Trainer
//!
//! Reads the training CSV, derives the reference schema, fits the
//! gradient-boosted classifier and writes schema + model as one artifact.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;

use loan_core::constants::DEFAULT_MODEL_PATH;
use loan_core::dataset::TrainingData;
use loan_core::model::{GbdtConfig, GbdtTrainer, ModelArtifact};

#[derive(Parser, Debug)]
#[command(name = "loan-train", version, about = "Train the loan approval classifier")]
struct Args {
    /// Training CSV (must contain a Loan_Status column)
    #[arg(long, default_value = "model/data.csv")]
    data: PathBuf,

    /// Where to write the model artifact
    #[arg(long, default_value = DEFAULT_MODEL_PATH)]
    output: PathBuf,

    /// Number of boosting rounds
    #[arg(long, default_value_t = GbdtConfig::default().n_trees)]
    trees: usize,

    /// Maximum tree depth
    #[arg(long, default_value_t = GbdtConfig::default().max_depth)]
    max_depth: usize,

    /// Shrinkage applied to every leaf
    #[arg(long, default_value_t = GbdtConfig::default().learning_rate)]
    learning_rate: f64,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let data = TrainingData::from_path(&args.data)
        .with_context(|| format!("failed to load {}", args.data.display()))?;

    let config = GbdtConfig {
        n_trees: args.trees,
        max_depth: args.max_depth,
        learning_rate: args.learning_rate,
        ..Default::default()
    };
    log::info!("Training with {:?}", config);

    let model = GbdtTrainer::new(config)
        .fit(&data.features, &data.labels)
        .context("training failed")?;

    let artifact = ModelArtifact::new(data.schema, model)?;
    artifact
        .save(&args.output)
        .with_context(|| format!("failed to write {}", args.output.display()))?;

    log::info!(
        "Saved {} trees over {} columns (schema hash: {:08x}) to {}",
        artifact.model.tree_count(),
        artifact.schema.len(),
        artifact.schema_hash,
        args.output.display()
    );

    Ok(())
}
