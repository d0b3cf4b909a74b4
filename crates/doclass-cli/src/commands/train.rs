//! Train command - fit the classifier on a freshly generated corpus.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use doclass_core::{
    ClassifierSpec, DocumentClassifier, IndustryRegistry, TextClassifier, TrainParams,
    TrainingReport,
};

/// Arguments for the train command.
#[derive(Args)]
pub struct TrainArgs {
    /// Number of synthetic documents to generate
    #[arg(short = 'n', long, env = "NUM_SAMPLES")]
    num_samples: Option<usize>,

    /// Passes over the training split
    #[arg(long, env = "EPOCHS")]
    epochs: Option<usize>,

    /// Documents per gradient step
    #[arg(long, env = "BATCH_SIZE")]
    batch_size: Option<usize>,

    /// SGD step size
    #[arg(long)]
    learning_rate: Option<f32>,

    /// Industry whose document types are generated
    #[arg(short, long)]
    industry: Option<String>,

    /// Base model preset to start from
    #[arg(long)]
    base_model: Option<String>,

    /// Directory the trained model is written to
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Seed for a reproducible corpus
    #[arg(long)]
    seed: Option<u64>,

    /// Generate clean documents without scanning noise
    #[arg(long)]
    no_noise: bool,

    /// Report format
    #[arg(short, long, value_enum, default_value = "text")]
    format: ReportFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Text,
    Json,
}

pub async fn run(args: TrainArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let config = super::config::load(config_path)?;

    let mut spec = ClassifierSpec::from(&config.classifier);
    if let Some(industry) = args.industry {
        spec = spec.with_industry(industry);
    }
    if let Some(base_model) = args.base_model {
        spec.base_model = base_model;
    }

    let mut params = TrainParams::from(&config.training);
    if let Some(n) = args.num_samples {
        params.num_samples = n;
    }
    if let Some(epochs) = args.epochs {
        params.epochs = epochs;
    }
    if let Some(batch_size) = args.batch_size {
        params.batch_size = batch_size;
    }
    if let Some(lr) = args.learning_rate {
        params.learning_rate = lr;
    }
    if args.seed.is_some() {
        params.seed = args.seed;
    }
    if args.no_noise {
        params.add_noise = false;
    }

    let output_dir = args.output.unwrap_or(config.classifier.model_dir);
    info!(
        "Training {} classifier on {} samples for {} epochs",
        spec.industry, params.num_samples, params.epochs
    );

    let registry = Arc::new(IndustryRegistry::with_defaults());
    let mut classifier = TextClassifier::new(spec, registry, None).with_output_dir(output_dir);
    if classifier.outcome().is_failed() {
        anyhow::bail!("{}", classifier.outcome());
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?,
    );
    pb.set_message(format!("Training on {} samples", params.num_samples));
    pb.enable_steady_tick(Duration::from_millis(100));

    let report = tokio::task::spawn_blocking(move || classifier.train(&params)).await?;
    pb.finish_and_clear();
    let report = report?;

    match args.format {
        ReportFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        ReportFormat::Text => print_report(&report, start.elapsed()),
    }

    Ok(())
}

fn print_report(report: &TrainingReport, elapsed: Duration) {
    println!(
        "{} Trained on {} documents ({} held out) in {:.1?}",
        style("✓").green(),
        report.train_samples,
        report.eval_samples,
        elapsed
    );
    println!("   Classes: {}", report.classes.join(", "));
    println!();

    for m in &report.epochs {
        let marker = if m.epoch == report.best_epoch { "*" } else { " " };
        let eval = match (m.eval_loss, m.eval_accuracy) {
            (Some(loss), Some(acc)) => format!("eval loss {loss:.4}  accuracy {:.1}%", acc * 100.0),
            _ => "no eval split".to_string(),
        };
        println!(
            " {} epoch {:>3}  train loss {:.4}  {}",
            style(marker).green().bold(),
            m.epoch,
            m.train_loss,
            eval
        );
    }

    println!();
    println!(
        "{} Model saved to {}",
        style("✓").green(),
        style(report.artifact_dir.display()).cyan()
    );
}
