//! Classify command - run files through the job queue.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use clap::{Args, ValueEnum};
use console::style;
use glob::glob;
use indicatif::{ProgressBar, ProgressStyle};
use serde::Serialize;
use tokio::runtime::Handle;
use tracing::{debug, warn};

use doclass_core::service::ERROR_PREFIX;
use doclass_core::{ClassificationService, IndustryRegistry, JobId, JobQueue, JobStatus};

/// Arguments for the classify command.
#[derive(Args)]
pub struct ClassifyArgs {
    /// Files, folders or glob patterns
    #[arg(required = true)]
    inputs: Vec<String>,

    /// Directory holding the trained model
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Number of parallel workers
    #[arg(short = 'j', long)]
    jobs: Option<usize>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Clone, Copy, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[derive(Serialize)]
struct FileResult {
    file: PathBuf,
    job_id: JobId,
    #[serde(flatten)]
    status: JobStatus,
}

pub async fn run(args: ClassifyArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let start = Instant::now();
    let mut config = super::config::load(config_path)?;
    if let Some(model_dir) = args.model_dir {
        config.classifier.model_dir = model_dir;
    }
    let workers = args.jobs.unwrap_or(config.jobs.workers);

    let registry = Arc::new(IndustryRegistry::with_defaults());
    let service = ClassificationService::from_config(&config, registry)?;
    let queue = JobQueue::new(Arc::new(service), workers, Handle::current());

    let mut submitted: Vec<(PathBuf, JobId)> = Vec::new();
    for input in &args.inputs {
        let path = PathBuf::from(input);
        if path.is_dir() {
            submitted.extend(queue.submit_folder(&path)?);
        } else if path.is_file() {
            submitted.push(submit_file(&queue, path)?);
        } else {
            let matches: Vec<PathBuf> = glob(input)?
                .filter_map(|r| r.ok())
                .filter(|p| p.is_file())
                .collect();
            if matches.is_empty() {
                warn!("No files match {}", input);
            }
            for path in matches {
                submitted.push(submit_file(&queue, path)?);
            }
        }
    }

    if submitted.is_empty() {
        anyhow::bail!("No files to classify");
    }

    let pb = ProgressBar::new(submitted.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")?
            .progress_chars("=>-"),
    );

    let mut results = Vec::with_capacity(submitted.len());
    for (file, job_id) in submitted {
        let status = queue
            .wait(job_id)
            .await
            .unwrap_or_else(|| JobStatus::Failed("job not found".to_string()));
        queue.take(job_id);
        debug!("{}: {:?}", file.display(), status);
        results.push(FileResult {
            file,
            job_id,
            status,
        });
        pb.inc(1);
    }
    pb.finish_and_clear();

    match args.format {
        OutputFormat::Text => print_text(&results, start),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&results)?),
        OutputFormat::Csv => {
            let mut writer = csv::Writer::from_writer(std::io::stdout());
            writer.write_record(["file", "job_id", "result"])?;
            for r in &results {
                writer.write_record([
                    r.file.display().to_string(),
                    r.job_id.to_string(),
                    result_text(&r.status).to_string(),
                ])?;
            }
            writer.flush()?;
        }
    }

    Ok(())
}

fn submit_file(queue: &JobQueue, path: PathBuf) -> anyhow::Result<(PathBuf, JobId)> {
    let bytes = std::fs::read(&path)?;
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let id = queue.submit(bytes, filename);
    Ok((path, id))
}

fn result_text(status: &JobStatus) -> &str {
    match status {
        JobStatus::Processing => "processing",
        JobStatus::Success(result) | JobStatus::Failed(result) => result,
    }
}

fn print_text(results: &[FileResult], start: Instant) {
    let mut failed = 0;
    for r in results {
        let text = result_text(&r.status);
        if matches!(r.status, JobStatus::Failed(_)) || text.starts_with(ERROR_PREFIX) {
            failed += 1;
            println!("{}: {}", r.file.display(), style(text).red());
        } else {
            println!("{}: {}", r.file.display(), style(text).green());
        }
    }

    eprintln!();
    eprintln!(
        "{} Classified {} files in {:?}",
        style("✓").green(),
        results.len(),
        start.elapsed()
    );
    eprintln!(
        "   {} successful, {} failed",
        style(results.len() - failed).green(),
        style(failed).red()
    );
}
