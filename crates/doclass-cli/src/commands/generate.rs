//! Generate command - write a synthetic corpus to a file or stdout.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::PathBuf;

use clap::{Args, ValueEnum};
use console::style;
use serde::Serialize;
use tracing::info;

use doclass_core::{Corpus, IndustryRegistry, SyntheticDataFactory};

/// Arguments for the generate command.
#[derive(Args)]
pub struct GenerateArgs {
    /// Number of documents to generate
    #[arg(short = 'n', long, default_value_t = 10)]
    num_samples: usize,

    /// Industry whose document types are generated
    #[arg(short, long)]
    industry: Option<String>,

    /// Generate clean documents without scanning noise
    #[arg(long)]
    no_noise: bool,

    /// Seed for a reproducible corpus
    #[arg(long)]
    seed: Option<u64>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "jsonl")]
    format: CorpusFormat,

    /// Output file (stdout when omitted)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// List the registered industries and their labels, then exit
    #[arg(long)]
    list_industries: bool,
}

#[derive(Clone, Copy, ValueEnum)]
enum CorpusFormat {
    Jsonl,
    Csv,
}

#[derive(Serialize)]
struct Record<'a> {
    text: &'a str,
    label: &'a str,
}

pub async fn run(args: GenerateArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let config = super::config::load(config_path)?;
    let registry = IndustryRegistry::with_defaults();

    if args.list_industries {
        for industry in registry.industries() {
            println!(
                "{}: {}",
                style(industry).cyan().bold(),
                registry.labels(industry)?.join(", ")
            );
        }
        return Ok(());
    }

    let industry = args.industry.unwrap_or(config.classifier.industry);
    let add_noise = config.training.add_noise && !args.no_noise;

    let mut factory = SyntheticDataFactory::new(&registry, args.num_samples, add_noise, &industry)?;
    if let Some(seed) = args.seed.or(config.training.seed) {
        factory = factory.with_seed(seed);
    }
    let corpus = factory.generate()?;
    info!("Generated {} {} documents", corpus.len(), industry);

    match &args.output {
        Some(path) => {
            let mut out = BufWriter::new(File::create(path)?);
            write_corpus(&corpus, args.format, &mut out)?;
            out.flush()?;
            eprintln!(
                "{} Wrote {} documents to {}",
                style("✓").green(),
                corpus.len(),
                path.display()
            );
        }
        None => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            write_corpus(&corpus, args.format, &mut out)?;
            out.flush()?;
        }
    }

    Ok(())
}

fn write_corpus<W: Write>(corpus: &Corpus, format: CorpusFormat, out: &mut W) -> anyhow::Result<()> {
    match format {
        CorpusFormat::Jsonl => {
            for (text, label) in corpus.iter() {
                serde_json::to_writer(&mut *out, &Record { text, label })?;
                writeln!(out)?;
            }
        }
        CorpusFormat::Csv => {
            let mut writer = csv::Writer::from_writer(out);
            for (text, label) in corpus.iter() {
                writer.serialize(Record { text, label })?;
            }
            writer.flush()?;
        }
    }
    Ok(())
}
