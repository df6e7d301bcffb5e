use anyhow::{Context, Result};
use clap::Parser;
use discourse_etl::{init_tracing_once, DiscourseETL, Platform, TableFormat, TopicConfig};
use std::path::PathBuf;

/// Normalize a platform export, flag topic-relevant posts, rank authors by engagement
/// and write the flat tables under `--out`.
#[derive(Parser, Debug)]
#[command(name = "discourse-etl", version, about)]
struct Cli {
    /// Source platform: x (twitter) or tiktok
    #[arg(long, short = 'p', default_value = "x")]
    platform: Platform,

    /// Topic file: JSON {"hashtags": [...], "phrases": [...]} or a plain list
    /// (lines starting with '#' are hashtags). Defaults to the Finance Bill 2024 preset.
    #[arg(long, short = 't')]
    topics: Option<PathBuf>,

    /// Output directory
    #[arg(long, short = 'o', default_value = "data/processed_data")]
    out: PathBuf,

    /// Table format: csv, tsv or jsonl
    #[arg(long, short = 'f', default_value = "csv")]
    format: TableFormat,

    /// Keep only the top N ranked authors in the influencer table
    #[arg(long)]
    top: Option<usize>,

    /// Prefix for exported file names (defaults to the platform name)
    #[arg(long)]
    prefix: Option<String>,

    /// Skip records that carry no text
    #[arg(long)]
    require_text: bool,

    /// Hide the progress bar
    #[arg(long)]
    no_progress: bool,

    /// Input files or directories (.json, .jsonl, .ndjson, optionally .zst)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> Result<()> {
    init_tracing_once();
    let cli = Cli::parse();

    let topic = match &cli.topics {
        Some(path) => TopicConfig::from_file(path)?,
        None => TopicConfig::finance_bill_2024(),
    };

    let mut etl = DiscourseETL::new()
        .platform(cli.platform)
        .inputs(&cli.inputs)
        .out_dir(&cli.out)
        .topic(topic)
        .table_format(cli.format)
        .top_n(cli.top)
        .require_text(cli.require_text)
        .progress(!cli.no_progress);
    if let Some(prefix) = cli.prefix {
        etl = etl.file_prefix(prefix);
    }

    let (outcome, written) = etl.run_and_export()?;
    for path in &written {
        eprintln!("wrote {}", path.display());
    }

    let summary = serde_json::to_string_pretty(&outcome.summary()).context("serialize summary")?;
    println!("{summary}");
    Ok(())
}
