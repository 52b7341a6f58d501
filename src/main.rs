//! Word Search Benchmark CLI
//!
//! `run` benchmarks the corpora and writes the result table; `aggregate`
//! turns a result table into mean times and a markdown chart.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use word_search_bench::aggregate::{aggregate_table, render_aggregate_csv};
use word_search_bench::config::{default_worker_counts, DEFAULT_CORPORA, DEFAULT_REPETITIONS, DEFAULT_TARGET};
use word_search_bench::report::{render_markdown, summary_lines};
use word_search_bench::sink::JsonSink;
use word_search_bench::{BenchConfig, CsvSink, DeviceClass, Orchestrator, ResultSink};

/// Serial vs. thread-pooled vs. GPU word counting benchmark
#[derive(Parser, Debug)]
#[command(name = "word-search-bench")]
#[command(about = "Times word counting over text corpora on CPU and GPU", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Benchmark every strategy on every corpus
    Run(RunArgs),

    /// Aggregate a result table into mean times
    Aggregate(AggregateArgs),
}

#[derive(clap::Args, Debug)]
struct RunArgs {
    /// Corpus files, benchmarked in the given order
    #[arg(value_name = "CORPUS")]
    corpora: Vec<PathBuf>,

    /// Word to count
    #[arg(short, long, default_value = DEFAULT_TARGET)]
    word: String,

    /// Timed runs per corpus and strategy
    #[arg(short, long, default_value_t = DEFAULT_REPETITIONS)]
    repetitions: usize,

    /// Thread-pool sizes, comma separated (default: 1,4,<all cores>)
    #[arg(short, long, value_delimiter = ',')]
    cores: Option<Vec<usize>>,

    /// OpenCL device class: gpu, cpu, accelerator or all
    #[arg(short, long, default_value = "gpu")]
    device: DeviceClass,

    /// Skip the GPU strategy
    #[arg(long)]
    no_gpu: bool,

    /// Result table path
    #[arg(short, long, default_value = "resultados_busca.csv")]
    output: PathBuf,

    /// Also write every result as JSON
    #[arg(long, value_name = "PATH")]
    json: Option<PathBuf>,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            corpora: Vec::new(),
            word: DEFAULT_TARGET.to_string(),
            repetitions: DEFAULT_REPETITIONS,
            cores: None,
            device: DeviceClass::Gpu,
            no_gpu: false,
            output: PathBuf::from("resultados_busca.csv"),
            json: None,
        }
    }
}

#[derive(clap::Args, Debug)]
struct AggregateArgs {
    /// Result table to read
    #[arg(short, long, default_value = "resultados_busca.csv")]
    input: PathBuf,

    /// Aggregate table to write
    #[arg(short, long, default_value = "medias_aggregadas.csv")]
    output: PathBuf,

    /// Markdown report with a mean-time chart
    #[arg(short, long, default_value = "medias_desempenho.md")]
    report: PathBuf,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logger
    if cli.verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Word Search Benchmark v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Some(Commands::Run(args)) => run(args),
        Some(Commands::Aggregate(args)) => aggregate(args),
        None => run(RunArgs::default()),
    }
}

fn run(args: RunArgs) -> Result<()> {
    let config = BenchConfig::builder()
        .target(args.word)
        .repetitions(args.repetitions)
        .worker_counts(&args.cores.unwrap_or_else(default_worker_counts))
        .device_class(args.device)
        .gpu_enabled(!args.no_gpu)
        .build()?;

    let corpora = if args.corpora.is_empty() {
        DEFAULT_CORPORA.iter().map(PathBuf::from).collect()
    } else {
        args.corpora
    };

    log::info!(
        "Searching for '{}' in {} corpora ({} runs each)",
        config.target(),
        corpora.len(),
        config.repetitions()
    );

    let report = Orchestrator::new(config).run(&corpora);

    if !report.skipped_corpora.is_empty() {
        log::warn!("{} corpora skipped", report.skipped_corpora.len());
    }

    CsvSink::new(&args.output).consume(&report.results)?;
    if let Some(path) = args.json {
        JsonSink::new(path).consume(&report.results)?;
    }

    for line in summary_lines(&report.results) {
        println!("{}", line);
    }

    Ok(())
}

fn aggregate(args: AggregateArgs) -> Result<()> {
    let input = std::fs::File::open(&args.input)
        .with_context(|| format!("Result table not found: {}", args.input.display()))?;
    let rows = aggregate_table(input)?;

    std::fs::write(&args.output, render_aggregate_csv(&rows))
        .with_context(|| format!("Failed to write {}", args.output.display()))?;
    log::info!("Aggregate table written to {}", args.output.display());

    std::fs::write(&args.report, render_markdown(&rows))
        .with_context(|| format!("Failed to write {}", args.report.display()))?;
    log::info!("Report written to {}", args.report.display());

    Ok(())
}
