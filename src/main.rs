use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;

use icu_timeseries::{
    CsvSubjectSource, DirectoryEpisodeSink, EpisodeExtractor, ExtractionConfig, ReferencePaths,
    ReferenceTables, SamplingConfig, SeriesFormat, create_decompensation,
};

#[derive(Parser, Debug)]
#[command(name = "icu-timeseries", version, about = "ICU episode extraction and task sampling")]
struct Cli {
    /// Worker threads for --parallel runs (defaults to the number of CPUs)
    #[arg(long, global = true)]
    threads: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Extract per-episode time series from subject directories
    Extract(ExtractArgs),
    /// Create data for the decompensation prediction task
    Decompensation(DecompensationArgs),
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Csv,
    Parquet,
}

impl From<FormatArg> for SeriesFormat {
    fn from(value: FormatArg) -> Self {
        match value {
            FormatArg::Csv => Self::Csv,
            FormatArg::Parquet => Self::Parquet,
        }
    }
}

#[derive(Args, Debug)]
struct ExtractArgs {
    /// Directory containing subject sub-directories
    subjects_root: PathBuf,
    /// Directory where episode files are written (may equal subjects_root)
    output_root: PathBuf,
    /// CSV mapping ITEMID to VARIABLE
    #[arg(long)]
    variable_map: PathBuf,
    /// CSV of plausible ranges per VARIABLE
    #[arg(long)]
    variable_ranges: Option<PathBuf>,
    /// Directory holding D_ITEMS.csv and D_LABITEMS.csv
    #[arg(long)]
    descriptive_dir: Option<PathBuf>,
    /// Hours of slack around each stay's INTIME and OUTTIME
    #[arg(long, default_value_t = 1.0)]
    boundary_tolerance: f64,
    /// Also write episode{N}_timeseries_all.csv
    #[arg(long)]
    event_log: bool,
    /// Format of the episode series files
    #[arg(long, value_enum, default_value_t = FormatArg::Csv)]
    format: FormatArg,
    /// Process subjects in parallel
    #[arg(long)]
    parallel: bool,
}

#[derive(Args, Debug)]
struct DecompensationArgs {
    /// Path to root folder containing train and test sets
    root_path: PathBuf,
    /// Directory where the created data should be stored
    output_path: PathBuf,
    /// Hours between sample times
    #[arg(long, default_value_t = 1.0)]
    sample_rate: f64,
    /// Samples at or before this many hours are dropped
    #[arg(long, default_value_t = 4.0)]
    shortest_length: f64,
    /// Hours ahead within which death makes a sample positive
    #[arg(long, default_value_t = 24.0)]
    future_time_interval: f64,
    /// Seed of the train shuffle
    #[arg(long, default_value_t = 49297)]
    seed: u64,
    /// Process subjects in parallel
    #[arg(long)]
    parallel: bool,
}

fn run_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let mut paths = ReferencePaths::new(&args.variable_map);
    if let Some(ranges) = args.variable_ranges {
        paths = paths.with_variable_ranges(ranges);
    }
    if let Some(dir) = args.descriptive_dir {
        paths = paths.with_descriptive_dir(dir);
    }
    let reference = ReferenceTables::load(&paths).context("Failed to load reference tables")?;

    let config = ExtractionConfig::new()
        .with_boundary_tolerance(args.boundary_tolerance)
        .with_event_log(args.event_log)
        .with_series_format(args.format.into())
        .with_parallel(args.parallel);

    let source = CsvSubjectSource::new(&args.subjects_root, config.timestamps.clone())
        .with_context(|| format!("Cannot read subjects from {}", args.subjects_root.display()))?;
    let sink = DirectoryEpisodeSink::new(&args.output_root, config.series_format)
        .with_context(|| format!("Cannot create output directory {}", args.output_root.display()))?;

    let summary = EpisodeExtractor::new(&source, &sink, &reference, config).run()?;
    info!(
        "Done: {} episodes written, {} skipped, {} subjects skipped",
        summary.episodes_written, summary.episodes_skipped, summary.subjects_skipped
    );
    Ok(())
}

fn run_decompensation(args: DecompensationArgs) -> anyhow::Result<()> {
    let config = SamplingConfig::new()
        .with_sample_rate(args.sample_rate)
        .with_shortest_length(args.shortest_length)
        .with_future_time_interval(args.future_time_interval)
        .with_seed(args.seed)
        .with_parallel(args.parallel);

    let summaries = create_decompensation(&args.root_path, &args.output_path, config)
        .with_context(|| format!("Failed to create decompensation data in {}", args.output_path.display()))?;
    for summary in summaries {
        info!("{}: {} samples", summary.partition, summary.triples);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    // Setup logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let threads = cli.threads.unwrap_or_else(num_cpus::get).max(1);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .context("Failed to configure the worker pool")?;

    match cli.command {
        Command::Extract(args) => run_extract(args),
        Command::Decompensation(args) => run_decompensation(args),
    }
}
