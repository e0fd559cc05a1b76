use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use sample_pipeline::export::SaveStatus;
use sample_pipeline::pipeline::{
    CompositeObserver, FileObserver, Pipeline, PipelineConfig, PipelineObserver, PipelineOptions,
    Severity, StageOutcome, TracingObserver,
};
use sample_pipeline::processing::VarianceConvention;

#[derive(Parser, Debug)]
#[command(author, version, about = "Collect integers, repair invalid values and drop outliers")]
struct Args {
    /// JSON config file; flags below override its values
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Raw values file (collect output, process input)
    #[arg(long, global = true)]
    raw: Option<PathBuf>,

    /// Sanitized values file (process output, analyze input)
    #[arg(long, global = true)]
    sanitized: Option<PathBuf>,

    /// Outlier-free values file (analyze output)
    #[arg(long, global = true)]
    filtered: Option<PathBuf>,

    /// Also write the analyze report as JSON to this path
    #[arg(long, global = true)]
    report: Option<PathBuf>,

    /// Outlier fences at mean ± MULTIPLIER·stddev
    #[arg(long, global = true)]
    multiplier: Option<f64>,

    /// Variance convention for the analyze summary
    #[arg(long, global = true, value_enum)]
    variance: Option<VarianceArg>,

    /// Column to read when an input file is CSV
    #[arg(long, global = true)]
    csv_column: Option<String>,

    /// Append stage events to this log file
    #[arg(long, global = true)]
    log_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Read integers from stdin until the stop word and save them
    Collect,
    /// Report valid-only statistics and replace invalid values
    Process,
    /// Report the full summary and remove outliers
    Analyze,
    /// Process, then analyze
    Run,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum VarianceArg {
    Population,
    Sample,
}

impl From<VarianceArg> for VarianceConvention {
    fn from(v: VarianceArg) -> Self {
        match v {
            VarianceArg::Population => VarianceConvention::Population,
            VarianceArg::Sample => VarianceConvention::Sample,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;

    let mut observers: Vec<Arc<dyn PipelineObserver>> = vec![Arc::new(TracingObserver)];
    if let Some(path) = &args.log_file {
        observers.push(Arc::new(FileObserver::new(path)));
    }
    let pipeline = Pipeline::with_options(
        config,
        PipelineOptions {
            observer: Some(Arc::new(CompositeObserver::new(observers))),
            alert_at_or_above: Severity::Critical,
        },
    );

    match args.command {
        Command::Collect => {
            println!(
                "Enter integers, one per line. Type '{}' to finish.",
                pipeline.config().stop_word
            );
            let stdin = std::io::stdin();
            print_outcome("collect", &pipeline.collect(stdin.lock()), "process");
        }
        Command::Process => print_outcome("process", &pipeline.process(), "analyze"),
        Command::Analyze => print_outcome("analyze", &pipeline.analyze(), ""),
        Command::Run => {
            let run = pipeline.run();
            print_outcome("process", &run.process, "");
            print_outcome("analyze", &run.analyze, "");
        }
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<PipelineConfig, Box<dyn std::error::Error>> {
    let mut config = match &args.config {
        Some(path) => PipelineConfig::from_json_path(path)?,
        None => PipelineConfig::default(),
    };
    if let Some(p) = &args.raw {
        config.raw_path = p.clone();
    }
    if let Some(p) = &args.sanitized {
        config.sanitized_path = p.clone();
    }
    if let Some(p) = &args.filtered {
        config.filtered_path = p.clone();
    }
    if let Some(p) = &args.report {
        config.report_path = Some(p.clone());
    }
    if let Some(k) = args.multiplier {
        config.outlier_multiplier = k;
    }
    if let Some(v) = args.variance {
        config.variance_convention = v.into();
    }
    if let Some(c) = &args.csv_column {
        config.csv_column = Some(c.clone());
    }
    config.validate()?;
    Ok(config)
}

fn print_outcome<T: std::fmt::Display>(stage: &str, outcome: &StageOutcome<T>, next: &str) {
    println!("== {stage} ==");
    match outcome {
        StageOutcome::Completed { report, rejected, saved } => {
            for r in rejected {
                println!("  skipped invalid line {}: '{}'", r.line, r.raw);
            }
            println!("{report}");
            match saved {
                SaveStatus::Written { path, count } => {
                    println!("{count} value(s) saved to '{}'", path.display());
                    if !next.is_empty() {
                        println!("Run '{next}' to continue.");
                    }
                }
                SaveStatus::NothingToSave => println!("no data to save"),
                SaveStatus::Failed { path, message } => {
                    println!("could not save '{}': {message}", path.display())
                }
            }
        }
        StageOutcome::Skipped(reason) => println!("{reason}; nothing to do"),
    }
    println!();
}
