//! Three-stage pipeline with file handoff.
//!
//! - **collect**: read integers from a reader until the stop word, save to `raw_path`.
//! - **process**: read `raw_path`, report valid-only statistics, replace invalid values with the
//!   truncated valid mean, save to `sanitized_path`.
//! - **analyze**: read `sanitized_path`, report a full summary, drop values outside
//!   `mean ± k·stddev`, save to `filtered_path`.
//!
//! Stage methods never return `Err`. Any failure that stops a stage becomes
//! [`StageOutcome::Skipped`]; non-fatal problems (rejected lines, failed writes) are reported to
//! the observer and carried in the outcome.
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use sample_pipeline::pipeline::{Pipeline, PipelineConfig, PipelineOptions, StdErrObserver};
//!
//! let pipeline = Pipeline::with_options(
//!     PipelineConfig::default(),
//!     PipelineOptions {
//!         observer: Some(Arc::new(StdErrObserver)),
//!         ..Default::default()
//!     },
//! );
//! let run = pipeline.run();
//! if let Some(report) = run.analyze.report() {
//!     println!("{report}");
//! }
//! ```

mod config;
mod observability;
mod report;

use std::fmt;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, PipelineResult};
use crate::export::{self, SaveStatus};
use crate::ingestion::{self, ParsedSample, RejectedLine};
use crate::types::Sample;

pub use config::PipelineConfig;
pub use observability::{
    severity_for_error, CompositeObserver, FileObserver, PipelineObserver, Severity, StageContext,
    StageStats, StdErrObserver, TracingObserver,
};
pub use report::{analyze_sample, process_sample, AnalyzeReport, CollectReport, ProcessReport};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Collect,
    Process,
    Analyze,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Collect => "collect",
            Self::Process => "process",
            Self::Analyze => "analyze",
        })
    }
}

/// Result of running one stage.
#[derive(Debug)]
pub enum StageOutcome<T> {
    /// The stage computed its report. Persistence may still have failed (see `saved`).
    Completed {
        report: T,
        /// Input lines that were skipped.
        rejected: Vec<RejectedLine>,
        saved: SaveStatus,
    },
    /// The stage did nothing; the reason says why.
    Skipped(PipelineError),
}

impl<T> StageOutcome<T> {
    /// The report, if the stage completed.
    pub fn report(&self) -> Option<&T> {
        match self {
            Self::Completed { report, .. } => Some(report),
            Self::Skipped(_) => None,
        }
    }

    /// Why the stage was skipped, if it was.
    pub fn skip_reason(&self) -> Option<&PipelineError> {
        match self {
            Self::Completed { .. } => None,
            Self::Skipped(reason) => Some(reason),
        }
    }

    /// Returns `true` if the stage was skipped.
    pub fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped(_))
    }

    /// Persistence outcome, if the stage completed.
    pub fn saved(&self) -> Option<&SaveStatus> {
        match self {
            Self::Completed { saved, .. } => Some(saved),
            Self::Skipped(_) => None,
        }
    }
}

/// Outcomes of [`Pipeline::run`].
#[derive(Debug)]
pub struct RunReport {
    pub process: StageOutcome<ProcessReport>,
    pub analyze: StageOutcome<AnalyzeReport>,
}

/// Observer wiring for a [`Pipeline`].
#[derive(Clone)]
pub struct PipelineOptions {
    /// Optional observer for logging/alerts.
    pub observer: Option<Arc<dyn PipelineObserver>>,
    /// Severity threshold at which `on_alert` is invoked.
    pub alert_at_or_above: Severity,
}

impl fmt::Debug for PipelineOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PipelineOptions")
            .field("observer_set", &self.observer.is_some())
            .field("alert_at_or_above", &self.alert_at_or_above)
            .finish()
    }
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            observer: None,
            alert_at_or_above: Severity::Critical,
        }
    }
}

/// Runs stages against the files named in a [`PipelineConfig`].
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: PipelineConfig,
    options: PipelineOptions,
}

impl Pipeline {
    /// Create a pipeline without an observer.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_options(config, PipelineOptions::default())
    }

    /// Create a pipeline with observer options.
    pub fn with_options(config: PipelineConfig, options: PipelineOptions) -> Self {
        Self { config, options }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Stage 1: read lines from `reader` until the stop word (or EOF) and save them.
    ///
    /// Malformed lines are rejected and reported. An empty collection completes with
    /// [`SaveStatus::NothingToSave`].
    pub fn collect<R: BufRead>(&self, reader: R) -> StageOutcome<CollectReport> {
        let ctx = self.context(Stage::Collect);
        self.started(&ctx);

        let parsed = match read_until_stop_word(reader, &self.config.stop_word) {
            Ok(parsed) => parsed,
            Err(e) => return self.skipped(&ctx, e),
        };
        self.report_rejected(&ctx, &parsed.rejected);

        let saved = self.save(&ctx, &parsed.sample);
        self.completed(
            &ctx,
            StageStats {
                input_values: parsed.sample.len(),
                output_values: parsed.sample.len(),
                rejected: parsed.rejected.len(),
            },
        );

        StageOutcome::Completed {
            report: CollectReport {
                sample: parsed.sample,
            },
            rejected: parsed.rejected,
            saved,
        }
    }

    /// Stage 2: valid-only statistics and sanitization of the raw file.
    pub fn process(&self) -> StageOutcome<ProcessReport> {
        let ctx = self.context(Stage::Process);
        self.started(&ctx);

        let parsed = match self.load(&ctx, &self.config.raw_path, Stage::Collect) {
            Ok(parsed) => parsed,
            Err(e) => return self.skipped(&ctx, e),
        };

        let report = process_sample(&parsed.sample, self.config.preview_len);
        let saved = self.save(&ctx, &report.sanitized.sample);
        self.completed(
            &ctx,
            StageStats {
                input_values: parsed.sample.len(),
                output_values: report.sanitized.sample.len(),
                rejected: parsed.rejected.len(),
            },
        );

        StageOutcome::Completed {
            report,
            rejected: parsed.rejected,
            saved,
        }
    }

    /// Stage 3: full summary and outlier removal on the sanitized file.
    ///
    /// When `report_path` is configured the report is also written as JSON; a failure there is
    /// only a diagnostic.
    pub fn analyze(&self) -> StageOutcome<AnalyzeReport> {
        let ctx = self.context(Stage::Analyze);
        self.started(&ctx);

        let parsed = match self.load(&ctx, &self.config.sanitized_path, Stage::Process) {
            Ok(parsed) => parsed,
            Err(e) => return self.skipped(&ctx, e),
        };

        let report = analyze_sample(
            &parsed.sample,
            &self.config.outlier_filter(),
            self.config.variance_convention,
            self.config.preview_len,
        );
        let saved = self.save(&ctx, &report.outliers.kept);

        if let Some(path) = &self.config.report_path {
            if let Err(e) = export::write_json_report(path, &report) {
                self.diagnostic(&ctx, &e);
            }
        }

        self.completed(
            &ctx,
            StageStats {
                input_values: parsed.sample.len(),
                output_values: report.outliers.kept_count(),
                rejected: parsed.rejected.len(),
            },
        );

        StageOutcome::Completed {
            report,
            rejected: parsed.rejected,
            saved,
        }
    }

    /// Process then analyze.
    ///
    /// Analyze only runs when process completed and saved its output. Otherwise it is skipped
    /// with [`PipelineError::UpstreamIncomplete`], so a sanitized file left by an earlier run is
    /// never reported as this run's result.
    pub fn run(&self) -> RunReport {
        let process = self.process();
        let upstream_failure = match &process {
            StageOutcome::Skipped(reason) => Some(reason.to_string()),
            StageOutcome::Completed {
                saved: SaveStatus::Failed { message, .. },
                ..
            } => Some(message.clone()),
            StageOutcome::Completed { .. } => None,
        };

        let analyze = match upstream_failure {
            None => self.analyze(),
            Some(reason) => {
                let ctx = self.context(Stage::Analyze);
                self.started(&ctx);
                self.skipped(
                    &ctx,
                    PipelineError::UpstreamIncomplete {
                        producer: Stage::Process,
                        reason,
                    },
                )
            }
        };

        RunReport { process, analyze }
    }

    fn context(&self, stage: Stage) -> StageContext {
        let (input, output) = match stage {
            Stage::Collect => (None, &self.config.raw_path),
            Stage::Process => (Some(&self.config.raw_path), &self.config.sanitized_path),
            Stage::Analyze => (Some(&self.config.sanitized_path), &self.config.filtered_path),
        };
        StageContext {
            stage,
            input: input.cloned(),
            output: output.clone(),
        }
    }

    /// Load a stage input. Missing files map to [`PipelineError::MissingInput`] naming the
    /// `producer` stage; an empty sample maps to [`PipelineError::EmptyData`].
    fn load(
        &self,
        ctx: &StageContext,
        path: &Path,
        producer: Stage,
    ) -> PipelineResult<ParsedSample> {
        let parsed = ingestion::load_sample(path, self.config.csv_column.as_deref())
            .map_err(|e| {
                if is_not_found(&e) {
                    PipelineError::MissingInput {
                        path: path.to_path_buf(),
                        producer,
                    }
                } else {
                    e
                }
            })?;
        self.report_rejected(ctx, &parsed.rejected);

        if parsed.sample.is_empty() {
            return Err(PipelineError::EmptyData { stage: ctx.stage });
        }
        Ok(parsed)
    }

    fn save(&self, ctx: &StageContext, sample: &Sample) -> SaveStatus {
        match export::save_sample(&ctx.output, sample, self.config.csv_column.as_deref()) {
            Ok(status) => status,
            Err(e) => {
                self.diagnostic(ctx, &e);
                SaveStatus::Failed {
                    path: ctx.output.clone(),
                    message: e.to_string(),
                }
            }
        }
    }

    fn report_rejected(&self, ctx: &StageContext, rejected: &[RejectedLine]) {
        for r in rejected {
            self.diagnostic(ctx, &PipelineError::from(r.clone()));
        }
    }

    fn started(&self, ctx: &StageContext) {
        if let Some(obs) = &self.options.observer {
            obs.on_stage_started(ctx);
        }
    }

    fn completed(&self, ctx: &StageContext, stats: StageStats) {
        if let Some(obs) = &self.options.observer {
            obs.on_stage_completed(ctx, stats);
        }
    }

    fn diagnostic(&self, ctx: &StageContext, error: &PipelineError) {
        let sev = severity_for_error(error);
        if let Some(obs) = &self.options.observer {
            obs.on_diagnostic(ctx, sev, error);
            if sev >= self.options.alert_at_or_above {
                obs.on_alert(ctx, sev, error);
            }
        }
    }

    fn skipped<T>(&self, ctx: &StageContext, error: PipelineError) -> StageOutcome<T> {
        let sev = severity_for_error(&error);
        if let Some(obs) = &self.options.observer {
            obs.on_stage_skipped(ctx, sev, &error);
            if sev >= self.options.alert_at_or_above {
                obs.on_alert(ctx, sev, &error);
            }
        }
        StageOutcome::Skipped(error)
    }
}

/// Read lines until one equals `stop_word` (trimmed, case-insensitive) or the input ends.
fn read_until_stop_word<R: BufRead>(reader: R, stop_word: &str) -> PipelineResult<ParsedSample> {
    let mut lines = Vec::new();
    for line in reader.lines() {
        let line = line?;
        if line.trim().eq_ignore_ascii_case(stop_word.trim()) {
            break;
        }
        lines.push(line);
    }
    Ok(ingestion::parse_lines(lines))
}

fn is_not_found(e: &PipelineError) -> bool {
    match e {
        PipelineError::Io(err) => err.kind() == std::io::ErrorKind::NotFound,
        PipelineError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(io) => io.kind() == std::io::ErrorKind::NotFound,
            _ => false,
        },
        _ => false,
    }
}

/// Convenience for callers that want paths relative to one directory.
pub fn config_in_dir(dir: impl AsRef<Path>) -> PipelineConfig {
    let dir = dir.as_ref();
    let defaults = PipelineConfig::default();
    let join = |p: &PathBuf| dir.join(p);
    PipelineConfig {
        raw_path: join(&defaults.raw_path),
        sanitized_path: join(&defaults.sanitized_path),
        filtered_path: join(&defaults.filtered_path),
        ..defaults
    }
}
