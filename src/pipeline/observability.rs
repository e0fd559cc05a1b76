use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use crate::error::PipelineError;

use super::Stage;

/// Severity classification used for observer callbacks and alerting thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Informational event.
    Info,
    /// Warning-level event (a skipped line, an empty stage).
    Warning,
    /// Error-level event (stage skipped on missing input, persistence failed).
    Error,
    /// Critical error (typically I/O failures while reading).
    Critical,
}

/// Context about one stage run.
#[derive(Debug, Clone)]
pub struct StageContext {
    pub stage: Stage,
    /// Upstream file, if the stage reads one.
    pub input: Option<PathBuf>,
    /// File the stage persists to.
    pub output: PathBuf,
}

/// Counts reported when a stage completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StageStats {
    /// Values read (after dropping rejected lines).
    pub input_values: usize,
    /// Values in the stage's output sample.
    pub output_values: usize,
    /// Lines or cells that failed to parse.
    pub rejected: usize,
}

/// Observer interface for stage outcomes.
///
/// Implementors can record metrics, logs, or trigger alerts. Every callback defaults to a no-op.
pub trait PipelineObserver: Send + Sync {
    /// Called before a stage reads anything.
    fn on_stage_started(&self, _ctx: &StageContext) {}

    /// Called for non-fatal problems: rejected input lines, failed writes.
    fn on_diagnostic(&self, _ctx: &StageContext, _severity: Severity, _error: &PipelineError) {}

    /// Called when a stage finishes its computation.
    fn on_stage_completed(&self, _ctx: &StageContext, _stats: StageStats) {}

    /// Called when a stage gives up (missing input, no data, unreadable input).
    fn on_stage_skipped(&self, _ctx: &StageContext, _severity: Severity, _error: &PipelineError) {}

    /// Called, in addition to the callbacks above, when a severity meets the alert threshold.
    fn on_alert(&self, _ctx: &StageContext, _severity: Severity, _error: &PipelineError) {}
}

/// Severity for an error, used by stages before invoking an observer.
pub fn severity_for_error(e: &PipelineError) -> Severity {
    match e {
        PipelineError::Io(_) => Severity::Critical,
        PipelineError::Csv(err) => match err.kind() {
            ::csv::ErrorKind::Io(_) => Severity::Critical,
            _ => Severity::Error,
        },
        PipelineError::ParseError { .. } => Severity::Warning,
        PipelineError::EmptyData { .. } => Severity::Warning,
        PipelineError::MissingInput { .. } => Severity::Error,
        PipelineError::UpstreamIncomplete { .. } => Severity::Error,
        PipelineError::Write { .. } => Severity::Error,
        PipelineError::Config { .. } => Severity::Error,
        PipelineError::SchemaMismatch { .. } => Severity::Error,
        PipelineError::Report(_) => Severity::Error,
    }
}

/// An observer that fans out callbacks to a list of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn PipelineObserver>>,
}

impl CompositeObserver {
    /// Create a new composite observer from a list of observers.
    pub fn new(observers: Vec<Arc<dyn PipelineObserver>>) -> Self {
        Self { observers }
    }
}

impl fmt::Debug for CompositeObserver {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompositeObserver")
            .field("observers_len", &self.observers.len())
            .finish()
    }
}

impl PipelineObserver for CompositeObserver {
    fn on_stage_started(&self, ctx: &StageContext) {
        for o in &self.observers {
            o.on_stage_started(ctx);
        }
    }

    fn on_diagnostic(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        for o in &self.observers {
            o.on_diagnostic(ctx, severity, error);
        }
    }

    fn on_stage_completed(&self, ctx: &StageContext, stats: StageStats) {
        for o in &self.observers {
            o.on_stage_completed(ctx, stats);
        }
    }

    fn on_stage_skipped(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        for o in &self.observers {
            o.on_stage_skipped(ctx, severity, error);
        }
    }

    fn on_alert(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        for o in &self.observers {
            o.on_alert(ctx, severity, error);
        }
    }
}

/// Logs stage events to stderr.
#[derive(Debug, Default)]
pub struct StdErrObserver;

impl PipelineObserver for StdErrObserver {
    fn on_diagnostic(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        eprintln!("[{}][{:?}] {}", ctx.stage, severity, error);
    }

    fn on_stage_completed(&self, ctx: &StageContext, stats: StageStats) {
        eprintln!(
            "[{}][ok] in={} out={} rejected={} output={}",
            ctx.stage,
            stats.input_values,
            stats.output_values,
            stats.rejected,
            ctx.output.display()
        );
    }

    fn on_stage_skipped(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        eprintln!("[{}][skipped][{:?}] {}", ctx.stage, severity, error);
    }

    fn on_alert(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        eprintln!("[ALERT][{}][{:?}] {}", ctx.stage, severity, error);
    }
}

/// Forwards stage events to `tracing`.
#[derive(Debug, Default)]
pub struct TracingObserver;

impl PipelineObserver for TracingObserver {
    fn on_stage_started(&self, ctx: &StageContext) {
        tracing::info!(
            stage = %ctx.stage,
            input = ?ctx.input,
            output = %ctx.output.display(),
            "stage started"
        );
    }

    fn on_diagnostic(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        match severity {
            Severity::Info => tracing::info!(stage = %ctx.stage, "{error}"),
            Severity::Warning => tracing::warn!(stage = %ctx.stage, "{error}"),
            Severity::Error | Severity::Critical => {
                tracing::error!(stage = %ctx.stage, "{error}")
            }
        }
    }

    fn on_stage_completed(&self, ctx: &StageContext, stats: StageStats) {
        tracing::info!(
            stage = %ctx.stage,
            input_values = stats.input_values,
            output_values = stats.output_values,
            rejected = stats.rejected,
            "stage completed"
        );
    }

    fn on_stage_skipped(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        tracing::warn!(stage = %ctx.stage, severity = ?severity, "stage skipped: {error}");
    }

    fn on_alert(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        tracing::error!(stage = %ctx.stage, severity = ?severity, alert = true, "{error}");
    }
}

/// Appends stage events to a local log file.
#[derive(Debug)]
pub struct FileObserver {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileObserver {
    /// Create a file observer that appends events to `path`.
    ///
    /// Writes are best-effort; failures to open/write the log file are ignored.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            lock: Mutex::new(()),
        }
    }

    fn append_line(&self, line: &str) {
        let _guard = self.lock.lock().ok();
        if let Ok(mut f) = OpenOptions::new().create(true).append(true).open(&self.path) {
            let _ = writeln!(f, "{line}");
        }
    }
}

impl PipelineObserver for FileObserver {
    fn on_stage_started(&self, ctx: &StageContext) {
        self.append_line(&format!("{} start stage={}", unix_ts(), ctx.stage));
    }

    fn on_diagnostic(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        self.append_line(&format!(
            "{} diagnostic severity={:?} stage={} err={}",
            unix_ts(),
            severity,
            ctx.stage,
            error
        ));
    }

    fn on_stage_completed(&self, ctx: &StageContext, stats: StageStats) {
        self.append_line(&format!(
            "{} ok stage={} in={} out={} rejected={} output={}",
            unix_ts(),
            ctx.stage,
            stats.input_values,
            stats.output_values,
            stats.rejected,
            ctx.output.display()
        ));
    }

    fn on_stage_skipped(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        self.append_line(&format!(
            "{} skipped severity={:?} stage={} err={}",
            unix_ts(),
            severity,
            ctx.stage,
            error
        ));
    }

    fn on_alert(&self, ctx: &StageContext, severity: Severity, error: &PipelineError) {
        self.append_line(&format!(
            "{} ALERT severity={:?} stage={} err={}",
            unix_ts(),
            severity,
            ctx.stage,
            error
        ));
    }
}

fn unix_ts() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}
