use std::path::Path;
use std::sync::{Arc, Mutex};

use sample_pipeline::export::SaveStatus;
use sample_pipeline::ingestion::read_sample_file;
use sample_pipeline::pipeline::{
    config_in_dir, Pipeline, PipelineConfig, PipelineObserver, PipelineOptions, Severity, Stage,
    StageContext, StageOutcome, StageStats,
};
use sample_pipeline::processing::VarianceConvention;
use sample_pipeline::PipelineError;

#[derive(Default)]
struct RecordingObserver {
    started: Mutex<Vec<Stage>>,
    completed: Mutex<Vec<(Stage, StageStats)>>,
    diagnostics: Mutex<Vec<(Stage, Severity)>>,
    skipped: Mutex<Vec<(Stage, Severity)>>,
    alerts: Mutex<Vec<(Stage, Severity)>>,
}

impl PipelineObserver for RecordingObserver {
    fn on_stage_started(&self, ctx: &StageContext) {
        self.started.lock().unwrap().push(ctx.stage);
    }

    fn on_diagnostic(&self, ctx: &StageContext, severity: Severity, _error: &PipelineError) {
        self.diagnostics.lock().unwrap().push((ctx.stage, severity));
    }

    fn on_stage_completed(&self, ctx: &StageContext, stats: StageStats) {
        self.completed.lock().unwrap().push((ctx.stage, stats));
    }

    fn on_stage_skipped(&self, ctx: &StageContext, severity: Severity, _error: &PipelineError) {
        self.skipped.lock().unwrap().push((ctx.stage, severity));
    }

    fn on_alert(&self, ctx: &StageContext, severity: Severity, _error: &PipelineError) {
        self.alerts.lock().unwrap().push((ctx.stage, severity));
    }
}

fn observed(
    config: PipelineConfig,
    alert_at_or_above: Severity,
) -> (Pipeline, Arc<RecordingObserver>) {
    let obs = Arc::new(RecordingObserver::default());
    let pipeline = Pipeline::with_options(
        config,
        PipelineOptions {
            observer: Some(obs.clone()),
            alert_at_or_above,
        },
    );
    (pipeline, obs)
}

fn write_lines(path: &Path, lines: &str) {
    std::fs::write(path, lines).unwrap();
}

#[test]
fn collect_process_analyze_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        report_path: Some(dir.path().join("report.json")),
        variance_convention: VarianceConvention::Sample,
        ..config_in_dir(dir.path())
    };
    let (pipeline, obs) = observed(config.clone(), Severity::Critical);

    let input = "10\n12\nabc\n11\n13\n12\n1000\n0\n-7\nend\n55\n";
    let collected = pipeline.collect(input.as_bytes());
    let report = collected.report().unwrap();
    assert_eq!(report.sample.values, vec![10, 12, 11, 13, 12, 1000, 0, -7]);
    assert_eq!(
        collected.saved(),
        Some(&SaveStatus::Written {
            path: config.raw_path.clone(),
            count: 8
        })
    );

    let processed = pipeline.process();
    let report = processed.report().unwrap();
    assert!((report.valid_mean - 1058.0 / 6.0).abs() < 1e-9);
    assert_eq!(report.valid_max, 1000);
    assert_eq!(report.valid_min, 10);
    assert_eq!(report.sanitized.substitute, 176);
    assert_eq!(report.sanitized.replacements, 2);
    assert_eq!(
        read_sample_file(&config.sanitized_path).unwrap().sample.values,
        vec![10, 12, 11, 13, 12, 1000, 176, 176]
    );

    let analyzed = pipeline.analyze();
    let report = analyzed.report().unwrap();
    assert_eq!(report.summary.count, 8);
    assert_eq!(report.summary.mean, 176.25);
    assert_eq!(report.summary.median, 12.5);
    assert_eq!(report.summary.amplitude(), 990);
    assert_eq!(report.outliers.removed, vec![1000]);
    assert_eq!(
        read_sample_file(&config.filtered_path).unwrap().sample.values,
        vec![10, 12, 11, 13, 12, 176, 176]
    );

    let report_text = std::fs::read_to_string(dir.path().join("report.json")).unwrap();
    let json: serde_json::Value = serde_json::from_str(&report_text).unwrap();
    assert_eq!(json["outliers"]["removed"], serde_json::json!([1000]));
    assert_eq!(json["variance_convention"], "sample");

    assert_eq!(
        *obs.started.lock().unwrap(),
        vec![Stage::Collect, Stage::Process, Stage::Analyze]
    );
    // "abc" during collection
    assert_eq!(
        *obs.diagnostics.lock().unwrap(),
        vec![(Stage::Collect, Severity::Warning)]
    );
    let completed = obs.completed.lock().unwrap().clone();
    assert_eq!(completed.len(), 3);
    assert_eq!(completed[2].1.output_values, 7);
    assert!(obs.skipped.lock().unwrap().is_empty());
}

#[test]
fn missing_raw_file_skips_process_and_names_collect() {
    let dir = tempfile::tempdir().unwrap();
    let (pipeline, obs) = observed(config_in_dir(dir.path()), Severity::Error);

    let outcome = pipeline.process();
    match outcome.skip_reason() {
        Some(PipelineError::MissingInput { producer, .. }) => assert_eq!(*producer, Stage::Collect),
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!pipeline.config().sanitized_path.exists());
    assert_eq!(
        *obs.skipped.lock().unwrap(),
        vec![(Stage::Process, Severity::Error)]
    );
    assert_eq!(*obs.alerts.lock().unwrap(), vec![(Stage::Process, Severity::Error)]);
}

#[test]
fn missing_input_message_points_to_the_previous_stage() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config_in_dir(dir.path()));

    let msg = pipeline.analyze().skip_reason().unwrap().to_string();
    assert!(msg.contains("not found"));
    assert!(msg.contains("run the process stage first"));
}

#[test]
fn run_processes_then_analyzes() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in_dir(dir.path());
    write_lines(&config.raw_path, "5\n-1\n7\n");
    let pipeline = Pipeline::new(config);

    let run = pipeline.run();
    assert_eq!(
        run.process.report().unwrap().sanitized.sample.values,
        vec![5, 6, 7]
    );
    let report = run.analyze.report().unwrap();
    assert_eq!(report.summary.count, 3);
    assert!(!report.outliers.has_outliers());
}

#[test]
fn run_skips_analyze_when_process_is_skipped() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in_dir(dir.path());
    // Left over from an earlier run; there is no raw file this time.
    write_lines(&config.sanitized_path, "5\n6\n7\n");
    let (pipeline, obs) = observed(config, Severity::Critical);

    let run = pipeline.run();
    assert!(run.process.is_skipped());
    match run.analyze.skip_reason() {
        Some(PipelineError::UpstreamIncomplete { producer, reason }) => {
            assert_eq!(*producer, Stage::Process);
            assert!(reason.contains("not found"));
        }
        other => panic!("unexpected outcome: {other:?}"),
    }
    assert!(!pipeline.config().filtered_path.exists());
    assert_eq!(
        *obs.skipped.lock().unwrap(),
        vec![(Stage::Process, Severity::Error), (Stage::Analyze, Severity::Error)]
    );
}

#[test]
fn run_skips_analyze_when_sanitized_output_was_not_saved() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        sanitized_path: dir.path().join("no_such_dir").join("sanitized.txt"),
        ..config_in_dir(dir.path())
    };
    write_lines(&config.raw_path, "4\n-1\n8\n");
    let pipeline = Pipeline::new(config);

    let run = pipeline.run();
    assert!(matches!(run.process.saved(), Some(SaveStatus::Failed { .. })));
    let msg = run.analyze.skip_reason().unwrap().to_string();
    assert!(msg.contains("process stage did not complete"));
    assert!(msg.contains("failed to write"));
}

#[test]
fn file_with_only_malformed_lines_is_empty_data() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in_dir(dir.path());
    write_lines(&config.raw_path, "abc\n\n1.5\n");
    let (pipeline, obs) = observed(config, Severity::Critical);

    let outcome = pipeline.process();
    assert!(matches!(
        outcome.skip_reason(),
        Some(PipelineError::EmptyData {
            stage: Stage::Process
        })
    ));
    assert_eq!(obs.diagnostics.lock().unwrap().len(), 2);
    assert_eq!(
        *obs.skipped.lock().unwrap(),
        vec![(Stage::Process, Severity::Warning)]
    );
    assert!(obs.alerts.lock().unwrap().is_empty());
}

#[test]
fn empty_collection_saves_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let pipeline = Pipeline::new(config_in_dir(dir.path()));

    let outcome = pipeline.collect("end\n".as_bytes());
    assert!(outcome.report().unwrap().sample.is_empty());
    assert_eq!(outcome.saved(), Some(&SaveStatus::NothingToSave));
    assert!(!pipeline.config().raw_path.exists());
}

#[test]
fn write_failure_keeps_the_in_memory_report() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        sanitized_path: dir.path().join("no_such_dir").join("sanitized.txt"),
        ..config_in_dir(dir.path())
    };
    write_lines(&config.raw_path, "4\n-1\n8\n");
    let (pipeline, obs) = observed(config, Severity::Critical);

    let outcome = pipeline.process();
    let report = outcome.report().unwrap();
    assert_eq!(report.sanitized.sample.values, vec![4, 6, 8]);
    assert!(matches!(outcome.saved(), Some(SaveStatus::Failed { .. })));
    assert_eq!(
        *obs.diagnostics.lock().unwrap(),
        vec![(Stage::Process, Severity::Error)]
    );
    assert_eq!(obs.completed.lock().unwrap().len(), 1);
}

#[test]
fn process_reads_csv_input_when_configured() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        raw_path: "tests/fixtures/shares.csv".into(),
        csv_column: Some("shares".to_string()),
        ..config_in_dir(dir.path())
    };
    let pipeline = Pipeline::new(config);

    let outcome = pipeline.process();
    let report = outcome.report().unwrap();
    assert_eq!(report.valid_mean, 17.5);
    assert_eq!(report.sanitized.sample.values, vec![10, 17, 25]);
    match &outcome {
        StageOutcome::Completed { rejected, .. } => assert_eq!(rejected.len(), 1),
        StageOutcome::Skipped(e) => panic!("unexpected skip: {e}"),
    }
}

#[test]
fn multiplier_from_config_changes_the_fences() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        outlier_multiplier: 0.2,
        ..config_in_dir(dir.path())
    };
    write_lines(&config.sanitized_path, "1\n2\n3\n4\n5\n6\n7\n8\n9\n100\n");
    let pipeline = Pipeline::new(config);

    let report = pipeline.analyze();
    let report = report.report().unwrap();
    assert_eq!(report.outliers.kept.values, vec![9]);
}

#[test]
fn csv_handoff_files_keep_every_collected_value() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        raw_path: dir.path().join("raw.csv"),
        sanitized_path: dir.path().join("sanitized.csv"),
        ..config_in_dir(dir.path())
    };
    let pipeline = Pipeline::new(config.clone());

    pipeline.collect("10\n20\n30\nend\n".as_bytes());
    assert_eq!(
        std::fs::read_to_string(&config.raw_path).unwrap(),
        "value\n10\n20\n30\n"
    );

    let processed = pipeline.process();
    let report = processed.report().unwrap();
    assert_eq!(report.count, 3);
    assert_eq!(report.sanitized.sample.values, vec![10, 20, 30]);

    let analyzed = pipeline.analyze();
    assert_eq!(analyzed.report().unwrap().summary.count, 3);
}

#[test]
fn csv_handoff_uses_the_configured_column_name() {
    let dir = tempfile::tempdir().unwrap();
    let config = PipelineConfig {
        raw_path: dir.path().join("raw.csv"),
        csv_column: Some("shares".to_string()),
        ..config_in_dir(dir.path())
    };
    let pipeline = Pipeline::new(config.clone());

    pipeline.collect("7\n-1\n9\nend\n".as_bytes());
    assert!(
        std::fs::read_to_string(&config.raw_path)
            .unwrap()
            .starts_with("shares\n")
    );
    let processed = pipeline.process();
    assert_eq!(
        processed.report().unwrap().sanitized.sample.values,
        vec![7, 8, 9]
    );
}
