// tests/export_test.rs
//
// CSV/JSON export: flattening paths, quoting, selection toggles, and
// the round-trip of leaf scalar fields.

use wavelens::config::AnalysisConfig;
use wavelens::core::{Analyzer, FeatureSelection, MetricsReport, Signal};
use wavelens::export::{
    build_export_model, build_metrics_csv, build_metrics_csv_capped, build_metrics_json,
    ExportSelection,
};
use wavelens::testgen::sine_wave;

fn report_with_features(selection: FeatureSelection) -> MetricsReport {
    let signal = Signal::from_mono(&sine_wave(8000, 440.0, 1.0, 0.7), 8000);
    Analyzer::new(AnalysisConfig::default())
        .analyze(&signal, Some("tone.wav"), &selection)
        .unwrap()
}

#[test]
fn csv_emits_section_metric_value_rows() {
    let report = report_with_features(FeatureSelection::default());
    let csv = build_metrics_csv(&report, &ExportSelection::default());
    let mut lines = csv.lines();
    assert_eq!(lines.next(), Some("section,metric,value"));

    let rms_row = csv
        .lines()
        .find(|line| line.starts_with("audio,rms,"))
        .expect("audio.rms row");
    let recovered: f64 = rms_row.split(',').nth(2).unwrap().parse().unwrap();
    assert!((recovered - report.audio.metrics.rms).abs() < 1e-12);
}

#[test]
fn csv_flattens_nested_band_rows() {
    let report = report_with_features(FeatureSelection::default());
    let csv = build_metrics_csv(&report, &ExportSelection::default());
    // band_powers is a list of records: dot-and-index-joined paths.
    assert!(csv.lines().any(|l| l.starts_with("spectral,band_powers.0.low_hz,")));
    assert!(csv.lines().any(|l| l.starts_with("spectral,band_powers.3.db,")));
}

#[test]
fn csv_row_cap_bounds_output() {
    let report = report_with_features(FeatureSelection::all());
    let capped = build_metrics_csv_capped(&report, &ExportSelection::default(), 50);
    assert!(capped.lines().count() <= 50);
}

#[test]
fn selection_excludes_unwanted_sections() {
    let report = report_with_features(FeatureSelection::default());
    let selection = ExportSelection {
        audio: false,
        speech: false,
        statistical: true,
        distributional: true,
    };
    let csv = build_metrics_csv(&report, &selection);
    assert!(!csv.lines().any(|l| l.starts_with("audio,")));
    assert!(!csv.lines().any(|l| l.starts_with("spectral,")));
    assert!(csv.lines().any(|l| l.starts_with("statistical,")));
    assert!(csv.lines().any(|l| l.starts_with("distributional,")));
}

#[test]
fn feature_arrays_export_when_selected() {
    let report = report_with_features(FeatureSelection::all());
    let model = build_export_model(&report, &ExportSelection::default());
    let features = model
        .get("sections")
        .and_then(|s| s.get("features"))
        .expect("features section");
    assert!(features.get("power").is_some());
    assert!(features.get("autocorrelation").is_some());

    let csv = build_metrics_csv(&report, &ExportSelection::default());
    assert!(csv.lines().any(|l| l.starts_with("features,power.0,")));
}

#[test]
fn json_model_parses_and_carries_metadata() {
    let report = report_with_features(FeatureSelection::default());
    let text = build_metrics_json(&report, &ExportSelection::default());
    let value: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(value["file_name"], "tone.wav");
    assert_eq!(value["sample_count"], 8000);
    assert!(value["sections"]["audio"]["rms"].is_number());
    assert!(value["sections"]["spectral"]["centroid_hz"]["mean"].is_number());
}

#[test]
fn unavailable_speech_section_carries_reason() {
    let signal = Signal::from_mono(&[0.1; 256], 8000);
    let report = Analyzer::new(AnalysisConfig::default())
        .analyze(&signal, None, &FeatureSelection::default())
        .unwrap();
    let model = build_export_model(&report, &ExportSelection::default());
    let speech = &model["sections"]["speech"];
    assert_eq!(speech["available"], false);
    assert!(speech["reason"].is_string());
}
