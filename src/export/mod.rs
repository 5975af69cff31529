//! Report export: JSON emission and CSV flattening
//!
//! The serialized report is a tagged-variant tree (`serde_json::Value`)
//! walked with an explicit work stack — no recursion — and a hard row
//! cap, so flattening terminates in bounded time and size on any
//! report shape.

use serde_json::{json, Map, Value};

use crate::core::report::MetricsReport;

/// Hard cap on emitted CSV rows (header included).
pub const MAX_EXPORT_ROWS: usize = 200_000;

/// Which report sections the export should include. Feature arrays are
/// already gated at report construction, so they appear whenever
/// present.
#[derive(Debug, Clone, Copy)]
pub struct ExportSelection {
    pub audio: bool,
    pub speech: bool,
    pub statistical: bool,
    pub distributional: bool,
}

impl Default for ExportSelection {
    fn default() -> Self {
        Self {
            audio: true,
            speech: true,
            statistical: true,
            distributional: true,
        }
    }
}

/// Assemble the export model: top-level metadata plus the selected
/// sections keyed by name.
pub fn build_export_model(report: &MetricsReport, selection: &ExportSelection) -> Value {
    let full = serde_json::to_value(report).unwrap_or(Value::Null);
    let mut sections = Map::new();

    if selection.audio {
        for key in [
            "audio",
            "temporal",
            "spectral",
            "spectrogram",
            "custom_filterbank",
            "modulation",
            "spatial",
            "standards",
        ] {
            if let Some(section) = full.get(key) {
                if !section.is_null() {
                    sections.insert(key.to_string(), section.clone());
                }
            }
        }
    }
    if selection.speech {
        match full.get("speech") {
            Some(section) if !section.is_null() => {
                sections.insert("speech".to_string(), section.clone());
            }
            _ => {
                // Surface the reason instead of silently dropping the section.
                let reason = report
                    .availability
                    .iter()
                    .find(|note| note.section == "speech")
                    .map(|note| note.reason.clone());
                sections.insert(
                    "speech".to_string(),
                    json!({ "available": false, "reason": reason }),
                );
            }
        }
    }
    if selection.statistical {
        if let Some(section) = full.get("statistical") {
            sections.insert("statistical".to_string(), section.clone());
        }
    }
    if selection.distributional {
        if let Some(section) = full.get("distributional") {
            sections.insert("distributional".to_string(), section.clone());
        }
    }

    if let Some(features) = full.get("features") {
        if features.as_object().map(|m| !m.is_empty()).unwrap_or(false) {
            sections.insert("features".to_string(), features.clone());
        }
    }

    if !report.availability.is_empty() {
        if let Some(notes) = full.get("availability") {
            sections.insert("availability".to_string(), notes.clone());
        }
    }

    json!({
        "generated_at": report.generated_at,
        "file_name": report.file_name,
        "sample_count": report.sample_count,
        "sections": Value::Object(sections),
    })
}

/// Pretty JSON for the export model.
pub fn build_metrics_json(report: &MetricsReport, selection: &ExportSelection) -> String {
    let model = build_export_model(report, selection);
    serde_json::to_string_pretty(&model).unwrap_or_else(|_| "{}".to_string())
}

/// Quote a CSV field when it contains a comma, quote, or newline.
pub fn escape_csv_field(value: &str) -> String {
    if !value.contains(',') && !value.contains('"') && !value.contains('\n') {
        return value.to_string();
    }
    format!("\"{}\"", value.replace('"', "\"\""))
}

/// Flatten the export model to `(section, metric, value)` rows.
pub fn build_metrics_csv(report: &MetricsReport, selection: &ExportSelection) -> String {
    build_metrics_csv_capped(report, selection, MAX_EXPORT_ROWS)
}

pub fn build_metrics_csv_capped(
    report: &MetricsReport,
    selection: &ExportSelection,
    max_rows: usize,
) -> String {
    let model = build_export_model(report, selection);
    let mut rows: Vec<[String; 3]> = vec![[
        "section".to_string(),
        "metric".to_string(),
        "value".to_string(),
    ]];

    if let Some(sections) = model.get("sections").and_then(Value::as_object) {
        for (section_name, section) in sections {
            if rows.len() >= max_rows {
                break;
            }
            flatten_section(&mut rows, section_name, section, max_rows);
        }
    }

    rows.iter()
        .map(|row| {
            row.iter()
                .map(|field| escape_csv_field(field))
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Iterative flatten of one section's value tree. Children are pushed
/// in reverse so the emitted order matches the serialized order.
pub fn flatten_section(
    rows: &mut Vec<[String; 3]>,
    section_name: &str,
    value: &Value,
    max_rows: usize,
) {
    let mut stack: Vec<(String, &Value)> = vec![(String::new(), value)];

    while let Some((path, value)) = stack.pop() {
        if rows.len() >= max_rows {
            return;
        }
        match value {
            Value::Object(map) => {
                for (key, child) in map.iter().rev() {
                    let child_path = if path.is_empty() {
                        key.clone()
                    } else {
                        format!("{}.{}", path, key)
                    };
                    stack.push((child_path, child));
                }
            }
            Value::Array(items) => {
                for (index, child) in items.iter().enumerate().rev() {
                    let child_path = if path.is_empty() {
                        index.to_string()
                    } else {
                        format!("{}.{}", path, index)
                    };
                    stack.push((child_path, child));
                }
            }
            Value::Null => rows.push([section_name.to_string(), path, String::new()]),
            Value::Bool(b) => rows.push([section_name.to_string(), path, b.to_string()]),
            Value::Number(n) => rows.push([section_name.to_string(), path, n.to_string()]),
            Value::String(s) => rows.push([section_name.to_string(), path, s.clone()]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::core::report::FeatureSelection;
    use crate::core::{Analyzer, Signal};

    fn sample_report() -> MetricsReport {
        let samples: Vec<f32> = (0..8000)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 8000.0).sin())
            .collect();
        let signal = Signal::from_mono(&samples, 8000);
        Analyzer::new(AnalysisConfig::default())
            .analyze(&signal, Some("sine.wav"), &FeatureSelection::default())
            .unwrap()
    }

    #[test]
    fn test_escape_csv_field_rules() {
        assert_eq!(escape_csv_field("plain"), "plain");
        assert_eq!(escape_csv_field("a,b"), "\"a,b\"");
        assert_eq!(escape_csv_field("a\"b"), "\"a\"\"b\"");
        assert_eq!(escape_csv_field("a\nb"), "\"a\nb\"");
    }

    #[test]
    fn test_flatten_nested_paths() {
        let value = serde_json::json!({ "a": 1, "b": { "c": 2 }, "d": [3, 4] });
        let mut rows = Vec::new();
        flatten_section(&mut rows, "root", &value, 100);
        let metrics: Vec<&str> = rows.iter().map(|row| row[1].as_str()).collect();
        assert!(metrics.contains(&"a"));
        assert!(metrics.contains(&"b.c"));
        assert!(metrics.contains(&"d.0"));
        assert!(metrics.contains(&"d.1"));
    }

    #[test]
    fn test_flatten_respects_row_cap() {
        let big: Vec<u32> = (0..1000).collect();
        let value = serde_json::to_value(big).unwrap();
        let mut rows = Vec::new();
        flatten_section(&mut rows, "big", &value, 10);
        assert_eq!(rows.len(), 10);
    }

    #[test]
    fn test_csv_contains_audio_rms_row() {
        let report = sample_report();
        let csv = build_metrics_csv(&report, &ExportSelection::default());
        let row = csv
            .lines()
            .find(|line| line.starts_with("audio,rms,"))
            .expect("audio.rms row present");
        let value: f64 = row.split(',').nth(2).unwrap().parse().unwrap();
        assert!((value - report.audio.metrics.rms).abs() < 1e-12);
    }

    #[test]
    fn test_selection_toggles_sections() {
        let report = sample_report();
        let selection = ExportSelection {
            audio: true,
            speech: false,
            statistical: true,
            distributional: false,
        };
        let model = build_export_model(&report, &selection);
        let sections = model.get("sections").unwrap().as_object().unwrap();
        assert!(sections.contains_key("audio"));
        assert!(sections.contains_key("statistical"));
        assert!(!sections.contains_key("speech"));
        assert!(!sections.contains_key("distributional"));
    }

    #[test]
    fn test_json_round_trips_metadata() {
        let report = sample_report();
        let text = build_metrics_json(&report, &ExportSelection::default());
        let parsed: Value = serde_json::from_str(&text).unwrap();
        assert_eq!(
            parsed.get("file_name").and_then(Value::as_str),
            Some("sine.wav")
        );
        assert_eq!(
            parsed.get("sample_count").and_then(Value::as_u64),
            Some(8000)
        );
    }

    #[test]
    fn test_csv_reparse_recovers_numeric_string() {
        let report = sample_report();
        let csv = build_metrics_csv(&report, &ExportSelection::default());
        for line in csv.lines().skip(1).take(50) {
            // Unquoted three-column rows split cleanly.
            if !line.contains('"') {
                assert_eq!(line.split(',').count(), 3, "bad row: {line}");
            }
        }
    }
}
