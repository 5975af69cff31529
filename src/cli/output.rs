//! Terminal report formatting

use colorful::Colorful;

use crate::core::report::MetricsReport;

fn db_label(value: f64) -> String {
    format!("{:.2} dB", value)
}

/// Render a report as a sectioned terminal summary.
pub fn format_report(report: &MetricsReport, verbose: bool) -> String {
    let mut out = String::new();

    let title = report.file_name.as_deref().unwrap_or("<buffer>");
    out.push_str(&format!(
        "{}\n  {} samples @ {} Hz, {:.2}s\n\n",
        title.to_string().bold(),
        report.sample_count,
        report.audio.sample_rate,
        report.audio.duration_seconds
    ));

    let audio = &report.audio.metrics;
    out.push_str(&format!("{}\n", "Waveform".cyan().bold()));
    out.push_str(&format!(
        "  rms {:.4}   peak {:.4}   true peak {:.4}   crest {:.2}\n",
        audio.rms, audio.peak, audio.true_peak, audio.crest_factor
    ));
    out.push_str(&format!(
        "  clipping {:.2}%   silence {:.2}%   zcr {:.4}   dr(p95-p5) {:.4}\n\n",
        audio.clipping_ratio * 100.0,
        audio.silence_ratio * 100.0,
        audio.zero_crossing_rate,
        audio.dynamic_range_p95_p5
    ));

    out.push_str(&format!("{}\n", "Spectrum".cyan().bold()));
    out.push_str(&format!(
        "  centroid {:.1} Hz (±{:.1})   rolloff {:.1} Hz   flatness {:.3}   entropy {:.3}\n",
        report.spectral.centroid_hz.mean,
        report.spectral.centroid_hz.std,
        report.spectral.rolloff_hz.mean,
        report.spectral.flatness.mean,
        report.spectral.entropy.mean
    ));
    out.push_str(&format!(
        "  dominant {:.1} Hz   slope {:.1} dB/decade\n",
        report.spectral.dominant_hz, report.spectral.slope_db_per_decade
    ));
    for band in &report.spectral.band_powers {
        out.push_str(&format!(
            "    {:>5.0}-{:<5.0} Hz  {:>6.1}%  {}\n",
            band.low_hz,
            band.high_hz,
            band.ratio * 100.0,
            db_label(band.db)
        ));
    }
    out.push('\n');

    out.push_str(&format!("{}\n", "Temporal".cyan().bold()));
    let periodicity = &report.temporal.periodicity;
    out.push_str(&format!(
        "  f0 proxy {:.1} Hz (corr {:.2})   onsets {} ({:.2}/s)   change points {}\n",
        periodicity.fundamental_hz,
        periodicity.best_correlation,
        report.temporal.onsets.onset_count,
        report.temporal.onsets.onset_rate_hz,
        report.temporal.onsets.change_point_count
    ));

    if let Some(speech) = &report.speech {
        out.push_str(&format!(
            "  voiced {:.0}%   f0 {:.1} Hz (±{:.1})   jitter {:.4}   shimmer {:.4}\n",
            speech.pitch.voiced_ratio * 100.0,
            speech.pitch.mean_f0_hz,
            speech.pitch.f0_std_hz,
            speech.pitch.jitter_local,
            speech.pitch.shimmer_local
        ));
    }
    out.push('\n');

    if !report.modulation.degenerate {
        out.push_str(&format!("{}\n", "Modulation".cyan().bold()));
        out.push_str(&format!(
            "  dominant {:.2} Hz   low/high {:.2}\n\n",
            report.modulation.dominant_hz, report.modulation.low_high_ratio
        ));
    }

    out.push_str(&format!("{}\n", "Levels".cyan().bold()));
    out.push_str(&format!(
        "  loudness {}   true peak {}\n",
        db_label(report.standards.loudness_rms_dbfs),
        db_label(report.standards.true_peak_dbtp)
    ));

    if verbose {
        out.push_str(&format!("\n{}\n", "Spectrogram".cyan().bold()));
        out.push_str(&format!(
            "  {} frames   {} mel bands ({:.0}-{:.0} Hz)   {} mfcc coeffs\n",
            report.spectrogram.frame_count,
            report.spectrogram.mel_bands,
            report.spectrogram.mel_min_hz,
            report.spectrogram.mel_max_hz,
            report.spectrogram.mfcc_coeffs
        ));
        if let Some(bank) = &report.custom_filterbank {
            out.push_str(&format!(
                "  custom bank '{}': {} bands\n",
                bank.source_name, bank.band_count
            ));
        }
        let stats = &report.statistical;
        out.push_str(&format!(
            "  amplitude mean {:.4}  std {:.4}  skew {:.3}  kurtosis {:.3}\n",
            stats.mean, stats.std, stats.skewness, stats.kurtosis
        ));
    }

    for note in &report.availability {
        out.push_str(&format!(
            "\n{} {}: {}",
            "note".yellow(),
            note.section,
            note.reason
        ));
    }
    out.push('\n');

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;
    use crate::core::report::FeatureSelection;
    use crate::core::{Analyzer, Signal};

    #[test]
    fn test_format_report_contains_sections() {
        let samples: Vec<f32> = (0..8000)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 8000.0).sin())
            .collect();
        let signal = Signal::from_mono(&samples, 8000);
        let report = Analyzer::new(AnalysisConfig::default())
            .analyze(&signal, Some("tone.wav"), &FeatureSelection::default())
            .unwrap();
        let text = format_report(&report, true);
        assert!(text.contains("tone.wav"));
        assert!(text.contains("Waveform"));
        assert!(text.contains("Spectrum"));
        assert!(text.contains("mel bands"));
    }
}
