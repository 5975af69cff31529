//! Time-domain waveform metrics
//!
//! One streaming pass over the samples plus a sorted-magnitude pass
//! for the quantile dynamic range. Empty input returns the canonical
//! silent result (all zeros, silence ratio 1) rather than failing.

use serde::Serialize;

use crate::config::MetricParams;
use crate::core::dsp::stats::quantile_sorted;

/// Scalar descriptors of the raw waveform.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
pub struct WaveformMetrics {
    pub mean: f64,
    pub rms: f64,
    pub variance: f64,
    pub peak: f64,
    pub true_peak: f64,
    pub crest_factor: f64,
    pub dynamic_range_p95_p5: f64,
    pub clipping_ratio: f64,
    pub silence_ratio: f64,
    pub zero_crossing_rate: f64,
}

impl WaveformMetrics {
    /// Canonical result for an empty signal.
    fn silent() -> Self {
        Self {
            mean: 0.0,
            rms: 0.0,
            variance: 0.0,
            peak: 0.0,
            true_peak: 0.0,
            crest_factor: 0.0,
            dynamic_range_p95_p5: 0.0,
            clipping_ratio: 0.0,
            silence_ratio: 1.0,
            zero_crossing_rate: 0.0,
        }
    }
}

/// Compute all time-domain metrics in one pass.
pub fn compute_waveform_metrics(samples: &[f32], params: &MetricParams) -> WaveformMetrics {
    if samples.is_empty() {
        return WaveformMetrics::silent();
    }

    let length = samples.len();
    let mut sum = 0.0f64;
    let mut sum_sq = 0.0f64;
    let mut peak = 0.0f64;
    let mut clipping_count = 0usize;
    let mut silence_count = 0usize;
    let mut zero_crossings = 0usize;

    // Crossing counted on a strict sign flip; exact-zero samples do
    // not reset the reference sign.
    let mut reference_sign = 0i8;

    for &value in samples {
        let value = value as f64;
        let abs_value = value.abs();
        sum += value;
        sum_sq += value * value;
        if abs_value > peak {
            peak = abs_value;
        }
        if abs_value >= params.clipping_threshold {
            clipping_count += 1;
        }
        if abs_value <= params.silence_threshold {
            silence_count += 1;
        }

        let sign = if value > 0.0 {
            1i8
        } else if value < 0.0 {
            -1i8
        } else {
            0i8
        };
        if sign != 0 {
            if reference_sign != 0 && sign != reference_sign {
                zero_crossings += 1;
            }
            reference_sign = sign;
        }
    }

    let mean = sum / length as f64;
    let variance = (sum_sq / length as f64 - mean * mean).max(0.0);
    let rms = (sum_sq / length as f64).max(0.0).sqrt();
    let crest_factor = if rms > 1e-12 { peak / rms } else { 0.0 };

    let mut sorted_abs: Vec<f64> = samples.iter().map(|&v| (v as f64).abs()).collect();
    sorted_abs.sort_by(|a, b| a.total_cmp(b));
    let dynamic_range = quantile_sorted(&sorted_abs, 0.95) - quantile_sorted(&sorted_abs, 0.05);

    WaveformMetrics {
        mean,
        rms,
        variance,
        peak,
        true_peak: estimate_true_peak(samples, params.true_peak_oversample),
        crest_factor,
        dynamic_range_p95_p5: dynamic_range,
        clipping_ratio: clipping_count as f64 / length as f64,
        silence_ratio: silence_count as f64 / length as f64,
        zero_crossing_rate: zero_crossings as f64 / (length - 1).max(1) as f64,
    }
}

/// Oversampled peak estimate via linear interpolation between adjacent
/// samples; `oversample` of 1 degenerates to the sample peak.
fn estimate_true_peak(samples: &[f32], oversample: usize) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let oversample = oversample.clamp(1, 16);
    let mut true_peak = (samples[0] as f64).abs();
    for pair in samples.windows(2) {
        let left = pair[0] as f64;
        let right = pair[1] as f64;
        true_peak = true_peak.max(left.abs()).max(right.abs());
        for step in 1..oversample {
            let ratio = step as f64 / oversample as f64;
            let interpolated = left * (1.0 - ratio) + right * ratio;
            true_peak = true_peak.max(interpolated.abs());
        }
    }
    true_peak
}
