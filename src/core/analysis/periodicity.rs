//! Periodicity: autocorrelation, pitch proxies, jitter and shimmer
//!
//! Whole-signal autocorrelation feeds the fundamental-frequency proxy;
//! a decimated frame-wise pass tracks pitch on active frames and
//! derives the cycle-to-cycle jitter/shimmer voice-quality measures.

use serde::Serialize;

/// Longest sample window scanned by whole-signal autocorrelation.
const AUTOCORR_SCAN_CAP: usize = 16_384;
/// Frame-wise pitch tracking evaluates at most this many frames.
const PITCH_FRAME_CAP: usize = 800;
/// Minimum normalized correlation for a frame to count as voiced.
const VOICED_CORRELATION_FLOOR: f64 = 0.3;

const PITCH_FRAME_SIZE: usize = 1024;
const PITCH_HOP_SIZE: usize = 256;

/// Normalized autocorrelation up to `max_lag` inclusive.
///
/// Each lag is a mean product over the overlapping region; the series
/// is then scaled by lag zero (or 1 if lag-zero energy is ~0), so a
/// non-degenerate signal always reads exactly 1.0 at lag 0.
pub fn autocorrelation(samples: &[f32], max_lag: usize) -> Vec<f64> {
    if samples.is_empty() {
        return Vec::new();
    }

    let lag_limit = max_lag.min(samples.len() - 1);
    let mut result = Vec::with_capacity(lag_limit + 1);
    for lag in 0..=lag_limit {
        let count = samples.len() - lag;
        let mut sum = 0.0f64;
        for index in 0..count {
            sum += samples[index] as f64 * samples[index + lag] as f64;
        }
        result.push(if count > 0 { sum / count as f64 } else { 0.0 });
    }

    let norm = if result[0].abs() > 1e-12 { result[0] } else { 1.0 };
    for value in &mut result {
        *value /= norm;
    }
    result
}

/// Whole-signal fundamental-frequency proxy.
#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct PeriodicityEstimate {
    pub fundamental_hz: f64,
    pub best_correlation: f64,
    pub lag_one_correlation: f64,
}

/// Estimate the dominant period within `min_hz..=max_hz` (typically
/// 40–500 Hz). Returns zeros when no lag in range beats a correlation
/// of 0, or when the signal is too short to cover the lag range.
pub fn estimate_fundamental(
    samples: &[f32],
    sample_rate: u32,
    min_hz: f64,
    max_hz: f64,
) -> PeriodicityEstimate {
    if samples.is_empty() || sample_rate == 0 || min_hz <= 0.0 || max_hz <= min_hz {
        return PeriodicityEstimate::default();
    }

    let scan = &samples[..samples.len().min(AUTOCORR_SCAN_CAP)];
    let lag_min = ((sample_rate as f64 / max_hz).floor() as usize).max(1);
    let lag_max = ((sample_rate as f64 / min_hz).ceil() as usize).min(scan.len().saturating_sub(1));
    if lag_max < lag_min {
        return PeriodicityEstimate::default();
    }

    let corr = autocorrelation(scan, lag_max);
    let lag_one_correlation = corr.get(1).copied().unwrap_or(0.0);

    let mut best_lag = 0usize;
    let mut best_correlation = 0.0f64;
    for lag in lag_min..=lag_max {
        if corr[lag] > best_correlation {
            best_correlation = corr[lag];
            best_lag = lag;
        }
    }

    let fundamental_hz = if best_lag > 0 && best_correlation > 0.0 {
        sample_rate as f64 / best_lag as f64
    } else {
        0.0
    };

    PeriodicityEstimate {
        fundamental_hz,
        best_correlation,
        lag_one_correlation,
    }
}

/// Frame-wise pitch tracking summary.
#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct PitchTrack {
    pub frames_evaluated: usize,
    pub active_frames: usize,
    pub voiced_frames: usize,
    pub voiced_ratio: f64,
    pub mean_f0_hz: f64,
    pub f0_std_hz: f64,
    pub jitter_local: f64,
    pub shimmer_local: f64,
}

/// Track pitch over 50–400 Hz on active frames.
///
/// Frames are decimated so at most ~800 are evaluated regardless of
/// length; a frame is active when its RMS clears an adaptive fraction
/// of the mean frame RMS, and voiced when its best in-range
/// autocorrelation is at least 0.3.
pub fn track_pitch(samples: &[f32], sample_rate: u32) -> PitchTrack {
    if samples.len() < PITCH_FRAME_SIZE || sample_rate == 0 {
        return PitchTrack::default();
    }

    let total_frames = (samples.len() - PITCH_FRAME_SIZE) / PITCH_HOP_SIZE + 1;
    let stride = (total_frames / PITCH_FRAME_CAP).max(1);

    // First pass: frame RMS for the adaptive activity threshold.
    let mut frame_rms = Vec::new();
    let mut frame = 0;
    while frame < total_frames {
        let start = frame * PITCH_HOP_SIZE;
        let slice = &samples[start..start + PITCH_FRAME_SIZE];
        let energy: f64 = slice.iter().map(|&v| v as f64 * v as f64).sum();
        frame_rms.push((energy / PITCH_FRAME_SIZE as f64).sqrt());
        frame += stride;
    }
    let frames_evaluated = frame_rms.len();
    if frames_evaluated == 0 {
        return PitchTrack::default();
    }
    let mean_rms = frame_rms.iter().sum::<f64>() / frames_evaluated as f64;
    let active_threshold = (mean_rms * 0.1).max(1e-5);

    let lag_min = ((sample_rate as f64 / 400.0).floor() as usize).max(1);
    let lag_max = ((sample_rate as f64 / 50.0).ceil() as usize).min(PITCH_FRAME_SIZE - 1);

    let mut periods = Vec::new();
    let mut amplitudes = Vec::new();
    let mut f0_values = Vec::new();
    let mut active_frames = 0usize;

    let mut frame = 0;
    let mut evaluated = 0;
    while frame < total_frames {
        let rms = frame_rms[evaluated];
        evaluated += 1;
        let start = frame * PITCH_HOP_SIZE;
        frame += stride;

        if rms < active_threshold {
            continue;
        }
        active_frames += 1;

        let slice = &samples[start..start + PITCH_FRAME_SIZE];
        let corr = autocorrelation(slice, lag_max);
        let upper = lag_max.min(corr.len().saturating_sub(1));
        let mut best_corr = 0.0f64;
        for lag in lag_min..=upper {
            if corr[lag] > best_corr {
                best_corr = corr[lag];
            }
        }
        if best_corr < VOICED_CORRELATION_FLOOR {
            continue;
        }
        // Lag multiples of a harmonic tone correlate within float
        // noise of each other; take the shortest lag within tolerance
        // of the peak so the track does not flip octaves per frame.
        let mut best_lag = 0usize;
        for lag in lag_min..=upper {
            if corr[lag] >= best_corr * 0.99 {
                best_lag = lag;
                break;
            }
        }
        if best_lag == 0 {
            continue;
        }
        let f0 = sample_rate as f64 / best_lag as f64;
        if !(50.0..=400.0).contains(&f0) {
            continue;
        }

        periods.push(best_lag as f64 / sample_rate as f64);
        amplitudes.push(rms);
        f0_values.push(f0);
    }

    let voiced_frames = f0_values.len();
    let voiced_ratio = voiced_frames as f64 / frames_evaluated as f64;
    let (mean_f0_hz, f0_std_hz) = crate::core::dsp::stats::mean_std(&f0_values);

    PitchTrack {
        frames_evaluated,
        active_frames,
        voiced_frames,
        voiced_ratio,
        mean_f0_hz,
        f0_std_hz,
        jitter_local: relative_consecutive_delta(&periods),
        shimmer_local: relative_consecutive_delta(&amplitudes),
    }
}

/// Mean absolute consecutive difference divided by the mean value;
/// needs at least two entries, otherwise 0.
fn relative_consecutive_delta(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let mean = values.iter().sum::<f64>() / values.len() as f64;
    if mean.abs() < 1e-12 {
        return 0.0;
    }
    let delta_sum: f64 = values.windows(2).map(|w| (w[1] - w[0]).abs()).sum();
    delta_sum / (values.len() - 1) as f64 / mean
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sine(sample_rate: u32, hz: f64, seconds: f64, amplitude: f32) -> Vec<f32> {
        let count = (sample_rate as f64 * seconds) as usize;
        (0..count)
            .map(|i| {
                amplitude
                    * (2.0 * std::f64::consts::PI * hz * i as f64 / sample_rate as f64).sin() as f32
            })
            .collect()
    }

    #[test]
    fn test_lag_zero_is_exactly_one() {
        let samples = sine(8000, 220.0, 0.25, 0.7);
        let corr = autocorrelation(&samples, 100);
        assert!((corr[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_alternating_signal_negative_at_lag_one() {
        let samples: Vec<f32> = (0..256).map(|i| if i % 2 == 0 { 1.0 } else { -1.0 }).collect();
        let corr = autocorrelation(&samples, 4);
        assert!(corr[1] < 0.0);
        assert!((corr[0] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_energy_signal_normalizes_by_one() {
        let corr = autocorrelation(&[0.0; 64], 8);
        assert!(corr.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_fundamental_estimate_finds_tone() {
        // Slight decay breaks the exact tie between lag multiples of a
        // perfectly periodic tone, keeping the scan at one period.
        let count = 8000usize;
        let samples: Vec<f32> = (0..count)
            .map(|i| {
                let decay = 1.0 - 0.2 * i as f64 / count as f64;
                (decay * 0.8 * (2.0 * std::f64::consts::PI * 100.0 * i as f64 / 8000.0).sin())
                    as f32
            })
            .collect();
        let estimate = estimate_fundamental(&samples, 8000, 40.0, 500.0);
        assert!((estimate.fundamental_hz - 100.0).abs() < 5.0);
        assert!(estimate.best_correlation > 0.8);
    }

    #[test]
    fn test_fundamental_zero_for_silence() {
        let estimate = estimate_fundamental(&[0.0; 4096], 8000, 40.0, 500.0);
        assert_eq!(estimate.fundamental_hz, 0.0);
    }

    #[test]
    fn test_pitch_track_steady_tone_low_jitter() {
        let samples = sine(8000, 120.0, 2.0, 0.8);
        let track = track_pitch(&samples, 8000);
        assert!(track.voiced_frames > 0);
        assert!((track.mean_f0_hz - 120.0).abs() < 8.0);
        assert!(track.jitter_local < 0.05);
        assert!(track.shimmer_local < 0.05);
        assert!(track.voiced_ratio > 0.8);
    }

    #[test]
    fn test_pitch_track_silence_has_no_voiced_frames() {
        let track = track_pitch(&vec![0.0; 16_000], 8000);
        assert_eq!(track.voiced_frames, 0);
        assert_eq!(track.mean_f0_hz, 0.0);
    }

    #[test]
    fn test_pitch_track_frame_cap() {
        let samples = sine(8000, 120.0, 60.0, 0.5);
        let track = track_pitch(&samples, 8000);
        assert!(track.frames_evaluated <= 2 * PITCH_FRAME_CAP);
    }
}
