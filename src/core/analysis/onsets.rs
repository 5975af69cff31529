//! Onset and stationarity detection
//!
//! Flux-based onset picking over the frame-energy envelope with an
//! adaptive median + IQR threshold and a minimum inter-onset spacing,
//! plus a change-point count on the dB envelope as a stationarity
//! proxy.

use serde::Serialize;

use super::StftResult;
use crate::core::dsp::stats::{interquartile_range, mean_std, median};

const FLUX_THRESHOLD_FLOOR: f64 = 0.1;
const MIN_ONSET_SPACING_SECONDS: f64 = 0.05;
const CHANGE_POINT_DB: f64 = 6.0;

/// Onset statistics plus the stationarity change-point count.
#[derive(Debug, Clone, Serialize, Default)]
pub struct OnsetSummary {
    pub onset_count: usize,
    pub onset_rate_hz: f64,
    pub ioi_mean_seconds: f64,
    pub ioi_median_seconds: f64,
    pub ioi_cv: f64,
    pub change_point_count: usize,
    pub flux_threshold: f64,
}

/// Detect onsets and change points from an STFT's frame energies.
pub fn detect_onsets(stft: &StftResult) -> OnsetSummary {
    let frame_period = stft.frame_period_seconds();
    let frames = stft.power.frames();
    if frames.len() < 3 || frame_period <= 0.0 {
        return OnsetSummary::default();
    }

    let energies: Vec<f64> = frames
        .iter()
        .map(|frame| frame.iter().map(|&p| (p as f64).max(0.0)).sum())
        .collect();
    let energies_db: Vec<f64> = energies.iter().map(|&e| 10.0 * (e + 1e-12).log10()).collect();

    // Positive energy delta between consecutive frames.
    let flux: Vec<f64> = energies.windows(2).map(|w| (w[1] - w[0]).max(0.0)).collect();

    let threshold =
        (median(&flux) + 1.5 * interquartile_range(&flux)).max(FLUX_THRESHOLD_FLOOR);
    let min_spacing_frames = (MIN_ONSET_SPACING_SECONDS / frame_period).ceil() as usize;

    let mut onsets: Vec<usize> = Vec::new();
    for index in 1..flux.len().saturating_sub(1) {
        if flux[index] <= threshold {
            continue;
        }
        if flux[index] < flux[index - 1] || flux[index] < flux[index + 1] {
            continue;
        }
        if let Some(&last) = onsets.last() {
            if index - last < min_spacing_frames.max(1) {
                continue;
            }
        }
        onsets.push(index);
    }

    let duration = stft.duration_seconds.max(frame_period);
    let intervals: Vec<f64> = onsets
        .windows(2)
        .map(|w| (w[1] - w[0]) as f64 * frame_period)
        .collect();
    let (ioi_mean, ioi_std) = mean_std(&intervals);
    let ioi_cv = if ioi_mean > 1e-12 { ioi_std / ioi_mean } else { 0.0 };

    let change_point_count = energies_db
        .windows(2)
        .filter(|w| (w[1] - w[0]).abs() >= CHANGE_POINT_DB)
        .count();

    OnsetSummary {
        onset_count: onsets.len(),
        onset_rate_hz: onsets.len() as f64 / duration,
        ioi_mean_seconds: ioi_mean,
        ioi_median_seconds: median(&intervals),
        ioi_cv,
        change_point_count,
        flux_threshold: threshold,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StftParams;
    use crate::core::analysis::compute_stft;
    use crate::core::dsp::WindowType;

    fn click_train(sample_rate: u32, clicks: usize, spacing_seconds: f64) -> Vec<f32> {
        let total = (sample_rate as f64 * spacing_seconds * (clicks + 1) as f64) as usize;
        let mut samples = vec![0.0f32; total];
        for click in 0..clicks {
            let start = ((click as f64 + 0.5) * spacing_seconds * sample_rate as f64) as usize;
            for offset in 0..64.min(total - start) {
                samples[start + offset] = 0.9;
            }
        }
        samples
    }

    fn stft_of(samples: &[f32], sample_rate: u32) -> StftResult {
        let params = StftParams::new(256, 50, WindowType::Hann, 600, 5000);
        compute_stft(samples, sample_rate, &params).unwrap()
    }

    #[test]
    fn test_click_train_onsets_counted() {
        let sample_rate = 8000u32;
        let clicks = 8usize;
        let stft = stft_of(&click_train(sample_rate, clicks, 0.25), sample_rate);
        let summary = detect_onsets(&stft);
        assert!(summary.onset_count >= clicks - 2);
        assert!(summary.onset_count <= clicks + 2);
        // Regular spacing: low coefficient of variation.
        assert!(summary.ioi_cv < 0.3);
        assert!((summary.ioi_mean_seconds - 0.25).abs() < 0.08);
    }

    #[test]
    fn test_silence_has_no_onsets() {
        let stft = stft_of(&vec![0.0; 16_000], 8000);
        let summary = detect_onsets(&stft);
        assert_eq!(summary.onset_count, 0);
        assert_eq!(summary.change_point_count, 0);
    }

    #[test]
    fn test_steady_tone_few_onsets() {
        let sample_rate = 8000u32;
        let samples: Vec<f32> = (0..sample_rate as usize * 2)
            .map(|i| (2.0 * std::f64::consts::PI * 440.0 * i as f64 / sample_rate as f64).sin() as f32)
            .collect();
        let summary = detect_onsets(&stft_of(&samples, sample_rate));
        assert!(summary.onset_count <= 1);
    }

    #[test]
    fn test_change_points_on_level_step() {
        let sample_rate = 8000u32;
        let mut samples = vec![0.01f32; sample_rate as usize];
        samples.extend(std::iter::repeat(0.9f32).take(sample_rate as usize));
        let summary = detect_onsets(&stft_of(&samples, sample_rate));
        assert!(summary.change_point_count >= 1);
    }

    #[test]
    fn test_too_few_frames_neutral() {
        let stft = stft_of(&[0.5; 300], 8000);
        let summary = detect_onsets(&stft);
        assert_eq!(summary.onset_count, 0);
    }
}
