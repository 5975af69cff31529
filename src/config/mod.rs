//! Analysis configuration with clamped, snapshot-at-creation parameters
//!
//! Every user-tunable value is forced into its documented bounds at
//! construction; nothing reads ambient defaults afterwards. Cache keys
//! hash these frozen structs, so a changed default can never silently
//! alias an older entry.

use log::warn;
use serde::Serialize;

use crate::core::dsp::WindowType;

/// Window sizes offered by the analysis surface; arbitrary input snaps
/// to the nearest option.
pub const WINDOW_SIZE_OPTIONS: [usize; 6] = [128, 256, 512, 1024, 2048, 4096];

fn clamp_usize(value: usize, min: usize, max: usize) -> usize {
    value.clamp(min, max)
}

fn clamp_f64(value: f64, fallback: f64, min: f64, max: f64) -> f64 {
    if !value.is_finite() {
        return fallback;
    }
    value.clamp(min, max)
}

/// Snap a requested window size to the nearest supported power of two.
pub fn sanitize_window_size(requested: usize) -> usize {
    let clamped = clamp_usize(requested, 128, 4096);
    let mut best = WINDOW_SIZE_OPTIONS[0];
    let mut best_distance = best.abs_diff(clamped);
    for &option in &WINDOW_SIZE_OPTIONS[1..] {
        let distance = option.abs_diff(clamped);
        if distance < best_distance {
            best = option;
            best_distance = distance;
        }
    }
    if best != requested {
        warn!("window size {} snapped to {}", requested, best);
    }
    best
}

/// Short-time Fourier parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct StftParams {
    pub window_size: usize,
    pub overlap_percent: u8,
    pub window_type: WindowType,
    pub max_analysis_seconds: u32,
    pub max_frames: usize,
    pub hop_size: usize,
}

impl StftParams {
    pub fn new(
        window_size: usize,
        overlap_percent: u8,
        window_type: WindowType,
        max_analysis_seconds: u32,
        max_frames: usize,
    ) -> Self {
        let window_size = sanitize_window_size(window_size);
        let overlap_percent = overlap_percent.min(95);
        let max_analysis_seconds = max_analysis_seconds.clamp(1, 600);
        let max_frames = clamp_usize(max_frames, 32, 5000);
        let hop_size =
            ((window_size as f64 * (1.0 - overlap_percent as f64 / 100.0)).round() as usize).max(1);
        Self {
            window_size,
            overlap_percent,
            window_type,
            max_analysis_seconds,
            max_frames,
            hop_size,
        }
    }
}

impl Default for StftParams {
    fn default() -> Self {
        Self::new(512, 75, WindowType::Hann, 20, 420)
    }
}

/// Mel filterbank parameters. Frequency bounds are clamped against the
/// signal's Nyquist at filterbank construction, not here — the same
/// params may serve signals at different rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MelParams {
    pub bands: usize,
    pub min_hz: f64,
    pub max_hz: f64,
}

impl MelParams {
    pub fn new(bands: usize, min_hz: f64, max_hz: f64) -> Self {
        let bands = clamp_usize(bands, 8, 256);
        let min_hz = clamp_f64(min_hz, 0.0, 0.0, 96_000.0);
        let max_hz = clamp_f64(max_hz, 8000.0, min_hz + 1.0, 96_000.0);
        Self {
            bands,
            min_hz,
            max_hz,
        }
    }
}

impl Default for MelParams {
    fn default() -> Self {
        Self::new(40, 0.0, 8000.0)
    }
}

/// Cepstral coefficient counts. The effective count is additionally
/// capped by the row length at transform time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct CepstralParams {
    pub mfcc_coeffs: usize,
    pub dct_coeffs: usize,
}

impl CepstralParams {
    pub fn new(mfcc_coeffs: usize, dct_coeffs: usize) -> Self {
        Self {
            mfcc_coeffs: clamp_usize(mfcc_coeffs, 2, 256),
            dct_coeffs: clamp_usize(dct_coeffs, 2, 2049),
        }
    }
}

impl Default for CepstralParams {
    fn default() -> Self {
        Self::new(13, 24)
    }
}

/// Time-domain metric thresholds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MetricParams {
    pub clipping_threshold: f64,
    pub silence_threshold: f64,
    pub true_peak_oversample: usize,
}

impl MetricParams {
    pub fn new(clipping_threshold: f64, silence_threshold: f64, true_peak_oversample: usize) -> Self {
        Self {
            clipping_threshold: clamp_f64(clipping_threshold, 0.99, 0.0, 1.0),
            silence_threshold: clamp_f64(silence_threshold, 1e-4, 0.0, 1.0),
            true_peak_oversample: clamp_usize(true_peak_oversample, 1, 16),
        }
    }
}

impl Default for MetricParams {
    fn default() -> Self {
        Self::new(0.99, 1e-4, 4)
    }
}

/// One immutable analysis configuration. Distinct configs never share
/// cached results; equal configs always do.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Default)]
pub struct AnalysisConfig {
    pub stft: StftParams,
    pub mel: MelParams,
    pub cepstral: CepstralParams,
    pub metrics: MetricParams,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_size_snaps_to_nearest_option() {
        assert_eq!(sanitize_window_size(512), 512);
        assert_eq!(sanitize_window_size(600), 512);
        assert_eq!(sanitize_window_size(900), 1024);
        assert_eq!(sanitize_window_size(7), 128);
        assert_eq!(sanitize_window_size(100_000), 4096);
    }

    #[test]
    fn test_hop_derived_from_overlap() {
        let params = StftParams::new(512, 75, WindowType::Hann, 20, 420);
        assert_eq!(params.hop_size, 128);
        let no_overlap = StftParams::new(512, 0, WindowType::Hann, 20, 420);
        assert_eq!(no_overlap.hop_size, 512);
    }

    #[test]
    fn test_overlap_clamped_to_95() {
        let params = StftParams::new(512, 99, WindowType::Hann, 20, 420);
        assert_eq!(params.overlap_percent, 95);
        assert!(params.hop_size >= 1);
    }

    #[test]
    fn test_frame_cap_bounds() {
        assert_eq!(StftParams::new(512, 75, WindowType::Hann, 20, 1).max_frames, 32);
        assert_eq!(
            StftParams::new(512, 75, WindowType::Hann, 20, 100_000).max_frames,
            5000
        );
    }

    #[test]
    fn test_mel_bounds_ordered() {
        let params = MelParams::new(40, 5000.0, 100.0);
        assert!(params.max_hz > params.min_hz);
    }

    #[test]
    fn test_metric_params_clamped() {
        let params = MetricParams::new(2.0, -1.0, 64);
        assert!((params.clipping_threshold - 1.0).abs() < 1e-12);
        assert!((params.silence_threshold - 0.0).abs() < 1e-12);
        assert_eq!(params.true_peak_oversample, 16);
    }

    #[test]
    fn test_non_finite_falls_back_to_default() {
        let params = MetricParams::new(f64::NAN, f64::INFINITY, 4);
        assert!((params.clipping_threshold - 0.99).abs() < 1e-12);
        assert!((params.silence_threshold - 1e-4).abs() < 1e-12);
    }
}
