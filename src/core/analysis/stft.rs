//! Short-time Fourier analysis
//!
//! Frames the signal with a hopped window, transforms each frame, and
//! keeps three aligned matrices: linear power, log-magnitude, and
//! wrapped phase. When the natural frame count exceeds the configured
//! cap, frames are subsampled with a uniform stride rather than
//! truncated, so the result still spans the whole analysis window.

use log::debug;

use super::FrameMatrix;
use crate::config::StftParams;
use crate::core::dsp::SpectrumProcessor;
use crate::core::error::EngineError;

const LOG_MAGNITUDE_EPSILON: f32 = 1e-9;

/// Output of one STFT pass.
#[derive(Debug, Clone)]
pub struct StftResult {
    pub fft_size: usize,
    pub hop_size: usize,
    /// Index distance between retained frames (1 = every frame kept).
    pub frame_stride: usize,
    pub sample_rate: u32,
    pub bin_count: usize,
    pub duration_seconds: f64,
    pub power: FrameMatrix,
    pub log_magnitude: FrameMatrix,
    pub phase: FrameMatrix,
}

impl StftResult {
    pub fn frame_count(&self) -> usize {
        self.power.frame_count()
    }

    /// Seconds between retained frames.
    pub fn frame_period_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        (self.hop_size * self.frame_stride) as f64 / self.sample_rate as f64
    }

    /// Start time of retained frame `index` within the analysis window.
    pub fn frame_time_seconds(&self, index: usize) -> f64 {
        index as f64 * self.frame_period_seconds()
    }
}

/// Compute the STFT of `samples` under `params`.
///
/// The analysis window is capped at `max_analysis_seconds`; a signal
/// shorter than the FFT size still produces one zero-padded frame. The
/// only failure is a structurally invalid FFT size.
pub fn compute_stft(
    samples: &[f32],
    sample_rate: u32,
    params: &StftParams,
) -> Result<StftResult, EngineError> {
    let processor = SpectrumProcessor::new(params.window_size, params.window_type)?;
    let fft_size = params.window_size;
    let bin_count = processor.bin_count();
    let hop = params.hop_size.max(1);

    let max_samples = (sample_rate as u64 * params.max_analysis_seconds as u64) as usize;
    let analysis = if samples.len() > max_samples && max_samples > 0 {
        &samples[..max_samples]
    } else {
        samples
    };

    let total_frames = ((analysis.len().max(fft_size) - fft_size) / hop + 1).max(1);
    let frame_stride = (total_frames / params.max_frames).max(1);
    debug!(
        "stft: {} samples, {} natural frames, stride {}",
        analysis.len(),
        total_frames,
        frame_stride
    );

    let mut power_frames = Vec::new();
    let mut log_frames = Vec::new();
    let mut phase_frames = Vec::new();

    let mut frame = 0;
    while frame < total_frames {
        let offset = frame * hop;
        let slice = if offset < analysis.len() {
            &analysis[offset..]
        } else {
            &[][..]
        };
        let spectrum = processor.spectrum(slice);

        let mut power = Vec::with_capacity(bin_count);
        let mut log_magnitude = Vec::with_capacity(bin_count);
        let mut phase = Vec::with_capacity(bin_count);
        for bin in &spectrum {
            let magnitude = bin.norm();
            power.push(magnitude * magnitude);
            log_magnitude.push(20.0 * (magnitude + LOG_MAGNITUDE_EPSILON).log10());
            phase.push(bin.im.atan2(bin.re));
        }

        power_frames.push(power);
        log_frames.push(log_magnitude);
        phase_frames.push(phase);
        frame += frame_stride;
    }

    let duration_seconds = if sample_rate > 0 {
        analysis.len() as f64 / sample_rate as f64
    } else {
        0.0
    };

    Ok(StftResult {
        fft_size,
        hop_size: hop,
        frame_stride,
        sample_rate,
        bin_count,
        duration_seconds,
        power: FrameMatrix::new(power_frames, bin_count),
        log_magnitude: FrameMatrix::new(log_frames, bin_count),
        phase: FrameMatrix::new(phase_frames, bin_count),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::dsp::WindowType;

    fn params(window_size: usize, overlap: u8, max_frames: usize) -> StftParams {
        StftParams::new(window_size, overlap, WindowType::Rectangular, 600, max_frames)
    }

    #[test]
    fn test_short_signal_yields_one_frame() {
        let stft = compute_stft(&[0.5; 10], 8000, &params(128, 0, 420)).unwrap();
        assert_eq!(stft.frame_count(), 1);
        assert_eq!(stft.bin_count, 65);
    }

    #[test]
    fn test_constant_signal_power_is_flat_across_frames() {
        // DC bin power of a rectangular-windowed constant frame is (A*W)^2.
        let samples = vec![0.5f32; 4096];
        let stft = compute_stft(&samples, 8000, &params(256, 0, 420)).unwrap();
        let expected = (0.5f32 * 256.0).powi(2);
        for frame in stft.power.frames() {
            assert!((frame[0] - expected).abs() / expected < 1e-3);
        }
    }

    #[test]
    fn test_sine_on_bin_peaks_at_bin() {
        let n = 512;
        let k = 32;
        let sample_rate = 8192;
        let samples: Vec<f32> = (0..n * 4)
            .map(|i| (2.0 * std::f32::consts::PI * k as f32 * i as f32 / n as f32).sin())
            .collect();
        let stft = compute_stft(&samples, sample_rate, &params(512, 0, 420)).unwrap();
        let means = stft.power.bin_means();
        let max_bin = means
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(max_bin, k);
    }

    #[test]
    fn test_frame_cap_subsamples_but_preserves_span() {
        let samples = vec![0.1f32; 8192];
        let capped = compute_stft(&samples, 8000, &params(128, 0, 32)).unwrap();
        let full = compute_stft(&samples, 8000, &params(128, 0, 5000)).unwrap();
        assert!(capped.frame_count() <= full.frame_count());
        assert!(capped.frame_stride > 1);
        // Last retained frame must still reach near the end of the window.
        let last_time = capped.frame_time_seconds(capped.frame_count() - 1);
        let natural_span = full.frame_time_seconds(full.frame_count() - 1);
        assert!(last_time >= natural_span - capped.frame_period_seconds());
    }

    #[test]
    fn test_max_analysis_seconds_limits_window() {
        let sample_rate = 8000u32;
        let samples = vec![0.1f32; sample_rate as usize * 10];
        let mut p = params(128, 0, 5000);
        p.max_analysis_seconds = 1;
        let stft = compute_stft(&samples, sample_rate, &p).unwrap();
        assert!((stft.duration_seconds - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_matrices_stay_aligned() {
        let stft = compute_stft(&[0.3; 2048], 8000, &params(256, 50, 420)).unwrap();
        assert_eq!(stft.power.frame_count(), stft.log_magnitude.frame_count());
        assert_eq!(stft.power.frame_count(), stft.phase.frame_count());
        assert_eq!(stft.power.bin_count(), stft.phase.bin_count());
    }
}
