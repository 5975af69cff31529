//! Audio analysis stages
//!
//! Each stage consumes sanitized samples (or the output of an earlier
//! stage) and produces an immutable result. Stages never mutate their
//! input and never fail on degenerate numeric content; the only hard
//! error in the tree is an invalid FFT size, surfaced from the STFT.

mod cepstral;
mod filterbank;
mod modulation;
mod onsets;
mod periodicity;
mod spectral;
mod stft;
mod time_domain;

pub use cepstral::{dct_on_spectrogram, mfcc_from_mel, CepstralResult};
pub use filterbank::{parse_filterbank_csv, Filterbank, FilterbankMode};
pub use modulation::{summarize_modulation, ModulationSummary};
pub use onsets::{detect_onsets, OnsetSummary};
pub use periodicity::{
    autocorrelation, estimate_fundamental, track_pitch, PeriodicityEstimate, PitchTrack,
};
pub use spectral::{summarize_spectrum, BandPower, SpectralSummary, Stat};
pub use stft::{compute_stft, StftResult};
pub use time_domain::{compute_waveform_metrics, WaveformMetrics};

/// A sequence of equal-length analysis frames.
///
/// The uniform row length is established at construction and holds for
/// the matrix's lifetime; rows are bins of power, log-magnitude,
/// phase, band energy, or cepstral coefficients depending on the stage
/// that produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameMatrix {
    frames: Vec<Vec<f32>>,
    bin_count: usize,
}

impl FrameMatrix {
    /// Wrap frames, enforcing the uniform-row invariant.
    pub fn new(frames: Vec<Vec<f32>>, bin_count: usize) -> Self {
        debug_assert!(frames.iter().all(|f| f.len() == bin_count));
        Self { frames, bin_count }
    }

    pub fn empty(bin_count: usize) -> Self {
        Self {
            frames: Vec::new(),
            bin_count,
        }
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn frames(&self) -> &[Vec<f32>] {
        &self.frames
    }

    pub fn frame(&self, index: usize) -> Option<&[f32]> {
        self.frames.get(index).map(Vec::as_slice)
    }

    /// Per-bin average across all frames; empty matrix yields an
    /// all-zero vector.
    pub fn bin_means(&self) -> Vec<f64> {
        let mut means = vec![0.0f64; self.bin_count];
        if self.frames.is_empty() {
            return means;
        }
        for frame in &self.frames {
            for (bin, &value) in frame.iter().enumerate() {
                means[bin] += value as f64;
            }
        }
        let scale = 1.0 / self.frames.len() as f64;
        for mean in &mut means {
            *mean *= scale;
        }
        means
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bin_means_average_across_frames() {
        let matrix = FrameMatrix::new(vec![vec![1.0, 2.0], vec![3.0, 4.0]], 2);
        let means = matrix.bin_means();
        assert!((means[0] - 2.0).abs() < 1e-12);
        assert!((means[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_empty_matrix_neutral_means() {
        let matrix = FrameMatrix::empty(3);
        assert_eq!(matrix.bin_means(), vec![0.0, 0.0, 0.0]);
    }
}
