//! Cepstral transforms: MFCC and DCT-on-spectrogram
//!
//! A DCT-II across each row of a frame matrix, truncated to the first
//! K coefficients. Rows are short (filterbank bands or half-spectrum
//! bins), so the direct summation transform is used throughout.

use super::FrameMatrix;
use crate::core::dsp::dct_rows;

/// Truncated per-frame coefficient matrix.
#[derive(Debug, Clone)]
pub struct CepstralResult {
    pub matrix: FrameMatrix,
    pub coeffs: usize,
}

fn transform(matrix: &FrameMatrix, coeffs: usize) -> CepstralResult {
    let effective = coeffs.min(matrix.bin_count()).max(1);
    let rows = dct_rows(matrix.frames(), effective);
    CepstralResult {
        matrix: FrameMatrix::new(rows, effective.min(matrix.bin_count())),
        coeffs: effective,
    }
}

/// MFCC: DCT-II over log Mel band energies.
pub fn mfcc_from_mel(mel_log: &FrameMatrix, coeffs: usize) -> CepstralResult {
    transform(mel_log, coeffs)
}

/// DCT applied directly to STFT log-magnitude rows.
pub fn dct_on_spectrogram(log_magnitude: &FrameMatrix, coeffs: usize) -> CepstralResult {
    transform(log_magnitude, coeffs)
}
