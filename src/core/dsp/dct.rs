//! Direct (non-FFT) transforms for small vectors
//!
//! Cepstral rows and whole-signal feature spectra are short enough
//! that a direct summation beats the bookkeeping of power-of-two
//! padding. Cost is O(len * coeffs); callers bound their inputs
//! (filterbank rows, truncated feature windows) before reaching here.

use std::f64::consts::PI;

/// DCT-II of one row, truncated to the first `coeff_count` coefficients.
///
/// `out[k] = sum_n row[n] * cos((n + 0.5) * k * pi / len)`
pub fn dct_vector(row: &[f32], coeff_count: usize) -> Vec<f32> {
    let length = row.len();
    if length == 0 {
        return Vec::new();
    }

    let out_len = coeff_count.min(length);
    let factor = PI / length as f64;
    let mut out = Vec::with_capacity(out_len);
    for k in 0..out_len {
        let mut sum = 0.0f64;
        for (n, &value) in row.iter().enumerate() {
            sum += value as f64 * ((n as f64 + 0.5) * k as f64 * factor).cos();
        }
        out.push(sum as f32);
    }
    out
}

/// DCT-II applied independently to each row of a frame matrix.
pub fn dct_rows(matrix: &[Vec<f32>], coeff_count: usize) -> Vec<Vec<f32>> {
    matrix.iter().map(|row| dct_vector(row, coeff_count)).collect()
}

/// Direct DFT power spectrum of a small vector: `len / 2 + 1` bins.
///
/// O(n^2); intended for bounded feature windows, not STFT frames.
pub fn naive_power_spectrum(samples: &[f32]) -> Vec<f64> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let bins = n / 2 + 1;
    let mut out = Vec::with_capacity(bins);
    for k in 0..bins {
        let mut real = 0.0f64;
        let mut imag = 0.0f64;
        for (index, &value) in samples.iter().enumerate() {
            let phase = -2.0 * PI * k as f64 * index as f64 / n as f64;
            real += value as f64 * phase.cos();
            imag += value as f64 * phase.sin();
        }
        out.push(real * real + imag * imag);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dct_zeroth_coefficient_is_row_sum() {
        let row = vec![1.0, 2.0, 3.0, 4.0];
        let out = dct_vector(&row, 1);
        assert!((out[0] - 10.0).abs() < 1e-5);
    }

    #[test]
    fn test_dct_truncates_to_row_length() {
        let row = vec![1.0, -1.0, 1.0];
        let out = dct_vector(&row, 10);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_dct_constant_row_has_zero_higher_coefficients() {
        let out = dct_vector(&[2.0; 8], 8);
        for &coeff in &out[1..] {
            assert!(coeff.abs() < 1e-4);
        }
    }

    #[test]
    fn test_dct_empty_row() {
        assert!(dct_vector(&[], 4).is_empty());
    }

    #[test]
    fn test_naive_spectrum_sine_peaks_at_tone_bin() {
        let n = 128;
        let k = 9;
        let samples: Vec<f32> = (0..n)
            .map(|i| (2.0 * std::f32::consts::PI * k as f32 * i as f32 / n as f32).sin())
            .collect();
        let power = naive_power_spectrum(&samples);
        assert_eq!(power.len(), n / 2 + 1);
        let max_bin = power
            .iter()
            .enumerate()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(max_bin, k);
    }
}
