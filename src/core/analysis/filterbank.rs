//! Filterbank construction and application
//!
//! Triangular Mel filterbanks built from equally-spaced mel points, or
//! arbitrary user-supplied weight rows resampled onto the STFT bin
//! grid. Every row ends up non-negative and unit-sum (uniform if
//! degenerate) so band energies stay comparable across banks.

use super::FrameMatrix;

/// How band energies are compressed when a filterbank is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterbankMode {
    /// `log10(energy + 1e-12)`, the Mel/MFCC path.
    Log,
    /// `max(0, energy)`, for linear band statistics.
    Linear,
}

/// An ordered list of normalized weight rows over FFT bins.
#[derive(Debug, Clone)]
pub struct Filterbank {
    rows: Vec<Vec<f32>>,
    bin_count: usize,
}

fn hz_to_mel(hz: f64) -> f64 {
    2595.0 * (1.0 + hz / 700.0).log10()
}

fn mel_to_hz(mel: f64) -> f64 {
    700.0 * (10.0f64.powf(mel / 2595.0) - 1.0)
}

/// Clamp negatives to zero and scale the row to unit sum; a degenerate
/// (all-zero) row becomes uniform so applying it stays well-defined.
fn normalize_weights(row: &[f32]) -> Vec<f32> {
    let mut out: Vec<f32> = row.iter().map(|&w| w.max(0.0)).collect();
    let sum: f64 = out.iter().map(|&w| w as f64).sum();
    if sum <= 1e-12 {
        let uniform = 1.0 / out.len().max(1) as f32;
        out.iter_mut().for_each(|w| *w = uniform);
        return out;
    }
    let scale = (1.0 / sum) as f32;
    out.iter_mut().for_each(|w| *w *= scale);
    out
}

/// Linear interpolation of a weight row across index position.
fn resample_row(row: &[f32], target_len: usize) -> Vec<f32> {
    if target_len <= 1 {
        return vec![row.first().copied().unwrap_or(0.0)];
    }
    if row.len() == target_len {
        return row.to_vec();
    }
    if row.is_empty() {
        return vec![0.0; target_len];
    }

    let source_last = row.len() - 1;
    (0..target_len)
        .map(|index| {
            let position = index as f64 / (target_len - 1) as f64 * source_last as f64;
            let left = position.floor() as usize;
            let right = (left + 1).min(source_last);
            let frac = (position - left as f64) as f32;
            row[left] * (1.0 - frac) + row[right] * frac
        })
        .collect()
}

impl Filterbank {
    /// Build a triangular Mel filterbank for `fft_size`-point spectra.
    ///
    /// Band edges are equally spaced on the mel scale between the
    /// clamped `[min_hz, max_hz)` bounds; each triangle is anchored to
    /// strictly increasing bin indexes so no band collapses to zero
    /// width even at coarse FFT resolutions.
    pub fn mel(sample_rate: u32, fft_size: usize, bands: usize, min_hz: f64, max_hz: f64) -> Self {
        let nyquist = sample_rate as f64 / 2.0;
        let bin_count = fft_size / 2 + 1;
        let bands = bands.max(1);

        let bounded_min = min_hz.clamp(0.0, (nyquist - 1.0).max(0.0));
        let bounded_max = max_hz.clamp(bounded_min + 1.0, nyquist.max(bounded_min + 1.0));

        let mel_min = hz_to_mel(bounded_min);
        let mel_max = hz_to_mel(bounded_max);

        let bin_points: Vec<usize> = (0..bands + 2)
            .map(|index| {
                let mel = mel_min + (mel_max - mel_min) * index as f64 / (bands + 1) as f64;
                let hz = mel_to_hz(mel);
                let raw = ((fft_size + 1) as f64 * hz / sample_rate.max(1) as f64).floor();
                (raw.max(0.0) as usize).min(bin_count - 1)
            })
            .collect();

        let mut rows = Vec::with_capacity(bands);
        for band in 1..=bands {
            let left = bin_points[band - 1];
            let center = bin_points[band].max(left + 1);
            let right = bin_points[band + 1].max(center + 1);
            let mut row = vec![0.0f32; bin_count];

            for bin in left..center.min(bin_count) {
                row[bin] = (bin - left) as f32 / (center - left).max(1) as f32;
            }
            for bin in center..right.min(bin_count) {
                row[bin] = (right - bin) as f32 / (right - center).max(1) as f32;
            }

            rows.push(normalize_weights(&row));
        }

        Self { rows, bin_count }
    }

    /// Accept arbitrary weight rows from an external source, resampling
    /// each onto `target_bins` and normalizing like the Mel case.
    pub fn from_rows(rows: &[Vec<f32>], target_bins: usize) -> Self {
        let normalized = rows
            .iter()
            .map(|row| normalize_weights(&resample_row(row, target_bins)))
            .collect();
        Self {
            rows: normalized,
            bin_count: target_bins,
        }
    }

    pub fn band_count(&self) -> usize {
        self.rows.len()
    }

    pub fn bin_count(&self) -> usize {
        self.bin_count
    }

    pub fn rows(&self) -> &[Vec<f32>] {
        &self.rows
    }

    /// Apply the bank to a power-spectrum frame matrix: one scalar per
    /// band per frame, compressed per `mode`.
    pub fn apply(&self, power: &FrameMatrix, mode: FilterbankMode) -> FrameMatrix {
        let mut out = Vec::with_capacity(power.frame_count());
        for frame in power.frames() {
            let mut row = Vec::with_capacity(self.rows.len());
            for weights in &self.rows {
                let mut energy = 0.0f64;
                for (bin, &weight) in weights.iter().enumerate() {
                    let value = frame.get(bin).copied().unwrap_or(0.0);
                    energy += value as f64 * weight as f64;
                }
                let value = match mode {
                    FilterbankMode::Log => (energy + 1e-12).log10(),
                    FilterbankMode::Linear => energy.max(0.0),
                };
                row.push(value as f32);
            }
            out.push(row);
        }
        FrameMatrix::new(out, self.rows.len())
    }
}

/// Parse filterbank rows from CSV text: blank lines and `#` comments
/// are skipped, non-numeric cells are dropped, and a row must keep at
/// least two numeric cells to count.
pub fn parse_filterbank_csv(text: &str) -> Option<Vec<Vec<f32>>> {
    let mut rows = Vec::new();
    for line in text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        let values: Vec<f32> = trimmed
            .split(',')
            .filter_map(|cell| cell.trim().parse::<f32>().ok())
            .collect();
        if values.len() >= 2 {
            rows.push(values);
        }
    }
    if rows.is_empty() {
        None
    } else {
        Some(rows)
    }
}
