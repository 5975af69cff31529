//! Spectral shape summarizer
//!
//! Per-frame moments and information measures over STFT power bins,
//! aggregated to mean/std across frames, plus whole-signal descriptors
//! derived from the frame-averaged spectrum: dominant frequency,
//! spectral slope, and fixed band-power buckets.

use serde::Serialize;

use super::StftResult;
use crate::core::dsp::stats::mean_std;

const SPREAD_EPSILON: f64 = 1e-6;
const POWER_EPSILON: f64 = 1e-12;
const ROLLOFF_FRACTION: f64 = 0.85;

/// Mean and standard deviation of a per-frame series.
#[derive(Debug, Clone, Copy, Serialize, Default)]
pub struct Stat {
    pub mean: f64,
    pub std: f64,
}

impl Stat {
    fn from_series(values: &[f64]) -> Self {
        let (mean, std) = mean_std(values);
        Self { mean, std }
    }
}

/// Energy in one fixed frequency bucket.
#[derive(Debug, Clone, Serialize)]
pub struct BandPower {
    pub low_hz: f64,
    pub high_hz: f64,
    pub power: f64,
    pub ratio: f64,
    pub db: f64,
}

/// Aggregated spectral descriptors for one STFT.
#[derive(Debug, Clone, Serialize, Default)]
pub struct SpectralSummary {
    pub centroid_hz: Stat,
    pub spread_hz: Stat,
    pub skewness: Stat,
    pub kurtosis: Stat,
    pub flatness: Stat,
    pub entropy: Stat,
    pub rolloff_hz: Stat,
    pub dominant_hz: f64,
    pub slope_db_per_decade: f64,
    pub band_powers: Vec<BandPower>,
}

/// Summarize the spectral shape of an STFT's power matrix.
pub fn summarize_spectrum(stft: &StftResult) -> SpectralSummary {
    let bin_hz = stft.sample_rate as f64 / stft.fft_size as f64;
    let nyquist = stft.sample_rate as f64 / 2.0;

    let mut centroids = Vec::new();
    let mut spreads = Vec::new();
    let mut skews = Vec::new();
    let mut kurtoses = Vec::new();
    let mut flatnesses = Vec::new();
    let mut entropies = Vec::new();
    let mut rolloffs = Vec::new();

    for frame in stft.power.frames() {
        let total: f64 = frame.iter().map(|&p| (p as f64).max(0.0)).sum();
        if total <= POWER_EPSILON {
            centroids.push(0.0);
            spreads.push(0.0);
            flatnesses.push(0.0);
            entropies.push(0.0);
            rolloffs.push(0.0);
            continue;
        }

        // First and second power-weighted moments.
        let mut weighted = 0.0f64;
        for (bin, &p) in frame.iter().enumerate() {
            weighted += (p as f64).max(0.0) * bin as f64 * bin_hz;
        }
        let centroid = weighted / total;

        let mut second = 0.0f64;
        for (bin, &p) in frame.iter().enumerate() {
            let diff = bin as f64 * bin_hz - centroid;
            second += (p as f64).max(0.0) * diff * diff;
        }
        let spread = (second / total).sqrt();

        centroids.push(centroid);
        spreads.push(spread);

        // Higher standardized moments only where spread is meaningful.
        if spread > SPREAD_EPSILON {
            let mut third = 0.0f64;
            let mut fourth = 0.0f64;
            for (bin, &p) in frame.iter().enumerate() {
                let z = (bin as f64 * bin_hz - centroid) / spread;
                let weight = (p as f64).max(0.0) / total;
                third += weight * z * z * z;
                fourth += weight * z * z * z * z;
            }
            skews.push(third);
            kurtoses.push(fourth);
        }

        flatnesses.push(frame_flatness(frame));
        entropies.push(frame_entropy(frame, total));
        rolloffs.push(frame_rolloff(frame, total, bin_hz, nyquist));
    }

    let means = stft.power.bin_means();
    let (dominant_hz, slope_db_per_decade) = averaged_spectrum_features(&means, bin_hz);

    SpectralSummary {
        centroid_hz: Stat::from_series(&centroids),
        spread_hz: Stat::from_series(&spreads),
        skewness: Stat::from_series(&skews),
        kurtosis: Stat::from_series(&kurtoses),
        flatness: Stat::from_series(&flatnesses),
        entropy: Stat::from_series(&entropies),
        rolloff_hz: Stat::from_series(&rolloffs),
        dominant_hz,
        slope_db_per_decade,
        band_powers: band_buckets(&means, bin_hz, nyquist),
    }
}

/// Geometric over arithmetic mean of the power bins.
fn frame_flatness(frame: &[f32]) -> f64 {
    if frame.is_empty() {
        return 0.0;
    }
    let n = frame.len() as f64;
    let mut log_sum = 0.0f64;
    let mut arith = 0.0f64;
    for &p in frame {
        let p = (p as f64).max(0.0) + POWER_EPSILON;
        log_sum += p.ln();
        arith += p;
    }
    let geometric = (log_sum / n).exp();
    let arithmetic = arith / n;
    if arithmetic <= 0.0 {
        0.0
    } else {
        geometric / arithmetic
    }
}

/// Shannon entropy of the per-frame bin distribution, normalized by
/// `log2(bin_count)` so the result lands in [0, 1].
fn frame_entropy(frame: &[f32], total: f64) -> f64 {
    if frame.len() < 2 || total <= POWER_EPSILON {
        return 0.0;
    }
    let mut entropy = 0.0f64;
    for &p in frame {
        let q = (p as f64).max(0.0) / total;
        if q > 0.0 {
            entropy -= q * q.log2();
        }
    }
    entropy / (frame.len() as f64).log2()
}

/// Frequency below which 85% of the frame's energy accumulates.
fn frame_rolloff(frame: &[f32], total: f64, bin_hz: f64, nyquist: f64) -> f64 {
    let target = total * ROLLOFF_FRACTION;
    let mut cumulative = 0.0f64;
    for (bin, &p) in frame.iter().enumerate() {
        cumulative += (p as f64).max(0.0);
        if cumulative >= target {
            return bin as f64 * bin_hz;
        }
    }
    nyquist
}

/// Dominant frequency and log-log slope of the frame-averaged spectrum.
fn averaged_spectrum_features(means: &[f64], bin_hz: f64) -> (f64, f64) {
    if means.is_empty() {
        return (0.0, 0.0);
    }

    let dominant_bin = means
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(bin, _)| bin)
        .unwrap_or(0);
    let dominant_hz = dominant_bin as f64 * bin_hz;

    // Regress 10*log10(power) on log10(frequency), skipping f = 0.
    let mut n = 0.0f64;
    let mut sum_x = 0.0f64;
    let mut sum_y = 0.0f64;
    let mut sum_xx = 0.0f64;
    let mut sum_xy = 0.0f64;
    for (bin, &power) in means.iter().enumerate().skip(1) {
        let x = (bin as f64 * bin_hz).log10();
        let y = 10.0 * (power.max(0.0) + POWER_EPSILON).log10();
        n += 1.0;
        sum_x += x;
        sum_y += y;
        sum_xx += x * x;
        sum_xy += x * y;
    }
    let denominator = n * sum_xx - sum_x * sum_x;
    let slope = if denominator.abs() > 1e-12 {
        (n * sum_xy - sum_x * sum_y) / denominator
    } else {
        0.0
    };

    (dominant_hz, slope)
}

/// Fixed buckets: 20–250, 250–2000, 2000–8000, 8000–Nyquist Hz.
fn band_buckets(means: &[f64], bin_hz: f64, nyquist: f64) -> Vec<BandPower> {
    let edges = [20.0, 250.0, 2000.0, 8000.0, nyquist.max(8000.0)];
    let total: f64 = means.iter().map(|&p| p.max(0.0)).sum();

    edges
        .windows(2)
        .map(|edge| {
            let low_hz = edge[0].min(nyquist);
            let high_hz = edge[1].min(nyquist).max(low_hz);
            let mut power = 0.0f64;
            for (bin, &p) in means.iter().enumerate() {
                let freq = bin as f64 * bin_hz;
                if freq >= low_hz && freq < high_hz {
                    power += p.max(0.0);
                }
            }
            let ratio = if total > POWER_EPSILON { power / total } else { 0.0 };
            BandPower {
                low_hz,
                high_hz,
                power,
                ratio,
                db: 10.0 * (power + POWER_EPSILON).log10(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StftParams;
    use crate::core::analysis::compute_stft;
    use crate::core::dsp::WindowType;

    fn sine(sample_rate: u32, hz: f64, seconds: f64) -> Vec<f32> {
        let count = (sample_rate as f64 * seconds) as usize;
        (0..count)
            .map(|i| (2.0 * std::f64::consts::PI * hz * i as f64 / sample_rate as f64).sin() as f32)
            .collect()
    }

    fn stft_of(samples: &[f32], sample_rate: u32) -> StftResult {
        let params = StftParams::new(512, 0, WindowType::Rectangular, 600, 420);
        compute_stft(samples, sample_rate, &params).unwrap()
    }

    #[test]
    fn test_centroid_of_bin_aligned_sine() {
        let sample_rate = 8192u32;
        let bin = 24;
        let hz = bin as f64 * sample_rate as f64 / 512.0;
        let stft = stft_of(&sine(sample_rate, hz, 0.5), sample_rate);
        let summary = summarize_spectrum(&stft);
        let bin_width = sample_rate as f64 / 512.0;
        assert!((summary.centroid_hz.mean - hz).abs() < bin_width);
        assert!((summary.dominant_hz - hz).abs() < bin_width / 2.0);
    }

    #[test]
    fn test_flatness_low_for_tone_high_for_flat_spectrum() {
        let sample_rate = 8192u32;
        let stft = stft_of(&sine(sample_rate, 1000.0, 0.5), sample_rate);
        let summary = summarize_spectrum(&stft);
        assert!(summary.flatness.mean < 0.1);
    }

    #[test]
    fn test_entropy_normalized_range() {
        let sample_rate = 8192u32;
        let stft = stft_of(&sine(sample_rate, 500.0, 0.5), sample_rate);
        let summary = summarize_spectrum(&stft);
        assert!(summary.entropy.mean >= 0.0 && summary.entropy.mean <= 1.0);
    }

    #[test]
    fn test_silence_yields_neutral_summary() {
        let stft = stft_of(&vec![0.0; 4096], 8000);
        let summary = summarize_spectrum(&stft);
        assert_eq!(summary.centroid_hz.mean, 0.0);
        assert_eq!(summary.dominant_hz, 0.0);
        for band in &summary.band_powers {
            assert_eq!(band.ratio, 0.0);
        }
    }

    #[test]
    fn test_band_buckets_capture_tone() {
        let sample_rate = 16000u32;
        let stft = stft_of(&sine(sample_rate, 1000.0, 0.5), sample_rate);
        let summary = summarize_spectrum(&stft);
        assert_eq!(summary.band_powers.len(), 4);
        // 1 kHz lands in the 250-2000 bucket.
        assert!(summary.band_powers[1].ratio > 0.9);
    }

    #[test]
    fn test_rolloff_below_nyquist_for_low_tone() {
        let sample_rate = 16000u32;
        let stft = stft_of(&sine(sample_rate, 440.0, 0.5), sample_rate);
        let summary = summarize_spectrum(&stft);
        assert!(summary.rolloff_hz.mean < 2000.0);
        assert!(summary.rolloff_hz.mean > 0.0);
    }
}
