//! Metrics report: typed sections and their assembly
//!
//! One `MetricsReport` is built per (signal, feature selection) and
//! never mutated afterwards; a changed signal or configuration yields
//! a fresh report. Sections are strongly typed structs (not a string
//! map) so the CSV flattener can walk them without reflection.

use serde::Serialize;

use crate::config::AnalysisConfig;
use crate::core::analysis::{
    autocorrelation, ModulationSummary, OnsetSummary, PeriodicityEstimate, PitchTrack,
    SpectralSummary, WaveformMetrics,
};
use crate::core::dsp::stats::{interquartile_range, mean_std, median, skewness_kurtosis};
use crate::core::signal::Signal;

/// Cap on exported feature-array lengths; longer series are uniformly
/// stride-decimated like STFT frames.
const FEATURE_ARRAY_CAP: usize = 4096;
/// Sample window for the naive whole-signal power spectrum.
const NAIVE_SPECTRUM_WINDOW: usize = 2048;
/// Lag bound for the exported autocorrelation array.
const AUTOCORR_EXPORT_LAGS: usize = 512;

const SHORT_TIME_FRAME: usize = 256;
const SHORT_TIME_HOP: usize = 128;

/// Which feature arrays the report should materialize.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FeatureSelection {
    pub power: bool,
    pub autocorrelation: bool,
    pub short_time_power: bool,
    pub short_time_autocorrelation: bool,
}

impl Default for FeatureSelection {
    fn default() -> Self {
        Self {
            power: false,
            autocorrelation: false,
            short_time_power: false,
            short_time_autocorrelation: false,
        }
    }
}

impl FeatureSelection {
    pub fn all() -> Self {
        Self {
            power: true,
            autocorrelation: true,
            short_time_power: true,
            short_time_autocorrelation: true,
        }
    }
}

/// Time-domain section: duration plus the waveform metrics.
#[derive(Debug, Clone, Serialize)]
pub struct AudioSection {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    #[serde(flatten)]
    pub metrics: WaveformMetrics,
}

/// Temporal section: periodicity, short-time energy, onsets.
#[derive(Debug, Clone, Serialize)]
pub struct TemporalSection {
    pub periodicity: PeriodicityEstimate,
    pub short_time_power_mean: f64,
    pub short_time_power_std: f64,
    pub onsets: OnsetSummary,
}

/// Spectrogram-derived section: Mel and cepstral summaries.
#[derive(Debug, Clone, Serialize)]
pub struct SpectrogramSection {
    pub frame_count: usize,
    pub mel_bands: usize,
    pub mel_min_hz: f64,
    pub mel_max_hz: f64,
    pub mel_band_means: Vec<f64>,
    pub mfcc_coeffs: usize,
    pub mfcc_means: Vec<f64>,
    pub dct_coeffs: usize,
}

/// Custom filterbank summary, present only when a bank is loaded.
#[derive(Debug, Clone, Serialize)]
pub struct CustomBankSection {
    pub source_name: String,
    pub band_count: usize,
    pub band_means: Vec<f64>,
}

/// Speech-heuristic section from the frame-wise pitch track.
#[derive(Debug, Clone, Serialize)]
pub struct SpeechSection {
    #[serde(flatten)]
    pub pitch: PitchTrack,
}

/// Amplitude-distribution statistics.
#[derive(Debug, Clone, Serialize, Default)]
pub struct StatisticalSection {
    pub mean: f64,
    pub median: f64,
    pub std: f64,
    pub skewness: f64,
    pub kurtosis: f64,
    pub min: f64,
    pub max: f64,
    pub iqr: f64,
}

/// Fixed-bin amplitude histogram.
#[derive(Debug, Clone, Serialize)]
pub struct DistributionalSection {
    pub bin_count: usize,
    pub min: f64,
    pub max: f64,
    pub counts: Vec<u64>,
}

/// Channel-layout metadata and inter-channel relations.
#[derive(Debug, Clone, Serialize)]
pub struct SpatialSection {
    pub channel_count: usize,
    pub channel_rms: Vec<f64>,
    pub interchannel_correlation: Option<f64>,
}

/// Loudness proxies; RMS-based, not a BS.1770 implementation.
#[derive(Debug, Clone, Serialize)]
pub struct StandardsSection {
    pub loudness_rms_dbfs: f64,
    pub true_peak_dbtp: f64,
}

/// Exportable per-sample/per-frame feature arrays.
#[derive(Debug, Clone, Serialize, Default)]
pub struct FeatureArrays {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub power: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autocorrelation: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_time_power: Option<Vec<f64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short_time_autocorrelation: Option<Vec<f64>>,
}

/// A section that could not be computed, with the reason.
#[derive(Debug, Clone, Serialize)]
pub struct AvailabilityNote {
    pub section: String,
    pub reason: String,
}

/// The complete report for one signal under one configuration.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsReport {
    pub generated_at: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub sample_count: usize,
    pub config: AnalysisConfig,
    pub audio: AudioSection,
    pub temporal: TemporalSection,
    pub spectral: SpectralSummary,
    pub spectrogram: SpectrogramSection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_filterbank: Option<CustomBankSection>,
    pub modulation: ModulationSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub speech: Option<SpeechSection>,
    pub statistical: StatisticalSection,
    pub distributional: DistributionalSection,
    pub spatial: SpatialSection,
    pub standards: StandardsSection,
    pub features: FeatureArrays,
    pub availability: Vec<AvailabilityNote>,
}

/// Uniform stride decimation to at most `cap` entries.
fn decimate(series: Vec<f64>, cap: usize) -> Vec<f64> {
    let stride = (series.len() / cap.max(1)).max(1);
    if stride == 1 {
        return series;
    }
    series.into_iter().step_by(stride).collect()
}

/// Frame power (mean square) over a hopped window.
pub(crate) fn short_time_power(samples: &[f32]) -> Vec<f64> {
    if samples.len() < SHORT_TIME_FRAME {
        return Vec::new();
    }
    let count = (samples.len() - SHORT_TIME_FRAME) / SHORT_TIME_HOP + 1;
    let mut out = Vec::with_capacity(count);
    for index in 0..count {
        let start = index * SHORT_TIME_HOP;
        let frame = &samples[start..start + SHORT_TIME_FRAME];
        let energy: f64 = frame.iter().map(|&v| v as f64 * v as f64).sum();
        out.push(energy / SHORT_TIME_FRAME as f64);
    }
    out
}

/// Lag-1 normalized autocorrelation per hopped frame.
fn short_time_autocorrelation(samples: &[f32]) -> Vec<f64> {
    if samples.len() < SHORT_TIME_FRAME {
        return Vec::new();
    }
    let count = (samples.len() - SHORT_TIME_FRAME) / SHORT_TIME_HOP + 1;
    let mut out = Vec::with_capacity(count);
    for index in 0..count {
        let start = index * SHORT_TIME_HOP;
        let frame = &samples[start..start + SHORT_TIME_FRAME];
        let corr = autocorrelation(frame, 1);
        out.push(corr.get(1).copied().unwrap_or(0.0));
    }
    out
}

pub(crate) fn build_statistical(samples: &[f32]) -> StatisticalSection {
    if samples.is_empty() {
        return StatisticalSection::default();
    }
    let values: Vec<f64> = samples.iter().map(|&v| v as f64).collect();
    let (mean, std) = mean_std(&values);
    let (skewness, kurtosis) = skewness_kurtosis(&values);
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    StatisticalSection {
        mean,
        median: median(&values),
        std,
        skewness,
        kurtosis,
        min,
        max,
        iqr: interquartile_range(&values),
    }
}

pub(crate) fn build_histogram(samples: &[f32], bin_count: usize) -> DistributionalSection {
    let bin_count = bin_count.max(1);
    let mut counts = vec![0u64; bin_count];
    if samples.is_empty() {
        return DistributionalSection {
            bin_count,
            min: 0.0,
            max: 0.0,
            counts,
        };
    }

    let min = samples.iter().copied().fold(f32::INFINITY, f32::min) as f64;
    let max = samples.iter().copied().fold(f32::NEG_INFINITY, f32::max) as f64;
    let span = max - min;
    if span <= 0.0 {
        // Zero-span range: everything lands in the first bin.
        counts[0] = samples.len() as u64;
        return DistributionalSection {
            bin_count,
            min,
            max,
            counts,
        };
    }

    for &value in samples {
        let position = (value as f64 - min) / span * bin_count as f64;
        let bin = (position as usize).min(bin_count - 1);
        counts[bin] += 1;
    }
    DistributionalSection {
        bin_count,
        min,
        max,
        counts,
    }
}

pub(crate) fn build_spatial(signal: &Signal) -> SpatialSection {
    let channel_count = signal.channel_count();
    let mut channel_rms = Vec::with_capacity(channel_count);
    for index in 0..channel_count {
        let rms = signal
            .channel(index)
            .map(|samples| {
                if samples.is_empty() {
                    0.0
                } else {
                    let energy: f64 = samples.iter().map(|&v| v as f64 * v as f64).sum();
                    (energy / samples.len() as f64).sqrt()
                }
            })
            .unwrap_or(0.0);
        channel_rms.push(rms);
    }

    let interchannel_correlation = if channel_count >= 2 {
        match (signal.channel(0), signal.channel(1)) {
            (Some(left), Some(right)) => Some(channel_correlation(left, right)),
            _ => None,
        }
    } else {
        None
    };

    SpatialSection {
        channel_count,
        channel_rms,
        interchannel_correlation,
    }
}

/// Pearson correlation of the overlapping prefix of two channels.
fn channel_correlation(left: &[f32], right: &[f32]) -> f64 {
    let length = left.len().min(right.len());
    if length == 0 {
        return 0.0;
    }
    let l: Vec<f64> = left[..length].iter().map(|&v| v as f64).collect();
    let r: Vec<f64> = right[..length].iter().map(|&v| v as f64).collect();
    let (mean_l, std_l) = mean_std(&l);
    let (mean_r, std_r) = mean_std(&r);
    if std_l < 1e-12 || std_r < 1e-12 {
        return 0.0;
    }
    let covariance: f64 = l
        .iter()
        .zip(&r)
        .map(|(&a, &b)| (a - mean_l) * (b - mean_r))
        .sum::<f64>()
        / length as f64;
    covariance / (std_l * std_r)
}

pub(crate) fn build_standards(metrics: &WaveformMetrics) -> StandardsSection {
    StandardsSection {
        loudness_rms_dbfs: amplitude_db(metrics.rms),
        true_peak_dbtp: amplitude_db(metrics.true_peak),
    }
}

fn amplitude_db(amplitude: f64) -> f64 {
    if amplitude > 1e-6 {
        20.0 * amplitude.log10()
    } else {
        -120.0
    }
}

pub(crate) fn build_features(signal: &Signal, selection: &FeatureSelection) -> FeatureArrays {
    let samples = signal.samples();
    let mut features = FeatureArrays::default();

    if selection.power {
        let window = &samples[..samples.len().min(NAIVE_SPECTRUM_WINDOW)];
        features.power = Some(crate::core::dsp::naive_power_spectrum(window));
    }
    if selection.autocorrelation {
        let scan = &samples[..samples.len().min(16_384)];
        features.autocorrelation = Some(autocorrelation(scan, AUTOCORR_EXPORT_LAGS));
    }
    if selection.short_time_power {
        features.short_time_power = Some(decimate(short_time_power(samples), FEATURE_ARRAY_CAP));
    }
    if selection.short_time_autocorrelation {
        features.short_time_autocorrelation =
            Some(decimate(short_time_autocorrelation(samples), FEATURE_ARRAY_CAP));
    }
    features
}
