//! High-level analysis API with builder-style configuration
//!
//! The `Analyzer` owns the configuration, the derived-value cache, and
//! the optional custom filterbank, and assembles one `MetricsReport`
//! per call. Execution is strictly single-threaded and synchronous;
//! the bounded caps inside each stage are the backpressure mechanism.

use chrono::Utc;
use log::debug;

use crate::config::AnalysisConfig;
use crate::core::analysis::{
    compute_waveform_metrics, detect_onsets, estimate_fundamental, summarize_modulation,
    summarize_spectrum, track_pitch,
};
use crate::core::cache::DerivedCache;
use crate::core::dsp::stats::mean_std;
use crate::core::error::EngineError;
use crate::core::report::{
    build_features, build_histogram, build_spatial, build_standards, build_statistical,
    short_time_power, AudioSection, AvailabilityNote, CustomBankSection, FeatureSelection,
    MetricsReport, SpectrogramSection, SpeechSection, TemporalSection,
};
use crate::core::signal::Signal;

const HISTOGRAM_BINS: usize = 64;
/// Fundamental-proxy search range, in Hz.
const FUNDAMENTAL_MIN_HZ: f64 = 40.0;
const FUNDAMENTAL_MAX_HZ: f64 = 500.0;
/// Pitch tracking needs at least this many samples to say anything.
const SPEECH_MIN_SAMPLES: usize = 2048;

/// Builder for `Analyzer` configuration.
pub struct AnalyzerBuilder {
    config: AnalysisConfig,
    custom_bank: Option<(String, Vec<Vec<f32>>)>,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            config: AnalysisConfig::default(),
            custom_bank: None,
        }
    }

    pub fn config(mut self, config: AnalysisConfig) -> Self {
        self.config = config;
        self
    }

    pub fn custom_filterbank(mut self, name: impl Into<String>, rows: Vec<Vec<f32>>) -> Self {
        self.custom_bank = Some((name.into(), rows));
        self
    }

    pub fn build(self) -> Analyzer {
        Analyzer {
            config: self.config,
            cache: DerivedCache::new(),
            custom_bank: self.custom_bank,
        }
    }
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Stateful analysis session: one configuration, one cache.
pub struct Analyzer {
    config: AnalysisConfig,
    cache: DerivedCache,
    custom_bank: Option<(String, Vec<Vec<f32>>)>,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        AnalyzerBuilder::new().config(config).build()
    }

    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Swap the configuration; the cache is cleared wholesale (keys
    /// would differ anyway, but stale entries of an abandoned config
    /// have no reason to stay resident).
    pub fn set_config(&mut self, config: AnalysisConfig) {
        if self.config != config {
            self.config = config;
            self.cache.clear();
        }
    }

    /// Replace (or install) the custom filterbank; clears the cache.
    pub fn set_custom_filterbank(&mut self, name: impl Into<String>, rows: Vec<Vec<f32>>) {
        self.custom_bank = Some((name.into(), rows));
        self.cache.clear();
    }

    pub fn cache(&self) -> &DerivedCache {
        &self.cache
    }

    /// Run the full analysis and assemble the report.
    pub fn analyze(
        &mut self,
        signal: &Signal,
        file_name: Option<&str>,
        selection: &FeatureSelection,
    ) -> Result<MetricsReport, EngineError> {
        debug!(
            "analyzing {} samples at {} Hz",
            signal.len(),
            signal.sample_rate()
        );
        let mut availability = Vec::new();

        let metrics = compute_waveform_metrics(signal.samples(), &self.config.metrics);
        let audio = AudioSection {
            duration_seconds: signal.duration_seconds(),
            sample_rate: signal.sample_rate(),
            metrics,
        };

        let stft = self.cache.stft(signal, &self.config.stft)?;
        let spectral = summarize_spectrum(&stft);
        let modulation = summarize_modulation(&stft);
        if modulation.degenerate {
            availability.push(AvailabilityNote {
                section: "modulation".to_string(),
                reason: "envelope too short to resolve 0.5-32 Hz".to_string(),
            });
        }

        let st_power = short_time_power(signal.samples());
        let (st_mean, st_std) = mean_std(&st_power);
        let temporal = TemporalSection {
            periodicity: estimate_fundamental(
                signal.samples(),
                signal.sample_rate(),
                FUNDAMENTAL_MIN_HZ,
                FUNDAMENTAL_MAX_HZ,
            ),
            short_time_power_mean: st_mean,
            short_time_power_std: st_std,
            onsets: detect_onsets(&stft),
        };

        let mel = self
            .cache
            .mel(signal, &self.config.stft, &self.config.mel)?;
        let mfcc = self.cache.mfcc(
            signal,
            &self.config.stft,
            &self.config.mel,
            &self.config.cepstral,
        )?;
        let spectrogram = SpectrogramSection {
            frame_count: stft.frame_count(),
            mel_bands: mel.bands,
            mel_min_hz: mel.min_hz,
            mel_max_hz: mel.max_hz,
            mel_band_means: mel.matrix.bin_means(),
            mfcc_coeffs: mfcc.coeffs,
            mfcc_means: mfcc.matrix.bin_means(),
            dct_coeffs: self.config.cepstral.dct_coeffs,
        };

        let custom_filterbank = match &self.custom_bank {
            Some((name, rows)) => {
                let name = name.clone();
                let rows = rows.clone();
                let result =
                    self.cache
                        .custom_filterbank(signal, &self.config.stft, &name, &rows)?;
                Some(CustomBankSection {
                    source_name: result.source_name.clone(),
                    band_count: result.band_count,
                    band_means: result.matrix.bin_means(),
                })
            }
            None => None,
        };

        let speech = if signal.len() >= SPEECH_MIN_SAMPLES {
            Some(SpeechSection {
                pitch: track_pitch(signal.samples(), signal.sample_rate()),
            })
        } else {
            availability.push(AvailabilityNote {
                section: "speech".to_string(),
                reason: format!(
                    "signal shorter than {} samples; pitch tracking skipped",
                    SPEECH_MIN_SAMPLES
                ),
            });
            None
        };

        Ok(MetricsReport {
            generated_at: Utc::now().to_rfc3339(),
            file_name: file_name.map(str::to_string),
            sample_count: signal.len(),
            config: self.config,
            audio,
            temporal,
            spectral,
            spectrogram,
            custom_filterbank,
            modulation,
            speech,
            statistical: build_statistical(signal.samples()),
            distributional: build_histogram(signal.samples(), HISTOGRAM_BINS),
            spatial: build_spatial(signal),
            standards: build_standards(&metrics),
            features: build_features(signal, selection),
            availability,
        })
    }
}
