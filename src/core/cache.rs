//! Derived-value cache
//!
//! Memoizes the expensive transform ladder (STFT → Mel → MFCC, DCT,
//! custom filterbank) per signal and parameter tuple. Keys are built
//! structurally from the signal fingerprint plus every parameter that
//! determines the stage's output — never from ambient defaults — so
//! equal keys imply equal results. Invalidation is wholesale: loading
//! a new signal, changing defaults, or replacing the custom filterbank
//! clears everything.

use std::collections::HashMap;
use std::sync::Arc;

use log::debug;

use crate::config::{CepstralParams, MelParams, StftParams};
use crate::core::analysis::{
    compute_stft, dct_on_spectrogram, mfcc_from_mel, CepstralResult, Filterbank, FilterbankMode,
    FrameMatrix, StftResult,
};
use crate::core::error::EngineError;
use crate::core::signal::{Signal, SignalId};
use crate::core::dsp::WindowType;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct StftKey {
    signal: SignalId,
    window_size: usize,
    hop_size: usize,
    window_type: WindowType,
    max_frames: usize,
    max_analysis_seconds: u32,
}

impl StftKey {
    fn new(signal: SignalId, params: &StftParams) -> Self {
        Self {
            signal,
            window_size: params.window_size,
            hop_size: params.hop_size,
            window_type: params.window_type,
            max_frames: params.max_frames,
            max_analysis_seconds: params.max_analysis_seconds,
        }
    }
}

/// Mel frequency bounds are floats; hash their bit patterns so the key
/// stays structural.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MelKey {
    stft: StftKey,
    bands: usize,
    min_hz_bits: u64,
    max_hz_bits: u64,
}

impl MelKey {
    fn new(stft: StftKey, params: &MelParams) -> Self {
        Self {
            stft,
            bands: params.bands,
            min_hz_bits: params.min_hz.to_bits(),
            max_hz_bits: params.max_hz.to_bits(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct MfccKey {
    mel: MelKey,
    coeffs: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct DctKey {
    stft: StftKey,
    coeffs: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct CustomBankKey {
    stft: StftKey,
    bank_name: String,
}

/// A mel filterbank application: band-energy matrix plus the bank
/// parameters it was built from.
#[derive(Debug, Clone)]
pub struct MelResult {
    pub matrix: FrameMatrix,
    pub bands: usize,
    pub min_hz: f64,
    pub max_hz: f64,
    pub duration_seconds: f64,
}

/// A custom filterbank application.
#[derive(Debug, Clone)]
pub struct CustomBankResult {
    pub matrix: FrameMatrix,
    pub band_count: usize,
    pub source_name: String,
    pub duration_seconds: f64,
}

/// Per-stage memoization for one analysis session.
///
/// Not synchronized: the engine is single-threaded by design, and a
/// multithreaded caller must wrap the cache in its own mutex.
#[derive(Default)]
pub struct DerivedCache {
    stft: HashMap<StftKey, Arc<StftResult>>,
    mel: HashMap<MelKey, Arc<MelResult>>,
    mfcc: HashMap<MfccKey, Arc<CepstralResult>>,
    dct: HashMap<DctKey, Arc<CepstralResult>>,
    custom: HashMap<CustomBankKey, Arc<CustomBankResult>>,
    hits: usize,
    misses: usize,
}

impl DerivedCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drop every entry. Called when the signal, global defaults, or
    /// the custom filterbank change; there is no partial invalidation.
    pub fn clear(&mut self) {
        self.stft.clear();
        self.mel.clear();
        self.mfcc.clear();
        self.dct.clear();
        self.custom.clear();
        debug!("derived cache cleared");
    }

    pub fn len(&self) -> usize {
        self.stft.len() + self.mel.len() + self.mfcc.len() + self.dct.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Lookups answered from the cache.
    pub fn hits(&self) -> usize {
        self.hits
    }

    /// Lookups that invoked a producer.
    pub fn misses(&self) -> usize {
        self.misses
    }

    /// STFT for (signal, params), computing on first use.
    pub fn stft(
        &mut self,
        signal: &Signal,
        params: &StftParams,
    ) -> Result<Arc<StftResult>, EngineError> {
        let key = StftKey::new(signal.id(), params);
        if let Some(cached) = self.stft.get(&key) {
            debug!("stft cache hit");
            self.hits += 1;
            return Ok(Arc::clone(cached));
        }
        self.misses += 1;
        let result = Arc::new(compute_stft(signal.samples(), signal.sample_rate(), params)?);
        self.stft.insert(key, Arc::clone(&result));
        Ok(result)
    }

    /// Log Mel band energies for (signal, stft params, mel params).
    pub fn mel(
        &mut self,
        signal: &Signal,
        stft_params: &StftParams,
        mel_params: &MelParams,
    ) -> Result<Arc<MelResult>, EngineError> {
        let key = MelKey::new(StftKey::new(signal.id(), stft_params), mel_params);
        if let Some(cached) = self.mel.get(&key) {
            debug!("mel cache hit");
            self.hits += 1;
            return Ok(Arc::clone(cached));
        }
        self.misses += 1;

        let stft = self.stft(signal, stft_params)?;
        let bank = Filterbank::mel(
            stft.sample_rate,
            stft.fft_size,
            mel_params.bands,
            mel_params.min_hz,
            mel_params.max_hz,
        );
        let result = Arc::new(MelResult {
            matrix: bank.apply(&stft.power, FilterbankMode::Log),
            bands: bank.band_count(),
            min_hz: mel_params.min_hz,
            max_hz: mel_params.max_hz,
            duration_seconds: stft.duration_seconds,
        });
        self.mel.insert(key, Arc::clone(&result));
        Ok(result)
    }

    /// MFCC matrix for the full parameter tuple.
    pub fn mfcc(
        &mut self,
        signal: &Signal,
        stft_params: &StftParams,
        mel_params: &MelParams,
        cepstral: &CepstralParams,
    ) -> Result<Arc<CepstralResult>, EngineError> {
        let key = MfccKey {
            mel: MelKey::new(StftKey::new(signal.id(), stft_params), mel_params),
            coeffs: cepstral.mfcc_coeffs,
        };
        if let Some(cached) = self.mfcc.get(&key) {
            debug!("mfcc cache hit");
            self.hits += 1;
            return Ok(Arc::clone(cached));
        }
        self.misses += 1;

        let mel = self.mel(signal, stft_params, mel_params)?;
        let result = Arc::new(mfcc_from_mel(&mel.matrix, cepstral.mfcc_coeffs));
        self.mfcc.insert(key, Arc::clone(&result));
        Ok(result)
    }

    /// DCT over the STFT log-magnitude rows.
    pub fn dct(
        &mut self,
        signal: &Signal,
        stft_params: &StftParams,
        cepstral: &CepstralParams,
    ) -> Result<Arc<CepstralResult>, EngineError> {
        let key = DctKey {
            stft: StftKey::new(signal.id(), stft_params),
            coeffs: cepstral.dct_coeffs,
        };
        if let Some(cached) = self.dct.get(&key) {
            debug!("dct cache hit");
            self.hits += 1;
            return Ok(Arc::clone(cached));
        }
        self.misses += 1;

        let stft = self.stft(signal, stft_params)?;
        let result = Arc::new(dct_on_spectrogram(&stft.log_magnitude, cepstral.dct_coeffs));
        self.dct.insert(key, Arc::clone(&result));
        Ok(result)
    }

    /// Custom filterbank application; `bank_name` identifies the
    /// uploaded bank and participates in the key, so replacing the
    /// bank under the same name requires a `clear()`.
    pub fn custom_filterbank(
        &mut self,
        signal: &Signal,
        stft_params: &StftParams,
        bank_name: &str,
        rows: &[Vec<f32>],
    ) -> Result<Arc<CustomBankResult>, EngineError> {
        let key = CustomBankKey {
            stft: StftKey::new(signal.id(), stft_params),
            bank_name: bank_name.to_string(),
        };
        if let Some(cached) = self.custom.get(&key) {
            debug!("custom filterbank cache hit");
            self.hits += 1;
            return Ok(Arc::clone(cached));
        }
        self.misses += 1;

        let stft = self.stft(signal, stft_params)?;
        let bank = Filterbank::from_rows(rows, stft.bin_count);
        let result = Arc::new(CustomBankResult {
            matrix: bank.apply(&stft.power, FilterbankMode::Log),
            band_count: bank.band_count(),
            source_name: bank_name.to_string(),
            duration_seconds: stft.duration_seconds,
        });
        self.custom.insert(key, Arc::clone(&result));
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AnalysisConfig;

    fn signal() -> Signal {
        let samples: Vec<f32> = (0..4096)
            .map(|i| (2.0 * std::f32::consts::PI * 440.0 * i as f32 / 8000.0).sin())
            .collect();
        Signal::from_mono(&samples, 8000)
    }

    #[test]
    fn test_stft_cached_result_is_shared() {
        let mut cache = DerivedCache::new();
        let signal = signal();
        let config = AnalysisConfig::default();
        let first = cache.stft(&signal, &config.stft).unwrap();
        let second = cache.stft(&signal, &config.stft).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_different_params_different_entries() {
        let mut cache = DerivedCache::new();
        let signal = signal();
        let a = StftParams::new(512, 75, WindowType::Hann, 20, 420);
        let b = StftParams::new(1024, 75, WindowType::Hann, 20, 420);
        let first = cache.stft(&signal, &a).unwrap();
        let second = cache.stft(&signal, &b).unwrap();
        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_mfcc_chain_populates_upstream_stages() {
        let mut cache = DerivedCache::new();
        let signal = signal();
        let config = AnalysisConfig::default();
        cache
            .mfcc(&signal, &config.stft, &config.mel, &config.cepstral)
            .unwrap();
        // STFT + mel + mfcc entries.
        assert_eq!(cache.len(), 3);
    }

    #[test]
    fn test_clear_drops_everything() {
        let mut cache = DerivedCache::new();
        let signal = signal();
        let config = AnalysisConfig::default();
        cache.stft(&signal, &config.stft).unwrap();
        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_different_signals_do_not_collide() {
        let mut cache = DerivedCache::new();
        let config = AnalysisConfig::default();
        let a = signal();
        let b = Signal::from_mono(&vec![0.25; 4096], 8000);
        cache.stft(&a, &config.stft).unwrap();
        cache.stft(&b, &config.stft).unwrap();
        assert_eq!(cache.len(), 2);
    }
}
