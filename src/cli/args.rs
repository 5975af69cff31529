//! CLI argument parsing

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

use crate::config::{AnalysisConfig, CepstralParams, MelParams, MetricParams, StftParams};
use crate::core::dsp::WindowType;

/// Export format for analysis results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable terminal report
    Text,
    /// Nested JSON export model
    Json,
    /// Flattened (section, metric, value) rows
    Csv,
}

#[derive(Parser, Debug)]
#[command(name = "wavelens")]
#[command(about = "Compute signal metrics and spectral features from audio files")]
pub struct Args {
    /// Input file or directory
    #[arg(short, long)]
    pub input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Output file (single input) or directory (batch); stdout when omitted
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// STFT window size (snapped to the nearest supported power of two)
    #[arg(long, default_value_t = 512)]
    pub window_size: usize,

    /// Window overlap percent (0-95)
    #[arg(long, default_value_t = 75)]
    pub overlap: u8,

    /// Analysis window function
    #[arg(long, value_enum, default_value_t = WindowType::Hann)]
    pub window: WindowType,

    /// Maximum analysis duration in seconds (1-600)
    #[arg(long, default_value_t = 20)]
    pub max_seconds: u32,

    /// Maximum retained STFT frames (32-5000)
    #[arg(long, default_value_t = 420)]
    pub max_frames: usize,

    /// Mel filterbank band count (8-256)
    #[arg(long, default_value_t = 40)]
    pub mel_bands: usize,

    /// Mel filterbank lower bound in Hz
    #[arg(long, default_value_t = 0.0)]
    pub mel_min_hz: f64,

    /// Mel filterbank upper bound in Hz
    #[arg(long, default_value_t = 8000.0)]
    pub mel_max_hz: f64,

    /// MFCC coefficient count
    #[arg(long, default_value_t = 13)]
    pub mfcc_coeffs: usize,

    /// DCT-on-spectrogram coefficient count
    #[arg(long, default_value_t = 24)]
    pub dct_coeffs: usize,

    /// Clipping detection threshold (0-1)
    #[arg(long, default_value_t = 0.99)]
    pub clip_threshold: f64,

    /// Silence detection threshold
    #[arg(long, default_value_t = 1e-4)]
    pub silence_threshold: f64,

    /// True-peak oversampling factor (1-16)
    #[arg(long, default_value_t = 4)]
    pub oversample: usize,

    /// Custom filterbank CSV (one weight row per line)
    #[arg(long)]
    pub filterbank: Option<PathBuf>,

    /// Include feature arrays (power spectrum, autocorrelation,
    /// short-time power/autocorrelation) in the export
    #[arg(long)]
    pub features: bool,

    /// Verbose output
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Assemble the (clamped) analysis configuration.
    pub fn analysis_config(&self) -> AnalysisConfig {
        AnalysisConfig {
            stft: StftParams::new(
                self.window_size,
                self.overlap,
                self.window,
                self.max_seconds,
                self.max_frames,
            ),
            mel: MelParams::new(self.mel_bands, self.mel_min_hz, self.mel_max_hz),
            cepstral: CepstralParams::new(self.mfcc_coeffs, self.dct_coeffs),
            metrics: MetricParams::new(
                self.clip_threshold,
                self.silence_threshold,
                self.oversample,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_engine_defaults() {
        let args = Args::parse_from(["wavelens", "--input", "test.wav"]);
        assert_eq!(args.analysis_config(), AnalysisConfig::default());
    }

    #[test]
    fn test_overrides_are_clamped() {
        let args = Args::parse_from([
            "wavelens",
            "--input",
            "test.wav",
            "--window-size",
            "999",
            "--overlap",
            "99",
        ]);
        let config = args.analysis_config();
        assert_eq!(config.stft.window_size, 1024);
        assert_eq!(config.stft.overlap_percent, 95);
    }
}
