//! Wavelens - audio signal metrics for exploratory analysis
//!
//! A single-threaded analysis engine that turns decoded sample buffers
//! into quantitative descriptors: time-domain statistics, windowed
//! Fourier and Mel/MFCC transforms, pitch and periodicity estimates,
//! spectral/modulation/onset summaries, and a flattened CSV/JSON
//! export of the resulting report.
//!
//! ## Module Structure
//!
//! - `core` - analysis engine: DSP primitives, stages, cache, reports
//! - `config` - clamped analysis parameters
//! - `export` - report flattening and CSV/JSON emission
//! - `cli` - command-line interface
//! - `testgen` - deterministic test-signal generators
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use wavelens::config::AnalysisConfig;
//! use wavelens::core::{Analyzer, FeatureSelection, Signal};
//!
//! let signal = Signal::from_mono(&samples, 44_100);
//! let mut analyzer = Analyzer::new(AnalysisConfig::default());
//! let report = analyzer.analyze(&signal, Some("clip.wav"), &FeatureSelection::default())?;
//! println!("rms = {:.4}", report.audio.metrics.rms);
//! ```
//!
//! Repeated analysis of the same signal under the same configuration
//! is answered from the derived-value cache; parameter sweeps only
//! recompute the stages whose parameters actually changed.

// Core analysis engine
pub mod core;

// Command-line interface
pub mod cli;

// Configuration and parameter clamping
pub mod config;

// Report export (CSV/JSON)
pub mod export;

// Test-signal generation
pub mod testgen;

// Re-export commonly used types at crate root for convenience
pub use crate::config::{AnalysisConfig, CepstralParams, MelParams, MetricParams, StftParams};
pub use crate::core::{
    Analyzer, AnalyzerBuilder, DerivedCache, EngineError, FeatureSelection, MetricsReport, Signal,
};
pub use crate::export::{build_metrics_csv, build_metrics_json, ExportSelection};
