//! Engine error taxonomy
//!
//! The only hard failure in the engine is a structurally invalid FFT
//! size. Degenerate numeric input (empty signals, zero-energy frames,
//! NaN/Inf samples) never errors; each computation returns a documented
//! neutral value instead, and out-of-range parameters are clamped at
//! config construction.

use thiserror::Error;

/// Errors raised by the analysis engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum EngineError {
    /// The forward FFT only accepts power-of-two lengths.
    #[error("FFT size must be a power of two, got {size}")]
    InvalidFftSize { size: usize },
}

/// Validate an FFT length before planning a transform.
pub fn validate_fft_size(size: usize) -> Result<(), EngineError> {
    if size == 0 || !size.is_power_of_two() {
        return Err(EngineError::InvalidFftSize { size });
    }
    Ok(())
}
