//! FFT processing with windowing
//!
//! Forward transforms only, power-of-two lengths only. Real-input
//! frames go through `realfft` (half-spectrum output, N/2+1 bins);
//! the modulation envelope uses a complex `rustfft` transform after
//! zero-padding. Neither path applies normalization — callers divide
//! by N where they need it.

use std::sync::Arc;

use num_complex::Complex;
use realfft::{RealFftPlanner, RealToComplex};
use rustfft::FftPlanner;

use super::windows::{create_window, WindowType};
use crate::core::error::{validate_fft_size, EngineError};

/// Real-input forward FFT with a pre-built analysis window.
pub struct SpectrumProcessor {
    r2c: Arc<dyn RealToComplex<f32>>,
    window: Vec<f32>,
    fft_size: usize,
}

impl SpectrumProcessor {
    pub fn new(fft_size: usize, window_type: WindowType) -> Result<Self, EngineError> {
        validate_fft_size(fft_size)?;
        let mut planner = RealFftPlanner::<f32>::new();
        Ok(Self {
            r2c: planner.plan_fft_forward(fft_size),
            window: create_window(fft_size, window_type),
            fft_size,
        })
    }

    /// Window `frame`, zero-pad to the FFT size, and transform.
    /// Returns `fft_size / 2 + 1` complex bins in standard order.
    pub fn spectrum(&self, frame: &[f32]) -> Vec<Complex<f32>> {
        let mut input = self.r2c.make_input_vec();
        for (i, slot) in input.iter_mut().enumerate() {
            let value = frame.get(i).copied().unwrap_or(0.0);
            *slot = value * self.window[i];
        }

        let mut output = self.r2c.make_output_vec();
        // Buffers come from the plan itself, so the length check cannot fail.
        self.r2c
            .process(&mut input, &mut output)
            .expect("buffers sized by plan");
        output
    }

    pub fn fft_size(&self) -> usize {
        self.fft_size
    }

    pub fn bin_count(&self) -> usize {
        self.fft_size / 2 + 1
    }
}

/// In-place complex forward FFT for the modulation envelope.
pub fn fft_complex_forward(buffer: &mut [Complex<f64>]) -> Result<(), EngineError> {
    validate_fft_size(buffer.len())?;
    let mut planner = FftPlanner::<f64>::new();
    let fft = planner.plan_fft_forward(buffer.len());
    fft.process(buffer);
    Ok(())
}
