// src/testgen/mod.rs
//
// Deterministic test-signal generation for validation and benchmarks.
// Provides the canonical waveforms the engine's documented properties
// are stated against (silence, sine, square, impulse, noise) plus a
// WAV writer so CLI users can produce fixture files.

use std::f64::consts::PI;
use std::path::Path;

use anyhow::{Context, Result};

/// All-zero signal.
pub fn silence(length: usize) -> Vec<f32> {
    vec![0.0; length]
}

/// Pure sine at `hz`, `amplitude` peak.
pub fn sine_wave(sample_rate: u32, hz: f64, seconds: f64, amplitude: f32) -> Vec<f32> {
    let count = (sample_rate as f64 * seconds) as usize;
    (0..count)
        .map(|i| amplitude * (2.0 * PI * hz * i as f64 / sample_rate as f64).sin() as f32)
        .collect()
}

/// Square wave from the sign of a sine.
pub fn square_wave(sample_rate: u32, hz: f64, seconds: f64, amplitude: f32) -> Vec<f32> {
    let count = (sample_rate as f64 * seconds) as usize;
    (0..count)
        .map(|i| {
            let phase = (2.0 * PI * hz * i as f64 / sample_rate as f64).sin();
            if phase >= 0.0 {
                amplitude
            } else {
                -amplitude
            }
        })
        .collect()
}

/// Single-sample impulse at `position`.
pub fn impulse(length: usize, position: usize, amplitude: f32) -> Vec<f32> {
    let mut samples = vec![0.0f32; length];
    if position < length {
        samples[position] = amplitude;
    }
    samples
}

/// Deterministic pseudo-noise from a linear congruential generator;
/// the same seed always yields the same sequence.
pub fn noise(length: usize, amplitude: f32, seed: u64) -> Vec<f32> {
    let mut state = seed.wrapping_mul(6364136223846793005).wrapping_add(1442695040888963407);
    (0..length)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            let unit = (state >> 11) as f64 / (1u64 << 53) as f64;
            amplitude * (2.0 * unit - 1.0) as f32
        })
        .collect()
}

/// Hard-clip a signal at ±`limit`.
pub fn clamp_signal(samples: &[f32], limit: f32) -> Vec<f32> {
    samples.iter().map(|&v| v.clamp(-limit, limit)).collect()
}

/// Write a mono signal as 16-bit PCM WAV.
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec)
        .with_context(|| format!("Failed to create WAV file: {}", path.display()))?;
    for &sample in samples {
        let scaled = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(scaled)?;
    }
    writer.finalize().context("Failed to finalize WAV file")?;
    Ok(())
}
