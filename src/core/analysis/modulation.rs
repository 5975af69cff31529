//! Modulation-domain summarizer
//!
//! The per-frame energy envelope (in dB) is treated as a time series:
//! mean-centered, zero-padded to a power of two, and Fourier
//! transformed to locate slow amplitude modulation between 0.5 and
//! 32 Hz.

use num_complex::Complex;
use serde::Serialize;

use super::StftResult;
use crate::core::dsp::fft_complex_forward;

const MODULATION_MIN_HZ: f64 = 0.5;
const MODULATION_MAX_HZ: f64 = 32.0;
/// Band edges for the five fixed modulation sub-bands.
const MODULATION_BAND_EDGES: [f64; 6] = [0.5, 2.0, 4.0, 8.0, 16.0, 32.0];
/// Split between the "low" and "high" halves of the range.
const LOW_HIGH_SPLIT_HZ: f64 = 4.0;
/// Fewer envelope frames than this cannot resolve the range at all.
const MIN_ENVELOPE_FRAMES: usize = 8;

/// Energy in one modulation sub-band.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ModulationBand {
    pub low_hz: f64,
    pub high_hz: f64,
    pub energy: f64,
}

/// Summary of the frame-energy modulation spectrum.
#[derive(Debug, Clone, Serialize, Default)]
pub struct ModulationSummary {
    /// Frames per second of the (stride-decimated) envelope.
    pub envelope_rate_hz: f64,
    pub dominant_hz: f64,
    pub dominant_energy: f64,
    pub bands: Vec<ModulationBand>,
    pub low_high_ratio: f64,
    /// Set when the envelope was too short to analyze.
    pub degenerate: bool,
}

/// Summarize amplitude modulation from an STFT's frame energies.
pub fn summarize_modulation(stft: &StftResult) -> ModulationSummary {
    let frame_period = stft.frame_period_seconds();
    if frame_period <= 0.0 {
        return ModulationSummary {
            degenerate: true,
            ..ModulationSummary::default()
        };
    }
    let envelope_rate_hz = 1.0 / frame_period;

    // Per-frame energy in dB.
    let mut envelope: Vec<f64> = stft
        .power
        .frames()
        .iter()
        .map(|frame| {
            let energy: f64 = frame.iter().map(|&p| (p as f64).max(0.0)).sum();
            10.0 * (energy + 1e-12).log10()
        })
        .collect();

    if envelope.len() < MIN_ENVELOPE_FRAMES {
        return ModulationSummary {
            envelope_rate_hz,
            degenerate: true,
            ..ModulationSummary::default()
        };
    }

    let mean = envelope.iter().sum::<f64>() / envelope.len() as f64;
    for value in &mut envelope {
        *value -= mean;
    }

    let padded_len = envelope.len().next_power_of_two();
    let mut buffer: Vec<Complex<f64>> = envelope
        .iter()
        .map(|&v| Complex::new(v, 0.0))
        .chain(std::iter::repeat(Complex::new(0.0, 0.0)))
        .take(padded_len)
        .collect();
    // Length is a power of two by construction.
    if fft_complex_forward(&mut buffer).is_err() {
        return ModulationSummary {
            envelope_rate_hz,
            degenerate: true,
            ..ModulationSummary::default()
        };
    }

    let bin_hz = envelope_rate_hz / padded_len as f64;
    let half = padded_len / 2;

    let mut dominant_hz = 0.0f64;
    let mut dominant_energy = 0.0f64;
    let mut band_energy = [0.0f64; 5];
    let mut low_energy = 0.0f64;
    let mut high_energy = 0.0f64;

    for bin in 1..=half {
        let freq = bin as f64 * bin_hz;
        if freq < MODULATION_MIN_HZ || freq > MODULATION_MAX_HZ {
            continue;
        }
        let energy = buffer[bin].norm_sqr();
        if energy > dominant_energy {
            dominant_energy = energy;
            dominant_hz = freq;
        }
        for (band, edge) in MODULATION_BAND_EDGES.windows(2).enumerate() {
            if freq >= edge[0] && freq < edge[1] {
                band_energy[band] += energy;
            }
        }
        if freq < LOW_HIGH_SPLIT_HZ {
            low_energy += energy;
        } else {
            high_energy += energy;
        }
    }

    let bands = MODULATION_BAND_EDGES
        .windows(2)
        .enumerate()
        .map(|(band, edge)| ModulationBand {
            low_hz: edge[0],
            high_hz: edge[1],
            energy: band_energy[band],
        })
        .collect();

    let low_high_ratio = if high_energy > 1e-12 {
        low_energy / high_energy
    } else {
        0.0
    };

    ModulationSummary {
        envelope_rate_hz,
        dominant_hz,
        dominant_energy,
        bands,
        low_high_ratio,
        degenerate: false,
    }
}
