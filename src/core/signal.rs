//! Signal container and finite-value sanitization
//!
//! Every analysis entry point reads through a `Signal`, which owns a
//! dense, finite sample buffer: NaN and infinite values are replaced by
//! zero at construction so no downstream computation ever sees them.

/// Replace non-finite entries (NaN, ±Inf) with zero.
///
/// Empty input yields empty output; length is always preserved.
pub fn sanitize_samples(input: &[f32]) -> Vec<f32> {
    input
        .iter()
        .map(|&v| if v.is_finite() { v } else { 0.0 })
        .collect()
}

/// Identity of a signal's content and shape, used as the cache key
/// component. A digest over the shape fields plus a bounded stride
/// sample of the content — deliberately not a full-content hash, so
/// fingerprinting stays O(1)-ish on long recordings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignalId([u8; 16]);

const FINGERPRINT_SAMPLE_CAP: usize = 4096;

fn fingerprint(mono: &[f32], channels: usize, sample_rate: u32) -> SignalId {
    let mut ctx = md5::Context::new();
    ctx.consume((mono.len() as u64).to_le_bytes());
    ctx.consume((channels as u32).to_le_bytes());
    ctx.consume(sample_rate.to_le_bytes());

    let stride = (mono.len() / FINGERPRINT_SAMPLE_CAP).max(1);
    for &value in mono.iter().step_by(stride) {
        ctx.consume(value.to_bits().to_le_bytes());
    }

    SignalId(ctx.compute().0)
}

/// A decoded audio clip: sanitized samples plus sample rate.
///
/// Multi-channel input keeps its per-channel buffers (for the spatial
/// report section) alongside an averaged mono view that all spectral
/// and temporal analysis reads. Signals are immutable after
/// construction; re-decoding produces a new `Signal` with a new id.
#[derive(Debug, Clone)]
pub struct Signal {
    mono: Vec<f32>,
    channels: Vec<Vec<f32>>,
    sample_rate: u32,
    id: SignalId,
}

impl Signal {
    /// Build a signal from a single mono buffer.
    pub fn from_mono(samples: &[f32], sample_rate: u32) -> Self {
        let mono = sanitize_samples(samples);
        let id = fingerprint(&mono, 1, sample_rate);
        Self {
            mono,
            channels: Vec::new(),
            sample_rate,
            id,
        }
    }

    /// Build a signal from per-channel buffers; the mono view is the
    /// per-index channel average. Channels shorter than the longest are
    /// treated as zero-padded.
    pub fn from_channels(channels: Vec<Vec<f32>>, sample_rate: u32) -> Self {
        if channels.len() <= 1 {
            let samples = channels.into_iter().next().unwrap_or_default();
            return Self::from_mono(&samples, sample_rate);
        }

        let sanitized: Vec<Vec<f32>> = channels.iter().map(|ch| sanitize_samples(ch)).collect();
        let longest = sanitized.iter().map(Vec::len).max().unwrap_or(0);
        let mut mono = vec![0.0f32; longest];
        for channel in &sanitized {
            for (index, &value) in channel.iter().enumerate() {
                mono[index] += value;
            }
        }
        let scale = 1.0 / sanitized.len() as f32;
        for value in &mut mono {
            *value *= scale;
        }

        let id = fingerprint(&mono, sanitized.len(), sample_rate);
        Self {
            mono,
            channels: sanitized,
            sample_rate,
            id,
        }
    }

    /// The mono analysis view.
    pub fn samples(&self) -> &[f32] {
        &self.mono
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn len(&self) -> usize {
        self.mono.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mono.is_empty()
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len().max(1)
    }

    /// Per-channel buffer; `None` for a mono-constructed signal's
    /// out-of-range indexes.
    pub fn channel(&self, index: usize) -> Option<&[f32]> {
        if self.channels.is_empty() {
            (index == 0).then_some(self.mono.as_slice())
        } else {
            self.channels.get(index).map(Vec::as_slice)
        }
    }

    pub fn duration_seconds(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.mono.len() as f64 / self.sample_rate as f64
    }

    /// Content+shape fingerprint used by the derived-value cache.
    pub fn id(&self) -> SignalId {
        self.id
    }
}
