//! Window function implementations

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

/// Window function types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum WindowType {
    Hann,
    Hamming,
    Blackman,
    Rectangular,
}

impl WindowType {
    pub fn name(&self) -> &'static str {
        match self {
            WindowType::Hann => "hann",
            WindowType::Hamming => "hamming",
            WindowType::Blackman => "blackman",
            WindowType::Rectangular => "rectangular",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "hann" => Some(WindowType::Hann),
            "hamming" => Some(WindowType::Hamming),
            "blackman" => Some(WindowType::Blackman),
            "rectangular" => Some(WindowType::Rectangular),
            _ => None,
        }
    }
}

/// Create window function weights.
///
/// Raised-cosine families are evaluated over `i / (size - 1)` so the
/// first and last taps land on the window edges; sizes of 0 or 1
/// degenerate to a single unit weight.
pub fn create_window(size: usize, window_type: WindowType) -> Vec<f32> {
    if size <= 1 {
        return vec![1.0];
    }

    let denominator = (size - 1) as f32;
    (0..size)
        .map(|i| {
            let angle = 2.0 * PI * i as f32 / denominator;
            match window_type {
                WindowType::Hann => 0.5 - 0.5 * angle.cos(),
                WindowType::Hamming => 0.54 - 0.46 * angle.cos(),
                WindowType::Blackman => 0.42 - 0.5 * angle.cos() + 0.08 * (2.0 * angle).cos(),
                WindowType::Rectangular => 1.0,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hann_window_edges_and_center() {
        let window = create_window(5, WindowType::Hann);
        assert!(window[0].abs() < 1e-6); // ~0 at edges
        assert!(window[4].abs() < 1e-6);
        assert!((window[2] - 1.0).abs() < 1e-6); // ~1 at center
    }

    #[test]
    fn test_hann_window_symmetric() {
        let window = create_window(8, WindowType::Hann);
        for i in 0..4 {
            assert!((window[i] - window[7 - i]).abs() < 1e-6);
        }
    }

    #[test]
    fn test_rectangular_all_ones() {
        let window = create_window(16, WindowType::Rectangular);
        assert!(window.iter().all(|&w| (w - 1.0).abs() < 1e-9));
    }

    #[test]
    fn test_degenerate_size_single_unit_weight() {
        assert_eq!(create_window(0, WindowType::Hann), vec![1.0]);
        assert_eq!(create_window(1, WindowType::Blackman), vec![1.0]);
    }

    #[test]
    fn test_hamming_edge_value() {
        let window = create_window(9, WindowType::Hamming);
        assert!((window[0] - 0.08).abs() < 1e-6);
    }
}
