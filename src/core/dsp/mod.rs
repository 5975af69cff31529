//! DSP primitives: windows, forward FFTs, direct transforms, statistics

pub mod dct;
pub mod fft;
pub mod stats;
pub mod windows;

pub use dct::{dct_rows, dct_vector, naive_power_spectrum};
pub use fft::{fft_complex_forward, SpectrumProcessor};
pub use windows::{create_window, WindowType};
