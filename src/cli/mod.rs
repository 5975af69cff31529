//! Command-line interface for wavelens

pub mod args;
pub mod output;

pub use args::{Args, OutputFormat};
pub use output::format_report;
