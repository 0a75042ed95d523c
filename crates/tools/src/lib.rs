//! Umit Tools library

pub mod analyze;
pub mod common;
pub mod config;
pub mod plot;
pub mod synth;

pub use analyze::{summary, AnalyzeConfig, MeasureAnalyzer};
pub use common::{init_logging, CaptureFormat};
pub use config::UmitConfig;
pub use plot::{run_plot, PlotConfig};
pub use synth::{synthesize, SynthConfig};
