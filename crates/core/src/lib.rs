//! Umit Core - A-scan signal processing
//!
//! This crate turns a raw ultrasonic capture into the enveloped A-scan
//! curve shown to operators, locates the echo peaks inside the two
//! measurement gates and derives the wall thickness from them.

pub mod buffer;
pub mod cleanup;
pub mod filter;
pub mod fft;
pub mod hilbert;
pub mod gate;
pub mod measure;
pub mod thickness;
pub mod plot;
pub mod pipeline;
pub mod error;

pub use error::{CoreError, Result};

/// Re-export commonly used types
pub mod prelude {
    pub use crate::{
        buffer::{Complex, Envelope, SampleBuffer, ScanBuffer, BUFFER_LENGTH, MAX_VALUE},
        cleanup::cleanup,
        filter::{butterworth_filter, BiquadCascade, Filter, SamplingParameters},
        fft::{FftConfig, FftProcessor},
        hilbert::{hilbert, EnvelopeMode},
        gate::{GateConfig, PeakResult},
        measure::{MeasureRecord, SensorInfo},
        thickness::ThicknessStatus,
        plot::{CanvasLayout, PlotGeometry},
        pipeline::{AScanPipeline, MeasureAnalysis},
        error::{CoreError, Result},
    };
}
