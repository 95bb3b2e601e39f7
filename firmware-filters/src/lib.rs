//! Reconstructs, in software, the trigger ("fast"), constant fraction discriminator and
//! energy ("slow") filter outputs which the digitiser firmware computes from raw ADC samples.
//!
//! The outputs are intended for checking firmware filter settings against a captured trace.
//! Typical usage looks like:
//! ```rust
//! use firmware_filters::{ChannelParameters, TraceAnalyzer};
//!
//! let parameters = ChannelParameters {
//!     xdt: 0.01,
//!     fast_risetime: 0.04,
//!     fast_gap: 0.02,
//!     cfd_scale: 4.0,
//!     cfd_delay: 0.03,
//!     slow_risetime: 0.1,
//!     slow_gap: 0.05,
//!     tau: 0.5,
//! };
//! let trace = vec![100; 256];
//! let analysis = TraceAnalyzer.analyze(&trace, &parameters)?;
//! assert_eq!(analysis.traces.slow.len(), trace.len());
//! # Ok::<(), firmware_filters::AnalysisError>(())
//! ```
mod analyzer;
pub mod filters;
mod parameters;
mod resolver;
mod trace;

pub use analyzer::{Analysis, AnalysisError, FilterTraces, ToFilterParameters, TraceAnalyzer};
pub use parameters::{ChannelParameter, ChannelParameterSource, ChannelParameters, ParameterError};
pub use resolver::{DisplayWarning, FilterParameters, MAX_CFD_SCALE, ParameterResolver, Resolution};
pub use trace::{BASELINE_SAMPLES, Baseline, MAX_TRACE_LENGTH, SampleWindows, TraceSource};

pub type Real = f64;
