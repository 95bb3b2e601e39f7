//! Runs the fast, CFD and slow filters over a trace.
use crate::{
    Baseline, ChannelParameterSource, ChannelParameters, DisplayWarning, FilterParameters,
    ParameterError, ParameterResolver, Real, Resolution, SampleWindows, TraceSource,
    filters::{CfdFilter, FastFilter, SlowFilter, TraceFilter},
};
use pulse_dsp_common::Intensity;
use thiserror::Error;
use tracing::{debug, instrument};

#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Cannot analyse an empty trace")]
    EmptyTrace,
    #[error(transparent)]
    Parameter(#[from] ParameterError),
    #[error("Failed to acquire trace: {0}")]
    TraceSource(Box<dyn std::error::Error + Send + Sync>),
}

/// Implement for anything which can supply resolved filter parameters.
pub trait ToFilterParameters {
    fn to_filter_parameters(&self) -> Result<Resolution, ParameterError>;
}

impl ToFilterParameters for ChannelParameters {
    fn to_filter_parameters(&self) -> Result<Resolution, ParameterError> {
        ParameterResolver.resolve(self)
    }
}

impl ToFilterParameters for FilterParameters {
    fn to_filter_parameters(&self) -> Result<Resolution, ParameterError> {
        Ok(Resolution {
            parameters: *self,
            warning: None,
        })
    }
}

impl ToFilterParameters for Resolution {
    fn to_filter_parameters(&self) -> Result<Resolution, ParameterError> {
        Ok(*self)
    }
}

/// The three filter outputs, each as long as the analysed trace.
#[derive(Clone, Debug, PartialEq)]
pub struct FilterTraces {
    pub fast: Vec<Real>,
    pub cfd: Vec<Real>,
    pub slow: Vec<Real>,
}

impl FilterTraces {
    pub fn len(&self) -> usize {
        self.fast.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fast.is_empty()
    }
}

/// Result of [TraceAnalyzer::analyze].
#[derive(Clone, Debug, PartialEq)]
pub struct Analysis {
    pub traces: FilterTraces,
    /// The parameters the filters were evaluated with.
    pub parameters: FilterParameters,
    pub warning: Option<DisplayWarning>,
}

/// Stateless entry point to the filter pipeline.
///
/// Holds no trace or output between calls, so a single instance can be shared between threads.
#[derive(Clone, Copy, Debug, Default)]
pub struct TraceAnalyzer;

impl TraceAnalyzer {
    /// Computes the fast, CFD and slow filter outputs of `trace`.
    ///
    /// `parameters` may be raw [ChannelParameters], which are resolved first, or
    /// already-resolved [FilterParameters].
    /// # Parameters
    /// - trace: raw ADC samples, which are not modified.
    /// - parameters: the channel's filter settings.
    #[instrument(skip_all, fields(trace_length = trace.len()), err(level = "warn"))]
    pub fn analyze<P>(
        &self,
        trace: &[Intensity],
        parameters: &P,
    ) -> Result<Analysis, AnalysisError>
    where
        P: ToFilterParameters + ?Sized,
    {
        // Only an empty trace has no baseline.
        let Some(baseline) = Baseline::estimate(trace) else {
            return Err(AnalysisError::EmptyTrace);
        };
        let Resolution {
            parameters,
            warning,
        } = parameters.to_filter_parameters()?;
        debug!("Baseline: {}", baseline.0);

        let samples = SampleWindows::new(trace);
        let fast = run_filter(&FastFilter::new(&parameters), &samples);
        let cfd = run_filter(&CfdFilter::new(&parameters), &samples);
        let slow = run_filter(&SlowFilter::new(&parameters, baseline), &samples);

        Ok(Analysis {
            traces: FilterTraces { fast, cfd, slow },
            parameters,
            warning,
        })
    }

    /// Acquires a trace and channel parameters from the given collaborators, then calls [Self::analyze].
    pub fn analyze_source<T, S>(
        &self,
        trace_source: &T,
        parameter_source: &S,
    ) -> Result<Analysis, AnalysisError>
    where
        T: TraceSource + ?Sized,
        S: ChannelParameterSource + ?Sized,
    {
        let trace = trace_source
            .get_trace()
            .map_err(|e| AnalysisError::TraceSource(Box::new(e)))?;
        let parameters = ChannelParameters::from_source(parameter_source)?;
        self.analyze(&trace, &parameters)
    }
}

#[instrument(skip_all, level = "trace")]
fn run_filter<F: TraceFilter>(filter: &F, samples: &SampleWindows) -> Vec<Real> {
    let mut output = vec![0.0; samples.len()];
    filter.apply(samples, &mut output);
    output
}
