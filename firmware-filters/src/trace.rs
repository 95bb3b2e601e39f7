//! Read-only access to a captured ADC trace.
use crate::Real;
use pulse_dsp_common::Intensity;
use std::convert::Infallible;

/// Length of the digitiser's diagnostic trace buffer.
pub const MAX_TRACE_LENGTH: usize = 8192;

/// Number of samples at each end of the trace used to estimate the baseline.
pub const BASELINE_SAMPLES: usize = 5;

/// Implement for collaborators which capture traces from a channel.
pub trait TraceSource {
    type Error: std::error::Error + Send + Sync + 'static;

    fn get_trace(&self) -> Result<Vec<Intensity>, Self::Error>;
}

impl TraceSource for Vec<Intensity> {
    type Error = Infallible;

    fn get_trace(&self) -> Result<Vec<Intensity>, Infallible> {
        Ok(self.clone())
    }
}

/// Answers bounded sums over contiguous windows of a trace.
///
/// Prefix sums are accumulated once, so each window sum costs two lookups.
#[derive(Clone, Debug)]
pub struct SampleWindows {
    /// `prefix[j]` holds the sum of the first `j` samples.
    prefix: Vec<u64>,
}

impl SampleWindows {
    pub fn new(trace: &[Intensity]) -> Self {
        let prefix = std::iter::once(0)
            .chain(trace.iter().scan(0u64, |total, &sample| {
                *total += u64::from(sample);
                Some(*total)
            }))
            .collect();
        Self { prefix }
    }

    /// Number of samples in the trace.
    pub fn len(&self) -> usize {
        self.prefix.len() - 1
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the `len` samples beginning at `start`.
    ///
    /// Returns [None] if any part of the window lies outside the trace.
    pub fn sum(&self, start: isize, len: usize) -> Option<Real> {
        let start = usize::try_from(start).ok()?;
        let end = start.checked_add(len)?;
        let total = self.prefix.get(end)? - self.prefix.get(start)?;
        Some(total as Real)
    }

    /// As [Self::sum], but with `baseline` subtracted from every sample.
    pub fn sum_above(&self, start: isize, len: usize, baseline: Real) -> Option<Real> {
        self.sum(start, len)
            .map(|total| total - baseline * len as Real)
    }
}

/// The no-signal level of a trace.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Baseline(pub Real);

impl Baseline {
    /// Takes the lesser of the means of the first and last [BASELINE_SAMPLES] samples,
    /// using the whole trace if it is shorter. Returns [None] for an empty trace.
    pub fn estimate(trace: &[Intensity]) -> Option<Self> {
        let head = trace.get(..BASELINE_SAMPLES).unwrap_or(trace);
        let tail = trace
            .get(trace.len().saturating_sub(BASELINE_SAMPLES)..)
            .unwrap_or(trace);
        Some(Self(mean(head)?.min(mean(tail)?)))
    }
}

fn mean(samples: &[Intensity]) -> Option<Real> {
    (!samples.is_empty()).then(|| {
        samples.iter().copied().map(Real::from).sum::<Real>() / samples.len() as Real
    })
}
