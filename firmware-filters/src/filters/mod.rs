//! Software reconstructions of the digitiser's firmware filters.
//!
//! Each filter writes one output value per trace sample. Any index whose window does not
//! fit inside the trace is left untouched, so callers starting from a zeroed buffer see
//! exactly `0.0` there.
//!
//! # Example
//! ```rust
//! # use firmware_filters::{ChannelParameters, ParameterResolver, filters::{FastFilter, TraceFilter}};
//! # let raw = ChannelParameters { xdt: 1.0, fast_risetime: 2.0, fast_gap: 0.0, cfd_scale: 0.0,
//! #     cfd_delay: 1.0, slow_risetime: 2.0, slow_gap: 0.0, tau: 4.0 };
//! let parameters = ParameterResolver.resolve(&raw)?.parameters;
//! let fast = FastFilter::new(&parameters).filter(&[0, 0, 0, 5, 5, 5]);
//! assert_eq!(fast, vec![0.0, 0.0, 0.0, 5.0, 10.0, 5.0]);
//! # Ok::<(), firmware_filters::ParameterError>(())
//! ```
pub mod cfd;
pub mod fast;
pub mod slow;

pub use cfd::CfdFilter;
pub use fast::FastFilter;
pub use slow::SlowFilter;

use crate::{Real, SampleWindows};
use pulse_dsp_common::Intensity;

/// Implement for filters which are evaluated over a whole trace.
pub trait TraceFilter {
    /// Writes the filter's response into `output`, which should be as long as the trace.
    ///
    /// Indices whose window lies partly outside the trace are not written.
    fn apply(&self, samples: &SampleWindows, output: &mut [Real]);

    /// Applies the filter to `trace`, returning a new output of the same length.
    fn filter(&self, trace: &[Intensity]) -> Vec<Real> {
        let mut output = vec![0.0; trace.len()];
        self.apply(&SampleWindows::new(trace), &mut output);
        output
    }
}

/// Samples covered by a trailing sum, a gap and a leading sum, or [None] on overflow.
pub(crate) fn window_span(risetime: usize, gap: usize) -> Option<usize> {
    risetime.checked_mul(2)?.checked_add(gap)
}

/// Converts a sample count to a signed offset; trace lengths are far below `isize::MAX`.
pub(crate) fn offset(samples: usize) -> isize {
    isize::try_from(samples).unwrap_or(isize::MAX)
}
