//! The energy filter, with exponential pole-zero correction.
//!
//! For a preamplifier pulse decaying with time constant `tau`, the trailing, gap and leading
//! sums are combined with coefficients chosen so the decay cancels and the response to an
//! ideal pulse has a flat top.
use super::{TraceFilter, offset, window_span};
use crate::{Baseline, FilterParameters, Real, SampleWindows};

#[derive(Clone, Debug)]
pub struct SlowFilter {
    risetime: usize,
    gap: usize,
    baseline: Real,
    /// Coefficient of the trailing sum.
    a0: Real,
    /// Coefficient of the leading sum.
    a1: Real,
}

impl SlowFilter {
    /// Coefficient of the gap sum.
    const AG: Real = 1.0;

    pub fn new(parameters: &FilterParameters, baseline: Baseline) -> Self {
        let risetime = parameters.slow_risetime();
        let b1 = (-1.0 / parameters.tau() as Real).exp();
        let b_l = b1.powf(risetime as Real);
        Self {
            risetime,
            gap: parameters.slow_gap(),
            baseline: baseline.0,
            a0: b_l / (b_l - 1.0),
            a1: 1.0 / (1.0 - b_l),
        }
    }
}

impl TraceFilter for SlowFilter {
    fn apply(&self, samples: &SampleWindows, output: &mut [Real]) {
        let trace_len = samples.len();
        let Some(span) = window_span(self.risetime, self.gap) else {
            return;
        };
        for (i, value) in output.iter_mut().enumerate() {
            let Some(trailing_start) = (i + 1).checked_sub(span) else {
                continue;
            };
            let Some(s0) =
                samples.sum_above(offset(trailing_start), self.risetime, self.baseline)
            else {
                continue;
            };

            let gap_start = trailing_start + self.risetime;
            let gap_end = gap_start + self.gap;
            if gap_end >= trace_len {
                continue;
            }
            let Some(sg) = samples.sum_above(offset(gap_start), self.gap, self.baseline) else {
                continue;
            };

            // The leading window ends one past `i`, so the final sample is never written.
            let leading_end = gap_end + self.risetime;
            if leading_end >= trace_len {
                continue;
            }
            let Some(s1) = samples.sum_above(offset(gap_end), self.risetime, self.baseline)
            else {
                continue;
            };

            *value = self.a0 * s0 + Self::AG * sg + self.a1 * s1;
        }
    }
}
