//! The constant fraction discriminator.
//!
//! The discriminator is evaluated on the raw trace rather than on the output of the fast
//! filter, reusing the fast filter's geometry. With `L = fast_risetime - 1`,
//! `B = fast_risetime + fast_gap`, `D = cfd_delay` and `w = 1 - cfd_scale/8`, the value at
//! index `k` is
//! ```text
//! w * (S(k) - S(k - B)) - (S(k - D) - S(k - D - B))
//! ```
//! where `S(j)` sums the `L` samples starting at `j`.
use super::{TraceFilter, offset};
use crate::{FilterParameters, Real, SampleWindows};

#[derive(Clone, Debug)]
pub struct CfdFilter {
    /// Length of each of the four partial sums.
    length: usize,
    /// Separation between the leading and trailing sums of each pair.
    separation: usize,
    delay: usize,
    /// Weight applied to the undelayed pair.
    weight: Real,
}

impl CfdFilter {
    pub fn new(parameters: &FilterParameters) -> Self {
        let risetime = parameters.fast_risetime();
        Self {
            length: risetime.saturating_sub(1),
            separation: risetime.saturating_add(parameters.fast_gap()),
            delay: parameters.cfd_delay(),
            weight: 1.0 - Real::from(parameters.cfd_scale()) / 8.0,
        }
    }
}

impl TraceFilter for CfdFilter {
    fn apply(&self, samples: &SampleWindows, output: &mut [Real]) {
        let trace_len = samples.len();
        // `k - delay - separation >= 0` holds exactly when `i >= length + separation`.
        let Some(first) = self.length.checked_add(self.separation) else {
            return;
        };

        for i in first..trace_len {
            // `k + length < trace_len` holds exactly when `i + delay < trace_len`.
            if i.checked_add(self.delay).is_none_or(|end| end >= trace_len) {
                break;
            }
            // The output lands `delay - length` samples after the trace index.
            let k = i - self.length + self.delay;
            let sum = |start| samples.sum(offset(start), self.length);
            let (Some(s0), Some(s1), Some(s2), Some(s3)) = (
                sum(k),
                sum(k - self.separation),
                sum(k - self.delay),
                sum(k - self.delay - self.separation),
            ) else {
                continue;
            };
            if let Some(value) = output.get_mut(k) {
                *value = self.weight * (s0 - s1) - (s2 - s3);
            }
        }
    }
}
