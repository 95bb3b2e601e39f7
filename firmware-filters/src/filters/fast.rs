//! The trapezoidal trigger filter.
use super::{TraceFilter, offset, window_span};
use crate::{FilterParameters, Real, SampleWindows};

/// Difference between a leading and a trailing sum of `risetime` samples, separated by `gap`
/// samples. A zero gap gives a triangular filter.
#[derive(Clone, Debug)]
pub struct FastFilter {
    risetime: usize,
    gap: usize,
}

impl FastFilter {
    pub fn new(parameters: &FilterParameters) -> Self {
        Self {
            risetime: parameters.fast_risetime(),
            gap: parameters.fast_gap(),
        }
    }
}

impl TraceFilter for FastFilter {
    fn apply(&self, samples: &SampleWindows, output: &mut [Real]) {
        // A span too large to represent cannot fit inside any trace.
        let Some(span) = window_span(self.risetime, self.gap) else {
            return;
        };
        for (i, value) in output.iter_mut().enumerate() {
            // Only the trailing window can fall off the trace.
            let Some(trailing_start) = (i + 1).checked_sub(span) else {
                continue;
            };
            let Some(trailing) = samples.sum(offset(trailing_start), self.risetime) else {
                continue;
            };
            let leading_start = i + 1 - self.risetime;
            let Some(leading) = samples.sum(offset(leading_start), self.risetime) else {
                continue;
            };
            *value = leading - trailing;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ParameterResolver, resolver::tests::unit_parameters};
    use pulse_dsp_common::Intensity;

    fn fast_filter(risetime: Real, gap: Real) -> FastFilter {
        let raw = unit_parameters(risetime, gap, 1.0, 0.0, 1.0, 0.0, 1.0);
        FastFilter::new(&ParameterResolver.resolve(&raw).unwrap().parameters)
    }

    #[test]
    fn constant_trace() {
        let output = fast_filter(4.0, 2.0).filter(&[100; 64]);
        assert_eq!(output.len(), 64);
        assert!(output.iter().all(|&v| v == 0.0));
    }

    #[test]
    fn step_trace() {
        let mut trace = vec![0; 10];
        trace.extend([100; 10]);
        let output = fast_filter(4.0, 2.0).filter(&trace);

        let expected = [
            0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, //
            100.0, 200.0, 300.0, 400.0, 400.0, 400.0, 300.0, 200.0, 100.0, 0.0,
        ];
        assert_eq!(output, expected);
    }

    #[test]
    fn leading_edge_left_as_zero() {
        // The first index with a complete trailing window is 2*4 + 2 - 1 = 9.
        let trace: Vec<_> = (1..=20).collect();
        let output = fast_filter(4.0, 2.0).filter(&trace);
        assert!(output[..9].iter().all(|&v| v == 0.0));
        // A ramp of slope one gives risetime * (risetime + gap) everywhere else.
        assert!(output[9..].iter().all(|&v| v == 24.0));
    }

    #[test]
    fn triangular_filter() {
        let output = fast_filter(2.0, 0.0).filter(&[0, 0, 0, 5, 5, 5]);
        assert_eq!(output, vec![0.0, 0.0, 0.0, 5.0, 10.0, 5.0]);
    }

    #[test]
    fn trace_shorter_than_window() {
        let output = fast_filter(4.0, 2.0).filter(&[7, 300, 2]);
        assert_eq!(output, vec![0.0; 3]);
    }

    #[test]
    fn oversized_risetime_leaves_zeros() {
        let trace: Vec<Intensity> = (1..=8).collect();
        let output = fast_filter(1e300, 0.0).filter(&trace);
        assert_eq!(output, vec![0.0; 8]);
    }

    #[test]
    fn oversized_gap_leaves_zeros() {
        let trace: Vec<Intensity> = (1..=8).collect();
        let output = fast_filter(2.0, 1e300).filter(&trace);
        assert_eq!(output, vec![0.0; 8]);
    }

    #[test]
    fn single_sample_risetime() {
        let output = fast_filter(1.0, 1.0).filter(&[1, 4, 9, 16]);
        assert_eq!(output, vec![0.0, 0.0, 8.0, 12.0]);
    }
}
