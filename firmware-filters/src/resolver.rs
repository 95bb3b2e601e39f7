//! Converts the channel's time-valued settings into the integer sample counts used by the filters.
//!
//! Time parameters are divided by the sampling interval and rounded half-to-even, so
//! `25 / 10` resolves to `2` and `35 / 10` resolves to `4`.
use crate::{
    Real,
    parameters::{ChannelParameters, ParameterError},
};
use std::fmt::{Display, Formatter};
use tracing::{debug, instrument, warn};

/// Largest code accepted for the CFD attenuation.
pub const MAX_CFD_SCALE: u8 = 7;

/// Filter geometry in units of samples.
///
/// This can only be obtained from [ParameterResolver::resolve], which guarantees that
/// the rise times, `cfd_delay` and `tau` are at least one sample.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FilterParameters {
    xdt: Real,
    fast_risetime: usize,
    fast_gap: usize,
    cfd_delay: usize,
    cfd_scale: u8,
    slow_risetime: usize,
    slow_gap: usize,
    tau: usize,
}

impl FilterParameters {
    /// Sampling interval, in time units per sample.
    pub fn xdt(&self) -> Real {
        self.xdt
    }

    pub fn fast_risetime(&self) -> usize {
        self.fast_risetime
    }

    pub fn fast_gap(&self) -> usize {
        self.fast_gap
    }

    pub fn cfd_delay(&self) -> usize {
        self.cfd_delay
    }

    /// Attenuation code in `[0, 7]`; the delayed signal is weighted by `1 - cfd_scale/8`.
    pub fn cfd_scale(&self) -> u8 {
        self.cfd_scale
    }

    pub fn slow_risetime(&self) -> usize {
        self.slow_risetime
    }

    pub fn slow_gap(&self) -> usize {
        self.slow_gap
    }

    pub fn tau(&self) -> usize {
        self.tau
    }
}

impl Display for FilterParameters {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "xdt={}, fast_risetime={}, fast_gap={}, cfd_delay={}, cfd_scale={}, slow_risetime={}, slow_gap={}, tau={}",
            self.xdt,
            self.fast_risetime,
            self.fast_gap,
            self.cfd_delay,
            self.cfd_scale,
            self.slow_risetime,
            self.slow_gap,
            self.tau
        )
    }
}

/// A non-fatal condition which degrades the usefulness of the filter display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum DisplayWarning {
    /// The fast filter spans no more than one sampling interval.
    FastFilterTooShort {
        fast_risetime: Real,
        fast_gap: Real,
        xdt: Real,
    },
}

impl Display for DisplayWarning {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::FastFilterTooShort {
                fast_risetime,
                fast_gap,
                xdt,
            } => write!(
                f,
                "Fast filter window 2*{fast_risetime} + {fast_gap} does not exceed the sampling interval {xdt}, the trigger filter display will be poor"
            ),
        }
    }
}

/// The outcome of resolving a set of channel parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Resolution {
    pub parameters: FilterParameters,
    pub warning: Option<DisplayWarning>,
}

/// Converts [ChannelParameters] into [FilterParameters].
#[derive(Clone, Copy, Debug, Default)]
pub struct ParameterResolver;

impl ParameterResolver {
    /// Resolves each time parameter to a number of samples.
    ///
    /// Fails only if a parameter is not finite or the sampling interval is not positive.
    /// A fast filter window which is too short is reported in [Resolution::warning].
    #[instrument(skip_all, level = "debug", err(level = "warn"))]
    pub fn resolve(&self, raw: &ChannelParameters) -> Result<Resolution, ParameterError> {
        raw.validate()?;
        let xdt = raw.xdt;

        let warning = (2.0 * raw.fast_risetime + raw.fast_gap <= xdt).then_some(
            DisplayWarning::FastFilterTooShort {
                fast_risetime: raw.fast_risetime,
                fast_gap: raw.fast_gap,
                xdt,
            },
        );
        if let Some(warning) = &warning {
            warn!("{warning}");
        }

        let parameters = FilterParameters {
            xdt,
            fast_risetime: at_least_one_sample(raw.fast_risetime, xdt),
            fast_gap: samples(raw.fast_gap, xdt),
            cfd_delay: at_least_one_sample(raw.cfd_delay, xdt),
            cfd_scale: cfd_scale_code(raw.cfd_scale),
            slow_risetime: at_least_one_sample(raw.slow_risetime, xdt),
            slow_gap: samples(raw.slow_gap, xdt),
            tau: at_least_one_sample(raw.tau, xdt),
        };
        debug!("Resolved filter parameters: {parameters}");

        Ok(Resolution {
            parameters,
            warning,
        })
    }
}

/// Number of whole samples closest to `value`, never negative.
fn samples(value: Real, xdt: Real) -> usize {
    (value / xdt).round_ties_even().max(0.0) as usize
}

/// As [samples], but any value shorter than one sampling interval is one sample.
fn at_least_one_sample(value: Real, xdt: Real) -> usize {
    if value < xdt { 1 } else { samples(value, xdt) }
}

fn cfd_scale_code(value: Real) -> u8 {
    value.trunc().clamp(0.0, MAX_CFD_SCALE as Real) as u8
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Parameters with a unit sampling interval, so each value is already a sample count.
    pub(crate) fn unit_parameters(
        fast_risetime: Real,
        fast_gap: Real,
        cfd_delay: Real,
        cfd_scale: Real,
        slow_risetime: Real,
        slow_gap: Real,
        tau: Real,
    ) -> ChannelParameters {
        ChannelParameters {
            xdt: 1.0,
            fast_risetime,
            fast_gap,
            cfd_scale,
            cfd_delay,
            slow_risetime,
            slow_gap,
            tau,
        }
    }

    fn with_xdt_ten(value: Real) -> ChannelParameters {
        ChannelParameters {
            xdt: 10.0,
            fast_risetime: value,
            fast_gap: value,
            cfd_scale: 0.0,
            cfd_delay: value,
            slow_risetime: value,
            slow_gap: value,
            tau: value,
        }
    }

    #[test]
    fn below_sampling_interval_is_one_sample() {
        let resolution = ParameterResolver.resolve(&with_xdt_ten(9.9)).unwrap();
        let parameters = resolution.parameters;
        assert_eq!(parameters.fast_risetime(), 1);
        assert_eq!(parameters.cfd_delay(), 1);
        assert_eq!(parameters.slow_risetime(), 1);
        assert_eq!(parameters.tau(), 1);
        // Gaps are allowed to round to the nearest sample.
        assert_eq!(parameters.fast_gap(), 1);
        assert_eq!(parameters.slow_gap(), 1);
    }

    #[test]
    fn ties_round_to_even() {
        let parameters = ParameterResolver
            .resolve(&with_xdt_ten(25.0))
            .unwrap()
            .parameters;
        assert_eq!(parameters.fast_risetime(), 2);
        assert_eq!(parameters.slow_gap(), 2);

        let parameters = ParameterResolver
            .resolve(&with_xdt_ten(35.0))
            .unwrap()
            .parameters;
        assert_eq!(parameters.fast_risetime(), 4);
        assert_eq!(parameters.tau(), 4);
    }

    #[test]
    fn gaps_may_be_zero() {
        let parameters = ParameterResolver
            .resolve(&with_xdt_ten(4.0))
            .unwrap()
            .parameters;
        assert_eq!(parameters.fast_gap(), 0);
        assert_eq!(parameters.slow_gap(), 0);
        assert_eq!(parameters.fast_risetime(), 1);

        let mut raw = with_xdt_ten(20.0);
        raw.fast_gap = -30.0;
        let parameters = ParameterResolver.resolve(&raw).unwrap().parameters;
        assert_eq!(parameters.fast_gap(), 0);
    }

    #[test]
    fn cfd_scale_is_truncated_and_clamped() {
        let mut raw = with_xdt_ten(20.0);
        for (value, expected) in [(3.9, 3), (0.0, 0), (7.0, 7), (9.5, 7), (-1.0, 0)] {
            raw.cfd_scale = value;
            let parameters = ParameterResolver.resolve(&raw).unwrap().parameters;
            assert_eq!(parameters.cfd_scale(), expected, "cfd_scale {value}");
        }
    }

    #[test]
    fn short_fast_filter_warns() {
        let raw = ChannelParameters {
            xdt: 0.01,
            fast_risetime: 0.004,
            fast_gap: 0.001,
            cfd_scale: 0.0,
            cfd_delay: 0.05,
            slow_risetime: 0.5,
            slow_gap: 0.1,
            tau: 10.0,
        };
        let resolution = ParameterResolver.resolve(&raw).unwrap();
        assert_eq!(
            resolution.warning,
            Some(DisplayWarning::FastFilterTooShort {
                fast_risetime: 0.004,
                fast_gap: 0.001,
                xdt: 0.01
            })
        );
        // Resolution carries on regardless.
        assert_eq!(resolution.parameters.fast_risetime(), 1);
        assert_eq!(resolution.parameters.fast_gap(), 0);
        assert_eq!(resolution.parameters.slow_risetime(), 50);
        assert_eq!(resolution.parameters.tau(), 1000);
    }

    #[test]
    fn warning_boundary_is_inclusive() {
        let mut raw = with_xdt_ten(20.0);
        raw.fast_risetime = 4.0;
        raw.fast_gap = 2.0;
        assert!(ParameterResolver.resolve(&raw).unwrap().warning.is_some());

        raw.fast_gap = 2.5;
        assert!(ParameterResolver.resolve(&raw).unwrap().warning.is_none());
    }

    #[test]
    fn invalid_sampling_interval() {
        let mut raw = with_xdt_ten(20.0);
        raw.xdt = -1.0;
        assert_eq!(
            ParameterResolver.resolve(&raw),
            Err(ParameterError::InvalidSamplingInterval(-1.0))
        );
    }

    #[test]
    fn unit_interval_is_identity() {
        let parameters = ParameterResolver
            .resolve(&unit_parameters(4.0, 2.0, 3.0, 5.0, 8.0, 0.0, 20.0))
            .unwrap()
            .parameters;
        assert_eq!(parameters.fast_risetime(), 4);
        assert_eq!(parameters.fast_gap(), 2);
        assert_eq!(parameters.cfd_delay(), 3);
        assert_eq!(parameters.cfd_scale(), 5);
        assert_eq!(parameters.slow_risetime(), 8);
        assert_eq!(parameters.slow_gap(), 0);
        assert_eq!(parameters.tau(), 20);
    }
}
