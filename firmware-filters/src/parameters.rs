//! Defines the named channel parameters read from the digitiser's parameter store.
use crate::Real;
use serde::Deserialize;
use std::{collections::HashMap, hash::BuildHasher};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ParameterError {
    #[error("Channel parameter {0} is not available")]
    Missing(ChannelParameter),
    #[error("Channel parameter {0} is not a finite number: {1}")]
    NonFinite(ChannelParameter, Real),
    #[error("Sampling interval must be strictly positive: {0}")]
    InvalidSamplingInterval(Real),
}

/// The firmware names of the parameters the filters depend on.
#[derive(Clone, Copy, Debug, Display, EnumIter, EnumString, Eq, Hash, PartialEq)]
pub enum ChannelParameter {
    /// Sampling interval, in time units per sample.
    #[strum(serialize = "XDT")]
    Xdt,
    #[strum(serialize = "TRIGGER_RISETIME")]
    TriggerRisetime,
    #[strum(serialize = "TRIGGER_FLATTOP")]
    TriggerFlattop,
    /// Dimensionless attenuation code of the constant fraction discriminator.
    #[strum(serialize = "CFDScale")]
    CfdScale,
    #[strum(serialize = "CFDDelay")]
    CfdDelay,
    #[strum(serialize = "ENERGY_RISETIME")]
    EnergyRisetime,
    #[strum(serialize = "ENERGY_FLATTOP")]
    EnergyFlattop,
    /// Decay constant of the preamplifier signal.
    #[strum(serialize = "TAU")]
    Tau,
}

/// Implement for any store which can supply the value of a named channel parameter.
pub trait ChannelParameterSource {
    fn get_channel_parameter(&self, parameter: ChannelParameter) -> Result<Real, ParameterError>;
}

impl<S: BuildHasher> ChannelParameterSource for HashMap<String, Real, S> {
    fn get_channel_parameter(&self, parameter: ChannelParameter) -> Result<Real, ParameterError> {
        self.get(parameter.to_string().as_str())
            .copied()
            .ok_or(ParameterError::Missing(parameter))
    }
}

/// The channel's filter settings as stored by the digitiser, all in the time unit of `xdt`
/// except `cfd_scale`.
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct ChannelParameters {
    #[serde(rename = "XDT")]
    pub xdt: Real,
    #[serde(rename = "TRIGGER_RISETIME")]
    pub fast_risetime: Real,
    #[serde(rename = "TRIGGER_FLATTOP")]
    pub fast_gap: Real,
    #[serde(rename = "CFDScale")]
    pub cfd_scale: Real,
    #[serde(rename = "CFDDelay")]
    pub cfd_delay: Real,
    #[serde(rename = "ENERGY_RISETIME")]
    pub slow_risetime: Real,
    #[serde(rename = "ENERGY_FLATTOP")]
    pub slow_gap: Real,
    #[serde(rename = "TAU")]
    pub tau: Real,
}

impl ChannelParameters {
    /// Reads all eight parameters from `source`, failing on the first one that is missing.
    pub fn from_source<S: ChannelParameterSource + ?Sized>(
        source: &S,
    ) -> Result<Self, ParameterError> {
        let get = |parameter| source.get_channel_parameter(parameter);
        Ok(Self {
            xdt: get(ChannelParameter::Xdt)?,
            fast_risetime: get(ChannelParameter::TriggerRisetime)?,
            fast_gap: get(ChannelParameter::TriggerFlattop)?,
            cfd_scale: get(ChannelParameter::CfdScale)?,
            cfd_delay: get(ChannelParameter::CfdDelay)?,
            slow_risetime: get(ChannelParameter::EnergyRisetime)?,
            slow_gap: get(ChannelParameter::EnergyFlattop)?,
            tau: get(ChannelParameter::Tau)?,
        })
    }

    pub fn get(&self, parameter: ChannelParameter) -> Real {
        match parameter {
            ChannelParameter::Xdt => self.xdt,
            ChannelParameter::TriggerRisetime => self.fast_risetime,
            ChannelParameter::TriggerFlattop => self.fast_gap,
            ChannelParameter::CfdScale => self.cfd_scale,
            ChannelParameter::CfdDelay => self.cfd_delay,
            ChannelParameter::EnergyRisetime => self.slow_risetime,
            ChannelParameter::EnergyFlattop => self.slow_gap,
            ChannelParameter::Tau => self.tau,
        }
    }

    /// Returns an error naming the first parameter which cannot be converted into a sample count.
    pub(crate) fn validate(&self) -> Result<(), ParameterError> {
        if !self.xdt.is_finite() || self.xdt <= 0.0 {
            return Err(ParameterError::InvalidSamplingInterval(self.xdt));
        }
        ChannelParameter::iter()
            .map(|parameter| (parameter, self.get(parameter)))
            .find(|(_, value)| !value.is_finite())
            .map_or(Ok(()), |(parameter, value)| {
                Err(ParameterError::NonFinite(parameter, value))
            })
    }
}

impl ChannelParameterSource for ChannelParameters {
    fn get_channel_parameter(&self, parameter: ChannelParameter) -> Result<Real, ParameterError> {
        Ok(self.get(parameter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn store() -> HashMap<String, Real> {
        [
            ("XDT", 0.01),
            ("TRIGGER_RISETIME", 0.05),
            ("TRIGGER_FLATTOP", 0.02),
            ("CFDScale", 4.0),
            ("CFDDelay", 0.08),
            ("ENERGY_RISETIME", 0.4),
            ("ENERGY_FLATTOP", 0.1),
            ("TAU", 5.0),
        ]
        .into_iter()
        .map(|(name, value)| (name.to_owned(), value))
        .collect()
    }

    #[test]
    fn names_match_firmware() {
        assert_eq!(ChannelParameter::Xdt.to_string(), "XDT");
        assert_eq!(ChannelParameter::CfdScale.to_string(), "CFDScale");
        assert_eq!(
            ChannelParameter::from_str("ENERGY_FLATTOP"),
            Ok(ChannelParameter::EnergyFlattop)
        );
        assert!(ChannelParameter::from_str("energy_flattop").is_err());
    }

    #[test]
    fn read_from_store() {
        let parameters = ChannelParameters::from_source(&store()).unwrap();
        assert_eq!(parameters.xdt, 0.01);
        assert_eq!(parameters.fast_gap, 0.02);
        assert_eq!(parameters.cfd_scale, 4.0);
        assert_eq!(parameters.tau, 5.0);
        assert_eq!(parameters.get(ChannelParameter::CfdDelay), 0.08);
    }

    #[test]
    fn missing_parameter() {
        let mut store = store();
        store.remove("TAU");
        assert_eq!(
            ChannelParameters::from_source(&store),
            Err(ParameterError::Missing(ChannelParameter::Tau))
        );
    }

    #[test]
    fn deserialize_firmware_names() {
        let parameters: ChannelParameters = serde_json::from_str(
            r#"{"XDT": 0.01, "TRIGGER_RISETIME": 0.05, "TRIGGER_FLATTOP": 0.0,
                "CFDScale": 0, "CFDDelay": 0.08, "ENERGY_RISETIME": 0.4,
                "ENERGY_FLATTOP": 0.1, "TAU": 5}"#,
        )
        .unwrap();
        assert_eq!(parameters.fast_gap, 0.0);
        assert_eq!(parameters.slow_risetime, 0.4);
    }

    #[test]
    fn validation() {
        let mut parameters = ChannelParameters::from_source(&store()).unwrap();
        assert_eq!(parameters.validate(), Ok(()));

        parameters.slow_gap = Real::NAN;
        assert!(matches!(
            parameters.validate(),
            Err(ParameterError::NonFinite(ChannelParameter::EnergyFlattop, _))
        ));

        parameters.xdt = 0.0;
        assert_eq!(
            parameters.validate(),
            Err(ParameterError::InvalidSamplingInterval(0.0))
        );
    }
}
