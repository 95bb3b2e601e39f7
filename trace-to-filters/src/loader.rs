//! Reads captured traces and channel parameter files.
use clap::ValueEnum;
use firmware_filters::{ChannelParameters, MAX_TRACE_LENGTH, TraceSource};
use pulse_dsp_common::{Channel, Intensity};
use serde::Deserialize;
use std::{
    collections::HashMap,
    fs,
    num::ParseIntError,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tracing::{info, instrument, warn};

#[derive(Debug, Error)]
pub(crate) enum LoadError {
    #[error("Cannot read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),
    #[error("Invalid sample '{token}' on line {line}: {source}")]
    InvalidSample {
        line: usize,
        token: String,
        source: ParseIntError,
    },
    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Trace has {0} samples, the digitiser holds at most {max}", max = MAX_TRACE_LENGTH)]
    TraceTooLong(usize),
    #[error("Parameter file holds several channels, please specify one with --channel")]
    ChannelRequired,
    #[error("Parameter file has no entry for channel {0}")]
    UnknownChannel(String),
}

/// The encoding of a trace file.
#[derive(Clone, Copy, Debug, Default, ValueEnum)]
pub(crate) enum TraceFormat {
    /// Samples separated by commas or whitespace. Lines beginning with '#' are ignored.
    #[default]
    Text,
    /// A JSON array of samples.
    Json,
}

/// A trace stored in a file.
#[derive(Debug)]
pub(crate) struct TraceFile {
    path: PathBuf,
    format: TraceFormat,
}

impl TraceFile {
    pub(crate) fn new(path: &Path, format: TraceFormat) -> Self {
        Self {
            path: path.to_owned(),
            format,
        }
    }
}

impl TraceSource for TraceFile {
    type Error = LoadError;

    #[instrument(skip_all, fields(path = %self.path.display(), num_samples))]
    fn get_trace(&self) -> Result<Vec<Intensity>, LoadError> {
        let contents =
            fs::read_to_string(&self.path).map_err(|e| LoadError::Io(self.path.clone(), e))?;
        let trace = match self.format {
            TraceFormat::Text => parse_text_trace(&contents)?,
            TraceFormat::Json => serde_json::from_str(&contents)?,
        };
        if trace.len() > MAX_TRACE_LENGTH {
            return Err(LoadError::TraceTooLong(trace.len()));
        }
        tracing::Span::current().record("num_samples", trace.len());
        Ok(trace)
    }
}

fn parse_text_trace(contents: &str) -> Result<Vec<Intensity>, LoadError> {
    let mut trace = Vec::new();
    for (index, line) in contents.lines().enumerate() {
        if line.trim_start().starts_with('#') {
            continue;
        }
        for token in line
            .split(|c: char| c == ',' || c.is_whitespace())
            .filter(|token| !token.is_empty())
        {
            let sample = token.parse::<Intensity>().map_err(|source| LoadError::InvalidSample {
                line: index + 1,
                token: token.to_owned(),
                source,
            })?;
            trace.push(sample);
        }
    }
    Ok(trace)
}

/// Parameter files may hold a single channel's settings, or settings keyed by channel number.
#[derive(Deserialize)]
#[serde(untagged)]
enum ParameterFile {
    SingleChannel(ChannelParameters),
    PerChannel(HashMap<String, ChannelParameters>),
}

/// Loads the parameters of the requested channel from a JSON file.
#[instrument(skip_all, fields(path = %path.display(), channel = ?channel))]
pub(crate) fn load_parameters(
    path: &Path,
    channel: Option<Channel>,
) -> Result<ChannelParameters, LoadError> {
    let contents = fs::read_to_string(path).map_err(|e| LoadError::Io(path.to_owned(), e))?;
    parse_parameters(&contents, channel)
}

fn parse_parameters(
    contents: &str,
    channel: Option<Channel>,
) -> Result<ChannelParameters, LoadError> {
    match serde_json::from_str(contents)? {
        ParameterFile::SingleChannel(parameters) => {
            if let Some(channel) = channel {
                warn!("Parameter file is not per channel, ignoring channel {channel}");
            }
            Ok(parameters)
        }
        ParameterFile::PerChannel(mut channels) => {
            let key = match channel {
                Some(channel) => channel.to_string(),
                None if channels.len() == 1 => {
                    let key = channels
                        .keys()
                        .next()
                        .cloned()
                        .ok_or(LoadError::ChannelRequired)?;
                    info!("Using the only channel in the file, {key}");
                    key
                }
                None => return Err(LoadError::ChannelRequired),
            };
            channels
                .remove(&key)
                .ok_or(LoadError::UnknownChannel(key))
        }
    }
}
