//! # Trace to Filters
//!
//! The Trace to Filters component performs the following functions:
//! * Reads a captured ADC trace of a single channel, and the channel's filter parameters.
//! * Reconstructs the trigger, CFD and energy filter outputs that the digitiser firmware computes.
//! * Writes the trace and the three filter outputs to a CSV file, or logs a summary of them.
//!
mod loader;
mod output;

use clap::Parser;
use firmware_filters::{TraceAnalyzer, TraceSource};
use loader::{TraceFile, TraceFormat, load_parameters};
use miette::IntoDiagnostic;
use output::{Peak, Summary, save_to_file};
use pulse_dsp_common::{Channel, CommonLogOpts, init_tracer};
use std::path::PathBuf;
use tracing::{info, info_span};

/// [clap] derived struct to handle command line parameters.
#[derive(Debug, Parser)]
#[clap(author, version = pulse_dsp_common::version!(), about)]
struct Cli {
    #[clap(flatten)]
    common_log_options: CommonLogOpts,

    /// File containing the raw ADC samples of a single channel
    #[clap(long)]
    trace_file: PathBuf,

    /// Encoding of the trace file
    #[clap(long, default_value = "text")]
    trace_format: TraceFormat,

    /// JSON file of channel parameters, keyed by their firmware names
    #[clap(long, env)]
    parameters_file: PathBuf,

    /// Channel to read from the parameters file, if it holds more than one
    #[clap(long)]
    channel: Option<Channel>,

    /// If set, the trace and filter outputs are written to this file, otherwise a summary is logged
    #[clap(long)]
    output_file: Option<PathBuf>,
}

fn main() -> miette::Result<()> {
    let args = Cli::parse();

    let tracer = init_tracer!(args.common_log_options.tracer_options()).into_diagnostic()?;
    let _guard = info_span!("analysis", service = tracer.service_name()).entered();

    let trace = TraceFile::new(&args.trace_file, args.trace_format)
        .get_trace()
        .into_diagnostic()?;
    let parameters = load_parameters(&args.parameters_file, args.channel).into_diagnostic()?;

    let analysis = TraceAnalyzer.analyze(&trace, &parameters).into_diagnostic()?;
    info!("Filter parameters in samples: {}", analysis.parameters);

    match &args.output_file {
        Some(path) => {
            save_to_file(path, &trace, &analysis.traces).into_diagnostic()?;
            info!("Wrote {} samples to {}", trace.len(), path.display());
        }
        None => {
            let summary = Summary::new(&analysis.traces);
            let describe = |peak: Option<Peak>| {
                peak.map(|peak| peak.to_string()).unwrap_or_default()
            };
            info!("Fast filter peak: {}", describe(summary.fast));
            info!("CFD peak: {}", describe(summary.cfd));
            info!("Slow filter peak: {}", describe(summary.slow));
            match summary.cfd_zero_crossing {
                Some(time) => info!("CFD zero crossing at sample {time:.3}"),
                None => info!("CFD has no zero crossing"),
            }
        }
    }
    Ok(())
}
