//! Types and helpers shared by every component of the pulse-processing workspace.
pub mod tracer;

pub use const_format;
pub use tracer::{TracerEngine, TracerError, TracerOptions};

use clap::Args;

/// The value of a single ADC sample.
pub type Intensity = u16;

/// Index of a digitiser channel.
pub type Channel = u32;

/// Git description of the source tree at build time.
pub const GIT_VERSION: &str =
    git_version::git_version!(args = ["--tags", "--always", "--dirty"], fallback = "unknown");

/// Expands to the package version followed by the git description, for use with `#[clap(version = ...)]`.
#[macro_export]
macro_rules! version {
    () => {
        $crate::const_format::concatcp!(env!("CARGO_PKG_VERSION"), " (", $crate::GIT_VERSION, ")")
    };
}

/// Logging options common to all components.
#[derive(Clone, Debug, Args)]
pub struct CommonLogOpts {
    /// Filter directive applied to log output when `RUST_LOG` is not set, e.g. "info" or "firmware_filters=debug".
    #[clap(long, env, default_value = "info")]
    pub log_filter: String,

    /// If set, log lines are emitted without ANSI colour codes.
    #[clap(long, env)]
    pub no_ansi: bool,
}

impl CommonLogOpts {
    pub fn tracer_options(&self) -> TracerOptions<'_> {
        TracerOptions::new(&self.log_filter, !self.no_ansi)
    }
}
