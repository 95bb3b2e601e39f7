//! Initialises the global `tracing` subscriber for a component.
use thiserror::Error;
use tracing::subscriber::SetGlobalDefaultError;
use tracing_subscriber::{EnvFilter, Layer, layer::SubscriberExt};

#[derive(Debug, Error)]
pub enum TracerError {
    #[error("Invalid log filter directive: {0}")]
    InvalidFilter(#[from] tracing_subscriber::filter::ParseError),
    #[error("Global subscriber already set: {0}")]
    AlreadySet(#[from] SetGlobalDefaultError),
}

/// Options used to build the [TracerEngine].
pub struct TracerOptions<'a> {
    /// Directive used when the `RUST_LOG` environment variable is absent or invalid.
    pub default_filter: &'a str,
    /// Whether to colour the output.
    pub ansi: bool,
}

impl<'a> TracerOptions<'a> {
    pub fn new(default_filter: &'a str, ansi: bool) -> Self {
        Self {
            default_filter,
            ansi,
        }
    }
}

/// This object initialises the stdout tracer, given a [TracerOptions] struct.
pub struct TracerEngine {
    service_name: String,
}

impl TracerEngine {
    /// Initialises the stdout tracer for the crate
    /// # Parameters
    /// - options: the caller-specified instance of TracerOptions.
    /// - service_name: the name of the component, recorded in the startup log line.
    /// - module_name: the name of the calling module.
    pub fn new(
        options: TracerOptions,
        service_name: &str,
        module_name: &str,
    ) -> Result<Self, TracerError> {
        // `RUST_LOG` takes priority over the command line.
        let log_filter = match EnvFilter::try_from_default_env() {
            Ok(filter) => filter,
            Err(_) => EnvFilter::try_new(options.default_filter)?,
        };

        let stdout_tracer = tracing_subscriber::fmt::layer()
            .with_writer(std::io::stdout)
            .with_ansi(options.ansi)
            .with_filter(log_filter);

        let subscriber = tracing_subscriber::Registry::default().with(stdout_tracer);
        tracing::subscriber::set_global_default(subscriber)?;

        tracing::debug!("Tracer initialised for {service_name} in {module_name}");
        Ok(Self {
            service_name: service_name.to_owned(),
        })
    }

    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

/// Should be called at the start of each component.
#[macro_export]
macro_rules! init_tracer {
    ($options:expr) => {
        $crate::TracerEngine::new($options, env!("CARGO_BIN_NAME"), module_path!())
    };
}
