//! Resolves backing-service addresses and prints a discovery report.
//!
//! Usage:
//!
//! ```text
//! discovery_probe [--timeout-ms <millis>] [--config <path>] <service>...
//! ```
//!
//! Each `service` is a registered name or alias (`mongo`, `docstore`,
//! `redis`, `ollama`, ...). Settings are read from the process environment
//! and, when `--config` is given, from a JSON file whose nested objects map
//! to colon-separated keys:
//!
//! ```json
//! {
//!   "Discovery": { "HealthCheckTimeoutMs": 750 },
//!   "ConnectionStrings": { "postgres": "postgres://db.internal:5432/app" },
//!   "Redis": { "Urls": "redis://cache-a:6379;redis://cache-b:6379" }
//! }
//! ```
//!
//! The report is written to stdout as JSON. The process exits with status 1
//! when any service could not be resolved and 2 on usage or setup errors.
//! Diagnostics go to stderr and honour `RUST_LOG`.

use camino::Utf8PathBuf;
use mockable::{Clock, DefaultClock};
use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::error;
use tracing_subscriber::EnvFilter;
use wayfinder::discovery::{
    adapters::settings::{JsonFileSettings, LayeredSettings, ProcessEnvironment},
    ports::{DiscoverySources, SettingsError, SettingsSource},
    services::{
        ConfigError, DiscoveryConfig, DiscoveryCoordinator, DiscoveryRegistry, DiscoveryReport,
        RegistryError, container_marker_present,
    },
};

/// Errors that stop the probe before a report is produced.
#[derive(Debug, Error)]
enum ProbeError {
    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Registry(#[from] RegistryError),
    #[error("runtime init failed: {0}")]
    RuntimeInit(#[source] io::Error),
    #[error("failed to write report: {0}")]
    Output(#[source] io::Error),
    #[error("failed to serialise report: {0}")]
    Serialise(#[source] serde_json::Error),
}

/// Parsed command line.
#[derive(Debug, Default, PartialEq, Eq)]
struct ProbeArgs {
    timeout_ms: Option<u64>,
    config_path: Option<Utf8PathBuf>,
    services: Vec<String>,
}

impl ProbeArgs {
    fn parse(args: impl IntoIterator<Item = String>) -> Result<Self, ProbeError> {
        let mut parsed = Self::default();
        let mut remaining = args.into_iter();
        while let Some(arg) = remaining.next() {
            match arg.as_str() {
                "--timeout-ms" => {
                    let raw = remaining.next().ok_or_else(|| {
                        ProbeError::InvalidArgs("--timeout-ms requires a value".into())
                    })?;
                    let millis = raw.parse::<u64>().map_err(|err| {
                        ProbeError::InvalidArgs(format!("invalid --timeout-ms '{raw}': {err}"))
                    })?;
                    parsed.timeout_ms = Some(millis);
                }
                "--config" => {
                    let path = remaining.next().ok_or_else(|| {
                        ProbeError::InvalidArgs("--config requires a path".into())
                    })?;
                    parsed.config_path = Some(Utf8PathBuf::from(path));
                }
                flag if flag.starts_with("--") => {
                    return Err(ProbeError::InvalidArgs(format!("unknown option '{flag}'")));
                }
                _ => parsed.services.push(arg),
            }
        }

        if parsed.services.is_empty() {
            return Err(ProbeError::InvalidArgs(
                "expected at least one service name".into(),
            ));
        }
        Ok(parsed)
    }
}

fn main() -> ExitCode {
    init_tracing();
    match run(std::env::args().skip(1)) {
        Ok(report) if report.has_failures() => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(err) => {
            error!(%err, "discovery probe failed");
            ExitCode::from(2)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(args: impl IntoIterator<Item = String>) -> Result<DiscoveryReport, ProbeError> {
    let args = ProbeArgs::parse(args)?;
    let environment: Arc<dyn SettingsSource> = Arc::new(ProcessEnvironment::new());
    let configuration = configuration_layers(args.config_path.as_ref(), &environment)?;

    let mut config = DiscoveryConfig::from_settings(configuration.as_ref())?;
    if let Some(millis) = args.timeout_ms {
        config = config.with_health_check_timeout(Duration::from_millis(millis));
    }
    let context = config.context(environment.as_ref(), container_marker_present());

    let sources = DiscoverySources::new(environment, configuration);
    let registry = DiscoveryRegistry::with_defaults(&sources)?;
    let clock = Arc::new(DefaultClock);
    let coordinator = DiscoveryCoordinator::new(Arc::new(registry), Arc::clone(&clock));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(ProbeError::RuntimeInit)?;
    let mut report = DiscoveryReport::new(clock.utc());
    runtime.block_on(async {
        for service in &args.services {
            let result = coordinator.resolve(service, &context).await;
            report.record(&result);
        }
    });

    write_report(&report, &mut io::stdout().lock())?;
    Ok(report)
}

/// Stacks the JSON file (when given) over the process environment.
fn configuration_layers(
    config_path: Option<&Utf8PathBuf>,
    environment: &Arc<dyn SettingsSource>,
) -> Result<Arc<dyn SettingsSource>, ProbeError> {
    let mut layers = LayeredSettings::new();
    if let Some(path) = config_path {
        layers = layers.with_layer(Arc::new(JsonFileSettings::load(path)?));
    }
    Ok(Arc::new(layers.with_layer(Arc::clone(environment))))
}

fn write_report(report: &DiscoveryReport, out: &mut impl Write) -> Result<(), ProbeError> {
    let json = report.to_json().map_err(ProbeError::Serialise)?;
    writeln!(out, "{json}").map_err(ProbeError::Output)
}
