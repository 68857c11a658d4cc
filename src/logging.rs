//! Logging setup
//!
//! Installs a process-wide `tracing` subscriber: this crate logs at the
//! configured level, everything else at `warn`. `RUST_LOG` overrides both.
//! Events go to stderr so stdout stays free for command output.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

use crate::config::settings;

/// Level for third-party crates
pub const GLOBAL_LEVEL: &str = "warn";

/// Subscriber options
#[derive(Debug, Clone)]
pub struct LogOptions {
    /// Level for this crate's targets (trace, debug, info, warn, error)
    pub level: String,
    /// Additional targets logged at `level`, e.g. the calling binary
    pub extra_targets: Vec<String>,
    /// Emit JSON lines instead of human-readable text
    pub json: bool,
}

impl Default for LogOptions {
    fn default() -> Self {
        Self {
            level: settings::DEFAULT_LOG_LEVEL.to_string(),
            extra_targets: Vec::new(),
            json: false,
        }
    }
}

impl LogOptions {
    /// Options with the level taken from `TFDS_LOG_LEVEL`
    pub fn from_env() -> Self {
        Self {
            level: settings::Settings::from_env().log_level,
            ..Self::default()
        }
    }

    /// Filter directives, e.g. `warn,tfdslib=debug`
    pub fn directives(&self) -> String {
        let mut directives = vec![
            GLOBAL_LEVEL.to_string(),
            format!("{}={}", env!("CARGO_CRATE_NAME"), self.level),
        ];
        for target in &self.extra_targets {
            let target = target.split("::").next().unwrap_or(target.as_str()).replace('-', "_");
            directives.push(format!("{}={}", target, self.level));
        }
        directives.join(",")
    }
}

/// Install the global subscriber
///
/// Returns `false` if a subscriber was already installed.
pub fn init(options: &LogOptions) -> bool {
    // RUST_LOG wins over the computed directives
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(options.directives()));

    let layer = if options.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    } else {
        fmt::layer()
            .with_writer(std::io::stderr)
            .with_filter(filter)
            .boxed()
    };

    tracing_subscriber::registry().with(layer).try_init().is_ok()
}
