//! Tracing initialisation for BrandLens binaries.
//!
//! Call [`init_tracing`] once at program start. Respects `RUST_LOG` when
//! set; otherwise applies the supplied default level to our crates and
//! keeps the HTTP client internals at `warn`.

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Initialise the global tracing subscriber.
///
/// When `json_logs` is set, log lines are emitted as newline-delimited
/// JSON instead of the human-readable format. `default_level` is the
/// verbosity applied when `RUST_LOG` is not set.
///
/// Safe to call more than once; only the first call takes effect (the
/// global subscriber can be set once per process).
pub fn init_tracing(json_logs: bool, default_level: Level) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directives(default_level)));

    if json_logs {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(fmt::layer().with_target(false))
            .try_init()
            .ok();
    }
}

fn default_directives(level: Level) -> String {
    format!("{level},hyper=warn,reqwest=warn,tower_http=info")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_quiet_http_internals() {
        let directives = default_directives(Level::DEBUG);
        assert!(directives.starts_with("DEBUG"));
        assert!(directives.contains("hyper=warn"));
    }
}
