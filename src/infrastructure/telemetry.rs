//! # Telemetry
//!
//! One-shot initialization of the global tracing subscriber.
//!
//! `RUST_LOG` takes precedence over the configured filter. Later calls
//! are no-ops, so tests and binaries may call [`init`] freely.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Once;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::util::SubscriberInitExt;

/// Filter used when neither `RUST_LOG` nor configuration provides one.
pub const DEFAULT_FILTER: &str = "rememerme_cards=info,tower_http=info";

static INIT_ONCE: Once = Once::new();

/// Output format of log events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Human-readable multi-line output.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl fmt::Display for LogFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pretty => f.write_str("pretty"),
            Self::Json => f.write_str("json"),
        }
    }
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown log format: {other}")),
        }
    }
}

/// Builds the event filter: `RUST_LOG` first, then `configured`, then
/// [`DEFAULT_FILTER`].
#[must_use]
pub fn env_filter(configured: Option<&str>) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured.unwrap_or(DEFAULT_FILTER)))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Installs the global subscriber.
///
/// Only the first call has an effect. If another subscriber is already
/// installed the call leaves it in place.
pub fn init(format: LogFormat, filter: Option<&str>) {
    INIT_ONCE.call_once(|| {
        let builder = tracing_subscriber::fmt().with_env_filter(env_filter(filter));
        // An already-installed subscriber wins.
        let _ = match format {
            LogFormat::Pretty => builder.pretty().finish().try_init(),
            LogFormat::Json => builder.json().finish().try_init(),
        };
    });
}
