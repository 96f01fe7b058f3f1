//! Gateway configuration loaded from environment variables.
//!
//! Follows 12-factor style: all settings come from environment variables
//! (or a `.env` file via `dotenvy`).

use std::net::SocketAddr;
use std::time::Duration;

/// Default NATS endpoint when `NATS_HOST` is unset.
pub const DEFAULT_NATS_URL: &str = "nats://127.0.0.1:4222";

/// Default listener address when `LISTEN_ADDR` is unset.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:8081";

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

/// Top-level gateway configuration.
///
/// Loaded once at startup via [`GatewayConfig::from_env`].
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Socket address to bind the HTTP server to (e.g. `0.0.0.0:8081`).
    pub listen_addr: SocketAddr,

    /// Message bus endpoint. `memory://` selects the in-process bus.
    pub nats_url: String,

    /// Deadline for one request-reply round trip.
    pub request_timeout: Duration,

    /// Per-connection queue of deliveries waiting to be written to a
    /// WebSocket.
    pub ws_queue_capacity: usize,

    /// Per-subscriber buffer of the in-process bus.
    pub local_bus_capacity: usize,

    /// Log output format.
    pub log_format: LogFormat,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8081)),
            nats_url: DEFAULT_NATS_URL.to_string(),
            request_timeout: Duration::from_secs(3),
            ws_queue_capacity: 256,
            local_bus_capacity: 1024,
            log_format: LogFormat::Text,
        }
    }
}

impl GatewayConfig {
    /// Loads configuration from environment variables.
    ///
    /// Falls back to defaults when a variable is not set or cannot be
    /// parsed. Calls `dotenvy::dotenv().ok()` to optionally load a `.env`
    /// file.
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is set but cannot be parsed as
    /// a [`SocketAddr`], or if the timeout or a capacity is zero.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let listen_addr: SocketAddr = std::env::var("LISTEN_ADDR")
            .unwrap_or_else(|_| DEFAULT_LISTEN_ADDR.to_string())
            .parse()?;

        let nats_url = std::env::var("NATS_HOST")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_NATS_URL.to_string());

        let request_timeout = Duration::from_millis(parse_env("REQUEST_TIMEOUT_MS", 3_000));
        let ws_queue_capacity = parse_env("WS_QUEUE_CAPACITY", 256);
        let local_bus_capacity = parse_env("LOCAL_BUS_CAPACITY", 1_024);
        let log_format = parse_log_format(std::env::var("LOG_FORMAT").ok().as_deref());

        let config = Self {
            listen_addr,
            nats_url,
            request_timeout,
            ws_queue_capacity,
            local_bus_capacity,
            log_format,
        };
        config.validate()?;
        Ok(config)
    }

    /// Checks limits that would make the gateway unusable.
    ///
    /// # Errors
    ///
    /// Returns a description of the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        if self.request_timeout.is_zero() {
            return Err("REQUEST_TIMEOUT_MS must be greater than zero".to_string());
        }
        if self.ws_queue_capacity == 0 {
            return Err("WS_QUEUE_CAPACITY must be greater than zero".to_string());
        }
        if self.local_bus_capacity == 0 {
            return Err("LOCAL_BUS_CAPACITY must be greater than zero".to_string());
        }
        Ok(())
    }
}

/// Parses an environment variable as `T`, returning `default` on missing
/// or invalid values.
fn parse_env<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

/// Accepts `"json"` (case-insensitive); everything else is text.
fn parse_log_format(raw: Option<&str>) -> LogFormat {
    match raw {
        Some(v) if v.eq_ignore_ascii_case("json") => LogFormat::Json,
        _ => LogFormat::Text,
    }
}
