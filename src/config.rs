// ⚙️ Configuration - environment-driven settings for server and client
//
// FINOPS_HOST             bind host           (default 0.0.0.0)
// FINOPS_PORT             bind port           (default 3000)
// FINOPS_API_URL          client base URL     (default http://localhost:3000)
// FINOPS_STREAM_DELAY_MS  demo stream pacing  (default 250)

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_API_URL: &str = "http://localhost:3000";
pub const DEFAULT_STREAM_DELAY_MS: u64 = 250;

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub api_url: String,
    pub stream_delay: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            api_url: DEFAULT_API_URL.to_string(),
            stream_delay: Duration::from_millis(DEFAULT_STREAM_DELAY_MS),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset or blank keys fall back to defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Config::default();

        let port = match get("FINOPS_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .with_context(|| format!("FINOPS_PORT is not a valid port: {:?}", raw))?,
            None => defaults.port,
        };

        let stream_delay = match get("FINOPS_STREAM_DELAY_MS") {
            Some(raw) => Duration::from_millis(
                raw.parse::<u64>()
                    .with_context(|| format!("FINOPS_STREAM_DELAY_MS is not a number: {:?}", raw))?,
            ),
            None => defaults.stream_delay,
        };

        Ok(Config {
            host: get("FINOPS_HOST").unwrap_or(defaults.host),
            port,
            api_url: get("FINOPS_API_URL").unwrap_or(defaults.api_url),
            stream_delay,
        })
    }

    pub fn bind_addr(&self) -> Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid bind address {}:{}", self.host, self.port))
    }
}
