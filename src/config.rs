//! Configuration management
//!
//! Everything comes from the environment (a `.env` file is honoured when
//! present) and falls back to defaults suitable for local development.
//!
//! | variable | default |
//! |---|---|
//! | `COUNTRIES_HOST` | `127.0.0.1` |
//! | `COUNTRIES_PORT` | `3000` |
//! | `COUNTRIES_UPSTREAM_URL` | [`DEFAULT_UPSTREAM_URL`] |
//! | `COUNTRIES_UPSTREAM_TIMEOUT_SECS` | unset (transport default) |
//!
//! Logging has its own variables; see [`crate::logging`].

use std::net::{IpAddr, Ipv4Addr, SocketAddr};

use anyhow::{Context, bail};
use url::Url;

use crate::logging::LogConfig;

/// Default bind address.
pub const DEFAULT_HOST: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Default bind port.
pub const DEFAULT_PORT: u16 = 3000;

/// The full REST Countries list, trimmed to the fields this service reads.
pub const DEFAULT_UPSTREAM_URL: &str = "https://restcountries.com/v3.1/all?fields=name,population";

#[derive(Clone, Debug)]
pub struct Config {
    pub server: ServerConfig,
    pub upstream: UpstreamConfig,
    pub log: LogConfig,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ServerConfig {
    pub host: IpAddr,
    pub port: u16,
}

/// Where and how to fetch the country list.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct UpstreamConfig {
    pub url: Url,
    /// Outbound request timeout. `None` leaves it to the transport.
    pub timeout_secs: Option<u64>,
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Config {
    /// Load configuration from the process environment and defaults.
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its
    /// value. Unset variables take their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let host = match lookup("COUNTRIES_HOST") {
            Some(v) => v.parse::<IpAddr>().with_context(|| format!("COUNTRIES_HOST `{v}` is not an IP address"))?,
            None => DEFAULT_HOST,
        };
        let port = match lookup("COUNTRIES_PORT") {
            Some(v) => v.parse::<u16>().with_context(|| format!("COUNTRIES_PORT `{v}` is not a port number"))?,
            None => DEFAULT_PORT,
        };
        let url = lookup("COUNTRIES_UPSTREAM_URL").unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_owned());
        let url = Url::parse(&url).with_context(|| format!("COUNTRIES_UPSTREAM_URL `{url}` is not a URL"))?;
        let timeout_secs = lookup("COUNTRIES_UPSTREAM_TIMEOUT_SECS")
            .map(|v| v.parse::<u64>().with_context(|| format!("COUNTRIES_UPSTREAM_TIMEOUT_SECS `{v}` is not a number")))
            .transpose()?;

        let config = Self {
            server: ServerConfig { host, port },
            upstream: UpstreamConfig { url, timeout_secs },
            log: LogConfig::from_lookup(&lookup)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.port == 0 {
            bail!("Server port must be greater than 0");
        }

        let scheme = self.upstream.url.scheme();
        if scheme != "http" && scheme != "https" {
            bail!("Upstream URL must use http or https, got `{scheme}`");
        }

        if self.upstream.timeout_secs == Some(0) {
            bail!("Upstream timeout must be greater than 0 seconds");
        }

        Ok(())
    }
}
