/// Server Configuration
///
/// All settings come from environment variables and are read once at startup.
///
/// Environment Variables:
/// - SERVER_NAME: Name reported by `initialize` (default: "mcp-archive-server")
/// - SERVER_VERSION: Version reported by `initialize` (default: crate version)
/// - MCP_TRANSPORT_MODE: "stdio", "http", or "both" (default: "http")
/// - HOST: Bind address for HTTP mode (default: "0.0.0.0")
/// - PORT: Port number for HTTP mode (default: 3000)
/// - WORKER_THREADS: HTTP worker count (default: CPU count, capped at 16)
/// - ARCHIVE_API_BASE_URL: Base URL of the archival API (default: "http://localhost:8000")

use std::str::FromStr;
use thiserror::Error;

/// Which transports to serve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportMode {
    Stdio,
    Http,
    Both,
}

impl FromStr for TransportMode {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "stdio" => Ok(Self::Stdio),
            "http" => Ok(Self::Http),
            "both" => Ok(Self::Both),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("invalid value for {key}: '{value}' ({expected})")]
    Invalid {
        key: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub name: String,
    pub version: String,
    pub transport: TransportMode,
    pub host: String,
    pub port: u16,
    pub workers: usize,
    pub archive_base_url: String,
}

impl ServerConfig {
    /// Load configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let transport = get("MCP_TRANSPORT_MODE", "http");
        let transport = transport.parse::<TransportMode>().map_err(|_| ConfigError::Invalid {
            key: "MCP_TRANSPORT_MODE",
            value: transport.clone(),
            expected: "one of stdio, http, both",
        })?;

        let port = get("PORT", "3000");
        let port = port.parse::<u16>().map_err(|_| ConfigError::Invalid {
            key: "PORT",
            value: port.clone(),
            expected: "a port number",
        })?;

        let workers = match lookup("WORKER_THREADS") {
            Some(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        key: "WORKER_THREADS",
                        value: raw,
                        expected: "a positive integer",
                    });
                }
            },
            // Capped at 16 to avoid excessive context switching
            None => num_cpus::get().clamp(1, 16),
        };

        Ok(Self {
            name: get("SERVER_NAME", "mcp-archive-server"),
            version: get("SERVER_VERSION", env!("CARGO_PKG_VERSION")),
            transport,
            host: get("HOST", "0.0.0.0"),
            port,
            workers,
            archive_base_url: get("ARCHIVE_API_BASE_URL", "http://localhost:8000")
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(pairs: &[(&str, &str)]) -> Result<ServerConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ServerConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[]).unwrap();
        assert_eq!(config.name, "mcp-archive-server");
        assert_eq!(config.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(config.transport, TransportMode::Http);
        assert_eq!(config.bind_addr(), "0.0.0.0:3000");
        assert!((1..=16).contains(&config.workers));
        assert_eq!(config.archive_base_url, "http://localhost:8000");
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("SERVER_NAME", "archive"),
            ("MCP_TRANSPORT_MODE", "BOTH"),
            ("HOST", "127.0.0.1"),
            ("PORT", "8080"),
            ("WORKER_THREADS", "3"),
            ("ARCHIVE_API_BASE_URL", "http://archive:9000/"),
        ])
        .unwrap();
        assert_eq!(config.name, "archive");
        assert_eq!(config.transport, TransportMode::Both);
        assert_eq!(config.bind_addr(), "127.0.0.1:8080");
        assert_eq!(config.workers, 3);
        assert_eq!(config.archive_base_url, "http://archive:9000");
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            load(&[("PORT", "http")]),
            Err(ConfigError::Invalid { key: "PORT", .. })
        ));
        assert!(matches!(
            load(&[("MCP_TRANSPORT_MODE", "carrier-pigeon")]),
            Err(ConfigError::Invalid { key: "MCP_TRANSPORT_MODE", .. })
        ));
        assert!(matches!(
            load(&[("WORKER_THREADS", "0")]),
            Err(ConfigError::Invalid { key: "WORKER_THREADS", .. })
        ));
    }
}
