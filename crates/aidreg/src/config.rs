//! Server and service configuration.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use aidreg_core::Keypair;

use crate::error::ConfigError;

pub const ENV_BIND: &str = "AIDREG_BIND";
pub const ENV_LOG_LEVEL: &str = "AIDREG_LOG_LEVEL";
pub const ENV_SERVER_SEED: &str = "AIDREG_SERVER_SEED";
pub const ENV_IDENTITIES: &str = "AIDREG_IDENTITIES";
pub const ENV_SELF_RESOLVE: &str = "AIDREG_SELF_RESOLVE";
pub const ENV_RESOLVE_TIMEOUT_MS: &str = "AIDREG_RESOLVE_TIMEOUT_MS";

const DEFAULT_BIND: &str = "127.0.0.1:8080";
const DEFAULT_RESOLVE_TIMEOUT: Duration = Duration::from_secs(5);

/// Protocol-level knobs of [`RegistryService`](crate::RegistryService).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Deadline for one identity resolution.
    pub resolve_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            resolve_timeout: DEFAULT_RESOLVE_TIMEOUT,
        }
    }
}

/// Everything the binary needs to start.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: SocketAddr,
    pub log_level: tracing::Level,
    /// Seed of the server key. A fresh key is generated when absent.
    pub server_seed: Option<[u8; 32]>,
    /// JSON identity table for the resolver.
    pub identities: Option<PathBuf>,
    /// Whether basic identifiers resolve to their own key.
    pub self_resolve: bool,
    pub service: ServiceConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 8080)),
            log_level: tracing::Level::INFO,
            server_seed: None,
            identities: None,
            self_resolve: true,
            service: ServiceConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read the configuration through `lookup`. Unset and empty variables
    /// take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let bind = get(ENV_BIND)
            .unwrap_or_else(|| DEFAULT_BIND.to_string())
            .trim()
            .parse::<SocketAddr>()
            .map_err(|e| invalid(ENV_BIND, e))?;

        let log_level = match get(ENV_LOG_LEVEL) {
            Some(level) => level
                .trim()
                .parse::<tracing::Level>()
                .map_err(|e| invalid(ENV_LOG_LEVEL, e))?,
            None => tracing::Level::INFO,
        };

        let server_seed = get(ENV_SERVER_SEED)
            .map(|seed| parse_seed(seed.trim()))
            .transpose()?;

        let identities = get(ENV_IDENTITIES).map(PathBuf::from);

        let self_resolve = match get(ENV_SELF_RESOLVE) {
            Some(flag) => parse_bool(ENV_SELF_RESOLVE, flag.trim())?,
            None => true,
        };

        let resolve_timeout = match get(ENV_RESOLVE_TIMEOUT_MS) {
            Some(ms) => {
                let ms = ms
                    .trim()
                    .parse::<u64>()
                    .map_err(|e| invalid(ENV_RESOLVE_TIMEOUT_MS, e))?;
                if ms == 0 {
                    return Err(invalid(ENV_RESOLVE_TIMEOUT_MS, "must be positive"));
                }
                Duration::from_millis(ms)
            }
            None => DEFAULT_RESOLVE_TIMEOUT,
        };

        Ok(Self {
            bind,
            log_level,
            server_seed,
            identities,
            self_resolve,
            service: ServiceConfig { resolve_timeout },
        })
    }

    /// The server keypair: derived from the seed, or freshly generated.
    pub fn server_keypair(&self) -> Keypair {
        match &self.server_seed {
            Some(seed) => Keypair::from_seed(seed),
            None => Keypair::generate(),
        }
    }
}

fn invalid(var: &'static str, reason: impl std::fmt::Display) -> ConfigError {
    ConfigError::Invalid {
        var,
        reason: reason.to_string(),
    }
}

fn parse_seed(text: &str) -> Result<[u8; 32], ConfigError> {
    let bytes = hex::decode(text).map_err(|e| invalid(ENV_SERVER_SEED, e))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| invalid(ENV_SERVER_SEED, format!("expected 32 bytes, got {}", b.len())))
}

fn parse_bool(var: &'static str, text: &str) -> Result<bool, ConfigError> {
    match text.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(invalid(var, format!("not a boolean: {}", other))),
    }
}
