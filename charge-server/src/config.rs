//! Server configuration from environment variables.
//!
//! | Variable                | Default                          |
//! |-------------------------|----------------------------------|
//! | `OCM_API_KEY`           | unset (requests fail with 500)   |
//! | `OCM_BASE_URL`          | `https://api.openchargemap.io/v3`|
//! | `OCM_TIMEOUT_SECS`      | `5`                              |
//! | `OCM_MAX_CONCURRENT`    | `5`                              |
//! | `REGIONAL_COUNTRY_CODE` | `TR`                             |
//! | `STATION_STORE_PATH`    | unset (empty in-memory store)    |
//! | `BIND_ADDR`             | `127.0.0.1:3000`                 |

use std::net::SocketAddr;
use std::path::PathBuf;
use std::str::FromStr;

use crate::cache::CacheConfig;
use crate::gateway::RegionalConfig;
use crate::ocm::OcmConfig;

/// Default listen address.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:3000";

/// A malformed environment variable.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {name}: {value:?}")]
pub struct ConfigError {
    name: &'static str,
    value: String,
}

/// Everything needed to start the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: SocketAddr,
    pub ocm: OcmConfig,
    pub nearby_cache: CacheConfig,
    pub regional: RegionalConfig,
    /// JSON station file for the operator roster.
    pub store_path: Option<PathBuf>,
}

impl ServerConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read configuration through `lookup`, which maps a variable name to
    /// its value. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let mut ocm = OcmConfig::new();
        if let Some(key) = get("OCM_API_KEY") {
            ocm = ocm.with_api_key(key);
        }
        if let Some(url) = get("OCM_BASE_URL") {
            ocm = ocm.with_base_url(url);
        }
        if let Some(secs) = parse_positive::<u64>(&get, "OCM_TIMEOUT_SECS")? {
            ocm = ocm.with_timeout(secs);
        }
        if let Some(n) = parse_positive::<usize>(&get, "OCM_MAX_CONCURRENT")? {
            ocm = ocm.with_max_concurrent(n);
        }

        let regional = match get("REGIONAL_COUNTRY_CODE") {
            Some(code) => RegionalConfig::new(code.trim().to_uppercase()),
            None => RegionalConfig::default(),
        };

        let bind_addr: SocketAddr = match parse_var::<SocketAddr>(&get, "BIND_ADDR")? {
            Some(addr) => addr,
            None => DEFAULT_BIND_ADDR.parse().map_err(|_| ConfigError {
                name: "BIND_ADDR",
                value: DEFAULT_BIND_ADDR.to_string(),
            })?,
        };

        Ok(Self {
            bind_addr,
            ocm,
            nearby_cache: CacheConfig::default(),
            regional,
            store_path: get("STATION_STORE_PATH").map(PathBuf::from),
        })
    }
}

fn parse_var<T: FromStr>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    get(name)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| ConfigError { name, value: raw })
        })
        .transpose()
}

/// Like [`parse_var`], but zero is rejected.
fn parse_positive<T: FromStr + PartialEq + Default>(
    get: &impl Fn(&str) -> Option<String>,
    name: &'static str,
) -> Result<Option<T>, ConfigError> {
    match parse_var::<T>(get, name)? {
        Some(n) if n == T::default() => Err(ConfigError {
            name,
            value: get(name).unwrap_or_default(),
        }),
        parsed => Ok(parsed),
    }
}
