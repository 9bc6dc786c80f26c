use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{name} is not in the correct format: {value:?}")]
    Invalid { name: &'static str, value: String },
}

/// How a `RecordSet` is written into the response body
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseShape {
    /// A JSON array of objects
    #[default]
    Array,
    /// The array's JSON text wrapped in a JSON string, for older consumers
    LegacyString,
}

impl FromStr for ResponseShape {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "array" => Ok(ResponseShape::Array),
            "legacy-string" | "legacy_string" | "string" => Ok(ResponseShape::LegacyString),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub addr: SocketAddr,
    pub response_shape: ResponseShape,
}

impl Config {
    /// Reads the process environment; call `dotenvy::dotenv()` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let database_url = lookup("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;

        let host: Ipv4Addr = parse_or(&lookup, "HOST", Ipv4Addr::LOCALHOST)?;
        let port: u16 = parse_or(&lookup, "PORT", 8080)?;
        let response_shape = parse_or(&lookup, "RESPONSE_SHAPE", ResponseShape::default())?;

        Ok(Config {
            database_url,
            addr: SocketAddr::from((host, port)),
            response_shape,
        })
    }
}

fn parse_or<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    name: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    match lookup(name) {
        None => Ok(default),
        Some(value) => value
            .parse()
            .map_err(|_| ConfigError::Invalid { name, value }),
    }
}
