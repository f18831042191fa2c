//! # Runtime Configuration Module
//!
//! Server options loaded from environment variables, overridable from the
//! command line.
//!
//! ## Environment Variables
//!
//! ### `CONSUME_ADDR`
//!
//! Listen address. Default: `0.0.0.0:3000`.
//!
//! ### `CONSUME_SECURE_HEADERS`
//!
//! When true, the secure-headers middleware is installed first in the global
//! chain. Default: `false`.
//!
//! ### `CONSUME_LOG_REQUESTS`
//!
//! When true, every matched request is logged with its URL, method and
//! payload. Default: `false`.
//!
//! ### `CONSUME_STACK_SIZE`
//!
//! Coroutine stack size, decimal (`32768`) or hexadecimal (`0x8000`).
//! Default: `0x8000` (32 KB).
//!
//! ## Usage
//!
//! ```rust
//! use consume::runtime_config::ServerOptions;
//!
//! let options = ServerOptions::from_lookup(|key| match key {
//!     "CONSUME_STACK_SIZE" => Some("0x10000".to_string()),
//!     _ => None,
//! })
//! .unwrap();
//! assert_eq!(options.stack_size, 0x10000);
//! assert_eq!(options.addr, "0.0.0.0:3000");
//! ```

use std::env;
use std::fmt;

pub const DEFAULT_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_STACK_SIZE: usize = 0x8000;

/// Invalid value in the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidBool { var: &'static str, value: String },
    InvalidStackSize { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidBool { var, value } => {
                write!(f, "{var}: expected true/false, got '{value}'")
            }
            ConfigError::InvalidStackSize { value } => write!(
                f,
                "CONSUME_STACK_SIZE: expected a positive decimal or 0x-prefixed hex size, got '{value}'"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerOptions {
    pub addr: String,
    pub use_secure_headers: bool,
    pub log_requests: bool,
    pub stack_size: usize,
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            use_secure_headers: false,
            log_requests: false,
            stack_size: DEFAULT_STACK_SIZE,
        }
    }
}

fn parse_flag(var: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        _ => Err(ConfigError::InvalidBool {
            var,
            value: value.to_string(),
        }),
    }
}

/// Parse a stack size given in decimal or `0x` hexadecimal.
pub fn parse_stack_size(value: &str) -> Result<usize, ConfigError> {
    let trimmed = value.trim();
    let parsed = match trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        Some(hex) => usize::from_str_radix(hex, 16),
        None => trimmed.parse(),
    };
    match parsed {
        Ok(size) if size > 0 => Ok(size),
        _ => Err(ConfigError::InvalidStackSize {
            value: value.to_string(),
        }),
    }
}

impl ServerOptions {
    /// Load options from `CONSUME_*` environment variables.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unparseable value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load options from an arbitrary lookup; unset variables keep defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when a variable is set to an unparseable value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = Self::default();
        if let Some(addr) = lookup("CONSUME_ADDR").filter(|a| !a.trim().is_empty()) {
            options.addr = addr;
        }
        if let Some(v) = lookup("CONSUME_SECURE_HEADERS") {
            options.use_secure_headers = parse_flag("CONSUME_SECURE_HEADERS", &v)?;
        }
        if let Some(v) = lookup("CONSUME_LOG_REQUESTS") {
            options.log_requests = parse_flag("CONSUME_LOG_REQUESTS", &v)?;
        }
        if let Some(v) = lookup("CONSUME_STACK_SIZE") {
            options.stack_size = parse_stack_size(&v)?;
        }
        Ok(options)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = ServerOptions::from_lookup(|_| None).unwrap();
        assert_eq!(options, ServerOptions::default());
        assert_eq!(options.addr, "0.0.0.0:3000");
        assert_eq!(options.stack_size, 0x8000);
    }

    #[test]
    fn test_flags_and_addr() {
        let options = ServerOptions::from_lookup(|key| match key {
            "CONSUME_ADDR" => Some("127.0.0.1:8080".into()),
            "CONSUME_SECURE_HEADERS" => Some("true".into()),
            "CONSUME_LOG_REQUESTS" => Some("1".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(options.addr, "127.0.0.1:8080");
        assert!(options.use_secure_headers);
        assert!(options.log_requests);
    }

    #[test]
    fn test_invalid_flag_is_an_error() {
        let err = ServerOptions::from_lookup(|key| {
            (key == "CONSUME_LOG_REQUESTS").then(|| "sometimes".to_string())
        })
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidBool {
                var: "CONSUME_LOG_REQUESTS",
                ..
            }
        ));
    }

    #[test]
    fn test_parse_stack_size() {
        assert_eq!(parse_stack_size("16384").unwrap(), 16384);
        assert_eq!(parse_stack_size("0x4000").unwrap(), 0x4000);
        assert!(parse_stack_size("0").is_err());
        assert!(parse_stack_size("0xzz").is_err());
        assert!(parse_stack_size("big").is_err());
    }
}
