//! Configuration for identity resolution.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::{DidError, DidResult};

//--------------------------------------------------------------------------------------------------
// Constants
//--------------------------------------------------------------------------------------------------

/// The well-known public directory for `did:plc` identities.
pub const DEFAULT_PLC_DIRECTORY_URL: &str = "https://plc.directory";

/// Default timeout for resolution HTTP requests, in milliseconds.
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;

/// Default age past which a cached document is considered stale (1 hour).
pub const DEFAULT_STALE_TTL_MS: u64 = 60 * 60 * 1000;

/// Default age past which a cached document is considered expired (1 day).
pub const DEFAULT_MAX_TTL_MS: u64 = 24 * 60 * 60 * 1000;

//--------------------------------------------------------------------------------------------------
// Types
//--------------------------------------------------------------------------------------------------

/// Configuration for [`DidResolver`][crate::DidResolver].
///
/// All fields have working defaults, so `IdentityConfig::default()` is a
/// usable production configuration pointed at the public directory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct IdentityConfig {
    /// Base URL of the `did:plc` directory.
    #[serde(default = "default::plc_directory_url")]
    #[builder(default = default::plc_directory_url())]
    pub plc_directory_url: String,

    /// Timeout applied to each resolution HTTP request, in milliseconds.
    #[serde(default = "default::timeout_ms")]
    #[builder(default = default::timeout_ms())]
    pub timeout_ms: u64,

    /// Cache age past which a document is stale and should be refreshed.
    #[serde(default = "default::stale_ttl_ms")]
    #[builder(default = default::stale_ttl_ms())]
    pub stale_ttl_ms: u64,

    /// Cache age past which a document is expired and treated as a miss.
    #[serde(default = "default::max_ttl_ms")]
    #[builder(default = default::max_ttl_ms())]
    pub max_ttl_ms: u64,
}

//--------------------------------------------------------------------------------------------------
// Functions
//--------------------------------------------------------------------------------------------------

mod default {
    pub(super) fn plc_directory_url() -> String {
        super::DEFAULT_PLC_DIRECTORY_URL.to_string()
    }

    pub(super) fn timeout_ms() -> u64 {
        super::DEFAULT_TIMEOUT_MS
    }

    pub(super) fn stale_ttl_ms() -> u64 {
        super::DEFAULT_STALE_TTL_MS
    }

    pub(super) fn max_ttl_ms() -> u64 {
        super::DEFAULT_MAX_TTL_MS
    }
}

//--------------------------------------------------------------------------------------------------
// Methods
//--------------------------------------------------------------------------------------------------

impl IdentityConfig {
    /// Validates the configuration.
    pub fn validate(&self) -> DidResult<()> {
        if self.stale_ttl_ms > self.max_ttl_ms {
            return Err(DidError::InvalidTtlBounds {
                stale_ms: self.stale_ttl_ms,
                max_ms: self.max_ttl_ms,
            });
        }

        Ok(())
    }

    /// Loads configuration from a TOML file.
    pub fn from_file(path: impl AsRef<std::path::Path>) -> DidResult<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: IdentityConfig = toml::from_str(&contents)?;
        config.validate()?;
        Ok(config)
    }
}

//--------------------------------------------------------------------------------------------------
// Trait Implementations
//--------------------------------------------------------------------------------------------------

impl Default for IdentityConfig {
    fn default() -> Self {
        Self {
            plc_directory_url: default::plc_directory_url(),
            timeout_ms: default::timeout_ms(),
            stale_ttl_ms: default::stale_ttl_ms(),
            max_ttl_ms: default::max_ttl_ms(),
        }
    }
}

//--------------------------------------------------------------------------------------------------
// Tests
//--------------------------------------------------------------------------------------------------
