//! Link configuration
//!
//! Tunables for the receive and transmit endpoints. Stored as postcard binary
//! data alongside the rest of the board configuration.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Current configuration layout version
pub const CONFIG_VERSION: u8 = 1;

/// Largest serialized [`LinkConfig`] in bytes
pub const MAX_CONFIG_SIZE: usize = 16;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Serialization failed (output buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Config version mismatch
    VersionMismatch,
    /// A field is outside its allowed range
    Invalid,
}

/// Link endpoint configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LinkConfig {
    /// Layout version, must equal [`CONFIG_VERSION`]
    pub version: u8,
    /// Prefix every transmitted frame with END to flush line noise
    pub emit_leading_end: bool,
    /// Upper bound on bytes handled by one `LinkRx::poll` call
    pub max_bytes_per_poll: u16,
    /// Consecutive dropped frames before the link is reported degraded
    pub max_consecutive_drops: u8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            emit_leading_end: true,
            max_bytes_per_poll: 256,
            max_consecutive_drops: 3,
        }
    }
}

impl LinkConfig {
    /// Check field ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.version != CONFIG_VERSION {
            return Err(ConfigError::VersionMismatch);
        }
        if self.max_bytes_per_poll == 0 || self.max_consecutive_drops == 0 {
            return Err(ConfigError::Invalid);
        }
        Ok(())
    }
}

#[cfg(feature = "serde")]
impl LinkConfig {
    /// Serialize into `buf`, returning the used prefix
    pub fn to_slice<'b>(&self, buf: &'b mut [u8]) -> Result<&'b mut [u8], ConfigError> {
        postcard::to_slice(self, buf).map_err(|_| ConfigError::Serialize)
    }

    /// Deserialize and validate a stored configuration
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ConfigError> {
        let config: LinkConfig =
            postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;

        if config.version != CONFIG_VERSION {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Link config version mismatch: found {}, expected {}",
                config.version, CONFIG_VERSION
            );
            return Err(ConfigError::VersionMismatch);
        }
        config.validate()?;

        #[cfg(feature = "defmt")]
        defmt::debug!(
            "Link config: leading_end={} poll_budget={} drop_limit={}",
            config.emit_leading_end, config.max_bytes_per_poll, config.max_consecutive_drops
        );
        Ok(config)
    }
}
