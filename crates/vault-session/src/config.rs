//! # Session Configuration
//!
//! Configuration for the checkout session and the shell.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     VAULT_PROCESSING_DELAY_MS=500                                      │
//! │     VAULT_THEME=dark                                                   │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/stylevault/vault.toml (Linux)                            │
//! │     ~/Library/Application Support/com.stylevault.stylevault/vault.toml │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     2000 ms processing, 3000 ms cleanup, 7 delivery days               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # vault.toml
//! [checkout]
//! processing_delay_ms = 2000
//! cleanup_delay_ms = 3000
//! delivery_days = 7
//!
//! [display]
//! currency_symbol = "$"
//! theme = "light"  # light | dark
//!
//! [remote]
//! mirror_cart = true
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};
use vault_core::MAX_DELIVERY_DAYS;

use crate::error::{SessionError, SessionResult};

// =============================================================================
// Theme
// =============================================================================

/// Color theme of the storefront.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl std::fmt::Display for Theme {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Theme::Light => write!(f, "light"),
            Theme::Dark => write!(f, "dark"),
        }
    }
}

impl std::str::FromStr for Theme {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(SessionError::InvalidConfig(format!(
                "Unknown theme: '{}'. Valid options: light, dark",
                other
            ))),
        }
    }
}

// =============================================================================
// Checkout Settings
// =============================================================================

/// Timing of the simulated order submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutSettings {
    /// Delay between submit and the confirmation (milliseconds).
    #[serde(default = "default_processing_delay")]
    pub processing_delay_ms: u64,

    /// Delay between the confirmation and the cart/form reset (milliseconds).
    #[serde(default = "default_cleanup_delay")]
    pub cleanup_delay_ms: u64,

    /// Days added to the order date for the delivery estimate.
    #[serde(default = "default_delivery_days")]
    pub delivery_days: i64,
}

fn default_processing_delay() -> u64 {
    2000
}

fn default_cleanup_delay() -> u64 {
    3000
}

fn default_delivery_days() -> i64 {
    vault_core::DEFAULT_DELIVERY_DAYS
}

impl Default for CheckoutSettings {
    fn default() -> Self {
        CheckoutSettings {
            processing_delay_ms: default_processing_delay(),
            cleanup_delay_ms: default_cleanup_delay(),
            delivery_days: default_delivery_days(),
        }
    }
}

// =============================================================================
// Display Settings
// =============================================================================

/// How amounts and the shell are rendered.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DisplaySettings {
    #[serde(default = "default_currency_symbol")]
    pub currency_symbol: String,

    #[serde(default)]
    pub theme: Theme,
}

fn default_currency_symbol() -> String {
    "$".to_string()
}

impl Default for DisplaySettings {
    fn default() -> Self {
        DisplaySettings {
            currency_symbol: default_currency_symbol(),
            theme: Theme::default(),
        }
    }
}

// =============================================================================
// Remote Settings
// =============================================================================

/// Behavior towards the persistence provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoteSettings {
    /// Mirror cart mutations to the signed-in shopper's remote cart.
    #[serde(default = "default_true")]
    pub mirror_cart: bool,
}

fn default_true() -> bool {
    true
}

impl Default for RemoteSettings {
    fn default() -> Self {
        RemoteSettings { mirror_cart: true }
    }
}

// =============================================================================
// Main Session Configuration
// =============================================================================

/// Complete session configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SessionConfig {
    #[serde(default)]
    pub checkout: CheckoutSettings,

    #[serde(default)]
    pub display: DisplaySettings,

    #[serde(default)]
    pub remote: RemoteSettings,
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (vault.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> SessionResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading session config from file");
                let contents = std::fs::read_to_string(&path)?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load session config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> SessionResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| SessionError::ConfigSaveFailed("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)?;

        info!(?path, "Session config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> SessionResult<()> {
        if !(0..=MAX_DELIVERY_DAYS).contains(&self.checkout.delivery_days) {
            return Err(SessionError::InvalidConfig(format!(
                "delivery_days must be between 0 and {}",
                MAX_DELIVERY_DAYS
            )));
        }

        if self.display.currency_symbol.trim().is_empty() {
            return Err(SessionError::InvalidConfig(
                "currency_symbol must not be empty".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(ms) = std::env::var("VAULT_PROCESSING_DELAY_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => {
                    debug!(ms, "Overriding processing delay from environment");
                    self.checkout.processing_delay_ms = ms;
                }
                Err(_) => warn!(value = %ms, "Ignoring invalid VAULT_PROCESSING_DELAY_MS"),
            }
        }

        if let Ok(ms) = std::env::var("VAULT_CLEANUP_DELAY_MS") {
            match ms.parse::<u64>() {
                Ok(ms) => {
                    debug!(ms, "Overriding cleanup delay from environment");
                    self.checkout.cleanup_delay_ms = ms;
                }
                Err(_) => warn!(value = %ms, "Ignoring invalid VAULT_CLEANUP_DELAY_MS"),
            }
        }

        if let Ok(symbol) = std::env::var("VAULT_CURRENCY_SYMBOL") {
            self.display.currency_symbol = symbol;
        }

        if let Ok(theme) = std::env::var("VAULT_THEME") {
            match theme.parse() {
                Ok(parsed) => self.display.theme = parsed,
                Err(_) => warn!(theme = %theme, "Unknown theme in environment"),
            }
        }

        if let Ok(mirror) = std::env::var("VAULT_MIRROR_CART") {
            match mirror.to_lowercase().as_str() {
                "1" | "true" | "yes" => self.remote.mirror_cart = true,
                "0" | "false" | "no" => self.remote.mirror_cart = false,
                _ => warn!(value = %mirror, "Ignoring invalid VAULT_MIRROR_CART"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "stylevault", "stylevault")
            .map(|dirs| dirs.config_dir().join("vault.toml"))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn processing_delay(&self) -> Duration {
        Duration::from_millis(self.checkout.processing_delay_ms)
    }

    pub fn cleanup_delay(&self) -> Duration {
        Duration::from_millis(self.checkout.cleanup_delay_ms)
    }

    pub fn currency_symbol(&self) -> &str {
        &self.display.currency_symbol
    }
}
