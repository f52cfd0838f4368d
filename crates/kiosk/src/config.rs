//! Kiosk configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional:
//! - `KIOSK_INACTIVITY_TIMEOUT_SECS` - Idle seconds before a session reset (default: 120)
//! - `KIOSK_TAX_RATE` - Tax rate applied to the subtotal (default: 0.08)
//! - `KIOSK_FREE_DELIVERY_THRESHOLD` - Subtotal above which delivery is free (default: 25.00)
//! - `KIOSK_DELIVERY_FEE` - Flat delivery fee below the threshold (default: 2.99)
//! - `KIOSK_CURRENCY` - ISO 4217 display currency (default: USD)
//! - `KIOSK_ADD_DEBOUNCE_MS` - Window in which repeated taps on the same item are
//!   ignored (default: 0, disabled)
//! - `KIOSK_CATALOG_PATH` - YAML menu file; the built-in menu is used when unset

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use kiosk_core::CurrencyCode;
use rust_decimal::Decimal;
use thiserror::Error;

const DEFAULT_INACTIVITY_TIMEOUT_SECS: u64 = 120;
/// One day; a kiosk left idle longer than this is misconfigured.
const MAX_INACTIVITY_TIMEOUT_SECS: u64 = 86_400;
const DEFAULT_TAX_RATE: &str = "0.08";
const DEFAULT_FREE_DELIVERY_THRESHOLD: &str = "25.00";
const DEFAULT_DELIVERY_FEE: &str = "2.99";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Kiosk application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KioskConfig {
    /// Idle period after which the session is reset
    pub inactivity_timeout: Duration,
    /// Tax and delivery pricing
    pub pricing: PricingConfig,
    /// Repeated add-to-cart taps on the same item within this window are ignored
    pub add_debounce: Duration,
    /// Optional YAML catalog path
    pub catalog_path: Option<PathBuf>,
}

/// Tax, delivery and currency settings used to derive cart totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PricingConfig {
    /// Fraction of the subtotal charged as tax (0.08 = 8%)
    pub tax_rate: Decimal,
    /// Delivery is free when the subtotal is strictly greater than this
    pub free_delivery_threshold: Decimal,
    /// Flat fee charged otherwise
    pub delivery_fee: Decimal,
    /// Currency used for display formatting
    pub currency: CurrencyCode,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(8, 2),
            free_delivery_threshold: Decimal::new(2500, 2),
            delivery_fee: Decimal::new(299, 2),
            currency: CurrencyCode::USD,
        }
    }
}

impl Default for KioskConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: Duration::from_secs(DEFAULT_INACTIVITY_TIMEOUT_SECS),
            pricing: PricingConfig::default(),
            add_debounce: Duration::ZERO,
            catalog_path: None,
        }
    }
}

impl KioskConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is present but cannot be parsed or
    /// is out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`KioskConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let timeout_secs: u64 = parse_or_default(
            &lookup,
            "KIOSK_INACTIVITY_TIMEOUT_SECS",
            &DEFAULT_INACTIVITY_TIMEOUT_SECS.to_string(),
        )?;
        if timeout_secs == 0 || timeout_secs > MAX_INACTIVITY_TIMEOUT_SECS {
            return Err(ConfigError::InvalidEnvVar(
                "KIOSK_INACTIVITY_TIMEOUT_SECS".to_string(),
                format!(
                    "must be between 1 and {MAX_INACTIVITY_TIMEOUT_SECS} (got {timeout_secs})"
                ),
            ));
        }

        let tax_rate: Decimal = parse_or_default(&lookup, "KIOSK_TAX_RATE", DEFAULT_TAX_RATE)?;
        if tax_rate.is_sign_negative() || tax_rate > Decimal::ONE {
            return Err(ConfigError::InvalidEnvVar(
                "KIOSK_TAX_RATE".to_string(),
                format!("must be between 0 and 1 (got {tax_rate})"),
            ));
        }

        let free_delivery_threshold: Decimal = parse_or_default(
            &lookup,
            "KIOSK_FREE_DELIVERY_THRESHOLD",
            DEFAULT_FREE_DELIVERY_THRESHOLD,
        )?;
        ensure_non_negative("KIOSK_FREE_DELIVERY_THRESHOLD", free_delivery_threshold)?;

        let delivery_fee: Decimal =
            parse_or_default(&lookup, "KIOSK_DELIVERY_FEE", DEFAULT_DELIVERY_FEE)?;
        ensure_non_negative("KIOSK_DELIVERY_FEE", delivery_fee)?;

        let currency: CurrencyCode = parse_or_default(&lookup, "KIOSK_CURRENCY", "USD")?;
        let debounce_ms: u64 = parse_or_default(&lookup, "KIOSK_ADD_DEBOUNCE_MS", "0")?;
        let catalog_path = lookup("KIOSK_CATALOG_PATH")
            .filter(|path| !path.trim().is_empty())
            .map(PathBuf::from);

        Ok(Self {
            inactivity_timeout: Duration::from_secs(timeout_secs),
            pricing: PricingConfig {
                tax_rate,
                free_delivery_threshold,
                delivery_fee,
                currency,
            },
            add_debounce: Duration::from_millis(debounce_ms),
            catalog_path,
        })
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Parse a variable, falling back to `default` when it is unset.
fn parse_or_default<T, F>(lookup: &F, key: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse::<T>()
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn ensure_non_negative(key: &str, value: Decimal) -> Result<(), ConfigError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("must not be negative (got {value})"),
        ));
    }
    Ok(())
}
