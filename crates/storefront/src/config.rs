//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `MARIGOLD_DATABASE_URL` - `PostgreSQL` connection string
//!
//! ## Optional
//! - `MARIGOLD_HOST` - Bind address (default: 127.0.0.1)
//! - `MARIGOLD_PORT` - Listen port (default: 3000)
//! - `MARIGOLD_TAX_RATE` - Order tax rate (default: 0.18)
//! - `MARIGOLD_SHIPPING_FLAT_RATE` - Flat shipping charge (default: 10)
//! - `MARIGOLD_FREE_SHIPPING_THRESHOLD` - Subtotal above which shipping is
//!   waived (default: 100)
//! - `MARIGOLD_USD_TO_INR_RATE` - Display conversion rate (default: 83.25)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Sentry event sample rate (default: 1.0)

use std::net::{IpAddr, SocketAddr};

use rust_decimal::Decimal;
use secrecy::SecretString;
use thiserror::Error;

use marigold_core::UsdToInrRate;

/// Errors that can occur while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {0}")]
    MissingEnv(String),

    /// An environment variable has an unparseable value.
    #[error("invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Pricing policy applied when quoting orders.
#[derive(Debug, Clone, Copy)]
pub struct PricingConfig {
    /// Tax rate applied to the subtotal.
    pub tax_rate: Decimal,
    /// Flat shipping charge below the free-shipping threshold.
    pub shipping_flat_rate: Decimal,
    /// Subtotal (exclusive) above which shipping is waived.
    pub free_shipping_threshold: Decimal,
    /// Display conversion rate for INR formatting.
    pub usd_to_inr: UsdToInrRate,
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            tax_rate: Decimal::new(18, 2),
            shipping_flat_rate: Decimal::new(10, 0),
            free_shipping_threshold: Decimal::new(100, 0),
            usd_to_inr: UsdToInrRate::default(),
        }
    }
}

/// Storefront server configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// `PostgreSQL` connection string.
    pub database_url: SecretString,
    /// Bind address.
    pub host: IpAddr,
    /// Listen port.
    pub port: u16,
    /// Pricing policy.
    pub pricing: PricingConfig,
    /// Sentry DSN, if error tracking is enabled.
    pub sentry_dsn: Option<String>,
    /// Sentry environment name.
    pub sentry_environment: Option<String>,
    /// Sentry event sample rate.
    pub sentry_sample_rate: f32,
}

impl StorefrontConfig {
    /// Load configuration from the environment.
    ///
    /// Reads a `.env` file first if one is present.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a required variable is missing or a value
    /// cannot be parsed.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Best-effort; absence of a .env file is not an error.
        dotenvy::dotenv().ok();

        let database_url = SecretString::from(get_required_env("MARIGOLD_DATABASE_URL")?);

        let host = parse_env("MARIGOLD_HOST", "127.0.0.1")?;
        let port = parse_env("MARIGOLD_PORT", "3000")?;

        let pricing = PricingConfig {
            tax_rate: parse_env("MARIGOLD_TAX_RATE", "0.18")?,
            shipping_flat_rate: parse_env("MARIGOLD_SHIPPING_FLAT_RATE", "10")?,
            free_shipping_threshold: parse_env("MARIGOLD_FREE_SHIPPING_THRESHOLD", "100")?,
            usd_to_inr: UsdToInrRate::new(parse_env("MARIGOLD_USD_TO_INR_RATE", "83.25")?),
        };

        Ok(Self {
            database_url,
            host,
            port,
            pricing,
            sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            sentry_environment: std::env::var("SENTRY_ENVIRONMENT").ok(),
            sentry_sample_rate: parse_env("SENTRY_SAMPLE_RATE", "1.0")?,
        })
    }

    /// The socket address to bind the server to.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnv(key.to_string()))
}

fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an environment variable with a default and parse it.
fn parse_env<T>(key: &str, default: &str) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
{
    let raw = get_env_or_default(key, default);
    raw.parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string(), raw))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_pricing_defaults() {
        let pricing = PricingConfig::default();
        assert_eq!(pricing.tax_rate, Decimal::new(18, 2));
        assert_eq!(pricing.shipping_flat_rate, Decimal::new(10, 0));
        assert_eq!(pricing.free_shipping_threshold, Decimal::new(100, 0));
    }

    #[test]
    fn test_socket_addr() {
        let config = StorefrontConfig {
            database_url: SecretString::from("postgres://localhost/test"),
            host: "127.0.0.1".parse().unwrap(),
            port: 3000,
            pricing: PricingConfig::default(),
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
        };
        assert_eq!(config.socket_addr().to_string(), "127.0.0.1:3000");
    }
}
