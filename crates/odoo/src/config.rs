//! ERP connection settings.
//!
//! Read from the environment at startup. `ODOO_URL` switches the integration
//! on; once it is set the other credentials become mandatory.

use std::fmt;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Clone, PartialEq, Eq)]
pub struct OdooConfig {
    pub url: String,
    pub db: String,
    pub username: String,
    pub password: String,
    /// Bound applied to every remote call.
    pub timeout: Duration,
}

impl OdooConfig {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(5_000);

    pub fn new(
        url: impl Into<String>,
        db: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            url: url.into(),
            db: db.into(),
            username: username.into(),
            password: password.into(),
            timeout: Self::DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// `Ok(None)` when `ODOO_URL` is not set.
    pub fn from_env() -> Result<Option<Self>, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(
        lookup: impl Fn(&'static str) -> Option<String>,
    ) -> Result<Option<Self>, ConfigError> {
        let Some(url) = lookup("ODOO_URL").filter(|v| !v.trim().is_empty()) else {
            return Ok(None);
        };
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::Invalid {
                key: "ODOO_URL",
                reason: "expected an http(s) URL".to_string(),
            });
        }

        let required = |key: &'static str| lookup(key).ok_or(ConfigError::Missing(key));

        let mut config = Self::new(
            url,
            required("ODOO_DB")?,
            required("ODOO_USER")?,
            required("ODOO_PASSWORD")?,
        );

        if let Some(raw) = lookup("ODOO_RPC_TIMEOUT_MS") {
            let ms: u64 = raw.trim().parse().map_err(|e| ConfigError::Invalid {
                key: "ODOO_RPC_TIMEOUT_MS",
                reason: format!("{e}"),
            })?;
            if ms == 0 {
                return Err(ConfigError::Invalid {
                    key: "ODOO_RPC_TIMEOUT_MS",
                    reason: "must be greater than zero".to_string(),
                });
            }
            config.timeout = Duration::from_millis(ms);
        }

        Ok(Some(config))
    }
}

impl fmt::Debug for OdooConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OdooConfig")
            .field("url", &self.url)
            .field("db", &self.db)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("timeout", &self.timeout)
            .finish()
    }
}
