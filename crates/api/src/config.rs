//! Process configuration, read once from the environment at startup.

use anyhow::Context;

use brujula_ai::GeminiConfig;
use brujula_odoo::OdooConfig;

pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub port: u16,
    /// `None` runs against the built-in demo catalog.
    pub odoo: Option<OdooConfig>,
    /// `None` disables `/chatFlow`.
    pub gemini: Option<GeminiConfig>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&'static str) -> Option<String>) -> anyhow::Result<Self> {
        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("invalid PORT {raw:?}"))?,
            None => DEFAULT_PORT,
        };
        let bind_addr = lookup("BIND_ADDR")
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        let odoo = OdooConfig::from_lookup(&lookup).context("invalid ERP configuration")?;
        let gemini = GeminiConfig::from_lookup(&lookup).context("invalid model configuration")?;

        Ok(Self {
            bind_addr,
            port,
            odoo,
            gemini,
        })
    }

    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&'static str, &'static str)]) -> impl Fn(&'static str) -> Option<String> {
        let pairs = pairs.to_vec();
        move |key| {
            pairs
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        }
    }

    #[test]
    fn empty_environment_uses_defaults() {
        let config = AppConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config.socket_addr(), "0.0.0.0:8080");
        assert!(config.odoo.is_none());
        assert!(config.gemini.is_none());
    }

    #[test]
    fn erp_and_model_settings_are_picked_up() {
        let config = AppConfig::from_lookup(lookup(&[
            ("PORT", "3400"),
            ("BIND_ADDR", "127.0.0.1"),
            ("ODOO_URL", "https://erp.example.com"),
            ("ODOO_DB", "mom"),
            ("ODOO_USER", "bot@example.com"),
            ("ODOO_PASSWORD", "secret"),
            ("GEMINI_API_KEY", "k"),
        ]))
        .unwrap();

        assert_eq!(config.socket_addr(), "127.0.0.1:3400");
        assert_eq!(config.odoo.unwrap().db, "mom");
        assert_eq!(config.gemini.unwrap().model, GeminiConfig::DEFAULT_MODEL);
    }

    #[test]
    fn bad_port_is_an_error() {
        assert!(AppConfig::from_lookup(lookup(&[("PORT", "http")])).is_err());
    }

    #[test]
    fn partial_erp_settings_are_an_error() {
        let err = AppConfig::from_lookup(lookup(&[("ODOO_URL", "https://erp.example.com")]))
            .unwrap_err();
        assert!(format!("{err:#}").contains("ODOO_DB"), "{err:#}");
    }
}
