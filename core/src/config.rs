//! Client configuration.
//!
//! Sources, later ones winning:
//! 1. `ServiceConfig::default()`
//! 2. `SNIPPET_*` variables (`SNIPPET_BACKEND_URL`, `SNIPPET_LANGUAGE`,
//!    `SNIPPET_FORMAT_VERSION`)
//! 3. `BACKEND_URL`, the variable the UI build already sets

use figment::providers::{Env, Serialized};
use figment::Figment;
use serde::{Deserialize, Serialize};

pub const ENV_PREFIX: &str = "SNIPPET_";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Base URL of the snippet backend, without a trailing slash.
    pub backend_url: String,
    /// Language sent to the format and rules endpoints.
    pub language: String,
    /// Language version sent to the format endpoint.
    pub format_version: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            backend_url: "http://localhost:8080".to_string(),
            language: "Printscript".to_string(),
            format_version: "1.1".to_string(),
        }
    }
}

impl ServiceConfig {
    pub fn figment() -> Figment {
        Figment::new()
            .merge(Serialized::defaults(ServiceConfig::default()))
            .merge(Env::prefixed(ENV_PREFIX))
            .merge(Env::raw().only(&["BACKEND_URL"]).map(|_| "backend_url".into()))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }
}

#[cfg(test)]
mod tests {
    use figment::Jail;

    use super::*;

    #[test]
    fn defaults_without_environment() {
        Jail::expect_with(|_| {
            assert_eq!(ServiceConfig::load()?, ServiceConfig::default());
            Ok(())
        });
    }

    #[test]
    fn backend_url_variable_is_honoured() {
        Jail::expect_with(|jail| {
            jail.set_env("BACKEND_URL", "https://snippets.example.com");
            let config = ServiceConfig::load()?;
            assert_eq!(config.backend_url, "https://snippets.example.com");
            assert_eq!(config.language, "Printscript");
            Ok(())
        });
    }

    #[test]
    fn bare_backend_url_overrides_prefixed() {
        Jail::expect_with(|jail| {
            jail.set_env("BACKEND_URL", "https://snippets.example.com");
            jail.set_env("SNIPPET_BACKEND_URL", "https://prefixed.example.com");
            jail.set_env("SNIPPET_FORMAT_VERSION", "1.0");
            let config = ServiceConfig::load()?;
            assert_eq!(config.backend_url, "https://snippets.example.com");
            assert_eq!(config.format_version, "1.0");
            Ok(())
        });
    }

    #[test]
    fn prefixed_backend_url_applies_alone() {
        Jail::expect_with(|jail| {
            jail.set_env("SNIPPET_BACKEND_URL", "http://127.0.0.1:3000");
            assert_eq!(ServiceConfig::load()?.backend_url, "http://127.0.0.1:3000");
            Ok(())
        });
    }
}
