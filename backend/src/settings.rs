//! Application settings loaded via OrthoConfig.
//!
//! Every value can come from the command line, a configuration file, or a
//! `CADENCE_*` environment variable. Leaving the database or identity
//! provider unset selects the in-memory adapters.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;
use zeroize::Zeroizing;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_BLOB_ROOT: &str = "var/lesson-assets";
const DEFAULT_BLOB_BASE_URL: &str = "/assets";

/// Raised when a configured value cannot be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// A value failed to parse.
    #[error("invalid value for {field}: {message}")]
    Invalid {
        /// Offending setting.
        field: &'static str,
        /// Parser message.
        message: String,
    },
    /// The identity-provider URL is set without its API key.
    #[error("identity_url requires identity_api_key")]
    MissingIdentityKey,
}

/// Connection details for the hosted identity provider.
#[derive(Clone)]
pub struct IdentitySettings {
    /// Base URL of the auth service.
    pub base_url: Url,
    /// Project API key.
    pub api_key: Zeroizing<String>,
}

/// Runtime configuration for the server binary.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "CADENCE")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL connection URL.
    pub database_url: Option<String>,
    /// Maximum pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Leave the schema alone at startup instead of applying embedded
    /// migrations.
    #[ortho_config(default = false)]
    pub skip_migrations: bool,
    /// Base URL of the identity provider.
    pub identity_url: Option<String>,
    /// API key sent to the identity provider.
    pub identity_api_key: Option<String>,
    /// Page the password-reset email links back to.
    pub reset_redirect: Option<String>,
    /// Directory lesson assets are written beneath.
    pub blob_root: Option<PathBuf>,
    /// Public URL prefix lesson assets are served from.
    pub blob_base_url: Option<String>,
}

fn invalid(field: &'static str, err: impl ToString) -> SettingsError {
    SettingsError::Invalid {
        field,
        message: err.to_string(),
    }
}

impl AppSettings {
    /// Address to bind, defaulting to all interfaces on port 8080.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] for an unparsable address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|err| invalid("bind_addr", err))
    }

    /// Database URL, when persistence is configured.
    pub fn database_url(&self) -> Option<Zeroizing<String>> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .map(|url| Zeroizing::new(url.to_owned()))
    }

    /// Identity-provider connection, when configured.
    ///
    /// # Errors
    ///
    /// Returns an error for a malformed URL or a URL without an API key.
    pub fn identity(&self) -> Result<Option<IdentitySettings>, SettingsError> {
        let Some(raw) = self.identity_url.as_deref().filter(|url| !url.is_empty()) else {
            return Ok(None);
        };
        let base_url = Url::parse(raw).map_err(|err| invalid("identity_url", err))?;
        let api_key = self
            .identity_api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(SettingsError::MissingIdentityKey)?;
        Ok(Some(IdentitySettings {
            base_url,
            api_key: Zeroizing::new(api_key.to_owned()),
        }))
    }

    /// Password-reset landing page, if any.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Invalid`] for a malformed URL.
    pub fn reset_redirect(&self) -> Result<Option<Url>, SettingsError> {
        self.reset_redirect
            .as_deref()
            .map(|raw| Url::parse(raw).map_err(|err| invalid("reset_redirect", err)))
            .transpose()
    }

    /// Asset directory.
    pub fn blob_root(&self) -> PathBuf {
        self.blob_root
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_BLOB_ROOT))
    }

    /// Asset URL prefix.
    pub fn blob_base_url(&self) -> &str {
        self.blob_base_url
            .as_deref()
            .unwrap_or(DEFAULT_BLOB_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for application settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "CADENCE_BIND_ADDR",
        "CADENCE_DATABASE_URL",
        "CADENCE_DB_MAX_CONNECTIONS",
        "CADENCE_SKIP_MIGRATIONS",
        "CADENCE_IDENTITY_URL",
        "CADENCE_IDENTITY_API_KEY",
        "CADENCE_RESET_REDIRECT",
        "CADENCE_BLOB_ROOT",
        "CADENCE_BLOB_BASE_URL",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("cadence")]).expect("config should load")
    }

    fn env_with(overrides: &[(&str, &str)]) -> Vec<(&'static str, Option<String>)> {
        VARS.iter()
            .map(|name| {
                let value = overrides
                    .iter()
                    .find(|(key, _)| key == name)
                    .map(|(_, value)| (*value).to_owned());
                (*name, value)
            })
            .collect()
    }

    #[rstest]
    fn defaults_select_in_memory_adapters() {
        let _guard = lock_env(env_with(&[]));

        let settings = load_from_empty_args();

        assert_eq!(
            settings.bind_addr().expect("default address"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert!(settings.database_url().is_none());
        assert!(!settings.skip_migrations);
        assert!(settings.identity().expect("no identity").is_none());
        assert_eq!(settings.blob_root(), PathBuf::from(DEFAULT_BLOB_ROOT));
        assert_eq!(settings.blob_base_url(), DEFAULT_BLOB_BASE_URL);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env(env_with(&[
            ("CADENCE_BIND_ADDR", "127.0.0.1:9000"),
            ("CADENCE_DATABASE_URL", "postgres://cadence@localhost/cadence"),
            ("CADENCE_IDENTITY_URL", "https://auth.example.com"),
            ("CADENCE_IDENTITY_API_KEY", "anon-key"),
            ("CADENCE_BLOB_BASE_URL", "https://cdn.example.com"),
        ]));

        let settings = load_from_empty_args();

        assert_eq!(settings.bind_addr().expect("addr").port(), 9000);
        assert_eq!(
            settings.database_url().as_deref().map(String::as_str),
            Some("postgres://cadence@localhost/cadence")
        );
        let identity = settings.identity().expect("valid").expect("configured");
        assert_eq!(identity.base_url.as_str(), "https://auth.example.com/");
        assert_eq!(identity.api_key.as_str(), "anon-key");
        assert_eq!(settings.blob_base_url(), "https://cdn.example.com");
    }

    #[rstest]
    fn migrations_can_be_skipped() {
        let _guard = lock_env(env_with(&[("CADENCE_SKIP_MIGRATIONS", "true")]));

        let settings = load_from_empty_args();

        assert!(settings.skip_migrations);
    }

    #[rstest]
    fn identity_url_without_key_is_rejected() {
        let _guard = lock_env(env_with(&[(
            "CADENCE_IDENTITY_URL",
            "https://auth.example.com",
        )]));

        let settings = load_from_empty_args();

        assert!(matches!(
            settings.identity(),
            Err(SettingsError::MissingIdentityKey)
        ));
    }

    #[rstest]
    fn malformed_bind_address_is_reported() {
        let _guard = lock_env(env_with(&[("CADENCE_BIND_ADDR", "not-an-address")]));

        let settings = load_from_empty_args();

        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::Invalid { field: "bind_addr", .. })
        ));
    }
}
