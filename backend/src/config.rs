//! Application settings loaded via OrthoConfig.
//!
//! Values merge from CLI flags, `SHOWROOM_*` environment variables, and the
//! defaults below. Unset optional fields fall back through the accessor
//! methods, which also validate the values that have a structured form.

use std::net::SocketAddr;
use std::path::PathBuf;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MESSAGES_DIR: &str = "data";
const DEFAULT_MESSAGES_FILE: &str = "mensajes.json";
const DEFAULT_PUBLIC_DIR: &str = "public";
const DEFAULT_ALLOWED_ORIGINS: &str = "http://localhost:8080";
const DEFAULT_PRODUCTS_TEST_COUNT: u32 = 5;

/// Settings values that could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("bind address '{value}' is not a socket address")]
    BindAddr { value: String },
    #[error("allowed origin '{value}' is not a URL")]
    Origin { value: String },
    #[error("messages directory '{value}' is not valid UTF-8")]
    MessagesDir { value: String },
}

/// Server settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SHOWROOM")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL for the product catalogue. Products live in memory
    /// when unset.
    pub database_url: Option<String>,
    /// Directory holding the message document; created when missing.
    pub messages_dir: Option<PathBuf>,
    /// Message document file name inside `messages_dir`.
    pub messages_file: Option<String>,
    /// Directory served for static assets.
    pub public_dir: Option<PathBuf>,
    /// Comma-separated origins allowed to open the WebSocket.
    pub allowed_origins: Option<String>,
    /// Products per synthetic listing.
    pub products_test_count: Option<u32>,
}

impl AppSettings {
    /// Listen address.
    ///
    /// # Errors
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let value = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        value.parse().map_err(|_| SettingsError::BindAddr {
            value: value.to_owned(),
        })
    }

    /// Database URL, if the catalogue should persist.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
    }

    /// Directory for the message document.
    ///
    /// # Errors
    /// Returns [`SettingsError::MessagesDir`] for non UTF-8 paths.
    pub fn messages_dir(&self) -> Result<camino::Utf8PathBuf, SettingsError> {
        let path = self
            .messages_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MESSAGES_DIR));
        camino::Utf8PathBuf::from_path_buf(path).map_err(|path| SettingsError::MessagesDir {
            value: path.display().to_string(),
        })
    }

    /// Message document file name.
    pub fn messages_file(&self) -> &str {
        self.messages_file
            .as_deref()
            .unwrap_or(DEFAULT_MESSAGES_FILE)
    }

    /// Static asset directory.
    pub fn public_dir(&self) -> PathBuf {
        self.public_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_PUBLIC_DIR))
    }

    /// Parsed WebSocket origin allow-list.
    ///
    /// # Errors
    /// Returns [`SettingsError::Origin`] for the first entry that is not a URL.
    pub fn allowed_origins(&self) -> Result<Vec<Url>, SettingsError> {
        self.allowed_origins
            .as_deref()
            .unwrap_or(DEFAULT_ALLOWED_ORIGINS)
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(|entry| {
                Url::parse(entry).map_err(|_| SettingsError::Origin {
                    value: entry.to_owned(),
                })
            })
            .collect()
    }

    /// Products per synthetic listing.
    pub fn products_test_count(&self) -> u32 {
        self.products_test_count
            .unwrap_or(DEFAULT_PRODUCTS_TEST_COUNT)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 7] = [
        "SHOWROOM_BIND_ADDR",
        "SHOWROOM_DATABASE_URL",
        "SHOWROOM_MESSAGES_DIR",
        "SHOWROOM_MESSAGES_FILE",
        "SHOWROOM_PUBLIC_DIR",
        "SHOWROOM_ALLOWED_ORIGINS",
        "SHOWROOM_PRODUCTS_TEST_COUNT",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("showroom")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_nothing_is_set() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default parses"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("valid default")
        );
        assert!(settings.database_url().is_none());
        assert_eq!(
            settings.messages_dir().expect("utf-8").as_str(),
            DEFAULT_MESSAGES_DIR
        );
        assert_eq!(settings.messages_file(), DEFAULT_MESSAGES_FILE);
        assert_eq!(settings.public_dir(), PathBuf::from(DEFAULT_PUBLIC_DIR));
        assert_eq!(
            settings.allowed_origins().expect("default parses"),
            [Url::parse(DEFAULT_ALLOWED_ORIGINS).expect("valid default")]
        );
        assert_eq!(settings.products_test_count(), DEFAULT_PRODUCTS_TEST_COUNT);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("SHOWROOM_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            (
                "SHOWROOM_DATABASE_URL",
                Some("postgres://localhost/showroom".to_owned()),
            ),
            ("SHOWROOM_MESSAGES_DIR", Some("/var/lib/showroom".to_owned())),
            ("SHOWROOM_MESSAGES_FILE", Some("chat.json".to_owned())),
            ("SHOWROOM_PUBLIC_DIR", Some("/srv/public".to_owned())),
            (
                "SHOWROOM_ALLOWED_ORIGINS",
                Some("https://shop.example, http://localhost:3000".to_owned()),
            ),
            ("SHOWROOM_PRODUCTS_TEST_COUNT", Some("8".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("parses"),
            "127.0.0.1:9000".parse::<SocketAddr>().expect("valid address")
        );
        assert_eq!(settings.database_url(), Some("postgres://localhost/showroom"));
        assert_eq!(
            settings.messages_dir().expect("utf-8").as_str(),
            "/var/lib/showroom"
        );
        assert_eq!(settings.messages_file(), "chat.json");
        assert_eq!(settings.public_dir(), PathBuf::from("/srv/public"));
        assert_eq!(settings.allowed_origins().expect("parses").len(), 2);
        assert_eq!(settings.products_test_count(), 8);
    }

    #[rstest]
    fn invalid_values_are_reported() {
        let _guard = lock_env([
            ("SHOWROOM_BIND_ADDR", Some("nowhere".to_owned())),
            ("SHOWROOM_ALLOWED_ORIGINS", Some("not a url".to_owned())),
            ("SHOWROOM_DATABASE_URL", Some("  ".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr {
                value: "nowhere".to_owned()
            })
        );
        assert!(matches!(
            settings.allowed_origins(),
            Err(SettingsError::Origin { .. })
        ));
        assert!(settings.database_url().is_none());
    }
}
