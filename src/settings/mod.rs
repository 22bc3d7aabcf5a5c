//! Local settings persisted between invocations.
//!
//! Two independent files live in a per-user directory (`~/.circleci` by
//! default):
//!
//! - `cli.yml` holds [`Settings`] (`host`, `token` and any keys written by
//!   other tools, which are preserved)
//! - `update_check.yml` holds [`UpdateCheckState`]
//!
//! [`SettingsStore`] reads and writes both. Writes go to a temporary file in
//! the same directory which is then renamed over the target, so a reader
//! sees either the previous complete file or the new one.
//!
//! # Example
//!
//! ```rust,no_run
//! use circleci_core::{AuthToken, SettingsStore};
//!
//! let store = SettingsStore::from_home()?;
//! let mut settings = store.load()?.with_process_env();
//! settings.token = AuthToken::new("new-token");
//! store.save(&settings)?;
//! # Ok::<(), circleci_core::SettingsError>(())
//! ```

mod errors;
mod store;
mod update_check;

pub use errors::SettingsError;
pub use store::{SettingsStore, CONFIG_FILE_NAME, SETTINGS_DIR_NAME, UPDATE_CHECK_FILE_NAME};
pub use update_check::{UpdateCheckState, DEFAULT_UPDATE_CHECK_INTERVAL};

use std::collections::BTreeMap;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::config::AuthToken;

/// Environment variable that overrides the stored host.
pub const HOST_ENV_VAR: &str = "CIRCLECI_CLI_HOST";

/// Environment variable that overrides the stored token.
pub const TOKEN_ENV_VAR: &str = "CIRCLECI_CLI_TOKEN";

/// Per-user CLI configuration.
///
/// The default value (empty host, empty token) is what a missing file loads
/// as. Empty fields are left out when saving, so a save followed by a load
/// returns an equal value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    /// Base URL of the remote service; empty when not configured.
    #[serde(
        default,
        deserialize_with = "null_as_empty",
        skip_serializing_if = "String::is_empty"
    )]
    pub host: String,

    /// Bearer credential; empty means unauthenticated.
    #[serde(default, skip_serializing_if = "AuthToken::is_empty")]
    pub token: AuthToken,

    /// Keys this crate does not interpret, written back unchanged.
    ///
    /// `host` and `token` entries here are never written; the fields above
    /// own those keys.
    #[serde(flatten, serialize_with = "serialize_extra")]
    pub extra: BTreeMap<String, serde_yaml::Value>,
}

impl Settings {
    /// Applies environment overrides using `lookup` to read variables.
    ///
    /// [`HOST_ENV_VAR`] and [`TOKEN_ENV_VAR`] replace the stored values when
    /// set to a non-blank string. The file on disk is not touched.
    ///
    /// # Example
    ///
    /// ```rust
    /// use circleci_core::Settings;
    ///
    /// let settings = Settings::default().with_env_overrides(|name| {
    ///     (name == "CIRCLECI_CLI_TOKEN").then(|| "from-env".to_string())
    /// });
    /// assert_eq!(settings.token.as_ref(), "from-env");
    /// ```
    #[must_use]
    pub fn with_env_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        if let Some(host) = non_blank(HOST_ENV_VAR) {
            tracing::debug!("Using host from {HOST_ENV_VAR}");
            self.host = host.trim().to_string();
        }
        if let Some(token) = non_blank(TOKEN_ENV_VAR) {
            tracing::debug!("Using token from {TOKEN_ENV_VAR}");
            self.token = AuthToken::new(token);
        }
        self
    }

    /// Applies overrides from the process environment.
    #[must_use]
    pub fn with_process_env(self) -> Self {
        self.with_env_overrides(|name| std::env::var(name).ok())
    }
}

/// Keys owned by [`Settings`] fields.
const RESERVED_KEYS: [&str; 2] = ["host", "token"];

fn serialize_extra<S>(
    extra: &BTreeMap<String, serde_yaml::Value>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_map(
        extra
            .iter()
            .filter(|(key, _)| !RESERVED_KEYS.contains(&key.as_str())),
    )
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_settings_are_empty() {
        let settings = Settings::default();
        assert!(settings.host.is_empty());
        assert!(settings.token.is_empty());
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn test_parses_recognized_keys() {
        let settings: Settings =
            serde_yaml::from_str("host: https://circleci.com\ntoken: abc\n").unwrap();

        assert_eq!(settings.host, "https://circleci.com");
        assert_eq!(settings.token.as_ref(), "abc");
        assert!(settings.extra.is_empty());
    }

    #[test]
    fn test_null_values_load_as_empty() {
        let settings: Settings = serde_yaml::from_str("host:\ntoken: ~\n").unwrap();
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_unknown_keys_are_kept() {
        let settings: Settings =
            serde_yaml::from_str("host: https://example.com\nendpoint: graphql-unstable\n")
                .unwrap();

        assert_eq!(
            settings.extra.get("endpoint"),
            Some(&serde_yaml::Value::String("graphql-unstable".to_string()))
        );

        let yaml = serde_yaml::to_string(&settings).unwrap();
        assert!(yaml.contains("endpoint: graphql-unstable"));
    }

    #[test]
    fn test_reserved_keys_in_extra_are_not_written() {
        let mut settings = Settings {
            host: "https://circleci.com".to_string(),
            token: AuthToken::new("abc"),
            ..Settings::default()
        };
        settings
            .extra
            .insert("host".to_string(), "https://other.example.com".into());
        settings.extra.insert("token".to_string(), "other".into());
        settings.extra.insert("endpoint".to_string(), "v2".into());

        let yaml = serde_yaml::to_string(&settings).unwrap();

        assert_eq!(yaml.matches("host:").count(), 1);
        assert_eq!(yaml.matches("token:").count(), 1);
        assert!(!yaml.contains("other"));
        assert!(yaml.contains("endpoint: v2"));
    }

    #[test]
    fn test_empty_fields_are_not_written() {
        let yaml = serde_yaml::to_string(&Settings::default()).unwrap();
        assert!(!yaml.contains("host"));
        assert!(!yaml.contains("token"));
    }

    #[test]
    fn test_env_overrides_replace_file_values() {
        let env: HashMap<&str, &str> = [
            (HOST_ENV_VAR, " https://enterprise.example.com "),
            (TOKEN_ENV_VAR, "env-token"),
        ]
        .into_iter()
        .collect();

        let settings = Settings {
            host: "https://circleci.com".to_string(),
            token: AuthToken::new("file-token"),
            ..Settings::default()
        }
        .with_env_overrides(|name| env.get(name).map(ToString::to_string));

        assert_eq!(settings.host, "https://enterprise.example.com");
        assert_eq!(settings.token.as_ref(), "env-token");
    }

    #[test]
    fn test_blank_env_values_are_ignored() {
        let settings = Settings {
            host: "https://circleci.com".to_string(),
            token: AuthToken::new("file-token"),
            ..Settings::default()
        }
        .with_env_overrides(|_| Some("   ".to_string()));

        assert_eq!(settings.host, "https://circleci.com");
        assert_eq!(settings.token.as_ref(), "file-token");
    }
}
