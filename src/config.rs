/// Application settings
///
/// Settings are stored as JSON in the user's config directory:
/// - Linux: ~/.config/magic-lens/settings.json
/// - macOS: ~/Library/Application Support/magic-lens/settings.json
/// - Windows: %APPDATA%\magic-lens\settings.json
///
/// A missing file means defaults. The service credential is never stored
/// here; it comes from the environment only.

use std::env;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

pub const DEFAULT_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-image";

/// Environment variables checked for the credential, in order
const CREDENTIAL_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("settings file I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

/// User-tunable settings
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Base URL of the generative-language API
    pub api_base: String,
    /// Image-capable model used for edits
    pub model: String,
    /// Where the save dialog opens; falls back to the Downloads folder
    pub download_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            download_dir: None,
        }
    }
}

impl Settings {
    /// Load settings from disk and apply environment overrides
    ///
    /// Never fails: a broken settings file is logged and ignored.
    pub fn load() -> Self {
        let path = Self::path();
        let mut settings = match Self::read(&path) {
            Ok(Some(settings)) => {
                info!(path = %path.display(), "loaded settings");
                settings
            }
            Ok(None) => {
                let settings = Self::default();
                if let Err(err) = settings.write(&path) {
                    debug!(path = %path.display(), error = %err, "could not write default settings");
                }
                settings
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "ignoring settings file");
                Self::default()
            }
        };

        settings.apply_env(|name| env::var(name).ok());
        settings
    }

    /// Get the path where the settings file lives
    pub fn path() -> PathBuf {
        let mut path = dirs::config_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."));

        path.push("magic-lens");
        path.push("settings.json");
        path
    }

    fn read(path: &Path) -> Result<Option<Self>, ConfigError> {
        if !path.exists() {
            return Ok(None);
        }
        let json = std::fs::read_to_string(path)?;
        Ok(Some(Self::from_json(&json)?))
    }

    /// Leave an editable copy of the settings on first run
    fn write(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        std::fs::write(path, self.to_json()?)?;
        Ok(())
    }

    /// `MAGIC_LENS_API_BASE` / `MAGIC_LENS_MODEL` win over the file
    fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(api_base) = non_empty(lookup("MAGIC_LENS_API_BASE")) {
            self.api_base = api_base;
        }
        if let Some(model) = non_empty(lookup("MAGIC_LENS_MODEL")) {
            self.model = model;
        }
        self.api_base = self.api_base.trim_end_matches('/').to_string();
    }

    /// Directory the save dialog should start in
    pub fn download_dir(&self) -> Option<PathBuf> {
        self.download_dir
            .clone()
            .or_else(dirs::download_dir)
            .or_else(dirs::home_dir)
    }

    /// Convert to JSON string for the settings file
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Parse from JSON string (from the settings file)
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// The service credential, read from the environment
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credential(Option<String>);

impl Credential {
    pub fn from_env() -> Self {
        Self::lookup(|name| env::var(name).ok())
    }

    fn lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self(CREDENTIAL_VARS.iter().find_map(|name| non_empty(lookup(name))))
    }

    #[cfg(test)]
    pub fn new(key: impl Into<String>) -> Self {
        Self(non_empty(Some(key.into())))
    }

    #[cfg(test)]
    pub fn missing() -> Self {
        Self(None)
    }

    pub fn get(&self) -> Option<&str> {
        self.0.as_deref()
    }
}

// Never print the key itself
impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = if self.0.is_some() { "<set>" } else { "<missing>" };
        f.debug_tuple("Credential").field(&state).finish()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_of(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name: &str| map.get(name).cloned()
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
        assert_eq!(settings.model, DEFAULT_MODEL);
        assert!(settings.download_dir.is_none());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let settings = Settings::from_json(r#"{ "model": "gemini-test-image" }"#).unwrap();
        assert_eq!(settings.model, "gemini-test-image");
        assert_eq!(settings.api_base, DEFAULT_API_BASE);
    }

    #[test]
    fn test_serialization() {
        let mut settings = Settings::default();
        settings.download_dir = Some(PathBuf::from("/tmp/edits"));

        let json = settings.to_json().unwrap();
        let restored = Settings::from_json(&json).unwrap();

        assert_eq!(settings, restored);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(Settings::from_json("{ not json").is_err());
    }

    #[test]
    fn test_first_run_file() {
        let dir = std::env::temp_dir().join(format!("magic-lens-config-{}", std::process::id()));
        let path = dir.join("settings.json");

        assert!(Settings::read(&path).unwrap().is_none());

        Settings::default().write(&path).unwrap();
        let restored = Settings::read(&path).unwrap();
        std::fs::remove_dir_all(&dir).unwrap();

        assert_eq!(restored, Some(Settings::default()));
    }

    #[test]
    fn test_env_overrides() {
        let mut settings = Settings::default();
        settings.apply_env(env_of(&[
            ("MAGIC_LENS_API_BASE", "http://127.0.0.1:9000/v1beta/"),
            ("MAGIC_LENS_MODEL", "  "),
        ]));

        assert_eq!(settings.api_base, "http://127.0.0.1:9000/v1beta");
        assert_eq!(settings.model, DEFAULT_MODEL);
    }

    #[test]
    fn test_credential_lookup_order() {
        let both = Credential::lookup(env_of(&[("GEMINI_API_KEY", "g"), ("API_KEY", "a")]));
        assert_eq!(both.get(), Some("g"));

        let fallback = Credential::lookup(env_of(&[("GEMINI_API_KEY", " "), ("API_KEY", "a")]));
        assert_eq!(fallback.get(), Some("a"));

        let none = Credential::lookup(env_of(&[]));
        assert_eq!(none, Credential::missing());
    }

    #[test]
    fn test_credential_debug_hides_key() {
        let printed = format!("{:?}", Credential::new("secret-key"));
        assert!(!printed.contains("secret-key"));
        assert!(Credential::new("   ").get().is_none());
    }
}
