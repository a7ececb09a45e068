// Copyright (c) 2024-2025 pyLoad Team
// SPDX-License-Identifier: AGPL-3.0-or-later

//! User preferences: where the core lives and which language to speak.
//!
//! Stored as JSON in `~/.pyload-cli/config.json`. Values resolve as
//! defaults, then the file, then command-line flags. The file is rewritten
//! after every successful connection so the next start remembers the core.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::i18n::Language;

pub const DEFAULT_ADDR: &str = "127.0.0.1";
pub const DEFAULT_PORT: u16 = 7227;

const CONFIG_DIR: &str = ".pyload-cli";
const CONFIG_FILE: &str = "config.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub addr: String,
    pub port: u16,
    pub language: String,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            port: DEFAULT_PORT,
            language: language_from_env(std::env::var("LANG").ok().as_deref()),
        }
    }
}

/// Language code for a `$LANG` value; English unless it names a catalog.
pub fn language_from_env(lang: Option<&str>) -> String {
    lang.and_then(Language::from_code)
        .unwrap_or(Language::English)
        .code()
        .to_string()
}

/// `~/.pyload-cli`, created on first use.
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not find home directory")?;
    let dir = home.join(CONFIG_DIR);
    if !dir.exists() {
        fs::create_dir_all(&dir).with_context(|| format!("Failed to create {}", dir.display()))?;
    }
    Ok(dir)
}

pub fn default_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE))
}

impl Preferences {
    /// Read `path`. A missing or malformed file yields the defaults.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        let parsed = fs::read_to_string(path)
            .context("Failed to read preferences")
            .and_then(|content| serde_json::from_str(&content).context("Malformed preferences"));
        match parsed {
            Ok(prefs) => prefs,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %format!("{:#}", e), "ignoring preferences file");
                Self::default()
            }
        }
    }

    /// Read the preferences from the default location.
    pub fn load() -> Self {
        match default_path() {
            Ok(path) => Self::load_from(&path),
            Err(e) => {
                tracing::warn!(error = %e, "no preferences location");
                Self::default()
            }
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "preferences saved");
        Ok(())
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&default_path()?)
    }

    /// Apply whichever command-line values were given.
    pub fn override_with(&mut self, addr: Option<String>, port: Option<u16>, language: Option<String>) {
        if let Some(addr) = addr {
            self.addr = addr;
        }
        if let Some(port) = port {
            self.port = port;
        }
        if let Some(language) = language {
            self.language = language;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_language_from_env() {
        assert_eq!(language_from_env(Some("de_DE.UTF-8")), "de");
        assert_eq!(language_from_env(Some("fr_FR.UTF-8")), "en");
        assert_eq!(language_from_env(None), "en");
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let prefs = Preferences::load_from(&dir.path().join("config.json"));
        assert_eq!(prefs.addr, DEFAULT_ADDR);
        assert_eq!(prefs.port, DEFAULT_PORT);
    }

    #[test]
    fn test_save_then_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        let prefs = Preferences {
            addr: "10.0.0.5".into(),
            port: 8000,
            language: "de".into(),
        };
        prefs.save_to(&path).unwrap();
        assert_eq!(Preferences::load_from(&path), prefs);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"port": 9666}"#).unwrap();
        let prefs = Preferences::load_from(&path);
        assert_eq!(prefs.port, 9666);
        assert_eq!(prefs.addr, DEFAULT_ADDR);
    }

    #[test]
    fn test_malformed_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "[cli]\naddr=1.2.3.4").unwrap();
        assert_eq!(Preferences::load_from(&path).addr, DEFAULT_ADDR);
    }

    #[test]
    fn test_save_into_missing_dir_fails() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("absent").join("config.json");
        assert!(Preferences::default().save_to(&path).is_err());
    }

    #[test]
    fn test_flags_override_file() {
        let mut prefs = Preferences::default();
        prefs.override_with(Some("host".into()), None, Some("de".into()));
        assert_eq!(prefs.addr, "host");
        assert_eq!(prefs.port, DEFAULT_PORT);
        assert_eq!(prefs.language, "de");
    }
}
