//! User settings: the Gemini API key and the preferred comment length.
//!
//! Settings live in a small JSON file. Every save is published on a
//! [`tokio::sync::watch`] channel so running sessions pick up a new key or
//! length without restarting.

use crate::error::SettingsError;
use crate::generation::CommentGenerator;
use crate::prompt::LengthPreference;
use log::{debug, info};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use tokio::sync::watch;

/// Environment variable that overrides the stored key
pub const API_KEY_ENV: &str = "GEMINI_API_KEY";

static KEY_FORMAT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]{20,}$").expect("key format pattern is valid"));

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gemini_api_key: Option<String>,
    #[serde(default)]
    pub comment_length: LengthPreference,
}

impl Settings {
    /// The configured key, if it is not blank
    pub fn api_key(&self) -> Option<&str> {
        self.gemini_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }
}

/// Cheap local check before a key is sent anywhere
pub fn is_valid_key_format(key: &str) -> bool {
    KEY_FORMAT.is_match(key)
}

/// File-backed settings with change notification
#[derive(Debug)]
pub struct SettingsStore {
    path: PathBuf,
    tx: watch::Sender<Settings>,
}

impl SettingsStore {
    /// `<config dir>/buzzblast/settings.json`
    pub fn default_path() -> Result<PathBuf, SettingsError> {
        dirs::config_dir()
            .map(|dir| dir.join("buzzblast").join("settings.json"))
            .ok_or(SettingsError::NoConfigDir)
    }

    /// Load from `path`, letting `GEMINI_API_KEY` override the stored key
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, SettingsError> {
        Self::open_with_key_override(path, std::env::var(API_KEY_ENV).ok()).await
    }

    /// Load from `path` with an explicit key override
    pub async fn open_with_key_override(
        path: impl Into<PathBuf>,
        key_override: Option<String>,
    ) -> Result<Self, SettingsError> {
        let path = path.into();
        let mut settings = read_settings(&path).await?;
        if let Some(key) = key_override.filter(|key| !key.trim().is_empty()) {
            debug!("Using API key from {}", API_KEY_ENV);
            settings.gemini_api_key = Some(key);
        }
        let (tx, _) = watch::channel(settings);
        Ok(Self { path, tx })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of the current settings
    pub fn current(&self) -> Settings {
        self.tx.borrow().clone()
    }

    /// Receiver that sees every future save
    pub fn subscribe(&self) -> watch::Receiver<Settings> {
        self.tx.subscribe()
    }

    /// Persist and publish
    pub async fn save(&self, settings: Settings) -> Result<(), SettingsError> {
        if let Some(dir) = self.path.parent() {
            tokio::fs::create_dir_all(dir).await?;
        }
        let json = serde_json::to_string_pretty(&settings)?;
        tokio::fs::write(&self.path, json).await?;
        debug!("Settings written to {}", self.path.display());
        self.tx.send_replace(settings);
        Ok(())
    }

    pub async fn set_comment_length(&self, length: LengthPreference) -> Result<(), SettingsError> {
        let mut settings = self.current();
        settings.comment_length = length;
        self.save(settings).await
    }

    /// Validate a new key, check it against the service, then save it.
    ///
    /// Nothing is written unless the service accepts the key.
    pub async fn save_api_key<G: CommentGenerator + ?Sized>(
        &self,
        key: &str,
        length: LengthPreference,
        generator: &G,
    ) -> Result<(), SettingsError> {
        let key = key.trim();
        if key.is_empty() {
            return Err(SettingsError::MissingApiKey);
        }
        if !is_valid_key_format(key) {
            return Err(SettingsError::InvalidKeyFormat);
        }
        let accepted = generator
            .verify_key(key)
            .await
            .map_err(SettingsError::KeyCheckFailed)?;
        if !accepted {
            return Err(SettingsError::KeyRejected);
        }

        self.save(Settings {
            gemini_api_key: Some(key.to_string()),
            comment_length: length,
        })
        .await?;
        info!("API key saved successfully");
        Ok(())
    }
}

async fn read_settings(path: &Path) -> Result<Settings, SettingsError> {
    match tokio::fs::read_to_string(path).await {
        Ok(raw) if raw.trim().is_empty() => Ok(Settings::default()),
        Ok(raw) => Ok(serde_json::from_str(&raw)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Settings::default()),
        Err(e) => Err(e.into()),
    }
}
