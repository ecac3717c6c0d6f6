use std::{collections::HashMap, fs, path::Path};

use anyhow::{Context, Result};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_SETTINGS_FILE: &str = "catalog.toml";

#[derive(Debug, Clone, Deserialize)]
pub struct ProviderSettings {
    pub tmdb_api_url: String,
    pub tmdb_api_key: String,
    pub poster_base_url: String,
    pub backdrop_base_url: String,
    pub discovery_language: String,
    pub omdb_api_url: String,
    pub omdb_api_key: String,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            tmdb_api_url: "https://api.themoviedb.org/3".into(),
            tmdb_api_key: String::new(),
            poster_base_url: "https://image.tmdb.org/t/p/w500/".into(),
            backdrop_base_url: "https://image.tmdb.org/t/p/original/".into(),
            discovery_language: "en".into(),
            omdb_api_url: "https://www.omdbapi.com/".into(),
            omdb_api_key: String::new(),
        }
    }
}

impl ProviderSettings {
    pub fn validate(&self) -> Result<()> {
        for (field, value) in [
            ("tmdb_api_url", &self.tmdb_api_url),
            ("poster_base_url", &self.poster_base_url),
            ("backdrop_base_url", &self.backdrop_base_url),
            ("omdb_api_url", &self.omdb_api_url),
        ] {
            Url::parse(value).with_context(|| format!("{field} is not a valid url: '{value}'"))?;
        }
        Ok(())
    }
}

/// Defaults, then `catalog.toml` in the working directory, then the environment.
pub fn load_settings() -> ProviderSettings {
    let mut settings = ProviderSettings::default();

    match load_file_overrides(Path::new(DEFAULT_SETTINGS_FILE)) {
        Ok(Some(file_cfg)) => apply_file_overrides(&mut settings, &file_cfg),
        Ok(None) => {}
        Err(err) => tracing::warn!(error = %err, "ignoring unreadable settings file"),
    }
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());

    settings
}

/// Like [`load_settings`] but with an explicit file that must exist and parse.
pub fn load_settings_from(path: &Path) -> Result<ProviderSettings> {
    let mut settings = ProviderSettings::default();
    let file_cfg = load_file_overrides(path)?
        .with_context(|| format!("settings file '{}' does not exist", path.display()))?;
    apply_file_overrides(&mut settings, &file_cfg);
    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings.validate()?;
    Ok(settings)
}

fn load_file_overrides(path: &Path) -> Result<Option<HashMap<String, String>>> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read settings file '{}'", path.display()))?;
    let parsed = toml::from_str::<HashMap<String, String>>(&raw)
        .with_context(|| format!("failed to parse settings file '{}'", path.display()))?;
    Ok(Some(parsed))
}

fn apply_file_overrides(settings: &mut ProviderSettings, file_cfg: &HashMap<String, String>) {
    if let Some(v) = file_cfg.get("tmdb_api_url") {
        settings.tmdb_api_url = v.clone();
    }
    if let Some(v) = file_cfg.get("tmdb_api_key") {
        settings.tmdb_api_key = v.clone();
    }
    if let Some(v) = file_cfg.get("poster_base_url") {
        settings.poster_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("backdrop_base_url") {
        settings.backdrop_base_url = v.clone();
    }
    if let Some(v) = file_cfg.get("discovery_language") {
        settings.discovery_language = v.clone();
    }
    if let Some(v) = file_cfg.get("omdb_api_url") {
        settings.omdb_api_url = v.clone();
    }
    if let Some(v) = file_cfg.get("omdb_api_key") {
        settings.omdb_api_key = v.clone();
    }
}

fn apply_env_overrides(settings: &mut ProviderSettings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("TMDB_API_URL") {
        settings.tmdb_api_url = v;
    }
    if let Some(v) = var("TMDB_API_KEY") {
        settings.tmdb_api_key = v;
    }
    if let Some(v) = var("APP__TMDB_API_KEY") {
        settings.tmdb_api_key = v;
    }
    if let Some(v) = var("APP__DISCOVERY_LANGUAGE") {
        settings.discovery_language = v;
    }
    if let Some(v) = var("OMDB_API_URL") {
        settings.omdb_api_url = v;
    }
    if let Some(v) = var("OMDB_API_KEY") {
        settings.omdb_api_key = v;
    }
    if let Some(v) = var("APP__OMDB_API_KEY") {
        settings.omdb_api_key = v;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
