use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context};
use client_core::{DEFAULT_FIGMA_API_URL, DEFAULT_FUNCTION_NAME};
use serde::Deserialize;
use url::Url;

pub const DEFAULT_CONFIG_FILE: &str = "audit.toml";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub functions_url: String,
    pub function_name: String,
    pub api_key: Option<String>,
    pub figma_api_url: String,
    pub figma_token: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            functions_url: "http://127.0.0.1:54321/functions/v1".into(),
            function_name: DEFAULT_FUNCTION_NAME.into(),
            api_key: None,
            figma_api_url: DEFAULT_FIGMA_API_URL.into(),
            figma_token: None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FileSettings {
    functions_url: Option<String>,
    function_name: Option<String>,
    api_key: Option<String>,
    figma_api_url: Option<String>,
    figma_token: Option<String>,
}

/// Defaults, then `audit.toml` (or the explicit `--config` file), then the
/// environment. Not validated: CLI overrides still apply on top.
pub fn load_settings(explicit: Option<&Path>) -> anyhow::Result<Settings> {
    load_layers(explicit, |key| std::env::var(key).ok())
}

fn load_layers(
    explicit: Option<&Path>,
    var: impl Fn(&str) -> Option<String>,
) -> anyhow::Result<Settings> {
    let (path, required): (PathBuf, bool) = match explicit {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(DEFAULT_CONFIG_FILE), false),
    };

    let raw = match fs::read_to_string(&path) {
        Ok(raw) => Some(raw),
        Err(err) if !required && err.kind() == std::io::ErrorKind::NotFound => None,
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read config '{}'", path.display()));
        }
    };

    let mut settings = Settings::default();
    if let Some(raw) = raw {
        apply_file(&mut settings, &raw)
            .with_context(|| format!("invalid config '{}'", path.display()))?;
    }
    apply_env(&mut settings, var);
    Ok(settings)
}

fn apply_file(settings: &mut Settings, raw: &str) -> anyhow::Result<()> {
    let file: FileSettings = toml::from_str(raw)?;
    if let Some(v) = file.functions_url {
        settings.functions_url = v;
    }
    if let Some(v) = file.function_name {
        settings.function_name = v;
    }
    if let Some(v) = file.api_key {
        settings.api_key = Some(v);
    }
    if let Some(v) = file.figma_api_url {
        settings.figma_api_url = v;
    }
    if let Some(v) = file.figma_token {
        settings.figma_token = Some(v);
    }
    Ok(())
}

fn apply_env(settings: &mut Settings, var: impl Fn(&str) -> Option<String>) {
    if let Some(v) = var("AUDIT_FUNCTIONS_URL") {
        settings.functions_url = v;
    }
    if let Some(v) = var("APP__FUNCTIONS_URL") {
        settings.functions_url = v;
    }

    if let Some(v) = var("AUDIT_FUNCTION_NAME") {
        settings.function_name = v;
    }

    if let Some(v) = var("AUDIT_API_KEY") {
        settings.api_key = Some(v);
    }
    if let Some(v) = var("APP__API_KEY") {
        settings.api_key = Some(v);
    }

    if let Some(v) = var("FIGMA_API_URL") {
        settings.figma_api_url = v;
    }
    if let Some(v) = var("FIGMA_TOKEN") {
        settings.figma_token = Some(v);
    }
}

impl Settings {
    pub fn with_overrides(
        mut self,
        functions_url: Option<String>,
        api_key: Option<String>,
    ) -> Self {
        if let Some(v) = functions_url {
            self.functions_url = v;
        }
        if let Some(v) = api_key {
            self.api_key = Some(v);
        }
        self
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, raw) in [
            ("functions_url", &self.functions_url),
            ("figma_api_url", &self.figma_api_url),
        ] {
            let url =
                Url::parse(raw).with_context(|| format!("{name} '{raw}' is not a valid URL"))?;
            if !matches!(url.scheme(), "http" | "https") {
                bail!("{name} '{raw}' must use http or https");
            }
        }
        if self.function_name.trim().is_empty() {
            bail!("function_name must not be empty");
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
