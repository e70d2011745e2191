// src/settings.rs
use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

const DEFAULT_BASE_URL: &str = "http://localhost:8080";
const DEFAULT_OPERATOR: &str = "Inspector";
const DEFAULT_PAGE_SIZE: usize = 10;

/// Application settings, layered defaults → `settings.ron` in the platform
/// config dir → `GRIDLENS_*` environment overrides.
///
/// `operator` is the explicit session identity stamped onto every upload and
/// annotation; nothing else in the codebase knows a "current user".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppSettings {
    pub base_url: String,
    pub operator: String,
    pub page_size: usize,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            operator: DEFAULT_OPERATOR.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl AppSettings {
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gridlens").join("settings.ron"))
    }

    pub fn load() -> Result<Self> {
        let mut builder = config::Config::builder()
            .set_default("base_url", DEFAULT_BASE_URL)?
            .set_default("operator", DEFAULT_OPERATOR)?
            .set_default("page_size", DEFAULT_PAGE_SIZE as i64)?;

        if let Some(path) = Self::config_path() {
            builder = builder.add_source(config::File::from(path).required(false));
        }
        builder = builder.add_source(config::Environment::with_prefix("GRIDLENS"));

        let mut settings: AppSettings = builder
            .build()
            .context("building settings")?
            .try_deserialize()
            .context("reading settings")?;
        settings.sanitize();
        Ok(settings)
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("no config directory on this platform")?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let pretty = ron::ser::PrettyConfig::new();
        let text = ron::ser::to_string_pretty(self, pretty).context("serializing settings")?;
        fs::write(&path, text).with_context(|| format!("writing {}", path.display()))?;
        info!(path = %path.display(), "settings saved");
        Ok(())
    }

    fn sanitize(&mut self) {
        if self.page_size == 0 {
            self.page_size = DEFAULT_PAGE_SIZE;
        }
        while self.base_url.ends_with('/') {
            self.base_url.pop();
        }
        if self.operator.trim().is_empty() {
            self.operator = DEFAULT_OPERATOR.to_string();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_repairs_degenerate_values() {
        let mut s = AppSettings {
            base_url: "http://host:8080///".into(),
            operator: "   ".into(),
            page_size: 0,
        };
        s.sanitize();
        assert_eq!(s.base_url, "http://host:8080");
        assert_eq!(s.operator, DEFAULT_OPERATOR);
        assert_eq!(s.page_size, DEFAULT_PAGE_SIZE);
    }

    #[test]
    fn settings_round_trip_through_ron() {
        let s = AppSettings::default();
        let text = ron::ser::to_string_pretty(&s, ron::ser::PrettyConfig::new()).unwrap();
        let back: AppSettings = ron::from_str(&text).unwrap();
        assert_eq!(s, back);
    }
}
