use crate::error::{LeadAiError, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// 環境変数でバックエンドURLを上書き
pub const BACKEND_URL_ENV: &str = "LEAD_AI_BACKEND_URL";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub backend_url: String,
    pub timeout_seconds: u64,
    pub items_per_page: usize,
    /// 未指定なら `dirs::data_dir()/lead-ai`
    pub data_dir: Option<PathBuf>,
    /// バックエンドを使わずCRM同期などを擬似実行
    pub simulate_backend: bool,
    pub simulated_delay_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: "http://127.0.0.1:5000".into(),
            timeout_seconds: 60,
            items_per_page: lead_ai_common::ITEMS_PER_PAGE,
            data_dir: None,
            simulate_backend: false,
            simulated_delay_ms: 2000,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(url) = std::env::var(BACKEND_URL_ENV) {
            if !url.trim().is_empty() {
                config.backend_url = url;
            }
        }
        Ok(config)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| LeadAiError::Config("ホームディレクトリが見つかりません".into()))?;
        Ok(home.join(".config").join("lead-ai").join("config.json"))
    }

    /// リード・CRM設定の保存先
    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let base = dirs::data_dir()
            .ok_or_else(|| LeadAiError::Config("データディレクトリが見つかりません".into()))?;
        Ok(base.join("lead-ai"))
    }

    pub fn set_backend_url(&mut self, url: String) -> Result<()> {
        let trimmed = url.trim().trim_end_matches('/');
        if !(trimmed.starts_with("http://") || trimmed.starts_with("https://")) {
            return Err(LeadAiError::InvalidUrl(url));
        }
        self.backend_url = trimmed.to_string();
        self.save()
    }

    pub fn set_simulate(&mut self, on: bool) -> Result<()> {
        self.simulate_backend = on;
        self.save()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.json")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.items_per_page, 10);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{"backend_url": "http://leads.internal:8080"}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.backend_url, "http://leads.internal:8080");
        assert_eq!(config.timeout_seconds, 60);
        assert!(!config.simulate_backend);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        let config = Config {
            simulate_backend: true,
            data_dir: Some(dir.path().to_path_buf()),
            ..Config::default()
        };
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.data_dir().unwrap(), dir.path());
    }
}
