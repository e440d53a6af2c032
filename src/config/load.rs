use crate::config::types::{ProcessingPolicy, UserSettings};
use anyhow::{Context, Result};
use log::warn;
use std::fs;
use std::path::{Path, PathBuf};

/// 預設設定檔位置（目前工作目錄）
pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// 設定來源
///
/// 不快取內容：每次取得策略都重新讀取檔案，修改設定檔後下一次處理即生效
#[derive(Debug, Clone)]
pub struct Config {
    settings_path: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    #[must_use]
    pub fn new() -> Self {
        Self::with_path(SETTINGS_FILE_NAME)
    }

    #[must_use]
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            settings_path: path.into(),
        }
    }

    #[must_use]
    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    pub fn load_settings(&self) -> Result<UserSettings> {
        let path = self.settings_path.as_path();
        if !path.exists() {
            return Ok(UserSettings::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("無法讀取設定檔: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("無法解析設定檔: {}", path.display()))
    }

    /// 讀取目前設定，失敗時退回預設值
    #[must_use]
    pub fn current_settings(&self) -> UserSettings {
        self.load_settings().unwrap_or_else(|e| {
            warn!("設定檔讀取失敗，使用預設值: {e:#}");
            UserSettings::default()
        })
    }

    #[must_use]
    pub fn current_policy(&self) -> ProcessingPolicy {
        self.current_settings().processing_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::with_path(dir.path().join("settings.json"));
        let settings = config.load_settings().unwrap();
        assert_eq!(settings.split_threshold_mb, 1999);
    }

    #[test]
    fn test_invalid_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        fs::write(&path, "{ not json").unwrap();

        let config = Config::with_path(&path);
        assert!(config.load_settings().is_err());
        assert_eq!(config.current_policy(), ProcessingPolicy::default());
    }

    #[test]
    fn test_policy_reloads_on_every_call() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");
        let config = Config::with_path(&path);

        fs::write(&path, r#"{"watermark": {"enabled": false}}"#).unwrap();
        assert!(!config.current_policy().watermark_enabled);

        fs::write(&path, r#"{"watermark": {"enabled": true, "text": "x"}}"#).unwrap();
        assert!(config.current_policy().watermark_enabled);
    }
}
