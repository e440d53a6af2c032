use crate::config::types::UserSettings;
use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

pub fn save_settings(path: &Path, settings: &UserSettings) -> Result<()> {
    let content = serde_json::to_string_pretty(settings).context("無法序列化設定")?;

    fs::write(path, content)
        .with_context(|| format!("無法寫入設定檔: {}", path.display()))?;

    Ok(())
}

/// 設定檔不存在時寫入預設值，方便使用者直接編輯
///
/// 回傳是否新建了檔案
pub fn ensure_settings_file(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_settings(path, &UserSettings::default())?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn test_save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        let mut settings = UserSettings::default();
        settings.watermark.enabled = true;
        settings.watermark.text = "@channel".to_string();
        settings.split_threshold_mb = 50;
        save_settings(&path, &settings).unwrap();

        let loaded = Config::with_path(&path).load_settings().unwrap();
        assert!(loaded.watermark.enabled);
        assert_eq!(loaded.watermark.text, "@channel");
        assert_eq!(loaded.split_threshold_mb, 50);
    }

    #[test]
    fn test_ensure_settings_file_does_not_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.json");

        assert!(ensure_settings_file(&path).unwrap());
        fs::write(&path, r#"{"split_threshold_mb": 7}"#).unwrap();
        assert!(!ensure_settings_file(&path).unwrap());

        let loaded = Config::with_path(&path).load_settings().unwrap();
        assert_eq!(loaded.split_threshold_mb, 7);
    }
}
