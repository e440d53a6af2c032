use anyhow::{Context, Result};
use log::{info, warn};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

/// 取得主檔名，無法取得時使用 fallback
#[must_use]
pub fn file_stem_or(path: &Path, fallback: &str) -> String {
    path.file_stem()
        .map_or_else(|| fallback.to_string(), |s| s.to_string_lossy().to_string())
}

#[must_use]
pub fn parent_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
}

/// 目前時間（毫秒），用於產生不重複的檔名後綴
#[must_use]
pub fn timestamp_millis() -> u128 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default()
}

/// 在完整檔名之後附加字串（`a.mp4` → `a.mp4.thumb.jpg`）
#[must_use]
pub fn append_to_file_name(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[must_use]
pub fn is_non_empty_file(path: &Path) -> bool {
    fs::metadata(path).is_ok_and(|m| m.is_file() && m.len() > 0)
}

pub fn file_size(path: &Path) -> Result<u64> {
    Ok(fs::metadata(path)
        .with_context(|| format!("無法讀取檔案資訊: {}", path.display()))?
        .len())
}

/// 刪除被取代的原始檔案
pub fn remove_original(path: &Path) -> Result<()> {
    fs::remove_file(path).with_context(|| format!("無法刪除原始檔案: {}", path.display()))?;
    info!("已刪除原始檔案: {}", path.display());
    Ok(())
}

/// 刪除不完整的輸出；失敗只記錄警告
pub fn remove_quietly(path: &Path) {
    if path.exists() {
        if let Err(e) = fs::remove_file(path) {
            warn!("無法刪除檔案 {}: {e}", path.display());
        }
    }
}

/// 輸出檔守衛：離開作用域時刪除尚未確認的輸出
///
/// 轉檔失敗時不信任磁碟上任何部分寫入的檔案
#[derive(Debug, Default)]
pub struct OutputGuard {
    paths: Vec<PathBuf>,
}

impl OutputGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, path: impl Into<PathBuf>) {
        self.paths.push(path.into());
    }

    pub fn track_all(&mut self, paths: impl IntoIterator<Item = PathBuf>) {
        self.paths.extend(paths);
    }

    /// 確認輸出有效，不再刪除
    pub fn commit(mut self) {
        self.paths.clear();
    }
}

impl Drop for OutputGuard {
    fn drop(&mut self) {
        for path in &self.paths {
            remove_quietly(path);
        }
    }
}
