use crate::tools::{MediaTool, ToolTask, append_to_file_name, is_non_empty_file, remove_quietly};
use anyhow::{Context, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};

/// 縮圖檔名後綴：`<原檔完整路徑>.thumb.jpg`
pub const THUMBNAIL_SUFFIX: &str = ".thumb.jpg";
pub const THUMBNAIL_WIDTH: u32 = 320;
/// 擷取影格的時間點（秒）
pub const THUMBNAIL_OFFSET_SECS: u32 = 5;

#[must_use]
pub fn thumbnail_path(source: &Path) -> PathBuf {
    append_to_file_name(source, THUMBNAIL_SUFFIX)
}

/// 縮圖快取
///
/// 縮圖與原檔放在一起，已存在且非空就直接沿用；沒有淘汰機制，
/// 原檔被呼叫端刪除時由呼叫端一併處理
pub struct ThumbnailCache<'a, T: MediaTool> {
    tool: &'a T,
}

impl<'a, T: MediaTool> ThumbnailCache<'a, T> {
    pub const fn new(tool: &'a T) -> Self {
        Self { tool }
    }

    pub fn get_or_create(&self, source: &Path) -> Option<PathBuf> {
        let thumbnail = thumbnail_path(source);
        if is_non_empty_file(&thumbnail) {
            debug!("使用既有縮圖: {}", thumbnail.display());
            return Some(thumbnail);
        }

        match self.extract(source, &thumbnail) {
            Ok(()) => Some(thumbnail),
            Err(e) => {
                warn!("縮圖產生失敗 {}: {e:#}", source.display());
                remove_quietly(&thumbnail);
                None
            }
        }
    }

    fn extract(&self, source: &Path, thumbnail: &Path) -> Result<()> {
        let outcome = self
            .tool
            .run(ToolTask::Thumbnail, &thumbnail_args(source, thumbnail))
            .with_context(|| format!("無法執行 ffmpeg 擷取縮圖: {}", source.display()))?;

        if !outcome.success() {
            anyhow::bail!("ffmpeg 擷取縮圖失敗: {}", outcome.tail.join("\n"));
        }

        if !is_non_empty_file(thumbnail) {
            anyhow::bail!("縮圖檔案未建立: {}", thumbnail.display());
        }

        debug!("縮圖已建立: {}", thumbnail.display());
        Ok(())
    }
}

fn thumbnail_args(source: &Path, thumbnail: &Path) -> Vec<String> {
    vec![
        "-y".to_string(),
        "-ss".to_string(),
        THUMBNAIL_OFFSET_SECS.to_string(),
        "-i".to_string(),
        source.to_string_lossy().to_string(),
        "-frames:v".to_string(),
        "1".to_string(),
        "-an".to_string(),
        "-sn".to_string(),
        "-vf".to_string(),
        format!("scale={THUMBNAIL_WIDTH}:-2"),
        "-q:v".to_string(),
        "3".to_string(),
        thumbnail.to_string_lossy().to_string(),
    ]
}
