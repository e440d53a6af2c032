use super::contact_sheet_merger::{DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS, create_contact_sheet};
use super::timestamp_selector::{CLIP_COUNT, CLIP_LENGTH, MIN_PREVIEW_DURATION, clip_offsets};
use crate::component::thumbnail_cache::THUMBNAIL_SUFFIX;
use crate::tools::{
    MediaTool, OutputGuard, ToolTask, append_to_file_name, file_stem_or, is_non_empty_file,
    parent_dir, remove_quietly, timestamp_millis,
};
use anyhow::{Context, Result, bail};
use log::{debug, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// 預覽片段縮放寬度
pub const PREVIEW_WIDTH: u32 = 480;

/// 多片段預覽影片產生器
///
/// 流程：
/// A. 計算 9 個平均分布的時間點
/// B. 逐一擷取 3 秒片段到暫存目錄（任一失敗即放棄）
/// C. 以 concat 串接（不重新編碼）
/// D. 產生 3x3 預覽圖（失敗不影響結果）
pub struct PreviewGenerator<'a, T: MediaTool> {
    tool: &'a T,
}

impl<'a, T: MediaTool> PreviewGenerator<'a, T> {
    pub const fn new(tool: &'a T) -> Self {
        Self { tool }
    }

    pub fn make_preview(&self, source: &Path, duration: f64) -> Option<PathBuf> {
        if duration <= MIN_PREVIEW_DURATION {
            return None;
        }

        let Some(offsets) = clip_offsets(duration, CLIP_COUNT, CLIP_LENGTH) else {
            debug!("影片可用長度不足，略過預覽: {}", source.display());
            return None;
        };

        let file_stem = file_stem_or(source, "video");
        let scratch = match tempfile::Builder::new()
            .prefix(&format!(".preview_{file_stem}_{}_", timestamp_millis()))
            .tempdir_in(parent_dir(source))
        {
            Ok(dir) => dir,
            Err(e) => {
                warn!("無法建立暫存目錄: {e}");
                return None;
            }
        };

        let result = self.build_preview(source, &file_stem, &offsets, scratch.path());

        let scratch_path = scratch.path().to_path_buf();
        if let Err(e) = scratch.close() {
            warn!("無法清理暫存目錄 {}: {e}", scratch_path.display());
        }

        match result {
            Ok(preview) => {
                info!("預覽已建立: {}", preview.display());
                Some(preview)
            }
            Err(e) => {
                warn!("預覽產生失敗 {}: {e:#}", source.display());
                None
            }
        }
    }

    fn build_preview(
        &self,
        source: &Path,
        file_stem: &str,
        offsets: &[f64],
        scratch_dir: &Path,
    ) -> Result<PathBuf> {
        let clips = self.extract_clips(source, offsets, scratch_dir)?;

        let preview = parent_dir(source).join(format!("{file_stem}_preview.mp4"));
        self.concat_clips(&clips, scratch_dir, &preview)?;

        // 預覽圖直接存成預覽影片的縮圖，縮圖快取會沿用
        let sheet = append_to_file_name(&preview, THUMBNAIL_SUFFIX);
        if let Err(e) = create_contact_sheet(
            self.tool,
            &preview,
            &sheet,
            DEFAULT_GRID_COLS,
            DEFAULT_GRID_ROWS,
            CLIP_COUNT as f64 * CLIP_LENGTH,
        ) {
            warn!("預覽圖產生失敗: {e:#}");
            remove_quietly(&sheet);
        }

        Ok(preview)
    }

    fn extract_clips(&self, source: &Path, offsets: &[f64], scratch_dir: &Path) -> Result<Vec<PathBuf>> {
        let mut clips = Vec::with_capacity(offsets.len());

        for (index, &offset) in offsets.iter().enumerate() {
            let clip = scratch_dir.join(format!("clip_{index:03}.mp4"));
            debug!("擷取預覽片段 {index}: {offset:.2}s");

            let outcome = self
                .tool
                .run(ToolTask::PreviewClip, &clip_args(source, offset, &clip))
                .with_context(|| format!("無法擷取預覽片段 {index}"))?;

            if !outcome.success() || !is_non_empty_file(&clip) {
                bail!(
                    "預覽片段 {index} 擷取失敗: 需要 {} 個，只有 {index} 個成功",
                    offsets.len()
                );
            }
            clips.push(clip);
        }

        Ok(clips)
    }

    fn concat_clips(&self, clips: &[PathBuf], scratch_dir: &Path, preview: &Path) -> Result<()> {
        let list_path = scratch_dir.join("concat.txt");
        fs::write(&list_path, concat_list(clips))
            .with_context(|| format!("無法寫入串接清單: {}", list_path.display()))?;

        let mut guard = OutputGuard::new();
        guard.track(preview);

        let outcome = self
            .tool
            .run(ToolTask::PreviewClip, &concat_args(&list_path, preview))
            .with_context(|| "無法串接預覽片段")?;

        if !outcome.success() || !is_non_empty_file(preview) {
            bail!("串接預覽片段失敗");
        }

        guard.commit();
        Ok(())
    }
}

fn clip_args(source: &Path, offset: f64, output: &Path) -> Vec<String> {
    let mut args = vec![
        "-y".to_string(),
        "-ss".to_string(),
        format!("{offset:.3}"),
        "-i".to_string(),
        source.to_string_lossy().to_string(),
        "-t".to_string(),
        format!("{CLIP_LENGTH}"),
    ];
    args.extend(
        [
            "-map", "0:v:0",
            "-map", "0:a:0?",
            "-vf", format!("scale={PREVIEW_WIDTH}:-2,setsar=1").as_str(),
            "-c:v", "libx264",
            "-preset", "veryfast",
            "-crf", "28",
            "-pix_fmt", "yuv420p",
            "-c:a", "aac",
            "-ar", "44100",
            "-ac", "2",
        ]
        .iter()
        .map(ToString::to_string),
    );
    args.push(output.to_string_lossy().to_string());
    args
}

fn concat_args(list_path: &Path, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = ["-y", "-f", "concat", "-safe", "0", "-i"]
        .iter()
        .map(ToString::to_string)
        .collect();
    args.push(list_path.to_string_lossy().to_string());
    args.extend(
        ["-c", "copy", "-movflags", "+faststart"]
            .iter()
            .map(ToString::to_string),
    );
    args.push(output.to_string_lossy().to_string());
    args
}

/// concat demuxer 清單，單引號以 `'\''` 跳脫
fn concat_list(clips: &[PathBuf]) -> String {
    clips
        .iter()
        .map(|clip| {
            let escaped = clip.to_string_lossy().replace('\'', r"'\''");
            format!("file '{escaped}'\n")
        })
        .collect()
}
