use super::ffmpeg_command::{GifConversionCommand, ImageWatermarkCommand, TranscodeCommand};
use super::watermark::WatermarkFilter;
use crate::tools::{MediaTool, OutputGuard, ToolTask, is_non_empty_file, remove_quietly, timestamp_millis};
use anyhow::{Context, Result};
use log::{error, info, warn};
use regex::Regex;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 轉檔執行器
///
/// 只產生新檔案，不刪除原始檔；成功與否完全以退出碼判斷，
/// 失敗時刪除任何部分寫入的輸出，由呼叫端退回原始檔案
pub struct TransformExecutor<'a, T: MediaTool> {
    tool: &'a T,
}

impl<'a, T: MediaTool> TransformExecutor<'a, T> {
    pub const fn new(tool: &'a T) -> Self {
        Self { tool }
    }

    fn run(&self, label: &str, args: &[String]) -> bool {
        match self.tool.run(ToolTask::Transform, args) {
            Ok(outcome) if outcome.success() => true,
            Ok(outcome) => {
                error!(
                    "{label} 失敗 (exit={:?}, 逾時={}, 取消={})",
                    outcome.exit_code, outcome.timed_out, outcome.cancelled
                );
                false
            }
            Err(e) => {
                error!("{label} 無法執行: {e:#}");
                false
            }
        }
    }

    pub fn watermark_image(&self, source: &Path, watermark: &WatermarkFilter) -> Option<PathBuf> {
        let command = ImageWatermarkCommand::new(source, watermark, timestamp_millis());
        let destination = command.destination_path().to_path_buf();

        let mut guard = OutputGuard::new();
        guard.track(&destination);

        if !self.run("圖片浮水印", &command.build_args()) || !destination.exists() {
            return None;
        }

        guard.commit();
        info!("圖片浮水印完成: {}", destination.display());
        Some(destination)
    }

    pub fn convert_gif(&self, source: &Path, watermark: Option<&WatermarkFilter>) -> Option<PathBuf> {
        let command = GifConversionCommand::new(source, watermark);
        let destination = command.destination_path().to_path_buf();

        let mut guard = OutputGuard::new();
        guard.track(&destination);

        if !self.run("GIF 轉檔", &command.build_args()) || !is_non_empty_file(&destination) {
            return None;
        }

        guard.commit();
        info!("GIF 轉檔完成: {}", destination.display());
        Some(destination)
    }

    /// 重新編碼；分割時回傳依序排列的片段
    pub fn transcode(
        &self,
        source: &Path,
        split: bool,
        watermark: Option<&WatermarkFilter>,
    ) -> Option<Vec<PathBuf>> {
        let command = TranscodeCommand::new(source, split, watermark);
        match self.transcode_inner(&command) {
            Ok(outputs) => outputs,
            Err(e) => {
                error!("重新編碼失敗 {}: {e:#}", source.display());
                None
            }
        }
    }

    fn transcode_inner(&self, command: &TranscodeCommand) -> Result<Option<Vec<PathBuf>>> {
        let part_pattern = part_name_regex(&command.part_prefix())?;
        let mut guard = OutputGuard::new();

        if command.is_split() {
            // 移除先前殘留的片段，避免混入本次結果
            for stale in collect_split_parts(command.output_dir(), &part_pattern)? {
                warn!("移除殘留片段: {}", stale.display());
                remove_quietly(&stale);
            }
        } else {
            guard.track(command.output_path());
        }

        let succeeded = self.run("重新編碼", &command.build_args());

        let outputs = if command.is_split() {
            let parts = collect_split_parts(command.output_dir(), &part_pattern)?;
            guard.track_all(parts.iter().cloned());
            parts
        } else {
            let output = command.output_path();
            if output.exists() { vec![output] } else { Vec::new() }
        };

        if !succeeded || outputs.is_empty() {
            return Ok(None);
        }

        guard.commit();
        info!("重新編碼完成，共 {} 個輸出", outputs.len());
        Ok(Some(outputs))
    }
}

/// `<prefix>NNN.mp4`
fn part_name_regex(prefix: &str) -> Result<Regex> {
    Regex::new(&format!(r"^{}\d{{3,}}\.mp4$", regex::escape(prefix)))
        .context("無法建立片段檔名樣式")
}

/// 列出目錄中符合樣式的片段，依檔名排序
///
/// 後綴為固定寬度的零填補數字，字典序即為時間順序
pub fn collect_split_parts(dir: &Path, pattern: &Regex) -> Result<Vec<PathBuf>> {
    let mut parts = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).follow_links(false) {
        let entry = entry.with_context(|| format!("無法列出目錄: {}", dir.display()))?;
        if !entry.file_type().is_file() {
            continue;
        }
        if entry.file_name().to_str().is_some_and(|name| pattern.is_match(name)) {
            parts.push(entry.into_path());
        }
    }
    parts.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(parts)
}
