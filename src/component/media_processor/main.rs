use super::transform::TransformExecutor;
use super::watermark::WatermarkFilter;
use crate::component::preview_generator::{MIN_PREVIEW_DURATION, PreviewGenerator};
use crate::component::thumbnail_cache::ThumbnailCache;
use crate::config::{MediaAsset, MediaKind, ProcessingPolicy};
use crate::tools::{
    FontLocator, MediaTool, ProbeResult, file_size, has_recognized_header, head_snippet,
    remove_original,
};
use anyhow::Result;
use log::{debug, error, info, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// 媒體後處理器
///
/// 單一檔案的同步處理流程：
/// 1. 分類（圖片 / GIF / 影片 / 其他）
/// 2. 圖片：加浮水印
/// 3. GIF / 影片：探測 → 檔頭檢查 → 轉檔或分割
/// 4. 長片產生預覽、最終結果的第一個檔案產生縮圖
///
/// 回傳的清單若含預覽則預覽在第一個；所有預期內的失敗都退回原始檔案，不回傳錯誤
pub struct MediaProcessor<T: MediaTool> {
    tool: T,
    fonts: FontLocator,
}

impl<T: MediaTool> MediaProcessor<T> {
    pub const fn new(tool: T, fonts: FontLocator) -> Self {
        Self { tool, fonts }
    }

    pub const fn tool(&self) -> &T {
        &self.tool
    }

    pub fn process(
        &self,
        path: &Path,
        force_reencode: bool,
        policy: &ProcessingPolicy,
    ) -> Vec<PathBuf> {
        if !path.is_file() {
            warn!("檔案不存在: {}", path.display());
            return Vec::new();
        }

        match self.process_asset(&MediaAsset::new(path), force_reencode, policy) {
            Ok(outputs) => outputs,
            Err(e) => {
                error!("處理檔案失敗 {}: {e:#}", path.display());
                if path.exists() {
                    vec![path.to_path_buf()]
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn process_asset(
        &self,
        asset: &MediaAsset,
        force_reencode: bool,
        policy: &ProcessingPolicy,
    ) -> Result<Vec<PathBuf>> {
        info!("處理檔案: {} ({:?})", asset.path.display(), asset.kind);

        match asset.kind {
            MediaKind::Image => Ok(self.process_image(&asset.path, policy)),
            MediaKind::Gif | MediaKind::Video => {
                self.process_video(asset, force_reencode, policy)
            }
            MediaKind::Other => {
                debug!("非媒體檔案，直接回傳: {}", asset.path.display());
                Ok(vec![asset.path.clone()])
            }
        }
    }

    /// 找不到字型時靜默停用浮水印
    fn watermark_filter(&self, policy: &ProcessingPolicy) -> Option<WatermarkFilter> {
        if !policy.watermark_enabled {
            return None;
        }
        let Some(font) = self.fonts.resolve() else {
            warn!("找不到浮水印字型，本次略過浮水印");
            return None;
        };
        WatermarkFilter::from_policy(policy, font)
    }

    fn process_image(&self, path: &Path, policy: &ProcessingPolicy) -> Vec<PathBuf> {
        let Some(watermark) = self.watermark_filter(policy) else {
            return vec![path.to_path_buf()];
        };

        match TransformExecutor::new(&self.tool).watermark_image(path, &watermark) {
            Some(output) => {
                discard_original(path);
                vec![output]
            }
            None => vec![path.to_path_buf()],
        }
    }

    fn process_video(
        &self,
        asset: &MediaAsset,
        force_reencode: bool,
        policy: &ProcessingPolicy,
    ) -> Result<Vec<PathBuf>> {
        let path = asset.path.as_path();
        let Some(probe) = self.probe_or_validate(path) else {
            return Ok(Vec::new());
        };
        debug!(
            "影片資訊: {}x{}, {:.1}s",
            probe.width, probe.height, probe.duration
        );

        let watermark = self.watermark_filter(policy);
        let executor = TransformExecutor::new(&self.tool);

        let transformed = if asset.kind == MediaKind::Gif {
            executor.convert_gif(path, watermark.as_ref()).map(|o| vec![o])
        } else {
            let size = file_size(path)?;
            let needs_split = size > policy.split_threshold_bytes;

            if needs_split || force_reencode || watermark.is_some() {
                info!(
                    "重新編碼: 分割={needs_split}, 強制={force_reencode}, 浮水印={}",
                    watermark.is_some()
                );
                executor.transcode(path, needs_split, watermark.as_ref())
            } else {
                debug!("不需轉檔: {}", path.display());
                None
            }
        };

        // 預覽從原始檔擷取，原始檔在預覽之後才刪除
        let preview = if probe.duration > MIN_PREVIEW_DURATION {
            PreviewGenerator::new(&self.tool).make_preview(path, probe.duration)
        } else {
            None
        };

        let main_outputs = match transformed {
            Some(outputs) => {
                discard_original(path);
                outputs
            }
            None => vec![path.to_path_buf()],
        };

        let outputs: Vec<PathBuf> = preview.into_iter().chain(main_outputs).collect();

        // 縮圖對象為最終結果的第一個檔案；預覽的預覽圖已存在時直接沿用
        if let Some(first) = outputs.first() {
            if ThumbnailCache::new(&self.tool).get_or_create(first).is_none() {
                debug!("未產生縮圖: {}", first.display());
            }
        }

        Ok(outputs)
    }

    /// 探測失敗時檢查檔頭：可辨識則以預設值盲處理，否則刪除並回傳 None
    fn probe_or_validate(&self, path: &Path) -> Option<ProbeResult> {
        if let Some(probe) = self.tool.probe(path) {
            return Some(probe);
        }

        if has_recognized_header(path) {
            warn!("無法探測但檔頭可辨識，以預設值處理: {}", path.display());
            return Some(ProbeResult::assumed());
        }

        warn!(
            "檔案損壞或不是媒體檔，刪除: {} 檔頭: {:?}",
            path.display(),
            head_snippet(path)
        );
        if let Err(e) = fs::remove_file(path) {
            error!("無法刪除損壞檔案 {}: {e}", path.display());
        }
        None
    }
}

fn discard_original(path: &Path) {
    if let Err(e) = remove_original(path) {
        warn!("{e:#}");
    }
}
