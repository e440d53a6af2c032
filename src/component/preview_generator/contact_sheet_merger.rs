use crate::tools::{MediaTool, ToolTask, is_non_empty_file};
use anyhow::{Context, Result};
use log::debug;
use std::path::Path;

/// 預覽圖網格：3 欄 x 3 列，每個預覽片段一格
pub const DEFAULT_GRID_COLS: usize = 3;
pub const DEFAULT_GRID_ROWS: usize = 3;
/// 每格寬度，高度依比例
pub const TILE_WIDTH: u32 = 320;

/// 建立 tile 濾鏡字串
///
/// 以 `fps` 平均抽出 cols*rows 張影格，再以 `tile` 拼成一張
fn build_tile_filter(cols: usize, rows: usize, source_seconds: f64) -> String {
    let count = cols * rows;
    let seconds = source_seconds.max(1.0).round() as u64;
    format!("fps={count}/{seconds},scale={TILE_WIDTH}:-2,tile={cols}x{rows}")
}

/// 從預覽影片產生網格預覽圖
pub fn create_contact_sheet<T: MediaTool>(
    tool: &T,
    preview_path: &Path,
    output_path: &Path,
    grid_cols: usize,
    grid_rows: usize,
    preview_seconds: f64,
) -> Result<()> {
    let filter = build_tile_filter(grid_cols, grid_rows, preview_seconds);
    debug!("合併 {grid_cols}x{grid_rows} 預覽圖: {filter}");

    let args = vec![
        "-y".to_string(),
        "-i".to_string(),
        preview_path.to_string_lossy().to_string(),
        "-vf".to_string(),
        filter,
        "-frames:v".to_string(),
        "1".to_string(),
        "-q:v".to_string(),
        "3".to_string(),
        output_path.to_string_lossy().to_string(),
    ];

    let outcome = tool
        .run(ToolTask::Thumbnail, &args)
        .with_context(|| "無法執行 ffmpeg 合併預覽圖")?;

    if !outcome.success() {
        anyhow::bail!("ffmpeg 合併預覽圖失敗: {}", outcome.tail.join("\n"));
    }

    if !is_non_empty_file(output_path) {
        anyhow::bail!("預覽圖未建立: {}", output_path.display());
    }

    debug!("預覽圖已建立: {}", output_path.display());
    Ok(())
}
