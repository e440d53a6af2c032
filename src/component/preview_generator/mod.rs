//! 預覽影片產生元件
//!
//! 四階段流程：
//! A. 計算時間點
//! B. 逐一擷取片段
//! C. 串接為預覽影片
//! D. 產生 3x3 預覽圖

mod contact_sheet_merger;
mod main;
mod timestamp_selector;

pub use contact_sheet_merger::{
    DEFAULT_GRID_COLS, DEFAULT_GRID_ROWS, TILE_WIDTH, create_contact_sheet,
};
pub use main::{PREVIEW_WIDTH, PreviewGenerator};
pub use timestamp_selector::{CLIP_COUNT, CLIP_LENGTH, MIN_PREVIEW_DURATION, clip_offsets};
