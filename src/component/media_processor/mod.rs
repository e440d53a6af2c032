//! 媒體後處理決策元件
//!
//! 依檔案種類決定浮水印、GIF 轉檔、重新編碼與分割，並呼叫 ffmpeg 執行

mod ffmpeg_command;
mod main;
mod transform;
mod watermark;

pub use ffmpeg_command::{
    GifConversionCommand, ImageWatermarkCommand, MAX_OUTPUT_WIDTH, SEGMENT_SECONDS,
    TranscodeCommand,
};
pub use main::MediaProcessor;
pub use transform::{TransformExecutor, collect_split_parts};
pub use watermark::{WatermarkFilter, escape_filter_value};
