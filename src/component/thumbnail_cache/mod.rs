//! 單張縮圖快取元件
//!
//! 每個來源檔案對應一張 `<path>.thumb.jpg`，已存在就不再呼叫 ffmpeg

mod thumbnail_extractor;

pub use thumbnail_extractor::{
    THUMBNAIL_OFFSET_SECS, THUMBNAIL_SUFFIX, THUMBNAIL_WIDTH, ThumbnailCache, thumbnail_path,
};
