//! 功能元件模組
//!
//! 每個子模組實現一個獨立的處理階段，包含主要邏輯和專用工具

pub mod media_processor;
pub mod preview_generator;
pub mod thumbnail_cache;

pub use media_processor::MediaProcessor;
pub use preview_generator::PreviewGenerator;
pub use thumbnail_cache::ThumbnailCache;
