pub mod component;
pub mod config;
pub mod init;
pub mod signal;
pub mod tools;

pub use component::MediaProcessor;
pub use config::{Config, ProcessingPolicy};
pub use tools::{FfmpegTool, MediaTool};
