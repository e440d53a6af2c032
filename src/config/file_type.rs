use std::path::{Path, PathBuf};

pub const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];
pub const GIF_EXTENSIONS: &[&str] = &["gif"];
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mov", "m4v", "webm", "mkv"];

/// 依副檔名推斷的媒體種類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Image,
    Video,
    Gif,
    Other,
}

impl MediaKind {
    #[must_use]
    pub fn from_path(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Other;
        };
        let ext = ext.to_lowercase();

        if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Image
        } else if GIF_EXTENSIONS.contains(&ext.as_str()) {
            Self::Gif
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else {
            Self::Other
        }
    }
}

/// 待處理的檔案；處理器回傳後不再持有
#[derive(Debug, Clone)]
pub struct MediaAsset {
    pub path: PathBuf,
    pub kind: MediaKind,
}

impl MediaAsset {
    #[must_use]
    pub fn new(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
            kind: MediaKind::from_path(path),
        }
    }
}
