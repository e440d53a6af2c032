use log::{debug, info};
use std::env;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// 工具目錄下的字型位置（相對於執行檔）
const BUNDLED_FONT: &str = "fonts/watermark.ttf";

#[cfg(target_os = "windows")]
const SYSTEM_FONTS: &[&str] = &[
    "C:/Windows/Fonts/arialbd.ttf",
    "C:/Windows/Fonts/arial.ttf",
    "C:/Windows/Fonts/msjh.ttc",
];

#[cfg(target_os = "macos")]
const SYSTEM_FONTS: &[&str] = &[
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/System/Library/Fonts/Helvetica.ttc",
];

#[cfg(not(any(target_os = "windows", target_os = "macos")))]
const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
];

/// 浮水印字型搜尋
///
/// 找到可用字型後快取到物件生命週期結束，找不到則下次呼叫再搜尋
#[derive(Debug, Default)]
pub struct FontLocator {
    candidates: Vec<PathBuf>,
    resolved: OnceLock<PathBuf>,
}

impl FontLocator {
    /// 預設搜尋順序：設定檔指定 → 執行檔旁的 fonts/ → 系統字型
    #[must_use]
    pub fn new(configured: Option<PathBuf>) -> Self {
        let mut candidates: Vec<PathBuf> = configured.into_iter().collect();

        if let Some(dir) = env::current_exe()
            .ok()
            .and_then(|exe| exe.parent().map(Path::to_path_buf))
        {
            candidates.push(dir.join(BUNDLED_FONT));
        }

        candidates.extend(SYSTEM_FONTS.iter().map(PathBuf::from));
        Self::with_candidates(candidates)
    }

    #[must_use]
    pub fn with_candidates(candidates: Vec<PathBuf>) -> Self {
        Self {
            candidates,
            resolved: OnceLock::new(),
        }
    }

    #[must_use]
    pub fn resolve(&self) -> Option<&Path> {
        if let Some(path) = self.resolved.get() {
            return Some(path.as_path());
        }

        let found = self.candidates.iter().find(|p| is_usable_font(p))?;
        info!("使用浮水印字型: {}", found.display());
        Some(self.resolved.get_or_init(|| found.clone()).as_path())
    }
}

fn is_usable_font(path: &Path) -> bool {
    let usable = path.metadata().is_ok_and(|m| m.is_file() && m.len() > 0);
    if !usable {
        debug!("字型不可用: {}", path.display());
    }
    usable
}
