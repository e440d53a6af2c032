use log::debug;
use std::env;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};

pub const FFMPEG: &str = "ffmpeg";
pub const FFPROBE: &str = "ffprobe";

/// 平台對應的執行檔名稱
#[must_use]
pub fn executable_name(name: &str) -> String {
    if cfg!(windows) && Path::new(name).extension().is_none() {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

/// 解析外部工具位置
///
/// 順序：設定檔覆寫 → PATH 搜尋 → 直接使用名稱交給作業系統解析
#[must_use]
pub fn resolve_command(name: &str, override_path: Option<&Path>) -> PathBuf {
    if let Some(path) = override_path.filter(|p| p.is_file()) {
        debug!("使用設定檔指定的 {name}: {}", path.display());
        return path.to_path_buf();
    }

    env::var_os("PATH")
        .and_then(|paths| find_in_paths(name, &paths))
        .unwrap_or_else(|| PathBuf::from(executable_name(name)))
}

fn find_in_paths(name: &str, paths: &OsStr) -> Option<PathBuf> {
    let file_name = executable_name(name);
    env::split_paths(paths)
        .map(|dir| dir.join(&file_name))
        .find(|candidate| candidate.is_file())
}
