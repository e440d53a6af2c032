use std::fs::File;
use std::io::Read;
use std::path::Path;

/// 檢查的檔頭長度
pub const HEADER_WINDOW: usize = 32;

const EBML_MAGIC: [u8; 4] = [0x1A, 0x45, 0xDF, 0xA3];
const ISO_BMFF_MARKERS: [&[u8]; 2] = [b"ftyp", b"moov"];

fn read_head(path: &Path) -> Option<Vec<u8>> {
    let file = File::open(path).ok()?;
    let mut head = Vec::with_capacity(HEADER_WINDOW);
    file.take(HEADER_WINDOW as u64).read_to_end(&mut head).ok()?;
    Some(head)
}

/// 判斷檔頭是否為已知的容器格式（MP4/MOV 或 Matroska/WebM）
///
/// 僅在探測失敗時使用，用來區分「ffprobe 讀不懂但結構合理」與「根本不是媒體檔」
#[must_use]
pub fn has_recognized_header(path: &Path) -> bool {
    read_head(path).is_some_and(|head| is_recognized_header(&head))
}

#[must_use]
pub fn is_recognized_header(head: &[u8]) -> bool {
    let window = &head[..head.len().min(HEADER_WINDOW)];

    if window.starts_with(&EBML_MAGIC) {
        return true;
    }

    ISO_BMFF_MARKERS
        .iter()
        .any(|marker| window.windows(marker.len()).any(|w| w == *marker))
}

/// 檔頭的可讀文字片段，供診斷日誌使用
#[must_use]
pub fn head_snippet(path: &Path) -> String {
    read_head(path).map_or_else(String::new, |head| {
        String::from_utf8_lossy(&head)
            .chars()
            .map(|c| if c.is_control() { ' ' } else { c })
            .collect::<String>()
            .trim()
            .to_string()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_iso_bmff_header() {
        let head = b"\x00\x00\x00\x20ftypisom\x00\x00\x02\x00isomiso2avc1mp41";
        assert!(is_recognized_header(head));
    }

    #[test]
    fn test_moov_anywhere_in_window() {
        let mut head = vec![0u8; 20];
        head.extend_from_slice(b"moov");
        assert!(is_recognized_header(&head));
    }

    #[test]
    fn test_marker_outside_window_is_ignored() {
        let mut head = vec![0u8; 40];
        head.extend_from_slice(b"ftyp");
        assert!(!is_recognized_header(&head));
    }

    #[test]
    fn test_ebml_header() {
        assert!(is_recognized_header(&[0x1A, 0x45, 0xDF, 0xA3, 0x01, 0x00]));
        assert!(!is_recognized_header(&[0x00, 0x1A, 0x45, 0xDF, 0xA3]));
    }

    #[test]
    fn test_html_page_is_not_media() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("video.mp4");
        fs::write(&path, "<!DOCTYPE html>\n<html><head><title>404 Not Found</title>").unwrap();

        assert!(!has_recognized_header(&path));
        assert_eq!(head_snippet(&path), "<!DOCTYPE html> <html><head><tit");
    }

    #[test]
    fn test_missing_file() {
        assert!(!has_recognized_header(Path::new("/nonexistent/file.mp4")));
        assert!(head_snippet(Path::new("/nonexistent/file.mp4")).is_empty());
    }
}
