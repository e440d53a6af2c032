use crate::config::ProcessingPolicy;
use std::path::{Path, PathBuf};

/// 浮水印與畫面邊緣的距離（像素）
const MARGIN: u32 = 10;
const SHADOW_OFFSET: u32 = 2;
/// 陰影透明度相對於文字透明度的比例
const SHADOW_OPACITY_RATIO: f32 = 0.6;

/// drawtext 浮水印濾鏡
///
/// 半透明文字固定在右下角，帶陰影，字體大小依輸出高度計算
#[derive(Debug, Clone, PartialEq)]
pub struct WatermarkFilter {
    font_path: PathBuf,
    text: String,
    font_size_divisor: u32,
    opacity: f32,
}

impl WatermarkFilter {
    /// 未啟用或文字為空時回傳 None
    #[must_use]
    pub fn from_policy(policy: &ProcessingPolicy, font_path: &Path) -> Option<Self> {
        if !policy.watermark_enabled || policy.watermark_text.trim().is_empty() {
            return None;
        }

        Some(Self {
            font_path: font_path.to_path_buf(),
            text: policy.watermark_text.trim().to_string(),
            font_size_divisor: policy.watermark_font_size_divisor.max(1),
            opacity: policy.watermark_opacity.clamp(0.0, 1.0),
        })
    }

    #[must_use]
    pub fn build(&self) -> String {
        let shadow_opacity = self.opacity * SHADOW_OPACITY_RATIO;
        format!(
            "drawtext=fontfile={font}:text={text}:expansion=none:fontcolor=white@{opacity:.2}:fontsize=h/{divisor}:x=w-tw-{MARGIN}:y=h-th-{MARGIN}:shadowcolor=black@{shadow_opacity:.2}:shadowx={SHADOW_OFFSET}:shadowy={SHADOW_OFFSET}",
            font = escape_filter_value(&self.font_path.to_string_lossy()),
            text = escape_filter_value(&self.text),
            opacity = self.opacity,
            divisor = self.font_size_divisor,
        )
    }
}

/// 濾鏡參數值跳脫
///
/// 兩層：先跳脫選項層的 `\ ' :`，再跳脫濾鏡圖層的 `\ ' [ ] , ;`
#[must_use]
pub fn escape_filter_value(value: &str) -> String {
    escape_chars(&escape_chars(value, &['\\', '\'', ':']), &['\\', '\'', '[', ']', ',', ';'])
}

fn escape_chars(value: &str, special: &[char]) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if special.contains(&c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

#[cfg(test)]
mod tests {
    use super::*;

    fn policy(text: &str) -> ProcessingPolicy {
        ProcessingPolicy {
            watermark_enabled: true,
            watermark_text: text.to_string(),
            watermark_font_size_divisor: 25,
            watermark_opacity: 0.4,
            split_threshold_bytes: 0,
        }
    }

    #[test]
    fn test_disabled_or_empty_text() {
        let font = Path::new("/fonts/a.ttf");
        let mut disabled = policy("hello");
        disabled.watermark_enabled = false;
        assert!(WatermarkFilter::from_policy(&disabled, font).is_none());
        assert!(WatermarkFilter::from_policy(&policy("   "), font).is_none());
    }

    #[test]
    fn test_build_filter() {
        let filter = WatermarkFilter::from_policy(&policy("hello"), Path::new("/fonts/a.ttf")).unwrap();
        assert_eq!(
            filter.build(),
            "drawtext=fontfile=/fonts/a.ttf:text=hello:expansion=none:fontcolor=white@0.40:fontsize=h/25:x=w-tw-10:y=h-th-10:shadowcolor=black@0.24:shadowx=2:shadowy=2"
        );
    }

    #[test]
    fn test_divisor_and_opacity_are_clamped() {
        let mut p = policy("x");
        p.watermark_font_size_divisor = 0;
        p.watermark_opacity = 3.0;
        let built = WatermarkFilter::from_policy(&p, Path::new("f.ttf")).unwrap().build();
        assert!(built.contains("fontsize=h/1:"));
        assert!(built.contains("fontcolor=white@1.00"));
    }

    #[test]
    fn test_escape_filter_value() {
        assert_eq!(escape_filter_value("plain"), "plain");
        assert_eq!(escape_filter_value("a:b"), r"a\\:b");
        assert_eq!(escape_filter_value("a,b"), r"a\,b");
        assert_eq!(escape_filter_value("it's"), r"it\\\'s");
        assert_eq!(escape_filter_value(r"C:\f.ttf"), r"C\\:\\\\f.ttf");
    }
}
