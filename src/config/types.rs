use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// 設定檔中的分割門檻以 MB 表示
pub const BYTES_PER_MB: u64 = 1024 * 1024;

pub const DEFAULT_SPLIT_THRESHOLD_MB: u64 = 1999;
pub const DEFAULT_WATERMARK_FONT_SIZE_DIVISOR: u32 = 20;
pub const DEFAULT_WATERMARK_OPACITY: f32 = 0.5;

/// ffprobe 輸出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProbeFormat {
    /// 無標籤的逐行數值輸出（預設）
    #[default]
    Lines,
    /// JSON 結構化輸出
    Json,
}

/// 介面語言，對應 `locales/` 下的檔名
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[serde(rename = "en-US")]
    EnUs,
    #[default]
    #[serde(rename = "zh-TW")]
    ZhTw,
}

impl Language {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::EnUs => "en-US",
            Self::ZhTw => "zh-TW",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WatermarkSettings {
    pub enabled: bool,
    pub text: String,
    /// 字體大小 = 輸出高度 / divisor
    pub font_size_divisor: u32,
    /// 0.0 ~ 1.0
    pub opacity: f32,
}

impl Default for WatermarkSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            text: String::new(),
            font_size_divisor: DEFAULT_WATERMARK_FONT_SIZE_DIVISOR,
            opacity: DEFAULT_WATERMARK_OPACITY,
        }
    }
}

/// 外部工具路徑覆寫，未設定時由 PATH 搜尋
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolSettings {
    pub ffmpeg_path: Option<PathBuf>,
    pub ffprobe_path: Option<PathBuf>,
    pub font_path: Option<PathBuf>,
}

/// 各類子程序的逾時（秒）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeoutSettings {
    pub probe_secs: u64,
    pub transform_secs: u64,
    pub preview_clip_secs: u64,
    pub thumbnail_secs: u64,
}

impl Default for TimeoutSettings {
    fn default() -> Self {
        Self {
            probe_secs: 30,
            transform_secs: 6 * 60 * 60,
            preview_clip_secs: 120,
            thumbnail_secs: 60,
        }
    }
}

impl TimeoutSettings {
    #[must_use]
    pub const fn to_timeouts(&self) -> ToolTimeouts {
        ToolTimeouts {
            probe: Duration::from_secs(self.probe_secs),
            transform: Duration::from_secs(self.transform_secs),
            preview_clip: Duration::from_secs(self.preview_clip_secs),
            thumbnail: Duration::from_secs(self.thumbnail_secs),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ToolTimeouts {
    pub probe: Duration,
    pub transform: Duration,
    pub preview_clip: Duration,
    pub thumbnail: Duration,
}

impl Default for ToolTimeouts {
    fn default() -> Self {
        TimeoutSettings::default().to_timeouts()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UserSettings {
    pub language: Language,
    pub watermark: WatermarkSettings,
    pub split_threshold_mb: u64,
    pub probe_format: ProbeFormat,
    pub tools: ToolSettings,
    pub timeouts: TimeoutSettings,
}

impl Default for UserSettings {
    fn default() -> Self {
        Self {
            language: Language::default(),
            watermark: WatermarkSettings::default(),
            split_threshold_mb: DEFAULT_SPLIT_THRESHOLD_MB,
            probe_format: ProbeFormat::default(),
            tools: ToolSettings::default(),
            timeouts: TimeoutSettings::default(),
        }
    }
}

impl UserSettings {
    /// 取得本次呼叫使用的處理策略快照
    #[must_use]
    pub fn processing_policy(&self) -> ProcessingPolicy {
        ProcessingPolicy {
            watermark_enabled: self.watermark.enabled,
            watermark_text: self.watermark.text.clone(),
            watermark_font_size_divisor: self.watermark.font_size_divisor,
            watermark_opacity: self.watermark.opacity,
            split_threshold_bytes: self.split_threshold_mb.saturating_mul(BYTES_PER_MB),
        }
    }
}

/// 單次處理的唯讀策略
///
/// 每次呼叫前由設定檔重新解析，呼叫期間不會改變
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingPolicy {
    pub watermark_enabled: bool,
    pub watermark_text: String,
    pub watermark_font_size_divisor: u32,
    pub watermark_opacity: f32,
    pub split_threshold_bytes: u64,
}

impl Default for ProcessingPolicy {
    fn default() -> Self {
        UserSettings::default().processing_policy()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_converts_megabytes() {
        let settings = UserSettings {
            split_threshold_mb: 2,
            ..UserSettings::default()
        };
        assert_eq!(settings.processing_policy().split_threshold_bytes, 2 * 1024 * 1024);
    }

    #[test]
    fn test_default_policy() {
        let policy = ProcessingPolicy::default();
        assert!(!policy.watermark_enabled);
        assert_eq!(policy.split_threshold_bytes, 1999 * BYTES_PER_MB);
        assert_eq!(policy.watermark_font_size_divisor, 20);
    }

    #[test]
    fn test_partial_settings_use_defaults() {
        let json = r#"{"watermark": {"enabled": true, "text": "demo"}, "probe_format": "json"}"#;
        let settings: UserSettings = serde_json::from_str(json).unwrap();

        assert!(settings.watermark.enabled);
        assert_eq!(settings.watermark.text, "demo");
        assert!((settings.watermark.opacity - 0.5).abs() < f32::EPSILON);
        assert_eq!(settings.probe_format, ProbeFormat::Json);
        assert_eq!(settings.split_threshold_mb, DEFAULT_SPLIT_THRESHOLD_MB);
        assert_eq!(settings.timeouts.probe_secs, 30);
    }

    #[test]
    fn test_language_uses_locale_names() {
        let settings: UserSettings = serde_json::from_str(r#"{"language": "en-US"}"#).unwrap();
        assert_eq!(settings.language, Language::EnUs);
        assert_eq!(settings.language.as_str(), "en-US");
        assert_eq!(UserSettings::default().language.as_str(), "zh-TW");

        let json = serde_json::to_string(&UserSettings::default()).unwrap();
        assert!(json.contains(r#""language":"zh-TW""#));
    }

    #[test]
    fn test_timeouts_to_durations() {
        let timeouts = TimeoutSettings {
            probe_secs: 1,
            transform_secs: 2,
            preview_clip_secs: 3,
            thumbnail_secs: 4,
        }
        .to_timeouts();
        assert_eq!(timeouts.probe, Duration::from_secs(1));
        assert_eq!(timeouts.thumbnail, Duration::from_secs(4));
    }
}
