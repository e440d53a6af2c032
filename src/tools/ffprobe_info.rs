use crate::config::ProbeFormat;
use serde::Deserialize;
use std::path::Path;

/// 探測失敗但檔頭可辨識時採用的預設尺寸
pub const ASSUMED_WIDTH: u32 = 1920;
pub const ASSUMED_HEIGHT: u32 = 1080;

/// ffprobe 探測結果；寬高為 0 代表無法探測
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    pub width: u32,
    pub height: u32,
    pub duration: f64,
}

impl ProbeResult {
    /// 盲處理用的預設值（1920x1080，長度未知）
    #[must_use]
    pub const fn assumed() -> Self {
        Self {
            width: ASSUMED_WIDTH,
            height: ASSUMED_HEIGHT,
            duration: 0.0,
        }
    }
}

/// 建立 ffprobe 參數
#[must_use]
pub fn probe_args(path: &Path, format: ProbeFormat) -> Vec<String> {
    let mut args: Vec<String> = match format {
        ProbeFormat::Lines => [
            "-v",
            "error",
            "-select_streams",
            "v:0",
            "-show_entries",
            "stream=width,height:format=duration",
            "-of",
            "default=noprint_wrappers=1:nokey=1",
        ]
        .iter()
        .map(ToString::to_string)
        .collect(),
        ProbeFormat::Json => ["-v", "quiet", "-print_format", "json", "-show_format", "-show_streams"]
            .iter()
            .map(ToString::to_string)
            .collect(),
    };
    args.push(path.to_string_lossy().to_string());
    args
}

#[must_use]
pub fn parse_probe_output(output: &str, format: ProbeFormat) -> Option<ProbeResult> {
    match format {
        ProbeFormat::Lines => parse_line_output(output),
        ProbeFormat::Json => parse_json_output(output),
    }
}

/// 解析無標籤的逐行輸出
///
/// 三個數值沒有欄位名稱，依位置推斷：含小數點者為長度，
/// 第一個整數為寬、第二個整數為高。若 ffprobe 改變輸出順序會誤判欄位。
#[must_use]
pub fn parse_line_output(output: &str) -> Option<ProbeResult> {
    let mut width = 0;
    let mut height = 0;
    let mut duration = 0.0;

    for line in output.lines().map(str::trim).filter(|l| !l.is_empty()) {
        if line.contains('.') {
            if let Ok(value) = line.parse::<f64>() {
                duration = value;
            }
        } else if let Ok(value) = line.parse::<u32>() {
            if width == 0 {
                width = value;
            } else if height == 0 {
                height = value;
            }
        }
    }

    if width == 0 && height == 0 {
        return None;
    }

    Some(ProbeResult {
        width,
        height,
        duration,
    })
}

#[derive(Deserialize)]
struct FfprobeOutput {
    format: Option<FormatInfo>,
    streams: Option<Vec<StreamInfo>>,
}

#[derive(Deserialize)]
struct FormatInfo {
    duration: Option<String>,
}

#[derive(Deserialize)]
struct StreamInfo {
    codec_type: Option<String>,
    width: Option<u32>,
    height: Option<u32>,
    duration: Option<String>,
}

/// 解析 `-print_format json` 輸出
#[must_use]
pub fn parse_json_output(output: &str) -> Option<ProbeResult> {
    let probe: FfprobeOutput = serde_json::from_str(output).ok()?;

    let video_stream = probe
        .streams
        .as_ref()
        .and_then(|streams| {
            streams
                .iter()
                .find(|s| s.codec_type.as_deref() == Some("video"))
        })?;

    let width = video_stream.width.unwrap_or(0);
    let height = video_stream.height.unwrap_or(0);
    if width == 0 && height == 0 {
        return None;
    }

    // 長度優先取 format，其次取 stream
    let duration = probe
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .or(video_stream.duration.as_ref())
        .and_then(|d| d.parse::<f64>().ok())
        .unwrap_or(0.0);

    Some(ProbeResult {
        width,
        height,
        duration,
    })
}
