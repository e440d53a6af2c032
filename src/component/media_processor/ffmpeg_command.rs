use super::watermark::WatermarkFilter;
use crate::tools::{file_stem_or, parent_dir};
use std::path::{Path, PathBuf};

/// 分割時每段長度（秒）
pub const SEGMENT_SECONDS: u32 = 900;
/// 轉檔輸出的最大寬度，不放大
pub const MAX_OUTPUT_WIDTH: u32 = 1920;

const PART_SUFFIX: &str = "_part";
const PROCESSED_SUFFIX: &str = "_processed";

fn to_args(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

fn join_filters(base: &[String], watermark: Option<&WatermarkFilter>) -> String {
    base.iter()
        .cloned()
        .chain(watermark.map(WatermarkFilter::build))
        .collect::<Vec<_>>()
        .join(",")
}

/// 圖片浮水印
pub struct ImageWatermarkCommand {
    source_path: PathBuf,
    destination_path: PathBuf,
    filter: String,
}

impl ImageWatermarkCommand {
    #[must_use]
    pub fn new(source_path: &Path, watermark: &WatermarkFilter, stamp: u128) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            destination_path: Self::generate_destination_path(source_path, stamp),
            filter: watermark.build(),
        }
    }

    fn generate_destination_path(source_path: &Path, stamp: u128) -> PathBuf {
        let file_stem = file_stem_or(source_path, "image");
        let extension = source_path
            .extension()
            .map_or_else(|| "jpg".to_string(), |e| e.to_string_lossy().to_lowercase());
        parent_dir(source_path).join(format!("{file_stem}_wm_{stamp}.{extension}"))
    }

    #[must_use]
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    #[must_use]
    pub fn build_args(&self) -> Vec<String> {
        let mut args = to_args(&["-y", "-i"]);
        args.push(self.source_path.to_string_lossy().to_string());
        args.extend(["-vf".to_string(), self.filter.clone()]);
        args.extend(to_args(&["-frames:v", "1", "-update", "1"]));

        let is_jpeg = self
            .destination_path
            .extension()
            .is_some_and(|e| e.eq_ignore_ascii_case("jpg") || e.eq_ignore_ascii_case("jpeg"));
        if is_jpeg {
            args.extend(to_args(&["-q:v", "2"]));
        }

        args.push(self.destination_path.to_string_lossy().to_string());
        args
    }
}

/// GIF 轉為 MP4
pub struct GifConversionCommand {
    source_path: PathBuf,
    destination_path: PathBuf,
    watermark: Option<WatermarkFilter>,
}

impl GifConversionCommand {
    #[must_use]
    pub fn new(source_path: &Path, watermark: Option<&WatermarkFilter>) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            destination_path: Self::generate_destination_path(source_path),
            watermark: watermark.cloned(),
        }
    }

    /// `<stem>.mp4`；同名檔案已存在時改用 `<stem>_converted.mp4`
    fn generate_destination_path(source_path: &Path) -> PathBuf {
        let file_stem = file_stem_or(source_path, "animation");
        let parent = parent_dir(source_path);
        let preferred = parent.join(format!("{file_stem}.mp4"));
        if preferred.exists() {
            parent.join(format!("{file_stem}_converted.mp4"))
        } else {
            preferred
        }
    }

    #[must_use]
    pub fn destination_path(&self) -> &Path {
        &self.destination_path
    }

    #[must_use]
    pub fn build_args(&self) -> Vec<String> {
        let filters = join_filters(
            &to_args(&["scale=trunc(iw/2)*2:trunc(ih/2)*2", "format=yuv420p"]),
            self.watermark.as_ref(),
        );

        let mut args = to_args(&["-y", "-i"]);
        args.push(self.source_path.to_string_lossy().to_string());
        args.extend(["-vf".to_string(), filters]);
        args.extend(to_args(&[
            "-c:v", "libx264",
            "-preset", "medium",
            "-crf", "23",
            "-movflags", "+faststart",
            "-an",
        ]));
        args.push(self.destination_path.to_string_lossy().to_string());
        args
    }
}

/// 影片重新編碼，可選擇分割為固定長度的片段
pub struct TranscodeCommand {
    source_path: PathBuf,
    output_dir: PathBuf,
    file_stem: String,
    split: bool,
    watermark: Option<WatermarkFilter>,
}

impl TranscodeCommand {
    #[must_use]
    pub fn new(source_path: &Path, split: bool, watermark: Option<&WatermarkFilter>) -> Self {
        Self {
            source_path: source_path.to_path_buf(),
            output_dir: parent_dir(source_path),
            file_stem: file_stem_or(source_path, "video"),
            split,
            watermark: watermark.cloned(),
        }
    }

    #[must_use]
    pub const fn is_split(&self) -> bool {
        self.split
    }

    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// 分割片段的檔名前綴（`<stem>_part`）
    #[must_use]
    pub fn part_prefix(&self) -> String {
        format!("{}{PART_SUFFIX}", self.file_stem)
    }

    /// 分割時為 segment 樣式 `<stem>_part%03d.mp4`，否則為 `<stem>_processed.mp4`
    #[must_use]
    pub fn output_path(&self) -> PathBuf {
        if self.split {
            self.output_dir.join(format!("{}%03d.mp4", self.part_prefix()))
        } else {
            self.output_dir
                .join(format!("{}{PROCESSED_SUFFIX}.mp4", self.file_stem))
        }
    }

    #[must_use]
    pub fn build_args(&self) -> Vec<String> {
        let filters = join_filters(
            &[
                format!("scale='min({MAX_OUTPUT_WIDTH},iw)':-2"),
                "pad=ceil(iw/2)*2:ceil(ih/2)*2".to_string(),
            ],
            self.watermark.as_ref(),
        );

        let mut args = to_args(&["-y", "-i"]);
        args.push(self.source_path.to_string_lossy().to_string());
        args.extend(to_args(&[
            "-map", "0:v:0",
            "-map", "0:a?",
            "-map_metadata", "-1",
            "-map_chapters", "-1",
        ]));
        args.extend(["-vf".to_string(), filters]);
        args.extend(to_args(&[
            "-c:v", "libx264",
            "-preset", "medium",
            "-crf", "23",
            "-pix_fmt", "yuv420p",
            "-c:a", "aac",
            "-b:a", "128k",
        ]));

        if self.split {
            args.extend(to_args(&["-f", "segment", "-segment_time"]));
            args.push(SEGMENT_SECONDS.to_string());
            args.extend(to_args(&[
                "-reset_timestamps", "1",
                "-segment_format", "mp4",
            ]));
        } else {
            args.extend(to_args(&["-movflags", "+faststart"]));
        }

        args.push(self.output_path().to_string_lossy().to_string());
        args
    }
}
