use crate::config::{ProbeFormat, ToolTimeouts, UserSettings};
use crate::tools::command_resolver::{FFMPEG, FFPROBE, resolve_command};
use crate::tools::ffprobe_info::{ProbeResult, parse_probe_output, probe_args};
use crate::tools::process_runner::{ProcessRunner, RunOutcome};
use anyhow::Result;
use log::{debug, warn};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

/// ffmpeg 呼叫用途，決定逾時長度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolTask {
    Transform,
    PreviewClip,
    Thumbnail,
}

impl ToolTask {
    #[must_use]
    pub const fn timeout(self, timeouts: &ToolTimeouts) -> Duration {
        match self {
            Self::Transform => timeouts.transform,
            Self::PreviewClip => timeouts.preview_clip,
            Self::Thumbnail => timeouts.thumbnail,
        }
    }
}

/// 媒體工具介面
///
/// 處理流程只依賴這兩個能力，未來可替換成行程內的媒體函式庫
pub trait MediaTool {
    /// 探測寬、高、長度；無法探測時回傳 None
    fn probe(&self, path: &Path) -> Option<ProbeResult>;

    /// 以參數列執行轉檔程式（不經過 shell）
    fn run(&self, task: ToolTask, args: &[String]) -> Result<RunOutcome>;
}

impl<T: MediaTool + ?Sized> MediaTool for &T {
    fn probe(&self, path: &Path) -> Option<ProbeResult> {
        (**self).probe(path)
    }

    fn run(&self, task: ToolTask, args: &[String]) -> Result<RunOutcome> {
        (**self).run(task, args)
    }
}

/// ffmpeg 共用前置參數
const FFMPEG_PREFIX: &[&str] = &["-hide_banner", "-nostdin", "-loglevel", "warning", "-stats"];

/// 以外部 ffmpeg / ffprobe 實作的媒體工具
#[derive(Debug, Clone)]
pub struct FfmpegTool {
    ffmpeg: ProcessRunner,
    ffprobe: ProcessRunner,
    probe_format: ProbeFormat,
    timeouts: ToolTimeouts,
}

impl FfmpegTool {
    pub fn new(
        ffmpeg: ProcessRunner,
        ffprobe: ProcessRunner,
        probe_format: ProbeFormat,
        timeouts: ToolTimeouts,
    ) -> Self {
        Self {
            ffmpeg,
            ffprobe,
            probe_format,
            timeouts,
        }
    }

    pub fn from_settings(settings: &UserSettings, shutdown_signal: Arc<AtomicBool>) -> Result<Self> {
        let ffmpeg_path = resolve_command(FFMPEG, settings.tools.ffmpeg_path.as_deref());
        let ffprobe_path = resolve_command(FFPROBE, settings.tools.ffprobe_path.as_deref());
        debug!(
            "外部工具: ffmpeg={}, ffprobe={}",
            ffmpeg_path.display(),
            ffprobe_path.display()
        );

        Ok(Self::new(
            ProcessRunner::new(ffmpeg_path)?.with_shutdown_signal(Arc::clone(&shutdown_signal)),
            ProcessRunner::new(ffprobe_path)?.with_shutdown_signal(shutdown_signal),
            settings.probe_format,
            settings.timeouts.to_timeouts(),
        ))
    }
}

impl MediaTool for FfmpegTool {
    fn probe(&self, path: &Path) -> Option<ProbeResult> {
        let args = probe_args(path, self.probe_format);
        let outcome = match self.ffprobe.run(&args, self.timeouts.probe) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("無法執行 ffprobe: {e:#}");
                return None;
            }
        };

        if outcome.timed_out || outcome.cancelled {
            return None;
        }

        let result = parse_probe_output(&outcome.stdout_text(), self.probe_format);
        debug!("探測結果 {}: {result:?}", path.display());
        result
    }

    fn run(&self, task: ToolTask, args: &[String]) -> Result<RunOutcome> {
        let full_args: Vec<&str> = FFMPEG_PREFIX
            .iter()
            .copied()
            .chain(args.iter().map(String::as_str))
            .collect();
        self.ffmpeg.run(&full_args, task.timeout(&self.timeouts))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_task_timeouts() {
        let timeouts = ToolTimeouts {
            probe: Duration::from_secs(1),
            transform: Duration::from_secs(2),
            preview_clip: Duration::from_secs(3),
            thumbnail: Duration::from_secs(4),
        };
        assert_eq!(ToolTask::Transform.timeout(&timeouts), Duration::from_secs(2));
        assert_eq!(ToolTask::PreviewClip.timeout(&timeouts), Duration::from_secs(3));
        assert_eq!(ToolTask::Thumbnail.timeout(&timeouts), Duration::from_secs(4));
    }

    #[cfg(unix)]
    #[test]
    fn test_probe_with_scripted_prober() {
        // 用 sh 模擬 ffprobe 的逐行輸出
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-ffprobe.sh");
        std::fs::write(&script, "printf '854\\n480\\n75.250000\\n'\n").unwrap();

        let prober = ProcessRunner::new("sh").unwrap();
        let outcome = prober.run(&[script.as_os_str()], Duration::from_secs(10)).unwrap();
        let result = parse_probe_output(&outcome.stdout_text(), ProbeFormat::Lines).unwrap();

        assert_eq!((result.width, result.height), (854, 480));
        assert!((result.duration - 75.25).abs() < 0.001);
    }
}
