//! 測試用的媒體工具：不呼叫 ffmpeg，依參數產生假的輸出檔

#![allow(dead_code)]

use anyhow::Result;
use media_post_processor::tools::{MediaTool, ProbeResult, RunOutcome, ToolTask};
use std::cell::{Cell, RefCell};
use std::fs;
use std::path::{Path, PathBuf};

type FailRule = Box<dyn Fn(&[String]) -> bool>;

pub struct FakeTool {
    probe_result: Option<ProbeResult>,
    segments: usize,
    fail_rule: Option<FailRule>,
    probes: Cell<usize>,
    calls: RefCell<Vec<(ToolTask, Vec<String>)>>,
}

impl FakeTool {
    pub fn new(probe_result: Option<ProbeResult>) -> Self {
        Self {
            probe_result,
            segments: 2,
            fail_rule: None,
            probes: Cell::new(0),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn video(width: u32, height: u32, duration: f64) -> Self {
        Self::new(Some(ProbeResult {
            width,
            height,
            duration,
        }))
    }

    /// segment muxer 要產生的片段數
    pub fn with_segments(mut self, segments: usize) -> Self {
        self.segments = segments;
        self
    }

    pub fn failing_when(mut self, rule: impl Fn(&[String]) -> bool + 'static) -> Self {
        self.fail_rule = Some(Box::new(rule));
        self
    }

    pub fn probe_count(&self) -> usize {
        self.probes.get()
    }

    pub fn run_count(&self) -> usize {
        self.calls.borrow().len()
    }

    pub fn runs_of(&self, task: ToolTask) -> usize {
        self.calls.borrow().iter().filter(|(t, _)| *t == task).count()
    }

    pub fn calls(&self) -> Vec<Vec<String>> {
        self.calls.borrow().iter().map(|(_, args)| args.clone()).collect()
    }
}

fn output_of(args: &[String]) -> PathBuf {
    PathBuf::from(args.last().cloned().unwrap_or_default())
}

impl MediaTool for FakeTool {
    fn probe(&self, _path: &Path) -> Option<ProbeResult> {
        self.probes.set(self.probes.get() + 1);
        self.probe_result
    }

    fn run(&self, task: ToolTask, args: &[String]) -> Result<RunOutcome> {
        self.calls.borrow_mut().push((task, args.to_vec()));
        let output = output_of(args);

        let pattern = output.to_string_lossy().to_string();

        if self.fail_rule.as_ref().is_some_and(|rule| rule(args)) {
            // 模擬寫到一半就失敗的 ffmpeg：分割時只留下第一個片段
            if pattern.contains("%03d") {
                fs::write(pattern.replace("%03d", "000"), b"partial")?;
            } else {
                fs::write(&output, b"partial")?;
            }
            return Ok(RunOutcome {
                exit_code: Some(1),
                tail: vec!["Conversion failed!".to_string()],
                ..RunOutcome::default()
            });
        }

        if pattern.contains("%03d") {
            for index in 0..self.segments {
                fs::write(pattern.replace("%03d", &format!("{index:03}")), b"segment")?;
            }
        } else {
            fs::write(&output, b"fake media")?;
        }

        Ok(RunOutcome {
            exit_code: Some(0),
            ..RunOutcome::default()
        })
    }
}

pub fn file_names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
        .collect()
}

/// 目錄中檔名以 `prefix` 開頭的項目
pub fn entries_starting_with(dir: &Path, prefix: &str) -> Vec<PathBuf> {
    fs::read_dir(dir)
        .unwrap()
        .filter_map(Result::ok)
        .map(|e| e.path())
        .filter(|p| {
            p.file_name()
                .is_some_and(|n| n.to_string_lossy().starts_with(prefix))
        })
        .collect()
}

/// 目錄中殘留的預覽暫存目錄
pub fn leftover_scratch_dirs(dir: &Path) -> Vec<PathBuf> {
    entries_starting_with(dir, ".preview_")
}

pub const MP4_HEADER: &[u8] = b"\x00\x00\x00\x20ftypisom\x00\x00\x02\x00isomiso2avc1mp41\x00\x00\x00\x08free";
