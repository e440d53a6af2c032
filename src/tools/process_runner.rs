use anyhow::{Context, Result};
use log::{debug, error, warn};
use regex::Regex;
use std::collections::VecDeque;
use std::ffi::OsStr;
use std::io::{BufRead, BufReader, Read};
use std::path::PathBuf;
use std::process::{Child, Command, Stdio};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// 保留的合併輸出行數（供失敗時診斷）
pub const OUTPUT_TAIL_LINES: usize = 50;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// 輸出行分類
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Progress,
    Warning,
    Error,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamSource {
    Stdout,
    Stderr,
}

/// 依內容分類 ffmpeg / ffprobe 的輸出行
#[derive(Debug, Clone)]
pub struct LineClassifier {
    progress: Regex,
    warning: Regex,
    error: Regex,
}

impl LineClassifier {
    pub fn new() -> Result<Self> {
        Ok(Self {
            progress: Regex::new(r"(frame|size|time|speed)=\s*\S+")?,
            warning: Regex::new(r"(?i)\b(warning|deprecated)\b")?,
            error: Regex::new(r"(?i)\b(error|invalid|failed)\b")?,
        })
    }

    #[must_use]
    pub fn classify(&self, line: &str) -> LineKind {
        // 錯誤優先：ffmpeg 的錯誤訊息偶爾也帶有 time= 欄位
        if self.error.is_match(line) {
            LineKind::Error
        } else if self.warning.is_match(line) {
            LineKind::Warning
        } else if self.progress.is_match(line) {
            LineKind::Progress
        } else {
            LineKind::Info
        }
    }
}

/// 子程序執行結果
#[derive(Debug, Clone, Default)]
pub struct RunOutcome {
    /// 正常結束時的退出碼；被終止或被訊號殺掉時為 None
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub cancelled: bool,
    /// 完整的 stdout 行
    pub stdout: Vec<String>,
    /// stdout 與 stderr 合併後的最後幾行
    pub tail: Vec<String>,
}

impl RunOutcome {
    /// 退出碼是唯一的成功依據
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.timed_out && !self.cancelled
    }

    #[must_use]
    pub fn stdout_text(&self) -> String {
        self.stdout.join("\n")
    }
}

/// 外部程式執行器
///
/// 同步執行，逐一等待子程序結束；stdout / stderr 由背景執行緒讀取，
/// 主執行緒輪詢 `try_wait` 並在逾時或收到中斷訊號時終止子程序
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    program: PathBuf,
    classifier: LineClassifier,
    shutdown_signal: Option<Arc<AtomicBool>>,
}

impl ProcessRunner {
    pub fn new(program: impl Into<PathBuf>) -> Result<Self> {
        Ok(Self {
            program: program.into(),
            classifier: LineClassifier::new()?,
            shutdown_signal: None,
        })
    }

    #[must_use]
    pub fn with_shutdown_signal(mut self, shutdown_signal: Arc<AtomicBool>) -> Self {
        self.shutdown_signal = Some(shutdown_signal);
        self
    }

    /// 執行並等待結束
    ///
    /// 只有無法啟動程序時才回傳 Err；非零退出碼、逾時與取消都反映在 `RunOutcome`
    pub fn run<S: AsRef<OsStr>>(&self, args: &[S], timeout: Duration) -> Result<RunOutcome> {
        let mut child = Command::new(&self.program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("無法執行 {}", self.program.display()))?;

        let pid = child.id();
        debug!("啟動子程序 [{pid}]: {}", self.program.display());

        let (sender, receiver) = mpsc::channel();
        let readers = [
            child
                .stdout
                .take()
                .map(|s| spawn_line_reader(s, StreamSource::Stdout, sender.clone())),
            child
                .stderr
                .take()
                .map(|s| spawn_line_reader(s, StreamSource::Stderr, sender.clone())),
        ];
        drop(sender);

        let mut outcome = RunOutcome::default();
        let mut tail = VecDeque::with_capacity(OUTPUT_TAIL_LINES);
        // 逾時設定過大時不設期限
        let deadline = Instant::now().checked_add(timeout);

        let status = loop {
            self.drain_lines(&receiver, &mut outcome, &mut tail);

            match child.try_wait() {
                Ok(Some(status)) => break Some(status),
                Ok(None) => {}
                Err(e) => {
                    warn!("無法檢查程序狀態 [{pid}]: {e}");
                    terminate(&mut child, pid);
                    break None;
                }
            }

            if self.is_shutdown_requested() {
                warn!("收到中斷信號，終止程序 [{pid}]");
                outcome.cancelled = true;
                terminate(&mut child, pid);
                break None;
            }

            if deadline.is_some_and(|d| Instant::now() >= d) {
                warn!("程序逾時 ({:.0}s)，終止程序 [{pid}]", timeout.as_secs_f64());
                outcome.timed_out = true;
                terminate(&mut child, pid);
                break None;
            }

            thread::sleep(POLL_INTERVAL);
        };

        // 被終止時孫程序可能仍持有管線，不等待讀取執行緒
        if status.is_some() {
            for reader in readers.into_iter().flatten() {
                if reader.join().is_err() {
                    debug!("輸出讀取執行緒異常結束 [{pid}]");
                }
            }
        }
        self.drain_lines(&receiver, &mut outcome, &mut tail);

        outcome.exit_code = status.and_then(|s| s.code());
        outcome.tail = tail.into_iter().collect();

        if outcome.success() {
            debug!("程序完成 [{pid}]");
        } else {
            debug!(
                "程序失敗 [{pid}]: exit={:?}, 最後輸出:\n{}",
                outcome.exit_code,
                outcome.tail.join("\n")
            );
        }

        Ok(outcome)
    }

    fn is_shutdown_requested(&self) -> bool {
        self.shutdown_signal
            .as_ref()
            .is_some_and(|s| s.load(Ordering::SeqCst))
    }

    fn drain_lines(
        &self,
        receiver: &Receiver<(StreamSource, String)>,
        outcome: &mut RunOutcome,
        tail: &mut VecDeque<String>,
    ) {
        while let Ok((source, line)) = receiver.try_recv() {
            match self.classifier.classify(&line) {
                LineKind::Progress | LineKind::Info => debug!("{line}"),
                LineKind::Warning => warn!("{line}"),
                LineKind::Error => error!("{line}"),
            }

            if source == StreamSource::Stdout {
                outcome.stdout.push(line.clone());
            }
            if tail.len() == OUTPUT_TAIL_LINES {
                tail.pop_front();
            }
            tail.push_back(line);
        }
    }
}

fn terminate(child: &mut Child, pid: u32) {
    if let Err(e) = child.kill() {
        warn!("無法終止程序 [{pid}]: {e}");
    }
    if let Err(e) = child.wait() {
        debug!("無法回收程序 [{pid}]: {e}");
    }
}

/// 逐行讀取輸出；ffmpeg 的進度列以 `\r` 結尾，一併視為換行
fn spawn_line_reader<R: Read + Send + 'static>(
    stream: R,
    source: StreamSource,
    sender: Sender<(StreamSource, String)>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let reader = BufReader::new(stream);
        for chunk in reader.split(b'\n') {
            let Ok(chunk) = chunk else { break };
            let text = String::from_utf8_lossy(&chunk);
            for line in text.split('\r') {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                if sender.send((source, line.to_string())).is_err() {
                    return;
                }
            }
        }
    })
}
