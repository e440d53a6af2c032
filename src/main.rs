use anyhow::Result;
use console::style;
use dialoguer::{Confirm, Input};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use media_post_processor::component::MediaProcessor;
use media_post_processor::config::{Config, ensure_settings_file};
use media_post_processor::init;
use media_post_processor::signal::{is_shutdown_requested, setup_shutdown_signal};
use media_post_processor::tools::{FfmpegTool, FontLocator};
use rust_i18n::t;
use std::env;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

#[macro_use]
extern crate rust_i18n;

i18n!("locales", fallback = "en-US");

struct Request {
    path: PathBuf,
    force_reencode: bool,
}

/// `<path> [--force]`；沒有路徑時回傳 None 改用互動模式
fn parse_args(args: impl Iterator<Item = String>) -> Option<Request> {
    let mut path = None;
    let mut force_reencode = false;

    for arg in args {
        match arg.as_str() {
            "--force" | "-f" => force_reencode = true,
            _ if path.is_none() => path = Some(PathBuf::from(arg)),
            _ => {}
        }
    }

    path.map(|path| Request {
        path,
        force_reencode,
    })
}

fn prompt_request() -> Result<Request> {
    let path: String = Input::new()
        .with_prompt(t!("cli.prompt_path"))
        .interact_text()?;
    let force_reencode = Confirm::new()
        .with_prompt(t!("cli.prompt_force"))
        .default(false)
        .interact()?;

    Ok(Request {
        path: PathBuf::from(path.trim()),
        force_reencode,
    })
}

fn run_request(processor: &MediaProcessor<FfmpegTool>, config: &Config, request: &Request) -> Result<()> {
    // 每次處理前重新讀取設定，語言與處理策略都即時生效
    let settings = config.current_settings();
    rust_i18n::set_locale(settings.language.as_str());
    let policy = settings.processing_policy();

    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::with_template("{spinner:.cyan} {msg} [{elapsed}]")?);
    spinner.set_message(
        t!("cli.processing", path = request.path.display().to_string()).to_string(),
    );
    spinner.enable_steady_tick(Duration::from_millis(120));

    let outputs = processor.process(&request.path, request.force_reencode, &policy);
    spinner.finish_and_clear();

    if outputs.is_empty() {
        println!("{}", style(t!("cli.no_output")).yellow());
        return Ok(());
    }

    println!("{}", style(t!("cli.outputs", count = outputs.len())).green());
    for (index, output) in outputs.iter().enumerate() {
        println!("  {}. {}", index + 1, output.display());
    }
    Ok(())
}

fn interactive_loop(
    processor: &MediaProcessor<FfmpegTool>,
    config: &Config,
    shutdown_signal: &AtomicBool,
) -> Result<()> {
    println!("{}", style(t!("cli.title")).cyan().bold());
    loop {
        let request = prompt_request()?;
        run_request(processor, config, &request)?;

        if is_shutdown_requested(shutdown_signal) {
            return Ok(());
        }
        let again = Confirm::new()
            .with_prompt(t!("cli.continue"))
            .default(true)
            .interact()?;
        if !again {
            return Ok(());
        }
    }
}

fn main() -> Result<()> {
    init::init();
    let shutdown_signal = setup_shutdown_signal()?;

    let config = Config::new();
    if ensure_settings_file(config.settings_path())? {
        info!("已建立預設設定檔: {}", config.settings_path().display());
    }

    let settings = config.current_settings();
    rust_i18n::set_locale(settings.language.as_str());

    let tool = FfmpegTool::from_settings(&settings, Arc::clone(&shutdown_signal))?;
    let processor = MediaProcessor::new(tool, FontLocator::new(settings.tools.font_path));

    if let Some(request) = parse_args(env::args().skip(1)) {
        return run_request(&processor, &config, &request);
    }

    if let Err(e) = interactive_loop(&processor, &config, &shutdown_signal) {
        warn!("程式錯誤: {e:#}");
        eprintln!("{} {e:#}", style(t!("cli.error_prefix")).red().bold());
        return Err(e);
    }

    println!("\n{}", style(t!("cli.goodbye")).green().bold());
    info!("程式正常結束");
    Ok(())
}
