mod command_resolver;
mod ffprobe_info;
mod file_tools;
mod font_locator;
mod header_validator;
mod media_tool;
mod process_runner;

pub use command_resolver::{FFMPEG, FFPROBE, executable_name, resolve_command};
pub use ffprobe_info::{
    ASSUMED_HEIGHT, ASSUMED_WIDTH, ProbeResult, parse_json_output, parse_line_output,
    parse_probe_output, probe_args,
};
pub use file_tools::{
    OutputGuard, append_to_file_name, file_size, file_stem_or, is_non_empty_file, parent_dir,
    remove_original, remove_quietly, timestamp_millis,
};
pub use font_locator::FontLocator;
pub use header_validator::{HEADER_WINDOW, has_recognized_header, head_snippet, is_recognized_header};
pub use media_tool::{FfmpegTool, MediaTool, ToolTask};
pub use process_runner::{LineClassifier, LineKind, OUTPUT_TAIL_LINES, ProcessRunner, RunOutcome};
