pub mod file_type;
pub mod load;
pub mod save;
pub mod types;

pub use file_type::{MediaAsset, MediaKind};
pub use load::{Config, SETTINGS_FILE_NAME};
pub use save::{ensure_settings_file, save_settings};
pub use types::{
    BYTES_PER_MB, Language, ProbeFormat, ProcessingPolicy, TimeoutSettings, ToolSettings, ToolTimeouts,
    UserSettings, WatermarkSettings,
};
