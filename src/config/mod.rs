//! Layered configuration
//!
//! Layers, lowest precedence first:
//! 1. Built-in defaults
//! 2. User config (`~/.config/holiday-sync/config.toml`)
//! 3. `--config <file>`, or `./holiday-sync.toml` when present
//! 4. Command-line flags

mod defaults;
mod merge;
mod settings;

pub use defaults::{builtin_layer, DEFAULT_STORE_PATH};
pub use merge::{deep_merge, merge_layers};
pub use settings::{
    ConfigError, ConfigOrigin, ConfigSource, LoadOptions, OutputFormat, Settings, StoreSettings,
    LOCAL_CONFIG_FILE,
};
