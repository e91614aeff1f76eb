//! magpt configuration
//!
//! Two layers of configuration live here:
//!
//! - **Preferences**: the user-facing chat settings (font, sampling
//!   parameters, API URL, model) persisted as a single JSON blob and owned by
//!   [`PreferenceStore`].
//! - **Client settings**: process-level knobs (storage directory, origin,
//!   log level) loaded from `magpt.toml` and `MAGPT_*` environment variables.

pub mod error;
pub mod preferences;
pub mod settings;
pub mod storage;
pub mod store;

pub use error::{ConfigError, Result};
pub use preferences::{
    Preferences, SettingChange, SettingKey, DEFAULT_FONT, LEGACY_FONT, LEGACY_FONT_REPLACEMENT,
    STORAGE_KEY,
};
pub use settings::{ClientSettings, SettingsLoader, DEFAULT_ORIGIN};
pub use storage::{FileStorage, MemoryStorage, Storage};
pub use store::{load_preferences, PreferenceStore};
