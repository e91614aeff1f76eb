//! User preferences and the settings changes that mutate them

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{ConfigError, Result};

/// Key the preference blob is stored under
pub const STORAGE_KEY: &str = "modernAssyrianGPTSettings";

/// Font used when nothing has been persisted
pub const DEFAULT_FONT: &str = "Noto Sans Syriac";

/// Font identifier written by older releases
pub const LEGACY_FONT: &str = "Ramsina";

/// Current name of the legacy font
pub const LEGACY_FONT_REPLACEMENT: &str = "Ramsina TestA";

/// Upper bound accepted for the sampling temperature
pub const MAX_TEMPERATURE: f64 = 2.0;

/// Chat preferences persisted between runs
///
/// Field names serialize in camelCase so the stored blob keeps the layout
/// older releases wrote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase", default)]
pub struct Preferences {
    /// Backend base URL (empty means same origin)
    pub api_url: String,
    /// Font family used for message text
    pub font: String,
    /// Font size in pixels
    pub font_size: u32,
    /// Sampling temperature
    pub temperature: f64,
    /// Maximum number of new tokens per generation
    pub max_tokens: u32,
    /// Top-k sampling cutoff
    pub top_k: u32,
    /// Selected model, `None` for the server default
    pub model_id: Option<String>,
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            api_url: String::new(),
            font: DEFAULT_FONT.to_string(),
            font_size: 16,
            temperature: 0.8,
            max_tokens: 50,
            top_k: 40,
            model_id: None,
        }
    }
}

impl Preferences {
    /// Overlay a persisted blob on top of the defaults.
    ///
    /// Each key is taken on its own: a value of the wrong type (older
    /// releases could save `null` for a number) keeps that field's default
    /// without discarding the rest. The legacy font migration runs afterwards.
    pub fn from_blob(blob: &str) -> Result<Self> {
        let persisted: Map<String, Value> = serde_json::from_str(blob)?;

        let mut merged = match serde_json::to_value(Preferences::default())? {
            Value::Object(map) => map,
            _ => Map::new(),
        };
        for (key, value) in persisted {
            let mut candidate = merged.clone();
            candidate.insert(key.clone(), value);
            match serde_json::from_value::<Preferences>(Value::Object(candidate.clone())) {
                Ok(_) => merged = candidate,
                Err(e) => warn!("Ignoring saved {}: {}", key, e),
            }
        }

        let mut prefs: Preferences = serde_json::from_value(Value::Object(merged))?;
        prefs.normalize();
        if prefs.migrate_legacy_font() {
            debug!("Migrated legacy font {} to {}", LEGACY_FONT, LEGACY_FONT_REPLACEMENT);
        }
        Ok(prefs)
    }

    /// Serialize the full preference object
    pub fn to_blob(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Rewrite the legacy font identifier. Returns true when a rewrite happened.
    pub fn migrate_legacy_font(&mut self) -> bool {
        if self.font == LEGACY_FONT {
            self.font = LEGACY_FONT_REPLACEMENT.to_string();
            true
        } else {
            false
        }
    }

    /// Whether a non-default model is selected
    pub fn has_model_override(&self) -> bool {
        self.model_id.is_some()
    }

    /// Apply a single settings change after validating it
    pub fn apply(&mut self, change: SettingChange) -> Result<()> {
        change.validate()?;
        match change {
            SettingChange::ApiUrl(url) => self.api_url = url.trim().to_string(),
            SettingChange::Font(font) => self.font = font,
            SettingChange::FontSize(size) => self.font_size = size,
            SettingChange::Temperature(temperature) => self.temperature = temperature,
            SettingChange::MaxTokens(tokens) => self.max_tokens = tokens,
            SettingChange::TopK(top_k) => self.top_k = top_k,
            SettingChange::Model(model) => self.model_id = model,
        }
        Ok(())
    }

    /// Validate every field
    pub fn validate(&self) -> Result<()> {
        SettingChange::ApiUrl(self.api_url.clone()).validate()?;
        SettingChange::Font(self.font.clone()).validate()?;
        SettingChange::FontSize(self.font_size).validate()?;
        SettingChange::Temperature(self.temperature).validate()?;
        SettingChange::MaxTokens(self.max_tokens).validate()?;
        SettingChange::TopK(self.top_k).validate()?;
        Ok(())
    }

    fn normalize(&mut self) {
        if matches!(self.model_id.as_deref(), Some(id) if id.trim().is_empty()) {
            self.model_id = None;
        }
    }
}

/// Which preference a settings action touches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    ApiUrl,
    Font,
    FontSize,
    Temperature,
    MaxTokens,
    TopK,
    Model,
}

impl SettingKey {
    /// All keys in display order
    pub const ALL: [SettingKey; 7] = [
        SettingKey::ApiUrl,
        SettingKey::Font,
        SettingKey::FontSize,
        SettingKey::Temperature,
        SettingKey::MaxTokens,
        SettingKey::TopK,
        SettingKey::Model,
    ];

    /// Name used on the command line
    pub fn name(&self) -> &'static str {
        match self {
            SettingKey::ApiUrl => "api-url",
            SettingKey::Font => "font",
            SettingKey::FontSize => "font-size",
            SettingKey::Temperature => "temperature",
            SettingKey::MaxTokens => "max-tokens",
            SettingKey::TopK => "top-k",
            SettingKey::Model => "model",
        }
    }

    /// Parse a key, accepting both kebab-case and the persisted camelCase names
    pub fn parse(name: &str) -> Result<Self> {
        match name.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "api-url" | "apiurl" | "url" => Ok(SettingKey::ApiUrl),
            "font" => Ok(SettingKey::Font),
            "font-size" | "fontsize" | "size" => Ok(SettingKey::FontSize),
            "temperature" | "temp" => Ok(SettingKey::Temperature),
            "max-tokens" | "maxtokens" => Ok(SettingKey::MaxTokens),
            "top-k" | "topk" => Ok(SettingKey::TopK),
            "model" | "model-id" | "modelid" => Ok(SettingKey::Model),
            _ => Err(ConfigError::UnknownSetting(name.to_string())),
        }
    }
}

impl fmt::Display for SettingKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A single user settings action
#[derive(Debug, Clone, PartialEq)]
pub enum SettingChange {
    ApiUrl(String),
    Font(String),
    FontSize(u32),
    Temperature(f64),
    MaxTokens(u32),
    TopK(u32),
    /// `None` selects the server default model
    Model(Option<String>),
}

impl SettingChange {
    /// Build a change from a key and its textual value
    pub fn parse(key: SettingKey, value: &str) -> Result<Self> {
        let value = value.trim();
        let change = match key {
            SettingKey::ApiUrl => SettingChange::ApiUrl(value.to_string()),
            SettingKey::Font => SettingChange::Font(value.to_string()),
            SettingKey::FontSize => SettingChange::FontSize(parse_number(key, value)?),
            SettingKey::Temperature => SettingChange::Temperature(parse_number(key, value)?),
            SettingKey::MaxTokens => SettingChange::MaxTokens(parse_number(key, value)?),
            SettingKey::TopK => SettingChange::TopK(parse_number(key, value)?),
            SettingKey::Model => {
                if value.is_empty() || value.eq_ignore_ascii_case("default") {
                    SettingChange::Model(None)
                } else {
                    SettingChange::Model(Some(value.to_string()))
                }
            }
        };
        change.validate()?;
        Ok(change)
    }

    /// The preference this change targets
    pub fn key(&self) -> SettingKey {
        match self {
            SettingChange::ApiUrl(_) => SettingKey::ApiUrl,
            SettingChange::Font(_) => SettingKey::Font,
            SettingChange::FontSize(_) => SettingKey::FontSize,
            SettingChange::Temperature(_) => SettingKey::Temperature,
            SettingChange::MaxTokens(_) => SettingKey::MaxTokens,
            SettingChange::TopK(_) => SettingKey::TopK,
            SettingChange::Model(_) => SettingKey::Model,
        }
    }

    /// Check the value is acceptable for its preference
    pub fn validate(&self) -> Result<()> {
        match self {
            SettingChange::ApiUrl(raw) => validate_api_url(raw),
            SettingChange::Font(font) if font.trim().is_empty() => Err(ConfigError::Validation(
                "Font name cannot be empty".to_string(),
            )),
            SettingChange::FontSize(0) => Err(ConfigError::Validation(
                "Font size must be greater than 0".to_string(),
            )),
            SettingChange::Temperature(t) if !t.is_finite() || *t < 0.0 || *t > MAX_TEMPERATURE => {
                Err(ConfigError::Validation(format!(
                    "Temperature must be between 0 and {}",
                    MAX_TEMPERATURE
                )))
            }
            SettingChange::MaxTokens(0) => Err(ConfigError::Validation(
                "Max tokens must be greater than 0".to_string(),
            )),
            SettingChange::TopK(0) => Err(ConfigError::Validation(
                "Top-k must be greater than 0".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

fn parse_number<T: std::str::FromStr>(key: SettingKey, value: &str) -> Result<T> {
    value.parse::<T>().map_err(|_| {
        warn!("Rejected non-numeric value for {}: {}", key, value);
        ConfigError::Validation(format!("{} expects a number, got '{}'", key, value))
    })
}

fn validate_api_url(raw: &str) -> Result<()> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(());
    }
    let parsed = url::Url::parse(raw)
        .map_err(|e| ConfigError::Validation(format!("Invalid API URL '{}': {}", raw, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        scheme => Err(ConfigError::Validation(format!(
            "API URL must use http or https, got {}",
            scheme
        ))),
    }
}
