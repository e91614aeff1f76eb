//! Request and response types for the generation backend

use indexmap::IndexMap;
use magpt_config::Preferences;
use serde::{Deserialize, Deserializer, Serialize};

/// Label of the "use the server's model" option
pub const DEFAULT_MODEL_LABEL: &str = "API Default";

/// Successful `/health` body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HealthStatus {
    /// Device the backend serves from (e.g. "cpu", "cuda")
    pub device: String,
}

/// A model the backend can serve
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelEntry {
    /// Human-readable description
    #[serde(default)]
    pub description: Option<String>,

    /// Listed but currently not servable
    #[serde(default)]
    pub disabled: bool,
}

/// `/models` body: the catalog of servable models
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ModelCatalog {
    /// Models keyed by identifier, in the order the backend lists them
    #[serde(default, deserialize_with = "null_as_empty")]
    pub models: IndexMap<String, ModelEntry>,

    /// Model the backend uses when none is requested
    #[serde(default)]
    pub active: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<IndexMap<String, ModelEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<IndexMap<String, ModelEntry>>::deserialize(deserializer)?.unwrap_or_default())
}

/// One entry of the model picker
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelOption {
    /// Model identifier, `None` for the server default
    pub id: Option<String>,
    /// Display label
    pub label: String,
    /// Shown but not selectable
    pub disabled: bool,
}

impl ModelCatalog {
    /// Look up a model
    pub fn get(&self, id: &str) -> Option<&ModelEntry> {
        self.models.get(id)
    }

    /// Whether `id` is listed and enabled
    pub fn is_selectable(&self, id: &str) -> bool {
        self.get(id).map(|m| !m.disabled).unwrap_or(false)
    }

    /// Description of a model, falling back to its identifier
    pub fn describe(&self, id: &str) -> String {
        self.get(id)
            .and_then(|m| m.description.clone())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| id.to_string())
    }

    /// Picker entries: the server default first, then every model
    pub fn options(&self) -> Vec<ModelOption> {
        let mut options = vec![ModelOption {
            id: None,
            label: DEFAULT_MODEL_LABEL.to_string(),
            disabled: false,
        }];

        for (id, entry) in &self.models {
            let mut label = self.describe(id);
            if entry.disabled {
                label.push_str(" (unavailable)");
            }
            options.push(ModelOption {
                id: Some(id.clone()),
                label,
                disabled: entry.disabled,
            });
        }

        options
    }
}

/// `/generate` request body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GenerateRequest {
    pub prompt: String,
    pub max_new_tokens: u32,
    pub temperature: f64,
    pub top_k: u32,
    /// Only sent when a non-default model is selected
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model_id: Option<String>,
}

impl GenerateRequest {
    /// Build a request from the prompt and current sampling preferences
    pub fn from_preferences(prompt: impl Into<String>, prefs: &Preferences) -> Self {
        Self {
            prompt: prompt.into(),
            max_new_tokens: prefs.max_tokens,
            temperature: prefs.temperature,
            top_k: prefs.top_k,
            model_id: prefs.model_id.clone(),
        }
    }
}

/// `/generate` success body
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct GenerateResponse {
    pub generated_text: String,
}

/// Backend performance figures after a generation
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(from = "MetricsPayload")]
pub struct GenerationMetrics {
    pub tokens_per_second: f64,
    pub last_latency_seconds: f64,
    pub total_generated_tokens: u64,
    pub active_model_id: String,
}

impl GenerationMetrics {
    /// One-line annotation shown under an assistant message
    pub fn summary(&self) -> String {
        format!(
            "🤖 {}  ⚡ {:.1} tok/s  ⏱️ {:.2}s  📊 {} total",
            self.active_model_id,
            self.tokens_per_second,
            self.last_latency_seconds,
            self.total_generated_tokens
        )
    }
}

/// `/metrics` wire shape; any field may be missing or null
#[derive(Debug, Default, Deserialize)]
struct MetricsPayload {
    #[serde(default)]
    avg_tokens_per_second: Option<f64>,
    #[serde(default)]
    last_request_latency: Option<f64>,
    #[serde(default)]
    total_generated_tokens: Option<u64>,
    #[serde(default)]
    active_model_id: Option<String>,
}

impl From<MetricsPayload> for GenerationMetrics {
    fn from(payload: MetricsPayload) -> Self {
        Self {
            tokens_per_second: payload.avg_tokens_per_second.unwrap_or(0.0),
            last_latency_seconds: payload.last_request_latency.unwrap_or(0.0),
            total_generated_tokens: payload.total_generated_tokens.unwrap_or(0),
            active_model_id: payload
                .active_model_id
                .filter(|id| !id.is_empty())
                .unwrap_or_else(|| "unknown".to_string()),
        }
    }
}
