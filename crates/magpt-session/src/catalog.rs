//! Model catalog cache and the model indicator

use std::sync::Arc;

use magpt_api::{ApiClient, ModelCatalog, ModelOption, DEFAULT_MODEL_LABEL};
use parking_lot::RwLock;
use tracing::{info, warn};

/// Catalog fetched once at startup; never invalidated
#[derive(Debug, Clone, Default)]
pub struct CatalogCache {
    inner: Arc<RwLock<Option<ModelCatalog>>>,
}

impl CatalogCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self) -> Option<ModelCatalog> {
        self.inner.read().clone()
    }

    pub fn set(&self, catalog: ModelCatalog) {
        *self.inner.write() = Some(catalog);
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.read().is_some()
    }

    /// Picker entries, or just the server default when nothing is loaded
    pub fn options(&self) -> Vec<ModelOption> {
        self.inner
            .read()
            .as_ref()
            .map(ModelCatalog::options)
            .unwrap_or_else(|| ModelCatalog::default().options())
    }

    /// Fetch the catalog; failures are logged and leave the cache empty
    pub async fn load(&self, api: &dyn ApiClient) -> bool {
        match api.list_models().await {
            Ok(Some(catalog)) => {
                info!("Loaded {} models", catalog.models.len());
                self.set(catalog);
                true
            }
            Ok(None) => false,
            Err(e) => {
                warn!("Failed to load models: {}", e);
                false
            }
        }
    }
}

/// Text and tooltip of the model indicator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelIndicator {
    pub text: String,
    pub tooltip: String,
}

/// Describe which model generations will use
pub fn model_indicator(selected: Option<&str>, catalog: Option<&ModelCatalog>) -> ModelIndicator {
    if let Some(id) = selected {
        let tooltip = catalog
            .and_then(|c| c.get(id))
            .and_then(|entry| entry.description.clone())
            .filter(|d| !d.is_empty())
            .unwrap_or_else(|| "Selected model".to_string());
        return ModelIndicator {
            text: format!("Model: {}", id),
            tooltip,
        };
    }

    match catalog.and_then(|c| c.active.as_deref()) {
        Some(active) => ModelIndicator {
            text: format!("Model: {} (API default)", active),
            tooltip: "Using API active model".to_string(),
        },
        None => ModelIndicator {
            text: format!("Model: {}", DEFAULT_MODEL_LABEL),
            tooltip: "Using API active model".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use magpt_api::ModelEntry;

    fn catalog() -> ModelCatalog {
        let mut catalog = ModelCatalog {
            active: Some("small".to_string()),
            ..ModelCatalog::default()
        };
        catalog.models.insert(
            "small".to_string(),
            ModelEntry {
                description: Some("Small (fast)".to_string()),
                disabled: false,
            },
        );
        catalog
    }

    #[test]
    fn test_indicator_for_selected_model() {
        let catalog = catalog();
        let indicator = model_indicator(Some("small"), Some(&catalog));
        assert_eq!(indicator.text, "Model: small");
        assert_eq!(indicator.tooltip, "Small (fast)");

        let indicator = model_indicator(Some("custom"), None);
        assert_eq!(indicator.text, "Model: custom");
        assert_eq!(indicator.tooltip, "Selected model");
    }

    #[test]
    fn test_indicator_for_server_default() {
        let catalog = catalog();
        assert_eq!(
            model_indicator(None, Some(&catalog)).text,
            "Model: small (API default)"
        );

        let indicator = model_indicator(None, None);
        assert_eq!(indicator.text, "Model: API Default");
        assert_eq!(indicator.tooltip, "Using API active model");
    }

    #[test]
    fn test_options_without_catalog() {
        let cache = CatalogCache::new();
        assert!(!cache.is_loaded());
        let options = cache.options();
        assert_eq!(options.len(), 1);
        assert_eq!(options[0].label, DEFAULT_MODEL_LABEL);

        cache.set(catalog());
        assert!(cache.is_loaded());
        assert_eq!(cache.options().len(), 2);
    }
}
