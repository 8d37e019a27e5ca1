use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::models::{PromptProfile, ProfileKind};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store read failed: {0}")]
    Read(String),
    #[error("invalid store document: {0}")]
    Document(String),
}

/// Read side of the settings store that holds administrator-edited profiles.
/// Values are returned raw so that a malformed entry can be told apart from a
/// failed read.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get_profile(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError>;
}

/// Profile store held in memory, keyed by settings key (`ai_prompt_<kind>`).
#[derive(Default)]
pub struct InMemoryProfileStore {
    entries: RwLock<HashMap<String, serde_json::Value>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self { Self::default() }

    /// Loads a JSON object mapping settings keys to profile documents.
    pub fn from_json_str(json: &str) -> Result<Self, StoreError> {
        let parsed: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| StoreError::Document(e.to_string()))?;
        let serde_json::Value::Object(map) = parsed else {
            return Err(StoreError::Document("expected a JSON object keyed by setting name".into()));
        };
        let store = Self::new();
        {
            let mut entries = store.entries.write();
            for (key, value) in map {
                entries.insert(key, value);
            }
        }
        info!("📚 Loaded {} stored prompt profiles", store.entries.read().len());
        Ok(store)
    }

    pub fn insert_profile(&self, kind: ProfileKind, profile: &PromptProfile) {
        // PromptProfile only holds strings and numbers, serialization cannot fail.
        if let Ok(value) = serde_json::to_value(profile) {
            self.insert_raw(kind.settings_key(), value);
        }
    }

    pub fn insert_raw(&self, key: impl Into<String>, value: serde_json::Value) {
        self.entries.write().insert(key.into(), value);
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get_profile(&self, key: &str) -> Result<Option<serde_json::Value>, StoreError> {
        Ok(self.entries.read().get(key).cloned())
    }
}

const PRODUCT_SYSTEM: &str = "You are an expert copywriter for a luxury kitchen and bath showroom. \
Write compelling, accurate product descriptions that highlight craftsmanship, materials and design. \
Never invent specifications that were not provided. Always respond with a single JSON object.";

const PROJECT_SYSTEM: &str = "You are an expert interior design writer creating portfolio descriptions \
for completed kitchen and bath projects. Describe the design vision, materials and the transformation \
achieved. Always respond with a single JSON object.";

const BLOG_SYSTEM: &str = "You are a content writer for a luxury home design blog. Write engaging, \
informative articles about kitchen and bath design trends, materials and renovation advice. \
Always respond with a single JSON object.";

const GENERAL_SYSTEM: &str = "You are a helpful marketing assistant for a luxury kitchen and bath \
retailer. Write polished, on-brand copy. Always respond with a single JSON object.";

/// Built-in profile used when the store has none for `kind`, or it is inactive.
pub fn builtin_profile(kind: ProfileKind, model: &str) -> PromptProfile {
    let (system, temperature, max_output_tokens) = match kind {
        ProfileKind::Product => (PRODUCT_SYSTEM, 0.7, 1000),
        ProfileKind::Project => (PROJECT_SYSTEM, 0.7, 1200),
        ProfileKind::Blog => (BLOG_SYSTEM, 0.8, 2000),
        ProfileKind::General => (GENERAL_SYSTEM, 0.7, 1000),
    };
    PromptProfile {
        system_instructions: system.to_string(),
        user_template: None,
        model: model.to_string(),
        temperature,
        max_output_tokens,
        is_active: true,
    }
}

/// Resolves the prompt profile for `kind`. Never fails: store errors and
/// malformed entries degrade to the built-in profile.
pub async fn resolve_profile(store: &dyn ProfileStore, kind: ProfileKind, default_model: &str) -> PromptProfile {
    let key = kind.settings_key();
    match store.get_profile(&key).await {
        Ok(Some(raw)) => match serde_json::from_value::<PromptProfile>(raw) {
            Ok(profile) if profile.is_active => {
                debug!(%key, model = %profile.model, "Using stored prompt profile");
                return profile;
            }
            Ok(_) => debug!(%key, "Stored prompt profile inactive, using built-in"),
            Err(e) => warn!(%key, error = %e, "Stored prompt profile malformed, using built-in"),
        },
        Ok(None) => debug!(%key, "No stored prompt profile, using built-in"),
        Err(e) => warn!(%key, error = %e, "⚠️ Prompt profile lookup failed, using built-in"),
    }
    builtin_profile(kind, default_model)
}
