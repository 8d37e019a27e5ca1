use std::sync::Arc;

use chrono::Utc;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::client::{GenerationService, OpenAiClient, ServiceError};
use crate::config::EngineConfig;
use crate::fallback::FallbackGenerator;
use crate::models::{
    word_count, BatchOutcome, ContentSource, EngineStatus, GenerationOptions, GenerationResult, GenerationSubject,
    ProductSubject, ProjectSubject,
};
use crate::profiles::{resolve_profile, ProfileStore};
use crate::prompt::build_prompt;
use crate::quality;

/// Quality score assumed when the model omits `quality_score`.
pub const DEFAULT_AI_QUALITY_SCORE: u8 = 75;

/// Failures the engine does not absorb. Unavailability and recoverable service
/// errors never surface here; they produce fallback copy instead.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("AI generation failed: {0}")]
    Service(#[from] ServiceError),
}

pub struct ContentEngine {
    config: EngineConfig,
    service: Arc<dyn GenerationService>,
    profiles: Arc<dyn ProfileStore>,
    fallback: FallbackGenerator,
}

impl ContentEngine {
    pub fn new(config: EngineConfig, service: Arc<dyn GenerationService>, profiles: Arc<dyn ProfileStore>) -> Self {
        let fallback = FallbackGenerator::new(config.site_name.clone());
        Self { config, service, profiles, fallback }
    }

    /// Builds an engine backed by the OpenAI-compatible HTTP client.
    pub fn from_config(config: EngineConfig, profiles: Arc<dyn ProfileStore>) -> Result<Self, ServiceError> {
        let service = Arc::new(OpenAiClient::from_config(&config)?);
        Ok(Self::new(config, service, profiles))
    }

    /// Synchronous, side-effect free; lets the UI pick its labeling.
    pub fn status(&self) -> EngineStatus {
        let configured = self.config.is_ai_configured();
        let message = if configured {
            format!("AI content generation is available using {}", self.config.model)
        } else {
            "AI service is not configured; descriptions will use template-based generation".to_string()
        };
        EngineStatus { configured, available: configured, model: self.config.model.clone(), message }
    }

    pub async fn generate_for_product(&self, product: &ProductSubject, options: &GenerationOptions) -> Result<GenerationResult, GenerationError> {
        self.generate(&GenerationSubject::Product(product.clone()), options).await
    }

    pub async fn generate_for_project(&self, project: &ProjectSubject, options: &GenerationOptions) -> Result<GenerationResult, GenerationError> {
        self.generate(&GenerationSubject::Project(project.clone()), options).await
    }

    pub async fn generate(&self, subject: &GenerationSubject, options: &GenerationOptions) -> Result<GenerationResult, GenerationError> {
        if !self.config.is_ai_configured() {
            info!("AI service not configured, using template copy for '{}'", subject.name());
            return Ok(self.fallback.generate_fallback(subject));
        }

        let profile = resolve_profile(self.profiles.as_ref(), subject.profile_kind(), &self.config.model).await;
        let prompt = build_prompt(subject, options, &profile);
        info!("🎯 Generating {} copy for '{}' with {}", subject.profile_kind().as_str(), subject.name(), profile.model);

        let raw = match self.service
            .complete(&profile.system_instructions, &prompt, &profile.model, profile.temperature, profile.max_output_tokens)
            .await
        {
            Ok(raw) => raw,
            Err(e) if e.is_recoverable() => {
                warn!("🔄 AI service unavailable for '{}' ({}), falling back to template copy", subject.name(), e);
                return Ok(self.fallback.generate_fallback(subject));
            }
            Err(e) => {
                error!("❌ AI generation failed for '{}': {}", subject.name(), e);
                return Err(e.into());
            }
        };

        match decode_ai_content(&raw) {
            Ok(content) => {
                let result = content.into_result(subject);
                info!("✅ Generated {} words for '{}' (quality {})", result.word_count, subject.name(), result.quality_score);
                Ok(result)
            }
            Err(reason) => {
                warn!("🔄 Malformed AI response for '{}' ({}), falling back to template copy", subject.name(), reason);
                Ok(self.fallback.generate_fallback(subject))
            }
        }
    }

    pub async fn generate_batch(&self, subjects: &[GenerationSubject], options: &GenerationOptions) -> Vec<BatchOutcome> {
        self.generate_batch_with_progress(subjects, options, |_, _| {}).await
    }

    /// Generates copy for each subject in order, one at a time. A fatal error
    /// on one subject is recorded in its outcome and the batch carries on.
    /// `on_progress(completed, total)` runs after every item.
    pub async fn generate_batch_with_progress<F>(&self, subjects: &[GenerationSubject], options: &GenerationOptions, mut on_progress: F) -> Vec<BatchOutcome>
    where
        F: FnMut(usize, usize),
    {
        let total = subjects.len();
        info!("🚀 Starting batch generation for {} subjects", total);
        let mut outcomes = Vec::with_capacity(total);

        for (i, subject) in subjects.iter().enumerate() {
            let outcome = match self.generate(subject, options).await {
                Ok(result) => BatchOutcome {
                    subject_name: subject.name().to_string(),
                    success: true,
                    result: Some(result),
                    error: None,
                },
                Err(e) => {
                    error!("❌ Batch item {}/{} ('{}') failed: {}", i + 1, total, subject.name(), e);
                    BatchOutcome {
                        subject_name: subject.name().to_string(),
                        success: false,
                        result: None,
                        error: Some(e.to_string()),
                    }
                }
            };
            outcomes.push(outcome);
            on_progress(i + 1, total);

            if i + 1 < total && !self.config.batch_delay.is_zero() {
                tokio::time::sleep(self.config.batch_delay).await;
            }
        }

        let succeeded = outcomes.iter().filter(|o| o.success).count();
        info!("✅ Batch finished: {}/{} succeeded", succeeded, total);
        outcomes
    }
}

// --- Response Contract ---

#[derive(Debug, Deserialize)]
struct AiContent {
    description: String,
    #[serde(default, rename = "seoTitle", alias = "seo_title")]
    seo_title: Option<String>,
    #[serde(default, rename = "seoDescription", alias = "seo_description")]
    seo_description: Option<String>,
    #[serde(default)]
    highlights: Option<Vec<String>>,
    #[serde(default, alias = "qualityScore")]
    quality_score: Option<f64>,
    #[serde(default, alias = "wordCount")]
    word_count: Option<serde_json::Value>,
}

// Any shape mismatch is a malformed response.
fn decode_ai_content(raw: &str) -> Result<AiContent, String> {
    let content: AiContent = serde_json::from_str(raw.trim()).map_err(|e| format!("invalid JSON: {e}"))?;
    if content.description.trim().is_empty() {
        return Err("description is empty".into());
    }
    if let Some(score) = content.quality_score {
        if !score.is_finite() {
            return Err("quality_score is not a finite number".into());
        }
    }
    Ok(content)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

impl AiContent {
    fn into_result(self, subject: &GenerationSubject) -> GenerationResult {
        let description = self.description.trim().to_string();
        let counted = word_count(&description);
        // Advisory only; any shape the model sends is accepted and recounted.
        if let Some(reported) = self.word_count {
            if reported.as_f64() != Some(counted as f64) {
                debug!(%reported, counted, "Model word_count disagrees with description, using counted value");
            }
        }
        let quality_score = self.quality_score
            .map(|s| s.round().clamp(0.0, 100.0) as u8)
            .unwrap_or(DEFAULT_AI_QUALITY_SCORE);
        let highlights = self.highlights
            .map(|h| h.into_iter().map(|s| s.trim().to_string()).filter(|s| !s.is_empty()).collect::<Vec<_>>())
            .filter(|h| !h.is_empty());

        GenerationResult {
            audit_score: quality::score(&description, subject),
            word_count: counted,
            description,
            seo_title: non_blank(self.seo_title),
            seo_description: non_blank(self.seo_description),
            highlights,
            quality_score,
            source: ContentSource::Ai,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiles::InMemoryProfileStore;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    type Reply = Box<dyn Fn(&str) -> Result<String, ServiceError> + Send + Sync>;

    struct ScriptedService {
        reply: Reply,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedService {
        fn new(reply: impl Fn(&str) -> Result<String, ServiceError> + Send + Sync + 'static) -> Arc<Self> {
            Arc::new(Self { reply: Box::new(reply), prompts: Mutex::new(Vec::new()) })
        }

        fn calls(&self) -> usize { self.prompts.lock().len() }
    }

    #[async_trait]
    impl GenerationService for ScriptedService {
        async fn complete(&self, _system: &str, user: &str, _model: &str, _temperature: f32, _max_tokens: u32) -> Result<String, ServiceError> {
            self.prompts.lock().push(user.to_string());
            (self.reply)(user)
        }
    }

    fn configured() -> EngineConfig {
        EngineConfig {
            api_key: Some("sk-proj-4f9aQ2mZr8TtW1bLk0cV".into()),
            batch_delay: Duration::ZERO,
            ..Default::default()
        }
    }

    fn engine(config: EngineConfig, service: Arc<ScriptedService>) -> ContentEngine {
        ContentEngine::new(config, service, Arc::new(InMemoryProfileStore::new()))
    }

    fn marble_island() -> ProductSubject {
        ProductSubject {
            name: "Marble Island".into(),
            brand: Some("North Bay".into()),
            category: Some("Countertops".into()),
            price: Some(4500.0),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_unconfigured_engine_skips_service() {
        let service = ScriptedService::new(|_| Ok("{}".into()));
        let engine = engine(EngineConfig { batch_delay: Duration::ZERO, ..Default::default() }, service.clone());
        let result = engine.generate_for_product(&marble_island(), &GenerationOptions::default()).await.unwrap();
        assert_eq!(service.calls(), 0);
        assert_eq!(result.source, ContentSource::Fallback);
        assert_eq!(result.quality_score, 65);
    }

    #[tokio::test]
    async fn test_ai_response_mapped() {
        let service = ScriptedService::new(|_| Ok(r#"{
            "description": "An exquisite Marble Island by North Bay.",
            "seoTitle": "Marble Island",
            "seo_description": "Shop it",
            "highlights": ["Honed finish", " "],
            "quality_score": 88.6,
            "word_count": 999
        }"#.into()));
        let engine = engine(configured(), service.clone());
        let result = engine.generate_for_product(&marble_island(), &GenerationOptions::default()).await.unwrap();
        assert_eq!(service.calls(), 1);
        assert_eq!(result.source, ContentSource::Ai);
        assert_eq!(result.seo_title.as_deref(), Some("Marble Island"));
        assert_eq!(result.seo_description.as_deref(), Some("Shop it"));
        assert_eq!(result.highlights, Some(vec!["Honed finish".to_string()]));
        assert_eq!(result.quality_score, 89);
        assert_eq!(result.word_count, 7);
    }

    #[tokio::test]
    async fn test_missing_quality_score_defaults_to_75() {
        let service = ScriptedService::new(|_| Ok(r#"{"description":"A fine range."}"#.into()));
        let result = engine(configured(), service).generate_for_product(&marble_island(), &GenerationOptions::default()).await.unwrap();
        assert_eq!(result.quality_score, DEFAULT_AI_QUALITY_SCORE);
        assert_eq!(result.word_count, 3);
    }

    #[tokio::test]
    async fn test_loose_word_count_does_not_reject_reply() {
        for reply in [
            r#"{"description":"A fine range.","word_count":3.0}"#,
            r#"{"description":"A fine range.","word_count":-4}"#,
            r#"{"description":"A fine range.","word_count":"120"}"#,
        ] {
            let service = ScriptedService::new(move |_| Ok(reply.to_string()));
            let result = engine(configured(), service).generate_for_product(&marble_island(), &GenerationOptions::default()).await.unwrap();
            assert_eq!(result.source, ContentSource::Ai, "reply: {reply}");
            assert_eq!(result.word_count, 3);
        }
    }

    #[tokio::test]
    async fn test_out_of_range_quality_score_clamped() {
        let service = ScriptedService::new(|_| Ok(r#"{"description":"A fine range.","quality_score":140}"#.into()));
        let result = engine(configured(), service).generate_for_product(&marble_island(), &GenerationOptions::default()).await.unwrap();
        assert_eq!(result.quality_score, 100);
    }

    #[tokio::test]
    async fn test_malformed_and_empty_responses_fall_back() {
        for reply in ["Sure! Here is your description.", r#"{"description":"   "}"#, r#"{"seoTitle":"x"}"#, r#"{"description":"ok","quality_score":"high"}"#] {
            let service = ScriptedService::new(move |_| Ok(reply.to_string()));
            let result = engine(configured(), service).generate_for_product(&marble_island(), &GenerationOptions::default()).await.unwrap();
            assert_eq!(result.source, ContentSource::Fallback, "reply: {reply}");
            assert_eq!(result.quality_score, 65);
        }
    }

    #[tokio::test]
    async fn test_auth_and_quota_errors_fall_back() {
        for status in [401, 429] {
            let service = ScriptedService::new(move |_| Err(crate::client::classify_status(status, "nope".into())));
            let project = ProjectSubject { title: "Lakeside Kitchen".into(), ..Default::default() };
            let result = engine(configured(), service).generate_for_project(&project, &GenerationOptions::default()).await.unwrap();
            assert_eq!(result.source, ContentSource::Fallback);
            assert_eq!(result.quality_score, 70);
        }
    }

    #[tokio::test]
    async fn test_fatal_error_propagates() {
        let service = ScriptedService::new(|_| Err(ServiceError::Http("connection reset by peer".into())));
        let err = engine(configured(), service).generate_for_product(&marble_island(), &GenerationOptions::default()).await.unwrap_err();
        assert!(err.to_string().contains("connection reset by peer"));
    }

    #[tokio::test]
    async fn test_batch_isolates_failures_and_reports_progress() {
        let service = ScriptedService::new(|prompt| {
            if prompt.contains("Broken Faucet") {
                Err(ServiceError::Api { status: 500, message: "internal error".into() })
            } else {
                Ok(r#"{"description":"Elegant piece.","quality_score":80}"#.into())
            }
        });
        let engine = engine(configured(), service);
        let subjects: Vec<GenerationSubject> = ["Sink", "Broken Faucet", "Tub"]
            .into_iter()
            .map(|name| ProductSubject { name: name.into(), ..Default::default() }.into())
            .collect();

        let mut progress = Vec::new();
        let outcomes = engine
            .generate_batch_with_progress(&subjects, &GenerationOptions::default(), |done, total| progress.push((done, total)))
            .await;

        assert_eq!(progress, vec![(1, 3), (2, 3), (3, 3)]);
        let names: Vec<_> = outcomes.iter().map(|o| o.subject_name.as_str()).collect();
        assert_eq!(names, vec!["Sink", "Broken Faucet", "Tub"]);
        assert!(outcomes[0].success && outcomes[2].success);
        assert!(!outcomes[1].success);
        assert!(outcomes[1].result.is_none());
        assert!(outcomes[1].error.as_deref().unwrap_or_default().contains("internal error"));
    }

    #[tokio::test]
    async fn test_empty_batch() {
        let service = ScriptedService::new(|_| Ok("{}".into()));
        let outcomes = engine(configured(), service).generate_batch(&[], &GenerationOptions::default()).await;
        assert!(outcomes.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_batch_paces_between_items_only() {
        let service = ScriptedService::new(|_| Ok(r#"{"description":"Fine."}"#.into()));
        let config = EngineConfig { batch_delay: Duration::from_millis(100), ..configured() };
        let engine = engine(config, service);
        let subjects: Vec<GenerationSubject> = (0..3)
            .map(|i| ProductSubject { name: format!("Item {i}"), ..Default::default() }.into())
            .collect();
        let start = tokio::time::Instant::now();
        engine.generate_batch(&subjects, &GenerationOptions::default()).await;
        let elapsed = start.elapsed();
        assert!(elapsed >= Duration::from_millis(200) && elapsed < Duration::from_millis(300), "{elapsed:?}");
    }

    #[test]
    fn test_status_reflects_configuration() {
        let service = ScriptedService::new(|_| Ok("{}".into()));
        let status = engine(configured(), service.clone()).status();
        assert!(status.configured && status.available);
        assert_eq!(status.model, "gpt-4o-mini");

        let status = engine(EngineConfig::default(), service).status();
        assert!(!status.configured && !status.available);
        assert!(status.message.contains("not configured"));
    }
}
