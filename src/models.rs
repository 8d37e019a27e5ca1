use serde::{Serialize, Deserialize};
use chrono::{DateTime, Utc};

/// Ordered `(key, value)` pairs. Iteration order is insertion order, which keeps
/// prompt assembly and fallback copy deterministic.
pub type Specifications = Vec<(String, String)>;

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProductSubject {
    pub name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
    #[serde(default)]
    pub specifications: Specifications,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
pub struct ProjectSubject {
    pub title: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub style: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub client_name: Option<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    #[serde(default)]
    pub specifications: Specifications,
    #[serde(default)]
    pub features: Vec<String>,
    #[serde(default)]
    pub description: Option<String>,
}

/// The record being described. Read-only for the duration of a generation call.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum GenerationSubject {
    Product(ProductSubject),
    Project(ProjectSubject),
}

impl GenerationSubject {
    pub fn name(&self) -> &str {
        match self {
            GenerationSubject::Product(p) => &p.name,
            GenerationSubject::Project(p) => &p.title,
        }
    }

    pub fn category(&self) -> Option<&str> {
        match self {
            GenerationSubject::Product(p) => p.category.as_deref(),
            GenerationSubject::Project(p) => p.category.as_deref(),
        }
    }

    /// Brand for products, design style for projects.
    pub fn brand(&self) -> Option<&str> {
        match self {
            GenerationSubject::Product(p) => p.brand.as_deref(),
            GenerationSubject::Project(p) => p.style.as_deref(),
        }
    }

    pub fn profile_kind(&self) -> ProfileKind {
        match self {
            GenerationSubject::Product(_) => ProfileKind::Product,
            GenerationSubject::Project(_) => ProfileKind::Project,
        }
    }
}

impl From<ProductSubject> for GenerationSubject {
    fn from(p: ProductSubject) -> Self { GenerationSubject::Product(p) }
}

impl From<ProjectSubject> for GenerationSubject {
    fn from(p: ProjectSubject) -> Self { GenerationSubject::Project(p) }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContentType {
    Short,
    Detailed,
    Seo,
    #[default]
    Luxury,
}

impl ContentType {
    pub fn label(&self) -> &'static str {
        match self {
            ContentType::Short => "concise",
            ContentType::Detailed => "detailed",
            ContentType::Seo => "SEO-optimized",
            ContentType::Luxury => "luxury",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Tone {
    Professional,
    #[default]
    Luxury,
    Technical,
    Friendly,
}

impl Tone {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tone::Professional => "professional",
            Tone::Luxury => "luxury",
            Tone::Technical => "technical",
            Tone::Friendly => "friendly",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Brief,
    #[default]
    Medium,
    Detailed,
}

impl Length {
    pub fn as_str(&self) -> &'static str {
        match self {
            Length::Brief => "brief",
            Length::Medium => "medium",
            Length::Detailed => "detailed",
        }
    }

    /// Word-count guideline echoed into the default prompt.
    pub fn word_range(&self) -> &'static str {
        match self {
            Length::Brief => "50-100",
            Length::Medium => "100-200",
            Length::Detailed => "200-300",
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GenerationOptions {
    pub content_type: ContentType,
    pub tone: Tone,
    pub length: Length,
    pub include_features: bool,
    pub include_benefits: bool,
    pub seo_keywords: Vec<String>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            content_type: ContentType::Luxury,
            tone: Tone::Luxury,
            length: Length::Medium,
            include_features: true,
            include_benefits: true,
            seo_keywords: Vec::new(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ProfileKind {
    Product,
    Project,
    Blog,
    General,
}

impl ProfileKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProfileKind::Product => "product",
            ProfileKind::Project => "project",
            ProfileKind::Blog => "blog",
            ProfileKind::General => "general",
        }
    }

    /// Key under which the configuration store holds this profile.
    pub fn settings_key(&self) -> String {
        format!("ai_prompt_{}", self.as_str())
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct PromptProfile {
    #[serde(rename = "system_prompt", alias = "systemPrompt", alias = "system_instructions")]
    pub system_instructions: String,
    #[serde(default, rename = "user_prompt_template", alias = "userPromptTemplate", alias = "user_template")]
    pub user_template: Option<String>,
    pub model: String,
    pub temperature: f32,
    #[serde(rename = "max_tokens", alias = "maxTokens", alias = "max_output_tokens")]
    pub max_output_tokens: u32,
    #[serde(default = "default_active", alias = "isActive")]
    pub is_active: bool,
}

fn default_active() -> bool { true }

/// Where the copy in a result came from.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ContentSource {
    Ai,
    Fallback,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GenerationResult {
    pub description: String,
    pub seo_title: Option<String>,
    pub seo_description: Option<String>,
    pub highlights: Option<Vec<String>>,
    /// Score reported by the model, or the fixed fallback score.
    pub quality_score: u8,
    pub word_count: usize,
    /// Heuristic score computed locally on every result.
    pub audit_score: u8,
    pub source: ContentSource,
    pub generated_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchOutcome {
    pub subject_name: String,
    pub success: bool,
    pub result: Option<GenerationResult>,
    pub error: Option<String>,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
pub struct EngineStatus {
    pub configured: bool,
    pub available: bool,
    pub model: String,
    pub message: String,
}

pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_default_options() {
        let opts = GenerationOptions::default();
        assert_eq!(opts.content_type, ContentType::Luxury);
        assert_eq!(opts.tone, Tone::Luxury);
        assert_eq!(opts.length, Length::Medium);
        assert!(opts.include_features);
        assert!(opts.include_benefits);
        assert!(opts.seo_keywords.is_empty());
    }

    #[test]
    fn test_word_count_ignores_extra_whitespace() {
        assert_eq!(word_count("  one\ttwo\n\nthree  "), 3);
        assert_eq!(word_count(""), 0);
    }

    #[test]
    fn test_settings_key() {
        assert_eq!(ProfileKind::Product.settings_key(), "ai_prompt_product");
        assert_eq!(ProfileKind::General.settings_key(), "ai_prompt_general");
    }

    #[test]
    fn test_subject_deserializes_from_tagged_json() {
        let json = r#"{"kind":"product","name":"Wolf Range","brand":"Wolf","specifications":[["Width","36 in"]]}"#;
        let subject: GenerationSubject = serde_json::from_str(json).unwrap();
        assert_eq!(subject.name(), "Wolf Range");
        assert_eq!(subject.brand(), Some("Wolf"));
        assert_eq!(subject.profile_kind(), ProfileKind::Product);
    }

    #[test]
    fn test_project_brand_is_style() {
        let subject: GenerationSubject = ProjectSubject {
            title: "Lakeside Kitchen".into(),
            style: Some("Transitional".into()),
            ..Default::default()
        }.into();
        assert_eq!(subject.name(), "Lakeside Kitchen");
        assert_eq!(subject.brand(), Some("Transitional"));
    }

    #[test]
    fn test_profile_accepts_camel_case_aliases() {
        let json = r#"{"systemPrompt":"sys","userPromptTemplate":"Hi {name}","model":"m","temperature":0.5,"maxTokens":300,"isActive":false}"#;
        let profile: PromptProfile = serde_json::from_str(json).unwrap();
        assert_eq!(profile.user_template.as_deref(), Some("Hi {name}"));
        assert_eq!(profile.max_output_tokens, 300);
        assert!(!profile.is_active);
    }
}
