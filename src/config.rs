use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_SITE_NAME: &str = "North Bay Kitchen & Bath";

/// Leading words of the sample values found in `.env` templates.
const PLACEHOLDER_PREFIXES: &[&str] = &["your", "placeholder", "replace", "insert", "changeme", "example", "demo", "test"];

/// Returns true when `key` looks like a real secret rather than an empty or
/// template value. This is the only place the "is AI configured" rule lives.
pub fn credential_is_usable(key: &str) -> bool {
    let key = key.trim();
    if key.len() < 20 || !key.starts_with("sk-") {
        return false;
    }
    !is_placeholder_body(&key[3..])
}

// Only the shape of the secret body is inspected, never arbitrary substrings,
// so random keys that happen to contain "demo" or "xxx" still count.
fn is_placeholder_body(body: &str) -> bool {
    let body = body.strip_prefix("proj-").unwrap_or(body).to_ascii_lowercase();
    let mut chars = body.chars().filter(|c| c.is_ascii_alphanumeric());
    let single_repeated_char = match chars.next() {
        Some(first) => chars.all(|c| c == first),
        None => true,
    };
    single_repeated_char
        || PLACEHOLDER_PREFIXES.iter().any(|p| body.starts_with(p))
        || body.ends_with("-here")
        || body.ends_with("_here")
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api_key: Option<String>,
    pub api_base: String,
    /// Model used by the built-in profiles and reported by engine status.
    pub model: String,
    pub batch_delay: Duration,
    pub request_timeout: Duration,
    /// Storefront name appended to fallback SEO titles.
    pub site_name: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_base: DEFAULT_API_BASE.to_string(),
            model: DEFAULT_MODEL.to_string(),
            batch_delay: Duration::from_millis(100),
            request_timeout: Duration::from_secs(60),
            site_name: DEFAULT_SITE_NAME.to_string(),
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    // Unparseable numbers keep their defaults.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let batch_delay = non_empty("AI_BATCH_DELAY_MS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.batch_delay);
        let request_timeout = non_empty("AI_REQUEST_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.request_timeout);

        Self {
            api_key: non_empty("OPENAI_API_KEY"),
            api_base: non_empty("OPENAI_API_BASE")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.api_base),
            model: non_empty("AI_MODEL").unwrap_or(defaults.model),
            batch_delay,
            request_timeout,
            site_name: non_empty("SITE_NAME").unwrap_or(defaults.site_name),
        }
    }

    pub fn is_ai_configured(&self) -> bool {
        self.api_key.as_deref().map(credential_is_usable).unwrap_or(false)
    }
}
