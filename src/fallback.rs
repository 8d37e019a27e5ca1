use chrono::Utc;
use tracing::info;

use crate::config::DEFAULT_SITE_NAME;
use crate::models::{word_count, ContentSource, GenerationResult, GenerationSubject, ProductSubject, ProjectSubject};
use crate::quality;

pub const PRODUCT_FALLBACK_SCORE: u8 = 65;
pub const PROJECT_FALLBACK_SCORE: u8 = 70;

const SEO_TITLE_MAX: usize = 60;
const SEO_DESCRIPTION_MAX: usize = 160;
const ELLIPSIS: &str = "...";

const DEFAULT_PROJECT_HIGHLIGHTS: [&str; 3] = [
    "Custom design tailored to the homeowner's lifestyle",
    "Premium materials and finishes throughout",
    "Expert craftsmanship from concept to completion",
];

#[derive(Debug, Clone)]
pub struct FallbackGenerator {
    site_name: String,
}

impl Default for FallbackGenerator {
    fn default() -> Self { Self::new(DEFAULT_SITE_NAME) }
}

impl FallbackGenerator {
    pub fn new(site_name: impl Into<String>) -> Self {
        Self { site_name: site_name.into() }
    }

    pub fn generate_fallback(&self, subject: &GenerationSubject) -> GenerationResult {
        info!("📦 Generating template copy for '{}'", subject.name());
        let (description, seo_title, seo_description, highlights, quality_score) = match subject {
            GenerationSubject::Product(p) => {
                let description = product_description(p);
                let seo_title = seo_title(&product_title_head(p), &self.site_name);
                let seo_description = truncate_with_ellipsis(&product_seo_description(p, &self.site_name), SEO_DESCRIPTION_MAX);
                (description, seo_title, seo_description, None, PRODUCT_FALLBACK_SCORE)
            }
            GenerationSubject::Project(p) => {
                let description = project_description(p);
                let seo_title = seo_title(p.title.trim(), &self.site_name);
                let seo_description = truncate_with_ellipsis(&project_seo_description(p, &self.site_name), SEO_DESCRIPTION_MAX);
                (description, seo_title, seo_description, Some(project_highlights(p)), PROJECT_FALLBACK_SCORE)
            }
        };

        GenerationResult {
            word_count: word_count(&description),
            audit_score: quality::score(&description, subject),
            description,
            seo_title: Some(seo_title),
            seo_description: Some(seo_description),
            highlights,
            quality_score,
            source: ContentSource::Fallback,
            generated_at: Utc::now(),
        }
    }
}

pub fn price_tier(price: f64) -> &'static str {
    if price < 500.0 {
        "Premium"
    } else if price < 1500.0 {
        "Luxury"
    } else if price < 5000.0 {
        "Ultra-Luxury"
    } else {
        "Exclusive Collection"
    }
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn product_description(p: &ProductSubject) -> String {
    let name = p.name.trim();
    let mut intro = format!("Discover the {name}");
    if let Some(brand) = present(&p.brand) {
        intro.push_str(&format!(" by {brand}"));
    }
    match present(&p.category) {
        Some(category) => intro.push_str(&format!(", a refined addition to our {} collection.", category.to_lowercase())),
        None => intro.push_str(", a refined addition to any home."),
    }

    let mut sentences = vec![intro];
    let specs: Vec<String> = p.specifications.iter().take(3).map(|(k, v)| format!("{k}: {v}")).collect();
    if !specs.is_empty() {
        sentences.push(format!("Key specifications include {}.", join_natural(&specs)));
    }
    sentences.push("Crafted with meticulous attention to detail, it brings together enduring quality and exceptional craftsmanship.".to_string());
    if let Some(price) = p.price {
        sentences.push(format!("Offered as part of our {} tier.", price_tier(price)));
    }
    sentences.join(" ")
}

fn product_title_head(p: &ProductSubject) -> String {
    let name = p.name.trim();
    match (present(&p.brand), present(&p.category)) {
        (Some(brand), _) => format!("{name} - {brand}"),
        (None, Some(category)) => format!("{name} - {category}"),
        (None, None) => name.to_string(),
    }
}

fn product_seo_description(p: &ProductSubject, site_name: &str) -> String {
    let mut text = format!("Shop the {}", p.name.trim());
    if let Some(brand) = present(&p.brand) {
        text.push_str(&format!(" by {brand}"));
    }
    if let Some(category) = present(&p.category) {
        text.push_str(&format!(" in {}", category.to_lowercase()));
    }
    text.push_str(&format!(" at {site_name}. Premium quality and expert guidance for your kitchen and bath."));
    text
}

fn project_description(p: &ProjectSubject) -> String {
    let title = p.title.trim();
    let descriptor: Vec<&str> = [present(&p.style), present(&p.category)].into_iter().flatten().collect();
    let descriptor = if descriptor.is_empty() { "design".to_string() } else { descriptor.join(" ").to_lowercase() };

    let mut opening = format!("{title} is {} {descriptor} project", article(&descriptor));
    if let Some(location) = present(&p.location) {
        opening.push_str(&format!(" in {location}"));
    }
    if let Some(client) = present(&p.client_name) {
        if !client.to_lowercase().contains("client") {
            opening.push_str(&format!(" completed for {client}"));
        }
    }
    opening.push('.');

    let closing = match present(&p.style) {
        Some(style) => format!("The {} design pairs thoughtful planning with exceptional craftsmanship, creating a space that is both beautiful and functional.", style.to_lowercase()),
        None => "Thoughtful planning and exceptional craftsmanship create a space that is both beautiful and functional.".to_string(),
    };
    format!("{opening} {closing}")
}

fn project_seo_description(p: &ProjectSubject, site_name: &str) -> String {
    let mut text = format!("Explore {}", p.title.trim());
    let descriptor: Vec<&str> = [present(&p.style), present(&p.category)].into_iter().flatten().collect();
    if !descriptor.is_empty() {
        let descriptor = descriptor.join(" ").to_lowercase();
        text.push_str(&format!(", {} {descriptor} project", article(&descriptor)));
    }
    if let Some(location) = present(&p.location) {
        text.push_str(&format!(" in {location}"));
    }
    format!("{}. Designed and built by {site_name}.", text.trim_end_matches('.'))
}

fn project_highlights(p: &ProjectSubject) -> Vec<String> {
    let features: Vec<String> = p.features.iter()
        .map(|f| f.trim())
        .filter(|f| !f.is_empty())
        .take(3)
        .map(str::to_string)
        .collect();
    if features.is_empty() {
        DEFAULT_PROJECT_HIGHLIGHTS.iter().map(|s| s.to_string()).collect()
    } else {
        features
    }
}

// Shortens the head, not the site suffix.
fn seo_title(head: &str, site_name: &str) -> String {
    let suffix = format!(" | {site_name}");
    let full = format!("{head}{suffix}");
    if full.chars().count() <= SEO_TITLE_MAX {
        return full;
    }
    let room = SEO_TITLE_MAX.saturating_sub(suffix.chars().count());
    if room <= ELLIPSIS.len() {
        return truncate_with_ellipsis(&full, SEO_TITLE_MAX);
    }
    format!("{}{suffix}", truncate_with_ellipsis(head, room))
}

pub fn truncate_with_ellipsis(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let keep = max.saturating_sub(ELLIPSIS.len());
    let head: String = text.chars().take(keep).collect();
    format!("{}{ELLIPSIS}", head.trim_end())
}

fn join_natural(items: &[String]) -> String {
    match items {
        [] => String::new(),
        [one] => one.clone(),
        [a, b] => format!("{a} and {b}"),
        [rest @ .., last] => format!("{}, and {last}", rest.join(", ")),
    }
}

fn article(word: &str) -> &'static str {
    match word.chars().next().map(|c| c.to_ascii_lowercase()) {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    }
}
