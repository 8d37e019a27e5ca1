use crate::models::{word_count, GenerationSubject};

const LUXURY_TERMS: &[&str] = &[
    "premium",
    "luxury",
    "elegant",
    "sophisticated",
    "craftsmanship",
    "exceptional",
    "exquisite",
];

/// Heuristic 0-100 score for marketing copy about `subject`. Works the same on
/// model output and fallback copy, so either can be audited.
pub fn score(description: &str, subject: &GenerationSubject) -> u8 {
    let text = description.to_lowercase();
    let mut total: u32 = 50;

    if (50..=300).contains(&word_count(description)) {
        total += 15;
    }
    if mentions(&text, Some(subject.name())) {
        total += 10;
    }
    if mentions(&text, subject.brand()) {
        total += 5;
    }
    if mentions(&text, subject.category()) {
        total += 5;
    }

    let vocabulary = LUXURY_TERMS.iter().filter(|term| text.contains(*term)).count() as u32;
    total += (vocabulary * 3).min(15);

    total.min(100) as u8
}

fn mentions(haystack_lower: &str, needle: Option<&str>) -> bool {
    match needle.map(str::trim) {
        Some(n) if !n.is_empty() => haystack_lower.contains(&n.to_lowercase()),
        _ => false,
    }
}
