use std::fmt::Write;

use crate::models::{GenerationOptions, GenerationSubject, ProductSubject, ProjectSubject, PromptProfile, Specifications};

/// Renders the user message for one generation call. Pure and deterministic.
pub fn build_prompt(subject: &GenerationSubject, options: &GenerationOptions, profile: &PromptProfile) -> String {
    match profile.user_template.as_deref() {
        Some(template) => render_template(template, subject, options),
        None => build_default_prompt(subject, options),
    }
}

/// Single-pass `{placeholder}` substitution. Known placeholders without a value
/// become empty; unknown ones are left as written. Substituted values are never
/// rescanned.
pub fn render_template(template: &str, subject: &GenerationSubject, options: &GenerationOptions) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find(['{', '}']) {
            Some(close) if after.as_bytes()[close] == b'}' => {
                let key = &after[..close];
                match placeholder_value(key, subject, options) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(key);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            _ => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn placeholder_value(key: &str, subject: &GenerationSubject, options: &GenerationOptions) -> Option<String> {
    let value = match key {
        "tone" => options.tone.as_str().to_string(),
        "length" => options.length.as_str().to_string(),
        _ => match subject {
            GenerationSubject::Product(p) => product_placeholder(key, p)?,
            GenerationSubject::Project(p) => project_placeholder(key, p)?,
        },
    };
    Some(value)
}

fn product_placeholder(key: &str, p: &ProductSubject) -> Option<String> {
    let value = match key {
        "name" | "title" => p.name.clone(),
        "category" => p.category.clone().unwrap_or_default(),
        "brand" => p.brand.clone().unwrap_or_default(),
        "price" => p.price.map(format_amount).unwrap_or_default(),
        "specifications" => join_specs(&p.specifications),
        "tags" => p.tags.join(", "),
        "style" | "location" | "clientName" | "features" => String::new(),
        _ => return None,
    };
    Some(value)
}

fn project_placeholder(key: &str, p: &ProjectSubject) -> Option<String> {
    let value = match key {
        "title" | "name" => p.title.clone(),
        "category" => p.category.clone().unwrap_or_default(),
        "style" => p.style.clone().unwrap_or_default(),
        "location" => p.location.clone().unwrap_or_default(),
        "clientName" => p.client_name.clone().unwrap_or_default(),
        "features" => p.features.join(", "),
        "price" => p.budget.map(format_amount).unwrap_or_default(),
        "specifications" => join_specs(&p.specifications),
        "brand" | "tags" => String::new(),
        _ => return None,
    };
    Some(value)
}

fn join_specs(specs: &Specifications) -> String {
    specs.iter().map(|(k, v)| format!("{k}: {v}")).collect::<Vec<_>>().join(", ")
}

pub(crate) fn format_amount(amount: f64) -> String {
    format!("{amount}")
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn build_default_prompt(subject: &GenerationSubject, options: &GenerationOptions) -> String {
    let mut out = String::new();
    // Writing into a String is infallible.
    match subject {
        GenerationSubject::Product(p) => {
            let _ = writeln!(out, "Write a {} product description for the following home design product.", options.content_type.label());
            out.push('\n');
            let _ = writeln!(out, "Product Name: {}", p.name);
            if let Some(category) = present(&p.category) { let _ = writeln!(out, "Category: {category}"); }
            if let Some(brand) = present(&p.brand) { let _ = writeln!(out, "Brand: {brand}"); }
            if let Some(price) = p.price { let _ = writeln!(out, "Price: ${}", format_amount(price)); }
            push_specs(&mut out, &p.specifications);
            push_list(&mut out, "Tags", &p.tags);
            push_reference(&mut out, &p.description);
        }
        GenerationSubject::Project(p) => {
            let _ = writeln!(out, "Write a {} portfolio description for the following design project.", options.content_type.label());
            out.push('\n');
            let _ = writeln!(out, "Project Title: {}", p.title);
            if let Some(category) = present(&p.category) { let _ = writeln!(out, "Category: {category}"); }
            if let Some(style) = present(&p.style) { let _ = writeln!(out, "Style: {style}"); }
            if let Some(location) = present(&p.location) { let _ = writeln!(out, "Location: {location}"); }
            if let Some(client) = present(&p.client_name) { let _ = writeln!(out, "Client: {client}"); }
            if let Some(budget) = p.budget { let _ = writeln!(out, "Budget: ${}", format_amount(budget)); }
            push_specs(&mut out, &p.specifications);
            push_list(&mut out, "Features", &p.features);
            push_reference(&mut out, &p.description);
        }
    }

    out.push_str("\nRequirements:\n");
    let _ = writeln!(out, "- Tone: {}", options.tone.as_str());
    let _ = writeln!(out, "- Length: {} words", options.length.word_range());
    let _ = writeln!(out, "- Include key features: {}", yes_no(options.include_features));
    let _ = writeln!(out, "- Highlight customer benefits: {}", yes_no(options.include_benefits));
    if !options.seo_keywords.is_empty() {
        let _ = writeln!(out, "- Naturally include these SEO keywords: {}", options.seo_keywords.join(", "));
    }
    out.push_str(
        "\nRespond with a JSON object with these fields: \"description\" (string), \"seoTitle\" (max 60 characters), \
\"seoDescription\" (max 160 characters), \"highlights\" (array of 3-5 short strings), \
\"quality_score\" (integer 0-100), \"word_count\" (integer).",
    );
    out
}

fn push_specs(out: &mut String, specs: &Specifications) {
    if specs.is_empty() {
        return;
    }
    out.push_str("\nSpecifications:\n");
    for (key, value) in specs {
        let _ = writeln!(out, "- {key}: {value}");
    }
}

fn push_list(out: &mut String, label: &str, items: &[String]) {
    if !items.is_empty() {
        let _ = writeln!(out, "\n{label}: {}", items.join(", "));
    }
}

fn push_reference(out: &mut String, existing: &Option<String>) {
    if let Some(existing) = present(existing) {
        let _ = writeln!(out, "\nExisting description for reference:\n{existing}");
    }
}

fn yes_no(flag: bool) -> &'static str { if flag { "yes" } else { "no" } }
