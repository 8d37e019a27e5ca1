use std::sync::Arc;

use anyhow::{bail, Context, Result};
use design_copy_engine::{
    ContentEngine, EngineConfig, GenerationOptions, GenerationSubject, InMemoryProfileStore, ProfileStore,
};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    // Init tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    fmt().with_env_filter(filter).with_writer(std::io::stderr).init();

    let mut args = std::env::args().skip(1);
    let Some(subjects_path) = args.next() else {
        bail!("usage: design-copy-engine <subjects.json> [profiles.json]");
    };

    let subjects_json = std::fs::read_to_string(&subjects_path)
        .with_context(|| format!("failed to read {subjects_path}"))?;
    let subjects: Vec<GenerationSubject> = serde_json::from_str(&subjects_json)
        .with_context(|| format!("failed to parse subjects from {subjects_path}"))?;

    let profiles: Arc<dyn ProfileStore> = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}"))?;
            Arc::new(InMemoryProfileStore::from_json_str(&json).with_context(|| format!("failed to load profiles from {path}"))?)
        }
        None => Arc::new(InMemoryProfileStore::new()),
    };

    let engine = ContentEngine::from_config(EngineConfig::from_env(), profiles)?;
    let status = engine.status();
    tracing::info!(configured = status.configured, model = %status.model, "{}", status.message);

    let outcomes = engine
        .generate_batch_with_progress(&subjects, &GenerationOptions::default(), |done, total| {
            tracing::info!("📊 Progress: {}/{}", done, total);
        })
        .await;

    println!("{}", serde_json::to_string_pretty(&outcomes)?);
    Ok(())
}
