pub mod client;
pub mod config;
pub mod engine;
pub mod fallback;
pub mod models;
pub mod profiles;
pub mod prompt;
pub mod quality;

pub use client::{GenerationService, OpenAiClient, ServiceError};
pub use config::{credential_is_usable, EngineConfig};
pub use engine::{ContentEngine, GenerationError};
pub use fallback::FallbackGenerator;
pub use models::{
    BatchOutcome, ContentSource, ContentType, EngineStatus, GenerationOptions, GenerationResult, GenerationSubject,
    Length, ProductSubject, ProfileKind, ProjectSubject, PromptProfile, Tone,
};
pub use profiles::{InMemoryProfileStore, ProfileStore, StoreError};
