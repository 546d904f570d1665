pub mod algorithms;
pub mod artifacts;
pub mod config;
pub mod engine;
pub mod error;
pub mod models;

pub use artifacts::Artifacts;
pub use config::Config;
pub use engine::{EngineHandle, RecommendationEngine};
pub use error::{EngineError, ModelError};
pub use models::*;

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}
