// Creator Graph - AI pipeline that turns creator transcripts into ranked product ideas

pub mod config;
pub mod models;
pub mod types;
pub mod agents;
pub mod llm;
pub mod tools;     // Web search and product validation tools
pub mod recommendations;
pub mod utils;

// Re-exports for convenience
pub use agents::CreatorGraphPipeline;
pub use config::Config;
pub use models::{CreatorChannel, CreatorGraph, VideoTranscript};
pub use types::{AppError, AppResult, Stage};
