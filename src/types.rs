// Type definitions and enums

/// One of the four analysis stages of a pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Content,
    Audience,
    MarketTrends,
    ProductOpportunities,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Stage::Content => write!(f, "content"),
            Stage::Audience => write!(f, "audience"),
            Stage::MarketTrends => write!(f, "market_trends"),
            Stage::ProductOpportunities => write!(f, "product_opportunities"),
        }
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMRequest {
    pub provider: String,
    pub model: String,
    pub messages: Vec<LLMMessage>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub system_instruction: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMMessage {
    pub role: String, // "user", "assistant", "system"
    pub content: String,
}

impl LLMMessage {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }

    /// Create a user message
    pub fn user(content: impl Into<String>) -> Self {
        Self::new("user", content)
    }
}

#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct LLMResponse {
    pub content: String,
    pub finish_reason: String,
    pub usage: TokenUsage,
}

#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Completion error: {0}")]
    Completion(String),

    #[error("Analysis parse error in {stage} stage: {message}")]
    AnalysisParse { stage: Stage, message: String },

    #[error("Pipeline run cancelled")]
    Cancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("{stage} stage failed: {source}")]
    StageFailed {
        stage: Stage,
        #[source]
        source: Box<AppError>,
    },
}

impl AppError {
    pub fn parse(stage: Stage, message: impl Into<String>) -> Self {
        AppError::AnalysisParse {
            stage,
            message: message.into(),
        }
    }

    /// Tag an error with the stage it escaped from. Errors that already name
    /// their stage are returned unchanged.
    pub fn in_stage(self, stage: Stage) -> Self {
        match self {
            AppError::StageFailed { .. } | AppError::AnalysisParse { .. } => self,
            other => AppError::StageFailed {
                stage,
                source: Box::new(other),
            },
        }
    }

    /// The stage that failed, if the error was raised inside a pipeline run
    pub fn stage(&self) -> Option<Stage> {
        match self {
            AppError::StageFailed { stage, .. } | AppError::AnalysisParse { stage, .. } => {
                Some(*stage)
            }
            _ => None,
        }
    }

    /// The underlying error with any stage wrapper removed
    pub fn root(&self) -> &AppError {
        match self {
            AppError::StageFailed { source, .. } => source.root(),
            other => other,
        }
    }
}

pub type AppResult<T> = std::result::Result<T, AppError>;
