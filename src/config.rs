use anyhow::{Context, Result};
use serde::Deserialize;
use std::env;
use std::time::Duration;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub llm: LLMConfig,
    pub search: SearchConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LLMConfig {
    pub provider: String,
    pub model: String,
    pub api_key: String,
    pub base_url: Option<String>,
    pub max_tokens: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub serpapi_key: String,
    pub max_results: usize,
    pub validation_seed: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub directory: Option<String>,
}

/// Temperature for the first attempt of a stage and for every retry after it
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct TemperatureSchedule {
    pub first: f32,
    pub retry: f32,
}

impl TemperatureSchedule {
    pub const fn new(first: f32, retry: f32) -> Self {
        Self { first, retry }
    }

    pub fn for_attempt(&self, attempt: u32) -> f32 {
        if attempt > 1 {
            self.retry
        } else {
            self.first
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct StageTemperatures {
    pub content: TemperatureSchedule,
    pub audience: TemperatureSchedule,
    pub market: TemperatureSchedule,
    pub products: TemperatureSchedule,
}

impl Default for StageTemperatures {
    fn default() -> Self {
        Self {
            content: TemperatureSchedule::new(0.7, 0.5),
            audience: TemperatureSchedule::new(0.6, 0.4),
            market: TemperatureSchedule::new(0.7, 0.5),
            products: TemperatureSchedule::new(0.9, 0.8),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct PipelineConfig {
    pub stage_temperatures: StageTemperatures,
    pub confidence_threshold: f64,
    pub max_attempts: u32,
    pub completion_timeout: Duration,
    /// Transcripts beyond this many are left out of the content prompt
    pub max_transcripts: usize,
    /// Transcript excerpt length in characters, first attempt
    pub excerpt_chars: usize,
    /// Transcript excerpt length in characters, retries
    pub retry_excerpt_chars: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            stage_temperatures: StageTemperatures::default(),
            confidence_threshold: 0.6,
            max_attempts: 2,
            completion_timeout: Duration::from_secs(60),
            max_transcripts: 10,
            excerpt_chars: 1000,
            retry_excerpt_chars: 2000,
        }
    }
}

impl PipelineConfig {
    pub fn excerpt_chars_for_attempt(&self, attempt: u32) -> usize {
        if attempt > 1 {
            self.retry_excerpt_chars
        } else {
            self.excerpt_chars
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = PipelineConfig::default();

        let config = Self {
            llm: LLMConfig {
                provider: env::var("LLM_PROVIDER").unwrap_or_else(|_| "openai".to_string()),
                model: env::var("LLM_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string()),
                api_key: env::var("LLM_API_KEY")
                    .or_else(|_| env::var("OPENAI_API_KEY"))
                    .unwrap_or_default(),
                base_url: env::var("LLM_BASE_URL").ok(),
                max_tokens: env::var("LLM_MAX_TOKENS")
                    .unwrap_or_else(|_| "2048".to_string())
                    .parse()
                    .context("LLM_MAX_TOKENS must be an integer")?,
            },
            search: SearchConfig {
                serpapi_key: env::var("SERPAPI_API_KEY").unwrap_or_default(),
                max_results: env::var("SEARCH_MAX_RESULTS")
                    .unwrap_or_else(|_| "5".to_string())
                    .parse()
                    .context("SEARCH_MAX_RESULTS must be an integer")?,
                validation_seed: env::var("PRODUCT_VALIDATION_SEED")
                    .unwrap_or_else(|_| "42".to_string())
                    .parse()
                    .context("PRODUCT_VALIDATION_SEED must be an integer")?,
            },
            pipeline: PipelineConfig {
                confidence_threshold: env::var("CONFIDENCE_THRESHOLD")
                    .unwrap_or_else(|_| defaults.confidence_threshold.to_string())
                    .parse()
                    .context("CONFIDENCE_THRESHOLD must be a number")?,
                max_attempts: env::var("MAX_ATTEMPTS")
                    .unwrap_or_else(|_| defaults.max_attempts.to_string())
                    .parse()
                    .context("MAX_ATTEMPTS must be an integer")?,
                completion_timeout: Duration::from_secs(
                    env::var("COMPLETION_TIMEOUT_SECS")
                        .unwrap_or_else(|_| "60".to_string())
                        .parse()
                        .context("COMPLETION_TIMEOUT_SECS must be an integer")?,
                ),
                max_transcripts: env::var("MAX_TRANSCRIPTS")
                    .unwrap_or_else(|_| defaults.max_transcripts.to_string())
                    .parse()
                    .context("MAX_TRANSCRIPTS must be an integer")?,
                ..defaults
            },
            logging: LoggingConfig {
                directory: env::var("LOG_DIR").ok(),
            },
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let pipeline = &self.pipeline;
        if !(0.0..=1.0).contains(&pipeline.confidence_threshold) {
            anyhow::bail!(
                "CONFIDENCE_THRESHOLD must be within [0, 1], got {}",
                pipeline.confidence_threshold
            );
        }
        if pipeline.max_attempts == 0 {
            anyhow::bail!("MAX_ATTEMPTS must be at least 1");
        }
        Ok(())
    }
}
