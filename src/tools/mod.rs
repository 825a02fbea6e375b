//! Tools
//!
//! External lookups an analyzer may call mid-stage:
//!
//! - **Web search**: free-text query to a short research summary
//! - **Product validation**: product name + category to an existence,
//!   competition and demand verdict
//!
//! Tools are enrichment. Analyzers catch every [`ToolError`] and carry on
//! without the tool's contribution.

pub mod serpapi;
pub mod simulated;

pub use serpapi::SerpApiSearchTool;
pub use simulated::{SimulatedProductValidator, SimulatedWebSearch};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ProductCategory;

/// Errors raised by tool adapters
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Search request failed: {0}")]
    RequestFailed(String),

    #[error("Failed to parse tool response: {0}")]
    ParseError(String),

    #[error("No results found for query")]
    NoResults,

    #[error("Tool unavailable: {0}")]
    Unavailable(String),
}

#[async_trait]
pub trait SearchTool: Send + Sync {
    /// Search the web and return a short summary of what was found
    async fn web_search(&self, query: &str) -> Result<String, ToolError>;
}

#[async_trait]
pub trait ValidationTool: Send + Sync {
    async fn validate_product_idea(
        &self,
        name: &str,
        category: ProductCategory,
    ) -> Result<ProductValidation, ToolError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarketLevel {
    Low,
    Medium,
    High,
}

impl std::fmt::Display for MarketLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MarketLevel::Low => write!(f, "low"),
            MarketLevel::Medium => write!(f, "medium"),
            MarketLevel::High => write!(f, "high"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductValidation {
    pub exists: bool,
    pub competition: MarketLevel,
    pub demand: MarketLevel,
}

impl ProductValidation {
    /// One-line verdict appended to an opportunity's reasoning
    pub fn summary(&self) -> String {
        let existence = if self.exists {
            "Similar products already exist"
        } else {
            "No direct equivalent found"
        };
        format!(
            "{}; competition is {}, demand is {}.",
            existence, self.competition, self.demand
        )
    }
}
