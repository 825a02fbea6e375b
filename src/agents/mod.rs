//! Agent System
//!
//! The stage analyzers that turn a creator's transcripts into product
//! recommendations:
//!
//! - **Content Analyzer**: genre, topics, style and expertise
//! - **Audience Analyzer**: demographics, engagement and community needs
//! - **Market Trends Analyzer**: trending products and niches
//! - **Product Opportunity Generator**: validated product ideas
//!
//! ## Pipeline Overview
//!
//! ```text
//!  Transcripts
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Content   │  → ContentAnalysis
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Audience   │  → AudienceAnalysis      (web search on retry / missing stats)
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │   Market    │  → MarketTrends          (web search every attempt)
//! └─────────────┘
//!      │
//!      ▼
//! ┌─────────────┐
//! │  Products   │  → ProductOpportunity[]  (validated concurrently)
//! └─────────────┘
//!      │
//!      ▼
//!  Recommendations → CreatorGraph
//! ```
//!
//! Every stage runs through the [`ReflectionGate`]: a low-confidence result
//! is regenerated once with a stage-specific variation.

pub mod audience;
pub mod content;
pub mod market;
pub mod pipeline;
pub mod products;
pub mod reflection;
pub mod structured;

pub use audience::AudienceAnalyzer;
pub use content::ContentAnalyzer;
pub use market::MarketTrendsAnalyzer;
pub use pipeline::CreatorGraphPipeline;
pub use products::ProductOpportunityGenerator;
pub use reflection::ReflectionGate;
pub use structured::CompletionSettings;
