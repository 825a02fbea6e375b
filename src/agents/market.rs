//! Market Trends Analyzer
//!
//! Third stage. Always consults web search before asking the model, and is
//! gated on the mean relevance of the trending products it returns rather
//! than a self-reported confidence.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::reflection::ReflectionGate;
use super::structured::{complete_json, CompletionSettings};
use crate::config::{PipelineConfig, TemperatureSchedule};
use crate::llm::LLM;
use crate::models::{AudienceAnalysis, ContentAnalysis, MarketTrends};
use crate::tools::SearchTool;
use crate::types::{AppError, AppResult, Stage};

const SYSTEM_INSTRUCTION: &str = "You are a market analyst specializing in creator-led products. \
Respond with a single JSON object and nothing else.";

pub struct MarketTrendsAnalyzer {
    llm: Arc<LLM>,
    search: Arc<dyn SearchTool>,
    settings: CompletionSettings,
    temperatures: TemperatureSchedule,
    gate: ReflectionGate,
}

impl MarketTrendsAnalyzer {
    pub fn new(
        llm: Arc<LLM>,
        search: Arc<dyn SearchTool>,
        settings: CompletionSettings,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            llm,
            search,
            settings,
            temperatures: config.stage_temperatures.market,
            gate: ReflectionGate::from_config(config),
        }
    }

    pub async fn analyze(
        &self,
        content: &ContentAnalysis,
        audience: &AudienceAnalysis,
        cancel: &CancellationToken,
    ) -> AppResult<MarketTrends> {
        self.gate
            .run(
                Stage::MarketTrends,
                MarketTrends::mean_relevance,
                move |attempt| self.analyze_attempt(content, audience, attempt, cancel),
            )
            .await
    }

    pub fn search_query(content: &ContentAnalysis) -> String {
        format!("{} trending products creator economy", content.genre)
    }

    async fn analyze_attempt(
        &self,
        content: &ContentAnalysis,
        audience: &AudienceAnalysis,
        attempt: u32,
        cancel: &CancellationToken,
    ) -> AppResult<MarketTrends> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let query = Self::search_query(content);
        let research = match self.search.web_search(&query).await {
            Ok(summary) => Some(summary),
            Err(e) => {
                warn!(error = %e, query = %query, "Market research failed, continuing without it");
                None
            }
        };

        let temperature = self.temperatures.for_attempt(attempt);
        info!(attempt, temperature, with_research = research.is_some(), "Analyzing market trends");

        let prompt = Self::build_prompt(content, audience, research.as_deref());
        let trends: MarketTrends = complete_json(
            &self.llm,
            &self.settings,
            Stage::MarketTrends,
            SYSTEM_INSTRUCTION,
            prompt,
            temperature,
            cancel,
        )
        .await?;

        info!(
            attempt,
            trending_products = trends.trending_products.len(),
            mean_relevance = trends.mean_relevance(),
            "Market trends analysis complete"
        );
        Ok(trends)
    }

    pub fn build_prompt(
        content: &ContentAnalysis,
        audience: &AudienceAnalysis,
        research: Option<&str>,
    ) -> String {
        let research_section = match research {
            Some(summary) => format!("\nMARKET RESEARCH:\n{}\n", summary),
            None => String::new(),
        };

        format!(
            r#"Identify market trends relevant to a {genre} creator and their audience.

CREATOR:
Genre: {genre}
Main topics: {topics}
Expertise: {expertise}

AUDIENCE:
Age range: {age_range}
Interests: {interests}
Pain points: {pain_points}
Frequent requests: {requests}
{research_section}
OUTPUT FORMAT (respond with ONLY valid JSON):
{{
  "trendingProducts": [
    {{
      "name": "Product name",
      "category": "Product category",
      "growthRate": "e.g. +35% YoY",
      "relevanceScore": 0.0,
      "description": "Why it is trending"
    }}
  ],
  "emergingNiches": ["Niches"],
  "seasonalOpportunities": [{{ "season": "Season", "products": ["Products"] }}],
  "competitorInsights": [{{ "creator": "Creator", "products": ["Products"], "successMetrics": "Metrics" }}]
}}

"relevanceScore" is how relevant each product is to this creator, between 0 and 1."#,
            genre = content.genre,
            topics = content.main_topics.join(", "),
            expertise = content.expertise.join(", "),
            age_range = audience.primary_demographic.age_range,
            interests = audience.primary_demographic.interests.join(", "),
            pain_points = audience.primary_demographic.pain_points.join(", "),
            requests = audience.community_insights.frequent_requests.join(", "),
        )
    }
}
