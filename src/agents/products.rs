//! Product Opportunity Generator
//!
//! Final analysis stage. Asks for a diverse batch of product ideas, validates
//! every idea concurrently, boosts validated confidence, and gates on the
//! batch's mean confidence. A retry throws the whole batch away.

use std::sync::Arc;

use futures::future::join_all;
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use validator::Validate;

use super::reflection::ReflectionGate;
use super::structured::{complete_json, CompletionSettings};
use crate::config::{PipelineConfig, TemperatureSchedule};
use crate::llm::LLM;
use crate::models::{AudienceAnalysis, ContentAnalysis, MarketTrends, ProductOpportunity};
use crate::tools::{ProductValidation, ValidationTool};
use crate::types::{AppError, AppResult, Stage};

const SYSTEM_INSTRUCTION: &str = "You are a product strategist who designs products for online \
creators. Respond with a single JSON object and nothing else.";

/// Multiplier applied to an opportunity's confidence once it has been validated
pub const VALIDATION_BOOST: f64 = 1.1;

#[derive(Debug, Deserialize, Validate)]
struct OpportunityBatch {
    #[validate(nested)]
    opportunities: Vec<ProductOpportunity>,
}

pub struct ProductOpportunityGenerator {
    llm: Arc<LLM>,
    validator: Arc<dyn ValidationTool>,
    settings: CompletionSettings,
    temperatures: TemperatureSchedule,
    gate: ReflectionGate,
}

impl ProductOpportunityGenerator {
    pub fn new(
        llm: Arc<LLM>,
        validator: Arc<dyn ValidationTool>,
        settings: CompletionSettings,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            llm,
            validator,
            settings,
            temperatures: config.stage_temperatures.products,
            gate: ReflectionGate::from_config(config),
        }
    }

    pub async fn generate(
        &self,
        content: &ContentAnalysis,
        audience: &AudienceAnalysis,
        market: Option<&MarketTrends>,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<ProductOpportunity>> {
        self.gate
            .run(
                Stage::ProductOpportunities,
                |batch: &Vec<ProductOpportunity>| mean_confidence(batch),
                move |attempt| self.generate_attempt(content, audience, market, attempt, cancel),
            )
            .await
    }

    async fn generate_attempt(
        &self,
        content: &ContentAnalysis,
        audience: &AudienceAnalysis,
        market: Option<&MarketTrends>,
        attempt: u32,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<ProductOpportunity>> {
        let temperature = self.temperatures.for_attempt(attempt);
        info!(attempt, temperature, "Generating product opportunities");

        let prompt = Self::build_prompt(content, audience, market);
        let batch: OpportunityBatch = complete_json(
            &self.llm,
            &self.settings,
            Stage::ProductOpportunities,
            SYSTEM_INSTRUCTION,
            prompt,
            temperature,
            cancel,
        )
        .await?;

        if !(6..=8).contains(&batch.opportunities.len()) {
            warn!(
                attempt,
                count = batch.opportunities.len(),
                "Model returned an unexpected number of product opportunities"
            );
        }

        let validated = self.validate_all(batch.opportunities, cancel).await?;

        info!(
            attempt,
            count = validated.len(),
            mean_confidence = mean_confidence(&validated),
            "Product opportunities validated"
        );
        Ok(validated)
    }

    /// Validate every opportunity concurrently and merge results by position.
    /// An opportunity whose validation fails is kept as generated.
    async fn validate_all(
        &self,
        opportunities: Vec<ProductOpportunity>,
        cancel: &CancellationToken,
    ) -> AppResult<Vec<ProductOpportunity>> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let validations = join_all(
            opportunities
                .iter()
                .map(|o| self.validator.validate_product_idea(&o.name, o.category)),
        )
        .await;

        let merged = opportunities
            .into_iter()
            .zip(validations)
            .map(|(opportunity, validation)| match validation {
                Ok(validation) => apply_validation(opportunity, &validation),
                Err(e) => {
                    warn!(name = %opportunity.name, error = %e, "Product validation failed, keeping unvalidated");
                    opportunity
                }
            })
            .collect();

        Ok(merged)
    }

    pub fn build_prompt(
        content: &ContentAnalysis,
        audience: &AudienceAnalysis,
        market: Option<&MarketTrends>,
    ) -> String {
        let market_section = match market {
            Some(trends) if !trends.trending_products.is_empty() || !trends.emerging_niches.is_empty() => {
                let products = trends
                    .trending_products
                    .iter()
                    .map(|p| format!("{} ({}, {})", p.name, p.category, p.growth_rate))
                    .collect::<Vec<_>>()
                    .join(", ");
                format!(
                    "\nMARKET TRENDS:\nTrending products: {}\nEmerging niches: {}\n",
                    products,
                    trends.emerging_niches.join(", ")
                )
            }
            _ => String::new(),
        };

        format!(
            r#"Propose product ideas this creator could launch for their audience.

CREATOR:
Genre: {genre}
Main topics: {topics}
Style: {style}
Expertise: {expertise}

AUDIENCE:
Age range: {age_range}
Interests: {interests}
Pain points: {pain_points}
Aspirations: {aspirations}
Frequent requests: {requests}
Shared challenges: {challenges}
{market_section}
Generate 6 to 8 distinct product ideas covering all three categories: digital, physical and service.

OUTPUT FORMAT (respond with ONLY valid JSON):
{{
  "opportunities": [
    {{
      "name": "Product name",
      "category": "digital | physical | service",
      "description": "What the product is",
      "targetAudience": "Who it is for",
      "estimatedDemand": "high | medium | low",
      "confidence": 0.0,
      "reasoning": "Why it fits this creator and audience",
      "similarProducts": ["Comparable products"],
      "priceRange": {{ "min": 0, "max": 0, "currency": "USD" }},
      "validationSuggestions": ["Cheap ways to test demand"]
    }}
  ]
}}

"confidence" is your certainty that each product would succeed, between 0 and 1."#,
            genre = content.genre,
            topics = content.main_topics.join(", "),
            style = content.content_style,
            expertise = content.expertise.join(", "),
            age_range = audience.primary_demographic.age_range,
            interests = audience.primary_demographic.interests.join(", "),
            pain_points = audience.primary_demographic.pain_points.join(", "),
            aspirations = audience.primary_demographic.aspirations.join(", "),
            requests = audience.community_insights.frequent_requests.join(", "),
            challenges = audience.community_insights.shared_challenges.join(", "),
        )
    }
}

/// Fold a validation verdict into an opportunity
pub fn apply_validation(
    mut opportunity: ProductOpportunity,
    validation: &ProductValidation,
) -> ProductOpportunity {
    opportunity.reasoning = format!(
        "{}\n\nMarket Validation: {}",
        opportunity.reasoning,
        validation.summary()
    );
    opportunity.confidence = (opportunity.confidence * VALIDATION_BOOST).min(1.0);
    opportunity
}

/// Mean confidence of a batch, 0 when empty
pub fn mean_confidence(opportunities: &[ProductOpportunity]) -> f64 {
    if opportunities.is_empty() {
        return 0.0;
    }
    opportunities.iter().map(|o| o.confidence).sum::<f64>() / opportunities.len() as f64
}
