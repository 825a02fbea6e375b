//! Pipeline Orchestrator
//!
//! Runs the four stages strictly in order and assembles the [`CreatorGraph`].
//! The first stage error aborts the run; no partial graph is returned.

use std::sync::Arc;

use chrono::Utc;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument};

use super::audience::AudienceAnalyzer;
use super::content::ContentAnalyzer;
use super::market::MarketTrendsAnalyzer;
use super::products::ProductOpportunityGenerator;
use super::structured::CompletionSettings;
use crate::config::{Config, PipelineConfig};
use crate::llm::{LLMProviderConfig, LLM};
use crate::models::{CreatorChannel, CreatorGraph, VideoTranscript};
use crate::recommendations::generate_recommendations;
use crate::tools::{
    SearchTool, SerpApiSearchTool, SimulatedProductValidator, SimulatedWebSearch, ValidationTool,
};
use crate::types::{AppError, AppResult, Stage};

pub struct CreatorGraphPipeline {
    content: ContentAnalyzer,
    audience: AudienceAnalyzer,
    market: MarketTrendsAnalyzer,
    products: ProductOpportunityGenerator,
}

impl CreatorGraphPipeline {
    pub fn new(
        llm: Arc<LLM>,
        search: Arc<dyn SearchTool>,
        validator: Arc<dyn ValidationTool>,
        settings: CompletionSettings,
        config: &PipelineConfig,
    ) -> Self {
        Self {
            content: ContentAnalyzer::new(llm.clone(), settings.clone(), config),
            audience: AudienceAnalyzer::new(llm.clone(), search.clone(), settings.clone(), config),
            market: MarketTrendsAnalyzer::new(llm.clone(), search, settings.clone(), config),
            products: ProductOpportunityGenerator::new(llm, validator, settings, config),
        }
    }

    /// Wire the configured provider and tools. Without a SerpAPI key the
    /// simulated search tool is used.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let llm = LLM::new(
            LLMProviderConfig {
                name: config.llm.provider.clone(),
                api_key: config.llm.api_key.clone(),
                base_url: config.llm.base_url.clone(),
            },
            config.pipeline.completion_timeout,
        )?;

        let search: Arc<dyn SearchTool> = match SerpApiSearchTool::from_config(&config.search) {
            Some(serpapi) => Arc::new(serpapi),
            None => {
                info!("No SerpAPI key configured, using simulated web search");
                Arc::new(SimulatedWebSearch::new())
            }
        };
        let validator = Arc::new(SimulatedProductValidator::new(config.search.validation_seed));

        Ok(Self::new(
            Arc::new(llm),
            search,
            validator,
            CompletionSettings::from_config(config),
            &config.pipeline,
        ))
    }

    /// Run every stage for one creator.
    ///
    /// Errors are tagged with the stage that raised them; see [`AppError::stage`].
    #[instrument(skip_all, fields(channel_id = %channel.channel_id, transcripts = transcripts.len()))]
    pub async fn analyze_creator_graph(
        &self,
        channel: &CreatorChannel,
        transcripts: Vec<VideoTranscript>,
        cancel: &CancellationToken,
    ) -> AppResult<CreatorGraph> {
        info!(channel_name = %channel.channel_name, "Starting creator graph analysis");

        let result = self.run_stages(channel, transcripts, cancel).await;
        match &result {
            Ok(graph) => info!(
                opportunities = graph.product_opportunities.len(),
                top_products = graph.recommendations.top_products.len(),
                "Creator graph analysis complete"
            ),
            Err(e) => error!(error = %e, stage = ?e.stage(), "Creator graph analysis failed"),
        }
        result
    }

    async fn run_stages(
        &self,
        channel: &CreatorChannel,
        transcripts: Vec<VideoTranscript>,
        cancel: &CancellationToken,
    ) -> AppResult<CreatorGraph> {
        ensure_active(Stage::Content, cancel)?;
        let content_analysis = self
            .content
            .analyze(&transcripts, cancel)
            .await
            .map_err(|e| e.in_stage(Stage::Content))?;

        ensure_active(Stage::Audience, cancel)?;
        let stats = channel.stats(transcripts.len());
        let audience_analysis = self
            .audience
            .analyze(&content_analysis, Some(&stats), cancel)
            .await
            .map_err(|e| e.in_stage(Stage::Audience))?;

        ensure_active(Stage::MarketTrends, cancel)?;
        let market_trends = self
            .market
            .analyze(&content_analysis, &audience_analysis, cancel)
            .await
            .map_err(|e| e.in_stage(Stage::MarketTrends))?;

        ensure_active(Stage::ProductOpportunities, cancel)?;
        let product_opportunities = self
            .products
            .generate(&content_analysis, &audience_analysis, Some(&market_trends), cancel)
            .await
            .map_err(|e| e.in_stage(Stage::ProductOpportunities))?;

        let recommendations = generate_recommendations(&product_opportunities);

        Ok(CreatorGraph {
            creator_id: channel.user_id.clone(),
            channel_id: channel.channel_id.clone(),
            channel_name: channel.channel_name.clone(),
            total_videos: transcripts.len(),
            total_views: channel.total_views,
            subscriber_count: channel.subscriber_count,
            analysis_date: Utc::now(),
            transcripts,
            content_analysis,
            audience_analysis,
            product_opportunities,
            market_trends,
            recommendations,
        })
    }
}

fn ensure_active(stage: Stage, cancel: &CancellationToken) -> AppResult<()> {
    if cancel.is_cancelled() {
        return Err(AppError::Cancelled.in_stage(stage));
    }
    Ok(())
}
