// Core models for the creator graph pipeline
// Wire names are camelCase so graphs round-trip with the web collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use validator::Validate;

/// A single video with its transcript, as delivered by the transcription service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoTranscript {
    pub video_id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub published_at: DateTime<Utc>,
    pub transcript: String,
    /// ISO-8601 duration as reported by the platform, e.g. `PT12M30S`
    #[serde(default)]
    pub duration: String,
    #[serde(default)]
    pub view_count: u64,
    #[serde(default)]
    pub like_count: u64,
    #[serde(default)]
    pub comment_count: u64,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelStats {
    pub subscriber_count: u64,
    pub view_count: u64,
    pub video_count: u64,
}

/// Identifiers passed through a run unchanged into the resulting graph
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorChannel {
    pub user_id: String,
    pub channel_id: String,
    pub channel_name: String,
    pub total_views: u64,
    pub subscriber_count: u64,
}

impl CreatorChannel {
    pub fn stats(&self, video_count: usize) -> ChannelStats {
        ChannelStats {
            subscriber_count: self.subscriber_count,
            view_count: self.total_views,
            video_count: video_count as u64,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ContentAnalysis {
    pub genre: String,
    #[serde(default)]
    pub sub_genres: Vec<String>,
    #[serde(default)]
    pub main_topics: Vec<String>,
    pub content_style: String,
    pub content_tone: String,
    #[serde(default)]
    pub key_themes: Vec<String>,
    #[serde(default)]
    pub expertise: Vec<String>,
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct AudienceAnalysis {
    pub primary_demographic: PrimaryDemographic,
    pub engagement_patterns: EngagementPatterns,
    pub community_insights: CommunityInsights,
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrimaryDemographic {
    pub age_range: String,
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub pain_points: Vec<String>,
    #[serde(default)]
    pub aspirations: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngagementPatterns {
    #[serde(default)]
    pub most_engaged_topics: Vec<String>,
    #[serde(default)]
    pub peak_engagement_times: Vec<String>,
    pub preferred_content_length: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommunityInsights {
    #[serde(default)]
    pub common_questions: Vec<String>,
    #[serde(default)]
    pub frequent_requests: Vec<String>,
    #[serde(default)]
    pub shared_challenges: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct MarketTrends {
    #[serde(default)]
    #[validate(nested)]
    pub trending_products: Vec<TrendingProduct>,
    #[serde(default)]
    pub emerging_niches: Vec<String>,
    #[serde(default)]
    pub seasonal_opportunities: Vec<SeasonalOpportunity>,
    #[serde(default)]
    pub competitor_insights: Vec<CompetitorInsight>,
}

impl MarketTrends {
    /// Mean relevance across trending products, 0 when there are none
    pub fn mean_relevance(&self) -> f64 {
        if self.trending_products.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.trending_products.iter().map(|p| p.relevance_score).sum();
        sum / self.trending_products.len() as f64
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct TrendingProduct {
    pub name: String,
    pub category: String,
    #[serde(deserialize_with = "string_or_number")]
    pub growth_rate: String,
    #[validate(range(min = 0.0, max = 1.0))]
    pub relevance_score: f64,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeasonalOpportunity {
    pub season: String,
    #[serde(default)]
    pub products: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorInsight {
    pub creator: String,
    #[serde(default)]
    pub products: Vec<String>,
    #[serde(default, deserialize_with = "string_or_number")]
    pub success_metrics: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProductCategory {
    #[serde(alias = "Digital")]
    Digital,
    #[serde(alias = "Physical")]
    Physical,
    #[serde(alias = "Service")]
    Service,
}

impl std::fmt::Display for ProductCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProductCategory::Digital => write!(f, "digital"),
            ProductCategory::Physical => write!(f, "physical"),
            ProductCategory::Service => write!(f, "service"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandLevel {
    #[serde(alias = "High")]
    High,
    #[serde(alias = "Medium")]
    Medium,
    #[serde(alias = "Low")]
    Low,
}

impl std::fmt::Display for DemandLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DemandLevel::High => write!(f, "high"),
            DemandLevel::Medium => write!(f, "medium"),
            DemandLevel::Low => write!(f, "low"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ProductOpportunity {
    #[serde(default = "new_opportunity_id")]
    pub id: String,
    pub name: String,
    pub category: ProductCategory,
    pub description: String,
    pub target_audience: String,
    pub estimated_demand: DemandLevel,
    #[validate(range(min = 0.0, max = 1.0))]
    pub confidence: f64,
    pub reasoning: String,
    #[serde(default)]
    pub similar_products: Vec<String>,
    #[validate(nested)]
    pub price_range: PriceRange,
    #[serde(default)]
    pub validation_suggestions: Vec<String>,
}

fn new_opportunity_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct PriceRange {
    #[validate(range(min = 0.0))]
    pub min: f64,
    #[validate(range(min = 0.0))]
    pub max: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendations {
    pub top_products: Vec<ProductOpportunity>,
    pub quick_wins: Vec<ProductOpportunity>,
    pub long_term_bets: Vec<ProductOpportunity>,
}

/// Result of one full pipeline run for a creator
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorGraph {
    pub creator_id: String,
    pub channel_id: String,
    pub channel_name: String,
    pub total_videos: usize,
    pub total_views: u64,
    pub subscriber_count: u64,
    pub analysis_date: DateTime<Utc>,
    pub transcripts: Vec<VideoTranscript>,
    pub content_analysis: ContentAnalysis,
    pub audience_analysis: AudienceAnalysis,
    pub product_opportunities: Vec<ProductOpportunity>,
    pub market_trends: MarketTrends,
    pub recommendations: Recommendations,
}

/// Models sometimes report rates and metrics as bare numbers instead of text
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        serde_json::Value::Null => Ok(String::new()),
        other => Err(serde::de::Error::custom(format!(
            "expected string or number, got {}",
            other
        ))),
    }
}
