//! Audience Analyzer
//!
//! Second stage: infers who watches the channel from the content analysis and
//! channel statistics. Web research is folded in on retries, and on every
//! attempt when no statistics were supplied.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::reflection::ReflectionGate;
use super::structured::{complete_json, CompletionSettings};
use crate::config::{PipelineConfig, TemperatureSchedule};
use crate::llm::LLM;
use crate::models::{AudienceAnalysis, ChannelStats, ContentAnalysis};
use crate::tools::SearchTool;
use crate::types::{AppError, AppResult, Stage};

const SYSTEM_INSTRUCTION: &str = "You are an audience research analyst for online creators. \
Respond with a single JSON object and nothing else.";

pub struct AudienceAnalyzer {
    llm: Arc<LLM>,
    search: Arc<dyn SearchTool>,
    settings: CompletionSettings,
    temperatures: TemperatureSchedule,
    gate: ReflectionGate,
}

impl AudienceAnalyzer {
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
            temperatures: config.stage_temperatures.audience,
            gate: ReflectionGate::from_config(config),
        }
    }

    pub async fn analyze(
        &self,
        content: &ContentAnalysis,
        stats: Option<&ChannelStats>,
        cancel: &CancellationToken,
    ) -> AppResult<AudienceAnalysis> {
        self.gate
            .run(
                Stage::Audience,
                |analysis: &AudienceAnalysis| analysis.confidence,
                move |attempt| self.analyze_attempt(content, stats, attempt, cancel),
            )
            .await
    }

    /// Research is needed on any retry, or whenever channel stats are missing
    pub fn needs_research(attempt: u32, stats: Option<&ChannelStats>) -> bool {
        attempt > 1 || stats.is_none()
    }

    pub fn research_query(content: &ContentAnalysis) -> String {
        let topics = content
            .main_topics
            .iter()
            .take(3)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" ");
        format!("{} audience demographics {}", content.genre, topics)
            .trim()
            .to_string()
    }

    async fn analyze_attempt(
        &self,
        content: &ContentAnalysis,
        stats: Option<&ChannelStats>,
        attempt: u32,
        cancel: &CancellationToken,
    ) -> AppResult<AudienceAnalysis> {
        let research = if Self::needs_research(attempt, stats) {
            self.research(content, cancel).await?
        } else {
            None
        };

        let temperature = self.temperatures.for_attempt(attempt);
        info!(
            attempt,
            temperature,
            with_research = research.is_some(),
            with_stats = stats.is_some(),
            "Analyzing audience"
        );

        let prompt = Self::build_prompt(content, stats, research.as_deref());
        let analysis: AudienceAnalysis = complete_json(
            &self.llm,
            &self.settings,
            Stage::Audience,
            SYSTEM_INSTRUCTION,
            prompt,
            temperature,
            cancel,
        )
        .await?;

        info!(
            attempt,
            age_range = %analysis.primary_demographic.age_range,
            confidence = analysis.confidence,
            "Audience analysis complete"
        );
        Ok(analysis)
    }

    /// Web research for this content, `None` when the tool fails
    async fn research(
        &self,
        content: &ContentAnalysis,
        cancel: &CancellationToken,
    ) -> AppResult<Option<String>> {
        if cancel.is_cancelled() {
            return Err(AppError::Cancelled);
        }

        let query = Self::research_query(content);
        match self.search.web_search(&query).await {
            Ok(summary) => Ok(Some(summary)),
            Err(e) => {
                warn!(error = %e, query = %query, "Audience research failed, continuing without it");
                Ok(None)
            }
        }
    }

    pub fn build_prompt(
        content: &ContentAnalysis,
        stats: Option<&ChannelStats>,
        research: Option<&str>,
    ) -> String {
        let stats_section = match stats {
            Some(stats) => format!(
                "\nCHANNEL STATISTICS:\nSubscribers: {}\nTotal views: {}\nVideos: {}\n",
                stats.subscriber_count, stats.view_count, stats.video_count
            ),
            None => String::new(),
        };

        let research_section = match research {
            Some(summary) => format!("\nExternal Audience Research:\n{}\n", summary),
            None => String::new(),
        };

        format!(
            r#"Based on this creator's content analysis, describe their audience.

CONTENT ANALYSIS:
Genre: {genre}
Sub-genres: {sub_genres}
Main topics: {topics}
Style: {style}
Tone: {tone}
Key themes: {themes}
Expertise: {expertise}
{stats_section}{research_section}
OUTPUT FORMAT (respond with ONLY valid JSON):
{{
  "primaryDemographic": {{
    "ageRange": "e.g. 25-34",
    "interests": ["Interests"],
    "painPoints": ["Problems the audience wants solved"],
    "aspirations": ["What the audience wants to achieve"]
  }},
  "engagementPatterns": {{
    "mostEngagedTopics": ["Topics"],
    "peakEngagementTimes": ["Times"],
    "preferredContentLength": "e.g. 10-15 minutes"
  }},
  "communityInsights": {{
    "commonQuestions": ["Questions"],
    "frequentRequests": ["Requests"],
    "sharedChallenges": ["Challenges"]
  }},
  "confidence": 0.0
}}

"confidence" is your certainty in this analysis, between 0 and 1."#,
            genre = content.genre,
            sub_genres = content.sub_genres.join(", "),
            topics = content.main_topics.join(", "),
            style = content.content_style,
            tone = content.content_tone,
            themes = content.key_themes.join(", "),
            expertise = content.expertise.join(", "),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::ScriptedAdapter;
    use crate::tools::ToolError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct CountingSearch {
        calls: AtomicUsize,
        fail: bool,
    }

    impl CountingSearch {
        fn new(fail: bool) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                fail,
            }
        }
    }

    #[async_trait]
    impl SearchTool for CountingSearch {
        async fn web_search(&self, query: &str) -> Result<String, ToolError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(ToolError::Unavailable("offline".to_string()))
            } else {
                Ok(format!("research for {}", query))
            }
        }
    }

    fn content() -> ContentAnalysis {
        ContentAnalysis {
            genre: "Fitness".to_string(),
            sub_genres: vec!["Strength".to_string()],
            main_topics: vec!["Squats".to_string(), "Deadlifts".to_string()],
            content_style: "Tutorial".to_string(),
            content_tone: "Encouraging".to_string(),
            key_themes: vec![],
            expertise: vec![],
            confidence: 0.8,
        }
    }

    fn audience_json(confidence: f64) -> String {
        format!(
            r#"{{"primaryDemographic":{{"ageRange":"25-34","interests":[],"painPoints":[],"aspirations":[]}},
               "engagementPatterns":{{"mostEngagedTopics":[],"peakEngagementTimes":[],"preferredContentLength":"10 minutes"}},
               "communityInsights":{{"commonQuestions":[],"frequentRequests":[],"sharedChallenges":[]}},
               "confidence":{}}}"#,
            confidence
        )
    }

    fn analyzer(adapter: Arc<ScriptedAdapter>, search: Arc<CountingSearch>) -> AudienceAnalyzer {
        let llm = Arc::new(LLM::with_adapter(adapter, "scripted", Duration::from_secs(5)));
        AudienceAnalyzer::new(llm, search, CompletionSettings::default(), &PipelineConfig::default())
    }

    const STATS: ChannelStats = ChannelStats {
        subscriber_count: 78_000,
        view_count: 668_000,
        video_count: 5,
    };

    #[test]
    fn test_needs_research() {
        assert!(AudienceAnalyzer::needs_research(1, None));
        assert!(AudienceAnalyzer::needs_research(2, Some(&STATS)));
        assert!(!AudienceAnalyzer::needs_research(1, Some(&STATS)));
    }

    #[test]
    fn test_research_query_uses_genre_and_topics() {
        assert_eq!(
            AudienceAnalyzer::research_query(&content()),
            "Fitness audience demographics Squats Deadlifts"
        );
    }

    #[tokio::test]
    async fn test_stats_present_skips_search_on_first_attempt() {
        let adapter = Arc::new(ScriptedAdapter::constant(audience_json(0.9)));
        let search = Arc::new(CountingSearch::new(false));
        let analyzer = analyzer(adapter.clone(), search.clone());

        analyzer
            .analyze(&content(), Some(&STATS), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(search.calls.load(Ordering::SeqCst), 0);
        let prompt = &adapter.requests()[0].messages[0].content;
        assert!(prompt.contains("Subscribers: 78000"));
        assert!(!prompt.contains("External Audience Research"));
    }

    #[tokio::test]
    async fn test_retry_adds_research_and_cools_temperature() {
        let adapter = Arc::new(ScriptedAdapter::new(|request| {
            if request.temperature == Some(0.6) {
                Ok(audience_json(0.3))
            } else {
                Ok(audience_json(0.7))
            }
        }));
        let search = Arc::new(CountingSearch::new(false));
        let analyzer = analyzer(adapter.clone(), search.clone());

        let analysis = analyzer
            .analyze(&content(), Some(&STATS), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(analysis.confidence, 0.7);
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        let requests = adapter.requests();
        assert_eq!(requests.len(), 2);
        assert_eq!(requests[1].temperature, Some(0.4));
        assert!(requests[1].messages[0]
            .content
            .contains("External Audience Research:\nresearch for Fitness"));
    }

    #[tokio::test]
    async fn test_search_failure_degrades_gracefully() {
        let adapter = Arc::new(ScriptedAdapter::constant(audience_json(0.9)));
        let search = Arc::new(CountingSearch::new(true));
        let analyzer = analyzer(adapter.clone(), search.clone());

        let analysis = analyzer
            .analyze(&content(), None, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(analysis.confidence, 0.9);
        assert_eq!(search.calls.load(Ordering::SeqCst), 1);
        assert!(!adapter.requests()[0].messages[0]
            .content
            .contains("External Audience Research"));
    }
}
