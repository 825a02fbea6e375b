//! Content Analyzer
//!
//! First stage: reads the creator's transcripts and classifies genre, topics,
//! style, tone and expertise. Retries widen the transcript excerpt and cool
//! the temperature.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use super::reflection::ReflectionGate;
use super::structured::{complete_json, CompletionSettings};
use crate::config::{PipelineConfig, TemperatureSchedule};
use crate::llm::LLM;
use crate::models::{ContentAnalysis, VideoTranscript};
use crate::types::{AppResult, Stage};

const SYSTEM_INSTRUCTION: &str = "You are an expert content strategist who analyzes creator \
channels. Respond with a single JSON object and nothing else.";

pub struct ContentAnalyzer {
    llm: Arc<LLM>,
    settings: CompletionSettings,
    temperatures: TemperatureSchedule,
    gate: ReflectionGate,
    pipeline: PipelineConfig,
}

impl ContentAnalyzer {
    pub fn new(llm: Arc<LLM>, settings: CompletionSettings, config: &PipelineConfig) -> Self {
        Self {
            llm,
            settings,
            temperatures: config.stage_temperatures.content,
            gate: ReflectionGate::from_config(config),
            pipeline: config.clone(),
        }
    }

    pub async fn analyze(
        &self,
        transcripts: &[VideoTranscript],
        cancel: &CancellationToken,
    ) -> AppResult<ContentAnalysis> {
        if transcripts.is_empty() {
            warn!("Content analysis started without transcripts");
        }

        self.gate
            .run(
                Stage::Content,
                |analysis: &ContentAnalysis| analysis.confidence,
                move |attempt| self.analyze_attempt(transcripts, attempt, cancel),
            )
            .await
    }

    async fn analyze_attempt(
        &self,
        transcripts: &[VideoTranscript],
        attempt: u32,
        cancel: &CancellationToken,
    ) -> AppResult<ContentAnalysis> {
        let prompt = self.build_prompt(transcripts, attempt);
        let temperature = self.temperatures.for_attempt(attempt);

        info!(
            attempt,
            transcript_count = transcripts.len().min(self.pipeline.max_transcripts),
            temperature,
            "Analyzing content"
        );

        let analysis: ContentAnalysis = complete_json(
            &self.llm,
            &self.settings,
            Stage::Content,
            SYSTEM_INSTRUCTION,
            prompt,
            temperature,
            cancel,
        )
        .await?;

        info!(
            attempt,
            genre = %analysis.genre,
            confidence = analysis.confidence,
            "Content analysis complete"
        );
        Ok(analysis)
    }

    /// Prompt for one attempt. Transcripts appear in input order.
    pub fn build_prompt(&self, transcripts: &[VideoTranscript], attempt: u32) -> String {
        let window = self.pipeline.excerpt_chars_for_attempt(attempt);

        let videos = transcripts
            .iter()
            .take(self.pipeline.max_transcripts)
            .enumerate()
            .map(|(i, video)| {
                format!(
                    "VIDEO {index}: {title}\nDescription: {description}\nTranscript excerpt: {excerpt}\nTags: {tags}",
                    index = i + 1,
                    title = video.title,
                    description = video.description,
                    excerpt = excerpt(&video.transcript, window),
                    tags = video.tags.join(", "),
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        let depth_note = if attempt > 1 {
            "\nA previous analysis was not confident enough. Read the longer excerpts carefully and be specific.\n"
        } else {
            ""
        };

        format!(
            r#"Analyze the following videos from a single creator's channel and describe their content.
{depth_note}
{videos}

OUTPUT FORMAT (respond with ONLY valid JSON):
{{
  "genre": "Primary genre of the channel",
  "subGenres": ["Secondary genres"],
  "mainTopics": ["Most frequent topics"],
  "contentStyle": "e.g. tutorial, vlog, review, commentary",
  "contentTone": "e.g. motivational, humorous, educational",
  "keyThemes": ["Recurring themes"],
  "expertise": ["Areas where the creator shows expertise"],
  "confidence": 0.0
}}

"confidence" is your certainty in this analysis, between 0 and 1."#
        )
    }
}

/// First `max_chars` characters of `text`
fn excerpt(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
