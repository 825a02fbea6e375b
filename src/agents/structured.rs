//! Structured completions
//!
//! Every stage asks the model for a single JSON object and decodes it into a
//! typed, range-checked value. Anything that does not decode or validate is
//! an [`AppError::AnalysisParse`] for that stage.

use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use validator::Validate;

use crate::config::Config;
use crate::llm::LLM;
use crate::types::{AppError, AppResult, LLMMessage, LLMRequest, Stage};

/// Provider and model settings applied to every stage request
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub provider: String,
    pub model: String,
    pub max_tokens: u32,
}

impl CompletionSettings {
    pub fn from_config(config: &Config) -> Self {
        Self {
            provider: config.llm.provider.clone(),
            model: config.llm.model.clone(),
            max_tokens: config.llm.max_tokens,
        }
    }
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            provider: "openai".to_string(),
            model: "gpt-4o-mini".to_string(),
            max_tokens: 2048,
        }
    }
}

/// Send one prompt and decode the reply as `T`
pub async fn complete_json<T>(
    llm: &LLM,
    settings: &CompletionSettings,
    stage: Stage,
    system_instruction: &str,
    prompt: String,
    temperature: f32,
    cancel: &CancellationToken,
) -> AppResult<T>
where
    T: DeserializeOwned + Validate,
{
    let request = LLMRequest {
        provider: settings.provider.clone(),
        model: settings.model.clone(),
        messages: vec![LLMMessage::user(prompt)],
        max_tokens: Some(settings.max_tokens),
        temperature: Some(temperature),
        system_instruction: Some(system_instruction.to_string()),
    };

    let response = llm.complete(&request, cancel).await?;
    debug!(
        stage = %stage,
        response_len = response.content.len(),
        total_tokens = response.usage.total_tokens,
        "Received stage completion"
    );

    decode(stage, &response.content)
}

/// Decode model output into a validated value
pub fn decode<T>(stage: Stage, response: &str) -> AppResult<T>
where
    T: DeserializeOwned + Validate,
{
    let json_str = extract_json(response);

    let value: T = serde_json::from_str(json_str)
        .map_err(|e| AppError::parse(stage, format!("invalid JSON: {}", e)))?;

    value
        .validate()
        .map_err(|e| AppError::parse(stage, format!("schema violation: {}", e)))?;

    Ok(value)
}

/// Strip markdown code fences some models wrap around JSON.
///
/// Text that already parses as JSON is returned as is, so backticks inside
/// string values are never mistaken for a fence.
pub fn extract_json(response: &str) -> &str {
    let trimmed = response.trim();
    if serde_json::from_str::<serde::de::IgnoredAny>(trimmed).is_ok() {
        return trimmed;
    }

    if let Some((_, rest)) = trimmed.split_once("```json") {
        rest.split("```").next().unwrap_or(rest).trim()
    } else if let Some((_, rest)) = trimmed.split_once("```") {
        rest.split("```").next().unwrap_or(rest).trim()
    } else {
        trimmed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ContentAnalysis;

    const CONTENT: &str = r#"{
        "genre": "Fitness",
        "subGenres": ["Strength"],
        "mainTopics": ["Kettlebells"],
        "contentStyle": "Tutorial",
        "contentTone": "Encouraging",
        "keyThemes": ["Consistency"],
        "expertise": ["Programming"],
        "confidence": 0.82
    }"#;

    #[test]
    fn test_extract_json_from_fence() {
        let wrapped = format!("Here you go:\n```json\n{}\n```\nThanks", CONTENT);
        let analysis: ContentAnalysis = decode(Stage::Content, &wrapped).unwrap();
        assert_eq!(analysis.genre, "Fitness");
        assert_eq!(analysis.confidence, 0.82);
    }

    #[test]
    fn test_extract_json_plain_fence() {
        assert_eq!(extract_json("```\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(extract_json("  {\"a\":1} "), "{\"a\":1}");
    }

    #[test]
    fn test_backticks_inside_string_values_are_kept() {
        let json = CONTENT.replace("\"Kettlebells\"", r#""Wrap code in ``` fences""#);
        let analysis: ContentAnalysis = decode(Stage::Content, &json).unwrap();
        assert_eq!(analysis.main_topics, vec!["Wrap code in ``` fences".to_string()]);

        let fenced = format!("```json\n{}\n```", CONTENT);
        let analysis: ContentAnalysis = decode(Stage::Content, &fenced).unwrap();
        assert_eq!(analysis.main_topics, vec!["Kettlebells".to_string()]);
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let result: AppResult<ContentAnalysis> = decode(Stage::Content, "not json at all");
        match result {
            Err(AppError::AnalysisParse { stage, message }) => {
                assert_eq!(stage, Stage::Content);
                assert!(message.starts_with("invalid JSON"));
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_shape_mismatch_is_parse_error() {
        let result: AppResult<ContentAnalysis> =
            decode(Stage::Content, r#"{"genre": "Fitness", "confidence": 0.9}"#);
        assert!(matches!(result, Err(AppError::AnalysisParse { .. })));
    }

    #[test]
    fn test_out_of_range_confidence_is_schema_violation() {
        let json = CONTENT.replace("0.82", "82");
        let result: AppResult<ContentAnalysis> = decode(Stage::Content, &json);
        match result {
            Err(AppError::AnalysisParse { message, .. }) => {
                assert!(message.starts_with("schema violation"))
            }
            other => panic!("expected schema violation, got {:?}", other),
        }
    }
}
