//! SerpAPI web search
//!
//! Production [`SearchTool`] backed by SerpAPI's Google Light engine. Organic
//! results are condensed into a short bullet summary that analyzers fold
//! into their prompts.

use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serpapi_search_rust::serp_api_search::SerpApiSearch;
use tracing::{debug, info};

use super::{SearchTool, ToolError};
use crate::config::SearchConfig;

/// One organic search result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub snippet: String,
    pub link: String,
    /// Source domain
    pub source: Option<String>,
}

pub struct SerpApiSearchTool {
    api_key: String,
    max_results: usize,
}

impl SerpApiSearchTool {
    /// Configure from the search section of the app config.
    /// Returns `None` when no key is set.
    pub fn from_config(config: &SearchConfig) -> Option<Self> {
        if config.serpapi_key.is_empty() {
            return None;
        }

        Some(Self {
            api_key: config.serpapi_key.clone(),
            max_results: config.max_results,
        })
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchHit>, ToolError> {
        info!(query = %query, "Searching Google Light via SerpAPI");

        let mut params = HashMap::<String, String>::new();
        params.insert("engine".to_string(), "google_light".to_string());
        params.insert("q".to_string(), query.to_string());
        params.insert("hl".to_string(), "en".to_string());
        params.insert("gl".to_string(), "us".to_string());
        params.insert("num".to_string(), self.max_results.to_string());

        let search = SerpApiSearch::google(params, self.api_key.clone());

        let results = search
            .json()
            .await
            .map_err(|e| ToolError::RequestFailed(e.to_string()))?;

        debug!("Raw Light response received");

        let hits = parse_organic_results(&results, self.max_results)?;
        info!(count = hits.len(), "Google Light search completed");
        Ok(hits)
    }
}

#[async_trait]
impl SearchTool for SerpApiSearchTool {
    async fn web_search(&self, query: &str) -> Result<String, ToolError> {
        let hits = self.search(query).await?;
        Ok(summarize(&hits))
    }
}

fn parse_organic_results(results: &Value, max_results: usize) -> Result<Vec<SearchHit>, ToolError> {
    let organic_results = results.get("organic_results").ok_or(ToolError::NoResults)?;

    let results_array = organic_results
        .as_array()
        .ok_or_else(|| ToolError::ParseError("Expected array of results".to_string()))?;

    if results_array.is_empty() {
        return Err(ToolError::NoResults);
    }

    let hits = results_array
        .iter()
        .take(max_results)
        .map(|result| {
            let title = result
                .get("title")
                .and_then(|v| v.as_str())
                .unwrap_or("Untitled")
                .to_string();

            let snippet = result
                .get("snippet")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();

            let link = result
                .get("link")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string();

            let source = result
                .get("source")
                .and_then(|v| v.as_str())
                .map(String::from)
                .or_else(|| link.split('/').nth(2).map(String::from));

            SearchHit {
                title,
                snippet,
                link,
                source,
            }
        })
        .collect();

    Ok(hits)
}

fn summarize(hits: &[SearchHit]) -> String {
    hits.iter()
        .map(|hit| match &hit.source {
            Some(source) => format!("- {} ({}): {}", hit.title, source, hit.snippet),
            None => format!("- {}: {}", hit.title, hit.snippet),
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_organic_results() {
        let body = serde_json::json!({
            "organic_results": [
                {
                    "title": "Home gym market report",
                    "snippet": "Resistance bands up 40%",
                    "link": "https://example.com/report"
                },
                {
                    "title": "Second",
                    "snippet": "Ignored",
                    "link": "https://other.com/x",
                    "source": "Other"
                }
            ]
        });

        let hits = parse_organic_results(&body, 1).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].source.as_deref(), Some("example.com"));
        assert_eq!(
            summarize(&hits),
            "- Home gym market report (example.com): Resistance bands up 40%"
        );
    }

    #[test]
    fn test_from_config_requires_key() {
        let mut config = SearchConfig {
            serpapi_key: String::new(),
            max_results: 3,
            validation_seed: 42,
        };
        assert!(SerpApiSearchTool::from_config(&config).is_none());

        config.serpapi_key = "key".to_string();
        let tool = SerpApiSearchTool::from_config(&config).unwrap();
        assert_eq!(tool.max_results, 3);
    }

    #[test]
    fn test_missing_results_is_no_results() {
        let body = serde_json::json!({ "search_metadata": {} });
        assert!(matches!(parse_organic_results(&body, 5), Err(ToolError::NoResults)));

        let empty = serde_json::json!({ "organic_results": [] });
        assert!(matches!(parse_organic_results(&empty, 5), Err(ToolError::NoResults)));
    }
}
