//! Reflection Gate
//!
//! Shared retry policy for every stage: a result whose confidence is below
//! the threshold is regenerated, up to `max_attempts` attempts in total.
//! Errors are never retried here; only low confidence is.

use std::future::Future;

use tracing::info;

use crate::config::PipelineConfig;
use crate::types::{AppResult, Stage};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReflectionGate {
    threshold: f64,
    max_attempts: u32,
}

impl Default for ReflectionGate {
    fn default() -> Self {
        Self::new(0.6, 2)
    }
}

impl ReflectionGate {
    pub fn new(threshold: f64, max_attempts: u32) -> Self {
        Self {
            threshold,
            max_attempts,
        }
    }

    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.confidence_threshold, config.max_attempts)
    }

    /// Strictly below the threshold and attempts remain
    pub fn should_retry(&self, confidence: f64, attempt: u32) -> bool {
        confidence < self.threshold && attempt < self.max_attempts
    }

    /// Gate `result` (produced by `attempt`), calling `retry` with the next
    /// attempt number while the gate asks for it. The result of the final
    /// permitted attempt is returned whatever its confidence.
    pub async fn reflect<T, C, R, Fut>(
        &self,
        stage: Stage,
        mut result: T,
        mut attempt: u32,
        confidence: C,
        mut retry: R,
    ) -> AppResult<T>
    where
        C: Fn(&T) -> f64,
        R: FnMut(u32) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        loop {
            let score = confidence(&result);
            if !self.should_retry(score, attempt) {
                info!(stage = %stage, attempt, confidence = score, "Stage result accepted");
                return Ok(result);
            }

            attempt += 1;
            info!(
                stage = %stage,
                attempt,
                confidence = score,
                threshold = self.threshold,
                "Confidence below threshold, retrying stage"
            );
            result = retry(attempt).await?;
        }
    }

    /// Run attempt 1 and gate it
    pub async fn run<T, C, R, Fut>(&self, stage: Stage, confidence: C, mut attempt_fn: R) -> AppResult<T>
    where
        C: Fn(&T) -> f64,
        R: FnMut(u32) -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let first = attempt_fn(1).await?;
        self.reflect(stage, first, 1, confidence, attempt_fn).await
    }
}
