use std::collections::HashSet;
use std::sync::Arc;

use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    models::{Candidate, CandidateBatch, FeedbackEntry, FeedbackPolarity, ReferenceItem, RESULT_SET_SIZE},
    services::{
        prompts::{self, Prompt},
        providers::{CompletionProvider, StructuredCompletion},
    },
};

/// Sampling temperature for every generation; favors variety over repeatability
pub const TEMPERATURE: f32 = 0.8;

const SCHEMA_NAME: &str = "recommendations";

/// What the generator is asked to produce
#[derive(Debug, Clone)]
pub enum GenerationMode {
    /// A new set of cards for a query, optionally steered by earlier feedback
    Fresh {
        query: String,
        feedback_history: Vec<FeedbackEntry>,
    },
    /// Replacement cards for one card of an existing set
    Refine {
        polarity: FeedbackPolarity,
        reference: ReferenceItem,
    },
}

impl GenerationMode {
    /// Number of candidates this mode must yield
    pub fn requested_count(&self) -> usize {
        match self {
            GenerationMode::Fresh { .. } => RESULT_SET_SIZE,
            GenerationMode::Refine { polarity, .. } => polarity.replacement_count(),
        }
    }

    /// Picks the template for the mode and fills it in
    pub fn prompt(&self) -> Prompt {
        let count = self.requested_count();
        match self {
            GenerationMode::Fresh {
                query,
                feedback_history,
            } if feedback_history.is_empty() => prompts::fresh(query, count),
            GenerationMode::Fresh {
                query,
                feedback_history,
            } => prompts::fresh_with_feedback(query, feedback_history, count),
            GenerationMode::Refine {
                polarity: FeedbackPolarity::Similar,
                reference,
            } => prompts::refine_similar(reference, count),
            GenerationMode::Refine {
                polarity: FeedbackPolarity::Different,
                reference,
            } => prompts::refine_different(reference),
        }
    }
}

/// JSON schema for the model's answer: an object holding an array of candidates
pub fn candidate_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "recommendations": {
                "type": "array",
                "items": {
                    "type": "object",
                    "properties": {
                        "title": { "type": "string" },
                        "description": { "type": "string" },
                        "visual_search_phrase": { "type": "string" },
                        "url": { "type": "string" }
                    },
                    "required": ["title", "description", "visual_search_phrase", "url"],
                    "additionalProperties": false
                }
            }
        },
        "required": ["recommendations"],
        "additionalProperties": false
    })
}

/// Turns queries and feedback into candidate recommendations via a language model
#[derive(Clone)]
pub struct RecommendationGenerator {
    provider: Arc<dyn CompletionProvider>,
}

impl RecommendationGenerator {
    pub fn new(provider: Arc<dyn CompletionProvider>) -> Self {
        Self { provider }
    }

    pub fn ensure_configured(&self) -> AppResult<()> {
        self.provider.ensure_configured()
    }

    /// Generates at most `mode.requested_count()` candidates.
    ///
    /// Extra candidates are dropped. A short batch is returned as is; padding is
    /// the caller's concern. There is no retry against the model.
    pub async fn generate(&self, mode: &GenerationMode) -> AppResult<Vec<Candidate>> {
        let requested = mode.requested_count();
        let prompt = mode.prompt();

        let output = self
            .provider
            .complete(StructuredCompletion {
                system_prompt: prompt.system,
                user_prompt: prompt.user,
                schema_name: SCHEMA_NAME.to_string(),
                schema: candidate_schema(),
                temperature: TEMPERATURE,
            })
            .await?;

        let batch: CandidateBatch = serde_json::from_value(output).map_err(|e| {
            AppError::Generation(format!("model output does not match the schema: {}", e))
        })?;

        let received = batch.recommendations.len();
        let mut candidates = batch.recommendations;
        candidates.truncate(requested);

        tracing::info!(
            provider = self.provider.name(),
            requested,
            received,
            "Generated candidates"
        );
        for (idx, candidate) in candidates.iter().enumerate() {
            tracing::info!(
                position = idx + 1,
                title = %candidate.title,
                phrase = %candidate.visual_search_phrase,
                "Candidate"
            );
        }

        warn_on_duplicate_phrases(&candidates);

        Ok(candidates)
    }
}

/// Phrase distinctness is only requested of the model; duplicates are logged, not rejected
fn warn_on_duplicate_phrases(candidates: &[Candidate]) -> usize {
    let mut seen = HashSet::new();
    let mut duplicates = 0;

    for candidate in candidates {
        let key = candidate
            .visual_search_phrase
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        if !seen.insert(key) {
            duplicates += 1;
            tracing::warn!(
                phrase = %candidate.visual_search_phrase,
                "Duplicate visual search phrase in batch"
            );
        }
    }

    duplicates
}
