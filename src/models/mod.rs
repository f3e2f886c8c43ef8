use serde::{Deserialize, Serialize};

pub mod feedback;
pub mod recommendation;

pub use feedback::{FeedbackEntry, FeedbackPolarity, ReferenceItem, RESULT_SET_SIZE};
pub use recommendation::{Candidate, CandidateBatch, Recommendation};

// ============================================================================
// API Types
// ============================================================================

/// Request body for a fresh search
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    /// Feedback trail from earlier sets; the web client sends it as `context`
    #[serde(default, alias = "context")]
    pub feedback_history: Vec<FeedbackEntry>,
}

/// Request body for refining one card of the current set
#[derive(Debug, Clone, Deserialize)]
pub struct RefineRequest {
    pub feedback: FeedbackPolarity,
    #[serde(alias = "clickedResult")]
    pub clicked_result: Recommendation,
    #[serde(alias = "allResults")]
    pub all_results: Vec<Recommendation>,
    #[serde(alias = "resultIndex")]
    pub result_index: usize,
}

/// Response body shared by search and refine
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse {
    pub results: Vec<Recommendation>,
}
