use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult};

use super::Recommendation;

/// Number of cards in a result set
pub const RESULT_SET_SIZE: usize = 3;

/// How the user reacted to a card
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FeedbackPolarity {
    Similar,
    Different,
}

impl FeedbackPolarity {
    /// How many replacement cards a refinement with this polarity produces
    pub fn replacement_count(self) -> usize {
        match self {
            FeedbackPolarity::Similar => 2,
            FeedbackPolarity::Different => 1,
        }
    }
}

impl Display for FeedbackPolarity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FeedbackPolarity::Similar => write!(f, "SIMILAR"),
            FeedbackPolarity::Different => write!(f, "DIFFERENT"),
        }
    }
}

/// One entry of the feedback trail sent back with a fresh search
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FeedbackEntry {
    pub title: String,
    pub feedback: FeedbackPolarity,
}

/// The card a refinement reacts to, together with the rest of its set
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceItem {
    pub clicked: Recommendation,
    pub index: usize,
    others: Vec<Recommendation>,
}

impl ReferenceItem {
    /// Builds a reference from the caller's current set.
    ///
    /// The clicked card is excluded from `others` by position, so a
    /// duplicate of it elsewhere in the set still counts as another item.
    pub fn new(
        clicked: Recommendation,
        all_results: Vec<Recommendation>,
        index: usize,
    ) -> AppResult<Self> {
        if all_results.len() != RESULT_SET_SIZE {
            return Err(AppError::InvalidInput(format!(
                "all_results must contain exactly {} items, got {}",
                RESULT_SET_SIZE,
                all_results.len()
            )));
        }

        if index >= all_results.len() {
            return Err(AppError::InvalidInput(format!(
                "result_index {} is out of range for {} results",
                index,
                all_results.len()
            )));
        }

        let others = all_results
            .into_iter()
            .enumerate()
            .filter(|(i, _)| *i != index)
            .map(|(_, r)| r)
            .collect();

        Ok(Self {
            clicked,
            index,
            others,
        })
    }

    /// The two cards the user did not react to, in their original order
    pub fn others(&self) -> &[Recommendation] {
        &self.others
    }
}
