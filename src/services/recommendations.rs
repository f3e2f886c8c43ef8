use std::sync::Arc;

use crate::{
    error::AppResult,
    models::{Candidate, FeedbackEntry, FeedbackPolarity, Recommendation, ReferenceItem},
    services::{
        generator::{GenerationMode, RecommendationGenerator},
        providers::{resolve_all, CompletionProvider, ImageResolver},
    },
};

/// Visual phrase used for candidates without one and for filler cards
pub const FALLBACK_PHRASE: &str = "abstract";
pub const FALLBACK_TITLE: &str = "Explore More";
pub const FALLBACK_DESCRIPTION: &str = "Try a different search";
pub const FALLBACK_URL: &str = "https://google.com";

/// Builds recommendation card sets from queries and feedback.
///
/// Stateless: everything a request needs arrives with it, and the provider
/// handles are shared read-only across requests.
#[derive(Clone)]
pub struct RecommendationService {
    generator: RecommendationGenerator,
    images: Arc<dyn ImageResolver>,
}

impl RecommendationService {
    pub fn new(completions: Arc<dyn CompletionProvider>, images: Arc<dyn ImageResolver>) -> Self {
        Self {
            generator: RecommendationGenerator::new(completions),
            images,
        }
    }

    /// Produces a fresh set of exactly three cards for `query`
    pub async fn search(
        &self,
        query: String,
        feedback_history: Vec<FeedbackEntry>,
    ) -> AppResult<Vec<Recommendation>> {
        self.run(GenerationMode::Fresh {
            query,
            feedback_history,
        })
        .await
    }

    /// Produces replacement cards for the referenced card: two for SIMILAR, one for DIFFERENT
    pub async fn refine(
        &self,
        polarity: FeedbackPolarity,
        reference: ReferenceItem,
    ) -> AppResult<Vec<Recommendation>> {
        self.run(GenerationMode::Refine {
            polarity,
            reference,
        })
        .await
    }

    async fn run(&self, mode: GenerationMode) -> AppResult<Vec<Recommendation>> {
        // Both credentials are checked before anything goes over the wire
        self.generator.ensure_configured()?;
        self.images.ensure_configured()?;

        let expected = mode.requested_count();
        let candidates = self.generator.generate(&mode).await?;
        let results = self.attach_images(candidates).await?;

        self.pad_to(results, expected).await
    }

    /// Resolves one image per candidate and merges them into cards
    async fn attach_images(&self, candidates: Vec<Candidate>) -> AppResult<Vec<Recommendation>> {
        let phrases: Vec<String> = candidates
            .iter()
            .map(|c| {
                let phrase = c.visual_search_phrase.trim();
                if phrase.is_empty() {
                    FALLBACK_PHRASE.to_string()
                } else {
                    phrase.to_string()
                }
            })
            .collect();

        tracing::info!(
            count = phrases.len(),
            provider = self.images.name(),
            "Fetching images"
        );

        let image_urls = resolve_all(self.images.as_ref(), &phrases).await?;

        Ok(candidates
            .into_iter()
            .zip(image_urls)
            .map(|(candidate, image_url)| candidate.into_recommendation(image_url))
            .collect())
    }

    /// Tops a short set up with filler cards, then cuts it to exactly `expected`.
    ///
    /// Every filler looks up its own image.
    async fn pad_to(
        &self,
        mut results: Vec<Recommendation>,
        expected: usize,
    ) -> AppResult<Vec<Recommendation>> {
        if results.len() < expected {
            tracing::warn!(
                received = results.len(),
                expected,
                "Model under-produced, padding with filler cards"
            );
        }

        while results.len() < expected {
            let image_url = self.images.resolve(FALLBACK_PHRASE).await?;
            results.push(Recommendation {
                title: FALLBACK_TITLE.to_string(),
                description: FALLBACK_DESCRIPTION.to_string(),
                image_url,
                url: FALLBACK_URL.to_string(),
            });
        }

        results.truncate(expected);
        Ok(results)
    }
}
