use std::sync::Arc;

use crate::{
    config::Config,
    error::AppResult,
    services::{
        providers::{openai::OpenAiProvider, pexels::PexelsResolver},
        RecommendationService,
    },
};

/// Shared application state
///
/// Built once at startup and only read afterwards; no per-request data lives here.
#[derive(Clone)]
pub struct AppState {
    pub recommendations: Arc<RecommendationService>,
}

impl AppState {
    pub fn new(recommendations: RecommendationService) -> Self {
        Self {
            recommendations: Arc::new(recommendations),
        }
    }

    /// Wires the OpenAI and Pexels clients from configuration.
    ///
    /// Missing API keys do not fail here; every request fails instead, before
    /// any upstream call.
    pub fn from_config(config: &Config) -> AppResult<Self> {
        let completions = OpenAiProvider::new(
            config.openai_api_key.clone(),
            config.openai_api_url.clone(),
            config.openai_model.clone(),
            config.upstream_timeout(),
        )?;

        let images = PexelsResolver::new(
            config.pexels_api_key.clone(),
            config.pexels_api_url.clone(),
            config.upstream_timeout(),
        )?;

        Ok(Self::new(RecommendationService::new(
            Arc::new(completions),
            Arc::new(images),
        )))
    }
}
