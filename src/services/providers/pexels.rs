/// Pexels photo search provider
///
/// API Flow:
/// 1. Search: /search?query=..&per_page=5&orientation=landscape
/// 2. The first (most relevant) photo wins; its `src.large` URL is returned
///
/// Selection is deterministic so the same phrase maps to the same card image.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;

use crate::{
    error::{AppError, AppResult},
    services::providers::ImageResolver,
};

/// Candidates requested per search; only the first is used
const RESULTS_PER_SEARCH: u32 = 5;
const ORIENTATION: &str = "landscape";

#[derive(Clone)]
pub struct PexelsResolver {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
}

#[derive(Debug, Deserialize)]
struct PexelsSearchResponse {
    #[serde(default)]
    photos: Vec<PexelsPhoto>,
}

#[derive(Debug, Deserialize)]
struct PexelsPhoto {
    #[serde(default)]
    photographer: Option<String>,
    src: PexelsPhotoSources,
}

#[derive(Debug, Deserialize)]
struct PexelsPhotoSources {
    large: String,
}

impl PexelsResolver {
    pub fn new(api_key: Option<String>, api_url: String, timeout: Duration) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
        })
    }

    fn api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration(
                "PEXELS_API_KEY is required. Get a free key at https://www.pexels.com/api/"
                    .to_string(),
            )
        })
    }

    fn select_image(phrase: &str, search: PexelsSearchResponse) -> AppResult<String> {
        let photo = search
            .photos
            .into_iter()
            .next()
            .ok_or_else(|| AppError::ImageNotFound {
                phrase: phrase.to_string(),
            })?;

        tracing::info!(
            phrase = %phrase,
            photographer = photo.photographer.as_deref().unwrap_or("unknown"),
            image_url = %photo.src.large,
            provider = "pexels",
            "Image resolved"
        );

        Ok(photo.src.large)
    }
}

#[async_trait::async_trait]
impl ImageResolver for PexelsResolver {
    fn ensure_configured(&self) -> AppResult<()> {
        self.api_key().map(|_| ())
    }

    async fn resolve(&self, phrase: &str) -> AppResult<String> {
        let api_key = self.api_key()?;
        let url = format!("{}/search", self.api_url);
        let per_page = RESULTS_PER_SEARCH.to_string();

        let response = self
            .http_client
            .get(&url)
            .header("Authorization", api_key)
            .query(&[
                ("query", phrase),
                ("per_page", per_page.as_str()),
                ("orientation", ORIENTATION),
            ])
            .send()
            .await
            .map_err(AppError::image_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, phrase = %phrase, "Pexels API error");
            return Err(AppError::ImageService {
                status: status.as_u16(),
                body,
            });
        }

        let search: PexelsSearchResponse =
            response.json().await.map_err(AppError::image_transport)?;

        if search.photos.is_empty() {
            tracing::warn!(phrase = %phrase, provider = "pexels", "No images found");
        }

        Self::select_image(phrase, search)
    }

    fn name(&self) -> &'static str {
        "pexels"
    }
}
