/// Upstream provider abstractions
///
/// Recommendation text comes from a language model and pictures come from a
/// photo search service. Both sit behind traits so alternate providers can be
/// swapped in without touching the orchestration in `services::recommendations`.
use futures::future::join_all;
use serde_json::Value;

use crate::error::AppResult;

pub mod openai;
pub mod pexels;
#[cfg(test)]
pub(crate) mod stub_server;

/// A single structured-output request to a language model
#[derive(Debug, Clone, PartialEq)]
pub struct StructuredCompletion {
    pub system_prompt: String,
    pub user_prompt: String,
    /// Name attached to the schema in the provider request
    pub schema_name: String,
    /// JSON schema the response must conform to
    pub schema: Value,
    pub temperature: f32,
}

/// Trait for language model providers that can return schema-conforming JSON
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CompletionProvider: Send + Sync {
    /// Fails with `AppError::Configuration` when the provider cannot be used at all.
    ///
    /// Called before any upstream request so a missing credential never costs a
    /// network round trip.
    fn ensure_configured(&self) -> AppResult<()>;

    /// Runs the completion and returns the parsed JSON object.
    ///
    /// Transport failures, upstream errors, refusals and unparsable output all
    /// surface as `AppError::Generation`.
    async fn complete(&self, request: StructuredCompletion) -> AppResult<Value>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Trait for services that map a short visual phrase to a representative image
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait ImageResolver: Send + Sync {
    /// Fails with `AppError::Configuration` when the resolver cannot be used at all
    fn ensure_configured(&self) -> AppResult<()>;

    /// Returns the URL of the most relevant image for `phrase`
    async fn resolve(&self, phrase: &str) -> AppResult<String>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}

/// Resolves every phrase concurrently, preserving input order.
///
/// Waits for all lookups to settle; if any of them failed the whole batch
/// fails with the first error in input order.
pub async fn resolve_all(resolver: &dyn ImageResolver, phrases: &[String]) -> AppResult<Vec<String>> {
    let lookups = phrases.iter().map(|phrase| resolver.resolve(phrase));
    let outcomes = join_all(lookups).await;

    let failures = outcomes.iter().filter(|o| o.is_err()).count();
    if failures > 0 {
        tracing::warn!(
            provider = resolver.name(),
            phrases = phrases.len(),
            failures,
            "Image batch failed"
        );
    }

    outcomes.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use std::time::Duration;

    /// Answers slower for earlier phrases so completion order is reversed
    struct StaggeredResolver;

    #[async_trait::async_trait]
    impl ImageResolver for StaggeredResolver {
        fn ensure_configured(&self) -> AppResult<()> {
            Ok(())
        }

        async fn resolve(&self, phrase: &str) -> AppResult<String> {
            let delay = match phrase {
                "a" => 30,
                "b" => 20,
                _ => 10,
            };
            tokio::time::sleep(Duration::from_millis(delay)).await;
            Ok(format!("https://images.test/{}.jpg", phrase))
        }

        fn name(&self) -> &'static str {
            "staggered"
        }
    }

    fn phrases(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[tokio::test]
    async fn test_resolve_all_preserves_order() {
        let urls = resolve_all(&StaggeredResolver, &phrases(&["a", "b", "c"]))
            .await
            .unwrap();

        assert_eq!(
            urls,
            vec![
                "https://images.test/a.jpg",
                "https://images.test/b.jpg",
                "https://images.test/c.jpg",
            ]
        );
    }

    #[tokio::test]
    async fn test_resolve_all_empty_batch() {
        let urls = resolve_all(&StaggeredResolver, &[]).await.unwrap();
        assert!(urls.is_empty());
    }

    #[tokio::test]
    async fn test_resolve_all_fails_whole_batch() {
        let mut resolver = MockImageResolver::new();
        resolver.expect_name().return_const("mock");
        resolver.expect_resolve().times(3).returning(|phrase| {
            if phrase == "empty lot" {
                Err(AppError::ImageNotFound {
                    phrase: phrase.to_string(),
                })
            } else {
                Ok(format!("https://images.test/{}.jpg", phrase))
            }
        });

        let result = resolve_all(&resolver, &phrases(&["a", "empty lot", "c"])).await;

        assert!(matches!(result, Err(AppError::ImageNotFound { phrase }) if phrase == "empty lot"));
    }
}
