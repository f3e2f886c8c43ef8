/// OpenAI chat-completions provider
///
/// Uses structured outputs (`response_format: json_schema`, strict) so the model
/// answers with an object matching the schema in the request. The message content
/// is parsed as JSON before it leaves this module.
use std::time::Duration;

use reqwest::Client as HttpClient;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::{
    error::{AppError, AppResult},
    services::providers::{CompletionProvider, StructuredCompletion},
};

#[derive(Clone)]
pub struct OpenAiProvider {
    http_client: HttpClient,
    api_key: Option<String>,
    api_url: String,
    model: String,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u64,
}

impl OpenAiProvider {
    pub fn new(
        api_key: Option<String>,
        api_url: String,
        model: String,
        timeout: Duration,
    ) -> AppResult<Self> {
        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            api_url,
            model,
        })
    }

    fn api_key(&self) -> AppResult<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            AppError::Configuration("OPENAI_API_KEY is required to generate recommendations".to_string())
        })
    }

    fn build_request_body(&self, request: &StructuredCompletion) -> Value {
        json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": request.system_prompt },
                { "role": "user", "content": request.user_prompt }
            ],
            "temperature": request.temperature,
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": request.schema_name,
                    "strict": true,
                    "schema": request.schema
                }
            }
        })
    }

    /// Pulls the structured object out of a completion response
    fn parse_completion(response: ChatCompletionResponse) -> AppResult<Value> {
        if let Some(usage) = &response.usage {
            tracing::info!(
                total_tokens = usage.total_tokens,
                provider = "openai",
                "Completion received"
            );
        }

        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Generation("model returned no choices".to_string()))?;

        if let Some(refusal) = choice.message.refusal {
            return Err(AppError::Generation(format!("model refused: {}", refusal)));
        }

        if choice.finish_reason.as_deref() == Some("length") {
            return Err(AppError::Generation(
                "model output was truncated before the schema was complete".to_string(),
            ));
        }

        let content = choice
            .message
            .content
            .filter(|c| !c.trim().is_empty())
            .ok_or_else(|| AppError::Generation("model returned empty content".to_string()))?;

        serde_json::from_str(&content).map_err(|e| {
            tracing::error!(error = %e, content = %content, "Failed to parse model output");
            AppError::Generation(format!("model output is not valid JSON: {}", e))
        })
    }
}

#[async_trait::async_trait]
impl CompletionProvider for OpenAiProvider {
    fn ensure_configured(&self) -> AppResult<()> {
        self.api_key().map(|_| ())
    }

    async fn complete(&self, request: StructuredCompletion) -> AppResult<Value> {
        let api_key = self.api_key()?;
        let url = format!("{}/chat/completions", self.api_url);

        tracing::info!(
            model = %self.model,
            schema = %request.schema_name,
            provider = "openai",
            "Calling model"
        );

        let response = self
            .http_client
            .post(&url)
            .bearer_auth(api_key)
            .json(&self.build_request_body(&request))
            .send()
            .await
            .map_err(AppError::generation_transport)?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = %status, body = %body, "OpenAI API error");
            return Err(AppError::Generation(format!(
                "OpenAI API returned status {}: {}",
                status, body
            )));
        }

        let completion: ChatCompletionResponse = response.json().await.map_err(|e| {
            AppError::Generation(format!("Failed to parse OpenAI response: {}", e))
        })?;

        Self::parse_completion(completion)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::stub_server;
    use tokio_test::{assert_err, assert_ok};

    fn create_test_provider(api_key: Option<&str>) -> OpenAiProvider {
        OpenAiProvider::new(
            api_key.map(str::to_string),
            // Unroutable, so any accidental request fails loudly
            "http://127.0.0.1:9".to_string(),
            "gpt-4o-mini".to_string(),
            Duration::from_secs(1),
        )
        .unwrap()
    }

    fn provider_at(api_url: String, timeout: Duration) -> OpenAiProvider {
        OpenAiProvider::new(
            Some("sk-test".to_string()),
            api_url,
            "gpt-4o-mini".to_string(),
            timeout,
        )
        .unwrap()
    }

    fn sample_request() -> StructuredCompletion {
        StructuredCompletion {
            system_prompt: "system".to_string(),
            user_prompt: "Query: rainy day ideas".to_string(),
            schema_name: "recommendations".to_string(),
            schema: json!({ "type": "object" }),
            temperature: 0.8,
        }
    }

    fn completion(json: &str) -> ChatCompletionResponse {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_ensure_configured() {
        assert_ok!(create_test_provider(Some("sk-test")).ensure_configured());
        let err = assert_err!(create_test_provider(None).ensure_configured());
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_complete_without_key_fails_before_request() {
        let provider = create_test_provider(None);
        let request = StructuredCompletion {
            system_prompt: "system".to_string(),
            user_prompt: "user".to_string(),
            schema_name: "recommendations".to_string(),
            schema: json!({}),
            temperature: 0.8,
        };

        let result = provider.complete(request).await;
        assert!(matches!(result, Err(AppError::Configuration(_))));
    }

    #[test]
    fn test_build_request_body() {
        let provider = create_test_provider(Some("sk-test"));
        let request = StructuredCompletion {
            system_prompt: "You are a creative recommendation engine.".to_string(),
            user_prompt: "Query: rainy day ideas".to_string(),
            schema_name: "recommendations".to_string(),
            schema: json!({ "type": "object" }),
            temperature: 0.8,
        };

        let body = provider.build_request_body(&request);

        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Query: rainy day ideas");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(body["response_format"]["json_schema"]["schema"]["type"], "object");
        assert!((body["temperature"].as_f64().unwrap() - 0.8).abs() < 1e-6);
    }

    #[test]
    fn test_parse_completion_success() {
        let response = completion(
            r#"{
                "choices": [{
                    "message": {
                        "role": "assistant",
                        "content": "{\"recommendations\": []}",
                        "refusal": null
                    },
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
            }"#,
        );

        let value = OpenAiProvider::parse_completion(response).unwrap();
        assert_eq!(value, json!({ "recommendations": [] }));
    }

    #[test]
    fn test_parse_completion_refusal() {
        let response = completion(
            r#"{"choices": [{"message": {"content": null, "refusal": "I can't help with that."}}]}"#,
        );

        let result = OpenAiProvider::parse_completion(response);
        assert!(matches!(result, Err(AppError::Generation(msg)) if msg.contains("refused")));
    }

    #[test]
    fn test_parse_completion_invalid_json() {
        let response = completion(
            r#"{"choices": [{"message": {"content": "here are three ideas"}, "finish_reason": "stop"}]}"#,
        );

        let result = OpenAiProvider::parse_completion(response);
        assert!(matches!(result, Err(AppError::Generation(_))));
    }

    #[test]
    fn test_parse_completion_no_choices() {
        let response = completion(r#"{"choices": []}"#);
        assert!(matches!(
            OpenAiProvider::parse_completion(response),
            Err(AppError::Generation(_))
        ));
    }

    #[test]
    fn test_parse_completion_truncated() {
        let response = completion(
            r#"{"choices": [{"message": {"content": "{\"recommendations\": ["}, "finish_reason": "length"}]}"#,
        );
        assert!(matches!(
            OpenAiProvider::parse_completion(response),
            Err(AppError::Generation(msg)) if msg.contains("truncated")
        ));
    }

    #[tokio::test]
    async fn test_complete_returns_parsed_content() {
        let body = r#"{"choices": [{"message": {"content": "{\"recommendations\": []}"}, "finish_reason": "stop"}]}"#;
        let url = stub_server::respond_once(200, "OK", body).await;
        let provider = provider_at(url, Duration::from_secs(2));

        let value = assert_ok!(provider.complete(sample_request()).await);
        assert_eq!(value, json!({ "recommendations": [] }));
    }

    #[tokio::test]
    async fn test_complete_server_error_is_generation_error() {
        let url = stub_server::respond_once(
            500,
            "Internal Server Error",
            r#"{"error": {"message": "upstream exploded"}}"#,
        )
        .await;
        let provider = provider_at(url, Duration::from_secs(2));

        let err = assert_err!(provider.complete(sample_request()).await);
        assert!(matches!(
            err,
            AppError::Generation(ref msg) if msg.contains("500") && msg.contains("upstream exploded")
        ));
    }

    #[tokio::test]
    async fn test_complete_times_out_as_generation_error() {
        let url = stub_server::never_responds().await;
        let provider = provider_at(url, Duration::from_millis(300));

        let err = assert_err!(provider.complete(sample_request()).await);
        assert!(matches!(err, AppError::Generation(ref msg) if msg.contains("timed out")));
    }
}
