//! Schema-constrained generation against the generateContent API.

use crate::config::AppConfig;
use crate::error::GenerateError;
use crate::http::{HttpRequest, RetryClient, Transport};
use crate::model::TopicTree;
use crate::prompts::TOPIC_GENERATION_INSTRUCTION;
use crate::schema::StructuredOutput;
use serde::Deserialize;
use serde_json::{Value, json};
use std::sync::Arc;

/// Header carrying the API key
pub const API_KEY_HEADER: &str = "x-goog-api-key";

/// Client for one model on the generative language API
#[derive(Clone)]
pub struct Generator {
    client: RetryClient,
    api_base_url: String,
    model: String,
}

impl Generator {
    pub fn new(client: RetryClient, api_base_url: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client,
            api_base_url: api_base_url.into(),
            model: model.into(),
        }
    }

    pub fn from_config(transport: Arc<dyn Transport>, config: &AppConfig) -> Self {
        Self::new(
            RetryClient::new(transport, config.retry_policy()),
            config.api_base_url.clone(),
            config.model.clone(),
        )
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> String {
        format!(
            "{}/models/{}:generateContent",
            self.api_base_url.trim_end_matches('/'),
            self.model
        )
    }

    /// Run one generation call and decode the output as `T`.
    ///
    /// The output schema sent with the request is derived from `T`.
    pub async fn generate<T: StructuredOutput>(
        &self,
        system_instruction: &str,
        user_context: &str,
        credential: &str,
    ) -> Result<T, GenerateError> {
        let schema = T::response_schema();
        ::log::debug!(
            "Response schema for {}: {}",
            T::type_name(),
            serde_json::to_string(&schema).unwrap_or_default()
        );

        let payload = build_payload(system_instruction, user_context, &schema);
        let body = serde_json::to_string(&payload).map_err(|e| GenerateError::Request(e.to_string()))?;
        let request = HttpRequest::post_json(self.endpoint(), body).header(API_KEY_HEADER, credential);

        ::log::info!("Generating {} with {}", T::type_name(), self.model);
        let start = std::time::Instant::now();

        let response = self.client.send(request).await?;
        if response.status != 200 {
            let error = provider_error(response.status, &response.body);
            ::log::error!("Generation failed: {}", error);
            return Err(error);
        }

        let text = extract_text(&response.body)?;
        let value = decode::<T>(&text)?;

        ::log::info!(
            "Generated {} in {:.2} seconds",
            T::type_name(),
            start.elapsed().as_secs_f64()
        );
        Ok(value)
    }

    /// Generate the topic tree for an assembled context
    pub async fn generate_topics(&self, user_context: &str, credential: &str) -> Result<TopicTree, GenerateError> {
        self.generate::<TopicTree>(TOPIC_GENERATION_INSTRUCTION, user_context, credential)
            .await
    }
}

/// Request body for a generateContent call
pub fn build_payload(system_instruction: &str, user_context: &str, schema: &Value) -> Value {
    json!({
        "contents": [{ "parts": [{ "text": user_context }] }],
        "systemInstruction": { "parts": [{ "text": system_instruction }] },
        "generationConfig": {
            "responseMimeType": "application/json",
            "responseSchema": schema,
        }
    })
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ProviderError,
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: String,
    #[serde(default)]
    status: Option<String>,
}

/// Map a non-200 response to the provider's error when its body decodes
fn provider_error(status: u16, body: &str) -> GenerateError {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(ErrorEnvelope { error }) => GenerateError::Provider {
            status,
            code: error
                .status
                .or_else(|| error.code.map(|c| c.to_string()))
                .unwrap_or_else(|| status.to_string()),
            message: error.message,
        },
        Err(_) => GenerateError::Http {
            status,
            body: body.trim().to_string(),
        },
    }
}

/// Text of the first part of the first candidate
fn extract_text(body: &str) -> Result<String, GenerateError> {
    let envelope: GenerateContentResponse =
        serde_json::from_str(body).map_err(|e| GenerateError::ResponseShape {
            detail: format!("invalid response envelope: {}", e),
        })?;

    envelope
        .candidates
        .into_iter()
        .next()
        .and_then(|c| c.content)
        .and_then(|c| c.parts.into_iter().next())
        .and_then(|p| p.text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(GenerateError::MissingContent)
}

/// Parse generated text as JSON, then as `T`
fn decode<T: StructuredOutput>(text: &str) -> Result<T, GenerateError> {
    let value: Value = serde_json::from_str(strip_code_fence(text)).map_err(|e| GenerateError::ResponseShape {
        detail: format!("generated text is not valid JSON: {}", e),
    })?;

    serde_json::from_value(value).map_err(|e| GenerateError::ResponseShape {
        detail: format!("generated JSON does not match {}: {}", T::type_name(), e),
    })
}

fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .and_then(|rest| rest.strip_suffix("```"))
        .map(str::trim)
        .unwrap_or(trimmed)
}
