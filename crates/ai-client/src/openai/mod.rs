mod types;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;

use crate::error::AiError;
use types::{
    uses_max_completion_tokens, ChatRequest, ChatResponse, EmbeddingRequest, EmbeddingResponse,
    ResponseFormat, WireMessage,
};

const API_BASE: &str = "https://api.openai.com/v1";

/// A type an LLM can be asked to return as strict JSON.
///
/// Blanket-implemented for anything that derives `schemars::JsonSchema` and
/// `serde::Deserialize` — no manual schema authoring needed per type.
pub trait StructuredOutput: DeserializeOwned {
    fn openai_schema() -> serde_json::Value;
}

impl<T> StructuredOutput for T
where
    T: JsonSchema + DeserializeOwned,
{
    fn openai_schema() -> serde_json::Value {
        let root = schemars::gen::SchemaGenerator::default().into_root_schema_for::<T>();
        serde_json::to_value(root.schema).unwrap_or(serde_json::Value::Null)
    }
}

/// Thin client over the OpenAI chat completions and embeddings APIs.
#[derive(Clone)]
pub struct OpenAi {
    api_key: String,
    http: reqwest::Client,
}

impl OpenAi {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            http: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Result<Self, AiError> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| AiError::Config("OPENAI_API_KEY environment variable not set".into()))?;
        Ok(Self::new(api_key))
    }

    async fn send<B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<reqwest::Response, AiError> {
        let response = self
            .http
            .post(format!("{API_BASE}{path}"))
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await?;

        if response.status().as_u16() == 429 {
            let retry_after_secs = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(30);
            return Err(AiError::RateLimited { retry_after_secs });
        }

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AiError::Api(format!("{status}: {body}")));
        }

        Ok(response)
    }

    /// Type-safe structured output extraction via strict JSON schema mode.
    pub async fn extract<T: StructuredOutput>(
        &self,
        model: &str,
        system_prompt: impl Into<String>,
        user_prompt: impl Into<String>,
    ) -> Result<T, AiError> {
        let schema = T::openai_schema();

        let mut request = ChatRequest::new(model).messages(vec![
            WireMessage::system(system_prompt),
            WireMessage::user(user_prompt),
        ]);
        request.temperature = Some(0.0);

        let response_format = ResponseFormat {
            format_type: "json_schema".to_string(),
            json_schema: types::JsonSchemaFormat {
                name: "structured_response".to_string(),
                strict: true,
                schema,
            },
        };

        let body = serde_json::json!({
            "model": request.model,
            "messages": request.messages,
            "temperature": request.temperature,
            "response_format": response_format,
        });

        let response = self.send("/chat/completions", &body).await?;
        let parsed: ChatResponse = response.json().await?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::Api("no response from OpenAI".to_string()))?;

        let content = crate::util::strip_code_blocks(&content);
        serde_json::from_str(content).map_err(Into::into)
    }

    /// Simple chat completion.
    pub async fn chat_completion(
        &self,
        model: &str,
        system: impl Into<String>,
        user: impl Into<String>,
    ) -> Result<String, AiError> {
        let mut request = ChatRequest::new(model)
            .message(WireMessage::system(system))
            .message(WireMessage::user(user))
            .temperature(0.0);

        request = if uses_max_completion_tokens(model) {
            request.max_completion_tokens(4096)
        } else {
            request.max_tokens(4096)
        };

        let response = self.send("/chat/completions", &request).await?;
        let parsed: ChatResponse = response.json().await?;

        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| AiError::Api("no response from OpenAI".to_string()))
    }

    /// Simple text completion.
    pub async fn complete(&self, model: &str, prompt: &str) -> Result<String, AiError> {
        self.chat_completion(model, "You are a helpful assistant.", prompt)
            .await
    }

    /// Create an embedding for a single text.
    pub async fn create_embedding(&self, text: &str, model: &str) -> Result<Vec<f32>, AiError> {
        let mut vectors = self.create_embeddings_batch(&[text], model).await?;
        vectors
            .pop()
            .ok_or_else(|| AiError::Api("empty embeddings response".to_string()))
    }

    /// Create embeddings for a batch of texts in a single request.
    pub async fn create_embeddings_batch(
        &self,
        texts: &[&str],
        model: &str,
    ) -> Result<Vec<Vec<f32>>, AiError> {
        let request = EmbeddingRequest {
            model: model.to_string(),
            input: serde_json::json!(texts),
        };

        let response = self.send("/embeddings", &request).await?;
        let parsed: EmbeddingResponse = response.json().await?;

        Ok(parsed.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_client_from_explicit_key() {
        let client = OpenAi::new("sk-test");
        assert_eq!(client.api_key, "sk-test");
    }
}
