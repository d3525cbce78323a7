use crate::domain::error::DomainError;
use crate::domain::ports::embedding_port::{check_dimension, EmbeddingProvider};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_OPENAI_MODEL: &str = "text-embedding-ada-002";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com";

pub struct OpenAiProvider {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

#[derive(Serialize)]
struct OpenAiRequest<'a> {
    input: &'a str,
    model: &'a str,
}

#[derive(Deserialize)]
struct OpenAiResponse {
    data: Vec<OpenAiEmbedding>,
}

#[derive(Deserialize)]
struct OpenAiEmbedding {
    embedding: Vec<f32>,
}

impl OpenAiProvider {
    /// Fails when no API key is available or the HTTP client cannot be built.
    pub fn try_new(
        api_key: Option<String>,
        model: Option<String>,
        base_url: Option<String>,
        timeout: Duration,
    ) -> Result<Self, DomainError> {
        let api_key = api_key
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DomainError::ProviderInit("OPENAI_API_KEY is not set".into()))?;
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| DomainError::ProviderInit(format!("HTTP client error: {e}")))?;

        Ok(Self {
            client,
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
            base_url: base_url
                .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string())
                .trim_end_matches('/')
                .to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn model_dimension(model: &str) -> usize {
        match model {
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" | "text-embedding-3-small" => 1536,
            _ => 1536,
        }
    }
}

#[async_trait::async_trait]
impl EmbeddingProvider for OpenAiProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, DomainError> {
        let url = format!("{}/v1/embeddings", self.base_url);
        let resp = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&OpenAiRequest {
                input: text,
                model: &self.model,
            })
            .send()
            .await
            .map_err(|e| DomainError::EmbeddingRequest(format!("OpenAI API error: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(DomainError::EmbeddingRequest(format!(
                "OpenAI API {status}: {body}"
            )));
        }

        let result: OpenAiResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::EmbeddingRequest(format!("Parse error: {e}")))?;
        let vector = result
            .data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| DomainError::EmbeddingRequest("OpenAI response had no embeddings".into()))?;

        check_dimension(self.dimension(), &vector)?;
        Ok(vector)
    }

    fn dimension(&self) -> usize {
        Self::model_dimension(&self.model)
    }

    fn name(&self) -> String {
        format!("openai/{}", self.model)
    }
}
