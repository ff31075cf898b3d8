//! Cover-image generation backend.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{truncate_error_body, GenerationError};

/// Default connect timeout for HTTP requests (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout for image generation (120 seconds — image
/// backends are slow).
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

/// Inputs for one cover-image generation call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImageSpec {
    pub subtitle: String,
    pub keywords: String,
}

impl CoverImageSpec {
    /// Builds the text prompt sent to the image backend.
    pub fn prompt(&self) -> String {
        format!(
            "Minimal blog cover illustration for \"{}\". Themes: {}. No text in the image.",
            self.subtitle, self.keywords
        )
    }
}

/// A generated cover image, addressed by URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedImage {
    pub url: String,
}

/// Cover-image generation collaborator.
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, spec: &CoverImageSpec) -> Result<GeneratedImage, GenerationError>;
}

#[derive(Serialize)]
struct ImageRequestBody<'a> {
    prompt: &'a str,
    output_format: &'a str,
}

#[derive(Deserialize)]
struct ImageResponseBody {
    #[serde(default)]
    url: Option<String>,
}

/// HTTP implementation talking to an image-generation API.
pub struct HttpImageGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
}

impl HttpImageGenerator {
    pub fn new(endpoint: String, api_key: SecretString) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
        })
    }
}

#[async_trait]
impl ImageGenerator for HttpImageGenerator {
    async fn generate(&self, spec: &CoverImageSpec) -> Result<GeneratedImage, GenerationError> {
        let prompt = spec.prompt();
        log::debug!("Requesting cover image generation");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&ImageRequestBody {
                prompt: &prompt,
                output_format: "png",
            })
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::Api {
                status: status.as_u16(),
                body: truncate_error_body(&body),
            });
        }

        let body: ImageResponseBody = response.json().await?;
        let url = body
            .url
            .filter(|u| !u.is_empty())
            .ok_or_else(|| GenerationError::InvalidResponse("missing image url".to_string()))?;

        Ok(GeneratedImage { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_includes_subtitle_and_keywords() {
        let spec = CoverImageSpec {
            subtitle: "Why queues matter".to_string(),
            keywords: "queues, pipelines".to_string(),
        };
        let prompt = spec.prompt();
        assert!(prompt.contains("Why queues matter"));
        assert!(prompt.contains("queues, pipelines"));
    }

    #[test]
    fn test_response_body_tolerates_missing_url() {
        let body: ImageResponseBody = serde_json::from_str("{}").unwrap();
        assert!(body.url.is_none());
    }
}
