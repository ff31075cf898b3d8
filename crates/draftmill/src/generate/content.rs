//! Article-content generation backend (chat-completion style API).

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::{truncate_error_body, GenerationError};

/// Default connect timeout for HTTP requests (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout for content generation (300 seconds — long
/// articles take a while).
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Inputs for one article-content generation call. The user's stored
/// preferences are carried explicitly rather than re-fetched here.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContentSpec {
    pub title: String,
    pub subtitle: String,
    pub chat_history: String,
    pub context: String,
    /// Writing style preference (e.g. "casual"), if the user set one.
    pub style: Option<String>,
    /// Author voice to imitate, if the user set one.
    pub author_name: Option<String>,
}

impl ContentSpec {
    fn system_prompt(&self) -> String {
        let mut prompt = String::from(
            "You are a technical blog writer. Produce a complete article in Markdown.",
        );
        if let Some(style) = &self.style {
            prompt.push_str(&format!(" Write in a {} style.", style));
        }
        if let Some(author) = &self.author_name {
            prompt.push_str(&format!(" Write in the voice of {}.", author));
        }
        prompt
    }

    fn user_prompt(&self) -> String {
        let mut prompt = format!("Title: {}\nSubtitle: {}", self.title, self.subtitle);
        if !self.context.is_empty() {
            prompt.push_str(&format!("\nContext: {}", self.context));
        }
        if !self.chat_history.is_empty() {
            prompt.push_str(&format!("\nPrior conversation: {}", self.chat_history));
        }
        prompt
    }
}

/// A generated article body in Markdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedContent {
    pub content: String,
}

/// Article-content generation collaborator.
#[async_trait]
pub trait ContentGenerator: Send + Sync {
    async fn generate(&self, spec: &ContentSpec) -> Result<GeneratedContent, GenerationError>;
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequestBody<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
}

#[derive(Deserialize)]
struct ChatResponseBody {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

/// HTTP implementation talking to a chat-completions API.
pub struct HttpContentGenerator {
    client: reqwest::Client,
    endpoint: String,
    api_key: SecretString,
    model: String,
}

impl HttpContentGenerator {
    pub fn new(
        endpoint: String,
        api_key: SecretString,
        model: String,
    ) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            model,
        })
    }
}

#[async_trait]
impl ContentGenerator for HttpContentGenerator {
    async fn generate(&self, spec: &ContentSpec) -> Result<GeneratedContent, GenerationError> {
        let system = spec.system_prompt();
        let user = spec.user_prompt();
        log::debug!("Requesting article content generation");

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(self.api_key.expose_secret())
            .json(&ChatRequestBody {
                model: &self.model,
                messages: vec![
                    ChatMessage {
                        role: "system",
                        content: &system,
                    },
                    ChatMessage {
                        role: "user",
                        content: &user,
                    },
                ],
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

        let body: ChatResponseBody = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .filter(|c| !c.is_empty())
            .ok_or_else(|| {
                GenerationError::InvalidResponse("no completion choices returned".to_string())
            })?;

        Ok(GeneratedContent { content })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_prompt_with_preferences() {
        let spec = ContentSpec {
            style: Some("casual".to_string()),
            author_name: Some("Ada".to_string()),
            ..Default::default()
        };
        let prompt = spec.system_prompt();
        assert!(prompt.contains("casual style"));
        assert!(prompt.contains("voice of Ada"));
    }

    #[test]
    fn test_system_prompt_without_preferences() {
        let spec = ContentSpec::default();
        let prompt = spec.system_prompt();
        assert!(!prompt.contains("style."));
        assert!(!prompt.contains("voice of"));
    }

    #[test]
    fn test_user_prompt_skips_empty_sections() {
        let spec = ContentSpec {
            title: "T".to_string(),
            subtitle: "S".to_string(),
            ..Default::default()
        };
        let prompt = spec.user_prompt();
        assert!(prompt.contains("Title: T"));
        assert!(!prompt.contains("Context:"));
        assert!(!prompt.contains("Prior conversation:"));
    }

    #[test]
    fn test_chat_response_parses_first_choice() {
        let body: ChatResponseBody = serde_json::from_str(
            r##"{"choices": [{"message": {"role": "assistant", "content": "# Hello"}}]}"##,
        )
        .unwrap();
        assert_eq!(body.choices[0].message.content, "# Hello");
    }
}
