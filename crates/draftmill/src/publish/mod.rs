//! Publishing collaborator: the external platform that hosts the
//! finished article.

use async_trait::async_trait;
use secrecy::SecretString;
use thiserror::Error;

pub mod hashnode;
pub mod slug;

pub use hashnode::HashnodePublisher;
pub use slug::slugify;

/// Errors from a publish invocation.
#[derive(Error, Debug)]
pub enum PublishError {
    /// Transport-level failure reaching the platform.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The platform accepted the request but rejected the post.
    #[error("Publish rejected: {0}")]
    Rejected(String),

    /// The user has no stored publishing credentials.
    #[error("Missing publishing credentials for user '{0}'")]
    MissingCredentials(String),

    /// The platform answered 2xx but the payload was not usable.
    #[error("Invalid publish response: {0}")]
    InvalidResponse(String),
}

/// Per-user credentials for the publishing platform.
pub struct PublishCredentials {
    pub api_key: SecretString,
    pub publication_id: String,
}

/// A finished article ready to publish.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub title: String,
    pub subtitle: String,
    pub content_markdown: String,
    pub slug: String,
    pub cover_image_url: String,
    /// Platform tag ids attached to the post.
    pub tag_ids: Vec<String>,
}

/// The platform's record of a published article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub id: String,
    pub url: String,
}

/// Publishing collaborator.
#[async_trait]
pub trait Publisher: Send + Sync {
    async fn create_post(
        &self,
        draft: &PostDraft,
        credentials: &PublishCredentials,
    ) -> Result<PublishedPost, PublishError>;
}
