//! Typed payloads flowing between stages.
//!
//! Every stage receives an explicit input struct carrying the job and
//! owner ids plus the outputs of earlier stages, rather than a loose
//! bag of fields. The failure handler reads its context from the same
//! structs.

use serde::{Deserialize, Serialize};

/// The initiating event payload accepted by the job entry point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleRequest {
    pub job_id: String,
    pub user_id: String,
    pub title: String,
    pub subtitle: String,
    pub keywords: String,
}

/// Input to the cover-image stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverImageInput {
    pub job_id: String,
    pub user_id: String,
    pub title: String,
    pub subtitle: String,
    pub keywords: String,
}

impl From<&ArticleRequest> for CoverImageInput {
    fn from(request: &ArticleRequest) -> Self {
        Self {
            job_id: request.job_id.clone(),
            user_id: request.user_id.clone(),
            title: request.title.clone(),
            subtitle: request.subtitle.clone(),
            keywords: request.keywords.clone(),
        }
    }
}

/// Input to the article-content stage; carries the cover-image URL
/// produced by the previous stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentInput {
    pub job_id: String,
    pub user_id: String,
    pub title: String,
    pub subtitle: String,
    pub cover_image_url: String,
}

/// Input to the publish stage; carries everything the platform needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishInput {
    pub job_id: String,
    pub user_id: String,
    pub title: String,
    pub subtitle: String,
    pub cover_image_url: String,
    pub content: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_request_deserializes_camel_case() {
        let request: ArticleRequest = serde_json::from_str(
            r#"{"jobId": "j1", "userId": "u1", "title": "T", "subtitle": "S", "keywords": "k"}"#,
        )
        .unwrap();
        assert_eq!(request.job_id, "j1");
        assert_eq!(request.user_id, "u1");
    }

    #[test]
    fn test_cover_image_input_from_request() {
        let request = ArticleRequest {
            job_id: "j1".to_string(),
            user_id: "u1".to_string(),
            title: "T".to_string(),
            subtitle: "S".to_string(),
            keywords: "k".to_string(),
        };
        let input = CoverImageInput::from(&request);
        assert_eq!(input.job_id, "j1");
        assert_eq!(input.keywords, "k");
    }
}
