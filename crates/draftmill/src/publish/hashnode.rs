//! Hashnode GraphQL client for publishing posts.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::{PostDraft, PublishCredentials, PublishError, PublishedPost, Publisher};

/// Hashnode's public GraphQL endpoint.
pub const DEFAULT_ENDPOINT: &str = "https://gql.hashnode.com";

/// Default connect timeout for HTTP requests (10 seconds).
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default request timeout for HTTP requests (30 seconds).
const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const PUBLISH_POST_MUTATION: &str = r#"
mutation PublishPost($input: PublishPostInput!) {
  publishPost(input: $input) {
    post {
      id
      url
    }
  }
}
"#;

#[derive(Serialize)]
struct GraphqlRequest<'a> {
    query: &'a str,
    variables: serde_json::Value,
}

#[derive(Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<PublishData>,
    #[serde(default)]
    errors: Vec<GraphqlError>,
}

#[derive(Deserialize)]
struct GraphqlError {
    message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct PublishData {
    publish_post: Option<PublishPostPayload>,
}

#[derive(Deserialize)]
struct PublishPostPayload {
    post: Option<PostPayload>,
}

#[derive(Deserialize)]
struct PostPayload {
    id: String,
    url: String,
}

/// HTTP publisher for Hashnode.
pub struct HashnodePublisher {
    client: reqwest::Client,
    endpoint: String,
}

impl HashnodePublisher {
    pub fn new(endpoint: String) -> Result<Self, PublishError> {
        let client = reqwest::Client::builder()
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .timeout(DEFAULT_REQUEST_TIMEOUT)
            .build()?;
        Ok(Self { client, endpoint })
    }

    /// Builds the `PublishPostInput` variables for a draft.
    fn input_variables(draft: &PostDraft, publication_id: &str) -> serde_json::Value {
        json!({
            "input": {
                "title": draft.title,
                "subtitle": draft.subtitle,
                "contentMarkdown": draft.content_markdown,
                "slug": draft.slug,
                "publicationId": publication_id,
                "coverImageOptions": {
                    "coverImageURL": draft.cover_image_url,
                },
                "metaTags": {
                    "title": draft.title,
                    "description": draft.subtitle,
                    "image": draft.cover_image_url,
                },
                "tags": draft.tag_ids.iter().map(|id| json!({"id": id})).collect::<Vec<_>>(),
            }
        })
    }
}

#[async_trait]
impl Publisher for HashnodePublisher {
    async fn create_post(
        &self,
        draft: &PostDraft,
        credentials: &PublishCredentials,
    ) -> Result<PublishedPost, PublishError> {
        log::debug!("Publishing post with slug '{}'", draft.slug);

        let response = self
            .client
            .post(&self.endpoint)
            .header("Authorization", credentials.api_key.expose_secret())
            .json(&GraphqlRequest {
                query: PUBLISH_POST_MUTATION,
                variables: Self::input_variables(draft, &credentials.publication_id),
            })
            .send()
            .await?
            .error_for_status()?;

        let body: GraphqlResponse = response.json().await?;

        // GraphQL reports business errors in-band with a 200.
        if let Some(error) = body.errors.first() {
            return Err(PublishError::Rejected(error.message.clone()));
        }

        let post = body
            .data
            .and_then(|d| d.publish_post)
            .and_then(|p| p.post)
            .ok_or_else(|| {
                PublishError::InvalidResponse("response carried no post payload".to_string())
            })?;

        Ok(PublishedPost {
            id: post.id,
            url: post.url,
        })
    }
}
