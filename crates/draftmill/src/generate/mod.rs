//! Generation collaborators: cover-image and article-content backends.
//!
//! The pipeline talks to these through narrow traits so tests can swap
//! in doubles; the HTTP implementations live alongside them.

use thiserror::Error;

pub mod content;
pub mod image;

pub use content::{ContentGenerator, ContentSpec, GeneratedContent, HttpContentGenerator};
pub use image::{CoverImageSpec, GeneratedImage, HttpImageGenerator, ImageGenerator};

/// Maximum length for error bodies captured from a backend, to keep
/// logs and error chains bounded.
const MAX_ERROR_BODY_LENGTH: usize = 200;

/// Truncates a backend error body to a loggable length. Cuts at a char
/// boundary; the body is arbitrary text from the backend and the limit
/// may land mid-character.
pub(crate) fn truncate_error_body(body: &str) -> String {
    if body.len() <= MAX_ERROR_BODY_LENGTH {
        return body.to_string();
    }
    let cut = body
        .char_indices()
        .take_while(|(i, _)| *i <= MAX_ERROR_BODY_LENGTH)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0);
    format!("{}... (truncated)", &body[..cut])
}

/// Errors from a generation backend invocation.
#[derive(Error, Debug)]
pub enum GenerationError {
    /// Transport-level failure reaching the backend.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The backend answered with a non-success status.
    #[error("Generation API returned {status}: {body}")]
    Api { status: u16, body: String },

    /// The backend answered 2xx but the payload was not usable.
    #[error("Invalid generation response: {0}")]
    InvalidResponse(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_error_body_short() {
        assert_eq!(truncate_error_body("oops"), "oops");
    }

    #[test]
    fn test_truncate_error_body_long() {
        let long = "x".repeat(500);
        let truncated = truncate_error_body(&long);
        assert!(truncated.len() < 300);
        assert!(truncated.ends_with("(truncated)"));
    }

    #[test]
    fn test_truncate_error_body_multibyte_at_limit() {
        // A two-byte character straddling the limit must not split.
        let body = format!("{}é{}", "a".repeat(MAX_ERROR_BODY_LENGTH - 1), "b".repeat(50));
        let truncated = truncate_error_body(&body);
        assert!(truncated.ends_with("(truncated)"));
        assert!(truncated.is_char_boundary(truncated.len()));

        let all_multibyte = "é".repeat(MAX_ERROR_BODY_LENGTH);
        let truncated = truncate_error_body(&all_multibyte);
        assert!(truncated.ends_with("(truncated)"));
    }
}
