//! Pipeline stages and their fixed queue vocabulary.

/// One stage of the article pipeline, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    CoverImage,
    ArticleContent,
    Publish,
}

impl Stage {
    /// The stable subqueue identifier for this stage. Subqueue updates
    /// are always keyed by identifier, never by position.
    pub const fn identifier(&self) -> &'static str {
        match self {
            Stage::CoverImage => "cover-image",
            Stage::ArticleContent => "article-content",
            Stage::Publish => "publish-article",
        }
    }

    /// The stage executed after this one, if any.
    pub const fn next(&self) -> Option<Stage> {
        match self {
            Stage::CoverImage => Some(Stage::ArticleContent),
            Stage::ArticleContent => Some(Stage::Publish),
            Stage::Publish => None,
        }
    }

    /// Fixed subqueue message written when the stage succeeds.
    pub const fn success_message(&self) -> &'static str {
        match self {
            Stage::CoverImage => "Cover image generated",
            Stage::ArticleContent => "Article content generated",
            Stage::Publish => "Article published",
        }
    }

    /// Fixed subqueue message written when the stage fails.
    pub const fn failure_message(&self) -> &'static str {
        match self {
            Stage::CoverImage => "Cover image generation failed",
            Stage::ArticleContent => "Article content generation failed",
            Stage::Publish => "Article publishing failed",
        }
    }

    /// Parses a persisted stage marker.
    pub fn parse(s: &str) -> Option<Stage> {
        match s {
            "cover-image" => Some(Stage::CoverImage),
            "article-content" => Some(Stage::ArticleContent),
            "publish-article" => Some(Stage::Publish),
            _ => None,
        }
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.identifier())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_order() {
        assert_eq!(Stage::CoverImage.next(), Some(Stage::ArticleContent));
        assert_eq!(Stage::ArticleContent.next(), Some(Stage::Publish));
        assert_eq!(Stage::Publish.next(), None);
    }

    #[test]
    fn test_identifier_round_trip() {
        for stage in [Stage::CoverImage, Stage::ArticleContent, Stage::Publish] {
            assert_eq!(Stage::parse(stage.identifier()), Some(stage));
        }
        assert_eq!(Stage::parse("metadata"), None);
    }
}
