//! Core types for Promocast
//!
//! Each stage of the pipeline hands the next one a distinct type, so a
//! post cannot reach the platform without passing validation and
//! composition first.

use serde::{Deserialize, Serialize};

/// Where a draft came from
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DraftOrigin {
    Generated,
    Fallback,
}

impl std::fmt::Display for DraftOrigin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DraftOrigin::Generated => write!(f, "generated"),
            DraftOrigin::Fallback => write!(f, "fallback"),
        }
    }
}

/// Unvalidated candidate post text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    text: String,
    origin: DraftOrigin,
}

impl Draft {
    pub fn new(text: impl Into<String>, origin: DraftOrigin) -> Self {
        Self {
            text: text.into(),
            origin,
        }
    }

    pub fn generated(text: impl Into<String>) -> Self {
        Self::new(text, DraftOrigin::Generated)
    }

    pub fn fallback(text: impl Into<String>) -> Self {
        Self::new(text, DraftOrigin::Fallback)
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> DraftOrigin {
        self.origin
    }
}

/// Draft text that passed every content rule
///
/// Only [`crate::validation::ContentValidator`] constructs these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedContent {
    text: String,
    origin: DraftOrigin,
    repaired: bool,
}

impl ValidatedContent {
    pub(crate) fn new(text: String, origin: DraftOrigin, repaired: bool) -> Self {
        Self {
            text,
            origin,
            repaired,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> DraftOrigin {
        self.origin
    }

    /// True if the text was truncated, padded or tidied to pass
    pub fn was_repaired(&self) -> bool {
        self.repaired
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Re-wrap as a draft with the same origin
    pub fn to_draft(&self) -> Draft {
        Draft::new(self.text.clone(), self.origin)
    }
}

/// Final text submitted to the platform
///
/// Not `Clone`; each publish attempt composes a fresh post.
#[derive(Debug, PartialEq, Eq)]
pub struct ComposedPost {
    text: String,
    origin: DraftOrigin,
    cta: Option<String>,
    hashtags: String,
    content_truncated: bool,
}

impl ComposedPost {
    pub(crate) fn new(
        text: String,
        origin: DraftOrigin,
        cta: Option<String>,
        hashtags: String,
        content_truncated: bool,
    ) -> Self {
        Self {
            text,
            origin,
            cta,
            hashtags,
            content_truncated,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn origin(&self) -> DraftOrigin {
        self.origin
    }

    pub fn cta(&self) -> Option<&str> {
        self.cta.as_deref()
    }

    pub fn hashtags(&self) -> &str {
        &self.hashtags
    }

    /// True if the content portion was cut to fit the platform ceiling
    pub fn content_truncated(&self) -> bool {
        self.content_truncated
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Classified publish failure
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum PublishErrorKind {
    /// Platform throttled the request; cool down before the next cycle
    RateLimited,
    /// Content or size violation; never resubmit the same text
    Rejected,
    /// Credentials are invalid; no automatic recovery
    AuthFailure,
    /// Anything else, treated as transient
    Unknown,
}

impl std::fmt::Display for PublishErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PublishErrorKind::RateLimited => write!(f, "rate_limited"),
            PublishErrorKind::Rejected => write!(f, "rejected"),
            PublishErrorKind::AuthFailure => write!(f, "auth_failure"),
            PublishErrorKind::Unknown => write!(f, "unknown"),
        }
    }
}

/// Outcome of one publish attempt
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostResult {
    pub success: bool,
    pub platform_id: Option<String>,
    pub error_kind: Option<PublishErrorKind>,
    pub error_message: Option<String>,
}

impl PostResult {
    pub fn posted(platform_id: String) -> Self {
        Self {
            success: true,
            platform_id: Some(platform_id),
            error_kind: None,
            error_message: None,
        }
    }

    pub fn failed(kind: PublishErrorKind, message: impl Into<String>) -> Self {
        Self {
            success: false,
            platform_id: None,
            error_kind: Some(kind),
            error_message: Some(message.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_draft_constructors_set_origin() {
        assert_eq!(Draft::generated("a").origin(), DraftOrigin::Generated);
        assert_eq!(Draft::fallback("a").origin(), DraftOrigin::Fallback);
    }

    #[test]
    fn test_validated_content_counts_chars_not_bytes() {
        let content = ValidatedContent::new("héllo 🚀".to_string(), DraftOrigin::Generated, false);
        assert_eq!(content.len(), 7);
    }

    #[test]
    fn test_post_result_serializes_error_kind_snake_case() {
        let result = PostResult::failed(PublishErrorKind::RateLimited, "slow down");
        let json = serde_json::to_string(&result).unwrap();
        assert!(json.contains("\"rate_limited\""));
        assert!(!result.success);
        assert!(result.platform_id.is_none());
    }

    #[test]
    fn test_post_result_posted() {
        let result = PostResult::posted("1234".to_string());
        assert!(result.success);
        assert_eq!(result.platform_id.as_deref(), Some("1234"));
        assert!(result.error_kind.is_none());
    }
}
