//! Publisher: one platform call per composed post

use tracing::{info, warn};

use crate::error::{PlatformError, PromocastError, Result};
use crate::platforms::Platform;
use crate::types::{ComposedPost, PostResult, PublishErrorKind};

/// Submits composed posts to a single platform
pub struct Publisher {
    platform: Box<dyn Platform>,
}

impl Publisher {
    pub fn new(platform: Box<dyn Platform>) -> Self {
        Self { platform }
    }

    pub fn platform_name(&self) -> &str {
        self.platform.name()
    }

    /// Verify credentials before the first publish
    pub async fn authenticate(&mut self) -> Result<()> {
        if !self.platform.is_configured() {
            return Err(PlatformError::Authentication(format!(
                "{} is not configured. Suggestion: provide credentials before running.",
                self.platform.name()
            ))
            .into());
        }
        self.platform.authenticate().await
    }

    /// Submit a post exactly once
    ///
    /// Takes the post by value; a failed attempt is never resubmitted.
    pub async fn publish(&self, post: ComposedPost) -> PostResult {
        let name = self.platform.name();

        let outcome = match self.platform.validate_content(post.text()) {
            Ok(()) => self.platform.post(&post).await,
            Err(e) => Err(e),
        };

        match outcome {
            Ok(id) => {
                info!(platform = %name, post_id = %id, origin = %post.origin(), "Posted");
                PostResult::posted(id)
            }
            Err(e) => {
                let kind = classify(&e);
                warn!(platform = %name, kind = %kind, error = %e, "Publish failed");
                PostResult::failed(kind, e.to_string())
            }
        }
    }
}

/// Map a publish error onto the scheduler's failure kinds
pub fn classify(error: &PromocastError) -> PublishErrorKind {
    match error {
        PromocastError::Platform(PlatformError::RateLimit(_)) => PublishErrorKind::RateLimited,
        PromocastError::Platform(PlatformError::Validation(_)) => PublishErrorKind::Rejected,
        PromocastError::Platform(PlatformError::Authentication(_)) => PublishErrorKind::AuthFailure,
        _ => PublishErrorKind::Unknown,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platforms::mock::MockPlatform;
    use crate::types::DraftOrigin;

    fn post(text: &str) -> ComposedPost {
        ComposedPost::new(
            text.to_string(),
            DraftOrigin::Generated,
            None,
            "#Lumen".to_string(),
            false,
        )
    }

    #[tokio::test]
    async fn test_publish_success() {
        let platform = MockPlatform::new_simple("mock");
        let handle = platform.clone();
        let publisher = Publisher::new(Box::new(platform));

        let result = publisher.publish(post("Lumen\n\n#Lumen")).await;
        assert!(result.success);
        assert!(result.platform_id.unwrap().starts_with("mock:mock-"));
        assert_eq!(handle.post_call_count(), 1);
    }

    #[tokio::test]
    async fn test_publish_makes_exactly_one_call_on_failure() {
        let platform = MockPlatform::new_simple("mock")
            .then_fail(PlatformError::Network("timeout".to_string()));
        let handle = platform.clone();
        let publisher = Publisher::new(Box::new(platform));

        let result = publisher.publish(post("Lumen")).await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(PublishErrorKind::Unknown));
        assert_eq!(handle.post_call_count(), 1);
    }

    #[tokio::test]
    async fn test_over_limit_is_rejected_without_network_call() {
        let mut platform = MockPlatform::with_limit("mock", 5);
        platform.authenticate().await.unwrap();
        let handle = platform.clone();
        let publisher = Publisher::new(Box::new(platform));

        let result = publisher.publish(post("Lumen is long")).await;
        assert_eq!(result.error_kind, Some(PublishErrorKind::Rejected));
        assert_eq!(handle.post_call_count(), 0);
    }

    #[tokio::test]
    async fn test_authenticate_requires_configuration() {
        let mut publisher = Publisher::new(Box::new(MockPlatform::not_configured("mock")));
        let err = publisher.authenticate().await.unwrap_err();
        assert_eq!(classify(&err), PublishErrorKind::AuthFailure);
    }

    #[test]
    fn test_classify() {
        let cases = [
            (PlatformError::RateLimit("x".into()), PublishErrorKind::RateLimited),
            (PlatformError::Validation("x".into()), PublishErrorKind::Rejected),
            (PlatformError::Authentication("x".into()), PublishErrorKind::AuthFailure),
            (PlatformError::Network("x".into()), PublishErrorKind::Unknown),
            (PlatformError::Posting("x".into()), PublishErrorKind::Unknown),
        ];
        for (error, expected) in cases {
            assert_eq!(classify(&error.into()), expected);
        }
        assert_eq!(
            classify(&PromocastError::Generation("x".into())),
            PublishErrorKind::Unknown
        );
    }
}
