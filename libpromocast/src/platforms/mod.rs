//! Platform abstraction and implementations
//!
//! A [`Platform`] accepts finished post text and returns the platform's id
//! for the new post. Implementations map their transport and HTTP failures
//! onto [`PlatformError`](crate::error::PlatformError) variants so the
//! publisher can classify them uniformly.
//!
//! # Examples
//!
//! ```no_run
//! use libpromocast::config::Config;
//! use libpromocast::platforms::create_platform;
//!
//! # async fn example() -> libpromocast::error::Result<()> {
//! let config = Config::load()?;
//! let mut platform = create_platform(&config)?;
//!
//! if platform.is_configured() {
//!     platform.authenticate().await?;
//!     if let Some(limit) = platform.character_limit() {
//!         println!("{} accepts up to {} characters", platform.name(), limit);
//!     }
//! }
//! # Ok(())
//! # }
//! ```

use async_trait::async_trait;

use crate::config::{Config, PlatformKind};
use crate::error::{PlatformError, Result};
use crate::text::LengthCounting;
use crate::types::ComposedPost;

pub mod x;

// Available outside tests so the binaries can run against it
pub mod mock;

/// Unified interface to a posting platform
#[async_trait]
pub trait Platform: Send + Sync {
    /// Verify credentials with the platform
    ///
    /// Should be called once before posting.
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` if the credentials are missing
    /// or rejected, `PlatformError::Network` if the platform is unreachable.
    async fn authenticate(&mut self) -> Result<()>;

    /// Submit a composed post
    ///
    /// Makes exactly one request and returns the platform-specific post id.
    ///
    /// # Errors
    ///
    /// - `PlatformError::Authentication` for rejected credentials
    /// - `PlatformError::Validation` when the platform refuses the content
    /// - `PlatformError::RateLimit` when the platform throttles the request
    /// - `PlatformError::Network` / `PlatformError::Posting` for everything else
    async fn post(&self, post: &ComposedPost) -> Result<String>;

    /// Local pre-flight check against platform limits
    ///
    /// The default checks for empty text and the character limit, measured
    /// with [`Platform::length_counting`].
    fn validate_content(&self, content: &str) -> Result<()> {
        if content.trim().is_empty() {
            return Err(PlatformError::Validation("Content cannot be empty".to_string()).into());
        }
        if let Some(limit) = self.character_limit() {
            let len = self.length_counting().measure(content);
            if len > limit {
                return Err(PlatformError::Validation(format!(
                    "Content exceeds {} character limit (got {} characters)",
                    limit, len
                ))
                .into());
            }
        }
        Ok(())
    }

    /// Lowercase platform identifier (e.g. "x")
    fn name(&self) -> &str;

    /// Maximum post length in characters, if the platform has one
    fn character_limit(&self) -> Option<usize>;

    /// How the platform counts characters against its limit
    fn length_counting(&self) -> LengthCounting {
        LengthCounting::Chars
    }

    /// Whether credentials are present
    fn is_configured(&self) -> bool;
}

/// Build the configured platform client
///
/// # Errors
///
/// Returns `PlatformError::Authentication` if the X token cannot be resolved.
pub fn create_platform(config: &Config) -> Result<Box<dyn Platform>> {
    match config.platform.kind {
        PlatformKind::X => {
            let token = config.platform_token()?;
            let platform = x::XPlatform::new(&config.platform, token, config.compose.platform_limit)?;
            Ok(Box::new(platform))
        }
        PlatformKind::Mock => Ok(Box::new(mock::MockPlatform::with_limit(
            "mock",
            config.compose.platform_limit,
        ))),
    }
}
