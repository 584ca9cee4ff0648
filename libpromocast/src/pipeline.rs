//! One posting cycle: source, validator, composer, publisher

use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::compose::Composer;
use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::platforms::{create_platform, Platform};
use crate::publisher::Publisher;
use crate::source::ContentSource;
use crate::types::{ComposedPost, DraftOrigin, PostResult, ValidatedContent};
use crate::validation::{ContentValidator, Rejection};

/// Content chosen for a cycle, with how it was obtained
#[derive(Debug, Clone)]
pub struct Prepared {
    pub content: ValidatedContent,
    /// The generator was configured but produced nothing usable
    pub generation_failed: bool,
    /// Why a generated draft was discarded, if it was
    pub rejection: Option<Rejection>,
}

/// Summary of one cycle, printed by the binaries
#[derive(Debug, Clone, Serialize)]
pub struct CycleReport {
    pub origin: DraftOrigin,
    pub generation_failed: bool,
    pub rejection: Option<String>,
    pub repaired: bool,
    pub content_truncated: bool,
    pub text: String,
    /// `None` for dry runs
    pub result: Option<PostResult>,
}

impl CycleReport {
    fn new(prepared: &Prepared, post: &ComposedPost, result: Option<PostResult>) -> Self {
        Self {
            origin: post.origin(),
            generation_failed: prepared.generation_failed,
            rejection: prepared.rejection.as_ref().map(|r| r.to_string()),
            repaired: prepared.content.was_repaired(),
            content_truncated: post.content_truncated(),
            text: post.text().to_string(),
            result,
        }
    }
}

pub struct Pipeline {
    source: ContentSource,
    validator: ContentValidator,
    composer: Composer,
    publisher: Publisher,
}

impl Pipeline {
    pub fn new(
        source: ContentSource,
        validator: ContentValidator,
        composer: Composer,
        publisher: Publisher,
    ) -> Self {
        Self {
            source,
            validator,
            composer,
            publisher,
        }
    }

    /// Build every stage from configuration, using the configured platform
    ///
    /// # Errors
    ///
    /// Fails on inconsistent content rules, a fallback pool entry that does
    /// not pass them unchanged, a composer with no room for content, or
    /// unresolvable credentials.
    pub fn from_config(config: &Config, generate: bool) -> Result<Self> {
        let platform = create_platform(config)?;
        Self::from_config_with_platform(config, platform, generate)
    }

    /// Build from configuration with an explicitly supplied platform
    ///
    /// The composer measures length the way `platform` does. Every fallback
    /// entry must fit under the ceiling with the longest call-to-action and
    /// hashtag suffix, so a fallback post is never cut.
    pub fn from_config_with_platform(
        config: &Config,
        platform: Box<dyn Platform>,
        generate: bool,
    ) -> Result<Self> {
        let validator = ContentValidator::new(config.content.rules())?;
        let source = ContentSource::from_config(config, &validator, generate)?;
        let composer = Composer::with_counting(&config.compose, platform.length_counting())?;

        for (i, entry) in source.pool().entries().iter().enumerate() {
            if !composer.fits_uncut(entry.text()) {
                return Err(ConfigError::invalid(
                    &format!("content.fallback_messages[{}]", i),
                    format!(
                        "does not fit under the {} limit with the longest call-to-action and hashtags",
                        composer.ceiling()
                    ),
                )
                .into());
            }
        }

        Ok(Self::new(source, validator, composer, Publisher::new(platform)))
    }

    pub fn source(&self) -> &ContentSource {
        &self.source
    }

    pub fn validator(&self) -> &ContentValidator {
        &self.validator
    }

    pub fn composer(&self) -> &Composer {
        &self.composer
    }

    pub fn platform_name(&self) -> &str {
        self.publisher.platform_name()
    }

    pub async fn authenticate(&mut self) -> Result<()> {
        self.publisher.authenticate().await
    }

    /// Obtain validated content, falling back on any generation or validation failure
    pub async fn prepare<R: Rng + ?Sized>(&self, rng: &mut R) -> Prepared {
        let draft = match self.source.generate().await {
            Some(draft) => draft,
            None => {
                return Prepared {
                    content: self.source.fallback(rng),
                    generation_failed: self.source.has_generator(),
                    rejection: None,
                }
            }
        };

        match self.validator.validate(&draft) {
            Ok(content) => {
                debug!(repaired = content.was_repaired(), "Generated draft accepted");
                Prepared {
                    content,
                    generation_failed: false,
                    rejection: None,
                }
            }
            Err(rejection) => {
                warn!(reason = %rejection, "Generated draft rejected, using fallback");
                Prepared {
                    content: self.source.fallback(rng),
                    generation_failed: false,
                    rejection: Some(rejection),
                }
            }
        }
    }

    /// Compose prepared content
    ///
    /// Cutting content to fit can drop its only marker. Such a post is
    /// re-checked and replaced by a composed fallback entry.
    pub fn compose<R: Rng + ?Sized>(
        &self,
        prepared: Prepared,
        rng: &mut R,
    ) -> (Prepared, ComposedPost) {
        let post = self.composer.compose(&prepared.content, rng);
        if !post.content_truncated() {
            return (prepared, post);
        }

        match self.validator.recheck(post.text()) {
            Ok(()) => (prepared, post),
            Err(rejection) => {
                warn!(reason = %rejection, "Cut post failed content rules, using fallback");
                let content = self.source.fallback(rng);
                let post = self.composer.compose(&content, rng);
                let prepared = Prepared {
                    content,
                    rejection: Some(rejection),
                    ..prepared
                };
                (prepared, post)
            }
        }
    }

    /// Prepare and compose without publishing
    pub async fn dry_run<R: Rng + ?Sized>(&self, rng: &mut R) -> CycleReport {
        let prepared = self.prepare(rng).await;
        let (prepared, post) = self.compose(prepared, rng);
        CycleReport::new(&prepared, &post, None)
    }

    /// Run one full cycle with a single publish attempt
    pub async fn run_cycle<R: Rng + ?Sized>(&self, rng: &mut R) -> CycleReport {
        let prepared = self.prepare(rng).await;
        let (prepared, post) = self.compose(prepared, rng);
        info!(
            origin = %post.origin(),
            chars = post.len(),
            platform = %self.publisher.platform_name(),
            "Publishing"
        );

        let preview = CycleReport::new(&prepared, &post, None);
        let result = self.publisher.publish(post).await;
        CycleReport {
            result: Some(result),
            ..preview
        }
    }
}
