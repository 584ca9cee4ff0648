//! Content source: generated drafts with a static fallback pool

use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use crate::config::Config;
use crate::error::{ConfigError, Result};
use crate::generators::{create_generator, normalize_generated, GenerationRequest, TextGenerator};
use crate::types::{Draft, ValidatedContent};
use crate::validation::ContentValidator;

/// Pre-approved messages used whenever generation fails or is rejected
///
/// Every entry is checked once on construction and must pass the content
/// rules without any repair.
#[derive(Debug, Clone)]
pub struct FallbackPool {
    entries: Vec<ValidatedContent>,
}

impl FallbackPool {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` naming the first offending entry
    /// if the pool is empty or any entry is rejected or needs repair.
    pub fn new(messages: &[String], validator: &ContentValidator) -> std::result::Result<Self, ConfigError> {
        if messages.is_empty() {
            return Err(ConfigError::invalid(
                "content.fallback_messages",
                "at least one fallback message is required",
            ));
        }

        let entries = messages
            .iter()
            .enumerate()
            .map(|(i, message)| {
                validator
                    .validate_unrepaired(&Draft::fallback(message.as_str()))
                    .map_err(|reason| {
                        ConfigError::invalid(
                            &format!("content.fallback_messages[{}]", i),
                            reason,
                        )
                    })
            })
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    /// Pick one entry uniformly at random
    pub fn choose<R: Rng + ?Sized>(&self, rng: &mut R) -> &ValidatedContent {
        // Construction guarantees at least one entry
        self.entries.choose(rng).unwrap_or(&self.entries[0])
    }

    pub fn entries(&self) -> &[ValidatedContent] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

struct Generation {
    generator: Box<dyn TextGenerator>,
    request: GenerationRequest,
}

/// Produces candidate drafts
pub struct ContentSource {
    generation: Option<Generation>,
    pool: FallbackPool,
}

impl ContentSource {
    /// Source that only ever draws from the fallback pool
    pub fn fallback_only(pool: FallbackPool) -> Self {
        Self {
            generation: None,
            pool,
        }
    }

    /// Source that tries `generator` first
    pub fn with_generator(
        generator: Box<dyn TextGenerator>,
        request: GenerationRequest,
        pool: FallbackPool,
    ) -> Self {
        Self {
            generation: Some(Generation { generator, request }),
            pool,
        }
    }

    /// Build the configured source
    ///
    /// Set `generate` to false to skip the provider even when configured.
    pub fn from_config(config: &Config, validator: &ContentValidator, generate: bool) -> Result<Self> {
        let pool = FallbackPool::new(&config.content.fallback_messages, validator)?;

        let generator = if generate { create_generator(config)? } else { None };
        match (generator, &config.generator) {
            (Some(generator), Some(settings)) => {
                let request = GenerationRequest {
                    prompt: settings.prompt.clone(),
                    min_len: config.content.min_len,
                    max_len: config.content.max_len,
                    temperature: settings.temperature,
                };
                Ok(Self::with_generator(generator, request, pool))
            }
            _ => Ok(Self::fallback_only(pool)),
        }
    }

    pub fn pool(&self) -> &FallbackPool {
        &self.pool
    }

    pub fn has_generator(&self) -> bool {
        self.generation.is_some()
    }

    /// Ask the provider for a draft
    ///
    /// Returns `None` when generation is disabled, fails, or yields nothing
    /// usable. Failures are logged and never propagated.
    pub async fn generate(&self) -> Option<Draft> {
        let generation = self.generation.as_ref()?;
        let name = generation.generator.name().to_string();

        match generation.generator.generate(&generation.request).await {
            Ok(raw) => {
                let text = normalize_generated(&raw);
                if text.is_empty() {
                    warn!(generator = %name, "Generator returned empty text, using fallback");
                    return None;
                }
                debug!(generator = %name, chars = text.chars().count(), "Generated draft");
                Some(Draft::generated(text))
            }
            Err(e) => {
                warn!(generator = %name, error = %e, "Generation failed, using fallback");
                None
            }
        }
    }

    /// Pick a pre-approved fallback entry
    pub fn fallback<R: Rng + ?Sized>(&self, rng: &mut R) -> ValidatedContent {
        self.pool.choose(rng).clone()
    }

    /// Produce one draft, generated if possible, otherwise from the pool
    pub async fn produce<R: Rng + ?Sized>(&self, rng: &mut R) -> Draft {
        match self.generate().await {
            Some(draft) => draft,
            None => self.fallback(rng).to_draft(),
        }
    }
}
