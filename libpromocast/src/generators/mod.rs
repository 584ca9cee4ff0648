//! Generative text providers
//!
//! A [`TextGenerator`] turns a style prompt and a target length range into
//! free-form promotional copy. Providers are unreliable by nature: callers
//! treat every error or odd response as a soft failure and fall back to the
//! static message pool.

use async_trait::async_trait;

use crate::config::Config;
use crate::error::Result;

pub mod mock;
pub mod openai;

/// Parameters for one generation call
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    /// Style and brand instructions
    pub prompt: String,
    pub min_len: usize,
    pub max_len: usize,
    pub temperature: f32,
}

impl GenerationRequest {
    /// Instruction sent alongside the style prompt
    pub fn instruction(&self) -> String {
        format!(
            "Write one post between {} and {} characters long. Reply with the post text only.",
            self.min_len, self.max_len
        )
    }
}

#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate candidate post text
    ///
    /// # Errors
    ///
    /// Returns `PromocastError::Generation` for transport failures, error
    /// statuses and responses without usable text.
    async fn generate(&self, request: &GenerationRequest) -> Result<String>;

    /// Provider identifier used in logs
    fn name(&self) -> &str;
}

/// Build the configured generator, if generation is enabled
pub fn create_generator(config: &Config) -> Result<Option<Box<dyn TextGenerator>>> {
    match &config.generator {
        Some(generator) if generator.enabled => {
            let key = config.generator_key()?;
            let client = openai::OpenAiGenerator::new(generator, key)?;
            Ok(Some(Box::new(client)))
        }
        _ => Ok(None),
    }
}

/// Strip surrounding whitespace and one pair of wrapping quotes
pub fn normalize_generated(text: &str) -> String {
    let trimmed = text.trim();
    let pairs = [('"', '"'), ('\'', '\''), ('\u{201C}', '\u{201D}')];
    for (open, close) in pairs {
        if let Some(inner) = trimmed
            .strip_prefix(open)
            .and_then(|rest| rest.strip_suffix(close))
        {
            return inner.trim().to_string();
        }
    }
    trimmed.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_generated_strips_quotes_and_whitespace() {
        assert_eq!(normalize_generated("  \"Lumen is live\" \n"), "Lumen is live");
        assert_eq!(normalize_generated("\u{201C}Lumen\u{201D}"), "Lumen");
        assert_eq!(normalize_generated("'Lumen'"), "Lumen");
        assert_eq!(normalize_generated("Lumen \"quoted\" word"), "Lumen \"quoted\" word");
        assert_eq!(normalize_generated("\"\""), "");
    }

    #[test]
    fn test_instruction_mentions_bounds() {
        let request = GenerationRequest {
            prompt: "style".to_string(),
            min_len: 180,
            max_len: 250,
            temperature: 0.9,
        };
        let instruction = request.instruction();
        assert!(instruction.contains("180"));
        assert!(instruction.contains("250"));
    }

    #[test]
    fn test_disabled_generator_is_none() {
        let mut config = Config::default_config();
        if let Some(generator) = config.generator.as_mut() {
            generator.enabled = false;
        }
        assert!(create_generator(&config).unwrap().is_none());

        config.generator = None;
        assert!(create_generator(&config).unwrap().is_none());
    }
}
