//! Content validation
//!
//! Enforces the content rules every post must satisfy before composition:
//! no empty text, no banned phrase, at least one brand marker, and a length
//! inside `[min_len, max_len]`. Out-of-range length is repaired by a hard
//! cut or by appending a filler phrase; everything else is rejected.
//!
//! # Example
//!
//! ```
//! use libpromocast::types::Draft;
//! use libpromocast::validation::{ContentRules, ContentValidator, Rejection};
//!
//! let rules = ContentRules {
//!     min_len: 20,
//!     max_len: 60,
//!     markers: vec!["Lumen".to_string()],
//!     banned_phrases: vec!["guaranteed profit".to_string()],
//!     filler: "Follow Lumen.".to_string(),
//!     max_emoji_run: None,
//! };
//! let validator = ContentValidator::new(rules).unwrap();
//!
//! let ok = validator.validate(&Draft::generated("Lumen ships on Friday")).unwrap();
//! assert!(ok.len() >= 20 && ok.len() <= 60);
//!
//! let err = validator.validate(&Draft::generated("Lumen: guaranteed profit!"));
//! assert!(matches!(err, Err(Rejection::BannedPhrase(_))));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::ConfigError;
use crate::text::{char_len, contains_ignore_case, limit_emoji_runs, truncate_chars};
use crate::types::{Draft, ValidatedContent};

/// Content rules applied to every draft
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRules {
    pub min_len: usize,
    pub max_len: usize,
    /// Brand tokens; a valid post contains at least one
    pub markers: Vec<String>,
    /// Compliance risk terms matched case-insensitively
    pub banned_phrases: Vec<String>,
    /// Appended to short content until `min_len` is met
    pub filler: String,
    /// Longest allowed run of adjacent emoji, if capped
    pub max_emoji_run: Option<usize>,
}

/// Why a draft was discarded
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    #[error("content is empty")]
    Empty,

    #[error("content contains banned phrase '{0}'")]
    BannedPhrase(String),

    #[error("content contains none of the required markers")]
    MissingMarker,
}

/// Validates drafts against a fixed set of [`ContentRules`]
#[derive(Debug, Clone)]
pub struct ContentValidator {
    rules: ContentRules,
}

impl ContentValidator {
    /// Build a validator, checking that the rules can ever be satisfied
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the bounds are inverted or zero,
    /// no marker is configured, or the filler is empty or banned.
    pub fn new(rules: ContentRules) -> Result<Self, ConfigError> {
        if rules.min_len == 0 {
            return Err(ConfigError::invalid("content.min_len", "must be at least 1"));
        }
        if rules.min_len > rules.max_len {
            return Err(ConfigError::invalid(
                "content.min_len",
                format!(
                    "must not exceed content.max_len ({} > {})",
                    rules.min_len, rules.max_len
                ),
            ));
        }
        if rules.markers.iter().all(|m| m.trim().is_empty()) {
            return Err(ConfigError::invalid(
                "content.markers",
                "at least one non-empty marker is required",
            ));
        }
        if rules.filler.trim().is_empty() {
            return Err(ConfigError::invalid("content.filler", "must not be empty"));
        }
        if rules.max_emoji_run == Some(0) {
            return Err(ConfigError::invalid(
                "content.max_emoji_run",
                "must be at least 1 when set",
            ));
        }

        let validator = Self { rules };
        if let Some(phrase) = validator.find_banned(&validator.rules.filler) {
            return Err(ConfigError::invalid(
                "content.filler",
                format!("contains banned phrase '{}'", phrase),
            ));
        }

        Ok(validator)
    }

    pub fn rules(&self) -> &ContentRules {
        &self.rules
    }

    /// Validate a draft, repairing its length if needed
    ///
    /// # Errors
    ///
    /// Returns the first [`Rejection`] hit. Rejected drafts must be replaced
    /// by content from another source, never re-validated.
    pub fn validate(&self, draft: &Draft) -> Result<ValidatedContent, Rejection> {
        let original = draft.text();

        if original.trim().is_empty() {
            return Err(Rejection::Empty);
        }
        self.check_rules(original)?;

        let mut text = match self.rules.max_emoji_run {
            Some(max_run) => limit_emoji_runs(original, max_run),
            None => original.to_string(),
        };

        let len = char_len(&text);
        if len > self.rules.max_len {
            debug!(len, max = self.rules.max_len, "Truncating content");
            text = truncate_chars(&text, self.rules.max_len).to_string();
        } else if len < self.rules.min_len {
            debug!(len, min = self.rules.min_len, "Padding content with filler");
            text = self.pad(text);
        }

        let repaired = text != original;
        if repaired {
            // Repairs can cut a marker off or splice a banned phrase together
            if text.trim().is_empty() {
                return Err(Rejection::Empty);
            }
            self.check_rules(&text)?;
        }

        Ok(ValidatedContent::new(text, draft.origin(), repaired))
    }

    /// Check that a draft passes without any repair
    ///
    /// Used for the fallback pool, whose entries must already be compliant.
    pub fn validate_unrepaired(&self, draft: &Draft) -> Result<ValidatedContent, String> {
        let content = self.validate(draft).map_err(|r| r.to_string())?;
        if !content.was_repaired() {
            return Ok(content);
        }

        let len = char_len(draft.text());
        match self.rules.max_emoji_run {
            Some(max_run) if (self.rules.min_len..=self.rules.max_len).contains(&len) => Err(
                format!("exceeds the emoji run limit of {}", max_run),
            ),
            _ => Err(format!(
                "needs repair to fit {}..={} characters (has {})",
                self.rules.min_len, self.rules.max_len, len
            )),
        }
    }

    /// Re-apply the marker and banned-phrase rules to text built from
    /// validated content, such as a composed post whose content was cut
    pub fn recheck(&self, text: &str) -> Result<(), Rejection> {
        if text.trim().is_empty() {
            return Err(Rejection::Empty);
        }
        self.check_rules(text)
    }

    fn check_rules(&self, text: &str) -> Result<(), Rejection> {
        if let Some(phrase) = self.find_banned(text) {
            return Err(Rejection::BannedPhrase(phrase.to_string()));
        }
        let lower = text.to_lowercase();
        let has_marker = self
            .rules
            .markers
            .iter()
            .any(|marker| contains_ignore_case(&lower, marker.trim()));
        if !has_marker {
            return Err(Rejection::MissingMarker);
        }
        Ok(())
    }

    fn find_banned(&self, text: &str) -> Option<&str> {
        let lower = text.to_lowercase();
        self.rules
            .banned_phrases
            .iter()
            .map(|p| p.trim())
            .find(|phrase| contains_ignore_case(&lower, phrase))
    }

    fn pad(&self, mut text: String) -> String {
        let filler = self.rules.filler.trim();
        while char_len(&text) < self.rules.min_len {
            if !text.ends_with(char::is_whitespace) {
                text.push(' ');
            }
            text.push_str(filler);
        }
        if char_len(&text) > self.rules.max_len {
            text = truncate_chars(&text, self.rules.max_len).to_string();
        }
        text
    }
}
