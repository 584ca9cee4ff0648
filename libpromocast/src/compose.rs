//! Post composition
//!
//! Turns validated content into the final post text by appending an optional
//! call-to-action and a hashtag suffix, then fitting the result under the
//! platform's post-size ceiling. When the post is too long only the content
//! portion is cut; the hashtag suffix always survives intact.
//!
//! Lengths are measured the way the target platform counts them, see
//! [`LengthCounting`].

use rand::distributions::WeightedIndex;
use rand::prelude::*;
use tracing::debug;

use crate::config::{ComposeConfig, HashtagConfig};
use crate::error::ConfigError;
use crate::text::{char_len, truncate_chars, LengthCounting};
use crate::types::{ComposedPost, ValidatedContent};

const CTA_SEPARATOR: &str = " ";
const HASHTAG_SEPARATOR: &str = "\n\n";

/// How the hashtag suffix is produced
#[derive(Debug, Clone)]
pub enum HashtagPolicy {
    Fixed(String),
    Sample { pool: Vec<String>, count: usize },
}

impl HashtagPolicy {
    fn suffix<R: Rng + ?Sized>(&self, rng: &mut R) -> String {
        match self {
            HashtagPolicy::Fixed(text) => text.clone(),
            HashtagPolicy::Sample { pool, count } => pool
                .choose_multiple(rng, *count)
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" "),
        }
    }

    /// Longest suffix this policy can produce
    fn max_len(&self, counting: LengthCounting) -> usize {
        match self {
            HashtagPolicy::Fixed(text) => counting.measure(text),
            HashtagPolicy::Sample { pool, count } => {
                let mut lens: Vec<usize> = pool.iter().map(|t| counting.measure(t)).collect();
                lens.sort_unstable_by(|a, b| b.cmp(a));
                let picked = (*count).min(lens.len());
                lens.iter().take(picked).sum::<usize>() + picked.saturating_sub(1)
            }
        }
    }
}

/// Appends call-to-action and hashtags under a character ceiling
#[derive(Debug, Clone)]
pub struct Composer {
    ceiling: usize,
    ctas: Vec<String>,
    /// Index `ctas.len()` means "no CTA"
    cta_weights: Option<WeightedIndex<u32>>,
    hashtags: HashtagPolicy,
    counting: LengthCounting,
}

impl Composer {
    /// Build a composer from configuration
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if the CTA weights are all zero, the
    /// hashtag sample is larger than its pool, or the longest possible suffix
    /// leaves no room for content under the ceiling.
    pub fn new(config: &ComposeConfig) -> Result<Self, ConfigError> {
        Self::with_counting(config, LengthCounting::Chars)
    }

    /// Build a composer that measures lengths with `counting`
    pub fn with_counting(
        config: &ComposeConfig,
        counting: LengthCounting,
    ) -> Result<Self, ConfigError> {
        let hashtags = match &config.hashtags {
            HashtagConfig::Fixed { text } => HashtagPolicy::Fixed(text.trim().to_string()),
            HashtagConfig::Sample { pool, count } => {
                let mut distinct: Vec<String> = Vec::with_capacity(pool.len());
                for tag in pool.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
                    if !distinct.iter().any(|d| d == tag) {
                        distinct.push(tag.to_string());
                    }
                }
                if *count > distinct.len() {
                    return Err(ConfigError::invalid(
                        "compose.hashtags.count",
                        format!(
                            "cannot sample {} tags from a pool of {} distinct tags",
                            count,
                            distinct.len()
                        ),
                    ));
                }
                HashtagPolicy::Sample {
                    pool: distinct,
                    count: *count,
                }
            }
        };

        let ctas: Vec<String> = config.cta.iter().map(|c| c.text.trim().to_string()).collect();
        let cta_weights = if ctas.is_empty() {
            None
        } else {
            let weights = config
                .cta
                .iter()
                .map(|c| c.weight)
                .chain(std::iter::once(config.none_weight));
            Some(WeightedIndex::new(weights).map_err(|e| {
                ConfigError::invalid("compose.cta", format!("invalid weights: {}", e))
            })?)
        };

        let composer = Self {
            ceiling: config.platform_limit,
            ctas,
            cta_weights,
            hashtags,
            counting,
        };

        let worst_case = composer.worst_case_suffix_len();
        if worst_case >= composer.ceiling {
            return Err(ConfigError::invalid(
                "compose.platform_limit",
                format!(
                    "{} leaves no room for content (call-to-action and hashtags take up to {})",
                    composer.ceiling, worst_case
                ),
            ));
        }

        Ok(composer)
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Whether `text` fits under the ceiling with the longest possible suffix,
    /// so composing it never cuts the content
    pub fn fits_uncut(&self, text: &str) -> bool {
        self.counting.measure(text) + self.worst_case_suffix_len() <= self.ceiling
    }

    /// Compose the final post text
    pub fn compose<R: Rng + ?Sized>(&self, content: &ValidatedContent, rng: &mut R) -> ComposedPost {
        let cta = self.pick_cta(rng);
        let hashtags = self.hashtags.suffix(rng);

        let mut tail = String::new();
        if let Some(cta) = &cta {
            tail.push_str(CTA_SEPARATOR);
            tail.push_str(cta);
        }
        if !hashtags.is_empty() {
            tail.push_str(HASHTAG_SEPARATOR);
            tail.push_str(&hashtags);
        }

        let room = self.ceiling - self.counting.measure(&tail);
        let body = content.text();
        let truncated = self.counting.measure(body) > room;
        let body = if truncated {
            debug!(
                content_len = self.counting.measure(body),
                room, "Cutting content to fit platform limit"
            );
            let mut cut = truncate_chars(body, room).trim_end();
            while self.counting.measure(cut) > room {
                cut = truncate_chars(cut, char_len(cut) - 1).trim_end();
            }
            cut
        } else {
            body
        };

        let text = format!("{}{}", body, tail);
        ComposedPost::new(text, content.origin(), cta, hashtags, truncated)
    }

    fn pick_cta<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<String> {
        let weights = self.cta_weights.as_ref()?;
        self.ctas.get(weights.sample(rng)).cloned()
    }

    fn worst_case_suffix_len(&self) -> usize {
        let cta = self
            .ctas
            .iter()
            .map(|c| self.counting.measure(c) + CTA_SEPARATOR.len())
            .max()
            .unwrap_or(0);
        let hashtags = match self.hashtags.max_len(self.counting) {
            0 => 0,
            n => n + HASHTAG_SEPARATOR.len(),
        };
        cta + hashtags
    }
}
