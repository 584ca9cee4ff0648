//! Character-level text helpers shared by the validator and composer
//!
//! All lengths are counted in `char`s, never bytes, so truncation always
//! lands on a valid UTF-8 boundary.

/// Length of `text` in characters
pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Cut `text` to at most `max` characters
///
/// This is a hard cut that may split a word.
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// Case-insensitive substring search
pub fn contains_ignore_case(haystack_lower: &str, needle: &str) -> bool {
    !needle.is_empty() && haystack_lower.contains(&needle.to_lowercase())
}

const ZERO_WIDTH_JOINER: char = '\u{200D}';
const VARIATION_SELECTOR: char = '\u{FE0F}';

/// Whether `c` starts a pictographic emoji
pub fn is_emoji(c: char) -> bool {
    matches!(
        c as u32,
        0x1F000..=0x1FAFF | 0x2600..=0x27BF | 0x2B00..=0x2BFF | 0x2300..=0x23FF
    )
}

fn is_skin_tone(c: char) -> bool {
    matches!(c as u32, 0x1F3FB..=0x1F3FF)
}

/// Collapse runs of adjacent emoji down to `max_run`
///
/// Best-effort cosmetic tidy-up for generated text that clusters emoji.
/// Joined sequences (ZWJ families, skin tones, variation selectors) are
/// kept or dropped as a unit. Anything other than an emoji ends a run.
pub fn limit_emoji_runs(text: &str, max_run: usize) -> String {
    let mut out = String::with_capacity(text.len());
    let mut run = 0;
    let mut dropping = false;
    let mut joined = false;

    for c in text.chars() {
        let continuation =
            c == VARIATION_SELECTOR || c == ZERO_WIDTH_JOINER || is_skin_tone(c) || (joined && is_emoji(c));

        if continuation {
            joined = c == ZERO_WIDTH_JOINER;
            if !dropping {
                out.push(c);
            }
            continue;
        }
        joined = false;

        if is_emoji(c) {
            run += 1;
            dropping = run > max_run;
            if !dropping {
                out.push(c);
            }
        } else {
            run = 0;
            dropping = false;
            out.push(c);
        }
    }

    out
}

/// How a platform measures post length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LengthCounting {
    /// One per `char`
    #[default]
    Chars,
    /// X's weighted count, see [`weighted_len`]
    Weighted,
}

impl LengthCounting {
    pub fn measure(self, text: &str) -> usize {
        match self {
            LengthCounting::Chars => char_len(text),
            LengthCounting::Weighted => weighted_len(text),
        }
    }
}

/// Links are counted as a shortened t.co URL
const LINK_WEIGHT: usize = 23;

/// Length as X counts it
///
/// Any link, with or without a scheme, counts as 23. Emoji and characters
/// outside Latin, punctuation and the general-symbol ranges count as 2;
/// a joined emoji sequence counts once.
pub fn weighted_len(text: &str) -> usize {
    let mut total = 0;
    let mut token_start = None;
    for (idx, c) in text.char_indices() {
        if c.is_whitespace() {
            if let Some(start) = token_start.take() {
                total += token_weight(&text[start..idx]);
            }
            total += char_weight(c);
        } else if token_start.is_none() {
            token_start = Some(idx);
        }
    }
    if let Some(start) = token_start {
        total += token_weight(&text[start..]);
    }
    total
}

fn token_weight(token: &str) -> usize {
    let link = token.trim_end_matches(|c: char| {
        matches!(c, '.' | ',' | '!' | '?' | ';' | ':' | ')' | '"' | '\'')
    });
    if looks_like_link(link) {
        LINK_WEIGHT + chars_weight(&token[link.len()..])
    } else {
        chars_weight(token)
    }
}

fn looks_like_link(token: &str) -> bool {
    if let Some(rest) = token
        .strip_prefix("https://")
        .or_else(|| token.strip_prefix("http://"))
    {
        return !rest.is_empty();
    }

    let host = token.split('/').next().unwrap_or(token);
    let labels: Vec<&str> = host.split('.').collect();
    labels.len() >= 2
        && labels.iter().all(|label| {
            !label.is_empty() && label.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
        })
        && labels
            .last()
            .is_some_and(|tld| tld.len() >= 2 && tld.chars().all(|c| c.is_ascii_alphabetic()))
}

fn chars_weight(text: &str) -> usize {
    let mut total = 0;
    let mut joined = false;
    for c in text.chars() {
        if c == ZERO_WIDTH_JOINER {
            joined = true;
            continue;
        }
        if c == VARIATION_SELECTOR || is_skin_tone(c) {
            continue;
        }
        let continues_sequence = joined && is_emoji(c);
        joined = false;
        if !continues_sequence {
            total += if is_emoji(c) { 2 } else { char_weight(c) };
        }
    }
    total
}

fn char_weight(c: char) -> usize {
    match c as u32 {
        0x0000..=0x10FF | 0x2000..=0x200D | 0x2010..=0x201F | 0x2032..=0x2037 => 1,
        _ => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_chars_respects_multibyte() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("🚀🚀🚀", 1), "🚀");
        assert_eq!(truncate_chars("short", 10), "short");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_contains_ignore_case() {
        let haystack = "Guaranteed PROFIT awaits".to_lowercase();
        assert!(contains_ignore_case(&haystack, "guaranteed profit"));
        assert!(!contains_ignore_case(&haystack, "loss"));
        assert!(!contains_ignore_case(&haystack, ""));
    }

    #[test]
    fn test_limit_emoji_runs_collapses_clusters() {
        assert_eq!(limit_emoji_runs("Go 🚀🚀🚀🚀 now", 2), "Go 🚀🚀 now");
        assert_eq!(limit_emoji_runs("🔥 fire 🔥", 1), "🔥 fire 🔥");
    }

    #[test]
    fn test_limit_emoji_runs_keeps_joined_sequences_whole() {
        let family = "\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}";
        let text = format!("{family}{family}");
        assert_eq!(limit_emoji_runs(&text, 1), family);
    }

    #[test]
    fn test_limit_emoji_runs_is_idempotent() {
        let once = limit_emoji_runs("💎💎💎 hold 🙌🏽🙌🏽🙌🏽", 2);
        assert_eq!(limit_emoji_runs(&once, 2), once);
    }

    #[test]
    fn test_weighted_len_counts_links_as_23() {
        assert_eq!(weighted_len("Visit lumen.network"), 29);
        assert_eq!(weighted_len("see https://lumen.network/docs."), 28);
        assert_eq!(weighted_len("lumen.network/grants"), 23);
    }

    #[test]
    fn test_weighted_len_ignores_non_links() {
        for text in ["#Lumen #Web3", "e.g. v1.2 is out.", "Q&A at 5pm", "mail me@lumen.network"] {
            assert_eq!(weighted_len(text), char_len(text), "{:?}", text);
        }
    }

    #[test]
    fn test_weighted_len_counts_wide_chars_and_emoji_as_2() {
        assert_eq!(weighted_len("日本"), 4);
        assert_eq!(weighted_len("go 🚀🚀"), 7);
        assert_eq!(weighted_len("👍🏽"), 2);
        assert_eq!(weighted_len("\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F467}"), 2);
        assert_eq!(weighted_len("\u{2014}"), 1);
    }

    #[test]
    fn test_length_counting_measure() {
        assert_eq!(LengthCounting::Chars.measure("lumen.network"), 13);
        assert_eq!(LengthCounting::Weighted.measure("lumen.network"), 23);
        assert_eq!(LengthCounting::default(), LengthCounting::Chars);
    }
}
