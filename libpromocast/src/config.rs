//! Configuration management for Promocast
//!
//! Configuration is read from a TOML file and then overridden by a small set
//! of environment variables. Credentials never live in the file itself: they
//! come from the environment or from token files referenced by path.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use secrecy::SecretString;

use crate::error::{ConfigError, PlatformError, PromocastError, Result};
use crate::text::LengthCounting;
use crate::validation::ContentRules;

pub const ENV_CONFIG: &str = "PROMOCAST_CONFIG";
pub const ENV_X_TOKEN: &str = "PROMOCAST_X_TOKEN";
pub const ENV_GENERATOR_KEY: &str = "PROMOCAST_GENERATOR_KEY";
pub const ENV_MIN_LEN: &str = "PROMOCAST_MIN_LEN";
pub const ENV_MAX_LEN: &str = "PROMOCAST_MAX_LEN";
pub const ENV_HASHTAGS: &str = "PROMOCAST_HASHTAGS";
pub const ENV_BANNED_PHRASES: &str = "PROMOCAST_BANNED_PHRASES";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub content: ContentConfig,
    pub compose: ComposeConfig,
    pub generator: Option<GeneratorConfig>,
    pub platform: PlatformConfig,
    pub schedule: ScheduleConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentConfig {
    pub min_len: usize,
    pub max_len: usize,
    pub markers: Vec<String>,
    #[serde(default)]
    pub banned_phrases: Vec<String>,
    pub filler: String,
    #[serde(default)]
    pub max_emoji_run: Option<usize>,
    pub fallback_messages: Vec<String>,
}

impl ContentConfig {
    pub fn rules(&self) -> ContentRules {
        ContentRules {
            min_len: self.min_len,
            max_len: self.max_len,
            markers: self.markers.clone(),
            banned_phrases: self.banned_phrases.clone(),
            filler: self.filler.clone(),
            max_emoji_run: self.max_emoji_run,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComposeConfig {
    /// Hard post-size ceiling of the platform, in characters
    pub platform_limit: usize,
    /// Relative weight of appending no call-to-action at all
    #[serde(default)]
    pub none_weight: u32,
    #[serde(default)]
    pub cta: Vec<CtaConfig>,
    pub hashtags: HashtagConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CtaConfig {
    pub text: String,
    pub weight: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum HashtagConfig {
    /// Always append the same suffix
    Fixed { text: String },
    /// Append `count` tags sampled without replacement from `pool`
    Sample { pool: Vec<String>, count: usize },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Base URL of an OpenAI-compatible API, e.g. "https://api.openai.com/v1"
    pub endpoint: String,
    pub model: String,
    /// Style and brand instructions sent as the system prompt
    pub prompt: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default)]
    pub api_key_file: Option<String>,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum PlatformKind {
    X,
    Mock,
}

impl PlatformKind {
    /// How this platform counts post length against its limit
    pub fn length_counting(self) -> LengthCounting {
        match self {
            PlatformKind::X => LengthCounting::Weighted,
            PlatformKind::Mock => LengthCounting::Chars,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub kind: PlatformKind,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default)]
    pub token_file: Option<String>,
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Maximum successful posts per UTC day
    #[serde(default)]
    pub daily_quota: Option<u32>,
    #[serde(with = "humantime_serde")]
    pub failure_cooldown: Duration,
    #[serde(with = "humantime_serde")]
    pub rate_limit_cooldown: Duration,
    pub cadence: CadenceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CadenceConfig {
    Fixed {
        #[serde(with = "humantime_serde")]
        interval: Duration,
    },
    Uniform {
        #[serde(with = "humantime_serde")]
        min: Duration,
        #[serde(with = "humantime_serde")]
        max: Duration,
    },
    DailySpread {
        posts_per_day: u32,
        #[serde(default, with = "humantime_serde")]
        jitter: Duration,
    },
}

fn default_true() -> bool {
    true
}

fn default_temperature() -> f32 {
    0.9
}

fn default_max_tokens() -> u32 {
    200
}

fn default_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_api_base() -> String {
    "https://api.x.com".to_string()
}

/// Durations as humantime strings ("90s", "15m", "3h")
mod humantime_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}

impl Config {
    /// Load configuration from the default location and apply env overrides
    pub fn load() -> Result<Self> {
        Self::load_with_overrides(None)
    }

    /// Load from `path` if given, else the default location, then apply env overrides
    pub fn load_with_overrides(path: Option<&Path>) -> Result<Self> {
        let config_path = match path {
            Some(path) => path.to_path_buf(),
            None => resolve_config_path()?,
        };
        let mut config = Self::load_from_path(&config_path)?;
        config.apply_env_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load configuration from a specific path (no env overrides)
    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::ParseError)?;
        Ok(config)
    }

    /// Apply `PROMOCAST_*` overrides using the given variable lookup
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric override does not parse.
    pub fn apply_env_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_MIN_LEN) {
            self.content.min_len = parse_len(ENV_MIN_LEN, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_LEN) {
            self.content.max_len = parse_len(ENV_MAX_LEN, &raw)?;
        }
        if let Some(raw) = lookup(ENV_BANNED_PHRASES) {
            self.content.banned_phrases = split_list(&raw);
        }
        if let Some(raw) = lookup(ENV_HASHTAGS) {
            let pool = split_list(&raw);
            self.compose.hashtags = match &self.compose.hashtags {
                HashtagConfig::Sample { count, .. } => HashtagConfig::Sample {
                    count: (*count).min(pool.len()),
                    pool,
                },
                HashtagConfig::Fixed { .. } => HashtagConfig::Fixed {
                    text: pool.join(" "),
                },
            };
        }
        Ok(())
    }

    /// Resolve the platform bearer token from the environment or token file
    pub fn platform_token(&self) -> Result<SecretString> {
        resolve_secret(
            ENV_X_TOKEN,
            self.platform.token_file.as_deref(),
            |key| std::env::var(key).ok(),
        )
    }

    /// Resolve the generator API key from the environment or key file
    pub fn generator_key(&self) -> Result<SecretString> {
        let key_file = self
            .generator
            .as_ref()
            .and_then(|g| g.api_key_file.as_deref());
        resolve_secret(ENV_GENERATOR_KEY, key_file, |key| std::env::var(key).ok())
    }

    /// Create a default configuration
    pub fn default_config() -> Self {
        Self {
            content: ContentConfig {
                min_len: 180,
                max_len: 250,
                markers: vec!["Lumen".to_string()],
                banned_phrases: vec![
                    "guaranteed profit".to_string(),
                    "guaranteed returns".to_string(),
                    "risk-free".to_string(),
                    "get rich".to_string(),
                    "100x".to_string(),
                ],
                filler: "Follow Lumen for weekly builder updates.".to_string(),
                max_emoji_run: Some(2),
                fallback_messages: vec![
                    "Lumen is building the settlement layer for creators who want to own their audience. Fast transfers, open tooling and a community that ships every week. Come see what the Lumen builders are working on this month.".to_string(),
                    "Every great network starts with people who show up early. Lumen is that network for independent makers: open rails, honest fees, and a roadmap written in public. Read the latest Lumen update and tell us what you think.".to_string(),
                    "Lumen weekly recap: new wallet release, two community grants awarded, and the testnet bridge is now open for everyone. Thank you to every builder who reported bugs and sent feedback. More Lumen news next week.".to_string(),
                    "Curious how Lumen works under the hood? Our docs walk through the architecture, the validator set and the fee model step by step. No jargon, no hype, just clear explanations for people who like to understand things.".to_string(),
                    "Lumen community call this Thursday: live demo of the new explorer, an open Q&A with the core team, and a preview of what lands next quarter. Bring your questions, your ideas and your friends who build.".to_string(),
                ],
            },
            compose: ComposeConfig {
                platform_limit: 280,
                none_weight: 1,
                cta: vec![
                    CtaConfig {
                        text: "Visit lumen.network".to_string(),
                        weight: 3,
                    },
                    CtaConfig {
                        text: "Join the community on Discord".to_string(),
                        weight: 2,
                    },
                    CtaConfig {
                        text: "What would you build?".to_string(),
                        weight: 1,
                    },
                ],
                hashtags: HashtagConfig::Sample {
                    pool: vec![
                        "#Lumen".to_string(),
                        "#Web3".to_string(),
                        "#Builders".to_string(),
                        "#OpenSource".to_string(),
                        "#Creators".to_string(),
                    ],
                    count: 2,
                },
            },
            generator: Some(GeneratorConfig {
                enabled: true,
                endpoint: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                prompt: "You write short, upbeat, factual social posts for Lumen, an open network for independent creators. Never promise returns or profits. Do not use hashtags.".to_string(),
                temperature: default_temperature(),
                max_tokens: default_max_tokens(),
                api_key_file: Some("~/.config/promocast/generator.key".to_string()),
                timeout: default_timeout(),
            }),
            platform: PlatformConfig {
                kind: PlatformKind::X,
                api_base: default_api_base(),
                token_file: Some("~/.config/promocast/x.token".to_string()),
                timeout: default_timeout(),
            },
            schedule: ScheduleConfig {
                daily_quota: Some(6),
                failure_cooldown: Duration::from_secs(5 * 60),
                rate_limit_cooldown: Duration::from_secs(15 * 60),
                cadence: CadenceConfig::Uniform {
                    min: Duration::from_secs(2 * 3600),
                    max: Duration::from_secs(4 * 3600),
                },
            },
        }
    }
}

fn parse_len(field: &str, raw: &str) -> Result<usize> {
    raw.trim().parse::<usize>().map_err(|e| {
        PromocastError::Config(ConfigError::invalid(field, format!("'{}': {}", raw, e)))
    })
}

/// Comma-separated list with blanks and repeats dropped
fn split_list(raw: &str) -> Vec<String> {
    let mut items: Vec<String> = Vec::new();
    for item in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if !items.iter().any(|i| i == item) {
            items.push(item.to_string());
        }
    }
    items
}

/// Resolve a secret from `env_var`, falling back to reading `file`
///
/// # Errors
///
/// Returns `PlatformError::Authentication` if neither source yields a
/// non-empty value.
pub fn resolve_secret<F>(env_var: &str, file: Option<&str>, lookup: F) -> Result<SecretString>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(value) = lookup(env_var) {
        let value = value.trim().to_string();
        if !value.is_empty() {
            return Ok(SecretString::from(value));
        }
    }

    let file = file.ok_or_else(|| {
        PlatformError::Authentication(format!(
            "No credential found. Suggestion: set {} or configure a key file.",
            env_var
        ))
    })?;

    let path = shellexpand::full(file).map_err(|e| {
        PlatformError::Authentication(format!("Failed to expand key file path: {}", e))
    })?;

    let value = std::fs::read_to_string(path.as_ref())
        .map_err(|e| {
            PlatformError::Authentication(format!("Failed to read key file {}: {}", file, e))
        })?
        .trim()
        .to_string();

    if value.is_empty() {
        return Err(PlatformError::Authentication(format!("Key file {} is empty", file)).into());
    }

    Ok(SecretString::from(value))
}

/// Resolve the configuration file path following XDG Base Directory spec
pub fn resolve_config_path() -> Result<PathBuf> {
    if let Ok(path) = std::env::var(ENV_CONFIG) {
        return Ok(PathBuf::from(shellexpand::tilde(&path).to_string()));
    }

    let config_dir = dirs::config_dir()
        .ok_or_else(|| ConfigError::MissingField("config directory".to_string()))?;

    Ok(config_dir.join("promocast").join("config.toml"))
}
