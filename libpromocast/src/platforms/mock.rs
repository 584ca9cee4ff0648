//! Mock platform implementation for testing
//!
//! Simulates authentication and posting without network access. Outcomes
//! can be scripted per call, so tests can walk the scheduler through rate
//! limits, rejections and recoveries.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use crate::error::{PlatformError, Result};
use crate::platforms::Platform;
use crate::text::LengthCounting;
use crate::types::ComposedPost;

/// Configuration for mock platform behavior
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Platform name
    pub name: String,

    /// Error returned by authenticate, if any
    pub auth_error: Option<PlatformError>,

    /// Error returned by post once the script is exhausted, if any
    pub post_error: Option<PlatformError>,

    /// Per-call post outcomes; `None` means success
    pub script: Arc<Mutex<VecDeque<Option<PlatformError>>>>,

    /// Character limit for validation
    pub character_limit: Option<usize>,

    /// How length is counted against the limit
    pub length_counting: LengthCounting,

    /// Whether the platform is configured
    pub is_configured: bool,

    /// Number of times authenticate has been called
    pub auth_call_count: Arc<Mutex<usize>>,

    /// Every text submitted to post, successful or not
    pub attempted_content: Arc<Mutex<Vec<String>>>,

    /// Texts that were accepted
    pub posted_content: Arc<Mutex<Vec<String>>>,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            auth_error: None,
            post_error: None,
            script: Arc::new(Mutex::new(VecDeque::new())),
            character_limit: None,
            length_counting: LengthCounting::Chars,
            is_configured: true,
            auth_call_count: Arc::new(Mutex::new(0)),
            attempted_content: Arc::new(Mutex::new(Vec::new())),
            posted_content: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Mock platform for testing
///
/// Clones share counters and recorded posts, so a test can keep a handle
/// after boxing the platform into a publisher.
#[derive(Debug, Clone)]
pub struct MockPlatform {
    config: MockConfig,
    authenticated: bool,
}

impl MockPlatform {
    pub fn new(config: MockConfig) -> Self {
        Self {
            config,
            authenticated: false,
        }
    }

    /// Create a mock platform that always succeeds
    pub fn success(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            ..Default::default()
        })
    }

    /// Create a mock platform that fails authentication
    pub fn auth_failure(name: &str, error: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            auth_error: Some(PlatformError::Authentication(error.to_string())),
            ..Default::default()
        })
    }

    /// Create a mock platform whose posts always fail with `error`
    pub fn post_failure(name: &str, error: PlatformError) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            post_error: Some(error),
            ..Default::default()
        })
    }

    /// Create a mock platform with a character limit
    pub fn with_limit(name: &str, limit: usize) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            character_limit: Some(limit),
            ..Default::default()
        })
    }

    /// Create a mock platform that is not configured
    pub fn not_configured(name: &str) -> Self {
        Self::new(MockConfig {
            name: name.to_string(),
            is_configured: false,
            ..Default::default()
        })
    }

    /// Create an already-authenticated mock platform
    pub fn new_simple(name: &str) -> Self {
        let mut platform = Self::success(name);
        platform.authenticated = true;
        platform
    }

    /// Count length the way another platform does
    pub fn counting_as(mut self, counting: LengthCounting) -> Self {
        self.config.length_counting = counting;
        self
    }

    /// Queue the outcome of the next post call
    pub fn then_fail(self, error: PlatformError) -> Self {
        self.push(Some(error));
        self
    }

    /// Queue a successful post call
    pub fn then_succeed(self) -> Self {
        self.push(None);
        self
    }

    fn push(&self, outcome: Option<PlatformError>) {
        if let Ok(mut script) = self.config.script.lock() {
            script.push_back(outcome);
        }
    }

    pub fn auth_call_count(&self) -> usize {
        self.config.auth_call_count.lock().map(|c| *c).unwrap_or(0)
    }

    /// Number of post calls, successful or not
    pub fn post_call_count(&self) -> usize {
        self.attempted_content().len()
    }

    pub fn attempted_content(&self) -> Vec<String> {
        self.config
            .attempted_content
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    pub fn posted_content(&self) -> Vec<String> {
        self.config
            .posted_content
            .lock()
            .map(|c| c.clone())
            .unwrap_or_default()
    }

    fn next_outcome(&self) -> Option<PlatformError> {
        let scripted = self
            .config
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front());
        match scripted {
            Some(outcome) => outcome,
            None => self.config.post_error.clone(),
        }
    }
}

#[async_trait]
impl Platform for MockPlatform {
    async fn authenticate(&mut self) -> Result<()> {
        if let Ok(mut count) = self.config.auth_call_count.lock() {
            *count += 1;
        }

        match &self.config.auth_error {
            Some(error) => Err(error.clone().into()),
            None => {
                self.authenticated = true;
                Ok(())
            }
        }
    }

    async fn post(&self, post: &ComposedPost) -> Result<String> {
        if let Ok(mut attempted) = self.config.attempted_content.lock() {
            attempted.push(post.text().to_string());
        }

        if !self.authenticated {
            return Err(PlatformError::Authentication("Not authenticated".to_string()).into());
        }

        if let Some(error) = self.next_outcome() {
            return Err(error.into());
        }

        if let Ok(mut posted) = self.config.posted_content.lock() {
            posted.push(post.text().to_string());
        }
        Ok(format!("{}:mock-{}", self.config.name, uuid::Uuid::new_v4()))
    }

    fn name(&self) -> &str {
        &self.config.name
    }

    fn character_limit(&self) -> Option<usize> {
        self.config.character_limit
    }

    fn length_counting(&self) -> LengthCounting {
        self.config.length_counting
    }

    fn is_configured(&self) -> bool {
        self.config.is_configured
    }
}
