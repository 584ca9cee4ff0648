//! Scripted generator for tests and offline runs

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use super::{GenerationRequest, TextGenerator};
use crate::error::{PromocastError, Result};

/// Generator that replays a script of responses
///
/// Each call pops the next scripted entry. Once the script is exhausted every
/// call fails, which exercises the fallback path.
#[derive(Debug, Clone, Default)]
pub struct MockGenerator {
    script: Arc<Mutex<VecDeque<std::result::Result<String, String>>>>,
    calls: Arc<Mutex<usize>>,
}

impl MockGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator that returns `text` once
    pub fn replying(text: impl Into<String>) -> Self {
        Self::new().then_reply(text)
    }

    /// Generator whose first call fails
    pub fn failing(message: impl Into<String>) -> Self {
        Self::new().then_fail(message)
    }

    pub fn then_reply(self, text: impl Into<String>) -> Self {
        self.push(Ok(text.into()));
        self
    }

    pub fn then_fail(self, message: impl Into<String>) -> Self {
        self.push(Err(message.into()));
        self
    }

    fn push(&self, entry: std::result::Result<String, String>) {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(entry);
        }
    }

    /// Number of generate calls made so far
    pub fn calls(&self) -> usize {
        self.calls.lock().map(|c| *c).unwrap_or(0)
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(&self, _request: &GenerationRequest) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            *calls += 1;
        }

        let next = self
            .script
            .lock()
            .map_err(|_| PromocastError::Generation("mock script poisoned".to_string()))?
            .pop_front();

        match next {
            Some(Ok(text)) => Ok(text),
            Some(Err(message)) => Err(PromocastError::Generation(message)),
            None => Err(PromocastError::Generation("mock script exhausted".to_string())),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request() -> GenerationRequest {
        GenerationRequest {
            prompt: "p".to_string(),
            min_len: 1,
            max_len: 10,
            temperature: 0.5,
        }
    }

    #[tokio::test]
    async fn test_script_replays_in_order() {
        let generator = MockGenerator::replying("first").then_fail("boom").then_reply("third");
        let handle = generator.clone();

        assert_eq!(generator.generate(&request()).await.unwrap(), "first");
        assert!(generator.generate(&request()).await.is_err());
        assert_eq!(generator.generate(&request()).await.unwrap(), "third");
        assert!(generator.generate(&request()).await.is_err());
        assert_eq!(handle.calls(), 4);
    }
}
