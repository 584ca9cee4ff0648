//! Promocast - scheduled promotional posting with content guardrails
//!
//! This library implements a single posting pipeline: a content source
//! (generative provider with a static fallback pool), a validator enforcing
//! brand and compliance rules, a composer that adds a call-to-action and
//! hashtags under the platform limit, a publisher, and a scheduler that
//! repeats the cycle on a configurable cadence.

pub mod compose;
pub mod config;
pub mod error;
pub mod generators;
pub mod logging;
pub mod pipeline;
pub mod platforms;
pub mod publisher;
pub mod scheduler;
pub mod source;
pub mod text;
pub mod types;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{PromocastError, Result};
pub use pipeline::{CycleReport, Pipeline};
pub use scheduler::{SchedulePolicy, Scheduler, SystemClock, TokioSleeper};
pub use types::{ComposedPost, Draft, DraftOrigin, PostResult, PublishErrorKind, ValidatedContent};
