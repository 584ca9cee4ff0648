//! Posting scheduler
//!
//! Drives the pipeline through `Idle -> Posting -> Sleeping -> Idle` until a
//! shutdown is requested or the platform rejects our credentials. Time and
//! sleeping are injected through [`Clock`] and [`Sleeper`] so tests can run
//! days of schedule instantly.
//!
//! Sleep selection after a cycle:
//!
//! | Outcome       | Sleep                                   |
//! |---------------|-----------------------------------------|
//! | success       | cadence interval, or until UTC midnight |
//! | rate limited  | `rate_limit_cooldown`                   |
//! | rejected      | `failure_cooldown`                      |
//! | unknown       | `failure_cooldown`                      |
//! | auth failure  | stop with an error                      |

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use rand::Rng;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::{CadenceConfig, ScheduleConfig};
use crate::error::{ConfigError, PlatformError, Result};
use crate::pipeline::{CycleReport, Pipeline};
use crate::types::PublishErrorKind;

const SECONDS_PER_DAY: u64 = 86_400;
const SLEEP_SLICE: Duration = Duration::from_secs(1);

/// Source of the current UTC time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

#[async_trait]
pub trait Sleeper: Send + Sync {
    /// Sleep for `duration`
    ///
    /// Returns `false` if the sleep was cut short by a shutdown request.
    async fn sleep(&self, duration: Duration) -> bool;
}

/// Real sleeper that wakes every second to observe a shutdown flag
#[derive(Debug, Clone)]
pub struct TokioSleeper {
    shutdown: Arc<AtomicBool>,
}

impl TokioSleeper {
    pub fn new(shutdown: Arc<AtomicBool>) -> Self {
        Self { shutdown }
    }
}

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) -> bool {
        let mut remaining = duration;
        while !remaining.is_zero() {
            if self.shutdown.load(Ordering::SeqCst) {
                return false;
            }
            let slice = remaining.min(SLEEP_SLICE);
            tokio::time::sleep(slice).await;
            remaining -= slice;
        }
        !self.shutdown.load(Ordering::SeqCst)
    }
}

/// Interval drawn after a successful post
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Cadence {
    Fixed(Duration),
    Uniform { min: Duration, max: Duration },
    /// `base` is a day divided by the posts per day
    DailySpread { base: Duration, jitter: Duration },
}

impl Cadence {
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` for zero intervals, inverted
    /// bounds, zero posts per day, or jitter at least as long as the spacing.
    pub fn from_config(config: &CadenceConfig) -> std::result::Result<Self, ConfigError> {
        match config {
            CadenceConfig::Fixed { interval } => {
                if interval.is_zero() {
                    return Err(ConfigError::invalid(
                        "schedule.cadence.interval",
                        "must be greater than zero",
                    ));
                }
                Ok(Cadence::Fixed(*interval))
            }
            CadenceConfig::Uniform { min, max } => {
                if min > max {
                    return Err(ConfigError::invalid(
                        "schedule.cadence.min",
                        format!(
                            "must not exceed max ({} > {})",
                            humantime::format_duration(*min),
                            humantime::format_duration(*max)
                        ),
                    ));
                }
                if max.is_zero() {
                    return Err(ConfigError::invalid(
                        "schedule.cadence.max",
                        "must be greater than zero",
                    ));
                }
                Ok(Cadence::Uniform {
                    min: *min,
                    max: *max,
                })
            }
            CadenceConfig::DailySpread {
                posts_per_day,
                jitter,
            } => {
                if *posts_per_day == 0 {
                    return Err(ConfigError::invalid(
                        "schedule.cadence.posts_per_day",
                        "must be at least 1",
                    ));
                }
                let base = Duration::from_secs(SECONDS_PER_DAY) / *posts_per_day;
                if *jitter >= base {
                    return Err(ConfigError::invalid(
                        "schedule.cadence.jitter",
                        format!(
                            "must be shorter than the post spacing of {}",
                            humantime::format_duration(base)
                        ),
                    ));
                }
                Ok(Cadence::DailySpread {
                    base,
                    jitter: *jitter,
                })
            }
        }
    }

    pub fn next_interval<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        match self {
            Cadence::Fixed(interval) => *interval,
            Cadence::Uniform { min, max } => {
                let millis = rng.gen_range(min.as_millis() as u64..=max.as_millis() as u64);
                Duration::from_millis(millis)
            }
            Cadence::DailySpread { base, jitter } => {
                let jitter = jitter.as_millis() as i64;
                if jitter == 0 {
                    return *base;
                }
                let offset = rng.gen_range(-jitter..=jitter);
                let millis = base.as_millis() as i64 + offset;
                Duration::from_millis(millis.max(0) as u64)
            }
        }
    }
}

/// Sleep rules for the scheduler
#[derive(Debug, Clone)]
pub struct SchedulePolicy {
    pub cadence: Cadence,
    pub failure_cooldown: Duration,
    pub rate_limit_cooldown: Duration,
    pub daily_quota: Option<u32>,
}

impl SchedulePolicy {
    pub fn from_config(config: &ScheduleConfig) -> std::result::Result<Self, ConfigError> {
        if config.daily_quota == Some(0) {
            return Err(ConfigError::invalid(
                "schedule.daily_quota",
                "must be at least 1 when set",
            ));
        }
        if config.failure_cooldown.is_zero() {
            return Err(ConfigError::invalid(
                "schedule.failure_cooldown",
                "must be greater than zero",
            ));
        }
        if config.rate_limit_cooldown.is_zero() {
            return Err(ConfigError::invalid(
                "schedule.rate_limit_cooldown",
                "must be greater than zero",
            ));
        }
        Ok(Self {
            cadence: Cadence::from_config(&config.cadence)?,
            failure_cooldown: config.failure_cooldown,
            rate_limit_cooldown: config.rate_limit_cooldown,
            daily_quota: config.daily_quota,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Idle,
    Posting,
    Sleeping,
}

/// Why the scheduler is sleeping
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SleepReason {
    Cadence,
    Cooldown,
    RateLimit,
    QuotaReached,
}

impl std::fmt::Display for SleepReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SleepReason::Cadence => write!(f, "cadence"),
            SleepReason::Cooldown => write!(f, "cooldown"),
            SleepReason::RateLimit => write!(f, "rate_limit"),
            SleepReason::QuotaReached => write!(f, "quota_reached"),
        }
    }
}

/// Process-wide schedule counters
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScheduleState {
    pub posts_today: u32,
    pub day: NaiveDate,
    pub next_wake: Option<DateTime<Utc>>,
    pub phase: Phase,
}

impl ScheduleState {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            posts_today: 0,
            day: now.date_naive(),
            next_wake: None,
            phase: Phase::Idle,
        }
    }

    /// Reset the daily counter when the UTC date has changed
    pub fn roll_day(&mut self, now: DateTime<Utc>) {
        let today = now.date_naive();
        if today != self.day {
            debug!(from = %self.day, to = %today, "New UTC day, resetting post count");
            self.day = today;
            self.posts_today = 0;
        }
    }
}

/// What one scheduler step did and how long to wait afterwards
#[derive(Debug, Clone, Serialize)]
pub struct Tick {
    /// `None` when the cycle was skipped because the quota is used up
    pub report: Option<CycleReport>,
    #[serde(with = "duration_secs")]
    pub sleep: Duration,
    pub reason: SleepReason,
}

mod duration_secs {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }
}

/// Time left until the next UTC midnight
pub fn until_next_midnight(now: DateTime<Utc>) -> Duration {
    let next = now
        .date_naive()
        .succ_opt()
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight));
    match next {
        Some(midnight) => (midnight - now).to_std().unwrap_or_default(),
        None => Duration::from_secs(SECONDS_PER_DAY),
    }
}

pub struct Scheduler<C: Clock, S: Sleeper> {
    pipeline: Pipeline,
    policy: SchedulePolicy,
    clock: C,
    sleeper: S,
    state: ScheduleState,
    shutdown: Arc<AtomicBool>,
}

impl<C: Clock, S: Sleeper> Scheduler<C, S> {
    pub fn new(
        pipeline: Pipeline,
        policy: SchedulePolicy,
        clock: C,
        sleeper: S,
        shutdown: Arc<AtomicBool>,
    ) -> Self {
        let state = ScheduleState::new(clock.now());
        Self {
            pipeline,
            policy,
            clock,
            sleeper,
            state,
            shutdown,
        }
    }

    pub fn state(&self) -> &ScheduleState {
        &self.state
    }

    pub fn pipeline(&self) -> &Pipeline {
        &self.pipeline
    }

    fn quota_reached(&self) -> bool {
        matches!(self.policy.daily_quota, Some(quota) if self.state.posts_today >= quota)
    }

    /// Run one cycle, or skip it if the daily quota is used up
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::Authentication` when the platform rejected our
    /// credentials; nothing else stops the scheduler.
    pub async fn tick<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Tick> {
        let now = self.clock.now();
        self.state.roll_day(now);

        if self.quota_reached() {
            let sleep = until_next_midnight(now);
            info!(
                posts_today = self.state.posts_today,
                "Daily quota reached, waiting for next UTC day"
            );
            return Ok(Tick {
                report: None,
                sleep,
                reason: SleepReason::QuotaReached,
            });
        }

        self.state.phase = Phase::Posting;
        let report = self.pipeline.run_cycle(rng).await;
        self.state.phase = Phase::Idle;

        let (sleep, reason) = match report.result.as_ref() {
            Some(result) if result.success => {
                self.state.posts_today += 1;
                if self.quota_reached() {
                    (until_next_midnight(self.clock.now()), SleepReason::QuotaReached)
                } else {
                    (self.policy.cadence.next_interval(rng), SleepReason::Cadence)
                }
            }
            Some(result) => match result.error_kind {
                Some(PublishErrorKind::AuthFailure) => {
                    let message = result
                        .error_message
                        .clone()
                        .unwrap_or_else(|| "credentials rejected".to_string());
                    return Err(PlatformError::Authentication(message).into());
                }
                Some(PublishErrorKind::RateLimited) => {
                    (self.policy.rate_limit_cooldown, SleepReason::RateLimit)
                }
                _ => (self.policy.failure_cooldown, SleepReason::Cooldown),
            },
            None => (self.policy.failure_cooldown, SleepReason::Cooldown),
        };

        Ok(Tick {
            report: Some(report),
            sleep,
            reason,
        })
    }

    /// Run until shutdown or an authentication failure
    pub async fn run<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<()> {
        info!(platform = %self.pipeline.platform_name(), "Scheduler started");

        while !self.shutdown.load(Ordering::SeqCst) {
            let tick = match self.tick(rng).await {
                Ok(tick) => tick,
                Err(e) => {
                    warn!(error = %e, "Stopping scheduler");
                    return Err(e);
                }
            };

            let wake = chrono::Duration::from_std(tick.sleep)
                .ok()
                .map(|d| self.clock.now() + d);
            self.state.next_wake = wake;
            self.state.phase = Phase::Sleeping;
            info!(
                reason = %tick.reason,
                sleep = %humantime::format_duration(tick.sleep),
                posts_today = self.state.posts_today,
                "Sleeping until next cycle"
            );

            let completed = self.sleeper.sleep(tick.sleep).await;
            self.state.phase = Phase::Idle;
            if !completed {
                break;
            }
        }

        info!("Scheduler stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compose::Composer;
    use crate::config::{ComposeConfig, HashtagConfig};
    use crate::generators::mock::MockGenerator;
    use crate::generators::GenerationRequest;
    use crate::platforms::mock::MockPlatform;
    use crate::publisher::Publisher;
    use crate::source::{ContentSource, FallbackPool};
    use crate::validation::{ContentRules, ContentValidator};
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Mutex;

    /// Clock advanced by the fake sleeper
    #[derive(Clone)]
    struct FakeClock(Arc<Mutex<DateTime<Utc>>>);

    impl FakeClock {
        fn at(rfc3339: &str) -> Self {
            let start = DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc);
            Self(Arc::new(Mutex::new(start)))
        }

        fn advance(&self, by: Duration) {
            let mut now = self.0.lock().unwrap();
            *now += chrono::Duration::from_std(by).unwrap();
        }
    }

    impl Clock for FakeClock {
        fn now(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    /// Records sleeps and reports shutdown after `limit` of them
    struct FakeSleeper {
        clock: FakeClock,
        sleeps: Arc<Mutex<Vec<Duration>>>,
        limit: usize,
    }

    #[async_trait]
    impl Sleeper for FakeSleeper {
        async fn sleep(&self, duration: Duration) -> bool {
            self.clock.advance(duration);
            let mut sleeps = self.sleeps.lock().unwrap();
            sleeps.push(duration);
            sleeps.len() < self.limit
        }
    }

    fn policy() -> SchedulePolicy {
        SchedulePolicy {
            cadence: Cadence::Fixed(Duration::from_secs(3600)),
            failure_cooldown: Duration::from_secs(60),
            rate_limit_cooldown: Duration::from_secs(900),
            daily_quota: None,
        }
    }

    fn pipeline(generator: MockGenerator, platform: MockPlatform) -> Pipeline {
        let validator = ContentValidator::new(ContentRules {
            min_len: 10,
            max_len: 100,
            markers: vec!["Lumen".to_string()],
            banned_phrases: vec![],
            filler: "Follow Lumen.".to_string(),
            max_emoji_run: None,
        })
        .unwrap();
        let pool = FallbackPool::new(&["Lumen fallback post".to_string()], &validator).unwrap();
        let request = GenerationRequest {
            prompt: "p".to_string(),
            min_len: 10,
            max_len: 100,
            temperature: 0.9,
        };
        let composer = Composer::new(&ComposeConfig {
            platform_limit: 280,
            none_weight: 1,
            cta: vec![],
            hashtags: HashtagConfig::Fixed {
                text: "#Lumen".to_string(),
            },
        })
        .unwrap();
        Pipeline::new(
            ContentSource::with_generator(Box::new(generator), request, pool),
            validator,
            composer,
            Publisher::new(Box::new(platform)),
        )
    }

    fn scheduler(
        pipeline: Pipeline,
        policy: SchedulePolicy,
        clock: FakeClock,
        limit: usize,
    ) -> (Scheduler<FakeClock, FakeSleeper>, Arc<Mutex<Vec<Duration>>>) {
        let sleeps = Arc::new(Mutex::new(Vec::new()));
        let sleeper = FakeSleeper {
            clock: clock.clone(),
            sleeps: sleeps.clone(),
            limit,
        };
        let shutdown = Arc::new(AtomicBool::new(false));
        (
            Scheduler::new(pipeline, policy, clock, sleeper, shutdown),
            sleeps,
        )
    }

    #[tokio::test]
    async fn test_rate_limited_sleeps_cooldown_then_posts_new_draft() {
        let generator = MockGenerator::replying("Lumen first draft")
            .then_reply("Lumen second draft");
        let gen_handle = generator.clone();
        let platform = MockPlatform::new_simple("mock")
            .then_fail(PlatformError::RateLimit("429".to_string()))
            .then_succeed();
        let handle = platform.clone();

        let clock = FakeClock::at("2024-05-01T10:00:00Z");
        let (mut sched, sleeps) = scheduler(pipeline(generator, platform), policy(), clock, 2);
        sched.run(&mut StdRng::seed_from_u64(1)).await.unwrap();

        let sleeps = sleeps.lock().unwrap().clone();
        assert_eq!(sleeps, vec![Duration::from_secs(900), Duration::from_secs(3600)]);
        assert_eq!(gen_handle.calls(), 2);
        assert_eq!(
            handle.attempted_content(),
            vec!["Lumen first draft\n\n#Lumen", "Lumen second draft\n\n#Lumen"]
        );
        assert_eq!(handle.posted_content(), vec!["Lumen second draft\n\n#Lumen"]);
        assert_eq!(sched.state().posts_today, 1);
    }

    #[tokio::test]
    async fn test_rejected_and_unknown_use_failure_cooldown() {
        let platform = MockPlatform::new_simple("mock")
            .then_fail(PlatformError::Validation("duplicate".to_string()))
            .then_fail(PlatformError::Network("timeout".to_string()));
        let generator = MockGenerator::replying("Lumen one").then_reply("Lumen two");
        let clock = FakeClock::at("2024-05-01T10:00:00Z");
        let (mut sched, sleeps) = scheduler(pipeline(generator, platform), policy(), clock, 2);
        sched.run(&mut StdRng::seed_from_u64(2)).await.unwrap();

        let sleeps = sleeps.lock().unwrap().clone();
        assert_eq!(sleeps, vec![Duration::from_secs(60), Duration::from_secs(60)]);
        assert_eq!(sched.state().posts_today, 0);
    }

    #[tokio::test]
    async fn test_auth_failure_stops_scheduler() {
        let platform = MockPlatform::new_simple("mock")
            .then_fail(PlatformError::Authentication("token revoked".to_string()));
        let clock = FakeClock::at("2024-05-01T10:00:00Z");
        let (mut sched, sleeps) = scheduler(
            pipeline(MockGenerator::replying("Lumen post"), platform),
            policy(),
            clock,
            10,
        );

        let err = sched.run(&mut StdRng::seed_from_u64(3)).await.unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.to_string().contains("token revoked"));
        assert!(sleeps.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_quota_sleeps_until_midnight_and_resets() {
        let mut policy = policy();
        policy.daily_quota = Some(2);
        let clock = FakeClock::at("2024-05-01T20:00:00Z");
        let platform = MockPlatform::new_simple("mock");
        let handle = platform.clone();
        let (mut sched, sleeps) = scheduler(
            pipeline(MockGenerator::new(), platform),
            policy,
            clock.clone(),
            3,
        );
        sched.run(&mut StdRng::seed_from_u64(4)).await.unwrap();

        let sleeps = sleeps.lock().unwrap().clone();
        // 20:00 post, sleep 1h; 21:00 post hits quota, sleep to midnight
        assert_eq!(sleeps[0], Duration::from_secs(3600));
        assert_eq!(sleeps[1], Duration::from_secs(3 * 3600));
        // New day: counter reset and posting resumes
        assert_eq!(sleeps[2], Duration::from_secs(3600));
        assert_eq!(handle.posted_content().len(), 3);
        assert_eq!(sched.state().posts_today, 1);
        assert_eq!(sched.state().day, NaiveDate::from_ymd_opt(2024, 5, 2).unwrap());
    }

    #[tokio::test]
    async fn test_tick_skips_cycle_when_quota_used() {
        let mut policy = policy();
        policy.daily_quota = Some(1);
        let clock = FakeClock::at("2024-05-01T23:30:00Z");
        let platform = MockPlatform::new_simple("mock");
        let handle = platform.clone();
        let (mut sched, _) = scheduler(pipeline(MockGenerator::new(), platform), policy, clock, 1);
        let mut rng = StdRng::seed_from_u64(5);

        let first = sched.tick(&mut rng).await.unwrap();
        assert_eq!(first.reason, SleepReason::QuotaReached);
        assert!(first.report.is_some());

        let second = sched.tick(&mut rng).await.unwrap();
        assert_eq!(second.reason, SleepReason::QuotaReached);
        assert!(second.report.is_none());
        assert_eq!(second.sleep, Duration::from_secs(30 * 60));
        assert_eq!(handle.post_call_count(), 1);
    }

    #[tokio::test]
    async fn test_shutdown_flag_prevents_cycles() {
        let platform = MockPlatform::new_simple("mock");
        let handle = platform.clone();
        let clock = FakeClock::at("2024-05-01T10:00:00Z");
        let sleeper = FakeSleeper {
            clock: clock.clone(),
            sleeps: Arc::new(Mutex::new(Vec::new())),
            limit: 10,
        };
        let shutdown = Arc::new(AtomicBool::new(true));
        let mut sched = Scheduler::new(
            pipeline(MockGenerator::new(), platform),
            policy(),
            clock,
            sleeper,
            shutdown,
        );
        sched.run(&mut StdRng::seed_from_u64(6)).await.unwrap();
        assert_eq!(handle.post_call_count(), 0);
    }

    #[tokio::test]
    async fn test_tokio_sleeper_observes_shutdown() {
        let shutdown = Arc::new(AtomicBool::new(true));
        let sleeper = TokioSleeper::new(shutdown);
        let start = std::time::Instant::now();
        assert!(!sleeper.sleep(Duration::from_secs(30)).await);
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[tokio::test]
    async fn test_tokio_sleeper_completes_short_sleep() {
        let sleeper = TokioSleeper::new(Arc::new(AtomicBool::new(false)));
        assert!(sleeper.sleep(Duration::from_millis(20)).await);
    }

    #[test]
    fn test_uniform_cadence_within_bounds() {
        let cadence = Cadence::from_config(&CadenceConfig::Uniform {
            min: Duration::from_secs(7200),
            max: Duration::from_secs(14400),
        })
        .unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..200 {
            let interval = cadence.next_interval(&mut rng);
            assert!(interval >= Duration::from_secs(7200) && interval <= Duration::from_secs(14400));
        }
    }

    #[test]
    fn test_daily_spread_cadence() {
        let cadence = Cadence::from_config(&CadenceConfig::DailySpread {
            posts_per_day: 4,
            jitter: Duration::from_secs(600),
        })
        .unwrap();
        assert_eq!(
            cadence,
            Cadence::DailySpread {
                base: Duration::from_secs(21600),
                jitter: Duration::from_secs(600)
            }
        );
        let mut rng = StdRng::seed_from_u64(8);
        for _ in 0..200 {
            let secs = cadence.next_interval(&mut rng).as_secs();
            assert!((21000..=22200).contains(&secs), "{}", secs);
        }
    }

    #[test]
    fn test_invalid_cadences() {
        assert!(Cadence::from_config(&CadenceConfig::Fixed {
            interval: Duration::ZERO
        })
        .is_err());
        assert!(Cadence::from_config(&CadenceConfig::Uniform {
            min: Duration::from_secs(10),
            max: Duration::from_secs(5)
        })
        .is_err());
        assert!(Cadence::from_config(&CadenceConfig::DailySpread {
            posts_per_day: 0,
            jitter: Duration::ZERO
        })
        .is_err());
        assert!(Cadence::from_config(&CadenceConfig::DailySpread {
            posts_per_day: 24,
            jitter: Duration::from_secs(3600)
        })
        .is_err());
    }

    #[test]
    fn test_until_next_midnight() {
        let now = DateTime::parse_from_rfc3339("2024-02-28T23:59:30Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(until_next_midnight(now), Duration::from_secs(30));

        let midnight = DateTime::parse_from_rfc3339("2024-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        assert_eq!(until_next_midnight(midnight), Duration::from_secs(SECONDS_PER_DAY));
    }

    #[test]
    fn test_zero_quota_rejected() {
        let mut config = crate::config::Config::default_config().schedule;
        config.daily_quota = Some(0);
        assert!(SchedulePolicy::from_config(&config).is_err());
    }

    #[test]
    fn test_zero_cooldowns_rejected() {
        let mut config = crate::config::Config::default_config().schedule;
        config.failure_cooldown = Duration::ZERO;
        let err = SchedulePolicy::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("schedule.failure_cooldown"));

        let mut config = crate::config::Config::default_config().schedule;
        config.rate_limit_cooldown = Duration::ZERO;
        let err = SchedulePolicy::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("schedule.rate_limit_cooldown"));
    }
}
