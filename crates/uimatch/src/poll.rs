//! Condition poller for eventually-consistent UI state.
//!
//! The poller evaluates a check immediately, then sleeps a fixed interval
//! between attempts until the check passes or the deadline elapses. It
//! blocks the calling thread; there is no backoff.
//!
//! ```text
//! PENDING ──check ok──────────────► SATISFIED
//!    │  ▲
//!    │  └─ sleep(min(interval, remaining))
//!    ├──check failed, deadline hit──► TIMED_OUT
//!    └──token cancelled─────────────► CANCELLED
//! ```

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::result::{MatchError, MatchResult};

/// Poll timing: how long to keep trying and how often
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSpec {
    timeout: Duration,
    interval: Duration,
}

impl PollSpec {
    /// Create a poll spec.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `interval` is zero or longer than
    /// `timeout`.
    pub fn new(timeout: Duration, interval: Duration) -> MatchResult<Self> {
        if interval.is_zero() {
            return Err(MatchError::configuration(
                "poll interval must be greater than zero",
            ));
        }
        if interval > timeout {
            return Err(MatchError::configuration(format!(
                "poll interval {}ms exceeds timeout {}ms",
                interval.as_millis(),
                timeout.as_millis()
            )));
        }
        Ok(Self { timeout, interval })
    }

    /// Create from milliseconds.
    ///
    /// # Errors
    ///
    /// Same as [`PollSpec::new`].
    pub fn from_millis(timeout_ms: u64, interval_ms: u64) -> MatchResult<Self> {
        Self::new(
            Duration::from_millis(timeout_ms),
            Duration::from_millis(interval_ms),
        )
    }

    /// Total time budget
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Sleep between attempts
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }
}

/// Poller state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PollState {
    /// Still evaluating
    Pending,
    /// Check passed
    Satisfied,
    /// Deadline elapsed
    TimedOut,
    /// Cancelled through the token
    Cancelled,
}

impl fmt::Display for PollState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Satisfied => "satisfied",
            Self::TimedOut => "timed out",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// Result of a single check evaluation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    /// Condition holds
    Pass,
    /// Condition does not hold yet, with a diagnostic
    Fail(String),
}

impl Check {
    /// Check if the result is a pass
    #[must_use]
    pub const fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }

    /// Check if the result is a fail
    #[must_use]
    pub const fn is_fail(&self) -> bool {
        matches!(self, Self::Fail(_))
    }
}

impl From<bool> for Check {
    fn from(passed: bool) -> Self {
        if passed {
            Self::Pass
        } else {
            Self::Fail("condition not met".to_string())
        }
    }
}

impl From<MatchResult<()>> for Check {
    fn from(result: MatchResult<()>) -> Self {
        match result {
            Ok(()) => Self::Pass,
            Err(err) => Self::Fail(err.to_string()),
        }
    }
}

/// Cooperative cancellation flag, checked once per tick
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create an uncancelled token
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Outcome of a satisfied poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollReport {
    /// Number of evaluations, including the passing one
    pub attempts: usize,
    /// Time from the first evaluation to success
    pub elapsed: Duration,
}

/// Blocking condition poller
#[derive(Debug, Clone)]
pub struct Poller {
    spec: PollSpec,
    cancellation: Option<CancellationToken>,
    description: Option<String>,
}

impl Poller {
    /// Create a poller
    #[must_use]
    pub const fn new(spec: PollSpec) -> Self {
        Self {
            spec,
            cancellation: None,
            description: None,
        }
    }

    /// Stop early when `token` is cancelled
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// Name used in logs
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Poll timing
    #[must_use]
    pub const fn spec(&self) -> &PollSpec {
        &self.spec
    }

    /// Poll a boolean-valued check
    ///
    /// # Errors
    ///
    /// `Timeout` when the deadline elapses, `Cancelled` when the token fires.
    pub fn poll<F, C>(&self, mut check: F) -> MatchResult<PollReport>
    where
        F: FnMut() -> C,
        C: Into<Check>,
    {
        self.run(|| Ok(check().into()))
    }

    /// Poll a fallible check.
    ///
    /// Retryable errors count as a failed tick; other errors end the poll
    /// immediately.
    ///
    /// # Errors
    ///
    /// `Timeout`, `Cancelled`, or the first non-retryable error from `check`.
    pub fn poll_result<F>(&self, mut check: F) -> MatchResult<PollReport>
    where
        F: FnMut() -> MatchResult<()>,
    {
        self.run(|| match check() {
            Ok(()) => Ok(Check::Pass),
            Err(err) if err.is_retryable() => Ok(Check::Fail(err.to_string())),
            Err(err) => Err(err),
        })
    }

    fn run<F>(&self, mut tick: F) -> MatchResult<PollReport>
    where
        F: FnMut() -> MatchResult<Check>,
    {
        let name = self.description.as_deref().unwrap_or("condition");
        let start = Instant::now();
        let mut attempts = 0usize;
        let mut last_error = String::new();
        let mut state = PollState::Pending;

        while state == PollState::Pending {
            if self.is_cancelled() {
                state = PollState::Cancelled;
                break;
            }

            attempts += 1;
            match tick()? {
                Check::Pass => {
                    state = PollState::Satisfied;
                    break;
                }
                Check::Fail(message) => {
                    trace!(condition = name, attempts, %message, "check failed");
                    last_error = message;
                }
            }

            let elapsed = start.elapsed();
            if elapsed >= self.spec.timeout {
                state = PollState::TimedOut;
                break;
            }
            std::thread::sleep(self.spec.interval.min(self.spec.timeout - elapsed));
        }

        let elapsed = start.elapsed();
        debug!(condition = name, %state, attempts, elapsed_ms = elapsed.as_millis() as u64, "poll finished");
        match state {
            PollState::Satisfied => Ok(PollReport { attempts, elapsed }),
            PollState::Cancelled => Err(MatchError::Cancelled { attempts }),
            PollState::Pending | PollState::TimedOut => Err(MatchError::Timeout {
                ms: self.spec.timeout.as_millis() as u64,
                attempts,
                last_error,
            }),
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancellation
            .as_ref()
            .is_some_and(CancellationToken::is_cancelled)
    }
}

/// Poll `check` once per `spec.interval` until it passes or `spec.timeout`
/// elapses.
///
/// # Errors
///
/// `Timeout` if the check never passes.
pub fn poll<F, C>(spec: PollSpec, check: F) -> MatchResult<PollReport>
where
    F: FnMut() -> C,
    C: Into<Check>,
{
    Poller::new(spec).poll(check)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn spec(timeout_ms: u64, interval_ms: u64) -> PollSpec {
        PollSpec::from_millis(timeout_ms, interval_ms).unwrap()
    }

    mod poll_spec {
        use super::*;

        #[test]
        fn test_valid() {
            let spec = spec(1000, 50);
            assert_eq!(spec.timeout(), Duration::from_secs(1));
            assert_eq!(spec.interval(), Duration::from_millis(50));
        }

        #[test]
        fn test_zero_interval_rejected() {
            let err = PollSpec::from_millis(1000, 0).unwrap_err();
            assert!(matches!(err, MatchError::Configuration { .. }));
        }

        #[test]
        fn test_interval_longer_than_timeout_rejected() {
            assert!(PollSpec::from_millis(100, 200).is_err());
        }

        #[test]
        fn test_interval_equal_to_timeout_allowed() {
            assert!(PollSpec::from_millis(100, 100).is_ok());
        }
    }

    mod check {
        use super::*;

        #[test]
        fn test_from_bool() {
            assert!(Check::from(true).is_pass());
            assert!(Check::from(false).is_fail());
        }

        #[test]
        fn test_from_result() {
            assert!(Check::from(Ok::<(), MatchError>(())).is_pass());
            let check = Check::from(Err::<(), _>(MatchError::not_found("x")));
            assert_eq!(check, Check::Fail("No element matches x".into()));
        }
    }

    mod poller {
        use super::*;

        #[test]
        fn test_immediate_pass() {
            let report = poll(spec(500, 20), || true).unwrap();
            assert_eq!(report.attempts, 1);
            assert!(report.elapsed < Duration::from_millis(20));
        }

        #[test]
        fn test_pass_after_k_ticks() {
            let mut calls = 0;
            let report = poll(spec(2000, 20), || {
                calls += 1;
                calls > 3
            })
            .unwrap();
            assert_eq!(report.attempts, 4);
            assert!(report.elapsed >= Duration::from_millis(60));
        }

        #[test]
        fn test_timeout_keeps_last_error() {
            let mut calls = 0;
            let err = poll(spec(100, 20), || {
                calls += 1;
                Check::Fail(format!("attempt {calls}"))
            })
            .unwrap_err();
            match err {
                MatchError::Timeout {
                    ms,
                    attempts,
                    last_error,
                } => {
                    assert_eq!(ms, 100);
                    assert!(attempts > 1);
                    assert_eq!(last_error, format!("attempt {attempts}"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_timeout_bounds() {
            let start = Instant::now();
            let _ = poll(spec(150, 50), || false).unwrap_err();
            let elapsed = start.elapsed();
            assert!(elapsed >= Duration::from_millis(150));
            assert!(elapsed < Duration::from_millis(150 + 50 + 100));
        }

        #[test]
        fn test_non_retryable_error_stops() {
            let mut calls = 0;
            let err = Poller::new(spec(1000, 10))
                .poll_result(|| {
                    calls += 1;
                    Err(MatchError::configuration("bad"))
                })
                .unwrap_err();
            assert!(matches!(err, MatchError::Configuration { .. }));
            assert_eq!(calls, 1);
        }

        #[test]
        fn test_retryable_error_retried() {
            let mut calls = 0;
            let report = Poller::new(spec(1000, 10))
                .poll_result(|| {
                    calls += 1;
                    if calls < 3 {
                        Err(MatchError::not_found("x"))
                    } else {
                        Ok(())
                    }
                })
                .unwrap();
            assert_eq!(report.attempts, 3);
        }
    }

    mod cancellation {
        use super::*;

        #[test]
        fn test_cancelled_before_start() {
            let token = CancellationToken::new();
            token.cancel();
            let err = Poller::new(spec(1000, 10))
                .with_cancellation(token)
                .poll(|| false)
                .unwrap_err();
            assert!(matches!(err, MatchError::Cancelled { attempts: 0 }));
        }

        #[test]
        fn test_cancelled_mid_poll() {
            let token = CancellationToken::new();
            let trigger = token.clone();
            let mut calls = 0;
            let err = Poller::new(spec(5000, 10))
                .with_cancellation(token)
                .with_description("cancel test")
                .poll(|| {
                    calls += 1;
                    if calls == 2 {
                        trigger.cancel();
                    }
                    false
                })
                .unwrap_err();
            assert!(matches!(err, MatchError::Cancelled { attempts: 2 }));
        }
    }

    #[test]
    fn test_state_display() {
        assert_eq!(PollState::TimedOut.to_string(), "timed out");
        assert_eq!(PollState::Satisfied.to_string(), "satisfied");
    }
}
