//! Waiting for a selector to satisfy an assertion.
//!
//! [`wait_until`] is the entry point: it resolves the selector on every
//! tick, evaluates the assertion, and keeps polling until it holds or the
//! timeout elapses. The helpers below cover the common waits.

use std::time::{Duration, Instant};
use tracing::{debug, trace};

use crate::assertion::Assertion;
use crate::config::DEFAULT_POLL_INTERVAL_MS;
use crate::engine::MatcherEngine;
use crate::poll::{CancellationToken, PollReport, PollSpec, Poller};
use crate::result::{MatchError, MatchResult};
use crate::selector::Selector;

/// Resolve `selector` once and evaluate `assertion`.
///
/// A selector that matches nothing passes when the assertion accepts
/// absence ([`Assertion::Null`] or a compound built from it).
///
/// # Errors
///
/// Resolution errors from the engine, or `AssertionFailed` when the located
/// element does not satisfy the assertion.
pub fn check_assertion<G>(
    engine: &G,
    selector: &Selector<G::Element>,
    assertion: &Assertion<G::Element>,
) -> MatchResult<()>
where
    G: MatcherEngine,
{
    let element = match engine.locate(selector) {
        Ok(element) => element,
        Err(err) if err.is_not_found() && assertion.accepts_absent() => {
            trace!(selector = %selector, "absent element accepted");
            return Ok(());
        }
        Err(err) => return Err(err),
    };

    let predicate = assertion.predicate();
    if engine.evaluate(&predicate, &element) {
        Ok(())
    } else {
        Err(MatchError::AssertionFailed {
            assertion: predicate.name(),
            selector: selector.to_string(),
        })
    }
}

/// Poll until the element matching `selector` satisfies `assertion`.
///
/// # Errors
///
/// `Configuration` for an invalid timeout/interval pair, `Timeout` when the
/// assertion never holds.
pub fn wait_until<G>(
    engine: &G,
    selector: &Selector<G::Element>,
    assertion: &Assertion<G::Element>,
    timeout: Duration,
    interval: Duration,
) -> MatchResult<PollReport>
where
    G: MatcherEngine,
{
    let spec = PollSpec::new(timeout, interval)?;
    wait_with(engine, selector, assertion, Poller::new(spec))
}

/// [`wait_until`] with a caller-built poller (for cancellation).
///
/// # Errors
///
/// `Timeout`, `Cancelled`, or a non-retryable error from resolution.
pub fn wait_with<G>(
    engine: &G,
    selector: &Selector<G::Element>,
    assertion: &Assertion<G::Element>,
    poller: Poller,
) -> MatchResult<PollReport>
where
    G: MatcherEngine,
{
    let name = format!("{} on {selector}", assertion.predicate().name());
    let report = poller
        .with_description(name.as_str())
        .poll_result(|| check_assertion(engine, selector, assertion))?;
    debug!(condition = %name, attempts = report.attempts, "wait satisfied");
    Ok(report)
}

/// Wait with `interval` shortened to fit `timeout`.
///
/// A zero timeout evaluates the assertion exactly once and reports a miss
/// as `Timeout` with one attempt.
pub(crate) fn wait_within<G>(
    engine: &G,
    selector: &Selector<G::Element>,
    assertion: &Assertion<G::Element>,
    timeout: Duration,
    interval: Duration,
    cancellation: Option<&CancellationToken>,
) -> MatchResult<PollReport>
where
    G: MatcherEngine,
{
    if timeout.is_zero() {
        if cancellation.is_some_and(CancellationToken::is_cancelled) {
            return Err(MatchError::Cancelled { attempts: 0 });
        }
        let start = Instant::now();
        return match check_assertion(engine, selector, assertion) {
            Ok(()) => Ok(PollReport {
                attempts: 1,
                elapsed: start.elapsed(),
            }),
            Err(err) if err.is_retryable() => Err(MatchError::Timeout {
                ms: 0,
                attempts: 1,
                last_error: err.to_string(),
            }),
            Err(err) => Err(err),
        };
    }

    let mut poller = Poller::new(PollSpec::new(timeout, interval.min(timeout))?);
    if let Some(token) = cancellation {
        poller = poller.with_cancellation(token.clone());
    }
    wait_with(engine, selector, assertion, poller)
}

fn default_interval() -> Duration {
    Duration::from_millis(DEFAULT_POLL_INTERVAL_MS)
}

/// Wait until the element accepts user interaction.
///
/// # Errors
///
/// `Timeout` if it never becomes interactable.
pub fn wait_for_interactable<G>(
    engine: &G,
    selector: &Selector<G::Element>,
    timeout: Duration,
) -> MatchResult<PollReport>
where
    G: MatcherEngine,
{
    wait_within(
        engine,
        selector,
        &Assertion::Interactable,
        timeout,
        default_interval(),
        None,
    )
}

/// Wait until the element is sufficiently visible.
///
/// # Errors
///
/// `Timeout` if it never becomes visible.
pub fn wait_for_visible<G>(
    engine: &G,
    selector: &Selector<G::Element>,
    timeout: Duration,
) -> MatchResult<PollReport>
where
    G: MatcherEngine,
{
    wait_within(
        engine,
        selector,
        &Assertion::SufficientlyVisible,
        timeout,
        default_interval(),
        None,
    )
}

/// Wait until the element is not visible or gone from the tree.
///
/// # Errors
///
/// `Timeout` if it stays visible.
pub fn wait_until_hidden<G>(
    engine: &G,
    selector: &Selector<G::Element>,
    timeout: Duration,
) -> MatchResult<PollReport>
where
    G: MatcherEngine,
{
    let hidden = Assertion::any([Assertion::Null, Assertion::Hidden])?;
    wait_within(engine, selector, &hidden, timeout, default_interval(), None)
}

/// Whether the element becomes sufficiently visible within `timeout`.
///
/// A zero timeout checks once.
///
/// # Errors
///
/// Non-retryable errors other than `Cancelled`, such as a `Configuration`
/// error raised by the engine.
pub fn is_visible_within<G>(
    engine: &G,
    selector: &Selector<G::Element>,
    timeout: Duration,
) -> MatchResult<bool>
where
    G: MatcherEngine,
{
    match wait_for_visible(engine, selector, timeout) {
        Ok(_) => Ok(true),
        Err(err @ (MatchError::Timeout { .. } | MatchError::Cancelled { .. })) => {
            debug!(selector = %selector, error = %err, "not visible");
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::mock::{MockChange, MockElement, MockNode, MockTree};

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    mod check {
        use super::*;

        #[test]
        fn test_passes_and_fails() {
            let tree = MockTree::new();
            tree.add(tree.root(), MockNode::new("Button").with_id("pay").disabled());
            let selector = Selector::id("pay");
            assert!(check_assertion(&tree, &selector, &Assertion::Disabled).is_ok());
            let err = check_assertion(&tree, &selector, &Assertion::Enabled).unwrap_err();
            assert!(matches!(
                err,
                MatchError::AssertionFailed { ref assertion, .. } if assertion == "enabled"
            ));
        }

        #[test]
        fn test_null_accepts_absence() {
            let tree = MockTree::new();
            let selector = Selector::<MockElement>::id("gone");
            assert!(check_assertion(&tree, &selector, &Assertion::Null).is_ok());
            assert!(check_assertion(&tree, &selector, &Assertion::NotNull)
                .unwrap_err()
                .is_not_found());
        }

        #[test]
        fn test_ambiguity_is_not_absence() {
            let tree = MockTree::new();
            tree.add(tree.root(), MockNode::new("Cell"));
            tree.add(tree.root(), MockNode::new("Cell"));
            let err = check_assertion(&tree, &Selector::kind("Cell"), &Assertion::Null).unwrap_err();
            assert!(matches!(err, MatchError::Ambiguous { count: 2, .. }));
        }
    }

    mod waiting {
        use super::*;

        #[test]
        fn test_becomes_visible_later() {
            let tree = MockTree::new();
            let id = tree.add(tree.root(), MockNode::new("Banner").with_id("banner").hidden());
            tree.schedule_after_queries(3, id, MockChange::Hidden(false));
            let report = wait_for_visible(&tree, &Selector::id("banner"), ms(1000)).unwrap();
            assert_eq!(report.attempts, 4);
        }

        #[test]
        fn test_timeout_carries_last_error() {
            let tree = MockTree::new();
            tree.add(tree.root(), MockNode::new("Button").with_id("pay").disabled());
            let err = wait_for_interactable(&tree, &Selector::id("pay"), ms(60)).unwrap_err();
            match err {
                MatchError::Timeout { ms, last_error, .. } => {
                    assert_eq!(ms, 60);
                    assert!(last_error.contains("interactable"));
                }
                other => panic!("unexpected error: {other}"),
            }
        }

        #[test]
        fn test_invalid_interval_rejected() {
            let tree = MockTree::new();
            let err = wait_until(
                &tree,
                &Selector::id("x"),
                &Assertion::Enabled,
                ms(10),
                ms(50),
            )
            .unwrap_err();
            assert!(matches!(err, MatchError::Configuration { .. }));
            assert_eq!(tree.query_count(), 0);
        }

        #[test]
        fn test_until_hidden_by_detach() {
            let tree = MockTree::new();
            let id = tree.add(tree.root(), MockNode::new("Spinner").with_id("spinner"));
            tree.schedule_after_queries(2, id, MockChange::Detach);
            let report = wait_until_hidden(&tree, &Selector::id("spinner"), ms(1000)).unwrap();
            assert_eq!(report.attempts, 3);
        }

        #[test]
        fn test_is_visible_within() {
            let tree = MockTree::new();
            tree.add(tree.root(), MockNode::new("Label").with_id("shown"));
            tree.add(tree.root(), MockNode::new("Label").with_id("half").with_visibility(0.5));
            assert!(is_visible_within(&tree, &Selector::id("shown"), ms(100)).unwrap());
            assert!(!is_visible_within(&tree, &Selector::id("half"), ms(60)).unwrap());
        }
    }

    mod zero_timeout {
        use super::*;

        #[test]
        fn test_visible_element_checked_once() {
            let tree = MockTree::new();
            tree.add(tree.root(), MockNode::new("Label").with_text("Calzone"));
            let selector = Selector::text("Calzone");
            assert!(is_visible_within(&tree, &selector, Duration::ZERO).unwrap());
            let report = wait_for_visible(&tree, &selector, Duration::ZERO).unwrap();
            assert_eq!(report.attempts, 1);
        }

        #[test]
        fn test_miss_is_timeout_after_one_attempt() {
            let tree = MockTree::new();
            tree.add(tree.root(), MockNode::new("Button").with_id("pay").disabled());
            let err = wait_for_interactable(&tree, &Selector::id("pay"), Duration::ZERO)
                .unwrap_err();
            assert!(matches!(err, MatchError::Timeout { ms: 0, attempts: 1, .. }));
            assert_eq!(tree.query_count(), 1);
            assert!(!is_visible_within(&tree, &Selector::id("gone"), Duration::ZERO).unwrap());
        }

        #[test]
        fn test_absent_element_is_hidden() {
            let tree = MockTree::new();
            let report =
                wait_until_hidden(&tree, &Selector::<MockElement>::id("spinner"), Duration::ZERO)
                    .unwrap();
            assert_eq!(report.attempts, 1);
        }

        #[test]
        fn test_cancelled_before_check() {
            let tree = MockTree::new();
            let token = CancellationToken::new();
            token.cancel();
            let err = wait_within(
                &tree,
                &Selector::<MockElement>::id("x"),
                &Assertion::Enabled,
                Duration::ZERO,
                ms(50),
                Some(&token),
            )
            .unwrap_err();
            assert!(matches!(err, MatchError::Cancelled { attempts: 0 }));
            assert_eq!(tree.query_count(), 0);
        }

        #[test]
        fn test_cancelled_wait() {
            let tree = MockTree::new();
            let token = CancellationToken::new();
            token.cancel();
            let poller = Poller::new(PollSpec::from_millis(1000, 50).unwrap())
                .with_cancellation(token);
            let err = wait_with(
                &tree,
                &Selector::<MockElement>::id("x"),
                &Assertion::Enabled,
                poller,
            )
            .unwrap_err();
            assert!(matches!(err, MatchError::Cancelled { attempts: 0 }));
        }
    }
}
