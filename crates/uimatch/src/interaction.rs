//! Session and interaction API.
//!
//! A [`Session`] owns an engine and its [`MatchConfig`]. `session.on(selector)`
//! returns an [`Interaction`] that asserts, waits and performs actions on the
//! element the selector resolves to. Resolution happens on every call, so an
//! interaction always sees the current tree.
//!
//! ```rust,ignore
//! let session = Session::new(engine);
//! session
//!     .on(Selector::id("checkout"))
//!     .assert_within(Assertion::Interactable, Duration::from_secs(5))?
//!     .perform(&Action::Tap)?;
//! ```

use std::time::Duration;
use tracing::{debug, warn};

use crate::action::{Action, Direction, Scroll, ScrollOffset};
use crate::assertion::Assertion;
use crate::config::MatchConfig;
use crate::engine::{ElementView, MatcherEngine};
use crate::poll::{CancellationToken, PollReport};
use crate::result::{MatchError, MatchResult};
use crate::selector::Selector;
use crate::wait::{check_assertion, wait_within};

/// An engine together with matching configuration
#[derive(Debug)]
pub struct Session<G> {
    engine: G,
    config: MatchConfig,
    cancellation: Option<CancellationToken>,
}

impl<G: MatcherEngine> Session<G> {
    /// Create a session with default configuration
    #[must_use]
    pub fn new(engine: G) -> Self {
        Self {
            engine,
            config: MatchConfig::default(),
            cancellation: None,
        }
    }

    /// Create a session with the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `config` does not validate.
    pub fn with_config(engine: G, config: MatchConfig) -> MatchResult<Self> {
        config.validate()?;
        Ok(Self {
            engine,
            config,
            cancellation: None,
        })
    }

    /// Cancel every wait in this session when `token` fires
    #[must_use]
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = Some(token);
        self
    }

    /// The engine
    #[must_use]
    pub const fn engine(&self) -> &G {
        &self.engine
    }

    /// The configuration
    #[must_use]
    pub const fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Interact with the element matching `selector`
    #[must_use]
    pub const fn on(&self, selector: Selector<G::Element>) -> Interaction<'_, G> {
        Interaction {
            session: self,
            selector,
        }
    }

    /// Directional scroll using the configured step
    #[must_use]
    pub const fn scroll(&self, direction: Direction) -> Scroll {
        Scroll::new(direction, ScrollOffset::Step(self.config.scroll_step))
    }

    /// Wait until `selector` satisfies `assertion` within the configured
    /// timeout.
    ///
    /// # Errors
    ///
    /// `Timeout` or `Cancelled`.
    pub fn wait_until(
        &self,
        selector: &Selector<G::Element>,
        assertion: &Assertion<G::Element>,
    ) -> MatchResult<PollReport> {
        self.wait(selector, assertion, self.config.timeout())
    }

    fn wait(
        &self,
        selector: &Selector<G::Element>,
        assertion: &Assertion<G::Element>,
        timeout: Duration,
    ) -> MatchResult<PollReport> {
        wait_within(
            &self.engine,
            selector,
            assertion,
            timeout,
            self.config.poll_interval(),
            self.cancellation.as_ref(),
        )
    }

    /// Format an error with the session's diagnostic settings
    #[must_use]
    pub fn report(&self, error: &MatchError) -> String {
        error.report(&self.config.diagnostics)
    }
}

/// Operations on the element a selector resolves to
#[derive(Debug)]
pub struct Interaction<'s, G: MatcherEngine> {
    session: &'s Session<G>,
    selector: Selector<G::Element>,
}

impl<G: MatcherEngine> Interaction<'_, G> {
    /// The selector this interaction resolves
    #[must_use]
    pub const fn selector(&self) -> &Selector<G::Element> {
        &self.selector
    }

    fn element(&self) -> MatchResult<G::Element> {
        self.session.engine.locate(&self.selector)
    }

    /// Assert once, without waiting.
    ///
    /// # Errors
    ///
    /// `AssertionFailed` or a resolution error.
    pub fn assert(&self, assertion: Assertion<G::Element>) -> MatchResult<&Self> {
        check_assertion(&self.session.engine, &self.selector, &assertion)?;
        Ok(self)
    }

    /// Assert, polling until the assertion holds or `timeout` elapses.
    ///
    /// # Errors
    ///
    /// `Timeout` or `Cancelled`.
    pub fn assert_within(
        &self,
        assertion: Assertion<G::Element>,
        timeout: Duration,
    ) -> MatchResult<&Self> {
        self.session.wait(&self.selector, &assertion, timeout)?;
        Ok(self)
    }

    /// Whether the assertion holds now
    #[must_use]
    pub fn check(&self, assertion: Assertion<G::Element>) -> bool {
        check_assertion(&self.session.engine, &self.selector, &assertion).is_ok()
    }

    /// Whether the assertion holds within `timeout`
    #[must_use]
    pub fn check_within(&self, assertion: Assertion<G::Element>, timeout: Duration) -> bool {
        self.session.wait(&self.selector, &assertion, timeout).is_ok()
    }

    /// Perform an action.
    ///
    /// # Errors
    ///
    /// A resolution error, or `ActionFailed` from the engine.
    pub fn perform(&self, action: &Action) -> MatchResult<&Self> {
        let element = self.element()?;
        debug!(selector = %self.selector, %action, "perform");
        self.session.engine.perform(action, &element)?;
        Ok(self)
    }

    /// Sleep for `delay`, then perform an action.
    ///
    /// # Errors
    ///
    /// Same as [`Interaction::perform`].
    pub fn perform_after(&self, action: &Action, delay: Duration) -> MatchResult<&Self> {
        std::thread::sleep(delay);
        self.perform(action)
    }

    /// Perform an action `count` times, sleeping `delay` between
    /// repetitions.
    ///
    /// # Errors
    ///
    /// The first failure; later repetitions are skipped.
    pub fn perform_repeatedly(
        &self,
        action: &Action,
        count: usize,
        delay: Duration,
    ) -> MatchResult<&Self> {
        for i in 0..count {
            if i > 0 {
                std::thread::sleep(delay);
            }
            self.perform(action)?;
        }
        Ok(self)
    }

    /// Text of the element.
    ///
    /// # Errors
    ///
    /// A resolution error, or `NotSupported` for elements without text.
    pub fn text(&self) -> MatchResult<String> {
        let element = self.element()?;
        self.session.engine.text_of(&element)
    }

    /// Text of the first descendant (pre-order) that has any.
    ///
    /// # Errors
    ///
    /// A resolution error, or `NotSupported` when no descendant has text.
    pub fn descendant_text(&self) -> MatchResult<String> {
        let element = self.element()?;
        let mut stack = element.children();
        stack.reverse();
        while let Some(current) = stack.pop() {
            if let Some(text) = current.text() {
                return Ok(text);
            }
            let mut children = current.children();
            children.reverse();
            stack.extend(children);
        }
        Err(MatchError::not_supported("descendant text"))
    }

    /// Accessibility identifier of the element.
    ///
    /// # Errors
    ///
    /// A resolution error, or `NotSupported` when the element has none.
    pub fn accessibility_id(&self) -> MatchResult<String> {
        self.element()?
            .accessibility_id()
            .ok_or_else(|| MatchError::not_supported("accessibility id"))
    }

    /// Whether the element is selected.
    ///
    /// # Errors
    ///
    /// A resolution error.
    pub fn is_selected(&self) -> MatchResult<bool> {
        Ok(self.element()?.is_selected())
    }

    /// Scroll `container` until this interaction's selector resolves.
    ///
    /// Gives up once the container reports the edge in the scroll direction
    /// or after the configured number of attempts.
    ///
    /// # Errors
    ///
    /// `NotFound` if the element never appears, or any other resolution or
    /// action error.
    pub fn scroll_to_find(
        &self,
        scroll: Scroll,
        container: &Selector<G::Element>,
    ) -> MatchResult<G::Element> {
        let engine = &self.session.engine;
        let max_attempts = self.session.config.max_scroll_attempts;
        let edge = scroll.direction.edge();
        let action = scroll.action();

        for attempt in 0..=max_attempts {
            match self.element() {
                Ok(element) => {
                    debug!(selector = %self.selector, attempt, "found after scrolling");
                    return Ok(element);
                }
                Err(err) if err.is_not_found() => {}
                Err(err) => return Err(err),
            }

            let target = engine.locate(container)?;
            if target.is_scrolled_to_edge(edge) {
                warn!(selector = %self.selector, %edge, "reached content edge");
                return Err(MatchError::not_found(format!(
                    "{} (scrolled to {edge} edge of {container})",
                    self.selector
                )));
            }
            if attempt == max_attempts {
                break;
            }
            engine.perform(&action, &target)?;
        }

        warn!(selector = %self.selector, max_attempts, "scroll attempts exhausted");
        Err(MatchError::not_found(format!(
            "{} (after {max_attempts} scroll(s) of {container})",
            self.selector
        )))
    }
}
