//! uimatch: declarative element matching and polling waits for UI tests
//!
//! Tests describe *which* element they want with composable predicates and
//! *what* should hold for it with a closed assertion vocabulary. An external
//! engine owns the live element tree; this crate composes the queries,
//! resolves them through the engine and polls until UI state settles.
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────────────┐
//! │   Predicate ──► Selector ──┐                                  │
//! │   (allOf/anyOf/not)        ├──► Interaction ──► MatcherEngine │
//! │   Assertion ───────────────┘        │            (locate,     │
//! │                                     ▼             perform)    │
//! │                               Poller (tick, sleep, timeout)   │
//! └───────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use std::time::Duration;
//! use uimatch::prelude::*;
//!
//! let report = wait_until(
//!     &engine,
//!     &Selector::id("order.confirm"),
//!     &Assertion::SufficientlyVisible,
//!     Duration::from_secs(1),
//!     Duration::from_millis(50),
//! )?;
//! ```

#![warn(missing_docs)]

mod action;
mod assertion;
mod config;
mod diagnostics;
mod engine;
mod interaction;
mod poll;
mod predicate;
mod result;
mod selector;
mod visibility;
mod wait;

/// Leaf predicates over element attributes
pub mod predicates;

/// Tracing subscriber setup
pub mod logging;

/// In-memory engine for tests and examples
pub mod mock;

pub use action::{
    Action, ContentEdge, Direction, Scroll, ScrollOffset, SwipeSpeed, DEFAULT_SCROLL_STEP,
};
pub use assertion::{Assertion, AssertionSet};
pub use config::{
    MatchConfig, DEFAULT_MAX_SCROLL_ATTEMPTS, DEFAULT_POLL_INTERVAL_MS, DEFAULT_TIMEOUT_MS,
};
pub use diagnostics::{DiagnosticFormat, HIERARCHY_MARKER};
pub use engine::{ElementView, MatcherEngine};
pub use interaction::{Interaction, Session};
pub use poll::{poll, CancellationToken, Check, PollReport, PollSpec, PollState, Poller};
pub use predicate::{Combination, CompoundPredicate, Predicate};
pub use result::{MatchError, MatchResult};
pub use selector::{Relation, Scope, Selector};
pub use visibility::{
    all_ancestors_visible, collect_accessibility_ids, Visibility, MINIMAL_VISIBILITY,
    SUFFICIENT_VISIBILITY,
};
pub use wait::{
    check_assertion, is_visible_within, wait_for_interactable, wait_for_visible, wait_until,
    wait_until_hidden, wait_with,
};

/// Common imports
pub mod prelude {
    pub use super::action::*;
    pub use super::assertion::*;
    pub use super::config::*;
    pub use super::engine::*;
    pub use super::interaction::*;
    pub use super::poll::{CancellationToken, PollReport, PollSpec, Poller};
    pub use super::predicate::*;
    pub use super::result::*;
    pub use super::selector::*;
    pub use super::visibility::Visibility;
    pub use super::wait::*;
}
