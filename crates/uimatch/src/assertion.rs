//! Assertion vocabulary for terminal pass/fail checks.
//!
//! Every [`Assertion`] maps to a [`Predicate`] through an exhaustive match,
//! so adding a variant without a mapping does not compile. Compound
//! assertions hold an [`AssertionSet`], which cannot be empty.

use std::fmt;

use crate::action::ContentEdge;
use crate::engine::ElementView;
use crate::predicate::{Combination, Predicate};
use crate::predicates::{
    contains_text, enabled, has_descendant, interactable, minimum_visible, not_contains_text,
    not_visible, progress_equals, scrolled_to_edge, selected, text_equals, text_not_equals,
    TextCase,
};
use crate::result::{MatchError, MatchResult};
use crate::visibility::Visibility;

/// Non-empty list of assertions for `All` / `Any`
pub struct AssertionSet<E>(Vec<Assertion<E>>);

impl<E> AssertionSet<E> {
    /// Create a set.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `assertions` is empty.
    pub fn new(assertions: impl IntoIterator<Item = Assertion<E>>) -> MatchResult<Self> {
        let assertions: Vec<_> = assertions.into_iter().collect();
        if assertions.is_empty() {
            return Err(MatchError::configuration(
                "compound assertion requires at least one assertion",
            ));
        }
        Ok(Self(assertions))
    }

    /// Assertions in evaluation order
    #[must_use]
    pub fn as_slice(&self) -> &[Assertion<E>] {
        &self.0
    }
}

impl<E> Clone for AssertionSet<E> {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}

impl<E> fmt::Debug for AssertionSet<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AssertionSet").field(&self.0).finish()
    }
}

/// A named check evaluated against a located element
pub enum Assertion<E> {
    /// Element is enabled
    Enabled,
    /// Element is not enabled
    Disabled,
    /// Element is selected
    Selected,
    /// Element accepts interaction
    Interactable,
    /// Element is not visible at all
    Hidden,
    /// At least 10% visible
    MinimallyVisible,
    /// At least 75% visible
    SufficientlyVisible,
    /// At least the given fraction visible (clamped into `[0, 1]`)
    Visible(f64),
    /// Scroll container shows the given edge
    ScrolledToEdge(ContentEdge),
    /// Text equals exactly
    TextEquals(String),
    /// Text differs (passes when the element has no text)
    TextNotEquals(String),
    /// Text contains, case-sensitive
    ContainsText(String),
    /// Text contains, ignoring case
    ContainsTextIgnoringCase(String),
    /// Text does not contain (fails when the element has no text)
    NotContainsText(String),
    /// Some descendant's text contains, case-sensitive
    DescendantContainsText(String),
    /// Progress value equals
    Progress(f64),
    /// No element matches the selector
    Null,
    /// Some element matches the selector
    NotNull,
    /// Every assertion holds
    All(AssertionSet<E>),
    /// At least one assertion holds
    Any(AssertionSet<E>),
    /// Caller-supplied predicate
    Custom(Predicate<E>),
}

impl<E> Assertion<E> {
    /// Every assertion must hold.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `assertions` is empty.
    pub fn all(assertions: impl IntoIterator<Item = Self>) -> MatchResult<Self> {
        AssertionSet::new(assertions).map(Self::All)
    }

    /// At least one assertion must hold.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `assertions` is empty.
    pub fn any(assertions: impl IntoIterator<Item = Self>) -> MatchResult<Self> {
        AssertionSet::new(assertions).map(Self::Any)
    }

    /// Wrap a closure as a custom assertion
    pub fn matching<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self::Custom(Predicate::new(name, test))
    }

    /// Whether the assertion passes when the selector matches nothing
    #[must_use]
    pub fn accepts_absent(&self) -> bool {
        match self {
            Self::Null => true,
            Self::All(set) => set.as_slice().iter().all(Self::accepts_absent),
            Self::Any(set) => set.as_slice().iter().any(Self::accepts_absent),
            _ => false,
        }
    }
}

impl<E: ElementView + 'static> Assertion<E> {
    /// Map to the predicate evaluated against the located element
    #[must_use]
    pub fn predicate(&self) -> Predicate<E> {
        match self {
            Self::Enabled => enabled(),
            Self::Disabled => Predicate::not(enabled()),
            Self::Selected => selected(),
            Self::Interactable => interactable(),
            Self::Hidden => not_visible(),
            Self::MinimallyVisible => Visibility::Minimal.predicate(),
            Self::SufficientlyVisible => Visibility::Sufficient.predicate(),
            Self::Visible(fraction) => minimum_visible(*fraction),
            Self::ScrolledToEdge(edge) => scrolled_to_edge(*edge),
            Self::TextEquals(text) => text_equals(text.as_str()),
            Self::TextNotEquals(text) => text_not_equals(text.as_str()),
            Self::ContainsText(text) => contains_text(text.as_str(), TextCase::Sensitive),
            Self::ContainsTextIgnoringCase(text) => {
                contains_text(text.as_str(), TextCase::Insensitive)
            }
            Self::NotContainsText(text) => not_contains_text(text.as_str()),
            Self::DescendantContainsText(text) => {
                has_descendant(contains_text(text.as_str(), TextCase::Sensitive))
            }
            Self::Progress(value) => progress_equals(*value),
            Self::Null => Predicate::new("nil", |_: &E| false),
            Self::NotNull => Predicate::new("notNil", |_: &E| true),
            Self::All(set) => Predicate::compound(
                Combination::All,
                set.as_slice().iter().map(Self::predicate).collect(),
            ),
            Self::Any(set) => Predicate::compound(
                Combination::Any,
                set.as_slice().iter().map(Self::predicate).collect(),
            ),
            Self::Custom(predicate) => predicate.clone(),
        }
    }

    /// Evaluate directly against an element
    #[must_use]
    pub fn holds_for(&self, element: &E) -> bool {
        self.predicate().matches(element)
    }
}

impl<E> Clone for Assertion<E> {
    fn clone(&self) -> Self {
        match self {
            Self::Enabled => Self::Enabled,
            Self::Disabled => Self::Disabled,
            Self::Selected => Self::Selected,
            Self::Interactable => Self::Interactable,
            Self::Hidden => Self::Hidden,
            Self::MinimallyVisible => Self::MinimallyVisible,
            Self::SufficientlyVisible => Self::SufficientlyVisible,
            Self::Visible(f) => Self::Visible(*f),
            Self::ScrolledToEdge(edge) => Self::ScrolledToEdge(*edge),
            Self::TextEquals(t) => Self::TextEquals(t.clone()),
            Self::TextNotEquals(t) => Self::TextNotEquals(t.clone()),
            Self::ContainsText(t) => Self::ContainsText(t.clone()),
            Self::ContainsTextIgnoringCase(t) => Self::ContainsTextIgnoringCase(t.clone()),
            Self::NotContainsText(t) => Self::NotContainsText(t.clone()),
            Self::DescendantContainsText(t) => Self::DescendantContainsText(t.clone()),
            Self::Progress(p) => Self::Progress(*p),
            Self::Null => Self::Null,
            Self::NotNull => Self::NotNull,
            Self::All(set) => Self::All(set.clone()),
            Self::Any(set) => Self::Any(set.clone()),
            Self::Custom(p) => Self::Custom(p.clone()),
        }
    }
}

impl<E> fmt::Debug for Assertion<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All(set) => f.debug_tuple("All").field(&set.as_slice()).finish(),
            Self::Any(set) => f.debug_tuple("Any").field(&set.as_slice()).finish(),
            Self::Custom(p) => f.debug_tuple("Custom").field(p).finish(),
            Self::Visible(v) => f.debug_tuple("Visible").field(v).finish(),
            Self::Progress(v) => f.debug_tuple("Progress").field(v).finish(),
            Self::ScrolledToEdge(e) => f.debug_tuple("ScrolledToEdge").field(e).finish(),
            Self::TextEquals(t)
            | Self::TextNotEquals(t)
            | Self::ContainsText(t)
            | Self::ContainsTextIgnoringCase(t)
            | Self::NotContainsText(t)
            | Self::DescendantContainsText(t) => {
                write!(f, "{}({t:?})", self.kind_name())
            }
            _ => f.write_str(self.kind_name()),
        }
    }
}

impl<E> Assertion<E> {
    fn kind_name(&self) -> &'static str {
        match self {
            Self::Enabled => "Enabled",
            Self::Disabled => "Disabled",
            Self::Selected => "Selected",
            Self::Interactable => "Interactable",
            Self::Hidden => "Hidden",
            Self::MinimallyVisible => "MinimallyVisible",
            Self::SufficientlyVisible => "SufficientlyVisible",
            Self::Visible(_) => "Visible",
            Self::ScrolledToEdge(_) => "ScrolledToEdge",
            Self::TextEquals(_) => "TextEquals",
            Self::TextNotEquals(_) => "TextNotEquals",
            Self::ContainsText(_) => "ContainsText",
            Self::ContainsTextIgnoringCase(_) => "ContainsTextIgnoringCase",
            Self::NotContainsText(_) => "NotContainsText",
            Self::DescendantContainsText(_) => "DescendantContainsText",
            Self::Progress(_) => "Progress",
            Self::Null => "Null",
            Self::NotNull => "NotNull",
            Self::All(_) => "All",
            Self::Any(_) => "Any",
            Self::Custom(_) => "Custom",
        }
    }
}
