//! Selector abstraction for locating elements.
//!
//! A [`Selector`] wraps one predicate, an optional positional index and an
//! optional structural scope. It only describes *which* element is wanted;
//! resolving it against the live tree is the engine's job
//! ([`MatcherEngine::locate`](crate::engine::MatcherEngine::locate)).
//!
//! # Design
//!
//! - **Strict by default**: without an index, several matches are ambiguous
//! - **Index selection**: `at_index(i)` picks the `i`-th match in engine order
//! - **Structural scope**: `within` / `containing` restrict by ancestor or descendant

use std::fmt;

use crate::engine::ElementView;
use crate::predicate::{Combination, Predicate};
use crate::predicates::{
    accessibility_id, accessibility_id_containing, accessibility_id_prefix, accessibility_label,
    contains_text, has_ancestor, has_descendant, kind_of, text_equals, TextCase,
};
use crate::result::MatchResult;
use crate::visibility::Visibility;

/// Structural relation between a selector and its scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    /// The scope must match an ancestor of the element
    Ancestor,
    /// The scope must match a descendant of the element
    Descendant,
}

/// Structural scope of a selector
pub struct Scope<E> {
    /// Relation to the scope selector
    pub relation: Relation,
    /// Selector the related element must match
    pub selector: Selector<E>,
}

impl<E> Clone for Scope<E> {
    fn clone(&self) -> Self {
        Self {
            relation: self.relation,
            selector: self.selector.clone(),
        }
    }
}

impl<E> fmt::Debug for Scope<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scope")
            .field("relation", &self.relation)
            .field("selector", &self.selector)
            .finish()
    }
}

/// A locatable reference into the engine's element tree
pub struct Selector<E> {
    predicate: Predicate<E>,
    index: Option<usize>,
    scope: Option<Box<Scope<E>>>,
}

impl<E> Clone for Selector<E> {
    fn clone(&self) -> Self {
        Self {
            predicate: self.predicate.clone(),
            index: self.index,
            scope: self.scope.clone(),
        }
    }
}

impl<E> fmt::Debug for Selector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Selector")
            .field("predicate", &self.predicate.name())
            .field("index", &self.index)
            .field("scope", &self.scope.as_ref().map(|s| s.relation))
            .finish()
    }
}

impl<E> Selector<E> {
    /// Strict selector: exactly one element must match
    #[must_use]
    pub const fn new(predicate: Predicate<E>) -> Self {
        Self {
            predicate,
            index: None,
            scope: None,
        }
    }

    /// Select the `index`-th element matching `predicate`
    #[must_use]
    pub const fn select(predicate: Predicate<E>, index: usize) -> Self {
        Self {
            predicate,
            index: Some(index),
            scope: None,
        }
    }

    /// Pick the `index`-th match
    #[must_use]
    pub const fn at_index(mut self, index: usize) -> Self {
        self.index = Some(index);
        self
    }

    /// Wrapped predicate, without structural scope
    #[must_use]
    pub const fn predicate(&self) -> &Predicate<E> {
        &self.predicate
    }

    /// Requested index, `None` for strict selection
    #[must_use]
    pub const fn index(&self) -> Option<usize> {
        self.index
    }

    /// Structural scope, if any
    #[must_use]
    pub fn scope(&self) -> Option<&Scope<E>> {
        self.scope.as_deref()
    }
}

impl<E: ElementView + 'static> Selector<E> {
    /// Elements having an ancestor that matches `selector`
    #[must_use]
    pub fn ancestor_of(selector: &Self) -> Self {
        Self::new(has_ancestor(selector.effective_predicate()))
    }

    /// Elements having a descendant that matches `selector`
    #[must_use]
    pub fn descendant_of(selector: &Self) -> Self {
        Self::new(has_descendant(selector.effective_predicate()))
    }

    /// Restrict to elements inside something matching `container`
    #[must_use]
    pub fn within(self, container: Self) -> Self {
        self.scoped(Relation::Ancestor, container)
    }

    /// Restrict to elements that contain something matching `child`
    #[must_use]
    pub fn containing(self, child: Self) -> Self {
        self.scoped(Relation::Descendant, child)
    }

    fn scoped(mut self, relation: Relation, selector: Self) -> Self {
        self.scope = Some(Box::new(Scope { relation, selector }));
        self
    }

    /// The composed predicate handed to the engine
    #[must_use]
    pub fn effective_predicate(&self) -> Predicate<E> {
        match self.scope.as_deref() {
            None => self.predicate.clone(),
            Some(scope) => {
                let inner = scope.selector.effective_predicate();
                let structural = match scope.relation {
                    Relation::Ancestor => has_ancestor(inner),
                    Relation::Descendant => has_descendant(inner),
                };
                Predicate::compound(
                    Combination::All,
                    vec![self.predicate.clone(), structural],
                )
            }
        }
    }

    /// Element with the given accessibility identifier
    #[must_use]
    pub fn id(id: impl Into<String>) -> Self {
        Self::new(accessibility_id(id))
    }

    /// Elements whose accessibility identifier starts with `prefix`
    #[must_use]
    pub fn id_prefix(prefix: impl Into<String>) -> Self {
        Self::new(accessibility_id_prefix(prefix))
    }

    /// Elements whose accessibility identifier contains `fragment`
    #[must_use]
    pub fn id_containing(fragment: impl Into<String>) -> Self {
        Self::new(accessibility_id_containing(fragment))
    }

    /// Element with the given accessibility label
    #[must_use]
    pub fn label(label: impl Into<String>) -> Self {
        Self::new(accessibility_label(label))
    }

    /// Elements of the given kind
    #[must_use]
    pub fn kind(kind: impl Into<String>) -> Self {
        Self::new(kind_of(kind))
    }

    /// Element whose text is exactly `text`
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(text_equals(text))
    }

    /// First element of `kind` having a descendant whose text contains
    /// `text`, at least minimally visible.
    ///
    /// Every container above the text also has it as a descendant, so the
    /// kind narrows the match to the row and index 0 picks the first row.
    #[must_use]
    pub fn with_text_descendant(kind: impl Into<String>, text: impl Into<String>) -> Self {
        Self::select(
            Predicate::compound(
                Combination::All,
                vec![
                    kind_of(kind),
                    has_descendant(contains_text(text, TextCase::Sensitive)),
                    Visibility::Minimal.predicate(),
                ],
            ),
            0,
        )
    }

    /// `predicate` plus minimal visibility
    #[must_use]
    pub fn visible(predicate: Predicate<E>) -> Self {
        Self::new(Predicate::compound(
            Combination::All,
            vec![predicate, Visibility::Minimal.predicate()],
        ))
    }

    /// Elements matching every selector's predicate.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `selectors` is empty.
    pub fn all_of(selectors: impl IntoIterator<Item = Self>) -> MatchResult<Self> {
        let predicates = selectors.into_iter().map(|s| s.effective_predicate());
        Predicate::all(predicates).map(Self::new)
    }
}

impl<E> fmt::Display for Selector<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.predicate)?;
        if let Some(scope) = self.scope.as_deref() {
            let relation = match scope.relation {
                Relation::Ancestor => "within",
                Relation::Descendant => "containing",
            };
            write!(f, " {relation} {}", scope.selector)?;
        }
        if let Some(index) = self.index {
            write!(f, " at index {index}")?;
        }
        Ok(())
    }
}
