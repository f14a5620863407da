//! Predicates and predicate combinators.
//!
//! A [`Predicate`] is a named boolean test against an element handle owned
//! by the engine. Compound predicates own their children and evaluate them
//! left to right with short-circuit semantics.
//!
//! ```ignore
//! let ready = Predicate::all([enabled(), minimum_visible(0.75)])?;
//! let idle = !ready.clone();
//! let either = ready | idle;
//! ```

use std::fmt;
use std::sync::Arc;

use crate::result::{MatchError, MatchResult};

type TestFn<E> = dyn Fn(&E) -> bool + Send + Sync;

/// How a compound predicate combines its children
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Combination {
    /// Every child must hold
    All,
    /// At least one child must hold
    Any,
    /// The single child must not hold
    Not,
}

impl Combination {
    /// Name used in diagnostics
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::All => "allOf",
            Self::Any => "anyOf",
            Self::Not => "not",
        }
    }
}

impl fmt::Display for Combination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Compound predicate: a combination mode over owned children
pub struct CompoundPredicate<E> {
    mode: Combination,
    children: Vec<Predicate<E>>,
}

impl<E> CompoundPredicate<E> {
    /// Combination mode
    #[must_use]
    pub const fn mode(&self) -> Combination {
        self.mode
    }

    /// Children in evaluation order
    #[must_use]
    pub fn children(&self) -> &[Predicate<E>] {
        &self.children
    }

    fn matches(&self, element: &E) -> bool {
        match self.mode {
            Combination::All => self.children.iter().all(|p| p.matches(element)),
            Combination::Any => self.children.iter().any(|p| p.matches(element)),
            Combination::Not => !self.children.iter().any(|p| p.matches(element)),
        }
    }

    fn name(&self) -> String {
        let names: Vec<String> = self.children.iter().map(Predicate::name).collect();
        format!("{}({})", self.mode, names.join(", "))
    }
}

impl<E> Clone for CompoundPredicate<E> {
    fn clone(&self) -> Self {
        Self {
            mode: self.mode,
            children: self.children.clone(),
        }
    }
}

impl<E> fmt::Debug for CompoundPredicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompoundPredicate")
            .field("mode", &self.mode)
            .field("children", &self.children)
            .finish()
    }
}

enum Kind<E> {
    Leaf { name: String, test: Arc<TestFn<E>> },
    Compound(CompoundPredicate<E>),
}

/// A named boolean test against an element of type `E`
pub struct Predicate<E> {
    kind: Kind<E>,
}

impl<E> Predicate<E> {
    /// Create a leaf predicate from a closure
    pub fn new<F>(name: impl Into<String>, test: F) -> Self
    where
        F: Fn(&E) -> bool + Send + Sync + 'static,
    {
        Self {
            kind: Kind::Leaf {
                name: name.into(),
                test: Arc::new(test),
            },
        }
    }

    /// Conjunction of all predicates.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `predicates` is empty.
    pub fn all(predicates: impl IntoIterator<Item = Self>) -> MatchResult<Self> {
        Self::non_empty(Combination::All, predicates.into_iter().collect())
    }

    /// Disjunction of all predicates.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if `predicates` is empty.
    pub fn any(predicates: impl IntoIterator<Item = Self>) -> MatchResult<Self> {
        Self::non_empty(Combination::Any, predicates.into_iter().collect())
    }

    /// Negation
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(predicate: Self) -> Self {
        Self::compound(Combination::Not, vec![predicate])
    }

    fn non_empty(mode: Combination, children: Vec<Self>) -> MatchResult<Self> {
        if children.is_empty() {
            return Err(MatchError::configuration(format!(
                "{mode} requires at least one predicate"
            )));
        }
        Ok(Self::compound(mode, children))
    }

    /// Build a compound whose child count is already known to be valid
    pub(crate) fn compound(mode: Combination, children: Vec<Self>) -> Self {
        debug_assert!(!children.is_empty());
        debug_assert!(mode != Combination::Not || children.len() == 1);
        Self {
            kind: Kind::Compound(CompoundPredicate { mode, children }),
        }
    }

    /// Evaluate against an element
    #[must_use]
    pub fn matches(&self, element: &E) -> bool {
        match &self.kind {
            Kind::Leaf { test, .. } => test(element),
            Kind::Compound(compound) => compound.matches(element),
        }
    }

    /// Deterministic name for diagnostics
    #[must_use]
    pub fn name(&self) -> String {
        match &self.kind {
            Kind::Leaf { name, .. } => name.clone(),
            Kind::Compound(compound) => compound.name(),
        }
    }

    /// The compound structure, if this is not a leaf
    #[must_use]
    pub const fn as_compound(&self) -> Option<&CompoundPredicate<E>> {
        match &self.kind {
            Kind::Leaf { .. } => None,
            Kind::Compound(compound) => Some(compound),
        }
    }
}

impl<E> Clone for Predicate<E> {
    fn clone(&self) -> Self {
        let kind = match &self.kind {
            Kind::Leaf { name, test } => Kind::Leaf {
                name: name.clone(),
                test: Arc::clone(test),
            },
            Kind::Compound(compound) => Kind::Compound(compound.clone()),
        };
        Self { kind }
    }
}

impl<E> fmt::Debug for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.name()).finish()
    }
}

impl<E> fmt::Display for Predicate<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl<E> std::ops::Not for Predicate<E> {
    type Output = Self;

    fn not(self) -> Self {
        Self::not(self)
    }
}

impl<E> std::ops::BitAnd for Predicate<E> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        Self::compound(Combination::All, vec![self, rhs])
    }
}

impl<E> std::ops::BitOr for Predicate<E> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self::compound(Combination::Any, vec![self, rhs])
    }
}
