//! Visibility levels and the ancestor visibility walk.
//!
//! Engines report recycled list and grid cells as visible even when a
//! container above them is hidden, so visibility checks that matter can add
//! [`all_ancestors_visible`] on top of the engine's own measure.

use tracing::trace;

use crate::engine::{ElementView, MatcherEngine};
use crate::predicate::Predicate;
use crate::predicates::{ancestors_visible, clamp_fraction, minimum_visible};
use crate::result::{MatchError, MatchResult};

/// Visible fraction treated as "minimally visible"
pub const MINIMAL_VISIBILITY: f64 = 0.1;

/// Visible fraction treated as "sufficiently visible"
pub const SUFFICIENT_VISIBILITY: f64 = 0.75;

/// How much of an element must be on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Visibility {
    /// At least 10%
    Minimal,
    /// At least 75%
    Sufficient,
    /// At least the given fraction
    Fraction(f64),
}

impl Visibility {
    /// Required visible fraction
    #[must_use]
    pub fn fraction(&self) -> f64 {
        match self {
            Self::Minimal => MINIMAL_VISIBILITY,
            Self::Sufficient => SUFFICIENT_VISIBILITY,
            Self::Fraction(f) => clamp_fraction(*f),
        }
    }

    /// Predicate requiring this visibility
    #[must_use]
    pub fn predicate<E: ElementView + 'static>(&self) -> Predicate<E> {
        minimum_visible(self.fraction())
    }
}

/// True when no ancestor of `element` is hidden.
///
/// The element's own hidden flag is not consulted. A root element has no
/// ancestors and is therefore always accepted.
#[must_use]
pub fn all_ancestors_visible<E: ElementView>(element: &E) -> bool {
    let mut current = element.parent();
    let mut depth = 0usize;
    while let Some(ancestor) = current {
        if ancestor.is_hidden() {
            trace!(depth, "hidden ancestor");
            return false;
        }
        depth += 1;
        current = ancestor.parent();
    }
    true
}

/// Collect `count` distinct accessibility identifiers from elements matching
/// `predicate` whose ancestors are all visible, in engine order.
///
/// # Errors
///
/// `NotFound` if fewer than `count` distinct identifiers are available.
pub fn collect_accessibility_ids<G>(
    engine: &G,
    predicate: &Predicate<G::Element>,
    count: usize,
) -> MatchResult<Vec<String>>
where
    G: MatcherEngine,
{
    let filtered = predicate.clone() & ancestors_visible();
    let mut ids: Vec<String> = Vec::with_capacity(count);
    for element in engine.locate_all(&filtered) {
        if ids.len() == count {
            break;
        }
        if let Some(id) = element.accessibility_id() {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
    }

    if ids.len() < count {
        return Err(MatchError::not_found(format!(
            "{count} visible elements with accessibility ids matching {predicate} (found {})",
            ids.len()
        )));
    }
    Ok(ids)
}
