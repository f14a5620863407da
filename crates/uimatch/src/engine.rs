//! Contract with the external matcher engine.
//!
//! The engine owns the element tree, visibility computation and gesture
//! execution. This crate only borrows element handles through
//! [`ElementView`] and asks the engine to resolve selectors and perform
//! actions through [`MatcherEngine`].

use tracing::{debug, trace};

use crate::action::{Action, ContentEdge};
use crate::predicate::Predicate;
use crate::result::{MatchError, MatchResult};
use crate::selector::Selector;

/// Read-only view of an engine element handle.
///
/// `parent` is a non-owning lookup: the handle it returns is just another
/// view into the engine's tree.
pub trait ElementView: Sized {
    /// Visual parent, `None` at the root
    fn parent(&self) -> Option<Self>;

    /// Visual children in engine order
    fn children(&self) -> Vec<Self>;

    /// Whether the element itself is flagged hidden
    fn is_hidden(&self) -> bool;

    /// Text content, `None` if the element kind has no text accessor
    fn text(&self) -> Option<String>;

    /// Accessibility identifier
    fn accessibility_id(&self) -> Option<String> {
        None
    }

    /// Accessibility label
    fn accessibility_label(&self) -> Option<String> {
        None
    }

    /// Whether the element is of the given kind (class, role, widget type)
    fn is_kind_of(&self, kind: &str) -> bool;

    /// Whether the element is enabled
    fn is_enabled(&self) -> bool;

    /// Whether the element is selected
    fn is_selected(&self) -> bool;

    /// Whether the element can receive user interaction
    fn is_interactable(&self) -> bool;

    /// Visible fraction of the element's area, in `[0, 1]`
    fn visible_fraction(&self) -> f64;

    /// Progress value for progress indicators
    fn progress(&self) -> Option<f64> {
        None
    }

    /// Whether a scroll container shows the given content edge
    fn is_scrolled_to_edge(&self, _edge: ContentEdge) -> bool {
        false
    }
}

/// The external engine that resolves selectors and performs actions
pub trait MatcherEngine {
    /// Element handle type
    type Element: ElementView + 'static;

    /// All elements matching `predicate`, in engine order
    fn locate_all(&self, predicate: &Predicate<Self::Element>) -> Vec<Self::Element>;

    /// Resolve a selector to exactly one element.
    ///
    /// With an index, the `i`-th match is returned. Without one, more than
    /// one match is ambiguous.
    ///
    /// # Errors
    ///
    /// `NotFound` when nothing matches (or the index is out of range),
    /// `Ambiguous` when a strict selector matches several elements.
    fn locate(&self, selector: &Selector<Self::Element>) -> MatchResult<Self::Element> {
        let mut matches = self.locate_all(&selector.effective_predicate());
        trace!(selector = %selector, count = matches.len(), "resolved selector");
        match selector.index() {
            Some(index) if index < matches.len() => Ok(matches.swap_remove(index)),
            Some(index) => {
                debug!(selector = %selector, index, count = matches.len(), "index out of range");
                Err(MatchError::not_found(selector.to_string()))
            }
            None => match matches.len() {
                0 => Err(MatchError::not_found(selector.to_string())),
                1 => Ok(matches.swap_remove(0)),
                count => Err(MatchError::Ambiguous {
                    selector: selector.to_string(),
                    count,
                }),
            },
        }
    }

    /// Evaluate a predicate against an element
    fn evaluate(&self, predicate: &Predicate<Self::Element>, element: &Self::Element) -> bool {
        predicate.matches(element)
    }

    /// Text of an element.
    ///
    /// # Errors
    ///
    /// `NotSupported` if the element has no text accessor.
    fn text_of(&self, element: &Self::Element) -> MatchResult<String> {
        element.text().ok_or_else(|| MatchError::not_supported("text"))
    }

    /// Perform an action on an element.
    ///
    /// # Errors
    ///
    /// `ActionFailed` if the engine cannot perform it.
    fn perform(&self, action: &Action, element: &Self::Element) -> MatchResult<()>;
}
