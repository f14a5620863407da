//! Leaf predicates over [`ElementView`] elements.
//!
//! These are the building blocks behind the assertion vocabulary and the
//! selector conveniences. Fractions are clamped into `[0, 1]` so every input
//! yields a well-formed predicate.

use crate::action::ContentEdge;
use crate::engine::ElementView;
use crate::predicate::Predicate;
use crate::visibility::all_ancestors_visible;

/// Case handling for text containment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextCase {
    /// Exact, case-sensitive comparison (default)
    #[default]
    Sensitive,
    /// Compare lowercased text
    Insensitive,
}

/// Clamp a fraction into `[0, 1]`; NaN is treated as the strictest value
#[must_use]
pub fn clamp_fraction(value: f64) -> f64 {
    if value.is_nan() {
        1.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Element is enabled
#[must_use]
pub fn enabled<E: ElementView + 'static>() -> Predicate<E> {
    Predicate::new("enabled", E::is_enabled)
}

/// Element is selected
#[must_use]
pub fn selected<E: ElementView + 'static>() -> Predicate<E> {
    Predicate::new("selected", E::is_selected)
}

/// Element accepts user interaction
#[must_use]
pub fn interactable<E: ElementView + 'static>() -> Predicate<E> {
    Predicate::new("interactable", E::is_interactable)
}

/// At least `fraction` of the element is visible
#[must_use]
pub fn minimum_visible<E: ElementView + 'static>(fraction: f64) -> Predicate<E> {
    let fraction = clamp_fraction(fraction);
    Predicate::new(format!("minimumVisible({fraction})"), move |e: &E| {
        let visible = e.visible_fraction();
        visible > 0.0 && visible >= fraction
    })
}

/// No part of the element is visible
#[must_use]
pub fn not_visible<E: ElementView + 'static>() -> Predicate<E> {
    Predicate::new("notVisible", |e: &E| e.visible_fraction() <= 0.0)
}

/// Text is exactly `text`; false when the element has no text
#[must_use]
pub fn text_equals<E: ElementView + 'static>(text: impl Into<String>) -> Predicate<E> {
    let text = text.into();
    Predicate::new(format!("textEquals('{text}')"), move |e: &E| {
        e.text().is_some_and(|t| t == text)
    })
}

/// Text differs from `text`; true when the element has no text
#[must_use]
pub fn text_not_equals<E: ElementView + 'static>(text: impl Into<String>) -> Predicate<E> {
    let text = text.into();
    Predicate::new(format!("textNotEquals('{text}')"), move |e: &E| {
        e.text().map_or(true, |t| t != text)
    })
}

/// Text contains `needle`; false when the element has no text
#[must_use]
pub fn contains_text<E: ElementView + 'static>(
    needle: impl Into<String>,
    case: TextCase,
) -> Predicate<E> {
    let needle = needle.into();
    match case {
        TextCase::Sensitive => Predicate::new(format!("containsText('{needle}')"), move |e: &E| {
            e.text().is_some_and(|t| t.contains(&needle))
        }),
        TextCase::Insensitive => {
            let lowered = needle.to_lowercase();
            Predicate::new(
                format!("containsTextIgnoringCase('{needle}')"),
                move |e: &E| {
                    e.text()
                        .is_some_and(|t| t.to_lowercase().contains(&lowered))
                },
            )
        }
    }
}

/// Text does not contain `needle`; false when the element has no text
#[must_use]
pub fn not_contains_text<E: ElementView + 'static>(needle: impl Into<String>) -> Predicate<E> {
    let needle = needle.into();
    Predicate::new(format!("notContainsText('{needle}')"), move |e: &E| {
        e.text().is_some_and(|t| !t.contains(&needle))
    })
}

/// Progress value equals `expected`
#[must_use]
pub fn progress_equals<E: ElementView + 'static>(expected: f64) -> Predicate<E> {
    Predicate::new(format!("progress({expected})"), move |e: &E| {
        e.progress()
            .is_some_and(|p| (p - expected).abs() <= f64::EPSILON)
    })
}

/// Scroll container shows the given content edge
#[must_use]
pub fn scrolled_to_edge<E: ElementView + 'static>(edge: ContentEdge) -> Predicate<E> {
    Predicate::new(format!("scrolledToContentEdge({edge})"), move |e: &E| {
        e.is_scrolled_to_edge(edge)
    })
}

/// Accessibility identifier equals `id`
#[must_use]
pub fn accessibility_id<E: ElementView + 'static>(id: impl Into<String>) -> Predicate<E> {
    let id = id.into();
    Predicate::new(format!("accessibilityID('{id}')"), move |e: &E| {
        e.accessibility_id().is_some_and(|found| found == id)
    })
}

/// Accessibility identifier starts with `prefix`
#[must_use]
pub fn accessibility_id_prefix<E: ElementView + 'static>(prefix: impl Into<String>) -> Predicate<E> {
    let prefix = prefix.into();
    Predicate::new(format!("accessibilityIDPrefix('{prefix}')"), move |e: &E| {
        e.accessibility_id()
            .is_some_and(|found| found.starts_with(&prefix))
    })
}

/// Accessibility identifier contains `fragment`
#[must_use]
pub fn accessibility_id_containing<E: ElementView + 'static>(
    fragment: impl Into<String>,
) -> Predicate<E> {
    let fragment = fragment.into();
    Predicate::new(format!("accessibilityIDContaining('{fragment}')"), move |e: &E| {
        e.accessibility_id()
            .is_some_and(|found| found.contains(&fragment))
    })
}

/// Accessibility label equals `label`
#[must_use]
pub fn accessibility_label<E: ElementView + 'static>(label: impl Into<String>) -> Predicate<E> {
    let label = label.into();
    Predicate::new(format!("accessibilityLabel('{label}')"), move |e: &E| {
        e.accessibility_label().is_some_and(|found| found == label)
    })
}

/// Element is of the given kind
#[must_use]
pub fn kind_of<E: ElementView + 'static>(kind: impl Into<String>) -> Predicate<E> {
    let kind = kind.into();
    Predicate::new(format!("kindOf({kind})"), move |e: &E| e.is_kind_of(&kind))
}

/// No ancestor of the element is hidden
#[must_use]
pub fn ancestors_visible<E: ElementView + 'static>() -> Predicate<E> {
    Predicate::new("ancestorsVisible", |e: &E| all_ancestors_visible(e))
}

/// Some ancestor of the element matches `predicate`
#[must_use]
pub fn has_ancestor<E: ElementView + 'static>(predicate: Predicate<E>) -> Predicate<E> {
    Predicate::new(format!("ancestor({predicate})"), move |e: &E| {
        let mut current = e.parent();
        while let Some(node) = current {
            if predicate.matches(&node) {
                return true;
            }
            current = node.parent();
        }
        false
    })
}

/// Some descendant of the element matches `predicate`
#[must_use]
pub fn has_descendant<E: ElementView + 'static>(predicate: Predicate<E>) -> Predicate<E> {
    Predicate::new(format!("descendant({predicate})"), move |e: &E| {
        let mut pending = e.children();
        while let Some(node) = pending.pop() {
            if predicate.matches(&node) {
                return true;
            }
            pending.extend(node.children());
        }
        false
    })
}
