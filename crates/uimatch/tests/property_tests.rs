//! Property-based tests for uimatch.
//!
//! Uses proptest to check combinator laws and clamping over arbitrary
//! inputs.

#![allow(clippy::unwrap_used)]

use proptest::prelude::*;
use uimatch::predicates::clamp_fraction;
use uimatch::prelude::*;

/// Predicate over integers whose result is fixed by `value`
fn constant(index: usize, value: bool) -> Predicate<i32> {
    Predicate::new(format!("p{index}"), move |_: &i32| value)
}

fn threshold(limit: i32) -> Predicate<i32> {
    Predicate::new(format!("atLeast({limit})"), move |n: &i32| *n >= limit)
}

// === Combinator Property Tests ===

proptest! {
    /// allOf holds exactly when every child holds.
    #[test]
    fn prop_all_is_conjunction(values in prop::collection::vec(any::<bool>(), 1..12)) {
        let children = values.iter().enumerate().map(|(i, v)| constant(i, *v));
        let all = Predicate::all(children).unwrap();
        prop_assert_eq!(all.matches(&0), values.iter().all(|v| *v));
    }

    /// anyOf holds exactly when some child holds.
    #[test]
    fn prop_any_is_disjunction(values in prop::collection::vec(any::<bool>(), 1..12)) {
        let children = values.iter().enumerate().map(|(i, v)| constant(i, *v));
        let any = Predicate::any(children).unwrap();
        prop_assert_eq!(any.matches(&0), values.iter().any(|v| *v));
    }

    /// not(not(p)) agrees with p on every element.
    #[test]
    fn prop_double_negation(limit in -100i32..100, n in -200i32..200) {
        let p = threshold(limit);
        let twice = Predicate::not(Predicate::not(p.clone()));
        prop_assert_eq!(twice.matches(&n), p.matches(&n));
    }

    /// Operators build the same predicate as the named constructors.
    #[test]
    fn prop_operators_match_constructors(a in -50i32..50, b in -50i32..50, n in -100i32..100) {
        let and = threshold(a) & threshold(b);
        let all = Predicate::all([threshold(a), threshold(b)]).unwrap();
        prop_assert_eq!(and.matches(&n), all.matches(&n));
        prop_assert_eq!(and.name(), all.name());

        let or = threshold(a) | threshold(b);
        let any = Predicate::any([threshold(a), threshold(b)]).unwrap();
        prop_assert_eq!(or.matches(&n), any.matches(&n));
    }

    /// De Morgan: not(anyOf(a, b)) == allOf(not(a), not(b)).
    #[test]
    fn prop_de_morgan(a in -50i32..50, b in -50i32..50, n in -100i32..100) {
        let left = !(threshold(a) | threshold(b));
        let right = !threshold(a) & !threshold(b);
        prop_assert_eq!(left.matches(&n), right.matches(&n));
    }

    /// Names are deterministic for the same structure.
    #[test]
    fn prop_name_deterministic(limits in prop::collection::vec(-10i32..10, 1..6)) {
        let build = || Predicate::any(limits.iter().map(|l| threshold(*l))).unwrap();
        prop_assert_eq!(build().name(), build().name());
        prop_assert!(build().name().starts_with("anyOf("));
    }
}

// === Fraction Property Tests ===

proptest! {
    /// Clamped fractions always land in [0, 1].
    #[test]
    fn prop_clamp_in_range(value in any::<f64>()) {
        let clamped = clamp_fraction(value);
        prop_assert!((0.0..=1.0).contains(&clamped), "{} -> {}", value, clamped);
    }

    /// Visibility levels accept any requested fraction.
    #[test]
    fn prop_visibility_fraction_well_formed(value in any::<f64>()) {
        let fraction = Visibility::Fraction(value).fraction();
        prop_assert!((0.0..=1.0).contains(&fraction));
    }

    /// Poll specs accept exactly the intervals within the timeout.
    #[test]
    fn prop_poll_spec_validation(timeout in 0u64..5_000, interval in 0u64..5_000) {
        let spec = PollSpec::from_millis(timeout, interval);
        prop_assert_eq!(spec.is_ok(), interval > 0 && interval <= timeout);
    }
}
