//! Wait Mechanisms Example
//!
//! Demonstrates polling waits against the in-memory engine:
//! - MatchConfig (timeout, polling interval, diagnostics)
//! - wait_until (selector + assertion + timing)
//! - wait_until_hidden (absence counts as hidden)
//! - Session interactions (assert_within, perform, scroll_to_find)
//! - Cancellation tokens
//!
//! # Running
//!
//! ```bash
//! RUST_LOG=uimatch=debug cargo run --example wait_mechanisms -p uimatch
//! ```

use std::thread;
use std::time::Duration;
use uimatch::mock::{MockChange, MockNode, MockTree};
use uimatch::predicates::accessibility_id;
use uimatch::prelude::*;

fn main() {
    uimatch::logging::init();
    println!("=== uimatch Wait Mechanisms Example ===\n");

    // Demo 1: MatchConfig
    demo_config();

    // Demo 2: Element becomes visible on a later tick
    demo_wait_until();

    // Demo 3: Spinner disappears
    demo_wait_until_hidden();

    // Demo 4: Session interactions
    demo_session();

    // Demo 5: Cancellation from another thread
    demo_cancellation();

    println!("\n=== Wait Mechanisms Example Complete ===");
}

fn demo_config() {
    println!("--- Demo 1: MatchConfig ---\n");

    let config = MatchConfig::default();
    println!("Default MatchConfig:");
    println!("  timeout_ms: {}", config.timeout_ms);
    println!("  poll_interval_ms: {}", config.poll_interval_ms);
    println!("  max_scroll_attempts: {}", config.max_scroll_attempts);

    match MatchConfig::from_yaml_str("timeout_ms: 2000\npoll_interval_ms: 25\n") {
        Ok(parsed) => println!("\nFrom YAML: {:?} / {:?}", parsed.timeout(), parsed.poll_interval()),
        Err(err) => println!("\nYAML rejected: {err}"),
    }

    match MatchConfig::from_json_str(r#"{"timeout_ms": 10, "poll_interval_ms": 50}"#) {
        Ok(_) => println!("Unexpectedly accepted"),
        Err(err) => println!("Invalid JSON config rejected: {err}"),
    }
    println!();
}

fn demo_wait_until() {
    println!("--- Demo 2: wait_until ---\n");

    let tree = MockTree::new();
    let banner = tree.add(
        tree.root(),
        MockNode::new("Banner").with_id("promo").with_visibility(0.0),
    );
    tree.schedule_after_queries(9, banner, MockChange::Visibility(1.0));

    let result = wait_until(
        &tree,
        &Selector::id("promo"),
        &Assertion::SufficientlyVisible,
        Duration::from_millis(1000),
        Duration::from_millis(50),
    );
    match result {
        Ok(report) => println!(
            "Visible after {} attempts in {:?}",
            report.attempts, report.elapsed
        ),
        Err(err) => println!("Wait failed: {err}"),
    }
    println!();
}

fn demo_wait_until_hidden() {
    println!("--- Demo 3: wait_until_hidden ---\n");

    let tree = MockTree::new();
    let spinner = tree.add(tree.root(), MockNode::new("Spinner").with_id("loading"));
    tree.schedule_after_queries(4, spinner, MockChange::Detach);

    match wait_until_hidden(&tree, &Selector::id("loading"), Duration::from_secs(1)) {
        Ok(report) => println!("Spinner gone after {} attempts", report.attempts),
        Err(err) => println!("Spinner still visible: {err}"),
    }
    println!();
}

fn demo_session() {
    println!("--- Demo 4: Session ---\n");

    let tree = MockTree::new();
    let feed = tree.add(
        tree.root(),
        MockNode::new("List").with_id("feed").with_scroll_extent(10),
    );
    let row = tree.add(feed, MockNode::new("Cell").with_id("row.12").hidden());
    tree.add(row, MockNode::new("Label").with_text("Pad Thai"));
    let pay = tree.add(tree.root(), MockNode::new("Button").with_id("pay").disabled());
    tree.schedule_after_scrolls(feed, 4, row, MockChange::Hidden(false));
    tree.schedule_after_queries(12, pay, MockChange::Enabled(true));

    let session = Session::new(tree.clone());
    let target = session.on(Selector::visible(accessibility_id("row.12")));
    match target.scroll_to_find(session.scroll(Direction::Down), &Selector::id("feed")) {
        Ok(_) => println!("Found row after {} scrolls", tree.scroll_count(feed)),
        Err(err) => println!("Row not found: {}", session.report(&err)),
    }
    match target.descendant_text() {
        Ok(text) => println!("Row text: {text}"),
        Err(err) => println!("No row text: {err}"),
    }

    let pay_button = session.on(Selector::id("pay"));
    let result = pay_button
        .assert_within(Assertion::Interactable, Duration::from_secs(2))
        .and_then(|pay| pay.perform(&Action::Tap));
    match result {
        Ok(_) => println!("Tapped pay; actions: {:?}", tree.performed_actions()),
        Err(err) => println!("Pay failed: {}", session.report(&err)),
    }
    println!();
}

fn demo_cancellation() {
    println!("--- Demo 5: Cancellation ---\n");

    let tree = MockTree::new();
    let token = CancellationToken::new();
    let session = Session::new(tree).with_cancellation(token.clone());

    let canceller = thread::spawn(move || {
        thread::sleep(Duration::from_millis(120));
        token.cancel();
    });

    let interaction = session.on(Selector::id("never"));
    let outcome = interaction.assert_within(Assertion::NotNull, Duration::from_secs(10));
    match outcome {
        Ok(_) => println!("Unexpectedly satisfied"),
        Err(err) => println!("Wait ended: {err}"),
    }
    let _ = canceller.join();
}
