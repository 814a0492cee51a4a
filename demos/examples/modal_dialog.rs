// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A modal dialog with a toast and a nested confirmation, driven by a trap stack.
//!
//! This example shows how to combine:
//! - `understory_element_tree` as the document the traps run against,
//! - `understory_focus_trap` for the trap stack and tab resolution,
//! - the element tree adapter's `press_*` helpers to simulate user input.
//!
//! Set `RUST_LOG=understory_focus_trap=debug` to watch the trap lifecycle.
//!
//! Run:
//! - `cargo run -p understory_demos --example modal_dialog`

use kurbo::Rect;
use tracing_subscriber::EnvFilter;
use understory_element_tree::{Document, ElementSpec, NodeId};
use understory_focus_trap::adapters::element_tree::{
    flush_mutations, press_escape, press_pointer, press_tab,
};
use understory_focus_trap::{ElementRef, InitialFocus, TrapConfig, TrapStack};

fn label(doc: &Document, id: NodeId) -> String {
    match doc.attribute(id, "id") {
        Some(name) => format!("#{name}"),
        None => format!("<{}>", doc.local_name(id).unwrap_or("?")),
    }
}

fn control(doc: &mut Document, parent: NodeId, tag: &str, id: &str, y: f64) -> NodeId {
    doc.insert(
        Some(parent),
        ElementSpec::new(tag)
            .attr("id", id)
            .bounds(Rect::new(10.0, y, 110.0, y + 20.0)),
    )
}

fn main() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let mut doc = Document::new();
    let body = doc.body();
    let open = control(&mut doc, body, "button", "open", 0.0);
    let help = control(&mut doc, body, "a", "help", 30.0);
    doc.set_attribute(help, "href", "#help");

    let dialog = control(&mut doc, body, "div", "dialog", 60.0);
    control(&mut doc, dialog, "input", "name", 70.0);
    control(&mut doc, dialog, "input", "email", 100.0);
    let save = control(&mut doc, dialog, "button", "save", 130.0);
    control(&mut doc, body, "button", "background", 160.0);
    let toast = control(&mut doc, body, "div", "toast", 190.0);
    control(&mut doc, toast, "button", "undo", 200.0);
    let confirm = control(&mut doc, body, "div", "confirm", 230.0);
    control(&mut doc, confirm, "button", "yes", 240.0);
    control(&mut doc, confirm, "button", "no", 270.0);

    doc.focus(open);
    let mut stack = TrapStack::new();

    println!("== dialog + toast trap ==");
    let config = TrapConfig::new(["dialog", "toast"])
        .initial_focus(InitialFocus::Element(ElementRef::from("email")));
    if let Err(err) = stack.push(&mut doc, config) {
        eprintln!("cannot build trap: {err}");
        return;
    }
    println!("initial focus: {}", label(&doc, doc.active_element()));
    for _ in 0..4 {
        let focused = press_tab(&mut doc, &mut stack, false);
        println!("Tab       -> {}", label(&doc, focused));
    }
    for _ in 0..2 {
        let focused = press_tab(&mut doc, &mut stack, true);
        println!("Shift+Tab -> {}", label(&doc, focused));
    }

    let background = doc.element_by_id("background").unwrap_or(body);
    let report = press_pointer(&mut doc, &mut stack, background);
    println!(
        "click #background: blocked = {}, focus stays on {}",
        report.default_prevented,
        label(&doc, doc.active_element())
    );

    println!("== nested confirmation ==");
    doc.focus(save);
    if let Err(err) = stack.push(&mut doc, TrapConfig::with_elements([confirm])) {
        eprintln!("cannot build confirmation trap: {err}");
        return;
    }
    println!("depth {}, focus: {}", stack.len(), label(&doc, doc.active_element()));
    for _ in 0..2 {
        let focused = press_tab(&mut doc, &mut stack, false);
        println!("Tab       -> {}", label(&doc, focused));
    }
    press_escape(&mut doc, &mut stack);
    println!(
        "Escape: depth {}, focus back on {}",
        stack.len(),
        label(&doc, doc.active_element())
    );

    println!("== live edits ==");
    doc.remove(save);
    flush_mutations(&mut doc, &mut stack);
    println!("#save removed, focus moved to {}", label(&doc, doc.active_element()));
    let focused = press_tab(&mut doc, &mut stack, true);
    println!("Shift+Tab -> {}", label(&doc, focused));

    press_escape(&mut doc, &mut stack);
    println!(
        "Escape: depth {}, focus back on {}",
        stack.len(),
        label(&doc, doc.active_element())
    );
}
