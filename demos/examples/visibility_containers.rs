// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observing a scrollable container, then switching to another one.
//!
//! Props arrive as a dynamic bag and are partitioned once: recognized options
//! configure the controller, `className` goes to the wrapper element, and the
//! rest is forwarded to children alongside `is_visible`.
//!
//! Run:
//! - `cargo run -p understory_visibility_demos --example visibility_containers`

use kurbo::Size;
use understory_visibility::props::{PropMap, PropValue, partition};
use understory_visibility::{
    ClientRect, Controller, EventKinds, Host, ObservationTarget, Props, TrackOptions,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
struct PanelId(u32);

#[derive(Default)]
struct Panels {
    /// Vertical scroll offset of the tracked row inside its panel.
    row_top: f64,
    log: Vec<String>,
}

impl Host for Panels {
    type Node = ();
    type Container = PanelId;

    fn viewport_size(&self) -> Option<Size> {
        Some(Size::new(800.0, 600.0))
    }

    fn measure(&self, _: &()) -> ClientRect {
        ClientRect::new(self.row_top, 20.0, self.row_top + 48.0, 380.0, 360.0, 48.0)
    }

    fn add_listener(&mut self, target: &ObservationTarget<PanelId>, events: EventKinds) {
        self.log.push(format!("add    {events:?} on {target:?}"));
    }

    fn remove_listener(&mut self, target: &ObservationTarget<PanelId>, events: EventKinds) {
        self.log.push(format!("remove {events:?} on {target:?}"));
    }

    fn create_wrapper(&mut self, attributes: &PropMap) {
        self.log.push(format!("wrapper {attributes:?}"));
    }
}

type Partitioned = (TrackOptions<(), PanelId>, PropMap, PropMap);

fn options(bag: &PropMap, container: Option<PanelId>) -> Partitioned {
    let p = partition(bag.clone());
    for warning in &p.warnings {
        println!("  warning: {warning}");
    }
    let mut options = TrackOptions::new(p.config);
    options.use_custom_container = p.use_custom_container;
    options.container = container;
    (options, p.wrapper, p.pass_through)
}

fn main() {
    tracing_subscriber::fmt::init();

    let mut bag = PropMap::new();
    bag.insert("useCustomContainer".into(), PropValue::Bool(true));
    bag.insert("partialVisibility".into(), PropValue::Bool(true));
    bag.insert("throttleInterval".into(), PropValue::Number(100.0));
    bag.insert("className".into(), PropValue::Text("row".into()));
    bag.insert("label".into(), PropValue::Text("Inbox".into()));

    let mut host = Panels {
        row_top: 900.0,
        ..Panels::default()
    };

    let (opts, wrapper, pass_through) = options(&bag, Some(PanelId(1)));
    let mut row = Controller::new(Props::new(opts, pass_through));
    row.mount(&mut host, &wrapper, 0);
    let _ = row.tick(&mut host, 0);
    println!("== Mounted in panel 1 ==\n  visible: {}", row.is_visible());

    host.row_top = 560.0;
    let _ = row.handle_event(&mut host, EventKinds::SCROLL, 120);
    println!("== Scrolled panel 1 ==\n  visible: {}", row.is_visible());

    // Move the row into panel 2 and relabel it.
    bag.insert("label".into(), PropValue::Text("Archive".into()));
    let (opts, _, pass_through) = options(&bag, Some(PanelId(2)));
    let refresh = row.update(&mut host, Props::new(opts, pass_through), 200);
    host.row_top = 700.0;
    let _ = row.tick(&mut host, 200);
    println!("== Moved to panel 2 ==\n  refresh: {refresh:?}\n  visible: {}", row.is_visible());

    let props = row.render_props();
    println!("== Children receive ==\n  is_visible={} {:?}", props.is_visible, props.pass_through);

    row.unmount(&mut host);
    println!("== Listener log ==");
    for line in &host.log {
        println!("  {line}");
    }
    assert_eq!(host.log.len(), 5);
}
