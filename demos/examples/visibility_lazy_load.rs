// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Lazy-loading images as a page scrolls.
//!
//! Three images sit down a long page. Each is tracked by its own controller
//! with `once` set and a 200px offset, so loading starts shortly before an
//! image enters the viewport and tracking stops right after.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p understory_visibility_demos --example visibility_lazy_load`

use kurbo::{Rect, Size};
use understory_visibility::{
    ClientRect, Controller, EventKinds, Host, ObservationTarget, Phase, PropMap, Props,
    TrackOptions, VisibilityConfig, VisibilityState,
};

/// A document with a scroll position and absolutely laid out images.
struct Document {
    viewport: Size,
    scroll_y: f64,
    images: Vec<Rect>,
    listeners: usize,
    loaded: Vec<usize>,
    /// Index of the image whose controller is currently being driven.
    current: usize,
}

impl Host for Document {
    type Node = usize;
    type Container = ();

    fn viewport_size(&self) -> Option<Size> {
        Some(self.viewport)
    }

    fn measure(&self, node: &usize) -> ClientRect {
        ClientRect::from(self.images[*node] - kurbo::Vec2::new(0.0, self.scroll_y))
    }

    fn add_listener(&mut self, _: &ObservationTarget<()>, _: EventKinds) {
        self.listeners += 1;
    }

    fn remove_listener(&mut self, _: &ObservationTarget<()>, _: EventKinds) {
        self.listeners -= 1;
    }

    fn create_wrapper(&mut self, _: &PropMap) -> usize {
        // Every controller here receives a `node_ref`.
        self.current
    }

    fn notify(&mut self, state: VisibilityState) {
        if state.is_visible {
            self.loaded.push(self.current);
        }
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let mut doc = Document {
        viewport: Size::new(1024.0, 768.0),
        scroll_y: 0.0,
        images: vec![
            Rect::new(100.0, 200.0, 500.0, 500.0),
            Rect::new(100.0, 1400.0, 500.0, 1700.0),
            Rect::new(100.0, 2600.0, 500.0, 2900.0),
        ],
        listeners: 0,
        loaded: Vec::new(),
        current: 0,
    };

    let config = VisibilityConfig::default()
        .with_once(true)
        .with_partial_visibility(true)
        .with_offset(200.0);
    let mut controllers: Vec<Controller<Document, ()>> = (0..doc.images.len())
        .map(|i| Controller::new(Props::new(TrackOptions::new(config).with_node_ref(i), ())))
        .collect();

    for (i, c) in controllers.iter_mut().enumerate() {
        doc.current = i;
        c.mount(&mut doc, &PropMap::new(), 0);
    }
    println!("== Mounted ==\n  listeners: {}", doc.listeners);

    // Scroll 20px every 16ms, running each controller's due work first.
    let mut now = 0_u64;
    while doc.scroll_y < 2400.0 {
        for (i, c) in controllers.iter_mut().enumerate() {
            doc.current = i;
            if c.next_deadline().is_some_and(|d| d <= now) {
                let _ = c.tick(&mut doc, now);
            }
            let _ = c.handle_event(&mut doc, EventKinds::SCROLL, now);
        }
        now += 16;
        doc.scroll_y += 20.0;
    }
    // Flush trailing evaluations.
    for (i, c) in controllers.iter_mut().enumerate() {
        doc.current = i;
        while let Some(deadline) = c.next_deadline() {
            let _ = c.tick(&mut doc, deadline);
        }
    }

    println!("== After scrolling to {} ==", doc.scroll_y);
    for (i, c) in controllers.iter().enumerate() {
        println!("  image {i}: visible={} phase={:?}", c.is_visible(), c.phase());
    }
    println!("  loaded in order: {:?}", doc.loaded);
    println!("  listeners still attached: {}", doc.listeners);

    assert_eq!(doc.loaded, vec![0, 1, 2]);
    assert!(controllers.iter().all(|c| c.phase() == Phase::Settled));
    assert_eq!(doc.listeners, 0);

    for (i, c) in controllers.iter_mut().enumerate() {
        doc.current = i;
        c.unmount(&mut doc);
    }
}
