// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Recording host used by the unit tests.

use alloc::collections::BTreeMap;
use alloc::vec::Vec;
use core::cell::RefCell;

use kurbo::Size;

use crate::ClientRect;
use crate::controller::VisibilityState;
use crate::host::{EventKinds, Host, ObservationTarget};
use crate::props::PropMap;

/// First id handed out by [`RecordingHost::create_wrapper`].
pub(crate) const WRAPPER_BASE: u32 = 1000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) enum ListenerOp {
    Add(ObservationTarget<u32>, EventKinds),
    Remove(ObservationTarget<u32>, EventKinds),
}

/// A host over `u32` node and container ids that records every call.
///
/// Registering a listener kind that is already registered on the same target
/// panics, as does removing one that is not registered.
#[derive(Debug)]
pub(crate) struct RecordingHost {
    pub(crate) viewport: Option<Size>,
    pub(crate) client: Option<Size>,
    pub(crate) rects: BTreeMap<u32, ClientRect>,
    pub(crate) registered: Vec<(ObservationTarget<u32>, EventKinds)>,
    pub(crate) log: Vec<ListenerOp>,
    pub(crate) notified: Vec<VisibilityState>,
    pub(crate) wrappers: Vec<PropMap>,
    pub(crate) measured: RefCell<Vec<u32>>,
    pub(crate) restyled: Vec<(u32, PropMap)>,
}

impl Default for RecordingHost {
    fn default() -> Self {
        Self {
            viewport: Some(Size::new(800.0, 600.0)),
            client: None,
            rects: BTreeMap::new(),
            registered: Vec::new(),
            log: Vec::new(),
            notified: Vec::new(),
            wrappers: Vec::new(),
            measured: RefCell::new(Vec::new()),
            restyled: Vec::new(),
        }
    }
}

impl RecordingHost {
    /// Union of the event kinds registered on `target`.
    pub(crate) fn listeners(&self, target: &ObservationTarget<u32>) -> EventKinds {
        self.registered
            .iter()
            .filter(|(t, _)| t == target)
            .fold(EventKinds::empty(), |acc, (_, e)| acc | *e)
    }

    /// Returns `true` when no listener is registered anywhere.
    pub(crate) fn is_quiet(&self) -> bool {
        self.registered.is_empty()
    }

    /// Ids measured so far, in order.
    pub(crate) fn measured(&self) -> Vec<u32> {
        self.measured.borrow().clone()
    }

    pub(crate) fn place(&mut self, node: u32, rect: ClientRect) {
        self.rects.insert(node, rect);
    }
}

impl Host for RecordingHost {
    type Node = u32;
    type Container = u32;

    fn viewport_size(&self) -> Option<Size> {
        self.viewport
    }

    fn client_size(&self) -> Option<Size> {
        self.client
    }

    fn measure(&self, node: &u32) -> ClientRect {
        self.measured.borrow_mut().push(*node);
        self.rects.get(node).copied().unwrap_or(ClientRect::ZERO)
    }

    fn add_listener(&mut self, target: &ObservationTarget<u32>, events: EventKinds) {
        assert!(
            !self.listeners(target).intersects(events),
            "duplicate listener for {events:?} on {target:?}"
        );
        self.registered.push((target.clone(), events));
        self.log.push(ListenerOp::Add(target.clone(), events));
    }

    fn remove_listener(&mut self, target: &ObservationTarget<u32>, events: EventKinds) {
        let pos = self
            .registered
            .iter()
            .position(|(t, e)| t == target && *e == events)
            .unwrap_or_else(|| panic!("removing unregistered {events:?} on {target:?}"));
        self.registered.remove(pos);
        self.log.push(ListenerOp::Remove(target.clone(), events));
    }

    fn create_wrapper(&mut self, attributes: &PropMap) -> u32 {
        let index = u32::try_from(self.wrappers.len()).unwrap_or(u32::MAX);
        self.wrappers.push(attributes.clone());
        WRAPPER_BASE + index
    }

    fn update_wrapper(&mut self, node: &u32, attributes: &PropMap) {
        self.restyled.push((*node, attributes.clone()));
    }

    fn notify(&mut self, state: VisibilityState) {
        self.notified.push(state);
    }
}
