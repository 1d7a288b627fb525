// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The host interface and scoped listener registration.
//!
//! The controller never touches a real document. Everything it needs from the
//! environment goes through [`Host`]: a way to measure the tracked element, the
//! viewport dimensions, and listener registration on an [`ObservationTarget`].

use kurbo::Size;

use crate::ClientRect;
use crate::controller::VisibilityState;
use crate::props::PropMap;

bitflags::bitflags! {
    /// Event kinds that can trigger re-evaluation.
    #[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EventKinds: u8 {
        /// The target scrolled.
        const SCROLL = 1 << 0;
        /// The target resized.
        const RESIZE = 1 << 1;
        /// Everything the controller listens for.
        const OBSERVED = Self::SCROLL.bits() | Self::RESIZE.bits();
    }
}

/// The source of scroll and resize events.
///
/// Targets are owned by the host and shared; the controller only adds and
/// removes its own listeners.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ObservationTarget<C> {
    /// The global viewport.
    Viewport,
    /// A caller-supplied scrollable container.
    Container(C),
}

impl<C> ObservationTarget<C> {
    /// Returns the container handle, if this is a container target.
    pub fn container(&self) -> Option<&C> {
        match self {
            Self::Viewport => None,
            Self::Container(c) => Some(c),
        }
    }
}

/// Environment services required by the [`Controller`](crate::Controller).
///
/// `Node` is whatever handle the host uses for elements it can measure, and
/// `Container` is the handle for scrollable containers. Both are compared with
/// `PartialEq` to detect a change of tracked element or target, so they should
/// compare by identity.
pub trait Host {
    /// Measurable element handle.
    type Node: PartialEq;
    /// Scrollable container handle.
    type Container: Clone + PartialEq;

    /// Current viewport dimensions, or `None` when no viewport exists.
    ///
    /// A host that returns `None` at mount time puts the controller in its
    /// degraded mode: nothing is attached and nothing is evaluated.
    fn viewport_size(&self) -> Option<Size>;

    /// Fallback dimensions used per axis when [`Host::viewport_size`] reports zero.
    ///
    /// Browsers report a zero inner size in some embedded contexts while the
    /// document element still knows its client size.
    fn client_size(&self) -> Option<Size> {
        None
    }

    /// Bounding rectangle of `node` in viewport coordinates.
    fn measure(&self, node: &Self::Node) -> ClientRect;

    /// Register the controller's listener for `events` on `target`.
    fn add_listener(&mut self, target: &ObservationTarget<Self::Container>, events: EventKinds);

    /// Remove the controller's listener for `events` from `target`.
    fn remove_listener(&mut self, target: &ObservationTarget<Self::Container>, events: EventKinds);

    /// Create the wrapper element tracked when no `node_ref` is supplied.
    ///
    /// `attributes` carries the wrapper props (`className`, `style`).
    fn create_wrapper(&mut self, attributes: &PropMap) -> Self::Node;

    /// Apply changed wrapper attributes to a wrapper made by [`Host::create_wrapper`].
    fn update_wrapper(&mut self, node: &Self::Node, attributes: &PropMap) {
        let _ = (node, attributes);
    }

    /// Called after every evaluation that changed the verdict.
    fn notify(&mut self, state: VisibilityState) {
        let _ = state;
    }
}

/// Resolve the viewport dimensions, falling back per axis to the client size.
pub(crate) fn resolve_viewport<H: Host + ?Sized>(host: &H) -> Option<Size> {
    let primary = host.viewport_size()?;
    let fallback = host.client_size().unwrap_or(Size::ZERO);
    let width = if primary.width == 0.0 {
        fallback.width
    } else {
        primary.width
    };
    let height = if primary.height == 0.0 {
        fallback.height
    } else {
        primary.height
    };
    Some(Size::new(width, height))
}

/// Listener registration held by a controller.
///
/// Acquiring registers scroll and resize listeners on one target; releasing
/// consumes the subscription and removes exactly what was registered. Because
/// `release` takes `self`, a subscription cannot be released twice.
#[derive(Debug, PartialEq, Eq)]
#[must_use = "a subscription must be released through `release`"]
pub struct Subscription<C> {
    target: ObservationTarget<C>,
    events: EventKinds,
}

impl<C: Clone + PartialEq> Subscription<C> {
    /// Register the observed events on `target`.
    pub fn acquire<H>(host: &mut H, target: ObservationTarget<C>) -> Self
    where
        H: Host<Container = C> + ?Sized,
    {
        let events = EventKinds::OBSERVED;
        host.add_listener(&target, events);
        tracing::debug!(?events, container = target.container().is_some(), "attached");
        Self { target, events }
    }

    /// Remove everything this subscription registered.
    pub fn release<H>(self, host: &mut H)
    where
        H: Host<Container = C> + ?Sized,
    {
        host.remove_listener(&self.target, self.events);
        tracing::debug!(
            events = ?self.events,
            container = self.target.container().is_some(),
            "detached"
        );
    }

    /// The target this subscription listens on.
    pub fn target(&self) -> &ObservationTarget<C> {
        &self.target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::RecordingHost;

    #[test]
    fn acquire_and_release_are_symmetric() {
        let mut host = RecordingHost::default();
        let sub = Subscription::acquire(&mut host, ObservationTarget::Container(7_u32));
        assert_eq!(sub.target(), &ObservationTarget::Container(7), "target");
        assert_eq!(
            host.listeners(&ObservationTarget::Container(7)),
            EventKinds::OBSERVED,
            "scroll and resize registered"
        );
        sub.release(&mut host);
        assert!(host.is_quiet(), "nothing left registered");
        assert_eq!(host.log.len(), 2, "one add, one remove");
    }

    #[test]
    fn viewport_falls_back_per_axis() {
        let mut host = RecordingHost {
            viewport: Some(Size::new(0.0, 600.0)),
            client: Some(Size::new(1024.0, 700.0)),
            ..RecordingHost::default()
        };
        assert_eq!(resolve_viewport(&host), Some(Size::new(1024.0, 600.0)), "width");
        host.client = None;
        assert_eq!(resolve_viewport(&host), Some(Size::new(0.0, 600.0)), "no fallback");
        host.viewport = None;
        assert_eq!(resolve_viewport(&host), None, "no viewport abstraction");
    }

    #[test]
    fn target_container_accessor() {
        assert_eq!(ObservationTarget::<u8>::Viewport.container(), None, "viewport");
        assert_eq!(ObservationTarget::Container(3_u8).container(), Some(&3), "container");
    }
}
