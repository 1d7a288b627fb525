// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Observation controller: lifecycle orchestration around the geometry evaluator.
//!
//! ## Lifecycle
//!
//! A [`Controller`] starts [`Phase::Unattached`]. The host drives it with:
//!
//! 1) [`Controller::mount`] once the tracked element exists. This attaches scroll
//!    and resize listeners to the resolved [`ObservationTarget`] and schedules an
//!    evaluation for the next tick, so the first measurement sees settled layout.
//! 2) [`Controller::handle_event`] for every scroll/resize delivered to the
//!    controller's listener. Events are throttled: the first in a burst evaluates
//!    immediately, later ones collapse into a single trailing evaluation.
//! 3) [`Controller::tick`] whenever [`Controller::next_deadline`] has passed. Ticks
//!    run the deferred evaluation and any due trailing evaluation.
//! 4) [`Controller::update`] when props change. A changed container reattaches;
//!    any change to configuration or pass-through props schedules re-evaluation.
//! 5) [`Controller::unmount`] on teardown.
//!
//! With `once` set, the first visible verdict moves the controller to
//! [`Phase::Settled`]: listeners are removed, pending work is dropped, and the
//! verdict stays `true`.
//!
//! Every entry point that can change output returns a [`Refresh`]. Hosts may skip
//! re-rendering on [`Refresh::Skip`].
//!
//! ## Example
//!
//! ```
//! use kurbo::Size;
//! use understory_visibility::{
//!     ClientRect, Controller, EventKinds, Host, ObservationTarget, Phase, Props, PropMap,
//!     TrackOptions, VisibilityConfig,
//! };
//!
//! struct Page {
//!     scroll_y: f64,
//! }
//!
//! impl Host for Page {
//!     type Node = ();
//!     type Container = ();
//!
//!     fn viewport_size(&self) -> Option<Size> {
//!         Some(Size::new(800.0, 600.0))
//!     }
//!     fn measure(&self, _: &()) -> ClientRect {
//!         // A 100px tall card laid out 1000px down the page.
//!         let top = 1000.0 - self.scroll_y;
//!         ClientRect::new(top, 0.0, top + 100.0, 200.0, 200.0, 100.0)
//!     }
//!     fn add_listener(&mut self, _: &ObservationTarget<()>, _: EventKinds) {}
//!     fn remove_listener(&mut self, _: &ObservationTarget<()>, _: EventKinds) {}
//!     fn create_wrapper(&mut self, _: &PropMap) {}
//! }
//!
//! let mut page = Page { scroll_y: 0.0 };
//! let options = TrackOptions::new(VisibilityConfig::default().with_once(true));
//! let mut card = Controller::new(Props::new(options, ()));
//!
//! card.mount(&mut page, &PropMap::new(), 0);
//! let _ = card.tick(&mut page, 0);
//! assert!(!card.is_visible());
//!
//! page.scroll_y = 600.0;
//! let _ = card.handle_event(&mut page, EventKinds::SCROLL, 16);
//! assert!(card.is_visible());
//! assert_eq!(card.phase(), Phase::Settled);
//! # card.unmount(&mut page);
//! ```

use core::fmt;

use crate::config::{VisibilityConfig, report};
use crate::geometry::is_visible;
use crate::host::{EventKinds, Host, ObservationTarget, Subscription, resolve_viewport};
use crate::props::PropMap;
use crate::throttle::Throttle;

/// Observation state of a [`Controller`].
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No listener registered.
    #[default]
    Unattached,
    /// Listening on exactly one target.
    Attached,
    /// Terminal: visible once with `once` set; no longer listening.
    Settled,
}

/// The verdict exposed to the presentation layer.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct VisibilityState {
    /// Whether the tracked element is currently visible.
    pub is_visible: bool,
}

/// The element whose geometry is measured.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TrackedElement<N> {
    /// Supplied by the caller through [`TrackOptions::node_ref`].
    External(N),
    /// Created by the host on the controller's behalf at mount.
    Wrapper(N),
}

impl<N> TrackedElement<N> {
    /// The underlying node handle.
    pub fn node(&self) -> &N {
        match self {
            Self::External(n) | Self::Wrapper(n) => n,
        }
    }
}

/// Whether the host needs to refresh its output.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[must_use]
pub enum Refresh {
    /// Nothing observable changed.
    #[default]
    Skip,
    /// The verdict, own configuration, or pass-through props changed.
    Render,
}

impl Refresh {
    /// `Render` if either side is `Render`.
    pub const fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Skip, Self::Skip) => Self::Skip,
            _ => Self::Render,
        }
    }

    /// Returns `true` for [`Refresh::Render`].
    pub const fn is_render(self) -> bool {
        matches!(self, Self::Render)
    }

    const fn when(changed: bool) -> Self {
        if changed { Self::Render } else { Self::Skip }
    }
}

/// Recognized options, with the two element handles.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackOptions<N, C> {
    /// Evaluator and rate-limit configuration.
    pub config: VisibilityConfig,
    /// Caller-supplied element to track instead of an internal wrapper.
    pub node_ref: Option<N>,
    /// Container observed when [`use_custom_container`](Self::use_custom_container) is set.
    pub container: Option<C>,
    /// Observe [`container`](Self::container) instead of the global viewport.
    pub use_custom_container: bool,
}

impl<N, C> Default for TrackOptions<N, C> {
    fn default() -> Self {
        Self::new(VisibilityConfig::default())
    }
}

impl<N, C> TrackOptions<N, C> {
    /// Options observing the global viewport with an internal wrapper element.
    pub const fn new(config: VisibilityConfig) -> Self {
        Self {
            config,
            node_ref: None,
            container: None,
            use_custom_container: false,
        }
    }

    /// Track `node` instead of an internal wrapper.
    #[must_use]
    pub fn with_node_ref(mut self, node: N) -> Self {
        self.node_ref = Some(node);
        self
    }

    /// Observe `container` instead of the global viewport.
    #[must_use]
    pub fn with_container(mut self, container: Option<C>) -> Self {
        self.container = container;
        self.use_custom_container = true;
        self
    }
}

impl<N, C: Clone> TrackOptions<N, C> {
    /// The target these options call for, if one is available.
    ///
    /// In custom-container mode without a container there is nothing to observe.
    pub fn resolve_target(&self) -> Option<ObservationTarget<C>> {
        resolve_target(self.use_custom_container, self.container.as_ref())
    }
}

fn resolve_target<C: Clone>(
    use_custom_container: bool,
    container: Option<&C>,
) -> Option<ObservationTarget<C>> {
    if use_custom_container {
        container.cloned().map(ObservationTarget::Container)
    } else {
        Some(ObservationTarget::Viewport)
    }
}

/// Own options and pass-through props, already partitioned.
#[derive(Clone, Debug, PartialEq)]
pub struct Props<N, C, P> {
    /// Recognized options.
    pub options: TrackOptions<N, C>,
    /// Props forwarded to children untouched.
    pub pass_through: P,
}

impl<N, C, P> Props<N, C, P> {
    /// Bundle options with pass-through props.
    pub const fn new(options: TrackOptions<N, C>, pass_through: P) -> Self {
        Self {
            options,
            pass_through,
        }
    }
}

/// What children receive: the verdict plus every pass-through prop.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct RenderProps<'a, P> {
    /// The current verdict.
    pub is_visible: bool,
    /// Pass-through props, unmodified.
    pub pass_through: &'a P,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Lifecycle {
    Created,
    Mounted,
    /// Mounted without a viewport: permanently inert.
    Degraded,
    Unmounted,
}

/// Tracks the visibility of one element against one observation target.
///
/// `H` is the [`Host`] providing measurement and listener registration; `P` is
/// the pass-through prop type forwarded to children, compared with `PartialEq`.
pub struct Controller<H: Host, P> {
    config: VisibilityConfig,
    container: Option<H::Container>,
    use_custom_container: bool,
    pass_through: P,

    tracked: Option<TrackedElement<H::Node>>,
    wrapper_attrs: PropMap,
    subscription: Option<Subscription<H::Container>>,
    throttle: Throttle,
    /// Time at which a deferred evaluation becomes due.
    scheduled: Option<u64>,

    state: VisibilityState,
    phase: Phase,
    lifecycle: Lifecycle,
}

impl<H, P> fmt::Debug for Controller<H, P>
where
    H: Host,
    H::Node: fmt::Debug,
    H::Container: fmt::Debug,
    P: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Controller")
            .field("config", &self.config)
            .field("container", &self.container)
            .field("use_custom_container", &self.use_custom_container)
            .field("pass_through", &self.pass_through)
            .field("tracked", &self.tracked)
            .field("wrapper_attrs", &self.wrapper_attrs)
            .field("subscription", &self.subscription)
            .field("throttle", &self.throttle)
            .field("scheduled", &self.scheduled)
            .field("state", &self.state)
            .field("phase", &self.phase)
            .field("lifecycle", &self.lifecycle)
            .finish()
    }
}

impl<H: Host, P: PartialEq> Controller<H, P> {
    /// Create an unmounted controller. The verdict starts as not visible.
    pub fn new(props: Props<H::Node, H::Container, P>) -> Self {
        let Props {
            options,
            pass_through,
        } = props;
        let (config, warnings) = options.config.sanitized();
        report(&warnings);
        Self {
            config,
            container: options.container,
            use_custom_container: options.use_custom_container,
            pass_through,
            tracked: options.node_ref.map(TrackedElement::External),
            wrapper_attrs: PropMap::new(),
            subscription: None,
            throttle: Throttle::new(config.throttle_interval),
            scheduled: None,
            state: VisibilityState::default(),
            phase: Phase::Unattached,
            lifecycle: Lifecycle::Created,
        }
    }

    /// Activate observation.
    ///
    /// Creates the wrapper element through [`Host::create_wrapper`] unless a
    /// `node_ref` was supplied, attaches to the resolved target, and schedules
    /// an evaluation for the next tick at or after `now`. Without a viewport the
    /// controller stays unattached for good. Mounting twice is ignored.
    pub fn mount(&mut self, host: &mut H, wrapper: &PropMap, now: u64) {
        if self.lifecycle != Lifecycle::Created {
            tracing::debug!(lifecycle = ?self.lifecycle, "mount ignored");
            return;
        }
        if resolve_viewport(host).is_none() {
            tracing::debug!("no viewport available; visibility tracking disabled");
            self.lifecycle = Lifecycle::Degraded;
            return;
        }
        self.lifecycle = Lifecycle::Mounted;
        self.wrapper_attrs.clone_from(wrapper);
        if self.tracked.is_none() {
            self.tracked = Some(TrackedElement::Wrapper(host.create_wrapper(wrapper)));
        }
        if self.sync_target(host) {
            self.scheduled = Some(now);
        }
    }

    /// Apply new props.
    ///
    /// Configuration and pass-through props are compared field by field. The
    /// container handle is compared on its own: a different container moves the
    /// listeners, but does not by itself require a refresh. A different
    /// `node_ref` replaces the tracked element and counts as a configuration
    /// change; omitting it keeps the current one.
    pub fn update(
        &mut self,
        host: &mut H,
        props: Props<H::Node, H::Container, P>,
        now: u64,
    ) -> Refresh {
        let Props {
            options,
            pass_through,
        } = props;

        let (config, warnings) = options.config.sanitized();
        let config_changed = config != self.config;
        let node_changed = options
            .node_ref
            .as_ref()
            .is_some_and(|node| self.tracked.as_ref().map(TrackedElement::node) != Some(node));
        let own_changed = config_changed
            || node_changed
            || options.use_custom_container != self.use_custom_container;
        let pass_changed = pass_through != self.pass_through;

        if config_changed {
            report(&warnings);
            self.throttle.set_interval(config.throttle_interval);
        }
        self.config = config;
        self.use_custom_container = options.use_custom_container;
        self.container = options.container;
        self.pass_through = pass_through;
        if let Some(node) = options.node_ref.filter(|_| node_changed) {
            self.tracked = Some(TrackedElement::External(node));
        }

        if self.lifecycle == Lifecycle::Mounted && self.phase != Phase::Settled {
            let retargeted = self.sync_target(host);
            if retargeted || ((own_changed || pass_changed) && self.subscription.is_some()) {
                self.scheduled = Some(now);
            }
        }

        Refresh::when(own_changed || pass_changed)
    }

    /// Apply new wrapper attributes (`className`, `style`).
    ///
    /// Changed attributes are forwarded through [`Host::update_wrapper`] when
    /// the tracked element is the internal wrapper, and a re-evaluation is
    /// scheduled because the wrapper's geometry may have moved with them.
    pub fn update_wrapper(&mut self, host: &mut H, attributes: PropMap, now: u64) -> Refresh {
        if attributes == self.wrapper_attrs {
            return Refresh::Skip;
        }
        self.wrapper_attrs = attributes;
        if let Some(TrackedElement::Wrapper(node)) = &self.tracked {
            host.update_wrapper(node, &self.wrapper_attrs);
        }
        if self.lifecycle == Lifecycle::Mounted && self.subscription.is_some() {
            self.scheduled = Some(now);
        }
        Refresh::Render
    }

    /// Handle scroll and/or resize events delivered to the controller's listener.
    ///
    /// Runs an evaluation immediately when the throttle window is open; otherwise
    /// the event is coalesced into the next trailing evaluation, which becomes
    /// due at [`Controller::next_deadline`].
    pub fn handle_event(&mut self, host: &mut H, events: EventKinds, now: u64) -> Refresh {
        if self.lifecycle != Lifecycle::Mounted || self.phase != Phase::Attached {
            tracing::trace!(?events, phase = ?self.phase, "event ignored");
            return Refresh::Skip;
        }
        if !events.intersects(EventKinds::OBSERVED) || !self.throttle.trigger(now) {
            return Refresh::Skip;
        }
        self.evaluate(host)
    }

    /// Run whatever is due at `now`: the deferred evaluation, then a trailing
    /// throttled evaluation.
    pub fn tick(&mut self, host: &mut H, now: u64) -> Refresh {
        if self.lifecycle != Lifecycle::Mounted {
            return Refresh::Skip;
        }
        let mut refresh = Refresh::Skip;
        if self.scheduled.is_some_and(|at| now >= at) {
            self.scheduled = None;
            refresh = self.evaluate(host);
        }
        if self.phase == Phase::Attached && self.throttle.poll(now) {
            refresh = refresh.merge(self.evaluate(host));
        }
        refresh
    }

    /// Earliest time at which [`Controller::tick`] has work to do.
    pub fn next_deadline(&self) -> Option<u64> {
        if self.lifecycle != Lifecycle::Mounted {
            return None;
        }
        let trailing = if self.phase == Phase::Attached {
            self.throttle.deadline()
        } else {
            None
        };
        match (self.scheduled, trailing) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Tear down: remove listeners and drop pending work. Idempotent.
    pub fn unmount(&mut self, host: &mut H) {
        if self.lifecycle == Lifecycle::Unmounted {
            return;
        }
        self.detach(host);
        if self.phase == Phase::Attached {
            self.phase = Phase::Unattached;
        }
        if matches!(self.tracked, Some(TrackedElement::Wrapper(_))) {
            self.tracked = None;
        }
        self.lifecycle = Lifecycle::Unmounted;
        tracing::debug!(phase = ?self.phase, "unmounted");
    }

    /// Current observation phase.
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Current verdict.
    pub const fn state(&self) -> VisibilityState {
        self.state
    }

    /// Shorthand for `state().is_visible`.
    pub const fn is_visible(&self) -> bool {
        self.state.is_visible
    }

    /// Whether mount found no viewport and the controller is inert.
    pub fn is_degraded(&self) -> bool {
        self.lifecycle == Lifecycle::Degraded
    }

    /// The target currently listened on.
    pub fn target(&self) -> Option<&ObservationTarget<H::Container>> {
        self.subscription.as_ref().map(Subscription::target)
    }

    /// The element being measured, once resolved.
    pub fn tracked_element(&self) -> Option<&TrackedElement<H::Node>> {
        self.tracked.as_ref()
    }

    /// Active configuration.
    pub const fn config(&self) -> &VisibilityConfig {
        &self.config
    }

    /// Props for children: the verdict and the pass-through props.
    pub fn render_props(&self) -> RenderProps<'_, P> {
        RenderProps {
            is_visible: self.state.is_visible,
            pass_through: &self.pass_through,
        }
    }

    /// Bring the subscription in line with the configured target.
    ///
    /// Returns `true` if a new subscription was acquired.
    fn sync_target(&mut self, host: &mut H) -> bool {
        let desired = resolve_target(self.use_custom_container, self.container.as_ref());
        if desired.as_ref() == self.target() {
            return false;
        }
        self.detach(host);
        match desired {
            Some(target) => {
                self.subscription = Some(Subscription::acquire(host, target));
                self.phase = Phase::Attached;
                true
            }
            None => {
                tracing::debug!("custom container unavailable; waiting");
                self.phase = Phase::Unattached;
                false
            }
        }
    }

    /// The single release path for listeners and pending work.
    fn detach(&mut self, host: &mut H) {
        if let Some(subscription) = self.subscription.take() {
            subscription.release(host);
        }
        self.throttle.cancel();
        self.scheduled = None;
    }

    fn evaluate(&mut self, host: &mut H) -> Refresh {
        if self.phase != Phase::Attached {
            return Refresh::Skip;
        }
        let Some(tracked) = self.tracked.as_ref() else {
            return Refresh::Skip;
        };
        let Some(viewport) = resolve_viewport(host) else {
            return Refresh::Skip;
        };
        let rect = host.measure(tracked.node());
        let visible = is_visible(rect, viewport, &self.config);
        tracing::trace!(?rect, visible, "evaluated");

        if visible && self.config.once {
            self.detach(host);
            self.phase = Phase::Settled;
            tracing::debug!("settled");
        }

        if visible == self.state.is_visible {
            return Refresh::Skip;
        }
        self.state.is_visible = visible;
        host.notify(self.state);
        Refresh::Render
    }
}

impl<H: Host, P> Drop for Controller<H, P> {
    fn drop(&mut self) {
        if self.subscription.is_some() {
            tracing::warn!("visibility controller dropped while attached; call `unmount` first");
        }
    }
}
