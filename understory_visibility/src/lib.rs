// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=understory_visibility --heading-base-level=0

//! Understory Visibility: track whether one element intersects the viewport.
//!
//! This crate answers a single question for a single element, repeatedly: is it
//! visible right now? Typical uses are lazy-loading media and triggering
//! animate-in effects. It has two parts:
//!
//! - A pure **geometry evaluator** ([`evaluate`]) that classifies a
//!   [`ClientRect`] against the viewport dimensions, widened by an offset, in
//!   either [`VisibilityMode::Full`] (the whole box must be inside) or
//!   [`VisibilityMode::Partial`] (any overlap counts).
//! - A stateful **observation controller** ([`Controller`]) that attaches scroll
//!   and resize listeners to one [`ObservationTarget`] (the global viewport or a
//!   caller-supplied container), throttles re-evaluation, stops observing after
//!   the first visible verdict when `once` is set, and reattaches when the
//!   container changes.
//!
//! The crate does not know about any particular UI framework or document model.
//! Host frameworks implement [`Host`] to:
//!
//! - report the viewport size and measure the tracked element,
//! - register and remove the controller's listener on a target,
//! - create the wrapper element that is tracked when no `node_ref` is supplied,
//! - call [`Controller::tick`] once [`Controller::next_deadline`] has passed.
//!
//! Time is always supplied by the caller as milliseconds; the crate owns no timers.
//!
//! ## Minimal example
//!
//! ```rust
//! use kurbo::Size;
//! use understory_visibility::{ClientRect, VisibilityConfig, is_visible};
//!
//! let config = VisibilityConfig::default()
//!     .with_partial_visibility(true)
//!     .with_offset(25.0);
//!
//! // Just above the viewport, within the 25px tolerance.
//! let rect = ClientRect::new(-20.0, 10.0, -5.0, 50.0, 40.0, 15.0);
//! assert!(is_visible(rect, Size::new(800.0, 600.0), &config));
//! ```
//!
//! See the [`controller`] module for a full host walk-through, and [`props`] for
//! partitioning a dynamic property bag into own and pass-through props.
//!
//! ## Logging
//!
//! Lifecycle transitions (attach, detach, settle, degraded mode) are logged at
//! `debug` level and invalid configuration at `warn` level through `tracing`.
//! Install any subscriber to see them.
//!
//! ## Features
//!
//! - `std` (default): enables `std` support for `kurbo`, `tracing`, and `thiserror`.
//! - `libm`: enables `no_std` builds that rely on `libm` for floating-point math.
//!
//! This crate is `no_std` and uses `alloc`.

#![no_std]

extern crate alloc;

pub mod config;
pub mod controller;
pub mod geometry;
pub mod host;
pub mod props;
mod throttle;

#[cfg(test)]
mod testing;

pub use config::{ConfigError, ConfigWarnings, DEFAULT_THROTTLE_INTERVAL, VisibilityConfig};
pub use controller::{
    Controller, Phase, Props, Refresh, RenderProps, TrackOptions, TrackedElement, VisibilityState,
};
pub use geometry::{ClientRect, Thresholds, VisibilityMode, evaluate, is_visible};
pub use host::{EventKinds, Host, ObservationTarget, Subscription};
pub use props::{PropMap, PropValue, partition};
pub use throttle::Throttle;
