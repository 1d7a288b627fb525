// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Geometry evaluator: classify a bounding rectangle against a tolerant viewport window.
//!
//! Everything in this module is pure. The [`Controller`](crate::Controller) calls
//! [`evaluate`] with a fresh [`ClientRect`] snapshot each time it re-evaluates, but
//! hosts can call it directly as well:
//!
//! ```
//! use kurbo::Size;
//! use understory_visibility::{ClientRect, VisibilityMode, evaluate};
//!
//! let rect = ClientRect::new(10.0, 10.0, 50.0, 50.0, 40.0, 40.0);
//! assert!(evaluate(rect, Size::new(800.0, 600.0), 0.0, VisibilityMode::Full));
//! ```

use kurbo::{Rect, Size};

use crate::VisibilityConfig;

/// Snapshot of an element's bounding box in viewport coordinates.
///
/// Edges are measured from the top-left corner of the viewport, so an element
/// scrolled above the viewport has a negative `top`. `width` and `height` are
/// carried separately from the edges because hosts report them separately;
/// the partial-visibility test reads both.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct ClientRect {
    /// Distance from the viewport's top edge to the element's top edge.
    pub top: f64,
    /// Distance from the viewport's left edge to the element's left edge.
    pub left: f64,
    /// Distance from the viewport's top edge to the element's bottom edge.
    pub bottom: f64,
    /// Distance from the viewport's left edge to the element's right edge.
    pub right: f64,
    /// Element width.
    pub width: f64,
    /// Element height.
    pub height: f64,
}

impl ClientRect {
    /// The all-zero rectangle reported for elements that are not laid out.
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0, 0.0, 0.0);

    /// Create a rect from its six components.
    pub const fn new(
        top: f64,
        left: f64,
        bottom: f64,
        right: f64,
        width: f64,
        height: f64,
    ) -> Self {
        Self {
            top,
            left,
            bottom,
            right,
            width,
            height,
        }
    }

    /// Returns `true` when the edges sum to zero.
    ///
    /// Hosts report this for detached or not-yet-laid-out elements; such a rect
    /// is never visible.
    pub fn is_degenerate(&self) -> bool {
        self.top + self.left + self.bottom + self.right == 0.0
    }

    /// Convert to a [`kurbo::Rect`] using the edges (width and height are implied).
    pub fn to_rect(&self) -> Rect {
        Rect::new(self.left, self.top, self.right, self.bottom)
    }
}

impl From<Rect> for ClientRect {
    fn from(r: Rect) -> Self {
        Self::new(r.y0, r.x0, r.y1, r.x1, r.width(), r.height())
    }
}

/// Which visibility test to run.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum VisibilityMode {
    /// The whole box must lie inside the tolerant window.
    #[default]
    Full,
    /// Any overlap with the tolerant window counts.
    Partial,
}

impl VisibilityMode {
    /// Map the `partialVisibility` flag to a mode.
    pub const fn from_partial(partial_visibility: bool) -> Self {
        if partial_visibility {
            Self::Partial
        } else {
            Self::Full
        }
    }
}

/// The four bounds of the tolerant viewport window.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Thresholds {
    /// Lowest accepted top coordinate: `-offset`.
    pub top: f64,
    /// Lowest accepted left coordinate: `-offset`.
    pub left: f64,
    /// Highest accepted right coordinate: `viewport.width + offset`.
    pub width: f64,
    /// Highest accepted bottom coordinate: `viewport.height + offset`.
    pub height: f64,
}

impl Thresholds {
    /// Compute thresholds for a viewport and a symmetric offset.
    pub fn new(viewport: Size, offset: f64) -> Self {
        Self {
            top: -offset,
            left: -offset,
            width: viewport.width + offset,
            height: viewport.height + offset,
        }
    }

    /// Full containment test.
    pub fn contains(&self, r: &ClientRect) -> bool {
        r.top >= self.top
            && r.left >= self.left
            && r.bottom <= self.height
            && r.right <= self.width
    }

    /// Overlap test.
    pub fn overlaps(&self, r: &ClientRect) -> bool {
        r.top + r.height >= self.top
            && r.left + r.width >= self.left
            && r.bottom - r.height <= self.height
            && r.right - r.width <= self.width
    }
}

/// Classify `rect` against a `viewport` widened (or narrowed, for negative values) by `offset`.
///
/// Degenerate rects (see [`ClientRect::is_degenerate`]) are never visible.
pub fn evaluate(rect: ClientRect, viewport: Size, offset: f64, mode: VisibilityMode) -> bool {
    if rect.is_degenerate() {
        return false;
    }
    let t = Thresholds::new(viewport, offset);
    match mode {
        VisibilityMode::Full => t.contains(&rect),
        VisibilityMode::Partial => t.overlaps(&rect),
    }
}

/// [`evaluate`] using the offset and mode of a [`VisibilityConfig`].
pub fn is_visible(rect: ClientRect, viewport: Size, config: &VisibilityConfig) -> bool {
    evaluate(rect, viewport, config.offset, config.mode())
}
