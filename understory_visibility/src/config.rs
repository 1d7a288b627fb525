// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Visibility configuration and its validation.

use smallvec::SmallVec;

use crate::VisibilityMode;

/// Default minimum spacing between throttled re-evaluations, in milliseconds.
pub const DEFAULT_THROTTLE_INTERVAL: u64 = 150;

/// Warnings collected while validating configuration.
///
/// Two inline slots cover the common cases (a bad interval and a bad offset)
/// without allocating.
pub type ConfigWarnings = SmallVec<[ConfigError; 2]>;

/// A configuration problem.
///
/// These are developer-facing warnings: validation never rejects a
/// configuration, it reports what was wrong and falls back to a best-effort
/// value.
#[derive(Copy, Clone, Debug, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// `throttleInterval` was negative, fractional, or not finite.
    #[error("the throttleInterval you provided ({value}) is not a valid integer >= 0")]
    InvalidThrottleInterval {
        /// The supplied value.
        value: f64,
    },
    /// `offset` was NaN or infinite. The offset falls back to `0`.
    #[error("the offset you provided ({value}) is not a finite number")]
    NonFiniteOffset {
        /// The supplied value.
        value: f64,
    },
    /// A recognized option carried a value of the wrong type.
    #[error("the {key} option expects a {expected}")]
    UnexpectedType {
        /// Name of the recognized option.
        key: &'static str,
        /// Human-readable name of the expected type.
        expected: &'static str,
    },
}

/// Configuration consumed by the geometry evaluator and the controller.
///
/// Equality is per field, which is exactly the shallow comparison the
/// controller uses to decide whether a configuration change is a change.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VisibilityConfig {
    /// Pixel tolerance added around the viewport. Negative values shrink it.
    pub offset: f64,
    /// Count any overlap as visible instead of requiring full containment.
    pub partial_visibility: bool,
    /// Stop observing after the first visible verdict.
    pub once: bool,
    /// Minimum spacing between throttled re-evaluations, in milliseconds.
    pub throttle_interval: u64,
}

impl Default for VisibilityConfig {
    fn default() -> Self {
        Self {
            offset: 0.0,
            partial_visibility: false,
            once: false,
            throttle_interval: DEFAULT_THROTTLE_INTERVAL,
        }
    }
}

impl VisibilityConfig {
    /// Set [`offset`](Self::offset).
    #[must_use]
    pub const fn with_offset(mut self, offset: f64) -> Self {
        self.offset = offset;
        self
    }

    /// Set [`partial_visibility`](Self::partial_visibility).
    #[must_use]
    pub const fn with_partial_visibility(mut self, partial_visibility: bool) -> Self {
        self.partial_visibility = partial_visibility;
        self
    }

    /// Set [`once`](Self::once).
    #[must_use]
    pub const fn with_once(mut self, once: bool) -> Self {
        self.once = once;
        self
    }

    /// Set [`throttle_interval`](Self::throttle_interval).
    #[must_use]
    pub const fn with_throttle_interval(mut self, throttle_interval: u64) -> Self {
        self.throttle_interval = throttle_interval;
        self
    }

    /// The evaluator mode selected by [`partial_visibility`](Self::partial_visibility).
    pub const fn mode(&self) -> VisibilityMode {
        VisibilityMode::from_partial(self.partial_visibility)
    }

    /// Check the fields that the type system cannot.
    pub fn validate(&self) -> ConfigWarnings {
        let mut warnings = ConfigWarnings::new();
        if !self.offset.is_finite() {
            warnings.push(ConfigError::NonFiniteOffset { value: self.offset });
        }
        warnings
    }

    /// Replace values that [`validate`](Self::validate) rejects with their
    /// fallbacks, returning the corrected configuration and the warnings.
    ///
    /// A non-finite offset falls back to `0`, which also keeps equality
    /// reflexive for change detection.
    #[must_use]
    pub fn sanitized(mut self) -> (Self, ConfigWarnings) {
        let warnings = self.validate();
        if !self.offset.is_finite() {
            self.offset = 0.0;
        }
        (self, warnings)
    }
}

/// Convert a dynamically typed interval to milliseconds.
///
/// Negative and NaN values become `0`, fractional values round toward zero,
/// and infinity saturates. Anything that is not already a non-negative integer
/// is reported.
pub fn coerce_throttle_interval(value: f64) -> (u64, Option<ConfigError>) {
    #[allow(
        clippy::cast_possible_truncation,
        reason = "Float to int casts saturate; truncating fractional intervals is the documented fallback."
    )]
    let ms = value.max(0.0) as u64;
    let exact = value.is_finite() && value >= 0.0 && ms as f64 == value;
    let warning = (!exact).then_some(ConfigError::InvalidThrottleInterval { value });
    (ms, warning)
}

/// Emit every warning through `tracing`.
pub(crate) fn report(warnings: &[ConfigError]) {
    for warning in warnings {
        tracing::warn!(%warning, "invalid visibility configuration");
    }
}
