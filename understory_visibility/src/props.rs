// Copyright 2025 the Understory Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Splitting a dynamic property bag into own configuration and pass-through props.
//!
//! Hosts with statically typed props can skip this module and build
//! [`TrackOptions`](crate::TrackOptions) directly. Hosts that receive props as
//! key/value pairs (scripting layers, markup, inspectors) call [`partition`]
//! once at the boundary:
//!
//! ```
//! use understory_visibility::props::{PropMap, PropValue, partition};
//!
//! let mut props = PropMap::new();
//! props.insert("once".into(), PropValue::Bool(true));
//! props.insert("className".into(), PropValue::Text("card".into()));
//! props.insert("title".into(), PropValue::Text("Hello".into()));
//!
//! let p = partition(props);
//! assert!(p.config.once);
//! assert!(p.wrapper.contains_key("className"));
//! assert_eq!(p.pass_through.len(), 1);
//! assert!(p.warnings.is_empty());
//! ```
//!
//! The element handles (`nodeRef`, `container`) are not representable as
//! [`PropValue`]s and are always supplied through
//! [`TrackOptions`](crate::TrackOptions).

use alloc::collections::BTreeMap;
use alloc::string::String;

use crate::config::{
    ConfigError, ConfigWarnings, VisibilityConfig, coerce_throttle_interval, report,
};

/// A dynamically typed property value.
#[derive(Clone, Debug, PartialEq)]
pub enum PropValue {
    /// Explicitly unset. Recognized options treat this as "use the default".
    Null,
    /// A boolean.
    Bool(bool),
    /// A number.
    Number(f64),
    /// A string.
    Text(String),
}

/// A property bag keyed by name.
///
/// Equality compares values key by key, which is the shallow comparison the
/// controller needs for pass-through props.
pub type PropMap = BTreeMap<String, PropValue>;

/// Key for [`VisibilityConfig::once`].
pub const ONCE: &str = "once";
/// Key for [`VisibilityConfig::throttle_interval`].
pub const THROTTLE_INTERVAL: &str = "throttleInterval";
/// Key for [`VisibilityConfig::offset`].
pub const OFFSET: &str = "offset";
/// Key for [`VisibilityConfig::partial_visibility`].
pub const PARTIAL_VISIBILITY: &str = "partialVisibility";
/// Key for [`TrackOptions::use_custom_container`](crate::TrackOptions::use_custom_container).
pub const USE_CUSTOM_CONTAINER: &str = "useCustomContainer";
/// Wrapper element class name.
pub const CLASS_NAME: &str = "className";
/// Wrapper element inline style.
pub const STYLE: &str = "style";

/// Result of [`partition`]: disjoint own and pass-through sets.
#[derive(Clone, Debug, PartialEq)]
pub struct Partitioned {
    /// Configuration parsed from the recognized keys, defaults elsewhere.
    pub config: VisibilityConfig,
    /// Whether a caller-supplied container is the observation target.
    pub use_custom_container: bool,
    /// Attributes for the internally created wrapper element.
    pub wrapper: PropMap,
    /// Everything not recognized, unmodified.
    pub pass_through: PropMap,
    /// Problems found while parsing recognized keys.
    pub warnings: ConfigWarnings,
}

/// Split `props` into configuration, wrapper attributes, and pass-through props.
///
/// Recognized keys never leak into [`Partitioned::pass_through`], and a
/// recognized key with a value of the wrong type keeps its default and is
/// reported. Warnings are also logged.
pub fn partition(props: PropMap) -> Partitioned {
    let mut out = Partitioned {
        config: VisibilityConfig::default(),
        use_custom_container: false,
        wrapper: PropMap::new(),
        pass_through: PropMap::new(),
        warnings: ConfigWarnings::new(),
    };

    for (key, value) in props {
        match key.as_str() {
            ONCE => {
                if let Some(b) = expect_bool(ONCE, &value, &mut out.warnings) {
                    out.config.once = b;
                }
            }
            PARTIAL_VISIBILITY => {
                if let Some(b) = expect_bool(PARTIAL_VISIBILITY, &value, &mut out.warnings) {
                    out.config.partial_visibility = b;
                }
            }
            USE_CUSTOM_CONTAINER => {
                if let Some(b) = expect_bool(USE_CUSTOM_CONTAINER, &value, &mut out.warnings) {
                    out.use_custom_container = b;
                }
            }
            OFFSET => {
                if let Some(n) = expect_number(OFFSET, &value, &mut out.warnings) {
                    out.config.offset = n;
                }
            }
            THROTTLE_INTERVAL => {
                if let Some(n) = expect_number(THROTTLE_INTERVAL, &value, &mut out.warnings) {
                    let (ms, warning) = coerce_throttle_interval(n);
                    out.config.throttle_interval = ms;
                    out.warnings.extend(warning);
                }
            }
            CLASS_NAME | STYLE => {
                if value != PropValue::Null {
                    out.wrapper.insert(key, value);
                }
            }
            _ => {
                out.pass_through.insert(key, value);
            }
        }
    }

    let (config, warnings) = out.config.sanitized();
    out.config = config;
    out.warnings.extend(warnings);
    report(&out.warnings);
    out
}

fn expect_bool(
    key: &'static str,
    value: &PropValue,
    warnings: &mut ConfigWarnings,
) -> Option<bool> {
    match value {
        PropValue::Bool(b) => Some(*b),
        PropValue::Null => None,
        _ => {
            warnings.push(ConfigError::UnexpectedType {
                key,
                expected: "boolean",
            });
            None
        }
    }
}

fn expect_number(
    key: &'static str,
    value: &PropValue,
    warnings: &mut ConfigWarnings,
) -> Option<f64> {
    match value {
        PropValue::Number(n) => Some(*n),
        PropValue::Null => None,
        _ => {
            warnings.push(ConfigError::UnexpectedType {
                key,
                expected: "number",
            });
            None
        }
    }
}
