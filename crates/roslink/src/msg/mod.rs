// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message model: the [`RosMessage`] trait, canonical type names and the
//! wire signature used to certify that two definitions share one shape.
//!
//! A canonical name has the form `"<package>/<TypeName>"`; the package is
//! everything before the first `/`. Names are case-sensitive ASCII.
//!
//! Concrete message types usually implement [`RosMessage`] through the
//! [`ros_message!`](crate::ros_message) macro:
//!
//! ```
//! use roslink::ros_message;
//!
//! #[derive(Debug, Default)]
//! pub struct Temperature {
//!     pub celsius: f64,
//! }
//!
//! ros_message!(Temperature, "sensors/Temperature", "float64 celsius");
//! ```

pub mod action;
mod header;
pub mod signature;

pub use action::{ActionEnvelope, ActionRole, GoalID, GoalStatus};
pub use header::Header;
pub use signature::WireSignature;

use std::any::Any;
use std::fmt;

/// Name reported by a type that never initialized its own identity.
///
/// Registering a type that reports this name is always an error.
pub const UNINITIALIZED_TYPE_NAME: &str = "xamla/unkown";

/// A message type that can be registered and instantiated by name.
pub trait RosMessage: Any + Send + Sync + fmt::Debug {
    /// Canonical `package/Type` name.
    fn message_type(&self) -> &str;

    /// Field layout in `.msg` syntax.
    fn message_definition(&self) -> &str;

    /// Signatures of the message types referenced by the definition.
    fn embedded_signatures(&self) -> Vec<(&'static str, WireSignature)> {
        Vec::new()
    }

    /// Wire signature of this type's layout.
    fn md5sum(&self) -> WireSignature {
        WireSignature::compute_with(self.message_definition(), &self.embedded_signatures())
    }

    /// Whether the first field is a `std_msgs/Header`.
    fn has_header(&self) -> bool {
        definition_has_header(self.message_definition())
    }

    fn as_any(&self) -> &dyn Any;
}

impl dyn RosMessage {
    /// Downcast to the concrete message type.
    pub fn downcast_ref<T: RosMessage>(&self) -> Option<&T> {
        self.as_any().downcast_ref::<T>()
    }
}

/// Package segment of a canonical name (text before the first `/`).
pub fn package_of(type_name: &str) -> &str {
    match type_name.split_once('/') {
        Some((package, _)) => package,
        None => type_name,
    }
}

/// Type segment of a canonical name (text after the first `/`).
pub fn short_name(type_name: &str) -> &str {
    match type_name.split_once('/') {
        Some((_, name)) => name,
        None => type_name,
    }
}

/// Whether `type_name` looks like `package/Type` with both parts present.
pub fn is_canonical_name(type_name: &str) -> bool {
    match type_name.split_once('/') {
        Some((package, name)) => {
            !package.is_empty()
                && !name.is_empty()
                && type_name.is_ascii()
                && !type_name.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Whether the first field of `definition` is a header.
pub fn definition_has_header(definition: &str) -> bool {
    definition
        .lines()
        .map(|line| line.split('#').next().unwrap_or("").trim())
        .find(|line| !line.is_empty() && !line.contains('='))
        .and_then(|line| line.split_whitespace().next())
        .is_some_and(|ty| ty == "Header" || ty == "std_msgs/Header")
}

/// Implements [`RosMessage`] for a `Default + Debug + Send + Sync` type.
///
/// The optional `embeds { "Type" => RustType, ... }` block lists the
/// message types referenced by the definition so that the wire signature
/// covers their layout.
#[macro_export]
macro_rules! ros_message {
    ($ty:ty, $name:expr, $definition:expr, embeds { $($field:literal => $embed:ty),+ $(,)? }) => {
        impl $crate::msg::RosMessage for $ty {
            fn message_type(&self) -> &str {
                $name
            }

            fn message_definition(&self) -> &str {
                $definition
            }

            fn embedded_signatures(
                &self,
            ) -> ::std::vec::Vec<(&'static str, $crate::msg::WireSignature)> {
                ::std::vec![$((
                    $field,
                    $crate::msg::RosMessage::md5sum(
                        &<$embed as ::std::default::Default>::default(),
                    ),
                )),+]
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };
    ($ty:ty, $name:expr, $definition:expr) => {
        impl $crate::msg::RosMessage for $ty {
            fn message_type(&self) -> &str {
                $name
            }

            fn message_definition(&self) -> &str {
                $definition
            }

            fn as_any(&self) -> &dyn ::std::any::Any {
                self
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Default)]
    struct Point {
        x: f64,
    }

    crate::ros_message!(Point, "geometry/Point", "float64 x");

    #[derive(Debug, Default)]
    struct Stamped {
        point: Point,
    }

    crate::ros_message!(
        Stamped,
        "geometry/Stamped",
        "Header header\nPoint point",
        embeds { "Header" => Header, "Point" => Point }
    );

    #[test]
    fn package_and_short_name() {
        assert_eq!(package_of("std_msgs/String"), "std_msgs");
        assert_eq!(short_name("std_msgs/String"), "String");
        assert_eq!(package_of("a/b/c"), "a");
        assert_eq!(short_name("a/b/c"), "b/c");
        assert_eq!(package_of("bare"), "bare");
    }

    #[test]
    fn canonical_name_validation() {
        assert!(is_canonical_name("std_msgs/String"));
        assert!(!is_canonical_name("String"));
        assert!(!is_canonical_name("/String"));
        assert!(!is_canonical_name("std_msgs/"));
        assert!(!is_canonical_name("std msgs/String"));
    }

    #[test]
    fn header_detection() {
        assert!(definition_has_header("# stamped\nHeader header\nint32 x"));
        assert!(definition_has_header("std_msgs/Header header"));
        assert!(!definition_has_header("int32 x\nHeader header"));
        assert!(!definition_has_header(""));
    }

    #[test]
    fn macro_generated_impl() {
        let p = Point { x: 1.0 };
        assert_eq!(p.message_type(), "geometry/Point");
        assert_eq!(p.md5sum(), WireSignature::compute("float64 x"));
        assert!(!p.has_header());
        assert_eq!(p.x, 1.0);
    }

    #[test]
    fn embedded_signatures_feed_the_digest() {
        let stamped = Stamped::default();
        assert!(stamped.has_header());
        assert_eq!(stamped.embedded_signatures().len(), 2);
        assert_ne!(
            stamped.md5sum(),
            WireSignature::compute("Header header\nPoint point")
        );
        assert_eq!(stamped.point.x, 0.0);
    }

    #[test]
    fn downcast_through_trait_object() {
        let boxed: Box<dyn RosMessage> = Box::new(Point { x: 2.5 });
        let point = boxed.downcast_ref::<Point>().map(|p| p.x);
        assert_eq!(point, Some(2.5));
        assert!(boxed.downcast_ref::<Stamped>().is_none());
    }
}
