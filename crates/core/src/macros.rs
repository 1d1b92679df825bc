// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.
//!
//! - [`simple_display!`]: `Display` impl mapping enum variants to string literals
//! - [`wire_enum!`]: closed string enum with wire names and serde impls

/// Generate a `Display` impl that maps enum variants to string literals.
///
/// Unit variants match directly; data-carrying variants use `(..)` to ignore fields.
///
/// ```ignore
/// crate::simple_display! {
///     RecordStatus {
///         Started => "started",
///         Failed => "failed",
///     }
/// }
/// ```
#[macro_export]
macro_rules! simple_display {
    ($enum:ty { $( $variant:ident $(( $($ignore:tt)* ))? => $str:expr ),+ $(,)? }) => {
        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(match self {
                    $( Self::$variant $(( $($ignore)* ))? => $str, )+
                })
            }
        }
    };
}

/// Bind a fieldless enum to the exact strings used on the message bus.
///
/// Generates `ALL`, `as_wire()`, `from_wire()`, a `Display` impl printing the
/// wire name, and serde impls that reject any string outside the set.
///
/// ```ignore
/// crate::wire_enum! {
///     BuildStatus {
///         Started => "trainBuildStarted",
///         Failed => "trainBuildFailed",
///     }
/// }
/// ```
#[macro_export]
macro_rules! wire_enum {
    ($enum:ident { $( $variant:ident => $str:literal ),+ $(,)? }) => {
        impl $enum {
            /// Every variant, in declaration order.
            pub const ALL: &'static [$enum] = &[ $( $enum::$variant ),+ ];

            /// The string carried on the wire for this variant.
            pub fn as_wire(&self) -> &'static str {
                match self {
                    $( Self::$variant => $str, )+
                }
            }

            /// Parse an exact wire string. Unknown strings yield `None`.
            pub fn from_wire(s: &str) -> Option<Self> {
                match s {
                    $( $str => Some(Self::$variant), )+
                    _ => None,
                }
            }
        }

        $crate::simple_display! {
            $enum { $( $variant => $str ),+ }
        }

        impl serde::Serialize for $enum {
            fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                serializer.serialize_str(self.as_wire())
            }
        }

        impl<'de> serde::Deserialize<'de> for $enum {
            fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                let s = <String as serde::Deserialize>::deserialize(deserializer)?;
                Self::from_wire(&s)
                    .ok_or_else(|| serde::de::Error::unknown_variant(&s, &[ $( $str ),+ ]))
            }
        }
    };
}
