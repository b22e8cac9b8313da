// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Declarative macros for reducing boilerplate.

/// Generate `as_str()` and a matching `Display` impl for a fieldless enum.
///
/// The strings should agree with the enum's serde representation so that
/// log fields and stored documents read the same.
///
/// ```ignore
/// crate::str_enum! {
///     ProcessMode {
///         Active => "active",
///         Passive => "passive",
///     }
/// }
/// ```
#[macro_export]
macro_rules! str_enum {
    ($enum:ty { $( $variant:ident => $str:expr ),+ $(,)? }) => {
        impl $enum {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $( Self::$variant => $str, )+
                }
            }
        }

        impl std::fmt::Display for $enum {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}
