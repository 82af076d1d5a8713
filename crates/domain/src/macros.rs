//! Macro for the string forms of persisted status enums
//!
//! Queue statuses, log types and severities are stored as lowercase text
//! columns. This macro generates `as_str`, `Display` and a case-insensitive
//! `FromStr` from a single variant table so the database mapping and the CLI
//! output cannot drift apart.
//!
//! # Example
//!
//! ```rust
//! use evosync_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Stage {
//!     Queued,
//!     Sent,
//! }
//!
//! impl_domain_status_conversions!(Stage {
//!     Queued => "queued",
//!     Sent => "sent",
//! });
//!
//! assert_eq!(Stage::Sent.as_str(), "sent");
//! assert_eq!("QUEUED".parse::<Stage>(), Ok(Stage::Queued));
//! ```

/// Implements `as_str`, `Display` and `FromStr` for status enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their stored
///   representation (must be lowercase)
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl $enum_name {
            /// Stored string representation.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $str,)+
                }
            }
        }

        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
