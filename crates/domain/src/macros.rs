//! Macro for implementing Display and FromStr for configuration enums
//!
//! Configuration values arrive as strings from environment variables and
//! config files. This macro gives a unit-variant enum a single, consistent
//! string mapping in both directions with case-insensitive parsing.
//!
//! # Example
//!
//! ```rust
//! use allsee_domain::impl_domain_enum_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Environment {
//!     Sandbox,
//!     Production,
//! }
//!
//! impl_domain_enum_conversions!(Environment {
//!     Sandbox => "sandbox",
//!     Production => "production",
//! });
//!
//! assert_eq!("SANDBOX".parse::<Environment>(), Ok(Environment::Sandbox));
//! assert_eq!(Environment::Production.to_string(), "production");
//! ```

/// Implements Display and FromStr traits for unit-variant enums
///
/// # Arguments
///
/// * `$enum_name` - The name of the enum type
/// * `$variant => $str` - Mapping of enum variants to their lowercase string
///   representations
#[macro_export]
macro_rules! impl_domain_enum_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => write!(f, $str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}
