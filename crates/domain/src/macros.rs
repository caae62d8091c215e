//! Macro for implementing Display and FromStr for small keyword enums
//!
//! Store collections and change kinds are plain keywords on the wire. The
//! macro keeps their string form and parsing in one place.
//!
//! # Example
//!
//! ```rust
//! use lunchsync_domain::impl_domain_status_conversions;
//!
//! #[derive(Debug, Clone, Copy, PartialEq, Eq)]
//! pub enum Vote {
//!     Yes,
//!     No,
//! }
//!
//! impl_domain_status_conversions!(Vote {
//!     Yes => "yes",
//!     No => "no",
//! });
//!
//! assert_eq!(Vote::Yes.to_string(), "yes");
//! assert_eq!("NO".parse::<Vote>(), Ok(Vote::No));
//! ```

/// Implements Display and FromStr traits for keyword enums
///
/// - Display writes the mapped lowercase keyword
/// - FromStr parses case-insensitively and reports the enum name on failure
#[macro_export]
macro_rules! impl_domain_status_conversions {
    ($enum_name:ident { $($variant:ident => $str:expr),+ $(,)? }) => {
        impl std::fmt::Display for $enum_name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                match self {
                    $(Self::$variant => f.write_str($str),)+
                }
            }
        }

        impl std::str::FromStr for $enum_name {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.to_lowercase().as_str() {
                    $($str => Ok(Self::$variant),)+
                    _ => Err(format!("Invalid {}: {}", stringify!($enum_name), s)),
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Meal {
        Breakfast,
        Lunch,
    }

    impl_domain_status_conversions!(Meal {
        Breakfast => "breakfast",
        Lunch => "lunch",
    });

    #[test]
    fn displays_keyword() {
        assert_eq!(Meal::Breakfast.to_string(), "breakfast");
        assert_eq!(Meal::Lunch.to_string(), "lunch");
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(Meal::from_str("LUNCH").unwrap(), Meal::Lunch);
        assert_eq!(Meal::from_str("BreakFast").unwrap(), Meal::Breakfast);
    }

    #[test]
    fn rejects_unknown_keywords() {
        let result = Meal::from_str("dinner");
        assert!(result.unwrap_err().contains("Invalid Meal: dinner"));
        assert!(Meal::from_str("").is_err());
    }
}
