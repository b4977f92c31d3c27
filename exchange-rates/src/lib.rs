//! Currency Codes and Pairs with Macro-Based Generation
//!
//! This library defines the set of currencies the rate tracker understands.
//! Currencies are declared once in the `define_currencies!` invocation, which
//! generates the `CurrencyCode` enum together with its labels, symbols and
//! parsing.
//!
//! # Adding a New Currency
//! Simply add a line to the `define_currencies!` macro invocation:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     JPY => ("JPY", "¥", "Japanese yen"),
//! }
//! ```
//!
//! # Example
//! ```
//! use exchange_rates::{CurrencyCode, CurrencyPair};
//!
//! let pair = CurrencyPair::new(CurrencyCode::USD, CurrencyCode::BRL).unwrap();
//! assert_eq!(pair.to_string(), "USD/BRL");
//! assert_eq!(pair.target().symbol(), "R$");
//! ```

use std::fmt;
use std::str::FromStr;

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines the CurrencyCode enum and its metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Macro to define currencies with auto-generated code, symbol and name lookups.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     CurrencyName => ("CODE", "SYMBOL", "display name"),
/// }
/// ```
#[macro_export]
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $symbol:literal, $display:literal)
        ),* $(,)?
    ) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "UPPERCASE")]
        pub enum CurrencyCode {
            $($name),*
        }

        impl CurrencyCode {
            pub fn code(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $code),*
                }
            }

            pub fn symbol(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $symbol),*
                }
            }

            pub fn display_name(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $display),*
                }
            }

            pub fn all() -> &'static [CurrencyCode] {
                &[$(CurrencyCode::$name),*]
            }
        }

        impl std::fmt::Display for CurrencyCode {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl std::str::FromStr for CurrencyCode {
            type Err = CurrencyError;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($code => Ok(CurrencyCode::$name),)*
                    _ => Err(CurrencyError::Unknown(s.to_string())),
                }
            }
        }
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurrencyError {
    #[error("Unknown currency: {0}")]
    Unknown(String),

    #[error("Currency pair needs two different currencies, got {0}/{0}")]
    SameCurrency(CurrencyCode),

    #[error("Malformed currency pair: {0}")]
    MalformedPair(String),
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS - Add new currencies here!
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    USD => ("USD", "$", "US dollar"),
    BRL => ("BRL", "R$", "Brazilian real"),
    EUR => ("EUR", "€", "Euro"),
    GBP => ("GBP", "£", "Pound sterling"),
    INR => ("INR", "₹", "Indian rupee"),
}

// ─────────────────────────────────────────────────────────────────────────────
// Currency Pair
// ─────────────────────────────────────────────────────────────────────────────

/// An ordered (base, target) pair of distinct currencies.
///
/// The base currency is the one the upstream API quotes against; the target is
/// the currency whose value in base units is tracked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CurrencyPair {
    base: CurrencyCode,
    target: CurrencyCode,
}

impl CurrencyPair {
    pub fn new(base: CurrencyCode, target: CurrencyCode) -> Result<Self, CurrencyError> {
        if base == target {
            return Err(CurrencyError::SameCurrency(base));
        }
        Ok(Self { base, target })
    }

    pub fn base(&self) -> CurrencyCode {
        self.base
    }

    pub fn target(&self) -> CurrencyCode {
        self.target
    }

    /// Comma-separated codes in (base, target) order, as query parameters expect.
    pub fn codes(&self) -> String {
        format!("{},{}", self.base.code(), self.target.code())
    }
}

impl Default for CurrencyPair {
    fn default() -> Self {
        Self {
            base: CurrencyCode::USD,
            target: CurrencyCode::BRL,
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.target)
    }
}

impl FromStr for CurrencyPair {
    type Err = CurrencyError;

    /// Parses `"USD/BRL"` (also accepts `-` or `,` as separator).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(['/', '-', ',']);
        match (parts.next(), parts.next(), parts.next()) {
            (Some(base), Some(target), None) => Self::new(base.parse()?, target.parse()?),
            _ => Err(CurrencyError::MalformedPair(s.to_string())),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_currency_code_parse() {
        assert_eq!("USD".parse::<CurrencyCode>().unwrap(), CurrencyCode::USD);
        assert_eq!("brl".parse::<CurrencyCode>().unwrap(), CurrencyCode::BRL);
        assert_eq!(
            "XYZ".parse::<CurrencyCode>(),
            Err(CurrencyError::Unknown("XYZ".into()))
        );
    }

    #[test]
    fn test_currency_code_display() {
        assert_eq!(CurrencyCode::USD.to_string(), "USD");
        assert_eq!(CurrencyCode::BRL.symbol(), "R$");
    }

    #[test]
    fn test_currency_code_all() {
        let all = CurrencyCode::all();
        assert_eq!(all.len(), 5);
        assert!(all.contains(&CurrencyCode::BRL));
    }

    #[test]
    fn test_pair_rejects_same_currency() {
        let err = CurrencyPair::new(CurrencyCode::EUR, CurrencyCode::EUR).unwrap_err();
        assert_eq!(err, CurrencyError::SameCurrency(CurrencyCode::EUR));
    }

    #[test]
    fn test_pair_parse() {
        let pair: CurrencyPair = "usd/brl".parse().unwrap();
        assert_eq!(pair.base(), CurrencyCode::USD);
        assert_eq!(pair.target(), CurrencyCode::BRL);
        assert_eq!(pair.codes(), "USD,BRL");

        assert!("USD".parse::<CurrencyPair>().is_err());
        assert!("USD/BRL/EUR".parse::<CurrencyPair>().is_err());
    }

    #[test]
    fn test_default_pair_is_usd_brl() {
        assert_eq!(CurrencyPair::default().to_string(), "USD/BRL");
    }
}
