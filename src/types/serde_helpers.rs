//! Custom serde helpers for loosely typed provider responses.
//!
//! Providers disagree on whether an amount is a JSON number or a decimal
//! string, and some occasionally send a field with the wrong type altogether.
//! These helpers keep deserialization from failing on such fields.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use tracing::warn;

/// Deserialize to `None` instead of failing on invalid/unexpected data.
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use ai_balance_client::types::serde_helpers::default_on_error;
///
/// #[derive(Deserialize, Debug)]
/// struct Response {
///     #[serde(deserialize_with = "default_on_error::deserialize", default)]
///     success: Option<bool>,
/// }
///
/// let response: Response = serde_json::from_str(r#"{"success":"yes"}"#).unwrap();
/// assert!(response.success.is_none());
/// ```
pub mod default_on_error {
    use super::*;

    /// Deserialize a value, returning None if deserialization fails.
    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: Deserialize<'de>,
        D: Deserializer<'de>,
    {
        // Buffer first so a type mismatch cannot leave the outer map half-read.
        let value = Value::deserialize(deserializer)?;
        Ok(T::deserialize(value).ok())
    }
}

/// Helper for amounts sent either as a JSON number or as a decimal string.
///
/// A present but unparseable value becomes zero; an absent or `null` value
/// stays `None`, so callers can still tell "missing" from "garbage".
///
/// # Example
///
/// ```rust
/// use serde::Deserialize;
/// use rust_decimal::Decimal;
/// use ai_balance_client::types::serde_helpers::lenient_decimal;
///
/// #[derive(Deserialize, Debug)]
/// struct Balance {
///     #[serde(deserialize_with = "lenient_decimal::deserialize", default)]
///     total: Option<Decimal>,
/// }
///
/// let balance: Balance = serde_json::from_str(r#"{"total":"12.50"}"#).unwrap();
/// assert_eq!(balance.total, Some(Decimal::new(1250, 2)));
///
/// let balance: Balance = serde_json::from_str(r#"{"total":"n/a"}"#).unwrap();
/// assert_eq!(balance.total, Some(Decimal::ZERO));
/// ```
pub mod lenient_decimal {
    use super::*;

    /// Deserialize a number or decimal string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.map(|v| coerce(&v)))
    }

    /// Coerce any JSON value to a decimal, zero when it does not hold one.
    pub fn coerce(value: &Value) -> Decimal {
        match value {
            Value::Number(n) => parse(&n.to_string()),
            Value::String(s) => parse(s),
            _ => Decimal::ZERO,
        }
    }

    /// Locale-free decimal parse with scientific notation support.
    ///
    /// Anything that is not a decimal, including values beyond the range of
    /// [`Decimal`] such as `1e40`, reads as zero and is logged at `warn`.
    pub fn parse(s: &str) -> Decimal {
        let s = s.trim();
        match Decimal::from_str(s).or_else(|_| Decimal::from_scientific(s)) {
            Ok(value) => value,
            Err(e) => {
                warn!(value = s, error = %e, "Unparseable amount, reading it as zero");
                Decimal::ZERO
            }
        }
    }
}

/// Helper for empty strings that should be deserialized as None.
pub mod empty_string_as_none {
    use super::*;

    /// Deserialize a string, returning None if empty or not a string.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = default_on_error::deserialize::<String, D>(deserializer)?;
        Ok(s.filter(|s| !s.is_empty()))
    }
}
