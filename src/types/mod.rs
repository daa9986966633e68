//! Shared types for the balance client.

pub mod currency;
pub mod serde_helpers;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::providers::ProviderConfig;

pub use currency::currency_symbol;

/// The unified result of one balance query.
///
/// A record is in exactly one of three states, see [`BalanceRecord::state`]:
/// it either carries an `error`, an `amount`, or neither ("no data"). Error
/// records never carry an amount, and only records that reached the provider
/// successfully have `retrieved_at` set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    /// Catalog id of the provider
    pub provider_id: String,
    /// Display name of the provider
    pub display_name: String,
    /// Available balance in provider currency units
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<Decimal>,
    /// Currency display symbol (or raw code when unmapped)
    pub currency: String,
    /// Credit limit, for providers that report one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<Decimal>,
    /// Credits used so far
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub usage: Option<Decimal>,
    /// Credits left under the limit
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit_remaining: Option<Decimal>,
    /// Whether the account is on a free tier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_free_tier: Option<bool>,
    /// User-facing failure description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// When the provider last answered successfully
    #[serde(default, with = "time::serde::rfc3339::option")]
    pub retrieved_at: Option<OffsetDateTime>,
}

/// Borrowed view of the state a [`BalanceRecord`] is in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum BalanceState<'a> {
    /// The query failed; the message is meant for the user.
    Failed(&'a str),
    /// The provider reported a balance.
    Available {
        /// Available amount
        amount: Decimal,
        /// Currency display symbol
        currency: &'a str,
    },
    /// The provider answered but had nothing to report.
    NoData,
}

impl BalanceRecord {
    fn base(config: &ProviderConfig) -> Self {
        Self {
            provider_id: config.id.to_string(),
            display_name: config.display_name.to_string(),
            amount: None,
            currency: currency_symbol(config.default_currency).to_string(),
            limit: None,
            usage: None,
            limit_remaining: None,
            is_free_tier: None,
            error: None,
            retrieved_at: None,
        }
    }

    /// A record holding an available balance.
    pub fn available(config: &ProviderConfig, amount: Decimal, currency: impl Into<String>) -> Self {
        Self {
            amount: Some(amount),
            currency: currency.into(),
            ..Self::base(config)
        }
    }

    /// A record describing a failed query.
    pub fn failed(config: &ProviderConfig, error: impl ToString) -> Self {
        Self {
            error: Some(error.to_string()),
            ..Self::base(config)
        }
    }

    /// A record for a provider that answered without usable balance data.
    pub fn no_data(config: &ProviderConfig) -> Self {
        Self::base(config)
    }

    /// Stamp the retrieval time. Error records are left unstamped.
    pub fn retrieved(mut self, at: OffsetDateTime) -> Self {
        if self.error.is_none() {
            self.retrieved_at = Some(at);
        }
        self
    }

    /// The state this record is in.
    pub fn state(&self) -> BalanceState<'_> {
        match (&self.error, self.amount) {
            (Some(error), _) => BalanceState::Failed(error),
            (None, Some(amount)) => BalanceState::Available {
                amount,
                currency: &self.currency,
            },
            (None, None) => BalanceState::NoData,
        }
    }

    /// Whether the query failed.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// The amount, reading as zero for error and no-data records.
    pub fn amount_or_zero(&self) -> Decimal {
        self.amount.unwrap_or(Decimal::ZERO)
    }
}
