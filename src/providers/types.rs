//! Wire types for provider balance responses.
//!
//! Every field is optional. Presence checks happen in the parser, so a
//! response with an unexpected shape still deserializes as far as it can.
//! Nested objects are kept as raw [`Value`]s and decoded one at a time, so a
//! malformed sibling never takes a usable entry down with it.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;

use crate::types::serde_helpers::{default_on_error, empty_string_as_none, lenient_decimal};

/// DeepSeek `GET /user/balance` response.
#[derive(Debug, Clone, Deserialize)]
pub struct DeepSeekBalanceResponse {
    /// One entry per currency, decoded as [`DeepSeekBalanceInfo`]
    #[serde(default)]
    pub balance_infos: Option<Vec<Value>>,
}

/// A single DeepSeek balance entry.
#[derive(Debug, Clone, Deserialize)]
pub struct DeepSeekBalanceInfo {
    /// Total balance, number or decimal string
    #[serde(deserialize_with = "lenient_decimal::deserialize", default)]
    pub total_balance: Option<Decimal>,
    /// Currency code
    #[serde(deserialize_with = "empty_string_as_none::deserialize", default)]
    pub currency: Option<String>,
}

/// OpenRouter `GET /api/v1/credits` response.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenRouterCreditsResponse {
    /// Decoded as [`OpenRouterCredits`]
    #[serde(default)]
    pub data: Option<Value>,
}

/// OpenRouter credit figures.
#[derive(Debug, Clone, Deserialize)]
pub struct OpenRouterCredits {
    #[serde(deserialize_with = "lenient_decimal::deserialize", default)]
    pub total_credits: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal::deserialize", default)]
    pub total_usage: Option<Decimal>,
    #[serde(deserialize_with = "lenient_decimal::deserialize", default)]
    pub limit_remaining: Option<Decimal>,
    #[serde(deserialize_with = "default_on_error::deserialize", default)]
    pub is_free_tier: Option<bool>,
}

/// Aliyun `QueryAccountBalance` response.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AliyunBalanceResponse {
    #[serde(deserialize_with = "default_on_error::deserialize", default)]
    pub success: Option<bool>,
    #[serde(deserialize_with = "empty_string_as_none::deserialize", default)]
    pub code: Option<String>,
    #[serde(deserialize_with = "empty_string_as_none::deserialize", default)]
    pub message: Option<String>,
    /// Decoded as [`AliyunBalanceData`]
    #[serde(default)]
    pub data: Option<Value>,
}

/// Aliyun balance figures.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct AliyunBalanceData {
    /// Available amount as a decimal string
    #[serde(deserialize_with = "lenient_decimal::deserialize", default)]
    pub available_amount: Option<Decimal>,
    #[serde(deserialize_with = "empty_string_as_none::deserialize", default)]
    pub currency: Option<String>,
}
