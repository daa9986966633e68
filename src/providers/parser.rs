//! Response normalization, one function per provider.
//!
//! Parsers never fail. A body with no usable balance yields `None`, which the
//! fetcher turns into a "no data" record. The Aliyun parser is the exception:
//! its protocol reports business failures in-band, so it always returns a
//! record, carrying an `error` when the provider said no.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{ApiError, BalanceError};
use crate::providers::types::{
    AliyunBalanceData, AliyunBalanceResponse, DeepSeekBalanceInfo, DeepSeekBalanceResponse,
    OpenRouterCredits, OpenRouterCreditsResponse,
};
use crate::providers::{ProviderConfig, ProviderKind};
use crate::types::{BalanceRecord, currency_symbol};

/// Response code Aliyun uses for success.
const ALIYUN_SUCCESS_CODE: &str = "200";

/// Normalize a provider's JSON body into a balance record.
pub fn parse(config: &ProviderConfig, body: &Value) -> Option<BalanceRecord> {
    match config.kind {
        ProviderKind::DeepSeek => parse_deepseek(config, body),
        ProviderKind::OpenRouter => parse_openrouter(config, body),
        ProviderKind::Aliyun => Some(parse_aliyun(config, body)),
    }
}

/// DeepSeek: the first entry of `balance_infos`.
pub fn parse_deepseek(config: &ProviderConfig, body: &Value) -> Option<BalanceRecord> {
    let response = DeepSeekBalanceResponse::deserialize(body).ok()?;
    let first = response.balance_infos?.into_iter().next()?;
    let info = decode_object::<DeepSeekBalanceInfo>(first)?;
    let amount = info.total_balance?;
    let currency = info.currency.as_deref().unwrap_or(config.default_currency);

    debug!(%amount, currency, "Parsed DeepSeek balance");
    Some(BalanceRecord::available(config, amount, currency_symbol(currency)))
}

/// OpenRouter: remaining credits under the account limit.
///
/// When `limit_remaining` is missing it is derived as `total_credits -
/// total_usage`, clamped at zero so an overdrawn account never shows a
/// negative balance.
pub fn parse_openrouter(config: &ProviderConfig, body: &Value) -> Option<BalanceRecord> {
    let data = OpenRouterCreditsResponse::deserialize(body).ok()?.data?;
    let credits = decode_object::<OpenRouterCredits>(data)?;

    let limit = credits.total_credits.unwrap_or(Decimal::ZERO);
    let usage = credits.total_usage.unwrap_or(Decimal::ZERO);
    let remaining = credits
        .limit_remaining
        .unwrap_or_else(|| (limit - usage).max(Decimal::ZERO));

    debug!(%limit, %usage, %remaining, "Parsed OpenRouter credits");

    let mut record = BalanceRecord::available(config, remaining, currency_symbol("USD"));
    record.limit = Some(limit);
    record.usage = Some(usage);
    record.limit_remaining = Some(remaining);
    record.is_free_tier = Some(credits.is_free_tier.unwrap_or(false));
    Some(record)
}

/// Aliyun: `Data.AvailableAmount`, or the provider's failure message.
pub fn parse_aliyun(config: &ProviderConfig, body: &Value) -> BalanceRecord {
    // A body that is not even an object is treated like an empty failure.
    let response = AliyunBalanceResponse::deserialize(body).unwrap_or_default();

    let failure = if response.success != Some(true) {
        let message = response
            .message
            .unwrap_or_else(|| "Aliyun API request failed".to_string());
        Some(ApiError::new(response.code, message))
    } else if response.code.as_deref() != Some(ALIYUN_SUCCESS_CODE) {
        Some(ApiError::from_aliyun(response.code.as_deref(), response.message.as_deref()))
    } else {
        None
    };

    if let Some(error) = failure {
        if error.is_invalid_signature() {
            warn!(code = ?error.code, "Aliyun rejected the request signature");
        } else if error.is_invalid_key() {
            warn!(code = ?error.code, "Aliyun does not recognize the access key");
        } else if error.is_throttled() {
            warn!(code = ?error.code, "Aliyun throttled the balance query");
        } else {
            debug!(code = ?error.code, "Aliyun reported failure");
        }
        return BalanceRecord::failed(config, BalanceError::ProviderApi(error));
    }

    let Some(data) = response.data.and_then(decode_object::<AliyunBalanceData>) else {
        return BalanceRecord::failed(config, "Aliyun API returned no balance data");
    };

    let amount = data.available_amount.unwrap_or(Decimal::ZERO);
    let currency = data.currency.as_deref().unwrap_or(config.default_currency);

    debug!(%amount, currency, "Parsed Aliyun balance");
    BalanceRecord::available(config, amount, currency_symbol(currency))
}

/// Decode a nested JSON object, `None` for any other shape.
fn decode_object<T: DeserializeOwned>(value: Value) -> Option<T> {
    if !value.is_object() {
        return None;
    }
    T::deserialize(value).ok()
}
