//! Example: Query one provider's balance.
//!
//! Run with: cargo run --example check_balance -- deepseek
//!
//! The credential is read from the upper-cased storage key, e.g.
//! `DEEPSEEK_API_KEY`, `OPENROUTER_API_KEY` or `ALIYUN_API_CREDENTIALS`
//! (the latter holds the JSON form `{"accessKeyId":..,"accessKeySecret":..,"regionId":..}`).

use ai_balance_client::BalanceState;
use ai_balance_client::client::BalanceFetcher;
use ai_balance_client::providers;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let _ = dotenv::dotenv();

    let id = std::env::args().nth(1).unwrap_or_else(|| "deepseek".to_string());
    let config = providers::lookup(&id).ok_or_else(|| {
        let known: Vec<_> = providers::all().iter().map(|p| p.id).collect();
        format!("unknown provider {id:?}, expected one of {known:?}")
    })?;

    let variable = config.storage_key.to_uppercase();
    let Ok(credential) = std::env::var(&variable) else {
        println!("Set {variable} to query {}.", config.display_name);
        return Ok(());
    };

    let fetcher = BalanceFetcher::new();
    let record = fetcher.fetch(config, &credential).await;

    match record.state() {
        BalanceState::Available { amount, currency } => {
            println!("{}: {currency}{amount}", config.display_name);
        }
        BalanceState::NoData => println!("{}: no balance data", config.display_name),
        BalanceState::Failed(error) => println!("{}: {error}", config.display_name),
    }

    if let (Some(usage), Some(limit)) = (record.usage, record.limit) {
        println!("  used {usage} of {limit}");
    }
    if let Some(at) = record.retrieved_at {
        println!("  retrieved at {at}");
    }

    Ok(())
}
