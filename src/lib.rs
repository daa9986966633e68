//! # AI Balance Client
//!
//! An async Rust client for querying account balances from AI-service providers
//! that share nothing but the idea of a balance.
//!
//! ## Features
//!
//! - Bearer-token providers (DeepSeek, OpenRouter)
//! - HMAC-SHA1 signed requests for Aliyun's BSS OpenAPI
//! - One normalized [`BalanceRecord`] for every provider
//! - Every failure captured in the record instead of an `Err`
//! - Financial precision with `rust_decimal`
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use ai_balance_client::client::BalanceFetcher;
//! use ai_balance_client::providers;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let fetcher = BalanceFetcher::new();
//!     let deepseek = providers::lookup("deepseek").ok_or("unknown provider")?;
//!     let record = fetcher.fetch(deepseek, "sk-0123456789abcdef0123").await;
//!     println!("{:?}", record.state());
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod client;
pub mod error;
pub mod providers;
pub mod store;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{BalanceError, TransportError, ValidationError};
pub use providers::{AuthKind, ProviderConfig, ProviderKind};
pub use types::{BalanceRecord, BalanceState};

/// Result type alias using BalanceError
pub type Result<T> = std::result::Result<T, BalanceError>;
