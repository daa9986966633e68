//! Balance query client.
//!
//! [`BalanceFetcher`] turns a provider config and a raw credential into a
//! [`BalanceRecord`](crate::types::BalanceRecord). The HTTP layer behind it
//! is pluggable through [`Transport`].

mod fetcher;
mod transport;

pub use fetcher::{BalanceFetcher, BalanceFetcherBuilder, DEFAULT_TIMEOUT};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport, default_user_agent};
