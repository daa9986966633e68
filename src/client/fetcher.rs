//! Balance fetcher implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use reqwest::Method;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderValue};
use serde_json::Value;
use time::OffsetDateTime;
use tracing::{debug, instrument, warn};

use crate::auth::{self, Credential, NonceProvider, TimestampNonce, sign_request, sign_request_at};
use crate::client::transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
use crate::error::{BalanceError, TransportError, ValidationError};
use crate::providers::endpoints::aliyun;
use crate::providers::{self, ProviderConfig, ProviderKind, parser};
use crate::store::CredentialStore;
use crate::types::BalanceRecord;

/// Bound on a single balance query.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// How much of a non-2xx body ends up in the error message.
const ERROR_SNIPPET_CHARS: usize = 50;

/// Queries one provider's balance per call.
///
/// `fetch` never fails: every failure is described by the `error` field of
/// the returned [`BalanceRecord`].
///
/// # Example
///
/// ```rust,no_run
/// use ai_balance_client::client::BalanceFetcher;
/// use ai_balance_client::providers::ProviderKind;
/// use std::time::Duration;
///
/// #[tokio::main]
/// async fn main() {
///     let fetcher = BalanceFetcher::builder()
///         .timeout(Duration::from_secs(10))
///         .build();
///
///     let record = fetcher
///         .fetch(ProviderKind::OpenRouter.config(), "sk-or-v1-...")
///         .await;
///     match record.error {
///         Some(error) => eprintln!("{error}"),
///         None => println!("{:?} {}", record.amount, record.currency),
///     }
/// }
/// ```
#[derive(Clone)]
pub struct BalanceFetcher<T = ReqwestTransport> {
    transport: T,
    timeout: Duration,
    endpoint_overrides: HashMap<ProviderKind, String>,
    nonce_provider: Arc<dyn NonceProvider>,
}

impl BalanceFetcher<ReqwestTransport> {
    /// Create a fetcher with default settings.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a new fetcher builder.
    pub fn builder() -> BalanceFetcherBuilder<ReqwestTransport> {
        BalanceFetcherBuilder::new()
    }
}

impl Default for BalanceFetcher<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for BalanceFetcher<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BalanceFetcher")
            .field("timeout", &self.timeout)
            .field("endpoint_overrides", &self.endpoint_overrides)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> BalanceFetcher<T> {
    /// Query the balance of one provider.
    #[instrument(skip_all, fields(provider = config.id))]
    pub async fn fetch(&self, config: &ProviderConfig, raw_credential: &str) -> BalanceRecord {
        match self.try_fetch(config, raw_credential).await {
            Ok(record) => record,
            Err(error) => {
                warn!(%error, "Balance query failed");
                BalanceRecord::failed(config, error)
            }
        }
    }

    /// Query the balance of a provider by catalog id.
    ///
    /// An unknown id is a configuration error and the only `Err` this returns.
    pub async fn fetch_by_id(&self, id: &str, raw_credential: &str) -> crate::Result<BalanceRecord> {
        let config = providers::lookup(id).ok_or_else(|| BalanceError::UnknownProvider(id.to_string()))?;
        Ok(self.fetch(config, raw_credential).await)
    }

    /// Query the balance using the credential kept in `store`.
    pub async fn fetch_stored<S>(&self, store: &S, config: &ProviderConfig) -> BalanceRecord
    where
        S: CredentialStore + ?Sized,
    {
        match store.get(config.storage_key) {
            Some(raw) => self.fetch(config, &raw).await,
            None => BalanceRecord::failed(
                config,
                BalanceError::MissingCredential {
                    provider: config.name.to_string(),
                },
            ),
        }
    }

    async fn try_fetch(&self, config: &ProviderConfig, raw_credential: &str) -> crate::Result<BalanceRecord> {
        let credential = auth::decode(config, raw_credential)?;
        let request = self.build_request(config, &credential)?;

        debug!(method = %request.method, "Sending balance request");
        let response = self.execute(request).await?;

        if !response.status.is_success() {
            return Err(BalanceError::Http {
                status: response.status.as_u16(),
                snippet: response.body.chars().take(ERROR_SNIPPET_CHARS).collect(),
            });
        }

        let record = match serde_json::from_str::<Value>(&response.body) {
            Ok(body) => parser::parse(config, &body).unwrap_or_else(|| {
                debug!("Response carried no balance data");
                BalanceRecord::no_data(config)
            }),
            Err(e) => {
                warn!(error = %e, "Response body is not JSON");
                BalanceRecord::no_data(config)
            }
        };

        Ok(record.retrieved(OffsetDateTime::now_utc()))
    }

    fn build_request(&self, config: &ProviderConfig, credential: &Credential) -> crate::Result<HttpRequest> {
        let override_endpoint = self.endpoint_overrides.get(&config.kind).map(String::as_str);

        let (url, headers) = match credential {
            Credential::Bearer(token) => {
                let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
                    .map_err(|_| {
                        ValidationError::MalformedCredential("API key contains invalid characters".to_string())
                    })?;
                authorization.set_sensitive(true);

                let mut headers = HeaderMap::new();
                headers.insert(AUTHORIZATION, authorization);
                headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

                (override_endpoint.unwrap_or(config.endpoint).to_string(), headers)
            }
            Credential::Signed(signed) => {
                let nonce = self.nonce_provider.next_nonce();
                let now = OffsetDateTime::now_utc();
                let request = match override_endpoint {
                    Some(endpoint) => sign_request_at(endpoint, signed, aliyun::ACTION, &nonce, now)?,
                    None => sign_request(signed, aliyun::ACTION, &nonce, now)?,
                };
                (request.url, request.headers)
            }
        };

        Ok(HttpRequest {
            method: Method::GET,
            url,
            headers,
            timeout: self.timeout,
        })
    }

    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse, TransportError> {
        let timeout = request.timeout;
        // Bound the call even if the transport ignores its own timeout.
        match tokio::time::timeout(timeout, self.transport.send(request)).await {
            Ok(result) => result,
            Err(_) => Err(TransportError::Timeout { after: timeout }),
        }
    }
}

/// Builder for [`BalanceFetcher`].
pub struct BalanceFetcherBuilder<T = ReqwestTransport> {
    transport: T,
    timeout: Duration,
    endpoint_overrides: HashMap<ProviderKind, String>,
    nonce_provider: Option<Arc<dyn NonceProvider>>,
}

impl BalanceFetcherBuilder<ReqwestTransport> {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self {
            transport: ReqwestTransport::new(),
            timeout: DEFAULT_TIMEOUT,
            endpoint_overrides: HashMap::new(),
            nonce_provider: None,
        }
    }

    /// Set a custom user agent.
    pub fn user_agent(mut self, user_agent: impl AsRef<str>) -> Self {
        self.transport = ReqwestTransport::with_user_agent(user_agent.as_ref());
        self
    }
}

impl Default for BalanceFetcherBuilder<ReqwestTransport> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Transport> BalanceFetcherBuilder<T> {
    /// Replace the HTTP transport.
    pub fn transport<U: Transport>(self, transport: U) -> BalanceFetcherBuilder<U> {
        BalanceFetcherBuilder {
            transport,
            timeout: self.timeout,
            endpoint_overrides: self.endpoint_overrides,
            nonce_provider: self.nonce_provider,
        }
    }

    /// Set the bound on a single query.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Send a provider's requests somewhere else (useful for testing with a mock server).
    ///
    /// For bearer providers this is the full balance URL. For Aliyun it is the
    /// base URL the signed query string is appended to, and it wins over the
    /// region endpoint.
    pub fn endpoint_override(mut self, kind: ProviderKind, url: impl Into<String>) -> Self {
        self.endpoint_overrides.insert(kind, url.into());
        self
    }

    /// Set a custom nonce provider.
    pub fn nonce_provider(mut self, provider: Arc<dyn NonceProvider>) -> Self {
        self.nonce_provider = Some(provider);
        self
    }

    /// Build the fetcher.
    pub fn build(self) -> BalanceFetcher<T> {
        let nonce_provider = self
            .nonce_provider
            .unwrap_or_else(|| Arc::new(TimestampNonce::new()));

        BalanceFetcher {
            transport: self.transport,
            timeout: self.timeout,
            endpoint_overrides: self.endpoint_overrides,
            nonce_provider,
        }
    }
}
