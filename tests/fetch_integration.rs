use std::sync::Arc;
use std::time::Duration;

use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ai_balance_client::auth::FixedNonce;
use ai_balance_client::client::BalanceFetcher;
use ai_balance_client::providers::ProviderKind;
use ai_balance_client::store::{self, MemoryStore};
use ai_balance_client::{BalanceState, providers};
use rust_decimal::Decimal;

const DEEPSEEK_KEY: &str = "sk-0123456789abcdef0123";
const OPENROUTER_KEY: &str = "sk-or-v1-0123456789abcdef";
const ALIYUN_CREDENTIALS: &str = r#"{"accessKeyId":"LTAI5tAbCdEfGhIjKlMn","accessKeySecret":"abcdefghijklmnopqrstuvwxyz0123","regionId":"cn-hangzhou"}"#;

fn build_fetcher(server: &MockServer) -> BalanceFetcher {
    BalanceFetcher::builder()
        .endpoint_override(
            ProviderKind::DeepSeek,
            format!("{}/user/balance", server.uri()),
        )
        .endpoint_override(
            ProviderKind::OpenRouter,
            format!("{}/api/v1/credits", server.uri()),
        )
        .endpoint_override(ProviderKind::Aliyun, format!("{}/", server.uri()))
        .nonce_provider(Arc::new(FixedNonce("1700000000000123456".to_string())))
        .build()
}

#[tokio::test]
async fn test_deepseek_balance() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "is_available": true,
        "balance_infos": [
            { "currency": "USD", "total_balance": "12.50", "granted_balance": "0.00" },
            { "currency": "CNY", "total_balance": "90.00" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/user/balance"))
        .and(header("authorization", format!("Bearer {DEEPSEEK_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = build_fetcher(&server);
    let record = fetcher
        .fetch(ProviderKind::DeepSeek.config(), &format!("  {DEEPSEEK_KEY}\n"))
        .await;

    assert_eq!(
        record.state(),
        BalanceState::Available {
            amount: "12.5".parse().unwrap(),
            currency: "$"
        }
    );
    assert_eq!(record.provider_id, "deepseek");
    assert_eq!(record.display_name, "DeepSeek API");
    assert!(record.retrieved_at.is_some());
}

#[tokio::test]
async fn test_deepseek_empty_balance_is_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/balance"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "is_available": false, "balance_infos": [] })),
        )
        .mount(&server)
        .await;

    let fetcher = build_fetcher(&server);
    let record = fetcher.fetch(ProviderKind::DeepSeek.config(), DEEPSEEK_KEY).await;

    assert_eq!(record.state(), BalanceState::NoData);
    assert!(record.error.is_none());
    assert!(record.retrieved_at.is_some());
}

#[tokio::test]
async fn test_openrouter_credits() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "data": { "total_credits": 20, "total_usage": 7.25 }
    });

    Mock::given(method("GET"))
        .and(path("/api/v1/credits"))
        .and(header("authorization", format!("Bearer {OPENROUTER_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let fetcher = build_fetcher(&server);
    let record = fetcher
        .fetch(ProviderKind::OpenRouter.config(), OPENROUTER_KEY)
        .await;

    let remaining: Decimal = "12.75".parse().unwrap();
    assert_eq!(record.amount, Some(remaining));
    assert_eq!(record.currency, "$");
    assert_eq!(record.limit, Some(Decimal::from(20)));
    assert_eq!(record.usage, Some("7.25".parse().unwrap()));
    assert_eq!(record.limit_remaining, Some(remaining));
    assert_eq!(record.is_free_tier, Some(false));
}

#[tokio::test]
async fn test_aliyun_signed_query() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "Code": "200",
        "Message": "Successful!",
        "RequestId": "5E2A8E49-29D5-4A6F-9C9A-6F1F3C2B7D10",
        "Success": true,
        "Data": {
            "AvailableAmount": "1234.56",
            "AvailableCashAmount": "1234.56",
            "Currency": "CNY"
        }
    });

    Mock::given(method("GET"))
        .and(path("/"))
        .and(query_param("Action", "QueryAccountBalance"))
        .and(query_param("Version", "2017-12-14"))
        .and(query_param("AccessKeyId", "LTAI5tAbCdEfGhIjKlMn"))
        .and(query_param("RegionId", "cn-hangzhou"))
        .and(query_param("SignatureMethod", "HMAC-SHA1"))
        .and(query_param("SignatureVersion", "1.0"))
        .and(query_param("SignatureNonce", "1700000000000123456"))
        .and(query_param("Format", "JSON"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = build_fetcher(&server);
    let record = fetcher
        .fetch(ProviderKind::Aliyun.config(), ALIYUN_CREDENTIALS)
        .await;

    assert_eq!(
        record.state(),
        BalanceState::Available {
            amount: "1234.56".parse().unwrap(),
            currency: "¥"
        }
    );
    assert!(record.retrieved_at.is_some());

    let requests = server.received_requests().await.unwrap();
    let signature = requests[0]
        .url
        .query_pairs()
        .find(|(key, _)| key == "Signature")
        .map(|(_, value)| value.into_owned())
        .unwrap();
    // Base64 of a 20-byte HMAC-SHA1 digest
    assert_eq!(signature.len(), 28);
    assert!(requests[0].url.query().unwrap().ends_with("%3D"));
}

#[tokio::test]
async fn test_aliyun_business_failure() {
    let server = MockServer::start().await;
    let response = serde_json::json!({
        "Code": "SignatureDoesNotMatch",
        "Message": "Specified signature is not matched with our calculation.",
        "Success": false
    });

    Mock::given(method("GET"))
        .and(query_param("Action", "QueryAccountBalance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(response))
        .mount(&server)
        .await;

    let fetcher = build_fetcher(&server);
    let record = fetcher
        .fetch(ProviderKind::Aliyun.config(), ALIYUN_CREDENTIALS)
        .await;

    assert_eq!(
        record.error.as_deref(),
        Some("Specified signature is not matched with our calculation.")
    );
    assert_eq!(record.amount_or_zero(), Decimal::ZERO);
    assert!(record.retrieved_at.is_none());
}

#[tokio::test]
async fn test_http_error_status() {
    let server = MockServer::start().await;
    let body = format!("{{\"error\":{{\"message\":\"{}\"}}}}", "a".repeat(100));

    Mock::given(method("GET"))
        .and(path("/user/balance"))
        .respond_with(ResponseTemplate::new(401).set_body_string(body.clone()))
        .mount(&server)
        .await;

    let fetcher = build_fetcher(&server);
    let record = fetcher.fetch(ProviderKind::DeepSeek.config(), DEEPSEEK_KEY).await;

    let snippet: String = body.chars().take(50).collect();
    assert_eq!(record.error, Some(format!("HTTP 401: {snippet}")));
    assert!(record.amount.is_none());
    assert!(record.retrieved_at.is_none());
}

#[tokio::test]
async fn test_server_error_makes_single_attempt() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/credits"))
        .respond_with(ResponseTemplate::new(500).set_body_string("Internal Server Error"))
        .expect(1)
        .mount(&server)
        .await;

    let fetcher = build_fetcher(&server);
    let record = fetcher
        .fetch(ProviderKind::OpenRouter.config(), OPENROUTER_KEY)
        .await;

    assert_eq!(
        record.error.as_deref(),
        Some("HTTP 500: Internal Server Error")
    );
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/balance"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "balance_infos": [] }))
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let fetcher = BalanceFetcher::builder()
        .endpoint_override(
            ProviderKind::DeepSeek,
            format!("{}/user/balance", server.uri()),
        )
        .timeout(Duration::from_secs(1))
        .build();
    let record = fetcher.fetch(ProviderKind::DeepSeek.config(), DEEPSEEK_KEY).await;

    assert_eq!(
        record.error.as_deref(),
        Some("Network error: request timed out after 1s")
    );
    assert!(record.retrieved_at.is_none());
}

#[tokio::test]
async fn test_connection_refused_is_network_error() {
    // Reserve a free port, then release it so nothing is listening there.
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let fetcher = BalanceFetcher::builder()
        .endpoint_override(
            ProviderKind::OpenRouter,
            format!("http://127.0.0.1:{port}/api/v1/credits"),
        )
        .build();
    let record = fetcher
        .fetch(ProviderKind::OpenRouter.config(), OPENROUTER_KEY)
        .await;

    let error = record.error.unwrap();
    assert!(error.starts_with("Network error"), "{error}");
    assert!(record.retrieved_at.is_none());
}

#[tokio::test]
async fn test_invalid_credential_sends_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let fetcher = build_fetcher(&server);

    let record = fetcher
        .fetch(ProviderKind::DeepSeek.config(), "pk-0123456789abcdef0123")
        .await;
    assert_eq!(
        record.error.as_deref(),
        Some("API key must start with \"sk-\"")
    );
    assert!(record.retrieved_at.is_none());

    let record = fetcher
        .fetch(
            ProviderKind::Aliyun.config(),
            r#"{"accessKeyId":"LTAI5tAbCdEfGhIjKlMn","accessKeySecret":"abcdefghijklmnopqrstuvwxyz0123","regionId":""}"#,
        )
        .await;
    assert_eq!(record.error.as_deref(), Some("Region must be selected"));
}

#[tokio::test]
async fn test_non_json_body_is_no_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
        .mount(&server)
        .await;

    let fetcher = build_fetcher(&server);
    let record = fetcher
        .fetch(ProviderKind::OpenRouter.config(), OPENROUTER_KEY)
        .await;

    assert_eq!(record.state(), BalanceState::NoData);
}

#[tokio::test]
async fn test_fetch_stored_credentials() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/balance"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "balance_infos": [{ "currency": "CNY", "total_balance": "3.00" }]
        })))
        .mount(&server)
        .await;

    let fetcher = build_fetcher(&server);
    let credentials = MemoryStore::new();

    for config in providers::all() {
        let record = fetcher.fetch_stored(&credentials, config).await;
        assert_eq!(
            record.error,
            Some(format!("No credential configured for {}", config.name))
        );
    }

    store::save_credential(&credentials, ProviderKind::DeepSeek.config(), DEEPSEEK_KEY).unwrap();
    let record = fetcher
        .fetch_stored(&credentials, ProviderKind::DeepSeek.config())
        .await;
    assert_eq!(
        record.state(),
        BalanceState::Available {
            amount: Decimal::from(3),
            currency: "¥"
        }
    );
}

#[tokio::test]
async fn test_fetch_by_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/v1/credits"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": { "total_credits": 5, "total_usage": 0, "limit_remaining": 4 }
        })))
        .mount(&server)
        .await;

    let fetcher = build_fetcher(&server);

    let record = fetcher.fetch_by_id("openrouter", OPENROUTER_KEY).await.unwrap();
    assert_eq!(record.amount, Some(Decimal::from(4)));

    let result = fetcher.fetch_by_id("anthropic", OPENROUTER_KEY).await;
    assert!(result.is_err());
}
