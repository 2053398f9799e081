//! Request facade tests: authenticated calls, error mapping and public RPC.

use std::sync::Once;

use chrono::{Duration, Utc};
use rust_decimal_macros::dec;
use tracing_subscriber::EnvFilter;
use wiremock::matchers::{any, body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use axiomtrade_rs::prelude::*;

static INIT: Once = Once::new();

/// Initialize logging for tests
fn init_logging() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init()
            .ok();
    });
}

fn config_for(server: &MockServer) -> ClientConfig {
    ClientConfig::default().with_endpoints(Endpoints::single(server.uri()))
}

fn token_client(server: &MockServer) -> AxiomClient {
    AxiomClient::from_tokens("a0", "r0", config_for(server)).unwrap()
}

// ============================================================================
// AUTHENTICATED REQUESTS
// ============================================================================

mod authenticated_tests {
    use super::*;

    #[tokio::test]
    async fn test_trending_sends_cookie_and_period() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/meme-trending"))
            .and(query_param("timePeriod", "24h"))
            .and(header("cookie", "auth-access-token=a0; auth-refresh-token=r0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!([{ "symbol": "BONK" }])),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = token_client(&server);
        let trending = client.trending().get(TimePeriod::OneDay).await.unwrap();
        assert_eq!(trending[0]["symbol"], "BONK");
    }

    #[tokio::test]
    async fn test_expired_tokens_refresh_before_request() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("set-cookie", "auth-access-token=a1; Path=/"),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/portfolio"))
            .and(header("cookie", "auth-access-token=a1; auth-refresh-token=r0"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "totalValue": 12.5 })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let config = config_for(&server);
        let session = SessionManager::builder()
            .token_set(TokenSet::new(
                "a0",
                "r0",
                Utc::now() - Duration::seconds(3500),
                Duration::seconds(3600),
            ))
            .config(config.clone())
            .build()
            .unwrap();
        let client = AxiomClient::with_session(session, config).unwrap();

        let portfolio = client.portfolio().get().await.unwrap();
        assert_eq!(portfolio["totalValue"], 12.5);
    }

    #[tokio::test]
    async fn test_login_then_request() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(
                ResponseTemplate::new(200)
                    .append_header("set-cookie", "auth-access-token=a1; Path=/")
                    .append_header("set-cookie", "auth-refresh-token=r1; Path=/"),
            )
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/token/Mint111"))
            .and(header("cookie", "auth-access-token=a1; auth-refresh-token=r1"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({ "name": "Mint" })),
            )
            .expect(1)
            .mount(&server)
            .await;

        let client = AxiomClient::login_with_config("trader@example.com", "pw", config_for(&server))
            .await
            .unwrap();
        assert!(client.is_authenticated().await);

        let info = client.tokens().info(&TokenAddress::new("Mint111")).await.unwrap();
        assert_eq!(info["name"], "Mint");
    }

    #[tokio::test]
    async fn test_failed_login_is_an_error() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/login"))
            .respond_with(ResponseTemplate::new(403))
            .expect(1)
            .mount(&server)
            .await;

        let err = AxiomClient::login_with_config("trader@example.com", "pw", config_for(&server))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Authentication(_)));
    }

    #[tokio::test]
    async fn test_no_session_fails_before_sending() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = AxiomClient::with_config(config_for(&server)).unwrap();
        let err = client.trending().get(TimePeriod::OneHour).await.unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_logout_then_request_fails() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(any())
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let client = token_client(&server);
        client.logout().await;

        let err = client.portfolio().get().await.unwrap_err();
        assert!(matches!(err, Error::NotAuthenticated));
    }
}

// ============================================================================
// UPSTREAM ERRORS
// ============================================================================

mod error_mapping_tests {
    use super::*;

    #[tokio::test]
    async fn test_upstream_401_is_unauthorized() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portfolio"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let err = token_client(&server).portfolio().get().await.unwrap_err();
        assert!(matches!(err, Error::Unauthorized { status: 401 }));
        assert!(err.is_auth_error());
    }

    #[tokio::test]
    async fn test_upstream_500_is_not_an_auth_error() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/portfolio"))
            .respond_with(
                ResponseTemplate::new(500)
                    .set_body_json(serde_json::json!({ "message": "upstream down" })),
            )
            .mount(&server)
            .await;

        let err = token_client(&server).portfolio().get().await.unwrap_err();
        match &err {
            Error::Api { status, message, .. } => {
                assert_eq!(*status, 500);
                assert_eq!(message, "upstream down");
            }
            other => panic!("unexpected error: {:?}", other),
        }
        assert!(!err.is_auth_error());
        assert!(err.is_server_error());
    }

    #[tokio::test]
    async fn test_upstream_404_is_not_found() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/token/Nope"))
            .respond_with(
                ResponseTemplate::new(404).set_body_json(serde_json::json!({ "error": "unknown token" })),
            )
            .mount(&server)
            .await;

        let err = token_client(&server)
            .tokens()
            .info(&TokenAddress::new("Nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(ref m) if m == "unknown token"));
    }

    #[tokio::test]
    async fn test_rate_limit_reads_retry_after() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/meme-trending"))
            .respond_with(ResponseTemplate::new(429).append_header("retry-after", "7"))
            .mount(&server)
            .await;

        let err = token_client(&server)
            .trending()
            .get(TimePeriod::OneWeek)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::RateLimited { retry_after_secs: 7 }));
        assert!(err.is_retryable());
    }
}

// ============================================================================
// BALANCES
// ============================================================================

mod balance_tests {
    use super::*;

    const WALLET: &str = "BJBgjyDZx5FSsyJf6bFKVXuJV7DZY9PCSMSi5d9tcEVh";

    #[tokio::test]
    async fn test_balance_over_rpc_without_session() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({
                "method": "getBalance",
                "params": [WALLET, { "commitment": "confirmed" }],
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "result": { "context": { "slot": 1 }, "value": 1_500_000_000u64 },
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AxiomClient::with_config(config_for(&server)).unwrap();
        let balance = client.balances().get(&WalletAddress::new(WALLET)).await.unwrap();

        assert_eq!(balance.lamports, 1_500_000_000);
        assert_eq!(balance.sol, dec!(1.5));
    }

    #[tokio::test]
    async fn test_rpc_error_is_reported() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "error": { "code": -32602, "message": "Invalid param" },
            })))
            .mount(&server)
            .await;

        let client = AxiomClient::with_config(config_for(&server)).unwrap();
        let err = client
            .balances()
            .get(&WalletAddress::new("bad"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api { ref message, .. } if message.contains("Invalid param")));
    }

    #[tokio::test]
    async fn test_batch_keeps_order() {
        init_logging();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "params": ["w1"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": { "value": 1_000_000_000u64 },
            })))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_partial_json(serde_json::json!({ "params": ["w2"] })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "result": { "value": 250_000_000u64 },
            })))
            .mount(&server)
            .await;

        let client = AxiomClient::with_config(config_for(&server)).unwrap();
        let wallets = [WalletAddress::new("w1"), WalletAddress::new("w2")];
        let balances = client.balances().get_batch(&wallets).await;

        assert_eq!(balances.len(), 2);
        assert_eq!(balances[0].as_ref().unwrap().sol, dec!(1));
        assert_eq!(balances[1].as_ref().unwrap().sol, dec!(0.25));
    }
}
