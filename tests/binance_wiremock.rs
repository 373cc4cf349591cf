use crypto_tally::adapters::exchange::binance_use_cases::BinanceUseCases;
use crypto_tally::config::ExchangeCredentials;
use crypto_tally::{ExchangeUseCases, ExchangeUseCasesError};
use serde_json::json;
use wiremock::matchers::{header, method, path, query_param_contains};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn credentials() -> ExchangeCredentials {
    ExchangeCredentials {
        api_key: "binance-key".into(),
        secret_key: "binance-secret".into(),
    }
}

fn account(balances: serde_json::Value) -> serde_json::Value {
    json!({
        "makerCommission": 10,
        "takerCommission": 10,
        "buyerCommission": 0,
        "sellerCommission": 0,
        "canTrade": true,
        "canWithdraw": true,
        "canDeposit": true,
        "accountType": "SPOT",
        "balances": balances,
        "permissions": ["SPOT"],
        "updateTime": 1700000000000_i64
    })
}

#[tokio::test]
async fn free_and_locked_amounts_are_added_up() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .and(header("x-mbx-apikey", "binance-key"))
        .and(query_param_contains("signature", ""))
        .respond_with(ResponseTemplate::new(200).set_body_json(account(json!([
            { "asset": "BTC", "free": "0.50000000", "locked": "0.25000000" },
            { "asset": "BNB", "free": "0.00000000", "locked": "3.00000000" },
            { "asset": "ETH", "free": "0.00000000", "locked": "0.00000000" }
        ]))))
        .expect(1)
        .mount(&server)
        .await;

    let exchange = BinanceUseCases::with_base_url("Binance", credentials(), server.uri());
    let balances = exchange.fetch_balances().await.unwrap();

    assert_eq!(exchange.exchange_name(), "Binance");
    assert_eq!(balances.get("BTC"), Some(&0.75));
    assert_eq!(balances.get("BNB"), Some(&3.0));
    assert!(!balances.contains_key("ETH"));
    assert_eq!(balances.len(), 2);
}

#[tokio::test]
async fn rejected_credentials_are_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let exchange = BinanceUseCases::with_base_url("Binance", credentials(), server.uri());
    let report = exchange.fetch_balances().await.unwrap_err();

    assert!(matches!(
        report.current_context(),
        ExchangeUseCasesError::FetchBalancesError(name) if name == "Binance"
    ));
}

#[tokio::test]
async fn server_error_is_a_fetch_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/v3/account"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let exchange = BinanceUseCases::with_base_url("Binance", credentials(), server.uri());

    assert!(exchange.fetch_balances().await.is_err());
}
