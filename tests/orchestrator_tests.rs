//! Fetch-cycle tests: fixture mode, per-source failure isolation, and the
//! everything-failed error path, using an in-process upstream.

use axum::Router;
use axum::response::Json;
use axum::routing::get;
use chrono::Utc;
use peakboard::config::{Config, SourceUrls};
use peakboard::fetch::BasicClient;
use peakboard::orchestrator::fetch_all;
use peakboard::season;
use serde_json::{Value, json};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;

fn test_config(sources: SourceUrls, use_fixtures: bool) -> Config {
    Config {
        port: 0,
        static_dir: "dist".into(),
        upstream_origin: "http://127.0.0.1:0".to_string(),
        sources,
        bearer_token: None,
        fetch_timeout: Duration::from_secs(5),
        use_fixtures,
        poll_interval: Duration::from_secs(300),
    }
}

async fn spawn(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    addr
}

async fn dead_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/gone")
}

/// Upstream whose sales payloads carry the fiscal-year labels the
/// orchestrator derives from today's date.
fn upstream_router() -> Router {
    let today = Utc::now().date_naive();
    let current = season::current_label(today);
    let previous = season::previous_label(today);

    let sales = json!({"data": [
        {"Fiscal_Year": current, "Revenue": 1500.0, "Quantity": 30},
        {"Fiscal_Year": previous, "Revenue": 1200.0, "Quantity": 24}
    ]});
    let labor = json!([
        {"Division": "Lift Operations", "Total_Labor": 500.0, "Total_Hours": 20.0, "Revenue": 2500.0}
    ]);
    let satisfaction = json!({"data": [{"Yesterday_Score": 8.2}]});

    let sales_payload = sales.clone();
    let labor_payload = labor.clone();
    let satisfaction_payload = satisfaction.clone();

    Router::new()
        .route(
            "/sales",
            get(move || {
                let payload = sales_payload.clone();
                async move { Json::<Value>(payload) }
            }),
        )
        .route(
            "/labor",
            get(move || {
                let payload = labor_payload.clone();
                async move { Json::<Value>(payload) }
            }),
        )
        .route(
            "/satisfaction",
            get(move || {
                let payload = satisfaction_payload.clone();
                async move { Json::<Value>(payload) }
            }),
        )
}

#[tokio::test]
async fn fixture_mode_builds_a_complete_snapshot() {
    let config = test_config(Default::default(), true);
    let client = BasicClient::with_timeout(config.fetch_timeout).unwrap();

    let snapshot = fetch_all(&client, &config).await.unwrap();

    assert!(snapshot.sales.ticket_sales.is_some());
    assert!(snapshot.sales.season_pass_sales.is_some());
    assert!(snapshot.labor.is_some());
    assert!(snapshot.satisfaction.is_some());
}

#[tokio::test]
async fn one_failed_source_leaves_siblings_populated() {
    let upstream = spawn(upstream_router()).await;
    let sources = SourceUrls {
        ticket_sales: Some(dead_url().await),
        season_pass_sales: Some(format!("http://{upstream}/sales")),
        labor: Some(format!("http://{upstream}/labor")),
        satisfaction: Some(format!("http://{upstream}/satisfaction")),
    };
    let config = test_config(sources, false);
    let client = BasicClient::with_timeout(config.fetch_timeout).unwrap();

    let snapshot = fetch_all(&client, &config).await.unwrap();

    assert!(snapshot.sales.ticket_sales.is_none());

    let pass = snapshot.sales.season_pass_sales.expect("season pass sales");
    assert_eq!(pass.revenue_comparison.percent_change, 25.0);
    assert_eq!(pass.quantity_comparison.absolute_change, 6.0);

    let labor = snapshot.labor.expect("labor");
    assert_eq!(labor.total_labor, 500.0);

    let satisfaction = snapshot.satisfaction.expect("satisfaction");
    assert_eq!(satisfaction.yesterday_score, 8.2);
}

#[tokio::test]
async fn all_failed_sources_error_the_cycle() {
    let sources = SourceUrls {
        ticket_sales: Some(dead_url().await),
        season_pass_sales: Some(dead_url().await),
        labor: Some(dead_url().await),
        satisfaction: Some(dead_url().await),
    };
    let config = test_config(sources, false);
    let client = BasicClient::with_timeout(config.fetch_timeout).unwrap();

    let err = fetch_all(&client, &config).await.unwrap_err();
    assert!(err.to_string().contains("every upstream source failed"));
}

#[tokio::test]
async fn missing_source_url_is_a_configuration_error() {
    let config = test_config(Default::default(), false);
    let client = BasicClient::with_timeout(config.fetch_timeout).unwrap();

    let err = fetch_all(&client, &config).await.unwrap_err();
    assert!(err.to_string().contains("TICKET_SALES_URL"));
}
