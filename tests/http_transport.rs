mod common;

use std::sync::Arc;
use std::time::Duration;

use backtest_client::backtesting::{JobOrchestrator, JobRun, RunState};
use backtest_client::error::{OrchestratorError, TransportError};
use backtest_client::models::JobStatus;
use backtest_client::transport::{Credentials, HttpTransport, JobTransport};

use common::{sample_config, test_settings};

fn transport(url: &str, token: Option<&str>) -> HttpTransport {
    HttpTransport::with_base_url(
        url,
        token.and_then(Credentials::from_token),
        Duration::from_secs(5),
    )
    .unwrap()
}

#[tokio::test]
async fn submit_posts_config_with_bearer_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/backtest/run")
        .match_header("authorization", "Bearer test-token")
        .match_body(mockito::Matcher::PartialJsonString(
            r#"{"strategyId":"momentum_power","initialCapital":10000000.0,"benchmark":"KOSPI"}"#
                .to_string(),
        ))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(r#"{"backtestId":"bt-7"}"#)
        .create_async()
        .await;

    let t = transport(&server.url(), Some("test-token"));
    let id = t.submit(&sample_config()).await.unwrap();

    assert_eq!(id, "bt-7");
    mock.assert_async().await;
}

#[tokio::test]
async fn anonymous_without_token() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/backtest/run")
        .match_header("authorization", mockito::Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"backtestId":"bt-8"}"#)
        .create_async()
        .await;

    let t = transport(&server.url(), None);
    assert_eq!(t.submit(&sample_config()).await.unwrap(), "bt-8");
    mock.assert_async().await;
}

#[tokio::test]
async fn service_unavailable_is_classified() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/backtest/run")
        .with_status(503)
        .with_body("upstream down")
        .create_async()
        .await;

    let t = transport(&server.url(), None);
    let err = t.submit(&sample_config()).await.unwrap_err();

    assert!(err.is_unavailable());
    match err {
        TransportError::Status { status, message } => {
            assert_eq!(status, 503);
            assert_eq!(message, "upstream down");
        }
        other => panic!("unexpected error: {}", other),
    }
}

#[tokio::test]
async fn bad_request_is_not_unavailable() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("POST", "/backtest/run")
        .with_status(422)
        .with_body(r#"{"error":"unknown strategy"}"#)
        .create_async()
        .await;

    let t = transport(&server.url(), None);
    let err = t.submit(&sample_config()).await.unwrap_err();
    assert!(!err.is_unavailable());
}

#[tokio::test]
async fn connection_refused_is_unreachable() {
    let t = transport("http://127.0.0.1:1", None);
    let err = t.submit(&sample_config()).await.unwrap_err();
    assert!(matches!(err, TransportError::Unreachable(_)));
    assert!(err.is_unavailable());
}

#[tokio::test]
async fn malformed_base_url_is_rejected_not_degraded() {
    let t = transport("localhost:3000/api", None);
    let err = t.submit(&sample_config()).await.unwrap_err();
    assert!(matches!(err, TransportError::Client(_)), "{}", err);
    assert!(!err.is_unavailable());

    let orch = JobOrchestrator::new(
        Arc::new(transport("localhost:3000/api", None)),
        test_settings(),
    );
    let mut run = JobRun::new();
    let err = orch.submit(&mut run, sample_config()).await.unwrap_err();
    assert!(matches!(
        err,
        OrchestratorError::SubmitRejected(TransportError::Client(_))
    ));
    assert_eq!(run.state(), RunState::Failed);
}

#[tokio::test]
async fn status_snapshot_is_parsed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/backtest/bt-7")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            r#"{
                "id": "bt-7",
                "status": "COMPLETED",
                "equityCurve": [
                    {"date": "2023-01-02", "value": 10000000.0, "benchmarks": {"KOSPI": 2500.0}},
                    {"date": "2023-01-09", "value": 10250000.0, "benchmarks": {"KOSPI": 2510.0}}
                ],
                "trades": [
                    {"date": "2023-01-03", "ticker": "005930", "side": "BUY",
                     "quantity": 10.0, "price": 60000.0, "amount": 600000.0}
                ]
            }"#,
        )
        .create_async()
        .await;

    let t = transport(&server.url(), None);
    let snap = t.fetch_status("bt-7").await.unwrap();

    assert_eq!(snap.status, JobStatus::Completed);
    let curve = snap.equity_curve.unwrap();
    assert_eq!(curve.len(), 2);
    assert_eq!(curve[1].benchmark("KOSPI"), Some(2510.0));
    assert_eq!(snap.trades.unwrap().len(), 1);
}

#[tokio::test]
async fn garbage_body_is_a_decode_error() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/backtest/bt-7")
        .with_status(200)
        .with_body("<html>oops</html>")
        .create_async()
        .await;

    let t = transport(&server.url(), None);
    let err = t.fetch_status("bt-7").await.unwrap_err();
    assert!(matches!(err, TransportError::Decode(_)));
    assert!(!err.is_unavailable());
}

#[tokio::test]
async fn enhanced_report_is_parsed() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/backtest/bt-7/enhanced")
        .with_status(200)
        .with_body(
            r#"{
                "gradedMetrics": [{"key": "cagr", "value": 18.2, "grade": "A"}],
                "overallGrade": "B",
                "glossary": [{"term": "MDD", "description": "Largest peak-to-trough decline"}]
            }"#,
        )
        .create_async()
        .await;

    let t = transport(&format!("{}/", server.url()), None);
    let report = t.fetch_enhanced("bt-7").await.unwrap();

    assert_eq!(report.overall_grade.as_deref(), Some("B"));
    assert_eq!(report.graded_metrics[0].key, "cagr");
    assert_eq!(report.glossary.len(), 1);
}
