mod support;

use dis_engine::domain::PduKind;
use serde_json::Value;

#[tokio::test]
async fn when_health_is_requested_then_status_is_ok() {
    let server = support::ensure_status_server();

    let res = reqwest::get(format!("{}/health", server.base_url))
        .await
        .expect("request should succeed");

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.expect("json body");
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn when_counters_change_then_stats_reflect_them() {
    let server = support::ensure_status_server();
    server.counters.record_received(PduKind::Designator);
    server.counters.record_unsupported(201);

    let res = reqwest::get(format!("{}/stats", server.base_url))
        .await
        .expect("request should succeed");

    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let body: Value = res.json().await.expect("json body");
    assert_eq!(body["mode"], "listen");
    assert!(body["received"][PduKind::Designator.name()].as_u64() >= Some(1));
    assert_eq!(body["unsupported"]["201"], 1);
    assert!(body["sent"].as_object().is_some_and(|m| m.len() == PduKind::COUNT));
}
