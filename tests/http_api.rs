// tests/http_api.rs

mod common;

use std::sync::Arc;
use std::time::Duration;

use distcalc::agent::{AgentPool, HttpTaskSource};
use distcalc::config::ConfigFile;
use distcalc::engine::{Orchestrator, RuntimeOptions};
use distcalc::server::dto::{
    CalculateResponse, ErrorBody, ExpressionResponse, ExpressionsResponse, TaskEnvelope,
};
use distcalc::types::{ExpressionId, ExpressionStatus, Operation};
use reqwest::{Client, StatusCode};
use serde_json::json;
use tokio::net::TcpListener;

use crate::common::{builders::ConfigFileBuilder, init_tracing, with_timeout};

async fn start(cfg: &ConfigFile, run_agents: bool) -> Orchestrator {
    init_tracing();
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    Orchestrator::start_on(
        listener,
        cfg,
        RuntimeOptions {
            run_agents,
            computing_power: None,
        },
    )
    .await
    .unwrap()
}

async fn submit(client: &Client, base: &str, expression: &str) -> reqwest::Response {
    client
        .post(format!("{base}/api/v1/calculate"))
        .json(&json!({ "expression": expression }))
        .send()
        .await
        .unwrap()
}

async fn fetch(client: &Client, base: &str, id: ExpressionId) -> ExpressionResponse {
    client
        .get(format!("{base}/api/v1/expressions/{id}"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

async fn wait_for_terminal(client: &Client, base: &str, id: ExpressionId) -> ExpressionResponse {
    loop {
        let body = fetch(client, base, id).await;
        if body.expression.status.is_terminal() {
            return body;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

#[tokio::test]
async fn calculate_then_poll_until_completed() {
    let cfg = ConfigFileBuilder::new().with_uniform_timing(5).build();
    let orchestrator = start(&cfg, true).await;
    let base = orchestrator.base_url();
    let client = Client::new();

    let response = submit(&client, &base, "2+3*4").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let CalculateResponse { id } = response.json().await.unwrap();

    let body = with_timeout(wait_for_terminal(&client, &base, id)).await;
    assert_eq!(body.expression.id, id);
    assert_eq!(body.expression.raw_text, "2+3*4");
    assert_eq!(body.expression.status, ExpressionStatus::Completed);
    assert_eq!(body.expression.result, Some(14.0));

    orchestrator.shutdown().await.unwrap();
}

#[tokio::test]
async fn five_concurrent_expressions_all_complete() {
    let cfg = ConfigFileBuilder::new()
        .with_uniform_timing(2)
        .with_computing_power(3)
        .build();
    let orchestrator = start(&cfg, true).await;
    let base = orchestrator.base_url();
    let client = Client::new();

    let cases = [
        ("2+3*4", 14.0),
        ("10/2+5", 10.0),
        ("8-3+2*4", 13.0),
        ("9*2-3/3", 17.0),
        ("(1+2)*(3+4)", 21.0),
    ];

    let mut ids = Vec::new();
    for (text, _) in cases {
        let response = submit(&client, &base, text).await;
        assert_eq!(response.status(), StatusCode::CREATED);
        let CalculateResponse { id } = response.json().await.unwrap();
        ids.push(id);
    }

    for (id, (text, expected)) in ids.iter().zip(cases) {
        let body = with_timeout(wait_for_terminal(&client, &base, *id)).await;
        assert_eq!(body.expression.result, Some(expected), "{text}");
    }

    let list: ExpressionsResponse = client
        .get(format!("{base}/api/v1/expressions"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let listed: Vec<ExpressionId> = list.expressions.iter().map(|e| e.id).collect();
    assert_eq!(listed, ids);
    assert!(
        list.expressions
            .iter()
            .all(|e| e.status == ExpressionStatus::Completed)
    );

    orchestrator.shutdown().await.unwrap();
}

#[tokio::test]
async fn oversized_expression_is_422() {
    let cfg = ConfigFileBuilder::new().build();
    let orchestrator = start(&cfg, false).await;
    let base = orchestrator.base_url();
    let client = Client::new();

    let sum = format!("{}1", "1+".repeat(100_000));
    let response = submit(&client, &base, &sum).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(body.error.contains("operations"));

    let nest = format!("{}1{}", "(".repeat(10_000), ")".repeat(10_000));
    let response = submit(&client, &base, &nest).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // The server is still healthy afterwards.
    let response = submit(&client, &base, "2+2").await;
    assert_eq!(response.status(), StatusCode::CREATED);

    orchestrator.shutdown().await.unwrap();
}

#[tokio::test]
async fn malformed_expression_is_422_but_still_listed() {
    let cfg = ConfigFileBuilder::new().build();
    let orchestrator = start(&cfg, false).await;
    let base = orchestrator.base_url();
    let client = Client::new();

    let response = submit(&client, &base, "2+*3").await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(body.error.contains("position 2"));
    let id = body.id.unwrap();

    let stored = fetch(&client, &base, id).await;
    assert_eq!(stored.expression.status, ExpressionStatus::Error);
    assert!(stored.expression.error_detail.is_some());

    // No task was created for it.
    let poll = client
        .get(format!("{base}/internal/task"))
        .send()
        .await
        .unwrap();
    assert_eq!(poll.status(), StatusCode::NOT_FOUND);

    orchestrator.shutdown().await.unwrap();
}

#[tokio::test]
async fn bad_requests_are_400_and_unknown_ids_404() {
    let cfg = ConfigFileBuilder::new().build();
    let orchestrator = start(&cfg, false).await;
    let base = orchestrator.base_url();
    let client = Client::new();

    let response = client
        .post(format!("{base}/api/v1/calculate"))
        .header("content-type", "application/json")
        .body("{\"expr\": 1}")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{base}/api/v1/expressions/abc"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .get(format!("{base}/api/v1/expressions/77"))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body: ErrorBody = response.json().await.unwrap();
    assert!(body.error.contains("77"));

    orchestrator.shutdown().await.unwrap();
}

#[tokio::test]
async fn internal_task_protocol_by_hand() {
    let cfg = ConfigFileBuilder::new().with_uniform_timing(7).build();
    let orchestrator = start(&cfg, false).await;
    let base = orchestrator.base_url();
    let client = Client::new();
    let task_url = format!("{base}/internal/task");

    let response = submit(&client, &base, "6/3").await;
    let CalculateResponse { id } = response.json().await.unwrap();

    let response = client.get(&task_url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let TaskEnvelope { task } = response.json().await.unwrap();
    assert_eq!(task.operation, Operation::Divide);
    assert_eq!((task.arg1, task.arg2), (6.0, 3.0));
    assert_eq!(task.operation_time, 7);

    // Nothing else is ready while the only task is out.
    let response = client.get(&task_url).send().await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Neither result nor error.
    let response = client
        .post(&task_url)
        .json(&json!({ "id": task.id }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    // Not JSON at all.
    let response = client
        .post(&task_url)
        .header("content-type", "application/json")
        .body("not json")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = client
        .post(&task_url)
        .json(&json!({ "id": task.id, "result": 2.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Duplicate report.
    let response = client
        .post(&task_url)
        .json(&json!({ "id": task.id, "result": 5.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CONFLICT);

    // Unknown task.
    let response = client
        .post(&task_url)
        .json(&json!({ "id": 9999, "result": 1.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let stored = fetch(&client, &base, id).await;
    assert_eq!(stored.expression.status, ExpressionStatus::Completed);
    assert_eq!(stored.expression.result, Some(2.0));

    orchestrator.shutdown().await.unwrap();
}

#[tokio::test]
async fn worker_reported_error_fails_the_expression() {
    let cfg = ConfigFileBuilder::new().build();
    let orchestrator = start(&cfg, false).await;
    let base = orchestrator.base_url();
    let client = Client::new();
    let task_url = format!("{base}/internal/task");

    let CalculateResponse { id } = submit(&client, &base, "1/0+1")
        .await
        .json()
        .await
        .unwrap();

    let TaskEnvelope { task } = client
        .get(&task_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let response = client
        .post(&task_url)
        .json(&json!({ "id": task.id, "error": "division by zero" }))
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let stored = fetch(&client, &base, id).await;
    assert_eq!(stored.expression.status, ExpressionStatus::Error);
    assert_eq!(
        stored.expression.error_detail.as_deref(),
        Some("division by zero")
    );

    let value = serde_json::to_value(&stored.expression).unwrap();
    assert_eq!(value["status"], "error");
    assert_eq!(value["result"], serde_json::Value::Null);

    orchestrator.shutdown().await.unwrap();
}

#[tokio::test]
async fn remote_agents_compute_over_http() {
    let cfg = ConfigFileBuilder::new().with_uniform_timing(1).build();
    let orchestrator = start(&cfg, false).await;
    let base = orchestrator.base_url();
    let client = Client::new();

    let pool = AgentPool::spawn(
        Arc::new(HttpTaskSource::new(&base)),
        2,
        Duration::from_millis(5),
    );

    let CalculateResponse { id } = submit(&client, &base, "(7-2)*(8/4)+1")
        .await
        .json()
        .await
        .unwrap();

    let body = with_timeout(wait_for_terminal(&client, &base, id)).await;
    assert_eq!(body.expression.result, Some(11.0));

    pool.shutdown().await;
    orchestrator.shutdown().await.unwrap();
}

#[tokio::test]
async fn expired_lease_is_picked_up_by_the_sweeper() {
    let cfg = ConfigFileBuilder::new()
        .with_uniform_timing(0)
        .with_lease(50, 10)
        .build();
    let orchestrator = start(&cfg, false).await;
    let base = orchestrator.base_url();
    let client = Client::new();
    let task_url = format!("{base}/internal/task");

    submit(&client, &base, "4*4").await;

    let TaskEnvelope { task: first } = client
        .get(&task_url)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();

    // The first worker vanishes; the task comes back after the lease.
    let again = with_timeout(async {
        loop {
            let response = client.get(&task_url).send().await.unwrap();
            if response.status() == StatusCode::OK {
                let TaskEnvelope { task } = response.json().await.unwrap();
                return task;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await;
    assert_eq!(again.id, first.id);

    orchestrator.shutdown().await.unwrap();
}
