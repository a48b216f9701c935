use crate::support::GatewayTestServer;
use reentry::config::GatewayConfig;
use reentry::form::FormData;
use reentry::generation::{
    DocumentGenerator, GenerationFuture, GenerationOrchestrator, NarrativeItem, NarrativeType,
    ResponseLetter,
};
use reqwest::StatusCode;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;

/// Narratives hang far past any deadline; the letter answers at once.
struct StalledNarratives;

impl DocumentGenerator for StalledNarratives {
    fn name(&self) -> &str {
        "stalled"
    }

    fn generate_narrative<'a>(
        &'a self,
        narrative_type: NarrativeType,
        _form: &'a FormData,
    ) -> GenerationFuture<'a, NarrativeItem> {
        Box::pin(async move {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(NarrativeItem::new(narrative_type, "late"))
        })
    }

    fn generate_letter<'a>(&'a self, _form: &'a FormData) -> GenerationFuture<'a, ResponseLetter> {
        Box::pin(async move { Ok(ResponseLetter::new("Dear Northwind")) })
    }
}

fn form_data() -> Value {
    json!({
        "offenses": [{"id": "o1", "type": "Theft", "description": "2016 shoplifting", "programs": []}],
        "releaseMonth": "April",
        "releaseYear": "2018",
        "programs": ["GED"],
        "skills": ["Forklift"],
        "jobTitle": "Warehouse Associate",
        "employerName": "Northwind"
    })
}

#[tokio::test]
async fn health_is_ok() {
    let server = GatewayTestServer::start().await;
    let body: Value = reqwest::get(server.url("/health"))
        .await
        .expect("health request should complete")
        .json()
        .await
        .expect("health should be json");
    assert_eq!(body["status"], "ok");
    assert_eq!(body["generator"], "template");
}

#[tokio::test]
async fn generate_documents_returns_both_artifacts() {
    let server = GatewayTestServer::start().await;
    let response = reqwest::Client::new()
        .post(server.url("/api/generate-documents"))
        .json(&json!({"selection": "both", "formData": form_data()}))
        .send()
        .await
        .expect("generate request should complete");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("result should be json");
    assert_eq!(body["status"], "success");
    assert_eq!(body["narratives"].as_array().map(Vec::len), Some(5));
    assert_eq!(body["narratives"][0]["type"], "justice_involvement");
    assert!(
        body["responseLetter"]["content"]
            .as_str()
            .is_some_and(|letter| letter.contains("Northwind"))
    );
    assert_eq!(body["errors"], json!([]));
}

#[tokio::test]
async fn narrative_only_selection_omits_letter() {
    let server = GatewayTestServer::start().await;
    let body: Value = reqwest::Client::new()
        .post(server.url("/api/generate-documents"))
        .json(&json!({"selection": "narrative", "formData": form_data()}))
        .send()
        .await
        .expect("generate request should complete")
        .json()
        .await
        .expect("result should be json");
    assert_eq!(body["status"], "success");
    assert!(body["responseLetter"].is_null());
}

#[tokio::test]
async fn malformed_and_incomplete_bodies_are_400() {
    let server = GatewayTestServer::start().await;
    let client = reqwest::Client::new();

    let not_json = client
        .post(server.url("/api/generate-documents"))
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("request should complete");
    assert_eq!(not_json.status(), StatusCode::BAD_REQUEST);

    let bad_selection = client
        .post(server.url("/api/generate-documents"))
        .json(&json!({"selection": "everything", "formData": form_data()}))
        .send()
        .await
        .expect("request should complete");
    assert_eq!(bad_selection.status(), StatusCode::BAD_REQUEST);

    let missing_form = client
        .post(server.url("/api/regenerate-letter"))
        .json(&json!({}))
        .send()
        .await
        .expect("request should complete");
    assert_eq!(missing_form.status(), StatusCode::BAD_REQUEST);
    let body: Value = missing_form.json().await.expect("error should be json");
    assert_eq!(body["error"], "formData is required");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let server = GatewayTestServer::start().await;
    let huge = "x".repeat(70_000);
    let response = reqwest::Client::new()
        .post(server.url("/api/regenerate-letter"))
        .json(&json!({"formData": {"additionalContext": huge}}))
        .send()
        .await
        .expect("request should complete");
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

#[tokio::test]
async fn regenerate_narrative_returns_requested_type() {
    let server = GatewayTestServer::start().await;
    let body: Value = reqwest::Client::new()
        .post(server.url("/api/regenerate-narrative"))
        .json(&json!({"narrativeType": "future_goals", "formData": form_data()}))
        .send()
        .await
        .expect("request should complete")
        .json()
        .await
        .expect("response should be json");
    assert_eq!(body["narrative"]["type"], "future_goals");
    assert_eq!(body["narrative"]["title"], "Future Goals");
}

#[tokio::test]
async fn stalled_narratives_still_return_the_letter() {
    let orchestrator = GenerationOrchestrator::new(Arc::new(StalledNarratives))
        .with_artifact_timeout(Duration::from_millis(300));
    let gateway = GatewayConfig {
        request_timeout_secs: 5,
        ..GatewayConfig::default()
    };
    let server = GatewayTestServer::start_with(orchestrator, gateway).await;

    let response = reqwest::Client::new()
        .post(server.url("/api/generate-documents"))
        .json(&json!({"selection": "both", "formData": {}}))
        .send()
        .await
        .expect("generate request should complete");
    assert_eq!(response.status(), StatusCode::OK);

    let body: Value = response.json().await.expect("result should be json");
    assert_eq!(body["status"], "partial_fail");
    assert_eq!(body["responseLetter"]["content"], "Dear Northwind");
    assert_eq!(body["errors"][0]["documentType"], "narrative");
    assert_eq!(body["errors"][0]["detail"], "generation timed out");
}
