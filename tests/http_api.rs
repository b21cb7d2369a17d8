use std::sync::Arc;

use axum::{
  body::{to_bytes, Body},
  http::{Request, StatusCode},
  Router,
};
use serde_json::{json, Value};
use tower::ServiceExt; // for Router::oneshot

use exam_backend::assembly::EngineSettings;
use exam_backend::routes::build_router;
use exam_backend::seeds::{seed_questions, seed_subjects};
use exam_backend::state::AppState;
use exam_backend::subjects::SubjectCatalog;

fn app() -> Router {
  let engine = EngineSettings { seed: Some(2024), ..EngineSettings::default() };
  let state = AppState::from_parts(engine, SubjectCatalog::new(seed_subjects()), seed_questions());
  build_router(Arc::new(state))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(v) => builder.header("content-type", "application/json").body(Body::from(v.to_string())).unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let v = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, v)
}

fn math_rule() -> Value {
  json!({
    "id": 7,
    "title": "函数单元测验",
    "totalScore": 100,
    "durationMinutes": 45,
    "subjectId": 1,
    "questionTypeDistribution": {"SINGLE_CHOICE": 8, "FILL_BLANK": 4, "SHORT_ANSWER": 2},
    "difficultyDistribution": {"EASY": 0.3, "MEDIUM": 0.5, "HARD": 0.2}
  })
}

#[tokio::test]
async fn health_and_catalog() {
  let app = app();
  let (status, v) = send(&app, "GET", "/api/v1/health", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(v["ok"], true);
  assert_eq!(v["subjects"], 3);

  let (status, v) = send(&app, "GET", "/api/v1/subjects", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(v["subjects"].as_array().unwrap().len(), 3);
  assert_eq!(v["subjects"][0]["name"], "数学");

  let (status, v) = send(&app, "GET", "/api/v1/questions/inventory", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(v["total"], seed_questions().len());
  assert_eq!(v["rows"][0]["type"], "SINGLE_CHOICE");
  assert_eq!(v["rows"][0]["subjectName"], "数学");
}

#[tokio::test]
async fn validate_reports_errors_and_defaults() {
  let app = app();
  let (status, v) = send(&app, "POST", "/api/v1/rules/validate", Some(json!({"title": "Quiz", "totalScore": 20, "durationMinutes": 10}))).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(v["valid"], true);
  assert_eq!(v["rule"]["questionTypeDistribution"]["SINGLE_CHOICE"], 10);
  assert_eq!(v["rule"]["difficultyDistribution"]["MEDIUM"], 0.5);

  let mut bad = math_rule();
  bad["difficultyDistribution"] = json!({"EASY": 0.3, "MEDIUM": 0.4, "HARD": 0.2});
  let (status, v) = send(&app, "POST", "/api/v1/rules/validate", Some(bad)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(v["valid"], false);
  assert!(v["errors"][0].as_str().unwrap().contains("sum to 1.0"));
}

#[tokio::test]
async fn preview_does_not_persist() {
  let app = app();
  let (status, v) = send(&app, "POST", "/api/v1/papers/preview", Some(math_rule())).await;
  assert_eq!(status, StatusCode::OK, "{v}");
  assert!(v["paper"]["id"].is_null());
  assert_eq!(v["paper"]["generationType"], "AUTO");
  assert_eq!(v["paper"]["ruleId"], 7);
  let scores: u64 = v["paper"]["questions"].as_array().unwrap().iter().map(|q| q["score"].as_u64().unwrap()).sum();
  assert_eq!(scores, 100);
  assert_eq!(v["fitness"]["subjectRelevance"], 1.0);
}

#[tokio::test]
async fn create_then_fetch_paper() {
  let app = app();
  let (status, created) = send(&app, "POST", "/api/v1/papers", Some(math_rule())).await;
  assert_eq!(status, StatusCode::CREATED, "{created}");
  let id = created["paper"]["id"].as_str().unwrap().to_string();

  let (status, stored) = send(&app, "GET", &format!("/api/v1/papers/{id}"), None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stored["paper"]["id"], id.as_str());
  assert_eq!(stored["rows"], created["paper"]["questions"]);
  assert_eq!(stored["rows"][0]["order"], 1);
}

#[tokio::test]
async fn undecodable_rules_get_structured_validation_errors() {
  let app = app();

  let mut negative = math_rule();
  negative["totalScore"] = json!(-5);
  for uri in ["/api/v1/papers/preview", "/api/v1/papers", "/api/v1/rules/validate"] {
    let (status, v) = send(&app, "POST", uri, Some(negative.clone())).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
    assert_eq!(v["error"], "validation");
    let details = v["details"].as_array().unwrap();
    assert_eq!(details.len(), 1);
    assert!(details[0].as_str().unwrap().contains("totalScore"), "{v}");
  }

  let mut wrong_type = math_rule();
  wrong_type["questionTypeDistribution"] = json!("lots");
  let (status, v) = send(&app, "POST", "/api/v1/papers/preview", Some(wrong_type)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(v["error"], "validation");
}

#[tokio::test]
async fn oversized_type_counts_are_rejected() {
  let app = app();
  let mut huge = math_rule();
  huge["questionTypeDistribution"] = json!({"SINGLE_CHOICE": 3_000_000_000u32, "FILL_BLANK": 3_000_000_000u32});
  let (status, v) = send(&app, "POST", "/api/v1/papers", Some(huge)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(v["error"], "validation");
  assert!(v["details"][0].as_str().unwrap().contains("too many questions"), "{v}");
}

#[tokio::test]
async fn engine_errors_map_to_status_codes() {
  let app = app();

  let mut invalid = math_rule();
  invalid["title"] = json!("  ");
  invalid["durationMinutes"] = json!(0);
  let (status, v) = send(&app, "POST", "/api/v1/papers/preview", Some(invalid)).await;
  assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
  assert_eq!(v["error"], "validation");
  assert_eq!(v["details"].as_array().unwrap().len(), 2);

  let mut unknown_subject = math_rule();
  unknown_subject["subjectId"] = json!(99);
  let (status, v) = send(&app, "POST", "/api/v1/papers", Some(unknown_subject)).await;
  assert_eq!(status, StatusCode::CONFLICT);
  assert_eq!(v["error"], "infeasible");
  assert!(v["message"].as_str().unwrap().contains("0 candidates"));

  let (status, v) = send(&app, "GET", "/api/v1/papers/does-not-exist", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert_eq!(v["error"], "not_found");
}
