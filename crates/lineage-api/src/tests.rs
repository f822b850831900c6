//! Router tests against an in-memory store.

use axum::{
  Router,
  body::Body,
  http::{Request, StatusCode, header},
};
use lineage_store_sqlite::SqliteStore;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tower::ServiceExt as _;

use crate::{ApiState, api_router};

async fn state() -> ApiState { ApiState::new(SqliteStore::open_in_memory().await.unwrap()) }

async fn app() -> Router { api_router(state().await) }

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
  let builder = Request::builder().method(method).uri(uri);
  let req = match body {
    Some(body) => builder
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(body.to_string()))
      .unwrap(),
    None => builder.body(Body::empty()).unwrap(),
  };
  let resp = app.clone().oneshot(req).await.unwrap();
  let status = resp.status();
  let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await.unwrap();
  let value = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap() };
  (status, value)
}

fn person_body(forename: &str, born: &str) -> Value {
  json!({
    "forename": forename,
    "surname": "Liddell",
    "gender": "female",
    "date_of_birth": born,
  })
}

/// Alice(1) with children Bob(2) and Carol(3); Bob has a son Dave(4).
async fn alice_family() -> Router {
  let app = app().await;
  for (name, born) in [
    ("Alice", "1852-05-04"),
    ("Bob", "1880-01-01"),
    ("Carol", "1882-01-01"),
    ("Dave", "1910-01-01"),
  ] {
    let (status, _) = send(&app, "POST", "/persons", Some(person_body(name, born))).await;
    assert_eq!(status, StatusCode::CREATED);
  }
  for (parent, child) in [(1, 2), (1, 3), (2, 4)] {
    let body = json!({ "parent_id": parent, "child_id": child });
    let (status, _) = send(&app, "POST", "/children", Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
  }
  app
}

fn forenames(people: &Value) -> Vec<&str> {
  people
    .as_array()
    .unwrap()
    .iter()
    .map(|p| p["forename"].as_str().unwrap())
    .collect()
}

// ─── Persons ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn create_assigns_the_next_id() {
  let app = app().await;
  let (_, next) = send(&app, "GET", "/persons/next-id", None).await;
  assert_eq!(next["id"], 1);

  let padded = person_body("  Alice ", "1852-05-04");
  let (status, alice) = send(&app, "POST", "/persons", Some(padded)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(alice["id"], 1);
  assert_eq!(alice["forename"], "Alice");

  let (_, next) = send(&app, "GET", "/persons/next-id", None).await;
  assert_eq!(next["id"], 2);

  let (status, fetched) = send(&app, "GET", "/persons/1", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(fetched, alice);
}

#[tokio::test]
async fn create_with_explicit_id() {
  let app = app().await;
  let mut body = person_body("Gus", "1930-01-01");
  body["id"] = json!(7);
  let (status, gus) = send(&app, "POST", "/persons", Some(body)).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(gus["id"], 7);

  let (_, next) = send(&app, "GET", "/persons/next-id", None).await;
  assert_eq!(next["id"], 8);
}

#[tokio::test]
async fn invalid_person_is_bad_request() {
  let app = app().await;
  let (status, body) = send(&app, "POST", "/persons", Some(person_body("   ", "1852-05-04"))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
  assert!(body["error"].as_str().unwrap().contains("blank"));

  let mut dead_early = person_body("Alice", "1852-05-04");
  dead_early["date_of_death"] = json!("1800-01-01");
  let (status, _) = send(&app, "POST", "/persons", Some(dead_early)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn missing_person_is_404() {
  let app = app().await;
  let (status, body) = send(&app, "GET", "/persons/42", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  assert!(body["error"].is_string());

  let (status, _) = send(&app, "PUT", "/persons/42", Some(person_body("Eve", "1900-01-01"))).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_and_list_persons() {
  let app = alice_family().await;
  let mut body = person_body("Alice", "1852-05-04");
  body["surname"] = json!("Hargreaves");
  let (status, alice) = send(&app, "PUT", "/persons/1", Some(body)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(alice["surname"], "Hargreaves");

  let (_, all) = send(&app, "GET", "/persons", None).await;
  assert_eq!(forenames(&all), vec!["Alice", "Bob", "Carol", "Dave"]);
  assert_eq!(all[0]["surname"], "Hargreaves");
}

#[tokio::test]
async fn new_persons_are_queued_for_sync() {
  let (tx, mut rx) = mpsc::unbounded_channel();
  let app = api_router(state().await.with_sync(tx));

  send(&app, "POST", "/persons", Some(person_body("Alice", "1852-05-04"))).await;
  let queued = rx.recv().await.unwrap();
  assert_eq!(queued.forename(), "Alice");
}

// ─── Relationships ───────────────────────────────────────────────────────────

#[tokio::test]
async fn graph_lookups() {
  let app = alice_family().await;
  let (_, children) = send(&app, "GET", "/persons/1/children", None).await;
  assert_eq!(forenames(&children), vec!["Bob", "Carol"]);

  let (_, parents) = send(&app, "GET", "/persons/4/parents", None).await;
  assert_eq!(forenames(&parents), vec!["Bob"]);

  let (status, spouses) = send(&app, "GET", "/persons/4/spouses", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(spouses, json!([]));
}

#[tokio::test]
async fn marriage_pair_order_is_incidental() {
  let app = alice_family().await;
  let wedding = json!({ "person1_id": 2, "person2_id": 1, "start_date": "1876-09-01" });
  let (status, _) = send(&app, "POST", "/marriages", Some(wedding)).await;
  assert_eq!(status, StatusCode::CREATED);

  let (status, found) = send(&app, "GET", "/marriages/1/2", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(found["person1_id"], 2);

  let (_, of_alice) = send(&app, "GET", "/persons/1/marriages", None).await;
  assert_eq!(of_alice.as_array().unwrap().len(), 1);

  let again = json!({ "person1_id": 1, "person2_id": 2, "start_date": "1880-01-01" });
  let (status, _) = send(&app, "POST", "/marriages", Some(again)).await;
  assert_eq!(status, StatusCode::CONFLICT);

  let (status, _) = send(&app, "DELETE", "/marriages/1/2", None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);
  let (status, _) = send(&app, "DELETE", "/marriages/1/2", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn self_marriage_is_bad_request() {
  let app = alice_family().await;
  let body = json!({ "person1_id": 1, "person2_id": 1, "start_date": "1876-09-01" });
  let (status, _) = send(&app, "POST", "/marriages", Some(body)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_marriage() {
  let app = alice_family().await;
  let wedding = json!({ "person1_id": 1, "person2_id": 2, "start_date": "1876-09-01" });
  send(&app, "POST", "/marriages", Some(wedding)).await;

  let ended = json!({
    "person1_id": 1,
    "person2_id": 2,
    "start_date": "1876-09-01",
    "end_date": "1890-01-01",
  });
  let (status, m) = send(&app, "PUT", "/marriages/2/1", Some(ended)).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(m["end_date"], "1890-01-01");
}

#[tokio::test]
async fn bulk_replace_children() {
  let app = alice_family().await;
  let wanted = json!([{ "parent_id": 1, "child_id": 3 }]);
  let (status, stored) = send(&app, "PUT", "/persons/1/children", Some(wanted.clone())).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(stored, wanted);

  let (_, children) = send(&app, "GET", "/persons/1/children", None).await;
  assert_eq!(forenames(&children), vec!["Carol"]);

  let stray = json!([{ "parent_id": 2, "child_id": 4 }]);
  let (status, _) = send(&app, "PUT", "/persons/1/children", Some(stray)).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn add_and_remove_links() {
  let app = alice_family().await;
  let (status, _) =
    send(&app, "POST", "/persons/3/children", Some(json!({ "child_id": 4 }))).await;
  assert_eq!(status, StatusCode::CREATED);
  let (_, parents) = send(&app, "GET", "/persons/4/parents", None).await;
  assert_eq!(forenames(&parents), vec!["Bob", "Carol"]);

  let (status, _) = send(&app, "DELETE", "/children/3/4", None).await;
  assert_eq!(status, StatusCode::NO_CONTENT);

  let (status, created) =
    send(&app, "POST", "/persons/4/parents", Some(json!({ "parent_id": 3 }))).await;
  assert_eq!(status, StatusCode::CREATED);
  assert_eq!(created["parent_id"], 3);
  assert_eq!(created["child_id"], 4);

  let (status, _) = send(&app, "POST", "/persons/4/parents", Some(json!({ "parent_id": 4 }))).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn delete_cascades() {
  let app = alice_family().await;
  let (status, outcome) = send(&app, "DELETE", "/persons/2", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(outcome["children_removed"], 2);

  let (_, children) = send(&app, "GET", "/persons/1/children", None).await;
  assert_eq!(forenames(&children), vec!["Carol"]);
  let (status, _) = send(&app, "GET", "/persons/4", None).await;
  assert_eq!(status, StatusCode::OK);
}

// ─── Trees and events ────────────────────────────────────────────────────────

#[tokio::test]
async fn tree_is_cut_to_height() {
  let app = alice_family().await;
  let (status, tree) = send(&app, "GET", "/persons/1/tree?height=2", None).await;
  assert_eq!(status, StatusCode::OK);
  assert_eq!(tree["height"], 2);
  assert_eq!(tree["full_height"], 3);

  let items: Vec<_> = tree["items"]
    .as_array()
    .unwrap()
    .iter()
    .map(|i| (i["person"]["forename"].as_str().unwrap(), i["depth"].as_u64().unwrap()))
    .collect();
  assert_eq!(items, vec![("Alice", 0), ("Bob", 1), ("Carol", 1)]);
}

#[tokio::test]
async fn ancestor_tree() {
  let app = alice_family().await;
  let (_, tree) = send(&app, "GET", "/persons/4/tree?direction=ancestors", None).await;
  assert_eq!(tree["direction"], "ancestors");
  assert_eq!(tree["height"], 3);
  assert_eq!(tree["items"][2]["person"]["forename"], "Alice");

  let (status, _) = send(&app, "GET", "/persons/42/tree", None).await;
  assert_eq!(status, StatusCode::NOT_FOUND);
  let (status, _) = send(&app, "GET", "/persons/1/tree?height=0", None).await;
  assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn events_are_in_calendar_order() {
  let app = alice_family().await;
  let wedding = json!({ "person1_id": 1, "person2_id": 2, "start_date": "1876-09-01" });
  send(&app, "POST", "/marriages", Some(wedding)).await;

  let (_, events) = send(&app, "GET", "/events", None).await;
  let kinds: Vec<_> =
    events.as_array().unwrap().iter().map(|e| e["kind"].as_str().unwrap()).collect();
  assert_eq!(kinds, vec!["birthday", "birthday", "birthday", "birthday", "anniversary"]);
  assert_eq!(events[0]["date"], "1880-01-01");
}
