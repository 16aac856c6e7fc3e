//! Stand-in for the leasehold deposit API, for trying the CLI locally.
//!
//! Serves the default base URL `http://localhost:8080/api/v1`. Every
//! verification code is accepted if it equals `123456`.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

const DEMO_CODE: &str = "123456";

#[derive(Default)]
struct Counters {
    events: AtomicUsize,
    batches: AtomicUsize,
}

#[tokio::main]
async fn main() {
    let counters = Arc::new(Counters::default());

    let api = Router::new()
        .route("/properties/{id}", get(property))
        .route("/events/batch", post(events))
        .route("/verification/challenges", post(challenge))
        .route("/verification/validate", post(validate))
        .with_state(counters);
    let app = Router::new().nest("/api/v1", api);

    let addr = SocketAddr::from(([127, 0, 0, 1], 8080));
    println!("Mock leasehold API listening on http://{addr}/api/v1");

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

async fn property(Path(id): Path<String>) -> Json<Value> {
    Json(json!({
        "id": id,
        "address": "12 Fournier St, London E1 6QE",
        "depositPence": 185000,
        "updatedAt": "2026-03-01T09:30:00Z",
    }))
}

async fn events(State(counters): State<Arc<Counters>>, Json(body): Json<Value>) -> Json<Value> {
    let received = body["events"].as_array().map_or(0, Vec::len);
    let total = counters.events.fetch_add(received, Ordering::SeqCst) + received;
    let batch = counters.batches.fetch_add(1, Ordering::SeqCst) + 1;
    println!("batch #{batch}: {received} event(s), {total} total");
    Json(json!({ "accepted": received }))
}

async fn challenge(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    println!(
        "challenge for {} via {}: code is {DEMO_CODE}",
        body["subjectKey"], body["channel"]
    );
    (StatusCode::ACCEPTED, Json(json!({ "sent": true })))
}

async fn validate(Json(body): Json<Value>) -> Json<Value> {
    Json(json!({ "verified": body["code"] == DEMO_CODE }))
}
