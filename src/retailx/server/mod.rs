// SPDX-License-Identifier: MIT

//! Thin HTTP front end over the question-answering workflow

use axum::{
    extract::State,
    response::sse::{Event, KeepAlive, Sse},
    routing::{get, post},
    Json, Router,
};
use futures::stream::Stream;
use serde::Deserialize;
use serde_json::{json, Value};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::adk::agent::{Agent, AgentEvent};
use crate::retailx::data::DATA_DESCRIPTION;

/// Message shown instead of an answer when no question was given
pub const EMPTY_QUESTION_MESSAGE: &str = "Please enter a question.";

pub fn router(agent: Arc<dyn Agent>) -> Router {
    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/schema", get(schema))
        .route("/api/ask", post(ask))
        .route("/api/ask/stream", post(ask_stream))
        .with_state(agent)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

pub async fn serve(
    agent: Arc<dyn Agent>,
    port: u16,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let app = router(agent);

    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    log::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

async fn health_check() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

async fn schema() -> Json<Value> {
    Json(json!({ "data_description": DATA_DESCRIPTION }))
}

#[derive(Deserialize)]
struct AskRequest {
    #[serde(default)]
    question: String,
}

async fn ask(State(agent): State<Arc<dyn Agent>>, Json(payload): Json<AskRequest>) -> Json<Value> {
    let question = payload.question.trim();
    if question.is_empty() {
        return Json(json!({ "status": "empty", "answer": EMPTY_QUESTION_MESSAGE }));
    }

    match agent.run(question.to_string()).await {
        Ok(answer) => Json(json!({ "status": "completed", "answer": answer })),
        Err(e) => {
            log::error!("Agent {} failed: {}", agent.name(), e);
            Json(json!({ "status": "failed", "error": e.to_string() }))
        }
    }
}

async fn ask_stream(
    State(agent): State<Arc<dyn Agent>>,
    Json(payload): Json<AskRequest>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        let question = payload.question.trim().to_string();
        if question.is_empty() {
            let _ = tx
                .send(AgentEvent::Answer(EMPTY_QUESTION_MESSAGE.to_string()))
                .await;
            return;
        }

        if let Err(e) = agent.run_stream(question, tx.clone()).await {
            log::error!("Streaming run failed: {}", e);
            let _ = tx.send(AgentEvent::Error(e.to_string())).await;
        }
    });

    let stream = ReceiverStream::new(rx).map(|event| {
        Ok(Event::default()
            .json_data(&event)
            .unwrap_or_else(|_| Event::default().event("error").data("unserializable event")))
    });

    Sse::new(stream).keep_alive(KeepAlive::new().interval(Duration::from_secs(1)))
}
