//! HTTP-facing side of an invocation.
//!
//! Any request is a fire signal. The outcome of the fetch, enrich and write
//! chain is reported as a status code plus a small JSON body:
//! `{"status":"ok","path":...}` or `{"status":"error","kind":...}`.

use crate::core::etl::IngestEngine;
use crate::core::Pipeline;
use crate::utils::error::{ErrorKind, IngestError};
use reqwest::StatusCode;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationState {
    Received,
    Processing,
    Succeeded,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum TriggerBody {
    Ok { path: String },
    Error { kind: ErrorKind },
}

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerResponse {
    pub status: StatusCode,
    pub body: TriggerBody,
}

impl TriggerResponse {
    pub fn success(path: impl Into<String>) -> Self {
        Self {
            status: StatusCode::OK,
            body: TriggerBody::Ok { path: path.into() },
        }
    }

    pub fn failure(err: &IngestError) -> Self {
        let kind = err.kind();
        Self {
            status: status_for(kind),
            body: TriggerBody::Error { kind },
        }
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    pub fn body_json(&self) -> Value {
        // Serializing a two-variant enum of strings cannot fail.
        serde_json::to_value(&self.body).unwrap_or(Value::Null)
    }

    /// Lambda proxy integration shape, understood by Function URLs and API Gateway.
    pub fn to_proxy_response(&self) -> Value {
        json!({
            "statusCode": self.status.as_u16(),
            "headers": {"content-type": "application/json"},
            "body": self.body_json().to_string(),
        })
    }
}

pub fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::UpstreamUnavailable
        | ErrorKind::MalformedResponse
        | ErrorKind::UnexpectedPayloadShape => StatusCode::BAD_GATEWAY,
        ErrorKind::StorageUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        ErrorKind::PathCollision | ErrorKind::Configuration | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// Whether a Lambda event came through an HTTP front (Function URL or API
/// Gateway) rather than a scheduler rule.
pub fn is_http_event(event: &Value) -> bool {
    event.get("httpMethod").is_some()
        || event.get("rawPath").is_some()
        || event
            .get("requestContext")
            .and_then(|ctx| ctx.get("http"))
            .is_some()
}

#[derive(Debug)]
pub struct Invocation {
    state: InvocationState,
}

impl Default for Invocation {
    fn default() -> Self {
        Self::received()
    }
}

impl Invocation {
    pub fn received() -> Self {
        tracing::debug!("Invocation received");
        Self {
            state: InvocationState::Received,
        }
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    fn transition(&mut self, next: InvocationState) {
        tracing::debug!("Invocation {:?} -> {:?}", self.state, next);
        self.state = next;
    }

    /// Runs the chain once. Only valid from `Received`; a finished invocation
    /// reports an internal error rather than running again.
    pub async fn handle<P: Pipeline>(&mut self, engine: &IngestEngine<P>) -> TriggerResponse {
        if self.state != InvocationState::Received {
            tracing::error!("Invocation already in state {:?}", self.state);
            return TriggerResponse {
                status: StatusCode::INTERNAL_SERVER_ERROR,
                body: TriggerBody::Error {
                    kind: ErrorKind::Internal,
                },
            };
        }

        self.transition(InvocationState::Processing);
        match engine.run().await {
            Ok(location) => {
                self.transition(InvocationState::Succeeded);
                tracing::info!("✅ Invocation succeeded: {}", location.uri);
                TriggerResponse::success(location.key)
            }
            Err(e) => {
                self.transition(InvocationState::Failed);
                tracing::error!(
                    "❌ Invocation failed: {} (kind: {}, severity: {:?})",
                    e,
                    e.kind(),
                    e.severity()
                );
                TriggerResponse::failure(&e)
            }
        }
    }
}

pub async fn handle<P: Pipeline>(engine: &IngestEngine<P>) -> TriggerResponse {
    Invocation::received().handle(engine).await
}
