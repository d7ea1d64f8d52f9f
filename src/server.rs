//! HTTP control server
//!
//! Three body-less POST routes, each mapped onto one controller operation.
//! Unknown paths and wrong methods get axum's default 404 / 405.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use gentimer_core::{Ack, ControlError, Controller, Shutdown};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;

/// JSON body for every response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageBody {
    pub message: String,
}

type Reply = (StatusCode, Json<MessageBody>);

fn reply(result: Result<Ack, ControlError>) -> Reply {
    match result {
        Ok(ack) => (
            StatusCode::OK,
            Json(MessageBody {
                message: ack.message().to_string(),
            }),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Control request refused");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(MessageBody {
                    message: e.to_string(),
                }),
            )
        }
    }
}

async fn create(State(controller): State<Arc<Controller>>) -> Reply {
    reply(controller.start().await)
}

async fn reset(State(controller): State<Arc<Controller>>) -> Reply {
    reply(controller.reset().await)
}

async fn hide(State(controller): State<Arc<Controller>>) -> Reply {
    reply(controller.hide().await)
}

pub fn router(controller: Arc<Controller>) -> Router {
    Router::new()
        .route("/create", post(create))
        .route("/reset", post(reset))
        .route("/hide", post(hide))
        .with_state(controller)
}

/// Serve until `shutdown` is raised, then finish in-flight requests and return
pub async fn serve(
    listener: TcpListener,
    controller: Arc<Controller>,
    shutdown: Shutdown,
) -> std::io::Result<()> {
    if let Ok(addr) = listener.local_addr() {
        tracing::info!(%addr, "Control server listening");
    }

    axum::serve(listener, router(controller))
        .with_graceful_shutdown(async move { shutdown.wait().await })
        .await?;

    tracing::info!("Control server stopped");
    Ok(())
}
