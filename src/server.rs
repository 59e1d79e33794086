use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Router,
};
use teloxide::types::{Update, UpdateId};
use tokio::task::JoinHandle;

use crate::{
    errors::BotError,
    handlers::{menu, Action, OrderBot},
};

#[derive(Clone)]
struct WebhookState {
    bot: Arc<OrderBot>,
    ack_timeout: Duration,
}

/// `POST /<webhook_path>` takes Telegram updates, `GET /` is the health check.
pub fn router(bot: Arc<OrderBot>, webhook_path: &str, ack_timeout: Duration) -> Router {
    let state = WebhookState { bot, ack_timeout };
    Router::new()
        .route("/", get(health))
        .route(&format!("/{}", webhook_path), post(handle_webhook))
        .with_state(state)
}

async fn health() -> &'static str {
    menu::HEALTH_TEXT
}

/// Each update runs in its own task. The response waits for it at most
/// `ack_timeout`; after that Telegram gets its 200 and the task finishes alone.
async fn handle_webhook(State(state): State<WebhookState>, body: Bytes) -> (StatusCode, &'static str) {
    let update: Update = match serde_json::from_slice(&body) {
        Ok(update) => update,
        Err(e) => {
            log::warn!("⚠️ Rejecting malformed update: {}", e);
            return (StatusCode::BAD_REQUEST, "Bad Request");
        }
    };

    let update_id = update.id;
    let bot = state.bot.clone();
    let mut task = tokio::spawn(async move { bot.handle_update(&update).await });

    match tokio::time::timeout(state.ack_timeout, &mut task).await {
        Ok(joined) => {
            if finish(update_id, joined) {
                (StatusCode::OK, "OK")
            } else {
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
            }
        }
        Err(_) => {
            log::info!("⏳ Update {} still running, acknowledging early", update_id.0);
            tokio::spawn(watch(update_id, task));
            (StatusCode::OK, "OK")
        }
    }
}

async fn watch(update_id: UpdateId, task: JoinHandle<Result<Action, BotError>>) {
    finish(update_id, task.await);
}

/// Logs the outcome of an update task and reports whether it succeeded.
fn finish(update_id: UpdateId, joined: Result<Result<Action, BotError>, tokio::task::JoinError>) -> bool {
    match joined {
        Ok(Ok(action)) => {
            log::debug!("Update {} handled: {:?}", update_id.0, action);
            true
        }
        Ok(Err(e)) => {
            log::error!("❌ Update {} failed: {}", update_id.0, e);
            false
        }
        Err(e) => {
            log::error!("💥 Update {} handler panicked: {}", update_id.0, e);
            false
        }
    }
}
