//! Support chat endpoints

use api_types::chat::{MessageNew, MessageView, MessagesQuery};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use engine::Session;

use crate::{ServerError, server::ServerState, views::message_view};

pub async fn send(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Json(payload): Json<MessageNew>,
) -> Result<(StatusCode, Json<MessageView>), ServerError> {
    let message = state
        .engine
        .send_message(&session, &user_id, &payload.body, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(message_view(message))))
}

/// Handle thread polling; `since` narrows to newer messages
pub async fn list(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
    Path(user_id): Path<String>,
    Query(query): Query<MessagesQuery>,
) -> Result<Json<Vec<MessageView>>, ServerError> {
    let messages = state
        .engine
        .messages(&session, &user_id, query.since)
        .await?;
    Ok(Json(messages.into_iter().map(message_view).collect()))
}

pub async fn threads(
    Extension(session): Extension<Session>,
    State(state): State<ServerState>,
) -> Result<Json<Vec<MessageView>>, ServerError> {
    let latest = state.engine.chat_threads(&session).await?;
    Ok(Json(latest.into_iter().map(message_view).collect()))
}
