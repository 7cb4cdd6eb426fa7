use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use tracing::info;

use securetransact_db::models::NewMessage;
use securetransact_types::api::CreateMessageRequest;
use securetransact_types::models::Message;

use crate::error::{ApiError, ApiResult};
use crate::extract::ApiJson;
use crate::{AppState, parse_id, with_db};

/// GET /api/transactions/{id}/messages: oldest first. An unknown
/// transaction simply has no messages.
pub async fn get_messages(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<Message>>> {
    let id = parse_id(&id, "transaction")?;

    let messages = with_db(&state, move |db| {
        db.list_messages(id)?
            .into_iter()
            .map(Message::try_from)
            .collect::<anyhow::Result<Vec<_>>>()
    })
    .await?;

    Ok(Json(messages))
}

pub async fn send_message(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateMessageRequest>,
) -> ApiResult<impl IntoResponse> {
    if req.message.trim().is_empty() {
        return Err(ApiError::Validation("Message cannot be empty".into()));
    }
    if req.sender_name.trim().is_empty() {
        return Err(ApiError::Validation("Sender name is required".into()));
    }

    let kind = req.kind.unwrap_or_default();

    let message = with_db(&state, move |db| {
        let row = db.create_message(&NewMessage {
            transaction_id: req.transaction_id,
            sender_id: &req.sender_id,
            sender_name: req.sender_name.trim(),
            message: &req.message,
            kind: kind.as_str(),
            timestamp: Utc::now(),
        })?;
        Message::try_from(row)
    })
    .await?;

    info!(
        "Message {} posted on transaction {}",
        message.id, message.transaction_id
    );
    Ok((StatusCode::CREATED, Json(message)))
}
