use axum::{
    Extension, Json,
    extract::State,
    http::StatusCode,
};
use tracing::error;

use guildboard_types::api::{EmbedDispatchRequest, EmbedDispatchResponse, EmbedRequestCreated};
use guildboard_types::session::Claims;

use crate::error::ApiError;
use crate::guard::require_guild_access;
use crate::state::AppState;
use crate::stats::run_query;

/// `POST /api/embed` — the outbound write path. Inserts one pending work
/// item for the external worker and returns its id for optimistic UI
/// feedback. No retry here; delivery is the worker's job.
pub async fn dispatch_embed(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<EmbedDispatchRequest>,
) -> Result<(StatusCode, Json<EmbedDispatchResponse>), ApiError> {
    let guild_id = require_guild_access(&claims, req.guild_id.as_deref())?;
    let channel_id = req
        .channel_id
        .as_deref()
        .filter(|id| !id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Channel ID is required".to_string()))?
        .to_string();
    let payload = req.payload;

    match run_query(&state, move |db| {
        db.insert_embed_request(&guild_id, &channel_id, &payload)
    })
    .await
    {
        Ok(id) => Ok((
            StatusCode::OK,
            Json(EmbedDispatchResponse {
                success: true,
                data: Some(EmbedRequestCreated {
                    id,
                    status: "pending".to_string(),
                }),
                error: None,
            }),
        )),
        Err(err) => {
            error!(error = %err, "embed request insert failed");
            Ok((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(EmbedDispatchResponse {
                    success: false,
                    data: None,
                    error: Some("Internal Server Error".to_string()),
                }),
            ))
        }
    }
}
