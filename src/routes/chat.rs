use axum::{
    Json,
    extract::{Query, State},
};

use crate::{
    error::AppError,
    message::ChatQuery,
    services::{
        metrics_manager::{MetricsData, Outcome},
        models::Model,
        session_manager::SessionId,
        shaping::ShapedReply,
    },
    state::SharedState,
};

/// `GET /{model}?id=&message=`. `model` is bound per route, never read from
/// the request.
pub async fn chat_handler(
    model: Model,
    State(state): State<SharedState>,
    Query(query): Query<ChatQuery>,
) -> Result<ShapedReply, AppError> {
    let result = relay(&state, model, &query).await;

    let outcome = match &result {
        Ok(_) => Outcome::Succeeded,
        Err(AppError::Upstream(_)) => Outcome::UpstreamFailed,
        Err(_) => Outcome::Rejected,
    };
    state.metrics.record(model, outcome).await;

    result
}

async fn relay(state: &SharedState, model: Model, query: &ChatQuery) -> Result<ShapedReply, AppError> {
    // Presence is checked before format so a missing id never reads as malformed.
    let (id, message) = query.required().map_err(AppError::MissingParameter)?;
    let session = SessionId::parse(id)?;

    state.relay.handle(model, &session, message).await
}

pub async fn get_metrics_handler(State(state): State<SharedState>) -> Json<MetricsData> {
    Json(state.metrics.get_metrics().await)
}
