// src/routes/mod.rs
pub mod chat;

use crate::message::ChatQuery;
use crate::services::models::Model;
use crate::state::SharedState;
use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use chat::{chat_handler, get_metrics_handler};
use tower_http::trace::TraceLayer;

/// One `GET /{route}` per enabled model, plus `/health` and `/metrics`.
pub fn create_router(models: &[Model]) -> Router<SharedState> {
    let mut router = Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/metrics", get(get_metrics_handler));

    for &model in models {
        router = router.route(
            &format!("/{}", model.route()),
            get(move |state: State<SharedState>, query: Query<ChatQuery>| {
                chat_handler(model, state, query)
            }),
        );
    }

    router.layer(TraceLayer::new_for_http())
}
