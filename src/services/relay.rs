// src/services/relay.rs
use tracing::Instrument;
use uuid::Uuid;

use super::claila::ClailaClient;
use super::models::Model;
use super::session_manager::{SessionId, SessionLocks};
use super::shaping::{ResponseShape, ShapedReply};
use crate::error::AppError;

/// Runs the seed / token / completion sequence for one inbound call and
/// shapes the final upstream body.
#[derive(Debug, Clone)]
pub struct ChatRelay {
    client: ClailaClient,
    shape: ResponseShape,
    sessions: SessionLocks,
}

impl ChatRelay {
    pub fn new(client: ClailaClient, shape: ResponseShape) -> Self {
        Self {
            client,
            shape,
            sessions: SessionLocks::new(),
        }
    }

    pub fn shape(&self) -> ResponseShape {
        self.shape
    }

    pub fn sessions(&self) -> &SessionLocks {
        &self.sessions
    }

    pub async fn handle(
        &self,
        model: Model,
        session: &SessionId,
        message: &str,
    ) -> Result<ShapedReply, AppError> {
        if message.is_empty() {
            return Err(AppError::MissingParameter(vec!["message"]));
        }

        let span = tracing::info_span!(
            "relay",
            request_id = %Uuid::new_v4(),
            %model,
            %session,
        );

        async move {
            let _held = self.sessions.acquire(session).await;

            self.client.seed(message, session).await?;
            let token = self.client.csrf_token().await?;
            let reply = self.client.complete(model, message, session, &token).await?;

            tracing::info!(bytes = reply.body.len(), "upstream replied");
            Ok::<_, AppError>(self.shape.shape(reply))
        }
        .instrument(span)
        .await
    }
}
