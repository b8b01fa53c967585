// src/message.rs
use serde::{Deserialize, Serialize};

/// Query string accepted by every model route: `?id=<digits>&message=<text>`.
#[derive(Debug, Default, Deserialize)]
pub struct ChatQuery {
    pub id: Option<String>,
    pub message: Option<String>,
}

impl ChatQuery {
    /// Returns `(id, message)` when both are present and non-empty, otherwise
    /// the names of the missing parameters.
    pub fn required(&self) -> Result<(&str, &str), Vec<&'static str>> {
        let id = self.id.as_deref().filter(|s| !s.is_empty());
        let message = self.message.as_deref().filter(|s| !s.is_empty());

        match (id, message) {
            (Some(id), Some(message)) => Ok((id, message)),
            (id, message) => {
                let mut missing = Vec::new();
                if id.is_none() {
                    missing.push("id");
                }
                if message.is_none() {
                    missing.push("message");
                }
                Err(missing)
            }
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}
