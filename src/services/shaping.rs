use std::str::FromStr;

use axum::{
    body::Bytes,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};

use super::claila::UpstreamReply;

const JSON_CONTENT_TYPE: &str = "application/json";
const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";

/// How the final upstream body is handed back to the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ResponseShape {
    /// Re-encode JSON bodies, wrap anything else as `{"response": ...}`.
    #[default]
    Json,
    /// Pass the body through verbatim.
    Raw,
}

impl FromStr for ResponseShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "json" => Ok(ResponseShape::Json),
            "raw" => Ok(ResponseShape::Raw),
            other => Err(format!("unknown response shape '{other}' (expected json or raw)")),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShapedReply {
    pub content_type: String,
    pub body: Bytes,
}

impl ResponseShape {
    pub fn shape(self, reply: UpstreamReply) -> ShapedReply {
        match self {
            ResponseShape::Json => {
                let body = match serde_json::from_slice::<serde_json::Value>(&reply.body) {
                    Ok(parsed) => parsed.to_string(),
                    Err(_) => {
                        let text = String::from_utf8_lossy(&reply.body);
                        serde_json::json!({ "response": text }).to_string()
                    }
                };
                ShapedReply {
                    content_type: JSON_CONTENT_TYPE.to_string(),
                    body: Bytes::from(body),
                }
            }
            ResponseShape::Raw => ShapedReply {
                content_type: reply
                    .content_type
                    .unwrap_or_else(|| TEXT_CONTENT_TYPE.to_string()),
                body: reply.body,
            },
        }
    }
}

impl IntoResponse for ShapedReply {
    fn into_response(self) -> Response {
        let content_type = HeaderValue::from_str(&self.content_type)
            .unwrap_or_else(|_| HeaderValue::from_static(TEXT_CONTENT_TYPE));
        (StatusCode::OK, [(header::CONTENT_TYPE, content_type)], self.body).into_response()
    }
}
