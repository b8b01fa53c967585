//! Client for the three-call Claila chat handshake.
//!
//! The upstream mimics a browser XHR flow: a seed call establishes the turn
//! for a session, a CSRF token is fetched, and the model-specific completion
//! call carries that token. Every call is bounded by the client timeout.
use std::{fmt, time::Duration};

use axum::body::Bytes;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use thiserror::Error;

use super::models::Model;
use super::session_manager::SessionId;

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded; charset=UTF-8";
const XHR_ACCEPT: &str = "application/json, text/javascript, */*; q=0.01";
const ANY_ACCEPT: &str = "*/*";
const X_REQUESTED_WITH: &str = "X-Requested-With";
const X_CSRF_TOKEN: &str = "X-CSRF-Token";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamStep {
    Seed,
    CsrfToken,
    Completion,
}

impl fmt::Display for UpstreamStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            UpstreamStep::Seed => "seed",
            UpstreamStep::CsrfToken => "csrf token",
            UpstreamStep::Completion => "completion",
        })
    }
}

#[derive(Debug, Error)]
#[error("upstream {step} call failed")]
pub struct UpstreamError {
    pub step: UpstreamStep,
    #[source]
    pub source: reqwest::Error,
}

impl UpstreamError {
    fn at(step: UpstreamStep) -> impl FnOnce(reqwest::Error) -> Self {
        move |source| Self { step, source }
    }
}

/// Final upstream body, byte for byte.
#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamReply {
    pub body: Bytes,
    pub content_type: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ClailaClient {
    http: reqwest::Client,
    base_url: String,
}

impl ClailaClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(timeout)
            .build()?;
        Ok(Self::with_http_client(http, base_url))
    }

    pub fn with_http_client(http: reqwest::Client, base_url: &str) -> Self {
        Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Step 1. The body is discarded; only the upstream side effect matters.
    pub async fn seed(&self, message: &str, session: &SessionId) -> Result<(), UpstreamError> {
        let step = UpstreamStep::Seed;
        self.http
            .post(format!("{}/unichat1", self.base_url))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(ACCEPT, XHR_ACCEPT)
            .header(X_REQUESTED_WITH, "XMLHttpRequest")
            .form(&[("message", message), ("sessionId", session.as_str())])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(UpstreamError::at(step))?;

        tracing::debug!(%session, "seed call accepted");
        Ok(())
    }

    /// Step 2. The trimmed response body is the token.
    pub async fn csrf_token(&self) -> Result<String, UpstreamError> {
        let step = UpstreamStep::CsrfToken;
        let body = self
            .http
            .get(format!("{}/getcsrftoken", self.base_url))
            .header(ACCEPT, ANY_ACCEPT)
            .header(X_REQUESTED_WITH, "XMLHttpRequest")
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(UpstreamError::at(step))?
            .text()
            .await
            .map_err(UpstreamError::at(step))?;

        Ok(body.trim().to_string())
    }

    /// Step 3. Model-specific completion carrying the CSRF token.
    pub async fn complete(
        &self,
        model: Model,
        message: &str,
        session: &SessionId,
        csrf_token: &str,
    ) -> Result<UpstreamReply, UpstreamError> {
        let step = UpstreamStep::Completion;
        let response = self
            .http
            .post(format!("{}/unichat1/{}", self.base_url, model.upstream_path()))
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header(ACCEPT, ANY_ACCEPT)
            .header(X_CSRF_TOKEN, csrf_token)
            .header(X_REQUESTED_WITH, "XMLHttpRequest")
            .form(&[
                ("calltype", "completion"),
                ("message", message),
                ("sessionId", session.as_str()),
            ])
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(UpstreamError::at(step))?;

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = response.bytes().await.map_err(UpstreamError::at(step))?;

        Ok(UpstreamReply { body, content_type })
    }
}
