use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{0}")]
    InvalidTarget(String),

    #[error("{0}")]
    InvalidDate(String),

    #[error("Subscription store unavailable: {0}")]
    UpstreamUnavailable(anyhow::Error),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ResponseError for EngineError {
    fn status_code(&self) -> StatusCode {
        match self {
            EngineError::InvalidTarget(_) | EngineError::InvalidDate(_) => StatusCode::BAD_REQUEST,
            EngineError::UpstreamUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn error_response(&self) -> HttpResponse {
        if let EngineError::UpstreamUnavailable(e) = self {
            log::error!("Upstream subscription store failed: {:#}", e);
        }

        HttpResponse::build(self.status_code()).json(ErrorResponse {
            error: self.to_string(),
        })
    }
}
