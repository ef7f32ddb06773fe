// src/errors.rs
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;

/// Closed error taxonomy surfaced to callers. The first six variants are the
/// only outcomes a generation operation can fail with; the remaining ones are
/// service-level concerns (storage, decoding) that never cross the
/// orchestrator boundary.
#[derive(Error, Debug)]
pub enum GlossyError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("The AI service produced no usable output: {0}")]
    NoOutput(String),

    #[error("Request quota exceeded, wait a moment and try again: {0}")]
    QuotaExceeded(String),

    #[error("The AI service rejected the input as invalid: {0}")]
    InvalidInput(String),

    #[error("The AI service is temporarily unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Could not reach the AI service: {0}")]
    Connectivity(String),

    #[error("A {0} request is already in flight")]
    Busy(&'static str),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Image processing error: {0}")]
    ImageProcessing(String),
}

impl ResponseError for GlossyError {
    fn error_response(&self) -> HttpResponse {
        let body = |kind: &str| {
            serde_json::json!({
                "error": kind,
                "message": self.to_string()
            })
        };
        match self {
            GlossyError::Validation(_) => HttpResponse::BadRequest().json(body("validation")),
            GlossyError::NoOutput(_) => HttpResponse::BadGateway().json(body("no_output")),
            GlossyError::QuotaExceeded(_) => {
                HttpResponse::TooManyRequests().json(body("quota_exceeded"))
            }
            GlossyError::InvalidInput(_) => HttpResponse::BadRequest().json(body("invalid_input")),
            GlossyError::ServiceUnavailable(_) => {
                HttpResponse::ServiceUnavailable().json(body("service_unavailable"))
            }
            GlossyError::Connectivity(_) => HttpResponse::BadGateway().json(body("connectivity")),
            GlossyError::Busy(_) => HttpResponse::Conflict().json(body("busy")),
            GlossyError::Storage(_) => HttpResponse::InternalServerError().json(body("storage")),
            GlossyError::Serialization(_) => {
                HttpResponse::InternalServerError().json(body("serialization"))
            }
            GlossyError::ImageProcessing(_) => {
                HttpResponse::BadRequest().json(body("image_processing"))
            }
        }
    }
}
