// src/services/classifier.rs
//
// Maps raw backend failures onto the closed error taxonomy by
// case-insensitive substring matching. The provider exposes no structured
// error codes at this layer, so wording is all we have; the match table and
// its priority order are the contract, and call sites never inspect raw
// messages themselves.
//
// Priority, first match wins:
//   1. no-output marker
//   2. quota / rate limit
//   3. invalid argument / invalid input
//   4. internal / server / unavailable
//   5. fallback: generic connectivity failure

use log::warn;

use crate::errors::GlossyError;
use crate::services::gemini::BackendError;

const NO_OUTPUT_TERMS: &[&str] = &["no image was generated", "no output produced"];
const QUOTA_TERMS: &[&str] = &["resource exhausted", "rate limit", "quota", "429"];
const UNAVAILABLE_TERMS: &[&str] = &[
    "internal",
    "unavailable",
    "server error",
    "overloaded",
    "500",
    "503",
];

fn contains_any(message: &str, terms: &[&str]) -> bool {
    terms.iter().any(|term| message.contains(term))
}

fn is_invalid_input(message: &str) -> bool {
    message.contains("invalid argument")
        || message.contains("invalid_argument")
        || (message.contains("invalid")
            && (message.contains("image") || message.contains("data") || message.contains("input")))
}

/// Total over every backend error: anything unmatched falls through to the
/// generic connectivity kind. The raw message is logged and carried in the
/// classified error's payload.
pub fn classify(error: &BackendError) -> GlossyError {
    let raw = error.to_string();
    warn!("classifying backend failure: {raw}");
    let message = raw.to_lowercase();

    if contains_any(&message, NO_OUTPUT_TERMS) {
        GlossyError::NoOutput(raw)
    } else if contains_any(&message, QUOTA_TERMS) {
        GlossyError::QuotaExceeded(raw)
    } else if is_invalid_input(&message) {
        GlossyError::InvalidInput(raw)
    } else if contains_any(&message, UNAVAILABLE_TERMS) {
        GlossyError::ServiceUnavailable(raw)
    } else {
        GlossyError::Connectivity(raw)
    }
}
