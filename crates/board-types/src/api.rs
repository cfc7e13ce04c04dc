//! API types for the board HTTP surface.
//!
//! Error responses share one JSON shape; [`ApiError`] maps each failure
//! class onto its HTTP status.

use axum::{
	http::StatusCode,
	response::{IntoResponse, Json, Response},
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
	/// Machine-readable error code, e.g. "FORBIDDEN".
	pub error: String,
	/// Human-readable description.
	pub message: String,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub details: Option<serde_json::Value>,
}

/// Structured API error with HTTP status mapping.
#[derive(Debug)]
pub enum ApiError {
	/// Malformed request (400).
	BadRequest { error_type: String, message: String },
	/// The acting staff member lacks the capability (403).
	Forbidden { error_type: String, message: String },
	/// Unknown order or action (404).
	NotFound { error_type: String, message: String },
	/// The request conflicts with in-flight work or the workflow (409).
	Conflict {
		error_type: String,
		message: String,
		details: Option<serde_json::Value>,
	},
	/// The order source could not be reached (503).
	ServiceUnavailable { error_type: String, message: String },
	/// Anything else (500).
	InternalServerError { error_type: String, message: String },
}

impl ApiError {
	pub fn bad_request(error_type: &str, message: impl Into<String>) -> Self {
		ApiError::BadRequest {
			error_type: error_type.to_string(),
			message: message.into(),
		}
	}

	pub fn forbidden(message: impl Into<String>) -> Self {
		ApiError::Forbidden {
			error_type: "FORBIDDEN".to_string(),
			message: message.into(),
		}
	}

	pub fn not_found(error_type: &str, message: impl Into<String>) -> Self {
		ApiError::NotFound {
			error_type: error_type.to_string(),
			message: message.into(),
		}
	}

	pub fn conflict(error_type: &str, message: impl Into<String>) -> Self {
		ApiError::Conflict {
			error_type: error_type.to_string(),
			message: message.into(),
			details: None,
		}
	}

	pub fn status_code(&self) -> StatusCode {
		match self {
			ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
			ApiError::Forbidden { .. } => StatusCode::FORBIDDEN,
			ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
			ApiError::Conflict { .. } => StatusCode::CONFLICT,
			ApiError::ServiceUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
			ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
		}
	}

	pub fn to_error_response(&self) -> ErrorResponse {
		let (error_type, message, details) = match self {
			ApiError::BadRequest {
				error_type,
				message,
			}
			| ApiError::Forbidden {
				error_type,
				message,
			}
			| ApiError::NotFound {
				error_type,
				message,
			}
			| ApiError::ServiceUnavailable {
				error_type,
				message,
			}
			| ApiError::InternalServerError {
				error_type,
				message,
			} => (error_type, message, None),
			ApiError::Conflict {
				error_type,
				message,
				details,
			} => (error_type, message, details.clone()),
		};
		ErrorResponse {
			error: error_type.clone(),
			message: message.clone(),
			details,
		}
	}
}

impl fmt::Display for ApiError {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let response = self.to_error_response();
		write!(f, "{} ({}): {}", self.status_code(), response.error, response.message)
	}
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
	fn into_response(self) -> Response {
		(self.status_code(), Json(self.to_error_response())).into_response()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_status_mapping() {
		assert_eq!(ApiError::forbidden("no").status_code(), StatusCode::FORBIDDEN);
		assert_eq!(
			ApiError::not_found("ORDER_NOT_FOUND", "missing").status_code(),
			StatusCode::NOT_FOUND
		);
		assert_eq!(ApiError::conflict("BUSY", "busy").status_code(), StatusCode::CONFLICT);
	}

	#[test]
	fn test_error_response_omits_empty_details() {
		let body = ApiError::bad_request("INVALID_VIEW", "unknown view").to_error_response();
		let value = serde_json::to_value(&body).unwrap();
		assert_eq!(value["error"], "INVALID_VIEW");
		assert!(value.get("details").is_none());
	}
}
