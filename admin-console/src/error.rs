use crate::services::{Resource, TransportError};
use crate::session::{RefreshError, StoreError};
use http::StatusCode;
use serde_json::Value;
use std::collections::BTreeMap;
use thiserror::Error;

pub type FieldErrors = BTreeMap<String, Vec<String>>;

const NETWORK_MESSAGE: &str =
    "Unable to reach the server. Check your internet connection and try again.";
const TIMEOUT_MESSAGE: &str =
    "The server took too long to respond. Check your connection and try again.";
const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please log in again.";
const FORBIDDEN_MESSAGE: &str = "You do not have permission to perform this action.";
const SERVER_MESSAGE: &str = "Something went wrong on the server. Please try again later.";
const VALIDATION_MESSAGE: &str = "Please correct the highlighted fields.";

/// Shapes an error body can take.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorBody {
    /// `details` mapping field names to one or more messages.
    FieldErrors(FieldErrors),
    /// A single message from `error`, `detail` or `message`.
    SingleMessage(String),
    /// Empty, non-JSON, or no recognised keys.
    Unstructured,
}

impl ErrorBody {
    /// Precedence: `details` (as a mapping), `error`, `detail`, `message`.
    pub fn parse(body: &[u8]) -> Self {
        let value: Value = match serde_json::from_slice(body) {
            Ok(value) => value,
            Err(_) => return ErrorBody::Unstructured,
        };

        let Some(object) = value.as_object() else {
            return ErrorBody::Unstructured;
        };

        if let Some(Value::Object(details)) = object.get("details") {
            let fields: FieldErrors = details
                .iter()
                .map(|(field, messages)| (field.clone(), messages_from(messages)))
                .filter(|(_, messages)| !messages.is_empty())
                .collect();
            if !fields.is_empty() {
                return ErrorBody::FieldErrors(fields);
            }
        }

        for key in ["error", "detail", "message"] {
            if let Some(Value::String(message)) = object.get(key) {
                if !message.trim().is_empty() {
                    return ErrorBody::SingleMessage(message.clone());
                }
            }
        }

        ErrorBody::Unstructured
    }

    /// Flattened message, if the body carried one.
    pub fn message(&self) -> Option<String> {
        match self {
            ErrorBody::FieldErrors(fields) => Some(
                fields
                    .iter()
                    .map(|(field, messages)| format!("{}: {}", field, messages.join(" ")))
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
            ErrorBody::SingleMessage(message) => Some(message.clone()),
            ErrorBody::Unstructured => None,
        }
    }
}

fn messages_from(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                Value::Null => None,
                other => Some(other.to_string()),
            })
            .collect(),
        Value::Null => Vec::new(),
        other => vec![other.to_string()],
    }
}

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("{message}")]
    Validation { message: String, fields: FieldErrors },

    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    Authentication(String),

    #[error("{0}")]
    Authorization(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{0}")]
    Network(String),

    #[error("Unexpected response from server: {0}")]
    Decode(String),

    #[error("Could not save session: {0}")]
    Storage(String),
}

impl ApiError {
    /// Classify a non-success HTTP response.
    pub fn from_response(status: StatusCode, body: &[u8], resource: Resource) -> Self {
        let parsed = ErrorBody::parse(body);
        let code = status.as_u16();

        match code {
            401 => ApiError::Authentication(
                parsed
                    .message()
                    .unwrap_or_else(|| resource.unauthorized_message().to_string()),
            ),
            403 => ApiError::Authorization(FORBIDDEN_MESSAGE.to_string()),
            404 => ApiError::NotFound(
                parsed
                    .message()
                    .unwrap_or_else(|| resource.not_found_message().to_string()),
            ),
            409 => ApiError::Conflict(
                parsed
                    .message()
                    .unwrap_or_else(|| "This record conflicts with an existing one.".to_string()),
            ),
            400..=499 => match parsed {
                ErrorBody::FieldErrors(fields) => ApiError::Validation {
                    message: VALIDATION_MESSAGE.to_string(),
                    fields,
                },
                ErrorBody::SingleMessage(message) => ApiError::BadRequest(message),
                ErrorBody::Unstructured => ApiError::BadRequest(generic_status_text(status)),
            },
            500..=599 => {
                if let Some(detail) = parsed.message() {
                    tracing::debug!(status = code, detail = %detail, "Server error detail");
                }
                ApiError::Server {
                    status: code,
                    message: SERVER_MESSAGE.to_string(),
                }
            }
            _ => ApiError::BadRequest(generic_status_text(status)),
        }
    }

    pub fn session_expired() -> Self {
        ApiError::Authentication(SESSION_EXPIRED_MESSAGE.to_string())
    }

    /// Text suitable for showing to the operator.
    pub fn user_message(&self) -> String {
        self.to_string()
    }

    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ApiError::Validation { fields, .. } => Some(fields),
            _ => None,
        }
    }

    pub fn is_authentication(&self) -> bool {
        matches!(self, ApiError::Authentication(_))
    }
}

fn generic_status_text(status: StatusCode) -> String {
    match status.as_u16() {
        400 => "The request was invalid.".to_string(),
        405 => "This action is not allowed.".to_string(),
        408 => "The request timed out. Please try again.".to_string(),
        413 => "The uploaded file is too large.".to_string(),
        415 => "This file type is not supported.".to_string(),
        422 => "The submitted data could not be processed.".to_string(),
        429 => "Too many requests. Please wait a moment and try again.".to_string(),
        code => format!("Request failed with status {}.", code),
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::Timeout => ApiError::Network(TIMEOUT_MESSAGE.to_string()),
            _ => ApiError::Network(NETWORK_MESSAGE.to_string()),
        }
    }
}

impl From<RefreshError> for ApiError {
    fn from(_: RefreshError) -> Self {
        ApiError::session_expired()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        ApiError::Storage(err.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields = FieldErrors::new();

        for (field, kind) in errors.errors() {
            if let validator::ValidationErrorsKind::Field(list) = kind {
                let messages = list
                    .iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect();
                // Struct-level checks are reported under "__all__".
                let key = if field.to_string() == "__all__" {
                    "non_field_errors".to_string()
                } else {
                    field.to_string()
                };
                fields.insert(key, messages);
            }
        }

        ApiError::Validation {
            message: VALIDATION_MESSAGE.to_string(),
            fields,
        }
    }
}
