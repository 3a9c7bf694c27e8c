// src/web/types.rs
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::serde::{Deserialize, Serialize};

use crate::invitations::InvitationError;
use crate::repository::RepositoryError;

#[derive(Serialize)]
#[serde(crate = "rocket::serde", rename_all = "lowercase")]
pub enum ResponseType {
    Text,
    Data,
    Action,
    Error,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct TextResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct DataResponse<T> {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct ActionResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub message: String,
    pub action: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardErrorResponse {
    #[serde(rename = "type")]
    pub response_type: ResponseType,
    pub success: bool,
    pub error: String,
    pub error_code: String,
    pub suggestions: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conversation_id: Option<String>,
}

/// JSON body plus an optional conversation id echoed back in the response
#[derive(Deserialize)]
#[serde(crate = "rocket::serde")]
pub struct StandardRequest<T> {
    #[serde(flatten)]
    pub data: T,
    #[serde(default)]
    pub conversation_id: Option<String>,
}

pub trait WithConversationId {
    fn conversation_id(&self) -> Option<String>;
}

impl<T> WithConversationId for StandardRequest<T> {
    fn conversation_id(&self) -> Option<String> {
        self.conversation_id.clone()
    }
}

impl TextResponse {
    pub fn success(message: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Text,
            success: true,
            message,
            conversation_id,
        }
    }
}

impl<T> DataResponse<T> {
    pub fn success(message: String, data: T, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Data,
            success: true,
            message,
            data,
            conversation_id,
        }
    }
}

impl ActionResponse {
    pub fn success(message: String, action: String, conversation_id: Option<String>) -> Self {
        Self {
            response_type: ResponseType::Action,
            success: true,
            message,
            action,
            conversation_id,
        }
    }
}

impl StandardErrorResponse {
    pub fn new(
        error: String,
        error_code: String,
        suggestions: Vec<String>,
        conversation_id: Option<String>,
    ) -> Self {
        Self {
            response_type: ResponseType::Error,
            success: false,
            error,
            error_code,
            suggestions,
            conversation_id,
        }
    }
}

/// Error responder: status code plus the standard error body
pub type ApiError = (Status, Json<StandardErrorResponse>);
pub type ApiResult<T> = Result<Json<T>, ApiError>;

pub fn api_error(
    status: Status,
    error: impl Into<String>,
    error_code: &str,
    suggestions: Vec<String>,
    conversation_id: Option<String>,
) -> ApiError {
    (
        status,
        Json(StandardErrorResponse::new(
            error.into(),
            error_code.to_string(),
            suggestions,
            conversation_id,
        )),
    )
}

pub fn not_found(resource: &str, id: &str, conversation_id: Option<String>) -> ApiError {
    api_error(
        Status::NotFound,
        format!("{} '{}' not found", resource, id),
        "NOT_FOUND",
        vec![format!("Check the {} id", resource)],
        conversation_id,
    )
}

pub fn repository_error(error: RepositoryError, conversation_id: Option<String>) -> ApiError {
    match error {
        RepositoryError::UnsupportedSort(column) => api_error(
            Status::BadRequest,
            format!("Cannot sort by '{}'", column),
            "INVALID_SORT",
            vec!["Use one of the documented sort_by columns".to_string()],
            conversation_id,
        ),
        RepositoryError::Database(e) => {
            tracing::error!("Database error: {}", e);
            api_error(
                Status::InternalServerError,
                "Database error occurred",
                "DATABASE_ERROR",
                vec!["Try again in a few moments".to_string()],
                conversation_id,
            )
        }
    }
}

pub fn invitation_error(error: InvitationError, conversation_id: Option<String>) -> ApiError {
    if matches!(
        error,
        InvitationError::Database(_) | InvitationError::Repository(_)
    ) {
        tracing::error!("Invitation database error: {}", error);
    }
    let suggestions = match error {
        InvitationError::Expired | InvitationError::Revoked => {
            vec!["Ask the organization for a new invitation".to_string()]
        }
        InvitationError::EmailMismatch => {
            vec!["Sign in with the address the invitation was sent to".to_string()]
        }
        _ => Vec::new(),
    };
    api_error(
        error.status(),
        error.message(),
        error.code(),
        suggestions,
        conversation_id,
    )
}
