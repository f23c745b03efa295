//! HTTP error mapping.
//!
//! Every use-case error collapses into [`ApiError`], whose response carries a
//! status hint and a `{"error", "detail"}` body.

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::extract::{FromRequest, FromRequestParts, Path, Query, Request};
use axum::http::request::Parts;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::de::DeserializeOwned;
use serde_json::json;
use worldgraph_domain::DomainError;

use crate::infrastructure::ports::{CollaboratorError, RepoError};
use crate::use_cases::action::ActionError;
use crate::use_cases::management::ManagementError;
use crate::use_cases::movement::{NavigationError, RelocationError};

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error(transparent)]
    Collaborator(CollaboratorError),
    #[error("{0}")]
    ActionResolution(String),
    #[error("{0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Collaborator(_) | Self::ActionResolution(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFoundError",
            Self::Validation(_) => "ValidationError",
            Self::Conflict(_) => "ConsistencyViolation",
            Self::Collaborator(_) => "CollaboratorError",
            Self::ActionResolution(_) => "ActionResolutionError",
            Self::Internal(_) => "InternalError",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = %status, error = %self, "Request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
        }
        let body = json!({ "error": self.kind(), "detail": self.to_string() });
        (status, Json(body)).into_response()
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::NotFound { .. } => Self::NotFound(e.to_string()),
            RepoError::ConsistencyViolation(_) => Self::Conflict(e.to_string()),
            RepoError::Database { .. } | RepoError::Serialization(_) => {
                Self::Internal(e.to_string())
            }
        }
    }
}

impl From<CollaboratorError> for ApiError {
    fn from(e: CollaboratorError) -> Self {
        Self::Collaborator(e)
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => Self::NotFound(e.to_string()),
            other => Self::Validation(other.to_string()),
        }
    }
}

impl From<ManagementError> for ApiError {
    fn from(e: ManagementError) -> Self {
        match e {
            ManagementError::NotFound { .. } => Self::NotFound(e.to_string()),
            ManagementError::InvalidInput(msg) => Self::Validation(msg),
            ManagementError::Repo(e) => e.into(),
        }
    }
}

impl From<RelocationError> for ApiError {
    fn from(e: RelocationError) -> Self {
        match e {
            RelocationError::NotFound { .. } | RelocationError::NoScenes => {
                Self::NotFound(e.to_string())
            }
            RelocationError::InvalidInput(msg) => Self::Validation(msg),
            RelocationError::Repo(e) => e.into(),
        }
    }
}

impl From<NavigationError> for ApiError {
    fn from(e: NavigationError) -> Self {
        match e {
            NavigationError::NotFound { .. } => Self::NotFound(e.to_string()),
            NavigationError::InvalidInput(msg) => Self::Validation(msg),
            NavigationError::Collaborator(e) => e.into(),
            NavigationError::Relocation(e) => e.into(),
            NavigationError::Repo(e) => e.into(),
        }
    }
}

impl From<ActionError> for ApiError {
    fn from(e: ActionError) -> Self {
        match e {
            ActionError::NotFound { .. } => Self::NotFound(e.to_string()),
            ActionError::InvalidInput(msg) => Self::Validation(msg),
            ActionError::Resolution(_) => Self::ActionResolution(e.to_string()),
            ActionError::Collaborator(e) => e.into(),
            ActionError::Repo(e) => e.into(),
        }
    }
}

/// `Json` extractor whose rejections are validation errors.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection: JsonRejection| ApiError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `Path` extractor whose rejections are validation errors.
pub struct ApiPath<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiPath<T>
where
    T: DeserializeOwned + Send,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(value) = Path::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: PathRejection| ApiError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}

/// `Query` extractor whose rejections are validation errors.
pub struct ApiQuery<T>(pub T);

impl<S, T> FromRequestParts<S> for ApiQuery<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(value) = Query::<T>::from_request_parts(parts, state)
            .await
            .map_err(|rejection: QueryRejection| ApiError::Validation(rejection.body_text()))?;
        Ok(Self(value))
    }
}
