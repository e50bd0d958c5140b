//! Resolves the calling user for API routes.
//!
//! Token verification happens upstream; by the time a request reaches this service
//! the authenticated user's id is carried in a header.

use axum::{extract::FromRequestParts, http::request::Parts};
use db::models::user::{User, UserRole};
use deployment::Deployment;
use services::services::assistant::CallerContext;
use uuid::Uuid;

use crate::{DeploymentImpl, error::ApiError};

pub const USER_ID_HEADER: &str = "x-user-id";

/// Extractor for the authenticated caller. Rejects unknown users and users without a team.
pub struct Caller(pub CallerContext);

impl FromRequestParts<DeploymentImpl> for Caller {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        deployment: &DeploymentImpl,
    ) -> Result<Self, Self::Rejection> {
        let user_id = parts
            .headers
            .get(USER_ID_HEADER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| Uuid::parse_str(value.trim()).ok())
            .ok_or(ApiError::Unauthorized)?;

        let user = User::find_by_id(&deployment.db().pool, user_id)
            .await?
            .ok_or(ApiError::Unauthorized)?;

        let context = CallerContext::from_user(&user).ok_or_else(|| {
            ApiError::Forbidden("You need to join or create a team first".to_string())
        })?;
        Ok(Caller(context))
    }
}

/// Reject callers whose role isn't in `roles`.
pub fn require_role(caller: &CallerContext, roles: &[UserRole]) -> Result<(), ApiError> {
    if roles.contains(&caller.role) {
        return Ok(());
    }
    let required = roles
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ");
    Err(ApiError::Forbidden(format!(
        "Access denied. Required roles: {required}"
    )))
}
