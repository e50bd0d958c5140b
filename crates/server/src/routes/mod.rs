use axum::{Router, routing::get};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{DeploymentImpl, error::ApiError};

pub mod assistant;
pub mod auth;
pub mod health;
pub mod messages;
pub mod notifications;
pub mod projects;
pub mod tasks;
pub mod team;

pub fn router(deployment: DeploymentImpl) -> Router {
    let api_routes = Router::new()
        .merge(auth::router(&deployment))
        .merge(assistant::router(&deployment))
        .merge(projects::router(&deployment))
        .merge(tasks::router(&deployment))
        .merge(team::router(&deployment))
        .merge(messages::router(&deployment))
        .merge(notifications::router(&deployment));

    Router::new()
        .route("/health", get(health::health_check))
        .nest("/api", api_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(deployment)
}

/// Trimmed, non-empty text of at most `max` characters.
pub(crate) fn required_text(value: &str, field: &str, max: usize) -> Result<String, ApiError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(ApiError::BadRequest(format!("Validation error: {field} is required")));
    }
    if value.chars().count() > max {
        return Err(ApiError::BadRequest(format!(
            "Validation error: {field} must be at most {max} characters"
        )));
    }
    Ok(value.to_string())
}

/// Like [`required_text`], but blank input becomes `None`.
pub(crate) fn optional_text(
    value: Option<String>,
    field: &str,
    max: usize,
) -> Result<Option<String>, ApiError> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(text) => required_text(text, field, max).map(Some),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_validation() {
        assert_eq!(required_text("  Website ", "name", 100).unwrap(), "Website");
        assert!(required_text("   ", "name", 100).is_err());
        assert!(required_text(&"é".repeat(101), "name", 100).is_err());
        assert_eq!(required_text(&"é".repeat(100), "name", 100).unwrap().chars().count(), 100);

        assert_eq!(optional_text(None, "description", 10).unwrap(), None);
        assert_eq!(optional_text(Some(" ".into()), "description", 10).unwrap(), None);
        assert_eq!(
            optional_text(Some(" ok ".into()), "description", 10).unwrap(),
            Some("ok".to_string())
        );
    }
}
