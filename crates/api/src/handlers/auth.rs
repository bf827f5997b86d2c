//! Authentication handlers

use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;

use crate::handlers::redactors::RedactorSummary;
use crate::AppState;
use newsroom_common::{
    auth::{verify_password, JwtManager},
    db::Repository,
    errors::{AppError, Result},
    metrics,
};

/// Login request
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(length(min = 1, max = 128))]
    pub password: String,
}

/// Login response with a bearer token
#[derive(Serialize)]
pub struct LoginResponse {
    pub token: String,
    pub token_type: String,
    pub expires_in: u64,
    pub redactor: RedactorSummary,
}

/// Exchange credentials for a bearer token
///
/// Unknown usernames and wrong passwords get the same response so the
/// endpoint does not leak which accounts exist.
pub async fn login(
    State(state): State<AppState>,
    Extension(jwt): Extension<Arc<JwtManager>>,
    Json(request): Json<LoginRequest>,
) -> Result<Json<LoginResponse>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let redactor = repo.find_redactor_by_username(&request.username).await?;

    let redactor = match redactor {
        Some(r) if verify_password(&request.password, &r.password_hash) => r,
        _ => {
            metrics::record_login(false);
            tracing::warn!(username = %request.username, "Login rejected");
            return Err(AppError::Unauthenticated {
                message: "Invalid username or password".to_string(),
            });
        }
    };

    let token = jwt.generate_token(redactor.id, &redactor.username)?;

    metrics::record_login(true);

    tracing::info!(
        redactor_id = %redactor.id,
        username = %redactor.username,
        "Login succeeded"
    );

    Ok(Json(LoginResponse {
        token,
        token_type: "Bearer".to_string(),
        expires_in: state.config.auth.token_expiration_secs,
        redactor: redactor.into(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_login_request_rejects_empty_credentials() {
        let request: LoginRequest =
            serde_json::from_value(json!({ "username": "", "password": "" })).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_login_request_accepts_credentials() {
        let request: LoginRequest =
            serde_json::from_value(json!({ "username": "jdoe", "password": "pw" })).unwrap();
        assert!(request.validate().is_ok());
    }
}
