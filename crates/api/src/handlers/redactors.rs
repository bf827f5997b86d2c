//! Redactor account handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;
use validator::Validate;

use crate::handlers::newspapers::NewspaperItem;
use crate::AppState;
use newsroom_common::{
    auth::{hash_password, AuthContext},
    db::filter::{page_number, RedactorFilter},
    db::models::Redactor,
    db::{RedactorWithCount, Repository},
    errors::{AppError, Result},
    metrics,
};

/// Listing query parameters; bad page numbers degrade to page 1
#[derive(Debug, Default, Deserialize)]
pub struct ListRedactorsQuery {
    pub username: Option<String>,
    pub page: Option<String>,
}

/// Request to register a redactor account
#[derive(Debug, Deserialize, Validate)]
pub struct CreateRedactorRequest {
    #[validate(length(min = 1, max = 150))]
    pub username: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    #[validate(must_match(other = "password"))]
    pub password_confirm: String,

    #[serde(default)]
    pub first_name: String,

    #[serde(default)]
    pub last_name: String,

    #[validate(email)]
    pub email: Option<String>,

    #[serde(default)]
    #[validate(range(min = 0))]
    pub years_of_experience: i32,
}

/// Request to update a redactor's years of experience
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateExperienceRequest {
    #[validate(range(min = 0))]
    pub years_of_experience: i32,
}

/// Redactor listing row with publication count
#[derive(Serialize)]
pub struct RedactorItem {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub years_of_experience: i32,
    pub created_at: String,
    pub publications_count: i64,
}

impl From<RedactorWithCount> for RedactorItem {
    fn from(row: RedactorWithCount) -> Self {
        Self {
            id: row.id,
            username: row.username,
            first_name: row.first_name,
            last_name: row.last_name,
            email: row.email,
            years_of_experience: row.years_of_experience,
            created_at: row.created_at.to_rfc3339(),
            publications_count: row.publications_count,
        }
    }
}

/// Redactor without listing annotations, used for create/update responses
#[derive(Serialize)]
pub struct RedactorSummary {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub years_of_experience: i32,
    pub created_at: String,
}

impl From<Redactor> for RedactorSummary {
    fn from(redactor: Redactor) -> Self {
        Self {
            id: redactor.id,
            username: redactor.username,
            first_name: redactor.first_name,
            last_name: redactor.last_name,
            email: redactor.email,
            years_of_experience: redactor.years_of_experience,
            created_at: redactor.created_at.to_rfc3339(),
        }
    }
}

#[derive(Serialize)]
pub struct RedactorListResponse {
    pub items: Vec<RedactorItem>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

#[derive(Serialize)]
pub struct RedactorDetailResponse {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub years_of_experience: i32,
    pub created_at: String,
    pub topics_count: i64,
    pub newspapers: Vec<NewspaperItem>,
}

/// List redactors with distinct newspaper counts
pub async fn list_redactors(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(query): Query<ListRedactorsQuery>,
) -> Result<Json<RedactorListResponse>> {
    let start = Instant::now();

    let filter = RedactorFilter {
        username: query.username,
    };
    let page = page_number(query.page.as_deref());

    let repo = Repository::new(state.db.clone());
    let result = repo.list_redactors(&filter, page).await?;

    metrics::record_listing("redactors", start.elapsed().as_secs_f64(), result.items.len());

    Ok(Json(RedactorListResponse {
        items: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
        page: result.page,
        page_size: result.page_size,
        total_pages: result.total_pages,
    }))
}

/// Get a redactor with their newspapers and distinct topic count
pub async fn get_redactor(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(redactor_id): Path<Uuid>,
) -> Result<Json<RedactorDetailResponse>> {
    let repo = Repository::new(state.db.clone());
    let detail = repo.get_redactor_detail(redactor_id).await?;

    Ok(Json(RedactorDetailResponse {
        id: detail.redactor.id,
        username: detail.redactor.username,
        first_name: detail.redactor.first_name,
        last_name: detail.redactor.last_name,
        email: detail.redactor.email,
        years_of_experience: detail.redactor.years_of_experience,
        created_at: detail.redactor.created_at.to_rfc3339(),
        topics_count: detail.topics_count,
        newspapers: detail.newspapers.into_iter().map(Into::into).collect(),
    }))
}

/// Register a new redactor account
pub async fn create_redactor(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateRedactorRequest>,
) -> Result<(StatusCode, Json<RedactorSummary>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let password_hash = hash_password(&request.password)?;

    let repo = Repository::new(state.db.clone());
    let redactor = repo
        .create_redactor(
            request.username,
            request.first_name,
            request.last_name,
            request.email.unwrap_or_default(),
            password_hash,
            request.years_of_experience,
        )
        .await?;

    metrics::record_write("redactors", "create");

    tracing::info!(
        redactor_id = %redactor.id,
        username = %redactor.username,
        by = %auth.username,
        "Redactor created"
    );

    Ok((StatusCode::CREATED, Json(redactor.into())))
}

/// Update a redactor's years of experience
pub async fn update_experience(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(redactor_id): Path<Uuid>,
    Json(request): Json<UpdateExperienceRequest>,
) -> Result<Json<RedactorSummary>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("years_of_experience".to_string()),
    })?;

    let repo = Repository::new(state.db.clone());
    let redactor = repo
        .update_redactor_experience(redactor_id, request.years_of_experience)
        .await?;

    metrics::record_write("redactors", "update");

    tracing::info!(
        redactor_id = %redactor.id,
        years = redactor.years_of_experience,
        by = %auth.username,
        "Experience updated"
    );

    Ok(Json(redactor.into()))
}

/// Delete a redactor account; their newspapers survive
pub async fn delete_redactor(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(redactor_id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());

    let deleted = repo.delete_redactor(redactor_id).await?;
    if !deleted {
        return Err(AppError::RedactorNotFound {
            id: redactor_id.to_string(),
        });
    }

    metrics::record_write("redactors", "delete");

    tracing::info!(
        redactor_id = %redactor_id,
        by = %auth.username,
        "Redactor deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base_request() -> serde_json::Value {
        json!({
            "username": "jdoe",
            "password": "s3cure-pass",
            "password_confirm": "s3cure-pass",
            "first_name": "Jane",
            "last_name": "Doe",
            "email": "jdoe@example.com",
            "years_of_experience": 4,
        })
    }

    #[test]
    fn test_create_request_accepts_valid_input() {
        let request: CreateRedactorRequest = serde_json::from_value(base_request()).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_create_request_rejects_password_mismatch() {
        let mut value = base_request();
        value["password_confirm"] = json!("different-pass");

        let request: CreateRedactorRequest = serde_json::from_value(value).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_short_password() {
        let mut value = base_request();
        value["password"] = json!("short");
        value["password_confirm"] = json!("short");

        let request: CreateRedactorRequest = serde_json::from_value(value).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_negative_experience() {
        let mut value = base_request();
        value["years_of_experience"] = json!(-1);

        let request: CreateRedactorRequest = serde_json::from_value(value).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_rejects_bad_email() {
        let mut value = base_request();
        value["email"] = json!("not-an-email");

        let request: CreateRedactorRequest = serde_json::from_value(value).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_request_fills_defaults() {
        let request: CreateRedactorRequest = serde_json::from_value(json!({
            "username": "minimal",
            "password": "s3cure-pass",
            "password_confirm": "s3cure-pass",
        }))
        .unwrap();

        assert!(request.validate().is_ok());
        assert_eq!(request.first_name, "");
        assert_eq!(request.last_name, "");
        assert!(request.email.is_none());
        assert_eq!(request.years_of_experience, 0);
    }

    #[test]
    fn test_update_request_rejects_negative_experience() {
        let request: UpdateExperienceRequest =
            serde_json::from_value(json!({ "years_of_experience": -3 })).unwrap();
        assert!(request.validate().is_err());
    }
}
