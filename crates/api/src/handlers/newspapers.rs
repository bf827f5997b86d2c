//! Newspaper management handlers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use uuid::Uuid;
use validator::Validate;

use crate::AppState;
use newsroom_common::{
    auth::AuthContext,
    db::filter::{page_number, NewspaperFilter, PublicationPeriod},
    db::models::Redactor,
    db::{NewspaperWithRefs, Repository},
    errors::{AppError, Result},
    metrics,
};

/// Listing query parameters
///
/// All values arrive as raw strings; unrecognized periods and bad page
/// numbers degrade instead of erroring.
#[derive(Debug, Default, Deserialize)]
pub struct ListNewspapersQuery {
    pub title: Option<String>,
    pub period: Option<String>,
    pub page: Option<String>,
}

/// Request to create a newspaper
#[derive(Debug, Deserialize, Validate)]
pub struct CreateNewspaperRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[serde(default)]
    pub content: String,

    pub topic_id: Option<Uuid>,

    #[serde(default)]
    pub publisher_ids: Vec<Uuid>,
}

/// Request to update a newspaper's editable fields
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateNewspaperRequest {
    #[validate(length(min = 1, max = 255))]
    pub title: String,

    #[serde(default)]
    pub content: String,
}

#[derive(Serialize)]
pub struct TopicRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize)]
pub struct RedactorRef {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<Redactor> for RedactorRef {
    fn from(redactor: Redactor) -> Self {
        Self {
            id: redactor.id,
            username: redactor.username,
            first_name: redactor.first_name,
            last_name: redactor.last_name,
        }
    }
}

/// Newspaper with its topic and publishers, as returned by every endpoint
#[derive(Serialize)]
pub struct NewspaperItem {
    pub id: Uuid,
    pub title: String,
    pub content: String,
    pub published_date: String,
    pub topic: TopicRef,
    pub publishers: Vec<RedactorRef>,
}

impl From<NewspaperWithRefs> for NewspaperItem {
    fn from(refs: NewspaperWithRefs) -> Self {
        Self {
            id: refs.newspaper.id,
            title: refs.newspaper.title,
            content: refs.newspaper.content,
            published_date: refs.newspaper.published_date.to_rfc3339(),
            topic: TopicRef {
                id: refs.topic.id,
                name: refs.topic.name,
            },
            publishers: refs.publishers.into_iter().map(RedactorRef::from).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct NewspaperListResponse {
    pub items: Vec<NewspaperItem>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// List newspapers with optional title search and period filter
pub async fn list_newspapers(
    State(state): State<AppState>,
    _auth: AuthContext,
    Query(query): Query<ListNewspapersQuery>,
) -> Result<Json<NewspaperListResponse>> {
    let start = Instant::now();

    let filter = NewspaperFilter {
        title: query.title,
        period: PublicationPeriod::from_param(query.period.as_deref()),
    };
    let page = page_number(query.page.as_deref());

    let repo = Repository::new(state.db.clone());
    let result = repo.list_newspapers(&filter, page).await?;

    metrics::record_listing("newspapers", start.elapsed().as_secs_f64(), result.items.len());

    Ok(Json(NewspaperListResponse {
        items: result.items.into_iter().map(Into::into).collect(),
        total: result.total,
        page: result.page,
        page_size: result.page_size,
        total_pages: result.total_pages,
    }))
}

/// Get a newspaper by ID
pub async fn get_newspaper(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(newspaper_id): Path<Uuid>,
) -> Result<Json<NewspaperItem>> {
    let repo = Repository::new(state.db.clone());
    let detail = repo.get_newspaper_detail(newspaper_id).await?;

    Ok(Json(detail.into()))
}

/// Create a newspaper under an existing topic
pub async fn create_newspaper(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateNewspaperRequest>,
) -> Result<(StatusCode, Json<NewspaperItem>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let topic_id = request.topic_id.ok_or_else(|| AppError::MissingField {
        field: "topic_id".to_string(),
    })?;

    let repo = Repository::new(state.db.clone());
    let created = repo
        .create_newspaper(
            request.title,
            request.content,
            topic_id,
            request.publisher_ids,
        )
        .await?;

    metrics::record_write("newspapers", "create");

    tracing::info!(
        newspaper_id = %created.newspaper.id,
        topic_id = %topic_id,
        publishers = created.publishers.len(),
        by = %auth.username,
        "Newspaper created"
    );

    Ok((StatusCode::CREATED, Json(created.into())))
}

/// Update a newspaper's title and content
pub async fn update_newspaper(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(newspaper_id): Path<Uuid>,
    Json(request): Json<UpdateNewspaperRequest>,
) -> Result<Json<NewspaperItem>> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: None,
    })?;

    let repo = Repository::new(state.db.clone());
    let updated = repo
        .update_newspaper(newspaper_id, request.title, request.content)
        .await?;

    metrics::record_write("newspapers", "update");

    tracing::info!(
        newspaper_id = %newspaper_id,
        by = %auth.username,
        "Newspaper updated"
    );

    Ok(Json(updated.into()))
}

/// Delete a newspaper
pub async fn delete_newspaper(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(newspaper_id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());

    let deleted = repo.delete_newspaper(newspaper_id).await?;
    if !deleted {
        return Err(AppError::NewspaperNotFound {
            id: newspaper_id.to_string(),
        });
    }

    metrics::record_write("newspapers", "delete");

    tracing::info!(
        newspaper_id = %newspaper_id,
        by = %auth.username,
        "Newspaper deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Credit the authenticated redactor as a publisher of the newspaper
pub async fn assign_publisher(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(newspaper_id): Path<Uuid>,
) -> Result<Json<NewspaperItem>> {
    let repo = Repository::new(state.db.clone());
    let detail = repo.assign_publisher(newspaper_id, auth.redactor_id).await?;

    metrics::record_publisher_change("assign");

    tracing::info!(
        newspaper_id = %newspaper_id,
        redactor = %auth.username,
        "Publisher assigned"
    );

    Ok(Json(detail.into()))
}

/// Drop the authenticated redactor from the newspaper's publishers
pub async fn remove_publisher(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(newspaper_id): Path<Uuid>,
) -> Result<Json<NewspaperItem>> {
    let repo = Repository::new(state.db.clone());
    let detail = repo.remove_publisher(newspaper_id, auth.redactor_id).await?;

    metrics::record_publisher_change("remove");

    tracing::info!(
        newspaper_id = %newspaper_id,
        redactor = %auth.username,
        "Publisher removed"
    );

    Ok(Json(detail.into()))
}
