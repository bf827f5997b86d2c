//! Topic management handlers

use axum::{
    extract::{Path, State},
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
    auth::AuthContext,
    db::Repository,
    errors::{AppError, Result},
    metrics,
};

/// Request to create a topic
#[derive(Debug, Deserialize, Validate)]
pub struct CreateTopicRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
}

#[derive(Serialize)]
pub struct TopicItem {
    pub id: Uuid,
    pub name: String,
    pub publications_count: i64,
}

#[derive(Serialize)]
pub struct TopicListResponse {
    pub topics: Vec<TopicItem>,
}

#[derive(Serialize)]
pub struct TopicDetailResponse {
    pub id: Uuid,
    pub name: String,
    pub newspapers: Vec<NewspaperItem>,
}

/// List all topics with their newspaper counts
pub async fn list_topics(
    State(state): State<AppState>,
    _auth: AuthContext,
) -> Result<Json<TopicListResponse>> {
    let start = Instant::now();

    let repo = Repository::new(state.db.clone());
    let topics = repo.list_topics().await?;

    metrics::record_listing("topics", start.elapsed().as_secs_f64(), topics.len());

    Ok(Json(TopicListResponse {
        topics: topics
            .into_iter()
            .map(|t| TopicItem {
                id: t.id,
                name: t.name,
                publications_count: t.publications_count,
            })
            .collect(),
    }))
}

/// Get a topic with its newspapers, newest first
pub async fn get_topic(
    State(state): State<AppState>,
    _auth: AuthContext,
    Path(topic_id): Path<Uuid>,
) -> Result<Json<TopicDetailResponse>> {
    let repo = Repository::new(state.db.clone());
    let detail = repo.get_topic_detail(topic_id).await?;

    Ok(Json(TopicDetailResponse {
        id: detail.topic.id,
        name: detail.topic.name,
        newspapers: detail.newspapers.into_iter().map(Into::into).collect(),
    }))
}

/// Create a new topic
pub async fn create_topic(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(request): Json<CreateTopicRequest>,
) -> Result<(StatusCode, Json<TopicItem>)> {
    request.validate().map_err(|e| AppError::Validation {
        message: e.to_string(),
        field: Some("name".to_string()),
    })?;

    let name = request.name.trim().to_string();
    if name.is_empty() {
        return Err(AppError::Validation {
            message: "Topic name must not be blank".to_string(),
            field: Some("name".to_string()),
        });
    }

    let repo = Repository::new(state.db.clone());
    let topic = repo.create_topic(name).await?;

    metrics::record_write("topics", "create");

    tracing::info!(
        topic_id = %topic.id,
        name = %topic.name,
        by = %auth.username,
        "Topic created"
    );

    Ok((
        StatusCode::CREATED,
        Json(TopicItem {
            id: topic.id,
            name: topic.name,
            publications_count: 0,
        }),
    ))
}

/// Delete a topic together with its newspapers
pub async fn delete_topic(
    State(state): State<AppState>,
    auth: AuthContext,
    Path(topic_id): Path<Uuid>,
) -> Result<StatusCode> {
    let repo = Repository::new(state.db.clone());

    let deleted = repo.delete_topic(topic_id).await?;
    if !deleted {
        return Err(AppError::TopicNotFound {
            id: topic_id.to_string(),
        });
    }

    metrics::record_write("topics", "delete");

    tracing::info!(
        topic_id = %topic_id,
        by = %auth.username,
        "Topic deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_create_topic_rejects_empty_name() {
        let request: CreateTopicRequest = serde_json::from_value(json!({ "name": "" })).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_topic_rejects_overlong_name() {
        let request: CreateTopicRequest =
            serde_json::from_value(json!({ "name": "x".repeat(256) })).unwrap();
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_create_topic_accepts_normal_name() {
        let request: CreateTopicRequest =
            serde_json::from_value(json!({ "name": "Economy" })).unwrap();
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_whitespace_only_name_survives_validate() {
        // length(min = 1) counts the space; the handler trims and rejects
        let request: CreateTopicRequest = serde_json::from_value(json!({ "name": " " })).unwrap();
        assert!(request.validate().is_ok());
        assert!(request.name.trim().is_empty());
    }
}
