//! Landing dashboard handler

use axum::{extract::State, Json};
use serde::Serialize;
use std::time::Instant;

use crate::handlers::newspapers::{NewspaperItem, RedactorRef};
use crate::AppState;
use newsroom_common::{db::Repository, errors::Result, metrics};

/// Dashboard counts and highlight lists
#[derive(Serialize)]
pub struct DashboardResponse {
    pub num_redactors: u64,
    pub num_newspapers: u64,
    pub num_topics: u64,
    pub newspapers_today: u64,
    pub newspapers_week: u64,
    pub newspapers_month: u64,
    pub latest_newspapers: Vec<NewspaperItem>,
    pub active_redactors: Vec<RedactorRef>,
    pub inactive_redactors: Vec<RedactorRef>,
}

/// Take a dashboard snapshot
///
/// Open to unauthenticated callers, like the health probes.
pub async fn dashboard(State(state): State<AppState>) -> Result<Json<DashboardResponse>> {
    let start = Instant::now();

    let repo = Repository::new(state.db.clone());
    let snapshot = repo.dashboard_snapshot().await?;

    metrics::record_dashboard(start.elapsed().as_secs_f64());

    Ok(Json(DashboardResponse {
        num_redactors: snapshot.num_redactors,
        num_newspapers: snapshot.num_newspapers,
        num_topics: snapshot.num_topics,
        newspapers_today: snapshot.newspapers_today,
        newspapers_week: snapshot.newspapers_week,
        newspapers_month: snapshot.newspapers_month,
        latest_newspapers: snapshot
            .latest_newspapers
            .into_iter()
            .map(Into::into)
            .collect(),
        active_redactors: snapshot
            .active_redactors
            .into_iter()
            .map(RedactorRef::from)
            .collect(),
        inactive_redactors: snapshot
            .inactive_redactors
            .into_iter()
            .map(RedactorRef::from)
            .collect(),
    }))
}
