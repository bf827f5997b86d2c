//! Repository pattern for database operations
//!
//! Provides a clean interface for all data access operations with proper
//! error handling. Listing queries are built by private helpers so the
//! generated SQL stays testable without a live database.

use crate::db::filter::{like_pattern, NewspaperFilter, PublicationPeriod, PublicationWindow, RedactorFilter};
use crate::db::models::*;
use crate::db::DbPool;
use crate::errors::{AppError, Result};
use crate::{DASHBOARD_LATEST_COUNT, NEWSPAPER_PAGE_SIZE, REDACTOR_PAGE_SIZE};
use chrono::{DateTime, Utc};
use sea_orm::prelude::DateTimeWithTimeZone;
use sea_orm::sea_query::{extension::postgres::PgExpr, Expr, Func, Query, SelectStatement, SimpleExpr};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, EntityTrait,
    FromQueryResult, JoinType, LoaderTrait, ModelTrait, PaginatorTrait, QueryFilter, QueryOrder,
    QuerySelect, RelationTrait, Select, Set, Statement,
};
use serde::Serialize;
use uuid::Uuid;

/// One page of a listing
#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// Topic listing row with its newspaper count
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct TopicWithCount {
    pub id: Uuid,
    pub name: String,
    pub publications_count: i64,
}

/// Redactor listing row with its distinct newspaper count
#[derive(Debug, Clone, PartialEq, FromQueryResult, Serialize)]
pub struct RedactorWithCount {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub years_of_experience: i32,
    pub created_at: DateTimeWithTimeZone,
    pub publications_count: i64,
}

/// Newspaper with its topic and publishers eagerly loaded
#[derive(Debug, Clone, Serialize)]
pub struct NewspaperWithRefs {
    pub newspaper: Newspaper,
    pub topic: Topic,
    pub publishers: Vec<Redactor>,
}

/// Topic with its newspapers
#[derive(Debug, Clone, Serialize)]
pub struct TopicDetail {
    pub topic: Topic,
    pub newspapers: Vec<NewspaperWithRefs>,
}

/// Redactor with its newspapers and the number of distinct topics covered
#[derive(Debug, Clone, Serialize)]
pub struct RedactorDetail {
    pub redactor: Redactor,
    pub newspapers: Vec<NewspaperWithRefs>,
    pub topics_count: i64,
}

/// Counts and highlight lists for the landing dashboard
///
/// All time windows are anchored at a single `now` captured when the
/// snapshot is taken, so the figures are mutually consistent.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSnapshot {
    pub num_redactors: u64,
    pub num_newspapers: u64,
    pub num_topics: u64,
    pub newspapers_today: u64,
    pub newspapers_week: u64,
    pub newspapers_month: u64,
    pub latest_newspapers: Vec<NewspaperWithRefs>,
    pub active_redactors: Vec<Redactor>,
    pub inactive_redactors: Vec<Redactor>,
}

// ============================================================================
// Query Builders
// ============================================================================

fn newspaper_listing_query(filter: &NewspaperFilter, now: DateTime<Utc>) -> Select<NewspaperEntity> {
    let mut query = NewspaperEntity::find()
        .join(JoinType::InnerJoin, newspaper::Relation::Topic.def())
        .order_by_desc(NewspaperColumn::PublishedDate)
        .order_by_asc(TopicColumn::Name);

    if let Some(period) = filter.period {
        query = query.filter(period.window(now).condition());
    }

    if let Some(pattern) = like_pattern(filter.title.as_deref()) {
        query = query.filter(Expr::col((NewspaperEntity, NewspaperColumn::Title)).ilike(pattern));
    }

    query
}

fn redactor_listing_query(filter: &RedactorFilter) -> Select<RedactorEntity> {
    let mut query = RedactorEntity::find()
        .select_only()
        .columns([
            RedactorColumn::Id,
            RedactorColumn::Username,
            RedactorColumn::FirstName,
            RedactorColumn::LastName,
            RedactorColumn::Email,
            RedactorColumn::YearsOfExperience,
            RedactorColumn::CreatedAt,
        ])
        .column_as(
            SimpleExpr::from(Func::count_distinct(Expr::col((
                NewspaperPublisherEntity,
                NewspaperPublisherColumn::NewspaperId,
            )))),
            "publications_count",
        )
        .join(JoinType::LeftJoin, redactor::Relation::NewspaperPublishers.def())
        .group_by(RedactorColumn::Id)
        .order_by_asc(RedactorColumn::Username);

    if let Some(pattern) = like_pattern(filter.username.as_deref()) {
        query = query.filter(Expr::col((RedactorEntity, RedactorColumn::Username)).ilike(pattern));
    }

    query
}

fn topic_listing_query() -> Select<TopicEntity> {
    // The count is intentionally not DISTINCT: one row per newspaper
    TopicEntity::find()
        .select_only()
        .columns([TopicColumn::Id, TopicColumn::Name])
        .column_as(NewspaperColumn::Id.count(), "publications_count")
        .join(JoinType::LeftJoin, topic::Relation::Newspapers.def())
        .group_by(TopicColumn::Id)
        .order_by_asc(TopicColumn::Name)
}

/// IDs of redactors credited on at least one newspaper published since `since`
fn published_redactor_ids_since(since: DateTime<Utc>) -> SelectStatement {
    Query::select()
        .distinct()
        .column((NewspaperPublisherEntity, NewspaperPublisherColumn::RedactorId))
        .from(NewspaperPublisherEntity)
        .inner_join(
            NewspaperEntity,
            Expr::col((NewspaperEntity, NewspaperColumn::Id)).equals((
                NewspaperPublisherEntity,
                NewspaperPublisherColumn::NewspaperId,
            )),
        )
        .and_where(Expr::col((NewspaperEntity, NewspaperColumn::PublishedDate)).gte(since))
        .to_owned()
}

fn active_redactors_query(since: DateTime<Utc>) -> Select<RedactorEntity> {
    RedactorEntity::find()
        .filter(RedactorColumn::Id.in_subquery(published_redactor_ids_since(since)))
        .order_by_asc(RedactorColumn::Username)
}

fn inactive_redactors_query(since: DateTime<Utc>) -> Select<RedactorEntity> {
    RedactorEntity::find()
        .filter(RedactorColumn::Id.not_in_subquery(published_redactor_ids_since(since)))
        .order_by_asc(RedactorColumn::Username)
}

fn distinct_topics_query(redactor_id: Uuid) -> Select<NewspaperEntity> {
    NewspaperEntity::find()
        .select_only()
        .column_as(
            SimpleExpr::from(Func::count_distinct(Expr::col((
                NewspaperEntity,
                NewspaperColumn::TopicId,
            )))),
            "topics_count",
        )
        .join(JoinType::InnerJoin, newspaper::Relation::NewspaperPublishers.def())
        .filter(NewspaperPublisherColumn::RedactorId.eq(redactor_id))
}

// ============================================================================
// Repository
// ============================================================================

/// Repository for data access operations
#[derive(Clone)]
pub struct Repository {
    pool: DbPool,
}

impl Repository {
    /// Create a new repository with the given connection pool
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    fn conn(&self) -> &DatabaseConnection {
        self.pool.conn()
    }

    // ========================================================================
    // Health Check
    // ========================================================================

    /// Ping the database
    pub async fn ping(&self) -> Result<()> {
        self.pool.ping().await
    }

    // ========================================================================
    // Topic Operations
    // ========================================================================

    /// List all topics with their newspaper counts, ordered by name
    pub async fn list_topics(&self) -> Result<Vec<TopicWithCount>> {
        topic_listing_query()
            .into_model::<TopicWithCount>()
            .all(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Find topic by ID
    pub async fn find_topic_by_id(&self, id: Uuid) -> Result<Option<Topic>> {
        TopicEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Get a topic together with its newspapers, newest first
    pub async fn get_topic_detail(&self, id: Uuid) -> Result<TopicDetail> {
        let topic = self
            .find_topic_by_id(id)
            .await?
            .ok_or_else(|| AppError::TopicNotFound { id: id.to_string() })?;

        let rows = topic
            .find_related(NewspaperEntity)
            .order_by_desc(NewspaperColumn::PublishedDate)
            .all(self.conn())
            .await?;
        let newspapers = self.attach_refs(rows).await?;

        Ok(TopicDetail { topic, newspapers })
    }

    /// Create a new topic
    pub async fn create_topic(&self, name: String) -> Result<Topic> {
        let existing = TopicEntity::find()
            .filter(TopicColumn::Name.eq(name.as_str()))
            .one(self.conn())
            .await?;
        if existing.is_some() {
            return Err(AppError::Validation {
                message: format!("Topic already exists: {}", name),
                field: Some("name".to_string()),
            });
        }

        let topic = TopicActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(name),
        };

        topic.insert(self.conn()).await.map_err(Into::into)
    }

    /// Delete topic by ID; its newspapers go with it
    pub async fn delete_topic(&self, id: Uuid) -> Result<bool> {
        let result = TopicEntity::delete_by_id(id).exec(self.conn()).await?;
        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Redactor Operations
    // ========================================================================

    /// List redactors with distinct newspaper counts, filtered and paginated
    pub async fn list_redactors(
        &self,
        filter: &RedactorFilter,
        page: u64,
    ) -> Result<Page<RedactorWithCount>> {
        let paginator = redactor_listing_query(filter)
            .into_model::<RedactorWithCount>()
            .paginate(self.conn(), REDACTOR_PAGE_SIZE);

        let counts = paginator.num_items_and_pages().await?;
        let items = paginator.fetch_page(page.saturating_sub(1)).await?;

        Ok(Page {
            items,
            total: counts.number_of_items,
            page,
            page_size: REDACTOR_PAGE_SIZE,
            total_pages: counts.number_of_pages,
        })
    }

    /// Find redactor by ID
    pub async fn find_redactor_by_id(&self, id: Uuid) -> Result<Option<Redactor>> {
        RedactorEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Find redactor by username
    pub async fn find_redactor_by_username(&self, username: &str) -> Result<Option<Redactor>> {
        RedactorEntity::find()
            .filter(RedactorColumn::Username.eq(username))
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Get a redactor with their newspapers and distinct topic count
    pub async fn get_redactor_detail(&self, id: Uuid) -> Result<RedactorDetail> {
        let redactor = self
            .find_redactor_by_id(id)
            .await?
            .ok_or_else(|| AppError::RedactorNotFound { id: id.to_string() })?;

        let rows = redactor
            .find_related(NewspaperEntity)
            .order_by_desc(NewspaperColumn::PublishedDate)
            .all(self.conn())
            .await?;
        let newspapers = self.attach_refs(rows).await?;

        let topics_count: Option<i64> = distinct_topics_query(id)
            .into_tuple()
            .one(self.conn())
            .await?;

        Ok(RedactorDetail {
            redactor,
            newspapers,
            topics_count: topics_count.unwrap_or(0),
        })
    }

    /// Create a new redactor account
    pub async fn create_redactor(
        &self,
        username: String,
        first_name: String,
        last_name: String,
        email: String,
        password_hash: String,
        years_of_experience: i32,
    ) -> Result<Redactor> {
        if self.find_redactor_by_username(&username).await?.is_some() {
            return Err(AppError::Validation {
                message: format!("Username already taken: {}", username),
                field: Some("username".to_string()),
            });
        }

        let redactor = RedactorActiveModel {
            id: Set(Uuid::new_v4()),
            username: Set(username),
            first_name: Set(first_name),
            last_name: Set(last_name),
            email: Set(email),
            password_hash: Set(password_hash),
            years_of_experience: Set(years_of_experience),
            created_at: Set(Utc::now().into()),
        };

        redactor.insert(self.conn()).await.map_err(Into::into)
    }

    /// Update a redactor's years of experience; all other fields stay put
    pub async fn update_redactor_experience(
        &self,
        id: Uuid,
        years_of_experience: i32,
    ) -> Result<Redactor> {
        let mut redactor: RedactorActiveModel = RedactorEntity::find_by_id(id)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::RedactorNotFound { id: id.to_string() })?
            .into();

        redactor.years_of_experience = Set(years_of_experience);
        redactor.update(self.conn()).await.map_err(Into::into)
    }

    /// Delete redactor by ID; newspapers they published survive
    pub async fn delete_redactor(&self, id: Uuid) -> Result<bool> {
        let result = RedactorEntity::delete_by_id(id).exec(self.conn()).await?;
        Ok(result.rows_affected > 0)
    }

    // ========================================================================
    // Newspaper Operations
    // ========================================================================

    /// List newspapers with topic and publishers, filtered and paginated
    pub async fn list_newspapers(
        &self,
        filter: &NewspaperFilter,
        page: u64,
    ) -> Result<Page<NewspaperWithRefs>> {
        let paginator =
            newspaper_listing_query(filter, Utc::now()).paginate(self.conn(), NEWSPAPER_PAGE_SIZE);

        let counts = paginator.num_items_and_pages().await?;
        let rows = paginator.fetch_page(page.saturating_sub(1)).await?;
        let items = self.attach_refs(rows).await?;

        Ok(Page {
            items,
            total: counts.number_of_items,
            page,
            page_size: NEWSPAPER_PAGE_SIZE,
            total_pages: counts.number_of_pages,
        })
    }

    /// Find newspaper by ID
    pub async fn find_newspaper_by_id(&self, id: Uuid) -> Result<Option<Newspaper>> {
        NewspaperEntity::find_by_id(id)
            .one(self.conn())
            .await
            .map_err(Into::into)
    }

    /// Get a newspaper with its topic and publishers
    pub async fn get_newspaper_detail(&self, id: Uuid) -> Result<NewspaperWithRefs> {
        let newspaper = self
            .find_newspaper_by_id(id)
            .await?
            .ok_or_else(|| AppError::NewspaperNotFound { id: id.to_string() })?;

        self.newspaper_with_refs(newspaper).await
    }

    /// Create a newspaper under an existing topic, optionally crediting
    /// publishers right away
    ///
    /// The newspaper row is inserted first and the publisher associations
    /// after it, mirroring a save-then-associate flow; there is no wrapping
    /// transaction.
    pub async fn create_newspaper(
        &self,
        title: String,
        content: String,
        topic_id: Uuid,
        publisher_ids: Vec<Uuid>,
    ) -> Result<NewspaperWithRefs> {
        let topic = self
            .find_topic_by_id(topic_id)
            .await?
            .ok_or_else(|| AppError::TopicNotFound {
                id: topic_id.to_string(),
            })?;

        let mut publisher_ids = publisher_ids;
        publisher_ids.sort();
        publisher_ids.dedup();

        let mut publishers = Vec::new();
        if !publisher_ids.is_empty() {
            publishers = RedactorEntity::find()
                .filter(RedactorColumn::Id.is_in(publisher_ids.clone()))
                .all(self.conn())
                .await?;
            if publishers.len() != publisher_ids.len() {
                return Err(AppError::Validation {
                    message: "One or more publisher ids do not exist".to_string(),
                    field: Some("publisher_ids".to_string()),
                });
            }
            publishers.sort_by(|a, b| a.username.cmp(&b.username));
        }

        let newspaper = NewspaperActiveModel {
            id: Set(Uuid::new_v4()),
            title: Set(title),
            content: Set(content),
            published_date: Set(Utc::now().into()),
            topic_id: Set(topic_id),
        };
        let newspaper = newspaper.insert(self.conn()).await?;

        if !publisher_ids.is_empty() {
            let rows: Vec<NewspaperPublisherActiveModel> = publisher_ids
                .iter()
                .map(|redactor_id| NewspaperPublisherActiveModel {
                    newspaper_id: Set(newspaper.id),
                    redactor_id: Set(*redactor_id),
                })
                .collect();
            NewspaperPublisherEntity::insert_many(rows)
                .exec(self.conn())
                .await?;
        }

        Ok(NewspaperWithRefs {
            newspaper,
            topic,
            publishers,
        })
    }

    /// Update a newspaper's title and content; `published_date` and
    /// `topic_id` are immutable
    pub async fn update_newspaper(
        &self,
        id: Uuid,
        title: String,
        content: String,
    ) -> Result<NewspaperWithRefs> {
        let mut newspaper: NewspaperActiveModel = NewspaperEntity::find_by_id(id)
            .one(self.conn())
            .await?
            .ok_or_else(|| AppError::NewspaperNotFound { id: id.to_string() })?
            .into();

        newspaper.title = Set(title);
        newspaper.content = Set(content);
        let updated = newspaper.update(self.conn()).await?;

        self.newspaper_with_refs(updated).await
    }

    /// Delete newspaper by ID; publisher accounts survive
    pub async fn delete_newspaper(&self, id: Uuid) -> Result<bool> {
        let result = NewspaperEntity::delete_by_id(id).exec(self.conn()).await?;
        Ok(result.rows_affected > 0)
    }

    /// Credit a redactor as publisher of a newspaper
    ///
    /// Idempotent: crediting an already-credited redactor is a no-op.
    pub async fn assign_publisher(
        &self,
        newspaper_id: Uuid,
        redactor_id: Uuid,
    ) -> Result<NewspaperWithRefs> {
        self.find_newspaper_by_id(newspaper_id)
            .await?
            .ok_or_else(|| AppError::NewspaperNotFound {
                id: newspaper_id.to_string(),
            })?;
        self.find_redactor_by_id(redactor_id)
            .await?
            .ok_or_else(|| AppError::RedactorNotFound {
                id: redactor_id.to_string(),
            })?;

        let stmt = Statement::from_sql_and_values(
            DbBackend::Postgres,
            r#"
            INSERT INTO newspaper_publishers (newspaper_id, redactor_id)
            VALUES ($1, $2)
            ON CONFLICT (newspaper_id, redactor_id) DO NOTHING
            "#,
            vec![newspaper_id.into(), redactor_id.into()],
        );
        self.conn().execute(stmt).await?;

        self.get_newspaper_detail(newspaper_id).await
    }

    /// Drop a redactor from a newspaper's publishers
    ///
    /// Idempotent: removing an absent association is a no-op.
    pub async fn remove_publisher(
        &self,
        newspaper_id: Uuid,
        redactor_id: Uuid,
    ) -> Result<NewspaperWithRefs> {
        self.find_newspaper_by_id(newspaper_id)
            .await?
            .ok_or_else(|| AppError::NewspaperNotFound {
                id: newspaper_id.to_string(),
            })?;

        NewspaperPublisherEntity::delete_many()
            .filter(NewspaperPublisherColumn::NewspaperId.eq(newspaper_id))
            .filter(NewspaperPublisherColumn::RedactorId.eq(redactor_id))
            .exec(self.conn())
            .await?;

        self.get_newspaper_detail(newspaper_id).await
    }

    // ========================================================================
    // Dashboard
    // ========================================================================

    /// Take a consistent dashboard snapshot
    ///
    /// The period counts use the same window predicates as the newspaper
    /// listing filter, and the active/inactive split shares one subquery so
    /// the two lists partition the redactors exactly.
    pub async fn dashboard_snapshot(&self) -> Result<DashboardSnapshot> {
        let now = Utc::now();
        let today = PublicationPeriod::Today.window(now);
        let week = PublicationPeriod::Week.window(now);
        let month = PublicationPeriod::Month.window(now);

        let num_redactors = RedactorEntity::find().count(self.conn()).await?;
        let num_newspapers = NewspaperEntity::find().count(self.conn()).await?;
        let num_topics = TopicEntity::find().count(self.conn()).await?;

        let newspapers_today = self.count_newspapers_in(&today).await?;
        let newspapers_week = self.count_newspapers_in(&week).await?;
        let newspapers_month = self.count_newspapers_in(&month).await?;

        let latest = NewspaperEntity::find()
            .order_by_desc(NewspaperColumn::PublishedDate)
            .limit(DASHBOARD_LATEST_COUNT)
            .all(self.conn())
            .await?;
        let latest_newspapers = self.attach_refs(latest).await?;

        let active_redactors = active_redactors_query(week.since).all(self.conn()).await?;
        let inactive_redactors = inactive_redactors_query(week.since).all(self.conn()).await?;

        Ok(DashboardSnapshot {
            num_redactors,
            num_newspapers,
            num_topics,
            newspapers_today,
            newspapers_week,
            newspapers_month,
            latest_newspapers,
            active_redactors,
            inactive_redactors,
        })
    }

    async fn count_newspapers_in(&self, window: &PublicationWindow) -> Result<u64> {
        NewspaperEntity::find()
            .filter(window.condition())
            .count(self.conn())
            .await
            .map_err(Into::into)
    }

    // ========================================================================
    // Eager Loading
    // ========================================================================

    /// Attach topic and publishers to a batch of newspapers
    ///
    /// Two loader queries regardless of batch size.
    async fn attach_refs(&self, newspapers: Vec<Newspaper>) -> Result<Vec<NewspaperWithRefs>> {
        if newspapers.is_empty() {
            return Ok(Vec::new());
        }

        let topics = newspapers.load_one(TopicEntity, self.conn()).await?;
        let publishers = newspapers
            .load_many_to_many(RedactorEntity, NewspaperPublisherEntity, self.conn())
            .await?;

        let mut items = Vec::with_capacity(newspapers.len());
        for ((newspaper, topic), publishers) in
            newspapers.into_iter().zip(topics).zip(publishers)
        {
            let topic = topic.ok_or_else(|| AppError::Internal {
                message: format!("Newspaper {} references a missing topic", newspaper.id),
            })?;
            items.push(NewspaperWithRefs {
                newspaper,
                topic,
                publishers,
            });
        }
        Ok(items)
    }

    async fn newspaper_with_refs(&self, newspaper: Newspaper) -> Result<NewspaperWithRefs> {
        let mut items = self.attach_refs(vec![newspaper]).await?;
        items.pop().ok_or_else(|| AppError::Internal {
            message: "Eager loading dropped a newspaper row".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use sea_orm::{MockDatabase, MockExecResult, QueryTrait};
    use std::sync::Arc;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 15, 13, 45, 0).unwrap()
    }

    fn sql<E: EntityTrait>(query: &Select<E>) -> String {
        query.build(DbBackend::Postgres).to_string()
    }

    fn sample_topic() -> Topic {
        Topic {
            id: Uuid::new_v4(),
            name: "Sports".to_string(),
        }
    }

    fn sample_redactor() -> Redactor {
        Redactor {
            id: Uuid::new_v4(),
            username: "jsmith".to_string(),
            first_name: "John".to_string(),
            last_name: "Smith".to_string(),
            email: "jsmith@example.com".to_string(),
            password_hash: "$argon2id$fake".to_string(),
            years_of_experience: 3,
            created_at: fixed_now().into(),
        }
    }

    fn sample_newspaper(topic_id: Uuid) -> Newspaper {
        Newspaper {
            id: Uuid::new_v4(),
            title: "Local Derby Recap".to_string(),
            content: "Full coverage".to_string(),
            published_date: fixed_now().into(),
            topic_id,
        }
    }

    fn mock_repository(db: MockDatabase) -> Repository {
        Repository::new(DbPool {
            conn: Arc::new(db.into_connection()),
        })
    }

    // Debug output escapes the quoted identifiers; undo that so the
    // assertions below can use plain SQL fragments. Takes the last live
    // handle so the connection unwraps.
    fn transaction_log(repository: Repository) -> String {
        let Repository { pool } = repository;
        let conn = Arc::try_unwrap(pool.conn).ok().unwrap();
        format!("{:?}", conn.into_transaction_log()).replace("\\\"", "\"")
    }

    // ------------------------------------------------------------------
    // Query building
    // ------------------------------------------------------------------

    #[test]
    fn test_newspaper_listing_defaults() {
        let query = newspaper_listing_query(&NewspaperFilter::default(), fixed_now());
        let sql = sql(&query);

        assert!(sql.contains(r#"INNER JOIN "topics""#));
        assert!(sql.contains(r#"ORDER BY "newspapers"."published_date" DESC, "topics"."name" ASC"#));
        assert!(!sql.contains("WHERE"));
    }

    #[test]
    fn test_unrecognized_period_matches_unfiltered() {
        let unfiltered = NewspaperFilter::default();
        let garbage = NewspaperFilter {
            title: None,
            period: PublicationPeriod::from_param(Some("year")),
        };

        assert_eq!(
            sql(&newspaper_listing_query(&garbage, fixed_now())),
            sql(&newspaper_listing_query(&unfiltered, fixed_now()))
        );
    }

    #[test]
    fn test_title_filter_uses_ilike_substring() {
        let filter = NewspaperFilter {
            title: Some("wall".to_string()),
            period: None,
        };
        let sql = sql(&newspaper_listing_query(&filter, fixed_now()));

        assert!(sql.contains("ILIKE"));
        assert!(sql.contains("%wall%"));
    }

    #[test]
    fn test_today_filter_bounds_the_calendar_day() {
        let filter = NewspaperFilter {
            title: None,
            period: Some(PublicationPeriod::Today),
        };
        let sql = sql(&newspaper_listing_query(&filter, fixed_now()));

        assert!(sql.contains(">="));
        assert!(sql.contains("2024-05-15 00:00:00"));
        assert!(sql.contains("2024-05-16 00:00:00"));
    }

    #[test]
    fn test_week_filter_is_open_ended() {
        let filter = NewspaperFilter {
            title: None,
            period: Some(PublicationPeriod::Week),
        };
        let sql = sql(&newspaper_listing_query(&filter, fixed_now()));

        assert!(sql.contains(">="));
        assert!(sql.contains("2024-05-08 13:45:00"));
        assert!(!sql.contains(" < "));
    }

    #[test]
    fn test_combined_filters_apply_both_predicates() {
        let filter = NewspaperFilter {
            title: Some("recap".to_string()),
            period: Some(PublicationPeriod::Month),
        };
        let sql = sql(&newspaper_listing_query(&filter, fixed_now()));

        assert!(sql.contains("%recap%"));
        assert!(sql.contains("2024-04-15 13:45:00"));
    }

    #[test]
    fn test_dashboard_counts_reuse_listing_predicates() {
        let now = fixed_now();
        let filter = NewspaperFilter {
            title: None,
            period: Some(PublicationPeriod::Week),
        };
        let listing = sql(&newspaper_listing_query(&filter, now));
        let counting =
            sql(&NewspaperEntity::find().filter(PublicationPeriod::Week.window(now).condition()));

        let listing_predicate = listing
            .split(" WHERE ")
            .nth(1)
            .and_then(|clause| clause.split(" ORDER BY ").next())
            .unwrap();
        let counting_predicate = counting.split(" WHERE ").nth(1).unwrap();

        assert_eq!(listing_predicate, counting_predicate);
    }

    #[test]
    fn test_redactor_listing_counts_distinct_newspapers() {
        let sql = sql(&redactor_listing_query(&RedactorFilter::default()));

        assert!(sql.contains("COUNT(DISTINCT "));
        assert!(sql.contains(r#"LEFT JOIN "newspaper_publishers""#));
        assert!(sql.contains("GROUP BY"));
        assert!(sql.contains(r#"ORDER BY "redactors"."username" ASC"#));
        assert!(!sql.contains("password_hash"));
    }

    #[test]
    fn test_redactor_username_filter_uses_ilike() {
        let filter = RedactorFilter {
            username: Some("smith".to_string()),
        };
        let sql = sql(&redactor_listing_query(&filter));

        assert!(sql.contains("ILIKE"));
        assert!(sql.contains("%smith%"));
    }

    #[test]
    fn test_topic_listing_count_is_not_distinct() {
        let sql = sql(&topic_listing_query());

        assert!(sql.contains("COUNT("));
        assert!(!sql.contains("DISTINCT"));
        assert!(sql.contains(r#"LEFT JOIN "newspapers""#));
        assert!(sql.contains(r#"ORDER BY "topics"."name" ASC"#));
    }

    #[test]
    fn test_active_and_inactive_share_one_subquery() {
        let since = fixed_now();
        let active = sql(&active_redactors_query(since));
        let inactive = sql(&inactive_redactors_query(since));

        assert!(active.contains(" IN ("));
        assert!(inactive.contains(" NOT IN ("));
        // Swapping the operator must be the only difference
        assert_eq!(active.replace(" IN (", " NOT IN ("), inactive);
    }

    #[test]
    fn test_distinct_topics_count_query() {
        let sql = sql(&distinct_topics_query(Uuid::new_v4()));

        assert!(sql.contains("COUNT(DISTINCT "));
        assert!(sql.contains(r#""newspapers"."topic_id""#));
        assert!(sql.contains(r#"INNER JOIN "newspaper_publishers""#));
    }

    // ------------------------------------------------------------------
    // Mocked flows
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn test_update_newspaper_leaves_published_date_alone() {
        let topic = sample_topic();
        let original = sample_newspaper(topic.id);
        let mut updated = original.clone();
        updated.title = "Fresh Title".to_string();
        updated.content = "Fresh body".to_string();

        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![original.clone()]])
            .append_query_results([vec![updated.clone()]])
            .append_query_results([vec![topic.clone()]])
            .append_query_results([Vec::<NewspaperPublisher>::new()])
            .append_query_results([Vec::<Redactor>::new()]);
        let repo = mock_repository(db);

        let result = repo
            .update_newspaper(
                original.id,
                "Fresh Title".to_string(),
                "Fresh body".to_string(),
            )
            .await
            .unwrap();
        assert_eq!(result.newspaper.title, "Fresh Title");

        let log = transaction_log(repo);
        assert!(log.contains(r#"UPDATE "newspapers""#));
        assert!(log.contains(r#""title" = "#));
        assert!(log.contains(r#""content" = "#));
        assert!(!log.contains(r#""published_date" = "#));
        assert!(!log.contains(r#""topic_id" = "#));
    }

    #[tokio::test]
    async fn test_update_experience_missing_redactor() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([Vec::<Redactor>::new()]);
        let repo = mock_repository(db);

        let err = repo
            .update_redactor_experience(Uuid::new_v4(), 5)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::RedactorNotFound { .. }));
    }

    #[tokio::test]
    async fn test_assign_publisher_inserts_on_conflict_do_nothing() {
        let topic = sample_topic();
        let newspaper = sample_newspaper(topic.id);
        let redactor = sample_redactor();
        let association = NewspaperPublisher {
            newspaper_id: newspaper.id,
            redactor_id: redactor.id,
        };

        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![newspaper.clone()]])
            .append_query_results([vec![redactor.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            }])
            .append_query_results([vec![newspaper.clone()]])
            .append_query_results([vec![topic.clone()]])
            .append_query_results([vec![association]])
            .append_query_results([vec![redactor.clone()]]);
        let repo = mock_repository(db);

        let detail = repo
            .assign_publisher(newspaper.id, redactor.id)
            .await
            .unwrap();
        assert_eq!(detail.publishers.len(), 1);
        assert_eq!(detail.publishers[0].username, "jsmith");

        let log = transaction_log(repo);
        assert!(log.contains("ON CONFLICT"));
        assert!(log.contains("DO NOTHING"));
    }

    #[tokio::test]
    async fn test_assign_publisher_missing_newspaper() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([Vec::<Newspaper>::new()]);
        let repo = mock_repository(db);

        let err = repo
            .assign_publisher(Uuid::new_v4(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NewspaperNotFound { .. }));
    }

    #[tokio::test]
    async fn test_remove_publisher_tolerates_absent_association() {
        let topic = sample_topic();
        let newspaper = sample_newspaper(topic.id);

        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![newspaper.clone()]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![newspaper.clone()]])
            .append_query_results([vec![topic.clone()]])
            .append_query_results([Vec::<NewspaperPublisher>::new()])
            .append_query_results([Vec::<Redactor>::new()]);
        let repo = mock_repository(db);

        let detail = repo
            .remove_publisher(newspaper.id, Uuid::new_v4())
            .await
            .unwrap();
        assert!(detail.publishers.is_empty());

        let log = transaction_log(repo);
        assert!(log.contains(r#"DELETE FROM "newspaper_publishers""#));
    }

    #[tokio::test]
    async fn test_create_newspaper_rejects_unknown_publisher() {
        let topic = sample_topic();

        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![topic.clone()]])
            .append_query_results([Vec::<Redactor>::new()]);
        let repo = mock_repository(db);

        let err = repo
            .create_newspaper(
                "Title".to_string(),
                "Body".to_string(),
                topic.id,
                vec![Uuid::new_v4()],
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, AppError::Validation { ref field, .. } if field.as_deref() == Some("publisher_ids"))
        );
    }

    #[tokio::test]
    async fn test_create_newspaper_requires_existing_topic() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([Vec::<Topic>::new()]);
        let repo = mock_repository(db);

        let err = repo
            .create_newspaper("Title".to_string(), "Body".to_string(), Uuid::new_v4(), vec![])
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::TopicNotFound { .. }));
    }

    #[tokio::test]
    async fn test_create_topic_rejects_duplicate_name() {
        let existing = sample_topic();

        let db = MockDatabase::new(DbBackend::Postgres)
            .append_query_results([vec![existing]]);
        let repo = mock_repository(db);

        let err = repo.create_topic("Sports".to_string()).await.unwrap_err();
        assert!(
            matches!(err, AppError::Validation { ref field, .. } if field.as_deref() == Some("name"))
        );
    }

    #[tokio::test]
    async fn test_delete_newspaper_reports_missing_row() {
        let db = MockDatabase::new(DbBackend::Postgres)
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }]);
        let repo = mock_repository(db);

        let deleted = repo.delete_newspaper(Uuid::new_v4()).await.unwrap();
        assert!(!deleted);
    }

    #[tokio::test]
    async fn test_delete_topic_issues_single_statement() {
        let db = MockDatabase::new(DbBackend::Postgres).append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }]);
        let repo = mock_repository(db);

        assert!(repo.delete_topic(Uuid::new_v4()).await.unwrap());

        // The store cascades to newspapers and publisher rows; the
        // repository must not try to clean those up itself.
        let log = transaction_log(repo);
        assert!(log.contains(r#"DELETE FROM "topics""#));
        assert!(!log.contains("newspapers"));
    }

    #[tokio::test]
    async fn test_cloned_repository_shares_the_connection() {
        let db = MockDatabase::new(DbBackend::Postgres).append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }]);
        let repo = mock_repository(db);
        let cloned = repo.clone();

        assert!(cloned.delete_topic(Uuid::new_v4()).await.unwrap());
        drop(cloned);

        // The original's log carries the statement issued through the clone
        let log = transaction_log(repo);
        assert!(log.contains(r#"DELETE FROM "topics""#));
    }

    // ------------------------------------------------------------------
    // Schema declarations
    // ------------------------------------------------------------------

    #[test]
    fn test_schema_declares_cascades_and_checks() {
        let schema = include_str!("../../../../migrations/0001_initial_schema.sql");

        assert!(schema.contains("REFERENCES topics(id) ON DELETE CASCADE"));
        assert!(schema.contains("REFERENCES newspapers(id) ON DELETE CASCADE"));
        assert!(schema.contains("REFERENCES redactors(id) ON DELETE CASCADE"));
        assert!(schema.contains("PRIMARY KEY (newspaper_id, redactor_id)"));
        assert!(schema.contains("CHECK (years_of_experience >= 0)"));
    }
}
