use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use uuid::Uuid;

use super::{IssueStore, StoreResult};
use crate::config::DatabaseConfig;
use crate::models::{Condition, Issue, IssuePatch, IssueQuery, NewIssue};

const ISSUE_COLUMNS: &str = "id, project, issue_title, issue_text, created_by, \
     assigned_to, status_text, open, created_on, updated_on";

/// PostgreSQL-backed issue store
///
/// Insertion order comes from the `seq` column.
#[derive(Debug, Clone)]
pub struct PgIssueStore {
    pool: PgPool,
}

impl PgIssueStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Opens a pool whose sessions compare and return timestamps in UTC
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, sqlx::Error> {
        log::info!("Connecting issue store to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .acquire_timeout(config.acquire_timeout)
            .idle_timeout(Some(config.idle_timeout))
            .max_lifetime(Some(config.max_lifetime))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("SET timezone = 'UTC'").execute(conn).await?;
                    Ok(())
                })
            })
            .connect(&config.url)
            .await?;

        log::info!(
            "Issue store pool ready (max: {}, min: {})",
            config.max_connections,
            config.min_connections
        );

        Ok(Self::new(pool))
    }

    /// Creates or upgrades the `issues` table
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        log::info!("Issue schema is up to date");
        Ok(())
    }
}

fn push_condition(qb: &mut QueryBuilder<'_, Postgres>, condition: &Condition) {
    qb.push(" AND ");
    match condition {
        Condition::Id(id) => {
            qb.push("id = ").push_bind(*id);
        }
        Condition::Text(field, value) => {
            // Column names come from a closed enum
            qb.push(field.as_str()).push(" = ").push_bind(value.clone());
        }
        Condition::Open(open) => {
            qb.push("open = ").push_bind(*open);
        }
        Condition::CreatedOn(ts) => {
            qb.push("created_on = ").push_bind(*ts);
        }
        Condition::UpdatedOn(ts) => {
            qb.push("updated_on = ").push_bind(*ts);
        }
    }
}

#[async_trait]
impl IssueStore for PgIssueStore {
    async fn insert(&self, issue: NewIssue) -> StoreResult<Issue> {
        let query = format!(
            r#"
            INSERT INTO issues (id, project, issue_title, issue_text, created_by,
                                assigned_to, status_text, open)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            ISSUE_COLUMNS
        );

        let issue = sqlx::query_as::<_, Issue>(&query)
            .bind(Uuid::new_v4())
            .bind(&issue.project)
            .bind(&issue.issue_title)
            .bind(&issue.issue_text)
            .bind(&issue.created_by)
            .bind(&issue.assigned_to)
            .bind(&issue.status_text)
            .bind(issue.open)
            .fetch_one(&self.pool)
            .await?;

        Ok(issue)
    }

    async fn find_many(&self, query: &IssueQuery) -> StoreResult<Vec<Issue>> {
        if query.filter.is_unsatisfiable() {
            return Ok(Vec::new());
        }

        let mut qb = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM issues WHERE project = ",
            ISSUE_COLUMNS
        ));
        qb.push_bind(query.project.clone());
        for condition in query.filter.conditions() {
            push_condition(&mut qb, condition);
        }
        qb.push(" ORDER BY seq ASC");

        let issues = qb.build_query_as::<Issue>().fetch_all(&self.pool).await?;

        Ok(issues)
    }

    async fn find_by_id(&self, id: &str) -> StoreResult<Option<Issue>> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(None);
        };

        let query = format!("SELECT {} FROM issues WHERE id = $1", ISSUE_COLUMNS);
        let issue = sqlx::query_as::<_, Issue>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(issue)
    }

    async fn patch_by_id(&self, id: &str, patch: &IssuePatch) -> StoreResult<()> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(());
        };

        let mut qb = QueryBuilder::<Postgres>::new(
            "UPDATE issues SET updated_on = GREATEST(NOW(), updated_on + INTERVAL '1 microsecond')",
        );
        for (field, value) in &patch.text {
            qb.push(", ")
                .push(field.as_str())
                .push(" = ")
                .push_bind(value.clone());
        }
        if let Some(open) = patch.open {
            qb.push(", open = ").push_bind(open);
        }
        qb.push(" WHERE id = ").push_bind(id);

        qb.build().execute(&self.pool).await?;

        Ok(())
    }

    async fn delete_by_id(&self, id: &str) -> StoreResult<()> {
        let Ok(id) = Uuid::parse_str(id) else {
            return Ok(());
        };

        sqlx::query("DELETE FROM issues WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }
}
