//! PostgreSQL subscription store.
//!
//! # Responsibilities
//! - Open the connection pool, retrying with backoff until the database answers
//! - Map subscription operations onto parameterized SQL
//! - Translate unique violations and missing rows into storage errors
//! - Apply schema migrations for the migrator binary
//!
//! # Design Decisions
//! - Every value is bound; no user input is formatted into SQL text
//! - Dates are stored as `TIMESTAMPTZ` at the first instant of the month

use std::future::Future;
use std::str::FromStr;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::{PgConnectOptions, PgPoolOptions, PgSslMode};
use sqlx::{PgPool, Postgres, QueryBuilder};
use thiserror::Error;
use uuid::Uuid;

use crate::config::PostgresConfig;
use crate::domain::{NewSubscription, SumFilter, Subscription};
use crate::resilience::{retry_until, RetryError};
use crate::storage::{StorageError, SubscriptionStore};

/// Failure to establish the initial connection.
#[derive(Debug, Error)]
pub enum ConnectError {
    #[error("invalid connection settings: {0}")]
    Options(#[source] StorageError),
    #[error(transparent)]
    Retry(#[from] RetryError<StorageError>),
}

const SELECT_COLUMNS: &str =
    "id, service_name, price, user_id, start_date, end_date, created_at, updated_at";

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    service_name: String,
    price: i64,
    user_id: Uuid,
    start_date: DateTime<Utc>,
    end_date: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<SubscriptionRow> for Subscription {
    fn from(row: SubscriptionRow) -> Self {
        Self {
            id: row.id,
            service_name: row.service_name,
            price: row.price,
            user_id: row.user_id,
            start_date: row.start_date,
            end_date: row.end_date,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

fn map_write_error(err: sqlx::Error) -> StorageError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return StorageError::AlreadyExists;
        }
    }
    if matches!(err, sqlx::Error::RowNotFound) {
        return StorageError::NotFound;
    }
    StorageError::Database(err)
}

/// Connection options built from config.
pub fn connect_options(config: &PostgresConfig) -> Result<PgConnectOptions, StorageError> {
    let ssl_mode = PgSslMode::from_str(&config.sslmode)?;
    Ok(PgConnectOptions::new()
        .host(&config.host)
        .port(config.port)
        .username(&config.user)
        .password(&config.password)
        .database(&config.dbname)
        .ssl_mode(ssl_mode))
}

/// sqlx-backed store.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open the pool and probe it, retrying under the configured backoff policy.
    ///
    /// Gives up once `cancel` completes while waiting between attempts.
    pub async fn connect<C>(config: &PostgresConfig, cancel: C) -> Result<Self, ConnectError>
    where
        C: Future<Output = ()>,
    {
        let policy = config.retry.policy();
        let options = connect_options(config).map_err(ConnectError::Options)?;
        let acquire_timeout = Duration::from_secs(config.acquire_timeout_secs);

        tracing::info!(
            host = %config.host,
            port = config.port,
            database = %config.dbname,
            attempts = policy.attempts(),
            initial_delay = ?policy.initial_delay(),
            max_delay = ?policy.max_delay(),
            step = ?policy.step(),
            "Connecting to PostgreSQL"
        );

        let store = retry_until(&policy, cancel, || {
            let options = options.clone();
            async move {
                metrics::counter!("storage_connect_attempts_total").increment(1);
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .acquire_timeout(acquire_timeout)
                    .connect_with(options)
                    .await?;
                let store = PgStore::new(pool);
                store.ping().await?;
                Ok::<_, StorageError>(store)
            }
        })
        .await
        .inspect_err(|err| {
            tracing::error!(
                database = %config.dbname,
                last_error = %err.last_error(),
                "Giving up on PostgreSQL"
            )
        })?;

        tracing::info!(database = %config.dbname, "Connected to PostgreSQL");
        Ok(store)
    }

    /// Apply pending migrations, returning how many were applied.
    pub async fn migrate(&self) -> Result<u64, StorageError> {
        let before = self.applied_migrations().await;
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        let after = self.applied_migrations().await;
        Ok(after.saturating_sub(before))
    }

    async fn applied_migrations(&self) -> u64 {
        // Table is absent before the first run.
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM _sqlx_migrations WHERE success")
            .fetch_one(&self.pool)
            .await
            .map(|count| count.max(0) as u64)
            .unwrap_or(0)
    }
}

fn push_condition(builder: &mut QueryBuilder<'_, Postgres>, conditions: &mut usize, sql: &str) {
    builder.push(if *conditions == 0 { " WHERE " } else { " AND " });
    builder.push(sql);
    *conditions += 1;
}

/// `SELECT COALESCE(SUM(price), 0)` with one bound predicate per present filter field.
fn sum_query(filter: &SumFilter) -> QueryBuilder<'static, Postgres> {
    let mut builder =
        QueryBuilder::new("SELECT COALESCE(SUM(price), 0)::BIGINT FROM subscriptions");
    let mut conditions = 0;

    if let Some(user_id) = filter.user_id {
        push_condition(&mut builder, &mut conditions, "user_id = ");
        builder.push_bind(user_id);
    }
    if let Some(service_name) = &filter.service_name {
        push_condition(&mut builder, &mut conditions, "service_name = ");
        builder.push_bind(service_name.clone());
    }
    for (column, window) in [("start_date", &filter.start), ("end_date", &filter.end)] {
        if let Some(from) = window.from {
            push_condition(&mut builder, &mut conditions, &format!("{column} >= "));
            builder.push_bind(from);
        }
        if let Some(to) = window.to {
            push_condition(&mut builder, &mut conditions, &format!("{column} <= "));
            builder.push_bind(to);
        }
    }

    builder
}

#[async_trait]
impl SubscriptionStore for PgStore {
    async fn save(&self, new: NewSubscription) -> Result<(Uuid, DateTime<Utc>), StorageError> {
        let row: (Uuid, DateTime<Utc>) = sqlx::query_as(
            r#"
            INSERT INTO subscriptions (id, service_name, price, user_id, start_date, end_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&new.service_name)
        .bind(new.price)
        .bind(new.user_id)
        .bind(new.start_date)
        .bind(new.end_date)
        .fetch_one(&self.pool)
        .await
        .map_err(map_write_error)?;

        Ok(row)
    }

    async fn get(&self, id: Uuid) -> Result<Subscription, StorageError> {
        let query = format!("SELECT {SELECT_COLUMNS} FROM subscriptions WHERE id = $1");
        sqlx::query_as::<_, SubscriptionRow>(&query)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .map(Subscription::from)
            .ok_or(StorageError::NotFound)
    }

    async fn update(&self, subscription: Subscription) -> Result<Subscription, StorageError> {
        let query = format!(
            r#"
            UPDATE subscriptions
            SET service_name = $1,
                price        = $2,
                user_id      = $3,
                start_date   = $4,
                end_date     = $5,
                updated_at   = now()
            WHERE id = $6
            RETURNING {SELECT_COLUMNS}
            "#
        );
        sqlx::query_as::<_, SubscriptionRow>(&query)
            .bind(&subscription.service_name)
            .bind(subscription.price)
            .bind(subscription.user_id)
            .bind(subscription.start_date)
            .bind(subscription.end_date)
            .bind(subscription.id)
            .fetch_one(&self.pool)
            .await
            .map(Subscription::from)
            .map_err(map_write_error)
    }

    async fn delete(&self, id: Uuid) -> Result<(), StorageError> {
        let result = sqlx::query("DELETE FROM subscriptions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::NotFound);
        }
        Ok(())
    }

    async fn sum(&self, filter: &SumFilter) -> Result<i64, StorageError> {
        let mut builder = sum_query(filter);
        let total = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;
        Ok(total)
    }

    async fn ping(&self) -> Result<(), StorageError> {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await?;
        Ok(())
    }

    fn backend_type(&self) -> &'static str {
        "postgres"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::month::month_start;
    use crate::domain::DateWindow;

    #[test]
    fn test_sum_query_without_filters() {
        let builder = sum_query(&SumFilter::default());
        assert_eq!(
            builder.sql(),
            "SELECT COALESCE(SUM(price), 0)::BIGINT FROM subscriptions"
        );
    }

    #[test]
    fn test_sum_query_binds_every_predicate() {
        let filter = SumFilter {
            user_id: Some(Uuid::new_v4()),
            service_name: Some("Netflix".into()),
            start: DateWindow::new(month_start(2024, 1), month_start(2024, 6)),
            end: DateWindow::new(None, month_start(2024, 12)),
        };
        let builder = sum_query(&filter);
        assert_eq!(
            builder.sql(),
            "SELECT COALESCE(SUM(price), 0)::BIGINT FROM subscriptions \
             WHERE user_id = $1 AND service_name = $2 \
             AND start_date >= $3 AND start_date <= $4 AND end_date <= $5"
        );
    }

    #[test]
    fn test_connect_options_rejects_unknown_sslmode() {
        let mut config = PostgresConfig::default();
        config.sslmode = "sometimes".into();
        assert!(connect_options(&config).is_err());

        config.sslmode = "require".into();
        assert!(connect_options(&config).is_ok());
    }
}
