use chrono::Utc;
use sqlx::SqlitePool;

use crate::error::AppError;
use crate::models::WatchedCourse;

/// Typed query surface over the watch tables. Every method is a single
/// statement or a single transaction; callers never see partial writes.
#[derive(Clone)]
pub struct WatchStore {
    db: SqlitePool,
}

impl WatchStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    pub async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("select 1").execute(&self.db).await?;
        Ok(())
    }

    /// Insert a (user, crn) watch. An existing pair surfaces as
    /// `DuplicateWatch`; callers on the add path treat that as a no-op
    /// success rather than a user-facing error.
    pub async fn add_watch(&self, user: &str, crn: &str) -> Result<(), AppError> {
        sqlx::query("INSERT INTO watches (user, crn) VALUES (?, ?)")
            .bind(user)
            .bind(crn)
            .execute(&self.db)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                    AppError::DuplicateWatch
                }
                other => AppError::Database(other),
            })?;

        Ok(())
    }

    /// Delete a watch (silently succeeds if absent) and garbage-collect
    /// the cached availability row once the course has no watchers left.
    /// Runs in one transaction so no availability row can outlive its
    /// last watch.
    pub async fn remove_watch(&self, user: &str, crn: &str) -> Result<(), AppError> {
        let mut tx = self.db.begin().await?;

        sqlx::query("DELETE FROM watches WHERE user = ? AND crn = ?")
            .bind(user)
            .bind(crn)
            .execute(&mut *tx)
            .await?;

        let watchers: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM watches WHERE crn = ?")
            .bind(crn)
            .fetch_one(&mut *tx)
            .await?;

        if watchers == 0 {
            sqlx::query("DELETE FROM courses WHERE crn = ?")
                .bind(crn)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }

    /// Every CRN with at least one watch, joined with its last-known
    /// availability. `available` is NULL for courses never polled.
    pub async fn distinct_watched_courses(&self) -> Result<Vec<WatchedCourse>, AppError> {
        let courses = sqlx::query_as::<_, WatchedCourse>(
            r#"
            SELECT crns.crn, courses.available
            FROM (SELECT DISTINCT crn FROM watches) AS crns
            LEFT JOIN courses ON crns.crn = courses.crn
            ORDER BY crns.crn
            "#,
        )
        .fetch_all(&self.db)
        .await?;

        Ok(courses)
    }

    pub async fn courses_watched_by(&self, user: &str) -> Result<Vec<String>, AppError> {
        let crns = sqlx::query_scalar("SELECT crn FROM watches WHERE user = ? ORDER BY crn")
            .bind(user)
            .fetch_all(&self.db)
            .await?;

        Ok(crns)
    }

    pub async fn watchers_of(&self, crn: &str) -> Result<Vec<String>, AppError> {
        let users = sqlx::query_scalar("SELECT user FROM watches WHERE crn = ? ORDER BY id")
            .bind(crn)
            .fetch_all(&self.db)
            .await?;

        Ok(users)
    }

    pub async fn availability_of(&self, crn: &str) -> Result<Option<bool>, AppError> {
        let available = sqlx::query_scalar("SELECT available FROM courses WHERE crn = ?")
            .bind(crn)
            .fetch_optional(&self.db)
            .await?;

        Ok(available)
    }

    pub async fn set_availability(&self, crn: &str, available: bool) -> Result<(), AppError> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            INSERT INTO courses (crn, available, updated_at) VALUES (?, ?, ?)
                ON CONFLICT (crn) DO UPDATE
                SET available = excluded.available, updated_at = excluded.updated_at
            "#,
        )
        .bind(crn)
        .bind(available)
        .bind(now)
        .execute(&self.db)
        .await?;

        Ok(())
    }

    pub async fn delete_availability(&self, crn: &str) -> Result<(), AppError> {
        sqlx::query("DELETE FROM courses WHERE crn = ?")
            .bind(crn)
            .execute(&self.db)
            .await?;

        Ok(())
    }

    pub async fn get_config(&self, key: &str) -> Result<Option<String>, AppError> {
        let value = sqlx::query_scalar("SELECT value FROM config WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.db)
            .await?;

        Ok(value)
    }

    pub async fn set_config(&self, key: &str, value: &str) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO config (key, value) VALUES (?, ?)
                ON CONFLICT (key) DO UPDATE SET value = excluded.value
            "#,
        )
        .bind(key)
        .bind(value)
        .execute(&self.db)
        .await?;

        Ok(())
    }
}
