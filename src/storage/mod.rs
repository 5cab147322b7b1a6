use anyhow::Result;
use chrono::Utc;
use sqlx::{sqlite::SqliteConnectOptions, SqlitePool};
use std::{path::Path, str::FromStr};
use uuid::Uuid;

// ─── Row types ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: String,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub created_at: String,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DatasetRow {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub prompt: String,
    pub data_type: String,
    /// JSON array of column names, in generation order.
    pub fields: String,
    /// JSON array of records.
    pub data: String,
    pub record_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// Dataset metadata without the row payload, for list views.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DatasetSummaryRow {
    pub id: String,
    pub name: String,
    pub prompt: String,
    pub data_type: String,
    pub fields: String,
    pub record_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

// ─── Storage ──────────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct Storage {
    pool: SqlitePool,
}

impl Storage {
    pub async fn new(data_dir: &Path) -> Result<Self> {
        tokio::fs::create_dir_all(data_dir).await?;
        let db_path = data_dir.join("synthd.db");
        let opts =
            SqliteConnectOptions::from_str(&format!("sqlite://{}?mode=rwc", db_path.display()))?
                .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal)
                .synchronous(sqlx::sqlite::SqliteSynchronous::Normal)
                .create_if_missing(true);
        let pool = SqlitePool::connect_with(opts).await?;
        Self::migrate(&pool).await?;
        Ok(Self { pool })
    }

    async fn migrate(pool: &SqlitePool) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS users (
                 id TEXT PRIMARY KEY,
                 username TEXT UNIQUE NOT NULL,
                 email TEXT UNIQUE NOT NULL,
                 password_hash TEXT NOT NULL,
                 created_at TEXT NOT NULL
             )",
        )
        .execute(pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS datasets (
                 id TEXT PRIMARY KEY,
                 user_id TEXT NOT NULL,
                 name TEXT NOT NULL,
                 prompt TEXT NOT NULL,
                 data_type TEXT NOT NULL DEFAULT '',
                 fields TEXT NOT NULL DEFAULT '[]',
                 data TEXT NOT NULL DEFAULT '[]',
                 record_count INTEGER NOT NULL DEFAULT 0,
                 created_at TEXT NOT NULL,
                 updated_at TEXT NOT NULL,
                 FOREIGN KEY (user_id) REFERENCES users (id)
             )",
        )
        .execute(pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_datasets_user ON datasets (user_id, updated_at)")
            .execute(pool)
            .await?;

        Ok(())
    }

    /// Cheap DB liveness probe for the health endpoint.
    pub async fn ping(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    // ─── Users ──────────────────────────────────────────────────────────────

    pub async fn create_user(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
    ) -> Result<UserRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO users (id, username, email, password_hash, created_at)
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_user_by_id(&id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("user not found after insert"))
    }

    pub async fn get_user_by_id(&self, id: &str) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    pub async fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        Ok(sqlx::query_as("SELECT * FROM users WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    /// True when either the username or the email is already registered.
    pub async fn identity_taken(&self, username: &str, email: &str) -> Result<bool> {
        let row: (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM users WHERE username = ? OR email = ?")
                .bind(username)
                .bind(email)
                .fetch_one(&self.pool)
                .await?;
        Ok(row.0 > 0)
    }

    // ─── Datasets ───────────────────────────────────────────────────────────

    #[allow(clippy::too_many_arguments)]
    pub async fn create_dataset(
        &self,
        user_id: &str,
        name: &str,
        prompt: &str,
        data_type: &str,
        fields_json: &str,
        data_json: &str,
        record_count: i64,
    ) -> Result<DatasetRow> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            "INSERT INTO datasets (id, user_id, name, prompt, data_type, fields, data, record_count, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(user_id)
        .bind(name)
        .bind(prompt)
        .bind(data_type)
        .bind(fields_json)
        .bind(data_json)
        .bind(record_count)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;
        self.get_dataset(&id, user_id)
            .await?
            .ok_or_else(|| anyhow::anyhow!("dataset not found after insert"))
    }

    /// Datasets owned by the user, newest first, without the row payload.
    pub async fn list_datasets(&self, user_id: &str) -> Result<Vec<DatasetSummaryRow>> {
        Ok(sqlx::query_as(
            "SELECT id, name, prompt, data_type, fields, record_count, created_at, updated_at
             FROM datasets WHERE user_id = ? ORDER BY updated_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?)
    }

    pub async fn get_dataset(&self, id: &str, user_id: &str) -> Result<Option<DatasetRow>> {
        Ok(
            sqlx::query_as("SELECT * FROM datasets WHERE id = ? AND user_id = ?")
                .bind(id)
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    /// Replace a dataset's rows (the edit-cell save path). Returns false when
    /// the dataset does not exist or belongs to someone else.
    pub async fn update_dataset_data(
        &self,
        id: &str,
        user_id: &str,
        fields_json: &str,
        data_json: &str,
        record_count: i64,
    ) -> Result<bool> {
        let now = Utc::now().to_rfc3339();
        let result = sqlx::query(
            "UPDATE datasets SET fields = ?, data = ?, record_count = ?, updated_at = ?
             WHERE id = ? AND user_id = ?",
        )
        .bind(fields_json)
        .bind(data_json)
        .bind(record_count)
        .bind(&now)
        .bind(id)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Returns false when the dataset does not exist or belongs to someone else.
    pub async fn delete_dataset(&self, id: &str, user_id: &str) -> Result<bool> {
        let result = sqlx::query("DELETE FROM datasets WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
