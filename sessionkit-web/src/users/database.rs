//! SQLite-backed user storage

use super::{Identity, UserRepository};
use crate::error::{AuthError, WebError, WebResult};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};
use std::str::FromStr;
use tracing::{debug, error, info};
use uuid::Uuid;

/// Database user record
#[derive(Debug, sqlx::FromRow)]
struct UserRecord {
    id: String,
    email: String,
    password_hash: String,
    first_name: Option<String>,
    last_name: Option<String>,
    is_active: bool,
    created_at: String,         // RFC 3339
    updated_at: Option<String>, // RFC 3339
}

impl UserRecord {
    fn into_identity(self) -> Result<Identity, AuthError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| AuthError::Storage(format!("corrupt user id '{}': {}", self.id, e)))?;

        Ok(Identity {
            id,
            email: self.email,
            password_hash: self.password_hash,
            first_name: self.first_name,
            last_name: self.last_name,
            is_active: self.is_active,
            created_at: parse_timestamp(&self.created_at)?,
            updated_at: self.updated_at.as_deref().map(parse_timestamp).transpose()?,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, AuthError> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| AuthError::Storage(format!("corrupt timestamp '{}': {}", value, e)))
}

fn storage_error(context: &str, e: sqlx::Error) -> AuthError {
    error!("{}: {}", context, e);
    AuthError::Storage(format!("{}: {}", context, e))
}

const SELECT_USER: &str = "SELECT id, email, password_hash, first_name, last_name, is_active, created_at, updated_at FROM users";

/// User store persisted in SQLite
#[derive(Debug, Clone)]
pub struct SqliteUserRepository {
    pool: SqlitePool,
}

impl SqliteUserRepository {
    /// Connect to `database_url` (e.g. `sqlite:data/users.db` or `sqlite::memory:`) and
    /// create the schema
    pub async fn connect(database_url: &str) -> WebResult<Self> {
        info!("Connecting to user database: {}", database_url);

        let in_memory = database_url.contains(":memory:");

        if !in_memory {
            let path = database_url
                .strip_prefix("sqlite://")
                .or_else(|| database_url.strip_prefix("sqlite:"))
                .unwrap_or(database_url);
            if let Some(parent) = std::path::Path::new(path).parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent).map_err(|e| {
                        WebError::Database(format!("Failed to create directory: {}", e))
                    })?;
                }
            }
        }

        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(|e| WebError::Database(format!("Invalid database URL: {}", e)))?
            .create_if_missing(true);

        // Every connection to `:memory:` opens its own database
        let pool = SqlitePoolOptions::new()
            .max_connections(if in_memory { 1 } else { 5 })
            .connect_with(options)
            .await
            .map_err(|e| WebError::Database(format!("Failed to connect to database: {}", e)))?;

        Self::new(pool)
            .await
            .map_err(|e| WebError::Database(e.to_string()))
    }

    /// Wrap an existing pool and create the schema
    pub async fn new(pool: SqlitePool) -> Result<Self, AuthError> {
        let repo = Self { pool };
        repo.create_tables().await?;
        Ok(repo)
    }

    async fn create_tables(&self) -> Result<(), AuthError> {
        let query = r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                email TEXT UNIQUE NOT NULL,
                password_hash TEXT NOT NULL,
                first_name TEXT,
                last_name TEXT,
                is_active BOOLEAN NOT NULL DEFAULT TRUE,
                created_at TEXT NOT NULL,
                updated_at TEXT
            );

            CREATE INDEX IF NOT EXISTS idx_users_email ON users(email);
        "#;

        sqlx::query(query)
            .execute(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to create users table", e))?;

        debug!("Users table ready");
        Ok(())
    }

    async fn fetch_one_where(
        &self,
        clause: &str,
        value: &str,
    ) -> Result<Option<Identity>, AuthError> {
        let query = format!("{} WHERE {} = ?", SELECT_USER, clause);
        sqlx::query_as::<_, UserRecord>(&query)
            .bind(value)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to query user", e))?
            .map(UserRecord::into_identity)
            .transpose()
    }
}

#[async_trait]
impl UserRepository for SqliteUserRepository {
    async fn find_by_email(&self, email: &str) -> Result<Option<Identity>, AuthError> {
        self.fetch_one_where("email", email).await
    }

    async fn email_exists(&self, email: &str) -> Result<bool, AuthError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| storage_error("Failed to check email existence", e))?;

        Ok(count > 0)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Identity>, AuthError> {
        self.fetch_one_where("id", &id.to_string()).await
    }

    async fn create(&self, identity: Identity) -> Result<Identity, AuthError> {
        let query = r#"
            INSERT INTO users (id, email, password_hash, first_name, last_name, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#;

        let result = sqlx::query(query)
            .bind(identity.id.to_string())
            .bind(&identity.email)
            .bind(&identity.password_hash)
            .bind(&identity.first_name)
            .bind(&identity.last_name)
            .bind(identity.is_active)
            .bind(identity.created_at.to_rfc3339())
            .bind(identity.updated_at.map(|dt| dt.to_rfc3339()))
            .execute(&self.pool)
            .await;

        match result {
            Ok(_) => {
                debug!("User inserted: {}", identity.id);
                Ok(identity)
            }
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AuthError::EmailTaken)
            }
            Err(e) => Err(storage_error("Failed to insert user", e)),
        }
    }

    async fn update(&self, identity: Identity) -> Result<Identity, AuthError> {
        let query = r#"
            UPDATE users
            SET email = ?, password_hash = ?, first_name = ?, last_name = ?, is_active = ?, updated_at = ?
            WHERE id = ?
        "#;

        let result = sqlx::query(query)
            .bind(&identity.email)
            .bind(&identity.password_hash)
            .bind(&identity.first_name)
            .bind(&identity.last_name)
            .bind(identity.is_active)
            .bind(identity.updated_at.map(|dt| dt.to_rfc3339()))
            .bind(identity.id.to_string())
            .execute(&self.pool)
            .await;

        match result {
            Ok(done) if done.rows_affected() == 0 => Err(AuthError::UserNotFound),
            Ok(_) => Ok(identity),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AuthError::EmailTaken)
            }
            Err(e) => Err(storage_error("Failed to update user", e)),
        }
    }
}
