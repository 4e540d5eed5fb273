use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::FromRow;

use skillharvest_core::{SkillEntity, SkillFact};

use crate::store::SkillStore;
use crate::types::StoreError;

/// SQLite-backed skill store.
///
/// Case folding happens in Rust: SQLite's built-in `lower()` folds ASCII
/// only, so every row carries a `name_lower` column filled from
/// `SkillFact::normalized_name`. The unique index over that column closes
/// the check-then-insert race: a lost race surfaces as a uniqueness
/// violation and is reported as "already exists", not an error.
pub struct SqliteSkillStore {
    pool: SqlitePool,
}

impl SqliteSkillStore {
    /// Opens the database at `database_url`, creating the file when it does
    /// not exist yet, and runs the schema migration.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(options)
            .await?;
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    /// In-memory database, for tests and dry runs.
    pub async fn in_memory() -> Result<Self, StoreError> {
        // Separate pool connections would each open their own empty
        // in-memory database, so this pool is capped at one.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await?;
        let store = Self { pool };
        store.run_migrations().await?;
        Ok(store)
    }

    async fn run_migrations(&self) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS skill (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                name_lower TEXT NOT NULL,
                description TEXT NOT NULL DEFAULT '',
                category TEXT NOT NULL DEFAULT ''
            );

            CREATE UNIQUE INDEX IF NOT EXISTS idx_skill_name_lower ON skill (name_lower);
            "#,
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Number of persisted skills.
    pub async fn count(&self) -> Result<i64, StoreError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM skill")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// All persisted rows, id order.
    pub async fn entities(&self) -> Result<Vec<SkillEntity>, StoreError> {
        let rows: Vec<SkillRow> =
            sqlx::query_as("SELECT id, name, description, category FROM skill ORDER BY id")
                .fetch_all(&self.pool)
                .await?;
        Ok(rows.into_iter().map(SkillRow::into_entity).collect())
    }
}

#[derive(Debug, FromRow)]
struct SkillRow {
    id: i64,
    name: String,
    description: String,
    category: String,
}

impl SkillRow {
    fn into_entity(self) -> SkillEntity {
        SkillEntity {
            id: self.id,
            name: self.name,
            description: self.description,
            category: self.category,
        }
    }
}

#[async_trait::async_trait]
impl SkillStore for SqliteSkillStore {
    async fn ensure_persisted(&self, fact: &SkillFact) -> Result<Option<String>, StoreError> {
        let needle = fact.normalized_name();
        let existing: Option<(i64,)> =
            sqlx::query_as("SELECT id FROM skill WHERE name_lower LIKE '%' || ? || '%' LIMIT 1")
                .bind(&needle)
                .fetch_optional(&self.pool)
                .await?;
        if existing.is_some() {
            return Ok(None);
        }

        let inserted = sqlx::query(
            "INSERT INTO skill (name, name_lower, description, category) VALUES (?, ?, ?, ?)",
        )
        .bind(&fact.name)
        .bind(&needle)
        .bind(&fact.description)
        .bind(fact.category.as_str())
        .execute(&self.pool)
        .await;
        match inserted {
            Ok(_) => Ok(Some(fact.name.clone())),
            // A racing writer persisted the same name first.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}
