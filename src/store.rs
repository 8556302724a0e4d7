use crate::types::{Article, ArticleDraft, DigestEntry, PipelineError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::sqlite::{SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use tracing::{debug, info};

/// SQLite-backed article and digest store. Uniqueness is enforced by the
/// database itself — a unique index on `articles.link` and on
/// `digests.digest_date` — so concurrent ingestion runs cannot produce
/// duplicates regardless of what the callers check in memory.
pub struct Store {
    pool: SqlitePool,
}

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        title TEXT NOT NULL,
        link TEXT NOT NULL UNIQUE,
        source TEXT NOT NULL,
        published_date TEXT,
        content TEXT NOT NULL DEFAULT '',
        summary TEXT,
        embedding TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    )
    "#,
    "CREATE INDEX IF NOT EXISTS idx_articles_published ON articles (published_date)",
    "CREATE INDEX IF NOT EXISTS idx_articles_created ON articles (created_at)",
    r#"
    CREATE TABLE IF NOT EXISTS digests (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        digest_date TEXT NOT NULL UNIQUE,
        content TEXT NOT NULL,
        article_count INTEGER NOT NULL,
        created_at TEXT NOT NULL
    )
    "#,
];

impl Store {
    /// Open the database and make sure the schema exists. Safe to call
    /// against an already-initialized database.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(database_url)
            .await?;

        let store = Self { pool };
        store.init_schema().await?;
        info!("Connected to article store");
        Ok(store)
    }

    async fn init_schema(&self) -> Result<()> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        debug!("Database schema initialized");
        Ok(())
    }

    /// Insert a draft unless an article with the same link already exists.
    /// Returns whether a row was actually written; a conflict on the unique
    /// link index is "already exists", never an error.
    pub async fn insert_if_absent(&self, draft: &ArticleDraft) -> Result<bool> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            INSERT INTO articles (title, link, source, published_date, content, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            ON CONFLICT(link) DO NOTHING
            "#,
        )
        .bind(&draft.title)
        .bind(&draft.link)
        .bind(&draft.source)
        .bind(draft.published_date)
        .bind(&draft.content)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Articles that still need a summary, oldest first.
    pub async fn find_unsummarized(&self, limit: i64) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, link, source, published_date, content, summary, embedding, created_at, updated_at
            FROM articles
            WHERE summary IS NULL OR summary = ''
            ORDER BY created_at ASC
            LIMIT ?1
            "#,
        )
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(article_from_row).collect()
    }

    /// Articles first seen inside [start, end), most recently published
    /// first (undated articles sort last).
    pub async fn find_created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, link, source, published_date, content, summary, embedding, created_at, updated_at
            FROM articles
            WHERE created_at >= ?1 AND created_at < ?2
            ORDER BY published_date IS NULL, published_date DESC, created_at DESC
            "#,
        )
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(article_from_row).collect()
    }

    /// All articles carrying an embedding vector.
    pub async fn find_with_embeddings(&self) -> Result<Vec<Article>> {
        let rows = sqlx::query(
            r#"
            SELECT id, title, link, source, published_date, content, summary, embedding, created_at, updated_at
            FROM articles
            WHERE embedding IS NOT NULL
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(article_from_row).collect()
    }

    pub async fn article_by_link(&self, link: &str) -> Result<Option<Article>> {
        let row = sqlx::query(
            r#"
            SELECT id, title, link, source, published_date, content, summary, embedding, created_at, updated_at
            FROM articles
            WHERE link = ?1
            "#,
        )
        .bind(link)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(article_from_row).transpose()
    }

    pub async fn article_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    pub async fn set_summary(&self, article_id: i64, summary: &str) -> Result<()> {
        sqlx::query("UPDATE articles SET summary = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(summary)
            .bind(Utc::now())
            .bind(article_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn set_embedding(&self, article_id: i64, embedding: &[f32]) -> Result<()> {
        let encoded = serde_json::to_string(embedding)?;
        sqlx::query("UPDATE articles SET embedding = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(encoded)
            .bind(Utc::now())
            .bind(article_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// Write the digest for a date, replacing any existing entry for that
    /// date outright.
    pub async fn upsert_digest(
        &self,
        date: NaiveDate,
        content: &str,
        article_count: i64,
    ) -> Result<DigestEntry> {
        sqlx::query(
            r#"
            INSERT INTO digests (digest_date, content, article_count, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(digest_date) DO UPDATE SET
              content = excluded.content,
              article_count = excluded.article_count,
              created_at = excluded.created_at
            "#,
        )
        .bind(date)
        .bind(content)
        .bind(article_count)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.digest_by_date(date).await?.ok_or_else(|| {
            PipelineError::General(format!("digest for {} missing after upsert", date))
        })
    }

    pub async fn digest_by_date(&self, date: NaiveDate) -> Result<Option<DigestEntry>> {
        let row = sqlx::query(
            "SELECT id, digest_date, content, article_count, created_at FROM digests WHERE digest_date = ?1",
        )
        .bind(date)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(digest_from_row).transpose()
    }

    pub async fn latest_digest(&self) -> Result<Option<DigestEntry>> {
        let row = sqlx::query(
            "SELECT id, digest_date, content, article_count, created_at FROM digests ORDER BY digest_date DESC LIMIT 1",
        )
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(digest_from_row).transpose()
    }

    pub async fn digest_count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM digests")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

fn article_from_row(row: &SqliteRow) -> Result<Article> {
    let embedding = row
        .try_get::<Option<String>, _>("embedding")?
        .and_then(|raw| serde_json::from_str(&raw).ok());

    Ok(Article {
        id: row.try_get("id")?,
        title: row.try_get("title")?,
        link: row.try_get("link")?,
        source: row.try_get("source")?,
        published_date: row.try_get("published_date")?,
        content: row.try_get("content")?,
        summary: row.try_get("summary")?,
        embedding,
        created_at: row.try_get("created_at")?,
        updated_at: row.try_get("updated_at")?,
    })
}

fn digest_from_row(row: &SqliteRow) -> Result<DigestEntry> {
    Ok(DigestEntry {
        id: row.try_get("id")?,
        digest_date: row.try_get("digest_date")?,
        content: row.try_get("content")?,
        article_count: row.try_get("article_count")?,
        created_at: row.try_get("created_at")?,
    })
}
