//! Offline bulk ingestion of the seed data directory.
//!
//! Reads the tabular export layout (`category.csv`, `genre.csv`,
//! `titles.csv`, `genre_title.csv`, `users.csv`, `review.csv`,
//! `comments.csv`) and loads it into the store. Every row is an independent
//! unit of failure: a malformed or foreign-key-violating row is logged and
//! skipped, the load continues. Source ids are preserved for the serial-id
//! tables so cross-file references keep working; user rows get fresh UUIDs
//! through an in-memory id map.

use std::collections::HashMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use critique_model::{Role, UserId, validate};
use csv::StringRecord;
use sqlx::PgPool;
use tracing::{info, warn};
use uuid::Uuid;

use crate::error::{CoreError, Result};

/// Per-file outcome of a bulk load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub file: &'static str,
    pub loaded: u64,
    pub skipped: u64,
}

/// Outcome of a whole data-directory load.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestReport {
    pub files: Vec<FileReport>,
}

impl IngestReport {
    pub fn total_loaded(&self) -> u64 {
        self.files.iter().map(|f| f.loaded).sum()
    }

    pub fn total_skipped(&self) -> u64 {
        self.files.iter().map(|f| f.skipped).sum()
    }
}

fn field<'r>(record: &'r StringRecord, index: usize) -> Result<&'r str> {
    record.get(index).ok_or_else(|| {
        CoreError::validation("row", format!("missing column {index}"))
    })
}

fn parse_i64(record: &StringRecord, index: usize) -> Result<i64> {
    let raw = field(record, index)?;
    raw.parse().map_err(|_| {
        CoreError::validation("row", format!("`{raw}` is not an integer"))
    })
}

fn parse_datetime(record: &StringRecord, index: usize) -> Result<DateTime<Utc>> {
    let raw = field(record, index)?;
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| {
            CoreError::validation(
                "row",
                format!("`{raw}` is not an RFC 3339 timestamp"),
            )
        })
}

/// Runs `op` for each record of `file` under `dir`, tallying successes and
/// logged skips. A missing file is reported empty rather than aborting the
/// load.
async fn load_file<F>(
    dir: &Path,
    file: &'static str,
    mut op: F,
) -> Result<FileReport>
where
    F: AsyncFnMut(&StringRecord) -> Result<()>,
{
    let path = dir.join(file);
    if !path.exists() {
        warn!("data file {} not found, skipping", path.display());
        return Ok(FileReport {
            file,
            loaded: 0,
            skipped: 0,
        });
    }

    let mut reader = csv::Reader::from_path(&path).map_err(|e| {
        CoreError::Internal(format!("failed to open {}: {e}", path.display()))
    })?;

    let mut loaded = 0;
    let mut skipped = 0;
    for (line, record) in reader.records().enumerate() {
        let record = match record {
            Ok(record) => record,
            Err(e) => {
                warn!(file, line, "malformed row: {e}");
                skipped += 1;
                continue;
            }
        };
        match op(&record).await {
            Ok(()) => loaded += 1,
            Err(e) => {
                warn!(file, line, "skipping row: {e}");
                skipped += 1;
            }
        }
    }

    info!(file, loaded, skipped, "data file processed");
    Ok(FileReport {
        file,
        loaded,
        skipped,
    })
}

async fn load_classifier(
    pool: &PgPool,
    dir: &Path,
    file: &'static str,
    table: &'static str,
) -> Result<FileReport> {
    load_file(dir, file, async |record| {
        let id = parse_i64(record, 0)?;
        let name = field(record, 1)?;
        let slug = field(record, 2)?;
        validate::validate_name(name)?;
        validate::validate_slug(slug)?;
        sqlx::query(&format!(
            r#"
            INSERT INTO {table} (id, name, slug)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#
        ))
        .bind(id)
        .bind(name)
        .bind(slug)
        .execute(pool)
        .await
        .map_err(|e| CoreError::Internal(format!("insert failed: {e}")))?;
        Ok(())
    })
    .await
}

async fn load_users(
    pool: &PgPool,
    dir: &Path,
    id_map: &mut HashMap<i64, Uuid>,
) -> Result<FileReport> {
    // Columns: id, username, email, role, bio, first_name, last_name
    load_file(dir, "users.csv", async |record| {
        let source_id = parse_i64(record, 0)?;
        let username = field(record, 1)?;
        let email = field(record, 2)?;
        let role: Role = field(record, 3)?.parse()?;
        let bio = field(record, 4)?;
        let first_name = field(record, 5)?;
        let last_name = field(record, 6)?;
        validate::validate_username(username)?;
        validate::validate_email(email)?;

        // No-op update on username conflict so the existing row's id still
        // comes back and cross-file references resolve.
        let id = sqlx::query_scalar::<_, Uuid>(
            r#"
            INSERT INTO users (
                id, username, email, role, bio, first_name, last_name
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (username) DO UPDATE SET email = users.email
            RETURNING id
            "#,
        )
        .bind(UserId::new().to_uuid())
        .bind(username)
        .bind(email)
        .bind(role.as_str())
        .bind(bio)
        .bind(first_name)
        .bind(last_name)
        .fetch_one(pool)
        .await
        .map_err(|e| CoreError::Internal(format!("insert failed: {e}")))?;

        id_map.insert(source_id, id);
        Ok(())
    })
    .await
}

async fn load_titles(pool: &PgPool, dir: &Path) -> Result<FileReport> {
    // Columns: id, name, year, category
    load_file(dir, "titles.csv", async |record| {
        let id = parse_i64(record, 0)?;
        let name = field(record, 1)?;
        let year: i32 = field(record, 2)?.parse().map_err(|_| {
            CoreError::validation("year", "year is not an integer")
        })?;
        let category_id = parse_i64(record, 3)?;
        validate::validate_name(name)?;
        validate::validate_year(year)?;
        sqlx::query(
            r#"
            INSERT INTO titles (id, name, year, category_id)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(name)
        .bind(year)
        .bind(category_id)
        .execute(pool)
        .await
        .map_err(|e| CoreError::Internal(format!("insert failed: {e}")))?;
        Ok(())
    })
    .await
}

async fn load_title_genres(pool: &PgPool, dir: &Path) -> Result<FileReport> {
    // Columns: id, title_id, genre_id
    load_file(dir, "genre_title.csv", async |record| {
        let id = parse_i64(record, 0)?;
        let title_id = parse_i64(record, 1)?;
        let genre_id = parse_i64(record, 2)?;
        sqlx::query(
            r#"
            INSERT INTO title_genres (id, title_id, genre_id)
            VALUES ($1, $2, $3)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(title_id)
        .bind(genre_id)
        .execute(pool)
        .await
        .map_err(|e| CoreError::Internal(format!("insert failed: {e}")))?;
        Ok(())
    })
    .await
}

async fn load_reviews(
    pool: &PgPool,
    dir: &Path,
    id_map: &HashMap<i64, Uuid>,
) -> Result<FileReport> {
    // Columns: id, title_id, text, author, score, pub_date
    load_file(dir, "review.csv", async |record| {
        let id = parse_i64(record, 0)?;
        let title_id = parse_i64(record, 1)?;
        let text = field(record, 2)?;
        let author = parse_i64(record, 3)?;
        let score: i16 = field(record, 4)?.parse().map_err(|_| {
            CoreError::validation("score", "score is not an integer")
        })?;
        let pub_date = parse_datetime(record, 5)?;
        validate::validate_score(score)?;
        let author_id = id_map.get(&author).ok_or_else(|| {
            CoreError::validation("author", format!("unknown user {author}"))
        })?;
        sqlx::query(
            r#"
            INSERT INTO reviews (id, title_id, author_id, text, score, pub_date)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(title_id)
        .bind(author_id)
        .bind(text)
        .bind(score)
        .bind(pub_date)
        .execute(pool)
        .await
        .map_err(|e| CoreError::Internal(format!("insert failed: {e}")))?;
        Ok(())
    })
    .await
}

async fn load_comments(
    pool: &PgPool,
    dir: &Path,
    id_map: &HashMap<i64, Uuid>,
) -> Result<FileReport> {
    // Columns: id, review_id, text, author, pub_date
    load_file(dir, "comments.csv", async |record| {
        let id = parse_i64(record, 0)?;
        let review_id = parse_i64(record, 1)?;
        let text = field(record, 2)?;
        let author = parse_i64(record, 3)?;
        let pub_date = parse_datetime(record, 4)?;
        validate::validate_comment_text(text)?;
        let author_id = id_map.get(&author).ok_or_else(|| {
            CoreError::validation("author", format!("unknown user {author}"))
        })?;
        sqlx::query(
            r#"
            INSERT INTO comments (id, review_id, author_id, text, pub_date)
            VALUES ($1, $2, $3, $4, $5)
            ON CONFLICT DO NOTHING
            "#,
        )
        .bind(id)
        .bind(review_id)
        .bind(author_id)
        .bind(text)
        .bind(pub_date)
        .execute(pool)
        .await
        .map_err(|e| CoreError::Internal(format!("insert failed: {e}")))?;
        Ok(())
    })
    .await
}

/// Explicit-id inserts leave the serial sequences behind the data; move each
/// one past the highest imported id so API writes don't collide.
async fn bump_sequences(pool: &PgPool) -> Result<()> {
    for table in [
        "categories",
        "genres",
        "titles",
        "title_genres",
        "reviews",
        "comments",
    ] {
        sqlx::query(&format!(
            r#"
            SELECT setval(
                pg_get_serial_sequence('{table}', 'id'),
                COALESCE((SELECT MAX(id) + 1 FROM {table}), 1),
                false
            )
            "#
        ))
        .execute(pool)
        .await
        .map_err(|e| {
            CoreError::Internal(format!(
                "failed to bump sequence for {table}: {e}"
            ))
        })?;
    }
    Ok(())
}

/// Loads an entire data directory. Files are processed in dependency order;
/// a missing file is tolerated, a failing row never aborts the load.
pub async fn load_data_dir(pool: &PgPool, dir: &Path) -> Result<IngestReport> {
    let mut report = IngestReport::default();
    let mut user_ids = HashMap::new();

    report
        .files
        .push(load_classifier(pool, dir, "category.csv", "categories").await?);
    report
        .files
        .push(load_classifier(pool, dir, "genre.csv", "genres").await?);
    report.files.push(load_titles(pool, dir).await?);
    report.files.push(load_title_genres(pool, dir).await?);
    report
        .files
        .push(load_users(pool, dir, &mut user_ids).await?);
    report.files.push(load_reviews(pool, dir, &user_ids).await?);
    report
        .files
        .push(load_comments(pool, dir, &user_ids).await?);

    bump_sequences(pool).await?;
    info!(
        loaded = report.total_loaded(),
        skipped = report.total_skipped(),
        "bulk load finished"
    );
    Ok(report)
}
