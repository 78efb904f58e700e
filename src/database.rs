use std::path::Path;
use std::time::Duration;

use chrono::Utc;
use sqlx::{
    sqlite::{SqliteConnectOptions, SqlitePoolOptions},
    SqlitePool,
};

use crate::models::{Business, BusinessOption, Review, ReviewWithBusiness};

/// Hard cap on the admin listing. Not a page size; older rows beyond the cap
/// are only reachable through the CSV export.
const LIST_REVIEWS_CAP: i64 = 200;

/// Derives a display name from a slug: hyphens become spaces, each word is
/// title-cased. `new-cafe` -> `New Cafe`.
pub fn display_name_from_slug(slug: &str) -> String {
    slug.split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[derive(Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (creating if missing) the SQLite database at `db_path`. Each
    /// logical operation checks a connection out of the pool and returns it
    /// on every exit path; nothing is held across requests.
    pub async fn connect(db_path: &str) -> Result<Self, sqlx::Error> {
        if let Some(parent) = Path::new(db_path).parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
            }
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .foreign_keys(true)
            .busy_timeout(Duration::from_secs(5));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .acquire_timeout(Duration::from_secs(5))
            .connect_with(options)
            .await?;

        Ok(Self { pool })
    }

    /// Creates both tables if absent and seeds the demo business. Safe to
    /// call repeatedly; every statement has insert-if-absent semantics.
    /// The rating range and the business foreign key are enforced here, in
    /// the schema, so not even a direct insert can corrupt them.
    pub async fn init(&self) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS businesses (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                slug TEXT NOT NULL UNIQUE,
                name TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS reviews (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                business_id INTEGER NOT NULL,
                rating INTEGER NOT NULL CHECK (rating BETWEEN 1 AND 5),
                comment TEXT,
                contact_email TEXT,
                created_at TEXT NOT NULL,
                seen INTEGER NOT NULL DEFAULT 0,
                flagged INTEGER NOT NULL DEFAULT 0,
                FOREIGN KEY (business_id) REFERENCES businesses(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("INSERT OR IGNORE INTO businesses (slug, name, created_at) VALUES (?, ?, ?)")
            .bind("demo")
            .bind("Demo Shop")
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Pure lookup, no side effect.
    pub async fn get_business_by_slug(
        &self,
        slug: &str,
    ) -> Result<Option<Business>, sqlx::Error> {
        sqlx::query_as::<_, Business>(
            "SELECT id, slug, name, created_at FROM businesses WHERE slug = ?",
        )
        .bind(slug)
        .fetch_optional(&self.pool)
        .await
    }

    /// Returns the business for `slug`, creating it with a derived display
    /// name on first reference. A concurrent insert losing the race against
    /// the UNIQUE constraint is absorbed by re-fetching the winner's row, so
    /// the operation is idempotent from the caller's perspective.
    pub async fn get_or_create_business(&self, slug: &str) -> Result<Business, sqlx::Error> {
        if let Some(existing) = self.get_business_by_slug(slug).await? {
            return Ok(existing);
        }

        let name = display_name_from_slug(slug);
        let inserted = sqlx::query_as::<_, Business>(
            r#"
            INSERT INTO businesses (slug, name, created_at)
            VALUES (?, ?, ?)
            RETURNING id, slug, name, created_at
            "#,
        )
        .bind(slug)
        .bind(&name)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(business) => Ok(business),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                // Lost the creation race; the row exists now.
                self.get_business_by_slug(slug)
                    .await?
                    .ok_or(sqlx::Error::RowNotFound)
            }
            Err(err) => Err(err),
        }
    }

    /// Inserts a review for the (possibly auto-created) business. `flagged`
    /// is computed here, exactly once, as `rating <= 2`. Returns the new row
    /// id and the flagged value.
    ///
    /// Rating range validation happens at the request boundary; the schema
    /// CHECK backs it up against internal callers.
    pub async fn create_review(
        &self,
        business_slug: &str,
        rating: i64,
        comment: Option<&str>,
        contact_email: Option<&str>,
    ) -> Result<(i64, bool), sqlx::Error> {
        let business = self.get_or_create_business(business_slug).await?;
        let flagged = rating <= 2;

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (business_id, rating, comment, contact_email, created_at, seen, flagged)
            VALUES (?, ?, ?, ?, ?, 0, ?)
            RETURNING id, business_id, rating, comment, contact_email, created_at, seen, flagged
            "#,
        )
        .bind(business.id)
        .bind(rating)
        .bind(comment)
        .bind(contact_email)
        .bind(Utc::now())
        .bind(flagged)
        .fetch_one(&self.pool)
        .await?;

        Ok((review.id, review.flagged))
    }

    /// Reviews with `rating >= min_rating`, optionally restricted to one
    /// business, most recent first, capped at 200 rows.
    pub async fn list_reviews(
        &self,
        min_rating: i64,
        business_slug: Option<&str>,
    ) -> Result<Vec<ReviewWithBusiness>, sqlx::Error> {
        match business_slug {
            Some(slug) => {
                sqlx::query_as::<_, ReviewWithBusiness>(
                    r#"
                    SELECT r.id, b.slug AS business_slug, b.name AS business_name,
                           r.rating, r.comment, r.contact_email, r.created_at, r.seen, r.flagged
                    FROM reviews r
                    JOIN businesses b ON b.id = r.business_id
                    WHERE r.rating >= ? AND b.slug = ?
                    ORDER BY r.created_at DESC, r.id DESC
                    LIMIT ?
                    "#,
                )
                .bind(min_rating)
                .bind(slug)
                .bind(LIST_REVIEWS_CAP)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, ReviewWithBusiness>(
                    r#"
                    SELECT r.id, b.slug AS business_slug, b.name AS business_name,
                           r.rating, r.comment, r.contact_email, r.created_at, r.seen, r.flagged
                    FROM reviews r
                    JOIN businesses b ON b.id = r.business_id
                    WHERE r.rating >= ?
                    ORDER BY r.created_at DESC, r.id DESC
                    LIMIT ?
                    "#,
                )
                .bind(min_rating)
                .bind(LIST_REVIEWS_CAP)
                .fetch_all(&self.pool)
                .await
            }
        }
    }

    /// Sets `seen = true`. Idempotent; an unknown id is a no-op, not an
    /// error. `seen` never reverts to false.
    pub async fn mark_seen(&self, review_id: i64) -> Result<(), sqlx::Error> {
        sqlx::query("UPDATE reviews SET seen = 1 WHERE id = ?")
            .bind(review_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    /// All businesses, ordered by name, for the admin filter dropdown.
    pub async fn list_businesses(&self) -> Result<Vec<BusinessOption>, sqlx::Error> {
        sqlx::query_as::<_, BusinessOption>("SELECT slug, name FROM businesses ORDER BY name")
            .fetch_all(&self.pool)
            .await
    }

    /// The full joined review set for CSV export: unfiltered and uncapped,
    /// unlike `list_reviews`.
    pub async fn export_reviews(&self) -> Result<Vec<ReviewWithBusiness>, sqlx::Error> {
        sqlx::query_as::<_, ReviewWithBusiness>(
            r#"
            SELECT r.id, b.slug AS business_slug, b.name AS business_name,
                   r.rating, r.comment, r.contact_email, r.created_at, r.seen, r.flagged
            FROM reviews r
            JOIN businesses b ON b.id = r.business_id
            ORDER BY r.created_at DESC, r.id DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
    }
}
