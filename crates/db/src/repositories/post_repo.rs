//! Repository for the `posts` table.

use sqlx::PgPool;
use trattoria_core::types::DbId;

use crate::models::post::{CreatePost, MigrationReport, Post};

/// Column list for the `posts` table.
const COLUMNS: &str = "id, image, description, title, created_at";

/// Provides data access for promotional posts.
pub struct PostRepo;

impl PostRepo {
    /// All posts, newest first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Post>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM posts ORDER BY created_at DESC, id DESC");
        sqlx::query_as::<_, Post>(&query).fetch_all(pool).await
    }

    /// Insert a new post. `created_at` is always the insertion time.
    pub async fn create(pool: &PgPool, input: &CreatePost) -> Result<Post, sqlx::Error> {
        let query = format!(
            "INSERT INTO posts (image, description, title) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Post>(&query)
            .bind(&input.image)
            .bind(&input.description)
            .bind(&input.title)
            .fetch_one(pool)
            .await
    }

    /// Delete a post by id. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Import posts held by a client, in one transaction.
    ///
    /// A post whose image and description already match a stored row is
    /// skipped, so re-running the same import changes nothing. Imported rows
    /// keep their original `created_at` when one is given.
    pub async fn migrate(pool: &PgPool, posts: &[CreatePost]) -> Result<MigrationReport, sqlx::Error> {
        let mut tx = pool.begin().await?;
        let mut report = MigrationReport {
            migrated: 0,
            skipped: 0,
        };

        for post in posts {
            let inserted = sqlx::query(
                "INSERT INTO posts (image, description, title, created_at) \
                 SELECT $1, $2, $3, COALESCE($4, NOW()) \
                 WHERE NOT EXISTS ( \
                     SELECT 1 FROM posts WHERE image = $1 AND description = $2)",
            )
            .bind(&post.image)
            .bind(&post.description)
            .bind(&post.title)
            .bind(post.created_at)
            .execute(&mut *tx)
            .await?
            .rows_affected();

            if inserted > 0 {
                report.migrated += 1;
            } else {
                report.skipped += 1;
            }
        }

        tx.commit().await?;
        Ok(report)
    }
}
