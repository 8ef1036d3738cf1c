//! Repository for the `outings` table.

use sqlx::PgPool;
use trailhead_core::types::DbId;

use crate::models::outing::{CreateOuting, Outing, UpdateOuting};

/// Column list for outings queries.
const COLUMNS: &str =
    "id, name, location, starts_on, ends_on, is_overnight, created_at, updated_at";

/// Provides CRUD operations for outings.
pub struct OutingRepo;

impl OutingRepo {
    /// List all outings, most recent start date first.
    pub async fn list(pool: &PgPool) -> Result<Vec<Outing>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM outings ORDER BY starts_on DESC NULLS LAST, id DESC"
        );
        sqlx::query_as::<_, Outing>(&query).fetch_all(pool).await
    }

    /// Find an outing by its ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Outing>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM outings WHERE id = $1");
        sqlx::query_as::<_, Outing>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Create a new outing, returning the created row.
    pub async fn create(pool: &PgPool, input: &CreateOuting) -> Result<Outing, sqlx::Error> {
        let query = format!(
            "INSERT INTO outings (name, location, starts_on, ends_on, is_overnight)
             VALUES ($1, $2, $3, $4, COALESCE($5, true))
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Outing>(&query)
            .bind(&input.name)
            .bind(&input.location)
            .bind(input.starts_on)
            .bind(input.ends_on)
            .bind(input.is_overnight)
            .fetch_one(pool)
            .await
    }

    /// Update an outing by ID. Only non-`None` fields are applied.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateOuting,
    ) -> Result<Option<Outing>, sqlx::Error> {
        let query = format!(
            "UPDATE outings SET
                name = COALESCE($2, name),
                location = COALESCE($3, location),
                starts_on = COALESCE($4, starts_on),
                ends_on = COALESCE($5, ends_on),
                is_overnight = COALESCE($6, is_overnight)
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Outing>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.location)
            .bind(input.starts_on)
            .bind(input.ends_on)
            .bind(input.is_overnight)
            .fetch_optional(pool)
            .await
    }

    /// Delete an outing and, by cascade, its participants and groups.
    /// Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM outings WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
