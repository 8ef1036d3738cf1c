//! Repository for the `participants` table.
//!
//! Every lookup is scoped by outing so an ID from another outing reads as
//! missing.

use sqlx::PgPool;
use trailhead_core::types::DbId;

use crate::models::participant::{CreateParticipant, Participant, UpdateParticipant};

/// Column list for participants queries.
const COLUMNS: &str = "id, outing_id, name, age, gender, patrol_name, troop_number, is_adult, \
    dietary_restrictions, allergies, medical_notes, grubmaster_interest, grubmaster_reason, \
    created_at, updated_at";

/// Provides CRUD operations for outing participants.
pub struct ParticipantRepo;

impl ParticipantRepo {
    /// List the participants of an outing, ordered by name.
    pub async fn list_by_outing(
        pool: &PgPool,
        outing_id: DbId,
    ) -> Result<Vec<Participant>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM participants WHERE outing_id = $1 ORDER BY name, id"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(outing_id)
            .fetch_all(pool)
            .await
    }

    /// Find a participant of the given outing.
    pub async fn find(
        pool: &PgPool,
        outing_id: DbId,
        id: DbId,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query =
            format!("SELECT {COLUMNS} FROM participants WHERE id = $1 AND outing_id = $2");
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .bind(outing_id)
            .fetch_optional(pool)
            .await
    }

    /// Sign a participant up for an outing, returning the created row.
    pub async fn create(
        pool: &PgPool,
        outing_id: DbId,
        input: &CreateParticipant,
    ) -> Result<Participant, sqlx::Error> {
        let query = format!(
            "INSERT INTO participants
                (outing_id, name, age, gender, patrol_name, troop_number, is_adult,
                 dietary_restrictions, allergies, medical_notes, grubmaster_interest,
                 grubmaster_reason)
             VALUES ($1, $2, $3, $4, $5, $6, COALESCE($7, false), $8, $9, $10,
                     COALESCE($11, false), $12)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(outing_id)
            .bind(&input.name)
            .bind(input.age)
            .bind(&input.gender)
            .bind(&input.patrol_name)
            .bind(&input.troop_number)
            .bind(input.is_adult)
            .bind(&input.dietary_restrictions)
            .bind(&input.allergies)
            .bind(&input.medical_notes)
            .bind(input.grubmaster_interest)
            .bind(&input.grubmaster_reason)
            .fetch_one(pool)
            .await
    }

    /// Update a participant of the given outing. Only non-`None` fields are
    /// applied.
    pub async fn update(
        pool: &PgPool,
        outing_id: DbId,
        id: DbId,
        input: &UpdateParticipant,
    ) -> Result<Option<Participant>, sqlx::Error> {
        let query = format!(
            "UPDATE participants SET
                name = COALESCE($3, name),
                age = COALESCE($4, age),
                gender = COALESCE($5, gender),
                patrol_name = COALESCE($6, patrol_name),
                troop_number = COALESCE($7, troop_number),
                is_adult = COALESCE($8, is_adult),
                dietary_restrictions = COALESCE($9, dietary_restrictions),
                allergies = COALESCE($10, allergies),
                medical_notes = COALESCE($11, medical_notes),
                grubmaster_interest = COALESCE($12, grubmaster_interest),
                grubmaster_reason = COALESCE($13, grubmaster_reason)
             WHERE id = $1 AND outing_id = $2
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Participant>(&query)
            .bind(id)
            .bind(outing_id)
            .bind(&input.name)
            .bind(input.age)
            .bind(&input.gender)
            .bind(&input.patrol_name)
            .bind(&input.troop_number)
            .bind(input.is_adult)
            .bind(&input.dietary_restrictions)
            .bind(&input.allergies)
            .bind(&input.medical_notes)
            .bind(input.grubmaster_interest)
            .bind(&input.grubmaster_reason)
            .fetch_optional(pool)
            .await
    }

    /// Remove a participant from an outing, together with their group
    /// memberships. Returns `true` if a row was deleted.
    pub async fn delete(pool: &PgPool, outing_id: DbId, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM participants WHERE id = $1 AND outing_id = $2")
            .bind(id)
            .bind(outing_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
