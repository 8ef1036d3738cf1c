//! Participant (outing signup) model.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use trailhead_core::types::{DbId, Timestamp};

/// A row from the `participants` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Participant {
    pub id: DbId,
    pub outing_id: DbId,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub patrol_name: Option<String>,
    pub troop_number: Option<String>,
    pub is_adult: bool,
    pub dietary_restrictions: Vec<String>,
    pub allergies: Vec<String>,
    pub medical_notes: Option<String>,
    pub grubmaster_interest: bool,
    pub grubmaster_reason: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for signing a participant up for an outing.
///
/// The outing comes from the request path, not the body.
#[derive(Debug, Deserialize)]
pub struct CreateParticipant {
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub patrol_name: Option<String>,
    pub troop_number: Option<String>,
    pub is_adult: Option<bool>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub allergies: Vec<String>,
    pub medical_notes: Option<String>,
    pub grubmaster_interest: Option<bool>,
    pub grubmaster_reason: Option<String>,
}

/// DTO for updating a participant.
#[derive(Debug, Deserialize)]
pub struct UpdateParticipant {
    pub name: Option<String>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub patrol_name: Option<String>,
    pub troop_number: Option<String>,
    pub is_adult: Option<bool>,
    pub dietary_restrictions: Option<Vec<String>>,
    pub allergies: Option<Vec<String>>,
    pub medical_notes: Option<String>,
    pub grubmaster_interest: Option<bool>,
    pub grubmaster_reason: Option<String>,
}
