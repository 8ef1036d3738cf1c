//! Outing model.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use trailhead_core::types::{DbId, Timestamp};

/// A row from the `outings` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Outing {
    pub id: DbId,
    pub name: String,
    pub location: Option<String>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub is_overnight: bool,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for creating a new outing.
#[derive(Debug, Deserialize)]
pub struct CreateOuting {
    pub name: String,
    pub location: Option<String>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub is_overnight: Option<bool>,
}

/// DTO for updating an outing.
#[derive(Debug, Deserialize)]
pub struct UpdateOuting {
    pub name: Option<String>,
    pub location: Option<String>,
    pub starts_on: Option<NaiveDate>,
    pub ends_on: Option<NaiveDate>,
    pub is_overnight: Option<bool>,
}
