//! Tenting and eating group models.
//!
//! Both kinds share one row shape; the repository picks the tables from the
//! [`GroupKind`](trailhead_core::grouping::GroupKind) it is called with.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use trailhead_core::grouping::{Candidate, GroupSnapshot, GrubmasterReason, MemberSnapshot};
use trailhead_core::types::{DbId, Timestamp};
use validator::Validate;

/// A row from `tenting_groups` or `eating_groups`.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Group {
    pub id: DbId,
    pub outing_id: DbId,
    pub name: String,
    pub notes: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A membership row joined with the participant's display fields.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GroupMember {
    pub id: DbId,
    pub group_id: DbId,
    pub participant_id: DbId,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub patrol_name: Option<String>,
    pub troop_number: Option<String>,
    pub is_adult: bool,
    pub dietary_restrictions: Vec<String>,
    /// Only eating-group memberships carry this flag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_grubmaster: Option<bool>,
}

/// A group together with its members in join order.
#[derive(Debug, Clone, Serialize)]
pub struct GroupWithMembers {
    #[serde(flatten)]
    pub group: Group,
    pub member_count: usize,
    pub members: Vec<GroupMember>,
}

impl GroupWithMembers {
    pub fn new(group: Group, members: Vec<GroupMember>) -> Self {
        Self {
            group,
            member_count: members.len(),
            members,
        }
    }

    /// Project into the shape the validators consume.
    pub fn to_snapshot(&self) -> GroupSnapshot {
        GroupSnapshot {
            group_id: self.group.id,
            name: self.group.name.clone(),
            members: self.members.iter().map(GroupMember::to_snapshot).collect(),
        }
    }
}

impl GroupMember {
    pub fn to_snapshot(&self) -> MemberSnapshot {
        MemberSnapshot {
            participant_id: self.participant_id,
            name: self.name.clone(),
            age: self.age,
            gender: self.gender.clone(),
            patrol_name: self.patrol_name.clone(),
            dietary_restrictions: self.dietary_restrictions.clone(),
            is_grubmaster: self.is_grubmaster.unwrap_or(false),
        }
    }
}

/// A participant of an outing with their current group of one kind.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct GroupingParticipant {
    pub id: DbId,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub patrol_name: Option<String>,
    pub troop_number: Option<String>,
    pub is_adult: bool,
    pub dietary_restrictions: Vec<String>,
    pub allergies: Vec<String>,
    pub grubmaster_interest: bool,
    pub grubmaster_reason: Option<String>,
    /// Serialized under a kind-specific key by the API layer.
    #[serde(skip)]
    pub group_id: Option<DbId>,
}

impl GroupingParticipant {
    pub fn is_unassigned(&self) -> bool {
        self.group_id.is_none()
    }

    pub fn to_candidate(&self) -> Candidate {
        Candidate {
            participant_id: self.id,
            name: self.name.clone(),
            age: self.age,
            gender: self.gender.clone(),
            patrol_name: self.patrol_name.clone(),
            is_adult: self.is_adult,
            dietary_restrictions: self.dietary_restrictions.clone(),
            grubmaster_interest: self.grubmaster_interest,
            grubmaster_reason: self
                .grubmaster_reason
                .as_deref()
                .and_then(|r| GrubmasterReason::from_str(r).ok()),
        }
    }
}

/// DTO for creating a group, optionally seeded with members.
#[derive(Debug, Deserialize, Validate)]
pub struct CreateGroup {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<DbId>,
}

/// DTO for renaming a group or changing its notes.
#[derive(Debug, Deserialize, Validate)]
pub struct UpdateGroup {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 2000))]
    pub notes: Option<String>,
}

/// DTO for adding a participant to a group.
#[derive(Debug, Deserialize)]
pub struct AddGroupMember {
    pub participant_id: DbId,
    /// Ignored for tenting groups.
    #[serde(default)]
    pub is_grubmaster: bool,
}

/// DTO for moving a participant. A `None` group unassigns them.
#[derive(Debug, Deserialize)]
pub struct MoveParticipant {
    pub participant_id: DbId,
    pub group_id: Option<DbId>,
}
