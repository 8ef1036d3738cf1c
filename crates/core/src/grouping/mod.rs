//! Grouping model shared by tenting and eating (grubmaster) groups.
//!
//! Both kinds of group have the same shape: a named, outing-scoped list of
//! members. The submodules hold the pieces that differ per kind (validators
//! and auto-assignment heuristics) plus the shared packing engine and the
//! sequential naming helper.

pub mod grubmaster;
pub mod naming;
pub mod packing;
pub mod tenting;

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum length of a group name in characters.
pub const MAX_GROUP_NAME_LENGTH: usize = 100;

/// Upper limit accepted for any configured group size.
pub const MAX_GROUP_SIZE: usize = 50;

/// Grubmaster reason codes as stored in `participants.grubmaster_reason`.
pub const REASON_RANK_REQUIREMENT: &str = "rank_requirement";
pub const REASON_MERIT_BADGE: &str = "merit_badge";
pub const REASON_ENJOYS_COOKING: &str = "enjoys_cooking";
pub const REASON_OTHER: &str = "other";

/// All valid grubmaster reason codes.
pub const VALID_GRUBMASTER_REASONS: &[&str] = &[
    REASON_RANK_REQUIREMENT,
    REASON_MERIT_BADGE,
    REASON_ENJOYS_COOKING,
    REASON_OTHER,
];

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// The two kinds of outing group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    Tenting,
    Eating,
}

impl GroupKind {
    /// Entity name used in not-found errors.
    pub fn entity_name(self) -> &'static str {
        match self {
            Self::Tenting => "TentingGroup",
            Self::Eating => "EatingGroup",
        }
    }

    /// Prefix for auto-generated group names ("Tent 3", "Eating Group 2").
    pub fn name_prefix(self) -> &'static str {
        match self {
            Self::Tenting => "Tent",
            Self::Eating => "Eating Group",
        }
    }

    /// Lowercase label used in log fields and messages.
    pub fn label(self) -> &'static str {
        match self {
            Self::Tenting => "tenting",
            Self::Eating => "eating",
        }
    }

    /// Adults sleep apart from scouts, but everyone eats.
    pub fn admits_adults(self) -> bool {
        matches!(self, Self::Eating)
    }
}

/// Why a participant volunteered to be grubmaster.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GrubmasterReason {
    RankRequirement,
    MeritBadge,
    EnjoysCooking,
    Other,
}

impl GrubmasterReason {
    /// Return the database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::RankRequirement => REASON_RANK_REQUIREMENT,
            Self::MeritBadge => REASON_MERIT_BADGE,
            Self::EnjoysCooking => REASON_ENJOYS_COOKING,
            Self::Other => REASON_OTHER,
        }
    }

    /// Parse from a string, returning an error for unknown codes.
    pub fn from_str(s: &str) -> Result<Self, CoreError> {
        match s {
            REASON_RANK_REQUIREMENT => Ok(Self::RankRequirement),
            REASON_MERIT_BADGE => Ok(Self::MeritBadge),
            REASON_ENJOYS_COOKING => Ok(Self::EnjoysCooking),
            REASON_OTHER => Ok(Self::Other),
            other => Err(CoreError::Validation(format!(
                "Unknown grubmaster reason: '{other}'. Valid reasons: {}",
                VALID_GRUBMASTER_REASONS.join(", ")
            ))),
        }
    }

    /// Lower ranks are preferred when picking a group's grubmaster.
    ///
    /// Scouts who need the role for advancement go first.
    pub fn priority(reason: Option<Self>) -> u8 {
        match reason {
            Some(Self::RankRequirement) => 0,
            Some(Self::MeritBadge) => 1,
            Some(Self::EnjoysCooking) => 2,
            Some(Self::Other) => 3,
            None => 4,
        }
    }
}

/// Kind of problem reported by a group validator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueType {
    AgeGap,
    GenderMismatch,
    GroupSize,
    NoGrubmaster,
    DietaryMix,
}

/// Whether an issue breaks policy or is only informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
    Error,
}

// ---------------------------------------------------------------------------
// Value types
// ---------------------------------------------------------------------------

/// Read-only projection of a participant as seen by the auto-assigners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub participant_id: DbId,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub patrol_name: Option<String>,
    pub is_adult: bool,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub grubmaster_interest: bool,
    pub grubmaster_reason: Option<GrubmasterReason>,
}

/// A group member with the attributes the validators look at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberSnapshot {
    pub participant_id: DbId,
    pub name: String,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub patrol_name: Option<String>,
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(default)]
    pub is_grubmaster: bool,
}

/// A group with its resolved members, as read from storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupSnapshot {
    pub group_id: DbId,
    pub name: String,
    pub members: Vec<MemberSnapshot>,
}

impl GroupSnapshot {
    pub fn member_count(&self) -> usize {
        self.members.len()
    }
}

/// A single rule violation found by a validator. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationIssue {
    pub group_id: DbId,
    pub group_name: String,
    pub issue_type: IssueType,
    pub message: String,
    pub severity: Severity,
}

impl ValidationIssue {
    fn new(
        group: &GroupSnapshot,
        issue_type: IssueType,
        severity: Severity,
        message: String,
    ) -> Self {
        Self {
            group_id: group.group_id,
            group_name: group.name.clone(),
            issue_type,
            message,
            severity,
        }
    }
}

/// A member of a group produced by an auto-assigner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlannedMember {
    pub participant_id: DbId,
    pub is_grubmaster: bool,
}

/// A new group produced by an auto-assigner, ready to be persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedGroup {
    pub name: String,
    pub members: Vec<PlannedMember>,
}

// ---------------------------------------------------------------------------
// Normalisation helpers
// ---------------------------------------------------------------------------

/// Normalise a free-text gender value. Blank means unknown.
pub fn normalize_gender(gender: Option<&str>) -> Option<String> {
    gender
        .map(|g| g.trim().to_lowercase())
        .filter(|g| !g.is_empty())
}

/// Normalise a free-text patrol name. Blank means no patrol.
pub fn normalize_patrol(patrol: Option<&str>) -> Option<String> {
    patrol
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
}

/// Canonical signature of a set of dietary restrictions.
///
/// Tags are trimmed, lowercased, deduplicated and sorted, so
/// `["Vegetarian", " nut-free"]` and `["nut-free", "vegetarian"]` collide.
/// No restrictions yields the empty string.
pub fn dietary_signature(restrictions: &[String]) -> String {
    let tags: BTreeSet<String> = restrictions
        .iter()
        .map(|r| r.trim().to_lowercase())
        .filter(|r| !r.is_empty())
        .collect();
    tags.into_iter().collect::<Vec<_>>().join(",")
}

/// Largest pairwise age difference among the known ages.
///
/// Returns `None` when fewer than two ages are known.
pub fn age_spread<I>(ages: I) -> Option<i32>
where
    I: IntoIterator<Item = Option<i32>>,
{
    let mut known = ages.into_iter().flatten();
    let first = known.next()?;
    let (mut lo, mut hi, mut count) = (first, first, 1);
    for age in known {
        lo = lo.min(age);
        hi = hi.max(age);
        count += 1;
    }
    (count >= 2).then_some(hi.saturating_sub(lo))
}

// ---------------------------------------------------------------------------
// Validation functions
// ---------------------------------------------------------------------------

/// Validate and normalise a human-assigned group name.
pub fn validate_group_name(name: &str) -> Result<String, String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err("Group name cannot be empty".to_string());
    }
    if trimmed.chars().count() > MAX_GROUP_NAME_LENGTH {
        return Err(format!(
            "Group name exceeds maximum length of {MAX_GROUP_NAME_LENGTH} characters"
        ));
    }
    Ok(trimmed.to_string())
}

/// Validate a `[min, max]` group size range.
pub fn validate_size_bounds(min: usize, max: usize, what: &str) -> Result<(), CoreError> {
    if min == 0 {
        return Err(CoreError::Validation(format!(
            "{what} minimum size must be at least 1"
        )));
    }
    if max < min {
        return Err(CoreError::Validation(format!(
            "{what} maximum size ({max}) is smaller than minimum size ({min})"
        )));
    }
    if max > MAX_GROUP_SIZE {
        return Err(CoreError::Validation(format!(
            "{what} maximum size cannot exceed {MAX_GROUP_SIZE}"
        )));
    }
    Ok(())
}
