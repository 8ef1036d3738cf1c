//! Group CRUD and membership handlers shared by tenting and eating groups.
//!
//! Each handler is generic over a [`GroupScope`] marker that fixes the
//! [`GroupKind`]; the route modules mount `handler::<TentingScope>` under
//! `/tenting` and `handler::<EatingScope>` under `/grubmaster`.
//!
//! Scope rules enforced here:
//! - Group and participant IDs are resolved inside the path's outing. An ID
//!   from another outing is a 404.
//! - Adults cannot be placed in tents (400).
//! - Adding or seeding a participant who is already in a group of the same
//!   kind is a 409. Use the move endpoint to relocate them.
//! - Group names are trimmed, must be non-empty, and are unique per outing
//!   and kind (409 on collision).

use std::collections::HashSet;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;
use validator::Validate;

use trailhead_core::error::CoreError;
use trailhead_core::grouping::{validate_group_name, GroupKind};
use trailhead_core::types::DbId;
use trailhead_db::models::group::{
    AddGroupMember, CreateGroup, GroupWithMembers, GroupingParticipant, MoveParticipant,
    UpdateGroup,
};
use trailhead_db::models::outing::Outing;
use trailhead_db::repositories::GroupRepo;
use trailhead_db::DbPool;

use super::outings::ensure_outing;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireLeader};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Kind markers
// ---------------------------------------------------------------------------

/// Type-level selector for the group kind a handler operates on.
pub trait GroupScope: Send + Sync + 'static {
    const KIND: GroupKind;
}

/// Tents (`/tenting`).
pub struct TentingScope;

impl GroupScope for TentingScope {
    const KIND: GroupKind = GroupKind::Tenting;
}

/// Eating groups (`/grubmaster`).
pub struct EatingScope;

impl GroupScope for EatingScope {
    const KIND: GroupKind = GroupKind::Eating;
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// Payload of the summary endpoints.
///
/// `P` is the kind-specific participant projection, which carries the
/// current group under `tenting_group_id` or `eating_group_id`.
#[derive(Debug, Serialize)]
pub struct GroupingSummary<P: Serialize> {
    pub outing_id: DbId,
    pub outing_name: String,
    pub participants: Vec<P>,
    pub groups: Vec<GroupWithMembers>,
    /// Listed participants not in any group of this kind.
    pub unassigned_count: usize,
    /// Non-adult signups for the whole outing.
    pub scout_count: usize,
    /// Adult signups for the whole outing.
    pub adult_count: usize,
}

/// Result of a move request.
#[derive(Debug, Serialize)]
pub struct MoveResult {
    pub participant_id: DbId,
    pub group_id: Option<DbId>,
    /// `false` when the participant was already in the target.
    pub changed: bool,
}

// ---------------------------------------------------------------------------
// Shared helpers
// ---------------------------------------------------------------------------

fn group_not_found(kind: GroupKind, id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: kind.entity_name(),
        id,
    })
}

/// Load a group of the outing with its members, or 404.
pub async fn find_group(
    pool: &DbPool,
    kind: GroupKind,
    outing_id: DbId,
    group_id: DbId,
) -> AppResult<GroupWithMembers> {
    GroupRepo::find_with_members(pool, kind, outing_id, group_id)
        .await?
        .ok_or_else(|| group_not_found(kind, group_id))
}

/// Load a participant of the outing who may join a group of `kind`.
///
/// 404 if the participant is not signed up for this outing, 400 if they are
/// an adult and `kind` does not admit adults.
async fn find_eligible_participant(
    pool: &DbPool,
    kind: GroupKind,
    outing_id: DbId,
    participant_id: DbId,
) -> AppResult<GroupingParticipant> {
    let participant = GroupRepo::find_participant(pool, kind, outing_id, participant_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Participant",
                id: participant_id,
            })
        })?;

    if participant.is_adult && !kind.admits_adults() {
        return Err(AppError::Core(CoreError::Validation(format!(
            "{} is an adult; adults are not placed in {} groups",
            participant.name,
            kind.label()
        ))));
    }
    Ok(participant)
}

fn already_assigned(kind: GroupKind, participant: &GroupingParticipant) -> AppError {
    AppError::Core(CoreError::Conflict(format!(
        "{} is already in a {} group; move them instead",
        participant.name,
        kind.label()
    )))
}

/// Reject `name` if another group of this kind in the outing uses it.
async fn ensure_name_available(
    pool: &DbPool,
    kind: GroupKind,
    outing_id: DbId,
    name: &str,
) -> AppResult<()> {
    let names = GroupRepo::group_names(pool, kind, outing_id).await?;
    if names.iter().any(|n| n == name) {
        return Err(AppError::Core(CoreError::Conflict(format!(
            "A {} group named '{name}' already exists in this outing",
            kind.label()
        ))));
    }
    Ok(())
}

/// Load everything a summary endpoint needs in one place.
pub async fn load_summary_parts(
    pool: &DbPool,
    kind: GroupKind,
    outing_id: DbId,
) -> AppResult<(Outing, Vec<GroupingParticipant>, Vec<GroupWithMembers>)> {
    let outing = ensure_outing(pool, outing_id).await?;
    let participants = GroupRepo::list_participants(pool, kind, outing_id).await?;
    let groups = GroupRepo::list_with_members(pool, kind, outing_id).await?;
    Ok((outing, participants, groups))
}

// ---------------------------------------------------------------------------
// Group CRUD
// ---------------------------------------------------------------------------

/// GET /outings/{outing_id}/{kind}/groups
pub async fn list_groups<S: GroupScope>(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_outing(&state.pool, outing_id).await?;
    let groups = GroupRepo::list_with_members(&state.pool, S::KIND, outing_id).await?;
    Ok(Json(DataResponse { data: groups }))
}

/// POST /outings/{outing_id}/{kind}/groups
///
/// Create a group, optionally seeded with `member_ids`. Seeds must belong to
/// the outing and be unassigned; duplicates in the list are collapsed.
pub async fn create_group<S: GroupScope>(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
    Json(mut input): Json<CreateGroup>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    input.name = validate_group_name(&input.name).map_err(AppError::BadRequest)?;

    ensure_outing(&state.pool, outing_id).await?;
    ensure_name_available(&state.pool, S::KIND, outing_id, &input.name).await?;

    let mut seen = HashSet::new();
    input.member_ids.retain(|id| seen.insert(*id));
    for &participant_id in &input.member_ids {
        let participant =
            find_eligible_participant(&state.pool, S::KIND, outing_id, participant_id).await?;
        if !participant.is_unassigned() {
            return Err(already_assigned(S::KIND, &participant));
        }
    }

    let group = GroupRepo::create(&state.pool, S::KIND, outing_id, &input).await?;

    tracing::info!(
        user_id = user.user_id,
        outing_id,
        group_id = group.id,
        kind = S::KIND.label(),
        seeded = input.member_ids.len(),
        "Group created"
    );

    let created = find_group(&state.pool, S::KIND, outing_id, group.id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: created })))
}

/// GET /outings/{outing_id}/{kind}/groups/{id}
pub async fn get_group<S: GroupScope>(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path((outing_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let group = find_group(&state.pool, S::KIND, outing_id, id).await?;
    Ok(Json(DataResponse { data: group }))
}

/// PUT /outings/{outing_id}/{kind}/groups/{id}
pub async fn update_group<S: GroupScope>(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path((outing_id, id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateGroup>,
) -> AppResult<impl IntoResponse> {
    input.validate()?;
    let existing = find_group(&state.pool, S::KIND, outing_id, id).await?;

    if let Some(name) = input.name.take() {
        let name = validate_group_name(&name).map_err(AppError::BadRequest)?;
        if name != existing.group.name {
            ensure_name_available(&state.pool, S::KIND, outing_id, &name).await?;
        }
        input.name = Some(name);
    }

    GroupRepo::update(&state.pool, S::KIND, outing_id, id, &input)
        .await?
        .ok_or_else(|| group_not_found(S::KIND, id))?;

    tracing::info!(
        user_id = user.user_id,
        outing_id,
        group_id = id,
        kind = S::KIND.label(),
        "Group updated"
    );

    let updated = find_group(&state.pool, S::KIND, outing_id, id).await?;
    Ok(Json(DataResponse { data: updated }))
}

/// DELETE /outings/{outing_id}/{kind}/groups/{id}
///
/// Members return to the unassigned pool.
pub async fn delete_group<S: GroupScope>(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path((outing_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let existing = find_group(&state.pool, S::KIND, outing_id, id).await?;

    let deleted = GroupRepo::delete(&state.pool, S::KIND, outing_id, id).await?;
    if !deleted {
        return Err(group_not_found(S::KIND, id));
    }

    tracing::info!(
        user_id = user.user_id,
        outing_id,
        group_id = id,
        kind = S::KIND.label(),
        unassigned = existing.member_count,
        "Group deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Membership
// ---------------------------------------------------------------------------

/// POST /outings/{outing_id}/{kind}/groups/{id}/members
pub async fn add_member<S: GroupScope>(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path((outing_id, group_id)): Path<(DbId, DbId)>,
    Json(input): Json<AddGroupMember>,
) -> AppResult<impl IntoResponse> {
    find_group(&state.pool, S::KIND, outing_id, group_id).await?;
    let participant =
        find_eligible_participant(&state.pool, S::KIND, outing_id, input.participant_id).await?;

    match participant.group_id {
        Some(current) if current == group_id => {
            return Err(AppError::Core(CoreError::Conflict(format!(
                "{} is already a member of this group",
                participant.name
            ))));
        }
        Some(_) => return Err(already_assigned(S::KIND, &participant)),
        None => {}
    }

    let is_grubmaster = input.is_grubmaster && S::KIND == GroupKind::Eating;
    GroupRepo::add_member(
        &state.pool,
        S::KIND,
        group_id,
        input.participant_id,
        is_grubmaster,
    )
    .await?;

    tracing::info!(
        user_id = user.user_id,
        outing_id,
        group_id,
        participant_id = input.participant_id,
        kind = S::KIND.label(),
        "Group member added"
    );

    let group = find_group(&state.pool, S::KIND, outing_id, group_id).await?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: group })))
}

/// DELETE /outings/{outing_id}/{kind}/groups/{id}/members/{participant_id}
pub async fn remove_member<S: GroupScope>(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path((outing_id, group_id, participant_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    find_group(&state.pool, S::KIND, outing_id, group_id).await?;

    let removed = GroupRepo::remove_member(&state.pool, S::KIND, group_id, participant_id).await?;
    if !removed {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "GroupMember",
            id: participant_id,
        }));
    }

    tracing::info!(
        user_id = user.user_id,
        outing_id,
        group_id,
        participant_id,
        kind = S::KIND.label(),
        "Group member removed"
    );

    Ok(StatusCode::NO_CONTENT)
}

/// POST /outings/{outing_id}/{kind}/move
///
/// Move a participant into `group_id`, or out of every group of this kind
/// when it is `null`. Repeating a move leaves the same end state.
pub async fn move_participant<S: GroupScope>(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
    Json(input): Json<MoveParticipant>,
) -> AppResult<impl IntoResponse> {
    ensure_outing(&state.pool, outing_id).await?;
    find_eligible_participant(&state.pool, S::KIND, outing_id, input.participant_id).await?;
    if let Some(target) = input.group_id {
        find_group(&state.pool, S::KIND, outing_id, target).await?;
    }

    let changed =
        GroupRepo::move_participant(&state.pool, S::KIND, input.participant_id, input.group_id)
            .await?;

    if changed {
        tracing::info!(
            user_id = user.user_id,
            outing_id,
            participant_id = input.participant_id,
            group_id = ?input.group_id,
            kind = S::KIND.label(),
            "Participant moved"
        );
    }

    Ok(Json(DataResponse {
        data: MoveResult {
            participant_id: input.participant_id,
            group_id: input.group_id,
            changed,
        },
    }))
}
