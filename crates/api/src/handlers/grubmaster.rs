//! Eating-group handlers: summary, validation, auto-assignment and the
//! grubmaster toggle.
//!
//! Group CRUD and membership live in [`super::groups`].

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use trailhead_core::error::CoreError;
use trailhead_core::grouping::grubmaster::{
    plan_eating_groups, validate_eating_groups, GrubmasterParams, GrubmasterPolicy,
};
use trailhead_core::grouping::{GroupKind, GroupSnapshot};
use trailhead_core::types::DbId;
use trailhead_db::models::group::{GroupWithMembers, GroupingParticipant};
use trailhead_db::repositories::GroupRepo;

use super::groups::{find_group, load_summary_parts, GroupingSummary};
use super::outings::ensure_outing;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireLeader};
use crate::response::DataResponse;
use crate::state::AppState;

/// A participant as listed in the grubmaster summary.
#[derive(Debug, Serialize)]
pub struct EatingParticipant {
    #[serde(flatten)]
    pub participant: GroupingParticipant,
    pub eating_group_id: Option<DbId>,
}

/// Result of toggling the grubmaster flag.
#[derive(Debug, Serialize)]
pub struct GrubmasterToggle {
    pub group_id: DbId,
    pub participant_id: DbId,
    pub is_grubmaster: bool,
}

/// GET /outings/{outing_id}/grubmaster/summary
///
/// Everyone eats, so adults and scouts are both listed.
pub async fn summary(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (outing, participants, groups) =
        load_summary_parts(&state.pool, GroupKind::Eating, outing_id).await?;

    let adult_count = participants.iter().filter(|p| p.is_adult).count();
    let scout_count = participants.len() - adult_count;
    let unassigned_count = participants.iter().filter(|p| p.is_unassigned()).count();

    let eaters: Vec<EatingParticipant> = participants
        .into_iter()
        .map(|p| EatingParticipant {
            eating_group_id: p.group_id,
            participant: p,
        })
        .collect();

    Ok(Json(DataResponse {
        data: GroupingSummary {
            outing_id: outing.id,
            outing_name: outing.name,
            participants: eaters,
            groups,
            unassigned_count,
            scout_count,
            adult_count,
        },
    }))
}

/// GET /outings/{outing_id}/grubmaster/validate
///
/// Query: `min_size`, `max_size`, `require_grubmaster`, `flag_dietary_mix`
/// (all optional).
pub async fn validate(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
    Query(policy): Query<GrubmasterPolicy>,
) -> AppResult<impl IntoResponse> {
    policy.validate()?;
    ensure_outing(&state.pool, outing_id).await?;

    let groups = GroupRepo::list_with_members(&state.pool, GroupKind::Eating, outing_id).await?;
    let snapshots: Vec<GroupSnapshot> = groups.iter().map(GroupWithMembers::to_snapshot).collect();
    let issues = validate_eating_groups(&snapshots, &policy);

    tracing::debug!(outing_id, issues = issues.len(), "Eating groups validated");

    Ok(Json(DataResponse { data: issues }))
}

/// POST /outings/{outing_id}/grubmaster/auto-assign
///
/// Body: [`GrubmasterParams`]; omitted fields take their defaults. Returns
/// the eating groups created by this call.
pub async fn auto_assign(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
    Json(params): Json<GrubmasterParams>,
) -> AppResult<impl IntoResponse> {
    params.validate()?;
    ensure_outing(&state.pool, outing_id).await?;

    let created = GroupRepo::auto_assign(
        &state.pool,
        GroupKind::Eating,
        outing_id,
        |candidates, existing_names| plan_eating_groups(candidates, &params, existing_names),
    )
    .await?;

    let with_grubmaster = created
        .iter()
        .filter(|g| g.members.iter().any(|m| m.is_grubmaster == Some(true)))
        .count();
    tracing::info!(
        user_id = user.user_id,
        outing_id,
        groups_created = created.len(),
        with_grubmaster,
        "Eating group auto-assign complete"
    );

    Ok(Json(DataResponse { data: created }))
}

/// PATCH /outings/{outing_id}/grubmaster/groups/{id}/members/{participant_id}/grubmaster
///
/// Flip the member's grubmaster flag. Group composition is unchanged.
pub async fn toggle_grubmaster(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path((outing_id, group_id, participant_id)): Path<(DbId, DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    find_group(&state.pool, GroupKind::Eating, outing_id, group_id).await?;

    let is_grubmaster = GroupRepo::toggle_grubmaster(&state.pool, group_id, participant_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "GroupMember",
                id: participant_id,
            })
        })?;

    tracing::info!(
        user_id = user.user_id,
        outing_id,
        group_id,
        participant_id,
        is_grubmaster,
        "Grubmaster toggled"
    );

    Ok(Json(DataResponse {
        data: GrubmasterToggle {
            group_id,
            participant_id,
            is_grubmaster,
        },
    }))
}
