//! Tenting-specific handlers: summary, validation and auto-assignment.
//!
//! Group CRUD and membership live in [`super::groups`].

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use trailhead_core::grouping::tenting::{
    plan_tenting, validate_tenting_groups, TentingParams, TentingPolicy,
};
use trailhead_core::grouping::{GroupKind, GroupSnapshot};
use trailhead_core::types::DbId;
use trailhead_db::models::group::{GroupWithMembers, GroupingParticipant};
use trailhead_db::repositories::GroupRepo;

use super::groups::{load_summary_parts, GroupingSummary};
use super::outings::ensure_outing;
use crate::error::AppResult;
use crate::middleware::rbac::{RequireAuth, RequireLeader};
use crate::response::DataResponse;
use crate::state::AppState;

/// A scout as listed in the tenting summary.
#[derive(Debug, Serialize)]
pub struct TentingParticipant {
    #[serde(flatten)]
    pub participant: GroupingParticipant,
    pub tenting_group_id: Option<DbId>,
}

/// GET /outings/{outing_id}/tenting/summary
///
/// Scouts with their tent, every tent with its members, and head counts.
/// Adults are counted but not listed.
pub async fn summary(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let (outing, participants, groups) =
        load_summary_parts(&state.pool, GroupKind::Tenting, outing_id).await?;

    let adult_count = participants.iter().filter(|p| p.is_adult).count();
    let scout_count = participants.len() - adult_count;

    let scouts: Vec<TentingParticipant> = participants
        .into_iter()
        .filter(|p| !p.is_adult)
        .map(|p| TentingParticipant {
            tenting_group_id: p.group_id,
            participant: p,
        })
        .collect();
    let unassigned_count = scouts.iter().filter(|s| s.tenting_group_id.is_none()).count();

    Ok(Json(DataResponse {
        data: GroupingSummary {
            outing_id: outing.id,
            outing_name: outing.name,
            participants: scouts,
            groups,
            unassigned_count,
            scout_count,
            adult_count,
        },
    }))
}

/// GET /outings/{outing_id}/tenting/validate
///
/// Query: `max_age_difference`, `min_size`, `max_size` (all optional).
pub async fn validate(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
    Query(policy): Query<TentingPolicy>,
) -> AppResult<impl IntoResponse> {
    policy.validate()?;
    ensure_outing(&state.pool, outing_id).await?;

    let groups = GroupRepo::list_with_members(&state.pool, GroupKind::Tenting, outing_id).await?;
    let snapshots: Vec<GroupSnapshot> = groups.iter().map(GroupWithMembers::to_snapshot).collect();
    let issues = validate_tenting_groups(&snapshots, &policy);

    tracing::debug!(outing_id, issues = issues.len(), "Tenting groups validated");

    Ok(Json(DataResponse { data: issues }))
}

/// POST /outings/{outing_id}/tenting/auto-assign
///
/// Body: [`TentingParams`]; omitted fields take their defaults. Returns the
/// tents created by this call.
pub async fn auto_assign(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
    Json(params): Json<TentingParams>,
) -> AppResult<impl IntoResponse> {
    params.validate()?;
    ensure_outing(&state.pool, outing_id).await?;

    let created = GroupRepo::auto_assign(
        &state.pool,
        GroupKind::Tenting,
        outing_id,
        |candidates, existing_names| plan_tenting(candidates, &params, existing_names),
    )
    .await?;

    tracing::info!(
        user_id = user.user_id,
        outing_id,
        groups_created = created.len(),
        assigned = created.iter().map(|g| g.member_count).sum::<usize>(),
        "Tenting auto-assign complete"
    );

    Ok(Json(DataResponse { data: created }))
}
