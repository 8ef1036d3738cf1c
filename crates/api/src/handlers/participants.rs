//! Handlers for outing signups.
//!
//! Participants are always addressed through their outing; an ID that
//! belongs to a different outing is reported as not found.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use trailhead_core::error::CoreError;
use trailhead_core::outing::{validate_age, validate_grubmaster_reason, validate_participant_name};
use trailhead_core::types::DbId;
use trailhead_db::models::participant::{CreateParticipant, UpdateParticipant};
use trailhead_db::repositories::ParticipantRepo;

use super::outings::ensure_outing;
use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAuth, RequireLeader};
use crate::response::DataResponse;
use crate::state::AppState;

fn participant_not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "Participant",
        id,
    })
}

/// GET /outings/{outing_id}/participants
pub async fn list_participants(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    ensure_outing(&state.pool, outing_id).await?;
    let participants = ParticipantRepo::list_by_outing(&state.pool, outing_id).await?;
    Ok(Json(DataResponse { data: participants }))
}

/// POST /outings/{outing_id}/participants
pub async fn create_participant(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
    Json(mut input): Json<CreateParticipant>,
) -> AppResult<impl IntoResponse> {
    validate_participant_name(&input.name).map_err(AppError::BadRequest)?;
    validate_age(input.age).map_err(AppError::BadRequest)?;
    validate_grubmaster_reason(input.grubmaster_reason.as_deref())
        .map_err(AppError::BadRequest)?;
    input.name = input.name.trim().to_string();

    ensure_outing(&state.pool, outing_id).await?;
    let participant = ParticipantRepo::create(&state.pool, outing_id, &input).await?;

    tracing::info!(
        user_id = user.user_id,
        outing_id,
        participant_id = participant.id,
        "Participant signed up"
    );

    Ok((StatusCode::CREATED, Json(DataResponse { data: participant })))
}

/// GET /outings/{outing_id}/participants/{id}
pub async fn get_participant(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path((outing_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let participant = ParticipantRepo::find(&state.pool, outing_id, id)
        .await?
        .ok_or_else(|| participant_not_found(id))?;
    Ok(Json(DataResponse { data: participant }))
}

/// PUT /outings/{outing_id}/participants/{id}
pub async fn update_participant(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path((outing_id, id)): Path<(DbId, DbId)>,
    Json(mut input): Json<UpdateParticipant>,
) -> AppResult<impl IntoResponse> {
    if let Some(name) = input.name.as_mut() {
        validate_participant_name(name).map_err(AppError::BadRequest)?;
        *name = name.trim().to_string();
    }
    validate_age(input.age).map_err(AppError::BadRequest)?;
    validate_grubmaster_reason(input.grubmaster_reason.as_deref())
        .map_err(AppError::BadRequest)?;

    let participant = ParticipantRepo::update(&state.pool, outing_id, id, &input)
        .await?
        .ok_or_else(|| participant_not_found(id))?;

    tracing::info!(
        user_id = user.user_id,
        outing_id,
        participant_id = id,
        "Participant updated"
    );

    Ok(Json(DataResponse { data: participant }))
}

/// DELETE /outings/{outing_id}/participants/{id}
///
/// Also drops the participant from any tent or eating group.
pub async fn delete_participant(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path((outing_id, id)): Path<(DbId, DbId)>,
) -> AppResult<impl IntoResponse> {
    let deleted = ParticipantRepo::delete(&state.pool, outing_id, id).await?;

    if !deleted {
        return Err(participant_not_found(id));
    }

    tracing::info!(
        user_id = user.user_id,
        outing_id,
        participant_id = id,
        "Participant removed"
    );

    Ok(StatusCode::NO_CONTENT)
}
