//! Handlers for outings.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;

use trailhead_core::error::CoreError;
use trailhead_core::outing::{validate_date_range, validate_outing_name};
use trailhead_core::types::DbId;
use trailhead_db::models::outing::{CreateOuting, Outing, UpdateOuting};
use trailhead_db::repositories::OutingRepo;
use trailhead_db::DbPool;

use crate::error::{AppError, AppResult};
use crate::middleware::rbac::{RequireAdmin, RequireAuth, RequireLeader};
use crate::response::DataResponse;
use crate::state::AppState;

/// Load an outing or fail with 404. Every outing-scoped handler starts here.
pub async fn ensure_outing(pool: &DbPool, outing_id: DbId) -> AppResult<Outing> {
    OutingRepo::find_by_id(pool, outing_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Outing",
                id: outing_id,
            })
        })
}

/// GET /outings
pub async fn list_outings(
    _auth: RequireAuth,
    State(state): State<AppState>,
) -> AppResult<impl IntoResponse> {
    let outings = OutingRepo::list(&state.pool).await?;
    Ok(Json(DataResponse { data: outings }))
}

/// POST /outings
pub async fn create_outing(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Json(mut input): Json<CreateOuting>,
) -> AppResult<impl IntoResponse> {
    validate_outing_name(&input.name).map_err(AppError::BadRequest)?;
    validate_date_range(input.starts_on, input.ends_on).map_err(AppError::BadRequest)?;
    input.name = input.name.trim().to_string();

    let outing = OutingRepo::create(&state.pool, &input).await?;

    tracing::info!(user_id = user.user_id, outing_id = outing.id, "Outing created");

    Ok((StatusCode::CREATED, Json(DataResponse { data: outing })))
}

/// GET /outings/{outing_id}
pub async fn get_outing(
    _auth: RequireAuth,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let outing = ensure_outing(&state.pool, outing_id).await?;
    Ok(Json(DataResponse { data: outing }))
}

/// PUT /outings/{outing_id}
pub async fn update_outing(
    RequireLeader(user): RequireLeader,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
    Json(mut input): Json<UpdateOuting>,
) -> AppResult<impl IntoResponse> {
    let existing = ensure_outing(&state.pool, outing_id).await?;

    if let Some(name) = input.name.as_mut() {
        validate_outing_name(name).map_err(AppError::BadRequest)?;
        *name = name.trim().to_string();
    }
    validate_date_range(
        input.starts_on.or(existing.starts_on),
        input.ends_on.or(existing.ends_on),
    )
    .map_err(AppError::BadRequest)?;

    let outing = OutingRepo::update(&state.pool, outing_id, &input)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound {
                entity: "Outing",
                id: outing_id,
            })
        })?;

    tracing::info!(user_id = user.user_id, outing_id, "Outing updated");

    Ok(Json(DataResponse { data: outing }))
}

/// DELETE /outings/{outing_id}
///
/// Removes the outing with its signups and groups. Admin only.
pub async fn delete_outing(
    RequireAdmin(user): RequireAdmin,
    State(state): State<AppState>,
    Path(outing_id): Path<DbId>,
) -> AppResult<impl IntoResponse> {
    let deleted = OutingRepo::delete(&state.pool, outing_id).await?;

    if !deleted {
        return Err(AppError::Core(CoreError::NotFound {
            entity: "Outing",
            id: outing_id,
        }));
    }

    tracing::info!(user_id = user.user_id, outing_id, "Outing deleted");

    Ok(StatusCode::NO_CONTENT)
}
