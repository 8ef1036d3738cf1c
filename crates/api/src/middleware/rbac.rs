//! Role checks layered on [`AuthUser`].
//!
//! Reads are open to any signed-in role. Editing outings, signups and groups
//! takes a leader or admin; deleting a whole outing takes an admin.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use trailhead_core::error::CoreError;
use trailhead_core::roles::{can_edit, ROLE_ADMIN};

use super::auth::AuthUser;
use crate::error::AppError;
use crate::state::AppState;

/// Authenticate, then reject with 403 unless `allowed` accepts the role.
async fn authorize(
    parts: &mut Parts,
    state: &AppState,
    allowed: fn(&str) -> bool,
    requirement: &str,
) -> Result<AuthUser, AppError> {
    let user = AuthUser::from_request_parts(parts, state).await?;
    if !allowed(&user.role) {
        tracing::debug!(user_id = user.user_id, role = %user.role, requirement, "Role check failed");
        return Err(AppError::Core(CoreError::Forbidden(format!(
            "{requirement} role required"
        ))));
    }
    Ok(user)
}

/// Any authenticated caller.
pub struct RequireAuth(pub AuthUser);

impl FromRequestParts<AppState> for RequireAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        AuthUser::from_request_parts(parts, state).await.map(RequireAuth)
    }
}

/// A leader or admin.
///
/// ```ignore
/// async fn rename_tent(RequireLeader(user): RequireLeader) -> AppResult<Json<()>> {
///     Ok(Json(()))
/// }
/// ```
pub struct RequireLeader(pub AuthUser);

impl FromRequestParts<AppState> for RequireLeader {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, can_edit, "Leader or Admin")
            .await
            .map(RequireLeader)
    }
}

/// Admins only.
pub struct RequireAdmin(pub AuthUser);

impl FromRequestParts<AppState> for RequireAdmin {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        authorize(parts, state, |role| role == ROLE_ADMIN, "Admin")
            .await
            .map(RequireAdmin)
    }
}
