//! Route definitions for eating groups.

use axum::routing::{get, patch, post};
use axum::Router;

use crate::handlers::groups::EatingScope;
use crate::handlers::grubmaster;
use crate::routes::groups;
use crate::state::AppState;

/// Eating-group routes, relative to `/outings`.
///
/// ```text
/// GET    /{outing_id}/grubmaster/summary       -> summary
/// GET    /{outing_id}/grubmaster/validate      -> validate
/// POST   /{outing_id}/grubmaster/auto-assign   -> auto_assign
/// PATCH  /{outing_id}/grubmaster/groups/{id}/members/{participant_id}/grubmaster
///                                              -> toggle_grubmaster
/// ...    /{outing_id}/grubmaster/groups/...    -> shared group routes
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{outing_id}/grubmaster/summary", get(grubmaster::summary))
        .route("/{outing_id}/grubmaster/validate", get(grubmaster::validate))
        .route(
            "/{outing_id}/grubmaster/auto-assign",
            post(grubmaster::auto_assign),
        )
        .route(
            "/{outing_id}/grubmaster/groups/{id}/members/{participant_id}/grubmaster",
            patch(grubmaster::toggle_grubmaster),
        )
        .merge(groups::router::<EatingScope>("grubmaster"))
}
