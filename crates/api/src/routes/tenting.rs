//! Route definitions for tenting.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::groups::TentingScope;
use crate::handlers::tenting;
use crate::routes::groups;
use crate::state::AppState;

/// Tenting routes, relative to `/outings`.
///
/// ```text
/// GET    /{outing_id}/tenting/summary       -> summary
/// GET    /{outing_id}/tenting/validate      -> validate
/// POST   /{outing_id}/tenting/auto-assign   -> auto_assign
/// ...    /{outing_id}/tenting/groups/...    -> shared group routes
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{outing_id}/tenting/summary", get(tenting::summary))
        .route("/{outing_id}/tenting/validate", get(tenting::validate))
        .route("/{outing_id}/tenting/auto-assign", post(tenting::auto_assign))
        .merge(groups::router::<TentingScope>("tenting"))
}
