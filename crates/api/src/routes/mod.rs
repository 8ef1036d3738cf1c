pub mod groups;
pub mod grubmaster;
pub mod health;
pub mod outings;
pub mod tenting;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /outings                                          list, create
/// /outings/{outing_id}                              get, update, delete (admin)
/// /outings/{outing_id}/participants                 list, create
/// /outings/{outing_id}/participants/{id}            get, update, delete
///
/// /outings/{outing_id}/tenting/summary              scouts + tents + counts
/// /outings/{outing_id}/tenting/validate             policy check (GET)
/// /outings/{outing_id}/tenting/groups               list, create
/// /outings/{outing_id}/tenting/groups/{id}          get, update, delete
/// /outings/{outing_id}/tenting/groups/{id}/members  add member (POST)
/// /outings/{outing_id}/tenting/groups/{id}/members/{participant_id}
///                                                   remove member (DELETE)
/// /outings/{outing_id}/tenting/move                 move participant (POST)
/// /outings/{outing_id}/tenting/auto-assign          auto-assign (POST)
///
/// /outings/{outing_id}/grubmaster/...               same set for eating groups, plus
/// /outings/{outing_id}/grubmaster/groups/{id}/members/{participant_id}/grubmaster
///                                                   toggle grubmaster (PATCH)
/// ```
///
/// Reads require any authenticated user; writes require a leader or admin.
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/outings", outings::router())
}
