//! Route definitions for outings and their signups.
//!
//! Mounted at `/outings` by `api_routes()`. The tenting and grubmaster
//! trees are merged in here because they hang off `/{outing_id}`.

use axum::routing::get;
use axum::Router;

use crate::handlers::{outings, participants};
use crate::routes::{grubmaster, tenting};
use crate::state::AppState;

/// Outing routes.
///
/// ```text
/// GET    /                                   -> list_outings
/// POST   /                                   -> create_outing
/// GET    /{outing_id}                        -> get_outing
/// PUT    /{outing_id}                        -> update_outing
/// DELETE /{outing_id}                        -> delete_outing
/// GET    /{outing_id}/participants           -> list_participants
/// POST   /{outing_id}/participants           -> create_participant
/// GET    /{outing_id}/participants/{id}      -> get_participant
/// PUT    /{outing_id}/participants/{id}      -> update_participant
/// DELETE /{outing_id}/participants/{id}      -> delete_participant
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(outings::list_outings).post(outings::create_outing),
        )
        .route(
            "/{outing_id}",
            get(outings::get_outing)
                .put(outings::update_outing)
                .delete(outings::delete_outing),
        )
        .route(
            "/{outing_id}/participants",
            get(participants::list_participants).post(participants::create_participant),
        )
        .route(
            "/{outing_id}/participants/{id}",
            get(participants::get_participant)
                .put(participants::update_participant)
                .delete(participants::delete_participant),
        )
        .merge(tenting::router())
        .merge(grubmaster::router())
}
