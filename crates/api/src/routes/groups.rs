//! Group CRUD and membership routes shared by both group kinds.

use axum::routing::{delete, get, post};
use axum::Router;

use crate::handlers::groups::{self, GroupScope};
use crate::state::AppState;

/// Routes under `/{outing_id}/{segment}` for the kind selected by `S`.
///
/// ```text
/// GET    /groups                              -> list_groups
/// POST   /groups                              -> create_group
/// GET    /groups/{id}                         -> get_group
/// PUT    /groups/{id}                         -> update_group
/// DELETE /groups/{id}                         -> delete_group
/// POST   /groups/{id}/members                 -> add_member
/// DELETE /groups/{id}/members/{participant_id} -> remove_member
/// POST   /move                                -> move_participant
/// ```
pub fn router<S: GroupScope>(segment: &str) -> Router<AppState> {
    let base = format!("/{{outing_id}}/{segment}");
    Router::new()
        .route(
            &format!("{base}/groups"),
            get(groups::list_groups::<S>).post(groups::create_group::<S>),
        )
        .route(
            &format!("{base}/groups/{{id}}"),
            get(groups::get_group::<S>)
                .put(groups::update_group::<S>)
                .delete(groups::delete_group::<S>),
        )
        .route(
            &format!("{base}/groups/{{id}}/members"),
            post(groups::add_member::<S>),
        )
        .route(
            &format!("{base}/groups/{{id}}/members/{{participant_id}}"),
            delete(groups::remove_member::<S>),
        )
        .route(&format!("{base}/move"), post(groups::move_participant::<S>))
}
