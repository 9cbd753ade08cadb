use axum::routing::{get, post};
use axum::Router;

use crate::handlers::campaign;
use crate::state::AppState;

/// Routes mounted at `/campaign`.
///
/// ```text
/// GET, PUT  /                current document (conditional read, guarded write)
/// GET       /snapshots       snapshot history, newest first
/// POST      /restore/{id}    restore a snapshot
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(campaign::get_campaign).put(campaign::put_campaign))
        .route("/snapshots", get(campaign::list_snapshots))
        .route("/restore/{id}", post(campaign::restore_snapshot))
}
