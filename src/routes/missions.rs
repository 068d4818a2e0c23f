//! Entity routes. Missions have no read routes and planets no per-id routes.

use crate::handlers::{missions, planets, scientists};
use crate::state::AppState;
use axum::{routing::get, routing::post, Router};

pub fn mission_routes(state: AppState) -> Router {
    Router::new()
        .route("/scientists", get(scientists::list).post(scientists::create))
        .route(
            "/scientists/:id",
            get(scientists::read)
                .patch(scientists::update)
                .delete(scientists::delete),
        )
        .route("/planets", get(planets::list).post(planets::create))
        .route("/missions", post(missions::create))
        .with_state(state)
}
