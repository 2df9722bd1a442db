//! Route definitions for the `/users` resource.

use axum::routing::post;
use axum::Router;

use crate::handlers::users;
use crate::state::AppState;

/// Routes mounted under `/api`.
///
/// ```text
/// POST /users         -> signup
/// POST /users/login   -> login
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", post(users::signup))
        .route("/users/login", post(users::login))
}
