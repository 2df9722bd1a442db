pub mod health;
pub mod onboarding;
pub mod users;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// ```text
/// /users                     sign-up (public)
/// /users/login               login (public)
///
/// /onboarding                get record (auth required)
/// /onboarding/autosave       save one step (auth required)
/// /onboarding/finalize       mark complete (auth required)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(users::router())
        .merge(onboarding::router())
}
