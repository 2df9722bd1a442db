//! Route definitions for the onboarding record.

use axum::routing::{get, post};
use axum::Router;

use crate::handlers::onboarding;
use crate::state::AppState;

/// Onboarding routes.
///
/// ```text
/// GET    /onboarding            -> get_onboarding
/// POST   /onboarding/autosave   -> autosave_step (create or merge)
/// POST   /onboarding/finalize   -> finalize_onboarding
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/onboarding", get(onboarding::get_onboarding))
        .route("/onboarding/autosave", post(onboarding::autosave_step))
        .route("/onboarding/finalize", post(onboarding::finalize_onboarding))
}
