//! Handlers for the onboarding record.
//!
//! All endpoints require authentication. The record is created lazily by
//! the first autosave; before that `GET` and `finalize` answer 404.

use axum::extract::State;
use axum::Json;
use onboard_core::onboarding::{FinalizeConfirmation, OnboardingRecord, STEP_RESPONSES};
use serde::{Deserialize, Deserializer};
use serde_json::{json, Value};

use crate::error::AppResult;
use crate::extract::AppJson;
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Request body for `POST /onboarding/autosave`.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AutosaveRequest {
    /// Step name, e.g. `personalInfo` or `profileSetup`. Without one the
    /// payload has nowhere to go and only the autosave time is stamped.
    #[serde(default)]
    pub step: Option<String>,
    /// Partial step payload. Missing means an empty patch.
    #[serde(default)]
    pub data: Value,
    /// Advisory progress marker. Integers and numeric strings are kept;
    /// anything else is ignored.
    #[serde(default, deserialize_with = "lenient_current_step")]
    pub current_step: Option<i32>,
}

fn lenient_current_step<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().and_then(|n| i32::try_from(n).ok()),
        Some(Value::String(s)) => s.trim().parse::<i32>().ok(),
        _ => None,
    })
}

// ---------------------------------------------------------------------------
// GET /onboarding
// ---------------------------------------------------------------------------

/// Return the caller's onboarding record verbatim.
pub async fn get_onboarding(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<OnboardingRecord>> {
    let record = state.onboarding.get(auth.user_id).await?;
    Ok(Json(record))
}

// ---------------------------------------------------------------------------
// POST /onboarding/autosave
// ---------------------------------------------------------------------------

/// Merge one step's data into the caller's record and return the full
/// record.
pub async fn autosave_step(
    auth: AuthUser,
    State(state): State<AppState>,
    AppJson(input): AppJson<AutosaveRequest>,
) -> AppResult<Json<OnboardingRecord>> {
    let (step, data) = match input.step {
        Some(step) => (step, input.data),
        None => {
            tracing::warn!(user_id = auth.user_id, "Autosave without a step name; payload dropped");
            (STEP_RESPONSES.to_string(), json!({}))
        }
    };

    let record = state
        .onboarding
        .save_step(auth.user_id, &step, data, input.current_step)
        .await?;
    Ok(Json(record))
}

// ---------------------------------------------------------------------------
// POST /onboarding/finalize
// ---------------------------------------------------------------------------

/// Mark the caller's onboarding complete.
pub async fn finalize_onboarding(
    auth: AuthUser,
    State(state): State<AppState>,
) -> AppResult<Json<FinalizeConfirmation>> {
    let confirmation = state.onboarding.finalize(auth.user_id).await?;
    Ok(Json(confirmation))
}
