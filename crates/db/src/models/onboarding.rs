//! Onboarding record rows.

use onboard_core::onboarding::OnboardingRecord;
use onboard_core::types::{DbId, JsonObject, Timestamp};
use serde_json::Value;
use sqlx::FromRow;

/// A row from the `onboarding_records` table.
#[derive(Debug, Clone, FromRow)]
pub struct OnboardingRow {
    pub id: DbId,
    pub user_id: DbId,
    pub current_step: i32,
    pub personal_info: Value,
    pub professional_info: Value,
    pub preferences: Value,
    pub responses: Value,
    pub is_completed: bool,
    pub last_autosaved_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// A row returned by the autosave upsert, flagged with whether the
/// statement inserted it.
#[derive(Debug, Clone, FromRow)]
pub struct OnboardingUpsertRow {
    #[sqlx(flatten)]
    pub record: OnboardingRow,
    pub inserted: bool,
}

impl From<OnboardingRow> for OnboardingRecord {
    fn from(row: OnboardingRow) -> Self {
        Self {
            id: row.id,
            user: row.user_id,
            current_step: row.current_step,
            personal_info: into_object(row.personal_info),
            professional_info: into_object(row.professional_info),
            preferences: into_object(row.preferences),
            responses: into_object(row.responses),
            is_completed: row.is_completed,
            last_autosaved_at: row.last_autosaved_at,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// JSONB columns are always objects; anything else decodes as empty.
fn into_object(value: Value) -> JsonObject {
    match value {
        Value::Object(map) => map,
        _ => JsonObject::new(),
    }
}
