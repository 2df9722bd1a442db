//! Repository for the `onboarding_records` table.

use onboard_core::onboarding::{StepSlot, StepWrite};
use onboard_core::types::{DbId, Timestamp};
use serde_json::Value;
use sqlx::PgPool;

use crate::models::onboarding::{OnboardingRow, OnboardingUpsertRow};

/// Column list for `onboarding_records` queries.
const COLUMNS: &str = "\
    id, user_id, current_step, personal_info, professional_info, \
    preferences, responses, is_completed, last_autosaved_at, \
    created_at, updated_at";

/// JSONB column backing a step slot.
fn slot_column(slot: &StepSlot) -> &'static str {
    match slot {
        StepSlot::PersonalInfo => "personal_info",
        StepSlot::ProfessionalInfo => "professional_info",
        StepSlot::Preferences => "preferences",
        StepSlot::Responses | StepSlot::Extra(_) => "responses",
    }
}

/// `SET` expression merging the patch (`$6`) into the existing column.
///
/// Extra steps merge one level inside `responses[$7]`, and only when both
/// the stored entry and the patch are objects; otherwise the patch replaces
/// the entry.
fn merge_expression(slot: &StepSlot) -> String {
    match slot {
        StepSlot::Extra(_) => "onboarding_records.responses || jsonb_build_object($7::text, \
             CASE WHEN jsonb_typeof(onboarding_records.responses -> $7::text) = 'object' \
                   AND jsonb_typeof($6::jsonb) = 'object' \
                  THEN (onboarding_records.responses -> $7::text) || $6::jsonb \
                  ELSE $6::jsonb END)"
            .to_string(),
        other => {
            let column = slot_column(other);
            format!("onboarding_records.{column} || $6::jsonb")
        }
    }
}

/// Column value for a record created by `write`.
fn initial_column_value(write: &StepWrite) -> Value {
    let value = write.slot.initial_value(&write.data);
    match &write.slot {
        StepSlot::Extra(name) => {
            let mut responses = serde_json::Map::new();
            responses.insert(name.clone(), value);
            Value::Object(responses)
        }
        _ => value,
    }
}

/// Provides the onboarding record queries.
pub struct OnboardingRepo;

impl OnboardingRepo {
    /// Find the record owned by a user.
    pub async fn find_by_user(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<OnboardingRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM onboarding_records WHERE user_id = $1");
        sqlx::query_as::<_, OnboardingRow>(&query)
            .bind(user_id)
            .fetch_optional(pool)
            .await
    }

    /// Insert-or-merge a step write in a single statement.
    ///
    /// - No row for `user_id`: inserts one with the slot set to its initial
    ///   value and every other column at its default.
    /// - Existing row: merges the patch into the slot with JSONB `||`
    ///   (shallow, incoming keys win) and stamps the autosave time.
    ///
    /// Returns `None` when the row is completed and `allow_completed` is
    /// false; the conflict branch's `WHERE` then suppresses the update.
    pub async fn apply_step(
        pool: &PgPool,
        user_id: DbId,
        write: &StepWrite,
        allow_completed: bool,
        now: Timestamp,
    ) -> Result<Option<OnboardingUpsertRow>, sqlx::Error> {
        let column = slot_column(&write.slot);
        let merge = merge_expression(&write.slot);
        let query = format!(
            "INSERT INTO onboarding_records \
                 (user_id, {column}, current_step, last_autosaved_at, created_at, updated_at) \
             VALUES ($1, $5::jsonb, COALESCE($3::int, 1), $2, $2, $2) \
             ON CONFLICT (user_id) DO UPDATE SET \
                 {column} = {merge}, \
                 current_step = COALESCE($3::int, onboarding_records.current_step), \
                 last_autosaved_at = $2, \
                 updated_at = $2 \
             WHERE $4 OR NOT onboarding_records.is_completed \
             RETURNING {COLUMNS}, (xmax = 0) AS inserted"
        );

        let mut q = sqlx::query_as::<_, OnboardingUpsertRow>(&query)
            .bind(user_id)
            .bind(now)
            .bind(write.current_step)
            .bind(allow_completed)
            .bind(initial_column_value(write))
            .bind(&write.data);

        if let StepSlot::Extra(name) = &write.slot {
            q = q.bind(name);
        }

        q.fetch_optional(pool).await
    }

    /// Set `is_completed = TRUE` and stamp the autosave time.
    ///
    /// Returns `None` if the user has no record; nothing is inserted.
    pub async fn mark_completed(
        pool: &PgPool,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<OnboardingRow>, sqlx::Error> {
        let query = format!(
            "UPDATE onboarding_records \
             SET is_completed = TRUE, last_autosaved_at = $2, updated_at = $2 \
             WHERE user_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, OnboardingRow>(&query)
            .bind(user_id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }
}
