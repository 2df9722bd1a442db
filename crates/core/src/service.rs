//! The onboarding step service: `get`, `save_step` and `finalize`.
//!
//! ```text
//!   Absent --save_step--> InProgress --save_step--> InProgress
//!                             |
//!                          finalize
//!                             v
//!                         Completed --finalize / save_step--> Completed
//! ```
//!
//! `save_step` on a completed record is governed by [`EditPolicy`].

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;

use crate::error::CoreError;
use crate::onboarding::{EditPolicy, FinalizeConfirmation, OnboardingRecord, StepWrite};
use crate::store::{OnboardingStore, StepOutcome};
use crate::types::DbId;

/// Entity label used in not-found errors.
pub const ONBOARDING_ENTITY: &str = "Onboarding record";

/// Coordinates step writes against an [`OnboardingStore`].
#[derive(Clone)]
pub struct OnboardingService {
    store: Arc<dyn OnboardingStore>,
    policy: EditPolicy,
}

impl OnboardingService {
    pub fn new(store: Arc<dyn OnboardingStore>, policy: EditPolicy) -> Self {
        Self { store, policy }
    }

    pub fn policy(&self) -> EditPolicy {
        self.policy
    }

    /// Whether the backing store answers.
    pub async fn store_healthy(&self) -> bool {
        self.store.ping().await.is_ok()
    }

    /// Fetch the caller's record.
    pub async fn get(&self, user_id: DbId) -> Result<OnboardingRecord, CoreError> {
        match self.store.find_by_user(user_id).await? {
            Some(record) => Ok(record),
            None => {
                tracing::debug!(user_id, "No onboarding record yet");
                Err(not_found(user_id))
            }
        }
    }

    /// Merge one step's payload into the caller's record, creating the
    /// record on first use.
    pub async fn save_step(
        &self,
        user_id: DbId,
        step: &str,
        data: Value,
        current_step: Option<i32>,
    ) -> Result<OnboardingRecord, CoreError> {
        let write = StepWrite::new(step, data, current_step);

        match self
            .store
            .apply_step(user_id, &write, self.policy, Utc::now())
            .await?
        {
            StepOutcome::Created(record) => {
                tracing::info!(user_id, step = %write.slot, "Created onboarding record");
                Ok(record)
            }
            StepOutcome::Merged(record) => {
                tracing::info!(user_id, step = %write.slot, "Autosaved onboarding step");
                Ok(record)
            }
            StepOutcome::Locked => {
                tracing::info!(user_id, step = %write.slot, "Rejected autosave on completed record");
                Err(CoreError::Conflict(
                    "Onboarding is already completed; further step edits are disabled".to_string(),
                ))
            }
        }
    }

    /// Mark the caller's onboarding complete. Safe to repeat.
    pub async fn finalize(&self, user_id: DbId) -> Result<FinalizeConfirmation, CoreError> {
        match self.store.mark_completed(user_id, Utc::now()).await? {
            Some(_) => {
                tracing::info!(user_id, "Onboarding finalized");
                Ok(FinalizeConfirmation::default())
            }
            None => {
                tracing::debug!(user_id, "Finalize requested without an onboarding record");
                Err(not_found(user_id))
            }
        }
    }
}

fn not_found(user_id: DbId) -> CoreError {
    CoreError::NotFound {
        entity: ONBOARDING_ENTITY,
        user_id,
    }
}
