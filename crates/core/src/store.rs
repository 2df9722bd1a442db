//! Persistence ports.
//!
//! Every method is a single atomic unit against the backing store: a step
//! write never reads the record and writes it back in two steps, so two
//! concurrent autosaves of different slots cannot drop each other's fields.

use async_trait::async_trait;

use crate::account::{Account, NewAccount};
use crate::error::CoreError;
use crate::onboarding::{EditPolicy, OnboardingRecord, StepWrite};
use crate::types::{DbId, Timestamp};

/// Result of [`OnboardingStore::apply_step`].
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    /// No record existed; one was created from this write.
    Created(OnboardingRecord),
    /// The write was merged into the existing record.
    Merged(OnboardingRecord),
    /// The record is completed and the policy forbids further writes.
    Locked,
}

/// Storage for onboarding records, keyed by owning user.
#[async_trait]
pub trait OnboardingStore: Send + Sync {
    /// Look up the record owned by `user_id`.
    async fn find_by_user(&self, user_id: DbId) -> Result<Option<OnboardingRecord>, CoreError>;

    /// Create-or-merge a step write and stamp `last_autosaved_at = now`.
    async fn apply_step(
        &self,
        user_id: DbId,
        write: &StepWrite,
        policy: EditPolicy,
        now: Timestamp,
    ) -> Result<StepOutcome, CoreError>;

    /// Set `is_completed`. Returns `None` when the user has no record.
    async fn mark_completed(
        &self,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<OnboardingRecord>, CoreError>;

    /// Cheap reachability check for the health endpoint.
    async fn ping(&self) -> Result<(), CoreError>;
}

/// Storage for login accounts.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert an account. A taken email is a [`CoreError::Conflict`].
    async fn create(&self, input: &NewAccount) -> Result<Account, CoreError>;

    /// Find an account by its normalized email.
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, CoreError>;
}
