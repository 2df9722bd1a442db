//! Postgres implementations of the `onboard-core` store ports.

use async_trait::async_trait;
use onboard_core::account::{Account, NewAccount};
use onboard_core::error::CoreError;
use onboard_core::onboarding::{EditPolicy, OnboardingRecord, StepWrite};
use onboard_core::store::{AccountStore, OnboardingStore, StepOutcome};
use onboard_core::types::{DbId, Timestamp};

use crate::error::map_db_error;
use crate::repositories::{OnboardingRepo, UserRepo};
use crate::DbPool;

/// [`OnboardingStore`] backed by the `onboarding_records` table.
#[derive(Clone)]
pub struct PgOnboardingStore {
    pool: DbPool,
}

impl PgOnboardingStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OnboardingStore for PgOnboardingStore {
    async fn find_by_user(&self, user_id: DbId) -> Result<Option<OnboardingRecord>, CoreError> {
        let row = OnboardingRepo::find_by_user(&self.pool, user_id)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Into::into))
    }

    async fn apply_step(
        &self,
        user_id: DbId,
        write: &StepWrite,
        policy: EditPolicy,
        now: Timestamp,
    ) -> Result<StepOutcome, CoreError> {
        let row = OnboardingRepo::apply_step(
            &self.pool,
            user_id,
            write,
            policy.allows_edits_after_completion(),
            now,
        )
        .await
        .map_err(map_db_error)?;

        Ok(match row {
            Some(row) if row.inserted => StepOutcome::Created(row.record.into()),
            Some(row) => StepOutcome::Merged(row.record.into()),
            None => StepOutcome::Locked,
        })
    }

    async fn mark_completed(
        &self,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<OnboardingRecord>, CoreError> {
        let row = OnboardingRepo::mark_completed(&self.pool, user_id, now)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Into::into))
    }

    async fn ping(&self) -> Result<(), CoreError> {
        crate::health_check(&self.pool).await.map_err(map_db_error)
    }
}

/// [`AccountStore`] backed by the `users` table.
#[derive(Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, input: &NewAccount) -> Result<Account, CoreError> {
        let row = UserRepo::create(&self.pool, input)
            .await
            .map_err(map_db_error)?;
        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, CoreError> {
        let row = UserRepo::find_by_email(&self.pool, email)
            .await
            .map_err(map_db_error)?;
        Ok(row.map(Into::into))
    }
}
