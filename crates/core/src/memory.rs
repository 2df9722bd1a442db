//! In-memory store implementations.
//!
//! Used when no `DATABASE_URL` is configured and by tests. State lives for
//! the lifetime of the process only.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;

use crate::account::{Account, NewAccount};
use crate::error::CoreError;
use crate::onboarding::{EditPolicy, OnboardingRecord, StepWrite};
use crate::store::{AccountStore, OnboardingStore, StepOutcome};
use crate::types::{DbId, Timestamp};

#[derive(Debug, Default)]
struct RecordTable {
    next_id: DbId,
    by_user: HashMap<DbId, OnboardingRecord>,
}

/// [`OnboardingStore`] over a `HashMap` keyed by user id.
///
/// The write lock is held for the whole merge, so each call is atomic.
#[derive(Debug, Default)]
pub struct MemoryOnboardingStore {
    table: RwLock<RecordTable>,
}

impl MemoryOnboardingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records.
    pub async fn len(&self) -> usize {
        self.table.read().await.by_user.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl OnboardingStore for MemoryOnboardingStore {
    async fn find_by_user(&self, user_id: DbId) -> Result<Option<OnboardingRecord>, CoreError> {
        Ok(self.table.read().await.by_user.get(&user_id).cloned())
    }

    async fn apply_step(
        &self,
        user_id: DbId,
        write: &StepWrite,
        policy: EditPolicy,
        now: Timestamp,
    ) -> Result<StepOutcome, CoreError> {
        let mut table = self.table.write().await;

        if let Some(record) = table.by_user.get_mut(&user_id) {
            if record.is_completed && !policy.allows_edits_after_completion() {
                return Ok(StepOutcome::Locked);
            }
            record.apply(write, now);
            return Ok(StepOutcome::Merged(record.clone()));
        }

        table.next_id += 1;
        let record = OnboardingRecord::from_first_write(table.next_id, user_id, write, now);
        table.by_user.insert(user_id, record.clone());
        Ok(StepOutcome::Created(record))
    }

    async fn mark_completed(
        &self,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<OnboardingRecord>, CoreError> {
        let mut table = self.table.write().await;
        Ok(table.by_user.get_mut(&user_id).map(|record| {
            record.complete(now);
            record.clone()
        }))
    }

    async fn ping(&self) -> Result<(), CoreError> {
        Ok(())
    }
}

#[derive(Debug, Default)]
struct AccountTable {
    next_id: DbId,
    by_email: HashMap<String, Account>,
}

/// [`AccountStore`] over a `HashMap` keyed by normalized email.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    table: RwLock<AccountTable>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, input: &NewAccount) -> Result<Account, CoreError> {
        let mut table = self.table.write().await;
        if table.by_email.contains_key(&input.email) {
            return Err(CoreError::Conflict(format!(
                "An account with email '{}' already exists",
                input.email
            )));
        }

        table.next_id += 1;
        let now = Utc::now();
        let account = Account {
            id: table.next_id,
            email: input.email.clone(),
            password_hash: input.password_hash.clone(),
            created_at: now,
            updated_at: now,
        };
        table.by_email.insert(input.email.clone(), account.clone());
        Ok(account)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, CoreError> {
        Ok(self.table.read().await.by_email.get(email).cloned())
    }
}
