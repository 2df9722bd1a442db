//! The client's onboarding session: who is signed in and what the form
//! currently holds.
//!
//! ```text
//!   restore / signup / login ──> SignedIn ──autosave_step / finalize──> SignedIn
//!                                   │
//!                                 logout
//!                                   v
//!                               SignedOut
//! ```
//!
//! Only the identity is persisted. The form is always re-hydrated from the
//! server, which owns the record.

use onboard_core::onboarding::{
    default_preferences, FinalizeConfirmation, OnboardingRecord, DEFAULT_CURRENT_STEP,
};
use onboard_core::types::JsonObject;
use serde_json::Value;

use crate::api::{Identity, OnboardingApi};
use crate::error::ClientError;
use crate::persistence::SessionPersistence;
use crate::preferences::InterestSelection;

/// Client-side mirror of the onboarding record.
#[derive(Debug, Clone, PartialEq)]
pub struct FormState {
    pub current_step: i32,
    pub personal_info: JsonObject,
    pub professional_info: JsonObject,
    pub preferences: JsonObject,
    pub responses: JsonObject,
    pub is_completed: bool,
}

impl Default for FormState {
    fn default() -> Self {
        Self {
            current_step: DEFAULT_CURRENT_STEP,
            personal_info: JsonObject::new(),
            professional_info: JsonObject::new(),
            preferences: default_preferences(),
            responses: JsonObject::new(),
            is_completed: false,
        }
    }
}

impl From<&OnboardingRecord> for FormState {
    fn from(record: &OnboardingRecord) -> Self {
        Self {
            current_step: record.current_step,
            personal_info: record.personal_info.clone(),
            professional_info: record.professional_info.clone(),
            preferences: record.preferences.clone(),
            responses: record.responses.clone(),
            is_completed: record.is_completed,
        }
    }
}

impl FormState {
    /// Interest selection seeded from the mirrored preferences.
    pub fn interests(&self) -> InterestSelection {
        InterestSelection::from_preferences(&self.preferences)
    }
}

/// Signed-in identity plus form mirror, backed by a transport and a
/// persistence port.
pub struct SessionStore<A, P> {
    api: A,
    persistence: P,
    identity: Option<Identity>,
    form: FormState,
}

impl<A, P> SessionStore<A, P>
where
    A: OnboardingApi,
    P: SessionPersistence,
{
    /// A signed-out session. Call [`restore`](Self::restore) to pick up a
    /// persisted identity.
    pub fn new(api: A, persistence: P) -> Self {
        Self {
            api,
            persistence,
            identity: None,
            form: FormState::default(),
        }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_signed_in(&self) -> bool {
        self.identity.is_some()
    }

    pub fn form(&self) -> &FormState {
        &self.form
    }

    /// Load a persisted identity and hydrate the form for it.
    ///
    /// Unparseable data and tokens the server rejects are cleared, leaving
    /// the session signed out.
    pub async fn restore(&mut self) -> Result<Option<&Identity>, ClientError> {
        let Some(raw) = self.persistence.load().await? else {
            return Ok(None);
        };

        let identity = match serde_json::from_str::<Identity>(&raw) {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(error = %e, "Discarding corrupt persisted session");
                self.persistence.clear().await?;
                return Ok(None);
            }
        };

        tracing::debug!(user_id = identity.id, "Restored persisted session");
        self.identity = Some(identity);

        match self.hydrate().await {
            Ok(()) => Ok(self.identity.as_ref()),
            Err(ClientError::Unauthorized(msg)) => {
                tracing::info!(reason = %msg, "Persisted session rejected by server");
                self.logout().await?;
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    pub async fn signup(&mut self, email: &str, password: &str) -> Result<Identity, ClientError> {
        let identity = self.api.signup(email, password).await?;
        self.start(identity).await
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<Identity, ClientError> {
        let identity = self.api.login(email, password).await?;
        self.start(identity).await
    }

    /// Replace the form with the server's record. No record yet means an
    /// empty form.
    pub async fn hydrate(&mut self) -> Result<(), ClientError> {
        let token = self.token()?.to_string();
        self.form = match self.api.fetch_onboarding(&token).await {
            Ok(record) => FormState::from(&record),
            Err(ClientError::NotFound) => FormState::default(),
            Err(e) => return Err(e),
        };
        Ok(())
    }

    /// Autosave one step and mirror the returned record.
    pub async fn autosave_step(
        &mut self,
        step: &str,
        data: Value,
    ) -> Result<&FormState, ClientError> {
        self.autosave_step_at(step, data, None).await
    }

    /// Like [`autosave_step`](Self::autosave_step), also recording progress.
    pub async fn autosave_step_at(
        &mut self,
        step: &str,
        data: Value,
        current_step: Option<i32>,
    ) -> Result<&FormState, ClientError> {
        let token = self.token()?.to_string();
        let record = self.api.autosave(&token, step, &data, current_step).await?;
        self.form = FormState::from(&record);
        Ok(&self.form)
    }

    pub async fn finalize(&mut self) -> Result<FinalizeConfirmation, ClientError> {
        let token = self.token()?.to_string();
        let confirmation = self.api.finalize(&token).await?;
        self.form.is_completed = true;
        Ok(confirmation)
    }

    /// Forget the identity and reset the form.
    pub async fn logout(&mut self) -> Result<(), ClientError> {
        self.persistence.clear().await?;
        self.identity = None;
        self.form = FormState::default();
        Ok(())
    }

    async fn start(&mut self, identity: Identity) -> Result<Identity, ClientError> {
        self.persistence
            .store(&serde_json::to_string(&identity)?)
            .await?;
        tracing::info!(user_id = identity.id, "Signed in");
        self.identity = Some(identity.clone());
        self.hydrate().await?;
        Ok(identity)
    }

    fn token(&self) -> Result<&str, ClientError> {
        self.identity
            .as_ref()
            .map(|identity| identity.token.as_str())
            .ok_or(ClientError::NotSignedIn)
    }
}
