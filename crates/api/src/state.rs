use std::sync::Arc;

use onboard_core::onboarding::EditPolicy;
use onboard_core::service::OnboardingService;
use onboard_core::store::{AccountStore, OnboardingStore};

use crate::config::ServerConfig;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// Cheaply cloneable: every field is behind an `Arc` or already `Clone`.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<ServerConfig>,
    /// Step service over the configured onboarding store.
    pub onboarding: OnboardingService,
    /// Account storage for sign-up and login.
    pub accounts: Arc<dyn AccountStore>,
}

impl AppState {
    /// Wire the service and stores together, taking the edit policy from
    /// `config`.
    pub fn new(
        config: ServerConfig,
        onboarding_store: Arc<dyn OnboardingStore>,
        accounts: Arc<dyn AccountStore>,
    ) -> Self {
        let policy = EditPolicy::from_allow_flag(config.allow_edits_after_completion);
        Self {
            config: Arc::new(config),
            onboarding: OnboardingService::new(onboarding_store, policy),
            accounts,
        }
    }
}
