//! Domain layer for the onboarding service.
//!
//! Holds the record model, the step-slot merge rules, the persistence ports
//! and the [`service::OnboardingService`] state machine. Nothing in here
//! knows about HTTP or Postgres.

pub mod account;
pub mod error;
pub mod memory;
pub mod onboarding;
pub mod service;
pub mod store;
pub mod types;
