//! Client-side onboarding session.
//!
//! Holds the signed-in identity and a mirror of the server record, persists
//! the identity through a [`persistence::SessionPersistence`] port, and talks
//! to the backend through the [`api::OnboardingApi`] transport trait.

pub mod api;
pub mod error;
pub mod persistence;
pub mod preferences;
pub mod session;
