//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods that
//! accept `&PgPool` as the first argument.

pub mod onboarding_repo;
pub mod user_repo;

pub use onboarding_repo::OnboardingRepo;
pub use user_repo::UserRepo;
