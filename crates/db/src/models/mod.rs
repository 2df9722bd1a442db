//! Row structs decoded with `sqlx::FromRow`, converted into core types at
//! the repository boundary.

pub mod onboarding;
pub mod user;
