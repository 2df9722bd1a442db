/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// A JSON object, used for every free-form onboarding slot.
pub type JsonObject = serde_json::Map<String, serde_json::Value>;
