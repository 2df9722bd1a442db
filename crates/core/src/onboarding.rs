//! Onboarding record model, step slots and merge rules.
//!
//! A step name submitted by the client is resolved to a [`StepSlot`]. The
//! three modelled steps and the `responses` map each own a column of the
//! record; every other name is an [`StepSlot::Extra`] entry inside
//! `responses`, so no step can ever overwrite `user`, `isCompleted` or any
//! other protected field.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::types::{DbId, JsonObject, Timestamp};

// ---------------------------------------------------------------------------
// Step names
// ---------------------------------------------------------------------------

/// Step 1: personal details (name, username, role, location, ...).
pub const STEP_PERSONAL_INFO: &str = "personalInfo";
/// Step 2: professional details (job title, company, experience, ...).
pub const STEP_PROFESSIONAL_INFO: &str = "professionalInfo";
/// Step 3: theme, notification toggle and selected interests.
pub const STEP_PREFERENCES: &str = "preferences";
/// The catch-all map itself.
pub const STEP_RESPONSES: &str = "responses";

/// Default value of the advisory `currentStep` marker.
pub const DEFAULT_CURRENT_STEP: i32 = 1;

/// Default theme seeded into a fresh preferences slot.
pub const DEFAULT_THEME: &str = "light";

/// Maximum number of interests the client lets a user pick.
///
/// Not enforced server-side.
pub const MAX_INTERESTS: usize = 5;

/// Confirmation message returned by a successful finalize.
pub const FINALIZE_MESSAGE: &str = "Onboarding completed successfully";

/// Seed value of the preferences slot.
pub fn default_preferences() -> JsonObject {
    let mut prefs = JsonObject::new();
    prefs.insert("theme".into(), json!(DEFAULT_THEME));
    prefs.insert("notifications".into(), json!(true));
    prefs.insert("interests".into(), json!([]));
    prefs
}

// ---------------------------------------------------------------------------
// Step slots
// ---------------------------------------------------------------------------

/// Where a step's payload is stored inside an [`OnboardingRecord`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepSlot {
    PersonalInfo,
    ProfessionalInfo,
    Preferences,
    /// Merge directly into the top-level `responses` map.
    Responses,
    /// Any other step, stored at `responses[name]`.
    Extra(String),
}

impl StepSlot {
    /// Resolve a client-supplied step name. Never fails: unknown names
    /// become [`StepSlot::Extra`].
    pub fn parse(step: &str) -> Self {
        match step {
            STEP_PERSONAL_INFO => Self::PersonalInfo,
            STEP_PROFESSIONAL_INFO => Self::ProfessionalInfo,
            STEP_PREFERENCES => Self::Preferences,
            STEP_RESPONSES => Self::Responses,
            other => Self::Extra(other.to_string()),
        }
    }

    /// The step name as the client knows it.
    pub fn as_str(&self) -> &str {
        match self {
            Self::PersonalInfo => STEP_PERSONAL_INFO,
            Self::ProfessionalInfo => STEP_PROFESSIONAL_INFO,
            Self::Preferences => STEP_PREFERENCES,
            Self::Responses => STEP_RESPONSES,
            Self::Extra(name) => name,
        }
    }

    /// Whether the slot is one of the object-typed record fields.
    pub fn is_object_slot(&self) -> bool {
        !matches!(self, Self::Extra(_))
    }

    /// Value the slot holds on a freshly created record.
    fn default_value(&self) -> Option<Value> {
        match self {
            Self::Preferences => Some(Value::Object(default_preferences())),
            Self::Extra(_) => None,
            _ => Some(Value::Object(JsonObject::new())),
        }
    }

    /// Value the slot takes when the record is created by this write.
    pub fn initial_value(&self, data: &Value) -> Value {
        merge_value(self.default_value().as_ref(), data)
    }
}

impl std::fmt::Display for StepSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shallow merge `existing ⊕ incoming`.
///
/// When both sides are objects the result keeps every existing key and lets
/// incoming keys win. In every other case `incoming` replaces `existing`.
pub fn merge_value(existing: Option<&Value>, incoming: &Value) -> Value {
    match (existing, incoming) {
        (Some(Value::Object(current)), Value::Object(patch)) => {
            let mut merged = current.clone();
            merge_object(&mut merged, patch);
            Value::Object(merged)
        }
        _ => incoming.clone(),
    }
}

/// In-place shallow merge of `patch` into `target`.
pub fn merge_object(target: &mut JsonObject, patch: &JsonObject) {
    for (key, value) in patch {
        target.insert(key.clone(), value.clone());
    }
}

// ---------------------------------------------------------------------------
// Step writes
// ---------------------------------------------------------------------------

/// One autosave request, resolved and normalized.
#[derive(Debug, Clone, PartialEq)]
pub struct StepWrite {
    pub slot: StepSlot,
    /// Payload to merge. Always an object for object-typed slots.
    pub data: Value,
    /// Advisory progress marker to store alongside, if the client sent one.
    pub current_step: Option<i32>,
}

impl StepWrite {
    /// Build a write from raw request parts.
    ///
    /// Object-typed slots only accept object payloads; anything else is
    /// treated as an empty patch so the slot keeps its current contents.
    pub fn new(step: &str, data: Value, current_step: Option<i32>) -> Self {
        let slot = StepSlot::parse(step);
        let data = if slot.is_object_slot() && !data.is_object() {
            if !data.is_null() {
                tracing::warn!(step = %slot, "Ignoring non-object payload for object step");
            }
            Value::Object(JsonObject::new())
        } else {
            data
        };
        Self {
            slot,
            data,
            current_step,
        }
    }

    /// The payload as an object. Empty for non-object payloads.
    pub fn data_object(&self) -> JsonObject {
        match &self.data {
            Value::Object(map) => map.clone(),
            _ => JsonObject::new(),
        }
    }
}

// ---------------------------------------------------------------------------
// Post-completion policy
// ---------------------------------------------------------------------------

/// Whether a completed record still accepts step writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EditPolicy {
    /// Completed records keep accepting autosaves.
    #[default]
    AllowAfterCompletion,
    /// Autosaves on a completed record are rejected.
    LockOnCompletion,
}

impl EditPolicy {
    pub fn from_allow_flag(allow: bool) -> Self {
        if allow {
            Self::AllowAfterCompletion
        } else {
            Self::LockOnCompletion
        }
    }

    pub fn allows_edits_after_completion(self) -> bool {
        self == Self::AllowAfterCompletion
    }
}

// ---------------------------------------------------------------------------
// Record
// ---------------------------------------------------------------------------

/// The single per-user onboarding document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRecord {
    pub id: DbId,
    /// Owning user id. Unique across records.
    pub user: DbId,
    pub current_step: i32,
    pub personal_info: JsonObject,
    pub professional_info: JsonObject,
    pub preferences: JsonObject,
    pub responses: JsonObject,
    pub is_completed: bool,
    pub last_autosaved_at: Timestamp,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl OnboardingRecord {
    /// A record with every field at its default.
    pub fn empty(id: DbId, user: DbId, now: Timestamp) -> Self {
        Self {
            id,
            user,
            current_step: DEFAULT_CURRENT_STEP,
            personal_info: JsonObject::new(),
            professional_info: JsonObject::new(),
            preferences: default_preferences(),
            responses: JsonObject::new(),
            is_completed: false,
            last_autosaved_at: now,
            created_at: now,
            updated_at: now,
        }
    }

    /// The record created lazily by a user's first autosave.
    pub fn from_first_write(id: DbId, user: DbId, write: &StepWrite, now: Timestamp) -> Self {
        let mut record = Self::empty(id, user, now);
        record.apply(write, now);
        record
    }

    /// Merge `write` into its slot and stamp the autosave time.
    pub fn apply(&mut self, write: &StepWrite, now: Timestamp) {
        match &write.slot {
            StepSlot::PersonalInfo => merge_object(&mut self.personal_info, &write.data_object()),
            StepSlot::ProfessionalInfo => {
                merge_object(&mut self.professional_info, &write.data_object())
            }
            StepSlot::Preferences => merge_object(&mut self.preferences, &write.data_object()),
            StepSlot::Responses => merge_object(&mut self.responses, &write.data_object()),
            StepSlot::Extra(name) => {
                let merged = merge_value(self.responses.get(name), &write.data);
                self.responses.insert(name.clone(), merged);
            }
        }
        if let Some(step) = write.current_step {
            self.current_step = step;
        }
        self.touch(now);
    }

    /// Mark onboarding complete. Returns `false` if it already was.
    pub fn complete(&mut self, now: Timestamp) -> bool {
        let changed = !self.is_completed;
        self.is_completed = true;
        self.touch(now);
        changed
    }

    /// Stored value of a slot, if any.
    pub fn slot_value(&self, slot: &StepSlot) -> Option<Value> {
        match slot {
            StepSlot::PersonalInfo => Some(Value::Object(self.personal_info.clone())),
            StepSlot::ProfessionalInfo => Some(Value::Object(self.professional_info.clone())),
            StepSlot::Preferences => Some(Value::Object(self.preferences.clone())),
            StepSlot::Responses => Some(Value::Object(self.responses.clone())),
            StepSlot::Extra(name) => self.responses.get(name).cloned(),
        }
    }

    fn touch(&mut self, now: Timestamp) {
        self.last_autosaved_at = now;
        self.updated_at = now;
    }
}

/// Body returned by a successful finalize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinalizeConfirmation {
    pub message: String,
}

impl Default for FinalizeConfirmation {
    fn default() -> Self {
        Self {
            message: FINALIZE_MESSAGE.to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn obj(value: Value) -> JsonObject {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn test_known_step_names_resolve_to_fixed_slots() {
        assert_eq!(StepSlot::parse("personalInfo"), StepSlot::PersonalInfo);
        assert_eq!(StepSlot::parse("professionalInfo"), StepSlot::ProfessionalInfo);
        assert_eq!(StepSlot::parse("preferences"), StepSlot::Preferences);
        assert_eq!(StepSlot::parse("responses"), StepSlot::Responses);
    }

    #[test]
    fn test_reserved_field_names_become_extra_responses() {
        for name in ["isCompleted", "user", "currentStep", "lastAutosavedAt", "id"] {
            assert_eq!(StepSlot::parse(name), StepSlot::Extra(name.to_string()));
        }
    }

    #[test]
    fn test_merge_keeps_existing_keys_and_lets_incoming_win() {
        let existing = json!({"fullName": "Ann Lee", "role": "dev"});
        let merged = merge_value(Some(&existing), &json!({"role": "lead", "location": "Oslo"}));
        assert_eq!(
            merged,
            json!({"fullName": "Ann Lee", "role": "lead", "location": "Oslo"})
        );
    }

    #[test]
    fn test_merge_is_shallow() {
        let existing = json!({"address": {"city": "Oslo", "zip": "0150"}});
        let merged = merge_value(Some(&existing), &json!({"address": {"city": "Bergen"}}));
        assert_eq!(merged, json!({"address": {"city": "Bergen"}}));
    }

    #[test]
    fn test_non_object_incoming_replaces() {
        let merged = merge_value(Some(&json!({"a": 1})), &json!("done"));
        assert_eq!(merged, json!("done"));
        assert_eq!(merge_value(None, &json!([1, 2])), json!([1, 2]));
    }

    #[test]
    fn test_non_object_payload_for_fixed_slot_is_an_empty_patch() {
        let write = StepWrite::new("personalInfo", json!(["not", "an", "object"]), None);
        assert_eq!(write.data, json!({}));

        let write = StepWrite::new("profileSetup", json!("employed"), None);
        assert_eq!(write.data, json!("employed"));
    }

    #[test]
    fn test_first_preferences_write_keeps_schema_defaults() {
        let now = Utc::now();
        let write = StepWrite::new("preferences", json!({"interests": ["UI/UX"]}), None);
        let record = OnboardingRecord::from_first_write(1, 7, &write, now);

        assert_eq!(record.preferences["interests"], json!(["UI/UX"]));
        assert_eq!(record.preferences["theme"], json!("light"));
        assert_eq!(record.preferences["notifications"], json!(true));
        assert!(!record.is_completed);
        assert_eq!(record.current_step, 1);
        assert!(record.personal_info.is_empty());
    }

    #[test]
    fn test_initial_value_matches_first_write_contents() {
        let data = json!({"interests": ["Lean"]});
        let initial = StepSlot::Preferences.initial_value(&data);
        let record = OnboardingRecord::from_first_write(
            1,
            1,
            &StepWrite::new("preferences", data, None),
            Utc::now(),
        );
        assert_eq!(Value::Object(record.preferences), initial);
    }

    #[test]
    fn test_successive_writes_merge_into_the_same_slot() {
        let now = Utc::now();
        let mut record = OnboardingRecord::from_first_write(
            1,
            1,
            &StepWrite::new("personalInfo", json!({"fullName": "Ann Lee"}), None),
            now,
        );
        record.apply(
            &StepWrite::new("personalInfo", json!({"username": "annlee"}), None),
            now,
        );
        assert_eq!(
            record.personal_info,
            obj(json!({"fullName": "Ann Lee", "username": "annlee"}))
        );
    }

    #[test]
    fn test_extra_step_does_not_touch_protected_fields() {
        let now = Utc::now();
        let mut record = OnboardingRecord::empty(1, 1, now);
        record.apply(&StepWrite::new("isCompleted", json!(true), None), now);

        assert!(!record.is_completed);
        assert_eq!(record.responses["isCompleted"], json!(true));
    }

    #[test]
    fn test_extra_object_steps_merge_inside_responses() {
        let now = Utc::now();
        let mut record = OnboardingRecord::empty(1, 1, now);
        record.apply(
            &StepWrite::new("profileSetup", json!({"jobStatus": "employed"}), None),
            now,
        );
        record.apply(
            &StepWrite::new("profileSetup", json!({"photo": "me.png"}), None),
            now,
        );
        assert_eq!(
            record.responses["profileSetup"],
            json!({"jobStatus": "employed", "photo": "me.png"})
        );
    }

    #[test]
    fn test_current_step_is_stored_only_when_sent() {
        let now = Utc::now();
        let mut record = OnboardingRecord::empty(1, 1, now);
        record.apply(&StepWrite::new("preferences", json!({}), Some(3)), now);
        assert_eq!(record.current_step, 3);
        record.apply(&StepWrite::new("preferences", json!({}), None), now);
        assert_eq!(record.current_step, 3);
    }

    #[test]
    fn test_complete_is_idempotent() {
        let now = Utc::now();
        let mut record = OnboardingRecord::empty(1, 1, now);
        assert!(record.complete(now));
        assert!(!record.complete(now));
        assert!(record.is_completed);
    }

    #[test]
    fn test_record_serializes_with_camel_case_fields() {
        let record = OnboardingRecord::empty(3, 9, Utc::now());
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["user"], 9);
        assert_eq!(json["currentStep"], 1);
        assert_eq!(json["isCompleted"], false);
        assert!(json["lastAutosavedAt"].is_string());
        assert!(json["personalInfo"].is_object());
    }

    #[test]
    fn test_edit_policy_from_flag() {
        assert_eq!(EditPolicy::from_allow_flag(true), EditPolicy::AllowAfterCompletion);
        assert_eq!(EditPolicy::from_allow_flag(false), EditPolicy::LockOnCompletion);
        assert!(EditPolicy::default().allows_edits_after_completion());
    }
}
