//! Interest selection for the preferences step.

use onboard_core::onboarding::MAX_INTERESTS;
use onboard_core::types::JsonObject;
use serde_json::{json, Value};

/// Skills offered on the preferences step, grouped by category.
pub const SKILL_CATALOG: &[(&str, &[&str])] = &[
    (
        "Business",
        &[
            "DaVinci Resolve",
            "Microsoft SharePoint",
            "IIBA Entry Certificate in Business Analysis",
            "Microsoft Project",
            "Operations Management",
            "Microsoft Access",
            "Management Skills",
            "Lean",
            "Sony Vegas",
            "Quality Checking",
            "Business Model Canvas",
            "Technical Writing",
            "HR Analytics",
            "Online Course Creation",
            "Microsoft PowerPoint",
        ],
    ),
    (
        "Design",
        &[
            "Cinematic Editing",
            "Wix",
            "Adobe Premiere Pro",
            "User Experience (UX) design",
            "Fashion",
            "Game Design",
            "Canva",
            "Character Design",
            "Sewing",
            "Building Information Modelling (BIM)",
            "Mobile App design",
            "Textiles",
            "Illustration",
            "Virtual Reality",
            "UI/UX",
        ],
    ),
];

/// Catalog skills whose name contains `term`, case-insensitively.
pub fn search_skills(term: &str) -> Vec<&'static str> {
    let needle = term.trim().to_lowercase();
    SKILL_CATALOG
        .iter()
        .flat_map(|(_, skills)| skills.iter().copied())
        .filter(|skill| needle.is_empty() || skill.to_lowercase().contains(&needle))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Added,
    Removed,
    /// Already at [`MAX_INTERESTS`]; nothing changed.
    LimitReached,
}

/// An ordered set of selected interests, at most [`MAX_INTERESTS`] long.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterestSelection {
    selected: Vec<String>,
}

impl InterestSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed from a stored preferences slot. Non-string entries are skipped
    /// and anything past the limit is dropped.
    pub fn from_preferences(preferences: &JsonObject) -> Self {
        let mut selection = Self::new();
        if let Some(Value::Array(items)) = preferences.get("interests") {
            for item in items.iter().filter_map(Value::as_str) {
                if !selection.contains(item) && selection.selected.len() < MAX_INTERESTS {
                    selection.selected.push(item.to_string());
                }
            }
        }
        selection
    }

    pub fn toggle(&mut self, interest: &str) -> Toggle {
        if let Some(pos) = self.selected.iter().position(|s| s == interest) {
            self.selected.remove(pos);
            return Toggle::Removed;
        }
        if self.selected.len() >= MAX_INTERESTS {
            return Toggle::LimitReached;
        }
        self.selected.push(interest.to_string());
        Toggle::Added
    }

    pub fn contains(&self, interest: &str) -> bool {
        self.selected.iter().any(|s| s == interest)
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    /// The autosave payload for the preferences step.
    pub fn to_patch(&self) -> Value {
        json!({ "interests": self.selected })
    }
}
