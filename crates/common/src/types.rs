//! Core types for notewright

use serde::{Deserialize, Serialize};
use std::fmt;

/// A user seeded into the backend before a scenario runs.
///
/// The backend owns the record; the harness only ever creates it through the
/// user-creation endpoint and logs in with it through the UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestUser {
    /// Display name, shown by the frontend after login.
    pub name: String,
    /// Login username.
    pub username: String,
    /// Login password (plaintext, test-only).
    pub password: String,
}

impl TestUser {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
        }
    }

    /// The text the frontend renders once this user is logged in.
    pub fn logged_in_text(&self) -> String {
        format!("{} logged in", self.name)
    }
}

impl Default for TestUser {
    fn default() -> Self {
        Self::new("Matti Luukkainen", "mluukkai", "salainen")
    }
}

/// A note as the backend stores it.
///
/// Scenarios create notes through the UI and identify them positionally (by
/// rendered order) or by visible text, never by id. The struct exists for the
/// fixture layer and the stub backend used in tests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub content: String,
    #[serde(default)]
    pub important: bool,
}

impl Note {
    pub fn new(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            important: false,
        }
    }

    /// Label the per-note toggle button currently shows.
    pub fn toggle_label(&self) -> ImportanceLabel {
        if self.important {
            ImportanceLabel::MakeNotImportant
        } else {
            ImportanceLabel::MakeImportant
        }
    }
}

/// Label of a note's importance toggle button.
///
/// The label names the *target* state: a not-important note shows
/// "make important", an important one shows "make not important".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportanceLabel {
    MakeImportant,
    MakeNotImportant,
}

impl ImportanceLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImportanceLabel::MakeImportant => "make important",
            ImportanceLabel::MakeNotImportant => "make not important",
        }
    }

    /// The complementary label a single toggle click produces.
    pub fn flipped(&self) -> Self {
        match self {
            ImportanceLabel::MakeImportant => ImportanceLabel::MakeNotImportant,
            ImportanceLabel::MakeNotImportant => ImportanceLabel::MakeImportant,
        }
    }

    /// Parse a rendered button label.
    pub fn parse(text: &str) -> Option<Self> {
        match text.trim() {
            "make important" => Some(ImportanceLabel::MakeImportant),
            "make not important" => Some(ImportanceLabel::MakeNotImportant),
            _ => None,
        }
    }
}

impl fmt::Display for ImportanceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Stage of a scenario a failure is attributed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Setup,
    Navigation,
    Interaction,
    Assertion,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Setup => "setup",
            Stage::Navigation => "navigation",
            Stage::Interaction => "interaction",
            Stage::Assertion => "assertion",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_label_names_target_state() {
        assert_eq!(Note::new("x").toggle_label(), ImportanceLabel::MakeImportant);
        let important = Note {
            content: "x".to_string(),
            important: true,
        };
        assert_eq!(important.toggle_label(), ImportanceLabel::MakeNotImportant);
    }

    #[test]
    fn flip_is_involutive() {
        for label in [
            ImportanceLabel::MakeImportant,
            ImportanceLabel::MakeNotImportant,
        ] {
            assert_eq!(label.flipped().flipped(), label);
        }
    }

    #[test]
    fn label_round_trips_through_text() {
        let label = ImportanceLabel::MakeImportant;
        assert_eq!(ImportanceLabel::parse(label.as_str()), Some(label));
        assert_eq!(ImportanceLabel::parse("delete"), None);
    }

    #[test]
    fn default_user_is_the_seeded_one() {
        let user = TestUser::default();
        assert_eq!(user.username, "mluukkai");
        assert_eq!(user.logged_in_text(), "Matti Luukkainen logged in");
    }

    #[test]
    fn user_serializes_with_plain_field_names() {
        let json = serde_json::to_value(TestUser::default()).unwrap();
        assert_eq!(json["name"], "Matti Luukkainen");
        assert_eq!(json["username"], "mluukkai");
        assert_eq!(json["password"], "salainen");
    }
}
