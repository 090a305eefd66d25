//! Reusable scenario fragments for the note application
//!
//! One parameterized fragment per user-visible flow, composed by reference
//! into the built-in suite. The fragments encode the app's UI contract:
//! which controls exist, how they are located, and which observable signal
//! marks each mutation as complete.

use notewright_common::{ImportanceLabel, TestUser};

use crate::locator::Locator;
use crate::scenario::{Scenario, Suite};
use crate::step::{Action, SyncStrategy};

/// Footer credit line the landing page renders.
pub const FOOTER_TEXT: &str =
    "Note app, Department of Computer Science, University of Helsinki 2024";

/// Selector of a rendered note list item.
const NOTE_ITEM: &str = "li.note";

/// Wipe the backend and seed the given user.
pub fn reset_and_seed(user: &TestUser) -> Vec<Action> {
    vec![
        Action::Reset,
        Action::CreateUser { user: user.clone() },
    ]
}

/// Assertions that the landing page is showing.
pub fn expect_front_page() -> Vec<Action> {
    vec![
        Action::ExpectVisible {
            locator: Locator::text("Notes"),
            timeout_ms: None,
        },
        Action::ExpectVisible {
            locator: Locator::text(FOOTER_TEXT),
            timeout_ms: None,
        },
    ]
}

/// Open the login form and submit the user's credentials.
///
/// The credential fields are located by test id rather than visible text:
/// both are plain textboxes and labels alone would be ambiguous.
pub fn login(user: &TestUser) -> Vec<Action> {
    vec![
        Action::Click {
            locator: Locator::role("button").named("login"),
            sync: None,
            timeout_ms: None,
        },
        Action::Fill {
            locator: Locator::test_id("username"),
            value: user.username.clone(),
        },
        Action::Fill {
            locator: Locator::test_id("password"),
            value: user.password.clone(),
        },
        Action::Click {
            locator: Locator::role("button").named("login"),
            sync: None,
            timeout_ms: None,
        },
    ]
}

/// Assertion that the login succeeded for the user.
pub fn expect_logged_in(user: &TestUser) -> Action {
    Action::ExpectVisible {
        locator: Locator::text(user.logged_in_text()),
        timeout_ms: None,
    }
}

/// Create a note through the UI and verify it landed.
///
/// The save click synchronizes on the creation response, armed before the
/// click; if that wait expires the trailing list assertion still decides
/// the verdict, and the run report records that the fallback fired. The
/// post-condition is positional: the new note is the last rendered item and
/// its text equals the input exactly.
pub fn create_note(text: &str) -> Vec<Action> {
    vec![
        Action::Click {
            locator: Locator::role("button").named("Add Note"),
            sync: None,
            timeout_ms: None,
        },
        Action::Fill {
            locator: Locator::role("textbox"),
            value: text.to_string(),
        },
        Action::Click {
            locator: Locator::role("button").named("save"),
            sync: Some(SyncStrategy::NetworkResponse {
                url_contains: "/api/notes".to_string(),
                status: None,
                ui_fallback: true,
                timeout_ms: None,
            }),
            timeout_ms: None,
        },
        Action::ExpectText {
            locator: Locator::css(NOTE_ITEM).last(),
            text: text.to_string(),
            timeout_ms: None,
        },
    ]
}

/// The toggle button of the note whose text matches `text` (first match).
pub fn toggle_button(text: &str) -> Locator {
    Locator::role("button").inside(Locator::css(NOTE_ITEM).having_text(text).first())
}

/// Toggle a note's importance and verify the label flipped.
///
/// The click synchronizes strictly on the update response: the label is the
/// only UI evidence and asserting it before the server confirmed the write
/// is exactly the race this flow exists to avoid.
pub fn toggle_importance(text: &str) -> Vec<Action> {
    let button = toggle_button(text);
    vec![
        Action::CaptureText {
            locator: button.clone(),
            slot: "toggle_label".to_string(),
        },
        Action::Click {
            locator: button.clone(),
            sync: Some(SyncStrategy::NetworkResponse {
                url_contains: "/api/notes".to_string(),
                status: Some(200),
                ui_fallback: false,
                timeout_ms: None,
            }),
            timeout_ms: None,
        },
        Action::ExpectTextFlipped {
            locator: button,
            slot: "toggle_label".to_string(),
            pair: [
                ImportanceLabel::MakeImportant.as_str().to_string(),
                ImportanceLabel::MakeNotImportant.as_str().to_string(),
            ],
            timeout_ms: None,
        },
    ]
}

/// The built-in note-app suite.
///
/// Structure mirrors the flows a user takes through the app: anonymous
/// landing and login at the top level, note creation once logged in,
/// importance toggling once a note exists. The outer hook resets and
/// reseeds before every test, so each test is independent; nested hooks
/// only accumulate state within a single test's chain.
pub fn note_app_suite() -> Suite {
    note_app_suite_for(&TestUser::default())
}

/// The built-in suite parameterized by seeded user.
pub fn note_app_suite_for(user: &TestUser) -> Suite {
    let mut before_each = reset_and_seed(user);
    before_each.push(Action::Goto {
        path: "/".to_string(),
    });

    Suite::new("Note app")
        .with_before_each(before_each)
        .with_test(
            Scenario::new("front page can be opened", expect_front_page()).with_tag("smoke"),
        )
        .with_test(
            Scenario::new("login form can be opened", {
                let mut steps = login(user);
                steps.push(expect_logged_in(user));
                steps
            })
            .with_tag("auth"),
        )
        .with_suite(
            Suite::new("when logged in")
                .with_before_each(login(user))
                .with_test(
                    Scenario::new(
                        "a new note can be created",
                        create_note("a note created by playwright"),
                    )
                    .with_tag("notes"),
                )
                .with_suite(
                    Suite::new("and a note exists")
                        .with_before_each(create_note("another note by playwright"))
                        .with_test(
                            Scenario::new(
                                "importance can be changed",
                                toggle_importance("another note by playwright"),
                            )
                            .with_tag("notes"),
                        )
                        .with_test(
                            Scenario::new("importance toggle is involutive", {
                                // Two consecutive toggles land back on the
                                // original label; each capture/flip pair is
                                // self-contained, so the slot is reused.
                                let mut steps = toggle_importance("another note by playwright");
                                steps.extend(toggle_importance("another note by playwright"));
                                steps
                            })
                            .with_tag("notes"),
                        ),
                ),
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::step::Action;

    #[test]
    fn builtin_suite_plans_five_scenarios() {
        let plans = note_app_suite().plan().unwrap();
        let names: Vec<_> = plans.iter().map(|p| p.full_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Note app :: front page can be opened",
                "Note app :: login form can be opened",
                "Note app :: when logged in :: a new note can be created",
                "Note app :: when logged in :: and a note exists :: importance can be changed",
                "Note app :: when logged in :: and a note exists :: importance toggle is involutive",
            ]
        );
    }

    #[test]
    fn every_scenario_starts_from_a_reset_backend() {
        for plan in note_app_suite().plan().unwrap() {
            assert_eq!(plan.backend_ops[0], Action::Reset);
            assert!(matches!(plan.backend_ops[1], Action::CreateUser { .. }));
            assert_eq!(plan.backend_ops.len(), 2);
        }
    }

    #[test]
    fn toggle_scenario_chains_login_and_note_creation() {
        let plans = note_app_suite().plan().unwrap();
        let toggle = plans
            .iter()
            .find(|p| p.full_name.ends_with("importance can be changed"))
            .unwrap();

        // goto + login(4) + create_note(4) + toggle(3)
        assert_eq!(toggle.page_steps.len(), 12);
        assert!(matches!(toggle.page_steps[0], Action::Goto { .. }));
        assert!(matches!(
            toggle.page_steps.last().unwrap(),
            Action::ExpectTextFlipped { .. }
        ));
    }

    #[test]
    fn involution_scenario_toggles_twice() {
        let plans = note_app_suite().plan().unwrap();
        let plan = plans
            .iter()
            .find(|p| p.full_name.ends_with("importance toggle is involutive"))
            .unwrap();

        let captures = plan
            .page_steps
            .iter()
            .filter(|a| matches!(a, Action::CaptureText { .. }))
            .count();
        let flips = plan
            .page_steps
            .iter()
            .filter(|a| matches!(a, Action::ExpectTextFlipped { .. }))
            .count();
        assert_eq!(captures, 2);
        assert_eq!(flips, 2);
    }

    #[test]
    fn create_note_prefers_network_sync_with_ui_fallback() {
        let steps = create_note("a note created by playwright");
        match &steps[2] {
            Action::Click {
                sync:
                    Some(SyncStrategy::NetworkResponse {
                        url_contains,
                        ui_fallback,
                        status,
                        ..
                    }),
                ..
            } => {
                assert_eq!(url_contains, "/api/notes");
                assert!(*ui_fallback);
                assert!(status.is_none());
            }
            other => panic!("expected synchronized click, got {other:?}"),
        }
        match steps.last().unwrap() {
            Action::ExpectText { text, .. } => {
                assert_eq!(text, "a note created by playwright");
            }
            other => panic!("expected trailing list assertion, got {other:?}"),
        }
    }

    #[test]
    fn toggle_synchronizes_strictly_on_the_update_response() {
        let steps = toggle_importance("another note by playwright");
        match &steps[1] {
            Action::Click {
                sync:
                    Some(SyncStrategy::NetworkResponse {
                        ui_fallback,
                        status,
                        ..
                    }),
                ..
            } => {
                assert!(!*ui_fallback);
                assert_eq!(*status, Some(200));
            }
            other => panic!("expected synchronized click, got {other:?}"),
        }
    }

    #[test]
    fn login_locates_credentials_by_test_id() {
        let user = TestUser::default();
        let steps = login(&user);
        assert_eq!(
            steps[1],
            Action::Fill {
                locator: Locator::test_id("username"),
                value: "mluukkai".to_string(),
            }
        );
        assert_eq!(
            steps[2],
            Action::Fill {
                locator: Locator::test_id("password"),
                value: "salainen".to_string(),
            }
        );
    }
}
