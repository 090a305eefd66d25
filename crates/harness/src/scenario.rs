//! Scenario suites and planning
//!
//! Scenarios are grouped hierarchically: suite, nested suites, tests. Every
//! level may carry a `before_each` hook list; a test's effective action list
//! is the concatenation of all ancestor hooks, outermost first, followed by
//! its own steps. The outermost hook typically resets and reseeds the
//! backend, so every test starts from a known state and anything a nested
//! hook builds up (a logged-in session, an existing note) lives only within
//! that one test's chain.

use std::path::Path;

use serde::{Deserialize, Serialize};
use walkdir::WalkDir;

use crate::error::{HarnessError, HarnessResult};
use crate::step::Action;

/// One end-to-end test case.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub steps: Vec<Action>,
}

impl Scenario {
    pub fn new(name: impl Into<String>, steps: Vec<Action>) -> Self {
        Self {
            name: name.into(),
            tags: Vec::new(),
            steps,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }
}

/// A suite of scenarios, possibly nested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suite {
    pub name: String,

    /// Actions run before every test in this suite, including tests of
    /// nested suites.
    #[serde(default)]
    pub before_each: Vec<Action>,

    #[serde(default)]
    pub tests: Vec<Scenario>,

    #[serde(default)]
    pub suites: Vec<Suite>,
}

impl Suite {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            before_each: Vec::new(),
            tests: Vec::new(),
            suites: Vec::new(),
        }
    }

    pub fn with_before_each(mut self, actions: Vec<Action>) -> Self {
        self.before_each = actions;
        self
    }

    pub fn with_test(mut self, test: Scenario) -> Self {
        self.tests.push(test);
        self
    }

    pub fn with_suite(mut self, suite: Suite) -> Self {
        self.suites.push(suite);
        self
    }

    /// Parse a suite from YAML.
    pub fn from_yaml(yaml: &str) -> HarnessResult<Self> {
        serde_yaml::from_str(yaml).map_err(HarnessError::from)
    }

    /// Parse a suite from a YAML file.
    pub fn from_file(path: &Path) -> HarnessResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content).map_err(|e| {
            HarnessError::SpecParse(format!("{}: {e}", path.display()))
        })
    }

    /// Load every suite file under a directory, in path order.
    pub fn load_all(dir: &Path) -> HarnessResult<Vec<Self>> {
        let mut suites = Vec::new();

        for entry in WalkDir::new(dir)
            .sort_by_file_name()
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| {
                e.path()
                    .extension()
                    .map(|ext| ext == "yaml" || ext == "yml")
                    .unwrap_or(false)
            })
        {
            suites.push(Self::from_file(entry.path())?);
        }

        Ok(suites)
    }

    /// Flatten the tree into runnable scenario plans.
    pub fn plan(&self) -> HarnessResult<Vec<PlannedScenario>> {
        let mut plans = Vec::new();
        self.collect("", &[], &mut plans)?;
        Ok(plans)
    }

    fn collect(
        &self,
        prefix: &str,
        inherited: &[Action],
        out: &mut Vec<PlannedScenario>,
    ) -> HarnessResult<()> {
        let path = if prefix.is_empty() {
            self.name.clone()
        } else {
            format!("{prefix} :: {}", self.name)
        };

        let mut hooks = inherited.to_vec();
        hooks.extend(self.before_each.iter().cloned());

        for test in &self.tests {
            let full_name = format!("{path} :: {}", test.name);
            let mut actions = hooks.clone();
            actions.extend(test.steps.iter().cloned());
            out.push(PlannedScenario::from_actions(
                full_name,
                test.tags.clone(),
                actions,
            )?);
        }

        for suite in &self.suites {
            suite.collect(&path, &hooks, out)?;
        }

        Ok(())
    }
}

/// A flattened, runnable scenario: setup calls, then page steps.
#[derive(Debug, Clone, PartialEq)]
pub struct PlannedScenario {
    /// Suite path joined with the test name.
    pub full_name: String,
    pub tags: Vec<String>,
    /// Backend fixture calls, executed before the browser starts.
    pub backend_ops: Vec<Action>,
    /// Page steps compiled into one script run.
    pub page_steps: Vec<Action>,
}

impl PlannedScenario {
    /// Split a flattened action list into backend and page phases.
    ///
    /// Backend calls must all precede the first page step: the browser runs
    /// as one script per scenario, so a backend mutation in the middle of
    /// page steps could not be ordered against them.
    fn from_actions(
        full_name: String,
        tags: Vec<String>,
        actions: Vec<Action>,
    ) -> HarnessResult<Self> {
        let mut backend_ops = Vec::new();
        let mut page_steps = Vec::new();

        for action in actions {
            if action.is_backend() {
                if !page_steps.is_empty() {
                    return Err(HarnessError::InvalidScenario {
                        name: full_name,
                        reason: format!(
                            "backend action '{}' follows a page step",
                            action.name()
                        ),
                    });
                }
                backend_ops.push(action);
            } else {
                page_steps.push(action);
            }
        }

        Ok(Self {
            full_name,
            tags,
            backend_ops,
            page_steps,
        })
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t == tag)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locator::Locator;
    use notewright_common::TestUser;

    fn reset() -> Action {
        Action::Reset
    }

    fn seed() -> Action {
        Action::CreateUser {
            user: TestUser::default(),
        }
    }

    fn goto() -> Action {
        Action::Goto {
            path: "/".to_string(),
        }
    }

    fn click(name: &str) -> Action {
        Action::Click {
            locator: Locator::role("button").named(name),
            sync: None,
            timeout_ms: None,
        }
    }

    #[test]
    fn hooks_run_outermost_first() {
        let suite = Suite::new("Note app")
            .with_before_each(vec![reset(), seed(), goto()])
            .with_suite(
                Suite::new("when logged in")
                    .with_before_each(vec![click("login")])
                    .with_test(Scenario::new("creates a note", vec![click("save")])),
            );

        let plans = suite.plan().unwrap();
        assert_eq!(plans.len(), 1);

        let plan = &plans[0];
        assert_eq!(
            plan.full_name,
            "Note app :: when logged in :: creates a note"
        );
        assert_eq!(plan.backend_ops, vec![reset(), seed()]);
        assert_eq!(plan.page_steps, vec![goto(), click("login"), click("save")]);
    }

    #[test]
    fn outer_hooks_apply_to_every_nested_test() {
        let suite = Suite::new("outer")
            .with_before_each(vec![reset(), goto()])
            .with_test(Scenario::new("direct", vec![]))
            .with_suite(
                Suite::new("inner")
                    .with_suite(Suite::new("deepest").with_test(Scenario::new("nested", vec![]))),
            );

        let plans = suite.plan().unwrap();
        assert_eq!(plans.len(), 2);
        for plan in &plans {
            assert_eq!(plan.backend_ops, vec![reset()]);
            assert_eq!(plan.page_steps, vec![goto()]);
        }
        assert_eq!(plans[1].full_name, "outer :: inner :: deepest :: nested");
    }

    #[test]
    fn backend_action_after_page_step_is_rejected() {
        let suite = Suite::new("bad").with_test(Scenario::new(
            "reset mid-flight",
            vec![goto(), reset()],
        ));

        let err = suite.plan().unwrap_err();
        match err {
            HarnessError::InvalidScenario { name, reason } => {
                assert_eq!(name, "bad :: reset mid-flight");
                assert!(reason.contains("reset"));
            }
            other => panic!("expected invalid scenario, got {other:?}"),
        }
    }

    #[test]
    fn tags_filter_plans() {
        let suite = Suite::new("s")
            .with_test(Scenario::new("a", vec![]).with_tag("smoke"))
            .with_test(Scenario::new("b", vec![]));

        let plans = suite.plan().unwrap();
        assert!(plans[0].has_tag("smoke"));
        assert!(!plans[1].has_tag("smoke"));
    }

    #[test]
    fn suite_parses_from_yaml() {
        let yaml = r#"
name: Note app
before_each:
  - action: reset
  - action: create_user
    user:
      name: Matti Luukkainen
      username: mluukkai
      password: salainen
  - action: goto
tests:
  - name: front page can be opened
    tags: [smoke]
    steps:
      - action: expect_visible
        locator:
          by: text
          text: Notes
suites:
  - name: when logged in
    before_each:
      - action: click
        locator:
          by: role
          role: button
          name: login
    tests:
      - name: a new note can be created
        steps: []
"#;
        let suite = Suite::from_yaml(yaml).unwrap();
        let plans = suite.plan().unwrap();
        assert_eq!(plans.len(), 2);
        assert_eq!(plans[0].backend_ops.len(), 2);
        assert_eq!(
            plans[1].full_name,
            "Note app :: when logged in :: a new note can be created"
        );
    }
}
