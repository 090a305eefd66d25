//! Typed element locators
//!
//! The frontend under test is addressed the way the scenarios describe it:
//! by ARIA role and accessible name, by visible text, by test id for form
//! fields whose visible labels are ambiguous, or by CSS selector for the
//! note list items. A locator compiles to a Playwright locator expression.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Root selector of a locator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "by", rename_all = "snake_case")]
pub enum Selector {
    /// ARIA role, optionally narrowed by accessible name.
    Role {
        role: String,
        #[serde(default)]
        name: Option<String>,
    },
    /// Visible text content.
    Text { text: String },
    /// `data-testid` attribute.
    TestId { id: String },
    /// Raw CSS selector.
    Css { selector: String },
}

/// Positional narrowing of a multi-match locator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Nth {
    First,
    Last,
}

/// An element locator: root selector plus optional narrowing.
///
/// Locating an entity by its visible text is a weak identity model: two
/// notes with identical text are indistinguishable and `first()` picks the
/// earliest match. Acceptable for this fixed scenario set; use a stable
/// identifier attribute if generalizing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locator {
    #[serde(flatten)]
    pub selector: Selector,

    /// Keep only matches containing this text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_text: Option<String>,

    /// Keep only the first or last match.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nth: Option<Nth>,

    /// Resolve relative to a parent locator instead of the page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub within: Option<Box<Locator>>,
}

impl Locator {
    fn from_selector(selector: Selector) -> Self {
        Self {
            selector,
            has_text: None,
            nth: None,
            within: None,
        }
    }

    /// Locate by ARIA role, e.g. `role("button")`.
    pub fn role(role: impl Into<String>) -> Self {
        Self::from_selector(Selector::Role {
            role: role.into(),
            name: None,
        })
    }

    /// Narrow a role locator by accessible name.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        if let Selector::Role {
            name: ref mut slot, ..
        } = self.selector
        {
            *slot = Some(name.into());
        }
        self
    }

    /// Locate by visible text.
    pub fn text(text: impl Into<String>) -> Self {
        Self::from_selector(Selector::Text { text: text.into() })
    }

    /// Locate by `data-testid`.
    pub fn test_id(id: impl Into<String>) -> Self {
        Self::from_selector(Selector::TestId { id: id.into() })
    }

    /// Locate by CSS selector.
    pub fn css(selector: impl Into<String>) -> Self {
        Self::from_selector(Selector::Css {
            selector: selector.into(),
        })
    }

    /// Keep only matches containing the given text.
    pub fn having_text(mut self, text: impl Into<String>) -> Self {
        self.has_text = Some(text.into());
        self
    }

    /// Keep only the first match.
    pub fn first(mut self) -> Self {
        self.nth = Some(Nth::First);
        self
    }

    /// Keep only the last match.
    pub fn last(mut self) -> Self {
        self.nth = Some(Nth::Last);
        self
    }

    /// Resolve this locator inside a parent locator.
    pub fn inside(mut self, parent: Locator) -> Self {
        self.within = Some(Box::new(parent));
        self
    }

    /// Compile to a Playwright locator expression rooted at `page`.
    pub fn to_js(&self) -> String {
        let receiver = match &self.within {
            Some(parent) => parent.to_js(),
            None => "page".to_string(),
        };

        let mut expr = match &self.selector {
            Selector::Role { role, name } => match name {
                Some(name) => format!(
                    "{receiver}.getByRole('{}', {{ name: '{}' }})",
                    js_string(role),
                    js_string(name)
                ),
                None => format!("{receiver}.getByRole('{}')", js_string(role)),
            },
            Selector::Text { text } => {
                format!("{receiver}.getByText('{}')", js_string(text))
            }
            Selector::TestId { id } => {
                format!("{receiver}.getByTestId('{}')", js_string(id))
            }
            Selector::Css { selector } => match &self.has_text {
                Some(text) => format!(
                    "{receiver}.locator('{}', {{ hasText: '{}' }})",
                    js_string(selector),
                    js_string(text)
                ),
                None => format!("{receiver}.locator('{}')", js_string(selector)),
            },
        };

        // hasText on non-CSS roots becomes a filter
        if self.has_text.is_some() && !matches!(self.selector, Selector::Css { .. }) {
            expr.push_str(&format!(
                ".filter({{ hasText: '{}' }})",
                js_string(self.has_text.as_deref().unwrap_or_default())
            ));
        }

        match self.nth {
            Some(Nth::First) => expr.push_str(".first()"),
            Some(Nth::Last) => expr.push_str(".last()"),
            None => {}
        }

        expr
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(parent) = &self.within {
            write!(f, "{parent} > ")?;
        }
        match &self.selector {
            Selector::Role { role, name } => match name {
                Some(name) => write!(f, "role={role}[name=\"{name}\"]")?,
                None => write!(f, "role={role}")?,
            },
            Selector::Text { text } => write!(f, "text=\"{text}\"")?,
            Selector::TestId { id } => write!(f, "testid={id}")?,
            Selector::Css { selector } => write!(f, "css={selector}")?,
        }
        if let Some(text) = &self.has_text {
            write!(f, "[has-text=\"{text}\"]")?;
        }
        match self.nth {
            Some(Nth::First) => write!(f, ":first")?,
            Some(Nth::Last) => write!(f, ":last")?,
            None => {}
        }
        Ok(())
    }
}

/// Escape a Rust string into a single-quoted JS string literal body.
pub(crate) fn js_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('\'', "\\'")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_with_name_compiles_to_get_by_role() {
        let js = Locator::role("button").named("login").to_js();
        assert_eq!(js, "page.getByRole('button', { name: 'login' })");
    }

    #[test]
    fn css_with_text_and_nth_compiles_with_options() {
        let js = Locator::css("li.note")
            .having_text("another note by playwright")
            .first()
            .to_js();
        assert_eq!(
            js,
            "page.locator('li.note', { hasText: 'another note by playwright' }).first()"
        );
    }

    #[test]
    fn within_chains_off_the_parent() {
        let parent = Locator::css("li.note").having_text("x").first();
        let js = Locator::role("button").inside(parent).to_js();
        assert_eq!(
            js,
            "page.locator('li.note', { hasText: 'x' }).first().getByRole('button')"
        );
    }

    #[test]
    fn text_with_filter_on_non_css_root() {
        let js = Locator::role("listitem").having_text("note").to_js();
        assert_eq!(
            js,
            "page.getByRole('listitem').filter({ hasText: 'note' })"
        );
    }

    #[test]
    fn quotes_are_escaped() {
        let js = Locator::text("it's a note").to_js();
        assert_eq!(js, "page.getByText('it\\'s a note')");
    }

    #[test]
    fn display_is_human_readable() {
        let loc = Locator::role("button")
            .inside(Locator::css("li.note").having_text("x").first());
        assert_eq!(
            loc.to_string(),
            "css=li.note[has-text=\"x\"]:first > role=button"
        );
    }

    #[test]
    fn locator_round_trips_through_yaml() {
        let yaml = "by: role\nrole: button\nname: login\n";
        let loc: Locator = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(loc, Locator::role("button").named("login"));
    }
}
