//! Endpoint descriptor models
//!
//! Defines API endpoint descriptors, their categories and path templates.

use chrono::{Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{ProbeError, Result};

/// Endpoint category
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Predictions,
    Odds,
    Fixtures,
    Bookmakers,
    Teams,
}

impl Category {
    /// Get category display name
    pub fn name(&self) -> &'static str {
        match self {
            Category::Predictions => "Predictions",
            Category::Odds => "Odds",
            Category::Fixtures => "Fixtures",
            Category::Bookmakers => "Bookmakers",
            Category::Teams => "Teams",
        }
    }

    /// Get all categories
    pub fn all() -> Vec<Category> {
        vec![
            Category::Predictions,
            Category::Odds,
            Category::Fixtures,
            Category::Bookmakers,
            Category::Teams,
        ]
    }

    /// Parse from string
    pub fn from_str(s: &str) -> Option<Category> {
        match s.to_lowercase().as_str() {
            "predictions" | "prediction" => Some(Category::Predictions),
            "odds" => Some(Category::Odds),
            "fixtures" | "fixture" | "live" => Some(Category::Fixtures),
            "bookmakers" | "bookmaker" => Some(Category::Bookmakers),
            "teams" | "team" => Some(Category::Teams),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Subscription tier an endpoint needs on the provider side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Basic,
    Premium,
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tier::Basic => write!(f, "basic"),
            Tier::Premium => write!(f, "premium"),
        }
    }
}

/// Values substituted into endpoint path templates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TemplateContext {
    pub today: NaiveDate,
    pub week_ahead: NaiveDate,
}

impl TemplateContext {
    pub fn for_date(today: NaiveDate) -> Self {
        let week_ahead = today.checked_add_days(Days::new(7)).unwrap_or(today);
        Self { today, week_ahead }
    }

    /// Context for the current UTC date
    pub fn today() -> Self {
        Self::for_date(Utc::now().date_naive())
    }

    fn lookup(&self, placeholder: &str) -> Option<String> {
        match placeholder {
            "today" => Some(self.today.format("%Y-%m-%d").to_string()),
            "week_ahead" => Some(self.week_ahead.format("%Y-%m-%d").to_string()),
            _ => None,
        }
    }
}

/// A single named API operation.
///
/// Descriptors are `'static` and never mutated; the catalog builds them in
/// const context.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EndpointDescriptor {
    pub name: &'static str,
    /// Path relative to the API base URL, with `{placeholder}` segments
    pub path: &'static str,
    pub category: Category,
    /// Static query parameters (`include`, `per_page`, ...)
    pub params: &'static [(&'static str, &'static str)],
    pub tier: Tier,
}

impl EndpointDescriptor {
    pub const fn new(name: &'static str, path: &'static str, category: Category) -> Self {
        Self {
            name,
            path,
            category,
            params: &[],
            tier: Tier::Basic,
        }
    }

    pub const fn with_params(self, params: &'static [(&'static str, &'static str)]) -> Self {
        Self { params, ..self }
    }

    pub const fn premium(self) -> Self {
        Self {
            tier: Tier::Premium,
            ..self
        }
    }

    /// Placeholder names the template requires, in order of appearance
    pub fn placeholders(&self) -> Vec<&'static str> {
        let mut found = Vec::new();
        let mut rest = self.path;
        while let Some(open) = rest.find('{') {
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    found.push(&after[..close]);
                    rest = &after[close + 1..];
                }
                None => break,
            }
        }
        found
    }

    /// Substitute placeholders from `context`
    pub fn render_path(&self, context: &TemplateContext) -> Result<String> {
        let mut path = self.path.to_string();
        for placeholder in self.placeholders() {
            let value =
                context
                    .lookup(placeholder)
                    .ok_or_else(|| ProbeError::UnknownPlaceholder {
                        template: self.path.to_string(),
                        placeholder: placeholder.to_string(),
                    })?;
            path = path.replace(&format!("{{{placeholder}}}"), &value);
        }
        Ok(path)
    }
}

impl fmt::Display for EndpointDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.name, self.category)
    }
}
