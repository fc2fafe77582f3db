use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Priority level of a requirement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown priority: {}", other)),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requirement category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Category {
    Functional,
    #[serde(rename = "Non-functional")]
    NonFunctional,
    Technical,
    Business,
    Security,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Functional => "Functional",
            Category::NonFunctional => "Non-functional",
            Category::Technical => "Technical",
            Category::Business => "Business",
            Category::Security => "Security",
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| c.is_alphanumeric())
            .collect();

        match normalized.as_str() {
            "functional" => Ok(Self::Functional),
            "nonfunctional" => Ok(Self::NonFunctional),
            "technical" => Ok(Self::Technical),
            "business" => Ok(Self::Business),
            "security" => Ok(Self::Security),
            _ => Err(format!("unknown category: {}", s.trim())),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single user requirement statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    /// The requirement text
    #[serde(alias = "requirement")]
    pub statement: String,
    /// Priority, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Category, if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
}

impl Requirement {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            priority: None,
            category: None,
        }
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priority = Some(priority);
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Render as a numbered prompt line, e.g. `1. Support SSO [High] (Security)`
    pub fn prompt_line(&self, index: usize) -> String {
        let mut line = format!("{}. {}", index, self.statement);
        if let Some(priority) = self.priority {
            line.push_str(&format!(" [{}]", priority));
        }
        if let Some(category) = self.category {
            line.push_str(&format!(" ({})", category));
        }
        line
    }
}
