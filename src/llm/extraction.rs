use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::models::Requirement;

/// Loosely-typed requirement as the model writes it
#[derive(Debug, Deserialize)]
struct RawRequirement {
    #[serde(alias = "statement", alias = "text")]
    requirement: Option<String>,
    #[serde(default)]
    priority: Option<String>,
    #[serde(default)]
    category: Option<String>,
}

fn json_array_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"(?s)\[.*\]").expect("Invalid regex"))
}

/// Find the outermost `[...]` span in free text
pub fn extract_json_array(text: &str) -> Option<&str> {
    json_array_regex().find(text).map(|m| m.as_str())
}

/// Parse requirements out of model output, best-effort
///
/// Returns an empty list when no array is found or it does not parse.
/// Entries without a statement are skipped; unknown priority or category
/// values are left unset.
pub fn parse_requirements(text: &str) -> Vec<Requirement> {
    let Some(array) = extract_json_array(text) else {
        warn!("No JSON array found in extraction response");
        return Vec::new();
    };

    let raw: Vec<RawRequirement> = match serde_json::from_str(array) {
        Ok(raw) => raw,
        Err(e) => {
            warn!("Failed to parse extracted requirements: {}", e);
            return Vec::new();
        }
    };

    let requirements: Vec<Requirement> = raw
        .into_iter()
        .filter_map(|r| {
            let statement = r.requirement?.trim().to_string();
            if statement.is_empty() {
                return None;
            }
            Some(Requirement {
                statement,
                priority: r.priority.and_then(|p| p.parse().ok()),
                category: r.category.and_then(|c| c.parse().ok()),
            })
        })
        .collect();

    debug!("Parsed {} requirements", requirements.len());
    requirements
}
