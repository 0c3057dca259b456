//! Case-insensitive, fully anchored wildcard patterns.
//!
//! `*` matches any run of zero or more characters. Every other character,
//! regex metacharacters included, matches itself.

use regex::{Regex, RegexBuilder};
use serde_json::Value;

/// Compiled wildcard pattern.
#[derive(Debug, Clone)]
pub struct Wildcard {
    regex: Regex,
}

impl Wildcard {
    /// Compiles `pattern`.
    ///
    /// Returns `None` only if the translated expression exceeds regex size
    /// limits.
    pub fn new(pattern: &str) -> Option<Self> {
        let body = pattern
            .split('*')
            .map(regex::escape)
            .collect::<Vec<_>>()
            .join(".*");
        let regex = RegexBuilder::new(&format!("^(?s:{body})$"))
            .case_insensitive(true)
            .build()
            .ok()?;
        Some(Self { regex })
    }

    /// Matches a plain string.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// Matches the string rendering of a field value.
    ///
    /// Strings, numbers and booleans are matched on their text form; missing,
    /// null and nested values never match.
    pub fn matches_value(&self, value: Option<&Value>) -> bool {
        match value {
            Some(Value::String(text)) => self.is_match(text),
            Some(Value::Number(number)) => self.is_match(&number.to_string()),
            Some(Value::Bool(flag)) => self.is_match(if *flag { "true" } else { "false" }),
            _ => false,
        }
    }
}
