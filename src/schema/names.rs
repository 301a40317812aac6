//! Identifier rules for schema and field names

use regex::Regex;

/// Checks and repairs schema/field identifiers
#[derive(Debug, Clone)]
pub struct Identifiers {
    valid: Regex,
    invalid_run: Regex,
}

impl Default for Identifiers {
    fn default() -> Self {
        Self::new()
    }
}

impl Identifiers {
    pub fn new() -> Self {
        Self {
            valid: Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("identifier pattern"),
            invalid_run: Regex::new(r"[^A-Za-z0-9_]+").expect("invalid run pattern"),
        }
    }

    pub fn is_valid(&self, name: &str) -> bool {
        self.valid.is_match(name)
    }

    /// Turn arbitrary text (a title, a file stem) into a valid identifier.
    ///
    /// Runs of invalid characters become `_`, a leading digit gets a `_`
    /// prefix, and text with nothing usable becomes `Schema`.
    pub fn sanitize(&self, raw: &str) -> String {
        if self.is_valid(raw) {
            return raw.to_string();
        }
        let replaced = self.invalid_run.replace_all(raw, "_");
        let trimmed = replaced.trim_matches('_');
        if trimmed.is_empty() {
            return "Schema".to_string();
        }
        if trimmed.starts_with(|c: char| c.is_ascii_digit()) {
            format!("_{}", trimmed)
        } else {
            trimmed.to_string()
        }
    }
}
