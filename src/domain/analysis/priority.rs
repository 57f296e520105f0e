//! Priority value object.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Priority of a suggested change or action plan item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

impl Priority {
    /// Coerces an untrusted label into a priority.
    ///
    /// Anything other than exactly `High`, `Medium` or `Low` (surrounding
    /// whitespace ignored) becomes `Medium`.
    pub fn coerce(raw: Option<&str>) -> Self {
        match raw.map(str::trim) {
            Some("High") => Priority::High,
            Some("Low") => Priority::Low,
            _ => Priority::Medium,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::High => "High",
            Priority::Medium => "Medium",
            Priority::Low => "Low",
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_accepts_known_labels() {
        assert_eq!(Priority::coerce(Some("High")), Priority::High);
        assert_eq!(Priority::coerce(Some(" Low ")), Priority::Low);
        assert_eq!(Priority::coerce(Some("Medium")), Priority::Medium);
    }

    #[test]
    fn coerce_maps_unknown_and_missing_to_medium() {
        assert_eq!(Priority::coerce(Some("Critical")), Priority::Medium);
        assert_eq!(Priority::coerce(Some("high")), Priority::Medium);
        assert_eq!(Priority::coerce(Some("")), Priority::Medium);
        assert_eq!(Priority::coerce(None), Priority::Medium);
    }

    #[test]
    fn serializes_as_capitalized_label() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"High\"");
    }
}
