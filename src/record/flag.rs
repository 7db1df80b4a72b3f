//! Tri-state flag values and their presentation classes.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Raw value of a checkbox-like field.
///
/// Records arrive with either real booleans or loosely typed strings
/// (`"Yes"`, `"no"`, `"NA"`, …). Absence is modelled by `Option::None`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Text(String),
}

impl From<bool> for FlagValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for FlagValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

/// CSS class driving checkbox-like visual state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PresentationClass {
    /// `"checked"`
    Checked,
    /// `""`
    Unchecked,
    /// `"unknown"`
    Unknown,
}

impl PresentationClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Checked => "checked",
            Self::Unchecked => "",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for PresentationClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Resolve a raw flag to its presentation class.
///
/// | raw                         | class       |
/// |-----------------------------|-------------|
/// | absent                      | `unknown`   |
/// | `true` / `"yes"` / `"true"` | `checked`   |
/// | `false` / `"no"` / `"false"`| `""`        |
/// | `"unknown"` / `"na"`        | `unknown`   |
/// | anything else               | `unknown`   |
///
/// String comparison ignores case and surrounding whitespace.
pub fn presentation_class(raw: Option<&FlagValue>) -> PresentationClass {
    match raw {
        None => PresentationClass::Unknown,
        Some(FlagValue::Bool(true)) => PresentationClass::Checked,
        Some(FlagValue::Bool(false)) => PresentationClass::Unchecked,
        Some(FlagValue::Text(text)) => {
            let text = text.trim();
            if text.eq_ignore_ascii_case("yes") || text.eq_ignore_ascii_case("true") {
                PresentationClass::Checked
            } else if text.eq_ignore_ascii_case("no") || text.eq_ignore_ascii_case("false") {
                PresentationClass::Unchecked
            } else {
                // "unknown", "na" and every unrecognised string
                PresentationClass::Unknown
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn class_of(raw: Option<FlagValue>) -> &'static str {
        presentation_class(raw.as_ref()).as_str()
    }

    #[test]
    fn test_null_is_unknown() {
        assert_eq!(class_of(None), "unknown");
    }

    #[test]
    fn test_booleans() {
        assert_eq!(class_of(Some(true.into())), "checked");
        assert_eq!(class_of(Some(false.into())), "");
    }

    #[test]
    fn test_strings_case_insensitive() {
        for s in ["yes", "Yes", "YES", "true", "True", " yes "] {
            assert_eq!(class_of(Some(s.into())), "checked", "{s:?}");
        }
        for s in ["no", "No", "false", "FALSE"] {
            assert_eq!(class_of(Some(s.into())), "", "{s:?}");
        }
        for s in ["unknown", "Unknown", "na", "NA"] {
            assert_eq!(class_of(Some(s.into())), "unknown", "{s:?}");
        }
    }

    #[test]
    fn test_other_strings_are_unknown() {
        for s in ["", "maybe", "1", "checked", "y"] {
            assert_eq!(class_of(Some(s.into())), "unknown", "{s:?}");
        }
    }

    #[test]
    fn test_result_is_always_one_of_three() {
        let inputs = [
            None,
            Some(true.into()),
            Some(false.into()),
            Some("yes".into()),
            Some("no".into()),
            Some("true".into()),
            Some("false".into()),
            Some("unknown".into()),
            Some("na".into()),
            Some("whatever".into()),
        ];
        for raw in inputs {
            assert!(["checked", "", "unknown"].contains(&class_of(raw)));
        }
    }

    #[test]
    fn test_deserialize_untagged() {
        let b: FlagValue = serde_json::from_str("true").unwrap();
        assert_eq!(b, FlagValue::Bool(true));
        let s: FlagValue = serde_json::from_str("\"Yes\"").unwrap();
        assert_eq!(s, FlagValue::Text("Yes".into()));
        let none: Option<FlagValue> = serde_json::from_str("null").unwrap();
        assert_eq!(none, None);
    }
}
