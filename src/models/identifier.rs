//! Identifier triples carried on a PII record.

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// `(type, authority, value)` per HL7 v2 table 0203. `id_type` is free-form
/// here (e.g. `MR`, `SS`, `DL`, `PPN`) — the blocking key and the comparator
/// both key off it verbatim, so no closed enum is imposed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Identifier {
    #[serde(rename = "type")]
    pub id_type: String,
    pub authority: String,
    pub value: String,
}

impl Identifier {
    pub fn new(
        id_type: impl Into<String>,
        authority: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        Self {
            id_type: id_type.into(),
            authority: authority.into(),
            value: value.into(),
        }
    }

    /// `"type|authority|value"`, the string form `feature_iter` emits for
    /// `IDENTIFIER` / `IDENTIFIER:<t>`.
    pub fn to_feature_string(&self) -> String {
        format!("{}|{}|{}", self.id_type, self.authority, self.value)
    }

    /// `"<type>:<first-2-of-authority>:<last-4-of-value>"`, the BlockingValue
    /// for key `IDENTIFIER` (10).
    pub fn to_blocking_value(&self) -> Option<String> {
        let authority_prefix: String = self.authority.chars().take(2).collect();
        if authority_prefix.chars().count() < 2 {
            return None;
        }
        let value_suffix = suffix_chars(&self.value, 4)?;
        Some(format!(
            "{}:{}:{}",
            self.id_type.to_uppercase(),
            authority_prefix,
            value_suffix
        ))
    }
}

/// Last `n` chars of `s`, or `None` if `s` has fewer than `n`.
fn suffix_chars(s: &str, n: usize) -> Option<String> {
    let chars: Vec<char> = s.chars().collect();
    if chars.len() < n {
        return None;
    }
    Some(chars[chars.len() - n..].iter().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blocking_value_format() {
        let id = Identifier::new("MR", "FACILITY-A", "00012345");
        assert_eq!(id.to_blocking_value().unwrap(), "MR:FA:2345");
    }

    #[test]
    fn blocking_value_dropped_when_too_short() {
        let id = Identifier::new("MR", "F", "12");
        assert_eq!(id.to_blocking_value(), None);
    }

    #[test]
    fn feature_string_format() {
        let id = Identifier::new("SS", "SSA", "555-44-3333");
        assert_eq!(id.to_feature_string(), "SS|SSA|555-44-3333");
    }
}
