//! Attribute change sets
//!
//! Diffs an entry's original snapshot against its current state into the
//! ordered add/replace/remove list a batch modify expects.
//!
//! Order is a hard contract: every attribute of the original snapshot is
//! visited first, in its insertion order, yielding removals and
//! replacements; attributes that only exist in the current state follow,
//! in their insertion order, as additions.

use serde::{Deserialize, Serialize};

use crate::attributes::RawAttributeSet;
use crate::error::DirectoryError;

/// Operation code of a single attribute modification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum ModType {
    /// Add values to a new attribute.
    Add,
    /// Replace all values of an existing attribute.
    Replace,
    /// Remove the entire attribute.
    Remove,
}

impl ModType {
    /// The integer code used on the wire.
    pub fn code(self) -> u8 {
        match self {
            ModType::Add => 1,
            ModType::Replace => 3,
            ModType::Remove => 18,
        }
    }
}

impl From<ModType> for u8 {
    fn from(kind: ModType) -> Self {
        kind.code()
    }
}

impl TryFrom<u8> for ModType {
    type Error = DirectoryError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            1 => Ok(ModType::Add),
            3 => Ok(ModType::Replace),
            18 => Ok(ModType::Remove),
            other => Err(DirectoryError::invalid_data(format!(
                "unknown modification type: {other}"
            ))),
        }
    }
}

/// One modification of one attribute.
///
/// Serializes to the batch-modify wire shape
/// `{"attrib": ..., "modtype": ..., "values": [...]}`, with `values`
/// omitted for removals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDelta {
    #[serde(rename = "attrib")]
    attribute: String,

    #[serde(rename = "modtype")]
    kind: ModType,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    values: Option<Vec<String>>,
}

impl AttributeDelta {
    /// Add a new attribute with the given values.
    pub fn add(attribute: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            attribute: attribute.into(),
            kind: ModType::Add,
            values: Some(values),
        }
    }

    /// Replace every value of an attribute.
    pub fn replace(attribute: impl Into<String>, values: Vec<String>) -> Self {
        Self {
            attribute: attribute.into(),
            kind: ModType::Replace,
            values: Some(values),
        }
    }

    /// Remove an attribute entirely.
    pub fn remove(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
            kind: ModType::Remove,
            values: None,
        }
    }

    /// The attribute this delta changes.
    pub fn attribute(&self) -> &str {
        &self.attribute
    }

    /// The kind of modification.
    pub fn kind(&self) -> ModType {
        self.kind
    }

    /// The new values; always `None` for removals.
    pub fn values(&self) -> Option<&[String]> {
        self.values.as_deref()
    }
}

fn has_values(values: Option<&[String]>) -> bool {
    values.is_some_and(|v| !v.is_empty())
}

/// Compute the modifications that turn `original` into `current`.
///
/// Output is deterministic for identical input. The DN is not an
/// attribute and never appears in the result.
pub fn diff(original: &RawAttributeSet, current: &RawAttributeSet) -> Vec<AttributeDelta> {
    let mut deltas = Vec::new();

    for (name, original_values) in original.iter() {
        match current.get(name) {
            values if !has_values(values) => deltas.push(AttributeDelta::remove(name)),
            Some(values) if values != original_values => {
                deltas.push(AttributeDelta::replace(name, values.to_vec()));
            }
            _ => {}
        }
    }

    for (name, values) in current.iter() {
        if !original.contains(name) && !values.is_empty() {
            deltas.push(AttributeDelta::add(name, values.to_vec()));
        }
    }

    deltas
}

/// A single addition of an explicitly named attribute.
pub fn create_attribute(attribute: impl Into<String>, values: Vec<String>) -> AttributeDelta {
    AttributeDelta::add(attribute, values)
}

/// A single replacement of an explicitly named attribute.
pub fn update_attribute(attribute: impl Into<String>, values: Vec<String>) -> AttributeDelta {
    AttributeDelta::replace(attribute, values)
}

/// A single removal of an explicitly named attribute.
pub fn delete_attribute(attribute: impl Into<String>) -> AttributeDelta {
    AttributeDelta::remove(attribute)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> RawAttributeSet {
        RawAttributeSet::new()
            .with("cn", ["Common Name"])
            .with("samaccountname", ["Account Name"])
            .with("name", ["Name"])
    }

    #[test]
    fn test_diff_order() {
        let original = loaded();
        let mut current = original.clone();

        current.remove("cn");
        current.set("samaccountname", ["Changed"]);
        current.set("test", ["New Attribute"]);
        current.set("name", ["New Name"]);

        let deltas = diff(&original, &current);

        assert_eq!(
            deltas,
            vec![
                AttributeDelta::remove("cn"),
                AttributeDelta::replace("samaccountname", vec!["Changed".to_string()]),
                AttributeDelta::replace("name", vec!["New Name".to_string()]),
                AttributeDelta::add("test", vec!["New Attribute".to_string()]),
            ]
        );
    }

    #[test]
    fn test_diff_is_idempotent() {
        let original = loaded();
        let current = original.clone().with("mail", ["a@corp.org"]).with("cn", ["X"]);

        assert_eq!(diff(&original, &current), diff(&original, &current));
    }

    #[test]
    fn test_diff_unchanged_is_empty() {
        let original = loaded();
        assert!(diff(&original, &original.clone()).is_empty());
        assert!(diff(&RawAttributeSet::new(), &RawAttributeSet::new()).is_empty());
    }

    #[test]
    fn test_diff_empty_values_remove() {
        let original = loaded();
        let mut current = original.clone();
        current.set("cn", Vec::<String>::new());

        assert_eq!(diff(&original, &current), vec![AttributeDelta::remove("cn")]);
    }

    #[test]
    fn test_diff_value_order_matters() {
        let original = RawAttributeSet::new().with("mail", ["a", "b"]);
        let current = RawAttributeSet::new().with("mail", ["b", "a"]);

        assert_eq!(
            diff(&original, &current),
            vec![AttributeDelta::replace(
                "mail",
                vec!["b".to_string(), "a".to_string()]
            )]
        );
    }

    #[test]
    fn test_diff_skips_empty_additions() {
        let original = RawAttributeSet::new();
        let current = RawAttributeSet::new()
            .with("member", Vec::<String>::new())
            .with("cn", ["John"]);

        assert_eq!(
            diff(&original, &current),
            vec![AttributeDelta::add("cn", vec!["John".to_string()])]
        );
    }

    #[test]
    fn test_diff_matches_names_case_insensitively() {
        let original = RawAttributeSet::new().with("sAMAccountName", ["jdoe"]);
        let current = RawAttributeSet::new().with("samaccountname", ["jdoe"]);

        assert!(diff(&original, &current).is_empty());
    }

    #[test]
    fn test_diff_ignores_dn() {
        let original = loaded().with_dn("cn=a,dc=org");
        let current = loaded().with_dn("cn=b,dc=org");

        assert!(diff(&original, &current).is_empty());
    }

    #[test]
    fn test_single_operation_helpers() {
        let add = create_attribute("givenName", vec!["John Doe".to_string()]);
        assert_eq!(add.kind(), ModType::Add);
        assert_eq!(add.attribute(), "givenName");

        let replace = update_attribute("cn", vec!["John Doe".to_string()]);
        assert_eq!(replace.kind(), ModType::Replace);
        assert_eq!(replace.values(), Some(&["John Doe".to_string()][..]));

        let remove = delete_attribute("cn");
        assert_eq!(remove.kind(), ModType::Remove);
        assert_eq!(remove.values(), None);
    }

    #[test]
    fn test_mod_type_codes() {
        assert_eq!(ModType::Add.code(), 1);
        assert_eq!(ModType::Replace.code(), 3);
        assert_eq!(ModType::Remove.code(), 18);

        assert_eq!(ModType::try_from(18).unwrap(), ModType::Remove);
        assert!(ModType::try_from(2).is_err());
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(vec![
            AttributeDelta::remove("cn"),
            AttributeDelta::replace("samaccountname", vec!["Changed".to_string()]),
        ])
        .unwrap();

        assert_eq!(
            json,
            serde_json::json!([
                { "attrib": "cn", "modtype": 18 },
                { "attrib": "samaccountname", "modtype": 3, "values": ["Changed"] },
            ])
        );

        let parsed: AttributeDelta = serde_json::from_value(serde_json::json!({
            "attrib": "cn",
            "modtype": 1,
            "values": ["x"],
        }))
        .unwrap();
        assert_eq!(parsed, AttributeDelta::add("cn", vec!["x".to_string()]));
    }
}
