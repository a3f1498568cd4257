//! Raw attribute sets
//!
//! An entry's attributes as read from or written to the directory:
//! case-insensitive attribute names mapped to ordered value lists, plus
//! the distinguished name held apart from the attributes.

/// Reserved attribute name carrying the entry's distinguished name.
pub const DN_KEY: &str = "dn";

/// Attribute name to ordered values, in insertion order.
///
/// Names compare case-insensitively and stay unique; re-setting an
/// attribute keeps its original position. Every value is stored as a
/// sequence, even when the attribute is logically single-valued.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawAttributeSet {
    dn: Option<String>,
    attributes: Vec<(String, Vec<String>)>,
}

impl RawAttributeSet {
    /// Create an empty attribute set without a DN.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the DN using builder pattern.
    pub fn with_dn(mut self, dn: impl Into<String>) -> Self {
        self.dn = Some(dn.into());
        self
    }

    /// Set an attribute using builder pattern.
    pub fn with<I, S>(mut self, name: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(name, values);
        self
    }

    /// The distinguished name, if one is set.
    pub fn dn(&self) -> Option<&str> {
        self.dn.as_deref()
    }

    /// Set the distinguished name.
    pub fn set_dn(&mut self, dn: impl Into<String>) {
        self.dn = Some(dn.into());
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.attributes
            .iter()
            .position(|(existing, _)| existing.eq_ignore_ascii_case(name))
    }

    /// Get the values of an attribute.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.position(name)
            .map(|i| self.attributes[i].1.as_slice())
    }

    /// Get the first value of an attribute.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// Set the values of an attribute.
    ///
    /// Setting the reserved [`DN_KEY`] sets the DN from the first value
    /// instead of storing an attribute.
    pub fn set<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = name.into();
        let values: Vec<String> = values.into_iter().map(Into::into).collect();

        if name.eq_ignore_ascii_case(DN_KEY) {
            self.dn = values.into_iter().next();
            return;
        }

        match self.position(&name) {
            Some(i) => self.attributes[i].1 = values,
            None => self.attributes.push((name, values)),
        }
    }

    /// Remove an attribute, returning its values.
    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.position(name)
            .map(|i| self.attributes.remove(i).1)
    }

    /// Check if an attribute is present (possibly with no values).
    pub fn contains(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Attribute names in insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.attributes.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate over attributes in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[String])> {
        self.attributes
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Get the number of attributes (the DN is not counted).
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if there are no attributes.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, Vec<String>)> for RawAttributeSet {
    fn from_iter<T: IntoIterator<Item = (S, Vec<String>)>>(iter: T) -> Self {
        let mut set = Self::new();
        for (name, values) in iter {
            set.set(name, values);
        }
        set
    }
}
