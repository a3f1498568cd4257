//! Distinguished name decomposition
//!
//! Splits `attr=value,attr=value` strings on unescaped commas. A backslash
//! escapes the character after it, so `\,` and `\=` inside a value are
//! never treated as separators. Values are returned as written, escape
//! sequences included.

/// Split a DN into its raw RDN components (`attr=value`), left to right.
///
/// Unescaped whitespace around each component is trimmed; empty input
/// yields no components.
pub fn split_dn(dn: &str) -> Vec<&str> {
    if dn.trim().is_empty() {
        return Vec::new();
    }

    let mut components = Vec::new();
    let mut start = 0;
    let mut escaped = false;

    for (i, ch) in dn.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            ',' => {
                components.push(trim_component(&dn[start..i]));
                start = i + 1;
            }
            _ => {}
        }
    }
    components.push(trim_component(&dn[start..]));

    components
}

/// Trim whitespace around a component, keeping an escaped trailing space
/// (`\ `) as part of the value.
fn trim_component(component: &str) -> &str {
    let component = component.trim_start();
    let trimmed = component.trim_end();

    let backslashes = trimmed.bytes().rev().take_while(|b| *b == b'\\').count();
    if backslashes % 2 == 0 {
        return trimmed;
    }

    let escaped = component[trimmed.len()..]
        .chars()
        .next()
        .map_or(0, char::len_utf8);
    &component[..trimmed.len() + escaped]
}

/// Value part of one RDN: everything after the first unescaped `=`.
///
/// A component without `=` is returned whole.
fn rdn_value(component: &str) -> &str {
    let mut escaped = false;

    for (i, ch) in component.char_indices() {
        match ch {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '=' => return &component[i + 1..],
            _ => {}
        }
    }

    component
}

/// Explode a DN into the ordered values of its RDNs.
///
/// ```
/// use ldapkit::dn::explode_dn;
///
/// assert_eq!(
///     explode_dn("cn=Testing,ou=Folder,dc=corp,dc=org"),
///     vec!["Testing", "Folder", "corp", "org"]
/// );
/// ```
pub fn explode_dn(dn: &str) -> Vec<String> {
    split_dn(dn)
        .into_iter()
        .map(|component| rdn_value(component).to_string())
        .collect()
}

/// The DN of the parent entry, or `None` for a single-RDN name.
pub fn parent_dn(dn: &str) -> Option<String> {
    let components = split_dn(dn);
    if components.len() < 2 {
        return None;
    }
    Some(components[1..].join(","))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_explode_dn() {
        let values = explode_dn("cn=Testing,ou=Folder,dc=corp,dc=org");
        assert_eq!(values, vec!["Testing", "Folder", "corp", "org"]);
        assert_eq!(values.len(), 4);
    }

    #[test]
    fn test_explode_dn_empty() {
        assert!(explode_dn("").is_empty());
        assert!(explode_dn("   ").is_empty());
    }

    #[test]
    fn test_explode_dn_escaped_separators() {
        assert_eq!(
            explode_dn(r"cn=Doe\, John,ou=a\=b,dc=org"),
            vec![r"Doe\, John", r"a\=b", "org"]
        );
    }

    #[test]
    fn test_explode_dn_escaped_backslash_before_comma() {
        // `\\` is an escaped backslash, so the comma after it separates
        assert_eq!(explode_dn(r"cn=a\\,dc=org"), vec![r"a\\", "org"]);
    }

    #[test]
    fn test_explode_dn_value_containing_equals() {
        assert_eq!(explode_dn("cn=a=b,dc=org"), vec!["a=b", "org"]);
    }

    #[test]
    fn test_explode_dn_trims_whitespace() {
        assert_eq!(
            explode_dn("cn=John Doe, ou=Users , dc=corp"),
            vec!["John Doe", "Users", "corp"]
        );
    }

    #[test]
    fn test_explode_dn_keeps_escaped_trailing_space() {
        assert_eq!(explode_dn(r"cn=foo\ ,dc=org"), vec![r"foo\ ", "org"]);
        assert_eq!(explode_dn(r"cn=foo\  , dc=org "), vec![r"foo\ ", "org"]);
        // An escaped backslash does not escape the space after it
        assert_eq!(explode_dn(r"cn=foo\\ ,dc=org"), vec![r"foo\\", "org"]);
    }

    #[test]
    fn test_split_dn() {
        assert_eq!(
            split_dn("cn=Doe,dc=corp,dc=acme,dc=org"),
            vec!["cn=Doe", "dc=corp", "dc=acme", "dc=org"]
        );
    }

    #[test]
    fn test_parent_dn() {
        assert_eq!(
            parent_dn("cn=Doe,dc=corp,dc=acme,dc=org").as_deref(),
            Some("dc=corp,dc=acme,dc=org")
        );
        assert_eq!(
            parent_dn(r"cn=Doe\, John,dc=org").as_deref(),
            Some("dc=org")
        );
        assert_eq!(parent_dn("dc=org"), None);
        assert_eq!(parent_dn(""), None);
    }
}
