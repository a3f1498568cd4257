//! Security identifiers
//!
//! Textual form `S-<revision>-<authority>-<subauthority>...` as used by
//! Active Directory's `objectSid`, plus decoding of the binary layout the
//! server returns for that attribute.

use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use crate::error::{DirectoryError, DirectoryResult};

/// Revision, identifier authority, and at least one sub-authority.
///
/// Digits are ASCII only.
static SID_REGEX: LazyLock<regex::Regex> = LazyLock::new(|| {
    regex::Regex::new(r"^S-[0-9]+-[0-9]+(-[0-9]+)+$")
        .expect("SID_REGEX is a valid regex pattern")
});

/// Check whether `sid` is a textual security identifier.
pub fn is_valid_sid(sid: &str) -> bool {
    SID_REGEX.is_match(sid)
}

/// A parsed security identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SecurityIdentifier {
    revision: u8,
    authority: u64,
    sub_authorities: Vec<u32>,
}

impl SecurityIdentifier {
    /// Decode the binary `objectSid` representation.
    ///
    /// Layout: revision (1 byte), sub-authority count (1 byte), identifier
    /// authority (6 bytes, big-endian), then one little-endian `u32` per
    /// sub-authority.
    pub fn from_bytes(bytes: &[u8]) -> DirectoryResult<Self> {
        if bytes.len() < 8 {
            return Err(DirectoryError::invalid_data(format!(
                "binary SID too short: {} bytes",
                bytes.len()
            )));
        }

        let revision = bytes[0];
        let count = usize::from(bytes[1]);
        let expected = 8 + count * 4;
        if count == 0 || bytes.len() != expected {
            return Err(DirectoryError::invalid_data(format!(
                "binary SID declares {count} sub-authorities but is {} bytes",
                bytes.len()
            )));
        }

        let authority = bytes[2..8]
            .iter()
            .fold(0u64, |acc, b| (acc << 8) | u64::from(*b));

        let sub_authorities = bytes[8..]
            .chunks_exact(4)
            .map(|chunk| u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect();

        Ok(Self {
            revision,
            authority,
            sub_authorities,
        })
    }

    /// SID revision level (always 1 in practice).
    pub fn revision(&self) -> u8 {
        self.revision
    }

    /// Identifier authority (5 for `NT AUTHORITY`).
    pub fn authority(&self) -> u64 {
        self.authority
    }

    /// All sub-authorities, domain identifiers first.
    pub fn sub_authorities(&self) -> &[u32] {
        &self.sub_authorities
    }

    /// The relative identifier: the last sub-authority.
    pub fn relative_id(&self) -> Option<u32> {
        self.sub_authorities.last().copied()
    }
}

impl FromStr for SecurityIdentifier {
    type Err = DirectoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if !is_valid_sid(s) {
            return Err(DirectoryError::invalid_data(format!(
                "not a security identifier: {s}"
            )));
        }

        let invalid = |part: &str| {
            DirectoryError::invalid_data(format!("SID component out of range: {part}"))
        };

        let mut parts = s[2..].split('-');
        let revision_part = parts.next().unwrap_or_default();
        let revision = revision_part.parse().map_err(|_| invalid(revision_part))?;
        let authority_part = parts.next().unwrap_or_default();
        let authority = authority_part.parse().map_err(|_| invalid(authority_part))?;
        let sub_authorities = parts
            .map(|part| part.parse().map_err(|_| invalid(part)))
            .collect::<DirectoryResult<Vec<u32>>>()?;

        Ok(Self {
            revision,
            authority,
            sub_authorities,
        })
    }
}

impl fmt::Display for SecurityIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "S-{}-{}", self.revision, self.authority)?;
        for sub in &self.sub_authorities {
            write!(f, "-{sub}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOMAIN_USER: &str = "S-1-5-21-3623811015-3361044348-30300820-1013";

    #[test]
    fn test_is_valid_sid() {
        assert!(is_valid_sid(DOMAIN_USER));
        assert!(is_valid_sid("S-1-5-21-362381101-336104434-3030082-101"));
        assert!(is_valid_sid("S-1-5-18"));

        assert!(!is_valid_sid("Invalid SID"));
        assert!(!is_valid_sid("S-1-5"));
        assert!(!is_valid_sid("S-1-5-"));
        assert!(!is_valid_sid("s-1-5-18"));
        assert!(!is_valid_sid("S-1-5-18 "));
        assert!(!is_valid_sid(""));
    }

    #[test]
    fn test_non_ascii_digits_are_rejected() {
        // U+0663 ARABIC-INDIC DIGIT THREE
        let sid = "S-1-5-\u{0663}";
        assert!(!is_valid_sid(sid));
        assert!(sid.parse::<SecurityIdentifier>().is_err());
        assert!(!is_valid_sid("S-\u{0661}-5-18"));
    }

    #[test]
    fn test_parse_sid() {
        let sid: SecurityIdentifier = DOMAIN_USER.parse().unwrap();
        assert_eq!(sid.revision(), 1);
        assert_eq!(sid.authority(), 5);
        assert_eq!(
            sid.sub_authorities(),
            &[21, 3623811015, 3361044348, 30300820, 1013]
        );
        assert_eq!(sid.relative_id(), Some(1013));
        assert_eq!(sid.to_string(), DOMAIN_USER);
    }

    #[test]
    fn test_parse_invalid_sid() {
        assert!("Invalid SID".parse::<SecurityIdentifier>().is_err());
        // Matches the grammar but does not fit a 32-bit sub-authority
        assert!("S-1-5-99999999999".parse::<SecurityIdentifier>().is_err());
    }

    #[test]
    fn test_from_bytes() {
        // S-1-5-21-1-2-3-500
        let mut bytes = vec![1u8, 5, 0, 0, 0, 0, 0, 5];
        for sub in [21u32, 1, 2, 3, 500] {
            bytes.extend_from_slice(&sub.to_le_bytes());
        }

        let sid = SecurityIdentifier::from_bytes(&bytes).unwrap();
        assert_eq!(sid.to_string(), "S-1-5-21-1-2-3-500");
        assert!(is_valid_sid(&sid.to_string()));
    }

    #[test]
    fn test_from_bytes_rejects_bad_length() {
        assert!(SecurityIdentifier::from_bytes(&[1, 5, 0]).is_err());
        // Declares two sub-authorities but carries one
        let bytes = [1u8, 2, 0, 0, 0, 0, 0, 5, 18, 0, 0, 0];
        assert!(SecurityIdentifier::from_bytes(&bytes).is_err());
    }
}
