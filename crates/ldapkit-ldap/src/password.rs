//! Password operations over the unicodePwd attribute.
//!
//! Active Directory only accepts `unicodePwd` writes over an encrypted
//! connection (LDAPS or STARTTLS). The value itself is produced by
//! [`ldapkit::codec::encode_password`].

use std::collections::HashSet;

use ldap3::Mod;
use tracing::instrument;

use ldapkit::codec::encode_password;
use ldapkit::error::{DirectoryError, DirectoryResult};

/// Check that the connection is suitable for password operations.
#[instrument]
pub fn validate_password_connection(encrypted: bool) -> DirectoryResult<()> {
    if !encrypted {
        return Err(DirectoryError::InvalidConfiguration {
            message: "an encrypted connection (SSL or STARTTLS) is required for password \
                      operations"
                .to_string(),
        });
    }
    Ok(())
}

/// Build the modifications for a user-driven password change.
///
/// The old value is deleted and the new one added in the same request,
/// which AD treats as a change (subject to password policy) rather than
/// an administrative reset.
#[instrument(skip(old_password, new_password))]
pub fn build_password_change(
    attribute: &str,
    old_password: &str,
    new_password: &str,
) -> DirectoryResult<Vec<Mod<Vec<u8>>>> {
    if new_password.is_empty() {
        return Err(DirectoryError::validation("new password cannot be empty"));
    }

    let name = attribute.as_bytes().to_vec();
    Ok(vec![
        Mod::Delete(
            name.clone(),
            HashSet::from([encode_password(old_password)]),
        ),
        Mod::Add(name, HashSet::from([encode_password(new_password)])),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_password_connection() {
        assert!(validate_password_connection(true).is_ok());
        assert!(matches!(
            validate_password_connection(false),
            Err(DirectoryError::InvalidConfiguration { .. })
        ));
    }

    #[test]
    fn test_build_password_change() {
        let mods = build_password_change("unicodePwd", "old", "new").unwrap();
        assert_eq!(mods.len(), 2);

        match &mods[0] {
            Mod::Delete(name, values) => {
                assert_eq!(name.as_slice(), b"unicodePwd");
                assert!(values.contains(&encode_password("old")));
            }
            other => panic!("expected delete, got {other:?}"),
        }
        match &mods[1] {
            Mod::Add(_, values) => assert!(values.contains(&encode_password("new"))),
            other => panic!("expected add, got {other:?}"),
        }
    }

    #[test]
    fn test_build_password_change_rejects_empty() {
        let err = build_password_change("unicodePwd", "old", "").unwrap_err();
        assert!(err.is_validation());
    }
}
