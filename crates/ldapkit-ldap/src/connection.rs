//! ldap3-backed directory connection
//!
//! Implements [`DirectoryConnection`] over a bound ldap3 handle.

use std::collections::HashSet;

use async_trait::async_trait;
use base64::Engine;
use ldap3::{Ldap, LdapResult, Mod, Scope, SearchEntry, SearchResult};
use tracing::{debug, info, instrument};

use ldapkit::attributes::RawAttributeSet;
use ldapkit::changeset::{AttributeDelta, ModType};
use ldapkit::connection::DirectoryConnection;
use ldapkit::error::{DirectoryError, DirectoryResult};
use ldapkit::sid::SecurityIdentifier;

use crate::password;

/// LDAP result code: success.
const RC_SUCCESS: u32 = 0;
/// LDAP result code: constraintViolation.
const RC_CONSTRAINT_VIOLATION: u32 = 19;
/// LDAP result code: noSuchObject.
const RC_NO_SUCH_OBJECT: u32 = 32;
/// LDAP result code: invalidCredentials.
const RC_INVALID_CREDENTIALS: u32 = 49;
/// LDAP result code: insufficientAccessRights.
const RC_INSUFFICIENT_ACCESS: u32 = 50;
/// LDAP result code: entryAlreadyExists.
const RC_ALREADY_EXISTS: u32 = 68;

/// Map an LDAP result code to a directory result.
pub(crate) fn map_result_code(
    rc: u32,
    text: &str,
    dn: &str,
    operation: &str,
) -> DirectoryResult<()> {
    match rc {
        RC_SUCCESS => Ok(()),
        RC_NO_SUCH_OBJECT => Err(DirectoryError::ObjectNotFound { dn: dn.to_string() }),
        RC_INVALID_CREDENTIALS => Err(DirectoryError::AuthenticationFailed),
        RC_INSUFFICIENT_ACCESS => Err(DirectoryError::AuthorizationFailed {
            operation: format!("{operation} {dn}"),
        }),
        RC_CONSTRAINT_VIOLATION => Err(DirectoryError::ConstraintViolation {
            message: format!("{operation} {dn}: {text}"),
        }),
        RC_ALREADY_EXISTS => Err(DirectoryError::ObjectAlreadyExists { dn: dn.to_string() }),
        _ => Err(DirectoryError::operation_failed(format!(
            "LDAP {operation} failed with code {rc}: {text}"
        ))),
    }
}

fn check_result(result: &LdapResult, dn: &str, operation: &str) -> DirectoryResult<()> {
    map_result_code(result.rc, &result.text, dn, operation)
}

/// Convert an ldap3 search entry into a raw attribute set.
///
/// Attribute names are ordered alphabetically. Binary values of
/// `sid_attribute` are rendered as textual SIDs, other binary values as
/// standard base64.
pub fn to_raw_attribute_set(entry: SearchEntry, sid_attribute: &str) -> RawAttributeSet {
    let mut raw = RawAttributeSet::new().with_dn(entry.dn);

    let mut text: Vec<(String, Vec<String>)> = entry.attrs.into_iter().collect();
    text.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, values) in text {
        raw.set(name, values);
    }

    let mut binary: Vec<(String, Vec<Vec<u8>>)> = entry.bin_attrs.into_iter().collect();
    binary.sort_by(|a, b| a.0.cmp(&b.0));
    for (name, values) in binary {
        let is_sid = name.eq_ignore_ascii_case(sid_attribute);
        let rendered: Vec<String> = values
            .iter()
            .map(|bytes| render_binary(bytes, is_sid))
            .collect();
        raw.set(name, rendered);
    }

    raw
}

fn render_binary(bytes: &[u8], is_sid: bool) -> String {
    if is_sid {
        if let Ok(sid) = SecurityIdentifier::from_bytes(bytes) {
            return sid.to_string();
        }
    }
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

fn to_value_set(values: &[String]) -> HashSet<String> {
    values.iter().cloned().collect()
}

/// Convert ordered deltas into ldap3 modifications, keeping their order.
///
/// ldap3 carries each attribute's values as a set, so value order and
/// duplicate values within one delta are not preserved on the wire. A
/// `Replace` that only reorders values resends the same set.
pub fn to_modifications(deltas: &[AttributeDelta]) -> Vec<Mod<String>> {
    deltas
        .iter()
        .map(|delta| {
            let name = delta.attribute().to_string();
            let values = delta.values().map(to_value_set).unwrap_or_default();
            match delta.kind() {
                ModType::Add => Mod::Add(name, values),
                ModType::Replace => Mod::Replace(name, values),
                ModType::Remove => Mod::Delete(name, values),
            }
        })
        .collect()
}

/// A [`DirectoryConnection`] over a bound ldap3 handle.
///
/// The handle is cloned per request; all clones share one underlying
/// connection.
#[derive(Clone)]
pub struct LdapConnection {
    ldap: Ldap,
    encrypted: bool,
    sid_attribute: String,
}

impl LdapConnection {
    /// Wrap a bound ldap3 handle.
    pub fn new(ldap: Ldap, encrypted: bool, sid_attribute: impl Into<String>) -> Self {
        Self {
            ldap,
            encrypted,
            sid_attribute: sid_attribute.into(),
        }
    }

    /// Whether the connection is encrypted (LDAPS or STARTTLS).
    pub fn is_encrypted(&self) -> bool {
        self.encrypted
    }

    /// Raw handle for requests outside [`DirectoryConnection`].
    pub(crate) fn handle(&self) -> Ldap {
        self.ldap.clone()
    }

    /// Search with an arbitrary scope.
    #[instrument(skip(self, attributes))]
    pub async fn search(
        &self,
        base: &str,
        scope: Scope,
        filter: &str,
        attributes: &[String],
    ) -> DirectoryResult<Vec<RawAttributeSet>> {
        let mut ldap = self.handle();

        let SearchResult(entries, result) = ldap
            .search(base, scope, filter, attributes.to_vec())
            .await
            .map_err(|e| {
                DirectoryError::operation_failed_with_source(
                    format!("Failed to search {base}"),
                    e,
                )
            })?;

        if result.rc == RC_NO_SUCH_OBJECT {
            debug!(base = %base, "Search base not found");
            return Ok(Vec::new());
        }
        check_result(&result, base, "search")?;

        let sets = entries
            .into_iter()
            .map(|e| to_raw_attribute_set(SearchEntry::construct(e), &self.sid_attribute))
            .collect::<Vec<_>>();

        debug!(base = %base, count = sets.len(), "Search complete");
        Ok(sets)
    }

    /// Change a password the way a user does, proving the old one.
    #[instrument(skip(self, old_password, new_password))]
    pub async fn change_password(
        &self,
        dn: &str,
        attribute: &str,
        old_password: &str,
        new_password: &str,
    ) -> DirectoryResult<()> {
        password::validate_password_connection(self.encrypted)?;
        let mods = password::build_password_change(attribute, old_password, new_password)?;

        let mut ldap = self.handle();
        let result = ldap.modify(dn, mods).await.map_err(|e| {
            DirectoryError::operation_failed_with_source(
                format!("Failed to change password: {dn}"),
                e,
            )
        })?;
        check_result(&result, dn, "password change")?;

        info!(dn = %dn, "Password changed");
        Ok(())
    }
}

impl std::fmt::Debug for LdapConnection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConnection")
            .field("encrypted", &self.encrypted)
            .field("sid_attribute", &self.sid_attribute)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DirectoryConnection for LdapConnection {
    #[instrument(skip(self, attributes))]
    async fn add(&self, dn: &str, attributes: &RawAttributeSet) -> DirectoryResult<()> {
        let ldap_attrs: Vec<(String, HashSet<String>)> = attributes
            .iter()
            .filter(|(_, values)| !values.is_empty())
            .map(|(name, values)| (name.to_string(), to_value_set(values)))
            .collect();

        debug!(dn = %dn, attributes = ldap_attrs.len(), "Adding LDAP entry");

        let mut ldap = self.handle();
        let result = ldap.add(dn, ldap_attrs).await.map_err(|e| {
            DirectoryError::operation_failed_with_source(format!("Failed to create entry: {dn}"), e)
        })?;
        check_result(&result, dn, "add")?;

        info!(dn = %dn, "LDAP entry created");
        Ok(())
    }

    async fn read(
        &self,
        dn: &str,
        filter: &str,
        attributes: &[String],
    ) -> DirectoryResult<Vec<RawAttributeSet>> {
        self.search(dn, Scope::Base, filter, attributes).await
    }

    #[instrument(skip(self, modifications), fields(count = modifications.len()))]
    async fn modify_batch(
        &self,
        dn: &str,
        modifications: &[AttributeDelta],
    ) -> DirectoryResult<()> {
        let mods = to_modifications(modifications);
        if mods.is_empty() {
            return Ok(());
        }

        let mut ldap = self.handle();
        let result = ldap.modify(dn, mods).await.map_err(|e| {
            DirectoryError::operation_failed_with_source(format!("Failed to update entry: {dn}"), e)
        })?;
        check_result(&result, dn, "modify")?;

        info!(dn = %dn, "LDAP entry modified");
        Ok(())
    }

    #[instrument(skip(self, values))]
    async fn replace_binary(
        &self,
        dn: &str,
        attribute: &str,
        values: Vec<Vec<u8>>,
    ) -> DirectoryResult<()> {
        password::validate_password_connection(self.encrypted)?;

        let mods = vec![Mod::Replace(
            attribute.as_bytes().to_vec(),
            values.into_iter().collect::<HashSet<Vec<u8>>>(),
        )];

        let mut ldap = self.handle();
        let result = ldap.modify(dn, mods).await.map_err(|e| {
            DirectoryError::operation_failed_with_source(
                format!("Failed to replace {attribute} on {dn}"),
                e,
            )
        })?;
        check_result(&result, dn, "modify")?;

        info!(dn = %dn, attribute = %attribute, "Binary attribute replaced");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, dn: &str) -> DirectoryResult<()> {
        let mut ldap = self.handle();
        let result = ldap.delete(dn).await.map_err(|e| {
            DirectoryError::operation_failed_with_source(format!("Failed to delete entry: {dn}"), e)
        })?;
        check_result(&result, dn, "delete")?;

        info!(dn = %dn, "LDAP entry deleted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn rename(
        &self,
        dn: &str,
        new_rdn: &str,
        new_parent_dn: Option<&str>,
        delete_old_rdn: bool,
    ) -> DirectoryResult<()> {
        let mut ldap = self.handle();
        let result = ldap
            .modifydn(dn, new_rdn, delete_old_rdn, new_parent_dn)
            .await
            .map_err(|e| {
                DirectoryError::operation_failed_with_source(
                    format!("Failed to rename entry: {dn}"),
                    e,
                )
            })?;
        check_result(&result, dn, "modify DN")?;

        info!(dn = %dn, new_rdn = %new_rdn, "LDAP entry renamed");
        Ok(())
    }
}
