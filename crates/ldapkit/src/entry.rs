//! Directory entry facade
//!
//! Orchestrates create, update, delete and move of one entry on top of its
//! [`AttributeStore`] and a [`DirectoryConnection`].
//!
//! An entry starts out new (`exists() == false`) and becomes persisted after
//! a successful [`DirectoryEntry::create`] or a load. A failed commit leaves
//! the store untouched, so the same change set can be submitted again.

use std::fmt;
use std::slice;
use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::attributes::RawAttributeSet;
use crate::changeset::{self, AttributeDelta};
use crate::codec::{self, EscapeContext};
use crate::connection::{DirectoryConnection, MATCH_ANY_FILTER};
use crate::dn;
use crate::error::{DirectoryError, DirectoryResult};
use crate::schema::Schema;
use crate::sid::SecurityIdentifier;
use crate::store::AttributeStore;

/// One directory entry and the connection it is committed through.
pub struct DirectoryEntry {
    store: AttributeStore,
    connection: Arc<dyn DirectoryConnection>,
    schema: Arc<Schema>,
    base_dn: Option<String>,
}

impl DirectoryEntry {
    /// Create a new, empty entry.
    pub fn new(connection: Arc<dyn DirectoryConnection>, schema: Arc<Schema>) -> Self {
        Self {
            store: AttributeStore::new(),
            connection,
            schema,
            base_dn: None,
        }
    }

    /// Set the base DN new entries are created under.
    pub fn with_base_dn(mut self, base_dn: impl Into<String>) -> Self {
        self.base_dn = Some(base_dn.into());
        self
    }

    /// Start a new entry from initial attributes.
    pub fn with_attributes(mut self, attributes: RawAttributeSet) -> Self {
        self.store = AttributeStore::with_attributes(attributes);
        self
    }

    /// Load attributes read from the directory, marking the entry persisted.
    pub fn set_raw_attributes(&mut self, attributes: RawAttributeSet) {
        self.store.load(attributes);
    }

    /// The schema used to resolve typed accessors.
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// The underlying attribute store.
    pub fn store(&self) -> &AttributeStore {
        &self.store
    }

    /// Whether the entry exists in the directory.
    pub fn exists(&self) -> bool {
        self.store.exists()
    }

    /// The entry's distinguished name.
    pub fn dn(&self) -> Option<&str> {
        self.store.dn()
    }

    /// Set the entry's distinguished name.
    pub fn set_dn(&mut self, dn: impl Into<String>) {
        self.store.set_dn(dn);
    }

    /// The DN of the containing entry.
    pub fn parent_dn(&self) -> Option<String> {
        self.dn().and_then(dn::parent_dn)
    }

    /// The base DN new entries are created under.
    pub fn base_dn(&self) -> Option<&str> {
        self.base_dn.as_deref()
    }

    // Generic accessors

    /// Get the current values of an attribute.
    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.store.get(name)
    }

    /// Get the first current value of an attribute.
    pub fn first(&self, name: &str) -> Option<&str> {
        self.store.first(name)
    }

    /// Set the values of an attribute.
    pub fn set<I, S>(&mut self, name: impl Into<String>, values: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.store.set(name, values);
    }

    /// Remove an attribute; the next update removes it from the directory.
    pub fn unset(&mut self, name: &str) -> Option<Vec<String>> {
        self.store.unset(name)
    }

    /// Read the first value of an attribute as a directory boolean.
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.first(name).and_then(codec::convert_string_to_bool)
    }

    // Typed accessors

    /// First value of the common-name attribute.
    pub fn common_name(&self) -> Option<&str> {
        self.first(&self.schema.common_name)
    }

    /// Replace the common name.
    pub fn set_common_name(&mut self, value: impl Into<String>) {
        let name = self.schema.common_name.clone();
        self.set(name, [value.into()]);
    }

    /// First value of the name attribute.
    pub fn name(&self) -> Option<&str> {
        self.first(&self.schema.name)
    }

    /// Replace the name.
    pub fn set_name(&mut self, value: impl Into<String>) {
        let name = self.schema.name.clone();
        self.set(name, [value.into()]);
    }

    /// First value of the display-name attribute.
    pub fn display_name(&self) -> Option<&str> {
        self.first(&self.schema.display_name)
    }

    /// Replace the display name.
    pub fn set_display_name(&mut self, value: impl Into<String>) {
        let name = self.schema.display_name.clone();
        self.set(name, [value.into()]);
    }

    /// First value of the description attribute.
    pub fn description(&self) -> Option<&str> {
        self.first(&self.schema.description)
    }

    /// Replace the description.
    pub fn set_description(&mut self, value: impl Into<String>) {
        let name = self.schema.description.clone();
        self.set(name, [value.into()]);
    }

    /// First value of the account-name attribute (`sAMAccountName` on AD).
    pub fn account_name(&self) -> Option<&str> {
        self.first(&self.schema.account_name)
    }

    /// Replace the account name.
    pub fn set_account_name(&mut self, value: impl Into<String>) {
        let name = self.schema.account_name.clone();
        self.set(name, [value.into()]);
    }

    /// All object classes of the entry.
    pub fn object_classes(&self) -> &[String] {
        self.get(&self.schema.object_class).unwrap_or_default()
    }

    /// The entry's security identifier, if it carries a valid one.
    pub fn object_sid(&self) -> Option<SecurityIdentifier> {
        self.first(&self.schema.object_sid)
            .and_then(|sid| sid.parse().ok())
    }

    // Change tracking

    /// The modifications the next update would submit.
    pub fn modifications(&self) -> Vec<AttributeDelta> {
        self.store.changes()
    }

    /// Whether there are uncommitted modifications.
    pub fn is_dirty(&self) -> bool {
        self.store.is_dirty()
    }

    fn require_dn(&self, operation: &str) -> DirectoryResult<String> {
        match self.dn() {
            Some(dn) if !dn.trim().is_empty() => Ok(dn.to_string()),
            _ => Err(DirectoryError::validation(format!(
                "cannot {operation}: entry has no distinguished name"
            ))),
        }
    }

    fn require_persisted(&self, operation: &str) -> DirectoryResult<String> {
        if !self.exists() {
            return Err(DirectoryError::validation(format!(
                "cannot {operation}: entry does not exist in the directory"
            )));
        }
        self.require_dn(operation)
    }

    /// Build `<naming attribute>=<value>,<base dn>` for a new entry.
    ///
    /// The naming value is escaped for DN context.
    fn synthesize_dn(&self) -> DirectoryResult<String> {
        let naming_attr = &self.schema.common_name;

        let naming_value = self.first(naming_attr).ok_or_else(|| {
            DirectoryError::validation(format!(
                "cannot determine DN: missing naming attribute '{naming_attr}'"
            ))
        })?;

        let base_dn = self
            .base_dn
            .as_deref()
            .filter(|base| !base.trim().is_empty())
            .ok_or_else(|| DirectoryError::validation("cannot determine DN: no base DN"))?;

        let escaped = codec::escape(naming_value, "", EscapeContext::DistinguishedName);

        Ok(format!("{naming_attr}={escaped},{base_dn}"))
    }

    // Commits

    /// Add the entry to the directory, then read it back.
    ///
    /// Without an explicit DN one is synthesized from the common name and
    /// the base DN.
    #[instrument(skip(self), fields(dn = ?self.dn()))]
    pub async fn create(&mut self) -> DirectoryResult<()> {
        if self.exists() {
            return Err(DirectoryError::validation(
                "cannot create: entry already exists in the directory",
            ));
        }

        let dn = match self.dn().filter(|dn| !dn.trim().is_empty()) {
            Some(dn) => dn.to_string(),
            None => self.synthesize_dn()?,
        };

        debug!(dn = %dn, attributes = self.store.current().len(), "Creating directory entry");

        self.connection.add(&dn, self.store.current()).await?;

        self.store.set_dn(dn.clone());
        self.store.sync_original();
        self.store.set_exists(true);

        let entries = self.connection.read(&dn, MATCH_ANY_FILTER, &[]).await?;
        if let Some(mut entry) = entries.into_iter().next() {
            if entry.dn().is_none() {
                entry.set_dn(dn.clone());
            }
            self.store.load(entry);
        }

        info!(dn = %dn, "Directory entry created");
        Ok(())
    }

    /// Submit the pending modifications as one batch.
    ///
    /// Succeeds without a request when nothing changed.
    #[instrument(skip(self), fields(dn = ?self.dn()))]
    pub async fn update(&mut self) -> DirectoryResult<()> {
        let dn = self.require_persisted("update")?;
        let modifications = self.store.changes();

        if modifications.is_empty() {
            debug!(dn = %dn, "No modifications to submit");
            return Ok(());
        }

        debug!(dn = %dn, count = modifications.len(), "Submitting modifications");

        self.connection.modify_batch(&dn, &modifications).await?;
        self.store.sync_original();

        info!(dn = %dn, count = modifications.len(), "Directory entry updated");
        Ok(())
    }

    /// Create the entry if it is new, update it otherwise.
    pub async fn save(&mut self) -> DirectoryResult<()> {
        if self.exists() {
            self.update().await
        } else {
            self.create().await
        }
    }

    /// Delete the entry from the directory.
    #[instrument(skip(self), fields(dn = ?self.dn()))]
    pub async fn delete(&mut self) -> DirectoryResult<()> {
        let dn = self.require_persisted("delete")?;

        self.connection.delete(&dn).await?;
        self.store.set_exists(false);

        info!(dn = %dn, "Directory entry deleted");
        Ok(())
    }

    /// Move the entry under `new_parent_dn` with the RDN `new_rdn`.
    ///
    /// The attribute store is left as it is; call [`Self::refresh`] with the
    /// new DN to observe the result.
    #[instrument(skip(self), fields(dn = ?self.dn()))]
    pub async fn move_to(
        &self,
        new_rdn: &str,
        new_parent_dn: &str,
        delete_old_rdn: bool,
    ) -> DirectoryResult<()> {
        let dn = self.require_dn("move")?;

        self.connection
            .rename(&dn, new_rdn, Some(new_parent_dn), delete_old_rdn)
            .await?;

        info!(dn = %dn, new_rdn, new_parent_dn, "Directory entry moved");
        Ok(())
    }

    /// Change the entry's RDN, keeping its parent.
    #[instrument(skip(self), fields(dn = ?self.dn()))]
    pub async fn rename(&self, new_rdn: &str) -> DirectoryResult<()> {
        let dn = self.require_dn("rename")?;

        self.connection.rename(&dn, new_rdn, None, true).await?;

        info!(dn = %dn, new_rdn, "Directory entry renamed");
        Ok(())
    }

    /// Reload the entry from the directory.
    #[instrument(skip(self), fields(dn = ?self.dn()))]
    pub async fn refresh(&mut self) -> DirectoryResult<()> {
        let dn = self.require_dn("refresh")?;

        let mut entry = self
            .connection
            .read(&dn, MATCH_ANY_FILTER, &[])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DirectoryError::ObjectNotFound { dn: dn.clone() })?;

        if entry.dn().is_none() {
            entry.set_dn(dn);
        }
        self.store.load(entry);
        Ok(())
    }

    // Single-attribute commits

    async fn commit_single(
        &mut self,
        operation: &str,
        delta: AttributeDelta,
    ) -> DirectoryResult<()> {
        let dn = self.require_persisted(operation)?;

        if delta.values().is_some_and(<[String]>::is_empty) {
            return Err(DirectoryError::validation(format!(
                "cannot {operation}: '{}' needs at least one value",
                delta.attribute()
            )));
        }

        self.connection
            .modify_batch(&dn, slice::from_ref(&delta))
            .await?;
        self.store.apply_committed(&delta);

        debug!(dn = %dn, attribute = delta.attribute(), "Attribute committed");
        Ok(())
    }

    /// Add a new attribute directly, without diffing the entry.
    #[instrument(skip(self, values), fields(dn = ?self.dn()))]
    pub async fn create_attribute(
        &mut self,
        attribute: &str,
        values: Vec<String>,
    ) -> DirectoryResult<()> {
        self.commit_single("create attribute", changeset::create_attribute(attribute, values))
            .await
    }

    /// Replace one attribute directly, without diffing the entry.
    #[instrument(skip(self, values), fields(dn = ?self.dn()))]
    pub async fn update_attribute(
        &mut self,
        attribute: &str,
        values: Vec<String>,
    ) -> DirectoryResult<()> {
        self.commit_single("update attribute", changeset::update_attribute(attribute, values))
            .await
    }

    /// Remove one attribute directly, without diffing the entry.
    #[instrument(skip(self), fields(dn = ?self.dn()))]
    pub async fn delete_attribute(&mut self, attribute: &str) -> DirectoryResult<()> {
        self.commit_single("delete attribute", changeset::delete_attribute(attribute))
            .await
    }

    /// Set the entry's password through the schema's unicode-password attribute.
    #[instrument(skip(self, password), fields(dn = ?self.dn()))]
    pub async fn set_password(&self, password: &str) -> DirectoryResult<()> {
        let dn = self.require_persisted("set password")?;

        self.connection
            .replace_binary(
                &dn,
                &self.schema.unicode_password,
                vec![codec::encode_password(password)],
            )
            .await?;

        info!(dn = %dn, "Password replaced");
        Ok(())
    }
}

impl fmt::Debug for DirectoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryEntry")
            .field("dn", &self.dn())
            .field("exists", &self.exists())
            .field("base_dn", &self.base_dn)
            .field("attributes", &self.store.current().len())
            .finish()
    }
}
