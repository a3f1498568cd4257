//! Directory connection collaborator
//!
//! The transport seam between entries and a directory server. Each method
//! is one request; implementations own connecting, binding, timeouts and
//! release of the underlying connection.

use async_trait::async_trait;

use crate::attributes::RawAttributeSet;
use crate::changeset::AttributeDelta;
use crate::error::DirectoryResult;

/// Filter matching any entry, used to read an entry back by DN.
pub const MATCH_ANY_FILTER: &str = "(objectclass=*)";

/// Requests an entry needs from a directory server.
///
/// Failures are returned as transport errors and are never retried here.
#[async_trait]
pub trait DirectoryConnection: Send + Sync {
    /// Add a new entry at `dn` with the given attributes.
    async fn add(&self, dn: &str, attributes: &RawAttributeSet) -> DirectoryResult<()>;

    /// Read the entry at `dn` (base scope).
    ///
    /// An empty `attributes` list requests all user attributes. A missing
    /// entry yields an empty result rather than an error.
    async fn read(
        &self,
        dn: &str,
        filter: &str,
        attributes: &[String],
    ) -> DirectoryResult<Vec<RawAttributeSet>>;

    /// Apply modifications to the entry at `dn` in one request.
    async fn modify_batch(&self, dn: &str, modifications: &[AttributeDelta])
        -> DirectoryResult<()>;

    /// Replace an attribute with binary values.
    async fn replace_binary(
        &self,
        dn: &str,
        attribute: &str,
        values: Vec<Vec<u8>>,
    ) -> DirectoryResult<()>;

    /// Delete the entry at `dn`.
    async fn delete(&self, dn: &str) -> DirectoryResult<()>;

    /// Rename and/or move the entry at `dn`.
    async fn rename(
        &self,
        dn: &str,
        new_rdn: &str,
        new_parent_dn: Option<&str>,
        delete_old_rdn: bool,
    ) -> DirectoryResult<()>;
}
