//! # ldapkit
//!
//! Client-side records for directory (LDAP / Active Directory) entries.
//!
//! Entries are held in memory as an original snapshot plus a mutable
//! current state. Changes are diffed into the ordered add/replace/remove
//! list a batch modify expects, and committed through a
//! [`DirectoryConnection`] supplied by the caller.
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use ldapkit::prelude::*;
//!
//! let mut entry = DirectoryEntry::new(connection, Arc::new(Schema::active_directory()))
//!     .with_base_dn("ou=Accounting,dc=corp,dc=org");
//!
//! entry.set_common_name("John Doe");
//! entry.set("givenname", ["John"]);
//! entry.create().await?;
//!
//! entry.set("title", ["Accountant"]);
//! entry.update().await?;
//! ```
//!
//! ## Crate Organization
//!
//! - [`codec`] - Filter/DN escaping, unescaping, `unicodePwd` encoding
//! - [`dn`] - Distinguished name decomposition
//! - [`sid`] - Security identifier validation and parsing
//! - [`attributes`] - Case-insensitive, ordered raw attribute sets
//! - [`store`] - Original and current attribute snapshots
//! - [`changeset`] - Snapshot diffing into ordered modifications
//! - [`connection`] - The directory connection trait
//! - [`entry`] - Create/update/delete/move orchestration
//! - [`schema`] - Attribute names per directory flavour
//! - [`error`] - Error types

pub mod attributes;
pub mod changeset;
pub mod codec;
pub mod connection;
pub mod dn;
pub mod entry;
pub mod error;
pub mod schema;
pub mod sid;
pub mod store;

/// Prelude module for convenient imports.
///
/// ```
/// use ldapkit::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attributes::{RawAttributeSet, DN_KEY};
    pub use crate::changeset::{diff, AttributeDelta, ModType};
    pub use crate::codec::{encode_password, escape, unescape, EscapeContext};
    pub use crate::connection::{DirectoryConnection, MATCH_ANY_FILTER};
    pub use crate::dn::explode_dn;
    pub use crate::entry::DirectoryEntry;
    pub use crate::error::{DirectoryError, DirectoryResult};
    pub use crate::schema::Schema;
    pub use crate::sid::{is_valid_sid, SecurityIdentifier};
    pub use crate::store::AttributeStore;
}

// Re-export async_trait for connection implementors
pub use async_trait::async_trait;
