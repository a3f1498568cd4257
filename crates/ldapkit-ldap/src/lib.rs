//! # ldapkit-ldap
//!
//! LDAP / Active Directory backend for `ldapkit` entries, built on `ldap3`.
//!
//! ## Features
//!
//! - Failover across an ordered list of domain controllers
//! - SSL/TLS and STARTTLS
//! - Administrator and per-user binds
//! - `unicodePwd` resets and changes over encrypted connections
//! - Binary `objectSid` values rendered as textual SIDs
//!
//! ## Example
//!
//! ```ignore
//! use ldapkit_ldap::{LdapConfig, Provider};
//!
//! let config = LdapConfig::new("dc1.corp.org", "dc=corp,dc=org", "admin")
//!     .with_password("secret")
//!     .with_account_suffix("@corp.org")
//!     .with_ssl();
//!
//! let provider = Provider::connect(config).await?;
//! if provider.authenticate("jdoe", "hunter2").await? {
//!     let mut entry = provider.make_entry();
//!     entry.set_common_name("John Doe");
//!     entry.create().await?;
//! }
//! provider.close().await?;
//! ```

pub mod config;
pub mod connection;
pub mod password;
pub mod provider;

// Re-exports
pub use config::LdapConfig;
pub use connection::LdapConnection;
pub use provider::Provider;
