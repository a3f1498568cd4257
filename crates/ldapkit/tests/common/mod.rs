//! Shared helpers for ldapkit integration tests.
//!
//! Provides a recording in-memory `DirectoryConnection` and logging setup.

#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};

use ldapkit::async_trait;
use ldapkit::prelude::*;

static INIT: Once = Once::new();

/// Initialize logging for tests (once).
pub fn init_test_logging() {
    INIT.call_once(|| {
        if std::env::var("RUST_LOG").is_ok() {
            tracing_subscriber::fmt()
                .with_test_writer()
                .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
                .try_init()
                .ok();
        }
    });
}

/// One request received by [`MockConnection`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Add {
        dn: String,
        attributes: RawAttributeSet,
    },
    Read {
        dn: String,
        filter: String,
        attributes: Vec<String>,
    },
    ModifyBatch {
        dn: String,
        modifications: Vec<AttributeDelta>,
    },
    ReplaceBinary {
        dn: String,
        attribute: String,
        values: Vec<Vec<u8>>,
    },
    Delete {
        dn: String,
    },
    Rename {
        dn: String,
        new_rdn: String,
        new_parent_dn: Option<String>,
        delete_old_rdn: bool,
    },
}

/// Records every request and answers reads from a canned result.
#[derive(Default)]
pub struct MockConnection {
    calls: Mutex<Vec<Call>>,
    read_result: Mutex<Vec<RawAttributeSet>>,
    failing: AtomicBool,
    failing_reads: AtomicBool,
}

impl MockConnection {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// A connection whose reads return `entries`.
    pub fn returning(entries: Vec<RawAttributeSet>) -> Arc<Self> {
        let connection = Self::default();
        *connection.read_result.lock().unwrap() = entries;
        Arc::new(connection)
    }

    /// Make every subsequent request fail with a transport error.
    pub fn fail(&self) {
        self.failing.store(true, Ordering::SeqCst);
    }

    /// Make every subsequent read fail while other requests succeed.
    pub fn fail_reads(&self) {
        self.failing_reads.store(true, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: Call) -> DirectoryResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(DirectoryError::operation_failed(
                "LDAP request failed with code 52: unavailable",
            ));
        }
        Ok(())
    }
}

#[async_trait]
impl DirectoryConnection for MockConnection {
    async fn add(&self, dn: &str, attributes: &RawAttributeSet) -> DirectoryResult<()> {
        self.record(Call::Add {
            dn: dn.to_string(),
            attributes: attributes.clone(),
        })
    }

    async fn read(
        &self,
        dn: &str,
        filter: &str,
        attributes: &[String],
    ) -> DirectoryResult<Vec<RawAttributeSet>> {
        self.record(Call::Read {
            dn: dn.to_string(),
            filter: filter.to_string(),
            attributes: attributes.to_vec(),
        })?;
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(DirectoryError::connection_failed("connection reset during read"));
        }
        Ok(self.read_result.lock().unwrap().clone())
    }

    async fn modify_batch(
        &self,
        dn: &str,
        modifications: &[AttributeDelta],
    ) -> DirectoryResult<()> {
        self.record(Call::ModifyBatch {
            dn: dn.to_string(),
            modifications: modifications.to_vec(),
        })
    }

    async fn replace_binary(
        &self,
        dn: &str,
        attribute: &str,
        values: Vec<Vec<u8>>,
    ) -> DirectoryResult<()> {
        self.record(Call::ReplaceBinary {
            dn: dn.to_string(),
            attribute: attribute.to_string(),
            values,
        })
    }

    async fn delete(&self, dn: &str) -> DirectoryResult<()> {
        self.record(Call::Delete { dn: dn.to_string() })
    }

    async fn rename(
        &self,
        dn: &str,
        new_rdn: &str,
        new_parent_dn: Option<&str>,
        delete_old_rdn: bool,
    ) -> DirectoryResult<()> {
        self.record(Call::Rename {
            dn: dn.to_string(),
            new_rdn: new_rdn.to_string(),
            new_parent_dn: new_parent_dn.map(str::to_string),
            delete_old_rdn,
        })
    }
}

/// A fresh entry bound to `connection` with the Active Directory schema.
pub fn new_entry(connection: &Arc<MockConnection>) -> DirectoryEntry {
    init_test_logging();
    DirectoryEntry::new(connection.clone(), Arc::new(Schema::active_directory()))
}

/// Convert string literals into an owned value list.
pub fn values(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
