//! Directory provider
//!
//! Connects to the first reachable domain controller, binds, and hands out
//! [`DirectoryEntry`] values backed by the shared connection.

use std::sync::Arc;
use std::time::Duration;

use ldap3::{Ldap, LdapConnAsync, LdapConnSettings, Scope};
use tracing::{debug, info, instrument, warn};

use ldapkit::attributes::RawAttributeSet;
use ldapkit::connection::{DirectoryConnection, MATCH_ANY_FILTER};
use ldapkit::entry::DirectoryEntry;
use ldapkit::error::{DirectoryError, DirectoryResult};
use ldapkit::schema::Schema;

use crate::config::LdapConfig;
use crate::connection::{map_result_code, LdapConnection};

/// A bound connection to a directory plus the configuration it came from.
pub struct Provider {
    config: LdapConfig,
    schema: Arc<Schema>,
    host: String,
    connection: Arc<LdapConnection>,
}

impl Provider {
    /// Connect to the first reachable domain controller and bind as the
    /// configured administrator.
    #[instrument(skip(config), fields(base_dn = %config.base_dn))]
    pub async fn connect(config: LdapConfig) -> DirectoryResult<Self> {
        config.validate()?;

        let hosts: Vec<String> = config
            .domain_controllers
            .iter()
            .filter(|h| !h.trim().is_empty())
            .cloned()
            .collect();

        let mut last_error = None;
        for host in hosts {
            match open(&config, &host).await {
                Ok(ldap) => {
                    let connection = LdapConnection::new(
                        ldap,
                        config.is_encrypted(),
                        config.schema.object_sid.clone(),
                    );
                    let provider = Self {
                        schema: Arc::new(config.schema.clone()),
                        host,
                        connection: Arc::new(connection),
                        config,
                    };
                    provider.bind_as_administrator().await?;
                    info!(host = %provider.host, "Directory provider connected");
                    return Ok(provider);
                }
                Err(e) => {
                    warn!(host = %host, error = %e, "Domain controller unreachable");
                    last_error = Some(e);
                }
            }
        }

        Err(last_error
            .unwrap_or_else(|| DirectoryError::connection_failed("no domain controller reachable")))
    }

    /// The configuration this provider was built from.
    pub fn config(&self) -> &LdapConfig {
        &self.config
    }

    /// The domain controller in use.
    pub fn host(&self) -> &str {
        &self.host
    }

    /// The schema handed to every entry.
    pub fn schema(&self) -> Arc<Schema> {
        Arc::clone(&self.schema)
    }

    /// The shared connection.
    pub fn connection(&self) -> Arc<LdapConnection> {
        Arc::clone(&self.connection)
    }

    /// Bind with the configured administrator credentials.
    pub async fn bind_as_administrator(&self) -> DirectoryResult<()> {
        let password = self.config.admin_password.as_deref().unwrap_or("");
        self.bind(&self.config.admin_username, password).await
    }

    /// Bind with the given credentials.
    ///
    /// Bare user names get the configured account suffix.
    #[instrument(skip(self, password))]
    pub async fn bind(&self, username: &str, password: &str) -> DirectoryResult<()> {
        let bind_name = self.config.bind_name(username);
        debug!(bind_name = %bind_name, "Performing LDAP bind");

        let mut ldap = self.connection.handle();
        let result = ldap.simple_bind(&bind_name, password).await.map_err(|e| {
            DirectoryError::connection_failed_with_source(
                format!("LDAP bind failed for {bind_name}"),
                e,
            )
        })?;

        map_result_code(result.rc, &result.text, &bind_name, "bind")
    }

    /// Check user credentials.
    ///
    /// Returns `false` for invalid credentials. The administrator binding is
    /// restored afterwards whatever the outcome.
    #[instrument(skip(self, password))]
    pub async fn authenticate(&self, username: &str, password: &str) -> DirectoryResult<bool> {
        if username.is_empty() || password.is_empty() {
            // An empty password is an anonymous bind and always succeeds
            return Ok(false);
        }

        let outcome = match self.bind(username, password).await {
            Ok(()) => Ok(true),
            Err(DirectoryError::AuthenticationFailed) => Ok(false),
            Err(e) => Err(e),
        };

        self.bind_as_administrator().await?;
        debug!(
            username = %username,
            authenticated = ?outcome.as_ref().ok(),
            "Authentication checked"
        );
        outcome
    }

    /// A new, unsaved entry under the configured base DN.
    pub fn make_entry(&self) -> DirectoryEntry {
        let connection: Arc<dyn DirectoryConnection> = self.connection.clone();
        DirectoryEntry::new(connection, self.schema()).with_base_dn(&self.config.base_dn)
    }

    fn load_entry(&self, attributes: RawAttributeSet) -> DirectoryEntry {
        let mut entry = self.make_entry();
        entry.set_raw_attributes(attributes);
        entry
    }

    /// Load the entry at `dn`, or `None` if it does not exist.
    #[instrument(skip(self))]
    pub async fn find(&self, dn: &str) -> DirectoryResult<Option<DirectoryEntry>> {
        let mut entries = self.connection.read(dn, MATCH_ANY_FILTER, &[]).await?;
        if entries.is_empty() {
            return Ok(None);
        }

        Ok(Some(self.load_entry(entries.swap_remove(0))))
    }

    /// Search below the base DN.
    #[instrument(skip(self))]
    pub async fn search(
        &self,
        filter: &str,
        attributes: &[String],
    ) -> DirectoryResult<Vec<DirectoryEntry>> {
        let sets = self
            .connection
            .search(&self.config.base_dn, Scope::Subtree, filter, attributes)
            .await?;

        Ok(sets
            .into_iter()
            .map(|set| self.load_entry(set))
            .collect())
    }

    /// Read the root DSE.
    pub async fn root_dse(&self) -> DirectoryResult<RawAttributeSet> {
        let attributes = vec!["*".to_string(), "+".to_string()];
        let mut entries = self
            .connection
            .search("", Scope::Base, MATCH_ANY_FILTER, &attributes)
            .await?;

        if entries.is_empty() {
            return Err(DirectoryError::ObjectNotFound {
                dn: "root DSE".to_string(),
            });
        }
        Ok(entries.swap_remove(0))
    }

    /// Change a user's password, proving the old one.
    pub async fn change_password(
        &self,
        dn: &str,
        old_password: &str,
        new_password: &str,
    ) -> DirectoryResult<()> {
        self.connection
            .change_password(dn, &self.schema.unicode_password, old_password, new_password)
            .await
    }

    /// Unbind and close the connection.
    ///
    /// Dropping the provider without calling this also ends the connection
    /// once every entry holding it is gone.
    pub async fn close(self) -> DirectoryResult<()> {
        let mut ldap = self.connection.handle();
        if let Err(e) = ldap.unbind().await {
            warn!(error = %e, "Error during LDAP unbind");
        }
        info!(host = %self.host, "Directory provider closed");
        Ok(())
    }
}

impl std::fmt::Debug for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provider")
            .field("host", &self.host)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Open an unbound connection to one domain controller.
async fn open(config: &LdapConfig, host: &str) -> DirectoryResult<Ldap> {
    let url = config.url_for(host);
    debug!(url = %url, "Connecting to LDAP server");

    let settings = LdapConnSettings::new()
        .set_conn_timeout(Duration::from_secs(config.connection_timeout_secs))
        .set_starttls(config.use_starttls);

    let (conn, ldap) = LdapConnAsync::with_settings(settings, &url)
        .await
        .map_err(|e| {
            DirectoryError::connection_failed_with_source(
                format!("Failed to connect to LDAP server at {url}"),
                e,
            )
        })?;

    tokio::spawn(async move {
        if let Err(e) = conn.drive().await {
            warn!(error = %e, "LDAP connection driver error");
        }
    });

    Ok(ldap)
}
