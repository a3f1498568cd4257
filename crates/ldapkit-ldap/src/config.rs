//! LDAP connection configuration
//!
//! Configuration for reaching and binding to an LDAP / Active Directory
//! server.

use serde::{Deserialize, Serialize};

use ldapkit::error::{DirectoryError, DirectoryResult};
use ldapkit::schema::Schema;

/// Configuration for an LDAP provider.
#[derive(Clone, Serialize, Deserialize)]
pub struct LdapConfig {
    /// Domain controller host names, tried in order.
    pub domain_controllers: Vec<String>,

    /// LDAP server port (389 for LDAP, 636 for LDAPS).
    #[serde(default = "default_ldap_port")]
    pub port: u16,

    /// Use SSL/TLS (LDAPS).
    #[serde(default)]
    pub use_ssl: bool,

    /// Use STARTTLS upgrade on plain LDAP connection.
    #[serde(default)]
    pub use_starttls: bool,

    /// Base DN for all operations (e.g., "dc=corp,dc=org").
    pub base_dn: String,

    /// Administrator user name or DN used for the default bind.
    pub admin_username: String,

    /// Administrator password.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub admin_password: Option<String>,

    /// Suffix appended to bare user names when binding (e.g., "@corp.org").
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_suffix: Option<String>,

    /// Connection timeout in seconds.
    #[serde(default = "default_connection_timeout")]
    pub connection_timeout_secs: u64,

    /// Attribute names of the target directory.
    #[serde(default)]
    pub schema: Schema,
}

impl std::fmt::Debug for LdapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LdapConfig")
            .field("domain_controllers", &self.domain_controllers)
            .field("port", &self.port)
            .field("use_ssl", &self.use_ssl)
            .field("use_starttls", &self.use_starttls)
            .field("base_dn", &self.base_dn)
            .field("admin_username", &self.admin_username)
            .field(
                "admin_password",
                &self.admin_password.as_ref().map(|_| "***REDACTED***"),
            )
            .field("account_suffix", &self.account_suffix)
            .field("connection_timeout_secs", &self.connection_timeout_secs)
            .field("schema", &self.schema)
            .finish()
    }
}

fn default_ldap_port() -> u16 {
    389
}

fn default_connection_timeout() -> u64 {
    30
}

impl LdapConfig {
    /// Create a new LDAP config with required fields.
    pub fn new(
        domain_controller: impl Into<String>,
        base_dn: impl Into<String>,
        admin_username: impl Into<String>,
    ) -> Self {
        Self {
            domain_controllers: vec![domain_controller.into()],
            port: default_ldap_port(),
            use_ssl: false,
            use_starttls: false,
            base_dn: base_dn.into(),
            admin_username: admin_username.into(),
            admin_password: None,
            account_suffix: None,
            connection_timeout_secs: default_connection_timeout(),
            schema: Schema::default(),
        }
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> DirectoryResult<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| DirectoryError::InvalidConfiguration {
                message: format!("malformed LDAP configuration: {e}"),
            })?;
        config.validate()?;
        Ok(config)
    }

    /// Set administrator password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.admin_password = Some(password.into());
        self
    }

    /// Add a fallback domain controller.
    pub fn with_domain_controller(mut self, host: impl Into<String>) -> Self {
        self.domain_controllers.push(host.into());
        self
    }

    /// Set the account suffix for user binds.
    pub fn with_account_suffix(mut self, suffix: impl Into<String>) -> Self {
        self.account_suffix = Some(suffix.into());
        self
    }

    /// Use a different schema.
    pub fn with_schema(mut self, schema: Schema) -> Self {
        self.schema = schema;
        self
    }

    /// Enable SSL (LDAPS).
    #[must_use]
    pub fn with_ssl(mut self) -> Self {
        self.use_ssl = true;
        self.port = 636;
        self
    }

    /// Enable STARTTLS.
    #[must_use]
    pub fn with_starttls(mut self) -> Self {
        self.use_starttls = true;
        self
    }

    /// Whether traffic to the server is encrypted.
    pub fn is_encrypted(&self) -> bool {
        self.use_ssl || self.use_starttls
    }

    /// Get the LDAP URL for one domain controller.
    #[must_use]
    pub fn url_for(&self, host: &str) -> String {
        let scheme = if self.use_ssl { "ldaps" } else { "ldap" };
        format!("{}://{}:{}", scheme, host, self.port)
    }

    /// The bind name for a user.
    ///
    /// DNs (`...=...`) and UPNs (`...@...`) are used as given; bare names
    /// get the account suffix appended.
    pub fn bind_name(&self, username: &str) -> String {
        if username.contains('=') || username.contains('@') {
            return username.to_string();
        }
        match &self.account_suffix {
            Some(suffix) => format!("{username}{suffix}"),
            None => username.to_string(),
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.domain_controllers.iter().all(|h| h.trim().is_empty()) {
            return Err(DirectoryError::InvalidConfiguration {
                message: "at least one domain controller is required".to_string(),
            });
        }

        if self.base_dn.trim().is_empty() {
            return Err(DirectoryError::InvalidConfiguration {
                message: "base_dn is required".to_string(),
            });
        }

        if self.admin_username.trim().is_empty() {
            return Err(DirectoryError::InvalidConfiguration {
                message: "admin_username is required".to_string(),
            });
        }

        if self.use_ssl && self.use_starttls {
            return Err(DirectoryError::InvalidConfiguration {
                message: "cannot use both SSL and STARTTLS".to_string(),
            });
        }

        Ok(())
    }

    /// Create a redacted version of this config (for logging/display).
    #[must_use]
    pub fn redacted(&self) -> Self {
        let mut config = self.clone();
        if config.admin_password.is_some() {
            config.admin_password = Some("***REDACTED***".to_string());
        }
        config
    }
}
