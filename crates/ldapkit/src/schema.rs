//! Directory schema attribute names
//!
//! Maps the logical attributes the entry facade reads and writes onto the
//! names a particular directory uses. A schema is handed to each entry
//! explicitly; there is no process-wide default.

use serde::{Deserialize, Serialize};

/// Attribute names for one kind of directory server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    /// Common name; also the naming attribute for synthesized DNs.
    #[serde(default = "default_common_name")]
    pub common_name: String,

    /// Relative display name of the entry.
    #[serde(default = "default_name")]
    pub name: String,

    #[serde(default = "default_display_name")]
    pub display_name: String,

    #[serde(default = "default_description")]
    pub description: String,

    /// Object class list.
    #[serde(default = "default_object_class")]
    pub object_class: String,

    /// Logon name (`sAMAccountName` on Active Directory, `uid` elsewhere).
    #[serde(default = "default_account_name")]
    pub account_name: String,

    #[serde(default = "default_given_name")]
    pub given_name: String,

    #[serde(default = "default_surname")]
    pub surname: String,

    /// Operational attribute holding the entry's own DN.
    #[serde(default = "default_distinguished_name")]
    pub distinguished_name: String,

    /// Write-only password attribute taking [`crate::codec::encode_password`] output.
    #[serde(default = "default_unicode_password")]
    pub unicode_password: String,

    /// Binary security identifier attribute.
    #[serde(default = "default_object_sid")]
    pub object_sid: String,
}

fn default_common_name() -> String {
    "cn".to_string()
}

fn default_name() -> String {
    "name".to_string()
}

fn default_display_name() -> String {
    "displayname".to_string()
}

fn default_description() -> String {
    "description".to_string()
}

fn default_object_class() -> String {
    "objectclass".to_string()
}

fn default_account_name() -> String {
    "samaccountname".to_string()
}

fn default_given_name() -> String {
    "givenname".to_string()
}

fn default_surname() -> String {
    "sn".to_string()
}

fn default_distinguished_name() -> String {
    "distinguishedname".to_string()
}

fn default_unicode_password() -> String {
    "unicodepwd".to_string()
}

fn default_object_sid() -> String {
    "objectsid".to_string()
}

impl Schema {
    /// Attribute names used by Active Directory.
    pub fn active_directory() -> Self {
        Self {
            common_name: default_common_name(),
            name: default_name(),
            display_name: default_display_name(),
            description: default_description(),
            object_class: default_object_class(),
            account_name: default_account_name(),
            given_name: default_given_name(),
            surname: default_surname(),
            distinguished_name: default_distinguished_name(),
            unicode_password: default_unicode_password(),
            object_sid: default_object_sid(),
        }
    }

    /// Attribute names used by OpenLDAP's `inetOrgPerson` schema.
    pub fn openldap() -> Self {
        Self {
            name: "cn".to_string(),
            account_name: "uid".to_string(),
            distinguished_name: "entrydn".to_string(),
            unicode_password: "userpassword".to_string(),
            object_sid: "sambasid".to_string(),
            ..Self::active_directory()
        }
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::active_directory()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_active_directory() {
        let schema = Schema::default();
        assert_eq!(schema, Schema::active_directory());
        assert_eq!(schema.common_name, "cn");
        assert_eq!(schema.account_name, "samaccountname");
        assert_eq!(schema.unicode_password, "unicodepwd");
    }

    #[test]
    fn test_openldap_overrides() {
        let schema = Schema::openldap();
        assert_eq!(schema.account_name, "uid");
        assert_eq!(schema.common_name, "cn");
        assert_eq!(schema.surname, "sn");
    }

    #[test]
    fn test_partial_deserialization_uses_defaults() {
        let schema: Schema = serde_json::from_str(r#"{ "account_name": "uid" }"#).unwrap();
        assert_eq!(schema.account_name, "uid");
        assert_eq!(schema.common_name, "cn");
        assert_eq!(schema.object_sid, "objectsid");
    }
}
