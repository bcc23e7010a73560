//! Named values with a declared at-rest representation.
//!
//! A [`ConfigProperty`] only records the *intent* (plain or encrypted)
//! next to its value. Turning an encrypted value into its stored form is the
//! job of a [`SecretsBackend`] supplied at render time.

use super::errors::DslError;
use crate::validation::{Validate, ValidationContext, rules};
use serde::ser::{SerializeStruct, Serializer};
use serde::Serialize;
use std::fmt;

/// Representation intent of a property
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PropertyKind {
    /// Stored as-is
    Plain,
    /// Stored encrypted
    Encrypted,
}

/// A key/value pair tagged with its representation intent
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigProperty {
    /// Value stored in clear text
    Plain {
        /// Property key
        key: String,
        /// Raw value
        value: String,
    },
    /// Value stored encrypted
    Encrypted {
        /// Property key
        key: String,
        /// Raw value
        value: String,
    },
}

impl ConfigProperty {
    /// Creates a plain property.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `key` is empty.
    pub fn plain(key: impl Into<String>, value: impl Into<String>) -> Result<Self, DslError> {
        Self::new(key, value, false)
    }

    /// Creates an encrypted property.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `key` is empty.
    pub fn encrypted(key: impl Into<String>, value: impl Into<String>) -> Result<Self, DslError> {
        Self::new(key, value, true)
    }

    /// Creates a property of either kind.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::InvalidConfig`] if `key` is empty.
    pub fn new(
        key: impl Into<String>,
        value: impl Into<String>,
        encrypted: bool,
    ) -> Result<Self, DslError> {
        let key = key.into();
        if key.is_empty() {
            return Err(DslError::invalid("key", "property key cannot be empty"));
        }
        let value = value.into();
        Ok(if encrypted {
            Self::Encrypted { key, value }
        } else {
            Self::Plain { key, value }
        })
    }

    /// Exact key match.
    #[must_use]
    pub fn is(&self, key: &str) -> bool {
        self.key() == key
    }

    /// Property key.
    #[must_use]
    pub fn key(&self) -> &str {
        match self {
            Self::Plain { key, .. } | Self::Encrypted { key, .. } => key,
        }
    }

    /// Stored value, verbatim.
    #[must_use]
    pub fn value(&self) -> &str {
        match self {
            Self::Plain { value, .. } | Self::Encrypted { value, .. } => value,
        }
    }

    /// Representation intent.
    #[must_use]
    pub fn kind(&self) -> PropertyKind {
        match self {
            Self::Plain { .. } => PropertyKind::Plain,
            Self::Encrypted { .. } => PropertyKind::Encrypted,
        }
    }

    /// Returns true for [`ConfigProperty::Encrypted`].
    #[must_use]
    pub fn is_encrypted(&self) -> bool {
        matches!(self, Self::Encrypted { .. })
    }

    /// Asks `backend` for the at-rest form of this value.
    ///
    /// # Errors
    ///
    /// Propagates whatever the backend reports.
    pub fn at_rest<B>(&self, backend: &B) -> Result<String, DslError>
    where
        B: SecretsBackend + ?Sized,
    {
        backend.at_rest(self.kind(), self.key(), self.value())
    }

    pub(crate) fn set_value(&mut self, new_value: String) {
        match self {
            Self::Plain { value, .. } | Self::Encrypted { value, .. } => *value = new_value,
        }
    }

    /// Serializes with a caller-chosen name for the key field.
    pub(crate) fn serialize_as<S: Serializer>(
        &self,
        serializer: S,
        name: &'static str,
        key_field: &'static str,
    ) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct(name, 2)?;
        state.serialize_field(key_field, self.key())?;
        match self {
            Self::Plain { value, .. } => state.serialize_field("value", value)?,
            Self::Encrypted { value, .. } => state.serialize_field("encrypted_value", value)?,
        }
        state.end()
    }
}

impl Serialize for ConfigProperty {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.serialize_as(serializer, "ConfigProperty", "key")
    }
}

impl Validate for ConfigProperty {
    fn validate(&self, ctx: &mut ValidationContext) {
        rules::check_required(ctx, "key", self.key());
    }
}

impl fmt::Display for ConfigProperty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Plain { key, value } => write!(f, "{key}={value}"),
            Self::Encrypted { key, .. } => write!(f, "{key}=***"),
        }
    }
}

/// Finds the entry whose key is `key`, if any
#[must_use]
pub fn find<'a>(properties: &'a [ConfigProperty], key: &str) -> Option<&'a ConfigProperty> {
    properties.iter().find(|property| property.is(key))
}

/// Turns a raw property value into its at-rest representation
pub trait SecretsBackend {
    /// Returns the stored form of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`DslError::Secrets`] if the value cannot be stored.
    fn at_rest(&self, kind: PropertyKind, key: &str, value: &str) -> Result<String, DslError>;
}

/// Backend that stores every value unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct Passthrough;

impl SecretsBackend for Passthrough {
    fn at_rest(&self, _kind: PropertyKind, _key: &str, value: &str) -> Result<String, DslError> {
        Ok(value.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    struct Reverse;

    impl SecretsBackend for Reverse {
        fn at_rest(&self, kind: PropertyKind, _key: &str, value: &str) -> Result<String, DslError> {
            Ok(match kind {
                PropertyKind::Plain => value.to_string(),
                PropertyKind::Encrypted => value.chars().rev().collect(),
            })
        }
    }

    #[test]
    fn test_empty_key_is_rejected() {
        let err = ConfigProperty::plain("", "x").unwrap_err();
        assert!(matches!(err, DslError::InvalidConfig { .. }));
        assert!(ConfigProperty::encrypted("", "x").is_err());
    }

    #[test]
    fn test_accessors() {
        let plain = ConfigProperty::plain("URL", "https://example.com").unwrap();
        let secret = ConfigProperty::encrypted("TOKEN", "AES:abc").unwrap();

        assert_eq!(plain.key(), "URL");
        assert_eq!(plain.value(), "https://example.com");
        assert_eq!(plain.kind(), PropertyKind::Plain);
        assert!(!plain.is_encrypted());

        assert_eq!(secret.value(), "AES:abc");
        assert_eq!(secret.kind(), PropertyKind::Encrypted);
        assert!(secret.is_encrypted());
    }

    #[test]
    fn test_find() {
        let properties = vec![
            ConfigProperty::plain("a", "1").unwrap(),
            ConfigProperty::encrypted("b", "2").unwrap(),
        ];
        assert_eq!(find(&properties, "b").map(ConfigProperty::value), Some("2"));
        assert!(find(&properties, "c").is_none());
        assert!(find(&properties, "").is_none());
    }

    #[test]
    fn test_serialize_wire_shape() {
        let plain = ConfigProperty::plain("Image", "alpine").unwrap();
        let secret = ConfigProperty::encrypted("Password", "AES:xyz").unwrap();

        assert_eq!(
            serde_json::to_value(&plain).unwrap(),
            serde_json::json!({"key": "Image", "value": "alpine"})
        );
        assert_eq!(
            serde_json::to_value(&secret).unwrap(),
            serde_json::json!({"key": "Password", "encrypted_value": "AES:xyz"})
        );
    }

    #[test]
    fn test_display_masks_encrypted() {
        let secret = ConfigProperty::encrypted("TOKEN", "s3cr3t").unwrap();
        assert_eq!(secret.to_string(), "TOKEN=***");
        assert!(!secret.to_string().contains("s3cr3t"));
    }

    #[test]
    fn test_at_rest_uses_backend() {
        let plain = ConfigProperty::plain("A", "abc").unwrap();
        let secret = ConfigProperty::encrypted("B", "abc").unwrap();

        assert_eq!(plain.at_rest(&Reverse).unwrap(), "abc");
        assert_eq!(secret.at_rest(&Reverse).unwrap(), "cba");
        assert_eq!(secret.at_rest(&Passthrough).unwrap(), "abc");
        // value() never changes, whatever the backend does
        assert_eq!(secret.value(), "abc");
    }

    proptest! {
        #[test]
        fn prop_is_matches_only_the_stored_key(
            key in "[A-Za-z0-9_]{1,12}",
            candidate in "[A-Za-z0-9_]{0,12}",
            encrypted in any::<bool>(),
        ) {
            let property = ConfigProperty::new(key.clone(), "v", encrypted).unwrap();
            prop_assert!(property.is(&key));
            prop_assert_eq!(property.is(&candidate), candidate == key);
        }
    }
}
