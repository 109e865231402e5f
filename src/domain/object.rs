//! Namespaced identities and shared object metadata.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// The resource kinds certsync watches and manipulates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    Ingress,
    Secret,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Ingress => write!(f, "Ingress"),
            ResourceKind::Secret => write!(f, "Secret"),
        }
    }
}

/// A (namespace, name) identity. Renders as `namespace/name`, the form used
/// in log lines and admission reasons.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectKey {
    pub namespace: String,
    pub name: String,
}

impl ObjectKey {
    /// Create a new key from a namespace and name.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self { namespace: namespace.into(), name: name.into() }
    }
}

impl fmt::Display for ObjectKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Metadata shared by all stored objects.
///
/// `resource_version` is the store's optimistic-concurrency token. The wire
/// form is a string (matching the upstream API convention); internally it is
/// numeric so the development store can increment it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub namespace: String,

    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub labels: BTreeMap<String, String>,

    #[serde(default, with = "resource_version_serde")]
    pub resource_version: u64,
}

impl ObjectMeta {
    /// Create metadata for a namespaced object.
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
            labels: BTreeMap::new(),
            resource_version: 0,
        }
    }

    /// The (namespace, name) identity of this object.
    pub fn key(&self) -> ObjectKey {
        ObjectKey::new(&self.namespace, &self.name)
    }
}

/// Accepts both the string form sent on the wire and a bare integer, and
/// always serializes back to a string.
mod resource_version_serde {
    use std::fmt;

    use serde::de::{self, Visitor};
    use serde::{Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        struct VersionVisitor;

        impl Visitor<'_> for VersionVisitor {
            type Value = u64;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a resource version as a string or integer")
            }

            fn visit_u64<E: de::Error>(self, value: u64) -> Result<u64, E> {
                Ok(value)
            }

            fn visit_str<E: de::Error>(self, value: &str) -> Result<u64, E> {
                value.parse().map_err(de::Error::custom)
            }
        }

        deserializer.deserialize_any(VersionVisitor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_key_display() {
        let key = ObjectKey::new("target", "tls-example-io");
        assert_eq!(key.to_string(), "target/tls-example-io");
    }

    #[test]
    fn test_metadata_key() {
        let meta = ObjectMeta::new("source", "tls-example-io");
        assert_eq!(meta.key(), ObjectKey::new("source", "tls-example-io"));
        assert_eq!(meta.resource_version, 0);
    }

    #[test]
    fn test_resource_version_wire_forms() {
        let from_string: ObjectMeta =
            serde_json::from_str(r#"{"name": "a", "resourceVersion": "7"}"#).unwrap();
        assert_eq!(from_string.resource_version, 7);

        let from_number: ObjectMeta =
            serde_json::from_str(r#"{"name": "a", "resourceVersion": 7}"#).unwrap();
        assert_eq!(from_number.resource_version, 7);

        let absent: ObjectMeta = serde_json::from_str(r#"{"name": "a"}"#).unwrap();
        assert_eq!(absent.resource_version, 0);

        let json = serde_json::to_value(&from_string).unwrap();
        assert_eq!(json["resourceVersion"], "7");
    }
}
