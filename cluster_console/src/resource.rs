/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Typed views over remote objects.
//!
//! The remote collaborator hands back untyped JSON. Everything the
//! engine inspects (identity, owner references, labels, selectors) is
//! decoded here into typed structs, and a failed decode is reported as
//! a [`DecodeError`] rather than silently producing defaults.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::identity::ResourceId;

/// Failure to turn a remote object into a typed value.
#[derive(thiserror::Error, Debug)]
pub enum DecodeError {
    /// The JSON did not have the expected shape.
    #[error("failed to decode {what}: {source}")]
    Json {
        /// What was being decoded (kind or field).
        what: String,
        /// Underlying serde error.
        #[source]
        source: serde_json::Error,
    },

    /// The object decoded but carries no `metadata.name`.
    #[error("{0} object has no name")]
    MissingName(String),
}

/// Decode `value` as `T`, labelling failures with `what`.
pub fn decode<T: DeserializeOwned>(what: &str, value: Value) -> Result<T, DecodeError> {
    serde_json::from_value(value).map_err(|source| DecodeError::Json {
        what: what.to_string(),
        source,
    })
}

/// A declared relationship from a resource to its controlling parent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerReference {
    #[serde(default)]
    pub api_version: String,
    pub kind: String,
    pub name: String,
    #[serde(default)]
    pub controller: Option<bool>,
}

/// The subset of object metadata the engine relies on.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectMeta {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub namespace: Option<String>,
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    #[serde(default)]
    pub owner_references: Vec<OwnerReference>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LabelSelector {
    #[serde(default)]
    match_labels: BTreeMap<String, String>,
}

/// A decoded resource: typed metadata plus the raw spec and status.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Resource {
    #[serde(default)]
    pub kind: Option<String>,
    pub metadata: ObjectMeta,
    #[serde(default)]
    pub spec: Value,
    #[serde(default)]
    pub status: Value,
}

impl Resource {
    /// Decode a remote object of kind `what`.
    pub fn decode(what: &str, value: Value) -> Result<Self, DecodeError> {
        let resource: Resource = decode(what, value)?;
        if resource.metadata.name.is_empty() {
            return Err(DecodeError::MissingName(what.to_string()));
        }
        Ok(resource)
    }

    /// `namespace/name` identity of this resource.
    pub fn id(&self) -> ResourceId {
        ResourceId {
            namespace: self.metadata.namespace.clone(),
            name: self.metadata.name.clone(),
        }
    }

    /// Owner references in API order.
    pub fn owner_references(&self) -> &[OwnerReference] {
        &self.metadata.owner_references
    }

    /// `spec.selector.matchLabels`, empty when the object has no
    /// selector.
    pub fn match_labels(&self) -> Result<BTreeMap<String, String>, DecodeError> {
        match self.spec.get("selector") {
            None | Some(Value::Null) => Ok(BTreeMap::new()),
            Some(sel) => {
                let sel: LabelSelector = decode("spec.selector", sel.clone())?;
                Ok(sel.match_labels)
            }
        }
    }

    /// Integer at a dotted path under the object (e.g.
    /// `status.readyReplicas`); missing fields read as zero.
    pub fn int_at(&self, path: &str) -> i64 {
        self.value_at(path).and_then(Value::as_i64).unwrap_or(0)
    }

    /// String at a dotted path under the object.
    pub fn str_at(&self, path: &str) -> Option<&str> {
        self.value_at(path).and_then(Value::as_str)
    }

    fn value_at(&self, path: &str) -> Option<&Value> {
        let mut parts = path.split('.');
        let mut cur = match parts.next()? {
            "spec" => &self.spec,
            "status" => &self.status,
            _ => return None,
        };
        for part in parts {
            cur = cur.get(part)?;
        }
        Some(cur)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    // Owner references decode in API order.
    #[test]
    fn decodes_owner_references_in_order() {
        let rs = Resource::decode(
            "ReplicaSet",
            json!({
                "metadata": {
                    "name": "web-5d8f",
                    "namespace": "shop",
                    "ownerReferences": [
                        {"apiVersion": "apps/v1", "kind": "Deployment", "name": "web", "controller": true},
                        {"kind": "Other", "name": "x"}
                    ]
                }
            }),
        )
        .unwrap();
        assert_eq!(rs.id(), ResourceId::namespaced("shop", "web-5d8f"));
        let kinds: Vec<_> = rs.owner_references().iter().map(|o| o.kind.as_str()).collect();
        assert_eq!(kinds, ["Deployment", "Other"]);
        assert_eq!(rs.owner_references()[0].controller, Some(true));
    }

    // A wrongly shaped object is a decode error, not a default.
    #[test]
    fn bad_shape_is_decode_error() {
        let err = Resource::decode("ReplicaSet", json!({"metadata": "nope"})).unwrap_err();
        assert!(matches!(err, DecodeError::Json { .. }));
        assert!(err.to_string().contains("ReplicaSet"));

        let err = Resource::decode("ReplicaSet", json!({"metadata": {}})).unwrap_err();
        assert!(matches!(err, DecodeError::MissingName(_)));
    }

    // Selector and field helpers read nested values.
    #[test]
    fn reads_selector_and_fields() {
        let rs = Resource::decode(
            "ReplicaSet",
            json!({
                "metadata": {"name": "web-5d8f", "namespace": "shop"},
                "spec": {"replicas": 3, "selector": {"matchLabels": {"app": "web"}}},
                "status": {"readyReplicas": 2, "phase": "Running"}
            }),
        )
        .unwrap();
        assert_eq!(rs.match_labels().unwrap().get("app").map(String::as_str), Some("web"));
        assert_eq!(rs.int_at("spec.replicas"), 3);
        assert_eq!(rs.int_at("status.readyReplicas"), 2);
        assert_eq!(rs.int_at("status.availableReplicas"), 0);
        assert_eq!(rs.str_at("status.phase"), Some("Running"));
        assert_eq!(rs.str_at("metadata.name"), None);
    }
}
