/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Identities used to address resources: the kind tag ([`Gvr`]), the
//! per-kind instance path ([`ResourceId`]) and label [`Selector`]s.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Errors produced when parsing a resource path.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentityError {
    /// The path was empty (no selection).
    #[error("empty resource path")]
    Empty,

    /// The path did not have the `namespace/name` or `name` shape.
    #[error("invalid resource path {0:?}")]
    Invalid(String),
}

/// A group/version/resource tag such as `apps/v1/replicasets`.
///
/// Core-group kinds omit the group (`v1/pods`).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Gvr(String);

impl Gvr {
    /// Wrap a `group/version/resource` (or `version/resource`) path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The full tag.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn parts(&self) -> (&str, &str, &str) {
        let mut it = self.0.rsplitn(3, '/');
        let resource = it.next().unwrap_or_default();
        let version = it.next().unwrap_or_default();
        let group = it.next().unwrap_or_default();
        (group, version, resource)
    }

    /// API group; empty for the core group.
    pub fn group(&self) -> &str {
        self.parts().0
    }

    /// API version (e.g. `v1`).
    pub fn version(&self) -> &str {
        self.parts().1
    }

    /// Plural resource name (e.g. `replicasets`).
    pub fn resource(&self) -> &str {
        self.parts().2
    }
}

impl fmt::Display for Gvr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The identity of a resource within its kind: `namespace/name`, or
/// just `name` for cluster-scoped resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResourceId {
    /// Namespace, `None` for cluster-scoped resources.
    pub namespace: Option<String>,
    /// Resource name, never empty.
    pub name: String,
}

impl ResourceId {
    /// A namespaced identity.
    pub fn namespaced(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            name: name.into(),
        }
    }

    /// A cluster-scoped identity.
    pub fn cluster(name: impl Into<String>) -> Self {
        Self {
            namespace: None,
            name: name.into(),
        }
    }

    /// A sibling identity in the same namespace.
    pub fn sibling(&self, name: impl Into<String>) -> Self {
        Self {
            namespace: self.namespace.clone(),
            name: name.into(),
        }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{}/{}", ns, self.name),
            None => f.write_str(&self.name),
        }
    }
}

impl FromStr for ResourceId {
    type Err = IdentityError;

    fn from_str(path: &str) -> Result<Self, Self::Err> {
        if path.is_empty() {
            return Err(IdentityError::Empty);
        }
        match path.split_once('/') {
            None => Ok(Self::cluster(path)),
            Some((ns, name)) if !ns.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self::namespaced(ns, name))
            }
            Some(_) => Err(IdentityError::Invalid(path.to_string())),
        }
    }
}

/// Label selector used to narrow a listing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Selector {
    /// Matches every resource.
    #[default]
    Everything,
    /// Matches resources carrying all of the given labels.
    Labels(BTreeMap<String, String>),
}

impl Selector {
    /// Build a selector from `matchLabels`; an empty map selects
    /// everything.
    pub fn from_labels(labels: BTreeMap<String, String>) -> Self {
        if labels.is_empty() {
            Selector::Everything
        } else {
            Selector::Labels(labels)
        }
    }

    /// The `labelSelector` query value, `None` for [`Selector::Everything`].
    pub fn to_query(&self) -> Option<String> {
        match self {
            Selector::Everything => None,
            Selector::Labels(labels) => Some(
                labels
                    .iter()
                    .map(|(k, v)| format!("{}={}", k, v))
                    .collect::<Vec<_>>()
                    .join(","),
            ),
        }
    }

    /// Whether `labels` satisfies this selector.
    pub fn matches(&self, labels: &BTreeMap<String, String>) -> bool {
        match self {
            Selector::Everything => true,
            Selector::Labels(want) => want.iter().all(|(k, v)| labels.get(k) == Some(v)),
        }
    }
}

impl fmt::Display for Selector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_query() {
            Some(q) => f.write_str(&q),
            None => f.write_str("everything"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Gvr splits group, version and resource.
    #[test]
    fn gvr_splits_parts() {
        let gvr = Gvr::new("apps/v1/replicasets");
        assert_eq!(gvr.group(), "apps");
        assert_eq!(gvr.version(), "v1");
        assert_eq!(gvr.resource(), "replicasets");

        let core = Gvr::new("v1/pods");
        assert_eq!(core.group(), "");
        assert_eq!(core.version(), "v1");
        assert_eq!(core.resource(), "pods");
    }

    // Paths parse into namespaced and cluster identities.
    #[test]
    fn resource_id_parses_paths() {
        let id: ResourceId = "default/web-5d8f".parse().unwrap();
        assert_eq!(id, ResourceId::namespaced("default", "web-5d8f"));
        assert_eq!(id.to_string(), "default/web-5d8f");

        let node: ResourceId = "node-1".parse().unwrap();
        assert_eq!(node.namespace, None);
        assert_eq!(node.to_string(), "node-1");
    }

    // Empty and malformed paths are rejected.
    #[test]
    fn resource_id_rejects_bad_paths() {
        assert_eq!("".parse::<ResourceId>(), Err(IdentityError::Empty));
        assert!(matches!(
            "a/b/c".parse::<ResourceId>(),
            Err(IdentityError::Invalid(_))
        ));
        assert!(matches!(
            "/name".parse::<ResourceId>(),
            Err(IdentityError::Invalid(_))
        ));
    }

    // Selector query is sorted and matching requires every label.
    #[test]
    fn selector_query_and_matching() {
        let mut labels = BTreeMap::new();
        labels.insert("tier".to_string(), "web".to_string());
        labels.insert("app".to_string(), "shop".to_string());
        let sel = Selector::from_labels(labels.clone());
        assert_eq!(sel.to_query().as_deref(), Some("app=shop,tier=web"));
        assert!(sel.matches(&labels));

        labels.remove("tier");
        assert!(!sel.matches(&labels));
        assert!(Selector::from_labels(BTreeMap::new()).matches(&labels));
        assert_eq!(Selector::Everything.to_string(), "everything");
    }
}
