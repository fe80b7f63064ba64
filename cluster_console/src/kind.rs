/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Kind descriptors and the catalog of kinds a console knows.
//!
//! Everything kind-specific is data handed to the engine here:
//! columns, the owner and child kinds a viewer may navigate to, the
//! mutations it offers and any extra bindings. The engine itself never
//! matches on a kind name.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::action::Key;
use crate::action::KeyActions;
use crate::command::Mutation;
use crate::identity::Gvr;
use crate::resource::Resource;

/// Renders the cells of one row, one per header.
pub type RowFn = fn(&Resource) -> Vec<String>;

/// Adds kind-specific bindings on top of the generated ones.
pub type BindFn = Arc<dyn Fn(&mut KeyActions) + Send + Sync>;

/// Static description of a resource kind.
#[derive(Clone)]
pub struct KindDescriptor {
    /// Kind name as it appears in owner references (e.g. `ReplicaSet`).
    pub kind: &'static str,
    pub gvr: Gvr,
    pub headers: Vec<&'static str>,
    pub row: RowFn,
    /// Kind this viewer can reveal as the owner of a row.
    pub owner_kind: Option<&'static str>,
    /// Kind this viewer can drill into through the row's selector.
    pub child_kind: Option<&'static str>,
    pub mutations: Vec<(Key, Mutation)>,
    pub bindings: Vec<BindFn>,
}

impl KindDescriptor {
    pub fn new(kind: &'static str, gvr: Gvr, headers: Vec<&'static str>, row: RowFn) -> Self {
        Self {
            kind,
            gvr,
            headers,
            row,
            owner_kind: None,
            child_kind: None,
            mutations: Vec::new(),
            bindings: Vec::new(),
        }
    }

    pub fn with_owner(mut self, kind: &'static str) -> Self {
        self.owner_kind = Some(kind);
        self
    }

    pub fn with_child(mut self, kind: &'static str) -> Self {
        self.child_kind = Some(kind);
        self
    }

    pub fn with_mutation(mut self, key: Key, mutation: Mutation) -> Self {
        self.mutations.push((key, mutation));
        self
    }

    pub fn with_bindings(mut self, bind: impl Fn(&mut KeyActions) + Send + Sync + 'static) -> Self {
        self.bindings.push(Arc::new(bind));
        self
    }

    /// Plural display name used in titles (`ReplicaSets`).
    pub fn plural(&self) -> String {
        format!("{}s", self.kind)
    }
}

impl fmt::Debug for KindDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KindDescriptor")
            .field("kind", &self.kind)
            .field("gvr", &self.gvr)
            .field("owner_kind", &self.owner_kind)
            .field("child_kind", &self.child_kind)
            .finish_non_exhaustive()
    }
}

/// Descriptors by kind name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    kinds: BTreeMap<&'static str, Arc<KindDescriptor>>,
}

impl Catalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: KindDescriptor) {
        self.kinds.insert(descriptor.kind, Arc::new(descriptor));
    }

    /// Exact lookup by kind name.
    pub fn get(&self, kind: &str) -> Option<Arc<KindDescriptor>> {
        self.kinds.get(kind).cloned()
    }

    /// Case-insensitive lookup by kind name, plural kind name or
    /// resource name (`replicaset`, `ReplicaSets`, `replicasets`).
    pub fn lookup(&self, name: &str) -> Option<Arc<KindDescriptor>> {
        let name = name.to_ascii_lowercase();
        self.kinds
            .values()
            .find(|d| {
                let kind = d.kind.to_ascii_lowercase();
                name == kind || name == format!("{}s", kind) || name == d.gvr.resource()
            })
            .cloned()
    }

    pub fn kinds(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.kinds.keys().copied()
    }
}
