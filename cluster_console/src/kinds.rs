/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Built-in kinds: deployments, replica sets and pods.

use serde_json::Value;

use crate::action::Key;
use crate::command::Mutation;
use crate::identity::Gvr;
use crate::kind::Catalog;
use crate::kind::KindDescriptor;
use crate::resource::Resource;
use crate::viewer::sort_col_cmd;

fn ns(r: &Resource) -> String {
    r.metadata.namespace.clone().unwrap_or_default()
}

pub fn deployment() -> KindDescriptor {
    KindDescriptor::new(
        "Deployment",
        Gvr::new("apps/v1/deployments"),
        vec!["NAMESPACE", "NAME", "READY", "UP-TO-DATE", "AVAILABLE"],
        |r| {
            vec![
                ns(r),
                r.metadata.name.clone(),
                format!(
                    "{}/{}",
                    r.int_at("status.readyReplicas"),
                    r.int_at("spec.replicas")
                ),
                r.int_at("status.updatedReplicas").to_string(),
                r.int_at("status.availableReplicas").to_string(),
            ]
        },
    )
    .with_child("Pod")
}

/// Replica sets reveal their deployment, list their pods and can be
/// rolled back.
pub fn replica_set() -> KindDescriptor {
    KindDescriptor::new(
        "ReplicaSet",
        Gvr::new("apps/v1/replicasets"),
        vec!["NAMESPACE", "NAME", "DESIRED", "CURRENT", "READY"],
        |r| {
            vec![
                ns(r),
                r.metadata.name.clone(),
                r.int_at("spec.replicas").to_string(),
                r.int_at("status.replicas").to_string(),
                r.int_at("status.readyReplicas").to_string(),
            ]
        },
    )
    .with_owner("Deployment")
    .with_child("Pod")
    .with_mutation(Key::ctrl('l'), Mutation::rollback())
    .with_bindings(|aa| {
        aa.add(Key::shift('d'), sort_col_cmd("DESIRED", true));
        aa.add(Key::shift('c'), sort_col_cmd("CURRENT", true));
        aa.add(Key::shift('r'), sort_col_cmd("READY", true));
    })
}

fn container_statuses(r: &Resource) -> &[Value] {
    r.status
        .get("containerStatuses")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default()
}

pub fn pod() -> KindDescriptor {
    KindDescriptor::new(
        "Pod",
        Gvr::new("v1/pods"),
        vec!["NAMESPACE", "NAME", "READY", "STATUS", "RESTARTS"],
        |r| {
            let statuses = container_statuses(r);
            let ready = statuses
                .iter()
                .filter(|s| s.get("ready").and_then(Value::as_bool) == Some(true))
                .count();
            let restarts: i64 = statuses
                .iter()
                .filter_map(|s| s.get("restartCount").and_then(Value::as_i64))
                .sum();
            vec![
                ns(r),
                r.metadata.name.clone(),
                format!("{}/{}", ready, statuses.len()),
                r.str_at("status.phase").unwrap_or("Unknown").to_string(),
                restarts.to_string(),
            ]
        },
    )
    .with_owner("ReplicaSet")
}

impl Catalog {
    /// Catalog holding every built-in kind.
    pub fn builtin() -> Self {
        let mut catalog = Catalog::new();
        catalog.register(deployment());
        catalog.register(replica_set());
        catalog.register(pod());
        catalog
    }
}
