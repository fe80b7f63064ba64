/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Fakes for exercising viewers without a cluster or a terminal.

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;
use std::sync::PoisonError;

use async_trait::async_trait;
use serde_json::Value;
use serde_json::json;

use crate::confirm::Dialog;
use crate::host::Host;
use crate::host::NavigationError;
use crate::identity::Gvr;
use crate::identity::ResourceId;
use crate::identity::Selector;
use crate::kind::Catalog;
use crate::remote::RemoteError;
use crate::remote::ResourceClient;
use crate::table::Row;
use crate::viewer::Viewer;
use crate::viewer::ViewerEnv;

/// A call observed by [`FakeClient`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Get(Gvr, ResourceId),
    List(Gvr, Option<String>, Selector),
    Rollback(Gvr, ResourceId),
}

#[derive(Default)]
struct FakeState {
    objects: BTreeMap<(String, ResourceId), Value>,
    get_error: Option<RemoteError>,
    list_error: Option<RemoteError>,
    rollback_error: Option<RemoteError>,
    calls: Vec<Call>,
}

/// In-memory [`ResourceClient`].
#[derive(Default)]
pub struct FakeClient {
    state: Mutex<FakeState>,
}

fn id_of(value: &Value) -> ResourceId {
    let meta = &value["metadata"];
    ResourceId {
        namespace: meta["namespace"].as_str().map(str::to_string),
        name: meta["name"].as_str().unwrap_or_default().to_string(),
    }
}

fn labels_of(value: &Value) -> BTreeMap<String, String> {
    serde_json::from_value(value["metadata"]["labels"].clone()).unwrap_or_default()
}

impl FakeClient {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    fn lock(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Store `object` under `gvr`, keyed by its metadata.
    pub fn insert(&self, gvr: &Gvr, object: Value) {
        let id = id_of(&object);
        self.lock().objects.insert((gvr.to_string(), id), object);
    }

    pub fn fail_get(&self, err: RemoteError) {
        self.lock().get_error = Some(err);
    }

    pub fn fail_list(&self, err: RemoteError) {
        self.lock().list_error = Some(err);
    }

    pub fn fail_rollback(&self, err: RemoteError) {
        self.lock().rollback_error = Some(err);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.lock().calls.clone()
    }

    pub fn rollbacks(&self) -> Vec<ResourceId> {
        self.lock()
            .calls
            .iter()
            .filter_map(|c| match c {
                Call::Rollback(_, id) => Some(id.clone()),
                _ => None,
            })
            .collect()
    }
}

#[async_trait]
impl ResourceClient for FakeClient {
    async fn get(
        &self,
        gvr: &Gvr,
        id: &ResourceId,
        strict: bool,
        selector: &Selector,
    ) -> Result<Value, RemoteError> {
        let mut state = self.lock();
        state.calls.push(Call::Get(gvr.clone(), id.clone()));
        if let Some(err) = &state.get_error {
            return Err(err.clone());
        }
        let not_found = || RemoteError::NotFound {
            gvr: gvr.clone(),
            id: id.clone(),
        };
        let object = state
            .objects
            .get(&(gvr.to_string(), id.clone()))
            .cloned()
            .ok_or_else(not_found)?;
        if strict && !selector.matches(&labels_of(&object)) {
            return Err(not_found());
        }
        Ok(object)
    }

    async fn list(
        &self,
        gvr: &Gvr,
        namespace: Option<&str>,
        selector: &Selector,
    ) -> Result<Vec<Value>, RemoteError> {
        let mut state = self.lock();
        state.calls.push(Call::List(
            gvr.clone(),
            namespace.map(str::to_string),
            selector.clone(),
        ));
        if let Some(err) = &state.list_error {
            return Err(err.clone());
        }
        Ok(state
            .objects
            .iter()
            .filter(|((g, _), _)| g == gvr.as_str())
            .filter(|((_, id), _)| namespace.is_none() || id.namespace.as_deref() == namespace)
            .filter(|(_, object)| selector.matches(&labels_of(object)))
            .map(|(_, object)| object.clone())
            .collect())
    }

    async fn rollback(&self, gvr: &Gvr, id: &ResourceId) -> Result<(), RemoteError> {
        let mut state = self.lock();
        state.calls.push(Call::Rollback(gvr.clone(), id.clone()));
        match &state.rollback_error {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }
}

/// A [`Host`] that records what it is asked to do.
#[derive(Debug, Default)]
pub struct RecordingHost {
    pub infos: Vec<String>,
    pub errors: Vec<String>,
    pub modals_shown: usize,
    pub modals_dismissed: usize,
    /// The dialog currently shown, as last presented.
    pub modal: Option<Dialog>,
    pub activated: Vec<(Viewer, bool)>,
    /// Answer every activation request with this error.
    pub reject_activation: Option<NavigationError>,
}

impl Host for RecordingHost {
    fn request_activate(
        &mut self,
        viewer: Viewer,
        add_to_history: bool,
    ) -> Result<(), NavigationError> {
        if let Some(err) = &self.reject_activation {
            return Err(err.clone());
        }
        self.activated.push((viewer, add_to_history));
        Ok(())
    }

    fn notify_info(&mut self, msg: String) {
        self.infos.push(msg);
    }

    fn notify_error(&mut self, err: &(dyn std::error::Error + 'static)) {
        self.errors.push(err.to_string());
    }

    fn show_modal(&mut self, dialog: &Dialog) {
        self.modals_shown += 1;
        self.modal = Some(dialog.clone());
    }

    fn dismiss_modal(&mut self) {
        self.modals_dismissed += 1;
        self.modal = None;
    }
}

/// Environment over `client` with the built-in catalog.
pub fn test_env(client: Arc<FakeClient>) -> ViewerEnv {
    ViewerEnv {
        remote: client,
        catalog: Arc::new(Catalog::builtin()),
        namespace: None,
        read_only: false,
    }
}

/// An empty replica set viewer over a fresh [`FakeClient`].
pub fn test_viewer() -> Viewer {
    let env = test_env(FakeClient::new());
    match env.catalog.get("ReplicaSet") {
        Some(descriptor) => Viewer::new(descriptor, env),
        None => panic!("builtin catalog lacks ReplicaSet"),
    }
}

/// Rows in namespace `shop`, one per name.
pub fn rows(names: &[&str]) -> Vec<Row> {
    names
        .iter()
        .map(|name| Row {
            id: ResourceId::namespaced("shop", *name),
            cells: vec!["shop".to_string(), name.to_string()],
        })
        .collect()
}

/// App label derived from a generated name: `web-7f9c` is app `web`.
fn app_of(name: &str) -> &str {
    name.split('-').next().unwrap_or(name)
}

/// A deployment selecting pods labelled `app=<app>`.
pub fn deployment(namespace: &str, name: &str, revision: u32) -> Value {
    json!({
        "kind": "Deployment",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": {"app": app_of(name)},
            "annotations": {"deployment.kubernetes.io/revision": revision.to_string()},
        },
        "spec": {
            "replicas": 3,
            "selector": {"matchLabels": {"app": app_of(name)}},
        },
        "status": {"readyReplicas": 3, "updatedReplicas": 3, "availableReplicas": 3},
    })
}

/// A replica set owned by `owners` (`(kind, name)` pairs, in order).
pub fn replica_set(namespace: &str, name: &str, owners: &[(&str, &str)]) -> Value {
    let refs: Vec<Value> = owners
        .iter()
        .map(|(kind, owner)| {
            json!({
                "apiVersion": "apps/v1",
                "kind": kind,
                "name": owner,
                "controller": true,
            })
        })
        .collect();
    json!({
        "kind": "ReplicaSet",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": {"app": app_of(name)},
            "ownerReferences": refs,
        },
        "spec": {
            "replicas": 3,
            "selector": {"matchLabels": {"app": app_of(name)}},
        },
        "status": {"replicas": 3, "readyReplicas": 3},
    })
}

/// A running pod labelled `app=<app>`.
pub fn pod(namespace: &str, name: &str, app: &str) -> Value {
    json!({
        "kind": "Pod",
        "metadata": {
            "name": name,
            "namespace": namespace,
            "labels": {"app": app},
        },
        "status": {
            "phase": "Running",
            "containerStatuses": [{"ready": true, "restartCount": 0}],
        },
    })
}
