/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Navigation along owner references and label selectors.

use serde_json::Value;

use crate::action::KeyAction;
use crate::action::Propagation;
use crate::host::NavigationError;
use crate::identity::ResourceId;
use crate::identity::Selector;
use crate::remote::RemoteError;
use crate::resource::DecodeError;
use crate::resource::Resource;
use crate::viewer::ActionContext;

#[derive(thiserror::Error, Debug)]
pub enum ResolveError {
    #[error("no owner reference found")]
    NoOwnerReference,

    #[error("no {0} owner reference found")]
    NoMatchingOwner(String),

    #[error("no selector found on {0}")]
    NoSelector(ResourceId),

    #[error(transparent)]
    Fetch(#[from] RemoteError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Navigation(#[from] NavigationError),
}

/// Identity of the `owner_kind` owner of `resource`.
///
/// The first matching reference in API order wins. Owners live in the
/// namespace of the resource they own.
pub fn resolve_owner(resource: &Resource, owner_kind: &str) -> Result<ResourceId, ResolveError> {
    let refs = resource.owner_references();
    if refs.is_empty() {
        return Err(ResolveError::NoOwnerReference);
    }
    refs.iter()
        .find(|r| r.kind == owner_kind)
        .map(|r| resource.id().sibling(r.name.clone()))
        .ok_or_else(|| ResolveError::NoMatchingOwner(owner_kind.to_string()))
}

/// Selector picking the children of `resource`.
pub fn child_selector(resource: &Resource) -> Result<Selector, ResolveError> {
    let labels = resource.match_labels()?;
    if labels.is_empty() {
        return Err(ResolveError::NoSelector(resource.id()));
    }
    Ok(Selector::from_labels(labels))
}

fn report(cx: &mut ActionContext<'_>, err: ResolveError) {
    tracing::warn!(error = %err, "navigation failed");
    cx.host.notify_error(&err);
}

/// Fetch the selected row and hand it to `then` on the dispatch path.
///
/// The result is dropped if a later navigation was requested, the
/// viewer left the screen or a confirmation opened meanwhile.
fn with_selected<F>(cx: &mut ActionContext<'_>, then: F) -> Propagation
where
    F: FnOnce(&mut ActionContext<'_>, Resource) -> Result<(), ResolveError> + Send + 'static,
{
    let Some(id) = cx.selected_item() else {
        return Propagation::PassThrough;
    };
    let remote = cx.viewer.remote();
    let gvr = cx.viewer.gvr().clone();
    let what = cx.viewer.descriptor().kind;
    let token = cx.viewer.begin_navigation();
    cx.viewer.spawn(
        async move {
            let value: Value = remote.get(&gvr, &id, true, &Selector::Everything).await?;
            Ok::<_, ResolveError>(Resource::decode(what, value)?)
        },
        move |cx, fetched| {
            if !cx.viewer.navigation_wanted(token) {
                tracing::debug!(token, "navigation result superseded");
                return;
            }
            if let Err(e) = fetched.and_then(|resource| then(cx, resource)) {
                report(cx, e);
            }
        },
    );
    Propagation::Consumed
}

/// Binding that opens the `owner_kind` owner of the selected row.
pub fn show_owner(owner_kind: &'static str) -> KeyAction {
    KeyAction::new(
        "Show Owner",
        move |cx, _| {
            with_selected(cx, move |cx, resource| {
                let owner = resolve_owner(&resource, owner_kind)?;
                tracing::info!(of = %resource.id(), owner = %owner, kind = owner_kind, "show owner");
                let mut viewer = cx.viewer.open_kind(owner_kind)?;
                viewer.set_instance(owner);
                viewer.reload();
                cx.host.request_activate(viewer, true)?;
                Ok(())
            })
        },
        true,
    )
}

/// Binding that lists the `child_kind` resources selected by the
/// selected row.
pub fn show_children(child_kind: &'static str) -> KeyAction {
    KeyAction::new(
        format!("Show {}s", child_kind),
        move |cx, _| {
            with_selected(cx, move |cx, resource| {
                let selector = child_selector(&resource)?;
                tracing::info!(of = %resource.id(), selector = %selector, kind = child_kind, "show children");
                let mut viewer = cx.viewer.open_kind(child_kind)?;
                viewer.set_selector(resource.metadata.namespace.clone(), selector);
                viewer.reload();
                cx.host.request_activate(viewer, true)?;
                Ok(())
            })
        },
        true,
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crossterm::event::KeyCode;
    use serde_json::json;

    use super::*;
    use crate::action::Key;
    use crate::identity::Gvr;
    use crate::testing::FakeClient;
    use crate::testing::RecordingHost;
    use crate::testing::pod;
    use crate::testing::replica_set;
    use crate::testing::test_env;
    use crate::viewer::Viewer;

    fn owned(refs: Value) -> Resource {
        Resource::decode(
            "ReplicaSet",
            json!({
                "metadata": {"name": "web-7f9c", "namespace": "shop", "ownerReferences": refs},
            }),
        )
        .unwrap()
    }

    // The first owner of the requested kind is chosen.
    #[test]
    fn first_matching_owner_wins() {
        let rs = owned(json!([
            {"apiVersion": "v1", "kind": "Node", "name": "n1"},
            {"apiVersion": "apps/v1", "kind": "Deployment", "name": "web"},
            {"apiVersion": "apps/v1", "kind": "Deployment", "name": "web-old"},
        ]));
        assert_eq!(
            resolve_owner(&rs, "Deployment").unwrap(),
            ResourceId::namespaced("shop", "web")
        );
    }

    // No references and no matching reference are distinct errors.
    #[test]
    fn missing_owner_errors() {
        let none = owned(json!([]));
        assert_eq!(
            resolve_owner(&none, "Deployment").unwrap_err().to_string(),
            "no owner reference found"
        );
        let other = owned(json!([{"apiVersion": "v1", "kind": "Node", "name": "n1"}]));
        assert_eq!(
            resolve_owner(&other, "Deployment").unwrap_err().to_string(),
            "no Deployment owner reference found"
        );
    }

    // An empty selector cannot drill down.
    #[test]
    fn empty_selector_is_an_error() {
        let rs = owned(json!([]));
        assert!(matches!(
            child_selector(&rs),
            Err(ResolveError::NoSelector(_))
        ));
    }

    async fn replica_set_viewer(client: &Arc<FakeClient>) -> (Viewer, RecordingHost) {
        let env = test_env(client.clone());
        let mut viewer = Viewer::new(env.catalog.get("ReplicaSet").unwrap(), env);
        let mut host = RecordingHost::default();
        viewer.reload();
        viewer.settle(&mut host).await;
        (viewer, host)
    }

    // Show Owner activates a deployment viewer targeting the owner.
    #[tokio::test]
    async fn show_owner_activates_owner_viewer() {
        let client = FakeClient::new();
        client.insert(
            &Gvr::new("apps/v1/replicasets"),
            replica_set("shop", "web-7f9c", &[("Deployment", "web")]),
        );
        let (mut viewer, mut host) = replica_set_viewer(&client).await;

        assert_eq!(viewer.handle_key(Key::char('o'), &mut host), Propagation::Consumed);
        viewer.settle(&mut host).await;

        assert!(host.errors.is_empty());
        let (owner, add_to_history) = host.activated.pop().unwrap();
        assert!(add_to_history);
        assert_eq!(owner.title(), "Deployments(shop/web)");
        assert_eq!(
            owner.state().scope().instance,
            Some(ResourceId::namespaced("shop", "web"))
        );
    }

    // Without an owner the user sees the error and nothing activates.
    #[tokio::test]
    async fn show_owner_without_reference_reports() {
        let client = FakeClient::new();
        client.insert(
            &Gvr::new("apps/v1/replicasets"),
            replica_set("shop", "orphan", &[]),
        );
        let (mut viewer, mut host) = replica_set_viewer(&client).await;

        viewer.handle_key(Key::char('o'), &mut host);
        viewer.settle(&mut host).await;

        assert_eq!(host.errors, ["no owner reference found"]);
        assert!(host.activated.is_empty());
    }

    // Owner references of another kind report the missing kind.
    #[tokio::test]
    async fn show_owner_with_unrelated_owner_reports() {
        let client = FakeClient::new();
        client.insert(
            &Gvr::new("apps/v1/replicasets"),
            replica_set("shop", "web-7f9c", &[("Node", "n1")]),
        );
        let (mut viewer, mut host) = replica_set_viewer(&client).await;

        assert_eq!(viewer.handle_key(Key::char('o'), &mut host), Propagation::Consumed);
        viewer.settle(&mut host).await;

        assert_eq!(host.errors, ["no Deployment owner reference found"]);
        assert!(host.activated.is_empty());
    }

    // Only the latest navigation request switches views.
    #[tokio::test]
    async fn later_navigation_supersedes_earlier() {
        let client = FakeClient::new();
        client.insert(
            &Gvr::new("apps/v1/replicasets"),
            replica_set("shop", "web-7f9c", &[("Deployment", "web")]),
        );
        let (mut viewer, mut host) = replica_set_viewer(&client).await;

        viewer.handle_key(Key::char('o'), &mut host);
        viewer.handle_key(Key::code(KeyCode::Enter), &mut host);
        viewer.settle(&mut host).await;

        assert_eq!(host.activated.len(), 1);
        assert_eq!(host.activated[0].0.title(), "Pods(shop app=web)");
    }

    // Results arriving after the viewer left the screen are dropped.
    #[tokio::test]
    async fn suspended_viewer_drops_navigation() {
        let client = FakeClient::new();
        client.insert(
            &Gvr::new("apps/v1/replicasets"),
            replica_set("shop", "web-7f9c", &[("Deployment", "web")]),
        );
        let (mut viewer, mut host) = replica_set_viewer(&client).await;

        viewer.handle_key(Key::char('o'), &mut host);
        viewer.suspend();
        viewer.settle(&mut host).await;

        assert!(host.activated.is_empty());
        assert!(host.errors.is_empty());
    }

    // A failed fetch surfaces the remote error.
    #[tokio::test]
    async fn show_owner_fetch_failure_reports() {
        let client = FakeClient::new();
        client.insert(
            &Gvr::new("apps/v1/replicasets"),
            replica_set("shop", "web-7f9c", &[("Deployment", "web")]),
        );
        let (mut viewer, mut host) = replica_set_viewer(&client).await;
        client.fail_get(RemoteError::Request("timed out".into()));

        viewer.handle_key(Key::char('o'), &mut host);
        viewer.settle(&mut host).await;

        assert_eq!(host.errors, ["request failed: timed out"]);
        assert!(host.activated.is_empty());
    }

    // A second activation request in the same dispatch is refused.
    #[tokio::test]
    async fn pending_navigation_is_reported() {
        let client = FakeClient::new();
        client.insert(
            &Gvr::new("apps/v1/replicasets"),
            replica_set("shop", "web-7f9c", &[("Deployment", "web")]),
        );
        let (mut viewer, mut host) = replica_set_viewer(&client).await;
        host.reject_activation = Some(NavigationError::Pending);

        viewer.handle_key(Key::char('o'), &mut host);
        viewer.settle(&mut host).await;

        assert_eq!(host.errors, ["a view switch is already pending"]);
    }

    // Enter lists the pods selected by the replica set.
    #[tokio::test]
    async fn enter_shows_selected_children() {
        let client = FakeClient::new();
        client.insert(
            &Gvr::new("apps/v1/replicasets"),
            replica_set("shop", "web-7f9c", &[]),
        );
        let pods = Gvr::new("v1/pods");
        client.insert(&pods, pod("shop", "web-7f9c-a", "web"));
        client.insert(&pods, pod("shop", "api-1", "api"));
        let (mut viewer, mut host) = replica_set_viewer(&client).await;

        viewer.handle_key(Key::code(KeyCode::Enter), &mut host);
        viewer.settle(&mut host).await;

        let (mut children, _) = host.activated.pop().unwrap();
        assert_eq!(children.title(), "Pods(shop app=web)");
        children.settle(&mut host).await;
        let names: Vec<_> = children.table().rows().iter().map(|r| r.id.name.clone()).collect();
        assert_eq!(names, ["web-7f9c-a"]);
    }
}
