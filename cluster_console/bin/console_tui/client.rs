/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! `reqwest`-backed [`ResourceClient`] over the Kubernetes REST API.
//!
//! Address handling:
//! - `--addr` may be `host:port` (no scheme) or an explicit
//!   `http://...` / `https://...`.
//! - If a scheme is provided, it is treated as authoritative.
//! - Without a scheme, `--tls-ca` selects HTTPS.
//!
//! Rollback follows what `kubectl rollout undo --to-revision` does for
//! a single replica set: the controlling deployment's pod template is
//! replaced by the replica set's, minus the `pod-template-hash` label
//! the controller adds.

use std::time::Duration;

use async_trait::async_trait;
use cluster_console::Gvr;
use cluster_console::RemoteError;
use cluster_console::ResourceClient;
use cluster_console::ResourceId;
use cluster_console::Selector;
use cluster_console::resource::OwnerReference;
use serde_json::Value;
use serde_json::json;

use crate::theme::Args;

const REVISION_ANNOTATION: &str = "deployment.kubernetes.io/revision";
const TEMPLATE_HASH_LABEL: &str = "pod-template-hash";

/// Split an address into an optional `http`/`https` scheme and the
/// remaining host part.
fn parse_addr(addr: &str) -> (Option<&str>, &str) {
    if let Some(host) = addr.strip_prefix("https://") {
        (Some("https"), host)
    } else if let Some(host) = addr.strip_prefix("http://") {
        (Some("http"), host)
    } else {
        (None, addr)
    }
}

/// Install the PEM CA at `ca_path` as the only trust anchor.
///
/// Returns `(updated_builder, ca_installed)`.
fn add_tls_from_path(
    builder: reqwest::ClientBuilder,
    ca_path: &str,
) -> (reqwest::ClientBuilder, bool) {
    let ca_bytes = match std::fs::read(ca_path) {
        Ok(b) => b,
        Err(e) => {
            tracing::warn!(path = ca_path, error = %e, "cannot read CA file");
            return (builder, false);
        }
    };
    match reqwest::Certificate::from_pem(&ca_bytes) {
        Ok(cert) => (builder.add_root_certificate(cert), true),
        Err(e) => {
            tracing::warn!(path = ca_path, error = %e, "invalid CA PEM");
            (builder, false)
        }
    }
}

/// Build the API client from CLI arguments.
///
/// The returned base URL always carries the scheme in use.
pub(crate) fn build_client(args: &Args) -> anyhow::Result<HttpClient> {
    let (explicit_scheme, host) = parse_addr(&args.addr);

    let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(10));
    let mut use_tls = explicit_scheme == Some("https");

    if let Some(ca_path) = &args.tls_ca {
        let (b, ok) = add_tls_from_path(builder, ca_path);
        builder = b;
        use_tls = use_tls || (explicit_scheme.is_none() && ok);
    }

    let scheme = if use_tls { "https" } else { "http" };
    let base_url = format!("{}://{}", scheme, host.trim_end_matches('/'));
    let client = builder.build()?;
    Ok(HttpClient {
        base_url,
        client,
        token: args.token.clone(),
    })
}

/// REST client for one API server.
pub(crate) struct HttpClient {
    pub(crate) base_url: String,
    client: reqwest::Client,
    token: Option<String>,
}

/// `/api/v1` for the core group, `/apis/{group}/{version}` otherwise.
fn group_prefix(gvr: &Gvr) -> String {
    if gvr.group().is_empty() {
        format!("/api/{}", gvr.version())
    } else {
        format!("/apis/{}/{}", gvr.group(), gvr.version())
    }
}

fn collection_path(gvr: &Gvr, namespace: Option<&str>) -> String {
    match namespace {
        Some(ns) => format!(
            "{}/namespaces/{}/{}",
            group_prefix(gvr),
            urlencoding::encode(ns),
            gvr.resource()
        ),
        None => format!("{}/{}", group_prefix(gvr), gvr.resource()),
    }
}

fn object_path(gvr: &Gvr, id: &ResourceId) -> String {
    format!(
        "{}/{}",
        collection_path(gvr, id.namespace.as_deref()),
        urlencoding::encode(&id.name)
    )
}

fn labels_of(object: &Value) -> std::collections::BTreeMap<String, String> {
    serde_json::from_value(object["metadata"]["labels"].clone()).unwrap_or_default()
}

fn revision_of(object: &Value) -> Option<&str> {
    object["metadata"]["annotations"][REVISION_ANNOTATION].as_str()
}

/// The deployment controlling a replica set: the reference marked as
/// controller, else the first deployment reference.
fn controlling_deployment(rs: &Value) -> Option<OwnerReference> {
    let refs: Vec<OwnerReference> =
        serde_json::from_value(rs["metadata"]["ownerReferences"].clone()).unwrap_or_default();
    let mut deployments = refs.into_iter().filter(|r| r.kind == "Deployment");
    let first = deployments.next()?;
    if first.controller == Some(true) {
        return Some(first);
    }
    deployments
        .find(|r| r.controller == Some(true))
        .or(Some(first))
}

/// JSON patch replacing a deployment's pod template with the one
/// recorded in `rs`.
fn rollback_patch(rs: &Value) -> Result<Value, RemoteError> {
    let mut template = rs["spec"]["template"].clone();
    if !template.is_object() {
        return Err(RemoteError::InvalidResponse(
            "replica set has no pod template".to_string(),
        ));
    }
    if let Some(labels) = template["metadata"]["labels"].as_object_mut() {
        labels.remove(TEMPLATE_HASH_LABEL);
    }
    Ok(json!([
        {"op": "replace", "path": "/spec/template", "value": template},
    ]))
}

impl HttpClient {
    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        let req = self.client.request(method, url);
        match &self.token {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }

    async fn send(
        &self,
        req: reqwest::RequestBuilder,
        gvr: &Gvr,
        id: Option<&ResourceId>,
    ) -> Result<Value, RemoteError> {
        let resp = req
            .send()
            .await
            .map_err(|e| RemoteError::Request(e.to_string()))?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND
            && let Some(id) = id
        {
            return Err(RemoteError::NotFound {
                gvr: gvr.clone(),
                id: id.clone(),
            });
        }
        let body: Value = resp
            .json()
            .await
            .map_err(|e| RemoteError::InvalidResponse(e.to_string()))?;
        if !status.is_success() {
            let message = body["message"]
                .as_str()
                .unwrap_or_else(|| status.canonical_reason().unwrap_or_default())
                .to_string();
            return Err(RemoteError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(body)
    }
}

#[async_trait]
impl ResourceClient for HttpClient {
    async fn get(
        &self,
        gvr: &Gvr,
        id: &ResourceId,
        strict: bool,
        selector: &Selector,
    ) -> Result<Value, RemoteError> {
        tracing::debug!(gvr = %gvr, id = %id, "get");
        let req = self.request(reqwest::Method::GET, &object_path(gvr, id));
        let object = self.send(req, gvr, Some(id)).await?;
        if strict && !selector.matches(&labels_of(&object)) {
            return Err(RemoteError::NotFound {
                gvr: gvr.clone(),
                id: id.clone(),
            });
        }
        Ok(object)
    }

    async fn list(
        &self,
        gvr: &Gvr,
        namespace: Option<&str>,
        selector: &Selector,
    ) -> Result<Vec<Value>, RemoteError> {
        tracing::debug!(gvr = %gvr, namespace, selector = %selector, "list");
        let mut req = self.request(reqwest::Method::GET, &collection_path(gvr, namespace));
        if let Some(q) = selector.to_query() {
            req = req.query(&[("labelSelector", q)]);
        }
        let body = self.send(req, gvr, None).await?;
        match body {
            Value::Object(mut map) => match map.remove("items") {
                Some(Value::Array(items)) => Ok(items),
                Some(Value::Null) | None => Ok(Vec::new()),
                Some(_) => Err(RemoteError::InvalidResponse(
                    "items is not an array".to_string(),
                )),
            },
            _ => Err(RemoteError::InvalidResponse(
                "list response is not an object".to_string(),
            )),
        }
    }

    async fn rollback(&self, gvr: &Gvr, id: &ResourceId) -> Result<(), RemoteError> {
        if gvr.resource() != "replicasets" {
            return Err(RemoteError::Rejected(format!(
                "rollback is not supported for {}",
                gvr
            )));
        }
        let rs = self.get(gvr, id, false, &Selector::Everything).await?;
        let owner = controlling_deployment(&rs).ok_or_else(|| {
            RemoteError::Rejected(format!("no controlling deployment found for {}", id))
        })?;
        let deployments = Gvr::new("apps/v1/deployments");
        let deployment_id = id.sibling(owner.name);
        let deployment = self
            .get(&deployments, &deployment_id, false, &Selector::Everything)
            .await?;
        if let (Some(current), Some(target)) = (revision_of(&deployment), revision_of(&rs))
            && current == target
        {
            return Err(RemoteError::Rejected(format!(
                "{} is already the current revision of {}",
                id, deployment_id
            )));
        }
        let patch = rollback_patch(&rs)?;
        tracing::info!(rs = %id, deployment = %deployment_id, "patching deployment template");
        let req = self
            .request(
                reqwest::Method::PATCH,
                &object_path(&deployments, &deployment_id),
            )
            .header(reqwest::header::CONTENT_TYPE, "application/json-patch+json")
            .body(patch.to_string());
        self.send(req, &deployments, Some(&deployment_id)).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Schemes are split off; bare hosts have none.
    #[test]
    fn parse_addr_splits_scheme() {
        assert_eq!(parse_addr("https://h:6443"), (Some("https"), "h:6443"));
        assert_eq!(parse_addr("http://h:8001"), (Some("http"), "h:8001"));
        assert_eq!(parse_addr("h:8001"), (None, "h:8001"));
    }

    // Core and grouped resources live under different prefixes.
    #[test]
    fn paths_for_core_and_grouped_resources() {
        let pods = Gvr::new("v1/pods");
        let rs = Gvr::new("apps/v1/replicasets");
        assert_eq!(collection_path(&pods, None), "/api/v1/pods");
        assert_eq!(
            collection_path(&rs, Some("shop")),
            "/apis/apps/v1/namespaces/shop/replicasets"
        );
        assert_eq!(
            object_path(&rs, &ResourceId::namespaced("shop", "web-7f9c")),
            "/apis/apps/v1/namespaces/shop/replicasets/web-7f9c"
        );
    }

    // The controller reference wins over earlier deployment references.
    #[test]
    fn controller_reference_preferred() {
        let rs = json!({"metadata": {"ownerReferences": [
            {"kind": "Deployment", "name": "old", "controller": false},
            {"kind": "Deployment", "name": "web", "controller": true},
        ]}});
        assert_eq!(controlling_deployment(&rs).unwrap().name, "web");
        let none = json!({"metadata": {"ownerReferences": [{"kind": "Node", "name": "n"}]}});
        assert!(controlling_deployment(&none).is_none());
    }

    // The template hash label is stripped from the restored template.
    #[test]
    fn rollback_patch_strips_template_hash() {
        let rs = json!({"spec": {"template": {
            "metadata": {"labels": {"app": "web", "pod-template-hash": "7f9c"}},
            "spec": {"containers": [{"name": "web", "image": "web:1"}]},
        }}});
        let patch = rollback_patch(&rs).unwrap();
        assert_eq!(patch[0]["op"], "replace");
        assert_eq!(patch[0]["path"], "/spec/template");
        assert_eq!(
            patch[0]["value"]["metadata"]["labels"],
            json!({"app": "web"})
        );
        assert_eq!(
            patch[0]["value"]["spec"]["containers"][0]["image"],
            "web:1"
        );
    }

    // Objects without a template cannot be rolled back.
    #[test]
    fn rollback_patch_requires_template() {
        assert!(matches!(
            rollback_patch(&json!({"spec": {}})),
            Err(RemoteError::InvalidResponse(_))
        ));
    }

    // A CA switches bare addresses to https.
    #[test]
    fn build_client_picks_scheme() {
        let args = <Args as clap::Parser>::try_parse_from(["console-tui", "--addr", "h:8001"]).unwrap();
        assert_eq!(build_client(&args).unwrap().base_url, "http://h:8001");
        let args =
            <Args as clap::Parser>::try_parse_from(["console-tui", "--addr", "https://h:6443/"])
                .unwrap();
        assert_eq!(build_client(&args).unwrap().base_url, "https://h:6443");
    }
}
