/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The contract the engine needs from the cluster control plane.
//!
//! Transport, authentication and caching belong to implementors; the
//! engine treats every call as an opaque fallible operation.

use async_trait::async_trait;
use serde_json::Value;

use crate::identity::Gvr;
use crate::identity::ResourceId;
use crate::identity::Selector;

/// Error returned by a [`ResourceClient`] call. Messages are shown to
/// the user verbatim.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum RemoteError {
    /// The request could not be sent or did not complete.
    #[error("request failed: {0}")]
    Request(String),

    /// The server has no such object.
    #[error("{gvr} {id} not found")]
    NotFound {
        /// Kind tag that was queried.
        gvr: Gvr,
        /// Identity that was queried.
        id: ResourceId,
    },

    /// The server answered with a non-success status.
    #[error("HTTP {status}: {message}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Server-provided message, if any.
        message: String,
    },

    /// The response body could not be parsed.
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// The operation is not possible for this object.
    #[error("{0}")]
    Rejected(String),
}

/// Remote resource collaborator.
#[async_trait]
pub trait ResourceClient: Send + Sync {
    /// Fetch one object.
    ///
    /// With `strict`, an object that exists but does not satisfy
    /// `selector` is reported as [`RemoteError::NotFound`].
    async fn get(
        &self,
        gvr: &Gvr,
        id: &ResourceId,
        strict: bool,
        selector: &Selector,
    ) -> Result<Value, RemoteError>;

    /// List objects of a kind, optionally within one namespace.
    async fn list(
        &self,
        gvr: &Gvr,
        namespace: Option<&str>,
        selector: &Selector,
    ) -> Result<Vec<Value>, RemoteError>;

    /// Revert the identified object to its previous revision.
    async fn rollback(&self, gvr: &Gvr, id: &ResourceId) -> Result<(), RemoteError>;
}
