/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Confirmed, mutating commands on the selected row.
//!
//! A mutation is bound as a dangerous action. Invoking it with a row
//! selected opens a confirmation; on OK the remote call runs off the
//! dispatch path, its outcome is reported through the host and the
//! table is reloaded whether the call succeeded or not.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;

use crate::action::KeyAction;
use crate::action::Propagation;
use crate::confirm::Choice;
use crate::identity::Gvr;
use crate::identity::ResourceId;
use crate::remote::RemoteError;
use crate::remote::ResourceClient;
use crate::viewer::ActionContext;

/// The remote call a mutation performs.
pub type MutationFn = Arc<
    dyn Fn(Arc<dyn ResourceClient>, Gvr, ResourceId) -> BoxFuture<'static, Result<(), RemoteError>>
        + Send
        + Sync,
>;

/// A named mutating command.
#[derive(Clone)]
pub struct Mutation {
    /// Imperative name, used for the binding and the prompt (`Rollback`).
    pub verb: &'static str,
    /// Shown while the call runs (`Rolling back`).
    pub progressive: &'static str,
    /// Shown on success (`rolled back`).
    pub past: &'static str,
    pub call: MutationFn,
}

impl Mutation {
    /// Roll the selected object back to its previous revision.
    pub fn rollback() -> Self {
        Self {
            verb: "Rollback",
            progressive: "Rolling back",
            past: "rolled back",
            call: Arc::new(|remote, gvr, id| {
                Box::pin(async move { remote.rollback(&gvr, &id).await })
            }),
        }
    }

    pub fn prompt(&self, gvr: &Gvr, id: &ResourceId) -> String {
        format!("{} {} {}?", self.verb, gvr, id)
    }
}

impl fmt::Debug for Mutation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Mutation")
            .field("verb", &self.verb)
            .finish_non_exhaustive()
    }
}

/// The dangerous, visible binding running `mutation` on the selection.
///
/// With nothing selected the key passes through and no dialog opens.
pub fn mutation_action(mutation: Mutation) -> KeyAction {
    let description = mutation.verb;
    KeyAction::new(
        description,
        move |cx, _| {
            let Some(id) = cx.selected_item() else {
                return Propagation::PassThrough;
            };
            let gvr = cx.viewer.gvr().clone();
            let message = mutation.prompt(&gvr, &id);
            let mutation = mutation.clone();
            let requested = cx.request_confirmation(
                message,
                Box::new(move |cx: &mut ActionContext<'_>, choice: Choice| {
                    if choice == Choice::Confirm {
                        run(cx, mutation, gvr, id);
                    }
                }),
            );
            if let Err(e) = requested {
                cx.host.notify_error(&e);
            }
            Propagation::Consumed
        },
        true,
    )
    .dangerous()
}

fn run(cx: &mut ActionContext<'_>, mutation: Mutation, gvr: Gvr, id: ResourceId) {
    cx.host
        .notify_info(format!("{} {} {}", mutation.progressive, gvr, id));
    tracing::info!(verb = mutation.verb, gvr = %gvr, id = %id, "mutation started");
    cx.viewer.begin_mutation();
    let fut = (mutation.call)(cx.viewer.remote(), gvr.clone(), id.clone());
    cx.viewer.spawn(fut, move |cx, result| {
        cx.viewer.end_mutation();
        match result {
            Ok(()) => {
                tracing::info!(verb = mutation.verb, id = %id, "mutation succeeded");
                cx.host
                    .notify_info(format!("{} successfully {}", id, mutation.past));
            }
            Err(e) => {
                tracing::warn!(verb = mutation.verb, id = %id, error = %e, "mutation failed");
                cx.host.notify_error(&e);
            }
        }
        cx.viewer.reload();
    });
}
