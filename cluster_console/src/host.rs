/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! What a viewer asks of the application hosting it.

use crate::confirm::Dialog;
use crate::viewer::Viewer;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum NavigationError {
    /// A view switch was already requested during this dispatch.
    #[error("a view switch is already pending")]
    Pending,

    /// The catalog has no descriptor for the requested kind.
    #[error("unknown resource kind {0}")]
    UnknownKind(String),
}

/// The host application.
///
/// Viewers never hold a pointer to the application. Every handler
/// receives the host for the duration of one dispatch (or one deferred
/// continuation) and talks to it through this trait.
pub trait Host {
    /// Ask the host to make `viewer` the active view once the current
    /// dispatch returns. With `add_to_history`, the current view is
    /// kept so the user can go back.
    fn request_activate(&mut self, viewer: Viewer, add_to_history: bool)
    -> Result<(), NavigationError>;

    /// Transient informational message.
    fn notify_info(&mut self, msg: String);

    /// Transient error message; the error text is shown verbatim.
    fn notify_error(&mut self, err: &(dyn std::error::Error + 'static));

    /// Present (or re-present, after a focus change) a modal dialog.
    fn show_modal(&mut self, dialog: &Dialog);

    /// Remove the modal dialog.
    fn dismiss_modal(&mut self);
}
