/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Modal confirmation as a suspended continuation.
//!
//! A [`ConfirmSlot`] holds at most one outstanding request. While it
//! is occupied the owning viewer routes every key to the dialog, so
//! the table underneath cannot be driven. Answering takes the
//! continuation out of the slot; the viewer then runs it on the
//! dispatch path and dismisses the modal whatever the answer was.

use crossterm::event::KeyCode;

use crate::action::Key;
use crate::viewer::ActionContext;

/// The two answers a confirmation dialog offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Cancel,
    Confirm,
}

impl Choice {
    /// Buttons in display order.
    pub const ALL: [Choice; 2] = [Choice::Cancel, Choice::Confirm];

    pub fn label(&self) -> &'static str {
        match self {
            Choice::Cancel => "Cancel",
            Choice::Confirm => "OK",
        }
    }

    fn other(self) -> Self {
        match self {
            Choice::Cancel => Choice::Confirm,
            Choice::Confirm => Choice::Cancel,
        }
    }
}

/// What the host needs to draw a confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    /// Button that Enter would press. Starts on Cancel.
    pub focused: Choice,
}

/// Completion callback of a confirmation; runs exactly once.
pub type OnDone = Box<dyn FnOnce(&mut ActionContext<'_>, Choice) + Send>;

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfirmError {
    /// Another confirmation is still waiting for an answer.
    #[error("another confirmation is pending: {0}")]
    Outstanding(String),
}

/// Outcome of feeding a key to a pending dialog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DialogInput {
    /// Focus moved between buttons.
    Moved,
    /// The user answered.
    Answered(Choice),
    /// The key means nothing to the dialog; it is swallowed.
    Ignored,
}

struct Pending {
    dialog: Dialog,
    on_done: OnDone,
}

/// Single-slot holder for the outstanding confirmation of a viewer.
#[derive(Default)]
pub struct ConfirmSlot {
    pending: Option<Pending>,
}

impl ConfirmSlot {
    /// Open a confirmation. Rejected while another one is pending.
    pub fn open(&mut self, message: String, on_done: OnDone) -> Result<&Dialog, ConfirmError> {
        if let Some(p) = &self.pending {
            return Err(ConfirmError::Outstanding(p.dialog.message.clone()));
        }
        let pending = self.pending.insert(Pending {
            dialog: Dialog {
                title: "Confirm".to_string(),
                message,
                focused: Choice::Cancel,
            },
            on_done,
        });
        Ok(&pending.dialog)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.pending.as_ref().map(|p| &p.dialog)
    }

    /// Interpret a key while a dialog is pending.
    ///
    /// Tab and the arrow keys move focus, Enter answers with the
    /// focused button, Esc answers Cancel.
    pub fn on_key(&mut self, key: Key) -> DialogInput {
        let Some(p) = &mut self.pending else {
            return DialogInput::Ignored;
        };
        match key.code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::BackTab => {
                p.dialog.focused = p.dialog.focused.other();
                DialogInput::Moved
            }
            KeyCode::Enter => DialogInput::Answered(p.dialog.focused),
            KeyCode::Esc => DialogInput::Answered(Choice::Cancel),
            _ => DialogInput::Ignored,
        }
    }

    /// Tear the request down and hand back its continuation.
    pub fn take(&mut self) -> Option<OnDone> {
        self.pending.take().map(|p| p.on_done)
    }
}

impl std::fmt::Debug for ConfirmSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfirmSlot")
            .field("dialog", &self.dialog())
            .finish()
    }
}
