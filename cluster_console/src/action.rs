/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! Key bindings and their dispatch.
//!
//! A [`KeyActions`] maps a [`Key`] to a [`KeyAction`]. Viewers start
//! from the shared base bindings and merge per-kind bindings on top;
//! merging is last-writer-wins, so a kind can shadow any base key
//! without the engine knowing what the key means.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crossterm::event::KeyCode;
use crossterm::event::KeyEvent;
use crossterm::event::KeyModifiers;

use crate::viewer::ActionContext;

/// Whether a key event should continue to outer handlers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Propagation {
    /// The key was handled.
    Consumed,
    /// The key was not handled; the host may act on it.
    PassThrough,
}

/// A normalized trigger key.
///
/// Shifted letters are stored as the uppercase character without the
/// SHIFT modifier, so `Key::shift('d')` matches what terminals report
/// for Shift-D.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    pub code: KeyCode,
    pub modifiers: KeyModifiers,
}

impl Key {
    pub fn code(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    pub fn char(c: char) -> Self {
        Self::code(KeyCode::Char(c))
    }

    pub fn shift(c: char) -> Self {
        Self::char(c.to_ascii_uppercase())
    }

    pub fn ctrl(c: char) -> Self {
        Self {
            code: KeyCode::Char(c),
            modifiers: KeyModifiers::CONTROL,
        }
    }
}

impl From<KeyEvent> for Key {
    fn from(event: KeyEvent) -> Self {
        let mut modifiers = event.modifiers;
        let code = match event.code {
            KeyCode::Char(c) => {
                modifiers.remove(KeyModifiers::SHIFT);
                if modifiers.contains(KeyModifiers::CONTROL) {
                    KeyCode::Char(c.to_ascii_lowercase())
                } else {
                    KeyCode::Char(c)
                }
            }
            KeyCode::BackTab => {
                modifiers.remove(KeyModifiers::SHIFT);
                KeyCode::BackTab
            }
            other => other,
        };
        Self { code, modifiers }
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.contains(KeyModifiers::CONTROL) {
            f.write_str("ctrl-")?;
        }
        if self.modifiers.contains(KeyModifiers::ALT) {
            f.write_str("alt-")?;
        }
        match self.code {
            KeyCode::Char(c) if c.is_ascii_uppercase() => {
                write!(f, "shift-{}", c.to_ascii_lowercase())
            }
            KeyCode::Char(' ') => f.write_str("space"),
            KeyCode::Char(c) => write!(f, "{}", c),
            KeyCode::Enter => f.write_str("enter"),
            KeyCode::Esc => f.write_str("esc"),
            KeyCode::Tab => f.write_str("tab"),
            KeyCode::BackTab => f.write_str("backtab"),
            KeyCode::Up => f.write_str("up"),
            KeyCode::Down => f.write_str("down"),
            KeyCode::Left => f.write_str("left"),
            KeyCode::Right => f.write_str("right"),
            KeyCode::Home => f.write_str("home"),
            KeyCode::End => f.write_str("end"),
            KeyCode::PageUp => f.write_str("pgup"),
            KeyCode::PageDown => f.write_str("pgdn"),
            KeyCode::F(n) => write!(f, "f{}", n),
            other => write!(f, "{:?}", other),
        }
    }
}

/// Handler invoked when a bound key is dispatched.
pub type ActionHandler = Arc<dyn Fn(&mut ActionContext<'_>, Key) -> Propagation + Send + Sync>;

/// Presentation and gating options of a binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ActionOpts {
    /// Listed in the key-hint bar. Hidden bindings still dispatch.
    pub visible: bool,
    /// Mutates remote state; refused when the registry is read-only.
    pub dangerous: bool,
}

/// A named, gated action.
#[derive(Clone)]
pub struct KeyAction {
    pub description: String,
    pub action: ActionHandler,
    pub opts: ActionOpts,
}

impl KeyAction {
    pub fn new(
        description: impl Into<String>,
        action: impl Fn(&mut ActionContext<'_>, Key) -> Propagation + Send + Sync + 'static,
        visible: bool,
    ) -> Self {
        Self {
            description: description.into(),
            action: Arc::new(action),
            opts: ActionOpts {
                visible,
                dangerous: false,
            },
        }
    }

    /// Mark the action as mutating remote state.
    pub fn dangerous(mut self) -> Self {
        self.opts.dangerous = true;
        self
    }
}

impl fmt::Debug for KeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyAction")
            .field("description", &self.description)
            .field("opts", &self.opts)
            .finish()
    }
}

/// Registry of key bindings.
#[derive(Debug, Clone, Default)]
pub struct KeyActions {
    actions: HashMap<Key, KeyAction>,
    read_only: bool,
}

impl KeyActions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry from `(key, action)` pairs; later pairs win.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Key, KeyAction)>) -> Self {
        let mut aa = Self::new();
        for (key, action) in pairs {
            aa.add(key, action);
        }
        aa
    }

    /// Bind a single key, replacing any existing binding.
    pub fn add(&mut self, key: Key, action: KeyAction) {
        self.actions.insert(key, action);
    }

    /// Merge `other` into this registry. Keys already bound are
    /// overwritten.
    pub fn bind(&mut self, other: KeyActions) {
        self.actions.extend(other.actions);
    }

    pub fn get(&self, key: &Key) -> Option<&KeyAction> {
        self.actions.get(key)
    }

    pub fn len(&self) -> usize {
        self.actions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Refuse dangerous actions from now on.
    pub fn set_read_only(&mut self, read_only: bool) {
        self.read_only = read_only;
    }

    pub fn is_read_only(&self) -> bool {
        self.read_only
    }

    /// Visible bindings, ordered by their key label.
    pub fn hints(&self) -> Vec<(Key, &str)> {
        let mut hints: Vec<(Key, &str)> = self
            .actions
            .iter()
            .filter(|(_, a)| a.opts.visible)
            .map(|(k, a)| (*k, a.description.as_str()))
            .collect();
        hints.sort_by_key(|(k, _)| k.to_string());
        hints
    }

    /// Run the handler bound to `key`.
    ///
    /// Unbound keys pass through untouched. A dangerous action in
    /// read-only mode is refused with a notification instead of being
    /// run; with nothing selected it has no target and passes through
    /// silently.
    pub fn dispatch(&self, cx: &mut ActionContext<'_>, key: Key) -> Propagation {
        let Some(action) = self.actions.get(&key) else {
            return Propagation::PassThrough;
        };
        if action.opts.dangerous && self.read_only {
            if cx.selected_item().is_none() {
                return Propagation::PassThrough;
            }
            tracing::debug!(key = %key, action = %action.description, "refused in read-only mode");
            cx.host
                .notify_info(format!("{} is disabled in read-only mode", action.description));
            return Propagation::Consumed;
        }
        tracing::debug!(key = %key, action = %action.description, "dispatch");
        (action.action)(cx, key)
    }
}
