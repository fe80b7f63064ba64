/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! The generic resource viewer.
//!
//! A [`Viewer`] is the unit the host makes active: a table of one
//! kind, the bindings for that kind and at most one pending
//! confirmation. It is split in two so dispatch can lend the state to
//! a handler while the registry stays borrowed:
//!
//! - [`KeyActions`]: the bindings, read-only during dispatch.
//! - [`ViewerState`]: everything a handler may touch, reached through
//!   an [`ActionContext`] together with the [`Host`].
//!
//! Remote calls never run on the dispatch path. [`ViewerState::spawn`]
//! runs the future on the tokio runtime and sends a [`Deferred`]
//! continuation back through the viewer's channel; the host applies it
//! with [`Viewer::apply`] from the same sequential loop that
//! dispatches keys, so handlers and continuations never overlap.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use crossterm::event::KeyCode;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::action::Key;
use crate::action::KeyAction;
use crate::action::KeyActions;
use crate::action::Propagation;
use crate::command;
use crate::confirm::Choice;
use crate::confirm::ConfirmError;
use crate::confirm::ConfirmSlot;
use crate::confirm::Dialog;
use crate::confirm::DialogInput;
use crate::confirm::OnDone;
use crate::host::Host;
use crate::host::NavigationError;
use crate::identity::Gvr;
use crate::identity::ResourceId;
use crate::identity::Selector;
use crate::kind::Catalog;
use crate::kind::KindDescriptor;
use crate::remote::RemoteError;
use crate::remote::ResourceClient;
use crate::resolve;
use crate::resource::Resource;
use crate::table::ResourceTable;
use crate::table::Row;

/// Rows moved by PageUp/PageDown.
const PAGE: usize = 10;

/// A continuation delivered back onto the dispatch path.
pub type Deferred = Box<dyn FnOnce(&mut ActionContext<'_>) + Send>;

/// Shared dependencies handed from a viewer to the viewers it opens.
#[derive(Clone)]
pub struct ViewerEnv {
    pub remote: Arc<dyn ResourceClient>,
    pub catalog: Arc<Catalog>,
    /// Namespace to list, `None` for all namespaces.
    pub namespace: Option<String>,
    pub read_only: bool,
}

impl fmt::Debug for ViewerEnv {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViewerEnv")
            .field("namespace", &self.namespace)
            .field("read_only", &self.read_only)
            .finish_non_exhaustive()
    }
}

/// Which rows a viewer lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Scope {
    pub namespace: Option<String>,
    /// Only this resource.
    pub instance: Option<ResourceId>,
    pub selector: Selector,
}

/// Progress of the mutating command of a viewer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    Idle,
    AwaitingConfirmation,
    Mutating,
}

/// Everything an action handler may read or change.
pub struct ViewerState {
    descriptor: Arc<KindDescriptor>,
    env: ViewerEnv,
    scope: Scope,
    table: ResourceTable,
    confirm: ConfirmSlot,
    mutations_in_flight: usize,
    in_flight: usize,
    /// Bumped per navigation request and when the viewer leaves the
    /// screen; older navigation results are dropped.
    navigation: u64,
    tx: mpsc::UnboundedSender<Deferred>,
}

/// What a handler receives: the viewer state and the host.
pub struct ActionContext<'a> {
    pub viewer: &'a mut ViewerState,
    pub host: &'a mut dyn Host,
}

impl ActionContext<'_> {
    /// Identity of the highlighted row.
    pub fn selected_item(&self) -> Option<ResourceId> {
        self.viewer.table.selected_item().cloned()
    }

    /// Open the viewer's confirmation dialog.
    ///
    /// Rejected while another confirmation is pending.
    pub fn request_confirmation(
        &mut self,
        message: String,
        on_done: OnDone,
    ) -> Result<(), ConfirmError> {
        let dialog = self.viewer.confirm.open(message, on_done)?;
        tracing::debug!(message = %dialog.message, "confirmation requested");
        self.host.show_modal(dialog);
        Ok(())
    }
}

impl ViewerState {
    pub fn context<'a>(&'a mut self, host: &'a mut dyn Host) -> ActionContext<'a> {
        ActionContext { viewer: self, host }
    }

    pub fn descriptor(&self) -> &Arc<KindDescriptor> {
        &self.descriptor
    }

    pub fn gvr(&self) -> &Gvr {
        &self.descriptor.gvr
    }

    pub fn env(&self) -> &ViewerEnv {
        &self.env
    }

    pub fn remote(&self) -> Arc<dyn ResourceClient> {
        self.env.remote.clone()
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    pub fn table(&self) -> &ResourceTable {
        &self.table
    }

    pub fn table_mut(&mut self) -> &mut ResourceTable {
        &mut self.table
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.confirm.dialog()
    }

    pub fn phase(&self) -> MutationPhase {
        if self.confirm.is_pending() {
            MutationPhase::AwaitingConfirmation
        } else if self.mutations_in_flight > 0 {
            MutationPhase::Mutating
        } else {
            MutationPhase::Idle
        }
    }

    /// Number of spawned calls whose continuation has not run yet.
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Token for a navigation request, superseding earlier ones.
    pub fn begin_navigation(&mut self) -> u64 {
        self.navigation += 1;
        self.navigation
    }

    /// Whether the result of navigation request `token` may still
    /// switch views: no later request was made, the viewer has not
    /// left the screen and no confirmation is pending.
    pub fn navigation_wanted(&self, token: u64) -> bool {
        token == self.navigation && !self.confirm.is_pending()
    }

    pub(crate) fn begin_mutation(&mut self) {
        self.mutations_in_flight += 1;
    }

    pub(crate) fn end_mutation(&mut self) {
        self.mutations_in_flight = self.mutations_in_flight.saturating_sub(1);
    }

    /// Run `fut` off the dispatch path and apply `then` to its output
    /// once the host hands the continuation back.
    pub fn spawn<T, F, C>(&mut self, fut: F, then: C)
    where
        T: Send + 'static,
        F: Future<Output = T> + Send + 'static,
        C: FnOnce(&mut ActionContext<'_>, T) + Send + 'static,
    {
        self.in_flight += 1;
        let tx = self.tx.clone();
        tokio::spawn(async move {
            let out = fut.await;
            let deferred: Deferred = Box::new(move |cx| then(cx, out));
            // The receiver is gone only if the viewer was dropped.
            let _ = tx.send(deferred);
        });
    }

    /// Re-list the table's rows.
    pub fn reload(&mut self) {
        let generation = self.table.request_refresh();
        let remote = self.remote();
        let gvr = self.gvr().clone();
        let namespace = self.list_namespace();
        let selector = self.scope.selector.clone();
        tracing::debug!(gvr = %gvr, generation, "reload");
        self.spawn(
            async move { remote.list(&gvr, namespace.as_deref(), &selector).await },
            move |cx, result| cx.viewer.apply_listing(generation, result),
        );
    }

    fn list_namespace(&self) -> Option<String> {
        match &self.scope.instance {
            Some(id) => id.namespace.clone(),
            None => self.scope.namespace.clone(),
        }
    }

    fn apply_listing(&mut self, generation: u64, result: Result<Vec<Value>, RemoteError>) {
        if generation != self.table.generation() {
            tracing::debug!(
                generation,
                current = self.table.generation(),
                "dropping stale listing"
            );
            return;
        }
        let items = match result {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(gvr = %self.gvr(), error = %e, "listing failed");
                self.table.set_error(e.to_string());
                return;
            }
        };
        let mut rows = Vec::with_capacity(items.len());
        for item in items {
            let resource = match Resource::decode(self.descriptor.kind, item) {
                Ok(r) => r,
                Err(e) => {
                    tracing::warn!(error = %e, "skipping undecodable row");
                    continue;
                }
            };
            let id = resource.id();
            if self.scope.instance.as_ref().is_some_and(|want| want != &id) {
                continue;
            }
            rows.push(Row {
                cells: (self.descriptor.row)(&resource),
                id,
            });
        }
        self.table.set_rows(rows);
    }

    /// A fresh viewer for `kind`, sharing this viewer's environment.
    pub fn open_kind(&self, kind: &str) -> Result<Viewer, NavigationError> {
        let descriptor = self
            .env
            .catalog
            .get(kind)
            .ok_or_else(|| NavigationError::UnknownKind(kind.to_string()))?;
        Ok(Viewer::new(descriptor, self.env.clone()))
    }
}

/// A resource viewer: bindings plus state plus the channel deferred
/// continuations come back on.
pub struct Viewer {
    actions: KeyActions,
    state: ViewerState,
    rx: mpsc::UnboundedReceiver<Deferred>,
}

impl Viewer {
    /// Build a viewer for `descriptor`, binding the base actions and
    /// then the kind's own on top of them.
    pub fn new(descriptor: Arc<KindDescriptor>, env: ViewerEnv) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut actions = KeyActions::new();
        actions.set_read_only(env.read_only);
        actions.bind(base_actions());
        actions.bind(kind_actions(&descriptor));
        let scope = Scope {
            namespace: env.namespace.clone(),
            ..Scope::default()
        };
        let table = ResourceTable::new(descriptor.headers.clone());
        Self {
            actions,
            state: ViewerState {
                descriptor,
                env,
                scope,
                table,
                confirm: ConfirmSlot::default(),
                mutations_in_flight: 0,
                in_flight: 0,
                navigation: 0,
                tx,
            },
            rx,
        }
    }

    /// Target a single resource.
    pub fn set_instance(&mut self, id: ResourceId) {
        self.state.scope.namespace = id.namespace.clone();
        self.state.scope.instance = Some(id);
    }

    /// Restrict to resources matching `selector` in `namespace`.
    pub fn set_selector(&mut self, namespace: Option<String>, selector: Selector) {
        self.state.scope.namespace = namespace;
        self.state.scope.selector = selector;
    }

    /// Merge extra bindings; existing keys are overwritten.
    pub fn bind_keys(&mut self, actions: KeyActions) {
        self.actions.bind(actions);
    }

    pub fn actions(&self) -> &KeyActions {
        &self.actions
    }

    pub fn state(&self) -> &ViewerState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewerState {
        &mut self.state
    }

    pub fn table(&self) -> &ResourceTable {
        &self.state.table
    }

    pub fn table_mut(&mut self) -> &mut ResourceTable {
        &mut self.state.table
    }

    pub fn context<'a>(&'a mut self, host: &'a mut dyn Host) -> ActionContext<'a> {
        self.state.context(host)
    }

    /// `ReplicaSets(all)`, `Deployments(shop/web)`, `Pods(shop app=web)`.
    pub fn title(&self) -> String {
        let scope = &self.state.scope;
        let target = match (&scope.instance, &scope.namespace, &scope.selector) {
            (Some(id), _, _) => id.to_string(),
            (None, ns, Selector::Labels(_)) => {
                format!("{} {}", ns.as_deref().unwrap_or("all"), scope.selector)
            }
            (None, Some(ns), Selector::Everything) => ns.clone(),
            (None, None, Selector::Everything) => "all".to_string(),
        };
        format!("{}({})", self.state.descriptor.plural(), target)
    }

    pub fn reload(&mut self) {
        self.state.reload();
    }

    /// The viewer left the screen: navigation results still in flight
    /// are dropped when they arrive.
    pub fn suspend(&mut self) {
        self.state.navigation += 1;
    }

    /// Route a key: to the pending dialog if there is one, otherwise
    /// through the bindings.
    pub fn handle_key(&mut self, key: Key, host: &mut dyn Host) -> Propagation {
        if self.state.confirm.is_pending() {
            match self.state.confirm.on_key(key) {
                DialogInput::Moved => {
                    if let Some(dialog) = self.state.confirm.dialog() {
                        host.show_modal(dialog);
                    }
                }
                DialogInput::Answered(choice) => self.answer(choice, host),
                DialogInput::Ignored => {}
            }
            return Propagation::Consumed;
        }
        let mut cx = self.state.context(host);
        self.actions.dispatch(&mut cx, key)
    }

    /// Answer the pending confirmation: run its continuation once,
    /// then dismiss the modal whatever the answer.
    pub fn answer(&mut self, choice: Choice, host: &mut dyn Host) {
        let Some(on_done) = self.state.confirm.take() else {
            return;
        };
        tracing::debug!(?choice, "confirmation answered");
        {
            let mut cx = self.state.context(host);
            on_done(&mut cx, choice);
        }
        host.dismiss_modal();
    }

    /// Wait for the next deferred continuation.
    pub async fn next_deferred(&mut self) -> Option<Deferred> {
        self.rx.recv().await
    }

    /// Apply a continuation on the dispatch path.
    pub fn apply(&mut self, deferred: Deferred, host: &mut dyn Host) {
        self.state.in_flight = self.state.in_flight.saturating_sub(1);
        let mut cx = self.state.context(host);
        deferred(&mut cx);
    }

    /// Apply continuations until no spawned call is outstanding.
    pub async fn settle(&mut self, host: &mut dyn Host) {
        while self.state.in_flight > 0 {
            match self.rx.recv().await {
                Some(deferred) => self.apply(deferred, host),
                None => break,
            }
        }
    }
}

impl fmt::Debug for Viewer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Viewer")
            .field("title", &self.title())
            .field("phase", &self.state.phase())
            .field("in_flight", &self.state.in_flight)
            .finish_non_exhaustive()
    }
}

fn nav(
    description: &'static str,
    step: fn(&mut ResourceTable) -> bool,
) -> KeyAction {
    KeyAction::new(
        description,
        move |cx, _| {
            step(cx.viewer.table_mut());
            Propagation::Consumed
        },
        false,
    )
}

/// Bindings every viewer starts with.
pub fn base_actions() -> KeyActions {
    let up = nav("Up", |t| t.cursor_mut().move_up());
    let down = nav("Down", |t| t.cursor_mut().move_down());
    let home = nav("Top", |t| t.cursor_mut().home());
    let end = nav("Bottom", |t| t.cursor_mut().end());
    KeyActions::from_pairs([
        (Key::code(KeyCode::Up), up.clone()),
        (Key::char('k'), up),
        (Key::code(KeyCode::Down), down.clone()),
        (Key::char('j'), down),
        (Key::code(KeyCode::Home), home.clone()),
        (Key::char('g'), home),
        (Key::code(KeyCode::End), end.clone()),
        (Key::shift('g'), end),
        (
            Key::code(KeyCode::PageUp),
            nav("Page Up", |t| t.cursor_mut().page_up(PAGE)),
        ),
        (
            Key::code(KeyCode::PageDown),
            nav("Page Down", |t| t.cursor_mut().page_down(PAGE)),
        ),
        (
            Key::ctrl('r'),
            KeyAction::new(
                "Reload",
                |cx, _| {
                    cx.viewer.reload();
                    Propagation::Consumed
                },
                true,
            ),
        ),
    ])
}

/// A hidden binding sorting the table by `column`.
pub fn sort_col_cmd(column: &'static str, ascending: bool) -> KeyAction {
    KeyAction::new(
        format!("Sort {}", column),
        move |cx, _| {
            cx.viewer.table_mut().sort_by(column, ascending);
            Propagation::Consumed
        },
        false,
    )
}

fn kind_actions(descriptor: &KindDescriptor) -> KeyActions {
    let mut aa = KeyActions::new();
    if let Some(owner) = descriptor.owner_kind {
        aa.add(Key::char('o'), resolve::show_owner(owner));
    }
    if let Some(child) = descriptor.child_kind {
        aa.add(Key::code(KeyCode::Enter), resolve::show_children(child));
    }
    for (key, mutation) in &descriptor.mutations {
        aa.add(*key, command::mutation_action(mutation.clone()));
    }
    for bind in &descriptor.bindings {
        bind(&mut aa);
    }
    aa
}
