/*
 * Copyright (c) Meta Platforms, Inc. and affiliates.
 * All rights reserved.
 *
 * This source code is licensed under the BSD-style license found in the
 * LICENSE file in the root directory of this source tree.
 */

//! A generic resource-viewer engine for terminal cluster consoles.
//!
//! A [`Viewer`] lists one resource kind in a table, lets the user move
//! a selection, and runs key-bound actions against the selected row:
//! revealing its owner, drilling into the children its selector
//! picks, or running a confirmed mutation such as a rollback. Kinds
//! are plain data ([`KindDescriptor`]) registered in a [`Catalog`];
//! the engine itself knows nothing about any particular kind.
//!
//! The engine is host-agnostic. Everything it needs from the hosting
//! application (activating another viewer, flashing a message,
//! showing a modal) goes through the [`Host`] trait, and every remote
//! call goes through [`ResourceClient`]. The `console_tui` binary is a
//! ratatui host over the Kubernetes REST API.

pub mod action;
pub mod command;
pub mod confirm;
pub mod host;
pub mod identity;
pub mod kind;
pub mod kinds;
pub mod remote;
pub mod resolve;
pub mod resource;
pub mod table;
pub mod testing;
pub mod viewer;

pub use action::Key;
pub use action::KeyAction;
pub use action::KeyActions;
pub use action::Propagation;
pub use command::Mutation;
pub use confirm::Choice;
pub use confirm::Dialog;
pub use host::Host;
pub use host::NavigationError;
pub use identity::Gvr;
pub use identity::ResourceId;
pub use identity::Selector;
pub use kind::Catalog;
pub use kind::KindDescriptor;
pub use remote::RemoteError;
pub use remote::ResourceClient;
pub use resource::Resource;
pub use viewer::ActionContext;
pub use viewer::Viewer;
pub use viewer::ViewerEnv;
