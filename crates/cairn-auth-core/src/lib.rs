// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Value vocabulary for Cairn authorization.
//!
//! This crate holds the types every other authorization crate speaks:
//! identifiers, lifecycle status, grants and their persisted codec, actors,
//! the resource model and the role templates used when creating or sharing
//! resources. It performs no I/O.

pub mod actor;
pub mod error;
pub mod grant;
pub mod resource;
pub mod roles;
pub mod types;

pub use actor::{allowed_targets, User, UserGroup};
pub use error::{AuthError, AuthResult, GrantParseError, WorkflowReason};
pub use grant::{decode_all, encode_all, Grant, GrantSet, GrantType};
pub use resource::{Container, Item, Lifecycle, Properties, Resource, ResourceKind};
pub use roles::{find_role, ProfileShare, RoleTemplates, ShareRole};
pub use types::{Action, Status, Uri};
