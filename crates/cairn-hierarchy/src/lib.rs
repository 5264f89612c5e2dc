// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Container hierarchy index for Cairn authorization.
//!
//! Grants are always evaluated at a resource's root container. This crate
//! answers "which root owns this?" and related subtree questions:
//!
//! - [`HierarchySnapshot`]: immutable, cycle-safe index of container edges
//! - [`HierarchyStore`]: the storage collaborator the index is built from
//! - [`HierarchyService`]: lazy build, atomic publish, event-driven rebuilds
//! - [`NameCache`]: bounded TTL cache of container display names

pub mod cache;
pub mod error;
pub mod memory;
pub mod service;
pub mod snapshot;
pub mod store;

pub use cache::NameCache;
pub use error::{HierarchyError, HierarchyResult, StoreError};
pub use memory::InMemoryHierarchyStore;
pub use service::{HierarchyEvent, HierarchyNotifier, HierarchyService};
pub use snapshot::{HierarchyEdge, HierarchySnapshot};
pub use store::{HierarchyStore, ResolvedObject};
