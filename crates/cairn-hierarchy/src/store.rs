// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use async_trait::async_trait;
use cairn_auth_core::{ResourceKind, Uri};

use crate::error::StoreError;
use crate::snapshot::HierarchyEdge;

/// What the store knows about an arbitrary URI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedObject {
	pub kind: ResourceKind,
	/// Owning container, set for items.
	pub container: Option<Uri>,
}

/// Read-only view of the resource store that the hierarchy index is built from.
#[async_trait]
pub trait HierarchyStore: Send + Sync {
	/// Every `(child, parent)` edge among containers.
	async fn list_container_edges(&self) -> Result<Vec<HierarchyEdge>, StoreError>;

	/// Human-readable name of a container, if it exists.
	async fn container_name(&self, uri: &Uri) -> Result<Option<String>, StoreError>;

	/// Resource type and owning container of `uri`, if the store knows it.
	async fn resolve(&self, uri: &Uri) -> Result<Option<ResolvedObject>, StoreError>;
}
