// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! In-memory [`HierarchyStore`] for tests, fixtures and the CLI.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use cairn_auth_core::{Container, Item, ResourceKind, Uri};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::snapshot::HierarchyEdge;
use crate::store::{HierarchyStore, ResolvedObject};

#[derive(Debug, Clone)]
struct ContainerRecord {
	parent: Option<Uri>,
	name: String,
}

#[derive(Debug, Default)]
pub struct InMemoryHierarchyStore {
	containers: RwLock<HashMap<Uri, ContainerRecord>>,
	items: RwLock<HashMap<Uri, Uri>>,
	unavailable: AtomicBool,
	edge_loads: AtomicUsize,
	name_loads: AtomicUsize,
}

impl InMemoryHierarchyStore {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn insert_container(&self, uri: impl Into<Uri>, parent: Option<Uri>, name: impl Into<String>) {
		self.containers.write().insert(
			uri.into(),
			ContainerRecord {
				parent,
				name: name.into(),
			},
		);
	}

	/// Registers a container record. Containers without an id are ignored.
	pub fn add_container(&self, container: &Container) {
		if let Some(id) = container.id() {
			self.insert_container(id.clone(), container.parent.clone(), container.title.clone());
		}
	}

	pub fn insert_item(&self, uri: impl Into<Uri>, container: impl Into<Uri>) {
		self.items.write().insert(uri.into(), container.into());
	}

	pub fn add_item(&self, item: &Item) {
		if let Some(id) = item.id() {
			self.insert_item(id.clone(), item.container.clone());
		}
	}

	/// Re-parents a container. Returns false if it is unknown.
	pub fn move_container(&self, uri: &Uri, parent: Option<Uri>) -> bool {
		match self.containers.write().get_mut(uri) {
			Some(record) => {
				record.parent = parent;
				true
			}
			None => false,
		}
	}

	pub fn remove_container(&self, uri: &Uri) -> bool {
		self.containers.write().remove(uri).is_some()
	}

	/// Makes every call fail with [`StoreError::Unavailable`] until reset.
	pub fn set_unavailable(&self, unavailable: bool) {
		self.unavailable.store(unavailable, Ordering::SeqCst);
	}

	/// How many times the edge list has been requested.
	pub fn edge_loads(&self) -> usize {
		self.edge_loads.load(Ordering::SeqCst)
	}

	/// How many times a container name has been requested.
	pub fn name_loads(&self) -> usize {
		self.name_loads.load(Ordering::SeqCst)
	}

	fn check_available(&self) -> Result<(), StoreError> {
		if self.unavailable.load(Ordering::SeqCst) {
			return Err(StoreError::Unavailable(
				"in-memory store marked unavailable".to_string(),
			));
		}
		Ok(())
	}
}

#[async_trait]
impl HierarchyStore for InMemoryHierarchyStore {
	async fn list_container_edges(&self) -> Result<Vec<HierarchyEdge>, StoreError> {
		self.edge_loads.fetch_add(1, Ordering::SeqCst);
		self.check_available()?;

		let containers = self.containers.read();
		let mut edges: Vec<HierarchyEdge> = containers
			.iter()
			.filter_map(|(uri, record)| {
				record
					.parent
					.as_ref()
					.map(|parent| HierarchyEdge::new(uri.clone(), parent.clone()))
			})
			.collect();
		edges.sort_by(|a, b| a.child.cmp(&b.child));
		Ok(edges)
	}

	async fn container_name(&self, uri: &Uri) -> Result<Option<String>, StoreError> {
		self.name_loads.fetch_add(1, Ordering::SeqCst);
		self.check_available()?;
		Ok(self.containers.read().get(uri).map(|r| r.name.clone()))
	}

	async fn resolve(&self, uri: &Uri) -> Result<Option<ResolvedObject>, StoreError> {
		self.check_available()?;

		if let Some(container) = self.items.read().get(uri) {
			return Ok(Some(ResolvedObject {
				kind: ResourceKind::Item,
				container: Some(container.clone()),
			}));
		}
		if self.containers.read().contains_key(uri) {
			return Ok(Some(ResolvedObject {
				kind: ResourceKind::Container,
				container: None,
			}));
		}
		Ok(None)
	}
}
