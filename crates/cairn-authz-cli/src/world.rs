// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Fixture world loaded from a JSON file.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, Context};
use cairn_auth_core::{Container, Item, Resource, Uri, User};
use cairn_hierarchy::InMemoryHierarchyStore;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct World {
	#[serde(default)]
	pub containers: Vec<Container>,
	#[serde(default)]
	pub items: Vec<Item>,
	#[serde(default)]
	pub users: Vec<User>,
}

impl World {
	pub fn load(path: &Path) -> anyhow::Result<Self> {
		let raw = std::fs::read_to_string(path)
			.with_context(|| format!("failed to read world file {}", path.display()))?;
		Self::parse(&raw).with_context(|| format!("invalid world file {}", path.display()))
	}

	pub fn parse(raw: &str) -> anyhow::Result<Self> {
		Ok(serde_json::from_str(raw)?)
	}

	pub fn store(&self) -> Arc<InMemoryHierarchyStore> {
		let store = Arc::new(InMemoryHierarchyStore::new());
		for container in &self.containers {
			store.add_container(container);
		}
		for item in &self.items {
			store.add_item(item);
		}
		store
	}

	pub fn index(&self) -> WorldIndex<'_> {
		WorldIndex {
			containers: self
				.containers
				.iter()
				.filter_map(|c| c.id().map(|id| (id.clone(), c)))
				.collect(),
			items: self
				.items
				.iter()
				.filter_map(|i| i.id().map(|id| (id.clone(), i)))
				.collect(),
			users: self.users.iter().map(|u| (u.id.clone(), u)).collect(),
		}
	}
}

pub struct WorldIndex<'a> {
	containers: HashMap<Uri, &'a Container>,
	items: HashMap<Uri, &'a Item>,
	users: HashMap<Uri, &'a User>,
}

impl<'a> WorldIndex<'a> {
	/// `anonymous` maps to no actor.
	pub fn actor(&self, id: &str) -> anyhow::Result<Option<&'a User>> {
		if id.eq_ignore_ascii_case("anonymous") {
			return Ok(None);
		}
		self
			.users
			.get(id)
			.copied()
			.map(Some)
			.ok_or_else(|| anyhow!("unknown actor {id}"))
	}

	/// Known items, containers and users resolve to their records; anything
	/// else is a bare URI.
	pub fn resource(&self, uri: &'a Uri) -> Resource<'a> {
		if let Some(item) = self.items.get(uri) {
			return Resource::Item(item);
		}
		if let Some(container) = self.containers.get(uri) {
			return Resource::Container(container);
		}
		if let Some(user) = self.users.get(uri) {
			return Resource::User(user);
		}
		Resource::Uri(uri)
	}
}
