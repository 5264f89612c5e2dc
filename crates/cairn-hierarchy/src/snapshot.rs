// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Immutable container hierarchy index.
//!
//! A [`HierarchySnapshot`] is built in one pass from the full list of
//! `(child, parent)` container edges and never mutated afterwards. Readers
//! share it behind an `Arc`; a reload builds a new snapshot and swaps it in.
//!
//! Every walk keeps a visited set and is bounded by `max_depth`, so cyclic
//! or absurdly deep edge sets fail with a [`HierarchyError`] instead of
//! hanging.

use std::collections::{HashMap, HashSet};

use cairn_auth_core::Uri;
use chrono::{DateTime, Utc};
use tracing::warn;

use crate::error::{HierarchyError, HierarchyResult};

/// A single `child -> parent` link between two containers.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct HierarchyEdge {
	pub child: Uri,
	pub parent: Uri,
}

impl HierarchyEdge {
	pub fn new(child: impl Into<Uri>, parent: impl Into<Uri>) -> Self {
		Self {
			child: child.into(),
			parent: parent.into(),
		}
	}
}

#[derive(Debug, Clone)]
pub struct HierarchySnapshot {
	version: u64,
	built_at: Option<DateTime<Utc>>,
	max_depth: usize,
	child_to_parent: HashMap<Uri, Uri>,
	parent_to_children: HashMap<Uri, Vec<Uri>>,
}

impl HierarchySnapshot {
	/// A snapshot with no edges. Every URI is its own root.
	pub fn empty(version: u64, max_depth: usize) -> Self {
		Self {
			version,
			built_at: (version > 0).then(Utc::now),
			max_depth,
			child_to_parent: HashMap::new(),
			parent_to_children: HashMap::new(),
		}
	}

	/// Build both maps from `edges` in one pass.
	///
	/// Self-edges are skipped. When a child appears more than once, the first
	/// edge wins.
	pub fn from_edges<I>(edges: I, version: u64, max_depth: usize) -> Self
	where
		I: IntoIterator<Item = HierarchyEdge>,
	{
		let mut snapshot = Self::empty(version, max_depth);
		snapshot.built_at = Some(Utc::now());

		for HierarchyEdge { child, parent } in edges {
			if child == parent {
				warn!(uri = %child, "skipping self-referencing container edge");
				continue;
			}
			if let Some(existing) = snapshot.child_to_parent.get(&child) {
				warn!(
					child = %child,
					kept = %existing,
					ignored = %parent,
					"container has more than one parent, ignoring later edge"
				);
				continue;
			}
			snapshot
				.parent_to_children
				.entry(parent.clone())
				.or_default()
				.push(child.clone());
			snapshot.child_to_parent.insert(child, parent);
		}

		snapshot
	}

	/// 0 for the placeholder published before the first build.
	pub fn version(&self) -> u64 {
		self.version
	}

	pub fn built_at(&self) -> Option<DateTime<Utc>> {
		self.built_at
	}

	pub fn max_depth(&self) -> usize {
		self.max_depth
	}

	/// Number of child edges in the index.
	pub fn len(&self) -> usize {
		self.child_to_parent.len()
	}

	pub fn is_empty(&self) -> bool {
		self.child_to_parent.is_empty()
	}

	pub fn parent_of(&self, uri: &Uri) -> Option<&Uri> {
		self.child_to_parent.get(uri)
	}

	pub fn children_of(&self, uri: &Uri) -> &[Uri] {
		self
			.parent_to_children
			.get(uri)
			.map(Vec::as_slice)
			.unwrap_or(&[])
	}

	pub fn is_root(&self, uri: &Uri) -> bool {
		!self.child_to_parent.contains_key(uri)
	}

	/// Follow parent links until none is left.
	///
	/// A URI the index has never seen as a child is its own root, which also
	/// covers non-container identifiers.
	pub fn root_ancestor(&self, uri: &Uri) -> HierarchyResult<Uri> {
		Ok(self
			.ancestors(uri)?
			.pop()
			.unwrap_or_else(|| uri.clone()))
	}

	/// Chain from the immediate parent up to the root. Empty for roots.
	pub fn ancestors(&self, uri: &Uri) -> HierarchyResult<Vec<Uri>> {
		let mut chain = Vec::new();
		let mut seen: HashSet<&Uri> = HashSet::from([uri]);
		let mut current = uri;

		while let Some(parent) = self.child_to_parent.get(current) {
			if !seen.insert(parent) {
				warn!(start = %uri, at = %parent, "cycle while walking container ancestors");
				return Err(HierarchyError::Cycle {
					uri: parent.clone(),
				});
			}
			if chain.len() >= self.max_depth {
				warn!(start = %uri, max_depth = self.max_depth, "container ancestry too deep");
				return Err(HierarchyError::DepthExceeded {
					uri: uri.clone(),
					max_depth: self.max_depth,
				});
			}
			chain.push(parent.clone());
			current = parent;
		}

		Ok(chain)
	}

	/// Every container below `uri`, depth first, parents before children.
	/// Does not include `uri` itself.
	pub fn descendants(&self, uri: &Uri) -> HierarchyResult<Vec<Uri>> {
		let mut out = Vec::new();
		let mut seen: HashSet<&Uri> = HashSet::from([uri]);
		self.collect_descendants(uri, uri, 1, &mut seen, &mut out)?;
		Ok(out)
	}

	fn collect_descendants<'a>(
		&'a self,
		start: &Uri,
		uri: &'a Uri,
		depth: usize,
		seen: &mut HashSet<&'a Uri>,
		out: &mut Vec<Uri>,
	) -> HierarchyResult<()> {
		let children = self.children_of(uri);
		if children.is_empty() {
			return Ok(());
		}
		if depth > self.max_depth {
			warn!(start = %start, max_depth = self.max_depth, "container subtree too deep");
			return Err(HierarchyError::DepthExceeded {
				uri: start.clone(),
				max_depth: self.max_depth,
			});
		}

		for child in children {
			if !seen.insert(child) {
				warn!(start = %start, at = %child, "cycle while walking container subtree");
				return Err(HierarchyError::Cycle { uri: child.clone() });
			}
			out.push(child.clone());
			self.collect_descendants(start, child, depth + 1, seen, out)?;
		}
		Ok(())
	}

	/// True if `ancestor` lies on the parent chain of `uri`.
	pub fn is_descendant_of(&self, uri: &Uri, ancestor: &Uri) -> HierarchyResult<bool> {
		Ok(self.ancestors(uri)?.contains(ancestor))
	}
}
