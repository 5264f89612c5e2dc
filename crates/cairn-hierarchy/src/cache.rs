// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::collections::HashMap;
use std::time::{Duration, Instant};

use cairn_auth_core::Uri;
use parking_lot::Mutex;

/// Longest time a name is trusted before it is looked up again.
pub const MAX_NAME_TTL: Duration = Duration::from_secs(24 * 60 * 60);

#[derive(Debug, Clone)]
struct NameEntry {
	name: String,
	expires_at: Instant,
	last_used: Instant,
}

/// Container display names with a TTL and least-recently-used eviction.
#[derive(Debug)]
pub struct NameCache {
	entries: Mutex<HashMap<Uri, NameEntry>>,
	capacity: usize,
	ttl: Duration,
}

impl NameCache {
	pub fn new(capacity: usize, ttl: Duration) -> Self {
		Self {
			entries: Mutex::new(HashMap::new()),
			capacity: capacity.max(1),
			ttl: ttl.min(MAX_NAME_TTL),
		}
	}

	pub fn get(&self, uri: &Uri) -> Option<String> {
		let now = Instant::now();
		let mut entries = self.entries.lock();

		match entries.get_mut(uri) {
			Some(entry) if entry.expires_at > now => {
				entry.last_used = now;
				Some(entry.name.clone())
			}
			Some(_) => {
				entries.remove(uri);
				None
			}
			None => None,
		}
	}

	pub fn insert(&self, uri: Uri, name: String) {
		let now = Instant::now();
		let mut entries = self.entries.lock();

		if entries.len() >= self.capacity && !entries.contains_key(&uri) {
			entries.retain(|_, entry| entry.expires_at > now);
			if entries.len() >= self.capacity {
				Self::evict_lru(&mut entries);
			}
		}

		let expires_at = now.checked_add(self.ttl).unwrap_or(now);
		entries.insert(
			uri,
			NameEntry {
				name,
				expires_at,
				last_used: now,
			},
		);
	}

	pub fn invalidate(&self, uri: &Uri) {
		self.entries.lock().remove(uri);
	}

	pub fn clear(&self) {
		self.entries.lock().clear();
	}

	pub fn len(&self) -> usize {
		self.entries.lock().len()
	}

	pub fn is_empty(&self) -> bool {
		self.entries.lock().is_empty()
	}

	fn evict_lru(entries: &mut HashMap<Uri, NameEntry>) {
		if let Some(oldest) = entries
			.iter()
			.min_by_key(|(_, entry)| entry.last_used)
			.map(|(uri, _)| uri.clone())
		{
			entries.remove(&oldest);
		}
	}
}
