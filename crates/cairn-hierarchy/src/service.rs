// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Owned hierarchy service.
//!
//! The service publishes the current [`HierarchySnapshot`] through a
//! `tokio::sync::watch` channel. Readers clone the `Arc` and work against an
//! immutable snapshot; a rebuild constructs the replacement completely before
//! swapping it in, so no reader ever sees a half-built index.
//!
//! Rebuilds are driven by [`HierarchyEvent`]s sent through a
//! [`HierarchyNotifier`]. Between a structural change in the store and the
//! matching rebuild, readers keep seeing the previous snapshot. Stale reads
//! in that window are accepted.

use std::sync::Arc;

use cairn_auth_core::{ResourceKind, Uri};
use cairn_config::HierarchyConfig;
use tokio::sync::{mpsc, watch, Mutex};
use tracing::{debug, error, info, instrument, warn};

use crate::cache::NameCache;
use crate::error::{HierarchyError, HierarchyResult};
use crate::snapshot::HierarchySnapshot;
use crate::store::HierarchyStore;

/// Topology change reported by a collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HierarchyEvent {
	ContainerCreated(Uri),
	ContainerMoved(Uri),
	ContainerDeleted(Uri),
	/// Rebuild without a specific cause.
	Refresh,
}

struct Inner {
	store: Arc<dyn HierarchyStore>,
	config: HierarchyConfig,
	published: watch::Sender<Arc<HierarchySnapshot>>,
	rebuild: Mutex<()>,
	names: NameCache,
}

#[derive(Clone)]
pub struct HierarchyService {
	inner: Arc<Inner>,
}

impl HierarchyService {
	/// Creates the service without touching the store. The first call to
	/// [`HierarchyService::snapshot`] builds the index.
	pub fn new(store: Arc<dyn HierarchyStore>, config: HierarchyConfig) -> Self {
		let placeholder = Arc::new(HierarchySnapshot::empty(0, config.max_depth));
		let (published, _) = watch::channel(placeholder);
		let names = NameCache::new(config.name_cache_capacity, config.name_cache_ttl());

		Self {
			inner: Arc::new(Inner {
				store,
				config,
				published,
				rebuild: Mutex::new(()),
				names,
			}),
		}
	}

	pub fn config(&self) -> &HierarchyConfig {
		&self.inner.config
	}

	/// The latest published snapshot, without any I/O. Version 0 means the
	/// index has not been built yet.
	pub fn current(&self) -> Arc<HierarchySnapshot> {
		self.inner.published.borrow().clone()
	}

	/// The latest snapshot, building it first if this is the first use.
	///
	/// Never fails: if the first build cannot reach the store, an empty
	/// snapshot is published and every URI resolves to itself.
	pub async fn snapshot(&self) -> Arc<HierarchySnapshot> {
		let current = self.current();
		if current.version() > 0 {
			return current;
		}

		let _guard = self.inner.rebuild.lock().await;
		let current = self.current();
		if current.version() > 0 {
			return current;
		}
		match self.rebuild_locked().await {
			Ok(snapshot) => snapshot,
			Err(_) => self.current(),
		}
	}

	/// Rebuild from the store and publish the result.
	///
	/// On failure the previously published snapshot stays in place.
	pub async fn reload(&self) -> HierarchyResult<Arc<HierarchySnapshot>> {
		let _guard = self.inner.rebuild.lock().await;
		self.rebuild_locked().await
	}

	#[instrument(level = "debug", skip(self))]
	async fn rebuild_locked(&self) -> HierarchyResult<Arc<HierarchySnapshot>> {
		let previous = self.current();
		let version = previous.version() + 1;

		match self.inner.store.list_container_edges().await {
			Ok(edges) => {
				let snapshot = Arc::new(HierarchySnapshot::from_edges(
					edges,
					version,
					self.inner.config.max_depth,
				));
				self.inner.published.send_replace(Arc::clone(&snapshot));
				self.inner.names.clear();
				info!(version, edges = snapshot.len(), "hierarchy snapshot published");
				Ok(snapshot)
			}
			Err(e) => {
				if previous.version() == 0 {
					let empty = Arc::new(HierarchySnapshot::empty(version, self.inner.config.max_depth));
					self.inner.published.send_replace(empty);
					error!(error = %e, version, "initial hierarchy build failed, published empty snapshot");
				} else {
					error!(
						error = %e,
						kept_version = previous.version(),
						"hierarchy reload failed, keeping previous snapshot"
					);
				}
				Err(HierarchyError::Store(e))
			}
		}
	}

	/// Receiver that observes every published snapshot.
	pub fn subscribe(&self) -> watch::Receiver<Arc<HierarchySnapshot>> {
		self.inner.published.subscribe()
	}

	/// Display name of a container, served from the bounded name cache.
	pub async fn container_name(&self, uri: &Uri) -> HierarchyResult<Option<String>> {
		if let Some(name) = self.inner.names.get(uri) {
			return Ok(Some(name));
		}

		let name = self.inner.store.container_name(uri).await?;
		if let Some(name) = &name {
			self.inner.names.insert(uri.clone(), name.clone());
		}
		Ok(name)
	}

	/// Root container owning an arbitrary URI. Items resolve through their
	/// container; anything the store does not know is treated as a container.
	pub async fn owning_root(&self, uri: &Uri) -> HierarchyResult<Uri> {
		let resolved = self.inner.store.resolve(uri).await?;
		let snapshot = self.snapshot().await;

		match resolved {
			Some(object) if object.kind == ResourceKind::Item => match object.container {
				Some(container) => snapshot.root_ancestor(&container),
				None => {
					warn!(uri = %uri, "item without an owning container");
					Ok(uri.clone())
				}
			},
			_ => snapshot.root_ancestor(uri),
		}
	}

	/// Start the background task that rebuilds on [`HierarchyEvent`]s.
	///
	/// The task stops once every [`HierarchyNotifier`] has been dropped.
	pub fn spawn_listener(&self) -> HierarchyNotifier {
		let (tx, rx) = mpsc::channel(self.inner.config.event_queue_capacity);
		tokio::spawn(Self::listen(self.clone(), rx));
		HierarchyNotifier { tx }
	}

	async fn listen(service: HierarchyService, mut rx: mpsc::Receiver<HierarchyEvent>) {
		while let Some(event) = rx.recv().await {
			let mut coalesced = 0usize;
			while rx.try_recv().is_ok() {
				coalesced += 1;
			}
			debug!(?event, coalesced, "hierarchy change received");

			// Failure is logged in rebuild_locked and the previous snapshot kept.
			let _ = service.reload().await;
		}
		debug!("hierarchy listener stopped");
	}
}

/// Fire-and-forget handle for reporting topology changes.
#[derive(Clone)]
pub struct HierarchyNotifier {
	tx: mpsc::Sender<HierarchyEvent>,
}

impl HierarchyNotifier {
	/// Queue a rebuild.
	///
	/// A full queue already holds a pending rebuild, so the event is dropped
	/// and still reported as accepted. Returns false only if the listener is
	/// gone.
	pub fn notify(&self, event: HierarchyEvent) -> bool {
		match self.tx.try_send(event) {
			Ok(()) => true,
			Err(mpsc::error::TrySendError::Full(event)) => {
				debug!(?event, "hierarchy rebuild already pending");
				true
			}
			Err(mpsc::error::TrySendError::Closed(event)) => {
				warn!(?event, "hierarchy listener is not running");
				false
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::memory::InMemoryHierarchyStore;
	use std::time::Duration;
	use tokio::time::timeout;

	fn config() -> HierarchyConfig {
		HierarchyConfig {
			max_depth: 256,
			name_cache_capacity: 16,
			name_cache_ttl_secs: 300,
			event_queue_capacity: 4,
		}
	}

	fn store() -> Arc<InMemoryHierarchyStore> {
		let store = Arc::new(InMemoryHierarchyStore::new());
		store.insert_container("urn:c1", None, "Root");
		store.insert_container("urn:s1", Some(Uri::from("urn:c1")), "Sub");
		store.insert_container("urn:s2", Some(Uri::from("urn:s1")), "Subsub");
		store.insert_item("urn:i1", "urn:s2");
		store
	}

	fn service(store: &Arc<InMemoryHierarchyStore>) -> HierarchyService {
		HierarchyService::new(store.clone(), config())
	}

	mod lifecycle {
		use super::*;

		#[tokio::test]
		async fn builds_lazily_once() {
			let store = store();
			let service = service(&store);
			assert_eq!(service.current().version(), 0);
			assert_eq!(store.edge_loads(), 0);

			let snapshot = service.snapshot().await;
			assert_eq!(snapshot.version(), 1);
			assert_eq!(snapshot.len(), 2);

			service.snapshot().await;
			assert_eq!(store.edge_loads(), 1);
		}

		#[tokio::test]
		async fn reload_publishes_new_version() {
			let store = store();
			let service = service(&store);
			let mut rx = service.subscribe();
			service.snapshot().await;

			store.move_container(&Uri::from("urn:s2"), None);
			let snapshot = service.reload().await.unwrap();

			assert_eq!(snapshot.version(), 2);
			assert!(snapshot.is_root(&Uri::from("urn:s2")));
			assert!(rx.has_changed().unwrap());
			assert_eq!(rx.borrow_and_update().version(), 2);
		}

		#[tokio::test]
		async fn failed_reload_keeps_previous_snapshot() {
			let store = store();
			let service = service(&store);
			service.snapshot().await;

			store.set_unavailable(true);
			let result = service.reload().await;

			assert!(matches!(result, Err(HierarchyError::Store(_))));
			let current = service.current();
			assert_eq!(current.version(), 1);
			assert_eq!(
				current.root_ancestor(&Uri::from("urn:s2")),
				Ok(Uri::from("urn:c1"))
			);
		}

		#[tokio::test]
		async fn failed_first_build_publishes_empty_snapshot() {
			let store = store();
			store.set_unavailable(true);
			let service = service(&store);

			let snapshot = service.snapshot().await;
			assert_eq!(snapshot.version(), 1);
			assert!(snapshot.is_empty());
			assert_eq!(
				snapshot.root_ancestor(&Uri::from("urn:s2")),
				Ok(Uri::from("urn:s2"))
			);

			// No retry on every read; the next reload recovers.
			service.snapshot().await;
			assert_eq!(store.edge_loads(), 1);
			store.set_unavailable(false);
			assert_eq!(service.reload().await.unwrap().len(), 2);
		}

		#[tokio::test]
		async fn concurrent_first_use_builds_once() {
			let store = store();
			let service = service(&store);

			let handles: Vec<_> = (0..8)
				.map(|_| {
					let service = service.clone();
					tokio::spawn(async move { service.snapshot().await.version() })
				})
				.collect();
			for handle in handles {
				assert_eq!(handle.await.unwrap(), 1);
			}
			assert_eq!(store.edge_loads(), 1);
		}
	}

	mod lookups {
		use super::*;

		#[tokio::test]
		async fn owning_root_resolves_items_through_container() {
			let store = store();
			let service = service(&store);

			assert_eq!(
				service.owning_root(&Uri::from("urn:i1")).await,
				Ok(Uri::from("urn:c1"))
			);
			assert_eq!(
				service.owning_root(&Uri::from("urn:s1")).await,
				Ok(Uri::from("urn:c1"))
			);
			assert_eq!(
				service.owning_root(&Uri::from("urn:unknown")).await,
				Ok(Uri::from("urn:unknown"))
			);
		}

		#[tokio::test]
		async fn container_names_are_cached() {
			let store = store();
			let service = service(&store);
			let c1 = Uri::from("urn:c1");

			assert_eq!(service.container_name(&c1).await, Ok(Some("Root".to_string())));
			assert_eq!(service.container_name(&c1).await, Ok(Some("Root".to_string())));
			assert_eq!(store.name_loads(), 1);

			assert_eq!(service.container_name(&Uri::from("urn:none")).await, Ok(None));
		}

		#[tokio::test]
		async fn reload_clears_name_cache() {
			let store = store();
			let service = service(&store);
			let c1 = Uri::from("urn:c1");

			service.container_name(&c1).await.unwrap();
			store.insert_container("urn:c1", None, "Renamed");
			service.reload().await.unwrap();

			assert_eq!(service.container_name(&c1).await, Ok(Some("Renamed".to_string())));
		}
	}

	mod listener {
		use super::*;

		#[tokio::test]
		async fn event_triggers_rebuild() {
			let store = store();
			let service = service(&store);
			service.snapshot().await;
			let mut rx = service.subscribe();
			let notifier = service.spawn_listener();

			store.insert_container("urn:s3", Some(Uri::from("urn:s2")), "Deep");
			assert!(notifier.notify(HierarchyEvent::ContainerCreated(Uri::from("urn:s3"))));

			timeout(Duration::from_secs(5), rx.changed())
				.await
				.expect("rebuild timed out")
				.unwrap();
			let snapshot = rx.borrow().clone();
			assert_eq!(
				snapshot.root_ancestor(&Uri::from("urn:s3")),
				Ok(Uri::from("urn:c1"))
			);
		}

		#[tokio::test]
		async fn notify_after_listener_stops_reports_false() {
			let store = store();
			let service = service(&store);
			let (tx, rx) = mpsc::channel(1);
			drop(rx);
			let notifier = HierarchyNotifier { tx };
			assert!(!notifier.notify(HierarchyEvent::Refresh));
			assert_eq!(service.current().version(), 0);
		}

		#[tokio::test]
		async fn full_queue_still_accepts() {
			let (tx, _rx) = mpsc::channel(1);
			let notifier = HierarchyNotifier { tx };
			assert!(notifier.notify(HierarchyEvent::Refresh));
			assert!(notifier.notify(HierarchyEvent::Refresh));
		}
	}
}
