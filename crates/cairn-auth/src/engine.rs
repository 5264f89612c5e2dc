// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization decision engine.
//!
//! Every decision combines three checks, in this order:
//!
//! 1. **Public status**: released and withdrawn objects are readable by anyone,
//!    unless the instance runs in private mode and the actor is anonymous
//! 2. **Sysadmin override**: ADMIN at the global root allows everything
//! 3. **Grant lookup**: the actor's consolidated grants are matched against the
//!    resource's root container, never against the resource itself
//!
//! All functions are pure over the engine's snapshot and configuration and
//! never fail. A hierarchy error during root resolution denies the grant
//! lookup and is logged; the overrides are unaffected.

use std::sync::Arc;

use cairn_auth_core::{
	allowed_targets, Action, GrantType, Resource, ResourceKind, Uri, User,
};
use cairn_config::InstanceConfig;
use cairn_hierarchy::{HierarchyResult, HierarchySnapshot};
use tracing::{debug, instrument, warn};

const ANY_GRANT: &[GrantType] = &[GrantType::Read, GrantType::Edit, GrantType::Admin];
const EDIT_OR_ADMIN: &[GrantType] = &[GrantType::Edit, GrantType::Admin];

fn actor_label(actor: Option<&User>) -> &str {
	actor.map(|u| u.id.as_str()).unwrap_or("anonymous")
}

#[derive(Debug, Clone)]
pub struct AuthorizationEngine {
	snapshot: Arc<HierarchySnapshot>,
	global_root: Uri,
	private_mode: bool,
}

impl AuthorizationEngine {
	pub fn new(snapshot: Arc<HierarchySnapshot>, instance: &InstanceConfig) -> Self {
		Self {
			snapshot,
			global_root: Uri::new(instance.global_root_uri.clone()),
			private_mode: instance.private_mode,
		}
	}

	pub fn snapshot(&self) -> &Arc<HierarchySnapshot> {
		&self.snapshot
	}

	pub fn global_root(&self) -> &Uri {
		&self.global_root
	}

	pub fn private_mode(&self) -> bool {
		self.private_mode
	}

	/// Dispatch on [`Action`].
	#[instrument(
		level = "debug",
		skip(self, actor, resource),
		fields(actor = actor_label(actor), action = %action, resource = %resource)
	)]
	pub fn is_allowed(&self, actor: Option<&User>, action: Action, resource: Resource<'_>) -> bool {
		let allowed = match action {
			Action::Create => self.create(actor, resource),
			Action::Read => self.read(actor, resource),
			Action::Update => self.update(actor, resource),
			Action::Delete => self.delete(actor, resource),
			Action::Administrate | Action::Share => self.administrate(actor, resource),
		};
		debug!(allowed, "authorization decision");
		allowed
	}

	/// ADMIN at the global root.
	pub fn is_sysadmin(&self, actor: Option<&User>) -> bool {
		actor.is_some_and(|user| {
			user
				.all_grants()
				.has_exact(GrantType::Admin, &self.global_root)
		})
	}

	/// EDIT at the global root, which allows creating root containers.
	pub fn has_create_collection_grant(&self, actor: Option<&User>) -> bool {
		actor.is_some_and(|user| {
			user
				.all_grants()
				.has_exact(GrantType::Edit, &self.global_root)
		})
	}

	pub fn is_public(&self, resource: Resource<'_>, actor: Option<&User>) -> bool {
		match resource {
			Resource::Organization(_) | Resource::Person(_) => true,
			_ if self.private_mode && actor.is_none() => false,
			Resource::Item(item) => item.status().is_public(),
			Resource::Container(container) => container.status().is_public(),
			Resource::User(_) | Resource::UserGroup(_) | Resource::Statement(_) | Resource::Uri(_) => {
				false
			}
		}
	}

	pub fn is_discarded(&self, resource: Resource<'_>) -> bool {
		resource.status().is_some_and(|status| status.is_discarded())
	}

	/// True for containers with a parent, and for bare URIs the index knows
	/// to have one.
	pub fn is_subcollection(&self, resource: Resource<'_>) -> bool {
		match resource {
			Resource::Container(container) => container.is_subcollection(),
			Resource::Uri(uri) => !self.snapshot.is_root(uri),
			_ => false,
		}
	}

	/// URI that grants for `resource` are recorded against.
	pub fn root_key(&self, resource: Resource<'_>) -> HierarchyResult<Uri> {
		match resource {
			Resource::Item(item) => self.snapshot.root_ancestor(&item.container),
			Resource::Container(container) => match container.id() {
				Some(id) => self.snapshot.root_ancestor(id),
				None => {
					warn!("container without id, using global root");
					Ok(self.global_root.clone())
				}
			},
			Resource::User(user) => Ok(user.id.clone()),
			Resource::Uri(uri) => self.snapshot.root_ancestor(uri),
			Resource::UserGroup(_) | Resource::Statement(_) => Ok(self.global_root.clone()),
			Resource::Organization(uri) | Resource::Person(uri) => {
				warn!(
					resource = %uri,
					kind = ?resource.kind(),
					"no hierarchy root for resource kind, using global root"
				);
				Ok(self.global_root.clone())
			}
		}
	}

	/// Grant lookup at the root key. Denies on hierarchy errors.
	fn holds_at_root(&self, actor: Option<&User>, types: &[GrantType], resource: Resource<'_>) -> bool {
		let Some(user) = actor else {
			return false;
		};
		match self.root_key(resource) {
			Ok(key) => user.all_grants().has_any_of(types, &key),
			Err(e) => {
				warn!(
					actor = %user.id,
					resource = %resource,
					error = %e,
					"root resolution failed, denying grant lookup"
				);
				false
			}
		}
	}

	#[instrument(level = "debug", skip(self, actor, resource), fields(actor = actor_label(actor), resource = %resource))]
	pub fn read(&self, actor: Option<&User>, resource: Resource<'_>) -> bool {
		self.is_public(resource, actor)
			|| self.is_sysadmin(actor)
			|| self.holds_at_root(actor, ANY_GRANT, resource)
	}

	#[instrument(level = "debug", skip(self, actor, resource), fields(actor = actor_label(actor), resource = %resource))]
	pub fn update(&self, actor: Option<&User>, resource: Resource<'_>) -> bool {
		self.is_sysadmin(actor) || self.holds_at_root(actor, EDIT_OR_ADMIN, resource)
	}

	/// Items follow `update`; everything else follows `administrate`.
	pub fn delete(&self, actor: Option<&User>, resource: Resource<'_>) -> bool {
		match resource {
			Resource::Item(_) => self.update(actor, resource),
			_ => self.administrate(actor, resource),
		}
	}

	/// Pinned to true roots: never allowed on a subcollection.
	#[instrument(level = "debug", skip(self, actor, resource), fields(actor = actor_label(actor), resource = %resource))]
	pub fn administrate(&self, actor: Option<&User>, resource: Resource<'_>) -> bool {
		if self.is_subcollection(resource) {
			return false;
		}
		self.is_sysadmin(actor) || self.holds_at_root(actor, &[GrantType::Admin], resource)
	}

	pub fn create(&self, actor: Option<&User>, resource: Resource<'_>) -> bool {
		match resource {
			Resource::Item(item) => self.update(actor, Resource::Uri(&item.container)),
			Resource::Container(_) => {
				self.has_create_collection_grant(actor) || self.is_sysadmin(actor)
			}
			_ => self.is_sysadmin(actor),
		}
	}

	/// Explicitly shared with the actor, ignoring public status.
	pub fn is_shared(&self, actor: Option<&User>, resource: Resource<'_>) -> bool {
		self.holds_at_root(actor, ANY_GRANT, resource)
	}

	/// Containers the actor holds any grant on, for scoping searches.
	pub fn allowed_containers(&self, actor: Option<&User>) -> Vec<Uri> {
		let fragment = format!("/{}/", ResourceKind::Container.path_segment());
		allowed_targets(actor, &fragment)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use cairn_auth_core::{Container, Grant, Item, Status, UserGroup};
	use cairn_hierarchy::HierarchyEdge;

	const ROOT: &str = "http://localhost/cairn/";

	fn instance(private_mode: bool) -> InstanceConfig {
		InstanceConfig::default().with_private_mode(private_mode)
	}

	/// c1 <- s1 <- s2, c2 standalone.
	fn engine(private_mode: bool) -> AuthorizationEngine {
		let snapshot = HierarchySnapshot::from_edges(
			vec![
				HierarchyEdge::new("urn:s1", "urn:c1"),
				HierarchyEdge::new("urn:s2", "urn:s1"),
			],
			1,
			256,
		);
		AuthorizationEngine::new(Arc::new(snapshot), &instance(private_mode))
	}

	fn owner() -> User {
		User::new("urn:user:owner").with_grant(Grant::admin("urn:c1"))
	}

	fn stranger() -> User {
		User::new("urn:user:stranger")
	}

	fn sysadmin() -> User {
		User::new("urn:user:root").with_grant(Grant::admin(ROOT))
	}

	mod overrides {
		use super::*;

		#[test]
		fn sysadmin_requires_admin_at_global_root() {
			let engine = engine(false);
			assert!(engine.is_sysadmin(Some(&sysadmin())));
			assert!(!engine.is_sysadmin(Some(&owner())));
			assert!(!engine.is_sysadmin(None));
		}

		#[test]
		fn sysadmin_via_group() {
			let engine = engine(false);
			let admins = UserGroup::new("urn:group:admins", "admins").with_grant(Grant::admin(ROOT));
			let user = stranger().with_group(admins);
			assert!(engine.is_sysadmin(Some(&user)));
			assert!(engine.update(Some(&user), Resource::from(&Container::new("urn:c2"))));
		}

		#[test]
		fn organizations_and_people_are_public() {
			let engine = engine(true);
			let org = Uri::from("urn:org:1");
			assert!(engine.read(None, Resource::Organization(&org)));
			assert!(engine.read(None, Resource::Person(&org)));
		}

		#[test]
		fn released_and_withdrawn_are_public() {
			let engine = engine(false);
			for status in [Status::Released, Status::Withdrawn] {
				let c = Container::new("urn:c1").with_status(status);
				assert!(engine.read(None, Resource::from(&c)));
				assert!(engine.read(Some(&stranger()), Resource::from(&c)));
			}
			let pending = Container::new("urn:c1");
			assert!(!engine.read(None, Resource::from(&pending)));
		}

		#[test]
		fn private_mode_hides_released_from_anonymous() {
			let engine = engine(true);
			let c = Container::new("urn:c1").with_status(Status::Released);
			assert!(!engine.read(None, Resource::from(&c)));
			assert!(engine.read(Some(&stranger()), Resource::from(&c)));
		}

		#[test]
		fn discarded_means_withdrawn() {
			let engine = engine(false);
			let withdrawn = Item::new("urn:i1", "urn:c1").with_status(Status::Withdrawn);
			let released = Item::new("urn:i2", "urn:c1").with_status(Status::Released);
			let uri = Uri::from("urn:c1");
			assert!(engine.is_discarded(Resource::from(&withdrawn)));
			assert!(!engine.is_discarded(Resource::from(&released)));
			assert!(!engine.is_discarded(Resource::Uri(&uri)));
		}
	}

	mod root_key {
		use super::*;

		#[test]
		fn items_resolve_through_container() {
			let engine = engine(false);
			let item = Item::new("urn:i1", "urn:s2");
			assert_eq!(engine.root_key(Resource::from(&item)), Ok(Uri::from("urn:c1")));
		}

		#[test]
		fn users_are_their_own_key() {
			let engine = engine(false);
			let user = stranger();
			assert_eq!(engine.root_key(Resource::from(&user)), Ok(user.id.clone()));
		}

		#[test]
		fn groups_and_statements_use_global_root() {
			let engine = engine(false);
			let group = UserGroup::new("urn:group:1", "g");
			let statement = Uri::from("urn:statement:1");
			assert_eq!(engine.root_key(Resource::from(&group)), Ok(Uri::from(ROOT)));
			assert_eq!(
				engine.root_key(Resource::Statement(&statement)),
				Ok(Uri::from(ROOT))
			);
		}

		#[test]
		fn draft_container_uses_global_root() {
			let engine = engine(false);
			let draft = Container::draft();
			assert_eq!(engine.root_key(Resource::from(&draft)), Ok(Uri::from(ROOT)));
		}
	}

	mod grants {
		use super::*;

		#[test]
		fn admin_at_root_cascades_to_subcollections() {
			let engine = engine(false);
			let sub = Container::new("urn:s2").with_parent("urn:s1");
			assert!(engine.read(Some(&owner()), Resource::from(&sub)));
			assert!(engine.update(Some(&owner()), Resource::from(&sub)));
			assert!(!engine.administrate(Some(&owner()), Resource::from(&sub)));
		}

		#[test]
		fn grants_on_subcollections_never_match() {
			let engine = engine(false);
			let user = stranger().with_grant(Grant::admin("urn:s1"));
			let sub = Container::new("urn:s1").with_parent("urn:c1");
			assert!(!engine.read(Some(&user), Resource::from(&sub)));
			assert!(!engine.update(Some(&user), Resource::from(&sub)));
		}

		#[test]
		fn read_grant_does_not_allow_update() {
			let engine = engine(false);
			let reader = stranger().with_grant(Grant::read("urn:c1"));
			let item = Item::new("urn:i1", "urn:s2");
			assert!(engine.read(Some(&reader), Resource::from(&item)));
			assert!(!engine.update(Some(&reader), Resource::from(&item)));
			assert!(engine.is_shared(Some(&reader), Resource::from(&item)));
		}

		#[test]
		fn edit_grant_allows_item_delete_but_not_container_delete() {
			let engine = engine(false);
			let editor = stranger().with_grant(Grant::edit("urn:c1"));
			let item = Item::new("urn:i1", "urn:c1");
			let root = Container::new("urn:c1");
			assert!(engine.delete(Some(&editor), Resource::from(&item)));
			assert!(!engine.delete(Some(&editor), Resource::from(&root)));
			assert!(engine.delete(Some(&owner()), Resource::from(&root)));
		}

		#[test]
		fn bare_subcollection_uri_cannot_be_administrated() {
			let engine = engine(false);
			let sub = Uri::from("urn:s1");
			let root = Uri::from("urn:c1");
			assert!(!engine.administrate(Some(&owner()), Resource::Uri(&sub)));
			assert!(engine.administrate(Some(&owner()), Resource::Uri(&root)));
		}

		#[test]
		fn public_status_is_not_sharing() {
			let engine = engine(false);
			let c = Container::new("urn:c1").with_status(Status::Released);
			assert!(engine.read(Some(&stranger()), Resource::from(&c)));
			assert!(!engine.is_shared(Some(&stranger()), Resource::from(&c)));
		}
	}

	mod create {
		use super::*;

		#[test]
		fn items_need_update_on_container() {
			let engine = engine(false);
			let item = Item::draft("urn:s1");
			assert!(engine.create(Some(&owner()), Resource::from(&item)));
			assert!(!engine.create(Some(&stranger()), Resource::from(&item)));
		}

		#[test]
		fn containers_need_create_collection_grant() {
			let engine = engine(false);
			let draft = Container::draft();
			let creator = stranger().with_grant(Grant::edit(ROOT));
			assert!(engine.has_create_collection_grant(Some(&creator)));
			assert!(engine.create(Some(&creator), Resource::from(&draft)));
			assert!(!engine.create(Some(&owner()), Resource::from(&draft)));
			assert!(engine.create(Some(&sysadmin()), Resource::from(&draft)));
			assert!(!engine.create(None, Resource::from(&draft)));
		}

		#[test]
		fn other_kinds_need_sysadmin() {
			let engine = engine(false);
			let group = UserGroup::new("urn:group:1", "g");
			assert!(!engine.create(Some(&owner()), Resource::from(&group)));
			assert!(engine.create(Some(&sysadmin()), Resource::from(&group)));
		}
	}

	mod failures {
		use super::*;

		fn cyclic_engine() -> AuthorizationEngine {
			let snapshot = HierarchySnapshot::from_edges(
				vec![
					HierarchyEdge::new("urn:a", "urn:b"),
					HierarchyEdge::new("urn:b", "urn:a"),
				],
				1,
				256,
			);
			AuthorizationEngine::new(Arc::new(snapshot), &instance(false))
		}

		#[test]
		fn hierarchy_error_denies_grant_lookup() {
			let engine = cyclic_engine();
			let user = stranger().with_grant(Grant::admin("urn:a")).with_grant(Grant::admin("urn:b"));
			let uri = Uri::from("urn:a");
			assert!(!engine.read(Some(&user), Resource::Uri(&uri)));
			assert!(!engine.update(Some(&user), Resource::Uri(&uri)));
		}

		#[test]
		fn overrides_survive_hierarchy_errors() {
			let engine = cyclic_engine();
			let uri = Uri::from("urn:a");
			assert!(engine.update(Some(&sysadmin()), Resource::Uri(&uri)));
			let released = Container::new("urn:a").with_status(Status::Released);
			assert!(engine.read(None, Resource::from(&released)));
		}

		#[test]
		fn anonymous_holds_nothing() {
			let engine = engine(false);
			let uri = Uri::from("urn:c1");
			for action in Action::all() {
				assert!(!engine.is_allowed(None, *action, Resource::Uri(&uri)));
			}
		}
	}

	#[test]
	fn allowed_containers_filters_collection_targets() {
		let engine = engine(false);
		let user = stranger()
			.with_grant(Grant::admin("http://localhost/cairn/collection/1"))
			.with_grant(Grant::read("http://localhost/cairn/item/1"));
		assert_eq!(
			engine.allowed_containers(Some(&user)),
			vec![Uri::from("http://localhost/cairn/collection/1")]
		);
	}

	mod property_tests {
		use super::*;
		use proptest::prelude::*;

		fn arb_status() -> impl Strategy<Value = Status> {
			prop_oneof![
				Just(Status::Pending),
				Just(Status::Released),
				Just(Status::Withdrawn),
			]
		}

		fn arb_grant_type() -> impl Strategy<Value = GrantType> {
			prop_oneof![
				Just(GrantType::Read),
				Just(GrantType::Edit),
				Just(GrantType::Admin),
			]
		}

		fn arb_target() -> impl Strategy<Value = &'static str> {
			prop_oneof![
				Just("urn:c1"),
				Just("urn:s1"),
				Just("urn:s2"),
				Just("urn:c2"),
				Just(ROOT),
			]
		}

		fn arb_actor() -> impl Strategy<Value = Option<User>> {
			proptest::option::of(
				proptest::collection::vec((arb_grant_type(), arb_target()), 0..4).prop_map(|grants| {
					User::new("urn:user:p")
						.with_grants(grants.into_iter().map(|(t, target)| Grant::new(t, target)))
				}),
			)
		}

		proptest! {
				#[test]
				fn admin_at_root_grants_update_and_read_below(
						container in prop_oneof![Just("urn:c1"), Just("urn:s1"), Just("urn:s2")],
						status in arb_status(),
				) {
						let engine = engine(false);
						let user = owner();
						let item = Item::new("urn:i", container).with_status(status);
						prop_assert!(engine.update(Some(&user), Resource::from(&item)));
						prop_assert!(engine.read(Some(&user), Resource::from(&item)));
				}

				#[test]
				fn public_statuses_are_always_readable(
						actor in arb_actor(),
						status in prop_oneof![Just(Status::Released), Just(Status::Withdrawn)],
				) {
						let engine = engine(false);
						let c = Container::new("urn:c2").with_status(status);
						prop_assert!(engine.read(actor.as_ref(), Resource::from(&c)));
				}

				#[test]
				fn private_mode_locks_out_anonymous(status in arb_status(), container in arb_target()) {
						let engine = engine(true);
						let c = Container::new(container).with_status(status);
						let item = Item::new("urn:i", container).with_status(status);
						prop_assert!(!engine.read(None, Resource::from(&c)));
						prop_assert!(!engine.read(None, Resource::from(&item)));
				}

				#[test]
				fn subcollections_never_administrated(actor in arb_actor()) {
						let engine = engine(false);
						let sub = Container::new("urn:s1").with_parent("urn:c1");
						prop_assert!(!engine.administrate(actor.as_ref(), Resource::from(&sub)));
				}

				#[test]
				fn update_implies_read(actor in arb_actor(), status in arb_status(), container in arb_target()) {
						let engine = engine(false);
						let item = Item::new("urn:i", container).with_status(status);
						if engine.update(actor.as_ref(), Resource::from(&item)) {
								prop_assert!(engine.read(actor.as_ref(), Resource::from(&item)));
						}
				}
		}
	}
}
