// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Workflow entry points: authenticate, authorize, then validate.
//!
//! Each operation fails with the first applicable rejection, in the order
//! [`AuthError::AuthenticationRequired`], [`AuthError::NotAllowed`], then the
//! lifecycle rejection. Nothing is mutated unless every gate passes.

use cairn_auth_core::{
	Action, AuthError, AuthResult, Container, Grant, Item, ProfileShare, Resource, RoleTemplates,
	ShareRole, Status, Uri, User, WorkflowReason,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::engine::AuthorizationEngine;
use crate::lifecycle::LifecycleValidator;

/// Objects a container-level status change must be applied to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CascadePlan {
	pub root: Uri,
	pub status: Status,
	/// Every subcollection below `root`, parents first.
	pub descendants: Vec<Uri>,
}

impl CascadePlan {
	pub fn containers(&self) -> impl Iterator<Item = &Uri> {
		std::iter::once(&self.root).chain(self.descendants.iter())
	}
}

fn authenticated(actor: Option<&User>) -> AuthResult<&User> {
	actor.ok_or(AuthError::AuthenticationRequired)
}

#[derive(Debug, Clone)]
pub struct WorkflowGuard {
	engine: AuthorizationEngine,
	validator: LifecycleValidator,
	templates: RoleTemplates,
}

impl WorkflowGuard {
	pub fn new(engine: AuthorizationEngine, validator: LifecycleValidator) -> Self {
		let templates = RoleTemplates::new(engine.global_root().clone());
		Self {
			engine,
			validator,
			templates,
		}
	}

	pub fn engine(&self) -> &AuthorizationEngine {
		&self.engine
	}

	pub fn validator(&self) -> &LifecycleValidator {
		&self.validator
	}

	fn require(&self, allowed: bool, action: Action, resource: Resource<'_>) -> AuthResult<()> {
		if allowed {
			Ok(())
		} else {
			Err(AuthError::not_allowed(action, resource))
		}
	}

	fn administrable_root(&self, actor: Option<&User>, container: &Container) -> AuthResult<Uri> {
		let user = authenticated(actor)?;
		let resource = Resource::from(container);
		self.require(
			self.engine.administrate(Some(user), resource),
			Action::Administrate,
			resource,
		)?;
		container
			.id()
			.cloned()
			.ok_or_else(|| AuthError::not_allowed(Action::Administrate, resource))
	}

	fn cascade(&self, root: Uri, status: Status) -> AuthResult<CascadePlan> {
		match self.engine.snapshot().descendants(&root) {
			Ok(descendants) => Ok(CascadePlan {
				root,
				status,
				descendants,
			}),
			Err(e) => {
				warn!(root = %root, error = %e, "cannot plan status cascade");
				Err(AuthError::NotSupported(format!(
					"container hierarchy below {root} is inconsistent: {e}"
				)))
			}
		}
	}

	/// Release a root container.
	#[instrument(skip(self, actor, container), fields(container = %Resource::from(&*container)))]
	pub fn release(&self, actor: Option<&User>, container: &mut Container) -> AuthResult<CascadePlan> {
		let root = self.administrable_root(actor, &*container)?;
		self.validator.check_release(&*container)?;
		let plan = self.cascade(root, Status::Released)?;

		self.validator.prepare_release(container)?;
		info!(descendants = plan.descendants.len(), "container released");
		Ok(plan)
	}

	/// Withdraw a released root container.
	#[instrument(skip(self, actor, container, comment), fields(container = %Resource::from(&*container)))]
	pub fn withdraw(
		&self,
		actor: Option<&User>,
		container: &mut Container,
		comment: Option<&str>,
	) -> AuthResult<CascadePlan> {
		let root = self.administrable_root(actor, &*container)?;
		self.validator.check_withdraw(&*container, comment)?;
		let plan = self.cascade(root, Status::Withdrawn)?;

		self.validator.prepare_withdraw(container, comment)?;
		info!(descendants = plan.descendants.len(), "container withdrawn");
		Ok(plan)
	}

	pub fn release_item(&self, actor: Option<&User>, item: &mut Item) -> AuthResult<()> {
		let user = authenticated(actor)?;
		let resource = Resource::from(&*item);
		self.require(
			self.engine.administrate(Some(user), resource),
			Action::Administrate,
			resource,
		)?;
		self.validator.prepare_release(item)
	}

	pub fn withdraw_item(&self, actor: Option<&User>, item: &mut Item, comment: Option<&str>) -> AuthResult<()> {
		let user = authenticated(actor)?;
		let resource = Resource::from(&*item);
		self.require(
			self.engine.administrate(Some(user), resource),
			Action::Administrate,
			resource,
		)?;
		self.validator.prepare_withdraw(item, comment)
	}

	/// Moving objects into `target` needs update on the target and delete on
	/// every object. Moving into a released target additionally needs
	/// administrate on every object. Only PENDING objects can move: a batch
	/// holding a released or withdrawn object is rejected as a whole with
	/// `error_move_not_pending`, so callers wanting a partial move drop those
	/// objects before calling.
	pub fn check_move(&self, actor: Option<&User>, objects: &[Resource<'_>], target: &Container) -> AuthResult<()> {
		let user = Some(authenticated(actor)?);
		let target_resource = Resource::from(target);
		self.require(
			self.engine.update(user, target_resource),
			Action::Update,
			target_resource,
		)?;

		for object in objects {
			self.require(self.engine.delete(user, *object), Action::Delete, *object)?;
			if target.status() == Status::Released {
				self.require(
					self.engine.administrate(user, *object),
					Action::Administrate,
					*object,
				)?;
			}
		}

		if let Some(object) = objects
			.iter()
			.find(|o| o.status().is_some_and(|s| s != Status::Pending))
		{
			return Err(AuthError::workflow(WorkflowReason::MoveRequiresPending, object));
		}
		Ok(())
	}

	/// Grants to persist for sharing `target` with `role`.
	///
	/// When `profile` is given, the role is extended to it only if the sharer
	/// also administers the profile.
	pub fn authorize_share(
		&self,
		sharer: Option<&User>,
		target: Resource<'_>,
		role: ShareRole,
		profile: Option<&Uri>,
	) -> AuthResult<Vec<Grant>> {
		let user = Some(authenticated(sharer)?);
		self.require(self.engine.administrate(user, target), Action::Share, target)?;
		let target_uri = target
			.id()
			.ok_or_else(|| AuthError::not_allowed(Action::Share, target))?;

		let profile = profile.map(|uri| ProfileShare {
			uri: uri.clone(),
			sharer_administers: self.engine.administrate(user, Resource::Uri(uri)),
		});
		self
			.templates
			.share_grants(role, target_uri, profile.as_ref())
			.map_err(|e| AuthError::NotSupported(e.to_string()))
	}
}
