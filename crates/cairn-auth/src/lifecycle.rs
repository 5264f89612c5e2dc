// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Lifecycle state machine: PENDING -> RELEASED -> WITHDRAWN.
//!
//! Each transition has a non-mutating `check_*` gate and a `prepare_*`
//! function that runs the gate and then stamps the object in place. Callers
//! persist the mutated object themselves.

use cairn_auth_core::{AuthError, AuthResult, Lifecycle, Status, Uri, User, WorkflowReason};
use cairn_config::InstanceConfig;
use chrono::Utc;
use tracing::debug;

fn subject<T: Lifecycle>(resource: &T) -> String {
	match &resource.properties().id {
		Some(id) => id.to_string(),
		None => format!("<new {}>", resource.kind().path_segment()),
	}
}

#[derive(Debug, Clone)]
pub struct LifecycleValidator {
	private_mode: bool,
	base_uri: String,
}

impl LifecycleValidator {
	pub fn new(instance: &InstanceConfig) -> Self {
		Self {
			private_mode: instance.private_mode,
			base_uri: instance.base_uri.clone(),
		}
	}

	/// Private mode disables publication of true roots. Subcollections follow
	/// their root and stay unaffected.
	fn publication_disabled<T: Lifecycle>(&self, resource: &T) -> bool {
		self.private_mode && !resource.is_subcollection()
	}

	pub fn check_create<T: Lifecycle>(&self, resource: &T) -> AuthResult<()> {
		let status = resource.status();
		if status == Status::Withdrawn {
			return Err(AuthError::workflow(
				WorkflowReason::CreateWithdrawn,
				subject(resource),
			));
		}
		if self.private_mode && status != Status::Pending {
			return Err(AuthError::workflow(
				WorkflowReason::PublicationDisabled,
				subject(resource),
			));
		}
		Ok(())
	}

	/// Assigns a fresh identifier and the creation stamps.
	pub fn prepare_create<T: Lifecycle>(&self, resource: &mut T, actor: &User) -> AuthResult<()> {
		self.check_create(resource)?;

		let now = Utc::now();
		let id = Uri::mint(&self.base_uri, resource.kind().path_segment());
		let properties = resource.properties_mut();
		properties.id = Some(id);
		properties.created_by = Some(actor.id.clone());
		properties.modified_by = Some(actor.id.clone());
		properties.created_at = Some(now);
		properties.modified_at = Some(now);

		debug!(id = ?properties.id, status = %properties.status, "prepared create");
		Ok(())
	}

	pub fn check_update<T: Lifecycle>(&self, resource: &T) -> AuthResult<()> {
		if resource.status() == Status::Withdrawn {
			return Err(AuthError::workflow(
				WorkflowReason::UpdateWithdrawn,
				subject(resource),
			));
		}
		Ok(())
	}

	pub fn prepare_update<T: Lifecycle>(&self, resource: &mut T, actor: &User) -> AuthResult<()> {
		self.check_update(resource)?;

		let properties = resource.properties_mut();
		properties.modified_by = Some(actor.id.clone());
		properties.modified_at = Some(Utc::now());
		Ok(())
	}

	/// The only gate that reports private mode as `NotSupported`; the others
	/// reject it as a workflow error.
	pub fn check_release<T: Lifecycle>(&self, resource: &T) -> AuthResult<()> {
		if self.publication_disabled(resource) {
			return Err(AuthError::not_supported(WorkflowReason::PublicationDisabled));
		}
		if resource.status() != Status::Pending {
			return Err(AuthError::workflow(
				WorkflowReason::ReleaseRequiresPending,
				subject(resource),
			));
		}
		Ok(())
	}

	pub fn prepare_release<T: Lifecycle>(&self, resource: &mut T) -> AuthResult<()> {
		self.check_release(resource)?;

		let properties = resource.properties_mut();
		properties.status = Status::Released;
		properties.version_date = Some(Utc::now());
		Ok(())
	}

	/// Whitespace-only comments count as missing.
	pub fn check_withdraw<T: Lifecycle>(&self, resource: &T, comment: Option<&str>) -> AuthResult<()> {
		if resource.status() != Status::Released {
			return Err(AuthError::workflow(
				WorkflowReason::WithdrawRequiresReleased,
				subject(resource),
			));
		}
		if comment.map(str::trim).unwrap_or_default().is_empty() {
			return Err(AuthError::workflow(
				WorkflowReason::WithdrawCommentMissing,
				subject(resource),
			));
		}
		Ok(())
	}

	pub fn prepare_withdraw<T: Lifecycle>(&self, resource: &mut T, comment: Option<&str>) -> AuthResult<()> {
		self.check_withdraw(resource, comment)?;

		let properties = resource.properties_mut();
		properties.status = Status::Withdrawn;
		properties.discard_comment = comment.map(|c| c.trim().to_string());
		properties.version_date = Some(Utc::now());
		Ok(())
	}

	pub fn check_delete<T: Lifecycle>(&self, resource: &T) -> AuthResult<()> {
		if resource.status() != Status::Pending {
			return Err(AuthError::workflow(
				WorkflowReason::DeleteRequiresPending,
				subject(resource),
			));
		}
		Ok(())
	}

	/// Only PENDING objects can ever be hard-deleted.
	pub fn is_delete_allowed<T: Lifecycle>(&self, resource: &T) -> bool {
		self.check_delete(resource).is_ok()
	}

	pub fn check_create_doi<T: Lifecycle>(&self, resource: &T) -> AuthResult<()> {
		if self.publication_disabled(resource) {
			return Err(AuthError::workflow(WorkflowReason::DoiDisabled, subject(resource)));
		}
		if resource.status() != Status::Released {
			return Err(AuthError::workflow(
				WorkflowReason::DoiRequiresReleased,
				subject(resource),
			));
		}
		Ok(())
	}

	pub fn is_create_doi_allowed<T: Lifecycle>(&self, resource: &T) -> bool {
		self.check_create_doi(resource).is_ok()
	}
}
