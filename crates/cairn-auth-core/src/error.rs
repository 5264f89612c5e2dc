// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::types::Action;

pub type AuthResult<T> = Result<T, AuthError>;

/// Typed rejection of an operation.
///
/// Decision functions only ever return booleans; callers convert a `false`
/// into [`AuthError::NotAllowed`] at their boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
	#[error("authentication required")]
	AuthenticationRequired,

	#[error("not allowed to {action} {target}")]
	NotAllowed { action: Action, target: String },

	#[error("workflow operation rejected for {subject}: {reason}")]
	WorkflowRejected {
		reason: WorkflowReason,
		subject: String,
	},

	#[error("not supported: {0}")]
	NotSupported(String),
}

impl AuthError {
	pub fn not_allowed(action: Action, target: impl fmt::Display) -> Self {
		AuthError::NotAllowed {
			action,
			target: target.to_string(),
		}
	}

	/// Rejection caused by instance configuration rather than object state.
	pub fn not_supported(reason: WorkflowReason) -> Self {
		AuthError::NotSupported(reason.to_string())
	}

	pub fn workflow(reason: WorkflowReason, subject: impl fmt::Display) -> Self {
		AuthError::WorkflowRejected {
			reason,
			subject: subject.to_string(),
		}
	}

	/// Machine-readable code for workflow rejections.
	pub fn reason_code(&self) -> Option<&'static str> {
		match self {
			AuthError::WorkflowRejected { reason, .. } => Some(reason.code()),
			_ => None,
		}
	}
}

/// Why a lifecycle transition was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowReason {
	CreateWithdrawn,
	PublicationDisabled,
	UpdateWithdrawn,
	ReleaseRequiresPending,
	WithdrawRequiresReleased,
	WithdrawCommentMissing,
	DeleteRequiresPending,
	DoiRequiresReleased,
	DoiDisabled,
	MoveRequiresPending,
}

impl WorkflowReason {
	pub fn code(self) -> &'static str {
		match self {
			WorkflowReason::CreateWithdrawn => "error_create_withdrawn",
			WorkflowReason::PublicationDisabled => "error_publication_disabled",
			WorkflowReason::UpdateWithdrawn => "error_update_withdrawn",
			WorkflowReason::ReleaseRequiresPending => "error_release_not_pending",
			WorkflowReason::WithdrawRequiresReleased => "error_withdraw_not_released",
			WorkflowReason::WithdrawCommentMissing => "error_withdraw_comment",
			WorkflowReason::DeleteRequiresPending => "error_delete_not_pending",
			WorkflowReason::DoiRequiresReleased => "error_doi_not_released",
			WorkflowReason::DoiDisabled => "error_doi_private_mode",
			WorkflowReason::MoveRequiresPending => "error_move_not_pending",
		}
	}
}

impl fmt::Display for WorkflowReason {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		let message = match self {
			WorkflowReason::CreateWithdrawn => "cannot create a withdrawn object",
			WorkflowReason::PublicationDisabled => "object publication is disabled",
			WorkflowReason::UpdateWithdrawn => "cannot update a withdrawn object",
			WorkflowReason::ReleaseRequiresPending => "only PENDING objects can be released",
			WorkflowReason::WithdrawRequiresReleased => "only RELEASED objects can be withdrawn",
			WorkflowReason::WithdrawCommentMissing => "a discard comment is required",
			WorkflowReason::DeleteRequiresPending => "only PENDING objects can be deleted",
			WorkflowReason::DoiRequiresReleased => "a DOI is only allowed for released objects",
			WorkflowReason::DoiDisabled => "a DOI is not allowed in private mode",
			WorkflowReason::MoveRequiresPending => "only PENDING objects can be moved",
		};
		f.write_str(message)
	}
}

/// A persisted grant string that does not follow `TYPE,URI`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GrantParseError {
	#[error("empty grant string")]
	Empty,

	#[error("grant '{0}' must have exactly one ',' separator")]
	Separator(String),

	#[error("unknown grant type '{0}'")]
	UnknownType(String),

	#[error("grant '{0}' has no target")]
	MissingTarget(String),

	#[error("grant target '{0}' must not contain ',' or surrounding whitespace")]
	InvalidTarget(String),
}
