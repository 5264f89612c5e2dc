// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Core type definitions shared by the authorization components.
//!
//! - [`Uri`]: identifier of every resource, actor and group
//! - [`Status`]: lifecycle status carried by items and containers
//! - [`Action`]: the operation classes a decision is asked about

use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =============================================================================
// Uri
// =============================================================================

/// Identifier of a resource, actor or group.
///
/// Compared as plain text; no normalisation is applied.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Uri(String);

impl Uri {
	pub fn new(uri: impl Into<String>) -> Self {
		Self(uri.into())
	}

	/// Mint a fresh identifier of the form `{base}/{kind}/{uuid}`.
	pub fn mint(base: &str, kind: &str) -> Self {
		Self(format!(
			"{}/{}/{}",
			base.trim_end_matches('/'),
			kind,
			Uuid::new_v4()
		))
	}

	pub fn as_str(&self) -> &str {
		&self.0
	}

	pub fn into_inner(self) -> String {
		self.0
	}
}

impl fmt::Display for Uri {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(&self.0)
	}
}

impl From<&str> for Uri {
	fn from(uri: &str) -> Self {
		Self(uri.to_string())
	}
}

impl From<String> for Uri {
	fn from(uri: String) -> Self {
		Self(uri)
	}
}

impl AsRef<str> for Uri {
	fn as_ref(&self) -> &str {
		&self.0
	}
}

impl Borrow<str> for Uri {
	fn borrow(&self) -> &str {
		&self.0
	}
}

// =============================================================================
// Status
// =============================================================================

/// Lifecycle status of an item or container.
///
/// Moves strictly forward: `Pending` -> `Released` -> `Withdrawn`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
	/// Private working state; the only state that may be deleted.
	#[default]
	Pending,
	/// Published; readable by anyone unless the instance is private.
	Released,
	/// Terminal. Still readable, frozen against edits.
	Withdrawn,
}

impl Status {
	pub fn all() -> &'static [Status] {
		&[Status::Pending, Status::Released, Status::Withdrawn]
	}

	/// Statuses that need no grant to read.
	pub fn is_public(self) -> bool {
		matches!(self, Status::Released | Status::Withdrawn)
	}

	pub fn is_discarded(self) -> bool {
		self == Status::Withdrawn
	}
}

impl fmt::Display for Status {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Status::Pending => write!(f, "PENDING"),
			Status::Released => write!(f, "RELEASED"),
			Status::Withdrawn => write!(f, "WITHDRAWN"),
		}
	}
}

// =============================================================================
// Action
// =============================================================================

/// Operation classes that can be authorized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
	Create,
	Read,
	Update,
	Delete,
	Administrate,
	Share,
}

impl Action {
	pub fn all() -> &'static [Action] {
		&[
			Action::Create,
			Action::Read,
			Action::Update,
			Action::Delete,
			Action::Administrate,
			Action::Share,
		]
	}
}

impl fmt::Display for Action {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			Action::Create => write!(f, "create"),
			Action::Read => write!(f, "read"),
			Action::Update => write!(f, "update"),
			Action::Delete => write!(f, "delete"),
			Action::Administrate => write!(f, "administrate"),
			Action::Share => write!(f, "share"),
		}
	}
}

impl FromStr for Action {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		Action::all()
			.iter()
			.copied()
			.find(|a| a.to_string().eq_ignore_ascii_case(s))
			.ok_or_else(|| format!("unknown action '{s}'"))
	}
}
