// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Canned grant sets for common roles.
//!
//! These only build grant lists. Deciding who receives them, and persisting
//! them, is up to the caller.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::GrantParseError;
use crate::grant::{Grant, GrantType};
use crate::types::Uri;

/// Role offered when sharing a resource with someone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ShareRole {
	Read,
	Edit,
	Admin,
}

impl ShareRole {
	pub fn grant_type(self) -> GrantType {
		match self {
			ShareRole::Read => GrantType::Read,
			ShareRole::Edit => GrantType::Edit,
			ShareRole::Admin => GrantType::Admin,
		}
	}

	pub fn grant_for(self, target: &Uri) -> Result<Grant, GrantParseError> {
		Grant::try_new(self.grant_type(), target.clone())
	}

	pub fn from_grant(grant: &Grant) -> Self {
		match grant.grant_type {
			GrantType::Read => ShareRole::Read,
			GrantType::Edit => ShareRole::Edit,
			GrantType::Admin => ShareRole::Admin,
		}
	}
}

impl fmt::Display for ShareRole {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		self.grant_type().fmt(f)
	}
}

impl FromStr for ShareRole {
	type Err = String;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s.to_ascii_uppercase().as_str() {
			"READ" => Ok(ShareRole::Read),
			"EDIT" => Ok(ShareRole::Edit),
			"ADMIN" => Ok(ShareRole::Admin),
			_ => Err(format!("unknown share role '{s}'")),
		}
	}
}

/// Strongest role held at exactly `target`.
pub fn find_role<'a, I>(grants: I, target: &Uri) -> Option<ShareRole>
where
	I: IntoIterator<Item = &'a Grant>,
{
	grants
		.into_iter()
		.filter(|g| &g.target == target)
		.map(ShareRole::from_grant)
		.max()
}

/// Profile owned by a shared container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileShare {
	pub uri: Uri,
	/// Whether the sharer administers the profile. The role only propagates
	/// when this is set.
	pub sharer_administers: bool,
}

/// Grant templates anchored at the instance's global root.
///
/// The global root comes from validated instance configuration; every other
/// target is checked before a grant is built for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleTemplates {
	global_root: Uri,
}

impl RoleTemplates {
	pub fn new(global_root: impl Into<Uri>) -> Self {
		Self {
			global_root: global_root.into(),
		}
	}

	pub fn global_root(&self) -> &Uri {
		&self.global_root
	}

	/// EDIT at the global root; allows creating new root containers.
	pub fn create_collection_grant(&self) -> Grant {
		Grant::edit(self.global_root.clone())
	}

	/// ADMIN at the global root.
	pub fn sysadmin_grant(&self) -> Grant {
		Grant::admin(self.global_root.clone())
	}

	/// Grants for whoever creates the root container `resource`.
	pub fn creator_grants(&self, resource: &Uri) -> Result<Vec<Grant>, GrantParseError> {
		Ok(vec![
			Grant::try_new(GrantType::Admin, resource.clone())?,
			self.create_collection_grant(),
		])
	}

	pub fn sysadmin_grants(&self, resource: &Uri) -> Result<Vec<Grant>, GrantParseError> {
		let mut grants = self.creator_grants(resource)?;
		grants.push(self.sysadmin_grant());
		Ok(grants)
	}

	/// Grants a sharee receives for `role` on `target`.
	pub fn share_grants(
		&self,
		role: ShareRole,
		target: &Uri,
		profile: Option<&ProfileShare>,
	) -> Result<Vec<Grant>, GrantParseError> {
		let mut grants = vec![role.grant_for(target)?];
		if let Some(profile) = profile.filter(|p| p.sharer_administers) {
			grants.push(role.grant_for(&profile.uri)?);
		}
		Ok(grants)
	}
}
