// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Actors and the groups they belong to.
//!
//! An anonymous actor is modelled as `None` wherever an `Option<&User>` is
//! accepted; there is no sentinel user.

use serde::{Deserialize, Serialize};

use crate::error::GrantParseError;
use crate::grant::{decode_all, deserialize_lenient, encode_all, Grant, GrantSet};
use crate::types::Uri;

/// A group of users sharing a grant list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGroup {
	pub id: Uri,
	#[serde(default)]
	pub name: String,
	#[serde(default, deserialize_with = "deserialize_lenient")]
	pub grants: Vec<Grant>,
}

impl UserGroup {
	pub fn new(id: impl Into<Uri>, name: impl Into<String>) -> Self {
		Self {
			id: id.into(),
			name: name.into(),
			grants: Vec::new(),
		}
	}

	pub fn with_grant(mut self, grant: Grant) -> Self {
		self.grants.push(grant);
		self
	}
}

/// An authenticated identity with its own grants and group memberships.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
	pub id: Uri,
	#[serde(default)]
	pub email: Option<String>,
	#[serde(default, deserialize_with = "deserialize_lenient")]
	pub grants: Vec<Grant>,
	#[serde(default)]
	pub groups: Vec<UserGroup>,
}

impl User {
	pub fn new(id: impl Into<Uri>) -> Self {
		Self {
			id: id.into(),
			email: None,
			grants: Vec::new(),
			groups: Vec::new(),
		}
	}

	/// Build a user from its persisted record, skipping grant strings that
	/// do not decode.
	pub fn from_persisted<I, S>(id: impl Into<Uri>, grants: I, groups: Vec<UserGroup>) -> Self
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self {
			id: id.into(),
			email: None,
			grants: decode_all(grants),
			groups,
		}
	}

	pub fn with_email(mut self, email: impl Into<String>) -> Self {
		self.email = Some(email.into());
		self
	}

	pub fn with_grant(mut self, grant: Grant) -> Self {
		self.add_grant(grant);
		self
	}

	pub fn with_grants(mut self, grants: impl IntoIterator<Item = Grant>) -> Self {
		for grant in grants {
			self.add_grant(grant);
		}
		self
	}

	pub fn with_group(mut self, group: UserGroup) -> Self {
		self.groups.push(group);
		self
	}

	/// Adds a grant unless an identical one is already held.
	pub fn add_grant(&mut self, grant: Grant) {
		if !self.grants.contains(&grant) {
			self.grants.push(grant);
		}
	}

	/// Drops every own grant on `target`. Returns how many were removed.
	pub fn remove_grants_for(&mut self, target: &Uri) -> usize {
		let before = self.grants.len();
		self.grants.retain(|g| &g.target != target);
		before - self.grants.len()
	}

	/// Own grants plus the grants of every group the user belongs to.
	pub fn all_grants(&self) -> GrantSet {
		self
			.grants
			.iter()
			.chain(self.groups.iter().flat_map(|g| g.grants.iter()))
			.cloned()
			.collect()
	}

	/// Own grants in their persisted `TYPE,URI` form.
	pub fn encoded_grants(&self) -> Result<Vec<String>, GrantParseError> {
		encode_all(&self.grants)
	}

	pub fn is_member_of(&self, group: &Uri) -> bool {
		self.groups.iter().any(|g| &g.id == group)
	}
}

/// Targets of every grant the actor holds whose URI contains `fragment`,
/// such as `/collection/`. Anonymous actors hold nothing.
pub fn allowed_targets(actor: Option<&User>, fragment: &str) -> Vec<Uri> {
	actor
		.map(|user| user.all_grants().targets_matching(fragment))
		.unwrap_or_default()
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::grant::GrantType;

	#[test]
	fn all_grants_includes_groups() {
		let group = UserGroup::new("urn:group:1", "editors").with_grant(Grant::edit("urn:c2"));
		let user = User::new("urn:user:a")
			.with_grant(Grant::admin("urn:c1"))
			.with_group(group);

		let grants = user.all_grants();
		assert_eq!(grants.len(), 2);
		assert!(grants.has_exact(GrantType::Admin, &Uri::from("urn:c1")));
		assert!(grants.has_exact(GrantType::Edit, &Uri::from("urn:c2")));
		assert!(user.is_member_of(&Uri::from("urn:group:1")));
	}

	#[test]
	fn from_persisted_skips_malformed() {
		let user = User::from_persisted(
			"urn:user:a",
			["ADMIN,urn:c1", "not a grant", "READ,"],
			Vec::new(),
		);
		assert_eq!(user.grants, vec![Grant::admin("urn:c1")]);
		assert_eq!(user.encoded_grants().unwrap(), vec!["ADMIN,urn:c1".to_string()]);
	}

	#[test]
	fn add_grant_dedups() {
		let mut user = User::new("urn:user:a");
		user.add_grant(Grant::read("urn:c1"));
		user.add_grant(Grant::read("urn:c1"));
		user.add_grant(Grant::edit("urn:c1"));
		assert_eq!(user.grants.len(), 2);
		assert_eq!(user.remove_grants_for(&Uri::from("urn:c1")), 2);
		assert!(user.grants.is_empty());
	}

	#[test]
	fn allowed_targets_filters_by_fragment() {
		let group = UserGroup::new("urn:group:1", "readers")
			.with_grant(Grant::read("http://x/collection/2"));
		let user = User::new("urn:user:a")
			.with_grant(Grant::admin("http://x/collection/1"))
			.with_grant(Grant::read("http://x/item/9"))
			.with_group(group);

		assert_eq!(
			allowed_targets(Some(&user), "/collection/"),
			vec![
				Uri::from("http://x/collection/1"),
				Uri::from("http://x/collection/2")
			]
		);
		assert!(allowed_targets(None, "/collection/").is_empty());
	}

	#[test]
	fn unencodable_grants_fail_persistence_instead_of_vanishing() {
		let user = User::new("urn:user:a").with_grant(Grant::admin("urn:a,b"));
		assert!(matches!(
			user.encoded_grants(),
			Err(GrantParseError::InvalidTarget(_))
		));
		assert!(serde_json::to_string(&user).is_err());
	}

	#[test]
	fn persisted_record_round_trips() {
		let user = User::new("urn:user:a")
			.with_grant(Grant::admin("urn:c1"))
			.with_group(UserGroup::new("urn:group:1", "readers").with_grant(Grant::read("urn:c2")));
		let json = serde_json::to_string(&user).unwrap();
		let back: User = serde_json::from_str(&json).unwrap();
		assert_eq!(back, user);
	}

	#[test]
	fn deserializes_persisted_record() {
		let json = r#"{
			"id": "urn:user:a",
			"grants": ["ADMIN,urn:c1", "garbage"],
			"groups": [{"id": "urn:group:1", "grants": ["READ,urn:c2"]}]
		}"#;
		let user: User = serde_json::from_str(json).unwrap();
		assert_eq!(user.grants, vec![Grant::admin("urn:c1")]);
		assert_eq!(user.groups[0].grants, vec![Grant::read("urn:c2")]);
		assert_eq!(user.email, None);
	}
}
