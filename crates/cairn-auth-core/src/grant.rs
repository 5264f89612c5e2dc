// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Grants and their persisted encoding.
//!
//! In memory a [`Grant`] is a `(GrantType, Uri)` pair. The `TYPE,URI` text
//! form only exists at the persistence boundary: [`Grant::encode`],
//! [`FromStr`], and the serde impls all go through it. A target that would
//! not survive that form (empty, containing `,`, or padded with whitespace)
//! is refused on the way out as well as on the way in.
//!
//! Persisted grant lists may hold stale or hand-edited entries, so
//! [`decode_all`] skips what it cannot parse instead of failing.

use std::fmt;
use std::str::FromStr;

use serde::{de, ser, Deserialize, Deserializer, Serialize, Serializer};
use tracing::warn;

use crate::error::GrantParseError;
use crate::types::Uri;

/// Permission level of a grant.
///
/// Ordered `Read < Edit < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GrantType {
	Read,
	Edit,
	Admin,
}

impl GrantType {
	pub fn all() -> &'static [GrantType] {
		&[GrantType::Read, GrantType::Edit, GrantType::Admin]
	}

	pub fn as_str(self) -> &'static str {
		match self {
			GrantType::Read => "READ",
			GrantType::Edit => "EDIT",
			GrantType::Admin => "ADMIN",
		}
	}

	/// Returns true if holding `self` satisfies a check for `required`.
	pub fn covers(self, required: GrantType) -> bool {
		self >= required
	}
}

impl fmt::Display for GrantType {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

impl FromStr for GrantType {
	type Err = GrantParseError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		match s {
			"READ" => Ok(GrantType::Read),
			"EDIT" => Ok(GrantType::Edit),
			"ADMIN" => Ok(GrantType::Admin),
			other => Err(GrantParseError::UnknownType(other.to_string())),
		}
	}
}

fn check_target(target: &str) -> Result<(), GrantParseError> {
	if target.is_empty() {
		return Err(GrantParseError::MissingTarget(target.to_string()));
	}
	if target.contains(',') || target.trim() != target {
		return Err(GrantParseError::InvalidTarget(target.to_string()));
	}
	Ok(())
}

/// One permission record held by a user or group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Grant {
	pub grant_type: GrantType,
	pub target: Uri,
}

impl Grant {
	/// Checked constructor for targets that come from outside, such as
	/// request input or another store.
	pub fn try_new(grant_type: GrantType, target: impl Into<Uri>) -> Result<Self, GrantParseError> {
		let target = target.into();
		check_target(target.as_str())?;
		Ok(Self { grant_type, target })
	}

	/// Unchecked; meant for identifiers this instance minted itself.
	/// [`Grant::encode`] still refuses a target that cannot be decoded.
	pub fn new(grant_type: GrantType, target: impl Into<Uri>) -> Self {
		Self {
			grant_type,
			target: target.into(),
		}
	}

	pub fn read(target: impl Into<Uri>) -> Self {
		Self::new(GrantType::Read, target)
	}

	pub fn edit(target: impl Into<Uri>) -> Self {
		Self::new(GrantType::Edit, target)
	}

	pub fn admin(target: impl Into<Uri>) -> Self {
		Self::new(GrantType::Admin, target)
	}

	/// True if the grant survives an encode/decode round trip.
	pub fn is_encodable(&self) -> bool {
		check_target(self.target.as_str()).is_ok()
	}

	/// Canonical persisted form, `TYPE,URI`.
	pub fn encode(&self) -> Result<String, GrantParseError> {
		check_target(self.target.as_str())?;
		Ok(self.to_string())
	}

	pub fn decode(s: &str) -> Result<Self, GrantParseError> {
		s.parse()
	}
}

impl fmt::Display for Grant {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{},{}", self.grant_type, self.target)
	}
}

impl FromStr for Grant {
	type Err = GrantParseError;

	/// The target is taken verbatim; only the type part tolerates padding.
	fn from_str(s: &str) -> Result<Self, Self::Err> {
		if s.trim().is_empty() {
			return Err(GrantParseError::Empty);
		}

		let mut parts = s.split(',');
		let (grant_type, target) = match (parts.next(), parts.next(), parts.next()) {
			(Some(grant_type), Some(target), None) => (grant_type.trim(), target),
			_ => return Err(GrantParseError::Separator(s.to_string())),
		};

		let grant_type: GrantType = grant_type.parse()?;
		if target.trim().is_empty() {
			return Err(GrantParseError::MissingTarget(s.to_string()));
		}

		Grant::try_new(grant_type, target)
	}
}

impl Serialize for Grant {
	fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
		match self.encode() {
			Ok(encoded) => serializer.serialize_str(&encoded),
			Err(e) => Err(ser::Error::custom(e)),
		}
	}
}

impl<'de> Deserialize<'de> for Grant {
	fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
		let raw = String::deserialize(deserializer)?;
		raw.parse().map_err(de::Error::custom)
	}
}

/// Decode a persisted grant list, dropping malformed entries.
pub fn decode_all<I, S>(encoded: I) -> Vec<Grant>
where
	I: IntoIterator<Item = S>,
	S: AsRef<str>,
{
	encoded
		.into_iter()
		.filter_map(|s| match Grant::decode(s.as_ref()) {
			Ok(grant) => Some(grant),
			Err(e) => {
				warn!(grant = s.as_ref(), error = %e, "skipping malformed persisted grant");
				None
			}
		})
		.collect()
}

/// Encode a grant list for persistence. Fails on the first grant whose
/// target could not be read back.
pub fn encode_all<'a, I>(grants: I) -> Result<Vec<String>, GrantParseError>
where
	I: IntoIterator<Item = &'a Grant>,
{
	grants.into_iter().map(Grant::encode).collect()
}

/// Serde helper for grant lists read from persistence; see [`decode_all`].
pub fn deserialize_lenient<'de, D>(deserializer: D) -> Result<Vec<Grant>, D::Error>
where
	D: Deserializer<'de>,
{
	let raw = Vec::<String>::deserialize(deserializer)?;
	Ok(decode_all(raw))
}

/// Consolidated grants of an actor: its own plus those of every group.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GrantSet {
	grants: Vec<Grant>,
}

impl GrantSet {
	pub fn new() -> Self {
		Self::default()
	}

	/// Exact lookup: same type, same target.
	pub fn has_exact(&self, grant_type: GrantType, target: &Uri) -> bool {
		self
			.grants
			.iter()
			.any(|g| g.grant_type == grant_type && &g.target == target)
	}

	/// True if any grant on `target` has one of the given types.
	pub fn has_any_of(&self, types: &[GrantType], target: &Uri) -> bool {
		self
			.grants
			.iter()
			.any(|g| &g.target == target && types.contains(&g.grant_type))
	}

	/// Strongest grant type held on exactly this target.
	pub fn highest_for(&self, target: &Uri) -> Option<GrantType> {
		self
			.grants
			.iter()
			.filter(|g| &g.target == target)
			.map(|g| g.grant_type)
			.max()
	}

	/// Distinct targets, in first-seen order.
	pub fn targets(&self) -> Vec<Uri> {
		self.targets_matching("")
	}

	/// Distinct targets whose text contains `fragment`, in first-seen order.
	pub fn targets_matching(&self, fragment: &str) -> Vec<Uri> {
		let mut targets: Vec<Uri> = Vec::new();
		for grant in &self.grants {
			if grant.target.as_str().contains(fragment) && !targets.contains(&grant.target) {
				targets.push(grant.target.clone());
			}
		}
		targets
	}

	pub fn iter(&self) -> impl Iterator<Item = &Grant> {
		self.grants.iter()
	}

	pub fn len(&self) -> usize {
		self.grants.len()
	}

	pub fn is_empty(&self) -> bool {
		self.grants.is_empty()
	}
}

impl FromIterator<Grant> for GrantSet {
	fn from_iter<T: IntoIterator<Item = Grant>>(iter: T) -> Self {
		Self {
			grants: iter.into_iter().collect(),
		}
	}
}

impl Extend<Grant> for GrantSet {
	fn extend<T: IntoIterator<Item = Grant>>(&mut self, iter: T) {
		self.grants.extend(iter);
	}
}
