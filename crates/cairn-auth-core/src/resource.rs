// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Resource model.
//!
//! Items and containers carry [`Properties`] (identity, status, audit
//! stamps). Every object a decision can be asked about is reachable through
//! the borrowed [`Resource`] sum type, which the engine matches exhaustively.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::actor::{User, UserGroup};
use crate::types::{Status, Uri};

/// Identity, status and audit stamps shared by items and containers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Properties {
	/// Unset until the object has been prepared for creation.
	#[serde(default)]
	pub id: Option<Uri>,
	#[serde(default)]
	pub status: Status,
	#[serde(default)]
	pub created_by: Option<Uri>,
	#[serde(default)]
	pub modified_by: Option<Uri>,
	#[serde(default)]
	pub created_at: Option<DateTime<Utc>>,
	#[serde(default)]
	pub modified_at: Option<DateTime<Utc>>,
	/// Set on release and on withdrawal.
	#[serde(default)]
	pub version_date: Option<DateTime<Utc>>,
	#[serde(default)]
	pub discard_comment: Option<String>,
}

impl Properties {
	pub fn with_id(id: impl Into<Uri>) -> Self {
		Self {
			id: Some(id.into()),
			..Self::default()
		}
	}
}

/// A file-like object living in exactly one container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
	#[serde(flatten)]
	pub properties: Properties,
	pub container: Uri,
	#[serde(default)]
	pub filename: Option<String>,
}

impl Item {
	pub fn new(id: impl Into<Uri>, container: impl Into<Uri>) -> Self {
		Self {
			properties: Properties::with_id(id),
			container: container.into(),
			filename: None,
		}
	}

	/// An item not yet assigned an identifier.
	pub fn draft(container: impl Into<Uri>) -> Self {
		Self {
			properties: Properties::default(),
			container: container.into(),
			filename: None,
		}
	}

	pub fn with_status(mut self, status: Status) -> Self {
		self.properties.status = status;
		self
	}

	pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
		self.filename = Some(filename.into());
		self
	}

	pub fn id(&self) -> Option<&Uri> {
		self.properties.id.as_ref()
	}

	pub fn status(&self) -> Status {
		self.properties.status
	}
}

/// A collection or subcollection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Container {
	#[serde(flatten)]
	pub properties: Properties,
	#[serde(default)]
	pub parent: Option<Uri>,
	#[serde(default)]
	pub title: String,
	/// Metadata profile owned by this container, if any.
	#[serde(default)]
	pub profile: Option<Uri>,
}

impl Container {
	pub fn new(id: impl Into<Uri>) -> Self {
		Self {
			properties: Properties::with_id(id),
			parent: None,
			title: String::new(),
			profile: None,
		}
	}

	pub fn draft() -> Self {
		Self {
			properties: Properties::default(),
			parent: None,
			title: String::new(),
			profile: None,
		}
	}

	pub fn with_parent(mut self, parent: impl Into<Uri>) -> Self {
		self.parent = Some(parent.into());
		self
	}

	pub fn with_status(mut self, status: Status) -> Self {
		self.properties.status = status;
		self
	}

	pub fn with_title(mut self, title: impl Into<String>) -> Self {
		self.title = title.into();
		self
	}

	pub fn with_profile(mut self, profile: impl Into<Uri>) -> Self {
		self.profile = Some(profile.into());
		self
	}

	pub fn id(&self) -> Option<&Uri> {
		self.properties.id.as_ref()
	}

	pub fn status(&self) -> Status {
		self.properties.status
	}

	/// A container with a parent is a subcollection.
	pub fn is_subcollection(&self) -> bool {
		self.parent.is_some()
	}
}

/// Which variant a [`Resource`] is, without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
	Item,
	Container,
	User,
	UserGroup,
	Organization,
	Person,
	Statement,
	Uri,
}

impl ResourceKind {
	/// Path segment used when minting identifiers for this kind.
	pub fn path_segment(self) -> &'static str {
		match self {
			ResourceKind::Item => "item",
			ResourceKind::Container => "collection",
			ResourceKind::User => "user",
			ResourceKind::UserGroup => "usergroup",
			ResourceKind::Organization => "organization",
			ResourceKind::Person => "person",
			ResourceKind::Statement => "statement",
			ResourceKind::Uri => "object",
		}
	}
}

/// Anything an authorization decision can be asked about.
#[derive(Debug, Clone, Copy)]
pub enum Resource<'a> {
	Item(&'a Item),
	Container(&'a Container),
	User(&'a User),
	UserGroup(&'a UserGroup),
	Organization(&'a Uri),
	Person(&'a Uri),
	Statement(&'a Uri),
	/// An object known only by its identifier.
	Uri(&'a Uri),
}

impl<'a> Resource<'a> {
	pub fn kind(&self) -> ResourceKind {
		match self {
			Resource::Item(_) => ResourceKind::Item,
			Resource::Container(_) => ResourceKind::Container,
			Resource::User(_) => ResourceKind::User,
			Resource::UserGroup(_) => ResourceKind::UserGroup,
			Resource::Organization(_) => ResourceKind::Organization,
			Resource::Person(_) => ResourceKind::Person,
			Resource::Statement(_) => ResourceKind::Statement,
			Resource::Uri(_) => ResourceKind::Uri,
		}
	}

	/// Lifecycle status, for the variants that carry one.
	pub fn status(&self) -> Option<Status> {
		match self {
			Resource::Item(item) => Some(item.status()),
			Resource::Container(container) => Some(container.status()),
			_ => None,
		}
	}

	pub fn id(&self) -> Option<&'a Uri> {
		match self {
			Resource::Item(item) => item.id(),
			Resource::Container(container) => container.id(),
			Resource::User(user) => Some(&user.id),
			Resource::UserGroup(group) => Some(&group.id),
			Resource::Organization(uri)
			| Resource::Person(uri)
			| Resource::Statement(uri)
			| Resource::Uri(uri) => Some(uri),
		}
	}

	pub fn is_subcollection(&self) -> bool {
		matches!(self, Resource::Container(c) if c.is_subcollection())
	}
}

impl std::fmt::Display for Resource<'_> {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self.id() {
			Some(id) => write!(f, "{id}"),
			None => write!(f, "<new {}>", self.kind().path_segment()),
		}
	}
}

impl<'a> From<&'a Item> for Resource<'a> {
	fn from(item: &'a Item) -> Self {
		Resource::Item(item)
	}
}

impl<'a> From<&'a Container> for Resource<'a> {
	fn from(container: &'a Container) -> Self {
		Resource::Container(container)
	}
}

impl<'a> From<&'a User> for Resource<'a> {
	fn from(user: &'a User) -> Self {
		Resource::User(user)
	}
}

impl<'a> From<&'a UserGroup> for Resource<'a> {
	fn from(group: &'a UserGroup) -> Self {
		Resource::UserGroup(group)
	}
}

impl<'a> From<&'a Uri> for Resource<'a> {
	fn from(uri: &'a Uri) -> Self {
		Resource::Uri(uri)
	}
}

/// Objects that move through the PENDING -> RELEASED -> WITHDRAWN lifecycle.
pub trait Lifecycle {
	fn properties(&self) -> &Properties;
	fn properties_mut(&mut self) -> &mut Properties;
	fn kind(&self) -> ResourceKind;

	fn is_subcollection(&self) -> bool {
		false
	}

	fn status(&self) -> Status {
		self.properties().status
	}
}

impl Lifecycle for Item {
	fn properties(&self) -> &Properties {
		&self.properties
	}

	fn properties_mut(&mut self) -> &mut Properties {
		&mut self.properties
	}

	fn kind(&self) -> ResourceKind {
		ResourceKind::Item
	}
}

impl Lifecycle for Container {
	fn properties(&self) -> &Properties {
		&self.properties
	}

	fn properties_mut(&mut self) -> &mut Properties {
		&mut self.properties
	}

	fn kind(&self) -> ResourceKind {
		ResourceKind::Container
	}

	fn is_subcollection(&self) -> bool {
		Container::is_subcollection(self)
	}
}
