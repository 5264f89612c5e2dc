// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Instance-wide configuration section.
//!
//! Holds the switches that change authorization and workflow outcomes for the
//! whole instance: private mode and the URIs that anchor instance-level grants.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_BASE_URI: &str = "http://localhost/cairn";

fn default_base_uri() -> String {
	DEFAULT_BASE_URI.to_string()
}

fn global_root_for(base_uri: &str) -> String {
	format!("{}/", base_uri.trim_end_matches('/'))
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct InstanceConfigLayer {
	pub private_mode: Option<bool>,
	pub base_uri: Option<String>,
	pub global_root_uri: Option<String>,
}

impl InstanceConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.private_mode.is_some() {
			self.private_mode = other.private_mode;
		}
		if other.base_uri.is_some() {
			self.base_uri = other.base_uri;
		}
		if other.global_root_uri.is_some() {
			self.global_root_uri = other.global_root_uri;
		}
	}

	pub fn finalize(self) -> InstanceConfig {
		let base_uri = self.base_uri.unwrap_or_else(default_base_uri);
		let global_root_uri = self
			.global_root_uri
			.unwrap_or_else(|| global_root_for(&base_uri));

		InstanceConfig {
			private_mode: self.private_mode.unwrap_or(false),
			base_uri,
			global_root_uri,
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InstanceConfig {
	/// When set, anonymous actors never see anything and nothing can be
	/// published.
	pub private_mode: bool,
	/// Prefix for freshly minted resource identifiers.
	pub base_uri: String,
	/// The URI instance-level grants (sysadmin, create-collection) point at.
	pub global_root_uri: String,
}

impl InstanceConfig {
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.base_uri.trim().is_empty() {
			return Err(ConfigError::Validation(
				"instance.base_uri must not be empty".to_string(),
			));
		}
		if self.global_root_uri.trim().is_empty() {
			return Err(ConfigError::Validation(
				"instance.global_root_uri must not be empty".to_string(),
			));
		}
		if self.global_root_uri.contains(',') {
			return Err(ConfigError::Validation(
				"instance.global_root_uri must not contain ','".to_string(),
			));
		}
		if self.global_root_uri.trim() != self.global_root_uri {
			return Err(ConfigError::Validation(
				"instance.global_root_uri must not have surrounding whitespace".to_string(),
			));
		}
		Ok(())
	}

	/// Builder: toggle private mode.
	pub fn with_private_mode(mut self, private_mode: bool) -> Self {
		self.private_mode = private_mode;
		self
	}
}

impl Default for InstanceConfig {
	fn default() -> Self {
		InstanceConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_values() {
		let config = InstanceConfig::default();
		assert!(!config.private_mode);
		assert_eq!(config.base_uri, "http://localhost/cairn");
		assert_eq!(config.global_root_uri, "http://localhost/cairn/");
	}

	#[test]
	fn test_global_root_follows_base_uri() {
		let layer = InstanceConfigLayer {
			base_uri: Some("https://media.example.org/".to_string()),
			..Default::default()
		};
		let config = layer.finalize();
		assert_eq!(config.global_root_uri, "https://media.example.org/");
	}

	#[test]
	fn test_explicit_global_root_wins() {
		let layer = InstanceConfigLayer {
			base_uri: Some("https://media.example.org".to_string()),
			global_root_uri: Some("urn:cairn:root".to_string()),
			..Default::default()
		};
		assert_eq!(layer.finalize().global_root_uri, "urn:cairn:root");
	}

	#[test]
	fn test_merge_overwrites() {
		let mut base = InstanceConfigLayer {
			private_mode: Some(false),
			base_uri: Some("http://a".to_string()),
			global_root_uri: None,
		};
		base.merge(InstanceConfigLayer {
			private_mode: Some(true),
			..Default::default()
		});
		assert_eq!(base.private_mode, Some(true));
		assert_eq!(base.base_uri, Some("http://a".to_string()));
	}

	#[test]
	fn test_validate_rejects_empty_root() {
		let config = InstanceConfig {
			global_root_uri: "  ".to_string(),
			..Default::default()
		};
		let err = config.validate().unwrap_err();
		assert!(err.to_string().contains("global_root_uri"));
	}

	#[test]
	fn test_validate_rejects_comma_in_root() {
		let config = InstanceConfig {
			global_root_uri: "urn:a,b".to_string(),
			..Default::default()
		};
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_validate_rejects_padded_root() {
		let config = InstanceConfig {
			global_root_uri: " urn:cairn:root".to_string(),
			..Default::default()
		};
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_deserialize_layer_partial() {
		let layer: InstanceConfigLayer = toml::from_str("private_mode = true").unwrap();
		assert_eq!(layer.private_mode, Some(true));
		assert!(layer.base_uri.is_none());
	}
}
