// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Hierarchy index configuration section.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

const DEFAULT_MAX_DEPTH: usize = 256;
const DEFAULT_NAME_CACHE_CAPACITY: usize = 10_000;
const DEFAULT_NAME_CACHE_TTL_SECS: u64 = 300;
const DEFAULT_EVENT_QUEUE_CAPACITY: usize = 64;
const MAX_NAME_CACHE_TTL_SECS: u64 = 24 * 60 * 60;

#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct HierarchyConfigLayer {
	pub max_depth: Option<usize>,
	pub name_cache_capacity: Option<usize>,
	pub name_cache_ttl_secs: Option<u64>,
	pub event_queue_capacity: Option<usize>,
}

impl HierarchyConfigLayer {
	pub fn merge(&mut self, other: Self) {
		if other.max_depth.is_some() {
			self.max_depth = other.max_depth;
		}
		if other.name_cache_capacity.is_some() {
			self.name_cache_capacity = other.name_cache_capacity;
		}
		if other.name_cache_ttl_secs.is_some() {
			self.name_cache_ttl_secs = other.name_cache_ttl_secs;
		}
		if other.event_queue_capacity.is_some() {
			self.event_queue_capacity = other.event_queue_capacity;
		}
	}

	pub fn finalize(self) -> HierarchyConfig {
		HierarchyConfig {
			max_depth: self.max_depth.unwrap_or(DEFAULT_MAX_DEPTH),
			name_cache_capacity: self
				.name_cache_capacity
				.unwrap_or(DEFAULT_NAME_CACHE_CAPACITY),
			name_cache_ttl_secs: self
				.name_cache_ttl_secs
				.unwrap_or(DEFAULT_NAME_CACHE_TTL_SECS),
			event_queue_capacity: self
				.event_queue_capacity
				.unwrap_or(DEFAULT_EVENT_QUEUE_CAPACITY),
		}
	}
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HierarchyConfig {
	/// Upper bound on parent links followed before a walk gives up.
	pub max_depth: usize,
	pub name_cache_capacity: usize,
	pub name_cache_ttl_secs: u64,
	pub event_queue_capacity: usize,
}

impl HierarchyConfig {
	pub fn name_cache_ttl(&self) -> Duration {
		Duration::from_secs(self.name_cache_ttl_secs)
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.max_depth == 0 {
			return Err(ConfigError::Validation(
				"hierarchy.max_depth must be at least 1".to_string(),
			));
		}
		if self.name_cache_capacity == 0 {
			return Err(ConfigError::Validation(
				"hierarchy.name_cache_capacity must be at least 1".to_string(),
			));
		}
		if self.name_cache_ttl_secs > MAX_NAME_CACHE_TTL_SECS {
			return Err(ConfigError::Validation(format!(
				"hierarchy.name_cache_ttl_secs must be at most {MAX_NAME_CACHE_TTL_SECS}"
			)));
		}
		if self.event_queue_capacity == 0 {
			return Err(ConfigError::Validation(
				"hierarchy.event_queue_capacity must be at least 1".to_string(),
			));
		}
		Ok(())
	}
}

impl Default for HierarchyConfig {
	fn default() -> Self {
		HierarchyConfigLayer::default().finalize()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_default_values() {
		let config = HierarchyConfig::default();
		assert_eq!(config.max_depth, 256);
		assert_eq!(config.name_cache_capacity, 10_000);
		assert_eq!(config.name_cache_ttl(), Duration::from_secs(300));
		assert_eq!(config.event_queue_capacity, 64);
		assert!(config.validate().is_ok());
	}

	#[test]
	fn test_layer_finalize_with_values() {
		let layer = HierarchyConfigLayer {
			max_depth: Some(8),
			name_cache_capacity: Some(16),
			name_cache_ttl_secs: Some(5),
			event_queue_capacity: Some(2),
		};
		let config = layer.finalize();
		assert_eq!(config.max_depth, 8);
		assert_eq!(config.name_cache_capacity, 16);
		assert_eq!(config.name_cache_ttl_secs, 5);
		assert_eq!(config.event_queue_capacity, 2);
	}

	#[test]
	fn test_zero_depth_is_invalid() {
		let config = HierarchyConfig {
			max_depth: 0,
			..Default::default()
		};
		assert!(config.validate().is_err());
	}

	#[test]
	fn test_oversized_ttl_is_invalid() {
		let config = HierarchyConfig {
			name_cache_ttl_secs: u64::MAX,
			..Default::default()
		};
		assert!(config.validate().is_err());

		let day = HierarchyConfig {
			name_cache_ttl_secs: 86_400,
			..Default::default()
		};
		assert!(day.validate().is_ok());
	}

	#[test]
	fn test_deserialize_layer_partial() {
		let toml_str = r#"
max_depth = 12
"#;
		let layer: HierarchyConfigLayer = toml::from_str(toml_str).unwrap();
		assert_eq!(layer.max_depth, Some(12));
		assert!(layer.name_cache_capacity.is_none());
	}
}
