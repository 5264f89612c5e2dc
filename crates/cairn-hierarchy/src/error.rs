// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

use cairn_auth_core::Uri;
use thiserror::Error;

pub type HierarchyResult<T> = Result<T, HierarchyError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum HierarchyError {
	#[error("hierarchy cycle detected at {uri}")]
	Cycle { uri: Uri },

	#[error("hierarchy walk from {uri} exceeded max depth {max_depth}")]
	DepthExceeded { uri: Uri, max_depth: usize },

	#[error("hierarchy store error: {0}")]
	Store(#[from] StoreError),
}

/// Failure reported by a [`crate::HierarchyStore`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
	#[error("store unavailable: {0}")]
	Unavailable(String),

	#[error("malformed store data: {0}")]
	Malformed(String),
}
