// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration sections.

pub mod hierarchy;
pub mod instance;
pub mod logging;

pub use hierarchy::{HierarchyConfig, HierarchyConfigLayer};
pub use instance::{InstanceConfig, InstanceConfigLayer};
pub use logging::{LoggingConfig, LoggingConfigLayer};
