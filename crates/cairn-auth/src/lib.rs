// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Authorization decisions and lifecycle workflow for Cairn.
//!
//! - [`AuthorizationEngine`]: pure create/read/update/delete/administrate
//!   decisions over a hierarchy snapshot
//! - [`LifecycleValidator`]: the PENDING -> RELEASED -> WITHDRAWN state machine
//! - [`WorkflowGuard`]: authenticated, authorized and validated workflow
//!   entry points (release, withdraw, move, share)
//!
//! # Example
//!
//! ```ignore
//! let snapshot = hierarchy.snapshot().await;
//! let engine = AuthorizationEngine::new(snapshot, &config.instance);
//! if !engine.update(Some(&user), Resource::from(&container)) {
//!     return Err(AuthError::not_allowed(Action::Update, container_id));
//! }
//! ```

pub mod engine;
pub mod guard;
pub mod lifecycle;
pub mod telemetry;

pub use engine::AuthorizationEngine;
pub use guard::{CascadePlan, WorkflowGuard};
pub use lifecycle::LifecycleValidator;
pub use telemetry::init_tracing;

pub use cairn_auth_core::{Action, AuthError, AuthResult, Resource};
