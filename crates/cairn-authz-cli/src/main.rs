// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Cairn authorization CLI: evaluate decisions and hierarchy queries against
//! a JSON fixture world.

use std::path::PathBuf;

use anyhow::Context;
use cairn_auth::{init_tracing, AuthorizationEngine};
use cairn_auth_core::{Action, Uri};
use cairn_config::LoggingConfig;
use cairn_hierarchy::HierarchyService;
use clap::{Parser, Subcommand};
use serde_json::json;

mod world;

use world::World;

#[derive(Parser, Debug)]
#[command(name = "cairn-authz", about = "Evaluate Cairn authorization decisions", version)]
struct Args {
	/// Configuration file (defaults to /etc/cairn/authz.toml)
	#[arg(long, env = "CAIRN_CONFIG")]
	config: Option<PathBuf>,

	/// World fixture with containers, items and users
	world: PathBuf,

	#[command(subcommand)]
	command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Decide whether an actor may perform an action on a resource
	Decide {
		/// Actor URI, or `anonymous`
		#[arg(long)]
		actor: String,
		#[arg(long)]
		action: Action,
		#[arg(long)]
		resource: String,
	},
	/// Root container of a URI
	Root { uri: String },
	/// Chain of parents from a container up to its root
	Ancestors { uri: String },
	/// Every container below a container
	Descendants { uri: String },
}

/// Logging is best effort; a failed setup is reported and the command still runs.
fn install_tracing(logging: &LoggingConfig) -> bool {
	match init_tracing(logging) {
		Ok(()) => true,
		Err(e) => {
			eprintln!("warning: tracing not initialised: {e}");
			false
		}
	}
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let config = match &args.config {
		Some(path) => cairn_config::load_config_with_file(path.clone()),
		None => cairn_config::load_config(),
	}
	.context("failed to load configuration")?;
	install_tracing(&config.logging);

	let world = World::load(&args.world)?;
	let hierarchy = HierarchyService::new(world.store(), config.hierarchy.clone());
	let snapshot = hierarchy.snapshot().await;
	tracing::debug!(
		version = snapshot.version(),
		containers = snapshot.len(),
		users = world.users.len(),
		"world loaded"
	);

	let output = match args.command {
		Command::Decide {
			actor,
			action,
			resource,
		} => {
			let index = world.index();
			let actor = index.actor(&actor)?;
			let uri = Uri::new(resource);
			let engine = AuthorizationEngine::new(snapshot, &config.instance);
			let allowed = engine.is_allowed(actor, action, index.resource(&uri));
			json!({
				"actor": actor.map(|u| u.id.as_str()).unwrap_or("anonymous"),
				"action": action,
				"resource": uri,
				"allowed": allowed,
			})
		}
		Command::Root { uri } => {
			let uri = Uri::new(uri);
			let root = hierarchy.owning_root(&uri).await?;
			json!({ "uri": uri, "root": root })
		}
		Command::Ancestors { uri } => {
			let uri = Uri::new(uri);
			let ancestors = snapshot.ancestors(&uri)?;
			json!({ "uri": uri, "ancestors": ancestors })
		}
		Command::Descendants { uri } => {
			let uri = Uri::new(uri);
			let descendants = snapshot.descendants(&uri)?;
			json!({ "uri": uri, "descendants": descendants })
		}
	};

	println!("{}", serde_json::to_string_pretty(&output)?);
	Ok(())
}
