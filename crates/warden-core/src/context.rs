//! Per-request evaluation context: the current environment and clock.

use std::sync::Arc;

use crate::prelude::*;
use warden_types::model::Environment;
use warden_types::store_adapter::StoreAdapter;

/// Current environment and evaluation time for one resolution pass
///
/// Set by upstream middleware for every request. `environment = None` means
/// the request runs outside any environment, so only unscoped assignments and
/// bans apply.
#[derive(Debug, Clone)]
pub struct EnvContext {
	pub environment: Option<Environment>,
	pub now: Timestamp,
}

impl EnvContext {
	pub fn new(environment: Option<Environment>) -> Self {
		Self { environment, now: Timestamp::now() }
	}

	/// Context outside of any environment
	pub fn global() -> Self {
		Self::new(None)
	}

	pub fn with_now(mut self, now: Timestamp) -> Self {
		self.now = now;
		self
	}

	/// Load the environment by id; a missing environment is an error
	pub async fn load(
		store: &Arc<dyn StoreAdapter>,
		env_id: Option<EnvId>,
		now: Timestamp,
	) -> WdResult<Self> {
		let environment = match env_id {
			Some(env_id) => Some(store.get_environment(env_id).await?),
			None => None,
		};
		Ok(Self { environment, now })
	}

	pub fn env_id(&self) -> Option<EnvId> {
		self.environment.as_ref().map(|env| env.id)
	}

	/// Whether something scoped to `scope` applies in this context
	///
	/// Unscoped entries apply everywhere. Scoped entries apply only inside
	/// their own environment, and only while it is enabled.
	pub fn in_this_environment(&self, scope: Option<EnvId>) -> bool {
		match (scope, &self.environment) {
			(None, _) => true,
			(Some(scope), Some(env)) => env.enabled && env.id == scope,
			(Some(_), None) => false,
		}
	}
}

impl Default for EnvContext {
	fn default() -> Self {
		Self::global()
	}
}


// vim: ts=4
