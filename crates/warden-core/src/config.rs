//! Engine configuration

use serde::Deserialize;
use std::sync::Arc;

use crate::admin::AdminService;
use crate::gate::AuthorizationGate;
use crate::prelude::*;
use crate::resolver::PermissionResolver;
use crate::settings::{SettingsRegistry, SettingsService};
use warden_types::store_adapter::StoreAdapter;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WardenConfig {
	/// Number of principals/groups kept in the permission cache
	pub permission_cache_size: usize,
	pub settings_cache_size: usize,
}

impl Default for WardenConfig {
	fn default() -> Self {
		Self { permission_cache_size: 1024, settings_cache_size: 256 }
	}
}

impl WardenConfig {
	pub fn from_json(json: &str) -> WdResult<Self> {
		Ok(serde_json::from_str(json)?)
	}
}

/// Wired engine services sharing one store and one resolver
pub struct Warden {
	pub resolver: Arc<PermissionResolver>,
	pub settings: Arc<SettingsService>,
	pub gate: AuthorizationGate,
	pub admin: AdminService,
}

impl Warden {
	/// Build all services; `extra_settings` registers embedder-specific settings
	pub fn build(
		config: &WardenConfig,
		store: Arc<dyn StoreAdapter>,
		extra_settings: impl FnOnce(&mut SettingsRegistry) -> WdResult<()>,
	) -> WdResult<Self> {
		let mut registry = SettingsRegistry::new();
		crate::register_settings(&mut registry)?;
		extra_settings(&mut registry)?;

		let resolver = Arc::new(PermissionResolver::new(config.permission_cache_size));
		let settings = Arc::new(SettingsService::new(
			Arc::new(registry.freeze()),
			store.clone(),
			config.settings_cache_size,
		));
		let gate = AuthorizationGate::new(store.clone(), resolver.clone(), settings.clone());
		let admin = AdminService::new(store, resolver.clone());

		info!(
			permission_cache_size = config.permission_cache_size,
			settings_cache_size = config.settings_cache_size,
			"Warden engine initialized"
		);
		Ok(Self { resolver, settings, gate, admin })
	}
}


// vim: ts=4
