//! Policy settings registration
//!
//! Registers the runtime knobs of the weight comparator and ban evaluator and
//! loads them into a [`PolicySettings`] snapshot for a resolution pass.

use serde::{Deserialize, Serialize};

use crate::prelude::*;
use crate::settings::{
	SettingDefinition, SettingScope, SettingValue, SettingsRegistry, SettingsService,
};

pub const EQUAL_WEIGHT_PASSES: &str = "auth.equal_weight_passes";
pub const AUTO_GLOBAL_BAN: &str = "ban.auto_global_ban";
pub const PERMA_GLOBAL_BAN: &str = "ban.perma_global_ban";

/// Permission node required to change policy settings
pub const SETTINGS_UPDATE_PERMISSION: &str = "settings.update";

/// Settings consulted by the weight comparator and ban evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PolicySettings {
	/// Equal weight is enough to act on another principal
	pub equal_weight_passes: bool,
	/// Number of concurrently active bans that escalates to a global ban
	pub auto_global_ban: u32,
	/// Any active permanent ban is also a global ban
	pub perma_global_ban: bool,
}

impl Default for PolicySettings {
	fn default() -> Self {
		Self { equal_weight_passes: false, auto_global_ban: 2, perma_global_ban: true }
	}
}

impl PolicySettings {
	/// Load a snapshot for the given environment
	pub async fn load(settings: &SettingsService, env: Option<EnvId>) -> WdResult<Self> {
		let auto_global_ban = settings.get_int(env, AUTO_GLOBAL_BAN).await?;
		let auto_global_ban =
			u32::try_from(auto_global_ban).ok().filter(|v| *v >= 1).ok_or_else(|| {
				Error::IncorrectType(format!(
					"Setting '{}' must be a positive integer, got {}",
					AUTO_GLOBAL_BAN, auto_global_ban
				))
			})?;
		Ok(Self {
			equal_weight_passes: settings.get_bool(env, EQUAL_WEIGHT_PASSES).await?,
			auto_global_ban,
			perma_global_ban: settings.get_bool(env, PERMA_GLOBAL_BAN).await?,
		})
	}
}

fn validate_threshold(value: &SettingValue) -> WdResult<()> {
	match value {
		SettingValue::Int(i) if *i >= 1 && u32::try_from(*i).is_ok() => Ok(()),
		SettingValue::Int(i) => {
			Err(Error::ValidationError(format!("Auto global ban threshold must be >= 1, got {}", i)))
		}
		other => Err(Error::IncorrectType(format!("expected int, got {}", other.kind()))),
	}
}

/// Register all policy settings
pub fn register_settings(registry: &mut SettingsRegistry) -> WdResult<()> {
	registry.register(
		SettingDefinition::builder(EQUAL_WEIGHT_PASSES)
			.description("Allow acting on principals of equal weight")
			.default(SettingValue::Bool(false))
			.scope(SettingScope::Environment)
			.permission(SETTINGS_UPDATE_PERMISSION)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(AUTO_GLOBAL_BAN)
			.description("Number of active bans after which a user is banned globally")
			.default(SettingValue::Int(2))
			.scope(SettingScope::Global)
			.permission(SETTINGS_UPDATE_PERMISSION)
			.validator(validate_threshold)
			.build()?,
	)?;

	registry.register(
		SettingDefinition::builder(PERMA_GLOBAL_BAN)
			.description("Treat any permanent ban as a global ban")
			.default(SettingValue::Bool(true))
			.scope(SettingScope::Global)
			.permission(SETTINGS_UPDATE_PERMISSION)
			.build()?,
	)?;

	Ok(())
}


// vim: ts=4
