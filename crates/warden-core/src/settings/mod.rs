//! Settings subsystem types and service

pub mod service;
pub mod types;

pub use service::{SettingsCache, SettingsService};
pub use types::{
	FrozenSettingsRegistry, Setting, SettingDefinition, SettingDefinitionBuilder, SettingKind,
	SettingScope, SettingValidator, SettingValue, SettingsRegistry,
};

// vim: ts=4
