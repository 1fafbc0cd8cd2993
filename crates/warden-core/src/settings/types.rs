//! Setting values, definitions and the registry they are declared in
//!
//! Modules declare their settings once at startup into a [`SettingsRegistry`].
//! The registry is then frozen and shared read-only by the
//! [`SettingsService`](super::SettingsService).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::prelude::*;

/// Extra check run on a value before it is accepted
pub type SettingValidator = Arc<dyn Fn(&SettingValue) -> WdResult<()> + Send + Sync>;

/// Levels at which a setting may hold a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingScope {
	/// Default only, never changed at runtime
	System,
	/// One value for the whole deployment
	Global,
	/// Per-environment override on top of the global value
	Environment,
}

/// Setting value as stored. The variant is inferred from the JSON shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
	// Bool goes first so `true` is never read as something else
	Bool(bool),
	Int(i64),
	String(String),
	Json(serde_json::Value),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingKind {
	Bool,
	Int,
	String,
	Json,
}

impl std::fmt::Display for SettingKind {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.write_str(match self {
			SettingKind::Bool => "bool",
			SettingKind::Int => "int",
			SettingKind::String => "string",
			SettingKind::Json => "json",
		})
	}
}

impl SettingValue {
	pub fn kind(&self) -> SettingKind {
		match self {
			SettingValue::Bool(_) => SettingKind::Bool,
			SettingValue::Int(_) => SettingKind::Int,
			SettingValue::String(_) => SettingKind::String,
			SettingValue::Json(_) => SettingKind::Json,
		}
	}

	pub fn same_kind(&self, other: &SettingValue) -> bool {
		self.kind() == other.kind()
	}
}

/// Declaration of one setting
#[derive(Clone)]
pub struct SettingDefinition {
	/// Dotted key, e.g. `ban.auto_global_ban`. A trailing `.*` covers a whole namespace.
	pub key: String,
	pub description: String,
	/// Used when nothing is stored. Without a default (and unless `optional`)
	/// a global value must be configured.
	pub default: Option<SettingValue>,
	pub scope: SettingScope,
	/// Node a caller must hold to change the value; `None` makes it read-only
	pub permission: Option<Box<str>>,
	pub optional: bool,
	pub validator: Option<SettingValidator>,
}

impl std::fmt::Debug for SettingDefinition {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("SettingDefinition")
			.field("key", &self.key)
			.field("scope", &self.scope)
			.field("default", &self.default)
			.field("permission", &self.permission)
			.finish_non_exhaustive()
	}
}

impl SettingDefinition {
	pub fn builder(key: impl Into<String>) -> SettingDefinitionBuilder {
		SettingDefinitionBuilder::new(key)
	}

	/// Run the definition's type and validator checks against `value`
	pub fn check(&self, value: &SettingValue) -> WdResult<()> {
		if let Some(default) = &self.default {
			if !value.same_kind(default) {
				return Err(Error::IncorrectType(format!(
					"setting '{}' expects {}, got {}",
					self.key,
					default.kind(),
					value.kind()
				)));
			}
		}
		match &self.validator {
			Some(validator) => validator(value),
			None => Ok(()),
		}
	}
}

pub struct SettingDefinitionBuilder {
	def: SettingDefinition,
	has_description: bool,
}

impl SettingDefinitionBuilder {
	/// Start a global, read-only definition without default
	pub fn new(key: impl Into<String>) -> Self {
		Self {
			def: SettingDefinition {
				key: key.into(),
				description: String::new(),
				default: None,
				scope: SettingScope::Global,
				permission: None,
				optional: false,
				validator: None,
			},
			has_description: false,
		}
	}

	pub fn description(mut self, description: impl Into<String>) -> Self {
		self.def.description = description.into();
		self.has_description = true;
		self
	}

	pub fn default(mut self, value: SettingValue) -> Self {
		self.def.default = Some(value);
		self
	}

	pub fn scope(mut self, scope: SettingScope) -> Self {
		self.def.scope = scope;
		self
	}

	pub fn permission(mut self, permission: impl Into<Box<str>>) -> Self {
		self.def.permission = Some(permission.into());
		self
	}

	pub fn optional(mut self, optional: bool) -> Self {
		self.def.optional = optional;
		self
	}

	pub fn validator<F>(mut self, f: F) -> Self
	where
		F: Fn(&SettingValue) -> WdResult<()> + Send + Sync + 'static,
	{
		self.def.validator = Some(Arc::new(f));
		self
	}

	/// Finish the definition
	///
	/// A description is mandatory, system settings cannot carry a write
	/// permission, and the default must pass the validator.
	pub fn build(self) -> WdResult<SettingDefinition> {
		let def = self.def;
		if !self.has_description {
			return Err(Error::ValidationError(format!("setting '{}' needs a description", def.key)));
		}
		if def.scope == SettingScope::System && def.permission.is_some() {
			return Err(Error::ValidationError(format!(
				"system setting '{}' cannot be writable",
				def.key
			)));
		}
		if let (Some(default), Some(validator)) = (&def.default, &def.validator) {
			validator(default)?;
		}
		Ok(def)
	}
}

/// Stored value returned by a successful write
#[derive(Debug, Clone)]
pub struct Setting {
	pub key: String,
	pub value: SettingValue,
	/// `None` for the global value
	pub env: Option<EnvId>,
	pub updated_at: Timestamp,
}

/// Registry under construction
#[derive(Default)]
pub struct SettingsRegistry {
	definitions: BTreeMap<String, SettingDefinition>,
}

impl SettingsRegistry {
	pub fn new() -> Self {
		Self::default()
	}

	/// Add a definition; keys must be unique
	pub fn register(&mut self, def: SettingDefinition) -> WdResult<()> {
		if self.definitions.contains_key(&def.key) {
			return Err(Error::ValidationError(format!("setting '{}' registered twice", def.key)));
		}
		debug!(key = %def.key, scope = ?def.scope, "Setting registered");
		self.definitions.insert(def.key.clone(), def);
		Ok(())
	}

	pub fn freeze(self) -> FrozenSettingsRegistry {
		info!(count = self.definitions.len(), "Settings registry frozen");
		FrozenSettingsRegistry { definitions: self.definitions }
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}

/// Read-only registry shared at runtime
pub struct FrozenSettingsRegistry {
	definitions: BTreeMap<String, SettingDefinition>,
}

impl FrozenSettingsRegistry {
	/// Look up `key`, falling back to a `<namespace>.*` definition
	pub fn get(&self, key: &str) -> Option<&SettingDefinition> {
		self.definitions.get(key).or_else(|| {
			let (namespace, _) = key.split_once('.')?;
			self.definitions.get(&format!("{}.*", namespace))
		})
	}

	/// All definitions, ordered by key
	pub fn list(&self) -> impl Iterator<Item = &SettingDefinition> {
		self.definitions.values()
	}

	pub fn list_by_prefix<'a>(
		&'a self,
		prefix: &'a str,
	) -> impl Iterator<Item = &'a SettingDefinition> + 'a {
		self.definitions.values().filter(move |def| def.key.starts_with(prefix))
	}

	pub fn len(&self) -> usize {
		self.definitions.len()
	}

	pub fn is_empty(&self) -> bool {
		self.definitions.is_empty()
	}
}


// vim: ts=4
