//! Settings service: layered lookup, caching and checked writes
//!
//! A value is looked up in the current environment first (for
//! environment-scoped settings), then globally, then falls back to the
//! definition's default. Resolved values are cached per `(environment, key)`.

use lru::LruCache;
use parking_lot::RwLock;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::prelude::*;
use crate::resolver::{PermissionDict, evaluate_permission_dict};
use warden_types::store_adapter::StoreAdapter;

use super::types::{
	FrozenSettingsRegistry, Setting, SettingDefinition, SettingKind, SettingScope, SettingValue,
};

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(256) {
	Some(v) => v,
	None => unreachable!(),
};

type CacheKey = (Option<EnvId>, String);

/// Resolved values keyed by the environment they were resolved for
pub struct SettingsCache {
	entries: RwLock<LruCache<CacheKey, SettingValue>>,
}

impl SettingsCache {
	pub fn new(capacity: usize) -> Self {
		let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
		Self { entries: RwLock::new(LruCache::new(capacity)) }
	}

	pub fn get(&self, env: Option<EnvId>, key: &str) -> Option<SettingValue> {
		self.entries.write().get(&(env, key.to_string())).cloned()
	}

	pub fn put(&self, env: Option<EnvId>, key: String, value: SettingValue) {
		self.entries.write().put((env, key), value);
	}

	pub fn clear(&self) {
		self.entries.write().clear();
	}

	/// Drop `key` for every environment, used when its global value changes
	pub fn invalidate_key(&self, key: &str) {
		let mut entries = self.entries.write();
		let stale: Vec<CacheKey> =
			entries.iter().map(|(k, _)| k).filter(|(_, k)| k == key).cloned().collect();
		for k in &stale {
			entries.pop(k);
		}
	}
}

pub struct SettingsService {
	registry: Arc<FrozenSettingsRegistry>,
	cache: SettingsCache,
	store: Arc<dyn StoreAdapter>,
}

/// Storage levels consulted for `def`, most specific first
fn lookup_levels(def: &SettingDefinition, env: Option<EnvId>) -> Vec<Option<EnvId>> {
	match (def.scope, env) {
		(SettingScope::System, _) => Vec::new(),
		(SettingScope::Environment, Some(env)) => vec![Some(env), None],
		(SettingScope::Environment | SettingScope::Global, _) => vec![None],
	}
}

/// Decode a stored value; a shape differing from the default is `IncorrectType`
fn decode(def: &SettingDefinition, json: serde_json::Value) -> WdResult<SettingValue> {
	let value: SettingValue = serde_json::from_value(json)
		.map_err(|e| Error::IncorrectType(format!("setting '{}': {}", def.key, e)))?;
	match &def.default {
		Some(default) if !value.same_kind(default) => Err(Error::IncorrectType(format!(
			"setting '{}' is stored as {}, expected {}",
			def.key,
			value.kind(),
			default.kind()
		))),
		_ => Ok(value),
	}
}

impl SettingsService {
	pub fn new(
		registry: Arc<FrozenSettingsRegistry>,
		store: Arc<dyn StoreAdapter>,
		cache_size: usize,
	) -> Self {
		Self { registry, cache: SettingsCache::new(cache_size), store }
	}

	pub fn registry(&self) -> &Arc<FrozenSettingsRegistry> {
		&self.registry
	}

	fn definition(&self, key: &str) -> WdResult<&SettingDefinition> {
		self.registry.get(key).ok_or_else(|| Error::ValidationError(format!("unknown setting '{}'", key)))
	}

	/// Effective value of `key` in `env`
	pub async fn get(&self, env: Option<EnvId>, key: &str) -> WdResult<SettingValue> {
		if let Some(value) = self.cache.get(env, key) {
			return Ok(value);
		}
		let def = self.definition(key)?;

		let mut resolved = None;
		for level in lookup_levels(def, env) {
			if let Some(json) = self.store.read_setting(level, key).await? {
				resolved = Some(decode(def, json)?);
				break;
			}
		}

		let value = resolved.or_else(|| def.default.clone()).ok_or_else(|| {
			Error::ValidationError(format!("setting '{}' has no value and no default", key))
		})?;
		debug!(key = key, env = ?env, "Setting resolved");
		self.cache.put(env, key.to_string(), value.clone());
		Ok(value)
	}

	/// Store a new value
	///
	/// `granted` is the caller's resolved permission dictionary; it must hold
	/// the definition's permission node. Global-scope settings ignore `env`.
	pub async fn set(
		&self,
		env: Option<EnvId>,
		key: &str,
		value: SettingValue,
		granted: &PermissionDict,
	) -> WdResult<Setting> {
		let def = self.definition(key)?;

		let allowed = def
			.permission
			.as_deref()
			.is_some_and(|permission| evaluate_permission_dict(granted, permission));
		if !allowed || def.scope == SettingScope::System {
			warn!(key = key, permission = ?def.permission, "Setting change denied");
			return Err(Error::PermissionDenied);
		}

		def.check(&value)?;

		let target = match def.scope {
			SettingScope::Environment => env,
			SettingScope::Global | SettingScope::System => None,
		};
		self.store.update_setting(target, key, Some(serde_json::to_value(&value)?)).await?;

		match target {
			Some(env) => self.cache.put(Some(env), key.to_string(), value.clone()),
			None => self.cache.invalidate_key(key),
		}
		info!(key = key, env = ?target, "Setting changed");

		Ok(Setting { key: key.to_string(), value, env: target, updated_at: Timestamp::now() })
	}

	/// Remove the stored value at one level so lookup falls through
	pub async fn reset(&self, env: Option<EnvId>, key: &str) -> WdResult<()> {
		self.definition(key)?;
		self.store.update_setting(env, key, None).await?;
		if env.is_some() {
			// Only this environment's entries are stale, but they are not indexed by env
			self.cache.clear();
		} else {
			self.cache.invalidate_key(key);
		}
		info!(key = key, env = ?env, "Setting reset");
		Ok(())
	}

	/// Fail if a mandatory setting has neither a default nor a global value
	pub async fn validate_required_settings(&self) -> WdResult<()> {
		for def in self.registry.list().filter(|def| !def.optional && def.default.is_none()) {
			if self.store.read_setting(None, &def.key).await?.is_none() {
				error!(key = %def.key, "Required setting missing");
				return Err(Error::ValidationError(format!(
					"required setting '{}' is not configured",
					def.key
				)));
			}
		}
		Ok(())
	}

	async fn typed<T>(
		&self,
		env: Option<EnvId>,
		key: &str,
		expected: SettingKind,
		extract: impl FnOnce(SettingValue) -> Option<T>,
	) -> WdResult<T> {
		let value = self.get(env, key).await?;
		let kind = value.kind();
		extract(value).ok_or_else(|| {
			Error::IncorrectType(format!("setting '{}' is {}, expected {}", key, kind, expected))
		})
	}

	pub async fn get_int(&self, env: Option<EnvId>, key: &str) -> WdResult<i64> {
		self.typed(env, key, SettingKind::Int, |v| match v {
			SettingValue::Int(i) => Some(i),
			_ => None,
		})
		.await
	}

	pub async fn get_bool(&self, env: Option<EnvId>, key: &str) -> WdResult<bool> {
		self.typed(env, key, SettingKind::Bool, |v| match v {
			SettingValue::Bool(b) => Some(b),
			_ => None,
		})
		.await
	}

	pub async fn get_string(&self, env: Option<EnvId>, key: &str) -> WdResult<String> {
		self.typed(env, key, SettingKind::String, |v| match v {
			SettingValue::String(s) => Some(s),
			_ => None,
		})
		.await
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn def(scope: SettingScope) -> SettingDefinition {
		SettingDefinition::builder("a.b")
			.description("d")
			.default(SettingValue::Int(1))
			.scope(scope)
			.build()
			.unwrap()
	}

	#[test]
	fn test_cache_invalidate_key_across_envs() {
		let cache = SettingsCache::new(10);
		cache.put(None, "a.b".into(), SettingValue::Int(1));
		cache.put(Some(EnvId(1)), "a.b".into(), SettingValue::Int(2));
		cache.put(Some(EnvId(1)), "a.c".into(), SettingValue::Int(3));

		cache.invalidate_key("a.b");

		assert!(cache.get(None, "a.b").is_none());
		assert!(cache.get(Some(EnvId(1)), "a.b").is_none());
		assert_eq!(cache.get(Some(EnvId(1)), "a.c"), Some(SettingValue::Int(3)));
	}

	#[test]
	fn test_lookup_levels() {
		let env = Some(EnvId(4));
		assert_eq!(lookup_levels(&def(SettingScope::Environment), env), vec![env, None]);
		assert_eq!(lookup_levels(&def(SettingScope::Environment), None), vec![None]);
		assert_eq!(lookup_levels(&def(SettingScope::Global), env), vec![None]);
		assert!(lookup_levels(&def(SettingScope::System), env).is_empty());
	}

	#[test]
	fn test_decode_checks_kind() {
		let def = def(SettingScope::Global);
		assert_eq!(decode(&def, serde_json::json!(5)).unwrap(), SettingValue::Int(5));
		assert!(matches!(decode(&def, serde_json::json!("5")), Err(Error::IncorrectType(_))));
		assert!(matches!(decode(&def, serde_json::json!(null)), Err(Error::IncorrectType(_))));
	}
}

// vim: ts=4
