//! Resolved permission dictionary cache
//!
//! Dictionaries are keyed by principal (or group) identity and, below that, by
//! the environment they were resolved in. Entries are only ever removed by an
//! explicit invalidation or LRU eviction. Values are shared as
//! `Arc<PermissionDict>` so readers never observe a partially written entry.
//!
//! Every invalidation advances a generation counter. A dictionary built from
//! data read at an older generation is not stored, so a resolution that raced
//! an admin write cannot reinstate what the write invalidated.

use lru::LruCache;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use crate::prelude::*;
use crate::resolver::PermissionDict;

const DEFAULT_CAPACITY: NonZeroUsize = match NonZeroUsize::new(1024) {
	Some(v) => v,
	None => unreachable!(),
};

/// Identity a resolved dictionary belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
	Group(GroupId),
	User(UserId),
	ApiClient(ApiClientId),
}

impl From<PrincipalId> for CacheKey {
	fn from(id: PrincipalId) -> Self {
		match id {
			PrincipalId::User(id) => CacheKey::User(id),
			PrincipalId::ApiClient(id) => CacheKey::ApiClient(id),
		}
	}
}

impl std::fmt::Display for CacheKey {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			CacheKey::Group(id) => write!(f, "group:{}", id),
			CacheKey::User(id) => write!(f, "user:{}", id),
			CacheKey::ApiClient(id) => write!(f, "client:{}", id),
		}
	}
}

#[derive(Debug, Default)]
struct CacheEntry {
	/// Owner of an API client entry, so owner changes can cascade
	owner: Option<UserId>,
	by_env: HashMap<Option<EnvId>, Arc<PermissionDict>>,
}

pub struct PermissionCache {
	entries: RwLock<LruCache<CacheKey, CacheEntry>>,
	/// Only advanced while `entries` is write-locked
	generation: AtomicU64,
}

impl PermissionCache {
	pub fn new(capacity: usize) -> Self {
		let capacity = NonZeroUsize::new(capacity).unwrap_or(DEFAULT_CAPACITY);
		Self { entries: RwLock::new(LruCache::new(capacity)), generation: AtomicU64::new(0) }
	}

	/// Number of invalidations so far
	///
	/// Read it before loading the data a dictionary is built from and pass it
	/// back to [`put`](Self::put).
	pub fn generation(&self) -> u64 {
		self.generation.load(Ordering::Acquire)
	}

	fn advance(&self) {
		self.generation.fetch_add(1, Ordering::AcqRel);
	}

	pub fn get(&self, key: CacheKey, env: Option<EnvId>) -> Option<Arc<PermissionDict>> {
		// LRU bookkeeping needs write access
		let mut entries = self.entries.write();
		entries.get(&key).and_then(|entry| entry.by_env.get(&env).cloned())
	}

	/// Store `dict` unless the cache was invalidated after `generation`
	///
	/// Returns whether the dictionary was stored.
	pub fn put(
		&self,
		key: CacheKey,
		env: Option<EnvId>,
		owner: Option<UserId>,
		dict: Arc<PermissionDict>,
		generation: u64,
	) -> bool {
		let mut entries = self.entries.write();
		if self.generation() != generation {
			return false;
		}
		let entry = entries.get_or_insert_mut(key, CacheEntry::default);
		entry.owner = owner;
		entry.by_env.insert(env, dict);
		true
	}

	/// Drop every cached dictionary of `key`
	///
	/// Invalidating a user also drops the dictionaries of API clients it owns,
	/// since those are derived from the owner's.
	pub fn invalidate(&self, key: CacheKey) {
		let mut entries = self.entries.write();
		self.advance();
		entries.pop(&key);
		if let CacheKey::User(user_id) = key {
			let owned: Vec<CacheKey> = entries
				.iter()
				.filter(|(_, entry)| entry.owner == Some(user_id))
				.map(|(key, _)| *key)
				.collect();
			for client in owned {
				entries.pop(&client);
			}
		}
	}

	pub fn clear(&self) {
		let mut entries = self.entries.write();
		self.advance();
		entries.clear();
	}

	#[cfg(test)]
	fn len(&self) -> usize {
		self.entries.read().len()
	}

	#[cfg(test)]
	fn is_empty(&self) -> bool {
		self.len() == 0
	}
}

impl Default for PermissionCache {
	fn default() -> Self {
		Self::new(DEFAULT_CAPACITY.get())
	}
}


// vim: ts=4
