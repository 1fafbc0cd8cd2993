//! Permission set resolution
//!
//! Flattens the permission assignments reachable from a principal into a
//! single dictionary of `key -> granted`. Assignments are applied in
//! precedence order and later writes win:
//!
//! - group: ancestors root first, the group itself last
//! - user: each membership in list order (expanded as above), then the user's
//!   own assignments
//! - API client: with `all_permissions`, the owner's dictionary as is;
//!   otherwise only the client's own assignments that the owner holds
//!
//! Wildcard handling is deliberately flat: only the literal `"*"` key acts as a
//! fallback. `users.*` is an ordinary key and does not match `users.ban`.

use std::collections::HashMap;
use std::sync::Arc;

use crate::cache::{CacheKey, PermissionCache};
use crate::context::EnvContext;
use crate::node::{PermissionNode, WILDCARD};
use crate::prelude::*;
use crate::principal::{ApiClientSnapshot, GroupChain, Principal, UserSnapshot};
use warden_types::model::PermissionAssignment;

/// Flattened permission key -> granted (true) / denied (false)
pub type PermissionDict = HashMap<String, bool>;

/// Evaluate a permission against a resolved dictionary
///
/// An exact entry wins, then the `"*"` entry, otherwise denied.
pub fn evaluate_permission_dict(dict: &PermissionDict, permission: &str) -> bool {
	if let Some(granted) = dict.get(permission) {
		return *granted;
	}
	dict.get(WILDCARD).copied().unwrap_or(false)
}

/// Apply assignments in order, skipping out-of-environment and malformed ones
fn apply_assignments<'a>(
	dict: &mut PermissionDict,
	assignments: impl IntoIterator<Item = &'a PermissionAssignment>,
	ctx: &EnvContext,
) {
	for assignment in assignments {
		if !ctx.in_this_environment(assignment.env) {
			continue;
		}
		let Some(node) = PermissionNode::parse_lenient(&assignment.permission) else {
			warn!(
				assignment = %assignment.id,
				permission = %assignment.permission,
				"Skipping malformed permission assignment"
			);
			continue;
		};
		dict.insert(node.key.into_string(), node.additive);
	}
}

fn build_group_dict(chain: &GroupChain, ctx: &EnvContext) -> PermissionDict {
	let mut dict = PermissionDict::new();
	for node in chain.iter() {
		apply_assignments(&mut dict, &node.assignments, ctx);
	}
	dict
}

/// Resolves and caches permission dictionaries
///
/// The cache is owned by the resolver and keyed by identity. It is never
/// refreshed implicitly: the persistence layer (or [`AdminService`]) must call
/// [`invalidate`](Self::invalidate) when assignments change. For strictly
/// request-scoped memoization, create a resolver per request.
///
/// A dictionary is cached only if no invalidation happened since the
/// snapshot it was built from was loaded.
///
/// [`AdminService`]: crate::admin::AdminService
pub struct PermissionResolver {
	cache: PermissionCache,
}

impl PermissionResolver {
	pub fn new(cache_capacity: usize) -> Self {
		Self { cache: PermissionCache::new(cache_capacity) }
	}

	/// Cache generation to stamp on snapshots before loading them
	pub fn generation(&self) -> u64 {
		self.cache.generation()
	}

	fn cached(
		&self,
		key: CacheKey,
		ctx: &EnvContext,
		owner: Option<UserId>,
		generation: u64,
		build: impl FnOnce() -> PermissionDict,
	) -> Arc<PermissionDict> {
		let env = ctx.env_id();
		if let Some(dict) = self.cache.get(key, env) {
			debug!(key = %key, env = ?env, "Permission cache hit");
			return dict;
		}
		debug!(key = %key, env = ?env, "Permission cache miss");
		let dict = Arc::new(build());
		if !self.cache.put(key, env, owner, dict.clone(), generation) {
			debug!(key = %key, generation = generation, "Snapshot predates invalidation, not cached");
		}
		dict
	}

	/// Resolve a group's effective dictionary including all ancestors
	///
	/// The chain is taken to be current.
	pub fn resolve_group(&self, chain: &GroupChain, ctx: &EnvContext) -> Arc<PermissionDict> {
		self.group_at(chain, ctx, self.generation())
	}

	fn group_at(&self, chain: &GroupChain, ctx: &EnvContext, generation: u64) -> Arc<PermissionDict> {
		self.cached(CacheKey::Group(chain.leaf().id), ctx, None, generation, || {
			build_group_dict(chain, ctx)
		})
	}

	fn resolve_user(&self, user: &UserSnapshot, ctx: &EnvContext) -> Arc<PermissionDict> {
		self.cached(CacheKey::User(user.user.id), ctx, None, user.generation, || {
			let mut dict = PermissionDict::new();
			for chain in &user.groups {
				let group_dict = self.group_at(chain, ctx, user.generation);
				dict.extend(group_dict.iter().map(|(k, v)| (k.clone(), *v)));
			}
			apply_assignments(&mut dict, &user.assignments, ctx);
			dict
		})
	}

	fn resolve_api_client(
		&self,
		client: &ApiClientSnapshot,
		ctx: &EnvContext,
	) -> Arc<PermissionDict> {
		let owner_dict = match &client.owner {
			Some(owner) => Some(self.resolve_user(owner, ctx)),
			None => None,
		};
		let key = CacheKey::ApiClient(client.client.id);
		self.cached(key, ctx, client.client.owner, client.generation, || {
			let ceiling = match owner_dict {
				Some(dict) => dict,
				None if client.client.is_super => Arc::new(super_dict()),
				None => Arc::new(PermissionDict::new()),
			};
			if client.client.all_permissions {
				return (*ceiling).clone();
			}

			// Only grants and denials the owner itself holds carry over
			let mut own = PermissionDict::new();
			apply_assignments(&mut own, &client.assignments, ctx);
			let mut dict = PermissionDict::new();
			for (key, additive) in own {
				if evaluate_permission_dict(&ceiling, &key) {
					dict.insert(key, additive);
				} else {
					debug!(
						client = %client.client.id,
						permission = %key,
						"Client assignment exceeds owner permissions, ignored"
					);
				}
			}
			dict
		})
	}

	/// Resolve the flattened dictionary of a principal in the given context
	pub fn resolve(&self, principal: &Principal, ctx: &EnvContext) -> Arc<PermissionDict> {
		match principal {
			Principal::User(user) => self.resolve_user(user, ctx),
			Principal::ApiClient(client) => self.resolve_api_client(client, ctx),
		}
	}

	pub fn has_permission(&self, principal: &Principal, permission: &str, ctx: &EnvContext) -> bool {
		evaluate_permission_dict(&self.resolve(principal, ctx), permission)
	}

	/// Forget every cached dictionary of `key` (all environments)
	pub fn invalidate(&self, key: CacheKey) {
		debug!(key = %key, "Invalidating permission cache");
		self.cache.invalidate(key);
	}

	pub fn invalidate_principal(&self, id: PrincipalId) {
		self.invalidate(CacheKey::from(id));
	}

	/// Forget everything, used when group-level data changes
	pub fn invalidate_all(&self) {
		debug!("Invalidating whole permission cache");
		self.cache.clear();
	}
}

impl Default for PermissionResolver {
	fn default() -> Self {
		Self { cache: PermissionCache::default() }
	}
}

fn super_dict() -> PermissionDict {
	let mut dict = PermissionDict::new();
	dict.insert(WILDCARD.to_string(), true);
	dict
}


// vim: ts=4
