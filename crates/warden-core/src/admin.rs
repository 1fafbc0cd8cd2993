//! Administrative writes
//!
//! Every mutation of groups, assignments, memberships and bans goes through
//! here. This is where the data integrity rules live:
//!
//! - the group tree stays acyclic (checked when a parent is assigned),
//! - permission strings are well-formed nodes (checked when assigned),
//! - bans have a sane time window and an existing environment.
//!
//! After each write the affected resolver cache entries are invalidated.

use std::sync::Arc;

use crate::cache::CacheKey;
use crate::node::PermissionNode;
use crate::prelude::*;
use crate::resolver::PermissionResolver;
use warden_types::model::{
	ApiClient, AssignmentOwner, Ban, CreateBanData, Environment, Group, PermissionAssignment, User,
};
use warden_types::store_adapter::StoreAdapter;

pub struct AdminService {
	store: Arc<dyn StoreAdapter>,
	resolver: Arc<PermissionResolver>,
}

impl AdminService {
	pub fn new(store: Arc<dyn StoreAdapter>, resolver: Arc<PermissionResolver>) -> Self {
		Self { store, resolver }
	}

	fn invalidate_owner(&self, owner: AssignmentOwner) {
		match owner {
			// Descendant groups, their members and members' clients are all affected
			AssignmentOwner::Group(_) => self.resolver.invalidate_all(),
			AssignmentOwner::User(id) => self.resolver.invalidate(CacheKey::User(id)),
			AssignmentOwner::ApiClient(id) => self.resolver.invalidate(CacheKey::ApiClient(id)),
		}
	}

	/// Reject `parent` for `group_id` if it would close a loop
	///
	/// Walks up from the proposed parent; reaching `group_id` means the group
	/// would become its own ancestor. The existing tree is acyclic, so the walk
	/// terminates.
	async fn check_parent(&self, group_id: GroupId, parent: GroupId) -> WdResult<()> {
		let mut next = Some(parent);
		while let Some(id) = next {
			if id == group_id {
				warn!(group = %group_id, parent = %parent, "Rejected cyclic group parent");
				return Err(Error::CyclicGroup { group: group_id, parent });
			}
			next = self.store.get_group(id).await?.parent;
		}
		Ok(())
	}

	pub async fn create_environment(&self, name: &str, enabled: bool) -> WdResult<Environment> {
		if name.trim().is_empty() {
			return Err(Error::ValidationError("Environment name cannot be empty".into()));
		}
		let env = self.store.create_environment(name, enabled).await?;
		info!(env = %env.id, name = name, enabled = enabled, "Environment created");
		Ok(env)
	}

	/// Enable or disable an environment
	///
	/// Scoped assignments of a disabled environment stop applying, so every
	/// cached dictionary of that environment is stale.
	pub async fn set_environment_enabled(&self, env_id: EnvId, enabled: bool) -> WdResult<()> {
		self.store.update_environment_enabled(env_id, enabled).await?;
		self.resolver.invalidate_all();
		info!(env = %env_id, enabled = enabled, "Environment toggled");
		Ok(())
	}

	pub async fn create_user(&self, name: &str) -> WdResult<User> {
		if name.trim().is_empty() {
			return Err(Error::ValidationError("User name cannot be empty".into()));
		}
		let user = self.store.create_user(name).await?;
		info!(user = %user.id, name = name, "User created");
		Ok(user)
	}

	pub async fn create_group(
		&self,
		name: &str,
		weight: i64,
		parent: Option<GroupId>,
	) -> WdResult<Group> {
		if name.trim().is_empty() {
			return Err(Error::ValidationError("Group name cannot be empty".into()));
		}
		if let Some(parent) = parent {
			// A new group cannot be anyone's ancestor yet, only check existence
			self.store.get_group(parent).await?;
		}
		let group = self.store.create_group(name, weight, parent).await?;
		info!(group = %group.id, name = name, weight = weight, "Group created");
		Ok(group)
	}

	pub async fn set_group_parent(&self, group_id: GroupId, parent: Option<GroupId>) -> WdResult<()> {
		self.store.get_group(group_id).await?;
		if let Some(parent) = parent {
			self.check_parent(group_id, parent).await?;
		}
		self.store.update_group_parent(group_id, parent).await?;
		self.resolver.invalidate_all();
		info!(group = %group_id, parent = ?parent, "Group parent changed");
		Ok(())
	}

	pub async fn set_group_weight(&self, group_id: GroupId, weight: i64) -> WdResult<()> {
		self.store.update_group_weight(group_id, weight).await?;
		info!(group = %group_id, weight = weight, "Group weight changed");
		Ok(())
	}

	/// Attach a permission node to a group, user or API client
	pub async fn assign_permission(
		&self,
		owner: AssignmentOwner,
		permission: &str,
		env: Option<EnvId>,
	) -> WdResult<PermissionAssignment> {
		let node = PermissionNode::parse(permission).inspect_err(|_| {
			warn!(owner = ?owner, permission = permission, "Rejected malformed permission node");
		})?;
		if let Some(env) = env {
			self.store.get_environment(env).await?;
		}
		match owner {
			AssignmentOwner::Group(id) => {
				self.store.get_group(id).await?;
			}
			AssignmentOwner::User(id) => {
				self.store.get_user(id).await?;
			}
			AssignmentOwner::ApiClient(id) => {
				self.store.get_api_client(id).await?;
			}
		}

		let assignment = self.store.create_assignment(owner, permission, env).await?;
		self.invalidate_owner(owner);
		info!(owner = ?owner, node = %node, env = ?env, "Permission assigned");
		Ok(assignment)
	}

	pub async fn revoke_permission(&self, assignment_id: AssignmentId) -> WdResult<()> {
		let assignment = self.store.get_assignment(assignment_id).await?;
		self.store.delete_assignment(assignment_id).await?;
		self.invalidate_owner(assignment.owner);
		info!(assignment = %assignment_id, owner = ?assignment.owner, "Permission revoked");
		Ok(())
	}

	/// Replace a user's ordered group memberships
	pub async fn set_user_groups(&self, user_id: UserId, groups: &[GroupId]) -> WdResult<()> {
		self.store.get_user(user_id).await?;
		for group_id in groups {
			self.store.get_group(*group_id).await?;
		}
		self.store.update_user_groups(user_id, groups).await?;
		self.resolver.invalidate(CacheKey::User(user_id));
		info!(user = %user_id, groups = ?groups, "User groups changed");
		Ok(())
	}

	pub async fn create_api_client(
		&self,
		name: &str,
		owner: Option<UserId>,
		all_permissions: bool,
		is_super: bool,
	) -> WdResult<ApiClient> {
		if let Some(owner) = owner {
			self.store.get_user(owner).await?;
		}
		let client = self.store.create_api_client(name, owner, all_permissions, is_super).await?;
		info!(client = %client.id, owner = ?owner, is_super = is_super, "API client created");
		Ok(client)
	}

	pub async fn issue_ban(&self, data: CreateBanData<'_>) -> WdResult<Ban> {
		if let Some(expires_at) = data.expires_at {
			if expires_at <= data.issued_at {
				return Err(Error::ValidationError("Ban must expire after it is issued".into()));
			}
		}
		if let Some(env) = data.env {
			self.store.get_environment(env).await?;
		}
		self.store.get_user(data.user).await?;

		let ban = self.store.create_ban(data).await?;
		info!(
			ban = %ban.id,
			user = %ban.user,
			env = ?ban.env,
			expires_at = ?ban.expires_at,
			"Ban issued"
		);
		Ok(ban)
	}

	pub async fn lift_ban(&self, ban_id: BanId) -> WdResult<()> {
		let ban = self.store.get_ban(ban_id).await?;
		self.store.delete_ban(ban_id).await?;
		info!(ban = %ban_id, user = %ban.user, "Ban lifted");
		Ok(())
	}
}

// vim: ts=4
