//! Adapter that loads and stores groups, principals, permission assignments,
//! bans, environments and settings.
//!
//! The engine never talks to a database directly: everything it reads comes
//! through this trait. Implementations perform plain storage. Integrity rules
//! (acyclic group tree, well-formed permission nodes) are enforced by the admin
//! layer before a write reaches the adapter.

use async_trait::async_trait;
use std::fmt::Debug;

use crate::model::{
	ApiClient, AssignmentOwner, Ban, CreateBanData, Environment, Group, PermissionAssignment, User,
};
use crate::prelude::*;

#[async_trait]
pub trait StoreAdapter: Debug + Send + Sync {
	// Environments
	//**************
	async fn get_environment(&self, env_id: EnvId) -> WdResult<Environment>;
	async fn create_environment(&self, name: &str, enabled: bool) -> WdResult<Environment>;
	async fn update_environment_enabled(&self, env_id: EnvId, enabled: bool) -> WdResult<()>;

	// Groups
	//********
	async fn get_group(&self, group_id: GroupId) -> WdResult<Group>;
	async fn list_groups(&self) -> WdResult<Vec<Group>>;
	async fn create_group(
		&self,
		name: &str,
		weight: i64,
		parent: Option<GroupId>,
	) -> WdResult<Group>;
	async fn update_group_parent(&self, group_id: GroupId, parent: Option<GroupId>)
	-> WdResult<()>;
	async fn update_group_weight(&self, group_id: GroupId, weight: i64) -> WdResult<()>;

	// Principals
	//************
	async fn get_user(&self, user_id: UserId) -> WdResult<User>;
	async fn create_user(&self, name: &str) -> WdResult<User>;
	/// Replace the ordered group membership list of a user
	async fn update_user_groups(&self, user_id: UserId, groups: &[GroupId]) -> WdResult<()>;

	async fn get_api_client(&self, client_id: ApiClientId) -> WdResult<ApiClient>;
	async fn create_api_client(
		&self,
		name: &str,
		owner: Option<UserId>,
		all_permissions: bool,
		is_super: bool,
	) -> WdResult<ApiClient>;
	async fn list_api_clients_of(&self, owner: UserId) -> WdResult<Vec<ApiClient>>;

	// Permission assignments
	//************************
	/// Direct assignments of an owner, in assignment order
	async fn list_assignments(&self, owner: AssignmentOwner) -> WdResult<Vec<PermissionAssignment>>;
	async fn create_assignment(
		&self,
		owner: AssignmentOwner,
		permission: &str,
		env: Option<EnvId>,
	) -> WdResult<PermissionAssignment>;
	async fn get_assignment(&self, assignment_id: AssignmentId) -> WdResult<PermissionAssignment>;
	async fn delete_assignment(&self, assignment_id: AssignmentId) -> WdResult<()>;

	// Bans
	//******
	async fn list_bans(&self, user_id: UserId) -> WdResult<Vec<Ban>>;
	async fn get_ban(&self, ban_id: BanId) -> WdResult<Ban>;
	async fn create_ban(&self, data: CreateBanData<'_>) -> WdResult<Ban>;
	async fn delete_ban(&self, ban_id: BanId) -> WdResult<()>;

	// Settings
	//**********
	/// Read a stored setting value. `env = None` is the global value.
	async fn read_setting(
		&self,
		env: Option<EnvId>,
		key: &str,
	) -> WdResult<Option<serde_json::Value>>;
	async fn update_setting(
		&self,
		env: Option<EnvId>,
		key: &str,
		value: Option<serde_json::Value>,
	) -> WdResult<()>;
}

// vim: ts=4
