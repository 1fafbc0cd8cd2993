//! In-memory store adapter
//!
//! Keeps every table in a single `RwLock`ed state. Used for tests, demos and
//! small embedded deployments where the data set is loaded from a seed file.

#![forbid(unsafe_code)]

mod seed;
mod state;

use async_trait::async_trait;
use parking_lot::RwLock;

use warden::model::{
	ApiClient, AssignmentOwner, Ban, CreateBanData, Environment, Group, PermissionAssignment, User,
};
use warden::prelude::*;
use warden::store_adapter::StoreAdapter;

pub use seed::{Seed, SeedSetting};
use state::State;

#[derive(Debug, Default)]
pub struct StoreAdapterMemory {
	state: RwLock<State>,
}

impl StoreAdapterMemory {
	pub fn new() -> Self {
		Self::default()
	}

	pub fn from_seed(seed: Seed) -> Self {
		let mut state = State::default();
		seed.apply(&mut state);
		debug!(
			groups = state.groups.len(),
			users = state.users.len(),
			assignments = state.assignments.len(),
			"Memory store seeded"
		);
		Self { state: RwLock::new(state) }
	}

	pub fn from_json(json: &str) -> WdResult<Self> {
		Ok(Self::from_seed(Seed::from_json(json)?))
	}
}

#[async_trait]
impl StoreAdapter for StoreAdapterMemory {
	// Environments
	//**************
	async fn get_environment(&self, env_id: EnvId) -> WdResult<Environment> {
		self.state.read().environment(env_id)
	}

	async fn create_environment(&self, name: &str, enabled: bool) -> WdResult<Environment> {
		Ok(self.state.write().insert_environment(name, enabled))
	}

	async fn update_environment_enabled(&self, env_id: EnvId, enabled: bool) -> WdResult<()> {
		let mut state = self.state.write();
		let env = state.environments.get_mut(&env_id).ok_or(Error::NotFound)?;
		env.enabled = enabled;
		Ok(())
	}

	// Groups
	//********
	async fn get_group(&self, group_id: GroupId) -> WdResult<Group> {
		self.state.read().group(group_id)
	}

	async fn list_groups(&self) -> WdResult<Vec<Group>> {
		Ok(self.state.read().groups.values().cloned().collect())
	}

	async fn create_group(
		&self,
		name: &str,
		weight: i64,
		parent: Option<GroupId>,
	) -> WdResult<Group> {
		Ok(self.state.write().insert_group(name, weight, parent))
	}

	async fn update_group_parent(
		&self,
		group_id: GroupId,
		parent: Option<GroupId>,
	) -> WdResult<()> {
		self.state.write().group_mut(group_id)?.parent = parent;
		Ok(())
	}

	async fn update_group_weight(&self, group_id: GroupId, weight: i64) -> WdResult<()> {
		self.state.write().group_mut(group_id)?.weight = weight;
		Ok(())
	}

	// Principals
	//************
	async fn get_user(&self, user_id: UserId) -> WdResult<User> {
		self.state.read().user(user_id)
	}

	async fn create_user(&self, name: &str) -> WdResult<User> {
		Ok(self.state.write().insert_user(name))
	}

	async fn update_user_groups(&self, user_id: UserId, groups: &[GroupId]) -> WdResult<()> {
		let mut state = self.state.write();
		let user = state.users.get_mut(&user_id).ok_or(Error::NotFound)?;
		user.groups = groups.to_vec();
		Ok(())
	}

	async fn get_api_client(&self, client_id: ApiClientId) -> WdResult<ApiClient> {
		self.state.read().api_client(client_id)
	}

	async fn create_api_client(
		&self,
		name: &str,
		owner: Option<UserId>,
		all_permissions: bool,
		is_super: bool,
	) -> WdResult<ApiClient> {
		Ok(self.state.write().insert_api_client(name, owner, all_permissions, is_super))
	}

	async fn list_api_clients_of(&self, owner: UserId) -> WdResult<Vec<ApiClient>> {
		Ok(self
			.state
			.read()
			.api_clients
			.values()
			.filter(|c| c.owner == Some(owner))
			.cloned()
			.collect())
	}

	// Permission assignments
	//************************
	async fn list_assignments(&self, owner: AssignmentOwner) -> WdResult<Vec<PermissionAssignment>> {
		Ok(self.state.read().assignments_of(owner))
	}

	async fn create_assignment(
		&self,
		owner: AssignmentOwner,
		permission: &str,
		env: Option<EnvId>,
	) -> WdResult<PermissionAssignment> {
		Ok(self.state.write().insert_assignment(owner, permission, env))
	}

	async fn get_assignment(&self, assignment_id: AssignmentId) -> WdResult<PermissionAssignment> {
		self.state.read().assignments.get(&assignment_id).cloned().ok_or(Error::NotFound)
	}

	async fn delete_assignment(&self, assignment_id: AssignmentId) -> WdResult<()> {
		self.state.write().assignments.remove(&assignment_id).map(|_| ()).ok_or(Error::NotFound)
	}

	// Bans
	//******
	async fn list_bans(&self, user_id: UserId) -> WdResult<Vec<Ban>> {
		Ok(self.state.read().bans_of(user_id))
	}

	async fn get_ban(&self, ban_id: BanId) -> WdResult<Ban> {
		self.state.read().bans.get(&ban_id).cloned().ok_or(Error::NotFound)
	}

	async fn create_ban(&self, data: CreateBanData<'_>) -> WdResult<Ban> {
		Ok(self.state.write().insert_ban(&data))
	}

	async fn delete_ban(&self, ban_id: BanId) -> WdResult<()> {
		self.state.write().bans.remove(&ban_id).map(|_| ()).ok_or(Error::NotFound)
	}

	// Settings
	//**********
	async fn read_setting(
		&self,
		env: Option<EnvId>,
		key: &str,
	) -> WdResult<Option<serde_json::Value>> {
		Ok(self.state.read().settings.get(&(env, key.to_string())).cloned())
	}

	async fn update_setting(
		&self,
		env: Option<EnvId>,
		key: &str,
		value: Option<serde_json::Value>,
	) -> WdResult<()> {
		let mut state = self.state.write();
		match value {
			Some(value) => {
				state.settings.insert((env, key.to_string()), value);
			}
			None => {
				state.settings.remove(&(env, key.to_string()));
			}
		}
		Ok(())
	}
}


// vim: ts=4
