//! Table storage behind the in-memory adapter

use std::collections::{BTreeMap, HashMap};

use warden::model::{
	ApiClient, AssignmentOwner, Ban, CreateBanData, Environment, Group, PermissionAssignment, User,
};
use warden::prelude::*;

/// All tables. `BTreeMap` keeps ids ordered, so listings follow creation order.
#[derive(Debug, Default)]
pub(crate) struct State {
	last_id: u64,
	pub environments: BTreeMap<EnvId, Environment>,
	pub groups: BTreeMap<GroupId, Group>,
	pub users: BTreeMap<UserId, User>,
	pub api_clients: BTreeMap<ApiClientId, ApiClient>,
	pub assignments: BTreeMap<AssignmentId, PermissionAssignment>,
	pub bans: BTreeMap<BanId, Ban>,
	pub settings: HashMap<(Option<EnvId>, String), serde_json::Value>,
}

fn found<T: Clone>(value: Option<&T>) -> WdResult<T> {
	value.cloned().ok_or(Error::NotFound)
}

impl State {
	pub fn next_id(&mut self) -> u64 {
		self.last_id += 1;
		self.last_id
	}

	/// Keep generated ids above ids of seeded records
	pub fn bump_id(&mut self, id: u64) {
		self.last_id = self.last_id.max(id);
	}

	// Environments
	//**************
	pub fn environment(&self, id: EnvId) -> WdResult<Environment> {
		found(self.environments.get(&id))
	}

	pub fn insert_environment(&mut self, name: &str, enabled: bool) -> Environment {
		let env = Environment { id: EnvId(self.next_id()), name: name.into(), enabled };
		self.environments.insert(env.id, env.clone());
		env
	}

	// Groups
	//********
	pub fn group(&self, id: GroupId) -> WdResult<Group> {
		found(self.groups.get(&id))
	}

	pub fn group_mut(&mut self, id: GroupId) -> WdResult<&mut Group> {
		self.groups.get_mut(&id).ok_or(Error::NotFound)
	}

	pub fn insert_group(&mut self, name: &str, weight: i64, parent: Option<GroupId>) -> Group {
		let group = Group { id: GroupId(self.next_id()), name: name.into(), weight, parent };
		self.groups.insert(group.id, group.clone());
		group
	}

	// Principals
	//************
	pub fn user(&self, id: UserId) -> WdResult<User> {
		found(self.users.get(&id))
	}

	pub fn insert_user(&mut self, name: &str) -> User {
		let user = User { id: UserId(self.next_id()), name: name.into(), groups: Vec::new() };
		self.users.insert(user.id, user.clone());
		user
	}

	pub fn api_client(&self, id: ApiClientId) -> WdResult<ApiClient> {
		found(self.api_clients.get(&id))
	}

	pub fn insert_api_client(
		&mut self,
		name: &str,
		owner: Option<UserId>,
		all_permissions: bool,
		is_super: bool,
	) -> ApiClient {
		let client = ApiClient {
			id: ApiClientId(self.next_id()),
			name: name.into(),
			owner,
			all_permissions,
			is_super,
		};
		self.api_clients.insert(client.id, client.clone());
		client
	}

	// Assignments
	//*************
	pub fn assignments_of(&self, owner: AssignmentOwner) -> Vec<PermissionAssignment> {
		self.assignments.values().filter(|a| a.owner == owner).cloned().collect()
	}

	pub fn insert_assignment(
		&mut self,
		owner: AssignmentOwner,
		permission: &str,
		env: Option<EnvId>,
	) -> PermissionAssignment {
		let assignment = PermissionAssignment {
			id: AssignmentId(self.next_id()),
			permission: permission.into(),
			env,
			owner,
		};
		self.assignments.insert(assignment.id, assignment.clone());
		assignment
	}

	// Bans
	//******
	pub fn bans_of(&self, user: UserId) -> Vec<Ban> {
		self.bans.values().filter(|b| b.user == user).cloned().collect()
	}

	pub fn insert_ban(&mut self, data: &CreateBanData<'_>) -> Ban {
		let ban = Ban {
			id: BanId(self.next_id()),
			user: data.user,
			env: data.env,
			issued_at: data.issued_at,
			expires_at: data.expires_at,
			reason: data.reason.into(),
			appealable: data.appealable,
		};
		self.bans.insert(ban.id, ban.clone());
		ban
	}
}


// vim: ts=4
