//! Initial data loaded from a JSON document
//!
//! ```json
//! {
//!   "environments": [{ "id": 1, "name": "main", "enabled": true }],
//!   "groups": [{ "id": 2, "name": "users", "weight": 0 }],
//!   "users": [{ "id": 3, "name": "alice", "groups": [2] }],
//!   "assignments": [{ "id": 4, "permission": "chat", "owner": { "group": 2 } }],
//!   "settings": [{ "key": "ban.auto_global_ban", "value": 3 }]
//! }
//! ```

use serde::Deserialize;

use crate::state::State;
use warden::model::{ApiClient, Ban, Environment, Group, PermissionAssignment, User};
use warden::prelude::*;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeedSetting {
	#[serde(default)]
	pub env: Option<EnvId>,
	pub key: String,
	pub value: serde_json::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Seed {
	pub environments: Vec<Environment>,
	pub groups: Vec<Group>,
	pub users: Vec<User>,
	pub api_clients: Vec<ApiClient>,
	pub assignments: Vec<PermissionAssignment>,
	pub bans: Vec<Ban>,
	pub settings: Vec<SeedSetting>,
}

impl Seed {
	pub fn from_json(json: &str) -> WdResult<Self> {
		Ok(serde_json::from_str(json)?)
	}

	/// Move all records into the tables
	///
	/// Records are stored as given. Referential checks are left to the
	/// admin layer, same as for regular writes.
	pub(crate) fn apply(self, state: &mut State) {
		for env in self.environments {
			state.bump_id(env.id.0);
			state.environments.insert(env.id, env);
		}
		for group in self.groups {
			state.bump_id(group.id.0);
			state.groups.insert(group.id, group);
		}
		for user in self.users {
			state.bump_id(user.id.0);
			state.users.insert(user.id, user);
		}
		for client in self.api_clients {
			state.bump_id(client.id.0);
			state.api_clients.insert(client.id, client);
		}
		for assignment in self.assignments {
			state.bump_id(assignment.id.0);
			state.assignments.insert(assignment.id, assignment);
		}
		for ban in self.bans {
			state.bump_id(ban.id.0);
			state.bans.insert(ban.id, ban);
		}
		for setting in self.settings {
			state.settings.insert((setting.env, setting.key), setting.value);
		}
	}
}


// vim: ts=4
