//! Loads principal snapshots through the store adapter

use futures::future::try_join_all;
use std::sync::Arc;

use crate::prelude::*;
use crate::principal::{ApiClientSnapshot, GroupChain, GroupNode, Principal, UserSnapshot};
use crate::resolver::PermissionResolver;
use warden_types::model::AssignmentOwner;
use warden_types::store_adapter::StoreAdapter;

/// Builds immutable principal snapshots for one resolution pass
///
/// Snapshots are stamped with the resolver's cache generation before any
/// record is read.
#[derive(Clone)]
pub struct PrincipalLoader {
	store: Arc<dyn StoreAdapter>,
	resolver: Arc<PermissionResolver>,
}

impl std::fmt::Debug for PrincipalLoader {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("PrincipalLoader").finish_non_exhaustive()
	}
}

impl PrincipalLoader {
	pub fn new(store: Arc<dyn StoreAdapter>, resolver: Arc<PermissionResolver>) -> Self {
		Self { store, resolver }
	}

	pub fn store(&self) -> &Arc<dyn StoreAdapter> {
		&self.store
	}

	pub async fn load(&self, id: PrincipalId) -> WdResult<Principal> {
		match id {
			PrincipalId::User(user_id) => Ok(Principal::User(self.load_user(user_id).await?)),
			PrincipalId::ApiClient(client_id) => {
				Ok(Principal::ApiClient(self.load_api_client(client_id).await?))
			}
		}
	}

	/// Load a group and its ancestors, root first
	///
	/// The parent links must be acyclic; [`AdminService`] rejects cycles when a
	/// parent is assigned. This walk does not re-check.
	///
	/// [`AdminService`]: crate::admin::AdminService
	pub async fn load_group_chain(&self, group_id: GroupId) -> WdResult<GroupChain> {
		let mut nodes = Vec::new();
		let mut next = Some(group_id);
		while let Some(id) = next {
			let group = self.store.get_group(id).await?;
			let assignments = self.store.list_assignments(AssignmentOwner::Group(id)).await?;
			next = group.parent;
			nodes.push(GroupNode { group, assignments });
		}
		GroupChain::from_leaf_first(nodes).ok_or(Error::NotFound)
	}

	pub async fn load_user(&self, user_id: UserId) -> WdResult<UserSnapshot> {
		self.load_user_at(user_id, self.resolver.generation()).await
	}

	async fn load_user_at(&self, user_id: UserId, generation: u64) -> WdResult<UserSnapshot> {
		let user = self.store.get_user(user_id).await?;
		let groups =
			try_join_all(user.groups.iter().map(|group_id| self.load_group_chain(*group_id)))
				.await?;
		let assignments = self.store.list_assignments(AssignmentOwner::User(user_id)).await?;
		let bans = self.store.list_bans(user_id).await?;
		debug!(user = %user_id, groups = groups.len(), bans = bans.len(), "Loaded user snapshot");
		Ok(UserSnapshot { user, groups, assignments, bans, generation })
	}

	/// Load an API client and its owner
	///
	/// A dangling owner reference is treated as "no resolvable owner".
	pub async fn load_api_client(&self, client_id: ApiClientId) -> WdResult<ApiClientSnapshot> {
		let generation = self.resolver.generation();
		let client = self.store.get_api_client(client_id).await?;
		let assignments =
			self.store.list_assignments(AssignmentOwner::ApiClient(client_id)).await?;
		let owner = match client.owner {
			Some(owner_id) => match self.load_user_at(owner_id, generation).await {
				Ok(owner) => Some(owner),
				Err(Error::NotFound) => {
					warn!(client = %client_id, owner = %owner_id, "API client owner not found");
					None
				}
				Err(err) => return Err(err),
			},
			None => None,
		};
		Ok(ApiClientSnapshot { client, assignments, owner, generation })
	}
}

// vim: ts=4
