//! Principal snapshots
//!
//! A snapshot is the immutable slice of the assignment graph needed to answer
//! questions about one principal during a single request: the expanded group
//! chains, direct assignments and bans. Snapshots are built by the
//! [`PrincipalLoader`](crate::loader::PrincipalLoader) or assembled directly by
//! embedders that already hold the records.
//!
//! Each snapshot records the resolver cache generation read before its data
//! was loaded. Dictionaries resolved from a snapshot older than the latest
//! invalidation are returned but not cached. Hand-assembled snapshots should
//! take the value of [`PermissionResolver::generation`] before reading their
//! records.
//!
//! [`PermissionResolver::generation`]: crate::resolver::PermissionResolver::generation

use crate::prelude::*;
use warden_types::model::{ApiClient, Ban, Group, PermissionAssignment, User};

/// Weight of an ownerless super client, above any group weight in practice
pub const SUPER_WEIGHT: i64 = 9999;

/// A group together with its own (non-inherited) assignments
#[derive(Debug, Clone)]
pub struct GroupNode {
	pub group: Group,
	pub assignments: Vec<PermissionAssignment>,
}

/// Ancestor chain of a group, root first, the group itself last
#[derive(Debug, Clone)]
pub struct GroupChain {
	ancestors: Vec<GroupNode>,
	leaf: GroupNode,
}

impl GroupChain {
	/// Build from nodes ordered root first
	///
	/// Returns `None` for an empty chain.
	pub fn new(mut nodes: Vec<GroupNode>) -> Option<Self> {
		let leaf = nodes.pop()?;
		Some(Self { ancestors: nodes, leaf })
	}

	/// Build from nodes ordered leaf first (the order a parent walk yields)
	pub fn from_leaf_first(mut nodes: Vec<GroupNode>) -> Option<Self> {
		nodes.reverse();
		Self::new(nodes)
	}

	/// Nodes root first, leaf last
	pub fn iter(&self) -> impl Iterator<Item = &GroupNode> {
		self.ancestors.iter().chain(std::iter::once(&self.leaf))
	}

	/// The group this chain was built for
	pub fn leaf(&self) -> &Group {
		&self.leaf.group
	}

	pub fn contains(&self, group_id: GroupId) -> bool {
		self.iter().any(|node| node.group.id == group_id)
	}
}

#[derive(Debug, Clone)]
pub struct UserSnapshot {
	pub user: User,
	/// One chain per membership, in membership order
	pub groups: Vec<GroupChain>,
	pub assignments: Vec<PermissionAssignment>,
	pub bans: Vec<Ban>,
	/// Resolver cache generation read before loading started
	pub generation: u64,
}

impl UserSnapshot {
	/// Highest weight among the user's groups, floored at 0
	pub fn weight(&self) -> i64 {
		self.groups.iter().map(|chain| chain.leaf().weight).max().unwrap_or(0).max(0)
	}
}

#[derive(Debug, Clone)]
pub struct ApiClientSnapshot {
	pub client: ApiClient,
	pub assignments: Vec<PermissionAssignment>,
	/// Resolved owner, `None` if the client has no owner or it no longer exists
	pub owner: Option<UserSnapshot>,
	pub generation: u64,
}

impl ApiClientSnapshot {
	pub fn weight(&self) -> i64 {
		match &self.owner {
			Some(owner) => owner.weight(),
			None if self.client.is_super => SUPER_WEIGHT,
			None => 0,
		}
	}
}

/// Anything that can hold permissions and be banned
#[derive(Debug, Clone)]
pub enum Principal {
	User(UserSnapshot),
	ApiClient(ApiClientSnapshot),
}

impl Principal {
	pub fn id(&self) -> PrincipalId {
		match self {
			Principal::User(user) => PrincipalId::User(user.user.id),
			Principal::ApiClient(client) => PrincipalId::ApiClient(client.client.id),
		}
	}

	pub fn weight(&self) -> i64 {
		match self {
			Principal::User(user) => user.weight(),
			Principal::ApiClient(client) => client.weight(),
		}
	}

	/// Bans affecting this principal (API clients carry their owner's bans)
	pub fn bans(&self) -> &[Ban] {
		match self {
			Principal::User(user) => &user.bans,
			Principal::ApiClient(client) => {
				client.owner.as_ref().map_or(&[][..], |owner| owner.bans.as_slice())
			}
		}
	}

	/// Owning user of an API client
	pub fn owner_id(&self) -> Option<UserId> {
		match self {
			Principal::User(_) => None,
			Principal::ApiClient(client) => client.client.owner,
		}
	}

	/// Whether `self` acts as `other`: same identity, or an API client owned by it
	pub fn acts_as(&self, other: PrincipalId) -> bool {
		if self.id() == other {
			return true;
		}
		match (self.owner_id(), other) {
			(Some(owner), PrincipalId::User(user)) => owner == user,
			_ => false,
		}
	}
}



// vim: ts=4
