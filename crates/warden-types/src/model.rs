//! Entity records as supplied by the persistence layer.
//!
//! The engine treats these as read-only inputs for a resolution pass. They are
//! created and mutated by administrative actions through a [`StoreAdapter`].
//!
//! [`StoreAdapter`]: crate::store_adapter::StoreAdapter

use serde::{Deserialize, Serialize};
use serde_with::skip_serializing_none;

use crate::prelude::*;
use crate::types::serialize_timestamp_iso_opt;

/// A scoping sub-tenant for permission assignments and bans
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Environment {
	pub id: EnvId,
	pub name: Box<str>,
	pub enabled: bool,
}

/// A node in the group tree
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
	pub id: GroupId,
	pub name: Box<str>,
	pub weight: i64,
	/// Single parent, the tree is kept acyclic at write time
	pub parent: Option<GroupId>,
}

/// Which entity a permission assignment belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AssignmentOwner {
	Group(GroupId),
	User(UserId),
	ApiClient(ApiClientId),
}

impl From<PrincipalId> for AssignmentOwner {
	fn from(id: PrincipalId) -> Self {
		match id {
			PrincipalId::User(id) => AssignmentOwner::User(id),
			PrincipalId::ApiClient(id) => AssignmentOwner::ApiClient(id),
		}
	}
}

/// A raw permission string attached to a group, user or API client
///
/// `permission` is stored as written: `"users.ban"`, `"-users.ban"` or `"*"`.
#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PermissionAssignment {
	pub id: AssignmentId,
	pub permission: Box<str>,
	/// `None` applies in every environment
	pub env: Option<EnvId>,
	pub owner: AssignmentOwner,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ban {
	pub id: BanId,
	pub user: UserId,
	/// `None` is a global ban
	pub env: Option<EnvId>,
	pub issued_at: Timestamp,
	/// `None` is a permanent ban
	pub expires_at: Option<Timestamp>,
	pub reason: Box<str>,
	pub appealable: bool,
}

impl Ban {
	pub fn is_global(&self) -> bool {
		self.env.is_none()
	}

	pub fn is_permanent(&self) -> bool {
		self.expires_at.is_none()
	}

	pub fn is_expired(&self, now: Timestamp) -> bool {
		self.expires_at.is_some_and(|expiry| now >= expiry)
	}

	pub fn is_active(&self, now: Timestamp) -> bool {
		now >= self.issued_at && !self.is_expired(now)
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
	pub id: UserId,
	pub name: Box<str>,
	/// Group memberships in evaluation order (later groups override earlier ones)
	pub groups: Vec<GroupId>,
}

#[skip_serializing_none]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiClient {
	pub id: ApiClientId,
	pub name: Box<str>,
	pub owner: Option<UserId>,
	/// Inherit the owner's permissions verbatim
	pub all_permissions: bool,
	/// System principal: wildcard permissions and maximal weight when ownerless
	pub is_super: bool,
}

/// Data needed to create a ban
#[derive(Debug, Clone)]
pub struct CreateBanData<'a> {
	pub user: UserId,
	pub env: Option<EnvId>,
	pub issued_at: Timestamp,
	pub expires_at: Option<Timestamp>,
	pub reason: &'a str,
	pub appealable: bool,
}

/// Public view of a ban, as returned to API consumers
#[skip_serializing_none]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanView {
	pub id: BanId,
	pub env: Option<EnvId>,
	#[serde(serialize_with = "crate::types::serialize_timestamp_iso")]
	pub issued_at: Timestamp,
	#[serde(serialize_with = "serialize_timestamp_iso_opt")]
	pub expires_at: Option<Timestamp>,
	pub reason: Box<str>,
	pub appealable: bool,
}

impl From<&Ban> for BanView {
	fn from(ban: &Ban) -> Self {
		BanView {
			id: ban.id,
			env: ban.env,
			issued_at: ban.issued_at,
			expires_at: ban.expires_at,
			reason: ban.reason.clone(),
			appealable: ban.appealable,
		}
	}
}


// vim: ts=4
