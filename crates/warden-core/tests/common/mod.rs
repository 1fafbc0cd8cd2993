//! Shared fixture: a small community over the in-memory store
//!
//! ```text
//! users (0)          chat, profile.view
//! ├── donators (5)   badge
//! └── moderators (10) user.ban, user.edit.other
//!     └── admins (100) *, -server.shutdown
//! ```
//!
//! alice: users, bob and dave: moderators, carol: admins, erin: donators.
#![allow(dead_code)]

use std::sync::Arc;

use warden_core::{EnvContext, Principal, Warden, WardenConfig};
use warden_store_adapter_memory::StoreAdapterMemory;
use warden_types::model::{AssignmentOwner, Environment};
use warden_types::prelude::*;

pub const NOW: Timestamp = Timestamp(1_700_000_000);

pub struct Fixture {
	pub warden: Warden,
	pub store: Arc<StoreAdapterMemory>,
	pub env: Environment,
	pub users: GroupId,
	pub donators: GroupId,
	pub moderators: GroupId,
	pub admins: GroupId,
	pub alice: UserId,
	pub bob: UserId,
	pub carol: UserId,
	pub dave: UserId,
	pub erin: UserId,
}

pub fn init_tracing() {
	let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

async fn group_with(
	warden: &Warden,
	name: &str,
	weight: i64,
	parent: Option<GroupId>,
	perms: &[&str],
) -> GroupId {
	let group = warden.admin.create_group(name, weight, parent).await.unwrap();
	for perm in perms {
		warden.admin.assign_permission(AssignmentOwner::Group(group.id), perm, None).await.unwrap();
	}
	group.id
}

async fn member_of(warden: &Warden, name: &str, groups: &[GroupId]) -> UserId {
	let user = warden.admin.create_user(name).await.unwrap();
	warden.admin.set_user_groups(user.id, groups).await.unwrap();
	user.id
}

pub async fn fixture() -> Fixture {
	init_tracing();
	let store = Arc::new(StoreAdapterMemory::new());
	let warden = Warden::build(&WardenConfig::default(), store.clone(), |_| Ok(())).unwrap();
	let env = warden.admin.create_environment("main", true).await.unwrap();

	let users = group_with(&warden, "users", 0, None, &["chat", "profile.view"]).await;
	let donators = group_with(&warden, "donators", 5, Some(users), &["badge"]).await;
	let moderators =
		group_with(&warden, "moderators", 10, Some(users), &["user.ban", "user.edit.other"]).await;
	let admins = group_with(&warden, "admins", 100, Some(moderators), &["*", "-server.shutdown"]).await;

	let alice = member_of(&warden, "alice", &[users]).await;
	let bob = member_of(&warden, "bob", &[moderators]).await;
	let carol = member_of(&warden, "carol", &[admins]).await;
	let dave = member_of(&warden, "dave", &[moderators]).await;
	let erin = member_of(&warden, "erin", &[donators]).await;

	Fixture {
		warden,
		store,
		env,
		users,
		donators,
		moderators,
		admins,
		alice,
		bob,
		carol,
		dave,
		erin,
	}
}

impl Fixture {
	pub async fn load(&self, id: impl Into<PrincipalId>) -> Principal {
		self.warden.gate.loader().load(id.into()).await.unwrap()
	}

	/// Context inside the fixture environment
	pub fn env_ctx(&self) -> EnvContext {
		EnvContext::new(Some(self.env.clone())).with_now(NOW)
	}

	pub fn global_ctx(&self) -> EnvContext {
		EnvContext::global().with_now(NOW)
	}

	pub async fn has(&self, id: impl Into<PrincipalId>, permission: &str, ctx: &EnvContext) -> bool {
		let principal = self.load(id).await;
		self.warden.gate.has_permission(&principal, permission, ctx)
	}
}

// vim: ts=4
