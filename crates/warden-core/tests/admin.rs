//! Write-time integrity checks of the admin layer

mod common;

#[cfg(test)]
mod tests {
	use super::common::*;
	use warden_types::model::{AssignmentOwner, CreateBanData};
	use warden_types::prelude::*;
	use warden_types::store_adapter::StoreAdapter;

	#[tokio::test]
	async fn test_self_parent_rejected() {
		let f = fixture().await;
		let res = f.warden.admin.set_group_parent(f.users, Some(f.users)).await;
		assert!(matches!(res, Err(Error::CyclicGroup { group, parent }) if group == f.users && parent == f.users));
	}

	#[tokio::test]
	async fn test_ancestor_loop_rejected() {
		let f = fixture().await;
		// admins -> moderators -> users; users under admins would close the loop
		let res = f.warden.admin.set_group_parent(f.users, Some(f.admins)).await;
		assert!(matches!(res, Err(Error::CyclicGroup { .. })));
		assert_eq!(f.store.get_group(f.users).await.unwrap().parent, None);

		let res = f.warden.admin.set_group_parent(f.moderators, Some(f.admins)).await;
		assert!(matches!(res, Err(Error::CyclicGroup { .. })));
	}

	#[tokio::test]
	async fn test_reparent_invalidates() {
		let f = fixture().await;
		let ctx = f.global_ctx();
		assert!(!f.has(f.erin, "user.ban", &ctx).await);

		f.warden.admin.set_group_parent(f.donators, Some(f.moderators)).await.unwrap();
		assert!(f.has(f.erin, "user.ban", &ctx).await);

		f.warden.admin.set_group_parent(f.donators, None).await.unwrap();
		assert!(!f.has(f.erin, "chat", &ctx).await);
		assert!(f.has(f.erin, "badge", &ctx).await);
	}

	#[tokio::test]
	async fn test_missing_parent_rejected() {
		let f = fixture().await;
		assert!(matches!(
			f.warden.admin.create_group("orphans", 0, Some(GroupId(9999))).await,
			Err(Error::NotFound)
		));
		assert!(matches!(
			f.warden.admin.set_group_parent(f.users, Some(GroupId(9999))).await,
			Err(Error::NotFound)
		));
		assert!(matches!(
			f.warden.admin.create_group("  ", 0, None).await,
			Err(Error::ValidationError(_))
		));
	}

	#[tokio::test]
	async fn test_malformed_permission_rejected() {
		let f = fixture().await;
		let owner = AssignmentOwner::Group(f.users);
		for raw in ["", "-"] {
			let res = f.warden.admin.assign_permission(owner, raw, None).await;
			assert!(matches!(res, Err(Error::InvalidPermission(ref p)) if p == raw));
		}
		assert_eq!(f.store.list_assignments(owner).await.unwrap().len(), 2);
	}

	#[tokio::test]
	async fn test_assignment_targets_must_exist() {
		let f = fixture().await;
		assert!(matches!(
			f.warden.admin.assign_permission(AssignmentOwner::User(UserId(9999)), "chat", None).await,
			Err(Error::NotFound)
		));
		assert!(matches!(
			f.warden
				.admin
				.assign_permission(AssignmentOwner::Group(f.users), "chat", Some(EnvId(9999)))
				.await,
			Err(Error::NotFound)
		));
		assert!(matches!(
			f.warden.admin.set_user_groups(f.alice, &[f.users, GroupId(9999)]).await,
			Err(Error::NotFound)
		));
		assert!(matches!(
			f.warden.admin.create_api_client("bot", Some(UserId(9999)), false, false).await,
			Err(Error::NotFound)
		));
	}

	#[tokio::test]
	async fn test_malformed_stored_assignment_skipped() {
		let f = fixture().await;
		let ctx = f.global_ctx();
		// Written around the admin layer, as legacy data would be
		f.store.create_assignment(AssignmentOwner::User(f.alice), "-", None).await.unwrap();
		assert!(f.has(f.alice, "chat", &ctx).await);
	}

	#[tokio::test]
	async fn test_group_weight_changes_user_weight() {
		let f = fixture().await;
		assert_eq!(f.load(f.bob).await.weight(), 10);
		f.warden.admin.set_group_weight(f.moderators, 30).await.unwrap();
		assert_eq!(f.load(f.bob).await.weight(), 30);

		// Heaviest membership counts
		f.warden.admin.set_user_groups(f.alice, &[f.admins, f.users]).await.unwrap();
		assert_eq!(f.load(f.alice).await.weight(), 100);

		let loner = f.warden.admin.create_user("loner").await.unwrap();
		assert_eq!(f.load(loner.id).await.weight(), 0);
	}

	#[tokio::test]
	async fn test_ban_window_validated() {
		let f = fixture().await;
		let data = CreateBanData {
			user: f.alice,
			env: None,
			issued_at: NOW,
			expires_at: Some(NOW),
			reason: "spam",
			appealable: true,
		};
		assert!(matches!(
			f.warden.admin.issue_ban(data.clone()).await,
			Err(Error::ValidationError(_))
		));
		assert!(matches!(
			f.warden
				.admin
				.issue_ban(CreateBanData { expires_at: None, env: Some(EnvId(9999)), ..data.clone() })
				.await,
			Err(Error::NotFound)
		));
		assert!(matches!(
			f.warden
				.admin
				.issue_ban(CreateBanData { expires_at: None, user: UserId(9999), ..data })
				.await,
			Err(Error::NotFound)
		));
	}

	#[tokio::test]
	async fn test_lift_missing_ban() {
		let f = fixture().await;
		assert!(matches!(f.warden.admin.lift_ban(BanId(9999)).await, Err(Error::NotFound)));
		assert!(matches!(
			f.warden.admin.revoke_permission(AssignmentId(9999)).await,
			Err(Error::NotFound)
		));
	}
}

// vim: ts=4
