//! Weight comparison for override checks

use crate::policy_settings::PolicySettings;
use crate::principal::Principal;

/// Whether `actor` outweighs `target`
///
/// Strictly heavier always passes. Equal weight passes only when the
/// `auth.equal_weight_passes` setting is on. Lighter never passes.
pub fn weight_check(actor: &Principal, target: &Principal, settings: &PolicySettings) -> bool {
	compare_weights(actor.weight(), target.weight(), settings)
}

pub fn compare_weights(actor: i64, target: i64, settings: &PolicySettings) -> bool {
	actor > target || (actor == target && settings.equal_weight_passes)
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::principal::SUPER_WEIGHT;
	use crate::principal::fixtures::*;

	fn settings(equal_weight_passes: bool) -> PolicySettings {
		PolicySettings { equal_weight_passes, ..PolicySettings::default() }
	}

	fn member_of(id: u64, weight: i64) -> Principal {
		Principal::User(user(id, vec![chain(vec![group_node(id, weight, None, &[])])], &[]))
	}

	#[test]
	fn test_heavier_passes() {
		let a = member_of(1, 50);
		let b = member_of(2, 10);
		assert!(weight_check(&a, &b, &settings(false)));
		assert!(!weight_check(&b, &a, &settings(false)));
		assert!(!weight_check(&b, &a, &settings(true)));
	}

	#[test]
	fn test_equal_weight_follows_setting() {
		let a = member_of(1, 40);
		assert!(!weight_check(&a, &a, &settings(false)));
		assert!(weight_check(&a, &a, &settings(true)));
		let b = member_of(2, 40);
		assert!(weight_check(&a, &b, &settings(true)));
	}

	#[test]
	fn test_super_client_outweighs_admins() {
		let admin = member_of(1, 100);
		let system = Principal::ApiClient(client(1, None, true, true, &[]));
		assert_eq!(system.weight(), SUPER_WEIGHT);
		assert!(weight_check(&system, &admin, &settings(false)));
		assert!(!weight_check(&admin, &system, &settings(true)));
	}

	#[test]
	fn test_client_uses_owner_weight() {
		let owner = user(1, vec![chain(vec![group_node(1, 50, None, &[])])], &[]);
		let c = Principal::ApiClient(client(1, Some(owner), false, false, &[]));
		let target = member_of(2, 50);
		assert!(!weight_check(&c, &target, &settings(false)));
		assert!(weight_check(&c, &target, &settings(true)));
	}
}

// vim: ts=4
