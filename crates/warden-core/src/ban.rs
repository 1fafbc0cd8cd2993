//! Ban evaluation
//!
//! Computes whether a user is banned in the current environment or globally,
//! and when the ban lifts. A user is globally banned when any of these hold:
//!
//! 1. an active ban without environment scope exists,
//! 2. an active permanent ban exists and `ban.perma_global_ban` is on,
//! 3. the number of active bans (in any environment) reaches
//!    `ban.auto_global_ban`.
//!
//! Unban times distinguish "not banned" from "never lifts", see [`UnbanTime`].

use itertools::Itertools;
use serde::{Serialize, Serializer};

use crate::context::EnvContext;
use crate::policy_settings::PolicySettings;
use crate::prelude::*;
use crate::principal::Principal;
use warden_types::model::{Ban, BanView};

/// When a ban lifts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnbanTime {
	/// No qualifying ban
	NotBanned,
	/// At least one qualifying ban never expires
	Permanent,
	At(Timestamp),
}

impl UnbanTime {
	/// The later of two unban times; permanent dominates, not banned yields
	pub fn later(self, other: UnbanTime) -> UnbanTime {
		match (self, other) {
			(UnbanTime::Permanent, _) | (_, UnbanTime::Permanent) => UnbanTime::Permanent,
			(UnbanTime::NotBanned, t) | (t, UnbanTime::NotBanned) => t,
			(UnbanTime::At(a), UnbanTime::At(b)) => UnbanTime::At(a.max(b)),
		}
	}

	fn from_latest(expiry: Option<Timestamp>) -> UnbanTime {
		expiry.map_or(UnbanTime::NotBanned, UnbanTime::At)
	}
}

/// Serialized as `null` (not banned), `false` (permanent) or an ISO timestamp
impl Serialize for UnbanTime {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
	where
		S: Serializer,
	{
		match self {
			UnbanTime::NotBanned => serializer.serialize_none(),
			UnbanTime::Permanent => serializer.serialize_bool(false),
			UnbanTime::At(ts) => serializer.serialize_str(&ts.to_iso_string()),
		}
	}
}

/// Evaluates one principal's bans in a context
pub struct BanEvaluator<'a> {
	bans: &'a [Ban],
	ctx: &'a EnvContext,
	settings: &'a PolicySettings,
}

impl<'a> BanEvaluator<'a> {
	pub fn new(bans: &'a [Ban], ctx: &'a EnvContext, settings: &'a PolicySettings) -> Self {
		Self { bans, ctx, settings }
	}

	/// Evaluator over a principal's bans (API clients are judged by their owner's)
	pub fn for_principal(
		principal: &'a Principal,
		ctx: &'a EnvContext,
		settings: &'a PolicySettings,
	) -> Self {
		Self::new(principal.bans(), ctx, settings)
	}

	pub fn is_active(&self, ban: &Ban) -> bool {
		ban.is_active(self.ctx.now)
	}

	pub fn active_bans(&self) -> impl Iterator<Item = &'a Ban> {
		let now = self.ctx.now;
		self.bans.iter().filter(move |ban| ban.is_active(now))
	}

	pub fn active_count(&self) -> usize {
		self.active_bans().count()
	}

	/// Active ban applying in the current environment (global bans included)
	pub fn environment_banned(&self) -> bool {
		self.active_bans().any(|ban| self.ctx.in_this_environment(ban.env))
	}

	pub fn has_direct_global_ban(&self) -> bool {
		self.active_bans().any(Ban::is_global)
	}

	/// Any active permanent ban, whatever its scope
	pub fn perma_banned(&self) -> bool {
		self.active_bans().any(Ban::is_permanent)
	}

	pub fn perma_banned_global(&self) -> bool {
		self.active_bans().any(|ban| ban.is_permanent() && ban.is_global())
	}

	/// Active permanent ban scoped to the current environment
	pub fn perma_banned_environment(&self) -> bool {
		self.active_bans().any(|ban| {
			ban.is_permanent() && !ban.is_global() && self.ctx.in_this_environment(ban.env)
		})
	}

	/// Never below one, so a user without bans is not escalated
	fn auto_ban_threshold(&self) -> usize {
		usize::try_from(self.settings.auto_global_ban).unwrap_or(usize::MAX).max(1)
	}

	pub fn global_banned(&self) -> bool {
		if self.has_direct_global_ban() {
			return true;
		}
		if self.perma_banned() && self.settings.perma_global_ban {
			return true;
		}
		self.active_count() >= self.auto_ban_threshold()
	}

	pub fn banned(&self) -> bool {
		self.environment_banned() || self.global_banned()
	}

	/// When bans scoped to the current environment lift
	pub fn environment_unban_time(&self) -> UnbanTime {
		if self.perma_banned_environment() {
			return UnbanTime::Permanent;
		}
		let latest = self
			.active_bans()
			.filter(|ban| !ban.is_global() && self.ctx.in_this_environment(ban.env))
			.filter_map(|ban| ban.expires_at)
			.max();
		UnbanTime::from_latest(latest)
	}

	/// When the global ban (direct, permanent or escalated) lifts
	pub fn global_unban_time(&self) -> UnbanTime {
		if self.perma_banned_global() {
			return UnbanTime::Permanent;
		}
		if self.perma_banned() && self.settings.perma_global_ban {
			return UnbanTime::Permanent;
		}

		let direct = UnbanTime::from_latest(
			self.active_bans().filter(|ban| ban.is_global()).filter_map(|ban| ban.expires_at).max(),
		);

		direct.later(self.auto_unban_time())
	}

	/// When enough bans have expired that the escalation no longer holds
	///
	/// With `count` active bans and threshold `max`, `1 + (count - max)` of
	/// them must expire. Permanent bans never expire and sort last.
	fn auto_unban_time(&self) -> UnbanTime {
		let count = self.active_count();
		let max = self.auto_ban_threshold();
		if count < max {
			return UnbanTime::NotBanned;
		}
		let diff_needed = 1 + (count - max);

		let expiries: Vec<Option<Timestamp>> = self
			.active_bans()
			.map(|ban| ban.expires_at)
			.sorted_by_key(|expiry| (expiry.is_none(), *expiry))
			.collect();

		match expiries.get(diff_needed - 1) {
			Some(Some(expiry)) => UnbanTime::At(*expiry),
			Some(None) => UnbanTime::Permanent,
			None => UnbanTime::NotBanned,
		}
	}

	/// Later of the environment and global unban times
	pub fn unban_time(&self) -> UnbanTime {
		self.environment_unban_time().later(self.global_unban_time())
	}

	pub fn status(&self) -> BanStatus {
		let unban_time = self.unban_time();
		BanStatus {
			banned: self.banned(),
			environment_banned: self.environment_banned(),
			global_banned: self.global_banned(),
			permanent: unban_time == UnbanTime::Permanent,
			unban_time,
			bans: self.active_bans().map(BanView::from).collect(),
		}
	}
}

/// Ban summary for API responses
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BanStatus {
	pub banned: bool,
	pub environment_banned: bool,
	pub global_banned: bool,
	pub permanent: bool,
	pub unban_time: UnbanTime,
	/// Active bans only
	pub bans: Vec<BanView>,
}

#[cfg(test)]
mod tests {
	use super::*;
	use warden_types::model::Environment;

	const NOW: i64 = 1_000_000;

	fn ban(id: u64, env: Option<u64>, issued: i64, expires: Option<i64>) -> Ban {
		Ban {
			id: BanId(id),
			user: UserId(1),
			env: env.map(EnvId),
			issued_at: Timestamp(NOW + issued),
			expires_at: expires.map(|e| Timestamp(NOW + e)),
			reason: "test".into(),
			appealable: false,
		}
	}

	fn ctx(env: Option<u64>) -> EnvContext {
		EnvContext::new(env.map(|id| Environment {
			id: EnvId(id),
			name: format!("env{}", id).into(),
			enabled: true,
		}))
		.with_now(Timestamp(NOW))
	}

	fn settings(auto_global_ban: u32, perma_global_ban: bool) -> PolicySettings {
		PolicySettings { equal_weight_passes: false, auto_global_ban, perma_global_ban }
	}

	#[test]
	fn test_not_banned() {
		let bans: Vec<Ban> = Vec::new();
		let (c, s) = (ctx(Some(1)), PolicySettings::default());
		let eval = BanEvaluator::new(&bans, &c, &s);
		assert!(!eval.banned());
		assert_eq!(eval.unban_time(), UnbanTime::NotBanned);
	}

	#[test]
	fn test_zero_threshold_treated_as_one() {
		let none: Vec<Ban> = Vec::new();
		let c = ctx(Some(1));
		let s = settings(0, true);
		let eval = BanEvaluator::new(&none, &c, &s);
		assert!(!eval.global_banned());
		assert!(!eval.banned());
		assert_eq!(eval.unban_time(), UnbanTime::NotBanned);

		let one = vec![ban(1, Some(2), -10, Some(50))];
		assert!(BanEvaluator::new(&one, &c, &s).global_banned());
	}

	#[test]
	fn test_inactive_bans_are_ignored() {
		let bans = vec![ban(1, None, -100, Some(-1)), ban(2, None, 10, Some(100))];
		let (c, s) = (ctx(Some(1)), PolicySettings::default());
		let eval = BanEvaluator::new(&bans, &c, &s);
		assert_eq!(eval.active_count(), 0);
		assert!(!eval.banned());
		assert_eq!(eval.unban_time(), UnbanTime::NotBanned);
	}

	#[test]
	fn test_ban_issued_now_is_active() {
		let bans = vec![ban(1, Some(1), 0, Some(50))];
		let (c, s) = (ctx(Some(1)), PolicySettings::default());
		assert!(BanEvaluator::new(&bans, &c, &s).environment_banned());
	}

	#[test]
	fn test_environment_ban() {
		let bans = vec![ban(1, Some(1), -10, Some(50))];
		let s = PolicySettings::default();

		let here = ctx(Some(1));
		let eval = BanEvaluator::new(&bans, &here, &s);
		assert!(eval.environment_banned());
		assert!(!eval.global_banned());
		assert!(eval.banned());
		assert_eq!(eval.environment_unban_time(), UnbanTime::At(Timestamp(NOW + 50)));
		assert_eq!(eval.global_unban_time(), UnbanTime::NotBanned);
		assert_eq!(eval.unban_time(), UnbanTime::At(Timestamp(NOW + 50)));

		let elsewhere = ctx(Some(2));
		let eval = BanEvaluator::new(&bans, &elsewhere, &s);
		assert!(!eval.banned());
		assert_eq!(eval.unban_time(), UnbanTime::NotBanned);
	}

	#[test]
	fn test_direct_global_ban_applies_everywhere() {
		let bans = vec![ban(1, None, -10, Some(70))];
		let s = PolicySettings::default();
		for c in [ctx(None), ctx(Some(1)), ctx(Some(2))] {
			let eval = BanEvaluator::new(&bans, &c, &s);
			assert!(eval.has_direct_global_ban());
			assert!(eval.global_banned());
			assert!(eval.environment_banned());
			assert_eq!(eval.unban_time(), UnbanTime::At(Timestamp(NOW + 70)));
		}
	}

	#[test]
	fn test_two_environment_bans_escalate() {
		let bans = vec![ban(1, Some(1), -10, Some(100)), ban(2, Some(2), -10, Some(200))];
		let (c, s) = (ctx(Some(3)), settings(2, true));
		let eval = BanEvaluator::new(&bans, &c, &s);
		assert!(!eval.has_direct_global_ban());
		assert!(!eval.environment_banned());
		assert!(eval.global_banned());
		assert!(eval.banned());
		// One of the two must expire: the soonest one
		assert_eq!(eval.global_unban_time(), UnbanTime::At(Timestamp(NOW + 100)));
		assert_eq!(eval.unban_time(), UnbanTime::At(Timestamp(NOW + 100)));
	}

	#[test]
	fn test_escalation_below_threshold() {
		let bans = vec![ban(1, Some(1), -10, Some(100)), ban(2, Some(2), -10, Some(200))];
		let (c, s) = (ctx(Some(3)), settings(3, true));
		let eval = BanEvaluator::new(&bans, &c, &s);
		assert!(!eval.global_banned());
		assert_eq!(eval.global_unban_time(), UnbanTime::NotBanned);
	}

	#[test]
	fn test_auto_unban_picks_diff_needed_expiry() {
		// 4 active bans with threshold 2: 3 must expire before the escalation lifts
		let bans = vec![
			ban(1, Some(1), -10, Some(400)),
			ban(2, Some(2), -10, Some(100)),
			ban(3, Some(3), -10, Some(300)),
			ban(4, Some(4), -10, Some(200)),
		];
		let (c, s) = (ctx(Some(9)), settings(2, true));
		let eval = BanEvaluator::new(&bans, &c, &s);
		assert_eq!(eval.global_unban_time(), UnbanTime::At(Timestamp(NOW + 300)));
	}

	#[test]
	fn test_unban_time_is_later_of_environment_and_global() {
		let bans = vec![
			ban(1, Some(1), -10, Some(500)),
			ban(2, None, -10, Some(100)),
		];
		let (c, s) = (ctx(Some(1)), settings(5, true));
		let eval = BanEvaluator::new(&bans, &c, &s);
		assert_eq!(eval.environment_unban_time(), UnbanTime::At(Timestamp(NOW + 500)));
		assert_eq!(eval.global_unban_time(), UnbanTime::At(Timestamp(NOW + 100)));
		assert_eq!(eval.unban_time(), UnbanTime::At(Timestamp(NOW + 500)));
	}

	#[test]
	fn test_direct_global_later_than_auto_unban() {
		let bans = vec![
			ban(1, None, -10, Some(900)),
			ban(2, Some(2), -10, Some(100)),
		];
		let (c, s) = (ctx(None), settings(2, true));
		let eval = BanEvaluator::new(&bans, &c, &s);
		assert_eq!(eval.global_unban_time(), UnbanTime::At(Timestamp(NOW + 900)));
	}

	#[test]
	fn test_permanent_environment_ban_with_perma_global() {
		let bans = vec![ban(1, Some(1), -10, None)];
		let (c, s) = (ctx(Some(2)), settings(2, true));
		let eval = BanEvaluator::new(&bans, &c, &s);
		assert!(eval.perma_banned());
		assert!(!eval.perma_banned_global());
		assert!(!eval.perma_banned_environment());
		assert!(eval.global_banned());
		assert_eq!(eval.unban_time(), UnbanTime::Permanent);
	}

	#[test]
	fn test_permanent_environment_ban_without_perma_global() {
		let bans = vec![ban(1, Some(1), -10, None)];
		let s = settings(2, false);

		let elsewhere = ctx(Some(2));
		let eval = BanEvaluator::new(&bans, &elsewhere, &s);
		assert!(!eval.global_banned());
		assert!(!eval.banned());
		assert_eq!(eval.unban_time(), UnbanTime::NotBanned);

		let here = ctx(Some(1));
		let eval = BanEvaluator::new(&bans, &here, &s);
		assert!(eval.perma_banned_environment());
		assert!(eval.banned());
		assert_eq!(eval.environment_unban_time(), UnbanTime::Permanent);
		assert_eq!(eval.unban_time(), UnbanTime::Permanent);

		// Second ban reaches the threshold regardless of permanence
		let bans = vec![ban(1, Some(1), -10, None), ban(2, Some(3), -10, Some(40))];
		let eval = BanEvaluator::new(&bans, &elsewhere, &s);
		assert!(eval.global_banned());
		// The temporary ban expiring is enough to drop below the threshold
		assert_eq!(eval.global_unban_time(), UnbanTime::At(Timestamp(NOW + 40)));
	}

	#[test]
	fn test_auto_unban_blocked_by_permanent_bans() {
		let bans = vec![ban(1, Some(1), -10, None), ban(2, Some(2), -10, None)];
		let (c, s) = (ctx(Some(3)), settings(2, false));
		let eval = BanEvaluator::new(&bans, &c, &s);
		assert!(eval.global_banned());
		assert_eq!(eval.global_unban_time(), UnbanTime::Permanent);
	}

	#[test]
	fn test_permanent_global_ban() {
		let bans = vec![ban(1, None, -10, None)];
		let (c, s) = (ctx(Some(1)), settings(2, false));
		let eval = BanEvaluator::new(&bans, &c, &s);
		assert!(eval.perma_banned_global());
		assert_eq!(eval.global_unban_time(), UnbanTime::Permanent);
		assert_eq!(eval.unban_time(), UnbanTime::Permanent);
	}

	#[test]
	fn test_unban_time_later() {
		let at = |t| UnbanTime::At(Timestamp(t));
		assert_eq!(UnbanTime::NotBanned.later(UnbanTime::NotBanned), UnbanTime::NotBanned);
		assert_eq!(UnbanTime::NotBanned.later(at(5)), at(5));
		assert_eq!(at(5).later(at(9)), at(9));
		assert_eq!(at(5).later(UnbanTime::Permanent), UnbanTime::Permanent);
		assert_eq!(UnbanTime::Permanent.later(UnbanTime::NotBanned), UnbanTime::Permanent);
	}

	#[test]
	fn test_status_serialization() {
		let bans = vec![ban(1, Some(1), -10, None)];
		let (c, s) = (ctx(Some(1)), settings(2, true));
		let json = serde_json::to_value(BanEvaluator::new(&bans, &c, &s).status()).unwrap();
		assert_eq!(json["banned"], true);
		assert_eq!(json["unbanTime"], false);
		assert_eq!(json["bans"].as_array().map(Vec::len), Some(1));

		let bans: Vec<Ban> = Vec::new();
		let json = serde_json::to_value(BanEvaluator::new(&bans, &c, &s).status()).unwrap();
		assert!(json["unbanTime"].is_null());

		let c = ctx(Some(1)).with_now(Timestamp(1_704_067_100));
		let bans = vec![Ban {
			issued_at: Timestamp(1_704_067_000),
			expires_at: Some(Timestamp(1_704_067_200)),
			..ban(1, Some(1), 0, None)
		}];
		let json = serde_json::to_value(BanEvaluator::new(&bans, &c, &s).status()).unwrap();
		assert_eq!(json["unbanTime"], "2024-01-01T00:00:00Z");
	}
}

// vim: ts=4
