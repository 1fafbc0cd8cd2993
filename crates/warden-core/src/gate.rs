//! Authorization gate
//!
//! Answers "may principal A act on principal B". Acting on yourself (or, for
//! an API client, on your owner) needs only the self permission; acting on
//! anyone else needs the override permission and a passing weight check.

use std::sync::Arc;

use crate::ban::{BanEvaluator, BanStatus};
use crate::context::EnvContext;
use crate::loader::PrincipalLoader;
use crate::policy_settings::PolicySettings;
use crate::prelude::*;
use crate::principal::Principal;
use crate::resolver::{PermissionDict, PermissionResolver};
use crate::settings::SettingsService;
use crate::weight::weight_check;
use warden_types::store_adapter::StoreAdapter;

pub struct AuthorizationGate {
	loader: PrincipalLoader,
	resolver: Arc<PermissionResolver>,
	settings: Arc<SettingsService>,
}

impl AuthorizationGate {
	pub fn new(
		store: Arc<dyn StoreAdapter>,
		resolver: Arc<PermissionResolver>,
		settings: Arc<SettingsService>,
	) -> Self {
		Self { loader: PrincipalLoader::new(store, resolver.clone()), resolver, settings }
	}

	pub fn loader(&self) -> &PrincipalLoader {
		&self.loader
	}

	pub fn resolver(&self) -> &Arc<PermissionResolver> {
		&self.resolver
	}

	/// Policy settings effective in the context's environment
	pub async fn policy(&self, ctx: &EnvContext) -> WdResult<PolicySettings> {
		PolicySettings::load(&self.settings, ctx.env_id()).await
	}

	pub fn resolve_permissions(&self, principal: &Principal, ctx: &EnvContext) -> Arc<PermissionDict> {
		self.resolver.resolve(principal, ctx)
	}

	pub fn has_permission(&self, principal: &Principal, permission: &str, ctx: &EnvContext) -> bool {
		self.resolver.has_permission(principal, permission, ctx)
	}

	pub async fn ban_status(&self, principal: &Principal, ctx: &EnvContext) -> WdResult<BanStatus> {
		let settings = self.policy(ctx).await?;
		Ok(BanEvaluator::for_principal(principal, ctx, &settings).status())
	}

	/// Load the target and decide whether `acting` may act on it
	///
	/// Fails with `NotFound` if the target does not exist, even for anonymous
	/// callers.
	pub async fn authorize(
		&self,
		acting: Option<&Principal>,
		target: PrincipalId,
		override_permission: &str,
		self_permission: &str,
		ctx: &EnvContext,
	) -> WdResult<bool> {
		let target = self.loader.load(target).await?;
		let settings = self.policy(ctx).await?;
		Ok(self.authorize_loaded(
			acting,
			&target,
			override_permission,
			self_permission,
			ctx,
			&settings,
		))
	}

	/// Same decision as [`authorize`](Self::authorize) over already loaded principals
	pub fn authorize_loaded(
		&self,
		acting: Option<&Principal>,
		target: &Principal,
		override_permission: &str,
		self_permission: &str,
		ctx: &EnvContext,
		settings: &PolicySettings,
	) -> bool {
		let Some(acting) = acting else {
			debug!(target = %target.id(), "Anonymous principal denied");
			return false;
		};

		if acting.acts_as(target.id()) {
			return self_permission.is_empty()
				|| self.resolver.has_permission(acting, self_permission, ctx);
		}

		if !self.resolver.has_permission(acting, override_permission, ctx) {
			warn!(
				acting = %acting.id(),
				target = %target.id(),
				permission = override_permission,
				"Override permission missing"
			);
			return false;
		}

		if !weight_check(acting, target, settings) {
			warn!(
				acting = %acting.id(),
				acting_weight = acting.weight(),
				target = %target.id(),
				target_weight = target.weight(),
				"Weight check failed"
			);
			return false;
		}

		true
	}
}

// vim: ts=4
