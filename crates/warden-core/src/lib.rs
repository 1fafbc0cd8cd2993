//! Permission and ban resolution engine for Warden.
//!
//! The engine is pure, read-mostly computation over snapshots of groups,
//! permission assignments and bans loaded through a
//! [`StoreAdapter`](warden_types::store_adapter::StoreAdapter). It answers:
//!
//! - which permissions a principal holds in the current environment,
//! - whether one principal outweighs another,
//! - whether a user is banned (per environment, globally, permanently) and until when,
//! - whether principal A may act on principal B.

#![deny(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![forbid(unsafe_code)]

pub mod admin;
pub mod ban;
pub mod cache;
pub mod config;
pub mod context;
pub mod gate;
pub mod loader;
pub mod node;
pub mod policy_settings;
pub mod prelude;
pub mod principal;
pub mod resolver;
pub mod settings;
pub mod weight;

pub use admin::AdminService;
pub use ban::{BanEvaluator, BanStatus, UnbanTime};
pub use config::{Warden, WardenConfig};
pub use context::EnvContext;
pub use gate::AuthorizationGate;
pub use loader::PrincipalLoader;
pub use node::PermissionNode;
pub use policy_settings::PolicySettings;
pub use principal::Principal;
pub use resolver::{PermissionDict, PermissionResolver, evaluate_permission_dict};
pub use weight::weight_check;

pub fn register_settings(
	registry: &mut settings::SettingsRegistry,
) -> warden_types::error::WdResult<()> {
	policy_settings::register_settings(registry)
}

// vim: ts=4
