pub use warden_types::error::{Error, WdResult};
pub use warden_types::types::{
	ApiClientId, AssignmentId, BanId, EnvId, GroupId, PrincipalId, Timestamp, UserId,
};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
