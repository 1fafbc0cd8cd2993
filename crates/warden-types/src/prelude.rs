pub use crate::error::{Error, WdResult};
pub use crate::types::{
	ApiClientId, AssignmentId, BanId, EnvId, GroupId, PrincipalId, Timestamp, UserId,
};

pub use tracing::{debug, error, info, warn};

// vim: ts=4
