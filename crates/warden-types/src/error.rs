//! Error type shared by the engine and its adapters.

use crate::types::GroupId;

pub type WdResult<T> = std::result::Result<T, Error>;

#[derive(Debug)]
pub enum Error {
	/// A principal, group, environment or record lookup failed
	NotFound,
	PermissionDenied,
	/// Malformed permission node (empty key after stripping the polarity marker)
	InvalidPermission(String),
	/// A persisted value has the wrong type (setting, weight, ...)
	IncorrectType(String),
	ValidationError(String),
	/// Assigning `parent` to `group` would close a loop in the group tree
	CyclicGroup {
		group: GroupId,
		parent: GroupId,
	},
	Internal(String),

	// externals
	Json(serde_json::Error),
}

impl Error {
	/// Stable machine-readable error code
	pub fn code(&self) -> &'static str {
		match self {
			Error::NotFound => "E-NOT-FOUND",
			Error::PermissionDenied => "E-PERMISSION-DENIED",
			Error::InvalidPermission(_) => "E-INVALID-PERMISSION",
			Error::IncorrectType(_) => "E-INCORRECT-TYPE",
			Error::ValidationError(_) => "E-VALIDATION",
			Error::CyclicGroup { .. } => "E-CYCLIC-GROUP",
			Error::Internal(_) | Error::Json(_) => "E-INTERNAL",
		}
	}
}

impl From<serde_json::Error> for Error {
	fn from(err: serde_json::Error) -> Self {
		Self::Json(err)
	}
}

impl std::fmt::Display for Error {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			Error::NotFound => write!(f, "not found"),
			Error::PermissionDenied => write!(f, "permission denied"),
			Error::InvalidPermission(node) => write!(f, "invalid permission node: '{}'", node),
			Error::IncorrectType(msg) => write!(f, "incorrect type: {}", msg),
			Error::ValidationError(msg) => write!(f, "validation error: {}", msg),
			Error::CyclicGroup { group, parent } => {
				write!(f, "group {} cannot have {} as parent: cycle in group tree", group, parent)
			}
			Error::Internal(msg) => write!(f, "internal error: {}", msg),
			Error::Json(err) => write!(f, "json error: {}", err),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Error::Json(err) => Some(err),
			_ => None,
		}
	}
}

#[cfg(feature = "server")]
impl axum::response::IntoResponse for Error {
	fn into_response(self) -> axum::response::Response {
		use axum::http::StatusCode;

		let status = match &self {
			Error::NotFound => StatusCode::NOT_FOUND,
			Error::PermissionDenied => StatusCode::FORBIDDEN,
			Error::InvalidPermission(_) | Error::ValidationError(_) => StatusCode::BAD_REQUEST,
			Error::IncorrectType(_) => StatusCode::UNPROCESSABLE_ENTITY,
			Error::CyclicGroup { .. } => StatusCode::CONFLICT,
			Error::Internal(_) | Error::Json(_) => StatusCode::INTERNAL_SERVER_ERROR,
		};
		// Internal details are not leaked to clients
		let message = match &self {
			Error::Internal(_) | Error::Json(_) => "Internal server error".to_string(),
			other => other.to_string(),
		};
		let body = serde_json::json!({
			"error": {
				"code": self.code(),
				"message": message,
			}
		});
		(status, axum::Json(body)).into_response()
	}
}


// vim: ts=4
