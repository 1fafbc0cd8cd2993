//! Identifier newtypes and timestamps used throughout Warden.

use serde::{Deserialize, Serialize, Serializer};
use std::time::SystemTime;

macro_rules! id_type {
	($(#[$meta:meta])* $name:ident) => {
		$(#[$meta])*
		#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
		#[serde(transparent)]
		pub struct $name(pub u64);

		impl std::fmt::Display for $name {
			fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
				write!(f, "{}", self.0)
			}
		}
	};
}

id_type!(
	/// User account identifier
	UserId
);
id_type!(
	/// API client identifier
	ApiClientId
);
id_type!(GroupId);
id_type!(
	/// Environment (sub-tenant) identifier
	EnvId
);
id_type!(BanId);
id_type!(AssignmentId);

// PrincipalId //
//*************//
/// Identity of anything that can hold permissions and be banned
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PrincipalId {
	User(UserId),
	ApiClient(ApiClientId),
}

impl std::fmt::Display for PrincipalId {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		match self {
			PrincipalId::User(id) => write!(f, "user:{}", id),
			PrincipalId::ApiClient(id) => write!(f, "client:{}", id),
		}
	}
}

impl From<UserId> for PrincipalId {
	fn from(id: UserId) -> Self {
		PrincipalId::User(id)
	}
}

impl From<ApiClientId> for PrincipalId {
	fn from(id: ApiClientId) -> Self {
		PrincipalId::ApiClient(id)
	}
}

// Timestamp //
//***********//
/// Seconds since the Unix epoch
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Timestamp(pub i64);

impl Timestamp {
	pub fn now() -> Timestamp {
		let res = SystemTime::now().duration_since(SystemTime::UNIX_EPOCH).unwrap_or_default();
		Timestamp(i64::try_from(res.as_secs()).unwrap_or(i64::MAX))
	}

	pub fn add_seconds(&self, seconds: i64) -> Timestamp {
		Timestamp(self.0.saturating_add(seconds))
	}

	/// RFC 3339 representation in UTC (e.g. "2024-01-01T00:00:00Z")
	pub fn to_iso_string(&self) -> String {
		chrono::DateTime::from_timestamp(self.0, 0)
			.map(|dt| dt.to_rfc3339_opts(chrono::SecondsFormat::Secs, true))
			.unwrap_or_else(|| self.0.to_string())
	}
}

impl std::fmt::Display for Timestamp {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		write!(f, "{}", self.0)
	}
}

pub fn serialize_timestamp_iso<S>(ts: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	serializer.serialize_str(&ts.to_iso_string())
}

pub fn serialize_timestamp_iso_opt<S>(
	ts: &Option<Timestamp>,
	serializer: S,
) -> Result<S::Ok, S::Error>
where
	S: Serializer,
{
	match ts {
		Some(ts) => serializer.serialize_str(&ts.to_iso_string()),
		None => serializer.serialize_none(),
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_timestamp_iso() {
		assert_eq!(Timestamp(0).to_iso_string(), "1970-01-01T00:00:00Z");
		assert_eq!(Timestamp(1_704_067_200).to_iso_string(), "2024-01-01T00:00:00Z");
	}

	#[test]
	fn test_timestamp_order() {
		assert!(Timestamp(10) < Timestamp(11));
		assert_eq!(Timestamp(10).add_seconds(5), Timestamp(15));
		assert_eq!(Timestamp(i64::MAX).add_seconds(1), Timestamp(i64::MAX));
	}

	#[test]
	fn test_principal_id_display() {
		assert_eq!(PrincipalId::User(UserId(3)).to_string(), "user:3");
		assert_eq!(PrincipalId::from(ApiClientId(7)).to_string(), "client:7");
	}

	#[test]
	fn test_principal_id_serde() {
		let json = serde_json::to_string(&PrincipalId::User(UserId(3))).unwrap();
		assert_eq!(json, r#"{"user":3}"#);
		let back: PrincipalId = serde_json::from_str(r#"{"apiClient":9}"#).unwrap();
		assert_eq!(back, PrincipalId::ApiClient(ApiClientId(9)));
	}
}

// vim: ts=4
