//! Permission node parsing
//!
//! A raw assignment string is either additive (`"users.ban"`, `"*"`) or
//! subtractive when prefixed with `-` (`"-users.ban"`). The stripped form is
//! the canonical key. No other escaping exists.

use std::str::FromStr;

use crate::prelude::*;

/// Wildcard key granting (or denying) every permission without an exact entry
pub const WILDCARD: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PermissionNode {
	pub key: Box<str>,
	pub additive: bool,
}

impl PermissionNode {
	/// Parse a raw permission string, rejecting an empty key
	pub fn parse(raw: &str) -> WdResult<PermissionNode> {
		Self::parse_lenient(raw).ok_or_else(|| Error::InvalidPermission(raw.to_string()))
	}

	/// Parse without failing; `None` for malformed nodes
	///
	/// Used at resolution time, where persisted data is trusted but malformed
	/// entries are skipped rather than failing the whole pass.
	pub fn parse_lenient(raw: &str) -> Option<PermissionNode> {
		let (key, additive) = match raw.strip_prefix('-') {
			Some(rest) => (rest, false),
			None => (raw, true),
		};
		if key.is_empty() {
			return None;
		}
		Some(PermissionNode { key: key.into(), additive })
	}

	pub fn is_wildcard(&self) -> bool {
		self.key.as_ref() == WILDCARD
	}
}

impl std::fmt::Display for PermissionNode {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		if self.additive { write!(f, "{}", self.key) } else { write!(f, "-{}", self.key) }
	}
}

impl FromStr for PermissionNode {
	type Err = Error;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		PermissionNode::parse(s)
	}
}


// vim: ts=4
