//! Staff roles and the capabilities they grant.
//!
//! Role strings come from staff records and are compared case-insensitively.
//! All permission checks go through [`Capabilities`] so that call sites never
//! inspect role strings themselves.

use serde::{Deserialize, Serialize};

/// Normalized staff role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Role {
	Owner,
	Admin,
	Barista,
	Kitchen,
	Rider,
	/// Unrecognized role, lowercased.
	Other(String),
}

impl Role {
	pub fn parse(raw: &str) -> Self {
		match raw.trim().to_lowercase().as_str() {
			"owner" => Role::Owner,
			"admin" => Role::Admin,
			"barista" => Role::Barista,
			"kitchen" => Role::Kitchen,
			"rider" => Role::Rider,
			other => Role::Other(other.to_string()),
		}
	}

	pub fn capabilities(&self) -> Capabilities {
		match self {
			Role::Owner | Role::Admin => Capabilities {
				can_advance_kitchen: true,
				can_advance_rider: true,
				is_owner_admin: true,
			},
			Role::Barista | Role::Kitchen => Capabilities {
				can_advance_kitchen: true,
				..Capabilities::default()
			},
			Role::Rider => Capabilities {
				can_advance_rider: true,
				..Capabilities::default()
			},
			Role::Other(_) => Capabilities::default(),
		}
	}
}

/// What a staff member may do on the board.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capabilities {
	/// May start preparing and hand orders to riders.
	pub can_advance_kitchen: bool,
	/// May pick up, arrive and complete orders.
	pub can_advance_rider: bool,
	/// May switch between management views.
	pub is_owner_admin: bool,
}

impl Capabilities {
	/// Capabilities for a raw role string.
	pub fn for_role(raw: &str) -> Self {
		Role::parse(raw).capabilities()
	}

	/// True for riders: their board hides orders that are not yet cooking.
	pub fn is_rider_only(&self) -> bool {
		self.can_advance_rider && !self.is_owner_admin
	}
}
