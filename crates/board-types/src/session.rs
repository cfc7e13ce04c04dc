//! Staff profiles and dashboard views.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::role::Capabilities;

/// A staff member the board can act as.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffProfile {
	pub name: String,
	pub role: String,
}

impl StaffProfile {
	pub fn capabilities(&self) -> Capabilities {
		Capabilities::for_role(&self.role)
	}
}

/// Section of the dashboard currently shown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum View {
	#[default]
	Orders,
	Menu,
	Staff,
}

impl fmt::Display for View {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		match self {
			View::Orders => write!(f, "orders"),
			View::Menu => write!(f, "menu"),
			View::Staff => write!(f, "staff"),
		}
	}
}
