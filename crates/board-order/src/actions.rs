//! Business actions that advance an order.
//!
//! Staff never set a status directly; they press an action button. Each
//! action has a label, the statuses it is offered from, the status it writes
//! and the capability it requires.

use board_types::{Capabilities, Order, OrderStatus};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

use crate::transitions::is_valid_transition;

/// Errors raised when an action cannot be applied.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ActionError {
	#[error("Unknown action: {0}")]
	Unknown(String),
	#[error("Action '{0}' is not permitted for this role")]
	Forbidden(StatusAction),
	#[error("Action '{action}' is not available for an order that is {status}")]
	NotAvailable {
		action: StatusAction,
		status: OrderStatus,
	},
	/// The order already has the status the action would write.
	#[error("Action '{0}' was already applied")]
	AlreadyApplied(StatusAction),
}

/// An action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StatusAction {
	/// Kitchen starts on a placed order.
	StartPreparing,
	/// Kitchen hands a prepared order to a rider.
	ReadyForPickup,
	/// Rider collects a prepared order.
	ConfirmPickup,
	/// Rider reports arrival at the drop-off point.
	MarkArrived,
	/// Rider hands the order over.
	Complete,
}

impl StatusAction {
	pub const ALL: [StatusAction; 5] = [
		StatusAction::StartPreparing,
		StatusAction::ReadyForPickup,
		StatusAction::ConfirmPickup,
		StatusAction::MarkArrived,
		StatusAction::Complete,
	];

	/// Path segment and log name, e.g. "confirm-pickup".
	pub fn slug(&self) -> &'static str {
		match self {
			StatusAction::StartPreparing => "start-preparing",
			StatusAction::ReadyForPickup => "ready-for-pickup",
			StatusAction::ConfirmPickup => "confirm-pickup",
			StatusAction::MarkArrived => "mark-arrived",
			StatusAction::Complete => "complete",
		}
	}

	/// Button label for an order currently in `status`.
	pub fn label(&self, status: &OrderStatus) -> &'static str {
		match self {
			StatusAction::StartPreparing => "Start Preparing",
			StatusAction::ReadyForPickup => "Ready for Pickup",
			StatusAction::ConfirmPickup => "Confirm Pickup",
			StatusAction::MarkArrived if *status == OrderStatus::Arrived => "Notified",
			StatusAction::MarkArrived => "I'm Here",
			StatusAction::Complete => "Complete",
		}
	}

	/// Status written when the action is applied.
	pub fn target(&self) -> OrderStatus {
		match self {
			StatusAction::StartPreparing => OrderStatus::Preparing,
			StatusAction::ReadyForPickup | StatusAction::ConfirmPickup => OrderStatus::OnTheWay,
			StatusAction::MarkArrived => OrderStatus::Arrived,
			StatusAction::Complete => OrderStatus::Delivered,
		}
	}

	/// Whether the button is shown for an order in `status`.
	///
	/// "I'm Here" stays on screen once the rider has arrived, disabled.
	pub fn is_offered_from(&self, status: &OrderStatus) -> bool {
		match self {
			StatusAction::StartPreparing => *status == OrderStatus::Placed,
			StatusAction::ReadyForPickup | StatusAction::ConfirmPickup => {
				*status == OrderStatus::Preparing
			},
			StatusAction::MarkArrived | StatusAction::Complete => {
				matches!(status, OrderStatus::OnTheWay | OrderStatus::Arrived)
			},
		}
	}

	pub fn is_permitted(&self, caps: &Capabilities) -> bool {
		match self {
			StatusAction::StartPreparing | StatusAction::ReadyForPickup => caps.can_advance_kitchen,
			StatusAction::ConfirmPickup | StatusAction::MarkArrived | StatusAction::Complete => {
				caps.can_advance_rider
			},
		}
	}

	/// Checks that `caps` may apply this action to an order in `status`.
	///
	/// Returns the status to write.
	pub fn check(&self, caps: &Capabilities, status: &OrderStatus) -> Result<OrderStatus, ActionError> {
		if !self.is_permitted(caps) {
			return Err(ActionError::Forbidden(*self));
		}
		let target = self.target();
		if *status == target {
			return Err(ActionError::AlreadyApplied(*self));
		}
		if !self.is_offered_from(status) || !is_valid_transition(status, &target) {
			return Err(ActionError::NotAvailable {
				action: *self,
				status: status.clone(),
			});
		}
		Ok(target)
	}
}

impl fmt::Display for StatusAction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.slug())
	}
}

impl FromStr for StatusAction {
	type Err = ActionError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		StatusAction::ALL
			.into_iter()
			.find(|action| action.slug() == s)
			.ok_or_else(|| ActionError::Unknown(s.to_string()))
	}
}

/// A button as shown on an order card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionButton {
	pub action: StatusAction,
	pub label: String,
	pub enabled: bool,
}

/// Buttons shown on `order` for a staff member with `caps`.
///
/// Every button is disabled while `updating` names this order.
pub fn available_actions(
	caps: &Capabilities,
	order: &Order,
	updating: Option<&str>,
) -> Vec<ActionButton> {
	let status = order.status();
	let busy = updating == Some(order.order_id.as_str());

	StatusAction::ALL
		.into_iter()
		.filter(|action| action.is_permitted(caps) && action.is_offered_from(&status))
		.map(|action| ActionButton {
			action,
			label: action.label(&status).to_string(),
			enabled: !busy && action.check(caps, &status).is_ok(),
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn order(id: &str, status: &str) -> Order {
		Order {
			order_id: id.into(),
			status: status.into(),
			..Order::default()
		}
	}

	fn labels(buttons: &[ActionButton]) -> Vec<&str> {
		buttons.iter().map(|b| b.label.as_str()).collect()
	}

	#[test]
	fn test_kitchen_buttons() {
		let kitchen = Capabilities::for_role("barista");
		assert_eq!(
			labels(&available_actions(&kitchen, &order("A1", "Placed"), None)),
			vec!["Start Preparing"]
		);
		assert_eq!(
			labels(&available_actions(&kitchen, &order("A1", "Preparing"), None)),
			vec!["Ready for Pickup"]
		);
		assert!(available_actions(&kitchen, &order("A1", "On the Way"), None).is_empty());
	}

	#[test]
	fn test_rider_buttons() {
		let rider = Capabilities::for_role("rider");
		assert!(available_actions(&rider, &order("A1", "Placed"), None).is_empty());
		assert_eq!(
			labels(&available_actions(&rider, &order("A1", "preparing"), None)),
			vec!["Confirm Pickup"]
		);
		assert_eq!(
			labels(&available_actions(&rider, &order("A1", "ontheway"), None)),
			vec!["I'm Here", "Complete"]
		);
	}

	#[test]
	fn test_arrived_shows_disabled_notified() {
		let rider = Capabilities::for_role("rider");
		let buttons = available_actions(&rider, &order("A1", "Arrived"), None);
		assert_eq!(buttons[0].label, "Notified");
		assert!(!buttons[0].enabled);
		assert_eq!(buttons[1].label, "Complete");
		assert!(buttons[1].enabled);
	}

	#[test]
	fn test_owner_sees_both_handoff_buttons() {
		let owner = Capabilities::for_role("owner");
		assert_eq!(
			labels(&available_actions(&owner, &order("A1", "Preparing"), None)),
			vec!["Ready for Pickup", "Confirm Pickup"]
		);
	}

	#[test]
	fn test_updating_order_disables_everything() {
		let owner = Capabilities::for_role("admin");
		let buttons = available_actions(&owner, &order("A1", "On the Way"), Some("A1"));
		assert!(!buttons.is_empty());
		assert!(buttons.iter().all(|b| !b.enabled));

		let other = available_actions(&owner, &order("B2", "On the Way"), Some("A1"));
		assert!(other.iter().any(|b| b.enabled));
	}

	#[test]
	fn test_terminal_orders_have_no_buttons() {
		let owner = Capabilities::for_role("owner");
		assert!(available_actions(&owner, &order("A1", "Delivered"), None).is_empty());
		assert!(available_actions(&owner, &order("A1", "Cancelled"), None).is_empty());
	}

	#[test]
	fn test_check_errors() {
		let kitchen = Capabilities::for_role("kitchen");
		let rider = Capabilities::for_role("rider");
		assert_eq!(
			StatusAction::Complete.check(&kitchen, &OrderStatus::OnTheWay),
			Err(ActionError::Forbidden(StatusAction::Complete))
		);
		assert_eq!(
			StatusAction::MarkArrived.check(&rider, &OrderStatus::Arrived),
			Err(ActionError::AlreadyApplied(StatusAction::MarkArrived))
		);
		assert!(matches!(
			StatusAction::ConfirmPickup.check(&rider, &OrderStatus::Placed),
			Err(ActionError::NotAvailable { .. })
		));
		assert_eq!(
			StatusAction::Complete.check(&rider, &OrderStatus::Arrived),
			Ok(OrderStatus::Delivered)
		);
	}

	#[test]
	fn test_slug_round_trip_and_unknown() {
		for action in StatusAction::ALL {
			assert_eq!(action.slug().parse::<StatusAction>(), Ok(action));
		}
		assert_eq!(
			"teleport".parse::<StatusAction>(),
			Err(ActionError::Unknown("teleport".into()))
		);
	}
}
