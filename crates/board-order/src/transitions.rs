//! Order status transition table.
//!
//! `placed -> preparing -> ontheway -> arrived -> delivered`, with
//! `cancelled` reachable from every non-terminal state. `ontheway` may also
//! skip straight to `delivered`. Statuses outside the workflow have no
//! outgoing transitions.

use board_types::OrderStatus;
use once_cell::sync::Lazy;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum StatusKind {
	Placed,
	Preparing,
	OnTheWay,
	Arrived,
	Delivered,
	Cancelled,
}

impl StatusKind {
	fn of(status: &OrderStatus) -> Option<Self> {
		match status {
			OrderStatus::Placed => Some(StatusKind::Placed),
			OrderStatus::Preparing => Some(StatusKind::Preparing),
			OrderStatus::OnTheWay => Some(StatusKind::OnTheWay),
			OrderStatus::Arrived => Some(StatusKind::Arrived),
			OrderStatus::Delivered => Some(StatusKind::Delivered),
			OrderStatus::Cancelled => Some(StatusKind::Cancelled),
			OrderStatus::Unknown(_) => None,
		}
	}
}

static TRANSITIONS: Lazy<HashMap<StatusKind, HashSet<StatusKind>>> = Lazy::new(|| {
	use StatusKind::*;
	HashMap::from([
		(Placed, HashSet::from([Preparing, Cancelled])),
		(Preparing, HashSet::from([OnTheWay, Cancelled])),
		(OnTheWay, HashSet::from([Arrived, Delivered, Cancelled])),
		(Arrived, HashSet::from([Delivered, Cancelled])),
		(Delivered, HashSet::new()),
		(Cancelled, HashSet::new()),
	])
});

/// Whether an order may move from `from` to `to`.
pub fn is_valid_transition(from: &OrderStatus, to: &OrderStatus) -> bool {
	match (StatusKind::of(from), StatusKind::of(to)) {
		(Some(from), Some(to)) => TRANSITIONS.get(&from).is_some_and(|next| next.contains(&to)),
		_ => false,
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_forward_path() {
		assert!(is_valid_transition(&OrderStatus::Placed, &OrderStatus::Preparing));
		assert!(is_valid_transition(&OrderStatus::Preparing, &OrderStatus::OnTheWay));
		assert!(is_valid_transition(&OrderStatus::OnTheWay, &OrderStatus::Arrived));
		assert!(is_valid_transition(&OrderStatus::OnTheWay, &OrderStatus::Delivered));
		assert!(is_valid_transition(&OrderStatus::Arrived, &OrderStatus::Delivered));
	}

	#[test]
	fn test_cancel_from_any_open_state() {
		for from in [
			OrderStatus::Placed,
			OrderStatus::Preparing,
			OrderStatus::OnTheWay,
			OrderStatus::Arrived,
		] {
			assert!(is_valid_transition(&from, &OrderStatus::Cancelled));
		}
	}

	#[test]
	fn test_terminal_and_invalid() {
		assert!(!is_valid_transition(&OrderStatus::Delivered, &OrderStatus::Cancelled));
		assert!(!is_valid_transition(&OrderStatus::Cancelled, &OrderStatus::Placed));
		assert!(!is_valid_transition(&OrderStatus::Arrived, &OrderStatus::Arrived));
		assert!(!is_valid_transition(&OrderStatus::Placed, &OrderStatus::OnTheWay));
		assert!(!is_valid_transition(
			&OrderStatus::Unknown("refunded".into()),
			&OrderStatus::Preparing
		));
	}
}
