//! Order list filters: the active board, rider visibility and history.
//!
//! All filters preserve the order of their input. The board keeps its list
//! newest-first, so results come out newest-first too.

use board_types::{Capabilities, Order, OrderStatus};

/// An order is active until it is delivered or cancelled.
pub fn is_active(order: &Order) -> bool {
	!order.status().is_terminal()
}

/// Whether a staff member with `caps` sees `order` on the active board.
///
/// Riders only see orders that are cooking or already out.
pub fn is_visible_to(caps: &Capabilities, order: &Order) -> bool {
	if !is_active(order) {
		return false;
	}
	if caps.is_rider_only() {
		return matches!(
			order.status(),
			OrderStatus::Preparing | OrderStatus::OnTheWay | OrderStatus::Arrived
		);
	}
	true
}

pub fn active_orders(orders: &[Order]) -> Vec<&Order> {
	orders.iter().filter(|o| is_active(o)).collect()
}

/// Active orders visible to `caps`.
pub fn visible_orders<'a>(caps: &Capabilities, orders: &'a [Order]) -> Vec<&'a Order> {
	orders.iter().filter(|o| is_visible_to(caps, o)).collect()
}

/// Delivered and cancelled orders matching `query`.
///
/// The query matches a case-insensitive substring of the customer name or a
/// substring of the order id. A blank query matches everything.
pub fn history<'a>(orders: &'a [Order], query: &str) -> Vec<&'a Order> {
	let query = query.trim();
	let lowered = query.to_lowercase();
	orders
		.iter()
		.filter(|o| o.status().is_terminal())
		.filter(|o| {
			query.is_empty()
				|| o.name.to_lowercase().contains(&lowered)
				|| o.order_id.contains(query)
		})
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	fn order(id: &str, status: &str, name: &str) -> Order {
		Order {
			order_id: id.into(),
			status: status.into(),
			name: name.into(),
			..Order::default()
		}
	}

	fn board() -> Vec<Order> {
		vec![
			order("1006", "Placed", "Ana"),
			order("1005", "Preparing", "Ben"),
			order("1004", "On the Way", "Cora"),
			order("1003", "arrived", "Dan"),
			order("1002", "Delivered", "Ana Reyes"),
			order("1001", "CANCELLED", "Eli"),
		]
	}

	fn ids(orders: &[&Order]) -> Vec<String> {
		orders.iter().map(|o| o.order_id.clone()).collect()
	}

	#[test]
	fn test_terminal_orders_never_active() {
		let orders = board();
		for role in ["owner", "admin", "barista", "kitchen", "rider", "guest"] {
			let caps = Capabilities::for_role(role);
			let visible = visible_orders(&caps, &orders);
			assert!(visible.iter().all(|o| !o.status().is_terminal()), "{}", role);
		}
		assert_eq!(ids(&active_orders(&orders)), vec!["1006", "1005", "1004", "1003"]);
	}

	#[test]
	fn test_rider_sees_cooking_and_out() {
		let orders = board();
		let rider = Capabilities::for_role("Rider");
		assert_eq!(ids(&visible_orders(&rider, &orders)), vec!["1005", "1004", "1003"]);

		let kitchen = Capabilities::for_role("kitchen");
		assert_eq!(visible_orders(&kitchen, &orders).len(), 4);
	}

	#[test]
	fn test_unknown_status_is_active_but_hidden_from_riders() {
		let orders = vec![order("9", "Refunded", "Zed")];
		assert_eq!(active_orders(&orders).len(), 1);
		assert!(visible_orders(&Capabilities::for_role("rider"), &orders).is_empty());
	}

	#[test]
	fn test_history_filters_and_searches() {
		let orders = board();
		assert_eq!(ids(&history(&orders, "")), vec!["1002", "1001"]);
		assert_eq!(ids(&history(&orders, "  ana ")), vec!["1002"]);
		assert_eq!(ids(&history(&orders, "1001")), vec!["1001"]);
		assert_eq!(ids(&history(&orders, "100")), vec!["1002", "1001"]);
		assert!(history(&orders, "Ben").is_empty());
	}
}
