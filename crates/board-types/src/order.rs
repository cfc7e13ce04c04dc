//! Order types for the board.
//!
//! Orders are created by the external order-taking system and reach the board
//! as loosely typed JSON records. Every field is carried as a string so that a
//! record with a numeric id, a numeric total or a missing field still
//! decodes; only `status` is ever interpreted, and only after normalization.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

use crate::utils::short_code;

/// An order as returned by the order source.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
	/// Opaque identifier assigned by the order-taking system.
	#[serde(default, deserialize_with = "lenient_string")]
	pub order_id: String,
	/// Free-form workflow status, e.g. "On the Way".
	#[serde(default, deserialize_with = "lenient_string")]
	pub status: String,
	/// Newline-separated order lines.
	#[serde(default, deserialize_with = "lenient_string")]
	pub items: String,
	/// Fulfilment mode ("Delivery", "Pick-up", "Dine-in").
	#[serde(default, deserialize_with = "lenient_string")]
	pub mode: String,
	#[serde(default, deserialize_with = "lenient_string")]
	pub total: String,
	#[serde(default, deserialize_with = "lenient_string")]
	pub payment: String,
	/// Customer name.
	#[serde(default, deserialize_with = "lenient_string")]
	pub name: String,
	#[serde(default, deserialize_with = "lenient_string")]
	pub address: String,
	#[serde(default, deserialize_with = "lenient_string")]
	pub landmark: String,
	/// Requested target time, "ASAP" or empty for as soon as possible.
	#[serde(default, deserialize_with = "lenient_string")]
	pub time: String,
	/// Placement time as an RFC 3339 string.
	#[serde(default, deserialize_with = "lenient_string")]
	pub timestamp: String,
}

impl Order {
	/// Typed view of the current status.
	pub fn status(&self) -> OrderStatus {
		OrderStatus::from_raw(&self.status)
	}

	/// Canonical lowercase, whitespace-free form of the status.
	pub fn normalized_status(&self) -> String {
		normalize_status(&self.status)
	}

	/// Last four characters of the order id, used as a display code.
	pub fn short_code(&self) -> String {
		short_code(&self.order_id)
	}
}

/// Accepts strings, numbers, booleans and null for a string field.
///
/// Structured values (arrays, objects) decode to an empty string rather than
/// failing the whole order list.
fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
	D: Deserializer<'de>,
{
	let value = Option::<serde_json::Value>::deserialize(deserializer)?;
	Ok(match value {
		Some(serde_json::Value::String(s)) => s,
		Some(serde_json::Value::Number(n)) => n.to_string(),
		Some(serde_json::Value::Bool(b)) => b.to_string(),
		_ => String::new(),
	})
}

/// Lowercases a status and strips every whitespace character.
///
/// `"On the Way"`, `"ontheway"` and `" OnTheWay "` all map to `"ontheway"`.
pub fn normalize_status(status: &str) -> String {
	status
		.chars()
		.filter(|c| !c.is_whitespace())
		.flat_map(char::to_lowercase)
		.collect()
}

/// Workflow state of an order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum OrderStatus {
	/// Order received, nothing started.
	Placed,
	/// Kitchen is preparing the order.
	Preparing,
	/// Order picked up by a rider.
	OnTheWay,
	/// Rider is at the drop-off point.
	Arrived,
	/// Order handed over (terminal).
	Delivered,
	/// Order cancelled (terminal).
	Cancelled,
	/// Any other status string, carried in normalized form.
	Unknown(String),
}

impl OrderStatus {
	/// Parses a free-form status string.
	pub fn from_raw(raw: &str) -> Self {
		match normalize_status(raw).as_str() {
			"placed" => OrderStatus::Placed,
			"preparing" => OrderStatus::Preparing,
			"ontheway" => OrderStatus::OnTheWay,
			"arrived" => OrderStatus::Arrived,
			"delivered" => OrderStatus::Delivered,
			"cancelled" => OrderStatus::Cancelled,
			other => OrderStatus::Unknown(other.to_string()),
		}
	}

	/// Label written back to the order source.
	pub fn label(&self) -> &str {
		match self {
			OrderStatus::Placed => "Placed",
			OrderStatus::Preparing => "Preparing",
			OrderStatus::OnTheWay => "On the Way",
			OrderStatus::Arrived => "Arrived",
			OrderStatus::Delivered => "Delivered",
			OrderStatus::Cancelled => "Cancelled",
			OrderStatus::Unknown(raw) => raw,
		}
	}

	/// Normalized form, identical to `normalize_status(self.label())`.
	pub fn normalized(&self) -> &str {
		match self {
			OrderStatus::Placed => "placed",
			OrderStatus::Preparing => "preparing",
			OrderStatus::OnTheWay => "ontheway",
			OrderStatus::Arrived => "arrived",
			OrderStatus::Delivered => "delivered",
			OrderStatus::Cancelled => "cancelled",
			OrderStatus::Unknown(raw) => raw,
		}
	}

	/// Delivered and cancelled orders never change again.
	pub fn is_terminal(&self) -> bool {
		matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
	}
}

impl fmt::Display for OrderStatus {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}", self.label())
	}
}

/// A status write issued by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate {
	pub order_id: String,
	/// New status label, e.g. "On the Way".
	pub status: String,
	/// Name of the staff member issuing the change.
	pub user: String,
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_normalize_status_variants() {
		assert_eq!(normalize_status("On the Way"), "ontheway");
		assert_eq!(normalize_status("ontheway"), "ontheway");
		assert_eq!(normalize_status(" OnTheWay "), "ontheway");
		assert_eq!(normalize_status("On\tThe\nWay"), "ontheway");
		assert_eq!(normalize_status(""), "");
	}

	#[test]
	fn test_normalize_status_idempotent() {
		let once = normalize_status("On The Way");
		assert_eq!(normalize_status(&once), once);
		assert_eq!(once, normalize_status("ontheway"));
	}

	#[test]
	fn test_status_from_raw() {
		assert_eq!(OrderStatus::from_raw("Placed"), OrderStatus::Placed);
		assert_eq!(OrderStatus::from_raw("On the Way"), OrderStatus::OnTheWay);
		assert_eq!(OrderStatus::from_raw(" DELIVERED"), OrderStatus::Delivered);
		assert_eq!(
			OrderStatus::from_raw("Refunded"),
			OrderStatus::Unknown("refunded".to_string())
		);
		assert!(OrderStatus::Cancelled.is_terminal());
		assert!(!OrderStatus::Arrived.is_terminal());
	}

	#[test]
	fn test_label_normalizes_to_normalized() {
		for status in [
			OrderStatus::Placed,
			OrderStatus::Preparing,
			OrderStatus::OnTheWay,
			OrderStatus::Arrived,
			OrderStatus::Delivered,
			OrderStatus::Cancelled,
		] {
			assert_eq!(normalize_status(status.label()), status.normalized());
		}
	}

	#[test]
	fn test_order_decodes_loose_fields() {
		let json = serde_json::json!({
			"orderId": 10245,
			"status": "Placed",
			"items": null,
			"total": 185.5,
			"name": "Ana",
			"extra": "ignored"
		});
		let order: Order = serde_json::from_value(json).unwrap();
		assert_eq!(order.order_id, "10245");
		assert_eq!(order.items, "");
		assert_eq!(order.total, "185.5");
		assert_eq!(order.mode, "");
		assert_eq!(order.short_code(), "0245");
		assert_eq!(order.status(), OrderStatus::Placed);
	}

	#[test]
	fn test_order_structured_field_becomes_empty() {
		let json = serde_json::json!({ "orderId": "A-1", "items": ["1x Latte"] });
		let order: Order = serde_json::from_value(json).unwrap();
		assert_eq!(order.items, "");
	}

	#[test]
	fn test_status_update_wire_names() {
		let update = StatusUpdate {
			order_id: "ORD-1".into(),
			status: "Preparing".into(),
			user: "Thia".into(),
		};
		let value = serde_json::to_value(&update).unwrap();
		assert_eq!(value["orderId"], "ORD-1");
		assert_eq!(value["user"], "Thia");
	}
}
