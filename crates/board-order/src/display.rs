//! Display helpers for order cards.

use board_types::{Capabilities, Order, OrderStatus};
use chrono::{DateTime, Local, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static LINK: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"https?://[^\s]+").expect("link pattern is valid"));

const MAPS_SEARCH: &str = "https://www.google.com/maps?q=";

/// Badge category of a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StatusCategory {
	Placed,
	Preparing,
	OnTheWay,
	Arrived,
	Delivered,
	Cancelled,
	Other,
}

pub fn status_category(status: &OrderStatus) -> StatusCategory {
	match status {
		OrderStatus::Placed => StatusCategory::Placed,
		OrderStatus::Preparing => StatusCategory::Preparing,
		OrderStatus::OnTheWay => StatusCategory::OnTheWay,
		OrderStatus::Arrived => StatusCategory::Arrived,
		OrderStatus::Delivered => StatusCategory::Delivered,
		OrderStatus::Cancelled => StatusCategory::Cancelled,
		OrderStatus::Unknown(_) => StatusCategory::Other,
	}
}

/// Fulfilment mode category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ModeCategory {
	Delivery,
	Pickup,
	DineIn,
	Unknown,
}

/// Classifies a free-form mode. Anything not delivery or pick-up is dine-in.
pub fn mode_category(mode: &str) -> ModeCategory {
	let lower = mode.trim().to_lowercase();
	if lower.is_empty() {
		ModeCategory::Unknown
	} else if lower.contains("delivery") {
		ModeCategory::Delivery
	} else if lower.contains("pick") {
		ModeCategory::Pickup
	} else {
		ModeCategory::DineIn
	}
}

/// Caption for the target time; only an exact "Delivery" mode gets "Drop-off".
pub fn target_label(mode: &str) -> &'static str {
	if mode == "Delivery" {
		"Drop-off"
	} else {
		"Ready by"
	}
}

/// Requested time, "ASAP" when none was given.
pub fn target_time(time: &str) -> &str {
	if time.trim().is_empty() {
		"ASAP"
	} else {
		time
	}
}

/// Formats an RFC 3339 timestamp as local `HH:MM`.
///
/// Unparsable input is returned unchanged.
pub fn format_time(timestamp: &str) -> String {
	format_time_in(timestamp, &Local)
}

/// Formats an RFC 3339 timestamp as `HH:MM` in `tz`.
pub fn format_time_in<Tz>(timestamp: &str, tz: &Tz) -> String
where
	Tz: TimeZone,
	Tz::Offset: std::fmt::Display,
{
	match DateTime::parse_from_rfc3339(timestamp.trim()) {
		Ok(parsed) => parsed.with_timezone(tz).format("%H:%M").to_string(),
		Err(_) => timestamp.to_string(),
	}
}

/// First http(s) URL embedded in an address, e.g. a shared map pin.
pub fn extract_link(address: &str) -> Option<&str> {
	LINK.find(address).map(|m| m.as_str())
}

/// Map link for an address: its embedded link, or a map search for it.
pub fn maps_url(address: &str) -> String {
	match extract_link(address) {
		Some(link) => link.to_string(),
		None => format!("{}{}", MAPS_SEARCH, percent_encode(address.trim())),
	}
}

fn percent_encode(input: &str) -> String {
	let mut encoded = String::with_capacity(input.len());
	for b in input.bytes() {
		if b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b'.' | b'~') {
			encoded.push(b as char);
		} else {
			encoded.push_str(&format!("%{:02X}", b));
		}
	}
	encoded
}

/// Whether the "Message Customer" button is shown.
pub fn can_message_customer(caps: &Capabilities, status: &OrderStatus) -> bool {
	caps.is_rider_only() || matches!(status, OrderStatus::OnTheWay | OrderStatus::Arrived)
}

/// Note shown to kitchen staff once an order has left the kitchen.
pub fn kitchen_note(caps: &Capabilities, status: &OrderStatus) -> Option<&'static str> {
	if !caps.can_advance_kitchen {
		return None;
	}
	match status {
		OrderStatus::OnTheWay => Some("With Rider"),
		OrderStatus::Arrived => Some("Rider Arrived"),
		_ => None,
	}
}

/// Whether the rider address block is shown on `order`.
pub fn shows_address(caps: &Capabilities, order: &Order) -> bool {
	caps.is_rider_only() && !order.address.trim().is_empty()
}
