//! String formatting utilities for order identifiers.

/// Truncates an identifier for log fields.
///
/// Shows the first 8 characters followed by ".." for longer ids. Works on
/// characters so that non-ASCII ids never split inside a code point.
pub fn truncate_id(id: &str) -> String {
	if id.chars().count() <= 8 {
		id.to_string()
	} else {
		let head: String = id.chars().take(8).collect();
		format!("{}..", head)
	}
}

/// Last four characters of an order id, as shown on order cards.
pub fn short_code(id: &str) -> String {
	let count = id.chars().count();
	id.chars().skip(count.saturating_sub(4)).collect()
}
