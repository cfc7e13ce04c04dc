//! Order line parser.
//!
//! An order line looks like
//!
//! ```text
//! 2x Latte [Hot] (+ Vanilla, Extra Shot) {If N/A: Call customer}
//! ```
//!
//! Parsing runs a fixed sequence of extractors over the line. Each extractor
//! takes the current remainder and returns what it found together with the
//! remainder with that annotation cut out. Lines that do not start with a
//! `<digits>x` quantity, or whose quantity is not a positive integer, come
//! back as [`OrderLine::Raw`]; parsing never fails the caller.

use board_types::{ActionKind, LineItem, OrderLine, VariantTone};
use once_cell::sync::Lazy;
use regex::Regex;

static QUANTITY_PREFIX: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"^\d+x").expect("quantity pattern is valid"));
static CONDITIONAL_ACTION: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\{If N/A:\s*(.*?)\}").expect("action pattern is valid"));
static ADDONS: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\(\+\s*(.*?)\)$").expect("addons pattern is valid"));
static VARIANT: Lazy<Regex> =
	Lazy::new(|| Regex::new(r"\[(.*?)\]").expect("variant pattern is valid"));

/// Parses one order line.
pub fn parse_line(line: &str) -> OrderLine {
	if !QUANTITY_PREFIX.is_match(line) {
		return OrderLine::raw(line);
	}

	let (conditional_action, rest) = extract_conditional_action(line);
	let (addons, rest) = extract_addons(&rest);
	let (variant, rest) = extract_variant(&rest);

	match split_quantity(&rest) {
		Some((quantity, name)) => OrderLine::Item(LineItem {
			quantity,
			name,
			variant,
			addons,
			conditional_action,
		}),
		None => OrderLine::raw(line),
	}
}

/// Parses an untyped JSON value.
///
/// Strings go through [`parse_line`]. Null becomes an empty raw line and any
/// other value becomes a raw line holding its JSON text.
pub fn parse_value(value: &serde_json::Value) -> OrderLine {
	match value {
		serde_json::Value::String(line) => parse_line(line),
		serde_json::Value::Null => OrderLine::raw(""),
		other => OrderLine::raw(other.to_string()),
	}
}

/// Parses an order's `items` string, one line per `\n`.
///
/// A trailing `\r` is dropped and blank lines are skipped.
pub fn parse_items(items: &str) -> Vec<OrderLine> {
	items
		.split('\n')
		.map(|line| line.strip_suffix('\r').unwrap_or(line))
		.filter(|line| !line.trim().is_empty())
		.map(parse_line)
		.collect()
}

/// Removes `range` from `s` and trims what is left.
fn cut(s: &str, range: std::ops::Range<usize>) -> String {
	let mut out = String::with_capacity(s.len());
	out.push_str(&s[..range.start]);
	out.push_str(&s[range.end..]);
	out.trim().to_string()
}

/// First `{If N/A: ...}` group.
fn extract_conditional_action(s: &str) -> (Option<String>, String) {
	match CONDITIONAL_ACTION.captures(s) {
		Some(caps) => match (caps.get(0), caps.get(1)) {
			(Some(whole), Some(text)) => (Some(text.as_str().to_string()), cut(s, whole.range())),
			_ => (None, s.to_string()),
		},
		None => (None, s.to_string()),
	}
}

/// Trailing `(+ a, b)` group, split on commas with empty entries dropped.
///
/// The group must end the (trimmed) line; one in the middle stays part of
/// the name. Empty entries, as in `(+ Vanilla, , Shot)` or a trailing comma,
/// are dropped rather than kept as blank add-ons.
fn extract_addons(s: &str) -> (Vec<String>, String) {
	let trimmed = s.trim();
	let Some(caps) = ADDONS.captures(trimmed) else {
		return (Vec::new(), trimmed.to_string());
	};
	match (caps.get(0), caps.get(1)) {
		(Some(whole), Some(list)) => {
			let addons = list
				.as_str()
				.split(',')
				.map(str::trim)
				.filter(|addon| !addon.is_empty())
				.map(str::to_string)
				.collect();
			(addons, cut(trimmed, whole.range()))
		},
		_ => (Vec::new(), trimmed.to_string()),
	}
}

/// First `[...]` tag.
fn extract_variant(s: &str) -> (Option<String>, String) {
	match VARIANT.captures(s) {
		Some(caps) => match (caps.get(0), caps.get(1)) {
			(Some(whole), Some(tag)) => (Some(tag.as_str().to_string()), cut(s, whole.range())),
			_ => (None, s.to_string()),
		},
		None => (None, s.to_string()),
	}
}

/// Splits `"<n>x name words"` into a positive quantity and the name.
///
/// Runs of whitespace inside the name collapse to one space. An empty name
/// or a quantity that is zero or overflows yields `None`.
fn split_quantity(s: &str) -> Option<(u32, String)> {
	let mut words = s.split_whitespace();
	let quantity = words
		.next()?
		.strip_suffix('x')?
		.parse::<u32>()
		.ok()
		.filter(|q| *q > 0)?;
	let name = words.collect::<Vec<_>>().join(" ");
	if name.is_empty() {
		return None;
	}
	Some((quantity, name))
}

/// Display category of an "If N/A" instruction.
pub fn classify_action(text: &str) -> ActionKind {
	let lower = text.to_lowercase();
	if lower.contains("remove") || lower.contains("cancel") {
		ActionKind::Remove
	} else if lower.contains("call") {
		ActionKind::Call
	} else if lower.contains("replace") {
		ActionKind::Replace
	} else {
		ActionKind::Other(text.to_string())
	}
}

/// Display category of a variant tag.
pub fn classify_variant(tag: &str) -> VariantTone {
	let lower = tag.trim().to_lowercase();
	if lower == "hot" {
		VariantTone::Hot
	} else if lower.contains("cold") || lower.contains("iced") {
		VariantTone::Cold
	} else {
		VariantTone::Neutral
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	fn item(line: &str) -> LineItem {
		match parse_line(line) {
			OrderLine::Item(item) => item,
			OrderLine::Raw { raw } => panic!("expected item, got raw {:?}", raw),
		}
	}

	#[test]
	fn test_full_line() {
		let parsed = item("2x Latte [Hot] (+ Vanilla, Extra Shot)");
		assert_eq!(parsed.quantity, 2);
		assert_eq!(parsed.name, "Latte");
		assert_eq!(parsed.variant.as_deref(), Some("Hot"));
		assert_eq!(parsed.addons, vec!["Vanilla", "Extra Shot"]);
		assert_eq!(parsed.conditional_action, None);
	}

	#[test]
	fn test_conditional_action_only() {
		let parsed = item("1x Croissant {If N/A: Replace with Muffin}");
		assert_eq!(parsed.quantity, 1);
		assert_eq!(parsed.name, "Croissant");
		assert_eq!(parsed.conditional_action.as_deref(), Some("Replace with Muffin"));
		assert_eq!(parsed.variant, None);
		assert!(parsed.addons.is_empty());
		assert_eq!(
			classify_action(parsed.conditional_action.as_deref().unwrap()),
			ActionKind::Replace
		);
	}

	#[test]
	fn test_every_annotation() {
		let parsed = item("3x  Iced   Mocha [Large] (+ Oat Milk) {If N/A: Call customer}");
		assert_eq!(parsed.quantity, 3);
		assert_eq!(parsed.name, "Iced Mocha");
		assert_eq!(parsed.variant.as_deref(), Some("Large"));
		assert_eq!(parsed.addons, vec!["Oat Milk"]);
		assert_eq!(parsed.conditional_action.as_deref(), Some("Call customer"));
	}

	#[test]
	fn test_non_matching_lines_are_raw() {
		for line in ["Delivery FEE: 50", "", "x2 Latte", " 2x Latte", "Note: no sugar"] {
			assert_eq!(parse_line(line), OrderLine::raw(line));
		}
	}

	#[test]
	fn test_bad_quantity_is_raw() {
		assert_eq!(parse_line("0x Latte"), OrderLine::raw("0x Latte"));
		assert_eq!(parse_line("2xLatte"), OrderLine::raw("2xLatte"));
		assert_eq!(parse_line("2x"), OrderLine::raw("2x"));
		assert_eq!(
			parse_line("99999999999x Latte"),
			OrderLine::raw("99999999999x Latte")
		);
	}

	#[test]
	fn test_addons_not_at_end_stay_in_name() {
		let parsed = item("1x Bagel (+ Cream Cheese) Toasted");
		assert_eq!(parsed.name, "Bagel (+ Cream Cheese) Toasted");
		assert!(parsed.addons.is_empty());
	}

	#[test]
	fn test_empty_addon_tokens_dropped() {
		let parsed = item("1x Tea (+ Honey, , Lemon,)");
		assert_eq!(parsed.addons, vec!["Honey", "Lemon"]);
	}

	#[test]
	fn test_only_first_variant_taken() {
		let parsed = item("1x Americano [Cold] [Tall]");
		assert_eq!(parsed.variant.as_deref(), Some("Cold"));
		assert_eq!(parsed.name, "Americano [Tall]");
	}

	#[test]
	fn test_parse_value_non_strings() {
		assert_eq!(parse_value(&json!(null)), OrderLine::raw(""));
		assert_eq!(parse_value(&json!(42)), OrderLine::raw("42"));
		assert_eq!(parse_value(&json!({"a": 1})), OrderLine::raw("{\"a\":1}"));
		assert!(parse_value(&json!("1x Latte")).as_item().is_some());
	}

	#[test]
	fn test_parse_items_splits_lines() {
		let lines = parse_items("2x Latte [Hot]\r\n\n1x Croissant\nDelivery FEE: 50\n");
		assert_eq!(lines.len(), 3);
		assert_eq!(lines[0].as_item().map(|i| i.name.as_str()), Some("Latte"));
		assert_eq!(lines[1].as_item().map(|i| i.quantity), Some(1));
		assert_eq!(lines[2], OrderLine::raw("Delivery FEE: 50"));
		assert!(parse_items("").is_empty());
	}

	#[test]
	fn test_classify_action() {
		assert_eq!(classify_action("Remove item"), ActionKind::Remove);
		assert_eq!(classify_action("cancel order"), ActionKind::Remove);
		assert_eq!(classify_action("CALL ME"), ActionKind::Call);
		assert_eq!(classify_action("replace with tea"), ActionKind::Replace);
		assert_eq!(
			classify_action("Use oat milk"),
			ActionKind::Other("Use oat milk".into())
		);
	}

	#[test]
	fn test_classify_variant() {
		assert_eq!(classify_variant("Hot"), VariantTone::Hot);
		assert_eq!(classify_variant("Iced"), VariantTone::Cold);
		assert_eq!(classify_variant("Extra Cold"), VariantTone::Cold);
		assert_eq!(classify_variant("Hot & Sweet"), VariantTone::Neutral);
		assert_eq!(classify_variant("Large"), VariantTone::Neutral);
	}
}
