//! Parsed order line types.
//!
//! An order line is one entry of an order's `items` string, for example
//! `2x Latte [Hot] (+ Vanilla, Extra Shot) {If N/A: Call customer}`.

use serde::{Deserialize, Serialize};

/// Result of parsing one order line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum OrderLine {
	/// A line that followed the item grammar.
	Item(LineItem),
	/// Anything else, displayed verbatim.
	Raw { raw: String },
}

impl OrderLine {
	pub fn raw(text: impl Into<String>) -> Self {
		OrderLine::Raw { raw: text.into() }
	}

	pub fn as_item(&self) -> Option<&LineItem> {
		match self {
			OrderLine::Item(item) => Some(item),
			OrderLine::Raw { .. } => None,
		}
	}
}

/// Structured fields of a purchased item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
	pub quantity: u32,
	pub name: String,
	/// Single bracketed tag such as a temperature or size.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub variant: Option<String>,
	pub addons: Vec<String>,
	/// Instruction to follow when the item is unavailable.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub conditional_action: Option<String>,
}

/// Display category of an "If N/A" instruction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "text", rename_all = "camelCase")]
pub enum ActionKind {
	Remove,
	Call,
	Replace,
	/// Unrecognized instruction, shown as written.
	Other(String),
}

/// Display category of a variant tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum VariantTone {
	Hot,
	Cold,
	Neutral,
}
