//! Order line parser endpoint.

use board_order::parser::{classify_action, classify_variant};
use board_types::{ActionKind, OrderLine, VariantTone};
use serde::Serialize;

/// A parsed line with its display categories.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LineView {
	#[serde(flatten)]
	pub line: OrderLine,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub variant_tone: Option<VariantTone>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub action_kind: Option<ActionKind>,
}

impl From<OrderLine> for LineView {
	fn from(line: OrderLine) -> Self {
		let (variant_tone, action_kind) = match line.as_item() {
			Some(item) => (
				item.variant.as_deref().map(classify_variant),
				item.conditional_action.as_deref().map(classify_action),
			),
			None => (None, None),
		};
		Self {
			line,
			variant_tone,
			action_kind,
		}
	}
}

pub fn parse(line: &str) -> LineView {
	board_order::parse_line(line).into()
}

/// Parses every line of an order's `items` string.
pub fn parse_all(items: &str) -> Vec<LineView> {
	board_order::parse_items(items)
		.into_iter()
		.map(LineView::from)
		.collect()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_categories_follow_annotations() {
		let view = parse("1x Iced Latte [Cold] {If N/A: Call customer}");
		assert_eq!(view.variant_tone, Some(VariantTone::Cold));
		assert_eq!(view.action_kind, Some(ActionKind::Call));

		let raw = parse("Note: leave at gate");
		assert_eq!(raw.variant_tone, None);
		assert_eq!(raw.action_kind, None);
	}

	#[test]
	fn test_parse_all_skips_blank_lines() {
		let views = parse_all("1x Mocha\r\n\r\n2x Ensaymada\n");
		assert_eq!(views.len(), 2);
		assert!(views.iter().all(|v| v.line.as_item().is_some()));
	}
}
