//! Terminal view of the board, redrawn on every board event.

use board_core::{BoardEngine, BoardSnapshot};
use board_order::display::{kitchen_note, target_label, target_time};
use board_order::{available_actions, parse_items, visible_orders};
use board_types::{short_code, BoardEvent, OrderLine, StaffProfile, StatusEvent, View};
use std::fmt::Write as _;
use std::io::Write as _;
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;

const CLEAR: &str = "\x1b[2J\x1b[H";

/// Redraws the board until the event bus closes.
pub async fn watch(engine: Arc<BoardEngine>) -> Result<(), Box<dyn std::error::Error>> {
	let mut events = engine.event_bus().subscribe();
	let mut alert: Option<String> = None;

	loop {
		let snapshot = engine.board().snapshot().await;
		let view = engine.session().view().await;
		let frame = render(&snapshot, engine.session().staff(), view, alert.as_deref());
		{
			let mut stdout = std::io::stdout().lock();
			write!(stdout, "{}{}", CLEAR, frame)?;
			stdout.flush()?;
		}

		match events.recv().await {
			Ok(BoardEvent::Status(StatusEvent::SyncFailed { order_id, .. })) => {
				alert = Some(format!(
					"Failed to sync status for #{}. Check your connection.",
					short_code(&order_id)
				));
			},
			Ok(BoardEvent::Status(StatusEvent::Applied { .. })) => alert = None,
			Ok(_) | Err(RecvError::Lagged(_)) => {},
			Err(RecvError::Closed) => return Ok(()),
		}
	}
}

/// Renders one frame of the board.
pub fn render(
	snapshot: &BoardSnapshot,
	staff: &StaffProfile,
	view: View,
	alert: Option<&str>,
) -> String {
	let caps = staff.capabilities();
	let mut out = String::new();
	let _ = writeln!(out, "Barista Board | {} ({}) | {}", staff.name, staff.role, view);

	if let Some(alert) = alert {
		let _ = writeln!(out, "!! {}", alert);
	}
	if let Some(error) = &snapshot.error {
		let _ = writeln!(out, "[{}]", error);
	}
	if view != View::Orders {
		let _ = writeln!(out, "\n{} view is managed elsewhere.", view);
		return out;
	}
	if snapshot.loading {
		let _ = writeln!(out, "\nLoading orders...");
		return out;
	}
	if snapshot.refreshing {
		let _ = writeln!(out, "Refreshing...");
	}

	let orders = visible_orders(&caps, &snapshot.orders);
	if orders.is_empty() {
		let _ = writeln!(out, "\nNo active orders.");
		return out;
	}

	for order in orders {
		let status = order.status();
		let _ = writeln!(
			out,
			"\n#{}  {}  {}  {} {}",
			order.short_code(),
			status,
			order.name,
			target_label(&order.mode),
			target_time(&order.time)
		);
		for line in parse_items(&order.items) {
			let _ = writeln!(out, "    {}", format_line(&line));
		}
		if let Some(note) = kitchen_note(&caps, &status) {
			let _ = writeln!(out, "    ({})", note);
		}

		let buttons: Vec<String> = available_actions(&caps, order, snapshot.updating.as_deref())
			.into_iter()
			.map(|b| {
				if b.enabled {
					format!("[{}]", b.label)
				} else {
					format!("({})", b.label)
				}
			})
			.collect();
		if !buttons.is_empty() {
			let _ = writeln!(out, "    {}", buttons.join(" "));
		}
	}
	out
}

fn format_line(line: &OrderLine) -> String {
	let item = match line {
		OrderLine::Item(item) => item,
		OrderLine::Raw { raw } => return raw.clone(),
	};
	let mut text = format!("{}x {}", item.quantity, item.name);
	if let Some(variant) = &item.variant {
		let _ = write!(text, " [{}]", variant);
	}
	if !item.addons.is_empty() {
		let _ = write!(text, " (+ {})", item.addons.join(", "));
	}
	if let Some(action) = &item.conditional_action {
		let _ = write!(text, "  If N/A: {}", action);
	}
	text
}
