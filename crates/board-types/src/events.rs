//! Event types published on the board event bus.
//!
//! Events let the terminal view, the HTTP layer and the logs follow what the
//! board is doing without polling its state.

use serde::{Deserialize, Serialize};

use crate::session::View;

/// Main event type encompassing all board events.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum BoardEvent {
	/// Events from order list refreshes.
	Fetch(FetchEvent),
	/// Events from status changes.
	Status(StatusEvent),
	/// Events from the staff session.
	Session(SessionEvent),
}

/// Events related to refreshing the order list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum FetchEvent {
	/// The order list was replaced.
	Refreshed { count: usize, background: bool },
	/// The order source failed; `banner` is shown when orders are on screen.
	Failed {
		error: String,
		banner: Option<String>,
	},
	/// A result was dropped because a status change is in flight.
	Discarded { reason: String },
}

/// Events related to order status changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum StatusEvent {
	/// The local copy was patched before the write completed.
	Applied {
		order_id: String,
		status: String,
		user: String,
	},
	/// The write request was handed to the order source.
	Dispatched { order_id: String, status: String },
	/// The write could not be sent.
	SyncFailed { order_id: String, error: String },
	/// The post-write refresh completed and the order is no longer busy.
	Reconciled { order_id: String },
}

/// Events related to the staff session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SessionEvent {
	Started { staff: String, role: String },
	ViewChanged { view: View },
	Ended { staff: String },
}
