//! Order board API implementation.
//!
//! Turns board snapshots into card views for the acting staff member and
//! maps workflow errors onto HTTP errors.

use board_core::{ActionOutcome, BoardEngine, FetchOutcome, SessionError};
use board_order::display::{
	can_message_customer, format_time, kitchen_note, maps_url, mode_category, shows_address,
	status_category, target_label, target_time, ModeCategory, StatusCategory,
};
use board_order::{available_actions, history, ActionButton, ActionError, StatusAction};
use board_types::{ApiError, Capabilities, Order};
use serde::Serialize;

use super::lines::{parse_all, LineView};

/// Board state as shown to the acting staff member.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardResponse {
	pub loading: bool,
	pub refreshing: bool,
	pub error: Option<String>,
	pub updating: Option<String>,
	pub orders: Vec<OrderView>,
}

/// Rider drop-off details.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AddressView {
	pub address: String,
	pub landmark: String,
	pub maps_url: String,
}

/// One order card.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
	pub order_id: String,
	pub short_code: String,
	pub status: String,
	pub status_category: StatusCategory,
	pub name: String,
	pub mode: String,
	pub mode_category: ModeCategory,
	pub target_label: String,
	pub target_time: String,
	pub placed_at: String,
	pub total: String,
	pub payment: String,
	pub lines: Vec<LineView>,
	pub actions: Vec<ActionButton>,
	pub can_message_customer: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub kitchen_note: Option<String>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub drop_off: Option<AddressView>,
}

impl OrderView {
	pub fn build(order: &Order, caps: &Capabilities, updating: Option<&str>) -> Self {
		let status = order.status();
		let drop_off = shows_address(caps, order).then(|| AddressView {
			address: order.address.clone(),
			landmark: order.landmark.clone(),
			maps_url: maps_url(&order.address),
		});

		Self {
			order_id: order.order_id.clone(),
			short_code: order.short_code(),
			status: order.status.clone(),
			status_category: status_category(&status),
			name: order.name.clone(),
			mode: order.mode.clone(),
			mode_category: mode_category(&order.mode),
			target_label: target_label(&order.mode).to_string(),
			target_time: target_time(&order.time).to_string(),
			placed_at: format_time(&order.timestamp),
			total: order.total.clone(),
			payment: order.payment.clone(),
			lines: parse_all(&order.items),
			actions: available_actions(caps, order, updating),
			can_message_customer: can_message_customer(caps, &status),
			kitchen_note: kitchen_note(caps, &status).map(str::to_string),
			drop_off,
		}
	}
}

/// Response to an accepted action.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionResponse {
	pub order_id: String,
	pub action: StatusAction,
	/// Status written, absent when the action was already applied.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub status: Option<String>,
}

/// Active orders visible to the session's staff member.
pub async fn board_view(engine: &BoardEngine) -> BoardResponse {
	let session = engine.session();
	let caps = session.capabilities();
	let snapshot = engine.board().snapshot().await;
	let updating = snapshot.updating.as_deref();

	let orders = board_order::visible_orders(&caps, &snapshot.orders)
		.into_iter()
		.map(|order| OrderView::build(order, &caps, updating))
		.collect();

	BoardResponse {
		loading: snapshot.loading,
		refreshing: snapshot.refreshing,
		error: snapshot.error.clone(),
		updating: snapshot.updating.clone(),
		orders,
	}
}

/// Delivered and cancelled orders matching `query`, newest first.
pub async fn history_view(engine: &BoardEngine, query: &str) -> Vec<OrderView> {
	let caps = engine.session().capabilities();
	let snapshot = engine.board().snapshot().await;
	history(&snapshot.orders, query)
		.into_iter()
		.map(|order| OrderView::build(order, &caps, None))
		.collect()
}

/// Manual refresh.
pub async fn refresh(engine: &BoardEngine) -> Result<(), ApiError> {
	match engine.session().refresh().await {
		FetchOutcome::Skipped | FetchOutcome::Discarded => Err(ApiError::conflict(
			"UPDATE_IN_FLIGHT",
			"A status change is in flight; the board refreshes once it settles",
		)),
		FetchOutcome::Failed => Err(ApiError::ServiceUnavailable {
			error_type: "SOURCE_UNAVAILABLE".to_string(),
			message: "Could not reach the order source".to_string(),
		}),
		FetchOutcome::Refreshed(_) | FetchOutcome::Unchanged => Ok(()),
	}
}

/// Applies an action named by its slug, e.g. "confirm-pickup".
pub async fn apply_action(
	engine: &BoardEngine,
	order_id: &str,
	slug: &str,
) -> Result<ActionResponse, ApiError> {
	let action: StatusAction = slug.parse().map_err(action_error)?;
	let outcome = engine
		.session()
		.apply_action(order_id, action)
		.await
		.map_err(session_error)?;

	Ok(ActionResponse {
		order_id: order_id.to_string(),
		action,
		status: match outcome {
			ActionOutcome::Applied(status) => Some(status.label().to_string()),
			ActionOutcome::NoOp => None,
		},
	})
}

fn action_error(e: ActionError) -> ApiError {
	match e {
		ActionError::Unknown(_) => ApiError::not_found("UNKNOWN_ACTION", e.to_string()),
		ActionError::Forbidden(_) => ApiError::forbidden(e.to_string()),
		ActionError::NotAvailable { .. } | ActionError::AlreadyApplied(_) => {
			ApiError::conflict("INVALID_TRANSITION", e.to_string())
		},
	}
}

pub(crate) fn session_error(e: SessionError) -> ApiError {
	match e {
		SessionError::Forbidden(_) => ApiError::forbidden(e.to_string()),
		SessionError::Action(inner) => action_error(inner),
		SessionError::NotFound(_) => ApiError::not_found("ORDER_NOT_FOUND", e.to_string()),
		SessionError::Busy(_) => ApiError::conflict("ORDER_BUSY", e.to_string()),
		SessionError::Dispatch(_) => ApiError::ServiceUnavailable {
			error_type: "SYNC_FAILED".to_string(),
			message: e.to_string(),
		},
	}
}
