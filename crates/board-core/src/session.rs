//! Staff session: who is acting on the board and what they are looking at.
//!
//! The session drives the poller from the current view and is the only
//! place that turns a button press into a status change, so every action
//! passes the role and transition checks before reaching the board.

use crate::board::{BoardError, FetchOutcome, OrderBoard};
use crate::event_bus::EventBus;
use crate::poller::Poller;
use board_order::{visible_orders, ActionError, StatusAction};
use board_types::{
	short_code, BoardEvent, Capabilities, Order, OrderStatus, SessionEvent, StaffProfile, View,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::instrument;

/// Errors returned by session operations.
#[derive(Debug, Error)]
pub enum SessionError {
	#[error("View '{0}' is only available to owners and admins")]
	Forbidden(View),
	#[error(transparent)]
	Action(#[from] ActionError),
	#[error("Order not found: {0}")]
	NotFound(String),
	#[error("Order {0} is already being updated")]
	Busy(String),
	#[error("Status change failed: {0}")]
	Dispatch(String),
}

/// Result of applying an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
	/// The status change was sent; carries the new status.
	Applied(OrderStatus),
	/// The order already had the action's status; nothing was sent.
	NoOp,
}

pub struct Session {
	board: Arc<OrderBoard>,
	poller: Poller,
	staff: StaffProfile,
	view: RwLock<View>,
	active: AtomicBool,
	event_bus: EventBus,
}

impl Session {
	pub fn new(
		board: Arc<OrderBoard>,
		poller: Poller,
		staff: StaffProfile,
		event_bus: EventBus,
	) -> Self {
		Self {
			board,
			poller,
			staff,
			view: RwLock::new(View::Orders),
			active: AtomicBool::new(false),
			event_bus,
		}
	}

	pub fn staff(&self) -> &StaffProfile {
		&self.staff
	}

	pub fn capabilities(&self) -> Capabilities {
		self.staff.capabilities()
	}

	pub fn board(&self) -> &Arc<OrderBoard> {
		&self.board
	}

	pub fn poller(&self) -> &Poller {
		&self.poller
	}

	pub async fn view(&self) -> View {
		*self.view.read().await
	}

	pub fn is_active(&self) -> bool {
		self.active.load(Ordering::SeqCst)
	}

	/// Starts the session; polling begins if the orders view is open.
	#[instrument(skip_all, fields(staff = %self.staff.name))]
	pub async fn enter(&self) {
		self.active.store(true, Ordering::SeqCst);
		tracing::info!(role = %self.staff.role, "Session started");
		let _ = self.event_bus.publish(BoardEvent::Session(SessionEvent::Started {
			staff: self.staff.name.clone(),
			role: self.staff.role.clone(),
		}));

		if self.view().await == View::Orders {
			self.poller.start().await;
		}
	}

	/// Switches views. Only owners and admins may leave the orders view.
	#[instrument(skip_all, fields(staff = %self.staff.name, view = %view))]
	pub async fn set_view(&self, view: View) -> Result<(), SessionError> {
		if view != View::Orders && !self.capabilities().is_owner_admin {
			return Err(SessionError::Forbidden(view));
		}

		let previous = std::mem::replace(&mut *self.view.write().await, view);
		if previous == view {
			return Ok(());
		}
		let _ = self
			.event_bus
			.publish(BoardEvent::Session(SessionEvent::ViewChanged { view }));

		if !self.is_active() {
			return Ok(());
		}
		if view == View::Orders {
			self.poller.start().await;
		} else {
			self.poller.stop().await;
		}
		Ok(())
	}

	/// Ends the session and stops polling.
	#[instrument(skip_all, fields(staff = %self.staff.name))]
	pub async fn end(&self) {
		self.active.store(false, Ordering::SeqCst);
		self.poller.stop().await;
		let _ = self.event_bus.publish(BoardEvent::Session(SessionEvent::Ended {
			staff: self.staff.name.clone(),
		}));
		tracing::info!("Session ended");
	}

	/// Manual refresh. Does nothing outside the orders view.
	pub async fn refresh(&self) -> FetchOutcome {
		if self.view().await != View::Orders {
			return FetchOutcome::Skipped;
		}
		self.board.fetch_orders(false).await
	}

	/// Applies `action` to an order on behalf of the session's staff member.
	#[instrument(skip_all, fields(staff = %self.staff.name, order_id = %short_code(order_id), action = %action))]
	pub async fn apply_action(
		&self,
		order_id: &str,
		action: StatusAction,
	) -> Result<ActionOutcome, SessionError> {
		let caps = self.capabilities();
		if !action.is_permitted(&caps) {
			return Err(ActionError::Forbidden(action).into());
		}

		let snapshot = self.board.snapshot().await;
		if snapshot.updating.as_deref() == Some(order_id) {
			return Err(SessionError::Busy(order_id.to_string()));
		}
		let order = snapshot
			.orders
			.iter()
			.find(|o| o.order_id == order_id)
			.ok_or_else(|| SessionError::NotFound(order_id.to_string()))?;

		let target = match action.check(&caps, &order.status()) {
			Ok(target) => target,
			Err(ActionError::AlreadyApplied(_)) => {
				tracing::debug!("Action already applied");
				return Ok(ActionOutcome::NoOp);
			},
			Err(e) => return Err(e.into()),
		};

		self.board
			.update_status(order_id, target.label(), &self.staff.name)
			.await
			.map_err(|e| match e {
				BoardError::NotFound(id) => SessionError::NotFound(id),
				BoardError::Dispatch(msg) => SessionError::Dispatch(msg),
			})?;
		Ok(ActionOutcome::Applied(target))
	}

	/// Active orders this staff member sees, newest first.
	pub async fn visible_orders(&self) -> Vec<Order> {
		let snapshot = self.board.snapshot().await;
		visible_orders(&self.capabilities(), &snapshot.orders)
			.into_iter()
			.cloned()
			.collect()
	}
}
