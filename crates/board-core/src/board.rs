//! The live order list and the workflow that changes it.
//!
//! The list only changes in two ways: a fetch replaces it wholesale, or a
//! status change patches one order in place. Status changes are optimistic.
//! The local copy is patched first, the write is sent without waiting for
//! the source to confirm, and a reconciliation fetch after a short delay
//! brings the list back in line with whatever the source actually stored.
//!
//! While a status change is in flight it owns a single slot, tagged with a
//! generation number. Ordinary fetches are skipped while the slot is held,
//! and an ordinary fetch result is dropped if any status change was claimed
//! after the fetch started, even one that has already been reconciled. A slow
//! poll therefore never paints pre-change data over an optimistic change or
//! over the reconciled list that followed it. A newer status change takes the slot over;
//! the older cycle's reconciliation then finds itself superseded and stands
//! down, leaving the newest cycle to reconcile.

use crate::event_bus::EventBus;
use board_source::OrderSourceService;
use board_types::{short_code, BoardEvent, FetchEvent, Order, StatusEvent, StatusUpdate};
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{instrument, Instrument};

/// Banner shown when a refresh fails while orders are on screen.
pub const CONNECTION_BANNER: &str = "Connection Issue. Retrying...";

/// Errors returned by board operations.
#[derive(Debug, Error)]
pub enum BoardError {
	#[error("Order not found: {0}")]
	NotFound(String),
	/// The status write could not be handed to the source.
	#[error("Status write failed: {0}")]
	Dispatch(String),
}

/// What a fetch attempt did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
	/// Not attempted because a status change is in flight.
	Skipped,
	/// Fetched, but a status change started meanwhile and the result was dropped.
	Discarded,
	/// The list was replaced; carries the new order count.
	Refreshed(usize),
	/// The source answered without an order list.
	Unchanged,
	Failed,
}

/// Point-in-time copy of the board state.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardSnapshot {
	/// Orders, newest first.
	pub orders: Vec<Order>,
	/// A foreground fetch is running and nothing has been loaded yet.
	pub loading: bool,
	/// A foreground fetch is running over an already loaded list.
	pub refreshing: bool,
	pub error: Option<String>,
	/// Order whose status change is in flight.
	pub updating: Option<String>,
}

struct InFlight {
	generation: u64,
	order_id: String,
}

/// Who a fetch result is for.
#[derive(Debug, Clone, Copy)]
enum FetchGuard {
	/// Ordinary fetch started at a generation; applies only while no status
	/// change is in flight and none was claimed since.
	Free(u64),
	/// Reconciliation for a generation; applies only while it owns the slot.
	Reconcile(u64),
}

/// Order list shared by the poller, the session and the HTTP layer.
pub struct OrderBoard {
	source: Arc<OrderSourceService>,
	state: RwLock<BoardSnapshot>,
	// Always locked after `state`, never held across an await.
	in_flight: Mutex<Option<InFlight>>,
	generation: AtomicU64,
	reconcile_delay: Duration,
	event_bus: EventBus,
}

impl OrderBoard {
	pub fn new(
		source: Arc<OrderSourceService>,
		reconcile_delay: Duration,
		event_bus: EventBus,
	) -> Self {
		Self {
			source,
			state: RwLock::new(BoardSnapshot::default()),
			in_flight: Mutex::new(None),
			generation: AtomicU64::new(0),
			reconcile_delay,
			event_bus,
		}
	}

	pub async fn snapshot(&self) -> BoardSnapshot {
		self.state.read().await.clone()
	}

	/// Whether a status change currently owns the in-flight slot.
	pub fn is_updating(&self) -> bool {
		self.slot().is_some()
	}

	pub fn updating_order(&self) -> Option<String> {
		self.slot().as_ref().map(|f| f.order_id.clone())
	}

	pub fn reconcile_delay(&self) -> Duration {
		self.reconcile_delay
	}

	/// Name of the configured order source.
	pub fn source_name(&self) -> &str {
		self.source.name()
	}

	fn slot(&self) -> MutexGuard<'_, Option<InFlight>> {
		self.in_flight
			.lock()
			.unwrap_or_else(|poisoned| poisoned.into_inner())
	}

	fn guard_holds(&self, guard: FetchGuard) -> bool {
		let slot = self.slot();
		match guard {
			FetchGuard::Free(started_at) => {
				slot.is_none() && self.generation.load(Ordering::SeqCst) == started_at
			},
			FetchGuard::Reconcile(generation) => {
				slot.as_ref().is_some_and(|f| f.generation == generation)
			},
		}
	}

	fn publish(&self, event: BoardEvent) {
		// No subscribers is fine.
		let _ = self.event_bus.publish(event);
	}

	/// Refreshes the order list from the source.
	///
	/// A foreground fetch raises `loading` (nothing loaded yet) or
	/// `refreshing` (orders on screen) until it completes. Skipped while a
	/// status change is in flight.
	#[instrument(skip(self))]
	pub async fn fetch_orders(&self, background: bool) -> FetchOutcome {
		// Read before the slot check so a claim in between is caught by one or the other.
		let started_at = self.generation.load(Ordering::SeqCst);
		if self.is_updating() {
			tracing::debug!("Skipping fetch while a status change is in flight");
			return FetchOutcome::Skipped;
		}
		self.fetch_guarded(background, FetchGuard::Free(started_at)).await
	}

	async fn fetch_guarded(&self, background: bool, guard: FetchGuard) -> FetchOutcome {
		if !background {
			let mut state = self.state.write().await;
			if state.orders.is_empty() {
				state.loading = true;
			} else {
				state.refreshing = true;
			}
		}

		let result = self.source.fetch_orders().await;

		let mut state = self.state.write().await;
		if !background {
			state.loading = false;
			state.refreshing = false;
		}

		if !self.guard_holds(guard) {
			tracing::debug!("Dropping fetch result, a status change was claimed meanwhile");
			self.publish(BoardEvent::Fetch(FetchEvent::Discarded {
				reason: "status change in flight".into(),
			}));
			return FetchOutcome::Discarded;
		}

		match result {
			Ok(Some(mut orders)) => {
				orders.reverse();
				let count = orders.len();
				state.orders = orders;
				state.error = None;
				self.publish(BoardEvent::Fetch(FetchEvent::Refreshed { count, background }));
				FetchOutcome::Refreshed(count)
			},
			Ok(None) => FetchOutcome::Unchanged,
			Err(e) => {
				// Before the first successful load there is nothing to warn over.
				let banner = (!state.orders.is_empty()).then(|| CONNECTION_BANNER.to_string());
				if banner.is_some() {
					state.error = banner.clone();
				}
				self.publish(BoardEvent::Fetch(FetchEvent::Failed {
					error: e.to_string(),
					banner,
				}));
				FetchOutcome::Failed
			},
		}
	}

	/// Changes an order's status.
	///
	/// Patches the local copy, sends the write and schedules a
	/// reconciliation fetch after the reconcile delay. Returns once the write
	/// has been handed to the source. If it cannot be sent, a `SyncFailed`
	/// event is published, the slot is released and the list is refetched in
	/// the background right away; the local patch is not rolled back by hand.
	#[instrument(skip_all, fields(order_id = %short_code(order_id), status = %status))]
	pub async fn update_status(
		self: &Arc<Self>,
		order_id: &str,
		status: &str,
		user: &str,
	) -> Result<(), BoardError> {
		let generation = self.claim(order_id, status).await?;
		self.publish(BoardEvent::Status(StatusEvent::Applied {
			order_id: order_id.to_string(),
			status: status.to_string(),
			user: user.to_string(),
		}));

		let update = StatusUpdate {
			order_id: order_id.to_string(),
			status: status.to_string(),
			user: user.to_string(),
		};

		match self.source.submit_status(&update).await {
			Ok(()) => {
				self.publish(BoardEvent::Status(StatusEvent::Dispatched {
					order_id: update.order_id,
					status: update.status,
				}));
				let board = Arc::clone(self);
				tokio::spawn(
					async move {
						tokio::time::sleep(board.reconcile_delay).await;
						board.reconcile(generation).await;
					}
					.in_current_span(),
				);
				Ok(())
			},
			Err(e) => {
				tracing::error!(error = %e, "Status change was not saved");
				self.publish(BoardEvent::Status(StatusEvent::SyncFailed {
					order_id: update.order_id,
					error: e.to_string(),
				}));
				self.release(generation).await;
				self.fetch_orders(true).await;
				Err(BoardError::Dispatch(e.to_string()))
			},
		}
	}

	/// Takes the in-flight slot for `order_id` and patches its status.
	async fn claim(&self, order_id: &str, status: &str) -> Result<u64, BoardError> {
		let mut state = self.state.write().await;
		let order = state
			.orders
			.iter_mut()
			.find(|o| o.order_id == order_id)
			.ok_or_else(|| BoardError::NotFound(order_id.to_string()))?;
		order.status = status.to_string();

		let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
		let superseded = self.slot().replace(InFlight {
			generation,
			order_id: order_id.to_string(),
		});
		if let Some(previous) = superseded {
			tracing::debug!(
				previous = %short_code(&previous.order_id),
				"Superseding in-flight status change"
			);
		}
		state.updating = Some(order_id.to_string());
		Ok(generation)
	}

	/// Frees the slot if `generation` still owns it.
	///
	/// Returns the order id the slot was held for.
	async fn release(&self, generation: u64) -> Option<String> {
		let mut state = self.state.write().await;
		let mut slot = self.slot();
		if !slot.as_ref().is_some_and(|f| f.generation == generation) {
			return None;
		}
		state.updating = None;
		slot.take().map(|f| f.order_id)
	}

	async fn reconcile(&self, generation: u64) {
		if !self.guard_holds(FetchGuard::Reconcile(generation)) {
			tracing::debug!(generation, "Reconciliation superseded by a newer status change");
			return;
		}

		let outcome = self
			.fetch_guarded(true, FetchGuard::Reconcile(generation))
			.await;
		if let Some(order_id) = self.release(generation).await {
			tracing::debug!(?outcome, "Reconciled");
			self.publish(BoardEvent::Status(StatusEvent::Reconciled { order_id }));
		}
	}
}
