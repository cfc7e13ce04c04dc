//! Background refresh of the order list.
//!
//! The poller is an explicit subscription: `start` spawns a loop that does
//! one foreground fetch and then a background fetch every interval, `stop`
//! signals the loop and waits for it to exit. Ticks that fall while the
//! board is hidden are skipped rather than queued.

use crate::board::OrderBoard;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

/// Reports whether the board is currently on screen.
pub trait VisibilityProbe: Send + Sync {
	fn is_visible(&self) -> bool;
}

/// Probe for headless boards, which are always considered visible.
pub struct AlwaysVisible;

impl VisibilityProbe for AlwaysVisible {
	fn is_visible(&self) -> bool {
		true
	}
}

/// Probe whose answer is set from outside, e.g. by a display client.
pub struct VisibilityFlag(AtomicBool);

impl VisibilityFlag {
	pub fn new(visible: bool) -> Self {
		Self(AtomicBool::new(visible))
	}

	pub fn set_visible(&self, visible: bool) {
		self.0.store(visible, Ordering::SeqCst);
	}
}

impl VisibilityProbe for VisibilityFlag {
	fn is_visible(&self) -> bool {
		self.0.load(Ordering::SeqCst)
	}
}

/// Periodic order refresh bound to one board.
pub struct Poller {
	board: Arc<OrderBoard>,
	interval: Duration,
	visibility: Arc<dyn VisibilityProbe>,
	stop_signal: Mutex<Option<mpsc::Sender<()>>>,
	handle: Mutex<Option<JoinHandle<()>>>,
	is_running: AtomicBool,
}

impl Poller {
	pub fn new(
		board: Arc<OrderBoard>,
		interval: Duration,
		visibility: Arc<dyn VisibilityProbe>,
	) -> Self {
		Self {
			board,
			interval,
			visibility,
			stop_signal: Mutex::new(None),
			handle: Mutex::new(None),
			is_running: AtomicBool::new(false),
		}
	}

	pub fn is_running(&self) -> bool {
		self.is_running.load(Ordering::SeqCst)
	}

	pub fn interval(&self) -> Duration {
		self.interval
	}

	/// Starts polling, replacing a poller that is already running.
	pub async fn start(&self) {
		self.stop().await;

		let (stop_tx, mut stop_rx) = mpsc::channel::<()>(1);
		*self.stop_signal.lock().await = Some(stop_tx);
		self.is_running.store(true, Ordering::SeqCst);

		let board = Arc::clone(&self.board);
		let visibility = Arc::clone(&self.visibility);
		let period = self.interval;

		let handle = tokio::spawn(async move {
			board.fetch_orders(false).await;

			let mut interval = tokio::time::interval_at(Instant::now() + period, period);
			interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

			loop {
				tokio::select! {
					_ = interval.tick() => {
						if !visibility.is_visible() {
							tracing::trace!("Board hidden, skipping refresh");
							continue;
						}
						board.fetch_orders(true).await;
					}
					_ = stop_rx.recv() => {
						tracing::debug!("Stopping order poller");
						break;
					}
				}
			}
		});
		*self.handle.lock().await = Some(handle);

		tracing::info!(
			interval_ms = period.as_millis() as u64,
			"Started order poller"
		);
	}

	/// Stops polling and waits for the loop to exit. A no-op when stopped.
	pub async fn stop(&self) {
		if let Some(stop_tx) = self.stop_signal.lock().await.take() {
			let _ = stop_tx.send(()).await;
		}
		if let Some(handle) = self.handle.lock().await.take() {
			if let Err(e) = handle.await {
				tracing::warn!(error = %e, "Order poller exited abnormally");
			}
		}
		self.is_running.store(false, Ordering::SeqCst);
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use crate::event_bus::EventBus;
	use board_source::implementations::memory::MemoryOrderSource;
	use board_source::OrderSourceService;
	use board_types::Order;

	fn setup(visibility: Arc<dyn VisibilityProbe>) -> (MemoryOrderSource, Poller) {
		let source = MemoryOrderSource::new(vec![Order {
			order_id: "A1".into(),
			status: "Placed".into(),
			..Order::default()
		}]);
		let service = Arc::new(OrderSourceService::new("memory", Box::new(source.clone())));
		let board = Arc::new(OrderBoard::new(
			service,
			Duration::from_secs(2),
			EventBus::new(16),
		));
		let poller = Poller::new(board, Duration::from_secs(3), visibility);
		(source, poller)
	}

	#[tokio::test(start_paused = true)]
	async fn test_polls_every_interval() {
		let (source, poller) = setup(Arc::new(AlwaysVisible));
		poller.start().await;
		tokio::time::sleep(Duration::from_millis(100)).await;
		assert_eq!(source.fetch_count(), 1);

		tokio::time::sleep(Duration::from_secs(3)).await;
		assert_eq!(source.fetch_count(), 2);
		tokio::time::sleep(Duration::from_secs(6)).await;
		assert_eq!(source.fetch_count(), 4);

		poller.stop().await;
		assert!(!poller.is_running());
		tokio::time::sleep(Duration::from_secs(30)).await;
		assert_eq!(source.fetch_count(), 4);
	}

	#[tokio::test(start_paused = true)]
	async fn test_hidden_board_skips_ticks() {
		let flag = Arc::new(VisibilityFlag::new(true));
		let (source, poller) = setup(flag.clone());
		poller.start().await;
		tokio::time::sleep(Duration::from_millis(100)).await;

		flag.set_visible(false);
		tokio::time::sleep(Duration::from_secs(9)).await;
		assert_eq!(source.fetch_count(), 1);

		flag.set_visible(true);
		tokio::time::sleep(Duration::from_secs(3)).await;
		assert_eq!(source.fetch_count(), 2);
		poller.stop().await;
	}

	#[tokio::test(start_paused = true)]
	async fn test_restart_replaces_running_poller() {
		let (source, poller) = setup(Arc::new(AlwaysVisible));
		poller.start().await;
		tokio::time::sleep(Duration::from_millis(100)).await;
		poller.start().await;
		tokio::time::sleep(Duration::from_millis(100)).await;
		assert!(poller.is_running());
		assert_eq!(source.fetch_count(), 2);

		// A single loop remains: one fetch per interval.
		tokio::time::sleep(Duration::from_secs(3)).await;
		assert_eq!(source.fetch_count(), 3);
		poller.stop().await;
	}
}
