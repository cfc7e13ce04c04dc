//! Board engine: runs a staff session until the process is interrupted.
//!
//! The engine owns the board, the session and the event bus. `run` enters
//! the session, which starts polling, then logs board events until Ctrl-C.

use crate::board::OrderBoard;
use crate::event_bus::EventBus;
use crate::session::Session;
use board_config::Config;
use board_types::{short_code, BoardEvent, FetchEvent, SessionEvent, StatusEvent};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::broadcast::error::RecvError;

pub mod lifecycle;

/// Errors that can occur while running the engine.
#[derive(Debug, Error)]
pub enum EngineError {
	#[error("Engine is already running")]
	AlreadyRunning,
	#[error("Service error: {0}")]
	Service(String),
}

pub struct BoardEngine {
	config: Config,
	board: Arc<OrderBoard>,
	session: Arc<Session>,
	event_bus: EventBus,
}

impl BoardEngine {
	pub fn new(
		config: Config,
		board: Arc<OrderBoard>,
		session: Arc<Session>,
		event_bus: EventBus,
	) -> Self {
		Self {
			config,
			board,
			session,
			event_bus,
		}
	}

	pub fn config(&self) -> &Config {
		&self.config
	}

	pub fn board(&self) -> &Arc<OrderBoard> {
		&self.board
	}

	pub fn session(&self) -> &Arc<Session> {
		&self.session
	}

	pub fn event_bus(&self) -> &EventBus {
		&self.event_bus
	}

	/// Runs until Ctrl-C, then ends the session.
	pub async fn run(&self) -> Result<(), EngineError> {
		let mut events = self.event_bus.subscribe();
		self.initialize().await?;

		loop {
			tokio::select! {
				event = events.recv() => match event {
					Ok(event) => log_event(&event),
					Err(RecvError::Lagged(skipped)) => {
						tracing::warn!(skipped, "Event log fell behind");
					}
					Err(RecvError::Closed) => break,
				},
				signal = tokio::signal::ctrl_c() => {
					if let Err(e) = signal {
						self.shutdown().await;
						return Err(EngineError::Service(format!(
							"Failed to listen for Ctrl-C: {}",
							e
						)));
					}
					break;
				}
			}
		}

		self.shutdown().await;
		Ok(())
	}
}

/// Logs one board event at a level matching its importance.
pub fn log_event(event: &BoardEvent) {
	match event {
		BoardEvent::Fetch(FetchEvent::Refreshed { count, background }) => {
			tracing::debug!(count, background, "Orders refreshed");
		},
		BoardEvent::Fetch(FetchEvent::Failed { error, banner }) => {
			tracing::warn!(error = %error, banner = banner.is_some(), "Order refresh failed");
		},
		BoardEvent::Fetch(FetchEvent::Discarded { reason }) => {
			tracing::debug!(reason = %reason, "Refresh result discarded");
		},
		BoardEvent::Status(StatusEvent::Applied {
			order_id,
			status,
			user,
		}) => {
			tracing::info!(order_id = %short_code(order_id), status = %status, user = %user, "Status changed");
		},
		BoardEvent::Status(StatusEvent::Dispatched { order_id, .. }) => {
			tracing::debug!(order_id = %short_code(order_id), "Status write sent");
		},
		BoardEvent::Status(StatusEvent::SyncFailed { order_id, error }) => {
			tracing::error!(
				order_id = %short_code(order_id),
				error = %error,
				"Failed to sync status, check your connection"
			);
		},
		BoardEvent::Status(StatusEvent::Reconciled { order_id }) => {
			tracing::debug!(order_id = %short_code(order_id), "Status reconciled");
		},
		BoardEvent::Session(SessionEvent::ViewChanged { view }) => {
			tracing::info!(view = %view, "View changed");
		},
		BoardEvent::Session(_) => {},
	}
}

#[cfg(test)]
mod tests {
	use super::EngineError;
	use crate::builder::{BoardBuilder, BoardFactories};
	use board_source::implementations::memory::create_source;
	use board_source::{OrderSourceInterface, SourceError};
	use std::collections::HashMap;
	use std::time::Duration;

	type Factory = fn(&toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError>;

	#[tokio::test(start_paused = true)]
	async fn test_shutdown_ends_session() {
		let config = r#"
[board]
id = "kiosk-1"

[source]
primary = "memory"
[source.implementations.memory]

[[staff]]
name = "Ana"
role = "owner"

[session]
staff = "Ana"
"#
		.parse()
		.unwrap();
		let mut source_factories = HashMap::new();
		source_factories.insert("memory".to_string(), create_source as Factory);
		let engine = BoardBuilder::new(config)
			.build(BoardFactories { source_factories })
			.unwrap();

		engine.initialize().await.unwrap();
		tokio::time::sleep(Duration::from_millis(10)).await;
		assert!(engine.session().is_active());
		assert!(engine.session().poller().is_running());
		assert!(matches!(
			engine.initialize().await,
			Err(EngineError::AlreadyRunning)
		));

		engine.shutdown().await;
		assert!(!engine.session().is_active());
		assert!(!engine.session().poller().is_running());
	}
}
