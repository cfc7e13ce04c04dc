//! Lifecycle management for the board engine.

use super::BoardEngine;

impl BoardEngine {
	/// Enters the staff session, which starts polling.
	pub async fn initialize(&self) -> Result<(), super::EngineError> {
		if self.session.is_active() {
			return Err(super::EngineError::AlreadyRunning);
		}
		tracing::info!(
			board = %self.config.board.id,
			source = %self.board.source_name(),
			"Initializing board engine"
		);
		self.session.enter().await;
		Ok(())
	}

	/// Ends the session and stops polling.
	pub async fn shutdown(&self) {
		tracing::info!("Shutting down board engine");
		self.session.end().await;
	}
}
