//! Builder pattern for constructing board engines.
//!
//! Composes a [`BoardEngine`] from configuration and a map of order source
//! factories, so the binary decides which implementations exist and the
//! configuration decides which one is used.

use crate::board::OrderBoard;
use crate::engine::BoardEngine;
use crate::event_bus::EventBus;
use crate::poller::{AlwaysVisible, Poller, VisibilityProbe};
use crate::session::Session;
use board_config::Config;
use board_source::{OrderSourceInterface, OrderSourceService, SourceError};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;

const EVENT_CAPACITY: usize = 1000;

/// Errors that can occur during engine construction.
#[derive(Debug, Error)]
pub enum BuilderError {
	#[error("Configuration error: {0}")]
	Config(String),
	#[error("Missing required component: {0}")]
	MissingComponent(String),
}

/// Factory functions available to the builder, keyed by implementation name.
pub struct BoardFactories<SF> {
	pub source_factories: HashMap<String, SF>,
}

/// Builder for a [`BoardEngine`].
pub struct BoardBuilder {
	config: Config,
	visibility: Arc<dyn VisibilityProbe>,
}

impl BoardBuilder {
	pub fn new(config: Config) -> Self {
		Self {
			config,
			visibility: Arc::new(AlwaysVisible),
		}
	}

	/// Uses `probe` to decide whether polling ticks should fetch.
	pub fn with_visibility(mut self, probe: Arc<dyn VisibilityProbe>) -> Self {
		self.visibility = probe;
		self
	}

	/// Builds the engine, creating every configured source implementation
	/// that has a factory and using the primary one.
	pub fn build<SF>(self, factories: BoardFactories<SF>) -> Result<BoardEngine, BuilderError>
	where
		SF: Fn(&toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError>,
	{
		let mut source_impls = HashMap::new();
		for (name, config) in &self.config.source.implementations {
			let Some(factory) = factories.source_factories.get(name) else {
				tracing::warn!(component = "source", implementation = %name, "No factory registered, ignoring");
				continue;
			};
			match factory(config) {
				Ok(implementation) => {
					let is_primary = &self.config.source.primary == name;
					tracing::info!(component = "source", implementation = %name, enabled = %is_primary, "Loaded");
					source_impls.insert(name.clone(), implementation);
				},
				Err(e) => {
					tracing::error!(
						component = "source",
						implementation = %name,
						error = %e,
						"Failed to create order source"
					);
					return Err(BuilderError::Config(format!(
						"Failed to create order source '{}': {}",
						name, e
					)));
				},
			}
		}

		let primary = &self.config.source.primary;
		let backend = source_impls.remove(primary).ok_or_else(|| {
			BuilderError::Config(format!(
				"Primary source '{}' failed to load or has no factory",
				primary
			))
		})?;
		let source = Arc::new(OrderSourceService::new(primary.clone(), backend));

		let staff = self.config.acting_staff().cloned().ok_or_else(|| {
			BuilderError::MissingComponent(format!(
				"staff member '{}' for the session",
				self.config.session.staff
			))
		})?;

		let event_bus = EventBus::new(EVENT_CAPACITY);
		let board = Arc::new(OrderBoard::new(
			source,
			self.config.board.reconcile_delay(),
			event_bus.clone(),
		));
		let poller = Poller::new(
			Arc::clone(&board),
			self.config.board.poll_interval(),
			self.visibility,
		);
		let session = Arc::new(Session::new(
			Arc::clone(&board),
			poller,
			staff,
			event_bus.clone(),
		));

		Ok(BoardEngine::new(self.config, board, session, event_bus))
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use board_source::implementations::memory::create_source;
	use std::time::Duration;

	type Factory = fn(&toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError>;

	const CONFIG: &str = r#"
[board]
id = "kiosk-1"
poll_interval_seconds = 5
reconcile_delay_ms = 1500

[source]
primary = "memory"

[source.implementations.memory]
[[source.implementations.memory.orders]]
orderId = "A1"
status = "Placed"

[[staff]]
name = "Thia"
role = "Kitchen"

[session]
staff = "Thia"
"#;

	fn factories() -> BoardFactories<Factory> {
		let mut source_factories = HashMap::new();
		source_factories.insert("memory".to_string(), create_source as Factory);
		BoardFactories { source_factories }
	}

	#[tokio::test]
	async fn test_builds_engine_from_config() {
		let config: Config = CONFIG.parse().unwrap();
		let engine = BoardBuilder::new(config).build(factories()).unwrap();

		assert_eq!(engine.session().staff().name, "Thia");
		assert!(engine.session().capabilities().can_advance_kitchen);
		assert_eq!(engine.board().reconcile_delay(), Duration::from_millis(1500));
		assert_eq!(engine.session().poller().interval(), Duration::from_secs(5));

		engine.board().fetch_orders(false).await;
		assert_eq!(engine.board().snapshot().await.orders.len(), 1);
	}

	#[test]
	fn test_primary_without_factory_fails() {
		let config: Config = CONFIG.parse().unwrap();
		let result = BoardBuilder::new(config).build(BoardFactories::<Factory> {
			source_factories: HashMap::new(),
		});
		assert!(matches!(result, Err(BuilderError::Config(_))));
	}

	#[test]
	fn test_invalid_source_table_fails() {
		let config: Config = CONFIG
			.replace("[source.implementations.memory]", "[source.implementations.memory]\nfail_fetch = \"yes\"")
			.parse()
			.unwrap();
		let result = BoardBuilder::new(config).build(factories());
		assert!(matches!(result, Err(BuilderError::Config(msg)) if msg.contains("memory")));
	}
}
