//! Order source module for the barista board.
//!
//! An order source is wherever orders live: in production a script endpoint
//! in front of a spreadsheet, in development an in-memory list. The board
//! only ever reads the full list and writes single status changes.

use async_trait::async_trait;
use board_types::{
	truncate_id, ConfigSchema, ImplementationRegistry, Order, StatusUpdate,
};
use thiserror::Error;
use tracing::instrument;

/// Re-export implementations
pub mod implementations {
	pub mod http;
	pub mod memory;
}

/// Errors that can occur while talking to an order source.
#[derive(Debug, Error)]
pub enum SourceError {
	/// The request could not be sent or no response arrived.
	#[error("Network error: {0}")]
	Network(String),
	/// The source answered with a failure status or an `error` field.
	#[error("Source error: {0}")]
	Remote(String),
	/// The response body was not the expected JSON.
	#[error("Decode error: {0}")]
	Decode(String),
	/// The implementation's configuration table is invalid.
	#[error("Configuration error: {0}")]
	Configuration(String),
	/// A write named an order the source does not hold.
	#[error("Order not found: {0}")]
	NotFound(String),
}

/// Trait implemented by every order source.
#[cfg_attr(feature = "testing", mockall::automock)]
#[async_trait]
pub trait OrderSourceInterface: Send + Sync {
	/// Returns the configuration schema for validation.
	fn config_schema(&self) -> Box<dyn ConfigSchema>;

	/// Reads the full order list, oldest first.
	///
	/// `Ok(None)` means the source answered without an order list, in which
	/// case the caller keeps whatever it already shows.
	async fn fetch_orders(&self) -> Result<Option<Vec<Order>>, SourceError>;

	/// Sends a status write.
	///
	/// Success means the request was handed to the source; whether the
	/// source accepted it shows up on the next fetch.
	async fn submit_status(&self, update: &StatusUpdate) -> Result<(), SourceError>;
}

/// Type alias for order source factory functions.
pub type SourceFactory = fn(&toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError>;

/// Registry trait for order source implementations.
pub trait SourceRegistry: ImplementationRegistry<Factory = SourceFactory> {}

/// Get all registered order source implementations.
pub fn get_all_implementations() -> Vec<(&'static str, SourceFactory)> {
	use implementations::{http, memory};

	vec![
		(http::Registry::NAME, http::Registry::factory()),
		(memory::Registry::NAME, memory::Registry::factory()),
	]
}

/// Service wrapper around the configured order source.
pub struct OrderSourceService {
	name: String,
	backend: Box<dyn OrderSourceInterface>,
}

impl OrderSourceService {
	pub fn new(name: impl Into<String>, backend: Box<dyn OrderSourceInterface>) -> Self {
		Self {
			name: name.into(),
			backend,
		}
	}

	/// Implementation name, as configured.
	pub fn name(&self) -> &str {
		&self.name
	}

	#[instrument(skip_all, fields(source = %self.name))]
	pub async fn fetch_orders(&self) -> Result<Option<Vec<Order>>, SourceError> {
		let result = self.backend.fetch_orders().await;
		match &result {
			Ok(Some(orders)) => tracing::debug!(count = orders.len(), "Fetched orders"),
			Ok(None) => tracing::debug!("Source returned no order list"),
			Err(e) => tracing::warn!(error = %e, "Order fetch failed"),
		}
		result
	}

	#[instrument(skip_all, fields(source = %self.name, order_id = %truncate_id(&update.order_id)))]
	pub async fn submit_status(&self, update: &StatusUpdate) -> Result<(), SourceError> {
		tracing::info!(status = %update.status, user = %update.user, "Submitting status");
		self.backend.submit_status(update).await
	}
}
