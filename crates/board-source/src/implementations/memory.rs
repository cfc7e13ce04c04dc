//! In-memory order source.
//!
//! Holds a seeded order list and applies status writes to it. Used for
//! development boards and tests; clones share the same list so a test can
//! keep a handle while the board owns the boxed source.

use crate::{OrderSourceInterface, SourceError, SourceFactory, SourceRegistry};
use async_trait::async_trait;
use board_types::{
	ConfigSchema, Field, FieldType, ImplementationRegistry, Order, Schema, StatusUpdate,
	ValidationError,
};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct MemoryState {
	orders: RwLock<Vec<Order>>,
	writes: RwLock<Vec<StatusUpdate>>,
	fail_fetch: AtomicBool,
	fail_writes: AtomicBool,
	fetch_count: AtomicUsize,
}

/// In-memory order source.
#[derive(Clone, Default)]
pub struct MemoryOrderSource {
	state: Arc<MemoryState>,
}

impl MemoryOrderSource {
	pub fn new(orders: Vec<Order>) -> Self {
		Self {
			state: Arc::new(MemoryState {
				orders: RwLock::new(orders),
				..MemoryState::default()
			}),
		}
	}

	/// Replaces the stored list, as if another device changed it.
	pub async fn set_orders(&self, orders: Vec<Order>) {
		*self.state.orders.write().await = orders;
	}

	pub async fn orders(&self) -> Vec<Order> {
		self.state.orders.read().await.clone()
	}

	/// Status writes received so far, in arrival order.
	pub async fn writes(&self) -> Vec<StatusUpdate> {
		self.state.writes.read().await.clone()
	}

	pub fn fetch_count(&self) -> usize {
		self.state.fetch_count.load(Ordering::SeqCst)
	}

	/// Makes subsequent fetches fail with a network error.
	pub fn set_fail_fetch(&self, fail: bool) {
		self.state.fail_fetch.store(fail, Ordering::SeqCst);
	}

	/// Makes subsequent writes fail with a network error.
	pub fn set_fail_writes(&self, fail: bool) {
		self.state.fail_writes.store(fail, Ordering::SeqCst);
	}
}

#[async_trait]
impl OrderSourceInterface for MemoryOrderSource {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(MemorySourceSchema)
	}

	async fn fetch_orders(&self) -> Result<Option<Vec<Order>>, SourceError> {
		self.state.fetch_count.fetch_add(1, Ordering::SeqCst);
		if self.state.fail_fetch.load(Ordering::SeqCst) {
			return Err(SourceError::Network("memory source is offline".into()));
		}
		Ok(Some(self.state.orders.read().await.clone()))
	}

	async fn submit_status(&self, update: &StatusUpdate) -> Result<(), SourceError> {
		if self.state.fail_writes.load(Ordering::SeqCst) {
			return Err(SourceError::Network("memory source is offline".into()));
		}
		self.state.writes.write().await.push(update.clone());

		let mut orders = self.state.orders.write().await;
		let order = orders
			.iter_mut()
			.find(|o| o.order_id == update.order_id)
			.ok_or_else(|| SourceError::NotFound(update.order_id.clone()))?;
		order.status = update.status.clone();
		Ok(())
	}
}

/// Configuration schema for the memory source.
///
/// Accepts an optional `orders` array of order tables and a `fail_fetch`
/// flag that starts the source offline.
pub struct MemorySourceSchema;

impl ConfigSchema for MemorySourceSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![],
			vec![
				Field::new("orders", FieldType::Array(Box::new(FieldType::Any))).with_validator(
					|value| match value.as_array() {
						Some(items) if items.iter().all(|i| i.is_table()) => Ok(()),
						_ => Err("every order must be a table".to_string()),
					},
				),
				Field::new("fail_fetch", FieldType::Boolean),
			],
		);
		schema.validate(config)
	}
}

/// Factory function to create a memory source from configuration.
///
/// Configuration parameters:
/// - `orders`: optional array of order tables (`orderId`, `status`, `items`, ...)
/// - `fail_fetch`: optional, start with fetches failing
pub fn create_source(config: &toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError> {
	MemorySourceSchema
		.validate(config)
		.map_err(|e| SourceError::Configuration(e.to_string()))?;

	let orders: Vec<Order> = match config.get("orders") {
		Some(value) => value
			.clone()
			.try_into()
			.map_err(|e: toml::de::Error| SourceError::Configuration(e.message().to_string()))?,
		None => Vec::new(),
	};

	let source = MemoryOrderSource::new(orders);
	if config
		.get("fail_fetch")
		.and_then(|v| v.as_bool())
		.unwrap_or(false)
	{
		source.set_fail_fetch(true);
	}
	Ok(Box::new(source))
}

/// Registry for the memory source implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "memory";
	type Factory = SourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl SourceRegistry for Registry {}

#[cfg(test)]
mod tests {
	use super::*;

	fn order(id: &str, status: &str) -> Order {
		Order {
			order_id: id.into(),
			status: status.into(),
			..Order::default()
		}
	}

	fn update(id: &str, status: &str) -> StatusUpdate {
		StatusUpdate {
			order_id: id.into(),
			status: status.into(),
			user: "Jun".into(),
		}
	}

	#[tokio::test]
	async fn test_write_applies_status() {
		let source = MemoryOrderSource::new(vec![order("A1", "Placed"), order("A2", "Placed")]);
		source.submit_status(&update("A2", "Preparing")).await.unwrap();

		let orders = source.fetch_orders().await.unwrap().unwrap();
		assert_eq!(orders[0].status, "Placed");
		assert_eq!(orders[1].status, "Preparing");
		assert_eq!(source.writes().await.len(), 1);
		assert_eq!(source.fetch_count(), 1);
	}

	#[tokio::test]
	async fn test_unknown_order_write() {
		let source = MemoryOrderSource::new(vec![]);
		let result = source.submit_status(&update("missing", "Preparing")).await;
		assert!(matches!(result, Err(SourceError::NotFound(_))));
	}

	#[tokio::test]
	async fn test_failure_toggles() {
		let source = MemoryOrderSource::new(vec![order("A1", "Placed")]);
		source.set_fail_fetch(true);
		assert!(matches!(source.fetch_orders().await, Err(SourceError::Network(_))));
		source.set_fail_fetch(false);
		assert!(source.fetch_orders().await.is_ok());

		source.set_fail_writes(true);
		assert!(source.submit_status(&update("A1", "Preparing")).await.is_err());
		assert!(source.writes().await.is_empty());
	}

	#[tokio::test]
	async fn test_factory_seeds_orders() {
		let config: toml::Value = toml::from_str(
			r#"
fail_fetch = false

[[orders]]
orderId = "ORD-0001"
status = "Placed"
items = "2x Latte [Hot]"
total = 240

[[orders]]
orderId = "ORD-0002"
status = "On the Way"
"#,
		)
		.unwrap();
		let source = create_source(&config).unwrap();
		let orders = source.fetch_orders().await.unwrap().unwrap();
		assert_eq!(orders.len(), 2);
		assert_eq!(orders[0].total, "240");
		assert_eq!(orders[1].status, "On the Way");
	}

	#[test]
	fn test_schema_rejects_bad_orders() {
		let config: toml::Value = toml::from_str("orders = [1, 2]").unwrap();
		assert!(create_source(&config).is_err());
	}
}
