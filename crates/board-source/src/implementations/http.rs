//! HTTP order source.
//!
//! Talks to a script endpoint that fronts the order spreadsheet:
//!
//! - read: `GET <endpoint>?action=getOrders&secret=<token>&_=<ms>` answering
//!   `{ "orders": [...] }` or `{ "error": "..." }`
//! - write: `POST <endpoint>` with a `text/plain` JSON body
//!   `{ "action": "updateStatus", "secret", "orderId", "status", "user" }`
//!
//! Writes are send-and-forget: once the request is out, the response is
//! only logged. The next fetch shows whether the write landed.

use crate::{OrderSourceInterface, SourceError, SourceFactory, SourceRegistry};
use async_trait::async_trait;
use board_types::{
	current_timestamp_millis, truncate_id, ConfigSchema, Field, FieldType,
	ImplementationRegistry, Order, Schema, SecretString, StatusUpdate, ValidationError,
};
use reqwest::header::CONTENT_TYPE;
use serde_json::Value;
use std::time::Duration;

const DEFAULT_TIMEOUT_SECONDS: u64 = 15;

/// Order source backed by the remote script endpoint.
pub struct HttpOrderSource {
	client: reqwest::Client,
	endpoint: String,
	secret: SecretString,
}

impl HttpOrderSource {
	pub fn new(
		endpoint: impl Into<String>,
		secret: SecretString,
		timeout: Duration,
	) -> Result<Self, SourceError> {
		let client = reqwest::Client::builder()
			.timeout(timeout)
			.build()
			.map_err(|e| SourceError::Configuration(e.to_string()))?;
		Ok(Self {
			client,
			endpoint: endpoint.into(),
			secret,
		})
	}
}

#[async_trait]
impl OrderSourceInterface for HttpOrderSource {
	fn config_schema(&self) -> Box<dyn ConfigSchema> {
		Box::new(HttpSourceSchema)
	}

	async fn fetch_orders(&self) -> Result<Option<Vec<Order>>, SourceError> {
		let cache_buster = current_timestamp_millis().to_string();
		let response = self
			.client
			.get(&self.endpoint)
			.query(&[
				("action", "getOrders"),
				("secret", self.secret.expose_secret()),
				("_", cache_buster.as_str()),
			])
			.send()
			.await
			// The request URL carries the secret.
			.map_err(|e| SourceError::Network(e.without_url().to_string()))?;

		let status = response.status();
		if !status.is_success() {
			return Err(SourceError::Remote(format!("HTTP {}", status)));
		}

		let body: Value = response
			.json()
			.await
			.map_err(|e| SourceError::Decode(e.without_url().to_string()))?;
		decode_orders_body(body)
	}

	async fn submit_status(&self, update: &StatusUpdate) -> Result<(), SourceError> {
		let body = self.secret.with_exposed(|secret| {
			serde_json::json!({
				"action": "updateStatus",
				"secret": secret,
				"orderId": update.order_id,
				"status": update.status,
				"user": update.user,
			})
			.to_string()
		});

		let response = self
			.client
			.post(&self.endpoint)
			.header(CONTENT_TYPE, "text/plain;charset=utf-8")
			.body(body)
			.send()
			.await
			.map_err(|e| SourceError::Network(e.without_url().to_string()))?;

		tracing::debug!(
			order_id = %truncate_id(&update.order_id),
			http_status = %response.status(),
			"Status write sent"
		);
		Ok(())
	}
}

/// Interprets a `getOrders` response body.
///
/// An `error` field is a failure. A missing or null `orders` field yields
/// `None`; any other non-array value yields an empty list. Entries that are
/// not objects are skipped.
pub fn decode_orders_body(body: Value) -> Result<Option<Vec<Order>>, SourceError> {
	let mut fields = match body {
		Value::Object(fields) => fields,
		other => {
			return Err(SourceError::Decode(format!(
				"expected a JSON object, got {}",
				json_kind(&other)
			)))
		},
	};

	if let Some(error) = fields.get("error").filter(|e| !e.is_null()) {
		let message = error
			.as_str()
			.map(str::to_string)
			.unwrap_or_else(|| error.to_string());
		return Err(SourceError::Remote(message));
	}

	match fields.remove("orders") {
		None | Some(Value::Null) => Ok(None),
		Some(Value::Array(items)) => Ok(Some(
			items
				.into_iter()
				.filter_map(|item| match serde_json::from_value::<Order>(item) {
					Ok(order) => Some(order),
					Err(e) => {
						tracing::warn!(error = %e, "Skipping malformed order entry");
						None
					},
				})
				.collect(),
		)),
		Some(other) => {
			tracing::warn!(kind = json_kind(&other), "Order list is not an array");
			Ok(Some(Vec::new()))
		},
	}
}

fn json_kind(value: &Value) -> &'static str {
	match value {
		Value::Null => "null",
		Value::Bool(_) => "boolean",
		Value::Number(_) => "number",
		Value::String(_) => "string",
		Value::Array(_) => "array",
		Value::Object(_) => "object",
	}
}

/// Configuration schema for the HTTP source.
pub struct HttpSourceSchema;

impl ConfigSchema for HttpSourceSchema {
	fn validate(&self, config: &toml::Value) -> Result<(), ValidationError> {
		let schema = Schema::new(
			vec![
				Field::new("endpoint", FieldType::String).with_validator(|value| {
					match value.as_str() {
						Some(url) if url.starts_with("https://") || url.starts_with("http://") => {
							Ok(())
						},
						_ => Err("endpoint must be an http(s) URL".to_string()),
					}
				}),
				Field::new("secret", FieldType::String),
			],
			vec![Field::new(
				"timeout_seconds",
				FieldType::Integer {
					min: Some(1),
					max: Some(120),
				},
			)],
		);
		schema.validate(config)
	}
}

/// Factory function to create an HTTP source from configuration.
///
/// Configuration parameters:
/// - `endpoint`: script URL
/// - `secret`: shared token sent with every request
/// - `timeout_seconds`: optional request timeout (default: 15)
pub fn create_source(config: &toml::Value) -> Result<Box<dyn OrderSourceInterface>, SourceError> {
	HttpSourceSchema
		.validate(config)
		.map_err(|e| SourceError::Configuration(e.to_string()))?;

	let endpoint = config
		.get("endpoint")
		.and_then(|v| v.as_str())
		.ok_or_else(|| SourceError::Configuration("endpoint is required".into()))?;
	let secret = config
		.get("secret")
		.and_then(|v| v.as_str())
		.map(SecretString::from)
		.ok_or_else(|| SourceError::Configuration("secret is required".into()))?;
	let timeout = config
		.get("timeout_seconds")
		.and_then(|v| v.as_integer())
		.map(|s| s as u64)
		.unwrap_or(DEFAULT_TIMEOUT_SECONDS);

	Ok(Box::new(HttpOrderSource::new(
		endpoint,
		secret,
		Duration::from_secs(timeout),
	)?))
}

/// Registry for the HTTP source implementation.
pub struct Registry;

impl ImplementationRegistry for Registry {
	const NAME: &'static str = "http";
	type Factory = SourceFactory;

	fn factory() -> Self::Factory {
		create_source
	}
}

impl SourceRegistry for Registry {}
