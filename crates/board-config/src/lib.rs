//! Configuration module for the barista board.
//!
//! Configuration is read from TOML. String values may reference environment
//! variables as `${NAME}` or `${NAME:-default}`, which keeps the endpoint
//! secret out of the file itself.
//!
//! ## Modular Configuration Support
//!
//! A file may pull in others with `include = ["source.toml", "staff.toml"]`.
//! Each top-level section must appear in exactly one file.

mod loader;

use board_types::StaffProfile;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	#[error("Configuration error: {0}")]
	Parse(String),
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Only the message; the default rendering echoes the whole input.
		ConfigError::Parse(err.message().to_string())
	}
}

/// Main configuration structure for the board.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// Identity and timing of this board instance.
	pub board: BoardConfig,
	/// Where orders are read from and written to.
	pub source: SourceConfig,
	/// Staff roster the session may act as.
	#[serde(default)]
	pub staff: Vec<StaffProfile>,
	/// Which staff member this board acts as.
	pub session: SessionConfig,
	/// HTTP API server settings.
	pub api: Option<ApiConfig>,
}

/// Identity and timing of the board instance.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BoardConfig {
	pub id: String,
	/// Seconds between background refreshes while the orders view is open.
	#[serde(default = "default_poll_interval_seconds")]
	pub poll_interval_seconds: u64,
	/// Delay before the refresh that follows a status change.
	#[serde(default = "default_reconcile_delay_ms")]
	pub reconcile_delay_ms: u64,
}

impl BoardConfig {
	pub fn poll_interval(&self) -> Duration {
		Duration::from_secs(self.poll_interval_seconds)
	}

	pub fn reconcile_delay(&self) -> Duration {
		Duration::from_millis(self.reconcile_delay_ms)
	}
}

fn default_poll_interval_seconds() -> u64 {
	3
}

fn default_reconcile_delay_ms() -> u64 {
	2000
}

/// Configuration for the order source.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
	/// Which implementation to use.
	pub primary: String,
	/// Map of implementation names to their raw TOML tables.
	pub implementations: HashMap<String, toml::Value>,
}

/// The staff member the board acts as.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
	/// Name of an entry in the `[[staff]]` roster.
	pub staff: String,
}

/// Configuration for the HTTP API server.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	#[serde(default)]
	pub enabled: bool,
	#[serde(default = "default_api_host")]
	pub host: String,
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	3000
}

/// Resolves `${VAR}` and `${VAR:-default}` references.
///
/// Input is capped at 1 MB. A reference to an unset variable without a
/// default is an error.
pub(crate) fn resolve_env_vars(input: &str) -> Result<String, ConfigError> {
	const MAX_INPUT_SIZE: usize = 1024 * 1024;
	if input.len() > MAX_INPUT_SIZE {
		return Err(ConfigError::Validation(format!(
			"Configuration file too large: {} bytes (max: {} bytes)",
			input.len(),
			MAX_INPUT_SIZE
		)));
	}

	let re = Regex::new(r"\$\{([A-Z_][A-Z0-9_]{0,127})(?::-([^}]{0,256}))?\}")
		.map_err(|e| ConfigError::Parse(format!("Regex error: {}", e)))?;

	let mut resolved = String::with_capacity(input.len());
	let mut last_end = 0;

	for cap in re.captures_iter(input) {
		let (Some(whole), Some(name)) = (cap.get(0), cap.get(1)) else {
			continue;
		};
		let value = match (std::env::var(name.as_str()), cap.get(2)) {
			(Ok(v), _) => v,
			(Err(_), Some(default)) => default.as_str().to_string(),
			(Err(_), None) => {
				return Err(ConfigError::Validation(format!(
					"Environment variable '{}' not found",
					name.as_str()
				)))
			},
		};
		resolved.push_str(&input[last_end..whole.start()]);
		resolved.push_str(&value);
		last_end = whole.end();
	}
	resolved.push_str(&input[last_end..]);

	Ok(resolved)
}

impl Config {
	/// Loads configuration from a file, following `include` directives.
	pub async fn from_file(path: &str) -> Result<Self, ConfigError> {
		let path_buf = Path::new(path);
		let base_dir = path_buf.parent().unwrap_or_else(|| Path::new("."));

		let mut loader = loader::ConfigLoader::new(base_dir);
		let file_name = path_buf
			.file_name()
			.ok_or_else(|| ConfigError::Validation(format!("Invalid path: {}", path)))?;
		loader.load_config(file_name).await
	}

	/// The roster entry named by `[session] staff`.
	pub fn acting_staff(&self) -> Option<&StaffProfile> {
		self.staff.iter().find(|s| s.name == self.session.staff)
	}

	fn validate(&self) -> Result<(), ConfigError> {
		if self.board.id.trim().is_empty() {
			return Err(ConfigError::Validation("Board ID cannot be empty".into()));
		}
		if !(1..=300).contains(&self.board.poll_interval_seconds) {
			return Err(ConfigError::Validation(
				"board.poll_interval_seconds must be between 1 and 300".into(),
			));
		}
		if self.board.reconcile_delay_ms > 60_000 {
			return Err(ConfigError::Validation(
				"board.reconcile_delay_ms cannot exceed 60000".into(),
			));
		}

		if self.source.primary.is_empty() {
			return Err(ConfigError::Validation(
				"Source primary implementation cannot be empty".into(),
			));
		}
		if !self.source.implementations.contains_key(&self.source.primary) {
			return Err(ConfigError::Validation(format!(
				"Primary source '{}' not found in implementations",
				self.source.primary
			)));
		}

		let mut names = HashSet::new();
		for member in &self.staff {
			if member.name.trim().is_empty() {
				return Err(ConfigError::Validation("Staff name cannot be empty".into()));
			}
			if !names.insert(member.name.as_str()) {
				return Err(ConfigError::Validation(format!(
					"Duplicate staff member '{}'",
					member.name
				)));
			}
		}
		if self.acting_staff().is_none() {
			return Err(ConfigError::Validation(format!(
				"Session staff '{}' not found in staff roster",
				self.session.staff
			)));
		}

		if let Some(api) = self.api.as_ref().filter(|api| api.enabled) {
			if api.host.is_empty() {
				return Err(ConfigError::Validation("API host cannot be empty".into()));
			}
		}

		Ok(())
	}
}

/// Parses a configuration string: env resolution, TOML decoding, validation.
impl FromStr for Config {
	type Err = ConfigError;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let resolved = resolve_env_vars(s)?;
		let config: Config = toml::from_str(&resolved)?;
		config.validate()?;
		Ok(config)
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const BASE: &str = r#"
[board]
id = "main-branch"

[source]
primary = "memory"
[source.implementations.memory]

[[staff]]
name = "Thia"
role = "Owner"

[[staff]]
name = "Jun"
role = "Rider"

[session]
staff = "Jun"
"#;

	#[test]
	fn test_env_var_resolution() {
		std::env::set_var("BOARD_TEST_HOST", "script.example.com");
		std::env::set_var("BOARD_TEST_PATH", "exec");

		let input = "endpoint = \"https://${BOARD_TEST_HOST}/${BOARD_TEST_PATH}\"";
		let result = resolve_env_vars(input).unwrap();
		assert_eq!(result, "endpoint = \"https://script.example.com/exec\"");

		std::env::remove_var("BOARD_TEST_HOST");
		std::env::remove_var("BOARD_TEST_PATH");
	}

	#[test]
	fn test_env_var_with_default() {
		let input = "secret = \"${BOARD_MISSING_SECRET:-dev-secret}\"";
		assert_eq!(resolve_env_vars(input).unwrap(), "secret = \"dev-secret\"");
	}

	#[test]
	fn test_missing_env_var_error() {
		let err = resolve_env_vars("secret = \"${BOARD_MISSING_SECRET}\"").unwrap_err();
		assert!(err.to_string().contains("BOARD_MISSING_SECRET"));
	}

	#[test]
	fn test_oversized_input_rejected() {
		let input = "#".repeat(1024 * 1024 + 1);
		assert!(matches!(resolve_env_vars(&input), Err(ConfigError::Validation(_))));
	}

	#[test]
	fn test_defaults_applied() {
		let config: Config = BASE.parse().unwrap();
		assert_eq!(config.board.poll_interval(), Duration::from_secs(3));
		assert_eq!(config.board.reconcile_delay(), Duration::from_millis(2000));
		assert!(config.api.is_none());
		assert_eq!(config.acting_staff().map(|s| s.role.as_str()), Some("Rider"));
	}

	#[test]
	fn test_api_defaults() {
		let text = format!("{}\n[api]\nenabled = true\n", BASE);
		let config: Config = text.parse().unwrap();
		let api = config.api.unwrap();
		assert_eq!(api.host, "127.0.0.1");
		assert_eq!(api.port, 3000);
	}

	#[test]
	fn test_unknown_primary_rejected() {
		let text = BASE.replace("primary = \"memory\"", "primary = \"http\"");
		let err = text.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Primary source 'http' not found"));
	}

	#[test]
	fn test_session_staff_must_exist() {
		let text = BASE.replace("staff = \"Jun\"", "staff = \"Nobody\"");
		let err = text.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Nobody"));
	}

	#[test]
	fn test_duplicate_staff_rejected() {
		let text = BASE.replace("name = \"Jun\"", "name = \"Thia\"");
		let err = text.parse::<Config>().unwrap_err();
		assert!(err.to_string().contains("Duplicate staff member 'Thia'"));
	}

	#[test]
	fn test_poll_interval_range() {
		let text = BASE.replace(
			"id = \"main-branch\"",
			"id = \"main-branch\"\npoll_interval_seconds = 0",
		);
		assert!(text.parse::<Config>().is_err());
	}

	#[test]
	fn test_config_with_env_secret() {
		std::env::set_var("BOARD_TEST_SECRET", "s3cr3t");
		let text = BASE.replace(
			"[source.implementations.memory]",
			"[source.implementations.memory]\n[source.implementations.http]\nendpoint = \"https://example.com/exec\"\nsecret = \"${BOARD_TEST_SECRET}\"",
		);
		let config: Config = text.parse().unwrap();
		let http = &config.source.implementations["http"];
		assert_eq!(http.get("secret").and_then(|v| v.as_str()), Some("s3cr3t"));
		std::env::remove_var("BOARD_TEST_SECRET");
	}
}
