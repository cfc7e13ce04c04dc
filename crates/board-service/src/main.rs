//! Main entry point for the barista board service.
//!
//! Runs the order dashboard for one staff member: polls the order source,
//! applies status actions, and exposes the board over HTTP or as a terminal
//! view. The `parse` subcommand runs the order line parser on its own.

use board_config::Config;
use board_core::{BoardBuilder, BoardEngine, BoardFactories, VisibilityFlag, VisibilityProbe};
use board_source::SourceFactory;
use clap::{Parser, Subcommand};
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

mod apis;
mod render;
mod server;

/// Command-line arguments for the board service.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
	/// Path to configuration file
	#[arg(short, long, default_value = "config.toml")]
	config: PathBuf,

	/// Log level (trace, debug, info, warn, error)
	#[arg(short, long, default_value = "info")]
	log_level: String,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Poll orders and serve the HTTP API (default)
	Serve,
	/// Show the board in the terminal, redrawn on every change
	Watch,
	/// Parse one order line and print it as JSON
	Parse {
		/// The order line, e.g. "2x Latte [Hot] (+ Vanilla)"
		line: String,
	},
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	use tracing_subscriber::{fmt, EnvFilter};

	let default_directive = args.log_level.to_string();
	let env_filter =
		EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

	// Logs go to stderr so the terminal board and `parse` output stay clean.
	fmt()
		.with_env_filter(env_filter)
		.with_thread_ids(true)
		.with_target(true)
		.with_writer(std::io::stderr)
		.init();

	let command = args.command.unwrap_or(Command::Serve);
	if let Command::Parse { line } = &command {
		let parsed = board_order::parse_line(line);
		println!("{}", serde_json::to_string_pretty(&parsed)?);
		return Ok(());
	}

	let config_path = args
		.config
		.to_str()
		.ok_or_else(|| format!("Config path is not valid UTF-8: {}", args.config.display()))?;
	let config = Config::from_file(config_path).await?;
	tracing::info!("Loaded configuration [{}]", config.board.id);

	let visibility = Arc::new(VisibilityFlag::new(true));
	let engine = Arc::new(build_board(config.clone(), visibility.clone())?);

	match command {
		Command::Watch => {
			tokio::select! {
				result = engine.run() => {
					tracing::info!("Board finished");
					result?;
				}
				result = render::watch(Arc::clone(&engine)) => {
					tracing::info!("Terminal view finished");
					result?;
				}
			}
		},
		_ => match config.api.filter(|api| api.enabled) {
			Some(api_config) => {
				let api_engine = Arc::clone(&engine);
				tokio::select! {
					result = engine.run() => {
						tracing::info!("Board finished");
						result?;
					}
					result = server::start_server(api_config, api_engine, visibility) => {
						tracing::info!("API server finished");
						result?;
					}
				}
			},
			None => {
				tracing::info!("Starting board only");
				engine.run().await?;
			},
		},
	}

	tracing::info!("Stopped board");
	Ok(())
}

/// Builds the board engine with every registered order source.
fn build_board(
	config: Config,
	visibility: Arc<dyn VisibilityProbe>,
) -> Result<BoardEngine, Box<dyn std::error::Error>> {
	let source_factories: HashMap<String, SourceFactory> = board_source::get_all_implementations()
		.into_iter()
		.map(|(name, factory)| (name.to_string(), factory))
		.collect();

	let engine = BoardBuilder::new(config)
		.with_visibility(visibility)
		.build(BoardFactories { source_factories })?;
	Ok(engine)
}
