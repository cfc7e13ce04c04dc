//! HTTP server for the board API.
//!
//! Serves the live board for the configured staff member, their order
//! history, status actions and the line parser.

use axum::{
	extract::{Path, Query, State},
	http::StatusCode,
	response::Json,
	routing::{get, post, put},
	Router,
};
use board_config::ApiConfig;
use board_core::{BoardEngine, VisibilityFlag};
use board_types::ApiError;
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;

use crate::apis::{
	lines::{self, LineView},
	orders::{self, ActionResponse, BoardResponse, OrderView},
	session::{self, SessionResponse, ViewRequest, VisibilityRequest},
};

/// Shared application state for the API server.
#[derive(Clone)]
pub struct AppState {
	pub engine: Arc<BoardEngine>,
	/// Set by display clients; polling pauses while hidden.
	pub visibility: Arc<VisibilityFlag>,
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
	#[serde(default)]
	pub q: String,
}

#[derive(Debug, Deserialize)]
pub struct ParseQuery {
	pub line: String,
}

/// Builds the router with all routes and middleware.
pub fn router(state: AppState) -> Router {
	Router::new()
		.route("/health", get(handle_health))
		.nest(
			"/api",
			Router::new()
				.route("/orders", get(handle_board))
				.route("/orders/history", get(handle_history))
				.route("/orders/refresh", post(handle_refresh))
				.route("/orders/{id}/actions/{action}", post(handle_action))
				.route("/lines/parse", get(handle_parse))
				.route("/session", get(handle_session))
				.route("/session/view", put(handle_set_view))
				.route("/session/visibility", put(handle_set_visibility)),
		)
		.layer(ServiceBuilder::new().layer(CorsLayer::permissive()))
		.with_state(state)
}

/// Starts the HTTP server for the API.
pub async fn start_server(
	api_config: ApiConfig,
	engine: Arc<BoardEngine>,
	visibility: Arc<VisibilityFlag>,
) -> Result<(), Box<dyn std::error::Error>> {
	let app = router(AppState { engine, visibility });

	let bind_address = format!("{}:{}", api_config.host, api_config.port);
	let listener = TcpListener::bind(&bind_address).await?;

	tracing::info!("Board API server starting on {}", bind_address);

	axum::serve(listener, app).await?;

	Ok(())
}

async fn handle_health(State(state): State<AppState>) -> Json<Value> {
	Json(json!({
		"status": "ok",
		"board": state.engine.config().board.id,
		"source": state.engine.board().source_name(),
	}))
}

/// Handles GET /api/orders.
async fn handle_board(State(state): State<AppState>) -> Json<BoardResponse> {
	Json(orders::board_view(&state.engine).await)
}

/// Handles GET /api/orders/history?q=.
async fn handle_history(
	State(state): State<AppState>,
	Query(query): Query<HistoryQuery>,
) -> Json<Vec<OrderView>> {
	Json(orders::history_view(&state.engine, &query.q).await)
}

/// Handles POST /api/orders/refresh.
async fn handle_refresh(State(state): State<AppState>) -> Result<StatusCode, ApiError> {
	match orders::refresh(&state.engine).await {
		Ok(()) => Ok(StatusCode::NO_CONTENT),
		Err(e) => {
			tracing::warn!("Refresh request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles POST /api/orders/{id}/actions/{action}.
async fn handle_action(
	State(state): State<AppState>,
	Path((id, action)): Path<(String, String)>,
) -> Result<(StatusCode, Json<ActionResponse>), ApiError> {
	match orders::apply_action(&state.engine, &id, &action).await {
		Ok(response) => Ok((StatusCode::ACCEPTED, Json(response))),
		Err(e) => {
			tracing::warn!("Action request failed: {}", e);
			Err(e)
		},
	}
}

/// Handles GET /api/lines/parse?line=.
async fn handle_parse(Query(query): Query<ParseQuery>) -> Json<LineView> {
	Json(lines::parse(&query.line))
}

async fn handle_session(State(state): State<AppState>) -> Json<SessionResponse> {
	Json(session::describe(&state.engine, &state.visibility).await)
}

/// Handles PUT /api/session/view.
async fn handle_set_view(
	State(state): State<AppState>,
	Json(request): Json<ViewRequest>,
) -> Result<Json<SessionResponse>, ApiError> {
	match session::set_view(&state.engine, request.view).await {
		Ok(()) => Ok(Json(session::describe(&state.engine, &state.visibility).await)),
		Err(e) => {
			tracing::warn!("View change failed: {}", e);
			Err(e)
		},
	}
}

/// Handles PUT /api/session/visibility.
async fn handle_set_visibility(
	State(state): State<AppState>,
	Json(request): Json<VisibilityRequest>,
) -> Json<SessionResponse> {
	state.visibility.set_visible(request.visible);
	Json(session::describe(&state.engine, &state.visibility).await)
}
