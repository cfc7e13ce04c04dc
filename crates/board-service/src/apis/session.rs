//! Session endpoints: who the board acts as, the open view and visibility.

use board_core::{BoardEngine, VisibilityFlag, VisibilityProbe};
use board_types::{ApiError, Capabilities, StaffProfile, View};
use serde::{Deserialize, Serialize};

use super::orders::session_error;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionResponse {
	pub staff: StaffProfile,
	pub capabilities: Capabilities,
	pub view: View,
	pub active: bool,
	pub polling: bool,
	pub visible: bool,
}

#[derive(Debug, Deserialize)]
pub struct ViewRequest {
	pub view: View,
}

#[derive(Debug, Deserialize)]
pub struct VisibilityRequest {
	pub visible: bool,
}

pub async fn describe(engine: &BoardEngine, visibility: &VisibilityFlag) -> SessionResponse {
	let session = engine.session();
	SessionResponse {
		staff: session.staff().clone(),
		capabilities: session.capabilities(),
		view: session.view().await,
		active: session.is_active(),
		polling: session.poller().is_running(),
		visible: visibility.is_visible(),
	}
}

pub async fn set_view(engine: &BoardEngine, view: View) -> Result<(), ApiError> {
	engine
		.session()
		.set_view(view)
		.await
		.map_err(session_error)
}
