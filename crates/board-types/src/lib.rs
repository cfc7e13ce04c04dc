//! Common types module for the barista board.
//!
//! This module defines the data types shared by every board component:
//! orders as delivered by the order source, parsed order lines, staff roles,
//! events and configuration validation helpers.

/// API error types for the HTTP surface.
pub mod api;
/// Event types published on the board event bus.
pub mod events;
/// Parsed order line types.
pub mod line;
/// Orders, statuses and status writes.
pub mod order;
/// Implementation registry trait.
pub mod registry;
/// Staff roles and their capabilities.
pub mod role;
/// Secret string wrapper for the endpoint token.
pub mod secret_string;
/// Staff profiles and dashboard views.
pub mod session;
/// Utility functions for display formatting.
pub mod utils;
/// Configuration validation types.
pub mod validation;

pub use api::*;
pub use events::*;
pub use line::*;
pub use order::*;
pub use registry::ImplementationRegistry;
pub use role::{Capabilities, Role};
pub use secret_string::SecretString;
pub use session::{StaffProfile, View};
pub use utils::{current_timestamp_millis, short_code, truncate_id};
pub use validation::*;
