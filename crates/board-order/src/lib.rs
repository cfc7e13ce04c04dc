//! Order logic for the barista board.
//!
//! Everything in this crate is pure: parsing order lines, deciding which
//! status transitions are allowed, which action buttons an order shows to a
//! given role, which orders a role sees, and how order fields are rendered.
//! None of it performs I/O, so the workflow controller and the HTTP layer
//! can share it freely.

pub mod actions;
pub mod display;
pub mod filters;
pub mod parser;
pub mod transitions;

pub use actions::{available_actions, ActionButton, ActionError, StatusAction};
pub use filters::{active_orders, history, is_active, is_visible_to, visible_orders};
pub use parser::{parse_items, parse_line, parse_value};
pub use transitions::is_valid_transition;
