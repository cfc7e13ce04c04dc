//! API request handlers and response views.

pub mod lines;
pub mod orders;
pub mod session;
