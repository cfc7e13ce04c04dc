//! Core workflow for the barista board.
//!
//! This crate owns the live order list and everything that changes it: the
//! fetch and status-update workflow in [`board`], the background [`poller`],
//! the staff [`session`] that gates actions by role, and the [`engine`]
//! that ties them to the process lifetime. [`builder`] assembles an engine
//! from configuration and order source factories.

pub mod board;
pub mod builder;
pub mod engine;
pub mod event_bus;
pub mod poller;
pub mod session;

pub use board::{BoardError, BoardSnapshot, FetchOutcome, OrderBoard, CONNECTION_BANNER};
pub use builder::{BoardBuilder, BoardFactories, BuilderError};
pub use engine::{BoardEngine, EngineError};
pub use event_bus::EventBus;
pub use poller::{AlwaysVisible, Poller, VisibilityFlag, VisibilityProbe};
pub use session::{ActionOutcome, Session, SessionError};
