//! Broadcast bus for board events.
//!
//! Every component that changes board state publishes here; the engine logs
//! what it receives and the terminal view redraws on it. Publishing never
//! blocks, and a bus without subscribers silently drops events.

use board_types::BoardEvent;
use tokio::sync::broadcast;

/// Cloneable handle to the board's event channel.
#[derive(Clone)]
pub struct EventBus {
	sender: broadcast::Sender<BoardEvent>,
}

impl EventBus {
	/// Creates a bus that buffers up to `capacity` events per subscriber.
	pub fn new(capacity: usize) -> Self {
		let (sender, _) = broadcast::channel(capacity);
		Self { sender }
	}

	pub fn subscribe(&self) -> broadcast::Receiver<BoardEvent> {
		self.sender.subscribe()
	}

	/// Publishes an event to all current subscribers.
	pub fn publish(
		&self,
		event: BoardEvent,
	) -> Result<(), broadcast::error::SendError<BoardEvent>> {
		self.sender.send(event)?;
		Ok(())
	}

	pub fn subscriber_count(&self) -> usize {
		self.sender.receiver_count()
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use board_types::{FetchEvent, SessionEvent, View};

	#[tokio::test]
	async fn test_subscribers_receive_events_in_order() {
		let bus = EventBus::new(8);
		let mut first = bus.subscribe();
		let mut second = bus.subscribe();
		assert_eq!(bus.subscriber_count(), 2);

		bus.publish(BoardEvent::Fetch(FetchEvent::Refreshed {
			count: 3,
			background: true,
		}))
		.unwrap();
		bus.publish(BoardEvent::Session(SessionEvent::ViewChanged { view: View::Menu }))
			.unwrap();

		for rx in [&mut first, &mut second] {
			assert!(matches!(
				rx.recv().await.unwrap(),
				BoardEvent::Fetch(FetchEvent::Refreshed { count: 3, .. })
			));
			assert!(matches!(
				rx.recv().await.unwrap(),
				BoardEvent::Session(SessionEvent::ViewChanged { view: View::Menu })
			));
		}
	}

	#[test]
	fn test_publish_without_subscribers() {
		let bus = EventBus::new(1);
		let result = bus.publish(BoardEvent::Fetch(FetchEvent::Discarded {
			reason: "nobody listening".into(),
		}));
		assert!(result.is_err());
	}
}
