use std::sync::Arc;

use tokio::sync::broadcast::{
	error::{
		RecvError,
		TryRecvError,
	},
	Receiver,
};
use tracing::warn;

use super::types::RollRecord;

pub enum RollEvent {
	Roll(Arc<RollRecord>),

	/// The store was dropped; no more rolls will arrive.
	Closed,
}

/// Wrapped receiver for the store's live roll feed. Subscribers that fall behind skip the rolls
/// they missed instead of failing; the full backlog is still available through the history.
pub struct RollReceiver {
	receiver: Receiver<Arc<RollRecord>>,
}

impl RollReceiver {
	pub(super) fn new(receiver: Receiver<Arc<RollRecord>>) -> RollReceiver {
		return RollReceiver { receiver };
	}

	/// Waits for the next roll
	pub async fn receive(&mut self) -> RollEvent {
		loop {
			match self.receiver.recv().await {
				Ok(record) => return RollEvent::Roll(record),
				Err(RecvError::Lagged(skipped)) => {
					warn!(skipped, "roll subscriber fell behind");
				},
				Err(RecvError::Closed) => return RollEvent::Closed,
			}
		}
	}

	/// Returns the next roll if one is already waiting
	pub fn try_receive(&mut self) -> Option<RollEvent> {
		loop {
			match self.receiver.try_recv() {
				Ok(record) => return Some(RollEvent::Roll(record)),
				Err(TryRecvError::Empty) => return None,
				Err(TryRecvError::Lagged(skipped)) => {
					warn!(skipped, "roll subscriber fell behind");
				},
				Err(TryRecvError::Closed) => return Some(RollEvent::Closed),
			}
		}
	}
}
