use std::{
	cell::{
		Cell,
		RefCell,
	},
	collections::VecDeque,
};

use serde::{
	Deserialize,
	Serialize,
};
use thiserror::Error;
use tracing::{
	debug,
	info,
};

use crate::{
	config::AppConfig,
	plugins::dice_store::RollRecord,
};

/// Message exchanged with the other clients in a room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RoomMessage {
	Roll {
		room: String,
		record: RollRecord,
	},
}

impl RoomMessage {
	pub fn room(&self) -> &str {
		return match self {
			RoomMessage::Roll { room, .. } => room.as_str(),
		};
	}
}

/// The client's link to its room.
///
/// There is no transport here: outgoing messages are encoded and queued in an outbox for
/// whatever carries them, and incoming payloads are handed to [`Network::decode`].
pub struct Network {
	server_url: String,
	room: String,
	connected: Cell<bool>,
	outbox: RefCell<VecDeque<String>>,
}

impl Network {
	pub fn new(config: &AppConfig) -> Network {
		return Network {
			server_url: String::clone(&config.server_url),
			room: String::clone(&config.room),
			connected: Cell::new(false),
			outbox: RefCell::new(VecDeque::new()),
		};
	}

	pub fn server_url(&self) -> &str {
		return &self.server_url;
	}

	pub fn room(&self) -> &str {
		return &self.room;
	}

	pub fn connect(&self) {
		if !self.connected.replace(true) {
			info!(server_url = %self.server_url, room = %self.room, "joined room");
		}
	}

	/// Leaves the room. Messages already queued stay in the outbox.
	pub fn disconnect(&self) {
		if self.connected.replace(false) {
			info!(room = %self.room, "left room");
		}
	}

	pub fn is_connected(&self) -> bool {
		return self.connected.get();
	}

	/// Encodes a roll for the room and queues it for delivery
	pub fn publish(&self, record: &RollRecord) -> Result<(), NetworkError> {
		if !self.is_connected() {
			return Err(NetworkError::Disconnected);
		}
		let message = RoomMessage::Roll {
			room: String::clone(&self.room),
			record: record.clone(),
		};
		let payload = serde_json::to_string(&message)?;
		debug!(room = %self.room, id = %record.id, "queued roll");
		self.outbox.borrow_mut().push_back(payload);
		return Ok(());
	}

	/// Takes every queued payload, oldest first
	pub fn drain_outbox(&self) -> Vec<String> {
		return self.outbox.borrow_mut().drain(..).collect();
	}

	pub fn pending(&self) -> usize {
		return self.outbox.borrow().len();
	}

	/// Decodes a payload received from the room. Messages addressed to another room are rejected.
	pub fn decode(&self, payload: &str) -> Result<RoomMessage, NetworkError> {
		let message: RoomMessage = serde_json::from_str(payload)?;
		if message.room() != self.room {
			return Err(NetworkError::WrongRoom {
				expected: String::clone(&self.room),
				found: String::from(message.room()),
			});
		}
		return Ok(message);
	}
}

#[derive(Debug, Error)]
pub enum NetworkError {
	#[error("not connected to a room")]
	Disconnected,

	#[error("couldn't encode or decode room message: {0}")]
	Encoding(#[from] serde_json::Error),

	#[error("message for room {found:?} received in room {expected:?}")]
	WrongRoom {
		expected: String,
		found: String,
	},
}
