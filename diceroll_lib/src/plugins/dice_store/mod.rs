mod roll_receiver;
mod seen_ids;
mod types;

use std::{
	cell::RefCell,
	collections::VecDeque,
	rc::Rc,
	sync::Arc,
};

use rand::{
	rngs::StdRng,
	SeedableRng,
};
use thiserror::Error;
use tokio::sync::broadcast::{
	self,
	Sender,
};
use tracing::{
	debug,
	trace,
};
use uuid::Uuid;

use super::network::{
	Network,
	NetworkError,
	RoomMessage,
};
use crate::{
	config::{
		AppConfig,
		MAX_HISTORY_LIMIT,
	},
	dice_utils::{
		notation::{
			DiceExpression,
			ParseDiceError,
		},
		strategy::{
			StrategyBook,
			StrategyKind,
		},
	},
};
pub use roll_receiver::{
	RollEvent,
	RollReceiver,
};
use seen_ids::SeenIds;
pub use types::RollRecord;

/// How many roll ids are remembered for duplicate detection. Never below `MAX_HISTORY_LIMIT`,
/// so every roll still in the history is also remembered.
const SEEN_ID_LIMIT: usize = 2 * MAX_HISTORY_LIMIT;

/// Holds the room's roll history and hands out the live roll feed.
///
/// Local rolls are made through [`DiceStore::roll`]; rolls from other players arrive through
/// [`DiceStore::receive`]. Both end up in the history and on the feed.
pub struct DiceStore {
	player: String,
	max_dice: u32,
	max_sides: u32,
	default_strategy: StrategyKind,
	history_limit: usize,
	network: Rc<Network>,
	strategies: Rc<StrategyBook>,
	rng: RefCell<StdRng>,
	history: RefCell<VecDeque<Arc<RollRecord>>>,
	seen: RefCell<SeenIds>,
	feed: Sender<Arc<RollRecord>>,
}

impl DiceStore {
	pub fn new(config: &AppConfig, network: Rc<Network>, strategies: Rc<StrategyBook>) -> DiceStore {
		let rng = match config.seed {
			Some(seed) => StdRng::seed_from_u64(seed),
			None => StdRng::from_os_rng(),
		};
		// `validate` enforces the same range; configs built in code may skip it
		let history_limit = config.history_limit.clamp(1, MAX_HISTORY_LIMIT);
		let (feed, _) = broadcast::channel(history_limit);
		return DiceStore {
			player: String::clone(&config.player_name),
			max_dice: config.max_dice,
			max_sides: config.max_sides,
			default_strategy: config.default_strategy,
			history_limit,
			network,
			strategies,
			rng: RefCell::new(rng),
			history: RefCell::new(VecDeque::new()),
			seen: RefCell::new(SeenIds::new(SEEN_ID_LIMIT)),
			feed,
		};
	}

	/// Rolls `notation` with `strategy`, or the configured default strategy when `None`.
	///
	/// The roll is recorded, sent to the room if the network is connected, and broadcast to
	/// subscribers.
	pub fn roll(&self, notation: &str, strategy: Option<StrategyKind>) -> Result<Arc<RollRecord>, RollError> {
		let expression = DiceExpression::parse(notation)?;
		if expression.count > self.max_dice {
			return Err(RollError::TooManyDice {
				count: expression.count,
				max: self.max_dice,
			});
		}
		if expression.sides > self.max_sides {
			return Err(RollError::TooManySides {
				sides: expression.sides,
				max: self.max_sides,
			});
		}

		let kind = strategy.unwrap_or(self.default_strategy);
		let strategy = self.strategies.get(kind).ok_or(RollError::UnknownStrategy(kind))?;
		let outcome = strategy.roll(&expression, &mut self.rng.borrow_mut());

		let record = RollRecord {
			id: Uuid::new_v4(),
			player: String::clone(&self.player),
			expression,
			strategy: kind,
			dice: outcome.dice,
			discarded: outcome.discarded,
			total: outcome.total,
		};
		debug!(id = %record.id, expression = %record.expression, strategy = %kind, total = record.total, "rolled");

		if self.network.is_connected() {
			self.network.publish(&record)?;
		}
		return Ok(self.record(record));
	}

	/// Accepts a roll message from the room. Returns `None` if the roll was recorded before,
	/// which is the case for echoes of this client's own rolls. This holds after the roll has
	/// left the history, for the last `SEEN_ID_LIMIT` rolls.
	pub fn receive(&self, payload: &str) -> Result<Option<Arc<RollRecord>>, RollError> {
		let record = match self.network.decode(payload)? {
			RoomMessage::Roll { record, .. } => record,
		};
		if self.seen.borrow().contains(&record.id) {
			trace!(id = %record.id, "ignored duplicate roll");
			return Ok(None);
		}
		debug!(id = %record.id, player = %record.player, "received roll");
		return Ok(Some(self.record(record)));
	}

	/// Recorded rolls, oldest first
	pub fn history(&self) -> Vec<Arc<RollRecord>> {
		return self.history.borrow().iter().cloned().collect();
	}

	pub fn last(&self) -> Option<Arc<RollRecord>> {
		return self.history.borrow().back().cloned();
	}

	/// Forgets the recorded rolls. Their ids are still remembered for duplicate detection.
	pub fn clear_history(&self) {
		self.history.borrow_mut().clear();
	}

	/// Subscribes to rolls recorded from now on
	pub fn subscribe(&self) -> RollReceiver {
		return RollReceiver::new(self.feed.subscribe());
	}

	pub fn network(&self) -> &Rc<Network> {
		return &self.network;
	}

	fn record(&self, record: RollRecord) -> Arc<RollRecord> {
		let record = Arc::new(record);
		self.seen.borrow_mut().insert(record.id);
		{
			let mut history = self.history.borrow_mut();
			history.push_back(Arc::clone(&record));
			while history.len() > self.history_limit {
				history.pop_front();
			}
		}
		// Nobody listening is fine
		let _ = self.feed.send(Arc::clone(&record));
		return record;
	}
}

/// An error returned when a roll can't be made or accepted
#[derive(Debug, Error)]
pub enum RollError {
	#[error(transparent)]
	Parse(#[from] ParseDiceError),

	#[error("can't roll {count} dice at once (limit is {max})")]
	TooManyDice {
		count: u32,
		max: u32,
	},

	#[error("can't roll a die with {sides} sides (limit is {max})")]
	TooManySides {
		sides: u32,
		max: u32,
	},

	#[error("no {0} strategy is available")]
	UnknownStrategy(StrategyKind),

	#[error(transparent)]
	Network(#[from] NetworkError),
}
