use std::rc::Rc;

use super::seeded_config;
use crate::{
	config::AppConfig,
	dice_utils::{
		notation::ParseDiceError,
		strategy::{
			AdvantageRoll,
			StandardRoll,
			StrategyBook,
			StrategyKind,
		},
	},
	plugins::{
		dice_store::{
			DiceStore,
			RollError,
			RollEvent,
		},
		network::{
			Network,
			NetworkError,
			RoomMessage,
		},
	},
};

fn store_with(config: &AppConfig) -> DiceStore {
	let network = Rc::new(Network::new(config));
	network.connect();
	let mut strategies = StrategyBook::new();
	strategies.insert(Rc::new(StandardRoll));
	strategies.insert(Rc::new(AdvantageRoll));
	return DiceStore::new(config, network, Rc::new(strategies));
}

#[test]
fn roll_records_and_publishes() {
	let config = seeded_config();
	let store = store_with(&config);

	let record = store.roll("3d6+1", None).unwrap();
	assert_eq!(record.player, config.player_name);
	assert_eq!(record.strategy, StrategyKind::Standard);
	assert_eq!(record.dice.len(), 3);
	assert_eq!(record.expression.to_string(), "3d6+1");

	assert_eq!(store.history().len(), 1);
	assert_eq!(store.last().unwrap().id, record.id);

	let outbox = store.network().drain_outbox();
	assert_eq!(outbox.len(), 1);
	match store.network().decode(&outbox[0]).unwrap() {
		RoomMessage::Roll { room, record: sent } => {
			assert_eq!(room, config.room);
			assert_eq!(sent, *record);
		},
	}
}

#[test]
fn explicit_strategy_overrides_default() {
	let store = store_with(&seeded_config());
	let record = store.roll("1d20", Some(StrategyKind::Advantage)).unwrap();
	assert_eq!(record.strategy, StrategyKind::Advantage);
	assert_eq!(record.discarded.len(), 1);
}

#[test]
fn unavailable_strategy_is_an_error() {
	let store = store_with(&seeded_config());
	let result = store.roll("1d20", Some(StrategyKind::Disadvantage));
	assert!(matches!(result, Err(RollError::UnknownStrategy(StrategyKind::Disadvantage))));
	assert!(store.history().is_empty());
}

#[test]
fn limits_are_enforced() {
	let config = AppConfig {
		max_dice: 10,
		max_sides: 20,
		..seeded_config()
	};
	let store = store_with(&config);

	assert!(matches!(store.roll("11d6", None), Err(RollError::TooManyDice { count: 11, max: 10 })));
	assert!(matches!(store.roll("1d100", None), Err(RollError::TooManySides { sides: 100, max: 20 })));
	assert!(matches!(store.roll("banana", None), Err(RollError::Parse(ParseDiceError::MissingSeparator))));
	assert!(store.history().is_empty());
	assert_eq!(store.network().pending(), 0);
}

#[test]
fn history_is_bounded() {
	let config = AppConfig {
		history_limit: 3,
		..seeded_config()
	};
	let store = store_with(&config);
	let ids: Vec<_> = (0..5).map(|_| store.roll("1d6", None).unwrap().id).collect();

	let kept: Vec<_> = store.history().iter().map(|record| record.id).collect();
	assert_eq!(kept, ids[2..].to_vec());

	store.clear_history();
	assert!(store.history().is_empty());
	assert!(store.last().is_none());
}

#[test]
fn offline_rolls_stay_local() {
	let store = store_with(&seeded_config());
	store.network().disconnect();

	store.roll("1d6", None).unwrap();
	assert_eq!(store.history().len(), 1);
	assert_eq!(store.network().pending(), 0);
	assert!(matches!(
		store.network().publish(&store.history()[0]),
		Err(NetworkError::Disconnected)
	));
}

#[test]
fn remote_rolls_are_received_once() {
	let alice = store_with(&AppConfig {
		player_name: String::from("alice"),
		..seeded_config()
	});
	let bob = store_with(&AppConfig {
		player_name: String::from("bob"),
		..seeded_config()
	});

	let rolled = alice.roll("2d8", None).unwrap();
	let payload = alice.network().drain_outbox().remove(0);

	let received = bob.receive(&payload).unwrap().unwrap();
	assert_eq!(received.player, "alice");
	assert_eq!(*received, *rolled);
	assert!(bob.receive(&payload).unwrap().is_none());

	// Alice hears her own roll echoed back
	assert!(alice.receive(&payload).unwrap().is_none());
	assert_eq!(alice.history().len(), 1);
}

#[test]
fn echoes_stay_ignored_once_out_of_history() {
	let config = AppConfig {
		history_limit: 2,
		..seeded_config()
	};
	let store = store_with(&config);
	for _ in 0..3 {
		store.roll("1d6", None).unwrap();
	}
	let payloads = store.network().drain_outbox();

	// The first roll was trimmed from the history, the others are cleared below
	assert!(store.receive(&payloads[0]).unwrap().is_none());
	store.clear_history();
	for payload in payloads.iter() {
		assert!(store.receive(payload).unwrap().is_none());
	}
	assert!(store.history().is_empty());
}

#[test]
fn oversized_history_limit_is_clamped() {
	let config = AppConfig {
		history_limit: usize::MAX,
		..seeded_config()
	};
	let store = store_with(&config);
	let mut receiver = store.subscribe();

	let record = store.roll("1d6", None).unwrap();
	assert_eq!(store.history().len(), 1);
	match receiver.try_receive() {
		Some(RollEvent::Roll(received)) => assert_eq!(received.id, record.id),
		_ => panic!("expected a roll"),
	}
}

#[test]
fn rolls_for_other_rooms_are_rejected() {
	let tavern = store_with(&AppConfig {
		room: String::from("tavern"),
		..seeded_config()
	});
	let dungeon = store_with(&AppConfig {
		room: String::from("dungeon"),
		..seeded_config()
	});

	tavern.roll("1d4", None).unwrap();
	let payload = tavern.network().drain_outbox().remove(0);
	match dungeon.receive(&payload) {
		Err(RollError::Network(NetworkError::WrongRoom { expected, found })) => {
			assert_eq!(expected, "dungeon");
			assert_eq!(found, "tavern");
		},
		other => panic!("unexpected result: {:?}", other),
	}
	assert!(matches!(dungeon.receive("not json"), Err(RollError::Network(NetworkError::Encoding(_)))));
}

#[tokio::test]
async fn subscribers_see_new_rolls() {
	let store = store_with(&seeded_config());
	let mut receiver = store.subscribe();

	let record = store.roll("1d12", None).unwrap();
	match receiver.receive().await {
		RollEvent::Roll(received) => assert_eq!(received.id, record.id),
		RollEvent::Closed => panic!("feed closed early"),
	}
	assert!(receiver.try_receive().is_none());
}

#[test]
fn lagging_subscriber_skips_to_recent_rolls() {
	let config = AppConfig {
		history_limit: 2,
		..seeded_config()
	};
	let store = store_with(&config);
	let mut receiver = store.subscribe();
	for _ in 0..5 {
		store.roll("1d6", None).unwrap();
	}

	let history = store.history();
	for expected in history.iter() {
		match receiver.try_receive() {
			Some(RollEvent::Roll(received)) => assert_eq!(received.id, expected.id),
			_ => panic!("expected a roll"),
		}
	}
	assert!(receiver.try_receive().is_none());
}

#[test]
fn feed_closes_with_the_store() {
	let store = store_with(&seeded_config());
	let mut receiver = store.subscribe();
	drop(store);
	assert!(matches!(receiver.try_receive(), Some(RollEvent::Closed)));
}
