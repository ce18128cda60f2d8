use std::rc::Rc;

use diceroll_container::Container;
use tracing::debug;

use crate::{
	config::AppConfig,
	dice_utils::strategy::{
		AdvantageRoll,
		DisadvantageRoll,
		StandardRoll,
		StrategyBook,
	},
	plugins::{
		dice_store::DiceStore,
		network::Network,
	},
};

/// Keys the application's services are registered under
pub mod keys {
	pub const CONFIG: &str = "config";
	pub const NETWORK: &str = "network";
	pub const STRATEGY_STANDARD: &str = "strategy.standard";
	pub const STRATEGY_ADVANTAGE: &str = "strategy.advantage";
	pub const STRATEGY_DISADVANTAGE: &str = "strategy.disadvantage";
	pub const STRATEGIES: &str = "strategies";
	pub const DICE_STORE: &str = "diceStore";
}

/// Registers every application service in a fresh container.
///
/// Only the config and the strategies are built here. The network, the strategy book and the
/// dice store are constructed the first time something asks for them.
pub fn bootstrap(config: AppConfig) -> Container {
	let container = Container::new();
	debug!(room = %config.room, player = %config.player_name, "bootstrapping services");

	container.register_instance(keys::CONFIG, config);

	// The store is registered before its dependencies; only resolution order matters
	container.register(keys::DICE_STORE, |c: &Container| {
		let config = c.get::<AppConfig>(keys::CONFIG)?;
		let network = c.get::<Network>(keys::NETWORK)?;
		let strategies = c.get::<StrategyBook>(keys::STRATEGIES)?;
		return Ok(DiceStore::new(&config, network, strategies));
	});

	container.register(keys::NETWORK, |c: &Container| {
		let config = c.get::<AppConfig>(keys::CONFIG)?;
		let network = Network::new(&config);
		network.connect();
		return Ok(network);
	});

	container.register_instance(keys::STRATEGY_STANDARD, StandardRoll);
	container.register_instance(keys::STRATEGY_ADVANTAGE, AdvantageRoll);
	container.register_instance(keys::STRATEGY_DISADVANTAGE, DisadvantageRoll);

	container.register(keys::STRATEGIES, |c: &Container| {
		let mut book = StrategyBook::new();
		book.insert(c.get::<StandardRoll>(keys::STRATEGY_STANDARD)?);
		book.insert(c.get::<AdvantageRoll>(keys::STRATEGY_ADVANTAGE)?);
		book.insert(c.get::<DisadvantageRoll>(keys::STRATEGY_DISADVANTAGE)?);
		return Ok(book);
	});

	return container;
}

/// Resolves the dice store, building whatever it depends on along the way
pub fn dice_store(container: &Container) -> anyhow::Result<Rc<DiceStore>> {
	return Ok(container.get::<DiceStore>(keys::DICE_STORE)?);
}
