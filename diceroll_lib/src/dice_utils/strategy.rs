use std::{
	fmt,
	rc::Rc,
	str::FromStr,
};

use rand::{
	rngs::StdRng,
	Rng,
};
use rustc_hash::FxHashMap;
use serde::{
	Deserialize,
	Serialize,
};
use thiserror::Error;

use super::notation::DiceExpression;

/// Identifies a rolling strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
	/// Roll once and add everything up
	Standard,

	/// Roll twice and keep the higher total
	Advantage,

	/// Roll twice and keep the lower total
	Disadvantage,
}

impl StrategyKind {
	pub const ALL: [StrategyKind; 3] = [
		StrategyKind::Standard,
		StrategyKind::Advantage,
		StrategyKind::Disadvantage,
	];

	pub fn as_str(&self) -> &'static str {
		return match self {
			StrategyKind::Standard => "standard",
			StrategyKind::Advantage => "advantage",
			StrategyKind::Disadvantage => "disadvantage",
		};
	}
}

impl fmt::Display for StrategyKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		return f.write_str(self.as_str());
	}
}

impl FromStr for StrategyKind {
	type Err = UnknownStrategyError;

	fn from_str(name: &str) -> Result<Self, Self::Err> {
		let name = name.trim().to_ascii_lowercase();
		return match name.as_str() {
			"standard" | "normal" => Ok(StrategyKind::Standard),
			"advantage" | "adv" => Ok(StrategyKind::Advantage),
			"disadvantage" | "dis" => Ok(StrategyKind::Disadvantage),
			other => Err(UnknownStrategyError(String::from(other))),
		};
	}
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown strategy {0:?}")]
pub struct UnknownStrategyError(pub String);

/// Result of applying a strategy to an expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
	/// Faces that count toward the total
	pub dice: Vec<u32>,

	/// Faces the strategy threw away
	pub discarded: Vec<u32>,

	pub total: i64,
}

/// A rule for turning a dice expression into a result
pub trait RollStrategy {
	fn kind(&self) -> StrategyKind;
	fn roll(&self, expression: &DiceExpression, rng: &mut StdRng) -> RollOutcome;
}

fn roll_dice(expression: &DiceExpression, rng: &mut StdRng) -> Vec<u32> {
	return (0..expression.count)
		.map(|_| rng.random_range(1..=expression.sides))
		.collect();
}

fn sum(dice: &[u32], modifier: i32) -> i64 {
	return dice.iter().map(|face| i64::from(*face)).sum::<i64>() + i64::from(modifier);
}

/// Rolls the expression twice, keeping one set. Ties keep the first set.
fn roll_twice(expression: &DiceExpression, rng: &mut StdRng, keep_higher: bool) -> RollOutcome {
	let first = roll_dice(expression, rng);
	let second = roll_dice(expression, rng);
	let first_total = sum(&first, expression.modifier);
	let second_total = sum(&second, expression.modifier);

	let keep_second = if keep_higher {
		second_total > first_total
	} else {
		second_total < first_total
	};
	return if keep_second {
		RollOutcome { dice: second, discarded: first, total: second_total }
	} else {
		RollOutcome { dice: first, discarded: second, total: first_total }
	};
}

pub struct StandardRoll;
impl RollStrategy for StandardRoll {
	fn kind(&self) -> StrategyKind {
		return StrategyKind::Standard;
	}

	fn roll(&self, expression: &DiceExpression, rng: &mut StdRng) -> RollOutcome {
		let dice = roll_dice(expression, rng);
		let total = sum(&dice, expression.modifier);
		return RollOutcome { dice, discarded: Vec::new(), total };
	}
}

pub struct AdvantageRoll;
impl RollStrategy for AdvantageRoll {
	fn kind(&self) -> StrategyKind {
		return StrategyKind::Advantage;
	}

	fn roll(&self, expression: &DiceExpression, rng: &mut StdRng) -> RollOutcome {
		return roll_twice(expression, rng, true);
	}
}

pub struct DisadvantageRoll;
impl RollStrategy for DisadvantageRoll {
	fn kind(&self) -> StrategyKind {
		return StrategyKind::Disadvantage;
	}

	fn roll(&self, expression: &DiceExpression, rng: &mut StdRng) -> RollOutcome {
		return roll_twice(expression, rng, false);
	}
}

/// Lookup table of the strategies available to the dice store
#[derive(Default)]
pub struct StrategyBook {
	strategies: FxHashMap<StrategyKind, Rc<dyn RollStrategy>>,
}

impl StrategyBook {
	pub fn new() -> Self {
		return StrategyBook::default();
	}

	/// Adds a strategy, replacing any other strategy of the same kind
	pub fn insert(&mut self, strategy: Rc<dyn RollStrategy>) {
		self.strategies.insert(strategy.kind(), strategy);
	}

	pub fn get(&self, kind: StrategyKind) -> Option<Rc<dyn RollStrategy>> {
		return self.strategies.get(&kind).cloned();
	}

	pub fn kinds(&self) -> Vec<StrategyKind> {
		return StrategyKind::ALL
			.into_iter()
			.filter(|kind| self.strategies.contains_key(kind))
			.collect();
	}
}
