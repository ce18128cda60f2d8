use serde::{
	Deserialize,
	Serialize,
};
use uuid::Uuid;

use crate::dice_utils::{
	notation::DiceExpression,
	strategy::StrategyKind,
};

/// A single completed roll, either made locally or received from the room
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RollRecord {
	pub id: Uuid,

	/// Name of the player who rolled
	pub player: String,

	pub expression: DiceExpression,
	pub strategy: StrategyKind,

	/// Faces counted toward the total
	pub dice: Vec<u32>,

	/// Faces thrown away by the strategy, if any
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub discarded: Vec<u32>,

	pub total: i64,
}
