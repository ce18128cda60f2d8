use std::{
	fmt,
	str::FromStr,
};

use serde::{
	Deserialize,
	Serialize,
};
use thiserror::Error;

/// A parsed dice expression such as `4d6+2`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiceExpression {
	pub count: u32,
	pub sides: u32,
	pub modifier: i32,
}

impl DiceExpression {
	pub fn new(count: u32, sides: u32, modifier: i32) -> Result<DiceExpression, ParseDiceError> {
		if count == 0 {
			return Err(ParseDiceError::NoDice);
		}
		if sides < 2 {
			return Err(ParseDiceError::TooFewSides(sides));
		}
		return Ok(DiceExpression { count, sides, modifier });
	}

	/// Parses standard dice notation: an optional count, `d`, the number of sides, and an
	/// optional signed modifier. Case and whitespace are ignored, so `" 2D6 + 1 "` is `2d6+1`.
	pub fn parse(input: &str) -> Result<DiceExpression, ParseDiceError> {
		let normalized: String = input
			.chars()
			.filter(|c| !c.is_whitespace())
			.collect::<String>()
			.to_ascii_lowercase();
		if normalized.is_empty() {
			return Err(ParseDiceError::Empty);
		}

		let (count, rest) = normalized.split_once('d').ok_or(ParseDiceError::MissingSeparator)?;
		let count = if count.is_empty() {
			1
		} else {
			count.parse::<u32>().map_err(|_| ParseDiceError::InvalidCount(String::from(count)))?
		};

		let (sides, modifier) = match rest.find(|c: char| c == '+' || c == '-') {
			Some(index) => rest.split_at(index),
			None => (rest, ""),
		};
		let sides = sides.parse::<u32>().map_err(|_| ParseDiceError::InvalidSides(String::from(sides)))?;
		let modifier = if modifier.is_empty() {
			0
		} else {
			modifier.parse::<i32>().map_err(|_| ParseDiceError::InvalidModifier(String::from(modifier)))?
		};

		return DiceExpression::new(count, sides, modifier);
	}
}

impl FromStr for DiceExpression {
	type Err = ParseDiceError;

	fn from_str(input: &str) -> Result<Self, Self::Err> {
		return DiceExpression::parse(input);
	}
}

impl fmt::Display for DiceExpression {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}d{}", self.count, self.sides)?;
		if self.modifier > 0 {
			write!(f, "+{}", self.modifier)?;
		} else if self.modifier < 0 {
			write!(f, "{}", self.modifier)?;
		}
		return Ok(());
	}
}

/// An error returned when dice notation can't be understood
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseDiceError {
	#[error("no dice expression given")]
	Empty,

	#[error("expected a `d` between the dice count and the number of sides")]
	MissingSeparator,

	#[error("invalid dice count: {0:?}")]
	InvalidCount(String),

	#[error("invalid number of sides: {0:?}")]
	InvalidSides(String),

	#[error("invalid modifier: {0:?}")]
	InvalidModifier(String),

	#[error("at least one die must be rolled")]
	NoDice,

	#[error("a die needs at least 2 sides, got {0}")]
	TooFewSides(u32),
}
