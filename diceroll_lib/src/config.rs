use std::{
	fs,
	io,
	path::Path,
};

use serde::{
	Deserialize,
	Serialize,
};
use thiserror::Error;

use crate::dice_utils::strategy::StrategyKind;

/// Largest accepted `history_limit`
pub const MAX_HISTORY_LIMIT: usize = 10_000;

/// Application-wide settings, registered in the container under `keys::CONFIG`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
	/// Address of the room server. Only used to label outgoing messages.
	pub server_url: String,

	/// The room this client rolls in
	pub room: String,

	/// Name attached to every roll made by this client
	pub player_name: String,

	/// Maximum number of rolls kept in the store's history, between 1 and [`MAX_HISTORY_LIMIT`]
	pub history_limit: usize,

	/// Upper bound on the dice count of a single expression
	pub max_dice: u32,

	/// Upper bound on the faces of a single die
	pub max_sides: u32,

	/// Strategy used when a roll doesn't ask for one
	pub default_strategy: StrategyKind,

	/// Fixed RNG seed. Rolls are seeded from the OS when absent.
	pub seed: Option<u64>,
}

impl Default for AppConfig {
	fn default() -> Self {
		return AppConfig {
			server_url: String::from("ws://localhost:3000"),
			room: String::from("lobby"),
			player_name: String::from("anonymous"),
			history_limit: 100,
			max_dice: 100,
			max_sides: 1000,
			default_strategy: StrategyKind::Standard,
			seed: None,
		};
	}
}

impl AppConfig {
	/// Parses a JSON document. Missing fields take their default values.
	pub fn from_json(json: &str) -> Result<AppConfig, ConfigError> {
		let config: AppConfig = serde_json::from_str(json)?;
		config.validate()?;
		return Ok(config);
	}

	/// Loads the config file at `path`, or the defaults if no path was given
	pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
		return match path {
			Some(path) => {
				let json = fs::read_to_string(path)?;
				AppConfig::from_json(&json)
			},
			None => Ok(AppConfig::default()),
		};
	}

	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.room.trim().is_empty() {
			return Err(ConfigError::Invalid("room must not be empty"));
		}
		if self.player_name.trim().is_empty() {
			return Err(ConfigError::Invalid("player_name must not be empty"));
		}
		if self.history_limit == 0 {
			return Err(ConfigError::Invalid("history_limit must be at least 1"));
		}
		if self.history_limit > MAX_HISTORY_LIMIT {
			return Err(ConfigError::Invalid("history_limit must be at most 10000"));
		}
		if self.max_dice == 0 {
			return Err(ConfigError::Invalid("max_dice must be at least 1"));
		}
		if self.max_sides < 2 {
			return Err(ConfigError::Invalid("max_sides must be at least 2"));
		}
		return Ok(());
	}
}

/// An error returned while loading the application config
#[derive(Debug, Error)]
pub enum ConfigError {
	#[error("couldn't read config file: {0}")]
	Io(#[from] io::Error),

	#[error("couldn't parse config: {0}")]
	Parse(#[from] serde_json::Error),

	#[error("invalid config: {0}")]
	Invalid(&'static str),
}
