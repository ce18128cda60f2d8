pub mod config;
pub mod dice_utils;
pub mod init;
pub mod plugins;

#[cfg(test)]
mod tests;

pub use diceroll_container::*;
pub use init::{
	bootstrap,
	dice_store,
	keys,
};
