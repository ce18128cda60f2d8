pub mod dice_store;
pub mod network;
