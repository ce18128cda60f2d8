pub mod notation;
pub mod strategy;
