pub mod arbitrage;
pub mod cooldown;

pub use arbitrage::ArbitrageDetector;
pub use cooldown::CooldownStore;
