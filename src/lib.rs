//! Riot TFT data acquisition and leaderboard reconciliation.
//!
//! The read path resolves a summoner, its recent match ids and then every
//! match payload concurrently. The write path keeps a key-value table aligned
//! with the remote challenger leaderboard.

pub mod config;
pub mod db;
pub mod error;
pub mod loader;
pub mod logging;
pub mod poller;
pub mod riot;
pub mod secrets;
pub mod server;

#[cfg(test)]
mod testing;

pub use error::AppError;
