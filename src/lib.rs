//! # Configuration Controller Library
//!
//! Persistence and activation engine for cluster configurations and
//! diagnostic triggers, with a thin REST adapter on top.

pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod repositories;
pub mod server;
pub mod storage;
pub mod telemetry;
pub use migration;
