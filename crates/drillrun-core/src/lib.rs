//! drillrun-core — Timed, gamified disaster-preparedness drills.
//!
//! This crate defines the scenario model, the scoring rules and the drill
//! lifecycle engine. The engine is driven by a [`scheduler::Scheduler`], so it
//! runs the same way on tokio timers and on a simulated clock in tests.

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod outcome;
pub mod parser;
pub mod report;
pub mod scheduler;
pub mod scoring;
pub mod session;
pub mod shuffle;
pub mod snapshot;
pub mod statistics;
