//! Fixed-depth minimax chess engine with alpha-beta pruning.
//!
//! - [`board`]: position interface the search runs on, and its chess implementation
//! - [`agent::ai`]: evaluation, move ordering, sequential and parallel root search
//! - [`agent::player`]: engine and reference-engine players
//! - [`oracle`]: UCI client for an external reference engine
//! - [`metrics`]: per-move comparison against the reference engine
//! - [`orchestrator`]: game loop

pub mod agent;
pub mod board;
pub mod metrics;
pub mod oracle;
pub mod orchestrator;
