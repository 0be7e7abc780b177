//! Kyoku game driver
//!
//! Runs complete matches on top of `kyoku-engine`: a policy-driven game loop
//! and a rayon batch simulator for throughput runs and soak testing.

pub mod game_loop;
pub mod simulator;
