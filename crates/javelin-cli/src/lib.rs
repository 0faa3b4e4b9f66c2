//! Javelin command-line driver
//!
//! Collects TypeScript sources, runs them through the engine's
//! [`Transpiler`](javelin_engine::Transpiler) and writes or prints the
//! resulting Java.

pub mod commands;
pub mod files;
pub mod logging;
pub mod output;
