//! Wires the workspace crates (core, proxy, profile, store, engine, api)
//! into a runnable daemon. See `bin/server.rs` and `bin/seed.rs`.

pub mod config;
pub mod logging;
pub mod setup;

pub use config::AppConfig;
