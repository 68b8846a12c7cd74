//! Purpose: Library crate backing the `proc1` CLI and its tests.
//! Exports: `config`, `core` (records, reducer, errors), `logging`, `pipeline`, `trace`.
//! Role: Holds all logic so the binary stays a thin bootstrap.
//! Invariants: No mutable global state beyond the installed log subscriber.
pub mod config;
pub mod core;
mod json;
pub mod logging;
pub mod pipeline;
pub mod trace;
