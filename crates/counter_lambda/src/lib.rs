//! Lambda entry point for the visitor counter.
//!
//! Handlers turn HTTP API events into JSON envelopes and talk to the counter
//! record only through the `CounterStore` trait; the DynamoDB implementation
//! and table-name lookup live alongside them. Shared contract and routing
//! types come from `counter_core` via `runtime`.

pub mod adapters;
pub mod config;
pub mod handlers;
pub mod runtime;
