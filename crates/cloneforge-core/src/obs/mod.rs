//! Observability boundary.
//!
//! The engine never logs directly; every notable transition is reported as an
//! `EngineEvent` to the `EventSink` it was built with.

pub mod sink;

pub use sink::*;
