//! Core types and sync engine for the waybill shipment tracker.

/// Bounded, failure-isolating refresh of every in-flight shipment of an owner.
pub mod batch;
/// In-memory record store used by the command line front end and tests.
pub mod memory;
/// Domain models and identifiers shared by the engine and its adapters.
pub mod model;
/// Translation of raw aggregator payloads into canonical snapshots.
pub mod normalize;
/// Traits describing the aggregator and record-store seams.
pub mod ports;
/// High-level service facade used by clients.
pub mod service;
/// Policy deciding which identifiers never reach the aggregator.
pub mod skip;
/// Single-shipment create-or-fetch orchestration.
pub mod sync;

pub use batch::*;
pub use memory::*;
pub use model::*;
pub use normalize::*;
pub use ports::*;
pub use service::*;
pub use skip::*;
pub use sync::*;

#[cfg(test)]
mod test_support;
