//! Durable storage adapters.

pub mod snapshot;

pub use snapshot::JsonSnapshotRepository;
