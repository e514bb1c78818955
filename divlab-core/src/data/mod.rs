//! Snapshot loading and normalization

pub mod canonicalize;
pub mod loader;
pub mod provider;
pub mod schema;
pub mod universe;

pub use canonicalize::canonicalize_events;
pub use loader::load_record;
pub use provider::{DataError, DirectorySource, MemorySource, SnapshotKind, SnapshotSource};
pub use universe::{Universe, UniverseError};
