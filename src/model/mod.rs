//! The data model (§3): cluster snapshot, index abstractions, per-call
//! options and context.
mod abstraction;
mod context;
mod options;
mod snapshot;
mod system;

pub use abstraction::{AliasMember, IndexAbstraction, IndexId, IndexMetadata, IndexState};
pub use context::Context;
pub use options::IndicesOptions;
pub use snapshot::{ClusterSnapshot, DataStreamAlias, InMemorySnapshot};
pub use system::SystemIndexAccessLevel;
