//! Content-addressed object storage and history core for Relic.
//!
//! This crate implements the object database shared by every Relic
//! command: durable, deduplicated storage of blobs, trees, commits,
//! and tags, each addressed by the SHA-1 of its canonical encoding,
//! plus the algorithms that interpret trees as directory structures
//! and commits as a history graph.

mod checkout;
mod commit;
mod error;
mod kvlm;
mod object;
mod repo;
mod store;
mod tree;
mod walk;

pub use checkout::checkout;
pub use commit::{Commit, Tag};
pub use error::CoreError;
pub use kvlm::Kvlm;
pub use object::{Blob, Object, ObjectId, ObjectKind};
pub use repo::Repository;
pub use store::ObjectStore;
pub use tree::{Tree, TreeEntry, TreeEntryKind};
pub use walk::{walk, HistoryVisitor};

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
