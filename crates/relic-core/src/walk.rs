//! History traversal over the commit graph.

use crate::{Commit, CoreError, Object, ObjectId, ObjectStore, Result};
use std::collections::HashSet;

/// Callbacks fed by [`walk`]: one per first-visited commit, one per
/// parent edge. A graph-description emitter is the typical consumer.
pub trait HistoryVisitor {
    /// Called once per commit, in depth-first order from the start.
    fn node(&mut self, id: &ObjectId, commit: &Commit) -> Result<()>;

    /// Called for every parent link of a visited commit, in header
    /// order. The parent may or may not have been visited yet.
    fn edge(&mut self, from: &ObjectId, to: &ObjectId) -> Result<()>;
}

/// Walks parent links from `start`, visiting each commit at most
/// once.
///
/// A visited set guards the shared ancestors of merge histories.
/// Termination follows from content addressing: a commit's digest
/// covers its parent references, so no commit can name itself or a
/// descendant. The traversal is read-only and uses an explicit
/// worklist, so header-heavy histories cannot exhaust the call
/// stack.
pub fn walk(
    store: &ObjectStore,
    start: ObjectId,
    visitor: &mut dyn HistoryVisitor,
) -> Result<()> {
    let mut seen: HashSet<ObjectId> = HashSet::new();
    let mut pending = vec![start];

    while let Some(id) = pending.pop() {
        if !seen.insert(id) {
            continue;
        }

        let commit = match store.read(&id)? {
            Object::Commit(commit) => commit,
            other => {
                return Err(CoreError::MalformedEncoding(format!(
                    "{id} is a {}, not a commit",
                    other.kind()
                )));
            }
        };

        visitor.node(&id, &commit)?;

        let parents = commit.parents()?;
        for parent in &parents {
            visitor.edge(&id, parent)?;
        }
        // Reverse push so the first parent is expanded first.
        for parent in parents.into_iter().rev() {
            if !seen.contains(&parent) {
                pending.push(parent);
            }
        }
    }
    Ok(())
}
