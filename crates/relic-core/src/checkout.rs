//! Materializing a tree object as files and directories on disk.

use crate::{CoreError, Object, ObjectStore, Result, Tree, TreeEntryKind};
use std::fs;
use std::path::Path;

/// Writes a tree's contents under `dest`.
///
/// The destination must not exist (it is created) or must be an empty
/// directory; anything else fails `PreconditionFailed` before any
/// write. Subtree entries recurse, blob entries are written verbatim,
/// symlink entries fail `Unsupported` rather than silently writing
/// link-target text as file content, and embedded-repository entries
/// are skipped.
pub fn checkout(store: &ObjectStore, tree: &Tree, dest: impl AsRef<Path>) -> Result<()> {
    let dest = dest.as_ref();
    if dest.exists() {
        if !dest.is_dir() {
            return Err(CoreError::PreconditionFailed(format!(
                "{} is not a directory",
                dest.display()
            )));
        }
        if fs::read_dir(dest)?.next().is_some() {
            return Err(CoreError::PreconditionFailed(format!(
                "{} is not empty",
                dest.display()
            )));
        }
    } else {
        fs::create_dir_all(dest)?;
    }

    materialize(store, tree, dest)
}

fn materialize(store: &ObjectStore, tree: &Tree, dir: &Path) -> Result<()> {
    for entry in &tree.entries {
        let target = dir.join(&entry.path);
        match entry.kind()? {
            TreeEntryKind::Subtree => {
                let subtree = match store.read(&entry.target)? {
                    Object::Tree(subtree) => subtree,
                    other => {
                        return Err(CoreError::MalformedEncoding(format!(
                            "{} names a {}, not a tree",
                            entry.target,
                            other.kind()
                        )));
                    }
                };
                fs::create_dir(&target)?;
                materialize(store, &subtree, &target)?;
            }
            TreeEntryKind::Blob => {
                let blob = match store.read(&entry.target)? {
                    Object::Blob(blob) => blob,
                    other => {
                        return Err(CoreError::MalformedEncoding(format!(
                            "{} names a {}, not a blob",
                            entry.target,
                            other.kind()
                        )));
                    }
                };
                fs::write(&target, &blob.data)?;
            }
            TreeEntryKind::Symlink => {
                return Err(CoreError::Unsupported(format!(
                    "symlink entry {} cannot be materialized",
                    entry.path
                )));
            }
            TreeEntryKind::Gitlink => {
                tracing::debug!(path = %entry.path, target = %entry.target, "skipping embedded repository entry");
            }
        }
    }
    Ok(())
}
