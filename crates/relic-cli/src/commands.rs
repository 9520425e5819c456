//! CLI command implementations.

use anyhow::{bail, Context, Result};
use relic_core::{
    walk, Commit, HistoryVisitor, Object, ObjectId, ObjectKind, ObjectStore, Repository,
    TreeEntryKind,
};
use std::io::Write;
use std::path::Path;

/// Initialize a new repository.
pub fn init(path: &Path) -> Result<()> {
    let repo = Repository::init(path)?;
    println!(
        "Initialized empty Relic repository in {}",
        repo.metadata().display()
    );
    Ok(())
}

/// Hash a file as an object, writing it to the store with `-w`.
pub fn hash_object(write: bool, kind: &str, path: &Path) -> Result<()> {
    let kind = ObjectKind::parse(kind)?;
    let data =
        std::fs::read(path).with_context(|| format!("reading {}", path.display()))?;
    let object = Object::decode(kind, &data)
        .with_context(|| format!("{} does not parse as a {kind}", path.display()))?;

    let id = if write {
        let repo = Repository::discover(".")?;
        repo.objects().write(&object)?
    } else {
        object.id()
    };
    println!("{id}");
    Ok(())
}

/// Print a stored object's payload to stdout.
pub fn cat_file(kind: &str, object: &str) -> Result<()> {
    let expected = ObjectKind::parse(kind)?;
    let repo = Repository::discover(".")?;
    let object = repo.objects().read(&ObjectId::from_hex(object)?)?;
    if object.kind() != expected {
        bail!("object is a {}, not a {expected}", object.kind());
    }
    std::io::stdout().write_all(&object.encode())?;
    Ok(())
}

/// Emit a commit's ancestry as a Graphviz digraph.
pub fn log(commit: &str) -> Result<()> {
    let repo = Repository::discover(".")?;
    let start = ObjectId::from_hex(commit)?;

    let stdout = std::io::stdout();
    let mut emitter = GraphvizEmitter {
        out: stdout.lock(),
    };
    println!("digraph reliclog{{");
    println!("  node[shape=rect]");
    walk(&repo.objects(), start, &mut emitter)?;
    println!("}}");
    Ok(())
}

/// A graph-description emitter over the walker's callbacks.
struct GraphvizEmitter<W: Write> {
    out: W,
}

impl<W: Write> HistoryVisitor for GraphvizEmitter<W> {
    fn node(&mut self, id: &ObjectId, commit: &Commit) -> relic_core::Result<()> {
        let message = String::from_utf8_lossy(commit.message());
        let message = message
            .trim()
            .replace('\\', "\\\\")
            .replace('"', "\\\"");
        // Keep only the first line.
        let message = message.lines().next().unwrap_or("");
        let hex = id.to_hex();
        writeln!(self.out, "  c_{hex} [label=\"{}: {message}\"]", &hex[..7])?;
        Ok(())
    }

    fn edge(&mut self, from: &ObjectId, to: &ObjectId) -> relic_core::Result<()> {
        writeln!(self.out, "  c_{from} -> c_{to};")?;
        Ok(())
    }
}

/// Pretty-print a tree object, one entry per line.
pub fn ls_tree(recursive: bool, tree: &str) -> Result<()> {
    let repo = Repository::discover(".")?;
    let store = repo.objects();
    print_tree(&store, &ObjectId::from_hex(tree)?, recursive, Path::new(""))
}

fn print_tree(store: &ObjectStore, id: &ObjectId, recursive: bool, prefix: &Path) -> Result<()> {
    let tree = match store.read(id)? {
        Object::Tree(tree) => tree,
        other => bail!("{id} is a {}, not a tree", other.kind()),
    };

    for entry in &tree.entries {
        let kind = entry.kind()?;
        if recursive && kind == TreeEntryKind::Subtree {
            print_tree(store, &entry.target, recursive, &prefix.join(&entry.path))?;
            continue;
        }
        let kind_name = match kind {
            TreeEntryKind::Subtree => "tree",
            // A symlink's blob holds the link target text.
            TreeEntryKind::Blob | TreeEntryKind::Symlink => "blob",
            TreeEntryKind::Gitlink => "commit",
        };
        println!(
            "{} {kind_name} {}\t{}",
            entry.mode,
            entry.target,
            prefix.join(&entry.path).display()
        );
    }
    Ok(())
}

/// Materialize a commit or tree inside an empty directory.
pub fn checkout(object: &str, path: &Path) -> Result<()> {
    let repo = Repository::discover(".")?;
    let store = repo.objects();

    let tree = match store.read(&ObjectId::from_hex(object)?)? {
        Object::Commit(commit) => match store.read(&commit.tree()?)? {
            Object::Tree(tree) => tree,
            other => bail!("commit tree is a {}, not a tree", other.kind()),
        },
        Object::Tree(tree) => tree,
        other => bail!("cannot check out a {}", other.kind()),
    };

    relic_core::checkout(&store, &tree, path)?;
    tracing::info!(path = %path.display(), "checkout complete");
    Ok(())
}
