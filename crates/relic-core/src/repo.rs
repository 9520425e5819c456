//! Repository discovery, creation, and layout.

use crate::{CoreError, ObjectStore, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the metadata directory at the worktree root.
pub const METADATA_DIR: &str = ".relic";

const FORMAT_VERSION: u32 = 0;

/// A repository: a worktree root paired with its metadata directory.
///
/// There is no process-wide state; every operation takes the handle
/// explicitly. The handle owns nothing open — it is a pair of
/// validated paths.
#[derive(Debug, Clone)]
pub struct Repository {
    worktree: PathBuf,
    metadata: PathBuf,
}

impl Repository {
    /// Creates a new repository at `path`.
    ///
    /// The path must be a directory (created if absent); an existing
    /// non-empty metadata directory fails `PreconditionFailed`.
    pub fn init(path: impl AsRef<Path>) -> Result<Self> {
        let worktree = path.as_ref().to_path_buf();
        if worktree.exists() && !worktree.is_dir() {
            return Err(CoreError::PreconditionFailed(format!(
                "{} is not a directory",
                worktree.display()
            )));
        }

        let metadata = worktree.join(METADATA_DIR);
        if metadata.exists() && fs::read_dir(&metadata)?.next().is_some() {
            return Err(CoreError::PreconditionFailed(format!(
                "{} is not empty",
                metadata.display()
            )));
        }

        for dir in ["branches", "objects", "refs/tags", "refs/heads"] {
            fs::create_dir_all(metadata.join(dir))?;
        }
        fs::write(
            metadata.join("description"),
            "Unnamed repository; edit this file 'description' to name the repository.\n",
        )?;
        fs::write(metadata.join("HEAD"), "ref: refs/heads/master\n")?;
        fs::write(metadata.join("config"), default_config())?;

        tracing::info!(path = %worktree.display(), "initialized empty repository");
        Ok(Self { worktree, metadata })
    }

    /// Opens the repository whose worktree is `path`, validating the
    /// format-version marker before any store call.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let worktree = path.as_ref().to_path_buf();
        let metadata = worktree.join(METADATA_DIR);
        if !metadata.is_dir() {
            return Err(CoreError::NotFound(format!(
                "no repository at {}",
                worktree.display()
            )));
        }

        let version = read_format_version(&metadata.join("config"))?;
        if version != FORMAT_VERSION {
            return Err(CoreError::UnsupportedFormatVersion(version));
        }
        Ok(Self { worktree, metadata })
    }

    /// Walks ancestor directories from `start` until one contains a
    /// metadata directory; fails `NotFound` at the filesystem root.
    pub fn discover(start: impl AsRef<Path>) -> Result<Self> {
        let mut path = fs::canonicalize(start.as_ref())?;
        loop {
            if path.join(METADATA_DIR).is_dir() {
                return Self::open(&path);
            }
            if !path.pop() {
                return Err(CoreError::NotFound(
                    "no repository in this or any parent directory".to_string(),
                ));
            }
        }
    }

    /// Returns the worktree root.
    pub fn worktree(&self) -> &Path {
        &self.worktree
    }

    /// Returns the metadata directory.
    pub fn metadata(&self) -> &Path {
        &self.metadata
    }

    /// Returns the object store rooted in this repository.
    pub fn objects(&self) -> ObjectStore {
        ObjectStore::new(self.metadata.join("objects"))
    }
}

fn default_config() -> String {
    format!(
        "[core]\n\
         repositoryformatversion = {FORMAT_VERSION}\n\
         filemode = false\n\
         bare = false\n"
    )
}

/// Extracts the `repositoryformatversion` marker. The config file
/// format itself belongs to an external collaborator; only the
/// version line is interpreted here.
fn read_format_version(config: &Path) -> Result<u32> {
    let text = match fs::read_to_string(config) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(CoreError::Corrupt(format!(
                "missing config file {}",
                config.display()
            )));
        }
        Err(e) => return Err(e.into()),
    };

    for line in text.lines() {
        let Some((key, value)) = line.split_once('=') else {
            continue;
        };
        if key.trim() == "repositoryformatversion" {
            return value.trim().parse().map_err(|_| {
                CoreError::MalformedEncoding(format!(
                    "bad repositoryformatversion: {}",
                    value.trim()
                ))
            });
        }
    }
    Err(CoreError::MalformedEncoding(
        "config has no repositoryformatversion".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_creates_layout() {
        let dir = tempfile::tempdir().unwrap();
        let repo = Repository::init(dir.path().join("proj")).unwrap();

        let metadata = repo.metadata();
        assert!(metadata.join("objects").is_dir());
        assert!(metadata.join("refs/heads").is_dir());
        assert!(metadata.join("refs/tags").is_dir());
        assert!(metadata.join("branches").is_dir());
        assert_eq!(
            fs::read_to_string(metadata.join("HEAD")).unwrap(),
            "ref: refs/heads/master\n"
        );
        assert!(fs::read_to_string(metadata.join("config"))
            .unwrap()
            .contains("repositoryformatversion = 0"));
    }

    #[test]
    fn test_init_twice_fails_precondition() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("proj");
        Repository::init(&path).unwrap();
        assert!(matches!(
            Repository::init(&path).unwrap_err(),
            CoreError::PreconditionFailed(_)
        ));
    }

    #[test]
    fn test_init_on_file_fails_precondition() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain");
        fs::write(&path, "not a directory").unwrap();
        assert!(matches!(
            Repository::init(&path).unwrap_err(),
            CoreError::PreconditionFailed(_)
        ));
    }

    #[test]
    fn test_discover_from_nested_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        Repository::init(&root).unwrap();
        let nested = root.join("src").join("deep");
        fs::create_dir_all(&nested).unwrap();

        let repo = Repository::discover(&nested).unwrap();
        assert_eq!(
            repo.worktree().file_name().unwrap().to_str().unwrap(),
            "proj"
        );
    }

    #[test]
    fn test_discover_outside_repository_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Repository::discover(dir.path()).unwrap_err(),
            CoreError::NotFound(_)
        ));
    }

    #[test]
    fn test_unsupported_format_version() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("proj");
        let repo = Repository::init(&root).unwrap();
        fs::write(
            repo.metadata().join("config"),
            "[core]\nrepositoryformatversion = 1\n",
        )
        .unwrap();

        assert!(matches!(
            Repository::open(&root).unwrap_err(),
            CoreError::UnsupportedFormatVersion(1)
        ));
    }

    #[test]
    fn test_open_without_metadata_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            Repository::open(dir.path()).unwrap_err(),
            CoreError::NotFound(_)
        ));
    }
}
