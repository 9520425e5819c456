//! Typed views over the KVLM payloads of commits and tags.

use crate::{CoreError, Kvlm, ObjectId, Result};

/// A history node: one `tree` header, zero or more `parent` headers,
/// `author`/`committer` identity lines, and a free-text message.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Commit {
    /// The underlying ordered header map.
    pub kvlm: Kvlm,
}

impl Commit {
    /// Builds a commit from its parts.
    pub fn new(
        tree: ObjectId,
        parents: &[ObjectId],
        author: &str,
        committer: &str,
        message: &str,
    ) -> Self {
        let mut kvlm = Kvlm::new();
        kvlm.append(b"tree", tree.to_hex().into_bytes());
        for parent in parents {
            kvlm.append(b"parent", parent.to_hex().into_bytes());
        }
        kvlm.append(b"author", author.as_bytes().to_vec());
        kvlm.append(b"committer", committer.as_bytes().to_vec());
        kvlm.set_message(message.as_bytes().to_vec());
        Self { kvlm }
    }

    /// Returns the digest of the commit's root tree.
    pub fn tree(&self) -> Result<ObjectId> {
        let value = self.kvlm.first(b"tree").ok_or_else(|| {
            CoreError::MalformedEncoding("commit has no tree header".to_string())
        })?;
        header_digest(value)
    }

    /// Returns the parent digests in header order; empty for an
    /// initial commit.
    pub fn parents(&self) -> Result<Vec<ObjectId>> {
        self.kvlm
            .all(b"parent")
            .into_iter()
            .map(header_digest)
            .collect()
    }

    /// Returns the free-text message.
    pub fn message(&self) -> &[u8] {
        self.kvlm.message()
    }
}

/// A named pointer to another object, optionally signed; shares the
/// commit's KVLM shape.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tag {
    /// The underlying ordered header map.
    pub kvlm: Kvlm,
}

impl Tag {
    /// Returns the digest of the tagged object.
    pub fn target(&self) -> Result<ObjectId> {
        let value = self.kvlm.first(b"object").ok_or_else(|| {
            CoreError::MalformedEncoding("tag has no object header".to_string())
        })?;
        header_digest(value)
    }

    /// Returns the free-text message.
    pub fn message(&self) -> &[u8] {
        self.kvlm.message()
    }
}

fn header_digest(value: &[u8]) -> Result<ObjectId> {
    let hex = std::str::from_utf8(value)
        .map_err(|_| CoreError::InvalidDigest("digest is not ASCII hex".to_string()))?;
    ObjectId::from_hex(hex)
}
