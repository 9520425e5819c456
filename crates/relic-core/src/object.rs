//! Object identifiers, kinds, and the tagged object variant.

use crate::{Commit, CoreError, Kvlm, Result, Tag, Tree};
use bytes::Bytes;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha1::{Digest, Sha1};
use std::fmt;

/// A 20-byte SHA-1 object identifier.
///
/// The hex form is the 40-character digest used in paths and on the
/// wire; the binary form is the 20-byte trailer used in tree entries.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId([u8; 20]);

impl Serialize for ObjectId {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ObjectId {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        ObjectId::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl ObjectId {
    /// Creates an ObjectId from raw bytes.
    pub fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Creates an ObjectId from a 40-character hex string.
    pub fn from_hex(hex: &str) -> Result<Self> {
        if hex.len() != 40 {
            return Err(CoreError::InvalidDigest(format!(
                "expected 40 hex characters, got {}",
                hex.len()
            )));
        }
        let mut bytes = [0u8; 20];
        hex::decode_to_slice(hex, &mut bytes)
            .map_err(|e| CoreError::InvalidDigest(e.to_string()))?;
        Ok(Self(bytes))
    }

    /// Returns the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns the hex representation.
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// Computes the digest of a payload under its canonical header.
    ///
    /// The hashed bytes are `<kind> <decimal-length>\0<payload>`, so
    /// the digest is a pure function of the canonical encoding.
    pub fn hash_object(kind: ObjectKind, payload: &[u8]) -> Self {
        let header = format!("{} {}\0", kind.as_str(), payload.len());
        let mut hasher = Sha1::new();
        hasher.update(header.as_bytes());
        hasher.update(payload);
        let result = hasher.finalize();
        let mut bytes = [0u8; 20];
        bytes.copy_from_slice(&result);
        Self(bytes)
    }
}

impl fmt::Debug for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ObjectId({})", self.to_hex())
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

/// The four object kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    /// File content.
    Blob,
    /// Directory listing.
    Tree,
    /// History node.
    Commit,
    /// Annotated tag.
    Tag,
}

impl ObjectKind {
    /// Returns the kind name used in canonical headers.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
            Self::Tag => "tag",
        }
    }

    /// Parses a kind name.
    pub fn parse(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            "tag" => Ok(Self::Tag),
            _ => Err(CoreError::UnknownKind(s.to_string())),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Opaque file content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Blob {
    /// The raw payload bytes.
    pub data: Bytes,
}

impl Blob {
    /// Creates a blob from raw content.
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self { data: data.into() }
    }
}

/// A decoded object: one of the four kinds.
///
/// Every encode and decode site matches exhaustively, so adding a
/// kind is a compile-time break rather than a silent fallthrough.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    /// File content.
    Blob(Blob),
    /// Directory listing.
    Tree(Tree),
    /// History node.
    Commit(Commit),
    /// Annotated tag.
    Tag(Tag),
}

impl Object {
    /// Returns the kind tag of this object.
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
            Self::Tag(_) => ObjectKind::Tag,
        }
    }

    /// Encodes the object payload (without the canonical header).
    pub fn encode(&self) -> Vec<u8> {
        match self {
            Self::Blob(blob) => blob.data.to_vec(),
            Self::Tree(tree) => tree.encode(),
            Self::Commit(commit) => commit.kvlm.serialize(),
            Self::Tag(tag) => tag.kvlm.serialize(),
        }
    }

    /// Decodes a payload as the given kind.
    pub fn decode(kind: ObjectKind, payload: &[u8]) -> Result<Self> {
        match kind {
            ObjectKind::Blob => Ok(Self::Blob(Blob::new(payload.to_vec()))),
            ObjectKind::Tree => Ok(Self::Tree(Tree::decode(payload)?)),
            ObjectKind::Commit => Ok(Self::Commit(Commit {
                kvlm: Kvlm::parse(payload)?,
            })),
            ObjectKind::Tag => Ok(Self::Tag(Tag {
                kvlm: Kvlm::parse(payload)?,
            })),
        }
    }

    /// Computes this object's digest from its canonical encoding.
    pub fn id(&self) -> ObjectId {
        ObjectId::hash_object(self.kind(), &self.encode())
    }
}
