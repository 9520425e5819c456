//! The loose-object store: digest-addressed files under a two-level
//! directory fan-out.

use crate::{CoreError, Object, ObjectId, ObjectKind, Result};
use flate2::read::ZlibDecoder;
use flate2::write::ZlibEncoder;
use flate2::Compression;
use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

/// Content-addressed storage of encoded objects.
///
/// Each object lives at `<root>/<first-2-hex>/<remaining-38-hex>` as
/// the zlib-compressed form of `<kind> <decimal-length>\0<payload>`.
/// The fan-out only bounds per-directory entry counts; it carries no
/// meaning beyond layout.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
}

impl ObjectStore {
    /// Creates a store rooted at the given objects directory.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Returns the objects directory.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Writes an object, returning its digest.
    ///
    /// Idempotent: the digest is a pure function of the encoded
    /// bytes, so rewriting identical content succeeds without
    /// duplication. The file appears atomically via rename, so a
    /// crash mid-write reads as NotFound rather than as a partial
    /// object.
    pub fn write(&self, object: &Object) -> Result<ObjectId> {
        let payload = object.encode();
        let id = ObjectId::hash_object(object.kind(), &payload);
        let hex = id.to_hex();
        let dir = self.root.join(&hex[..2]);
        let path = dir.join(&hex[2..]);
        if path.exists() {
            return Ok(id);
        }

        fs::create_dir_all(&dir)?;

        let header = format!("{} {}\0", object.kind(), payload.len());
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(header.as_bytes())?;
        encoder.write_all(&payload)?;
        let compressed = encoder.finish()?;

        let mut tmp = tempfile::NamedTempFile::new_in(&dir)?;
        tmp.write_all(&compressed)?;
        tmp.persist(&path).map_err(|e| CoreError::Io(e.error))?;

        tracing::debug!(id = %id, kind = %object.kind(), "wrote object");
        Ok(id)
    }

    /// Reads and decodes the object with the given digest.
    pub fn read(&self, id: &ObjectId) -> Result<Object> {
        let path = self.object_path(id);
        let compressed = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(CoreError::NotFound(id.to_hex()));
            }
            Err(e) => return Err(e.into()),
        };

        let mut decoder = ZlibDecoder::new(compressed.as_slice());
        let mut raw = Vec::new();
        decoder
            .read_to_end(&mut raw)
            .map_err(|e| CoreError::Corrupt(format!("{id}: {e}")))?;

        let (kind, payload) = split_header(&raw, id)?;
        Object::decode(kind, payload)
    }

    /// Returns true if an object with this digest is stored.
    pub fn contains(&self, id: &ObjectId) -> bool {
        self.object_path(id).is_file()
    }

    fn object_path(&self, id: &ObjectId) -> PathBuf {
        let hex = id.to_hex();
        self.root.join(&hex[..2]).join(&hex[2..])
    }
}

/// Splits `kind SP length NUL payload`, checking the declared length
/// against the actual payload.
fn split_header<'a>(raw: &'a [u8], id: &ObjectId) -> Result<(ObjectKind, &'a [u8])> {
    let space = raw
        .iter()
        .position(|&b| b == b' ')
        .ok_or_else(|| CoreError::Corrupt(format!("{id}: header has no space")))?;
    let nul = raw[space..]
        .iter()
        .position(|&b| b == 0)
        .map(|i| space + i)
        .ok_or_else(|| CoreError::Corrupt(format!("{id}: header is unterminated")))?;

    let kind_name = std::str::from_utf8(&raw[..space])
        .map_err(|_| CoreError::Corrupt(format!("{id}: kind name is not ASCII")))?;
    let kind = ObjectKind::parse(kind_name)?;

    let declared: usize = std::str::from_utf8(&raw[space + 1..nul])
        .ok()
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| CoreError::Corrupt(format!("{id}: bad length field")))?;

    let payload = &raw[nul + 1..];
    if declared != payload.len() {
        return Err(CoreError::Corrupt(format!(
            "{id}: declared length {declared} but payload is {}",
            payload.len()
        )));
    }
    Ok((kind, payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Blob, Commit};

    fn temp_store() -> (tempfile::TempDir, ObjectStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = ObjectStore::new(dir.path().join("objects"));
        (dir, store)
    }

    #[test]
    fn test_write_read_roundtrip() {
        let (_dir, store) = temp_store();
        let blob = Object::Blob(Blob::new(b"Hello, World!".to_vec()));
        let id = store.write(&blob).unwrap();
        assert_eq!(store.read(&id).unwrap(), blob);
    }

    #[test]
    fn test_fan_out_layout() {
        let (_dir, store) = temp_store();
        let blob = Object::Blob(Blob::new(b"hello\n".to_vec()));
        let id = store.write(&blob).unwrap();
        assert_eq!(id.to_hex(), "ce013625030ba8dba906f756967f9e9ca394464a");
        assert!(store
            .root()
            .join("ce")
            .join("013625030ba8dba906f756967f9e9ca394464a")
            .is_file());
    }

    #[test]
    fn test_write_is_idempotent() {
        let (_dir, store) = temp_store();
        let blob = Object::Blob(Blob::new(b"same bytes".to_vec()));
        let first = store.write(&blob).unwrap();
        let second = store.write(&blob).unwrap();
        assert_eq!(first, second);

        // Exactly one file under the fan-out directory.
        let hex = first.to_hex();
        let entries: Vec<_> = fs::read_dir(store.root().join(&hex[..2]))
            .unwrap()
            .collect();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let (_dir, store) = temp_store();
        let id = ObjectId::from_bytes([0x5a; 20]);
        assert!(!store.contains(&id));
        assert!(matches!(
            store.read(&id).unwrap_err(),
            CoreError::NotFound(_)
        ));
    }

    #[test]
    fn test_truncated_object_is_corrupt() {
        let (_dir, store) = temp_store();
        let blob = Object::Blob(Blob::new(b"soon to be damaged".to_vec()));
        let id = store.write(&blob).unwrap();

        let hex = id.to_hex();
        let path = store.root().join(&hex[..2]).join(&hex[2..]);
        let mut bytes = fs::read(&path).unwrap();
        bytes.truncate(bytes.len() - 1);
        fs::write(&path, bytes).unwrap();

        assert!(matches!(
            store.read(&id).unwrap_err(),
            CoreError::Corrupt(_)
        ));
    }

    #[test]
    fn test_length_mismatch_is_corrupt() {
        let (_dir, store) = temp_store();
        let id = ObjectId::from_bytes([1; 20]);
        write_raw(&store, &id, b"blob 3\0toolong");
        assert!(matches!(
            store.read(&id).unwrap_err(),
            CoreError::Corrupt(_)
        ));
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let (_dir, store) = temp_store();
        let id = ObjectId::from_bytes([2; 20]);
        write_raw(&store, &id, b"wobble 2\0hi");
        assert!(matches!(
            store.read(&id).unwrap_err(),
            CoreError::UnknownKind(_)
        ));
    }

    #[test]
    fn test_commit_survives_storage() {
        let (_dir, store) = temp_store();
        let author = "Alice <alice@example.com> 1234567890 +0000";
        let commit = Object::Commit(Commit::new(
            ObjectId::from_bytes([7; 20]),
            &[ObjectId::from_bytes([8; 20])],
            author,
            author,
            "stored\n",
        ));
        let id = store.write(&commit).unwrap();
        assert_eq!(store.read(&id).unwrap(), commit);
    }

    /// Stores pre-compressed bytes at the digest's derived path,
    /// bypassing `write` to plant malformed content.
    fn write_raw(store: &ObjectStore, id: &ObjectId, raw: &[u8]) {
        let hex = id.to_hex();
        let dir = store.root().join(&hex[..2]);
        fs::create_dir_all(&dir).unwrap();
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(raw).unwrap();
        fs::write(dir.join(&hex[2..]), encoder.finish().unwrap()).unwrap();
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::{Blob, Kvlm, Tree};
    use proptest::prelude::*;

    proptest! {
        /// Property: any payload round-trips through the store and
        /// identical bytes always reproduce the same digest.
        #[test]
        fn prop_store_roundtrip_blob(data in prop::collection::vec(any::<u8>(), 0..4096)) {
            let dir = tempfile::tempdir().unwrap();
            let store = ObjectStore::new(dir.path().join("objects"));
            let blob = Object::Blob(Blob::new(data.clone()));

            let id = store.write(&blob).unwrap();
            prop_assert_eq!(store.write(&blob).unwrap(), id);

            match store.read(&id).unwrap() {
                Object::Blob(read) => prop_assert_eq!(read.data.as_ref(), data.as_slice()),
                other => prop_assert!(false, "read back {:?}", other.kind()),
            }
        }

        /// Property: arbitrary bytes never panic the KVLM decoder.
        #[test]
        fn prop_kvlm_decode_no_panic(data in prop::collection::vec(any::<u8>(), 0..2048)) {
            let _ = Kvlm::parse(&data);
        }

        /// Property: arbitrary bytes never panic the tree decoder.
        #[test]
        fn prop_tree_decode_no_panic(data in prop::collection::vec(any::<u8>(), 0..2048)) {
            let _ = Tree::decode(&data);
        }
    }
}
