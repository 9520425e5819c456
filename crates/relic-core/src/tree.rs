//! The binary directory-entry codec used by tree objects.
//!
//! Each entry is `mode SP path NUL raw-20-byte-digest`. The mode is 5
//! or 6 ASCII octal digits on the wire; 5-digit modes are zero-padded
//! to the normalized 6-digit form on read, and entries always encode
//! with 6 digits.

use crate::{CoreError, ObjectId, Result};

/// Classification of a tree entry by its normalized mode prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeEntryKind {
    /// `04`: the target is another tree.
    Subtree,
    /// `10`: the target is a regular or executable blob.
    Blob,
    /// `12`: the target is a blob holding a symlink's target text.
    Symlink,
    /// `16`: the target names a commit in an embedded repository,
    /// unresolved in the local store.
    Gitlink,
}

/// One directory entry: normalized mode, separator-free name, target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    /// Normalized 6-digit octal mode string.
    pub mode: String,
    /// UTF-8 entry name, no path separators.
    pub path: String,
    /// Digest of the entry's target object.
    pub target: ObjectId,
}

impl TreeEntry {
    /// Creates an entry, zero-padding a 5-digit mode.
    pub fn new(mode: &str, path: impl Into<String>, target: ObjectId) -> Result<Self> {
        let mode = normalize_mode(mode.as_bytes())?;
        let entry = Self {
            mode,
            path: path.into(),
            target,
        };
        entry.kind()?;
        Ok(entry)
    }

    /// Classifies the entry; an unrecognized mode prefix is a
    /// `MalformedEncoding` failure.
    pub fn kind(&self) -> Result<TreeEntryKind> {
        match &self.mode.as_bytes()[..2] {
            b"04" => Ok(TreeEntryKind::Subtree),
            b"10" => Ok(TreeEntryKind::Blob),
            b"12" => Ok(TreeEntryKind::Symlink),
            b"16" => Ok(TreeEntryKind::Gitlink),
            _ => Err(CoreError::MalformedEncoding(format!(
                "unrecognized tree entry mode {}",
                self.mode
            ))),
        }
    }

    /// Sort key for canonical ordering: everything that is not a
    /// plain blob compares as if its name were separator-suffixed,
    /// so a directory `a` orders after a file `a.txt`.
    fn sort_key(&self) -> String {
        if self.mode.starts_with("10") {
            self.path.clone()
        } else {
            format!("{}/", self.path)
        }
    }
}

/// An ordered set of directory entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    /// Entries in decoded (or inserted) order; encoding re-sorts.
    pub entries: Vec<TreeEntry>,
}

impl Tree {
    /// Creates an empty tree.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes a tree payload, validating every entry.
    pub fn decode(raw: &[u8]) -> Result<Self> {
        let mut entries = Vec::new();
        let mut pos = 0;
        while pos < raw.len() {
            let (next, entry) = decode_entry(raw, pos)?;
            entries.push(entry);
            pos = next;
        }
        Ok(Self { entries })
    }

    /// Encodes the tree in canonical order, byte-for-byte
    /// reproducible across implementations of the same logical tree.
    pub fn encode(&self) -> Vec<u8> {
        let mut sorted: Vec<&TreeEntry> = self.entries.iter().collect();
        sorted.sort_by_key(|entry| entry.sort_key());

        let mut out = Vec::new();
        for entry in sorted {
            out.extend_from_slice(entry.mode.as_bytes());
            out.push(b' ');
            out.extend_from_slice(entry.path.as_bytes());
            out.push(0);
            out.extend_from_slice(entry.target.as_bytes());
        }
        out
    }
}

fn decode_entry(raw: &[u8], start: usize) -> Result<(usize, TreeEntry)> {
    let space = raw[start..]
        .iter()
        .position(|&b| b == b' ')
        .map(|i| start + i)
        .ok_or_else(|| malformed("entry without mode separator"))?;
    let mode_len = space - start;
    if mode_len != 5 && mode_len != 6 {
        return Err(malformed("mode must be 5 or 6 octal digits"));
    }
    let mode = normalize_mode(&raw[start..space])?;

    let nul = raw[space + 1..]
        .iter()
        .position(|&b| b == 0)
        .map(|i| space + 1 + i)
        .ok_or_else(|| malformed("entry path is unterminated"))?;
    let path = std::str::from_utf8(&raw[space + 1..nul])
        .map_err(|_| malformed("entry path is not UTF-8"))?
        .to_string();

    let trailer = raw
        .get(nul + 1..nul + 21)
        .ok_or_else(|| malformed("entry digest trailer is truncated"))?;
    let mut digest = [0u8; 20];
    digest.copy_from_slice(trailer);

    let entry = TreeEntry {
        mode,
        path,
        target: ObjectId::from_bytes(digest),
    };
    entry.kind()?;
    Ok((nul + 21, entry))
}

fn normalize_mode(mode: &[u8]) -> Result<String> {
    if mode.len() != 5 && mode.len() != 6 {
        return Err(malformed("mode must be 5 or 6 octal digits"));
    }
    if !mode.iter().all(|b| (b'0'..=b'7').contains(b)) {
        return Err(malformed("mode contains non-octal digits"));
    }
    let mut normalized = String::with_capacity(6);
    if mode.len() == 5 {
        normalized.push('0');
    }
    for &b in mode {
        normalized.push(char::from(b));
    }
    Ok(normalized)
}

fn malformed(detail: &str) -> CoreError {
    CoreError::MalformedEncoding(detail.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> ObjectId {
        ObjectId::from_bytes([byte; 20])
    }

    fn entry_bytes(mode: &str, path: &str, target: &ObjectId) -> Vec<u8> {
        let mut raw = Vec::new();
        raw.extend_from_slice(mode.as_bytes());
        raw.push(b' ');
        raw.extend_from_slice(path.as_bytes());
        raw.push(0);
        raw.extend_from_slice(target.as_bytes());
        raw
    }

    #[test]
    fn test_decode_single_entry() {
        let raw = entry_bytes("100644", "hello.txt", &id(0x42));
        let tree = Tree::decode(&raw).unwrap();
        assert_eq!(tree.entries.len(), 1);
        let entry = &tree.entries[0];
        assert_eq!(entry.mode, "100644");
        assert_eq!(entry.path, "hello.txt");
        assert_eq!(entry.target, id(0x42));
        assert_eq!(entry.kind().unwrap(), TreeEntryKind::Blob);
    }

    #[test]
    fn test_five_digit_mode_normalizes() {
        let raw = entry_bytes("40000", "dir", &id(1));
        let tree = Tree::decode(&raw).unwrap();
        assert_eq!(tree.entries[0].mode, "040000");
        assert_eq!(tree.entries[0].kind().unwrap(), TreeEntryKind::Subtree);
        // Re-encodes in the canonical 6-digit form, same numeric value.
        let reencoded = tree.encode();
        assert!(reencoded.starts_with(b"040000 dir\0"));
    }

    #[test]
    fn test_directory_sorts_as_separator_suffixed() {
        let mut tree = Tree::new();
        tree.entries
            .push(TreeEntry::new("100644", "b", id(1)).unwrap());
        tree.entries
            .push(TreeEntry::new("040000", "a", id(2)).unwrap());
        tree.entries
            .push(TreeEntry::new("100644", "a.txt", id(3)).unwrap());

        let decoded = Tree::decode(&tree.encode()).unwrap();
        let order: Vec<&str> = decoded.entries.iter().map(|e| e.path.as_str()).collect();
        assert_eq!(order, ["a.txt", "a", "b"]);
    }

    #[test]
    fn test_decode_multiple_entries() {
        let mut raw = entry_bytes("100644", "a.txt", &id(3));
        raw.extend_from_slice(&entry_bytes("040000", "a", &id(2)));
        raw.extend_from_slice(&entry_bytes("120000", "link", &id(4)));
        let tree = Tree::decode(&raw).unwrap();
        assert_eq!(tree.entries.len(), 3);
        assert_eq!(tree.entries[2].kind().unwrap(), TreeEntryKind::Symlink);
        // Already canonical: encode reproduces the input bytes.
        assert_eq!(tree.encode(), raw);
    }

    #[test]
    fn test_gitlink_kind() {
        let raw = entry_bytes("160000", "vendored", &id(9));
        let tree = Tree::decode(&raw).unwrap();
        assert_eq!(tree.entries[0].kind().unwrap(), TreeEntryKind::Gitlink);
    }

    #[test]
    fn test_unrecognized_mode_prefix_fails_decode() {
        let raw = entry_bytes("777777", "weird", &id(1));
        let err = Tree::decode(&raw).unwrap_err();
        assert!(matches!(err, CoreError::MalformedEncoding(_)));
    }

    #[test]
    fn test_non_octal_mode_fails() {
        let raw = entry_bytes("10a644", "f", &id(1));
        assert!(Tree::decode(&raw).is_err());
    }

    #[test]
    fn test_misplaced_separator_fails() {
        // First space at offset 4: neither 5 nor 6 digits of mode.
        let raw = b"1006 44 f\0aaaaaaaaaaaaaaaaaaaa".to_vec();
        assert!(Tree::decode(&raw).is_err());
    }

    #[test]
    fn test_truncated_trailer_fails() {
        let mut raw = entry_bytes("100644", "f", &id(1));
        raw.truncate(raw.len() - 1);
        let err = Tree::decode(&raw).unwrap_err();
        assert!(matches!(err, CoreError::MalformedEncoding(_)));
    }

    #[test]
    fn test_empty_tree() {
        let tree = Tree::decode(b"").unwrap();
        assert!(tree.entries.is_empty());
        assert!(tree.encode().is_empty());
    }
}
