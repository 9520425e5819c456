//! The key-value-list-with-message codec shared by commits and tags.
//!
//! The wire form is zero or more `key SP value NL` header lines, a
//! blank line, then a free-text message running to the end of the
//! buffer. A value may span lines: each embedded newline is followed
//! by a single space on the wire, stripped on parse.

use crate::{CoreError, Result};

/// An ordered multimap of header keys plus a trailing message.
///
/// Keys keep their first-occurrence order; a repeated key appends to
/// that slot, so re-serialization groups its values at the original
/// position. Keys and values are byte strings: the codec never
/// assumes header content is UTF-8.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Kvlm {
    entries: Vec<(Vec<u8>, Vec<Vec<u8>>)>,
    message: Vec<u8>,
}

impl Kvlm {
    /// Creates an empty map with an empty message.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a KVLM payload.
    ///
    /// A header line without a space separator, or a continuation
    /// that scans past the end of the buffer, fails with
    /// `MalformedEncoding`; nothing partial is returned.
    pub fn parse(raw: &[u8]) -> Result<Self> {
        let mut kvlm = Self::new();
        let mut pos = 0;

        loop {
            let spc = find(raw, b' ', pos);
            let nl = find(raw, b'\n', pos);

            // A newline before any space means the header block is
            // over; the cursor must sit exactly on the blank line.
            let key_end = match (spc, nl) {
                (Some(s), Some(n)) if s < n => s,
                _ => {
                    if nl != Some(pos) {
                        return Err(CoreError::MalformedEncoding(
                            "header line without separator".to_string(),
                        ));
                    }
                    kvlm.message = raw[pos + 1..].to_vec();
                    return Ok(kvlm);
                }
            };

            let key = &raw[pos..key_end];

            // The value runs to the first newline not followed by a
            // continuation space.
            let mut end = key_end;
            loop {
                end = find(raw, b'\n', end + 1).ok_or_else(|| {
                    CoreError::MalformedEncoding("unterminated header value".to_string())
                })?;
                match raw.get(end + 1) {
                    Some(b' ') => continue,
                    Some(_) => break,
                    None => {
                        return Err(CoreError::MalformedEncoding(
                            "header block truncated before message".to_string(),
                        ))
                    }
                }
            }

            let value = unescape(&raw[key_end + 1..end]);
            kvlm.append(key, value);
            pos = end + 1;
        }
    }

    /// Serializes to the wire form: headers in insertion order,
    /// blank line, then the verbatim message.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        for (key, values) in &self.entries {
            for value in values {
                out.extend_from_slice(key);
                out.push(b' ');
                out.extend_from_slice(&escape(value));
                out.push(b'\n');
            }
        }
        out.push(b'\n');
        out.extend_from_slice(&self.message);
        out
    }

    /// Appends a value under a key, promoting an existing slot to a
    /// list rather than reordering.
    pub fn append(&mut self, key: &[u8], value: impl Into<Vec<u8>>) {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| k == key) {
            Some((_, values)) => values.push(value),
            None => self.entries.push((key.to_vec(), vec![value])),
        }
    }

    /// Returns the first value recorded for a key.
    pub fn first(&self, key: &[u8]) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .and_then(|(_, values)| values.first())
            .map(Vec::as_slice)
    }

    /// Returns every value recorded for a key, in insertion order.
    pub fn all(&self, key: &[u8]) -> Vec<&[u8]> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, values)| values.iter().map(Vec::as_slice).collect())
            .unwrap_or_default()
    }

    /// Returns the free-text message.
    pub fn message(&self) -> &[u8] {
        &self.message
    }

    /// Replaces the free-text message.
    pub fn set_message(&mut self, message: impl Into<Vec<u8>>) {
        self.message = message.into();
    }
}

fn find(raw: &[u8], byte: u8, from: usize) -> Option<usize> {
    raw.get(from..)
        .and_then(|tail| tail.iter().position(|&b| b == byte))
        .map(|i| from + i)
}

fn escape(value: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(value.len());
    for &b in value {
        out.push(b);
        if b == b'\n' {
            out.push(b' ');
        }
    }
    out
}

fn unescape(wire: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(wire.len());
    let mut i = 0;
    while i < wire.len() {
        out.push(wire[i]);
        if wire[i] == b'\n' && wire.get(i + 1) == Some(&b' ') {
            i += 1;
        }
        i += 1;
    }
    out
}
