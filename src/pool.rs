//! Content-addressed string pool used by the BCSV codec.
//!
//! Interns UTF-8 strings into a single concatenated, NUL-terminated blob and
//! hands back byte offsets. Optionally shares suffixes: interning `"bar"`
//! after the pool already ends with `"foobar\0"` may return the offset of
//! the `b` rather than appending a new copy. Suffix sharing only affects
//! output size, never which string a given offset decodes to, so decoders
//! must tolerate either layout.

use std::collections::HashMap;

/// A content-addressed string pool.
#[derive(Debug, Default)]
pub struct StringPool {
    blob: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl StringPool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `s`, returning its byte offset in the eventual pool blob.
    ///
    /// Repeated calls with the same string return the same offset. Attempts
    /// suffix sharing against the tail of the blob before appending.
    pub fn intern(&mut self, s: &str) -> u32 {
        if let Some(&offset) = self.offsets.get(s) {
            return offset;
        }

        let offset = match self.find_suffix(s) {
            Some(offset) => offset,
            None => {
                let offset = self.blob.len() as u32;
                self.blob.extend_from_slice(s.as_bytes());
                self.blob.push(0);
                offset
            }
        };

        self.offsets.insert(s.to_owned(), offset);
        offset
    }

    /// If the blob already ends with `s` followed by a NUL (either the
    /// blob's true end, or immediately before a previously appended
    /// string's leading bytes), return the offset `s` would start at.
    fn find_suffix(&self, s: &str) -> Option<u32> {
        if s.is_empty() {
            return None;
        }
        let needle = s.as_bytes();
        if self.blob.len() < needle.len() + 1 {
            return None;
        }
        let tail_start = self.blob.len() - needle.len() - 1;
        if &self.blob[tail_start..tail_start + needle.len()] == needle
            && self.blob[tail_start + needle.len()] == 0
        {
            return Some(tail_start as u32);
        }
        None
    }

    /// Total length of the pool contents before alignment padding.
    pub fn len(&self) -> usize {
        self.blob.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blob.is_empty()
    }

    /// Consume the pool, returning its blob padded with NUL bytes to a
    /// 32-byte boundary.
    pub fn into_bytes(mut self) -> Vec<u8> {
        let target = self.blob.len().div_ceil(32) * 32;
        self.blob.resize(target.max(32), 0);
        self.blob
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::Reader;

    #[test]
    fn interned_strings_retrievable_at_offset() {
        let mut pool = StringPool::new();
        let strings = ["GroupName", "UniqueName", "Smoke", "Kuribo"];
        let offsets: Vec<u32> = strings.iter().map(|s| pool.intern(s)).collect();

        let blob = pool.into_bytes();
        let reader = Reader::new(&blob);
        for (s, off) in strings.iter().zip(offsets) {
            assert_eq!(&reader.cstring_at(off as usize).unwrap(), s);
        }
    }

    #[test]
    fn repeated_intern_returns_same_offset() {
        let mut pool = StringPool::new();
        let a = pool.intern("EffectName");
        let b = pool.intern("EffectName");
        assert_eq!(a, b);
    }

    #[test]
    fn suffix_sharing_both_layouts_decode_identically() {
        // Shared layout: "foobar\0" then "bar" reuses the tail.
        let mut shared = StringPool::new();
        let foo_off = shared.intern("foobar");
        let bar_off = shared.intern("bar");
        let shared_blob = shared.into_bytes();

        // Unshared layout: two independent entries.
        let mut unshared_blob = b"foobar\0bar\0".to_vec();
        unshared_blob.resize(unshared_blob.len().div_ceil(32) * 32, 0);
        let unshared_foo_off = 0u32;
        let unshared_bar_off = 7u32;

        let shared_reader = Reader::new(&shared_blob);
        let unshared_reader = Reader::new(&unshared_blob);
        assert_eq!(
            shared_reader.cstring_at(foo_off as usize).unwrap(),
            unshared_reader
                .cstring_at(unshared_foo_off as usize)
                .unwrap()
        );
        assert_eq!(
            shared_reader.cstring_at(bar_off as usize).unwrap(),
            unshared_reader
                .cstring_at(unshared_bar_off as usize)
                .unwrap()
        );
    }

    #[test]
    fn padded_to_32_byte_boundary() {
        let mut pool = StringPool::new();
        pool.intern("x");
        let blob = pool.into_bytes();
        assert_eq!(blob.len() % 32, 0);
    }
}
