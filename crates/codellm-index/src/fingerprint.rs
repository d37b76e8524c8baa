//! Content change detection.
//!
//! A file is identified by the BLAKE3 digest of its path and versioned by the
//! BLAKE3 digest of its bytes. Both are 64-character lowercase hex strings.

use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFingerprint {
    /// Path relative to the traversal root, `/`-separated.
    pub file_path: PathBuf,
    pub file_path_hash: String,
    pub file_content: Vec<u8>,
    pub file_content_hash: String,
}

impl FileFingerprint {
    /// `true` when `stored_hash` (the content hash recorded for this path)
    /// matches the current content.
    #[must_use]
    pub fn is_unchanged(&self, stored_hash: Option<&str>) -> bool {
        stored_hash == Some(self.file_content_hash.as_str())
    }

    /// The path as stored in document metadata.
    #[must_use]
    pub fn display_path(&self) -> String {
        path_key(&self.file_path)
    }

    /// Content decoded as UTF-8, replacing invalid sequences.
    #[must_use]
    pub fn content_lossy(&self) -> String {
        String::from_utf8_lossy(&self.file_content).into_owned()
    }
}

#[must_use]
pub fn hash_bytes(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}

fn path_key(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
}

/// Fingerprint a file from its path and raw content. Pure and deterministic.
#[must_use]
pub fn fingerprint(path: &Path, content: Vec<u8>) -> FileFingerprint {
    let file_path_hash = hash_bytes(path_key(path).as_bytes());
    let file_content_hash = hash_bytes(&content);
    FileFingerprint {
        file_path: path.to_path_buf(),
        file_path_hash,
        file_content: content,
        file_content_hash,
    }
}

#[cfg(test)]
mod tests {
    use proptest::prelude::*;

    use super::*;

    #[test]
    fn hashes_are_64_char_lowercase_hex() {
        let fp = fingerprint(Path::new("src/main.rs"), b"fn main() {}".to_vec());
        for hash in [&fp.file_path_hash, &fp.file_content_hash] {
            assert_eq!(hash.len(), 64);
            assert!(hash.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
        }
    }

    #[test]
    fn empty_file_has_content_hash() {
        let fp = fingerprint(Path::new("empty.txt"), Vec::new());
        assert_eq!(fp.file_content_hash, hash_bytes(b""));
        assert!(fp.content_lossy().is_empty());
    }

    #[test]
    fn path_key_uses_forward_slashes() {
        let path: PathBuf = ["src", "nested", "mod.rs"].iter().collect();
        assert_eq!(fingerprint(&path, Vec::new()).display_path(), "src/nested/mod.rs");
    }

    #[test]
    fn is_unchanged_compares_stored_hash() {
        let fp = fingerprint(Path::new("a.rs"), b"x".to_vec());
        assert!(fp.is_unchanged(Some(&hash_bytes(b"x"))));
        assert!(!fp.is_unchanged(Some(&hash_bytes(b"y"))));
        assert!(!fp.is_unchanged(None));
    }

    #[test]
    fn non_utf8_content_is_lossy_decoded() {
        let fp = fingerprint(Path::new("bin"), vec![0x66, 0xff, 0x6f]);
        assert_eq!(fp.content_lossy(), "f\u{fffd}o");
    }

    proptest! {
        #[test]
        fn fingerprint_is_deterministic(
            path in "[a-z]{1,8}(/[a-z]{1,8}){0,3}",
            content in proptest::collection::vec(any::<u8>(), 0..256),
        ) {
            let a = fingerprint(Path::new(&path), content.clone());
            let b = fingerprint(Path::new(&path), content);
            prop_assert_eq!(a, b);
        }

        #[test]
        fn content_change_only_moves_content_hash(
            content in proptest::collection::vec(any::<u8>(), 1..256),
            idx in any::<prop::sample::Index>(),
        ) {
            let mut changed = content.clone();
            let i = idx.index(changed.len());
            changed[i] = changed[i].wrapping_add(1);

            let before = fingerprint(Path::new("src/lib.rs"), content);
            let after = fingerprint(Path::new("src/lib.rs"), changed);
            prop_assert_eq!(&before.file_path_hash, &after.file_path_hash);
            prop_assert_ne!(&before.file_content_hash, &after.file_content_hash);
            prop_assert!(!after.is_unchanged(Some(&before.file_content_hash)));
        }
    }
}
