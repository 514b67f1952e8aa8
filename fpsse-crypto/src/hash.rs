//! The collision-resistant hash primitive, `Hash(byte_string) -> 256-bit digest`.

use sha2::{Digest as _, Sha256};

/// Byte width of a [`Hash`] digest and of the `KeywordIndex` derived from it.
pub const KEYWORD_INDEX_SIZE: usize = 32;

/// A 256-bit digest.
///
/// Used directly as the `KeywordIndex`: the first (here, only) `KEYWORD_INDEX_SIZE`
/// bytes of `Hash(keyword)` seed both the PRG (for `ST_0`) and the derivation PRF
/// (for the per-keyword key `K`).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Digest([u8; KEYWORD_INDEX_SIZE]);

impl Digest {
    pub fn as_bytes(&self) -> &[u8; KEYWORD_INDEX_SIZE] {
        &self.0
    }
}

impl AsRef<[u8]> for Digest {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

/// Hashes a byte string to a 256-bit digest.
pub fn hash(input: impl AsRef<[u8]>) -> Digest {
    let mut hasher = Sha256::new();
    hasher.update(input.as_ref());
    let out = hasher.finalize();
    Digest(out.into())
}

/// Marker type naming the primitive, kept so call sites read `Hash::digest(kw)`
/// the way the scheme's write-up names it.
pub struct Hash;

impl Hash {
    pub fn digest(input: impl AsRef<[u8]>) -> Digest {
        hash(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        assert_eq!(Hash::digest(b"alpha").as_bytes(), Hash::digest(b"alpha").as_bytes());
    }

    #[test]
    fn distinguishes_inputs() {
        assert_ne!(Hash::digest(b"alpha").as_bytes(), Hash::digest(b"beta").as_bytes());
    }
}
