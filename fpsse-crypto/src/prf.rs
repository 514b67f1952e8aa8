//! The keyed, variable-output PRF family, `PRF<L>(key, byte_string) -> L-byte output`.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// A PRF keyed on an opaque byte string, producing `L`-byte outputs.
///
/// Implemented as HMAC-SHA256 in counter mode: for `L` up to 32 bytes the single
/// HMAC output is truncated; for larger `L` (the per-keyword derivation key) the
/// output is the concatenation of `HMAC(key, input || counter)` blocks, the usual
/// HKDF-expand-style construction.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Prf {
    key: Vec<u8>,
}

impl Prf {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Evaluates the PRF on `input`, producing exactly `L` bytes.
    pub fn eval(&self, input: impl AsRef<[u8]>, out_len: usize) -> Vec<u8> {
        let input = input.as_ref();
        let mut out = Vec::with_capacity(out_len);
        let mut counter: u32 = 0;
        while out.len() < out_len {
            let mut mac =
                HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
            mac.update(input);
            mac.update(&counter.to_be_bytes());
            out.extend_from_slice(&mac.finalize().into_bytes());
            counter += 1;
        }
        out.truncate(out_len);
        out
    }

    /// Evaluates the PRF into a fixed-size array.
    pub fn eval_fixed<const L: usize>(&self, input: impl AsRef<[u8]>) -> [u8; L] {
        let v = self.eval(input, L);
        let mut out = [0u8; L];
        out.copy_from_slice(&v);
        out
    }
}
