//! The keyed pseudo-random generator, `PRG(key, seed) -> stream`.
//!
//! Used exclusively to seed [`crate::tdp::Tdp::generate_array`] deterministically:
//! the same `(pk_rsa, seed)` pair must always yield the same `ST_0`, across client
//! restarts and across the client/server boundary implicitly (the server never
//! calls this — only the client does, to recover `ST_0` before walking the chain
//! with `invert_mult`).

use hmac::{Hmac, Mac};
use sha2::Sha256;
use zeroize::{Zeroize, ZeroizeOnDrop};

type HmacSha256 = Hmac<Sha256>;

/// A keyed deterministic byte stream generator.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Prg {
    key: Vec<u8>,
}

impl Prg {
    pub fn new(key: impl Into<Vec<u8>>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &[u8] {
        &self.key
    }

    /// Produces `len` deterministic bytes from `seed`. `attempt` lets
    /// [`crate::tdp::Tdp::generate_array`] request a fresh stream for the same
    /// seed on rejection sampling without changing the caller-visible seed.
    pub fn stream(&self, seed: impl AsRef<[u8]>, attempt: u32, len: usize) -> Vec<u8> {
        let seed = seed.as_ref();
        let mut out = Vec::with_capacity(len);
        let mut counter: u32 = 0;
        while out.len() < len {
            let mut mac =
                HmacSha256::new_from_slice(&self.key).expect("HMAC accepts keys of any length");
            mac.update(seed);
            mac.update(&attempt.to_be_bytes());
            mac.update(&counter.to_be_bytes());
            out.extend_from_slice(&mac.finalize().into_bytes());
            counter += 1;
        }
        out.truncate(len);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let prg = Prg::new(b"prg-key".to_vec());
        assert_eq!(prg.stream(b"seed", 0, 256), prg.stream(b"seed", 0, 256));
    }

    #[test]
    fn attempt_changes_stream() {
        let prg = Prg::new(b"prg-key".to_vec());
        assert_ne!(prg.stream(b"seed", 0, 32), prg.stream(b"seed", 1, 32));
    }
}
