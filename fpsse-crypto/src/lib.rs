//! Cryptographic primitives for the forward-private searchable encryption engine.
//!
//! This crate exposes exactly the four primitives the scheme is built from: a
//! collision-resistant hash, a keyed variable-output PRF, a trapdoor one-way
//! permutation (TDP) with a fast private inverse and a slow public forward
//! direction, and a PRG used to seed the TDP domain deterministically from a
//! keyword index. Nothing here knows about keywords, documents, or the wire
//! protocol; those live in `fpsse-client` and `fpsse-server`.

pub mod error;
pub mod hash;
pub mod prf;
pub mod prg;
pub mod tdp;

pub use error::Error;
pub use hash::{Hash, KEYWORD_INDEX_SIZE};
pub use prf::Prf;
pub use prg::Prg;
pub use tdp::{TdpElement, TdpPrivateKey, TdpPublicKey};

/// Byte width of a [`TdpElement`] for the 2048-bit RSA modulus this engine uses.
pub const TDP_DOMAIN_SIZE: usize = 256;

/// Byte width of an update token (the EDB key).
pub const UPDATE_TOKEN_SIZE: usize = 16;

/// Byte width of a masked document index.
pub const MASKED_INDEX_SIZE: usize = 8;

/// Byte width of the per-keyword derivation key `K = PRF(mk, kwi)`.
pub const DERIVATION_KEY_SIZE: usize = 32;

/// Domain-separation byte appended before deriving the update token `UT = PRF(K, ST || UT_SEP)`.
///
/// Must match exactly between client and server; this is part of the wire contract.
pub const UT_SEP: u8 = b'0';

/// Domain-separation byte appended before deriving the index mask `MASK = PRF(K, ST || MASK_SEP)`.
pub const MASK_SEP: u8 = b'1';

/// Derives the update token `UT = PRF(K, ST || 0x30)` for a search token.
/// Shared by the client (update/search request generation) and the server
/// (search walk) so the domain-separation byte can never drift between them.
pub fn derive_update_token(k: &Prf, st: &tdp::TdpElement) -> [u8; UPDATE_TOKEN_SIZE] {
    let mut input = st.as_bytes().to_vec();
    input.push(UT_SEP);
    k.eval_fixed(input)
}

/// Derives the index mask `MASK = PRF(K, ST || 0x31)` for a search token.
pub fn derive_mask(k: &Prf, st: &tdp::TdpElement) -> [u8; 8] {
    let mut input = st.as_bytes().to_vec();
    input.push(MASK_SEP);
    k.eval_fixed(input)
}
