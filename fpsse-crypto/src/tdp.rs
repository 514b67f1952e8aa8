//! The trapdoor one-way permutation, implemented as an RSA permutation over
//! `Z_n^*` rather than as padded RSA encryption/decryption.
//!
//! The public direction (`eval`) is the slow, one-step-at-a-time walk the
//! server performs on every search: it only ever holds `(n, e)` and can never
//! precompute `e^k mod phi(n)`. The private direction (`invert`, `invert_mult`)
//! is the fast walk the client performs once per update/search: holding
//! `phi(n)` lets it fold `k` inversions into a single modular exponentiation
//! by first computing the compound exponent `d^k mod phi(n)`.

use num_bigint_dig::BigUint;
use num_bigint_dig::RandBigInt;
use rand_core::{CryptoRng, RngCore};
use rsa::traits::{PrivateKeyParts, PublicKeyParts};
use rsa::RsaPrivateKey;

use crate::error::Error;
use crate::prg::Prg;

/// An element of the TDP domain, the fixed-width big-endian encoding of an
/// integer in `[0, n)`.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct TdpElement {
    bytes: Vec<u8>,
}

impl TdpElement {
    /// Wraps an already-encoded big-endian domain element, as received over
    /// the wire in a search request. No range check against `n` is performed
    /// here; an out-of-range value simply reduces under the next `modpow`.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self { bytes }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    fn from_biguint(x: &BigUint, width: usize) -> Self {
        let mut bytes = x.to_bytes_be();
        if bytes.len() < width {
            let mut padded = vec![0u8; width - bytes.len()];
            padded.append(&mut bytes);
            bytes = padded;
        }
        Self { bytes }
    }

    fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_be(&self.bytes)
    }
}

impl AsRef<[u8]> for TdpElement {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

/// The public half of the permutation: the RSA modulus and public exponent.
#[derive(Clone, Debug)]
pub struct TdpPublicKey {
    n: BigUint,
    e: BigUint,
    width: usize,
}

impl TdpPublicKey {
    /// Serializes `(n, e)` for the `tdp_pk.pub` file: the modulus followed by
    /// the exponent, both big-endian, length-prefixed with a 4-byte modulus
    /// length so the exponent boundary is unambiguous.
    pub fn to_bytes(&self) -> Vec<u8> {
        let n_bytes = self.n.to_bytes_be();
        let e_bytes = self.e.to_bytes_be();
        let mut out = Vec::with_capacity(4 + n_bytes.len() + e_bytes.len());
        out.extend_from_slice(&(n_bytes.len() as u32).to_be_bytes());
        out.extend_from_slice(&n_bytes);
        out.extend_from_slice(&e_bytes);
        out
    }

    pub fn from_bytes(data: &[u8]) -> Result<Self, Error> {
        if data.len() < 4 {
            return Err(Error::MalformedKey);
        }
        let n_len = u32::from_be_bytes(data[0..4].try_into().unwrap()) as usize;
        let rest = &data[4..];
        if rest.len() < n_len {
            return Err(Error::MalformedKey);
        }
        let n = BigUint::from_bytes_be(&rest[..n_len]);
        let e = BigUint::from_bytes_be(&rest[n_len..]);
        if e == BigUint::default() {
            return Err(Error::MalformedKey);
        }
        let width = n.to_bytes_be().len();
        Ok(Self { n, e, width })
    }

    /// One public application of the permutation: `x^e mod n`.
    pub fn eval(&self, x: &TdpElement) -> TdpElement {
        let result = x.to_biguint().modpow(&self.e, &self.n);
        TdpElement::from_biguint(&result, self.width)
    }

    /// `k` public applications in a row. The server only ever knows `(n, e)`,
    /// so unlike [`TdpPrivateKey::invert_mult`] this cannot fold into a single
    /// exponentiation; it is exactly `k` sequential [`Self::eval`] calls.
    pub fn eval_repeated(&self, x: &TdpElement, k: u64) -> TdpElement {
        let mut cur = x.clone();
        for _ in 0..k {
            cur = self.eval(&cur);
        }
        cur
    }

    pub fn domain_width(&self) -> usize {
        self.width
    }
}

/// The private half of the permutation: the full RSA key pair plus `phi(n)`,
/// precomputed once at key-generation/load time so every inversion only
/// needs to fold `d^k mod phi(n)` and not refactor `n`.
///
/// `rsa::RsaPrivateKey` already zeroizes its key material on drop; `phi` is
/// derived from that same material so it is wiped here explicitly too.
#[derive(Clone)]
pub struct TdpPrivateKey {
    inner: RsaPrivateKey,
    phi: BigUint,
    width: usize,
}

impl Drop for TdpPrivateKey {
    fn drop(&mut self) {
        self.phi = BigUint::from(0u8);
    }
}

impl TdpPrivateKey {
    /// Generates a fresh 2048-bit RSA trapdoor permutation with public
    /// exponent 65537.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R, bits: usize) -> Result<Self, Error> {
        let sk = RsaPrivateKey::new(rng, bits)?;
        Self::from_rsa_private_key(sk)
    }

    fn from_rsa_private_key(sk: RsaPrivateKey) -> Result<Self, Error> {
        let primes = sk.primes();
        if primes.len() != 2 {
            return Err(Error::MalformedKey);
        }
        let one = BigUint::from(1u8);
        let phi = (&primes[0] - &one) * (&primes[1] - &one);
        let width = sk.n().to_bytes_be().len();
        Ok(Self {
            inner: sk,
            phi,
            width,
        })
    }

    pub fn public_key(&self) -> TdpPublicKey {
        TdpPublicKey {
            n: self.inner.n().clone(),
            e: self.inner.e().clone(),
            width: self.width,
        }
    }

    /// Serializes the private key as PKCS#1 DER, as carried in `tdp_sk.key`.
    pub fn to_pkcs1_der(&self) -> Result<Vec<u8>, Error> {
        use rsa::pkcs1::EncodeRsaPrivateKey;
        let doc = self.inner.to_pkcs1_der().map_err(|_| Error::MalformedKey)?;
        Ok(doc.as_bytes().to_vec())
    }

    pub fn from_pkcs1_der(data: &[u8]) -> Result<Self, Error> {
        use rsa::pkcs1::DecodeRsaPrivateKey;
        let sk = RsaPrivateKey::from_pkcs1_der(data).map_err(|_| Error::MalformedKey)?;
        Self::from_rsa_private_key(sk)
    }

    /// One private inversion: `x^d mod n`.
    pub fn invert(&self, x: &TdpElement) -> TdpElement {
        let result = x.to_biguint().modpow(self.inner.d(), self.inner.n());
        TdpElement::from_biguint(&result, self.width)
    }

    /// `k` private inversions folded into a single exponentiation: first
    /// computes the compound exponent `d^k mod phi(n)`, then applies it once.
    /// Recomputed fresh on every call rather than cached, since `k` (the
    /// keyword's update counter) changes on every search.
    pub fn invert_mult(&self, x: &TdpElement, k: u64) -> TdpElement {
        if k == 0 {
            return x.clone();
        }
        let k_big = BigUint::from(k);
        let compound_exponent = self.inner.d().modpow(&k_big, &self.phi);
        let result = x.to_biguint().modpow(&compound_exponent, self.inner.n());
        TdpElement::from_biguint(&result, self.width)
    }

    /// Deterministically samples a domain element from `seed` via the PRG,
    /// rejection-sampling against `n` (re-deriving a fresh stream on
    /// rejection rather than retrying with a random seed, so the result
    /// remains a pure function of `(sk, seed)`).
    pub fn generate_array(&self, prg: &Prg, seed: impl AsRef<[u8]>) -> Result<TdpElement, Error> {
        let seed = seed.as_ref();
        const MAX_ATTEMPTS: u32 = 256;
        for attempt in 0..MAX_ATTEMPTS {
            let candidate_bytes = prg.stream(seed, attempt, self.width);
            let candidate = BigUint::from_bytes_be(&candidate_bytes);
            if &candidate < self.inner.n() {
                return Ok(TdpElement::from_biguint(&candidate, self.width));
            }
        }
        Err(Error::DomainSamplingFailed)
    }

    pub fn domain_width(&self) -> usize {
        self.width
    }
}

/// Samples a uniformly random domain element, used only by tests that need
/// an arbitrary element rather than one derived from a keyword index.
#[cfg(test)]
fn random_element<R: RngCore + CryptoRng>(rng: &mut R, pk: &TdpPublicKey) -> TdpElement {
    let x = rng.gen_biguint_below(&pk.n);
    TdpElement::from_biguint(&x, pk.width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::OsRng;

    fn small_key() -> TdpPrivateKey {
        let mut rng = OsRng;
        TdpPrivateKey::generate(&mut rng, 512).expect("keygen")
    }

    #[test]
    fn invert_undoes_eval() {
        let sk = small_key();
        let pk = sk.public_key();
        let mut rng = OsRng;
        let x = random_element(&mut rng, &pk);
        let y = pk.eval(&x);
        assert_eq!(sk.invert(&y), x);
    }

    #[test]
    fn invert_mult_matches_repeated_invert() {
        let sk = small_key();
        let pk = sk.public_key();
        let mut rng = OsRng;
        let x = random_element(&mut rng, &pk);

        let mut stepwise = x.clone();
        for _ in 0..5 {
            stepwise = sk.invert(&stepwise);
        }
        assert_eq!(sk.invert_mult(&x, 5), stepwise);
    }

    #[test]
    fn eval_repeated_matches_chained_eval() {
        let sk = small_key();
        let pk = sk.public_key();
        let mut rng = OsRng;
        let x = random_element(&mut rng, &pk);

        let mut stepwise = x.clone();
        for _ in 0..4 {
            stepwise = pk.eval(&stepwise);
        }
        assert_eq!(pk.eval_repeated(&x, 4), stepwise);
    }

    #[test]
    fn generate_array_is_deterministic() {
        let sk = small_key();
        let prg = Prg::new(b"seed-key".to_vec());
        let a = sk.generate_array(&prg, b"keyword-index").unwrap();
        let b = sk.generate_array(&prg, b"keyword-index").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn public_key_round_trips_through_bytes() {
        let sk = small_key();
        let pk = sk.public_key();
        let encoded = pk.to_bytes();
        let decoded = TdpPublicKey::from_bytes(&encoded).unwrap();
        let mut rng = OsRng;
        let x = random_element(&mut rng, &pk);
        assert_eq!(pk.eval(&x), decoded.eval(&x));
    }
}
