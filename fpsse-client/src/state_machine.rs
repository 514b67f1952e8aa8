//! The client-side cryptographic state machine: update-request and
//! search-request generation (SPEC_FULL §4.3/§4.4).

use fpsse_crypto::{derive_mask, derive_update_token, Hash, DERIVATION_KEY_SIZE, UPDATE_TOKEN_SIZE};
use fpsse_store::CounterMap;

use crate::error::Error;
use crate::secrets::Secrets;

/// An opaque request to insert `(keyword, document_id)` into the server's EDB.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpdateRequest {
    pub update_token: [u8; UPDATE_TOKEN_SIZE],
    pub index: u64,
}

/// An opaque request to search the server's EDB for a keyword.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub add_count: u32,
    pub derivation_key: Vec<u8>,
    pub token: Vec<u8>,
}

/// Builds update and search requests from client secrets, without performing
/// any network I/O itself.
pub struct StateMachine<'a> {
    secrets: &'a Secrets,
}

impl<'a> StateMachine<'a> {
    pub fn new(secrets: &'a Secrets) -> Self {
        Self { secrets }
    }

    /// Builds the request for `update(kw, id)`, atomically consuming the next
    /// counter value for `kw`.
    pub fn update_request(&self, kw: impl AsRef<[u8]>, id: u64) -> Result<UpdateRequest, Error> {
        let kw = kw.as_ref();
        let kwi = Hash::digest(kw);
        let c = self.secrets.counters.get_and_increment(kw)?;

        let st0 = self.secrets.tdp_sk.generate_array(&self.secrets.prg, kwi)?;
        let st_c = self.secrets.tdp_sk.invert_mult(&st0, c as u64);

        let k = self
            .secrets
            .derivation_master
            .eval(kwi, DERIVATION_KEY_SIZE);
        let derivation_prf = fpsse_crypto::Prf::new(k);

        let update_token = derive_update_token(&derivation_prf, &st_c);
        let mask = derive_mask(&derivation_prf, &st_c);
        let masked_index = id ^ u64::from_be_bytes(mask);

        Ok(UpdateRequest {
            update_token,
            index: masked_index,
        })
    }

    /// Builds the request for `search(kw)`. Returns `add_count = 0` if `kw`
    /// was never updated.
    pub fn search_request(&self, kw: impl AsRef<[u8]>) -> Result<SearchRequest, Error> {
        let kw = kw.as_ref();
        let kwi = Hash::digest(kw);
        let c = match self.secrets.counters.get(kw)? {
            Some(c) => c,
            None => {
                return Ok(SearchRequest {
                    add_count: 0,
                    derivation_key: Vec::new(),
                    token: Vec::new(),
                })
            }
        };

        let st0 = self.secrets.tdp_sk.generate_array(&self.secrets.prg, kwi)?;
        let steps = c.saturating_sub(1) as u64;
        let st_start = self.secrets.tdp_sk.invert_mult(&st0, steps);

        let k = self
            .secrets
            .derivation_master
            .eval(kwi, DERIVATION_KEY_SIZE);

        Ok(SearchRequest {
            add_count: c,
            derivation_key: k,
            token: st_start.into_bytes(),
        })
    }
}
