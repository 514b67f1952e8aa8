//! The server-side search walk (SPEC_FULL §4.6): given `ST_{c-1}` and the
//! per-keyword derivation key, walk the chain backward to `ST_0` using only
//! the public TDP, deriving an update token and a mask at each step.
//!
//! Three strategies share one result: sequential (small `c`), light parallel
//! (moderate `c`, inline PRF+EDB+unmask per worker), and a staged pipeline
//! (large `c`, TDP evaluation and EDB access split across bounded
//! `crossbeam-channel` queues). All three must produce the same result
//! multiset for the same request — this is the parallel/sequential
//! equivalence property the test suite checks.

use fpsse_crypto::tdp::TdpElement;
use fpsse_crypto::{derive_mask, derive_update_token, Prf, TdpPublicKey};
use fpsse_store::Edb;
use slog::{error, Logger};

/// Below this `add_count`, the walk runs on the calling thread.
pub const SEQUENTIAL_THRESHOLD: u32 = 2;
/// At or above this `add_count`, the walk uses the staged pipeline instead of
/// light parallelism.
pub const STAGED_PIPELINE_THRESHOLD: u32 = 40;

/// A decoded search request: the starting token `ST_{c-1}`, the per-keyword
/// derivation key, and the chain length.
#[derive(Clone)]
pub struct SearchParams {
    pub add_count: u32,
    pub derivation_key: Vec<u8>,
    pub token: Vec<u8>,
}

/// The in-process (non-wire) result of a search: the unordered document ids
/// plus the count of EDB misses encountered along the way.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub results: Vec<u64>,
    pub integrity_misses: usize,
}

/// Picks a strategy based on `add_count` and runs the walk.
pub fn search<E: Edb + Sync>(
    pk: &TdpPublicKey,
    edb: &E,
    params: &SearchParams,
    logger: &Logger,
) -> Result<SearchOutcome, crate::error::Error> {
    if params.add_count == 0 {
        return Ok(SearchOutcome::default());
    }
    if params.add_count < SEQUENTIAL_THRESHOLD {
        search_sequential(pk, edb, params, logger)
    } else if params.add_count < STAGED_PIPELINE_THRESHOLD {
        search_light_parallel(pk, edb, params, logger, worker_count())
    } else {
        search_staged_pipeline(pk, edb, params, logger, worker_count())
    }
}

fn worker_count() -> usize {
    num_cpus::get().max(1)
}

fn lookup_one<E: Edb>(
    edb: &E,
    k: &Prf,
    st: &TdpElement,
    logger: &Logger,
) -> Result<Option<u64>, crate::error::Error> {
    let ut = derive_update_token(k, st);
    match edb.get(ut)? {
        Some(masked) => {
            let masked: [u8; 8] = masked.as_slice().try_into().map_err(|_| {
                crate::error::Error::MalformedRequest("masked index has the wrong width".into())
            })?;
            let mask = derive_mask(k, st);
            let id = u64::from_be_bytes(masked) ^ u64::from_be_bytes(mask);
            Ok(Some(id))
        }
        None => {
            error!(logger, "search integrity anomaly: EDB miss for derived token");
            Ok(None)
        }
    }
}

/// One thread, one step at a time: `ST_{c-1}, ST_{c-2}, …, ST_0`.
pub fn search_sequential<E: Edb>(
    pk: &TdpPublicKey,
    edb: &E,
    params: &SearchParams,
    logger: &Logger,
) -> Result<SearchOutcome, crate::error::Error> {
    let k = Prf::new(params.derivation_key.clone());
    let mut current = TdpElement::from_bytes(params.token.clone());
    let mut outcome = SearchOutcome::default();

    for i in 0..params.add_count {
        if let Some(id) = lookup_one(edb, &k, &current, logger)? {
            outcome.results.push(id);
        } else {
            outcome.integrity_misses += 1;
        }
        if i + 1 < params.add_count {
            current = pk.eval(&current);
        }
    }
    Ok(outcome)
}

/// Residue-class parallel walk: worker `t` starts at `ST_{c-1}` advanced
/// forward `t` steps and then strides by `worker_count` steps at a time,
/// performing the EDB lookup inline.
pub fn search_light_parallel<E: Edb + Sync>(
    pk: &TdpPublicKey,
    edb: &E,
    params: &SearchParams,
    logger: &Logger,
    workers: usize,
) -> Result<SearchOutcome, crate::error::Error> {
    let k = Prf::new(params.derivation_key.clone());
    let start = TdpElement::from_bytes(params.token.clone());
    let c = params.add_count;
    let n = workers.min(c as usize).max(1) as u32;

    use rayon::iter::{IntoParallelIterator, ParallelIterator};
    let per_worker: Vec<Result<(Vec<u64>, usize), crate::error::Error>> = (0..n)
        .into_par_iter()
        .map(|t| {
            let mut results = Vec::new();
            let mut misses = 0usize;
            let mut i = t;
            let mut cur = pk.eval_repeated(&start, t as u64);
            loop {
                if i >= c {
                    break;
                }
                match lookup_one(edb, &k, &cur, logger)? {
                    Some(id) => results.push(id),
                    None => misses += 1,
                }
                i += n;
                if i < c {
                    cur = pk.eval_repeated(&cur, n as u64);
                }
            }
            Ok((results, misses))
        })
        .collect();

    let mut outcome = SearchOutcome::default();
    for worker in per_worker {
        let (results, misses) = worker?;
        outcome.results.extend(results);
        outcome.integrity_misses += misses;
    }
    Ok(outcome)
}

/// Staged pipeline for long chains: one rayon task per residue class
/// advances the TDP chain and pushes tokens into a bounded channel; a pool
/// of access workers drains it, performs the PRF/EDB/unmask step, and pushes
/// results into a second bounded channel that the caller drains.
pub fn search_staged_pipeline<E: Edb + Sync>(
    pk: &TdpPublicKey,
    edb: &E,
    params: &SearchParams,
    logger: &Logger,
    workers: usize,
) -> Result<SearchOutcome, crate::error::Error> {
    let k = Prf::new(params.derivation_key.clone());
    let start = TdpElement::from_bytes(params.token.clone());
    let c = params.add_count;
    let n = workers.min(c as usize).max(1);

    const QUEUE_DEPTH: usize = 256;
    let (token_tx, token_rx) = crossbeam_channel::bounded::<TdpElement>(QUEUE_DEPTH);
    let (result_tx, result_rx) = crossbeam_channel::bounded::<Option<u64>>(QUEUE_DEPTH);

    let outcome = std::thread::scope(|scope| -> Result<SearchOutcome, crate::error::Error> {
        // Access workers: drain tokens, do the EDB lookup, forward results.
        for _ in 0..n {
            let token_rx = token_rx.clone();
            let result_tx = result_tx.clone();
            let k = &k;
            let edb = &*edb;
            let logger = logger.clone();
            scope.spawn(move || {
                for st in token_rx {
                    let looked_up = lookup_one(edb, k, &st, &logger);
                    let _ = result_tx.send(match looked_up {
                        Ok(v) => v,
                        Err(_) => None,
                    });
                }
            });
        }
        drop(result_tx);

        // TDP evaluation: n residue-class producers feeding the bounded queue.
        rayon::scope(|s| {
            for t in 0..(n as u32) {
                let token_tx = token_tx.clone();
                let start = start.clone();
                s.spawn(move |_| {
                    let mut i = t;
                    let mut cur = pk.eval_repeated(&start, t as u64);
                    loop {
                        if i >= c {
                            break;
                        }
                        if token_tx.send(cur.clone()).is_err() {
                            break;
                        }
                        i += n as u32;
                        if i < c {
                            cur = pk.eval_repeated(&cur, n as u64);
                        }
                    }
                });
            }
        });
        drop(token_tx);

        let mut outcome = SearchOutcome::default();
        for result in result_rx {
            match result {
                Some(id) => outcome.results.push(id),
                None => outcome.integrity_misses += 1,
            }
        }
        Ok(outcome)
    })?;

    Ok(outcome)
}
