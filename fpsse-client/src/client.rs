//! The client façade: combines the cryptographic state machine, the RPC
//! channel, and the concurrent update driver (SPEC_FULL §4.7) into one
//! handle.

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;

use crate::error::Error;
use crate::rpc::Rpc;
use crate::secrets::Secrets;
use crate::state_machine::StateMachine;

/// A connected client: owns the secrets, the RPC channel, and any
/// in-flight `async_update` tasks.
pub struct Client {
    secrets: Arc<Secrets>,
    rpc: Rpc,
    pending: Mutex<Vec<JoinHandle<Result<(), Error>>>>,
}

impl Client {
    pub async fn connect(secrets: Secrets, addr: impl Into<String>) -> Result<Self, Error> {
        let rpc = Rpc::connect(addr).await?;
        Ok(Self {
            secrets: Arc::new(secrets),
            rpc,
            pending: Mutex::new(Vec::new()),
        })
    }

    /// Sends the `setup` RPC with this client's TDP public key.
    pub async fn setup(&mut self) -> Result<(), Error> {
        let pk = self.secrets.tdp_sk.public_key().to_bytes();
        self.rpc.setup(pk).await
    }

    /// Performs a single update synchronously: generates the request and
    /// sends it, waiting for the reply before returning.
    pub async fn update(&mut self, kw: impl AsRef<[u8]>, id: u64) -> Result<(), Error> {
        let req = {
            let sm = StateMachine::new(&self.secrets);
            sm.update_request(kw, id)?
        };
        self.rpc.update(req).await
    }

    /// Queues `update(kw, id)` on a background task: request generation and
    /// the RPC call both happen off the caller's task. Ordering between
    /// updates to the *same* keyword is still guaranteed by the counter
    /// map's atomic increment, regardless of which task services the update.
    pub fn async_update(&self, kw: impl Into<Vec<u8>>, id: u64) {
        let secrets = Arc::clone(&self.secrets);
        let mut rpc = self.rpc.clone();
        let kw = kw.into();
        let (tx, rx) = tokio::sync::oneshot::channel();
        rayon::spawn(move || {
            let sm = StateMachine::new(&secrets);
            let _ = tx.send(sm.update_request(&kw, id));
        });
        let handle = tokio::spawn(async move {
            let req = rx
                .await
                .expect("request-generation task dropped its sender")?;
            rpc.update(req).await
        });
        self.pending.lock().expect("pending lock poisoned").push(handle);
    }

    /// Joins every task queued by [`Self::async_update`], returning the first
    /// error encountered, if any.
    pub async fn wait_updates_completion(&self) -> Result<(), Error> {
        let handles: Vec<_> = std::mem::take(&mut *self.pending.lock().expect("pending lock poisoned"));
        let mut first_err = None;
        for handle in handles {
            match handle.await {
                Ok(Ok(())) => {}
                Ok(Err(e)) => {
                    first_err.get_or_insert(e);
                }
                Err(join_err) => {
                    first_err.get_or_insert(Error::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        join_err.to_string(),
                    )));
                }
            };
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Performs a search and returns the unordered multiset of matching
    /// document ids.
    pub async fn search(&mut self, kw: impl AsRef<[u8]>) -> Result<Vec<u64>, Error> {
        let req = {
            let sm = StateMachine::new(&self.secrets);
            sm.search_request(kw)?
        };
        self.rpc.search(req).await
    }
}
