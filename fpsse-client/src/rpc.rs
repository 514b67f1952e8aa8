//! Thin wrapper over the generated `tonic` client stub.

use fpsse_proto::fpsse_client::FpsseClient;
use fpsse_proto::{SearchRequestMessage, SetupMessage, UpdateRequestMessage};
use tonic::transport::Channel;

use crate::error::Error;
use crate::state_machine::{SearchRequest, UpdateRequest};

/// A connected RPC channel to the server.
#[derive(Clone)]
pub struct Rpc {
    inner: FpsseClient<Channel>,
}

impl Rpc {
    pub async fn connect(addr: impl Into<String>) -> Result<Self, Error> {
        let inner = FpsseClient::connect(addr.into()).await?;
        Ok(Self { inner })
    }

    pub async fn setup(&mut self, public_key: Vec<u8>) -> Result<(), Error> {
        self.inner
            .setup(SetupMessage { public_key })
            .await
            .map(|_| ())
            .map_err(Error::from)
    }

    pub async fn update(&mut self, req: UpdateRequest) -> Result<(), Error> {
        self.inner
            .update(UpdateRequestMessage {
                update_token: req.update_token.to_vec(),
                index: req.index,
            })
            .await
            .map(|_| ())
            .map_err(Error::from)
    }

    pub async fn search(
        &mut self,
        req: SearchRequest,
    ) -> Result<Vec<u64>, Error> {
        if req.add_count == 0 {
            return Ok(Vec::new());
        }
        let mut stream = self
            .inner
            .search(SearchRequestMessage {
                add_count: req.add_count,
                derivation_key: req.derivation_key,
                token: req.token,
            })
            .await?
            .into_inner();

        let mut results = Vec::new();
        while let Some(reply) = stream.message().await? {
            results.push(reply.result);
        }
        Ok(results)
    }
}
