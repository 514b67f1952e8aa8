//! `tonic` service implementation wiring the `.proto` contract to [`Server`].

use std::pin::Pin;
use std::sync::Arc;

use fpsse_proto::fpsse_server::Fpsse;
use fpsse_proto::{Empty, SearchReply, SearchRequestMessage, SetupMessage, UpdateRequestMessage};
use futures_util::Stream;
use slog::{debug, error};
use tonic::{Request, Response, Status, Streaming};

use crate::search::SearchParams;
use crate::server::Server;

#[derive(Clone)]
pub struct FpsseService {
    server: Arc<Server>,
}

impl FpsseService {
    pub fn new(server: Arc<Server>) -> Self {
        Self { server }
    }
}

#[tonic::async_trait]
impl Fpsse for FpsseService {
    async fn setup(&self, request: Request<SetupMessage>) -> Result<Response<Empty>, Status> {
        let msg = request.into_inner();
        self.server.setup(msg.public_key).map_err(Status::from)?;
        Ok(Response::new(Empty {}))
    }

    async fn update(
        &self,
        request: Request<UpdateRequestMessage>,
    ) -> Result<Response<Empty>, Status> {
        let msg = request.into_inner();
        if msg.update_token.len() != fpsse_crypto::UPDATE_TOKEN_SIZE {
            return Err(Status::invalid_argument("update_token has the wrong length"));
        }
        self.server
            .update(&msg.update_token, msg.index)
            .map_err(Status::from)?;
        Ok(Response::new(Empty {}))
    }

    async fn bulk_insert(
        &self,
        request: Request<Streaming<UpdateRequestMessage>>,
    ) -> Result<Response<Empty>, Status> {
        let mut stream = request.into_inner();
        let mut count = 0u64;
        while let Some(msg) = stream.message().await? {
            if msg.update_token.len() != fpsse_crypto::UPDATE_TOKEN_SIZE {
                return Err(Status::invalid_argument("update_token has the wrong length"));
            }
            self.server
                .update(&msg.update_token, msg.index)
                .map_err(Status::from)?;
            count += 1;
        }
        self.server.flush().map_err(Status::from)?;
        debug!(self.server_logger(), "bulk insert complete"; "count" => count);
        Ok(Response::new(Empty {}))
    }

    type SearchStream = Pin<Box<dyn Stream<Item = Result<SearchReply, Status>> + Send + 'static>>;

    async fn search(
        &self,
        request: Request<SearchRequestMessage>,
    ) -> Result<Response<Self::SearchStream>, Status> {
        let msg = request.into_inner();
        if msg.add_count == 0 {
            if !msg.token.is_empty() {
                return Err(Status::invalid_argument(
                    "add_count is zero but token is non-empty",
                ));
            }
        } else if msg.token.len() != fpsse_crypto::TDP_DOMAIN_SIZE {
            return Err(Status::invalid_argument(format!(
                "token has the wrong length for a non-empty search (expected {}, got {})",
                fpsse_crypto::TDP_DOMAIN_SIZE,
                msg.token.len()
            )));
        }
        let params = SearchParams {
            add_count: msg.add_count,
            derivation_key: msg.derivation_key,
            token: msg.token,
        };
        let server = Arc::clone(&self.server);
        let outcome = tokio::task::spawn_blocking(move || server.search(params))
            .await
            .map_err(|e| Status::internal(e.to_string()))?
            .map_err(Status::from)?;

        if outcome.integrity_misses > 0 {
            error!(
                self.server_logger(),
                "search completed with integrity anomalies";
                "misses" => outcome.integrity_misses
            );
        }

        let replies = outcome
            .results
            .into_iter()
            .map(|result| Ok(SearchReply { result }));
        let stream = futures_util::stream::iter(replies);
        Ok(Response::new(Box::pin(stream)))
    }
}

impl FpsseService {
    fn server_logger(&self) -> &slog::Logger {
        self.server.logger()
    }
}
