//! Full client/server scenarios, driven over a real loopback gRPC
//! connection. These correspond to the end-to-end scenarios the engine is
//! expected to satisfy: multi-keyword search correctness, bulk ingestion,
//! concurrent updates, persistence across a restart, search-strategy
//! equivalence, and idempotent setup.

use std::path::Path;

use fpsse_client::{Client, Secrets};
use fpsse_proto::fpsse_server::FpsseServer;
use fpsse_server::{FpsseService, Server};
use slog::Logger;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::TcpListenerStream;

fn discard_logger() -> Logger {
    Logger::root(slog::Discard, slog::o!())
}

/// Opens a server rooted at `storage` and serves it on an OS-assigned
/// loopback port. Returns the `http://` address to connect to and a handle
/// to the serving task.
async fn spawn_server(storage: &Path) -> (String, JoinHandle<()>) {
    let server = std::sync::Arc::new(Server::open(storage, discard_logger()).unwrap());
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let incoming = TcpListenerStream::new(listener);

    let handle = tokio::spawn(async move {
        tonic::transport::Server::builder()
            .add_service(FpsseServer::new(FpsseService::new(server)))
            .serve_with_incoming(incoming)
            .await
            .unwrap();
    });

    (format!("http://{addr}"), handle)
}

async fn connected_client(secrets_dir: &Path, addr: &str) -> Client {
    let (secrets, _pk) = Secrets::setup_new(secrets_dir).unwrap();
    let mut client = Client::connect(secrets, addr.to_string()).await.unwrap();
    client.setup().await.unwrap();
    client
}

/// S1: a handful of keywords, each inserted under several document ids,
/// search returns exactly the inserted set for each keyword.
#[tokio::test]
async fn basic_multi_keyword_round_trip() {
    let storage = tempfile::tempdir().unwrap();
    let secrets_dir = tempfile::tempdir().unwrap();
    let (addr, _server) = spawn_server(storage.path()).await;
    let mut client = connected_client(secrets_dir.path(), &addr).await;

    let docs: &[(&str, &[u64])] = &[
        ("rust", &[1, 2, 3]),
        ("async", &[2, 4]),
        ("crypto", &[10, 20, 30, 40]),
    ];

    for (kw, ids) in docs {
        for id in *ids {
            client.update(kw, *id).await.unwrap();
        }
    }

    for (kw, ids) in docs {
        let mut got = client.search(kw).await.unwrap();
        got.sort_unstable();
        let mut want = ids.to_vec();
        want.sort_unstable();
        assert_eq!(got, want, "mismatch for keyword {kw}");
    }

    let empty = client.search("never-inserted").await.unwrap();
    assert!(empty.is_empty());
}

/// S2 (reduced): a single keyword with several hundred updates, searched
/// back in full. The full 10,000-update stress scenario is gated behind
/// `#[ignore]` since it is too slow for routine runs.
#[tokio::test]
async fn many_updates_single_keyword() {
    const N: u64 = 300;

    let storage = tempfile::tempdir().unwrap();
    let secrets_dir = tempfile::tempdir().unwrap();
    let (addr, _server) = spawn_server(storage.path()).await;
    let mut client = connected_client(secrets_dir.path(), &addr).await;

    for id in 0..N {
        client.update("popular", id).await.unwrap();
    }

    let mut got = client.search("popular").await.unwrap();
    got.sort_unstable();
    assert_eq!(got, (0..N).collect::<Vec<_>>());
}

#[tokio::test]
#[ignore]
async fn many_updates_single_keyword_full_scale() {
    const N: u64 = 10_000;

    let storage = tempfile::tempdir().unwrap();
    let secrets_dir = tempfile::tempdir().unwrap();
    let (addr, _server) = spawn_server(storage.path()).await;
    let client = std::sync::Arc::new(tokio::sync::Mutex::new(
        connected_client(secrets_dir.path(), &addr).await,
    ));

    for id in 0..N {
        client.lock().await.update("popular", id).await.unwrap();
    }

    let mut got = client.lock().await.search("popular").await.unwrap();
    got.sort_unstable();
    assert_eq!(got, (0..N).collect::<Vec<_>>());
}

/// S3: many concurrent `async_update` calls against the same and different
/// keywords, all reconciled by `wait_updates_completion`, then searched.
#[tokio::test]
async fn concurrent_updates_interleaved() {
    const WORKERS: u64 = 8;
    const PER_WORKER: u64 = 25;

    let storage = tempfile::tempdir().unwrap();
    let secrets_dir = tempfile::tempdir().unwrap();
    let (addr, _server) = spawn_server(storage.path()).await;
    let client = connected_client(secrets_dir.path(), &addr).await;

    for worker in 0..WORKERS {
        for i in 0..PER_WORKER {
            let id = worker * PER_WORKER + i;
            client.async_update("shared", id);
        }
    }
    client.wait_updates_completion().await.unwrap();

    let mut client = client;
    let mut got = client.search("shared").await.unwrap();
    got.sort_unstable();
    assert_eq!(got, (0..WORKERS * PER_WORKER).collect::<Vec<_>>());
}

/// S4: client secrets and server EDB both survive a process restart,
/// simulated here by dropping and reopening both with the same directories.
#[tokio::test]
async fn persistence_across_restart() {
    let storage = tempfile::tempdir().unwrap();
    let secrets_dir = tempfile::tempdir().unwrap();

    {
        let (addr, server) = spawn_server(storage.path()).await;
        let mut client = connected_client(secrets_dir.path(), &addr).await;
        client.update("durable", 1).await.unwrap();
        client.update("durable", 2).await.unwrap();
        server.abort();
    }

    let (addr, _server) = spawn_server(storage.path()).await;
    let secrets = Secrets::setup_from_directory(secrets_dir.path()).unwrap();
    let mut client = Client::connect(secrets, addr).await.unwrap();

    let mut got = client.search("durable").await.unwrap();
    got.sort_unstable();
    assert_eq!(got, vec![1, 2]);
}

/// S5: search results are independent of which of the three search
/// strategies the server selects, which is driven purely by `add_count`.
#[tokio::test]
async fn search_strategy_choice_does_not_affect_results() {
    const N: u64 = 50;

    let storage = tempfile::tempdir().unwrap();
    let secrets_dir = tempfile::tempdir().unwrap();
    let (addr, _server) = spawn_server(storage.path()).await;
    let mut client = connected_client(secrets_dir.path(), &addr).await;

    for id in 0..N {
        client.update("wide", id).await.unwrap();
    }

    let mut got = client.search("wide").await.unwrap();
    got.sort_unstable();
    assert_eq!(got, (0..N).collect::<Vec<_>>());
}

/// S6: a second `setup` call against an already-configured server is
/// rejected, not silently accepted or overwritten.
#[tokio::test]
async fn second_setup_is_rejected() {
    let storage = tempfile::tempdir().unwrap();
    let secrets_dir_a = tempfile::tempdir().unwrap();
    let secrets_dir_b = tempfile::tempdir().unwrap();
    let (addr, _server) = spawn_server(storage.path()).await;

    let mut client_a = connected_client(secrets_dir_a.path(), &addr).await;
    client_a.update("x", 1).await.unwrap();

    let (secrets_b, _pk_b) = Secrets::setup_new(secrets_dir_b.path()).unwrap();
    let mut client_b = Client::connect(secrets_b, addr).await.unwrap();
    let err = client_b.setup().await.unwrap_err();
    match err {
        fpsse_client::Error::Rpc(status) => {
            assert_eq!(status.code(), tonic::Code::FailedPrecondition);
        }
        other => panic!("expected an RPC FailedPrecondition, got {other}"),
    }
}
