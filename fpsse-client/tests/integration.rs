//! Client-only integration tests: secrets persistence and failure modes
//! that don't require a live server.

use fpsse_client::{Client, Secrets, StateMachine};

#[test]
fn reloaded_secrets_continue_the_same_counter_sequence() {
    let dir = tempfile::tempdir().unwrap();
    let secrets_dir = dir.path().join("secrets");

    {
        let (secrets, _pk) = Secrets::setup_new(&secrets_dir).unwrap();
        let sm = StateMachine::new(&secrets);
        sm.update_request("rust", 1).unwrap();
        sm.update_request("rust", 2).unwrap();
    }

    let reloaded = Secrets::setup_from_directory(&secrets_dir).unwrap();
    let sm = StateMachine::new(&reloaded);
    let search = sm.search_request("rust").unwrap();
    assert_eq!(search.add_count, 2);

    // A further update after reload keeps incrementing from where the
    // previous process left off, not from zero.
    sm.update_request("rust", 3).unwrap();
    let search = sm.search_request("rust").unwrap();
    assert_eq!(search.add_count, 3);
}

#[tokio::test]
async fn connecting_to_a_closed_port_fails() {
    let dir = tempfile::tempdir().unwrap();
    let secrets_dir = dir.path().join("secrets");
    let (secrets, _pk) = Secrets::setup_new(&secrets_dir).unwrap();

    // Bind and immediately drop a listener to obtain a port nothing is
    // actually serving on.
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let result = Client::connect(secrets, format!("http://{addr}")).await;
    assert!(result.is_err());
}
