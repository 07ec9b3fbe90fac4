//! Relay integration tests.
//!
//! Drive a real server with WebSocket clients: broadcast, persistence, ordering,
//! abrupt disconnects, history replay and origin restriction.

mod fixtures;

use fixtures::{TestClient, TestServer};
use tokio_tungstenite::{
    connect_async,
    tungstenite::{self, client::IntoClientRequest, http::HeaderValue},
};

const ALICE_HI: &str = r#"{"username":"alice","text":"hi"}"#;

#[tokio::test]
async fn test_broadcast_reaches_all_clients_and_is_logged_once() {
    // テスト項目: alice のメッセージが全クライアントに届き、ログに1件だけ記録される
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    let mut carol = TestClient::connect(&server).await;
    server.wait_for_connections(3).await;

    // when (操作):
    alice.send_chat("alice", "hi").await;

    // then (期待する結果):
    assert_eq!(bob.recv_text().await, ALICE_HI);
    assert_eq!(carol.recv_text().await, ALICE_HI);
    assert_eq!(alice.recv_text().await, ALICE_HI);
    assert_eq!(server.log_records(), vec![ALICE_HI]);
}

#[tokio::test]
async fn test_abrupt_disconnect_does_not_block_others() {
    // テスト項目: 途中で切断したクライアントがいても他のクライアントへの配信は続く
    // given (前提条件):
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let bob = TestClient::connect(&server).await;
    let mut carol = TestClient::connect(&server).await;
    server.wait_for_connections(3).await;

    // when (操作): bob がクローズハンドシェイクなしで切断
    bob.abort();
    alice.send_chat("alice", "hi").await;
    alice.send_chat("alice", "still there?").await;

    // then (期待する結果):
    assert_eq!(carol.recv_text().await, ALICE_HI);
    assert_eq!(
        carol.recv_text().await,
        r#"{"username":"alice","text":"still there?"}"#
    );
    server.wait_for_connections(2).await;
    assert_eq!(server.log_records().len(), 2);
}

#[tokio::test]
async fn test_concurrent_senders_observe_single_order() {
    // テスト項目: 同時送信されたメッセージは全受信者で同じ順序になり、ログ順とも一致する
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let mut bob = TestClient::connect(&server).await;
    let mut watcher = TestClient::connect(&server).await;
    server.wait_for_connections(3).await;

    let per_sender = 10;
    let (_, _) = tokio::join!(
        async {
            for n in 0..per_sender {
                alice.send_chat("alice", &n.to_string()).await;
            }
        },
        async {
            for n in 0..per_sender {
                bob.send_chat("bob", &n.to_string()).await;
            }
        }
    );

    let seen_by_watcher = watcher.recv_many(per_sender * 2).await;
    let seen_by_alice = alice.recv_many(per_sender * 2).await;
    let seen_by_bob = bob.recv_many(per_sender * 2).await;

    assert_eq!(seen_by_watcher, seen_by_alice);
    assert_eq!(seen_by_watcher, seen_by_bob);
    assert_eq!(server.log_records(), seen_by_watcher);
}

#[tokio::test]
async fn test_invalid_payload_closes_only_that_connection() {
    // テスト項目: デコードできないペイロードを送ったクライアントだけが切断される
    let server = TestServer::start().await;
    let mut mallory = TestClient::connect(&server).await;
    let mut alice = TestClient::connect(&server).await;
    server.wait_for_connections(2).await;

    mallory.send_raw("this is not json").await;

    assert!(mallory.closed_by_server().await);
    server.wait_for_connections(1).await;
    alice.send_chat("alice", "hi").await;
    assert_eq!(alice.recv_text().await, ALICE_HI);
    assert_eq!(server.log_records(), vec![ALICE_HI]);
}

#[tokio::test]
async fn test_closed_client_stops_receiving() {
    let server = TestServer::start().await;
    let mut alice = TestClient::connect(&server).await;
    let bob = TestClient::connect(&server).await;
    server.wait_for_connections(2).await;

    bob.close().await;
    server.wait_for_connections(1).await;
    alice.send_chat("alice", "hi").await;

    assert_eq!(alice.recv_text().await, ALICE_HI);
    assert_eq!(server.connections().await, 1);
}

#[tokio::test]
async fn test_history_replayed_to_new_connection() {
    // テスト項目: history-limit 設定時、新規接続に直近の履歴がリプレイされる
    // given (前提条件):
    let server = TestServer::start_with(&["--history-limit", "2"]).await;
    let mut alice = TestClient::connect(&server).await;
    server.wait_for_connections(1).await;
    for text in ["one", "two", "three"] {
        alice.send_chat("alice", text).await;
    }
    alice.recv_many(3).await;

    // when (操作):
    let mut late = TestClient::connect(&server).await;

    // then (期待する結果):
    assert_eq!(
        late.recv_many(2).await,
        vec![
            r#"{"username":"alice","text":"two"}"#,
            r#"{"username":"alice","text":"three"}"#,
        ]
    );
    server.wait_for_connections(2).await;
    alice.send_chat("alice", "four").await;
    assert_eq!(
        late.recv_text().await,
        r#"{"username":"alice","text":"four"}"#
    );
}

#[tokio::test]
async fn test_disallowed_origin_rejected() {
    // テスト項目: 許可リストにない Origin からのアップグレードは 403 で拒否される
    let server = TestServer::start_with(&["--allowed-origin", "https://chat.example"]).await;

    let mut request = server.ws_url().into_client_request().unwrap();
    request
        .headers_mut()
        .insert("Origin", HeaderValue::from_static("https://evil.example"));
    let result = connect_async(request).await;

    match result {
        Err(tungstenite::Error::Http(response)) => assert_eq!(response.status(), 403),
        Err(e) => panic!("expected HTTP 403, got {e}"),
        Ok(_) => panic!("expected HTTP 403, connection was accepted"),
    }
    assert_eq!(server.connections().await, 0);

    let mut request = server.ws_url().into_client_request().unwrap();
    request
        .headers_mut()
        .insert("Origin", HeaderValue::from_static("https://chat.example"));
    assert!(connect_async(request).await.is_ok());
}

#[tokio::test]
async fn test_log_survives_restart() {
    // テスト項目: 再起動後もログが残り、新しいサーバーで履歴としてリプレイされる
    // given (前提条件):
    let log_dir = tempfile::tempdir().unwrap();
    let server = TestServer::start_in(log_dir.path(), &[]).await;
    let mut alice = TestClient::connect(&server).await;
    server.wait_for_connections(1).await;
    alice.send_chat("alice", "hi").await;
    alice.recv_text().await;
    alice.close().await;
    server.stop().await.unwrap();

    // when (操作):
    let restarted = TestServer::start_in(log_dir.path(), &["--history-limit", "10"]).await;
    let mut bob = TestClient::connect(&restarted).await;

    // then (期待する結果):
    assert_eq!(bob.recv_text().await, ALICE_HI);
    assert_eq!(restarted.log_records(), vec![ALICE_HI]);
}
