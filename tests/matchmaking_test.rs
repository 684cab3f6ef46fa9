//! Integration tests for the two matchmaking entry points: the random queue
//! and the waiting room.

use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

type WsStream =
    tokio_tungstenite::WebSocketStream<tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>>;
type WsWrite = futures_util::stream::SplitSink<WsStream, Message>;
type WsRead = futures_util::stream::SplitStream<WsStream>;

/// Helper: start the server on a random port.
async fn start_test_server() -> SocketAddr {
    let tmp_dir = tempfile::tempdir().expect("Failed to create temp dir");
    let data_dir = tmp_dir.path().to_str().unwrap().to_string();

    let db = hobby_matcher_server::db::init_db(&data_dir).expect("Failed to init DB");
    let state = hobby_matcher_server::state::AppState::new(db);
    let app = hobby_matcher_server::routes::build_router(
        state,
        &["http://localhost:5173".to_string()],
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
        let _keep = tmp_dir;
    });

    addr
}

async fn connect(addr: &SocketAddr) -> (WsWrite, WsRead) {
    let ws_url = format!("ws://{}/ws", addr);
    let (ws_stream, _) = tokio_tungstenite::connect_async(&ws_url)
        .await
        .expect("Failed to connect to WebSocket");
    ws_stream.split()
}

async fn send_event(write: &mut WsWrite, event: &str, data: Value) {
    let frame = json!({ "event": event, "data": data }).to_string();
    write
        .send(Message::Text(frame.into()))
        .await
        .expect("Failed to send frame");
}

/// Read the next JSON event frame, skipping transport ping/pong.
async fn recv_event(read: &mut WsRead) -> (String, Value) {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(2), read.next())
            .await
            .expect("Timed out waiting for event")
            .expect("Stream ended")
            .expect("WebSocket error");

        match msg {
            Message::Text(text) => {
                let frame: Value =
                    serde_json::from_str(text.as_str()).expect("Invalid JSON frame");
                let event = frame["event"]
                    .as_str()
                    .expect("Frame missing event name")
                    .to_string();
                let data = frame.get("data").cloned().unwrap_or(Value::Null);
                return (event, data);
            }
            Message::Ping(_) | Message::Pong(_) => continue,
            other => panic!("Unexpected message: {:?}", other),
        }
    }
}

/// Assert that no event frame arrives within the window.
async fn assert_silent(read: &mut WsRead, window: Duration) {
    let result = tokio::time::timeout(window, read.next()).await;
    match result {
        Err(_) => {}
        Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => {}
        Ok(other) => panic!("Expected silence, got: {:?}", other),
    }
}

fn join_payload(user_id: &str, username: &str) -> Value {
    json!({ "userId": user_id, "username": username })
}

#[tokio::test]
async fn test_first_joiner_waits_second_matches() {
    let addr = start_test_server().await;
    let (mut a_write, mut a_read) = connect(&addr).await;
    let (mut b_write, mut b_read) = connect(&addr).await;

    send_event(&mut a_write, "join-random-queue", join_payload("1", "alice")).await;
    let (event, _) = recv_event(&mut a_read).await;
    assert_eq!(event, "waiting-for-match");

    send_event(&mut b_write, "join-random-queue", join_payload("2", "bob")).await;

    let (event, b_data) = recv_event(&mut b_read).await;
    assert_eq!(event, "random-match-found");
    assert_eq!(b_data["peer"]["username"], "alice");
    assert_eq!(b_data["peer"]["id"], "1");

    let (event, a_data) = recv_event(&mut a_read).await;
    assert_eq!(event, "random-match-found");
    assert_eq!(a_data["peer"]["username"], "bob");
    assert_eq!(a_data["peer"]["id"], "2");

    // Both sides share one room id, minted for this match
    assert_eq!(a_data["roomId"], b_data["roomId"]);
    assert!(a_data["roomId"]
        .as_str()
        .expect("roomId should be a string")
        .starts_with("random-"));

    // Queue is empty again: a third user waits
    let (mut c_write, mut c_read) = connect(&addr).await;
    send_event(&mut c_write, "join-random-queue", join_payload("3", "carol")).await;
    let (event, _) = recv_event(&mut c_read).await;
    assert_eq!(event, "waiting-for-match");
}

#[tokio::test]
async fn test_duplicate_join_is_queued_once() {
    let addr = start_test_server().await;
    let (mut a_write, mut a_read) = connect(&addr).await;

    send_event(&mut a_write, "join-random-queue", join_payload("1", "alice")).await;
    let (event, _) = recv_event(&mut a_read).await;
    assert_eq!(event, "waiting-for-match");

    // Second join while waiting: silent no-op
    send_event(&mut a_write, "join-random-queue", join_payload("1", "alice")).await;
    assert_silent(&mut a_read, Duration::from_millis(300)).await;

    // One match consumes the single entry
    let (mut b_write, mut b_read) = connect(&addr).await;
    send_event(&mut b_write, "join-random-queue", join_payload("2", "bob")).await;
    let (event, _) = recv_event(&mut b_read).await;
    assert_eq!(event, "random-match-found");
    let (event, _) = recv_event(&mut a_read).await;
    assert_eq!(event, "random-match-found");

    // No stale duplicate left behind
    let (mut c_write, mut c_read) = connect(&addr).await;
    send_event(&mut c_write, "join-random-queue", join_payload("3", "carol")).await;
    let (event, _) = recv_event(&mut c_read).await;
    assert_eq!(event, "waiting-for-match");
}

#[tokio::test]
async fn test_leave_queue_prevents_match() {
    let addr = start_test_server().await;
    let (mut a_write, mut a_read) = connect(&addr).await;

    send_event(&mut a_write, "join-random-queue", join_payload("1", "alice")).await;
    let (event, _) = recv_event(&mut a_read).await;
    assert_eq!(event, "waiting-for-match");

    send_event(&mut a_write, "leave-random-queue", json!("1")).await;

    let (mut b_write, mut b_read) = connect(&addr).await;
    send_event(&mut b_write, "join-random-queue", join_payload("2", "bob")).await;
    let (event, _) = recv_event(&mut b_read).await;
    assert_eq!(event, "waiting-for-match");
    assert_silent(&mut a_read, Duration::from_millis(300)).await;
}

#[tokio::test]
async fn test_disconnect_removes_queued_entry() {
    let addr = start_test_server().await;

    {
        let (mut a_write, mut a_read) = connect(&addr).await;
        send_event(&mut a_write, "join-random-queue", join_payload("1", "alice")).await;
        let (event, _) = recv_event(&mut a_read).await;
        assert_eq!(event, "waiting-for-match");

        a_write
            .send(Message::Close(None))
            .await
            .expect("Failed to send close");
    }

    // Give the server a moment to clean up
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (mut b_write, mut b_read) = connect(&addr).await;
    send_event(&mut b_write, "join-random-queue", join_payload("2", "bob")).await;
    let (event, _) = recv_event(&mut b_read).await;
    assert_eq!(event, "waiting-for-match");
}

#[tokio::test]
async fn test_matched_parties_do_not_linger() {
    let addr = start_test_server().await;
    let (mut a_write, mut a_read) = connect(&addr).await;
    let (mut b_write, mut b_read) = connect(&addr).await;

    send_event(&mut a_write, "join-random-queue", join_payload("1", "alice")).await;
    recv_event(&mut a_read).await; // waiting
    send_event(&mut b_write, "join-random-queue", join_payload("2", "bob")).await;
    recv_event(&mut b_read).await; // matched
    recv_event(&mut a_read).await; // matched

    // Both matched connections drop; their disconnect cleanup must find
    // nothing, and a later joiner sees an empty queue
    drop((a_write, a_read));
    drop((b_write, b_read));
    tokio::time::sleep(Duration::from_millis(100)).await;

    let (mut c_write, mut c_read) = connect(&addr).await;
    send_event(&mut c_write, "join-random-queue", join_payload("3", "carol")).await;
    let (event, _) = recv_event(&mut c_read).await;
    assert_eq!(event, "waiting-for-match");
}

#[tokio::test]
async fn test_waiting_room_variant_matches() {
    let addr = start_test_server().await;
    let (mut a_write, mut a_read) = connect(&addr).await;
    let (mut b_write, mut b_read) = connect(&addr).await;

    send_event(&mut a_write, "join-waiting-room", join_payload("1", "alice")).await;
    let (event, _) = recv_event(&mut a_read).await;
    assert_eq!(event, "waiting-for-match");

    send_event(&mut b_write, "join-waiting-room", join_payload("2", "bob")).await;

    let (event, b_data) = recv_event(&mut b_read).await;
    assert_eq!(event, "match-found");
    assert_eq!(b_data["peer"]["username"], "alice");

    let (event, a_data) = recv_event(&mut a_read).await;
    assert_eq!(event, "match-found");
    assert_eq!(a_data["peer"]["username"], "bob");
    assert_eq!(a_data["roomId"], b_data["roomId"]);
}

#[tokio::test]
async fn test_waiting_room_never_self_matches() {
    let addr = start_test_server().await;
    let (mut a_write, mut a_read) = connect(&addr).await;
    let (mut b_write, mut b_read) = connect(&addr).await;

    // The same user from two connections: the room variant has no join
    // dedupe, but the match scan skips the user's own entries
    send_event(&mut a_write, "join-waiting-room", join_payload("1", "alice")).await;
    let (event, _) = recv_event(&mut a_read).await;
    assert_eq!(event, "waiting-for-match");

    send_event(&mut b_write, "join-waiting-room", join_payload("1", "alice")).await;
    let (event, _) = recv_event(&mut b_read).await;
    assert_eq!(event, "waiting-for-match");

    // A genuinely different user matches the earliest entry
    let (mut c_write, mut c_read) = connect(&addr).await;
    send_event(&mut c_write, "join-waiting-room", join_payload("2", "bob")).await;
    let (event, c_data) = recv_event(&mut c_read).await;
    assert_eq!(event, "match-found");
    assert_eq!(c_data["peer"]["id"], "1");
    let (event, _) = recv_event(&mut a_read).await;
    assert_eq!(event, "match-found");
}

#[tokio::test]
async fn test_leave_waiting_room() {
    let addr = start_test_server().await;
    let (mut a_write, mut a_read) = connect(&addr).await;

    send_event(&mut a_write, "join-waiting-room", join_payload("1", "alice")).await;
    recv_event(&mut a_read).await; // waiting
    send_event(&mut a_write, "leave-waiting-room", json!("1")).await;

    let (mut b_write, mut b_read) = connect(&addr).await;
    send_event(&mut b_write, "join-waiting-room", join_payload("2", "bob")).await;
    let (event, _) = recv_event(&mut b_read).await;
    assert_eq!(event, "waiting-for-match");
}

#[tokio::test]
async fn test_join_without_user_id_is_rejected() {
    let addr = start_test_server().await;
    let (mut a_write, mut a_read) = connect(&addr).await;

    send_event(&mut a_write, "join-random-queue", join_payload("", "alice")).await;
    let (event, data) = recv_event(&mut a_read).await;
    assert_eq!(event, "matching-error");
    assert!(data["message"].as_str().unwrap().contains("user id"));
}
