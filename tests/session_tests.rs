mod common;

use std::sync::Arc;
use std::time::Duration;

use common::*;
use notion_chat_client::session::{
    ChatSession, ConnectionStatus, InputEdit, Message, Notification, Role, SidePanelTab,
};
use serde_json::json;
use tokio::sync::Notify;

#[tokio::test]
async fn test_full_turn_streams_into_one_answer() {
    let (session, mut server) = open_session(MemoryPages::default()).await;

    session.send("hi").unwrap();
    assert_eq!(
        server.next_frame().await,
        json!({"type": "chat", "message": "hi", "conversation_id": null})
    );

    server.push(json!({"type": "conversation_id", "data": "c1"}));
    server.push(json!({"type": "stream_start", "message_id": "m1"}));
    server.push(json!({"type": "stream", "content": "Hel"}));
    server.push(json!({"type": "stream", "content": "lo"}));
    server.push(json!({"type": "complete", "message_id": "m1"}));

    let state = wait_until(&session, |s| !s.is_streaming && s.messages.len() == 2).await;
    assert_eq!(state.messages[0], Message::user("hi"));
    assert_eq!(state.messages[1].role, Role::Assistant);
    assert_eq!(state.messages[1].content, "Hello");
    assert_eq!(state.messages[1].message_id.as_deref(), Some("m1"));
    assert_eq!(state.conversation_id.as_deref(), Some("c1"));
    assert!(state.active_stream_id.is_none());
}

#[tokio::test]
async fn test_follow_up_turn_carries_conversation_id() {
    let (session, mut server) = open_session(MemoryPages::default()).await;

    session.send("first").unwrap();
    server.next_frame().await;
    server.push(json!({"type": "conversation_id", "data": "c1"}));
    server.push(json!({"type": "stream_start", "message_id": "m1"}));
    server.push(json!({"type": "complete"}));
    wait_until(&session, |s| s.conversation_id.is_some() && s.messages.len() == 2 && !s.is_streaming).await;

    session.send("second").unwrap();
    assert_eq!(
        server.next_frame().await,
        json!({"type": "chat", "message": "second", "conversation_id": "c1"})
    );
}

#[tokio::test]
async fn test_send_while_streaming_is_ignored() {
    let (session, mut server) = open_session(MemoryPages::default()).await;

    session.send("one").unwrap();
    server.next_frame().await;
    server.push(json!({"type": "stream_start", "message_id": "m1"}));
    wait_until(&session, |s| s.is_streaming).await;

    session.send("two").unwrap();
    session.stop().unwrap();

    // The stop frame is the very next thing on the wire.
    assert_eq!(
        server.next_frame().await,
        json!({"type": "stop_generation", "message_id": "m1"})
    );
    let state = session.state();
    let user_messages = state.messages.iter().filter(|m| m.role == Role::User).count();
    assert_eq!(user_messages, 1);
}

#[tokio::test]
async fn test_stop_without_active_stream_sends_nothing() {
    let (session, mut server) = open_session(MemoryPages::default()).await;

    session.stop().unwrap();
    session.send("after").unwrap();

    assert_eq!(server.next_frame().await["type"], "chat");
    assert!(server.try_next_frame().is_none());
}

#[tokio::test]
async fn test_ping_is_answered_with_one_pong() {
    let (session, mut server) = open_session(MemoryPages::default()).await;
    let before = session.state();

    server.push(json!({"type": "ping"}));
    assert_eq!(server.next_frame().await, json!({"type": "pong"}));

    tokio::time::sleep(Duration::from_millis(20)).await;
    assert!(server.try_next_frame().is_none());
    assert_eq!(session.state(), before);
}

#[tokio::test]
async fn test_chunks_replace_previous_list() {
    let (session, server) = open_session(MemoryPages::default()).await;

    server.push(json!({"type": "chunks", "data": [
        {"page_title": "A", "chunk_content": "a", "similarity_score": 0.9, "page_id": "pa"},
        {"page_title": "B", "chunk_content": "b", "similarity_score": 0.8, "page_id": "pb"}
    ]}));
    wait_until(&session, |s| s.chunks.len() == 2).await;

    server.push(json!({"type": "chunks", "data": [
        {"page_title": "C", "chunk_content": "c", "similarity_score": 0.7, "page_id": "pc"}
    ]}));
    let state = wait_until(&session, |s| s.chunks.len() == 1).await;
    assert_eq!(state.chunks[0].source_title, "C");

    server.push(json!({"type": "chunks", "data": null}));
    wait_until(&session, |s| s.chunks.is_empty()).await;
}

#[tokio::test]
async fn test_stop_mid_stream_keeps_partial_answer() {
    let (mut session, mut server) = open_session(MemoryPages::default()).await;

    session.send("long question").unwrap();
    server.next_frame().await;
    server.push(json!({"type": "stream_start", "message_id": "m1"}));
    server.push(json!({"type": "stream", "content": "Partial ans"}));
    wait_until(&session, |s| s.last_message().map(|m| m.content.as_str()) == Some("Partial ans")).await;

    session.stop().unwrap();
    assert_eq!(
        server.next_frame().await,
        json!({"type": "stop_generation", "message_id": "m1"})
    );
    server.push(json!({"type": "generation_stopped", "message_id": "m1"}));

    assert_eq!(next_notice(&mut session).await, Notification::GenerationStopped);
    let state = wait_until(&session, |s| !s.is_streaming).await;
    assert!(state.active_stream_id.is_none());
    assert_eq!(state.messages[1].content, "Partial ans");
}

#[tokio::test]
async fn test_error_mid_stream_recovers() {
    let (mut session, mut server) = open_session(MemoryPages::default()).await;

    session.send("q").unwrap();
    server.next_frame().await;
    server.push(json!({"type": "stream_start", "message_id": "m1"}));
    server.push(json!({"type": "error", "message": "rate limited"}));

    let notice = next_notice(&mut session).await;
    assert_eq!(notice.to_string(), "rate limited");
    let state = wait_until(&session, |s| !s.is_streaming).await;
    assert_eq!(state.connection, ConnectionStatus::Open);
    assert!(state.active_stream_id.is_none());

    session.send("again").unwrap();
    assert_eq!(server.next_frame().await["message"], "again");
}

#[tokio::test]
async fn test_error_without_message_uses_default_text() {
    let (mut session, server) = open_session(MemoryPages::default()).await;

    server.push(json!({"type": "error"}));
    assert_eq!(next_notice(&mut session).await.to_string(), "An error occurred");
}

#[tokio::test]
async fn test_idle_timeout_notice() {
    let (mut session, server) = open_session(MemoryPages::default()).await;

    server.push(json!({"type": "idle_timeout"}));
    assert_eq!(next_notice(&mut session).await, Notification::IdleTimeout);
}

#[tokio::test]
async fn test_malformed_and_unknown_frames_are_ignored() {
    let (session, mut server) = open_session(MemoryPages::default()).await;

    server.push_raw("definitely not json");
    server.push(json!({"type": "typing", "who": "assistant"}));
    server.push(json!({"type": "stream_start"}));
    server.push(json!({"type": "ping"}));

    assert_eq!(server.next_frame().await, json!({"type": "pong"}));
    let state = session.state();
    assert!(state.is_open());
    assert!(state.messages.is_empty());
    assert!(!state.is_streaming);
}

#[tokio::test]
async fn test_server_close_keeps_partial_content() {
    let (mut session, mut server) = open_session(MemoryPages::default()).await;

    session.send("q").unwrap();
    server.next_frame().await;
    server.push(json!({"type": "stream_start", "message_id": "m1"}));
    server.push(json!({"type": "stream", "content": "half"}));
    wait_until(&session, |s| s.last_message().map(|m| m.content.as_str()) == Some("half")).await;

    let FakeServer { to_client, .. } = server;
    drop(to_client);

    assert_eq!(next_notice(&mut session).await, Notification::Disconnected);
    let state = wait_until(&session, |s| s.connection == ConnectionStatus::Closed).await;
    assert!(!state.is_streaming);
    assert_eq!(state.messages[1].content, "half");

    // Closed is terminal for outbound operations.
    session.send("ignored").unwrap();
    tokio::time::sleep(Duration::from_millis(20)).await;
    assert_eq!(session.state().messages.len(), 2);
}

#[tokio::test]
async fn test_connect_failure_reports_error() {
    let connector = ChannelConnector::new(ConnectOutcome::Fail("refused".to_string()));
    let mut session = ChatSession::connect_with(Arc::new(connector), Arc::new(MemoryPages::default()), endpoint());

    match next_notice(&mut session).await {
        Notification::ConnectionError(reason) => assert!(reason.contains("refused")),
        other => panic!("unexpected notice {:?}", other),
    }
    assert_eq!(session.state().connection, ConnectionStatus::Closed);
}

#[tokio::test]
async fn test_input_buffer_submit() {
    let (session, mut server) = open_session(MemoryPages::default()).await;

    for ch in "hey".chars() {
        session.edit_input(InputEdit::Insert(ch)).unwrap();
    }
    session.edit_input(InputEdit::Backspace).unwrap();
    session.edit_input(InputEdit::Insert('!')).unwrap();
    session.submit().unwrap();

    assert_eq!(server.next_frame().await["message"], "he!");
    let state = wait_until(&session, |s| s.messages.len() == 1).await;
    assert!(state.input.is_empty());
}

#[tokio::test]
async fn test_view_page_switches_tab() {
    let (session, _server) = open_session(MemoryPages::default().with_page("p1", "Full page text")).await;

    session.view_page("p1").unwrap();
    let state = wait_until(&session, |s| s.page_content.is_some()).await;
    assert_eq!(state.page_content.as_deref(), Some("Full page text"));
    assert_eq!(state.active_tab, SidePanelTab::Page);

    session.select_tab(SidePanelTab::Chunks).unwrap();
    wait_until(&session, |s| s.active_tab == SidePanelTab::Chunks).await;
}

#[tokio::test]
async fn test_failed_page_fetch_notifies() {
    let (mut session, _server) = open_session(MemoryPages::default()).await;

    session.view_page("missing").unwrap();
    assert_eq!(next_notice(&mut session).await, Notification::PageLoadFailed);
    assert!(session.state().page_content.is_none());
}

#[tokio::test]
async fn test_stream_continues_while_page_fetch_pending() {
    let gate = Arc::new(Notify::new());
    let pages = MemoryPages::default()
        .with_page("p1", "slow page")
        .gated(Arc::clone(&gate));
    let (session, mut server) = open_session(pages).await;

    session.send("q").unwrap();
    server.next_frame().await;
    session.view_page("p1").unwrap();

    server.push(json!({"type": "stream_start", "message_id": "m1"}));
    server.push(json!({"type": "stream", "content": "still flowing"}));
    server.push(json!({"type": "complete"}));
    let state = wait_until(&session, |s| s.messages.len() == 2 && !s.is_streaming).await;
    assert_eq!(state.messages[1].content, "still flowing");
    assert!(state.page_content.is_none());

    gate.notify_one();
    wait_until(&session, |s| s.page_content.as_deref() == Some("slow page")).await;
}

#[tokio::test]
async fn test_dispose_closes_and_silences() {
    let (mut session, server) = open_session(MemoryPages::default()).await;
    let mut observer = session.watch();

    session.dispose().await;

    assert!(server.is_closed_by_client());
    assert!(server.client_gone());
    assert!(session.is_disposed());

    // Nothing reaches the session any more.
    let _ = server.to_client.send(json!({"type": "stream_start", "message_id": "late"}).to_string());
    observer.borrow_and_update();
    assert!(observer.changed().await.is_err());
    assert!(session.next_notification().await.is_none());
    assert!(session.send("late").is_err());

    // Second dispose is harmless.
    session.dispose().await;
}

#[tokio::test]
async fn test_dispose_while_connecting() {
    let connector = ChannelConnector::new(ConnectOutcome::Hang);
    let mut session = ChatSession::connect_with(Arc::new(connector), Arc::new(MemoryPages::default()), endpoint());
    assert_eq!(session.state().connection, ConnectionStatus::Connecting);

    tokio::time::timeout(WAIT, session.dispose())
        .await
        .expect("dispose hung on a pending handshake");
    assert!(session.state().disposed);
}

#[tokio::test]
async fn test_drop_disposes_in_background() {
    let (session, server) = open_session(MemoryPages::default()).await;
    drop(session);

    tokio::time::timeout(WAIT, async {
        while !server.client_gone() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("transport outlived the dropped session");
    assert!(server.is_closed_by_client());
}
