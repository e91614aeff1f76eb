//! Message submission lifecycle

mod common;

use std::time::Duration;

use common::{settle, GenerateReply, Harness, HealthReply, MetricsReply, MockApi};
use magpt_config::SettingChange;
use magpt_session::{SendOutcome, Sender, TranscriptEntry, UiEvent, NOT_CONNECTED_MESSAGE};
use proptest::prelude::*;

#[tokio::test(start_paused = true)]
async fn test_reply_is_appended_with_metrics() {
    let mut harness = Harness::connected().await;
    harness.drain();

    let outcome = harness.session.controller.send_message("Hello").await;
    assert_eq!(outcome, SendOutcome::Delivered);

    let transcript = harness.session.transcript();
    let transcript = transcript.read();
    let messages: Vec<_> = transcript.messages().collect();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0].text, "Hello");
    assert_eq!(messages[0].sender, Sender::User);
    assert_eq!(messages[1].text, "Hi there");
    assert_eq!(messages[1].sender, Sender::Assistant);
    assert!(messages[1].annotation().unwrap().contains("12.5 tok/s"));
    assert!(!transcript.has_loading());

    let request = harness.api.last_request.lock().clone().unwrap();
    assert_eq!(request.prompt, "Hello");
    assert_eq!(request.max_new_tokens, 50);
    assert_eq!(request.top_k, 40);
    assert!(request.model_id.is_none());
}

#[tokio::test(start_paused = true)]
async fn test_events_follow_send_order() {
    let mut harness = Harness::connected().await;
    harness.drain();

    harness.session.controller.send_message("  Hello  ").await;
    let events = harness.drain();

    assert_eq!(events.len(), 8);
    assert_eq!(events[0], UiEvent::SendingChanged(true));
    assert_eq!(events[1], UiEvent::ComposeCleared);
    assert!(matches!(&events[2], UiEvent::MessageAppended(m) if m.text == "Hello"));
    let UiEvent::LoadingShown(loading) = events[3] else {
        panic!("expected placeholder, got {:?}", events[3]);
    };
    assert_eq!(events[4], UiEvent::LoadingRemoved(loading));
    assert!(matches!(&events[5], UiEvent::MessageAppended(m) if m.sender == Sender::Assistant));
    assert_eq!(events[6], UiEvent::SendingChanged(false));
    assert_eq!(events[7], UiEvent::ComposeFocused);
}

#[tokio::test(start_paused = true)]
async fn test_blank_input_is_ignored() {
    let mut harness = Harness::connected().await;
    harness.drain();

    assert_eq!(harness.session.controller.send_message("").await, SendOutcome::Empty);
    assert_eq!(
        harness.session.controller.send_message("   \n\t").await,
        SendOutcome::Empty
    );

    assert_eq!(harness.api.generate_calls(), 0);
    assert!(harness.drain().is_empty());
    assert_eq!(harness.session.transcript().read().message_count(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_send_while_disconnected_triggers_one_check() {
    let harness = Harness::new(MockApi::new(HealthReply::Refused));

    let outcome = harness.session.controller.send_message("hello").await;
    assert_eq!(outcome, SendOutcome::NotConnected);
    settle().await;

    assert_eq!(harness.api.generate_calls(), 0);
    assert_eq!(harness.api.health_calls(), 1);
    assert_eq!(harness.session.transcript().read().message_count(), 0);

    let notices = harness.session.notices.active();
    assert_eq!(notices.len(), 1);
    assert_eq!(notices[0].text, NOT_CONNECTED_MESSAGE);
    assert!(!harness.session.controller.is_sending());
}

#[tokio::test(start_paused = true)]
async fn test_rapid_sends_issue_one_generation() {
    let harness = Harness::connected().await;
    harness.api.set_generate(GenerateReply::Gated("slow reply"));
    let controller = harness.session.controller.clone();

    let first = tokio::spawn({
        let controller = controller.clone();
        async move { controller.send_message("first").await }
    });
    settle().await;
    assert!(controller.is_sending());

    assert_eq!(controller.send_message("second").await, SendOutcome::Busy);
    assert_eq!(controller.send_message("third").await, SendOutcome::Busy);

    harness.api.release();
    assert_eq!(first.await.unwrap(), SendOutcome::Delivered);

    assert_eq!(harness.api.generate_calls(), 1);
    assert!(!controller.is_sending());
    let transcript = harness.session.transcript();
    let texts: Vec<_> = transcript
        .read()
        .messages()
        .map(|m| m.text.clone())
        .collect();
    assert_eq!(texts, vec!["first", "slow reply"]);
}

#[tokio::test(start_paused = true)]
async fn test_placeholder_visible_while_generating() {
    let harness = Harness::connected().await;
    harness.api.set_generate(GenerateReply::Gated("done"));
    let controller = harness.session.controller.clone();

    let send = tokio::spawn({
        let controller = controller.clone();
        async move { controller.send_message("Hello").await }
    });
    settle().await;

    {
        let transcript = harness.session.transcript();
        let transcript = transcript.read();
        let entries = transcript.entries();
        assert_eq!(entries.len(), 2);
        assert!(matches!(&entries[0], TranscriptEntry::Message(m) if m.text == "Hello"));
        assert!(matches!(entries[1], TranscriptEntry::Loading(_)));
    }

    harness.api.release();
    send.await.unwrap();
    assert!(!harness.session.transcript().read().has_loading());
}

#[tokio::test(start_paused = true)]
async fn test_server_error_shows_transient_notice() {
    let mut harness = Harness::connected().await;
    harness
        .api
        .set_generate(GenerateReply::Status(500, Some("OOM")));
    harness.drain();

    let outcome = harness.session.controller.send_message("Hello").await;
    assert_eq!(outcome, SendOutcome::Failed("OOM".to_string()));

    {
        let transcript = harness.session.transcript();
        let transcript = transcript.read();
        assert_eq!(transcript.message_count(), 1);
        assert!(!transcript.has_loading());
    }
    assert_eq!(harness.session.notices.active()[0].text, "Error: OOM");
    assert!(harness.session.monitor.is_connected());

    let events = harness.drain();
    let finalized = events
        .iter()
        .filter(|e| **e == UiEvent::SendingChanged(false))
        .count();
    assert_eq!(finalized, 1);

    tokio::time::sleep(Duration::from_millis(5_350)).await;
    assert!(harness.session.notices.active().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_error_without_detail_uses_generic_reason() {
    let harness = Harness::connected().await;
    harness.api.set_generate(GenerateReply::Status(502, None));

    harness.session.controller.send_message("Hello").await;
    assert_eq!(
        harness.session.notices.active()[0].text,
        "Error: Generation failed"
    );
}

#[tokio::test(start_paused = true)]
async fn test_transport_failure_reports_message() {
    let harness = Harness::connected().await;
    harness.api.set_generate(GenerateReply::Refused);

    let outcome = harness.session.controller.send_message("Hello").await;
    assert!(matches!(outcome, SendOutcome::Failed(ref reason) if reason.contains("connection refused")));
    assert!(harness.session.notices.active()[0]
        .text
        .starts_with("Error: error sending request"));
    assert!(!harness.session.controller.is_sending());
}

#[tokio::test(start_paused = true)]
async fn test_metrics_failure_is_swallowed() {
    let harness = Harness::connected().await;
    harness.api.set_metrics(MetricsReply::Refused);

    assert_eq!(
        harness.session.controller.send_message("Hello").await,
        SendOutcome::Delivered
    );

    let transcript = harness.session.transcript();
    let transcript = transcript.read();
    let reply = transcript.message(2).unwrap();
    assert_eq!(reply.text, "Hi there");
    assert!(reply.metrics.is_none());
    assert!(reply.annotation().is_none());
    assert!(harness.session.notices.active().is_empty());
}

#[tokio::test(start_paused = true)]
async fn test_selected_model_is_sent() {
    let harness = Harness::connected().await;
    harness
        .prefs
        .apply(SettingChange::Model(Some("syr-small".to_string())))
        .unwrap();

    harness.session.controller.send_message("Hello").await;

    let request = harness.api.last_request.lock().clone().unwrap();
    assert_eq!(request.model_id.as_deref(), Some("syr-small"));
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_send_releases_flag() {
    let harness = Harness::connected().await;
    harness.api.set_generate(GenerateReply::Gated("never"));
    let controller = harness.session.controller.clone();

    let abandoned =
        tokio::time::timeout(Duration::from_secs(1), controller.send_message("Hello")).await;
    assert!(abandoned.is_err());
    assert!(!controller.is_sending());

    harness.api.set_generate(GenerateReply::Text("again"));
    assert_eq!(controller.send_message("Hello").await, SendOutcome::Delivered);
}

#[tokio::test(start_paused = true)]
async fn test_copy_text_by_position() {
    let harness = Harness::connected().await;
    harness.session.controller.send_message("Hello").await;

    let controller = &harness.session.controller;
    assert_eq!(controller.message_text(1).unwrap(), "Hello");
    assert_eq!(controller.message_text(2).unwrap(), "Hi there");
    assert!(controller.message_text(3).is_err());
}

proptest! {
    #[test]
    fn prop_whitespace_never_generates(input in "[ \t\r\n]{0,16}") {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let harness = Harness::connected().await;
            let outcome = harness.session.controller.send_message(&input).await;
            prop_assert_eq!(outcome, SendOutcome::Empty);
            prop_assert_eq!(harness.api.generate_calls(), 0);
            Ok(())
        })?;
    }

    #[test]
    fn prop_prompt_is_trimmed(word in "[a-z]{1,12}", pad in "[ \t]{0,4}") {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        runtime.block_on(async {
            let harness = Harness::connected().await;
            let input = format!("{pad}{word}{pad}");
            harness.session.controller.send_message(&input).await;
            let request = harness.api.last_request.lock().clone().unwrap();
            prop_assert_eq!(request.prompt, word.clone());
            Ok(())
        })?;
    }
}

#[test]
fn test_controller_is_shareable() {
    fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<magpt_session::ConversationController>();
    assert_send_sync::<magpt_session::ChatSession>();
}
