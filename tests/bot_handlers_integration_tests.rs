mod common;

use common::{engine_with, setup_store, Delivered, FakeEnvironment, RecordingTransport};
use eco_bot::bot::engine::Inbound;
use eco_bot::bot::handlers::process_event;
use eco_bot::bot::menu::PROFILE_BUTTON;
use eco_bot::bot::transport::Keyboard;

#[tokio::test]
async fn test_process_event_delivers_engine_replies() {
    let (store, _db, _dir) = setup_store().await;
    let engine = engine_with(store.clone(), FakeEnvironment::returning(18.0, "ясно", 30));
    let transport = RecordingTransport::new();

    process_event(&engine, transport.as_ref(), 55, Inbound::Message("/start".to_string())).await;
    process_event(&engine, transport.as_ref(), 55, Inbound::Message("Ужгород".to_string())).await;
    process_event(&engine, transport.as_ref(), 55, Inbound::Message(PROFILE_BUTTON.to_string())).await;

    let delivered = transport.delivered();
    assert_eq!(delivered.len(), 3);
    assert!(matches!(
        &delivered[0],
        Delivered::Sent { user_id: 55, keyboard: Keyboard::None, .. }
    ));
    assert!(matches!(
        &delivered[1],
        Delivered::Sent { keyboard: Keyboard::MainMenu, text, .. } if text.contains("uzhhorod")
    ));
    assert!(transport.texts()[2].contains("Місій: 0"));
}

#[tokio::test]
async fn test_quiz_callback_edits_original_message() {
    let (store, _db, _dir) = setup_store().await;
    let engine = engine_with(store.clone(), FakeEnvironment::returning(0.0, "", 0));
    let transport = RecordingTransport::new();

    process_event(
        &engine,
        transport.as_ref(),
        9,
        Inbound::Callback { payload: "2:2".to_string(), message_id: Some(314) },
    )
    .await;

    assert_eq!(
        transport.delivered(),
        vec![Delivered::Edited { user_id: 9, message_id: 314, text: "Правильно!".to_string() }]
    );
}

#[tokio::test]
async fn test_malformed_callback_delivers_nothing() {
    let (store, _db, _dir) = setup_store().await;
    let engine = engine_with(store.clone(), FakeEnvironment::returning(0.0, "", 0));
    let transport = RecordingTransport::new();

    process_event(
        &engine,
        transport.as_ref(),
        9,
        Inbound::Callback { payload: "junk".to_string(), message_id: Some(1) },
    )
    .await;

    assert!(transport.delivered().is_empty());
}

#[tokio::test]
async fn test_storage_failure_is_reported_to_user() {
    let (store, db, _dir) = setup_store().await;
    let engine = engine_with(store.clone(), FakeEnvironment::returning(0.0, "", 0));
    let transport = RecordingTransport::new();
    db.pool.close().await;

    process_event(&engine, transport.as_ref(), 21, Inbound::Message("/start".to_string())).await;

    let texts = transport.texts();
    assert_eq!(texts.len(), 1);
    assert!(texts[0].contains("спробуй"));
    assert!(store.get(21).await.is_none());
}

#[tokio::test]
async fn test_transport_failure_does_not_roll_back_state() {
    let (store, _db, _dir) = setup_store().await;
    let engine = engine_with(store.clone(), FakeEnvironment::returning(0.0, "", 0));

    process_event(
        &engine,
        RecordingTransport::failing().as_ref(),
        33,
        Inbound::Message("Mykolaiv".to_string()),
    )
    .await;

    assert_eq!(store.get(33).await.unwrap().city, "mykolaiv");
}
