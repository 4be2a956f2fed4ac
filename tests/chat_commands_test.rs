use httpmock::prelude::*;
use numcheck::core::commands::MENU;
use numcheck::{bootstrap, App, TomlConfig};
use serde_json::json;
use tempfile::TempDir;

struct Fixture {
    server: MockServer,
    app: App,
    _temp_dir: TempDir,
}

async fn fixture() -> Fixture {
    let temp_dir = TempDir::new().unwrap();
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method(GET).path("/status");
        then.status(200).json_body(json!({ "connection": "open" }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/check")
            .json_body(json!({ "jid": "111@s.whatsapp.net" }));
        then.status(200).json_body(json!({ "registered": true }));
    });
    server.mock(|when, then| {
        when.method(POST)
            .path("/check")
            .json_body(json!({ "jid": "222@s.whatsapp.net" }));
        then.status(200).json_body(json!({ "registered": false }));
    });

    let mut config = TomlConfig::default();
    config.directory.base_url = server.base_url();
    config.notification.settings_file = temp_dir
        .path()
        .join("settings.json")
        .to_str()
        .unwrap()
        .to_string();

    let app = bootstrap(&config).await.unwrap();
    app.refresh_session().await;
    Fixture {
        server,
        app,
        _temp_dir: temp_dir,
    }
}

#[tokio::test]
async fn test_menu_and_unknown_commands() {
    let fx = fixture().await;
    let handler = fx.app.command_handler();

    assert_eq!(handler.handle("alice", ".menu").await.as_deref(), Some(MENU));
    assert!(handler
        .handle("alice", ".video https://example.com")
        .await
        .unwrap()
        .starts_with("Unknown command"));
    assert_eq!(handler.handle("alice", "just chatting").await, None);
}

#[tokio::test]
async fn test_inline_check() {
    let fx = fixture().await;
    let handler = fx.app.command_handler();

    let reply = handler.handle("alice", ".check 111, 222").await.unwrap();

    assert!(reply.contains("111 is registered on WhatsApp."));
    assert!(reply.contains("222 is NOT registered on WhatsApp."));
    assert!(reply.ends_with("Registered: 1\nNot Registered: 1"));
}

#[tokio::test]
async fn test_pending_reply_is_scoped_to_sender() {
    let fx = fixture().await;
    let handler = fx.app.command_handler();

    let prompt = handler.handle("alice", ".check").await.unwrap();
    assert!(prompt.starts_with("Reply with the numbers"));

    // bob's plain message must not answer alice's prompt
    assert_eq!(handler.handle("bob", "222").await, None);

    let reply = handler.handle("alice", "111").await.unwrap();
    assert!(reply.contains("111 is registered on WhatsApp."));

    // the prompt was consumed
    assert_eq!(handler.handle("alice", "111").await, None);
}

#[tokio::test]
async fn test_new_command_cancels_pending_reply() {
    let fx = fixture().await;
    let handler = fx.app.command_handler();

    handler.handle("alice", ".setnum").await.unwrap();
    handler.handle("alice", ".menu").await.unwrap();

    assert_eq!(handler.handle("alice", "923145151029").await, None);
    assert!(fx.app.service.target().await.is_none());
}

#[tokio::test]
async fn test_setnum_via_follow_up() {
    let fx = fixture().await;
    let handler = fx.app.command_handler();

    let prompt = handler.handle("alice", ".setnum").await.unwrap();
    assert!(prompt.contains("personal phone number"));

    let reply = handler.handle("alice", " 923145151029 ").await.unwrap();
    assert_eq!(reply, "Your personal number has been set to 923145151029.");
    assert_eq!(
        fx.app.service.target().await.unwrap().identifier().as_str(),
        "923145151029"
    );
}

#[tokio::test]
async fn test_summary_sends_last_report() {
    let fx = fixture().await;
    let send_mock = fx.server.mock(|when, then| {
        when.method(POST)
            .path("/send")
            .json_body_partial(r#"{ "jid": "923145151029@s.whatsapp.net" }"#);
        then.status(200).json_body(json!({ "sent": true }));
    });
    let handler = fx.app.command_handler();

    let reply = handler.handle("alice", ".summary").await.unwrap();
    assert!(reply.contains("not set a personal phone number"));

    handler.handle("alice", ".setnum 923145151029").await.unwrap();
    let reply = handler.handle("alice", ".summary").await.unwrap();
    assert!(reply.starts_with("No check has been run yet"));

    handler.handle("alice", ".check 111").await.unwrap();
    // bob has no report of his own
    let reply = handler.handle("bob", ".summary").await.unwrap();
    assert!(reply.starts_with("No check has been run yet"));

    let reply = handler.handle("alice", ".summary").await.unwrap();
    assert_eq!(reply, "Summary sent to your personal number: 923145151029.");
    send_mock.assert_hits(1);
}

#[tokio::test]
async fn test_check_without_numbers_in_follow_up() {
    let fx = fixture().await;
    let handler = fx.app.command_handler();

    handler.handle("alice", ".check").await.unwrap();
    let reply = handler.handle("alice", " , ").await.unwrap();
    assert!(reply.starts_with("Please provide numbers to check"));
}
