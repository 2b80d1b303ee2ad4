use buzzblast::composer::{ComposerOptions, MISSING_KEY_MESSAGE};
use buzzblast::page::PageEvent;
use buzzblast::{
    CommentSession, ComposeError, ComposeOutcome, ElementNode, FixturePage, GeminiClient, GeminiConfig, Notification,
    PageHandle, Settings,
};
use serde_json::json;
use std::time::Duration;
use tokio::sync::watch;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, Request, ResponseTemplate};

const ENDPOINT: &str = "/models/gemini-2.5-flash-lite:generateContent";

fn feed_page() -> FixturePage {
    FixturePage::new(
        ElementNode::new("body").with_child(
            ElementNode::new("div")
                .with_class("feed-shared-update-v2")
                .with_child(
                    ElementNode::new("div")
                        .with_attribute("data-test-id", "post-text")
                        .with_child(ElementNode::new("span").with_text("We shipped v2 today")),
                )
                .with_child(
                    ElementNode::new("div")
                        .with_class("social-actions")
                        .with_child(ElementNode::new("button").with_text("Like"))
                        .with_child(ElementNode::new("button").with_text("Comment")),
                )
                .with_child(
                    ElementNode::new("div").with_child(
                        ElementNode::new("div")
                            .with_attribute("id", "composer")
                            .with_attribute("contenteditable", "true")
                            .with_attribute("data-placeholder", "Add a comment…"),
                    ),
                ),
        ),
    )
}

fn session(server: &MockServer, key: Option<&str>) -> CommentSession<GeminiClient> {
    let (_tx, rx) = watch::channel(Settings {
        gemini_api_key: key.map(str::to_string),
        ..Settings::default()
    });
    let client = GeminiClient::new(GeminiConfig::default().with_base_url(server.uri()));
    CommentSession::new(client, rx)
        .expect("selector tables parse")
        .options(ComposerOptions::default().settle_delay(Duration::from_millis(5)))
}

fn reply(text: &str) -> serde_json::Value {
    json!({ "candidates": [{ "content": { "parts": [{ "text": text }] } }] })
}

fn prompt_of(request: &Request) -> String {
    let body: serde_json::Value = serde_json::from_slice(&request.body).expect("request body is JSON");
    body["contents"][0]["parts"][0]["text"]
        .as_str()
        .expect("prompt text")
        .to_string()
}

#[tokio::test]
async fn test_generates_and_applies_comment() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("Nice milestone — what's next on the roadmap?")))
        .expect(1)
        .mount(&server)
        .await;

    let page = feed_page();
    let input = page.handle_of("composer").unwrap();
    let session = session(&server, Some("test-key"));

    let outcome = session.compose(&page, input).await.unwrap();

    assert_eq!(
        outcome,
        ComposeOutcome::Applied("Nice milestone — what's next on the roadmap?".to_string())
    );
    assert_eq!(
        page.text_of("composer").unwrap().trim(),
        "Nice milestone — what's next on the roadmap?"
    );
    assert!(page.events().contains(&PageEvent::Focused(input)));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    let prompt = prompt_of(&requests[0]);
    assert!(prompt.contains("## POST CONTENT\n\"We shipped v2 today\""));
    assert!(prompt.contains("## DESIRED MOOD/TONE\n\"general\""));
    assert!(prompt.contains("Create a balanced comment"));
    assert!(!prompt.contains("## USER INPUT"));
}

#[tokio::test]
async fn test_rejected_request_leaves_input_untouched() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(403))
        .expect(2)
        .mount(&server)
        .await;

    let page = feed_page();
    let input = page.handle_of("composer").unwrap();
    let session = session(&server, Some("revoked-key"));

    let err = session.compose(&page, input).await.unwrap_err();

    assert!(matches!(err, ComposeError::RequestFailed { status: 403 }));
    assert_eq!(page.text_of("composer").unwrap().trim(), "");
    assert!(page.notifications().is_empty());
    assert!(!session.is_in_flight());
    assert_eq!(page.events().last(), Some(&PageEvent::Busy { handle: input, busy: false }));

    // The guard was released, so the next attempt reaches the service again
    let again = session.compose(&page, input).await.unwrap_err();
    assert!(matches!(again, ComposeError::RequestFailed { status: 403 }));
}

#[tokio::test]
async fn test_concurrent_request_makes_one_call() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(reply("Congrats on the launch!"))
                .set_delay(Duration::from_millis(200)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let page = feed_page();
    let input = page.handle_of("composer").unwrap();
    let session = session(&server, Some("test-key"));

    let (first, second) = tokio::join!(session.compose(&page, input), async {
        tokio::time::sleep(Duration::from_millis(50)).await;
        session.compose(&page, input).await
    });

    assert_eq!(first.unwrap(), ComposeOutcome::Applied("Congrats on the launch!".to_string()));
    assert_eq!(second.unwrap(), ComposeOutcome::Skipped);
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_missing_key_shows_notice_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("unused")))
        .expect(0)
        .mount(&server)
        .await;

    let page = feed_page();
    let input = page.handle_of("composer").unwrap();
    let session = session(&server, None);

    let err = session.compose(&page, input).await.unwrap_err();

    assert!(matches!(err, ComposeError::MissingCredential));
    assert_eq!(page.notifications(), vec![Notification::error(MISSING_KEY_MESSAGE)]);
    assert_eq!(page.text_of("composer").unwrap().trim(), "");
}

#[tokio::test]
async fn test_typed_instruction_reaches_prompt() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("Are you hiring for v3?")))
        .mount(&server)
        .await;

    let page = feed_page();
    let input = page.handle_of("composer").unwrap();
    page.set_text(input, "ask if they are hiring").unwrap();
    let session = session(&server, Some("test-key"));
    session.toggle_mood(buzzblast::Mood::CuriousCat);

    session.compose(&page, input).await.unwrap();

    let requests = server.received_requests().await.unwrap();
    let prompt = prompt_of(&requests[0]);
    assert!(prompt.contains("key point: \"ask if they are hiring\""));
    assert!(prompt.contains("genuinely intrigued (not fake deep)"));
}

#[tokio::test]
async fn test_composes_from_unmarked_card() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(ENDPOINT))
        .respond_with(ResponseTemplate::new(200).set_body_json(reply("Enjoy the new space!")))
        .expect(1)
        .mount(&server)
        .await;

    // No post-body marker: the card's own text is used, minus its action lines
    let page = FixturePage::new(
        ElementNode::new("body").with_child(
            ElementNode::new("div")
                .with_class("artdeco-card")
                .with_child(ElementNode::new("div").with_text("Maria Lopez"))
                .with_child(ElementNode::new("div").with_text("Our team just moved into the new office downtown"))
                .with_child(ElementNode::new("div").with_text("Like  Reply  2w"))
                .with_child(ElementNode::new("div").with_text("3d"))
                .with_child(
                    ElementNode::new("div").with_child(
                        ElementNode::new("div")
                            .with_attribute("id", "composer")
                            .with_attribute("contenteditable", "true")
                            .with_attribute("aria-label", "Add a comment"),
                    ),
                ),
        ),
    );
    let input = page.handle_of("composer").unwrap();
    let session = session(&server, Some("test-key"));

    let outcome = session.compose(&page, input).await.unwrap();

    assert_eq!(outcome, ComposeOutcome::Applied("Enjoy the new space!".to_string()));
    let requests = server.received_requests().await.unwrap();
    let prompt = prompt_of(&requests[0]);
    assert!(prompt.contains("## POST CONTENT\n\"Maria Lopez Our team just moved into the new office downtown\""));
    let content = prompt.split("## POST CONTENT\n").nth(1).unwrap().lines().next().unwrap();
    assert!(!content.contains("Reply"));
    assert!(!content.contains("3d"));
}
