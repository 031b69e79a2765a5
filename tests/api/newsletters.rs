use crate::helpers::spawn_app;
use uuid::Uuid;

#[tokio::test]
async fn create_newsletter_returns_201_for_valid_data() {
    let app = spawn_app().await;

    let response = app
        .post_newsletters(
            &app.editor.token,
            serde_json::json!({ "name": "Rust Weekly", "description": "All things Rust" }),
        )
        .await;

    assert_eq!(201, response.status().as_u16());
    let body: serde_json::Value = response.json().await.unwrap();
    assert_eq!(body["name"], "Rust Weekly");
    assert_eq!(body["editor_id"], app.editor.id.to_string());
}

#[tokio::test]
async fn create_newsletter_returns_400_for_invalid_data() {
    let app = spawn_app().await;
    let test_cases = vec![
        (serde_json::json!({ "name": "   " }), "blank name"),
        (serde_json::json!({ "description": "no name" }), "missing name"),
        (
            serde_json::json!({ "name": "a".repeat(101) }),
            "name too long",
        ),
    ];

    for (body, description) in test_cases {
        let response = app.post_newsletters(&app.editor.token, body).await;

        assert_eq!(
            400,
            response.status().as_u16(),
            "The API did not fail with 400 Bad Request when the payload was {}.",
            description
        );
    }
}

#[tokio::test]
async fn requests_without_a_valid_token_are_rejected() {
    let app = spawn_app().await;

    let missing = app.get(None, "/newsletters").await;
    let garbage = app.get(Some("not-a-jwt"), "/newsletters").await;
    let expired = app.get(Some(&app.expired_token()), "/newsletters").await;

    for response in [missing, garbage, expired] {
        assert_eq!(401, response.status().as_u16());
        assert_eq!(response.headers()["WWW-Authenticate"], "Bearer");
    }
}

#[tokio::test]
async fn editors_only_list_their_own_newsletters() {
    let app = spawn_app().await;
    let other = app.another_editor();
    app.create_newsletter("Mine").await;
    app.post_newsletters(&other.token, serde_json::json!({ "name": "Theirs" }))
        .await;

    let response = app.get(Some(&app.editor.token), "/newsletters").await;

    assert_eq!(200, response.status().as_u16());
    let body: Vec<serde_json::Value> = response.json().await.unwrap();
    assert_eq!(body.len(), 1);
    assert_eq!(body[0]["name"], "Mine");
}

#[tokio::test]
async fn getting_another_editors_newsletter_is_forbidden() {
    let app = spawn_app().await;
    let other = app.another_editor();
    let newsletter_id = app.create_newsletter("Mine").await;

    let owner = app
        .get(Some(&app.editor.token), &format!("/newsletters/{}", newsletter_id))
        .await;
    let stranger = app
        .get(Some(&other.token), &format!("/newsletters/{}", newsletter_id))
        .await;

    assert_eq!(200, owner.status().as_u16());
    assert_eq!(403, stranger.status().as_u16());
}

#[tokio::test]
async fn unknown_newsletter_returns_404() {
    let app = spawn_app().await;

    let response = app
        .get(
            Some(&app.editor.token),
            &format!("/newsletters/{}", Uuid::new_v4()),
        )
        .await;

    assert_eq!(404, response.status().as_u16());
}
