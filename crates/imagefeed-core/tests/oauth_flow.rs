#![allow(clippy::expect_used, reason = "integration test — panics are the assertion mechanism")]

use std::sync::Arc;
use std::time::Duration;

use imagefeed_core::{ApiConfig, ApiError, ImageFeedServices, TokenStore};
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_services(server: &MockServer) -> ImageFeedServices {
    let config = ApiConfig {
        access_key: "ak".to_string(),
        secret_key: "sk".to_string(),
        redirect_uri: "urn:ietf:wg:oauth:2.0:oob".to_string(),
        access_scope: "public".to_string(),
        base_url: server.uri(),
        token_url: format!("{}/oauth/token", server.uri()),
        authorize_url: format!("{}/oauth/authorize", server.uri()),
    };
    ImageFeedServices::with_token_store(config, Arc::new(TokenStore::in_memory()))
        .expect("services should construct")
}

fn token_body(token: &str) -> serde_json::Value {
    serde_json::json!({ "access_token": token, "token_type": "bearer" })
}

#[tokio::test]
async fn concurrent_same_code_callers_share_one_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("code=abc"))
        .and(body_string_contains("grant_type=authorization_code"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("tok-1"))
                .set_delay(Duration::from_millis(100)),
        )
        .expect(1)
        .mount(&server)
        .await;

    let services = test_services(&server);
    let oauth = services.oauth.clone();

    let first = tokio::spawn({
        let oauth = oauth.clone();
        async move { oauth.exchange_code("abc").await }
    });
    let second = tokio::spawn({
        let oauth = oauth.clone();
        async move { oauth.exchange_code("abc").await }
    });

    let first = first.await.expect("task should not panic");
    let second = second.await.expect("task should not panic");

    assert_eq!(first.as_deref(), Ok("tok-1"));
    assert_eq!(second.as_deref(), Ok("tok-1"));
    assert_eq!(services.token_store.get().as_deref(), Some("tok-1"));
}

#[tokio::test]
async fn new_code_cancels_in_flight_exchange() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("code=abc"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(token_body("stale"))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .and(body_string_contains("code=xyz"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-2")))
        .expect(1)
        .mount(&server)
        .await;

    let services = test_services(&server);
    let oauth = services.oauth.clone();

    let stale = tokio::spawn({
        let oauth = oauth.clone();
        async move { oauth.exchange_code("abc").await }
    });
    // Let the first exchange get in flight before superseding it.
    tokio::time::sleep(Duration::from_millis(100)).await;

    let fresh = oauth.exchange_code("xyz").await;
    let stale = stale.await.expect("task should not panic");

    assert_eq!(stale, Err(ApiError::Cancelled));
    assert_eq!(fresh.as_deref(), Ok("tok-2"));
    assert_eq!(services.token_store.get().as_deref(), Some("tok-2"));
}

#[tokio::test]
async fn failed_exchange_reaches_every_waiter_and_resets() {
    let server = MockServer::start().await;
    let services = test_services(&server);
    let oauth = services.oauth.clone();

    {
        let _guard = Mock::given(method("POST"))
            .and(path("/oauth/token"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_string("invalid code")
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount_as_scoped(&server)
            .await;

        let first = tokio::spawn({
            let oauth = oauth.clone();
            async move { oauth.exchange_code("bad").await }
        });
        let second = tokio::spawn({
            let oauth = oauth.clone();
            async move { oauth.exchange_code("bad").await }
        });

        let expected = Err(ApiError::HttpStatus { status: 401, body: "invalid code".to_string() });
        assert_eq!(first.await.expect("task should not panic"), expected);
        assert_eq!(second.await.expect("task should not panic"), expected);
        assert_eq!(services.token_store.get(), None);
    }

    // No retry happened internally; re-invoking issues a fresh request.
    let _guard = Mock::given(method("POST"))
        .and(path("/oauth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body("tok-3")))
        .expect(1)
        .mount_as_scoped(&server)
        .await;

    assert_eq!(oauth.exchange_code("bad").await.as_deref(), Ok("tok-3"));
    assert_eq!(services.token_store.get().as_deref(), Some("tok-3"));
}
