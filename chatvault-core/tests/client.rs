use std::time::Duration;

use chatvault_core::{SlackClient, SlackError};
use serde_json::json;
use wiremock::matchers::{body_string, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn list_files_sends_bearer_token_and_filters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/files.list"))
        .and(header("authorization", "Bearer test-token"))
        .and(query_param("ts_to", "1700000000"))
        .and(query_param("count", "100"))
        .and(query_param("page", "1"))
        .and(query_param("show_files_hidden_by_limit", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "files": [
                {
                    "id": "F100",
                    "name": "report.pdf",
                    "user": "U42",
                    "created": 1690000000,
                    "url_private_download": "https://files.example/report.pdf"
                },
                {
                    "id": "F101",
                    "name": "old.png",
                    "user": "U43",
                    "created": 1680000000,
                    "mode": "hidden_by_limit"
                }
            ],
            "paging": { "count": 100, "total": 2, "page": 1, "pages": 1 }
        })))
        .mount(&server)
        .await;

    let client = SlackClient::with_base_url(&server.uri(), "test-token").unwrap();
    let page = client.list_files(1_700_000_000, 100, 1).await.unwrap();

    assert_eq!(page.paging.pages, 1);
    assert_eq!(page.files.len(), 2);
    assert_eq!(page.files[0].id, "F100");
    assert_eq!(
        page.files[0].url_private_download,
        "https://files.example/report.pdf"
    );
    assert!(!page.files[0].is_hidden_by_limit());
    assert!(page.files[1].url_private_download.is_empty());
    assert!(page.files[1].is_hidden_by_limit());
}

#[tokio::test]
async fn list_files_surfaces_envelope_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/files.list"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "error": "invalid_auth"
        })))
        .mount(&server)
        .await;

    let client = SlackClient::with_base_url(&server.uri(), "bad-token").unwrap();
    let err = client.list_files(0, 100, 1).await.unwrap_err();

    assert!(matches!(err, SlackError::Api(ref code) if code == "invalid_auth"));
}

#[tokio::test]
async fn list_files_maps_429_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/files.list"))
        .respond_with(
            ResponseTemplate::new(429)
                .insert_header("Retry-After", "3")
                .set_body_string("rate limited"),
        )
        .mount(&server)
        .await;

    let client = SlackClient::with_base_url(&server.uri(), "test-token").unwrap();
    let err = client.list_files(0, 100, 1).await.unwrap_err();

    assert_eq!(err.retry_after(), Some(Duration::from_secs(3)));
}

#[tokio::test]
async fn delete_file_posts_form_encoded_id() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/files.delete"))
        .and(header("authorization", "Bearer test-token"))
        .and(body_string("file=F100"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;

    let client = SlackClient::with_base_url(&server.uri(), "test-token").unwrap();
    client.delete_file("F100").await.unwrap();
}

#[tokio::test]
async fn delete_file_surfaces_envelope_error() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/files.delete"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": false,
            "error": "file_not_found"
        })))
        .mount(&server)
        .await;

    let client = SlackClient::with_base_url(&server.uri(), "test-token").unwrap();
    let err = client.delete_file("F404").await.unwrap_err();

    assert!(matches!(err, SlackError::Api(ref code) if code == "file_not_found"));
}

#[tokio::test]
async fn user_display_name_returns_name() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/api/users.info"))
        .and(query_param("user", "U42"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "ok": true,
            "user": { "name": "ada" }
        })))
        .mount(&server)
        .await;

    let client = SlackClient::with_base_url(&server.uri(), "test-token").unwrap();
    let name = client.user_display_name("U42").await.unwrap();

    assert_eq!(name, "ada");
}

#[tokio::test]
async fn fetch_file_streams_authorized_content() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/download/report.pdf"))
        .and(header("authorization", "Bearer test-token"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(b"content"))
        .mount(&server)
        .await;

    let client = SlackClient::with_base_url(&server.uri(), "test-token").unwrap();
    let response = client
        .fetch_file(&format!("{}/download/report.pdf", server.uri()))
        .await
        .unwrap();

    assert_eq!(response.bytes().await.unwrap().as_ref(), b"content");
}

#[tokio::test]
async fn fetch_file_maps_429_to_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/download/report.pdf"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "2"))
        .mount(&server)
        .await;

    let client = SlackClient::with_base_url(&server.uri(), "test-token").unwrap();
    let err = client
        .fetch_file(&format!("{}/download/report.pdf", server.uri()))
        .await
        .unwrap_err();

    assert_eq!(err.retry_after(), Some(Duration::from_secs(2)));
}

#[tokio::test]
async fn fetch_file_surfaces_http_errors() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/download/gone.pdf"))
        .respond_with(ResponseTemplate::new(404).set_body_string("not here"))
        .mount(&server)
        .await;

    let client = SlackClient::with_base_url(&server.uri(), "test-token").unwrap();
    let err = client
        .fetch_file(&format!("{}/download/gone.pdf", server.uri()))
        .await
        .unwrap_err();

    assert!(matches!(err, SlackError::Http { status, .. } if status.as_u16() == 404));
}
