use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, Rule, Snippet};
use tower::ServiceExt;

const BOUNDARY: &str = "mock-boundary";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_text(response: axum::response::Response) -> String {
    let bytes: bytes::Bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn authed(method: &str, uri: &str, user: &str) -> http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {user}"))
}

fn json_request(method: &str, uri: &str, user: &str, body: &str) -> Request<String> {
    authed(method, uri, user)
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

fn empty_request(method: &str, uri: &str, user: &str) -> Request<String> {
    authed(method, uri, user).body(String::new()).unwrap()
}

/// Multipart body with text fields and a trailing `file` part.
fn multipart_request(method: &str, uri: &str, user: &str, fields: &[(&str, &str)], file: &str) -> Request<String> {
    let mut body = String::new();
    for (name, value) in fields {
        body.push_str(&format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
        ));
    }
    body.push_str(&format!(
        "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"snippet.ps\"\r\nContent-Type: text/plain\r\n\r\n{file}\r\n--{BOUNDARY}--\r\n"
    ));
    authed(method, uri, user)
        .header(
            http::header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(body)
        .unwrap()
}

fn create_request(user: &str, name: &str, content: &str) -> Request<String> {
    multipart_request(
        "POST",
        "/snippet",
        user,
        &[("name", name), ("description", ""), ("language", "Printscript"), ("version", "1.1")],
        content,
    )
}

// --- auth ---

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let resp = app()
        .oneshot(Request::builder().uri("/user/snippets").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- snippets ---

#[tokio::test]
async fn create_snippet_reads_multipart_fields() {
    let resp = app()
        .oneshot(create_request("ada", "hello", "println(\"hi\");"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let snippet: Snippet = body_json(resp).await;
    assert_eq!(snippet.name, "hello");
    assert_eq!(snippet.language, "Printscript");
    assert_eq!(snippet.version.as_deref(), Some("1.1"));
    assert_eq!(snippet.author, "ada");
    assert_eq!(snippet.content, "println(\"hi\");");
}

#[tokio::test]
async fn create_snippet_without_language_is_rejected() {
    let resp = app()
        .oneshot(multipart_request("POST", "/snippet", "ada", &[("name", "x")], "x"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn get_snippet_not_found() {
    let resp = app()
        .oneshot(empty_request("GET", "/snippet/does-not-exist", "ada"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_snippet_not_found() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/snippet/does-not-exist", "ada"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- actions ---

#[tokio::test]
async fn format_normalizes_source() {
    let resp = app()
        .oneshot(empty_request(
            "POST",
            "/action/format?file=let%20a%3D1%3B&language=Printscript&version=1.1",
            "ada",
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "let a = 1;");
}

#[tokio::test]
async fn format_rejects_other_languages() {
    let resp = app()
        .oneshot(empty_request("POST", "/action/format?file=x&language=Go", "ada"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn rules_are_split_by_action() {
    let resp = app()
        .oneshot(empty_request("GET", "/action/rules?language=Printscript&action=FORMAT", "ada"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let rules: Vec<Rule> = body_json(resp).await;
    assert!(rules.iter().all(|r| r.id.starts_with("format-")));
}

#[tokio::test]
async fn users_page_excludes_caller() {
    let resp = app()
        .oneshot(empty_request("GET", "/user-data/users?pageNumber=0&pageSize=10", "ada"))
        .await
        .unwrap();
    let page: serde_json::Value = body_json(resp).await;
    assert_eq!(page["count"], 3);
    assert_eq!(page["pageNumber"], 0);
    assert!(page["snippets"]
        .as_array()
        .unwrap()
        .iter()
        .all(|u| u["userId"] != "ada"));
}

#[tokio::test]
async fn huge_page_numbers_yield_empty_pages() {
    for uri in [
        "/user/snippets?isOwner=true&isShared=false&pageNumber=18446744073709551615&pageSize=10",
        "/user-data/users?pageNumber=18446744073709551615&pageSize=10",
    ] {
        let resp = app().oneshot(empty_request("GET", uri, "ada")).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK, "{uri}");
        let page: serde_json::Value = body_json(resp).await;
        assert!(page["snippets"].as_array().unwrap().is_empty(), "{uri}");
    }
}

#[tokio::test]
async fn removing_unknown_test_case_still_returns_string() {
    let resp = app()
        .oneshot(empty_request("DELETE", "/snippet/test/nope", "ada"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: serde_json::Value = body_json(resp).await;
    assert!(body["body"].is_string());
}

// --- full lifecycle ---

#[tokio::test]
async fn share_and_test_lifecycle() {
    use tower::Service;

    let mut app = app().into_service();

    // ada creates a snippet
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(create_request("ada", "greeting", "println(\"hello\");"))
        .await
        .unwrap();
    let created: Snippet = body_json(resp).await;
    let id = created.id;

    // alan cannot see it yet
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/snippet/{id}"), "alan"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // ada shares with alan
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/snippet/{id}/share"),
            "ada",
            r#"{"userId":"alan"}"#,
        ))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    // alan sees it as shared, not owned
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "GET",
            "/user/snippets?isOwner=false&isShared=true&pageNumber=0&pageSize=10",
            "alan",
        ))
        .await
        .unwrap();
    let page: serde_json::Value = body_json(resp).await;
    assert_eq!(page["count"], 1);
    assert_eq!(page["snippets"][0]["id"], id.as_str());

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request(
            "GET",
            "/user/snippets?isOwner=true&isShared=false&pageNumber=0&pageSize=10",
            "alan",
        ))
        .await
        .unwrap();
    let page: serde_json::Value = body_json(resp).await;
    assert_eq!(page["count"], 0);

    // ada adds a test case
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/snippet/test/{id}"),
            "ada",
            r#"{"name":"says hello","inputs":[],"expectedOutput":["hello"]}"#,
        ))
        .await
        .unwrap();
    let saved: serde_json::Value = body_json(resp).await;
    let test_id = saved["body"]["id"].as_str().unwrap().to_string();

    // stored result passes
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/snippet/test/{test_id}/get-results"), "ada"))
        .await
        .unwrap();
    assert_eq!(body_text(resp).await, "SUCCESS");

    // inline run with a wrong expectation fails
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(json_request(
            "POST",
            &format!("/snippet/{id}/test/get-results"),
            "alan",
            r#"{"name":"wrong","inputs":[],"expectedOutput":["bye"]}"#,
        ))
        .await
        .unwrap();
    assert_eq!(body_text(resp).await, "FAILURE");

    // delete removes the snippet
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("DELETE", &format!("/snippet/{id}"), "ada"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);

    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(empty_request("GET", &format!("/snippet/{id}"), "ada"))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}
