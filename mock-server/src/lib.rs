//! In-memory stand-in for the snippet backend.
//!
//! Implements every route the client consumes. The bearer token doubles as
//! the caller's user id: snippets created with token `ada` are owned by
//! `ada`, and sharing adds another user id to a snippet's `shared_with`.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Multipart, Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub name: String,
    pub content: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    pub compliance: String,
    pub author: String,
    #[serde(skip)]
    pub shared_with: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCase {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub expected_output: Vec<String>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleWrite {
    #[serde(flatten)]
    pub rule: Rule,
    pub action: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub name: String,
}

#[derive(Default)]
pub struct Store {
    pub snippets: Vec<Snippet>,
    pub test_cases: HashMap<String, (String, TestCase)>,
    pub rules: HashMap<String, Vec<Rule>>,
    pub users: Vec<User>,
}

pub type Db = Arc<RwLock<Store>>;

fn seeded_store() -> Store {
    let rule = |id: &str, name: &str, is_active: bool, value: Option<serde_json::Value>| Rule {
        id: id.to_string(),
        name: name.to_string(),
        is_active,
        value,
    };
    let mut rules = HashMap::new();
    rules.insert(
        "LINT".to_string(),
        vec![
            rule("lint-1", "identifier_format", true, Some(serde_json::json!("camel case"))),
            rule("lint-2", "mandatory-variable-or-literal-in-println", false, None),
        ],
    );
    rules.insert(
        "FORMAT".to_string(),
        vec![
            rule("format-1", "enforce-spacing-around-equals", true, None),
            rule("format-2", "indentation", true, Some(serde_json::json!(4))),
        ],
    );
    let users = ["ada", "alan", "grace", "linus"]
        .iter()
        .map(|name| User {
            user_id: name.to_string(),
            name: name.to_string(),
        })
        .collect();
    Store {
        rules,
        users,
        ..Store::default()
    }
}

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(seeded_store()));
    Router::new()
        .route("/snippet", post(create_snippet))
        .route(
            "/snippet/{id}",
            get(get_snippet).put(update_snippet).delete(delete_snippet),
        )
        .route("/snippet/{id}/share", post(share_snippet))
        .route("/snippet/{id}/test/all", get(list_test_cases))
        .route("/snippet/{id}/test/get-results", post(run_inline_test))
        .route(
            "/snippet/test/{id}",
            post(create_test_case).put(update_test_case).delete(delete_test_case),
        )
        .route("/snippet/test/{id}/get-results", get(stored_test_result))
        .route("/user/snippets", get(list_snippets))
        .route("/user-data/users", get(list_users))
        .route("/action/format", post(format_snippet))
        .route("/action/rules", get(get_rules).put(put_rules))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// The caller's user id, taken from `Authorization: Bearer <user>`.
fn caller(headers: &HeaderMap) -> Result<String, StatusCode> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .ok_or(StatusCode::UNAUTHORIZED)
}

fn can_read(snippet: &Snippet, user: &str) -> bool {
    snippet.author == user || snippet.shared_with.iter().any(|u| u == user)
}

// --- snippets ---

async fn create_snippet(
    State(db): State<Db>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Json<Snippet>, StatusCode> {
    let user = caller(&headers)?;
    let mut fields: HashMap<String, String> = HashMap::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        let name = field.name().unwrap_or_default().to_string();
        let value = field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        fields.insert(name, value);
    }

    let (Some(name), Some(language), Some(content)) = (
        fields.remove("name"),
        fields.remove("language"),
        fields.remove("file"),
    ) else {
        return Err(StatusCode::BAD_REQUEST);
    };
    let snippet = Snippet {
        id: Uuid::new_v4().to_string(),
        name,
        content,
        language,
        version: fields.remove("version"),
        compliance: "pending".to_string(),
        author: user,
        shared_with: Vec::new(),
    };
    tracing::info!(id = %snippet.id, author = %snippet.author, "snippet created");
    db.write().await.snippets.push(snippet.clone());
    Ok(Json(snippet))
}

async fn get_snippet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Snippet>, StatusCode> {
    let user = caller(&headers)?;
    let store = db.read().await;
    store
        .snippets
        .iter()
        .find(|s| s.id == id && can_read(s, &user))
        .cloned()
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_snippet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    mut multipart: Multipart,
) -> Result<Json<Snippet>, StatusCode> {
    let user = caller(&headers)?;
    let mut content = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() == Some("file") {
            content = Some(field.text().await.map_err(|_| StatusCode::BAD_REQUEST)?);
        }
    }
    let content = content.ok_or(StatusCode::BAD_REQUEST)?;

    let mut store = db.write().await;
    let snippet = store
        .snippets
        .iter_mut()
        .find(|s| s.id == id && s.author == user)
        .ok_or(StatusCode::NOT_FOUND)?;
    snippet.content = content;
    Ok(Json(snippet.clone()))
}

async fn delete_snippet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let user = caller(&headers)?;
    let mut store = db.write().await;
    let before = store.snippets.len();
    store.snippets.retain(|s| !(s.id == id && s.author == user));
    if store.snippets.len() == before {
        return Err(StatusCode::NOT_FOUND);
    }
    store.test_cases.retain(|_, (snippet_id, _)| *snippet_id != id);
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ShareRequest {
    user_id: String,
}

async fn share_snippet(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(input): Json<ShareRequest>,
) -> Result<StatusCode, StatusCode> {
    let user = caller(&headers)?;
    let mut store = db.write().await;
    let snippet = store
        .snippets
        .iter_mut()
        .find(|s| s.id == id && s.author == user)
        .ok_or(StatusCode::NOT_FOUND)?;
    if !snippet.shared_with.contains(&input.user_id) {
        snippet.shared_with.push(input.user_id);
    }
    Ok(StatusCode::OK)
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SnippetQuery {
    #[serde(default)]
    is_owner: bool,
    #[serde(default)]
    is_shared: bool,
    name: Option<String>,
    #[serde(default)]
    page_number: usize,
    #[serde(default = "default_page_size")]
    page_size: usize,
}

fn default_page_size() -> usize {
    10
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SnippetPage {
    snippets: Vec<Snippet>,
    page: usize,
    count: usize,
    page_size: usize,
}

async fn list_snippets(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<SnippetQuery>,
) -> Result<Json<SnippetPage>, StatusCode> {
    let user = caller(&headers)?;
    let store = db.read().await;
    let matching: Vec<&Snippet> = store
        .snippets
        .iter()
        .filter(|s| {
            let owned = s.author == user;
            let shared = s.shared_with.iter().any(|u| *u == user);
            (query.is_owner && owned) || (query.is_shared && shared)
        })
        .filter(|s| query.name.as_deref().map_or(true, |name| s.name.contains(name)))
        .collect();
    let snippets = matching
        .iter()
        .skip(query.page_number.saturating_mul(query.page_size))
        .take(query.page_size)
        .map(|s| (*s).clone())
        .collect();
    Ok(Json(SnippetPage {
        snippets,
        page: query.page_number,
        count: matching.len(),
        page_size: query.page_size,
    }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UserQuery {
    name: Option<String>,
    #[serde(default)]
    page_number: usize,
    #[serde(default = "default_page_size")]
    page_size: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct UserPage {
    snippets: Vec<User>,
    page_number: usize,
    count: usize,
    page_size: usize,
}

async fn list_users(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<UserQuery>,
) -> Result<Json<UserPage>, StatusCode> {
    let user = caller(&headers)?;
    let store = db.read().await;
    let matching: Vec<&User> = store
        .users
        .iter()
        .filter(|u| u.user_id != user)
        .filter(|u| query.name.as_deref().map_or(true, |name| u.name.contains(name)))
        .collect();
    let users = matching
        .iter()
        .skip(query.page_number.saturating_mul(query.page_size))
        .take(query.page_size)
        .map(|u| (*u).clone())
        .collect();
    Ok(Json(UserPage {
        snippets: users,
        page_number: query.page_number,
        count: matching.len(),
        page_size: query.page_size,
    }))
}

// --- actions ---

#[derive(Deserialize)]
struct FormatQuery {
    file: String,
    language: String,
    #[allow(dead_code)]
    version: Option<String>,
}

/// Trims every line and puts single spaces around `=`.
pub fn format_source(source: &str) -> String {
    source
        .lines()
        .map(|line| {
            let line = line.trim();
            match line.split_once('=') {
                Some((left, right)) => format!("{} = {}", left.trim_end(), right.trim_start()),
                None => line.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

async fn format_snippet(headers: HeaderMap, Query(query): Query<FormatQuery>) -> Response {
    if let Err(status) = caller(&headers) {
        return status.into_response();
    }
    if query.language != "Printscript" {
        return (StatusCode::BAD_REQUEST, "unsupported language").into_response();
    }
    format_source(&query.file).into_response()
}

#[derive(Deserialize)]
struct RulesQuery {
    action: String,
}

async fn get_rules(
    State(db): State<Db>,
    headers: HeaderMap,
    Query(query): Query<RulesQuery>,
) -> Result<Json<Vec<Rule>>, StatusCode> {
    caller(&headers)?;
    let store = db.read().await;
    store
        .rules
        .get(&query.action)
        .cloned()
        .map(Json)
        .ok_or(StatusCode::BAD_REQUEST)
}

async fn put_rules(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(writes): Json<Vec<RuleWrite>>,
) -> Result<Json<Vec<RuleWrite>>, StatusCode> {
    caller(&headers)?;
    let mut store = db.write().await;
    for write in &writes {
        let rules = store
            .rules
            .get_mut(&write.action)
            .ok_or(StatusCode::BAD_REQUEST)?;
        match rules.iter_mut().find(|r| r.id == write.rule.id) {
            Some(existing) => *existing = write.rule.clone(),
            None => rules.push(write.rule.clone()),
        }
    }
    Ok(Json(writes))
}

// --- test cases ---

#[derive(Serialize)]
struct Envelope<T> {
    body: T,
}

async fn list_test_cases(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(snippet_id): Path<String>,
) -> Result<Json<Vec<TestCase>>, StatusCode> {
    caller(&headers)?;
    let store = db.read().await;
    let mut cases: Vec<TestCase> = store
        .test_cases
        .values()
        .filter(|(owner, _)| *owner == snippet_id)
        .map(|(_, case)| case.clone())
        .collect();
    cases.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(cases))
}

async fn create_test_case(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(snippet_id): Path<String>,
    Json(mut input): Json<TestCase>,
) -> Result<Json<Envelope<TestCase>>, StatusCode> {
    caller(&headers)?;
    let mut store = db.write().await;
    if !store.snippets.iter().any(|s| s.id == snippet_id) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    let id = Uuid::new_v4().to_string();
    input.id = Some(id.clone());
    store.test_cases.insert(id, (snippet_id, input.clone()));
    Ok(Json(Envelope { body: input }))
}

async fn update_test_case(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
    Json(mut input): Json<TestCase>,
) -> Result<Json<Envelope<TestCase>>, StatusCode> {
    caller(&headers)?;
    let mut store = db.write().await;
    let (_, stored) = store.test_cases.get_mut(&id).ok_or(StatusCode::NOT_FOUND)?;
    input.id = Some(id);
    *stored = input.clone();
    Ok(Json(Envelope { body: input }))
}

/// Always answers with a string, whether or not the test case existed.
async fn delete_test_case(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<Json<Envelope<String>>, StatusCode> {
    caller(&headers)?;
    let removed = db.write().await.test_cases.remove(&id).is_some();
    let message = if removed {
        format!("Test case {id} removed")
    } else {
        format!("Test case {id} not found")
    };
    Ok(Json(Envelope { body: message }))
}

/// Output of a Printscript snippet: the literal of every `println("...")`.
pub fn run_printscript(source: &str) -> Vec<String> {
    source
        .lines()
        .filter_map(|line| {
            line.trim()
                .strip_prefix("println(\"")?
                .split_once("\")")
                .map(|(literal, _)| literal.to_string())
        })
        .collect()
}

fn verdict(snippet: &Snippet, case: &TestCase) -> &'static str {
    if run_printscript(&snippet.content) == case.expected_output {
        "SUCCESS"
    } else {
        "FAILURE"
    }
}

async fn stored_test_result(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<&'static str, StatusCode> {
    caller(&headers)?;
    let store = db.read().await;
    let (snippet_id, case) = store.test_cases.get(&id).ok_or(StatusCode::NOT_FOUND)?;
    let snippet = store
        .snippets
        .iter()
        .find(|s| s.id == *snippet_id)
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(verdict(snippet, case))
}

async fn run_inline_test(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(snippet_id): Path<String>,
    Json(case): Json<TestCase>,
) -> Result<&'static str, StatusCode> {
    let user = caller(&headers)?;
    let store = db.read().await;
    let snippet = store
        .snippets
        .iter()
        .find(|s| s.id == snippet_id && can_read(s, &user))
        .ok_or(StatusCode::NOT_FOUND)?;
    Ok(verdict(snippet, &case))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_serializes_without_share_list() {
        let snippet = Snippet {
            id: "1".to_string(),
            name: "hello".to_string(),
            content: "x".to_string(),
            language: "Printscript".to_string(),
            version: Some("1.1".to_string()),
            compliance: "pending".to_string(),
            author: "ada".to_string(),
            shared_with: vec!["alan".to_string()],
        };
        let json = serde_json::to_value(&snippet).unwrap();
        assert_eq!(json["author"], "ada");
        assert!(json.get("shared_with").is_none());
    }

    #[test]
    fn test_case_uses_backend_field_names() {
        let case: TestCase =
            serde_json::from_str(r#"{"name":"a","inputs":["1"],"expectedOutput":["2"]}"#).unwrap();
        assert!(case.id.is_none());
        assert_eq!(case.expected_output, vec!["2"]);
    }

    #[test]
    fn rule_write_reads_flattened_action() {
        let write: RuleWrite =
            serde_json::from_str(r#"{"id":"r","name":"n","isActive":true,"action":"LINT"}"#).unwrap();
        assert_eq!(write.action, "LINT");
        assert!(write.rule.is_active);
    }

    #[test]
    fn format_source_normalizes_spacing() {
        assert_eq!(
            format_source("  let a   =1;\nprintln(a);  "),
            "let a = 1;\nprintln(a);"
        );
    }

    #[test]
    fn run_printscript_collects_println_literals() {
        let source = "let a = 1;\nprintln(\"hello\");\n  println(\"world\");\nprintln(a);";
        assert_eq!(run_printscript(source), vec!["hello", "world"]);
    }
}
