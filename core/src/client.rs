//! Stateless HTTP request builder and response parser for the snippet API.
//!
//! # Design
//! `SnippetClient` holds only the backend URL and the language settings used
//! by the format and rules endpoints. Each endpoint is split into a
//! `build_*` method that produces an `HttpRequest` and a `parse_*` method
//! that consumes an `HttpResponse`. Authentication is attached later by the
//! service, so requests built here carry no credentials.

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::adapter::{create_snippet_form, update_snippet_form};
use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse, RequestBody};
use crate::mapping::rules_for_write;
use crate::types::{
    ApiSnippetPage, ApiTestCase, ApiUserPage, CreateSnippet, Enveloped, PaginatedUsers, Rule,
    RuleAction, Snippet, TestCase, TestCaseResult, UpdateSnippet,
};

/// Ownership filter for `GET /user/snippets`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ownership {
    /// `isOwner=true&isShared=false`
    Owned,
    /// `isOwner=false&isShared=true`
    Shared,
}

impl Ownership {
    fn flags(self) -> (&'static str, &'static str) {
        match self {
            Ownership::Owned => ("true", "false"),
            Ownership::Shared => ("false", "true"),
        }
    }
}

/// Synchronous, stateless client for the snippet API.
#[derive(Debug, Clone)]
pub struct SnippetClient {
    base_url: String,
    language: String,
    format_version: String,
}

impl SnippetClient {
    pub fn new(base_url: &str) -> Self {
        Self::from_config(&ServiceConfig {
            backend_url: base_url.to_string(),
            ..ServiceConfig::default()
        })
    }

    pub fn from_config(config: &ServiceConfig) -> Self {
        Self {
            base_url: config.backend_url.trim_end_matches('/').to_string(),
            language: config.language.clone(),
            format_version: config.format_version.clone(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    fn json_request<B: Serialize + ?Sized>(
        &self,
        method: HttpMethod,
        path: &str,
        body: &B,
    ) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_string(body).map_err(|e| ApiError::Serialization(e.to_string()))?;
        let mut request = HttpRequest::new(method, self.url(path));
        request
            .headers
            .push(("content-type".to_string(), "application/json".to_string()));
        request.body = Some(RequestBody::Json(body));
        Ok(request)
    }

    // -----------------------------------------------------------------------
    // Snippets
    // -----------------------------------------------------------------------

    pub fn build_create_snippet(&self, draft: &CreateSnippet) -> HttpRequest {
        let mut request = HttpRequest::new(HttpMethod::Post, self.url("/snippet"));
        request.body = Some(RequestBody::Multipart(create_snippet_form(draft)));
        request
    }

    pub fn build_get_snippet(&self, id: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.url(&format!("/snippet/{id}")))
    }

    pub fn build_update_snippet(&self, id: &str, update: &UpdateSnippet) -> HttpRequest {
        let mut request = HttpRequest::new(HttpMethod::Put, self.url(&format!("/snippet/{id}")));
        request.body = Some(RequestBody::Multipart(update_snippet_form(id, update)));
        request
    }

    pub fn build_delete_snippet(&self, id: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, self.url(&format!("/snippet/{id}")))
    }

    pub fn build_share_snippet(&self, snippet_id: &str, user_id: &str) -> Result<HttpRequest, ApiError> {
        self.json_request(
            HttpMethod::Post,
            &format!("/snippet/{snippet_id}/share"),
            &serde_json::json!({ "userId": user_id }),
        )
    }

    /// One ownership-filtered page. Absent `name` is left out of the query.
    pub fn build_list_snippets(
        &self,
        ownership: Ownership,
        page: u32,
        page_size: u32,
        name: Option<&str>,
    ) -> HttpRequest {
        let (is_owner, is_shared) = ownership.flags();
        let mut request = HttpRequest::new(HttpMethod::Get, self.url("/user/snippets"));
        request.query.push(("isOwner".to_string(), is_owner.to_string()));
        request.query.push(("isShared".to_string(), is_shared.to_string()));
        if let Some(name) = name {
            request.query.push(("name".to_string(), name.to_string()));
        }
        request.query.push(("pageNumber".to_string(), page.to_string()));
        request.query.push(("pageSize".to_string(), page_size.to_string()));
        request
    }

    pub fn build_get_users(&self, name: Option<&str>, page: Option<u32>, page_size: Option<u32>) -> HttpRequest {
        let mut request = HttpRequest::new(HttpMethod::Get, self.url("/user-data/users"));
        if let Some(name) = name {
            request.query.push(("name".to_string(), name.to_string()));
        }
        if let Some(page) = page {
            request.query.push(("pageNumber".to_string(), page.to_string()));
        }
        if let Some(page_size) = page_size {
            request.query.push(("pageSize".to_string(), page_size.to_string()));
        }
        request
    }

    // -----------------------------------------------------------------------
    // Actions: format and rules
    // -----------------------------------------------------------------------

    /// The source travels as the `file` query parameter; there is no body.
    pub fn build_format_snippet(&self, source: &str) -> HttpRequest {
        let mut request = HttpRequest::new(HttpMethod::Post, self.url("/action/format"));
        request.query.push(("file".to_string(), source.to_string()));
        request.query.push(("language".to_string(), self.language.clone()));
        request
            .query
            .push(("version".to_string(), self.format_version.clone()));
        request
    }

    pub fn build_get_rules(&self, action: RuleAction) -> HttpRequest {
        let mut request = HttpRequest::new(HttpMethod::Get, self.url("/action/rules"));
        request.query.push(("language".to_string(), self.language.clone()));
        request.query.push(("action".to_string(), action.as_str().to_string()));
        request
    }

    pub fn build_modify_rules(&self, rules: &[Rule], action: RuleAction) -> Result<HttpRequest, ApiError> {
        self.json_request(HttpMethod::Put, "/action/rules", &rules_for_write(rules, action))
    }

    // -----------------------------------------------------------------------
    // Test cases
    // -----------------------------------------------------------------------

    pub fn build_get_test_cases(&self, snippet_id: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Get, self.url(&format!("/snippet/{snippet_id}/test/all")))
    }

    /// Create under `snippet_id`. Any id on `test_case` is not sent.
    pub fn build_create_test_case(&self, snippet_id: &str, test_case: &TestCase) -> Result<HttpRequest, ApiError> {
        let mut body = ApiTestCase::from(test_case);
        body.id = None;
        self.json_request(HttpMethod::Post, &format!("/snippet/test/{snippet_id}"), &body)
    }

    pub fn build_update_test_case(&self, id: &str, test_case: &TestCase) -> Result<HttpRequest, ApiError> {
        let mut body = ApiTestCase::from(test_case);
        body.id = Some(id.to_string());
        self.json_request(HttpMethod::Put, &format!("/snippet/test/{id}"), &body)
    }

    pub fn build_remove_test_case(&self, id: &str) -> HttpRequest {
        HttpRequest::new(HttpMethod::Delete, self.url(&format!("/snippet/test/{id}")))
    }

    /// Fetch the stored result of a saved test case.
    pub fn build_fetch_test_result(&self, test_id: &str) -> HttpRequest {
        HttpRequest::new(
            HttpMethod::Get,
            self.url(&format!("/snippet/test/{test_id}/get-results")),
        )
    }

    /// Run an unsaved test case against a snippet.
    pub fn build_run_test_inline(&self, snippet_id: &str, test_case: &TestCase) -> Result<HttpRequest, ApiError> {
        let mut body = ApiTestCase::from(test_case);
        body.id = None;
        self.json_request(
            HttpMethod::Post,
            &format!("/snippet/{snippet_id}/test/get-results"),
            &body,
        )
    }

    // -----------------------------------------------------------------------
    // Parsers
    // -----------------------------------------------------------------------

    /// Snippet bodies from create, get and update.
    pub fn parse_snippet(&self, response: HttpResponse) -> Result<Snippet, ApiError> {
        check_status(&response)?;
        decode_non_empty(&response.body)
    }

    pub fn parse_delete_snippet(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_share_snippet(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_snippet_page(&self, response: HttpResponse) -> Result<ApiSnippetPage, ApiError> {
        check_status(&response)?;
        decode_non_empty(&response.body)
    }

    pub fn parse_users(&self, response: HttpResponse) -> Result<PaginatedUsers, ApiError> {
        check_status(&response)?;
        decode_non_empty::<ApiUserPage>(&response.body).map(PaginatedUsers::from)
    }

    /// The formatted source, verbatim. A JSON string body is unquoted.
    pub fn parse_format_snippet(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        text_body(&response.body)
    }

    pub fn parse_rules(&self, response: HttpResponse) -> Result<Vec<Rule>, ApiError> {
        check_status(&response)?;
        decode_non_empty(&response.body)
    }

    pub fn parse_modify_rules(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response)
    }

    pub fn parse_test_cases(&self, response: HttpResponse) -> Result<Vec<TestCase>, ApiError> {
        check_status(&response)?;
        let cases: Vec<ApiTestCase> = decode_non_empty(&response.body)?;
        Ok(cases.into_iter().map(TestCase::from).collect())
    }

    /// Test case writes, wrapped in `{"body": ...}` or bare.
    pub fn parse_test_case(&self, response: HttpResponse) -> Result<TestCase, ApiError> {
        check_status(&response)?;
        let case: Enveloped<ApiTestCase> = decode_non_empty(&response.body)?;
        Ok(TestCase::from(case.into_inner()))
    }

    /// The backend always answers a test case delete with a string, whether
    /// or not the test case existed.
    pub fn parse_remove_test_case(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response)?;
        match serde_json::from_str::<Enveloped<String>>(&response.body) {
            Ok(message) => Ok(message.into_inner()),
            Err(_) => Ok(response.body),
        }
    }

    /// Only an exact `SUCCESS` passes; surrounding whitespace is a failure.
    pub fn parse_test_result(&self, response: HttpResponse) -> Result<TestCaseResult, ApiError> {
        check_status(&response)?;
        let status = text_body(&response.body)?;
        Ok(TestCaseResult::from_backend(&status))
    }
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}

fn decode_non_empty<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::EmptyBody);
    }
    serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))
}

fn text_body(body: &str) -> Result<String, ApiError> {
    if body.trim().is_empty() {
        return Err(ApiError::EmptyBody);
    }
    let text = serde_json::from_str::<String>(body).unwrap_or_else(|_| body.to_string());
    if text.trim().is_empty() {
        return Err(ApiError::EmptyBody);
    }
    Ok(text)
}
