//! Domain DTOs for the snippet API.
//!
//! # Design
//! The first half of this file is the internal data model handed to the UI.
//! The `Api*` types below it mirror the backend's JSON exactly (field names
//! included) and never leave the crate's request/response layer; the
//! `mapping` module converts between the two.

use serde::{Deserialize, Serialize};

/// Backend-computed lint status of a snippet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ComplianceStatus {
    #[serde(alias = "PENDING")]
    Pending,
    #[serde(alias = "FAILED")]
    Failed,
    #[serde(alias = "NOT_COMPLIANT", alias = "not_compliant")]
    NotCompliant,
    #[serde(alias = "COMPLIANT")]
    Compliant,
    #[default]
    #[serde(other)]
    Unknown,
}

/// A stored snippet.
///
/// `extension` is not sent by the backend; it is filled from the file type
/// table whenever the language is known.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snippet {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub content: String,
    pub language: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    #[serde(default)]
    pub compliance: ComplianceStatus,
    #[serde(default)]
    pub author: String,
}

/// Payload for creating a snippet. `language` may carry a version as
/// `<name>/<version>`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSnippet {
    pub name: String,
    pub content: String,
    pub language: String,
    #[serde(default)]
    pub extension: String,
}

/// Payload for replacing a snippet's content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateSnippet {
    pub content: String,
}

/// One page of snippets. When built from a merged listing the metadata
/// belongs to the owned-snippet query.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedSnippets {
    pub snippets: Vec<Snippet>,
    pub page: u32,
    pub count: u64,
    pub page_size: u32,
}

impl PaginatedSnippets {
    pub fn empty(page: u32, page_size: u32) -> Self {
        Self {
            snippets: Vec::new(),
            page,
            count: 0,
            page_size,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaginatedUsers {
    pub users: Vec<User>,
    pub page: u32,
    pub count: u64,
    pub page_size: u32,
}

/// Selects which rule set a rules request reads or writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RuleAction {
    Lint,
    Format,
}

impl RuleAction {
    pub fn as_str(self) -> &'static str {
        match self {
            RuleAction::Lint => "LINT",
            RuleAction::Format => "FORMAT",
        }
    }
}

/// A lint or format rule. The action is not part of the rule itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Rule {
    pub id: String,
    pub name: String,
    pub is_active: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<serde_json::Value>,
}

/// A named input/expected-output pair. `id == None` means the test case has
/// never been saved.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
    #[serde(default)]
    pub input: Vec<String>,
    #[serde(default)]
    pub output: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestCaseResult {
    Success,
    Fail,
}

impl TestCaseResult {
    /// Only the exact backend status `SUCCESS` counts as a pass.
    pub fn from_backend(status: &str) -> Self {
        match status {
            "SUCCESS" => TestCaseResult::Success,
            _ => TestCaseResult::Fail,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileType {
    pub language: String,
    pub extension: String,
}

// ---------------------------------------------------------------------------
// Backend wire shapes
// ---------------------------------------------------------------------------

/// A page of snippets as returned by `GET /user/snippets`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiSnippetPage {
    #[serde(default)]
    pub snippets: Vec<Snippet>,
    #[serde(default, alias = "pageNumber")]
    pub page: u32,
    #[serde(default)]
    pub count: u64,
    #[serde(default, rename = "pageSize")]
    pub page_size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUser {
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
}

/// A page of users as returned by `GET /user-data/users`. The backend reuses
/// the `snippets` key for the user list.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiUserPage {
    #[serde(default, rename = "snippets", alias = "users")]
    pub users: Vec<ApiUser>,
    #[serde(default, rename = "pageNumber", alias = "page")]
    pub page: u32,
    #[serde(default)]
    pub count: u64,
    #[serde(default, rename = "pageSize")]
    pub page_size: u32,
}

/// A rule as written to `PUT /action/rules`: the rule plus its action.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiRuleWrite {
    #[serde(flatten)]
    pub rule: Rule,
    pub action: RuleAction,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiTestCase {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub inputs: Vec<String>,
    #[serde(default)]
    pub expected_output: Vec<String>,
}

/// Some endpoints wrap their payload as `{"body": ...}`; others return it
/// bare. Both are accepted.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Enveloped<T> {
    Wrapped { body: T },
    Bare(T),
}

impl<T> Enveloped<T> {
    pub fn into_inner(self) -> T {
        match self {
            Enveloped::Wrapped { body } | Enveloped::Bare(body) => body,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snippet_tolerates_missing_optional_fields() {
        let snippet: Snippet =
            serde_json::from_str(r#"{"id":"1","name":"hello","language":"Printscript"}"#).unwrap();
        assert_eq!(snippet.content, "");
        assert_eq!(snippet.extension, None);
        assert_eq!(snippet.compliance, ComplianceStatus::Unknown);
    }

    #[test]
    fn compliance_accepts_backend_spellings() {
        let parse = |raw: &str| serde_json::from_str::<ComplianceStatus>(raw).unwrap();
        assert_eq!(parse(r#""compliant""#), ComplianceStatus::Compliant);
        assert_eq!(parse(r#""NOT_COMPLIANT""#), ComplianceStatus::NotCompliant);
        assert_eq!(parse(r#""not-compliant""#), ComplianceStatus::NotCompliant);
        assert_eq!(parse(r#""something-new""#), ComplianceStatus::Unknown);
    }

    #[test]
    fn rule_uses_camel_case_on_the_wire() {
        let rule: Rule =
            serde_json::from_str(r#"{"id":"r1","name":"no-println","isActive":true,"value":3}"#).unwrap();
        assert!(rule.is_active);
        assert_eq!(rule.value, Some(serde_json::json!(3)));

        let json = serde_json::to_value(&rule).unwrap();
        assert_eq!(json["isActive"], true);
        assert!(json.get("is_active").is_none());
    }

    #[test]
    fn rule_write_flattens_rule_and_adds_action() {
        let write = ApiRuleWrite {
            rule: Rule {
                id: "r1".to_string(),
                name: "indent".to_string(),
                is_active: false,
                value: None,
            },
            action: RuleAction::Format,
        };
        let json = serde_json::to_value(&write).unwrap();
        assert_eq!(json["id"], "r1");
        assert_eq!(json["isActive"], false);
        assert_eq!(json["action"], "FORMAT");
    }

    #[test]
    fn test_case_result_is_fail_closed() {
        assert_eq!(TestCaseResult::from_backend("SUCCESS"), TestCaseResult::Success);
        assert_eq!(TestCaseResult::from_backend("FAILURE"), TestCaseResult::Fail);
        assert_eq!(TestCaseResult::from_backend("success"), TestCaseResult::Fail);
        assert_eq!(TestCaseResult::from_backend(""), TestCaseResult::Fail);
    }

    #[test]
    fn enveloped_accepts_wrapped_and_bare() {
        let wrapped: Enveloped<ApiTestCase> =
            serde_json::from_str(r#"{"body":{"id":"t1","name":"a","inputs":[],"expectedOutput":["x"]}}"#).unwrap();
        assert_eq!(wrapped.into_inner().id.as_deref(), Some("t1"));

        let bare: Enveloped<ApiTestCase> =
            serde_json::from_str(r#"{"id":"t2","name":"b","inputs":["1"],"expectedOutput":[]}"#).unwrap();
        let bare = bare.into_inner();
        assert_eq!(bare.id.as_deref(), Some("t2"));
        assert_eq!(bare.inputs, vec!["1"]);
    }

    #[test]
    fn user_page_reads_users_from_snippets_key() {
        let page: ApiUserPage = serde_json::from_str(
            r#"{"snippets":[{"userId":"u1","name":"Ada"}],"pageNumber":2,"count":11,"pageSize":5}"#,
        )
        .unwrap();
        assert_eq!(page.users.len(), 1);
        assert_eq!(page.page, 2);
        assert_eq!(page.page_size, 5);
    }
}
