//! The contract between the UI and the snippet backend.
//!
//! Methods returning `Result` are fail-hard: they create, delete or encode
//! something, and the caller must see the failure. Every other method is
//! fail-soft and resolves to a safe value (empty list, `None`, the original
//! input, `TestCaseResult::Fail`) instead of an error.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::types::{
    CreateSnippet, FileType, PaginatedSnippets, PaginatedUsers, Rule, RuleAction, Snippet,
    TestCase, TestCaseResult, UpdateSnippet,
};

#[async_trait]
pub trait SnippetOperations: Send + Sync {
    /// Upload a new snippet and return the backend's representation.
    async fn create_snippet(&self, draft: &CreateSnippet) -> Result<Snippet, ApiError>;

    /// Delete a snippet and return a confirmation message.
    async fn delete_snippet(&self, id: &str) -> Result<String, ApiError>;

    /// Best-effort formatting; on any failure `source` comes back unchanged.
    async fn format_snippet(&self, source: &str) -> String;

    /// Supported languages in display order. No network call.
    async fn get_file_types(&self) -> Vec<FileType>;

    async fn get_rules(&self, action: RuleAction) -> Vec<Rule>;

    async fn get_format_rules(&self) -> Vec<Rule> {
        self.get_rules(RuleAction::Format).await
    }

    async fn get_linting_rules(&self) -> Vec<Rule> {
        self.get_rules(RuleAction::Lint).await
    }

    /// Write `rules` under `action`. Returns `rules` itself on success and an
    /// empty list on failure.
    async fn modify_rule(&self, rules: Vec<Rule>, action: RuleAction) -> Vec<Rule>;

    async fn modify_format_rule(&self, rules: Vec<Rule>) -> Vec<Rule> {
        self.modify_rule(rules, RuleAction::Format).await
    }

    async fn modify_linting_rule(&self, rules: Vec<Rule>) -> Vec<Rule> {
        self.modify_rule(rules, RuleAction::Lint).await
    }

    /// `None` when the snippet does not exist or could not be fetched.
    async fn get_snippet_by_id(&self, id: &str) -> Option<Snippet>;

    async fn get_test_cases(&self, snippet_id: &str) -> Vec<TestCase>;

    /// Users the current user can share with.
    async fn get_user_friends(
        &self,
        name: Option<&str>,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> PaginatedUsers;

    /// Owned snippets followed by snippets shared with the user. Pagination
    /// metadata comes from the owned query, so the page may hold up to twice
    /// `page_size` entries.
    async fn list_snippet_descriptors(
        &self,
        page: u32,
        page_size: u32,
        name: Option<&str>,
    ) -> PaginatedSnippets;

    /// Creates when `test_case.id` is `None`, updates otherwise.
    async fn post_test_case(&self, test_case: &TestCase, snippet_id: &str) -> Option<TestCase>;

    async fn remove_test_case(&self, id: &str) -> Result<String, ApiError>;

    /// Grant `user_id` access, then return the snippet as it now stands.
    async fn share_snippet(&self, snippet_id: &str, user_id: &str) -> Option<Snippet>;

    /// Result of a previously saved test case.
    async fn fetch_test_result(&self, test_id: &str) -> TestCaseResult;

    /// Run an unsaved test case against a snippet.
    async fn run_test_inline(&self, test_case: &TestCase, snippet_id: &str) -> TestCaseResult;

    /// `fetch_test_result` for saved test cases, `run_test_inline` otherwise.
    async fn test_snippet(&self, test_case: &TestCase, snippet_id: &str) -> TestCaseResult {
        match &test_case.id {
            Some(id) => self.fetch_test_result(id).await,
            None => self.run_test_inline(test_case, snippet_id).await,
        }
    }

    /// Replace a snippet's content. `None` when the snippet does not exist or
    /// the update failed.
    async fn update_snippet_by_id(&self, id: &str, update: &UpdateSnippet) -> Option<Snippet>;
}
