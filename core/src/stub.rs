//! In-memory `SnippetOperations` for UI work without a backend.
//!
//! Serves file types, snippet lookup, listing, formatting (echo) and empty
//! rule sets from a fixed snippet list. Anything else panics with "not
//! implemented" so a test that reaches it fails loudly.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::file_types::file_types;
use crate::mapping::with_derived_extension;
use crate::operations::SnippetOperations;
use crate::types::{
    CreateSnippet, FileType, PaginatedSnippets, PaginatedUsers, Rule, RuleAction, Snippet,
    TestCase, TestCaseResult, UpdateSnippet,
};

#[derive(Debug, Clone, Default)]
pub struct StubSnippetOperations {
    snippets: Vec<Snippet>,
}

impl StubSnippetOperations {
    pub fn new(snippets: Vec<Snippet>) -> Self {
        Self { snippets }
    }
}

#[async_trait]
impl SnippetOperations for StubSnippetOperations {
    async fn create_snippet(&self, _draft: &CreateSnippet) -> Result<Snippet, ApiError> {
        unimplemented!("create_snippet is not implemented by the stub")
    }

    async fn delete_snippet(&self, _id: &str) -> Result<String, ApiError> {
        unimplemented!("delete_snippet is not implemented by the stub")
    }

    async fn format_snippet(&self, source: &str) -> String {
        source.to_string()
    }

    async fn get_file_types(&self) -> Vec<FileType> {
        file_types()
    }

    async fn get_rules(&self, _action: RuleAction) -> Vec<Rule> {
        Vec::new()
    }

    async fn modify_rule(&self, _rules: Vec<Rule>, _action: RuleAction) -> Vec<Rule> {
        unimplemented!("modify_rule is not implemented by the stub")
    }

    async fn get_snippet_by_id(&self, id: &str) -> Option<Snippet> {
        self.snippets
            .iter()
            .find(|snippet| snippet.id == id)
            .cloned()
            .map(with_derived_extension)
    }

    async fn get_test_cases(&self, _snippet_id: &str) -> Vec<TestCase> {
        unimplemented!("get_test_cases is not implemented by the stub")
    }

    async fn get_user_friends(
        &self,
        _name: Option<&str>,
        _page: Option<u32>,
        _page_size: Option<u32>,
    ) -> PaginatedUsers {
        unimplemented!("get_user_friends is not implemented by the stub")
    }

    /// Every stored snippet counts as owned; `name` filters by substring.
    async fn list_snippet_descriptors(
        &self,
        page: u32,
        page_size: u32,
        name: Option<&str>,
    ) -> PaginatedSnippets {
        let matching: Vec<&Snippet> = self
            .snippets
            .iter()
            .filter(|snippet| name.map_or(true, |name| snippet.name.contains(name)))
            .collect();
        let start = (page as usize).saturating_mul(page_size as usize);
        let snippets = matching
            .iter()
            .skip(start)
            .take(page_size as usize)
            .map(|snippet| with_derived_extension((*snippet).clone()))
            .collect();
        PaginatedSnippets {
            snippets,
            page,
            count: matching.len() as u64,
            page_size,
        }
    }

    async fn post_test_case(&self, _test_case: &TestCase, _snippet_id: &str) -> Option<TestCase> {
        unimplemented!("post_test_case is not implemented by the stub")
    }

    async fn remove_test_case(&self, _id: &str) -> Result<String, ApiError> {
        unimplemented!("remove_test_case is not implemented by the stub")
    }

    async fn share_snippet(&self, _snippet_id: &str, _user_id: &str) -> Option<Snippet> {
        unimplemented!("share_snippet is not implemented by the stub")
    }

    async fn fetch_test_result(&self, _test_id: &str) -> TestCaseResult {
        unimplemented!("fetch_test_result is not implemented by the stub")
    }

    async fn run_test_inline(&self, _test_case: &TestCase, _snippet_id: &str) -> TestCaseResult {
        unimplemented!("run_test_inline is not implemented by the stub")
    }

    async fn update_snippet_by_id(&self, _id: &str, _update: &UpdateSnippet) -> Option<Snippet> {
        unimplemented!("update_snippet_by_id is not implemented by the stub")
    }
}
