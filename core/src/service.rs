//! The production `SnippetOperations` implementation.
//!
//! # Design
//! Every operation runs the same pipeline: ask the `TokenProvider` for a
//! bearer token, build the request with `SnippetClient`, execute it on the
//! `Transport`, parse the response. The result then goes through the
//! operation's failure policy: fail-hard operations log at `error` and
//! return the error, fail-soft operations log at `warn` and return their
//! fallback. Nothing is retried.

use tracing::{debug, error, instrument, warn};

use crate::client::{Ownership, SnippetClient};
use crate::config::ServiceConfig;
use crate::error::ApiError;
use crate::file_types::file_types;
use crate::http::{HttpRequest, HttpResponse};
use crate::mapping::{merge_snippet_pages, with_derived_extension};
use crate::operations::SnippetOperations;
use crate::token::TokenProvider;
use crate::transport::Transport;
use crate::types::{
    ApiSnippetPage, CreateSnippet, FileType, PaginatedSnippets, PaginatedUsers, Rule, RuleAction,
    Snippet, TestCase, TestCaseResult, UpdateSnippet,
};

pub const DELETE_CONFIRMATION: &str = "Snippet deleted successfully";

pub struct SnippetService<T, P> {
    client: SnippetClient,
    transport: T,
    tokens: P,
}

impl<T: Transport, P: TokenProvider> SnippetService<T, P> {
    pub fn new(client: SnippetClient, transport: T, tokens: P) -> Self {
        Self {
            client,
            transport,
            tokens,
        }
    }

    pub fn from_config(config: &ServiceConfig, transport: T, tokens: P) -> Self {
        Self::new(SnippetClient::from_config(config), transport, tokens)
    }

    pub fn client(&self) -> &SnippetClient {
        &self.client
    }

    /// Attach the current bearer token and execute.
    async fn send(&self, request: HttpRequest) -> Result<HttpResponse, ApiError> {
        let token = self.tokens.token().await?;
        let request = request.with_bearer(&token);
        debug!(method = request.method.as_str(), path = %request.path, "sending request");
        self.transport.execute(request).await
    }

    async fn fetch_snippet(&self, id: &str) -> Result<Snippet, ApiError> {
        let response = self.send(self.client.build_get_snippet(id)).await?;
        self.client.parse_snippet(response).map(with_derived_extension)
    }

    async fn fetch_page(
        &self,
        ownership: Ownership,
        page: u32,
        page_size: u32,
        name: Option<&str>,
    ) -> Result<ApiSnippetPage, ApiError> {
        let request = self.client.build_list_snippets(ownership, page, page_size, name);
        let response = self.send(request).await?;
        self.client.parse_snippet_page(response)
    }

    async fn put_rules(&self, rules: &[Rule], action: RuleAction) -> Result<(), ApiError> {
        let request = self.client.build_modify_rules(rules, action)?;
        let response = self.send(request).await?;
        self.client.parse_modify_rules(response)
    }

    async fn write_test_case(&self, test_case: &TestCase, snippet_id: &str) -> Result<TestCase, ApiError> {
        let request = match &test_case.id {
            None => self.client.build_create_test_case(snippet_id, test_case)?,
            Some(id) => self.client.build_update_test_case(id, test_case)?,
        };
        let response = self.send(request).await?;
        self.client.parse_test_case(response)
    }
}

#[async_trait::async_trait]
impl<T: Transport, P: TokenProvider> SnippetOperations for SnippetService<T, P> {
    #[instrument(skip_all, fields(name = %draft.name, language = %draft.language))]
    async fn create_snippet(&self, draft: &CreateSnippet) -> Result<Snippet, ApiError> {
        let result = async {
            let response = self.send(self.client.build_create_snippet(draft)).await?;
            self.client.parse_snippet(response)
        }
        .await;
        result.map_err(|err| {
            error!(error = %err, "failed to create snippet");
            err
        })
    }

    #[instrument(skip(self))]
    async fn delete_snippet(&self, id: &str) -> Result<String, ApiError> {
        let result = async {
            let response = self.send(self.client.build_delete_snippet(id)).await?;
            self.client.parse_delete_snippet(response)
        }
        .await;
        match result {
            Ok(()) => Ok(DELETE_CONFIRMATION.to_string()),
            Err(err) => {
                error!(error = %err, "failed to delete snippet");
                Err(err)
            }
        }
    }

    async fn format_snippet(&self, source: &str) -> String {
        let result = async {
            let response = self.send(self.client.build_format_snippet(source)).await?;
            self.client.parse_format_snippet(response)
        }
        .await;
        result.unwrap_or_else(|err| {
            warn!(error = %err, "failed to format snippet, keeping original");
            source.to_string()
        })
    }

    async fn get_file_types(&self) -> Vec<FileType> {
        file_types()
    }

    #[instrument(skip(self))]
    async fn get_rules(&self, action: RuleAction) -> Vec<Rule> {
        let result = async {
            let response = self.send(self.client.build_get_rules(action)).await?;
            self.client.parse_rules(response)
        }
        .await;
        result.unwrap_or_else(|err| {
            warn!(error = %err, "failed to get rules");
            Vec::new()
        })
    }

    #[instrument(skip(self, rules), fields(count = rules.len()))]
    async fn modify_rule(&self, rules: Vec<Rule>, action: RuleAction) -> Vec<Rule> {
        match self.put_rules(&rules, action).await {
            Ok(()) => rules,
            Err(err) => {
                warn!(error = %err, "failed to save rules");
                Vec::new()
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_snippet_by_id(&self, id: &str) -> Option<Snippet> {
        match self.fetch_snippet(id).await {
            Ok(snippet) => Some(snippet),
            Err(err) => {
                warn!(error = %err, "failed to get snippet");
                None
            }
        }
    }

    #[instrument(skip(self))]
    async fn get_test_cases(&self, snippet_id: &str) -> Vec<TestCase> {
        let result = async {
            let response = self.send(self.client.build_get_test_cases(snippet_id)).await?;
            self.client.parse_test_cases(response)
        }
        .await;
        result.unwrap_or_else(|err| {
            warn!(error = %err, "failed to get test cases");
            Vec::new()
        })
    }

    #[instrument(skip(self))]
    async fn get_user_friends(
        &self,
        name: Option<&str>,
        page: Option<u32>,
        page_size: Option<u32>,
    ) -> PaginatedUsers {
        let result = async {
            let request = self.client.build_get_users(name, page, page_size);
            let response = self.send(request).await?;
            self.client.parse_users(response)
        }
        .await;
        result.unwrap_or_else(|err| {
            warn!(error = %err, "failed to get users");
            PaginatedUsers {
                page: page.unwrap_or_default(),
                page_size: page_size.unwrap_or_default(),
                ..PaginatedUsers::default()
            }
        })
    }

    #[instrument(skip(self))]
    async fn list_snippet_descriptors(
        &self,
        page: u32,
        page_size: u32,
        name: Option<&str>,
    ) -> PaginatedSnippets {
        let (owned, shared) = tokio::join!(
            self.fetch_page(Ownership::Owned, page, page_size, name),
            self.fetch_page(Ownership::Shared, page, page_size, name),
        );
        match (owned, shared) {
            (Ok(owned), Ok(shared)) => {
                debug!(
                    owned = owned.snippets.len(),
                    shared = shared.snippets.len(),
                    "merging snippet pages"
                );
                merge_snippet_pages(owned, shared)
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "failed to list snippets");
                PaginatedSnippets::empty(page, page_size)
            }
        }
    }

    #[instrument(skip_all, fields(snippet_id = %snippet_id, test_case_id = ?test_case.id))]
    async fn post_test_case(&self, test_case: &TestCase, snippet_id: &str) -> Option<TestCase> {
        match self.write_test_case(test_case, snippet_id).await {
            Ok(saved) => Some(saved),
            Err(err) => {
                warn!(error = %err, "failed to save test case");
                None
            }
        }
    }

    #[instrument(skip(self))]
    async fn remove_test_case(&self, id: &str) -> Result<String, ApiError> {
        let result = async {
            let response = self.send(self.client.build_remove_test_case(id)).await?;
            self.client.parse_remove_test_case(response)
        }
        .await;
        result.map_err(|err| {
            error!(error = %err, "failed to remove test case");
            err
        })
    }

    #[instrument(skip(self))]
    async fn share_snippet(&self, snippet_id: &str, user_id: &str) -> Option<Snippet> {
        let shared = async {
            let request = self.client.build_share_snippet(snippet_id, user_id)?;
            let response = self.send(request).await?;
            self.client.parse_share_snippet(response)
        }
        .await;
        if let Err(err) = shared {
            warn!(error = %err, "failed to share snippet");
            return None;
        }
        self.get_snippet_by_id(snippet_id).await
    }

    #[instrument(skip(self))]
    async fn fetch_test_result(&self, test_id: &str) -> TestCaseResult {
        let result = async {
            let response = self.send(self.client.build_fetch_test_result(test_id)).await?;
            self.client.parse_test_result(response)
        }
        .await;
        result.unwrap_or_else(|err| {
            warn!(error = %err, "failed to fetch test result");
            TestCaseResult::Fail
        })
    }

    #[instrument(skip_all, fields(snippet_id = %snippet_id, name = %test_case.name))]
    async fn run_test_inline(&self, test_case: &TestCase, snippet_id: &str) -> TestCaseResult {
        let result = async {
            let request = self.client.build_run_test_inline(snippet_id, test_case)?;
            let response = self.send(request).await?;
            self.client.parse_test_result(response)
        }
        .await;
        result.unwrap_or_else(|err| {
            warn!(error = %err, "failed to run test");
            TestCaseResult::Fail
        })
    }

    #[instrument(skip(self, update))]
    async fn update_snippet_by_id(&self, id: &str, update: &UpdateSnippet) -> Option<Snippet> {
        self.get_snippet_by_id(id).await?;

        let result = async {
            let response = self.send(self.client.build_update_snippet(id, update)).await?;
            self.client.parse_snippet(response)
        }
        .await;
        match result {
            Ok(snippet) => Some(with_derived_extension(snippet)),
            Err(err) => {
                warn!(error = %err, "failed to update snippet");
                None
            }
        }
    }
}
