//! Backend ↔ internal field mapping, one conversion per entity.
//!
//! | Entity   | Backend               | Internal   |
//! |----------|-----------------------|------------|
//! | TestCase | `inputs`              | `input`    |
//! | TestCase | `expectedOutput`      | `output`   |
//! | User     | `userId`              | `id`       |
//! | Page     | `pageNumber`/`pageSize` | `page`/`page_size` |
//! | Snippet  | (none)                | `extension`, from the file type table |
//! | Rule     | rule                  | rule + `action` on writes |

use crate::file_types::extension_for;
use crate::types::{
    ApiRuleWrite, ApiSnippetPage, ApiTestCase, ApiUser, ApiUserPage, PaginatedSnippets,
    PaginatedUsers, Rule, RuleAction, Snippet, TestCase, User,
};

impl From<ApiTestCase> for TestCase {
    fn from(api: ApiTestCase) -> Self {
        TestCase {
            id: api.id,
            name: api.name,
            input: api.inputs,
            output: api.expected_output,
        }
    }
}

impl From<&TestCase> for ApiTestCase {
    fn from(test_case: &TestCase) -> Self {
        ApiTestCase {
            id: test_case.id.clone(),
            name: test_case.name.clone(),
            inputs: test_case.input.clone(),
            expected_output: test_case.output.clone(),
        }
    }
}

impl From<ApiUser> for User {
    fn from(api: ApiUser) -> Self {
        User {
            id: api.user_id,
            name: api.name,
        }
    }
}

impl From<ApiUserPage> for PaginatedUsers {
    fn from(api: ApiUserPage) -> Self {
        PaginatedUsers {
            users: api.users.into_iter().map(User::from).collect(),
            page: api.page,
            count: api.count,
            page_size: api.page_size,
        }
    }
}

/// Fill `extension` from the language when the table knows it. A language
/// the table does not know keeps whatever extension the snippet had.
pub fn with_derived_extension(mut snippet: Snippet) -> Snippet {
    if let Some(extension) = extension_for(&snippet.language) {
        snippet.extension = Some(extension.to_string());
    }
    snippet
}

/// Owned snippets first, shared appended; page metadata from `owned` only.
///
/// The two queries filter on disjoint ownership flags, so no snippet can
/// appear twice and nothing is de-duplicated.
pub fn merge_snippet_pages(owned: ApiSnippetPage, shared: ApiSnippetPage) -> PaginatedSnippets {
    let snippets = owned
        .snippets
        .into_iter()
        .chain(shared.snippets)
        .map(with_derived_extension)
        .collect();
    PaginatedSnippets {
        snippets,
        page: owned.page,
        count: owned.count,
        page_size: owned.page_size,
    }
}

pub fn rules_for_write(rules: &[Rule], action: RuleAction) -> Vec<ApiRuleWrite> {
    rules
        .iter()
        .cloned()
        .map(|rule| ApiRuleWrite { rule, action })
        .collect()
}
