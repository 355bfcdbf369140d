//! Snippet write payloads as multipart forms.
//!
//! A composite language `<name>/<version>` is split on the first `/`: the
//! part before it is sent as `language`, everything after it as `version`.
//! Without a slash no `version` field is sent at all.

use crate::file_types::extension_for;
use crate::http::MultipartForm;
use crate::types::{CreateSnippet, UpdateSnippet};

/// Split `language` into its name and optional version.
pub fn split_language(language: &str) -> (&str, Option<&str>) {
    match language.split_once('/') {
        Some((name, version)) => (name, Some(version)),
        None => (language, None),
    }
}

/// Encode a create request: `name`, `description`, `language`, `version`
/// and a text/plain `file` called `<name>.<extension>`.
pub fn create_snippet_form(draft: &CreateSnippet) -> MultipartForm {
    let (language, version) = split_language(&draft.language);
    let extension = if draft.extension.is_empty() {
        extension_for(&draft.language).unwrap_or_default()
    } else {
        draft.extension.as_str()
    };

    let mut form = MultipartForm::new()
        .text("name", draft.name.as_str())
        .text("description", "")
        .text("language", language);
    if let Some(version) = version {
        form = form.text("version", version);
    }
    form.file(
        "file",
        format!("{}.{}", draft.name, extension),
        draft.content.as_str(),
    )
}

/// Encode a content update: the snippet id and the new content as
/// `snippet.txt`.
pub fn update_snippet_form(id: &str, update: &UpdateSnippet) -> MultipartForm {
    MultipartForm::new()
        .text("id", id)
        .file("file", "snippet.txt", update.content.as_str())
}
