//! Static language → extension table.
//!
//! This table is the only place the client learns which languages it
//! supports. Lookups compare only the part of the language before `/`, so
//! `Printscript`, `Printscript/1.0` and `Printscript/1.1` all resolve to `ps`.

use crate::types::FileType;

const FILE_TYPES: &[(&str, &str)] = &[
    ("Python", "py"),
    ("Printscript/1.0", "ps"),
    ("Printscript/1.1", "ps"),
    ("Go", "go"),
    ("Java", "java"),
    ("JavaScript", "js"),
    ("TypeScript", "ts"),
];

/// All supported file types, in display order.
pub fn file_types() -> Vec<FileType> {
    FILE_TYPES
        .iter()
        .map(|(language, extension)| FileType {
            language: (*language).to_string(),
            extension: (*extension).to_string(),
        })
        .collect()
}

fn base_language(language: &str) -> &str {
    language.split('/').next().unwrap_or(language)
}

/// Extension for `language`, ignoring any `/version` suffix on either side.
pub fn extension_for(language: &str) -> Option<&'static str> {
    let wanted = base_language(language);
    FILE_TYPES
        .iter()
        .find(|(candidate, _)| base_language(candidate) == wanted)
        .map(|(_, extension)| *extension)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_order_is_stable() {
        let languages: Vec<String> = file_types().into_iter().map(|f| f.language).collect();
        assert_eq!(
            languages,
            vec![
                "Python",
                "Printscript/1.0",
                "Printscript/1.1",
                "Go",
                "Java",
                "JavaScript",
                "TypeScript"
            ]
        );
    }

    #[test]
    fn version_suffix_is_ignored() {
        assert_eq!(extension_for("Printscript"), Some("ps"));
        assert_eq!(extension_for("Printscript/1.1"), Some("ps"));
        assert_eq!(extension_for("Printscript/9.9"), Some("ps"));
        assert_eq!(extension_for("Go"), Some("go"));
    }

    #[test]
    fn unknown_language_has_no_extension() {
        assert_eq!(extension_for("Cobol"), None);
        assert_eq!(extension_for(""), None);
        assert_eq!(extension_for("printscript"), None);
    }
}
