//! Keyword dictionaries
//!
//! Each language tag maps surface spellings to canonical keyword ids. The
//! untagged default is English. A script selects another dictionary with a
//! leading `<tag>` directive.

use super::token::Keyword;
use crate::cache::CompileCache;
use crate::config::ConfigError;
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::sync::{Arc, LazyLock};

/// Tag of the dictionary used when a script carries no directive
pub const DEFAULT_LANGUAGE: &str = "en";

const ENGLISH: [(&str, Keyword); 15] = [
    ("if", Keyword::If),
    ("else", Keyword::Else),
    ("true", Keyword::True),
    ("false", Keyword::False),
    ("null", Keyword::Null),
    ("while", Keyword::While),
    ("for", Keyword::For),
    ("with", Keyword::With),
    ("up", Keyword::Up),
    ("down", Keyword::Down),
    ("till", Keyword::Till),
    ("in", Keyword::In),
    ("break", Keyword::Break),
    ("continue", Keyword::Continue),
    ("return", Keyword::Return),
];

const FRENCH: [(&str, Keyword); 15] = [
    ("si", Keyword::If),
    ("sinon", Keyword::Else),
    ("vrai", Keyword::True),
    ("faux", Keyword::False),
    ("nul", Keyword::Null),
    ("tanque", Keyword::While),
    ("pour", Keyword::For),
    ("avec", Keyword::With),
    ("mont", Keyword::Up),
    ("desc", Keyword::Down),
    ("jusqua", Keyword::Till),
    ("dans", Keyword::In),
    ("couper", Keyword::Break),
    ("continuer", Keyword::Continue),
    ("returner", Keyword::Return),
];

const BAMBARA: [(&str, Keyword); 15] = [
    ("nii", Keyword::If),
    ("note", Keyword::Else),
    ("tien", Keyword::True),
    ("galon", Keyword::False),
    ("gansan", Keyword::Null),
    ("foo", Keyword::While),
    ("seginka", Keyword::For),
    ("niin", Keyword::With),
    ("kay", Keyword::Up),
    ("kaj", Keyword::Down),
    ("kata", Keyword::Till),
    ("kono", Keyword::In),
    ("tike", Keyword::Break),
    ("ipan", Keyword::Continue),
    ("segin", Keyword::Return),
];

/// Spelling → keyword table of one language
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    tag: String,
    words: FxHashMap<String, Keyword>,
}

impl Dictionary {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            words: FxHashMap::default(),
        }
    }

    fn from_table(tag: &str, table: &[(&str, Keyword)]) -> Self {
        let mut dict = Self::new(tag);
        for (spelling, kw) in table {
            dict.insert(*spelling, *kw);
        }
        dict
    }

    pub fn insert(&mut self, spelling: impl Into<String>, keyword: Keyword) {
        self.words.insert(spelling.into(), keyword);
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn lookup(&self, spelling: &str) -> Option<Keyword> {
        self.words.get(spelling).copied()
    }

    /// All spellings, for typo suggestions.
    pub fn spellings(&self) -> impl Iterator<Item = &str> {
        self.words.keys().map(String::as_str)
    }

    /// The spelling this dictionary uses for a keyword.
    pub fn spelling_of(&self, keyword: Keyword) -> Option<&str> {
        self.words
            .iter()
            .find(|(_, kw)| **kw == keyword)
            .map(|(spelling, _)| spelling.as_str())
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Process-wide language table, seeded with the built-in languages
static LANGUAGES: LazyLock<RwLock<FxHashMap<String, Arc<Dictionary>>>> = LazyLock::new(|| {
    let mut table = FxHashMap::default();
    for (tag, words) in [("en", &ENGLISH), ("fr", &FRENCH), ("bm", &BAMBARA)] {
        table.insert(tag.to_string(), Arc::new(Dictionary::from_table(tag, words)));
    }
    RwLock::new(table)
});

/// Dictionary registered under `tag`, if any.
pub fn language(tag: &str) -> Option<Arc<Dictionary>> {
    LANGUAGES.read().get(tag).cloned()
}

/// The untagged default dictionary.
pub fn default_language() -> Arc<Dictionary> {
    match language(DEFAULT_LANGUAGE) {
        Some(dict) => dict,
        None => Arc::new(Dictionary::from_table(DEFAULT_LANGUAGE, &ENGLISH)),
    }
}

/// Dictionary for a directive tag; unknown tags fall back to the default.
pub fn resolve(tag: &str) -> Arc<Dictionary> {
    language(tag).unwrap_or_else(default_language)
}

/// Sorted tags of every registered language.
pub fn languages() -> Vec<String> {
    let mut tags: Vec<String> = LANGUAGES.read().keys().cloned().collect();
    tags.sort();
    tags
}

/// Register (or replace) a language from spelling → canonical id pairs.
///
/// Every id must name one of the reserved keywords. Replacing a language
/// changes how cached sources would lex, so the compile cache is cleared.
pub fn register_language<I, S, T>(tag: &str, entries: I) -> Result<(), ConfigError>
where
    I: IntoIterator<Item = (S, T)>,
    S: Into<String>,
    T: AsRef<str>,
{
    let mut dict = Dictionary::new(tag);
    for (spelling, id) in entries {
        let spelling = spelling.into();
        let id = id.as_ref();
        let Some(keyword) = Keyword::from_id(id) else {
            return Err(ConfigError::UnknownKeyword {
                language: tag.to_string(),
                spelling,
                id: id.to_string(),
            });
        };
        dict.insert(spelling, keyword);
    }

    tracing::debug!(language = tag, words = dict.len(), "registered keyword dictionary");
    LANGUAGES.write().insert(tag.to_string(), Arc::new(dict));
    CompileCache::global().clear();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_languages_present() {
        let tags = languages();
        for tag in ["bm", "en", "fr"] {
            assert!(tags.contains(&tag.to_string()), "missing {}", tag);
        }
    }

    #[test]
    fn test_builtin_dictionaries_are_complete() {
        for tag in ["en", "fr", "bm"] {
            let dict = resolve(tag);
            assert_eq!(dict.len(), Keyword::ALL.len());
            for kw in Keyword::ALL {
                assert!(dict.spelling_of(kw).is_some(), "{} lacks {}", tag, kw);
            }
        }
    }

    #[test]
    fn test_french_lookup() {
        let fr = resolve("fr");
        assert_eq!(fr.lookup("pour"), Some(Keyword::For));
        assert_eq!(fr.lookup("jusqua"), Some(Keyword::Till));
        // English spellings are plain identifiers in a tagged dictionary
        assert_eq!(fr.lookup("for"), None);
    }

    #[test]
    fn test_bambara_lookup() {
        let bm = resolve("bm");
        assert_eq!(bm.lookup("seginka"), Some(Keyword::For));
        assert_eq!(bm.spelling_of(Keyword::With), Some("niin"));
    }

    #[test]
    fn test_unknown_tag_falls_back_to_default() {
        let dict = resolve("xx-unknown");
        assert_eq!(dict.tag(), DEFAULT_LANGUAGE);
        assert_eq!(dict.lookup("while"), Some(Keyword::While));
    }

    #[test]
    fn test_register_language() {
        register_language("kw-test-de", [("wenn", "if"), ("sonst", "else")]).unwrap();
        let de = resolve("kw-test-de");
        assert_eq!(de.lookup("wenn"), Some(Keyword::If));
        assert_eq!(de.len(), 2);
    }

    #[test]
    fn test_register_language_rejects_unknown_id() {
        let err = register_language("kw-test-bad", [("solange", "until")]).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKeyword { ref id, .. } if id == "until"));
        assert!(language("kw-test-bad").is_none());
    }
}
