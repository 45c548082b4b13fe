// crates/extract_snippets/src/store.rs

use std::collections::HashMap;

use log::debug;

use crate::snippet::Snippet;

/// Deduplicating registry of snippets keyed by `(file extension, id)`.
///
/// Insert-once semantics: a second registration of the same key is silently
/// ignored, so the first occurrence encountered during the load pass wins.
/// There is no removal or update; the store lives for one program run and is
/// passed by reference into both the load and inject passes.
#[derive(Debug, Default)]
pub struct SnippetStore {
    snippets: HashMap<(String, String), Snippet>,
}

impl SnippetStore {
    pub fn new() -> Self {
        SnippetStore::default()
    }

    pub fn has(&self, extension: &str, id: &str) -> bool {
        self.snippets
            .contains_key(&(extension.to_string(), id.to_string()))
    }

    pub fn add(&mut self, snippet: Snippet) {
        let key = (snippet.file_extension.clone(), snippet.id.clone());
        if self.snippets.contains_key(&key) {
            debug!("Duplicate snippet '{}' for '{}' ignored", key.1, key.0);
            return;
        }
        self.snippets.insert(key, snippet);
    }

    pub fn get(&self, extension: &str, id: &str) -> Option<&Snippet> {
        self.snippets
            .get(&(extension.to_string(), id.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Snippet> {
        self.snippets.values()
    }

    pub fn len(&self) -> usize {
        self.snippets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snippets.is_empty()
    }
}
