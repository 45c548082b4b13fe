// crates/extract_snippets/src/lib.rs
//
// Load pass: discovers source files under a root, scans each one for
// comment-delimited snippet markers and populates a `SnippetStore`.

use std::path::Path;

use anyhow::{bail, Result};
use log::{debug, info};
use walkdir::WalkDir;

pub mod snippet;
pub mod source_file;
pub mod store;

pub use snippet::Snippet;
pub use source_file::SourceFile;
pub use store::SnippetStore;

/// Returns true when `path` carries exactly the given dotted extension
/// (e.g. `".ts"`).
fn has_extension(path: &Path, dotted: &str) -> bool {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()) == dotted)
        .unwrap_or(false)
}

/// Scans one source file's text for snippet markers and registers every new
/// `(extension, id)` in the store.
///
/// An open marker whose `(extension, id)` is already stored is skipped
/// outright: its body is never scanned and no closing tag is looked up.
/// Scanning always resumes immediately after the open marker match.
///
/// # Errors
///
/// Fails when an open marker has no corresponding closing marker.
pub fn scan_source(source: &SourceFile, extension: &str, store: &mut SnippetStore) -> Result<()> {
    let open_re = source.open_regex()?;
    let contents = source.contents.as_str();

    let mut pos = 0;
    while let Some(caps) = open_re.captures_at(contents, pos) {
        let open = caps.get(0).unwrap();
        let id = caps[1].to_string();
        let options = caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string();
        pos = open.end();

        if store.has(extension, &id) {
            debug!("Snippet '{}' already stored for '{}', skipping", id, extension);
            continue;
        }
        info!("Processing snippet '{}'", id);

        // Prefer the end-of-line anchored closing form, which tolerates a
        // close marker on the last line of a file without a trailing
        // newline; fall back to the general closing pattern.
        let close_index = if let Some(close) = source.closing_eof_regex(&id)?.find(contents) {
            close.start()
        } else if let Some(close) = source.closing_regex(&id)?.find(contents) {
            close.start()
        } else {
            bail!("Closing tag not found for: {}", id);
        };

        let mut entry = Snippet::new(id.clone(), options, extension.to_string(), source.spec);
        if close_index >= open.end() {
            entry.value = contents[open.end()..close_index].to_string();
        }
        debug!("Snippet value: {}", entry.value);

        info!("Snippet resolved: {}", id);
        store.add(entry);
    }

    Ok(())
}

fn scan_path(path: &Path, extension: &str, store: &mut SnippetStore) -> Result<()> {
    info!("Processing source file: {}", path.display());
    let source = SourceFile::read(path, extension)?;
    scan_source(&source, extension, store)
}

/// Walks the source tree at `root` once per configured source extension and
/// returns the populated store. A `root` that is itself a file is scanned
/// directly. Traversal is depth-first in filesystem listing order.
pub fn load_snippets(root: &Path, source_types: &[String]) -> Result<SnippetStore> {
    let mut store = SnippetStore::new();

    for extension in source_types {
        if root.is_file() {
            scan_path(root, extension, &mut store)?;
        } else {
            for entry in WalkDir::new(root)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
            {
                if has_extension(entry.path(), extension) {
                    scan_path(entry.path(), extension, &mut store)?;
                }
            }
        }
    }

    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn scan_str(contents: &str, extension: &str) -> Result<SnippetStore> {
        let source = SourceFile::new(contents.to_string(), extension)?;
        let mut store = SnippetStore::new();
        scan_source(&source, extension, &mut store)?;
        Ok(store)
    }

    #[test]
    fn test_scan_simple_snippet() {
        let store = scan_str("// >> id='sum'\nreturn a + b;\n// << sum\n", ".ts").unwrap();
        let snippet = store.get(".ts", "sum").unwrap();
        assert_eq!(snippet.id, "sum");
        assert_eq!(snippet.processed_value().unwrap(), "return a + b;");
    }

    #[test]
    fn test_scan_close_marker_at_eof_without_newline() {
        let store = scan_str("// >> id='sum'\nreturn a + b;\n// << sum", ".ts").unwrap();
        assert_eq!(
            store.get(".ts", "sum").unwrap().processed_value().unwrap(),
            "return a + b;"
        );
    }

    #[test]
    fn test_missing_closing_tag_fails() {
        let err = scan_str("// >> id='sum'\nreturn a + b;\n", ".ts").unwrap_err();
        assert!(err.to_string().contains("Closing tag not found for: sum"));
    }

    #[test]
    fn test_duplicate_id_keeps_first_body() {
        let contents = "// >> id='sum'\nfirst\n// << sum\n// >> id='sum'\nsecond\n// << sum\n";
        let store = scan_str(contents, ".ts").unwrap();
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(".ts", "sum").unwrap().processed_value().unwrap(), "first");
    }

    #[test]
    fn test_duplicate_id_skipped_before_close_lookup() {
        // The duplicate's surrounding structure is never validated: no
        // closing tag exists for the second occurrence, yet the scan
        // succeeds because the duplicate is skipped outright.
        let contents = "// >> id='sum'\nfirst\n// << sum\n// >> id='sum'\ndangling\n";
        let store = scan_str(contents, ".ts").unwrap();
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_prefix_id_does_not_steal_longer_close_tag() {
        let contents = "// >> id='foo'\nbody of foo\n// << foo-bar\n// << foo\n";
        let store = scan_str(contents, ".ts").unwrap();
        let processed = store.get(".ts", "foo").unwrap().processed_value().unwrap();
        assert!(processed.contains("body of foo"));
    }

    #[test]
    fn test_scan_multiple_snippets() {
        let contents = "// >> id='one'\n1\n// << one\ncode\n// >> id='two' options='file=t.md'\n2\n// << two\n";
        let store = scan_str(contents, ".ts").unwrap();
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(".ts", "two").unwrap().file(), "t.md");
    }

    #[test]
    fn test_css_block_comment_markers() {
        let contents = "/* >> id='style' */\n.btn { color: red; }\n/* << style */\n";
        let store = scan_str(contents, ".css").unwrap();
        assert_eq!(
            store.get(".css", "style").unwrap().processed_value().unwrap(),
            ".btn { color: red; }"
        );
    }

    #[test]
    fn test_load_snippets_walks_tree() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join("a.ts"),
            "// >> id='alpha'\nconst a = 1;\n// << alpha\n",
        )
        .unwrap();
        fs::write(
            nested.join("b.ts"),
            "// >> id='beta'\nconst b = 2;\n// << beta\n",
        )
        .unwrap();
        fs::write(nested.join("ignored.txt"), "// >> id='gamma'\nx\n// << gamma\n").unwrap();

        let types = vec![".ts".to_string()];
        let store = load_snippets(dir.path(), &types).unwrap();
        assert_eq!(store.len(), 2);
        assert!(store.has(".ts", "alpha"));
        assert!(store.has(".ts", "beta"));
        assert!(!store.has(".ts", "gamma"));
    }

    #[test]
    fn test_load_snippets_same_id_across_extensions() {
        let dir = tempdir().unwrap();
        fs::write(
            dir.path().join("a.ts"),
            "// >> id='sum'\nts body\n// << sum\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("a.js"),
            "// >> id='sum'\njs body\n// << sum\n",
        )
        .unwrap();

        let types = vec![".js".to_string(), ".ts".to_string()];
        let store = load_snippets(dir.path(), &types).unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_load_snippets_file_root() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("single.ts");
        fs::write(&file, "// >> id='solo'\nonly\n// << solo\n").unwrap();

        let types = vec![".ts".to_string()];
        let store = load_snippets(&file, &types).unwrap();
        assert!(store.has(".ts", "solo"));
    }
}
