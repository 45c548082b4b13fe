// crates/extract_snippets/src/source_file.rs

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use format_specs::{get_format_spec, FormatSpec};
use regex::Regex;

use crate::snippet::{SNIPPET_END_PREFIX, SNIPPET_START_PREFIX, SNIPPET_TOKEN};

/// Transient wrapper around one source file's text and the marker patterns
/// derived from its comment format. Owned by a single scan and discarded
/// afterwards.
pub struct SourceFile {
    pub contents: String,
    pub spec: &'static FormatSpec,
}

impl SourceFile {
    /// Builds a source file directly from text, using the comment format
    /// registered for `extension`.
    pub fn new(contents: String, extension: &str) -> Result<Self> {
        let spec = get_format_spec(extension)?;
        Ok(SourceFile { contents, spec })
    }

    /// Reads the file at `path` and builds the wrapper for `extension`.
    pub fn read(path: &Path, extension: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Error reading source file {}", path.display()))?;
        SourceFile::new(contents, extension)
    }

    /// `{comment} >> id='<id>' options='<raw>' {/comment}`
    pub fn open_regex(&self) -> Result<Regex> {
        Regex::new(&format!(
            "{}{}{}{}",
            self.spec.comment_start, SNIPPET_START_PREFIX, SNIPPET_TOKEN, self.spec.comment_end
        ))
        .context("Invalid open marker pattern")
    }

    /// `{comment} << <id>` anchored at end of line, tolerating a close
    /// marker with no trailing comment end (e.g. the last line of a file
    /// without a final newline).
    pub fn closing_eof_regex(&self, id: &str) -> Result<Regex> {
        Regex::new(&format!(
            "(?m){}{}{}$",
            self.spec.comment_start, SNIPPET_END_PREFIX, id
        ))
        .context("Invalid closing marker pattern")
    }

    /// `{comment} << <id>([^-]){/comment}` — the non-hyphen guard keeps an
    /// id that is a prefix of another (`foo` vs `foo-bar`) from matching the
    /// longer id's closing line.
    pub fn closing_regex(&self, id: &str) -> Result<Regex> {
        Regex::new(&format!(
            "{}{}{}([^-]){}",
            self.spec.comment_start, SNIPPET_END_PREFIX, id, self.spec.comment_end
        ))
        .context("Invalid closing marker pattern")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_open_regex_captures_id_and_options() {
        let source =
            SourceFile::new("// >> id='sum' options='file=x.md'\n".to_string(), ".ts").unwrap();
        let re = source.open_regex().unwrap();
        let caps = re.captures(&source.contents).unwrap();
        assert_eq!(&caps[1], "sum");
        assert_eq!(&caps[2], "file=x.md");
    }

    #[test]
    fn test_open_regex_options_group_optional() {
        let source = SourceFile::new("// >> id='sum'\n".to_string(), ".ts").unwrap();
        let re = source.open_regex().unwrap();
        let caps = re.captures(&source.contents).unwrap();
        assert_eq!(&caps[1], "sum");
        assert!(caps.get(2).is_none());
    }

    #[test]
    fn test_closing_eof_regex_matches_without_trailing_newline() {
        let source = SourceFile::new("code\n// << sum".to_string(), ".ts").unwrap();
        let re = source.closing_eof_regex("sum").unwrap();
        assert!(re.is_match(&source.contents));
    }

    #[test]
    fn test_closing_regex_rejects_hyphen_extension() {
        let source = SourceFile::new(String::new(), ".ts").unwrap();
        let re = source.closing_regex("foo").unwrap();
        assert!(re.is_match("// << foo \n"));
        assert!(!re.is_match("// << foo-bar \n"));
    }

    #[test]
    fn test_unsupported_extension_rejected() {
        assert!(SourceFile::new(String::new(), ".py").is_err());
    }

    #[test]
    fn test_xml_open_regex() {
        let source =
            SourceFile::new("<!-- >> id='xml-snippet' -->\n".to_string(), ".xml").unwrap();
        let re = source.open_regex().unwrap();
        let caps = re.captures(&source.contents).unwrap();
        assert_eq!(&caps[1], "xml-snippet");
    }
}
