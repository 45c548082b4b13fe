// crates/extract_snippets/src/snippet.rs

use anyhow::{bail, Result};
use format_specs::FormatSpec;
use regex::Regex;

/// A single horizontal whitespace character (space or tab, not a newline).
pub const WS_CHAR: &str = r"[^\S\r\n]";

/// Opening marker prefix: `>>` followed by one whitespace character.
pub const SNIPPET_START_PREFIX: &str = r">>[^\S\r\n]";
/// Closing marker prefix: `<<` followed by one whitespace character.
pub const SNIPPET_END_PREFIX: &str = r"<<[^\S\r\n]";
/// Reserved marker name for regions excised from processed output.
pub const HIDE_TOKEN: &str = r"\(hide\)";
/// Snippet declaration: `id='<id>'` optionally followed by `options='<raw>'`.
/// Captures the id in group 1 and the raw options string in group 2.
pub const SNIPPET_TOKEN: &str = r"id='([a-z][\w-]*)'[^\S\r\n]*(?:options='(.*)')?";
/// Loose name form accepted on closing marker lines.
pub const SNIPPET_NAME: &str = r"([a-z][\w?=&/\\.-]*)";

#[cfg(windows)]
const EOL: &str = "\r\n";
#[cfg(not(windows))]
const EOL: &str = "\n";

/// One extracted source fragment, identified by `(file_extension, id)`.
///
/// `value` holds the raw text sliced strictly between the open and close
/// markers; it is set once by the scanner and never mutated afterwards.
/// [`Snippet::processed_value`] derives the publishable form on demand.
#[derive(Debug)]
pub struct Snippet {
    pub id: String,
    pub options: String,
    pub file_extension: String,
    pub value: String,
    spec: &'static FormatSpec,
    parsed_options: Vec<(String, String)>,
}

impl Snippet {
    pub fn new(id: String, options: String, file_extension: String, spec: &'static FormatSpec) -> Self {
        let parsed_options = parse_options(&options);
        Snippet {
            id,
            options,
            file_extension,
            value: String::new(),
            spec,
            parsed_options,
        }
    }

    /// Returns the value for `key` from the snippet's options, or an empty
    /// string when the key is absent. The first occurrence of a key wins.
    pub fn option(&self, key: &str) -> &str {
        self.parsed_options
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .unwrap_or("")
    }

    /// Target documentation file for file-producing snippets.
    pub fn file(&self) -> &str {
        self.option("file")
    }

    /// Explicit header file path, relative to the documentation root.
    pub fn header(&self) -> &str {
        self.option("header")
    }

    /// Explicit footer file path, relative to the documentation root.
    pub fn footer(&self) -> &str {
        self.option("footer")
    }

    /// The snippet text ready for injection: marker lines stripped,
    /// whitespace normalized, format post-processing applied, hidden
    /// blocks removed. Pure function of `value` and the owning format.
    ///
    /// # Errors
    ///
    /// Fails when hidden-block start and end markers are unbalanced.
    pub fn processed_value(&self) -> Result<String> {
        let open_replacer = Regex::new(&format!(
            "{}{}{}{}",
            self.spec.comment_start, SNIPPET_START_PREFIX, SNIPPET_TOKEN, self.spec.comment_end
        ))?;
        let close_replacer = Regex::new(&format!(
            "{}{}{}{}",
            self.spec.comment_start, SNIPPET_END_PREFIX, SNIPPET_NAME, self.spec.comment_end
        ))?;

        let snippet = open_replacer.replace_all(&self.value, "");
        let snippet = close_replacer.replace_all(&snippet, "");
        let mut snippet = trim_whitespace(&snippet);

        if let Some(post_process) = self.spec.post_process {
            snippet = post_process(&snippet);
        }

        self.remove_hidden_blocks(&snippet)
    }

    /// Excises every `(hide)`-delimited region, markers included. Start and
    /// end markers are paired by index over their textual order; removal
    /// runs back to front so earlier offsets stay valid.
    fn remove_hidden_blocks(&self, snippet: &str) -> Result<String> {
        let start_re = Regex::new(&format!(
            "{}{}{}{}",
            self.spec.comment_start, SNIPPET_START_PREFIX, HIDE_TOKEN, self.spec.comment_end
        ))?;
        let end_re = Regex::new(&format!(
            "{}{}{}{}",
            self.spec.comment_start, SNIPPET_END_PREFIX, HIDE_TOKEN, self.spec.comment_end
        ))?;

        let starts: Vec<(usize, usize)> = start_re.find_iter(snippet).map(|m| (m.start(), m.end())).collect();
        let ends: Vec<(usize, usize)> = end_re.find_iter(snippet).map(|m| (m.start(), m.end())).collect();

        if starts.len() != ends.len() {
            bail!("Mismatched hidden block markers in snippet: {}", self.id);
        }

        let mut result = snippet.to_string();
        for (start, end) in starts.iter().zip(ends.iter()).rev() {
            if end.1 >= start.0 {
                result.replace_range(start.0..end.1, "");
            }
        }

        Ok(result)
    }
}

/// Parses a raw `key=value&key=value` options string into ordered pairs.
/// Segments without a `=` are ignored.
fn parse_options(options: &str) -> Vec<(String, String)> {
    options
        .split('&')
        .filter_map(|part| part.split_once('='))
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Normalizes fragment whitespace: tabs become four spaces, blank lines are
/// dropped from both ends, and the minimum leading-space count across
/// non-blank lines is stripped from every non-blank line. Whitespace-only
/// interior lines are kept as-is.
fn trim_whitespace(snippet: &str) -> String {
    let detabbed = snippet.replace('\t', "    ");
    let mut lines: Vec<&str> = detabbed
        .split('\n')
        .map(|line| line.strip_suffix('\r').unwrap_or(line))
        .collect();

    while lines.first().map_or(false, |line| line.trim().is_empty()) {
        lines.remove(0);
    }
    while lines.last().map_or(false, |line| line.trim().is_empty()) {
        lines.pop();
    }

    let min_indent = lines
        .iter()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches(' ').len())
        .min()
        .unwrap_or(0);

    if min_indent > 0 {
        let stripped: Vec<&str> = lines
            .iter()
            .map(|line| {
                if line.trim().is_empty() {
                    *line
                } else {
                    &line[min_indent..]
                }
            })
            .collect();
        return stripped.join(EOL);
    }

    lines.join(EOL)
}
