// crates/format_specs/src/lib.rs
//
// Maps a source file extension to the comment syntax used to recognize
// snippet markers in that language family, plus an optional post-processor
// applied to extracted snippet text.

use anyhow::{bail, Result};
use once_cell::sync::Lazy;
use regex::Regex;

/// Comment syntax descriptor for one language family.
///
/// `comment_start` and `comment_end` are regex fragments, not full patterns:
/// the scanner composes them with the marker grammar to build the actual
/// open/close marker expressions. `comment_end` consumes the rest of the
/// marker line including its line break.
#[derive(Debug)]
pub struct FormatSpec {
    pub comment_start: &'static str,
    pub comment_end: &'static str,
    pub post_process: Option<fn(&str) -> String>,
}

/// C-style line comments: `// >> id='...'`.
pub static JS_SPEC: FormatSpec = FormatSpec {
    comment_start: r"[^\S\r\n]*//[^\S\r\n]*",
    comment_end: r"[^\S\r\n]*\r?\n",
    post_process: None,
};

/// CSS block comments: `/* >> id='...' */`.
pub static CSS_SPEC: FormatSpec = FormatSpec {
    comment_start: r"[^\S\r\n]*/\*[^\S\r\n]*",
    comment_end: r"[^\S\r\n]*\*/[^\S\r\n]*\r?\n",
    post_process: None,
};

/// XML/HTML comments: `<!-- >> id='...' -->`. Extracted text is additionally
/// post-processed to guard `{{...}}` binding expressions from downstream
/// template renderers.
pub static XML_SPEC: FormatSpec = FormatSpec {
    comment_start: r"[^\S\r\n]*<!--[^\S\r\n]*",
    comment_end: r"[^\S\r\n]*-->[^\S\r\n]*\r?\n",
    post_process: Some(guard_binding_expressions),
};

static BINDING_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\{\{.*\}\}").unwrap());

/// Wraps every line containing a `{{...}}` binding expression in
/// `{% raw %}` / `{% endraw %}` guards so the binding syntax survives
/// documentation rendering.
fn guard_binding_expressions(snippet: &str) -> String {
    let guarded: Vec<String> = snippet
        .split('\n')
        .map(|line| {
            if BINDING_RE.is_match(line) {
                format!("{{% raw %}}{}{{% endraw %}}", line)
            } else {
                line.to_string()
            }
        })
        .collect();
    guarded.join("\n")
}

/// Returns the [`FormatSpec`] registered for the given file extension
/// (including the leading dot, e.g. `".ts"`).
///
/// # Errors
///
/// Fails for any extension without a registered comment format.
pub fn get_format_spec(extension: &str) -> Result<&'static FormatSpec> {
    match extension {
        ".cs" | ".swift" | ".h" | ".m" | ".js" | ".java" | ".ts" => Ok(&JS_SPEC),
        ".css" => Ok(&CSS_SPEC),
        ".xaml" | ".xml" | ".html" => Ok(&XML_SPEC),
        _ => bail!("Unsupported file extension: {}", extension),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_extensions_resolve() {
        for ext in [".ts", ".js", ".java", ".cs", ".swift", ".h", ".m"] {
            let spec = get_format_spec(ext).unwrap();
            assert!(std::ptr::eq(spec, &JS_SPEC));
        }
        assert!(std::ptr::eq(get_format_spec(".css").unwrap(), &CSS_SPEC));
        for ext in [".xml", ".xaml", ".html"] {
            assert!(std::ptr::eq(get_format_spec(ext).unwrap(), &XML_SPEC));
        }
    }

    #[test]
    fn test_unsupported_extension_fails() {
        let err = get_format_spec(".py").unwrap_err();
        assert!(err.to_string().contains("Unsupported file extension"));
    }

    #[test]
    fn test_binding_guard_wraps_only_binding_lines() {
        let input = "<Label text=\"{{ itemName }}\"/>\n<Label text=\"static\"/>";
        let expected =
            "{% raw %}<Label text=\"{{ itemName }}\"/>{% endraw %}\n<Label text=\"static\"/>";
        assert_eq!(guard_binding_expressions(input), expected);
    }

    #[test]
    fn test_binding_guard_passes_plain_text_through() {
        let input = "no bindings here";
        assert_eq!(guard_binding_expressions(input), input);
    }

    #[test]
    fn test_open_marker_pattern_composes() {
        // The fragments must compose into a valid pattern that matches a
        // real marker line.
        let pattern = format!(
            "{}>>[^\\S\\r\\n]id='([a-z][\\w-]*)'{}",
            JS_SPEC.comment_start, JS_SPEC.comment_end
        );
        let re = Regex::new(&pattern).unwrap();
        let caps = re.captures("// >> id='sum'\n").unwrap();
        assert_eq!(&caps[1], "sum");
    }
}
