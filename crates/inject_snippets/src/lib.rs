// crates/inject_snippets/src/lib.rs
//
// Inject pass: materializes file-producing snippets under the documentation
// root, then rewrites placeholder tokens in documentation files using the
// snippets collected by the load pass.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::Local;
use log::{debug, info};
use regex::Regex;
use walkdir::WalkDir;

use extract_snippets::snippet::{SNIPPET_TOKEN, WS_CHAR};
use extract_snippets::SnippetStore;

/// Configuration consumed by the injector, straight from the CLI surface.
pub struct InjectOptions {
    /// Ordered, pipe-separated source extensions, e.g. `.js|.ts`.
    pub source_extension_filter: String,
    /// Pipe-separated documentation extensions, e.g. `.md`.
    pub target_extension_filter: String,
    /// Pipe-separated code fence labels, positionally aligned with the
    /// source extensions.
    pub snippet_titles: String,
    pub placeholder_prefix: String,
    pub placeholder_suffix: String,
    /// Keep placeholder tags around injected content so re-runs stay
    /// idempotent.
    pub wrap: bool,
}

pub struct Injector {
    opts: InjectOptions,
    source_types: Vec<String>,
    target_types: Vec<String>,
    titles: HashMap<String, String>,
    wrapped_re: Regex,
    placeholder_re: Regex,
}

impl Injector {
    pub fn new(opts: InjectOptions) -> Result<Self> {
        let source_types: Vec<String> = opts
            .source_extension_filter
            .split('|')
            .map(str::to_string)
            .collect();
        let target_types: Vec<String> = opts
            .target_extension_filter
            .split('|')
            .map(str::to_string)
            .collect();

        let mut titles = HashMap::new();
        let mut title_list = opts.snippet_titles.split('|');
        for source_type in &source_types {
            let title = title_list.next().unwrap_or("");
            titles.insert(source_type.clone(), title.to_string());
        }
        debug!("Stored source titles: {:?}", titles);

        // Wrapped form: an open tag pair around previously injected content.
        let wrapped_re = Regex::new(&format!(
            "{prefix}{ws}*snippet{ws}+{token}[\\S\\s]*?{suffix}[\\S\\s]*?{prefix}/snippet{suffix}",
            prefix = opts.placeholder_prefix,
            suffix = opts.placeholder_suffix,
            ws = WS_CHAR,
            token = SNIPPET_TOKEN,
        ))
        .context("Invalid wrapped placeholder pattern")?;

        // Self-closing form: `{prefix}snippet id='x' options='y'/{suffix}`.
        let placeholder_re = Regex::new(&format!(
            "{prefix}{ws}*snippet{ws}+{token}\\s*/\\s*{suffix}",
            prefix = opts.placeholder_prefix,
            suffix = opts.placeholder_suffix,
            ws = WS_CHAR,
            token = SNIPPET_TOKEN,
        ))
        .context("Invalid placeholder pattern")?;

        Ok(Injector {
            opts,
            source_types,
            target_types,
            titles,
            wrapped_re,
            placeholder_re,
        })
    }

    /// Runs the inject pass: snippet file materialization first, then
    /// placeholder rewriting across the documentation tree. A no-op when
    /// the store is empty.
    pub fn inject(&self, store: &SnippetStore, docs_root: &Path) -> Result<()> {
        if store.is_empty() {
            return Ok(());
        }

        self.materialize_snippet_files(store, docs_root)?;

        if docs_root.is_file() {
            return self.process_docs_file(docs_root, store);
        }

        for target_type in &self.target_types {
            for entry in WalkDir::new(docs_root)
                .into_iter()
                .filter_map(Result::ok)
                .filter(|e| e.file_type().is_file())
            {
                if has_extension(entry.path(), target_type) {
                    self.process_docs_file(entry.path(), store)?;
                }
            }
        }

        Ok(())
    }

    /// Creates a documentation file for every snippet declaring a `file`
    /// option, composed of header + processed value + footer plus an
    /// auto-generated marker. Existing files are overwritten.
    fn materialize_snippet_files(&self, store: &SnippetStore, docs_root: &Path) -> Result<()> {
        for snippet in store.iter() {
            let file = snippet.file();
            if file.is_empty() {
                continue;
            }

            let header =
                self.lookup_with_fallback(snippet.header(), docs_root, file, "_header.md")?;
            let footer =
                self.lookup_with_fallback(snippet.footer(), docs_root, file, "_footer.md")?;
            let processed = snippet.processed_value()?;

            let target = docs_root.join(file);
            if let Some(parent) = target.parent() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Error creating directory {}", parent.display()))?;
            }

            let date = Local::now().format("%a %b %d %Y");
            let contents = format!(
                "{}{}{}\n\n{}This file is auto-generated. Do not edit. Generated at: {}{}",
                header,
                processed,
                footer,
                self.opts.placeholder_prefix,
                date,
                self.opts.placeholder_suffix
            );
            fs::write(&target, contents)
                .with_context(|| format!("Error writing snippet file {}", target.display()))?;
            info!("Created snippet file {}", target.display());
        }

        Ok(())
    }

    /// Resolves header/footer content: an explicit path is used when it
    /// exists under the docs root; otherwise a file named `implicit_name`
    /// is looked up next to the target file, then at the docs root.
    fn lookup_with_fallback(
        &self,
        explicit: &str,
        docs_root: &Path,
        file: &str,
        implicit_name: &str,
    ) -> Result<String> {
        let explicit_path = docs_root.join(explicit);
        let target = docs_root.join(file);
        let sibling = target.parent().map(|dir| dir.join(implicit_name));
        let root_fallback = docs_root.join(implicit_name);

        let path = if !explicit.is_empty() && explicit_path.exists() {
            Some(explicit_path)
        } else if sibling.as_ref().map_or(false, |p| p.exists()) {
            sibling
        } else if root_fallback.exists() {
            Some(root_fallback)
        } else {
            None
        };

        match path {
            Some(path) => {
                debug!("Getting content from {}", path.display());
                fs::read_to_string(&path)
                    .with_context(|| format!("Error reading {}", path.display()))
            }
            None => Ok(String::new()),
        }
    }

    /// Collapses previously wrapped placeholder pairs back to the canonical
    /// self-closing form, so re-running injection is idempotent.
    fn collapse_wrapped_placeholders(&self, contents: &str) -> String {
        self.wrapped_re
            .replace_all(contents, |caps: &regex::Captures| {
                format!(
                    "{}snippet id='{}' options='{}'/{}",
                    self.opts.placeholder_prefix,
                    &caps[1],
                    caps.get(2).map(|m| m.as_str()).unwrap_or(""),
                    self.opts.placeholder_suffix
                )
            })
            .into_owned()
    }

    /// Renders the stored snippets for `id`, one block per configured
    /// source type that has a match, joined by a line terminator. Empty
    /// when no source type matches.
    fn render_placeholder(&self, store: &SnippetStore, id: &str, options: &str) -> Result<String> {
        let mut rendered = String::new();
        for source_type in &self.source_types {
            let snippet = match store.get(source_type, id) {
                Some(snippet) => snippet,
                None => continue,
            };
            let processed = snippet.processed_value()?;

            if !rendered.is_empty() {
                rendered.push('\n');
            }
            if options.contains("nocodeblock") {
                rendered.push_str(&processed);
            } else {
                let title = self
                    .titles
                    .get(source_type)
                    .map(String::as_str)
                    .unwrap_or("");
                rendered.push_str(&format!("```{}\n{}\n```", title, processed));
            }
        }
        Ok(rendered)
    }

    /// Rewrites all resolvable placeholders in one documentation file. The
    /// file is written back only if at least one placeholder resolved;
    /// unresolved placeholders are left untouched.
    fn process_docs_file(&self, path: &Path, store: &SnippetStore) -> Result<()> {
        info!("Processing docs file: {}", path.display());
        let original = fs::read_to_string(path)
            .with_context(|| format!("Error reading docs file {}", path.display()))?;

        let mut contents = self.collapse_wrapped_placeholders(&original);

        let mut had_matches = false;
        let mut pos = 0;
        loop {
            let (range, id, options) = match self.placeholder_re.captures_at(&contents, pos) {
                Some(caps) => {
                    let m = caps.get(0).unwrap();
                    (
                        m.range(),
                        caps[1].to_string(),
                        caps.get(2).map(|m| m.as_str()).unwrap_or("").to_string(),
                    )
                }
                None => break,
            };

            let rendered = self.render_placeholder(store, &id, &options)?;
            if rendered.is_empty() {
                debug!("No stored snippet for placeholder '{}'", id);
                pos = range.end;
                continue;
            }

            let replacement = if self.opts.wrap {
                format!(
                    "{prefix}snippet id='{id}' options='{options}'{suffix}\n{rendered}\n{prefix}/snippet{suffix}",
                    prefix = self.opts.placeholder_prefix,
                    suffix = self.opts.placeholder_suffix,
                )
            } else {
                rendered
            };

            info!("Placeholder resolved: {}", id);
            pos = range.start + replacement.len();
            contents.replace_range(range, &replacement);
            had_matches = true;
        }

        if had_matches {
            fs::write(path, contents)
                .with_context(|| format!("Error writing docs file {}", path.display()))?;
        }

        Ok(())
    }
}

fn has_extension(path: &Path, dotted: &str) -> bool {
    path.extension()
        .map(|ext| format!(".{}", ext.to_string_lossy()) == dotted)
        .unwrap_or(false)
}
