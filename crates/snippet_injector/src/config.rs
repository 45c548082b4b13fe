// crates/snippet_injector/src/config.rs

/// Centralized runtime configuration composed from the CLI arguments.
/// Logged once at debug level so a run can be reproduced from its output.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub root: String,
    pub docs_root: String,
    pub source_extension_filter: String,      // ordered, pipe-separated, e.g. ".js|.ts"
    pub target_extension_filter: String,      // pipe-separated, e.g. ".md"
    pub snippet_titles: String,               // positionally aligned with source extensions
    pub placeholder_prefix: String,
    pub placeholder_suffix: String,
    pub wrap: bool,
    pub log_level: String,
}
